use std::collections::HashMap;

use bon::Builder;
use core::fmt;
use stream_ox::{DecoderOptions, Endpoint, FragmentStream, HttpMethod, RequestBuilder, RequestConfig};

use crate::{
    error::ChatError,
    request::{CreateMessageRequest, EditMessageRequest},
};

const MESSAGES_PATH: &str = "api/messages";

/// HTTP client for the chat completion endpoints.
#[derive(Clone, Builder)]
pub struct ChatClient {
    #[builder(into)]
    pub(crate) base_url: String,
    /// Bearer token issued by the auth provider.
    #[builder(into)]
    pub(crate) token: Option<String>,
    #[builder(default)]
    pub(crate) client: reqwest::Client,
    #[builder(default = MESSAGES_PATH.to_string(), into)]
    pub(crate) messages_path: String,
    #[builder(default)]
    pub(crate) decoder: DecoderOptions,
    /// Sent with every request, e.g. an app version or tenant header.
    #[builder(default)]
    pub(crate) headers: HashMap<String, String>,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder().base_url(base_url).build()
    }

    /// Reads `CHAT_API_URL` and, optionally, `CHAT_API_TOKEN`.
    pub fn load_from_env() -> Result<Self, std::env::VarError> {
        let base_url = std::env::var("CHAT_API_URL")?;
        let token = std::env::var("CHAT_API_TOKEN").ok();
        Ok(Self::builder()
            .base_url(base_url)
            .maybe_token(token)
            .build())
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn decoder_options(&self) -> DecoderOptions {
        self.decoder
    }

    fn request_helper(&self) -> RequestBuilder {
        let mut config = RequestConfig::new(&self.base_url);
        if let Some(ref token) = self.token {
            config = config.with_bearer(token);
        }
        for (key, value) in &self.headers {
            config = config.with_header(key, value);
        }
        RequestBuilder::new(self.client.clone(), config)
    }

    /// Replace a user message and stream the regenerated reply (`PATCH`).
    ///
    /// # Errors
    ///
    /// [`ChatError::CreateMessage`] when the request fails or the response
    /// has no readable body. Nothing has been streamed in that case.
    pub async fn edit_message(
        &self,
        request: &EditMessageRequest,
    ) -> Result<FragmentStream, ChatError> {
        let endpoint = Endpoint::new(&self.messages_path, HttpMethod::Patch);
        self.request_helper()
            .open_stream(&endpoint, request, self.decoder)
            .await
            .map_err(ChatError::CreateMessage)
    }

    /// Add a user message to a chat and stream the reply (`POST`).
    ///
    /// # Errors
    ///
    /// Same as [`ChatClient::edit_message`].
    pub async fn create_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<FragmentStream, ChatError> {
        let endpoint = Endpoint::new(&self.messages_path, HttpMethod::Post);
        self.request_helper()
            .open_stream(&endpoint, request, self.decoder)
            .await
            .map_err(ChatError::CreateMessage)
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("messages_path", &self.messages_path)
            .field("decoder", &self.decoder)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let client = ChatClient::builder().base_url("https://app.test").build();
        assert_eq!(client.messages_path, "api/messages");
        assert_eq!(client.token, None);
        assert!(!client.decoder_options().flush_trailing);
        assert!(client.headers.is_empty());
    }

    #[test]
    fn headers_reach_every_request() {
        let client = ChatClient::new("https://app.test")
            .with_token("tok")
            .with_header("x-app-version", "2.3.0");
        let request = client
            .request_helper()
            .build_request(&Endpoint::new(MESSAGES_PATH, HttpMethod::Post))
            .build()
            .expect("request should build");

        assert_eq!(request.headers()["x-app-version"], "2.3.0");
        assert_eq!(request.headers()["authorization"], "Bearer tok");
    }

    #[test]
    fn debug_redacts_token() {
        let client = ChatClient::new("https://app.test").with_token("very-secret");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
