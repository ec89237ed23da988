use std::collections::HashMap;

use reqwest::{Method, RequestBuilder as ReqwestRequestBuilder, Response};
use serde::Serialize;

use crate::{
    decoder::DecoderOptions,
    error::{self, StreamError},
    streaming::FragmentStream,
};

/// HTTP method for streamed endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
    Patch,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
        }
    }
}

/// Represents an API endpoint
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
}

impl Endpoint {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

/// Configuration for request building
#[derive(Clone, Default)]
pub struct RequestConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub default_headers: HashMap<String, String>,
}

impl RequestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestConfig")
            .field("base_url", &self.base_url)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

/// Builds and sends requests whose responses are streamed back
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    client: reqwest::Client,
    config: RequestConfig,
}

impl RequestBuilder {
    pub fn new(client: reqwest::Client, config: RequestConfig) -> Self {
        Self { client, config }
    }

    /// Absolute URL of an endpoint
    #[must_use]
    pub fn url(&self, endpoint: &Endpoint) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.path.trim_start_matches('/')
        )
    }

    /// Build a reqwest RequestBuilder for the given endpoint
    #[must_use]
    pub fn build_request(&self, endpoint: &Endpoint) -> ReqwestRequestBuilder {
        let mut req = self
            .client
            .request(endpoint.method.into(), self.url(endpoint));

        if let Some(ref token) = self.config.bearer_token {
            req = req.bearer_auth(token);
        }

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        req.header("accept", "text/event-stream")
    }

    /// Send a JSON body and return the response once its status is confirmed.
    ///
    /// # Errors
    ///
    /// [`StreamError::Status`] for a non-success status, [`StreamError::Transport`]
    /// when the request cannot be sent.
    pub async fn send<B: Serialize>(
        &self,
        endpoint: &Endpoint,
        body: &B,
    ) -> Result<Response, StreamError> {
        let payload = serde_json::to_value(body)?;
        if !payload.is_object() {
            return Err(StreamError::RequestBuilder(format!(
                "Streaming body must be a JSON object, got {payload}"
            )));
        }

        log::debug!("{:?} {}", endpoint.method, self.url(endpoint));

        let response = self.build_request(endpoint).json(&payload).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let bytes = response.bytes().await?;
            log::warn!(
                "{:?} {} failed with status {}",
                endpoint.method,
                endpoint.path,
                status
            );
            Err(error::parse_error_response(status, &bytes))
        }
    }

    /// Send a JSON body and decode the streamed response.
    ///
    /// # Errors
    ///
    /// Everything [`RequestBuilder::send`] reports, plus
    /// [`StreamError::StreamUnavailable`] when the response has no body.
    pub async fn open_stream<B: Serialize>(
        &self,
        endpoint: &Endpoint,
        body: &B,
        options: DecoderOptions,
    ) -> Result<FragmentStream, StreamError> {
        let response = self.send(endpoint, body).await?;
        FragmentStream::from_response(response, options)
    }
}
