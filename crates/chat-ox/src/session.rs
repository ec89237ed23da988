//! Request lifecycle: ties the client, the stream store, notifications and
//! persistence together for one reply at a time.

use std::{future::Future, sync::Arc};

use bon::Builder;
use stream_ox::FragmentStream;

use crate::{
    client::ChatClient,
    error::ChatError,
    message::Role,
    notify::{LogNotifier, Notice, Notifier},
    persist::{MessageStore, SavedMessage},
    request::{CreateMessageRequest, EditMessageRequest},
    store::StreamStore,
};

#[derive(Clone, Builder)]
pub struct ChatSession {
    client: ChatClient,
    #[builder(default)]
    store: StreamStore,
    #[builder(default = Arc::new(LogNotifier) as Arc<dyn Notifier>)]
    notifier: Arc<dyn Notifier>,
    messages: Option<Arc<dyn MessageStore>>,
}

impl ChatSession {
    pub fn new(client: ChatClient, store: StreamStore) -> Self {
        Self::builder().client(client).store(store).build()
    }

    /// The store this session publishes to.
    #[must_use]
    pub fn store(&self) -> &StreamStore {
        &self.store
    }

    /// Edit a user message and stream the regenerated reply into the store.
    ///
    /// Returns the full reply once the transport ends.
    ///
    /// # Errors
    ///
    /// Any [`ChatError`]. The error has already been reported through the
    /// notifier and the store is back to idle.
    pub async fn regenerate(
        &self,
        message_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<String, ChatError> {
        let request = EditMessageRequest::builder()
            .content(content)
            .message_id(message_id)
            .build();
        let saved = SavedMessage {
            chat_id: None,
            reply_to: Some(request.message_id.clone()),
            role: Role::Assistant,
            content: String::new(),
        };

        self.run(self.client.edit_message(&request), saved).await
    }

    /// Send a new user message and stream the reply into the store.
    ///
    /// # Errors
    ///
    /// Same as [`ChatSession::regenerate`].
    pub async fn send(
        &self,
        chat_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<String, ChatError> {
        let request = CreateMessageRequest::builder()
            .content(content)
            .chat_id(chat_id)
            .build();
        let saved = SavedMessage {
            chat_id: Some(request.chat_id.clone()),
            reply_to: None,
            role: Role::Assistant,
            content: String::new(),
        };

        self.run(self.client.create_message(&request), saved).await
    }

    async fn run<F>(&self, open: F, mut saved: SavedMessage) -> Result<String, ChatError>
    where
        F: Future<Output = Result<FragmentStream, ChatError>>,
    {
        let active = self.store.begin();

        let stream = match open.await {
            Ok(stream) => stream,
            Err(err) => {
                drop(active);
                return Err(self.report(err));
            }
        };

        let mut fragments = 0usize;
        let result = stream
            .consume(
                |fragment| {
                    fragments += 1;
                    active.update(fragment);
                },
                |_| {},
            )
            .await;

        let text = match result {
            Ok(text) => {
                active.finish();
                log::debug!(
                    "{} reply complete: {fragments} fragments, {} chars",
                    saved.role,
                    text.chars().count()
                );
                text
            }
            Err(err) => {
                drop(active);
                return Err(self.report(ChatError::Stream(err)));
            }
        };

        if let Some(messages) = &self.messages {
            if text.is_empty() {
                log::debug!("reply was empty, nothing to save");
            } else {
                saved.content.clone_from(&text);
                if let Err(err) = messages.save(saved).await {
                    return Err(self.report(err));
                }
            }
        }

        Ok(text)
    }

    fn report(&self, err: ChatError) -> ChatError {
        log::warn!("chat request failed: {err}");
        self.notifier.notify(Notice::error(err.to_string()));
        err
    }
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("client", &self.client)
            .field("store", &self.store)
            .field("persists", &self.messages.is_some())
            .finish_non_exhaustive()
    }
}
