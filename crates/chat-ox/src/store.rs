//! Observable state of the reply currently being streamed.
//!
//! One [`StreamStore`] is created per application context and cloned into
//! every surface that needs it (message list, input box, regenerate button).
//! Readers either take snapshots or [`subscribe`](StreamStore::subscribe) and
//! react to changes.
//!
//! ```text
//! IDLE --begin--> THINKING --first fragment--> STREAMING --finish/drop--> IDLE
//! ```

use std::sync::Arc;

use stream_ox::Fragment;
use tokio::sync::watch;

use crate::message::ChatMessage;

/// Coarse phase derived from the two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Idle,
    Thinking,
    Streaming,
}

/// Snapshot of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamState {
    /// A request is out and nothing has arrived yet.
    pub is_thinking: bool,
    /// Reply text is arriving.
    pub is_streaming: bool,
    pub current_message: ChatMessage,
}

impl StreamState {
    #[must_use]
    pub fn phase(&self) -> StreamPhase {
        match (self.is_thinking, self.is_streaming) {
            (true, _) => StreamPhase::Thinking,
            (false, true) => StreamPhase::Streaming,
            (false, false) => StreamPhase::Idle,
        }
    }
}

impl Default for StreamState {
    fn default() -> Self {
        Self {
            is_thinking: false,
            is_streaming: false,
            current_message: ChatMessage::placeholder(),
        }
    }
}

/// Shared handle to the streaming state. Clones observe the same state.
///
/// `is_thinking` and `is_streaming` are never published as both `true`:
/// raising one flag lowers the other in the same update.
#[derive(Debug, Clone)]
pub struct StreamStore {
    tx: Arc<watch::Sender<StreamState>>,
}

impl Default for StreamStore {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(StreamState::default());
        Self { tx: Arc::new(tx) }
    }
}

impl StreamStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Receiver notified after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StreamState> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> StreamState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn phase(&self) -> StreamPhase {
        self.tx.borrow().phase()
    }

    #[must_use]
    pub fn is_thinking(&self) -> bool {
        self.tx.borrow().is_thinking
    }

    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.tx.borrow().is_streaming
    }

    #[must_use]
    pub fn current_message(&self) -> ChatMessage {
        self.tx.borrow().current_message.clone()
    }

    pub fn set_thinking(&self, thinking: bool) {
        self.tx.send_if_modified(|state| {
            let before = (state.is_thinking, state.is_streaming);
            state.is_thinking = thinking;
            if thinking {
                state.is_streaming = false;
            }
            before != (state.is_thinking, state.is_streaming)
        });
    }

    pub fn set_streaming(&self, streaming: bool) {
        self.tx.send_if_modified(|state| {
            let before = (state.is_thinking, state.is_streaming);
            state.is_streaming = streaming;
            if streaming {
                state.is_thinking = false;
            }
            before != (state.is_thinking, state.is_streaming)
        });
    }

    /// Replace the content of the current message with the full accumulated text.
    pub fn set_current_message_content(&self, content: impl Into<String>) {
        let content = content.into();
        self.tx.send_if_modified(|state| {
            if state.current_message.content == content {
                return false;
            }
            state.current_message.content = content;
            true
        });
    }

    /// Install a fresh placeholder. Clearing `is_streaming` is up to the caller.
    pub fn reset_current_message(&self) {
        self.tx.send_modify(|state| {
            state.current_message = ChatMessage::placeholder();
        });
    }

    /// Return to IDLE in a single update: both flags cleared, fresh placeholder.
    pub fn reset(&self) {
        self.tx.send_modify(|state| {
            state.is_thinking = false;
            state.is_streaming = false;
            state.current_message = ChatMessage::placeholder();
        });
    }

    /// Enter THINKING for a new request.
    ///
    /// The returned guard drives the rest of the lifecycle. Dropping it
    /// without calling [`ActiveStream::finish`] still returns the store to
    /// IDLE, so early returns on error never leave a request "thinking".
    #[must_use = "dropping the guard immediately returns the store to idle"]
    pub fn begin(&self) -> ActiveStream {
        if self.phase() != StreamPhase::Idle {
            log::warn!("starting a stream while another is active; replies will share one slot");
        }
        self.set_thinking(true);
        ActiveStream {
            store: self.clone(),
            finished: false,
        }
    }
}

/// Lifecycle guard for one in-flight reply.
#[derive(Debug)]
pub struct ActiveStream {
    store: StreamStore,
    finished: bool,
}

impl ActiveStream {
    /// Publish a fragment. The first one moves the store to STREAMING.
    pub fn update(&self, fragment: &Fragment) {
        if !self.store.is_streaming() {
            self.store.set_streaming(true);
        }
        self.store
            .set_current_message_content(fragment.accumulated.as_str());
    }

    /// The stream completed; go back to IDLE with a fresh placeholder.
    pub fn finish(mut self) {
        self.finished = true;
        self.store.reset();
    }
}

impl Drop for ActiveStream {
    fn drop(&mut self) {
        if !self.finished {
            log::debug!("stream ended without completing; returning to idle");
            self.store.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(text: &str, accumulated: &str) -> Fragment {
        Fragment {
            text: text.to_string(),
            accumulated: accumulated.to_string(),
        }
    }

    #[test]
    fn starts_idle_with_placeholder() {
        let store = StreamStore::new();
        let state = store.state();
        assert_eq!(state.phase(), StreamPhase::Idle);
        assert!(state.current_message.content.is_empty());
    }

    #[test]
    fn flags_are_never_both_set() {
        let store = StreamStore::new();
        store.set_thinking(true);
        store.set_streaming(true);
        assert!(!store.is_thinking());
        assert!(store.is_streaming());

        store.set_thinking(true);
        assert!(store.is_thinking());
        assert!(!store.is_streaming());
    }

    #[test]
    fn content_is_replaced_not_appended() {
        let store = StreamStore::new();
        store.set_current_message_content("He");
        store.set_current_message_content("Hello");
        assert_eq!(store.current_message().content, "Hello");
    }

    #[test]
    fn reset_current_message_issues_new_ids() {
        let store = StreamStore::new();
        let before = store.current_message();
        store.set_current_message_content("stale");
        store.reset_current_message();
        let after = store.current_message();

        assert_ne!(before.id, after.id);
        assert!(after.content.is_empty());
    }

    #[test]
    fn guard_walks_the_state_machine() {
        let store = StreamStore::new();
        let placeholder = store.current_message();

        let active = store.begin();
        assert_eq!(store.phase(), StreamPhase::Thinking);

        active.update(&fragment("A", "A"));
        assert_eq!(store.phase(), StreamPhase::Streaming);
        active.update(&fragment("B", "AB"));
        assert_eq!(store.current_message().content, "AB");

        active.finish();
        let state = store.state();
        assert_eq!(state.phase(), StreamPhase::Idle);
        assert!(state.current_message.content.is_empty());
        assert_ne!(state.current_message.id, placeholder.id);
    }

    #[test]
    fn dropping_guard_returns_to_idle() {
        let store = StreamStore::new();
        {
            let active = store.begin();
            active.update(&fragment("partial", "partial"));
        }
        assert_eq!(store.phase(), StreamPhase::Idle);
        assert!(store.current_message().content.is_empty());
    }

    #[test]
    fn clones_share_state() {
        let store = StreamStore::new();
        let other = store.clone();
        store.set_thinking(true);
        assert!(other.is_thinking());
    }

    #[test]
    fn separate_stores_are_isolated() {
        let a = StreamStore::new();
        let b = StreamStore::new();
        a.set_streaming(true);
        assert!(!b.is_streaming());
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let store = StreamStore::new();
        let mut rx = store.subscribe();

        store.set_thinking(true);
        rx.changed().await.expect("store is alive");
        assert!(rx.borrow_and_update().is_thinking);

        store.set_thinking(true);
        assert!(!rx.has_changed().expect("store is alive"));
    }
}
