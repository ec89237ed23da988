#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Streamed AI chat replies for the study app
//!
//! [`ChatClient`] opens the streamed completion request, [`StreamStore`] is
//! the observable "thinking / streaming / current message" state shared by
//! the UI, and [`ChatSession`] runs one request through both, reporting
//! failures and saving the finished reply.

pub mod client;
pub mod error;
pub mod message;
pub mod notify;
pub mod persist;
pub mod request;
pub mod session;
pub mod store;
pub mod timestamp;

pub use client::ChatClient;
pub use error::ChatError;
pub use message::{ChatMessage, Role};
pub use notify::{LogNotifier, Notice, Notifier};
pub use persist::{MessageStore, SavedMessage};
pub use request::{CreateMessageRequest, EditMessageRequest};
pub use session::ChatSession;
pub use store::{ActiveStream, StreamPhase, StreamState, StreamStore};
pub use timestamp::Timestamp;

pub use stream_ox::{DecoderOptions, Fragment, FragmentStream, StreamError};
pub use async_trait::async_trait;
