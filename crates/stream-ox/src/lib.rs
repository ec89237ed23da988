#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Incremental decoding of streamed AI completion responses
//!
//! The body is a sequence of event blocks separated by a blank line, each
//! carrying one or more `data: ` lines. This crate turns raw byte chunks into
//! text fragments plus a running accumulation, independent of how the
//! transport split the bytes.

pub mod decoder;
pub mod error;
pub mod event;
pub mod request_builder;
pub mod streaming;
pub mod utf8;

pub use decoder::{Completion, DecoderOptions, StreamDecoder, decode_all};
pub use error::StreamError;
pub use event::{Fragment, parse_event};
pub use request_builder::{Endpoint, HttpMethod, RequestBuilder, RequestConfig};
pub use streaming::FragmentStream;
pub use utf8::Utf8Decoder;
