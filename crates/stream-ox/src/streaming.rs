use std::{
    pin::Pin,
    task::{Context, Poll},
};

use async_stream::try_stream;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream::BoxStream};

use crate::{
    decoder::{DecoderOptions, StreamDecoder},
    error::StreamError,
    event::Fragment,
};

/// Lazy, one-shot sequence of fragments decoded from a streamed body.
///
/// Each item carries the fragment text and the accumulated text after it.
/// The stream ends when the transport signals end of body, whether or not a
/// `[DONE]` marker was seen. A transport error is yielded once and ends the
/// stream.
pub struct FragmentStream {
    inner: BoxStream<'static, Result<Fragment, StreamError>>,
}

impl FragmentStream {
    /// Decode any byte stream.
    pub fn new<S, E>(bytes: S, options: DecoderOptions) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Send + 'static,
        StreamError: From<E>,
    {
        let mut bytes = Box::pin(bytes);

        let inner: BoxStream<'static, Result<Fragment, StreamError>> = Box::pin(try_stream! {
            let mut decoder = StreamDecoder::with_options(options);

            while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                for fragment in decoder.push(&chunk) {
                    yield fragment;
                }
            }

            let fragments = decoder.fragment_count();
            let completion = decoder.finish();
            log::debug!(
                "stream ended after {} fragments, {} chars accumulated",
                fragments + usize::from(completion.flushed.is_some()),
                completion.text.chars().count()
            );
            if let Some(fragment) = completion.flushed {
                yield fragment;
            }
        });

        Self { inner }
    }

    /// Decode the body of a response whose status was already checked.
    ///
    /// # Errors
    ///
    /// [`StreamError::StreamUnavailable`] when the response declares no body
    /// (`204 No Content` or `Content-Length: 0`).
    pub fn from_response(
        response: reqwest::Response,
        options: DecoderOptions,
    ) -> Result<Self, StreamError> {
        if response.status() == reqwest::StatusCode::NO_CONTENT
            || response.content_length() == Some(0)
        {
            log::warn!(
                "response from {} has no readable body (status {})",
                response.url(),
                response.status()
            );
            return Err(StreamError::StreamUnavailable);
        }

        Ok(Self::new(response.bytes_stream(), options))
    }

    /// Drive the stream to the end, reporting through callbacks.
    ///
    /// `on_fragment` sees every fragment in order; `on_complete` receives the
    /// final accumulated text once the transport ends. On a transport error
    /// `on_complete` is not called and the error is returned.
    ///
    /// # Errors
    ///
    /// Propagates the first [`StreamError`] from the transport.
    pub async fn consume<F, C>(
        mut self,
        mut on_fragment: F,
        on_complete: C,
    ) -> Result<String, StreamError>
    where
        F: FnMut(&Fragment),
        C: FnOnce(&str),
    {
        let mut accumulated = String::new();

        while let Some(fragment) = self.inner.next().await {
            let fragment = fragment?;
            on_fragment(&fragment);
            accumulated = fragment.accumulated;
        }

        on_complete(&accumulated);
        Ok(accumulated)
    }
}

impl Stream for FragmentStream {
    type Item = Result<Fragment, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for FragmentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentStream").finish_non_exhaustive()
    }
}
