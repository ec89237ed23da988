use crate::{
    event::{EVENT_BOUNDARY, Fragment, parse_event},
    utf8::Utf8Decoder,
};

/// Knobs for [`StreamDecoder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Parse text left without a closing `"\n\n"` when the stream ends.
    ///
    /// Off by default: unterminated trailing data is dropped.
    pub flush_trailing: bool,
}

impl DecoderOptions {
    #[must_use]
    pub fn flush_trailing(mut self, flush: bool) -> Self {
        self.flush_trailing = flush;
        self
    }
}

/// Result of closing a [`StreamDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Final accumulated text.
    pub text: String,
    /// Fragment produced from the unterminated tail, when flushing is enabled.
    pub flushed: Option<Fragment>,
    /// Bytes of trailing text that were discarded.
    pub dropped: usize,
}

/// Push-based decoder turning raw chunks into fragments.
///
/// Output depends only on the concatenated input, never on how it was split
/// into chunks.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    utf8: Utf8Decoder,
    buffer: String,
    accumulated: String,
    fragments: usize,
    /// Offset in `buffer` before which no boundary can start.
    scan_from: usize,
    options: DecoderOptions,
}

impl StreamDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Feed one chunk and collect every fragment it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Fragment> {
        let text = self.utf8.decode(chunk);
        self.buffer.push_str(&text);

        let mut fragments = Vec::new();
        let mut consumed = 0;
        let mut search_from = self.scan_from;

        while let Some(offset) = self.buffer[search_from..].find(EVENT_BOUNDARY) {
            let end = search_from + offset;
            if let Some(payload) = parse_event(&self.buffer[consumed..end]) {
                self.accumulated.push_str(&payload);
                self.fragments += 1;
                fragments.push(Fragment {
                    text: payload,
                    accumulated: self.accumulated.clone(),
                });
            }
            consumed = end + EVENT_BOUNDARY.len();
            search_from = consumed;
        }

        self.buffer.drain(..consumed);
        // A boundary may begin with the last byte already buffered.
        self.scan_from = if self.buffer.ends_with('\n') {
            self.buffer.len() - 1
        } else {
            self.buffer.len()
        };
        fragments
    }

    /// Text accumulated so far.
    #[must_use]
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Number of fragments emitted so far.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    /// Close the decoder at end of stream.
    #[must_use]
    pub fn finish(mut self) -> Completion {
        let tail = self.utf8.finish();
        self.buffer.push_str(&tail);

        let mut flushed = None;
        let mut dropped = 0;

        if !self.buffer.is_empty() {
            if self.options.flush_trailing {
                if let Some(payload) = parse_event(&self.buffer) {
                    self.accumulated.push_str(&payload);
                    self.fragments += 1;
                    flushed = Some(Fragment {
                        text: payload,
                        accumulated: self.accumulated.clone(),
                    });
                }
            } else {
                dropped = self.buffer.len();
                log::debug!("dropping {dropped} bytes of unterminated trailing stream data");
            }
        }

        Completion {
            text: self.accumulated,
            flushed,
            dropped,
        }
    }
}

/// Decode a complete body held in memory.
///
/// Returns the fragments in order (including a flushed tail) and the final text.
#[must_use]
pub fn decode_all(input: &[u8], options: DecoderOptions) -> (Vec<Fragment>, String) {
    let mut decoder = StreamDecoder::with_options(options);
    let mut fragments = decoder.push(input);
    let completion = decoder.finish();
    fragments.extend(completion.flushed);
    (fragments, completion.text)
}
