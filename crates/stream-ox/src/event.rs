//! Event-block framing: `data: ` lines separated by a blank line.

/// Separator between two event blocks.
pub const EVENT_BOUNDARY: &str = "\n\n";
/// Prefix of a line that carries payload text.
pub const DATA_PREFIX: &str = "data: ";
/// Line that closes the payload of the event it appears in.
pub const DONE_LINE: &str = "data: [DONE]";

/// One decoded fragment together with the accumulated text after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Payload of a single event block.
    pub text: String,
    /// Concatenation of every fragment of the stream up to and including this one.
    pub accumulated: String,
}

/// Extract the payload of one event block (without its trailing boundary).
///
/// Returns `None` when the block carries no data lines or only empty data.
#[must_use]
pub fn parse_event(block: &str) -> Option<String> {
    let mut data_lines: Vec<&str> = Vec::new();

    for line in block.split('\n') {
        if line == DONE_LINE {
            break;
        }

        if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
            data_lines.push(rest);
        } else if !line.is_empty() {
            // event:, id:, retry: and comments carry nothing we act on
            log::trace!("ignoring non-data line in event block: {line:?}");
        }
    }

    let payload = match data_lines.as_slice() {
        [] => return None,
        [single] => (*single).to_string(),
        lines => lines.join("\n"),
    };

    (!payload.is_empty()).then_some(payload)
}
