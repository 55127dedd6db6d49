//! Incremental `text/event-stream` decoder.
//!
//! Bytes arrive in arbitrary chunks. [`SseDecoder::feed`] buffers partial
//! lines and returns every event completed by the chunk. Only the parts of
//! the framing the server uses are interpreted: `data:` lines are joined
//! with newlines, `event:` and `id:` are kept, comment lines (`:` prefix,
//! as sent for keep-alives) are ignored and a blank line ends the event.
//! A line or event larger than [`MAX_EVENT_BYTES`] fails the stream.

use crate::error::ViewerError;

/// Largest line, and largest joined event payload, the decoder buffers.
pub const MAX_EVENT_BYTES: usize = 64 * 1024;

/// One decoded server-sent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type, if the server named one.
    pub event: Option<String>,
    /// Last event id, if the server sent one.
    pub id: Option<String>,
    /// Payload: every `data:` line of the event joined with `\n`.
    pub data: String,
}

/// Streaming decoder state.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    pending: SseEvent,
    has_data: bool,
}

impl SseDecoder {
    /// A decoder with nothing buffered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return the events it completes.
    ///
    /// Fails once a line without a terminator, or the data of one event,
    /// grows past [`MAX_EVENT_BYTES`].
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>, ViewerError> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let rest = self.buffer.split_off(newline.saturating_add(1));
            let raw = std::mem::replace(&mut self.buffer, rest);
            let raw = raw.strip_suffix(b"\n").unwrap_or(raw.as_slice());
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let line = String::from_utf8_lossy(raw);

            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
            if self.pending.data.len() > MAX_EVENT_BYTES {
                return Err(ViewerError::Stream(format!(
                    "event data exceeds {MAX_EVENT_BYTES} bytes"
                )));
            }
        }

        if self.buffer.len() > MAX_EVENT_BYTES {
            return Err(ViewerError::Stream(format!(
                "line exceeds {MAX_EVENT_BYTES} bytes without a terminator"
            )));
        }
        Ok(events)
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);

        match field {
            "data" => {
                if self.has_data {
                    self.pending.data.push('\n');
                }
                self.pending.data.push_str(value);
                self.has_data = true;
            }
            "event" => self.pending.event = Some(value.to_owned()),
            "id" => self.pending.id = Some(value.to_owned()),
            _ => {}
        }
        None
    }

    /// Finish the pending event. Events without data are discarded.
    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = std::mem::take(&mut self.pending);
        let had_data = std::mem::replace(&mut self.has_data, false);
        had_data.then_some(event)
    }
}
