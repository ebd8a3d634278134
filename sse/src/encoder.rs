//! Turns events into the `text/event-stream` wire format.
//!
//! A record is a set of `field:value` lines in the fixed order `event`, `id`,
//! `data`, terminated by exactly one blank line.

use crate::error::{EncodeErrorKind, Error, ErrorKind, Result};
use crate::message::Event;
use bytes::Bytes;

/// Comment record written periodically to keep intermediaries from timing out.
const KEEP_ALIVE_FRAME: &str = ":keep-alive\n\n";

/// Written once right after the headers so clients see the first byte promptly.
const INITIAL_FRAME: &str = "\n";

/// Encoding seam used by the dispatcher.
pub trait Encode: Send + Sync {
    fn encode(&self, event: &Event) -> Result<Bytes>;
}

/// The standard event stream encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireEncoder;

impl Encode for WireEncoder {
    fn encode(&self, event: &Event) -> Result<Bytes> {
        encode(event).map(Bytes::from)
    }
}

/// Encodes a single event record.
pub fn encode(event: &Event) -> Result<String> {
    let data = event.payload.to_text()?;
    let event_type = event.event_type.as_deref().unwrap_or_default();
    if has_line_break(&data) || has_line_break(event_type) {
        return Err(Error::new(ErrorKind::Encode(EncodeErrorKind::MultilineData)));
    }

    let mut record = String::with_capacity(data.len() + 32);
    if !event_type.is_empty() {
        record.push_str("event:");
        record.push_str(event_type);
        record.push('\n');
    }
    if let Some(id) = event.id.filter(|id| *id != 0) {
        record.push_str("id:");
        record.push_str(&id.to_string());
        record.push('\n');
    }
    record.push_str("data:");
    record.push_str(&data);
    record.push_str("\n\n");

    Ok(record)
}

fn has_line_break(field: &str) -> bool {
    field.contains(['\n', '\r'])
}

pub fn keep_alive_frame() -> Bytes {
    Bytes::from_static(KEEP_ALIVE_FRAME.as_bytes())
}

pub fn initial_frame() -> Bytes {
    Bytes::from_static(INITIAL_FRAME.as_bytes())
}
