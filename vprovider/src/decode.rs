//! Incremental decoding of streamed response bodies into chat chunks.
//!
//! Bytes accumulate in a [`LineBuffer`]; only newline-terminated lines are
//! handed to the wire-format parser, so a frame split across reads is decoded
//! once its terminator arrives.
//!
//! ```rust
//! use vprovider::{Frame, WireFormat};
//!
//! assert_eq!(
//!     WireFormat::Ndjson.parse_line(r#"{"response":"hi","done":false}"#),
//!     Frame::Chunk("hi".to_string())
//! );
//! assert_eq!(WireFormat::EventStream.parse_line("data: [DONE]"), Frame::Done);
//! assert_eq!(WireFormat::EventStream.parse_line(": keep-alive"), Frame::Skip);
//! ```

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;
use serde_json::Value;

use crate::{
    ByteStream, ChatChunk, ChunkStream, ParseWarning, ProviderId, ProviderStreamHooks,
};

/// Byte accumulator that releases complete lines.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Next complete line without its `\n` (and a trailing `\r`, if any).
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let newline = self.pending.iter().position(|byte| *byte == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    /// Unterminated bytes left once the body has ended, ignoring pure whitespace.
    pub fn take_remainder(&mut self) -> Option<Vec<u8>> {
        let rest = std::mem::take(&mut self.pending);
        if rest.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(rest)
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Outcome of parsing one complete line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Chunk(String),
    Skip,
    Done,
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// One JSON object per line carrying a `response` field.
    Ndjson,
    /// `data: {json}` frames terminated by a `DONE` sentinel.
    EventStream,
}

impl WireFormat {
    pub fn parse_line(self, line: &str) -> Frame {
        match self {
            Self::Ndjson => parse_ndjson_line(line),
            Self::EventStream => parse_event_stream_line(line),
        }
    }
}

fn parse_ndjson_line(line: &str) -> Frame {
    let line = line.trim();
    if line.is_empty() {
        return Frame::Skip;
    }

    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => return Frame::Malformed(err.to_string()),
    };

    if let Some(text) = non_empty_str(value.get("response")) {
        return Frame::Chunk(text.to_string());
    }

    match non_empty_str(value.get("error")) {
        Some(message) => Frame::Malformed(format!("remote reported error: {message}")),
        None => Frame::Skip,
    }
}

fn parse_event_stream_line(line: &str) -> Frame {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return Frame::Skip;
    }

    if let Some(payload) = line.strip_prefix("data:") {
        let payload = payload.trim();
        return match payload {
            "" => Frame::Skip,
            "DONE" | "[DONE]" => Frame::Done,
            _ => parse_event_payload(payload),
        };
    }

    if ["event:", "id:", "retry:"]
        .iter()
        .any(|field| line.starts_with(field))
    {
        return Frame::Skip;
    }

    // Some gateways drop the `data:` prefix and send bare JSON objects.
    parse_event_payload(line)
}

fn parse_event_payload(payload: &str) -> Frame {
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => return Frame::Malformed(err.to_string()),
    };

    non_empty_str(value.get("response"))
        .or_else(|| non_empty_str(value.get("content")))
        .or_else(|| non_empty_str(value.pointer("/delta/content")))
        .map(|text| Frame::Chunk(text.to_string()))
        .unwrap_or(Frame::Skip)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// Turns a raw response body into a chunk stream.
///
/// Malformed lines are reported to `hooks` and skipped. A body error is
/// terminal. Dropping the returned stream drops `body` and with it the
/// connection.
pub fn decode_stream<'a>(
    provider: ProviderId,
    format: WireFormat,
    body: ByteStream<'a>,
    hooks: Arc<dyn ProviderStreamHooks>,
) -> ChunkStream<'a> {
    Box::pin(try_stream! {
        let mut body = body;
        let mut lines = LineBuffer::new();
        let mut emitted = 0usize;
        let mut finished = false;

        'read: while let Some(item) = body.next().await {
            let bytes = item.inspect_err(|err| hooks.on_request_failure(provider, err))?;
            lines.push(&bytes);

            while let Some(raw) = lines.next_line() {
                let line = match String::from_utf8(raw) {
                    Ok(line) => line,
                    Err(err) => {
                        let reason = err.utf8_error().to_string();
                        let payload = String::from_utf8_lossy(err.as_bytes()).into_owned();
                        hooks.on_parse_warning(&ParseWarning::new(provider, &payload, reason));
                        continue;
                    }
                };

                match format.parse_line(&line) {
                    Frame::Chunk(text) => {
                        emitted += 1;
                        yield ChatChunk::token(text);
                    }
                    Frame::Skip => {}
                    Frame::Done => {
                        finished = true;
                        break 'read;
                    }
                    Frame::Malformed(reason) => {
                        hooks.on_parse_warning(&ParseWarning::new(provider, &line, reason));
                    }
                }
            }
        }

        if !finished {
            if let Some(rest) = lines.take_remainder() {
                let payload = String::from_utf8_lossy(&rest).into_owned();
                hooks.on_parse_warning(&ParseWarning::new(
                    provider,
                    &payload,
                    "unterminated line at end of stream",
                ));
            }
        }

        hooks.on_stream_complete(provider, emitted);
    })
}
