use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use taskmon_logging::{taskmon_trace, taskmon_warn};

use crate::{ApiError, ProgressPayload};

/// Decoded progress payloads, in delivery order.
pub type ProgressStream = Pin<Box<dyn Stream<Item = Result<ProgressPayload, ApiError>> + Send>>;

/// Incremental `text/event-stream` decoder.
///
/// Buffers raw bytes so lines (and UTF-8 sequences) split across network
/// chunks are reassembled before decoding. Only `data` fields are kept.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns the data of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw = self.buffer.split_to(newline + 1);
            let text = String::from_utf8_lossy(&raw[..newline]);
            let line = text.strip_suffix('\r').unwrap_or(&text);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }
            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            if field == "data" {
                self.data.push(value.to_string());
            } else {
                taskmon_trace!("Ignoring SSE field {field}");
            }
        }
        events
    }
}

struct DecodeState<S> {
    inner: Pin<Box<S>>,
    decoder: SseDecoder,
    ready: VecDeque<ProgressPayload>,
}

/// Turns a byte stream into progress payloads. Payloads that are not valid
/// JSON are logged and skipped; transport errors are passed through.
pub fn decode_progress<S, E>(inner: S) -> ProgressStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let state = DecodeState {
        inner: Box::pin(inner),
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
    };
    let stream = futures_util::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(payload) = state.ready.pop_front() {
                return Some((Ok(payload), state));
            }
            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    for data in state.decoder.push(&chunk) {
                        match serde_json::from_str::<ProgressPayload>(&data) {
                            Ok(payload) => state.ready.push_back(payload),
                            Err(err) => {
                                taskmon_warn!("Skipping malformed progress payload: {err}")
                            }
                        }
                    }
                }
                Some(Err(err)) => return Some((Err(ApiError::Network(err.to_string())), state)),
                None => return None,
            }
        }
    });
    Box::pin(stream)
}
