//! Incremental decoder for the stage server's SSE chat stream.
//!
//! The transport hands us raw byte chunks with arbitrary boundaries; this
//! module turns them into discrete events. Decoding is layered: bytes are
//! stitched into valid UTF-8 ([`Utf8Buffer`]), text is framed into complete
//! lines ([`LineFramer`]), and each line is interpreted under the `data:`
//! framing convention ([`SseDecoder`]). Nothing is decoded ahead of demand;
//! [`EventStream`] only polls the transport when no decoded event is pending.

use std::collections::VecDeque;

use futures_util::{Stream, StreamExt};
use memchr::memchr;
use serde_json::Value;

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// One decoded unit of the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    /// A JSON payload from a `data:` line.
    Data(Value),
    /// The `[DONE]` sentinel. Always the last event of a stream.
    Done,
}

/// Stitches raw byte chunks into valid UTF-8 text.
///
/// A multi-byte character split across chunk boundaries is held back until
/// its remaining bytes arrive; held bytes are never emitted as text.
#[derive(Debug, Default)]
pub struct Utf8Buffer {
    partial: Vec<u8>,
}

impl Utf8Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of the buffered input as possible.
    ///
    /// Invalid byte sequences decode to U+FFFD; an incomplete trailing
    /// sequence is retained for the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> String {
        self.partial.extend_from_slice(chunk);
        let mut decoded = String::new();
        loop {
            match std::str::from_utf8(&self.partial) {
                Ok(text) => {
                    decoded.push_str(text);
                    self.partial.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    decoded.push_str(&String::from_utf8_lossy(&self.partial[..valid]));
                    match err.error_len() {
                        Some(bad) => {
                            decoded.push(char::REPLACEMENT_CHARACTER);
                            self.partial.drain(..valid + bad);
                        }
                        None => {
                            // Incomplete trailing sequence: hold it back.
                            self.partial.drain(..valid);
                            break;
                        }
                    }
                }
            }
        }
        decoded
    }

    /// Flush whatever is still held at end of input.
    ///
    /// A dangling partial sequence decodes to replacement characters rather
    /// than an error.
    pub fn finish(&mut self) -> String {
        if self.partial.is_empty() {
            return String::new();
        }
        let flushed = String::from_utf8_lossy(&self.partial).into_owned();
        self.partial.clear();
        flushed
    }
}

/// Splits decoded text into complete, newline-terminated lines.
///
/// The trailing unterminated segment is carried over as the pending fragment
/// until a later chunk completes it.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` and return every line completed by it, in order,
    /// without their terminating newlines.
    pub fn frame(&mut self, text: &str) -> Vec<String> {
        self.pending.push_str(text);
        let mut lines = Vec::new();
        while let Some(pos) = memchr(b'\n', self.pending.as_bytes()) {
            let mut line: String = self.pending.drain(..=pos).collect();
            line.pop();
            lines.push(line);
        }
        lines
    }

    /// The unterminated tail seen so far.
    pub fn pending(&self) -> &str {
        &self.pending
    }
}

/// Stateful extractor turning byte chunks into [`SseEvent`]s.
///
/// The decoder is synchronous and transport-agnostic; wire it to an async
/// chunk source with [`EventStream`]. Once `[DONE]` has been seen the
/// decoder is finished and ignores any further input.
#[derive(Debug, Default)]
pub struct SseDecoder {
    bytes: Utf8Buffer,
    lines: LineFramer,
    done: bool,
    malformed_lines: u64,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, returning the events it completed, in stream order.
    pub fn feed_chunk(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        if self.done {
            return Vec::new();
        }
        let text = self.bytes.feed(chunk);
        let mut events = Vec::new();
        for line in self.lines.frame(&text) {
            if let Some(event) = self.extract(&line) {
                let terminal = matches!(event, SseEvent::Done);
                events.push(event);
                if terminal {
                    self.done = true;
                    break;
                }
            }
        }
        events
    }

    /// Signal end of input.
    ///
    /// An unterminated trailing fragment never forms a complete line, so it
    /// is flushed and discarded; a stream that ends without `[DONE]` is a
    /// normal completion.
    pub fn finish(&mut self) {
        if self.done {
            return;
        }
        let tail = self.bytes.finish();
        self.lines.frame(&tail);
        if !self.lines.pending().is_empty() {
            tracing::debug!(
                fragment = self.lines.pending(),
                "stream ended mid-line; discarding fragment"
            );
        }
        self.done = true;
    }

    /// True once `[DONE]` was seen or [`finish`](Self::finish) was called.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of `data:` lines skipped because their payload was not JSON.
    pub fn malformed_lines(&self) -> u64 {
        self.malformed_lines
    }

    fn extract(&mut self, line: &str) -> Option<SseEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        // Other SSE fields (`event:`, `id:`, comments) are ignored.
        let payload = line.strip_prefix(DATA_PREFIX).map(str::trim_start)?;
        if payload == DONE_SENTINEL {
            return Some(SseEvent::Done);
        }
        match serde_json::from_str::<Value>(payload) {
            Ok(value) => Some(SseEvent::Data(value)),
            Err(err) => {
                self.malformed_lines += 1;
                tracing::warn!(line, %err, "skipping unparsable stream line");
                None
            }
        }
    }
}

/// Lazy, pull-based event sequence over an async chunk source.
///
/// The sequence is finite and non-restartable; create a new stream request
/// to replay. Dropping it abandons decoding and releases the source.
pub struct EventStream<S> {
    source: S,
    decoder: SseDecoder,
    queued: VecDeque<SseEvent>,
    finished: bool,
}

impl<S, B, E> EventStream<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            decoder: SseDecoder::new(),
            queued: VecDeque::new(),
            finished: false,
        }
    }

    /// Pull the next event, awaiting the source only when nothing decoded
    /// is pending.
    ///
    /// A transport failure is yielded once as `Err` and ends the sequence.
    /// A source that ends without `[DONE]` ends the sequence normally.
    pub async fn next_event(&mut self) -> Option<Result<SseEvent, E>> {
        loop {
            if let Some(event) = self.queued.pop_front() {
                return Some(Ok(event));
            }
            if self.finished || self.decoder.is_done() {
                return None;
            }
            match self.source.next().await {
                Some(Ok(chunk)) => {
                    self.queued.extend(self.decoder.feed_chunk(chunk.as_ref()));
                }
                Some(Err(err)) => {
                    self.finished = true;
                    self.decoder.finish();
                    return Some(Err(err));
                }
                None => {
                    self.finished = true;
                    self.decoder.finish();
                }
            }
        }
    }

    /// Diagnostics from the underlying decoder.
    pub fn malformed_lines(&self) -> u64 {
        self.decoder.malformed_lines()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde_json::json;

    fn decode_all(chunks: &[&[u8]]) -> Vec<SseEvent> {
        let mut decoder = SseDecoder::new();
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.feed_chunk(chunk));
        }
        decoder.finish();
        events
    }

    #[test]
    fn utf8_buffer_stitches_split_characters() {
        let mut buffer = Utf8Buffer::new();
        // "é" is 0xC3 0xA9; "🦀" is four bytes.
        assert_eq!(buffer.feed(b"caf\xC3"), "caf");
        assert_eq!(buffer.feed(b"\xA9"), "é");
        let crab = "🦀".as_bytes();
        assert_eq!(buffer.feed(&crab[..2]), "");
        assert_eq!(buffer.feed(&crab[2..]), "🦀");
        assert_eq!(buffer.finish(), "");
    }

    #[test]
    fn utf8_buffer_replaces_invalid_sequences() {
        let mut buffer = Utf8Buffer::new();
        assert_eq!(buffer.feed(b"a\xFFb"), "a\u{FFFD}b");
    }

    #[test]
    fn utf8_buffer_finish_flushes_dangling_bytes() {
        let mut buffer = Utf8Buffer::new();
        assert_eq!(buffer.feed(b"ok\xE2\x82"), "ok");
        assert_eq!(buffer.finish(), "\u{FFFD}");
        assert_eq!(buffer.finish(), "");
    }

    #[test]
    fn line_framer_keeps_pending_fragment() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.frame("one\ntwo\nthr"), vec!["one", "two"]);
        assert_eq!(framer.pending(), "thr");
        assert_eq!(framer.frame("ee\n"), vec!["three"]);
        assert_eq!(framer.pending(), "");
    }

    #[test]
    fn line_framer_handles_exact_newline_boundary() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.frame("a\nb\n"), vec!["a", "b"]);
        assert_eq!(framer.pending(), "");
        assert!(framer.frame("").is_empty());
    }

    #[test]
    fn data_line_split_across_chunks_yields_one_event() {
        let events = decode_all(&[b"data: {\"a\":1", b"}\n"]);
        assert_eq!(events, vec![SseEvent::Data(json!({"a": 1}))]);
    }

    #[test]
    fn sentinel_split_across_chunks_terminates_in_order() {
        let events = decode_all(&[b"data: {\"x\":1}\ndata: [DO", b"NE]\n"]);
        assert_eq!(
            events,
            vec![SseEvent::Data(json!({"x": 1})), SseEvent::Done]
        );
    }

    #[test]
    fn malformed_payload_is_skipped_not_fatal() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed_chunk(b"data: not-json\ndata: {\"ok\":true}\n");
        assert_eq!(events, vec![SseEvent::Data(json!({"ok": true}))]);
        assert_eq!(decoder.malformed_lines(), 1);
        assert!(!decoder.is_done());
    }

    #[test]
    fn stream_ending_mid_line_completes_normally() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed_chunk(b"data: {\"said\":\"hi\"}\ndata: {\"tru");
        assert_eq!(events, vec![SseEvent::Data(json!({"said": "hi"}))]);
        decoder.finish();
        assert!(decoder.is_done());
        assert!(decoder.feed_chunk(b"ncated\":1}\n").is_empty());
    }

    #[test]
    fn blank_and_foreign_lines_produce_no_events() {
        let events = decode_all(&[b"\n: keep-alive\nevent: ping\nid: 7\n\ndata: {\"n\":2}\n"]);
        assert_eq!(events, vec![SseEvent::Data(json!({"n": 2}))]);
    }

    #[test]
    fn prefix_without_space_is_accepted() {
        let events = decode_all(&[b"data:{\"tight\":true}\ndata:[DONE]\n"]);
        assert_eq!(
            events,
            vec![SseEvent::Data(json!({"tight": true})), SseEvent::Done]
        );
    }

    #[test]
    fn carriage_returns_are_tolerated() {
        let events = decode_all(&[b"data: {\"crlf\":1}\r\ndata: [DONE]\r\n"]);
        assert_eq!(
            events,
            vec![SseEvent::Data(json!({"crlf": 1})), SseEvent::Done]
        );
    }

    #[test]
    fn nothing_decodes_after_the_sentinel() {
        let mut decoder = SseDecoder::new();
        let events = decoder.feed_chunk(b"data: [DONE]\ndata: {\"late\":1}\n");
        assert_eq!(events, vec![SseEvent::Done]);
        assert!(decoder.is_done());
        assert!(decoder.feed_chunk(b"data: {\"later\":2}\n").is_empty());
    }

    #[test]
    fn chunk_boundaries_never_change_the_event_sequence() {
        // Multi-byte characters and a malformed line, so splits land mid
        // character, mid line, and mid sentinel.
        let input = "data: {\"text\":\"héllo 🦀\"}\n\ndata: broken\nevent: x\ndata: {\"n\":2}\ndata: [DONE]\n".as_bytes();
        let whole = decode_all(&[input]);
        assert_eq!(whole.len(), 3);
        for split in 0..=input.len() {
            let (left, right) = input.split_at(split);
            assert_eq!(decode_all(&[left, right]), whole, "split at {split}");
        }
        // Also exercise a fine-grained split: one byte per chunk.
        let bytes: Vec<&[u8]> = input.chunks(1).collect();
        assert_eq!(decode_all(&bytes), whole);
    }

    #[tokio::test]
    async fn event_stream_pulls_in_order_and_ends_after_done() {
        let chunks: Vec<Result<&[u8], std::io::Error>> = vec![
            Ok(b"data: {\"a\":1}\nda"),
            Ok(b"ta: {\"b\":2}\ndata: [DONE]\n"),
            Ok(b"data: {\"ignored\":true}\n"),
        ];
        let mut events = EventStream::new(stream::iter(chunks));
        assert_eq!(
            events.next_event().await.unwrap().unwrap(),
            SseEvent::Data(json!({"a": 1}))
        );
        assert_eq!(
            events.next_event().await.unwrap().unwrap(),
            SseEvent::Data(json!({"b": 2}))
        );
        assert_eq!(events.next_event().await.unwrap().unwrap(), SseEvent::Done);
        assert!(events.next_event().await.is_none());
        assert!(events.next_event().await.is_none());
    }

    #[tokio::test]
    async fn event_stream_ends_normally_without_sentinel() {
        let chunks: Vec<Result<&[u8], std::io::Error>> =
            vec![Ok(b"data: {\"only\":1}\ndata: {\"half")];
        let mut events = EventStream::new(stream::iter(chunks));
        assert_eq!(
            events.next_event().await.unwrap().unwrap(),
            SseEvent::Data(json!({"only": 1}))
        );
        assert!(events.next_event().await.is_none());
    }

    #[tokio::test]
    async fn event_stream_surfaces_transport_failure_last() {
        let chunks: Vec<Result<&[u8], std::io::Error>> = vec![
            Ok(b"data: {\"a\":1}\n"),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
        ];
        let mut events = EventStream::new(stream::iter(chunks));
        assert_eq!(
            events.next_event().await.unwrap().unwrap(),
            SseEvent::Data(json!({"a": 1}))
        );
        assert!(events.next_event().await.unwrap().is_err());
        assert!(events.next_event().await.is_none());
    }

    #[tokio::test]
    async fn event_stream_counts_malformed_lines() {
        let chunks: Vec<Result<&[u8], std::io::Error>> =
            vec![Ok(b"data: nope\ndata: {\"ok\":true}\n")];
        let mut events = EventStream::new(stream::iter(chunks));
        assert_eq!(
            events.next_event().await.unwrap().unwrap(),
            SseEvent::Data(json!({"ok": true}))
        );
        assert!(events.next_event().await.is_none());
        assert_eq!(events.malformed_lines(), 1);
    }
}
