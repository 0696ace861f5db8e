//! Incremental SSE (Server-Sent Events) decoder.
//!
//! Network reads split events at arbitrary byte offsets, so the decoder
//! keeps the unterminated tail of the previous read and only parses
//! complete lines. Handles format variations (`data: {...}` vs
//! `data:{...}`, `\r\n` line endings).

use serde_json::Value;

/// Turns a byte stream into the JSON payloads of its `data:` lines.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network read and return the payloads it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Value> {
        self.pending.extend_from_slice(bytes);

        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };

        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        parse_sse_events(&complete)
    }

    /// Parse whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Vec<Value> {
        let rest = std::mem::take(&mut self.pending);
        parse_sse_events(&rest)
    }
}

/// Parse SSE bytes into the JSON payloads of their data lines.
///
/// `[DONE]` markers, comments, `event:`/`id:` lines, blank lines and data
/// that is not JSON are skipped.
pub fn parse_sse_events(bytes: &[u8]) -> Vec<Value> {
    let text = String::from_utf8_lossy(bytes);
    text.lines().filter_map(parse_sse_line).collect()
}

fn parse_sse_line(line: &str) -> Option<Value> {
    let data = line.trim().strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str(data) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(error = %err, "Skipping non-JSON SSE data line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_and_compact_format() {
        let sse = b"data: {\"n\": 1}\ndata:{\"n\":2}\n";
        let events = parse_sse_events(sse);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["n"], 1);
        assert_eq!(events[1]["n"], 2);
    }

    #[test]
    fn skips_done_marker_and_non_data_lines() {
        let sse = b"event: message\n: comment\ndata: {\"n\": 1}\n\ndata: [DONE]\n";
        let events = parse_sse_events(sse);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn handles_crlf_line_endings() {
        let sse = b"data: {\"n\": 1}\r\n\r\ndata: {\"n\": 2}\r\n\r\n";
        assert_eq!(parse_sse_events(sse).len(), 2);
    }

    #[test]
    fn decoder_waits_for_complete_lines() {
        let mut decoder = SseDecoder::new();

        assert!(decoder.push(b"data: {\"te").is_empty());
        assert!(decoder.push(b"xt\": \"Hel").is_empty());

        let events = decoder.push(b"lo\"}\n\ndata: {\"text\"");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["text"], "Hello");

        let events = decoder.push(b": \"!\"}\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["text"], "!");
    }

    #[test]
    fn decoder_flushes_unterminated_tail_on_finish() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"n\": 7}").is_empty());

        let events = decoder.finish();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["n"], 7);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn decoder_keeps_multibyte_characters_split_across_reads() {
        let mut decoder = SseDecoder::new();
        let line = "data: {\"text\": \"héllo\"}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;

        assert!(decoder.push(&line[..split]).is_empty());
        let events = decoder.push(&line[split..]);
        assert_eq!(events[0]["text"], "héllo");
    }
}
