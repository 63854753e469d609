//! Incremental framing of a newline-delimited byte stream.
//!
//! Bytes are decoded with a stateful `encoding_rs` decoder, so a multi-byte
//! character split across two chunks comes out whole once the rest of it
//! arrives. Decoded text accumulates in a residual buffer; every `\n` ends a
//! line. When the stream ends, [`LineFramer::finish`] yields whatever is left
//! as a final line even without a trailing delimiter.

use encoding_rs::{CoderResult, Decoder, Encoding, UTF_8};
use engine_logging::engine_warn;

pub struct LineFramer {
    decoder: Decoder,
    buffer: String,
    finished: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    /// UTF-8 framer.
    pub fn new() -> Self {
        Self::with_encoding(UTF_8)
    }

    pub fn with_encoding(encoding: &'static Encoding) -> Self {
        Self {
            decoder: encoding.new_decoder(),
            buffer: String::new(),
            finished: false,
        }
    }

    /// Picks the charset named by a `Content-Type` header, defaulting to UTF-8.
    pub fn for_content_type(content_type: Option<&str>) -> Self {
        let encoding = content_type
            .and_then(extract_charset)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .unwrap_or(UTF_8);
        Self::with_encoding(encoding)
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.decoder.encoding()
    }

    /// Text received after the last delimiter.
    pub fn residual(&self) -> &str {
        &self.buffer
    }

    /// Decode `chunk` and return the lines it completed.
    ///
    /// Lines the caller does not pull from the iterator stay buffered and are
    /// returned by the next call.
    pub fn push(&mut self, chunk: &[u8]) -> Lines<'_> {
        if self.finished {
            engine_warn!("Ignoring {} byte(s) pushed after end of stream", chunk.len());
        } else {
            self.decode(chunk, false);
        }
        Lines::new(self, false)
    }

    /// Signal end of stream: flush the decoder and yield the remaining lines,
    /// including an unterminated trailing one.
    pub fn finish(&mut self) -> Lines<'_> {
        if !self.finished {
            self.decode(&[], true);
            self.finished = true;
        }
        Lines::new(self, true)
    }

    fn decode(&mut self, mut chunk: &[u8], last: bool) {
        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(chunk.len())
                .unwrap_or(chunk.len().saturating_mul(3) + 4);
            self.buffer.reserve(needed);
            let (result, read, had_errors) =
                self.decoder.decode_to_string(chunk, &mut self.buffer, last);
            if had_errors {
                engine_warn!(
                    "Stream contained bytes that are invalid {}",
                    self.decoder.encoding().name()
                );
            }
            chunk = &chunk[read..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }
    }
}

/// Lazy iterator over complete lines. Consumed text is dropped from the
/// framer's buffer when the iterator is dropped.
pub struct Lines<'a> {
    framer: &'a mut LineFramer,
    consumed: usize,
    include_tail: bool,
}

impl<'a> Lines<'a> {
    fn new(framer: &'a mut LineFramer, include_tail: bool) -> Self {
        Self {
            framer,
            consumed: 0,
            include_tail,
        }
    }
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let rest = &self.framer.buffer[self.consumed..];
            let (raw, advance) = match rest.find('\n') {
                Some(idx) => (&rest[..idx], idx + 1),
                None if self.include_tail && !rest.is_empty() => (rest, rest.len()),
                None => return None,
            };
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            // Blank lines are keep-alive noise.
            let line = (!line.trim().is_empty()).then(|| line.to_string());
            self.consumed += advance;
            if line.is_some() {
                return line;
            }
        }
    }
}

impl Drop for Lines<'_> {
    fn drop(&mut self) {
        self.framer.buffer.drain(..self.consumed);
    }
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches(|c: char| matches!(c, ' ' | '"' | '\'')))
        })
        .next()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_is_read_case_insensitively() {
        assert_eq!(
            extract_charset("application/x-ndjson; Charset=\"windows-1252\""),
            Some("windows-1252".to_string())
        );
        assert_eq!(extract_charset("application/x-ndjson"), None);
    }

    #[test]
    fn unknown_charset_falls_back_to_utf8() {
        let framer = LineFramer::for_content_type(Some("text/plain; charset=bogus"));
        assert_eq!(framer.encoding(), UTF_8);
    }
}
