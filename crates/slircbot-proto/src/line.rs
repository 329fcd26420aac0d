//! Line framing codec for tokio.
//!
//! Splits a byte stream on LF (a preceding CR is dropped) and yields each
//! line as a `String` without its terminator. Bytes are decoded as lossy
//! UTF-8, since servers relay whatever encoding their users type in.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};
use crate::MAX_IRC_LINE_LEN;

/// Codec for CRLF (or bare LF) terminated lines.
///
/// Inbound lines longer than the limit are discarded whole. Outbound lines
/// are cut at the first embedded line break and rejected if still too long.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    max_len: usize,
    /// Dropping the rest of an overlong line.
    discarding: bool,
}

impl LineCodec {
    /// Codec with the default limit, [`MAX_IRC_LINE_LEN`].
    pub fn new() -> Self {
        Self::with_max_len(MAX_IRC_LINE_LEN)
    }

    /// Codec with a custom line limit in bytes, terminator included.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    /// The configured limit.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Cut `data` at its first CR or LF.
    pub fn sanitize(data: &str) -> &str {
        match data.find(['\r', '\n']) {
            Some(pos) => &data[..pos],
            None => data,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if self.discarding || src.len() > self.max_len {
                    src.clear();
                    self.discarding = true;
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let end = self.next_index + offset + 1;
            self.next_index = 0;

            if self.discarding || end > self.max_len {
                src.advance(end);
                self.discarding = false;
                continue;
            }

            let line = src.split_to(end);
            let mut bytes = &line[..line.len() - 1];
            if let Some(stripped) = bytes.strip_suffix(b"\r") {
                bytes = stripped;
            }
            if bytes.is_empty() {
                continue;
            }
            return Ok(Some(String::from_utf8_lossy(bytes).into_owned()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        let line = self.decode(src)?;
        if line.is_none() {
            // An unterminated tail at EOF is not a line.
            src.clear();
            self.next_index = 0;
            self.discarding = false;
        }
        Ok(line)
    }
}

impl Encoder<&str> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<()> {
        let line = Self::sanitize(line);
        let actual = line.len() + 2;
        if actual > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual,
                limit: self.max_len,
            });
        }
        dst.reserve(actual);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        self.encode(line.as_str(), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut LineCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn splits_crlf_and_lf() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :a\r\nPING :b\nPING :c\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), ["PING :a", "PING :b", "PING :c"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_line_waits_for_more() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"server1\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("PING :server1"));
    }

    #[test]
    fn empty_lines_are_skipped() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("\r\n\nPING :x\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), ["PING :x"]);
    }

    #[test]
    fn overlong_line_is_discarded_and_stream_continues() {
        let mut codec = LineCodec::with_max_len(16);
        let mut buf = BytesMut::from("this line is far too long\r\nPING :ok\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), ["PING :ok"]);
    }

    #[test]
    fn overlong_partial_line_is_discarded_across_reads() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::from("0123456789");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
        buf.extend_from_slice(b"abc\r\nPING\r\n");
        assert_eq!(decode_all(&mut codec, &mut buf), ["PING"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #a :caf\xe9\r\n"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap().as_deref(),
            Some("PRIVMSG #a :caf\u{FFFD}")
        );
    }

    #[test]
    fn unterminated_tail_at_eof_is_dropped() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :a\r\nPIN");
        assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("PING :a"));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn encode_appends_crlf_and_cuts_injection() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec.encode("PRIVMSG #a :hi\r\nQUIT", &mut buf).unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #a :hi\r\n");
    }

    #[test]
    fn encode_rejects_overlong() {
        let mut codec = LineCodec::with_max_len(8);
        let mut buf = BytesMut::new();
        let err = codec.encode("PRIVMSG #a :x", &mut buf).unwrap_err();
        assert!(matches!(err, ProtocolError::LineTooLong { actual: 15, limit: 8 }));
        assert!(buf.is_empty());
    }
}
