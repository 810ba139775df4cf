//! Text encodings for process streams.
//!
//! Labels are resolved with `encoding_rs` (WHATWG labels), falling back to a
//! handful of common codec spellings such as `latin-1` or `utf_8_sig`.

use std::fmt;
use std::str::FromStr;

use encoding_rs::{DecoderResult, EncoderResult, UTF_8, UTF_16BE, UTF_16LE};

use crate::error::{Error, Result};

/// Encoding used to turn process stream bytes into text and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoding(&'static encoding_rs::Encoding);

impl Encoding {
    pub fn utf8() -> Self {
        Encoding(UTF_8)
    }

    /// Resolve `label` case-insensitively; `_` and `-` are interchangeable.
    pub fn for_label(label: &str) -> Result<Self> {
        let key = label.trim().to_ascii_lowercase().replace('_', "-");
        let alias = match key.as_str() {
            "u8" | "utf" | "utf-8-sig" | "utf8-sig" | "cp65001" => Some("utf-8"),
            "latin-1" | "iso8859-1" | "8859" | "cp819" => Some("iso-8859-1"),
            "646" => Some("us-ascii"),
            "utf-16-le" => Some("utf-16le"),
            "utf-16-be" => Some("utf-16be"),
            _ => None,
        };
        [label.trim(), alias.unwrap_or(key.as_str())]
            .into_iter()
            .find_map(|candidate| {
                encoding_rs::Encoding::for_label_no_replacement(candidate.as_bytes())
            })
            .map(Encoding)
            .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
    }

    /// Canonical WHATWG name, e.g. `UTF-8` or `windows-1252`.
    pub fn name(self) -> &'static str {
        self.0.name()
    }

    /// Decode `bytes` read from `stream`. A leading byte order mark is dropped.
    pub fn decode(self, stream: &'static str, bytes: &[u8]) -> Result<String> {
        let mut decoder = self.0.new_decoder_with_bom_removal();
        let capacity = decoder
            .max_utf8_buffer_length_without_replacement(bytes.len())
            .ok_or_else(|| self.codec_error(stream, 0))?;
        let mut text = String::with_capacity(capacity);
        let (result, read) =
            decoder.decode_to_string_without_replacement(bytes, &mut text, true);
        match result {
            DecoderResult::InputEmpty => Ok(text),
            DecoderResult::Malformed(bad, after) => {
                let offset = read.saturating_sub(usize::from(bad) + usize::from(after));
                Err(self.codec_error(stream, offset))
            }
            DecoderResult::OutputFull => Err(self.codec_error(stream, read)),
        }
    }

    /// Encode `text` for writing to `stream`.
    pub fn encode(self, stream: &'static str, text: &str) -> Result<Vec<u8>> {
        // encoding_rs only encodes UTF-16 as UTF-8.
        if self.0 == UTF_16LE {
            return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
        }
        if self.0 == UTF_16BE {
            return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
        }
        let mut encoder = self.0.new_encoder();
        let capacity = encoder
            .max_buffer_length_from_utf8_without_replacement(text.len())
            .ok_or_else(|| self.codec_error(stream, 0))?;
        let mut out = Vec::with_capacity(capacity);
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(text, &mut out, true);
        match result {
            EncoderResult::InputEmpty => Ok(out),
            EncoderResult::Unmappable(ch) => {
                Err(self.codec_error(stream, read.saturating_sub(ch.len_utf8())))
            }
            EncoderResult::OutputFull => Err(self.codec_error(stream, read)),
        }
    }

    fn codec_error(self, stream: &'static str, offset: usize) -> Error {
        Error::Codec {
            stream,
            encoding: self.name(),
            offset,
        }
    }
}

impl FromStr for Encoding {
    type Err = Error;

    fn from_str(label: &str) -> Result<Self> {
        Encoding::for_label(label)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn named(label: &str) -> &'static str {
        Encoding::for_label(label).expect(label).name()
    }

    #[test]
    fn resolves_whatwg_labels_and_codec_spellings() {
        assert_eq!(named("UTF-8"), "UTF-8");
        assert_eq!(named("utf_8"), "UTF-8");
        assert_eq!(named("utf-8-sig"), "UTF-8");
        assert_eq!(named("utf-16"), "UTF-16LE");
        assert_eq!(named("utf_16_be"), "UTF-16BE");
        assert_eq!(named("cp1252"), "windows-1252");
        assert_eq!(named("latin-1"), "windows-1252");
        assert_eq!(named("iso-8859-15"), "ISO-8859-15");
        assert_eq!(named("iso_8859-1:1987"), "windows-1252");
        assert_eq!(named("EUC-JP"), "EUC-JP");
        assert_eq!(named("shift_jis"), "Shift_JIS");
    }

    #[test]
    fn rejects_unknown_and_replacement_labels() {
        for label in ["klingon", "", "iso-2022-kr"] {
            let err = Encoding::for_label(label).expect_err(label);
            assert_eq!(err.kind(), ErrorKind::Value);
        }
        assert!("ebcdic".parse::<Encoding>().is_err());
    }

    #[test]
    fn utf8_reports_offset_of_invalid_byte() {
        let err = Encoding::utf8()
            .decode("stdout", b"ok\xff")
            .expect_err("invalid");
        assert_eq!(err.to_string(), "stdout: data not representable in UTF-8 at byte 2");
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        let text = Encoding::utf8()
            .decode("stdout", b"\xef\xbb\xbfa")
            .expect("decode");
        assert_eq!(text, "a");
    }

    #[test]
    fn single_byte_round_trips_high_bytes() {
        let latin = Encoding::for_label("latin-1").expect("latin");
        let text = latin
            .decode("stdout", &[0x63, 0x61, 0x66, 0xe9])
            .expect("decode");
        assert_eq!(text, "café");
        assert_eq!(
            latin.encode("stdin", &text).expect("encode"),
            vec![0x63, 0x61, 0x66, 0xe9]
        );
    }

    #[test]
    fn multi_byte_round_trips() {
        for label in ["euc-jp", "shift_jis", "utf-16", "utf-16be"] {
            let encoding = Encoding::for_label(label).expect(label);
            let bytes = encoding.encode("stdin", "日本 ok").expect("encode");
            assert_eq!(encoding.decode("stdout", &bytes).expect("decode"), "日本 ok");
        }
        assert_eq!(
            Encoding::for_label("utf-16le")
                .expect("utf-16le")
                .encode("stdin", "hé")
                .expect("encode"),
            vec![0x68, 0x00, 0xe9, 0x00]
        );
    }

    #[test]
    fn unmappable_text_reports_offset() {
        let ascii = Encoding::for_label("ascii").expect("ascii");
        let err = ascii.encode("stdin", "ab日").expect_err("unmappable");
        assert!(matches!(err, Error::Codec { offset: 2, .. }));
        assert_eq!(ascii.encode("stdin", "plain").expect("ok"), b"plain");
    }
}
