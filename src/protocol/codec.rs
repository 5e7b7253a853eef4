//! Length-prefix and word/sentence encoding for the RouterOS API wire format.
//!
//! The length prefix is a big-endian variable-length integer whose first
//! byte's top bits announce the total prefix size (1 to 4 bytes, covering
//! `[0, 2^28)`). See the Mikrotik API protocol notes for the bit layout:
//! <https://wiki.mikrotik.com/wiki/Manual:API#Protocol>

use crate::error::ConnectionError;
use std::fmt::{self, Display, Formatter};

/// The character encoding a [`crate::Session`] uses for words on the wire.
///
/// ASCII is the protocol default; UTF-8 is permitted for routers configured
/// to accept it. The codec itself never picks one on its own — it is
/// supplied by the caller (via [`crate::login`] or a directly constructed
/// `Session`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// 7-bit ASCII. The protocol default.
    Ascii,
    /// UTF-8.
    Utf8,
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Ascii => write!(f, "ASCII"),
            Encoding::Utf8 => write!(f, "UTF-8"),
        }
    }
}

/// Largest length representable by the 4-byte prefix form (`2^28 - 1`).
pub const MAX_LENGTH: u32 = 0x0FFF_FFFF;

/// Encodes `length` as the canonical minimal-byte length prefix.
///
/// Fails with [`ConnectionError::LengthOverflow`] for `length >= 2^28`; the
/// protocol has no representation for longer words.
pub fn encode_length(length: u32) -> Result<Vec<u8>, ConnectionError> {
    let bytes = match length {
        0x0000_0000..=0x0000_007F => vec![length as u8],
        0x0000_0080..=0x0000_3FFF => {
            let v = length | 0x8000;
            vec![((v >> 8) & 0xFF) as u8, (v & 0xFF) as u8]
        }
        0x0000_4000..=0x001F_FFFF => {
            let v = length | 0x00C0_0000;
            vec![
                ((v >> 16) & 0xFF) as u8,
                ((v >> 8) & 0xFF) as u8,
                (v & 0xFF) as u8,
            ]
        }
        0x0020_0000..=MAX_LENGTH => {
            let v = length | 0xE000_0000;
            vec![
                ((v >> 24) & 0xFF) as u8,
                ((v >> 16) & 0xFF) as u8,
                ((v >> 8) & 0xFF) as u8,
                (v & 0xFF) as u8,
            ]
        }
        _ => {
            return Err(ConnectionError::LengthOverflow {
                length: length as u64,
            });
        }
    };
    Ok(bytes)
}

/// Given a complete 1-4 byte length prefix, decodes the length it encodes.
///
/// Any other slice length is a protocol error — the caller is expected to
/// have already read exactly `1 + determine_length(first_byte)` bytes.
pub fn decode_bytes(bytes: &[u8]) -> Result<u32, ConnectionError> {
    let (mask, pad): (u32, usize) = match bytes.len() {
        1 => (0x0000_0000, 3),
        2 => (0x0000_8000, 2),
        3 => (0x00C0_0000, 1),
        4 => (0xE000_0000, 0),
        _ => return Err(ConnectionError::UnknownControlByte(bytes.first().copied().unwrap_or(0))),
    };
    let mut padded = [0u8; 4];
    padded[pad..].copy_from_slice(bytes);
    let raw = u32::from_be_bytes(padded);
    Ok(raw ^ mask)
}

/// Given the first byte of a length prefix, returns how many *additional*
/// bytes must be read to complete it.
///
/// Fails with [`ConnectionError::UnknownControlByte`] for `first_byte >=
/// 240` — the protocol defines no prefix longer than 4 bytes.
pub fn determine_length(first_byte: u8) -> Result<usize, ConnectionError> {
    match first_byte {
        0..=127 => Ok(0),
        128..=191 => Ok(1),
        192..=223 => Ok(2),
        224..=239 => Ok(3),
        other => Err(ConnectionError::UnknownControlByte(other)),
    }
}

/// Encodes a single word: its length prefix, followed by its bytes under
/// `encoding`.
pub fn encode_word(encoding: Encoding, word: &str) -> Result<Vec<u8>, ConnectionError> {
    if encoding == Encoding::Ascii && !word.is_ascii() {
        return Err(ConnectionError::Encoding { encoding });
    }
    let mut out = encode_length(word.len() as u32)?;
    out.extend_from_slice(word.as_bytes());
    Ok(out)
}

/// Encodes a full sentence: every word in `words` (the first of which is
/// conventionally the command or reply word), terminated by the
/// zero-length end-of-sentence word.
pub fn encode_sentence(encoding: Encoding, words: &[&str]) -> Result<Vec<u8>, ConnectionError> {
    let mut out = Vec::new();
    for word in words {
        out.extend(encode_word(encoding, word)?);
    }
    out.push(0x00);
    Ok(out)
}

/// Decodes a complete, already-buffered sentence (without its terminating
/// zero-length word, which the caller is assumed to have stripped).
///
/// This is an offline helper for tests and for callers working from a raw
/// packet capture; decoding performed against a live connection is always
/// streamed word-by-word through [`crate::framing::Framing`], since the
/// total length of an inbound sentence is not known in advance.
pub fn decode_sentence(encoding: Encoding, sentence: &[u8]) -> Result<Vec<String>, ConnectionError> {
    let mut words = Vec::new();
    let mut pos = 0;
    while pos < sentence.len() {
        let extra = determine_length(sentence[pos])?;
        let prefix_end = pos + 1 + extra;
        let length = decode_bytes(&sentence[pos..prefix_end])? as usize;
        let word_end = prefix_end + length;
        let raw = &sentence[prefix_end..word_end];
        words.push(decode_word(encoding, raw)?);
        pos = word_end;
    }
    Ok(words)
}

/// Decodes a single word's raw bytes under `encoding`.
pub fn decode_word(encoding: Encoding, raw: &[u8]) -> Result<String, ConnectionError> {
    match encoding {
        Encoding::Ascii => {
            if !raw.is_ascii() {
                return Err(ConnectionError::Decoding { encoding });
            }
            Ok(String::from_utf8(raw.to_vec()).expect("ASCII bytes are always valid UTF-8"))
        }
        Encoding::Utf8 => {
            String::from_utf8(raw.to_vec()).map_err(|_| ConnectionError::Decoding { encoding })
        }
    }
}
