//! Per-mode payload encoders and decoders.
//!
//! Numeric packs three digits into 10 bits, alphanumeric packs two
//! characters of its 45-symbol table into 11 bits, byte emits raw octets.
//! Kanji is decoded to its raw Shift-JIS byte pairs; charset mapping is
//! out of scope.

use crate::error::{DecodeError, EncodeError};

use super::stream::{BitReader, BitWriter};

/// The alphanumeric table in value order, 0 to 44.
pub const ALPHANUMERIC_CHARSET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// Value of `c` in the alphanumeric table, if it has one.
pub fn alphanumeric_value(c: char) -> Option<u32> {
    ALPHANUMERIC_CHARSET
        .iter()
        .position(|&t| t as char == c)
        .map(|v| v as u32)
}

/// Encode a digit string: groups of three digits in 10 bits, then a
/// 2-digit remainder in 7 bits or a 1-digit remainder in 4 bits.
pub fn encode_numeric(text: &str, writer: &mut BitWriter) -> Result<(), EncodeError> {
    let digits: Vec<u32> = text
        .chars()
        .map(|c| {
            c.to_digit(10).ok_or(EncodeError::UnencodableCharacter {
                character: c,
                mode: "numeric",
            })
        })
        .collect::<Result<_, _>>()?;

    for group in digits.chunks(3) {
        let value = group.iter().fold(0u32, |acc, &d| acc * 10 + d);
        let bits = match group.len() {
            3 => 10,
            2 => 7,
            _ => 4,
        };
        writer.push_bits(value, bits);
    }
    Ok(())
}

/// Encode alphanumeric text: pairs in 11 bits (45*first + second), a
/// final single character in 6 bits.
pub fn encode_alphanumeric(text: &str, writer: &mut BitWriter) -> Result<(), EncodeError> {
    let values: Vec<u32> = text
        .chars()
        .map(|c| {
            alphanumeric_value(c).ok_or(EncodeError::UnencodableCharacter {
                character: c,
                mode: "alphanumeric",
            })
        })
        .collect::<Result<_, _>>()?;

    for pair in values.chunks(2) {
        match pair {
            [a, b] => writer.push_bits(a * 45 + b, 11),
            [a] => writer.push_bits(*a, 6),
            _ => unreachable!(),
        }
    }
    Ok(())
}

/// Encode text as its UTF-8 bytes, 8 bits each.
pub fn encode_byte(text: &str, writer: &mut BitWriter) {
    for &byte in text.as_bytes() {
        writer.push_bits(byte as u32, 8);
    }
}

/// Decode `count` digits.
pub fn decode_numeric(reader: &mut BitReader<'_>, count: usize) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(count);
    let mut left = count;
    while left > 0 {
        let (digits, bits, max) = match left {
            1 => (1, 4, 9),
            2 => (2, 7, 99),
            _ => (3, 10, 999),
        };
        let value = reader
            .read_bits(bits)
            .ok_or(DecodeError::ExhaustedBits {
                stage: "numeric payload",
                needed: bits,
                available: reader.remaining(),
            })?;
        if value > max {
            return Err(DecodeError::MalformedSegment {
                mode: "numeric",
                reason: "digit group out of range",
            });
        }
        match digits {
            3 => out.push_str(&format!("{value:03}")),
            2 => out.push_str(&format!("{value:02}")),
            _ => out.push_str(&format!("{value}")),
        }
        left -= digits;
    }
    Ok(out)
}

/// Decode `count` alphanumeric characters.
pub fn decode_alphanumeric(
    reader: &mut BitReader<'_>,
    count: usize,
) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(count);
    let mut left = count;
    while left > 0 {
        if left >= 2 {
            let value = reader
                .read_bits(11)
                .ok_or(DecodeError::ExhaustedBits {
                    stage: "alphanumeric payload",
                    needed: 11,
                    available: reader.remaining(),
                })?;
            if value >= 45 * 45 {
                return Err(DecodeError::MalformedSegment {
                    mode: "alphanumeric",
                    reason: "pair value out of range",
                });
            }
            out.push(ALPHANUMERIC_CHARSET[(value / 45) as usize] as char);
            out.push(ALPHANUMERIC_CHARSET[(value % 45) as usize] as char);
            left -= 2;
        } else {
            let value = reader
                .read_bits(6)
                .ok_or(DecodeError::ExhaustedBits {
                    stage: "alphanumeric payload",
                    needed: 6,
                    available: reader.remaining(),
                })?;
            if value >= 45 {
                return Err(DecodeError::MalformedSegment {
                    mode: "alphanumeric",
                    reason: "final value out of range",
                });
            }
            out.push(ALPHANUMERIC_CHARSET[value as usize] as char);
            left -= 1;
        }
    }
    Ok(out)
}

/// Decode `count` bytes, interpreted as UTF-8 with an ISO-8859-1
/// fallback for streams that do not validate.
pub fn decode_byte(reader: &mut BitReader<'_>, count: usize) -> Result<String, DecodeError> {
    let mut bytes = Vec::with_capacity(count);
    for _ in 0..count {
        let value = reader
            .read_bits(8)
            .ok_or(DecodeError::ExhaustedBits {
                stage: "byte payload",
                needed: 8,
                available: reader.remaining(),
            })?;
        bytes.push(value as u8);
    }
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|err| err.into_bytes().iter().map(|&b| b as char).collect()))
}

/// Decode `count` Kanji characters as their reassembled Shift-JIS byte
/// pairs, emitted verbatim as Latin-1 characters.
pub fn decode_kanji(reader: &mut BitReader<'_>, count: usize) -> Result<String, DecodeError> {
    let mut out = String::with_capacity(count * 2);
    for _ in 0..count {
        let value = reader
            .read_bits(13)
            .ok_or(DecodeError::ExhaustedBits {
                stage: "kanji payload",
                needed: 13,
                available: reader.remaining(),
            })?;
        let assembled = ((value / 0xC0) << 8) | (value % 0xC0);
        let sjis = if assembled < 0x1F00 {
            assembled + 0x8140
        } else {
            assembled + 0xC140
        };
        out.push(((sjis >> 8) as u8) as char);
        out.push((sjis as u8) as char);
    }
    Ok(out)
}
