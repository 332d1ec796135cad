//! Segment-level bitstream assembly and parsing: mode indicator, character
//! count, payload, terminator, and pad bytes.

use tracing::trace;

use crate::error::{DecodeError, EncodeError};
use crate::models::{Mode, Segment, Version};

use super::modes;
use super::stream::{codewords_to_bits, BitReader, BitWriter};

/// First pad byte of the alternating 11101100 00010001 fill.
pub const PAD_BYTES: [u8; 2] = [0xEC, 0x11];

/// Bits a segment occupies: 4-bit indicator, the count field, and the
/// packed payload. `length` counts characters (bytes for Byte mode).
pub fn segment_bit_len(mode: Mode, length: usize, version: Version) -> usize {
    let payload = match mode {
        Mode::Numeric => 10 * (length / 3) + [0, 4, 7][length % 3],
        Mode::Alphanumeric => 11 * (length / 2) + 6 * (length % 2),
        Mode::Byte => 8 * length,
        Mode::Kanji => 13 * length,
        Mode::Eci => 0,
    };
    4 + mode.char_count_bits(version) + payload
}

/// Encode one segment: indicator, count, payload.
pub fn encode_segment(
    text: &str,
    mode: Mode,
    version: Version,
) -> Result<Vec<bool>, EncodeError> {
    let mut writer = BitWriter::new();
    writer.push_bits(mode.indicator() as u32, 4);

    let count = match mode {
        Mode::Byte => text.len(),
        _ => text.chars().count(),
    };
    writer.push_bits(count as u32, mode.char_count_bits(version));

    match mode {
        Mode::Numeric => modes::encode_numeric(text, &mut writer)?,
        Mode::Alphanumeric => modes::encode_alphanumeric(text, &mut writer)?,
        Mode::Byte => modes::encode_byte(text, &mut writer),
        Mode::Kanji | Mode::Eci => {
            return Err(EncodeError::UnencodableCharacter {
                character: text.chars().next().unwrap_or('?'),
                mode: mode.name(),
            });
        }
    }
    Ok(writer.into_bits())
}

/// Close the bitstream: up to 4 terminator zeros (clipped at capacity),
/// zero fill to the byte boundary, then alternating pad bytes up to
/// `capacity_bits`. The input must already fit.
pub fn finalize(mut bits: Vec<bool>, capacity_bits: usize) -> Vec<bool> {
    debug_assert!(bits.len() <= capacity_bits);
    debug_assert_eq!(capacity_bits % 8, 0);

    let terminator = (capacity_bits - bits.len()).min(4);
    bits.extend(std::iter::repeat_n(false, terminator));

    let boundary = (8 - bits.len() % 8) % 8;
    bits.extend(std::iter::repeat_n(false, boundary));

    let mut pad_index = 0;
    while bits.len() < capacity_bits {
        let pad = PAD_BYTES[pad_index % 2];
        for i in (0..8).rev() {
            bits.push((pad >> i) & 1 == 1);
        }
        pad_index += 1;
    }
    bits
}

/// Trailing-structure diagnostics gathered after the last data segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddingInfo {
    /// Zero bits of the terminator that were actually present (0 to 4).
    pub terminator_bits: usize,
    /// True when a terminator was seen or none was needed.
    pub terminator_present: bool,
    /// Zero bits consumed to reach the byte boundary.
    pub boundary_bits: usize,
    /// The trailing pad bytes as read.
    pub pad_bytes: Vec<u8>,
    /// True when boundary bits were zero and pad bytes alternate EC/11.
    pub conformant: bool,
}

/// Result of parsing the corrected data codewords.
#[derive(Debug, Clone)]
pub struct ExtractedData {
    /// Decoded segments in stream order.
    pub segments: Vec<Segment>,
    /// Concatenated text of all segments.
    pub text: String,
    /// Bits consumed by data segments (up to the terminator).
    pub bits_used: usize,
    /// Total bits in the data region.
    pub total_bits: usize,
    /// Trailing-structure diagnostics.
    pub padding: PaddingInfo,
    /// Structural confidence of the extraction, 0 to 1.
    pub confidence: f32,
    /// First malformation encountered, if any. Segments parsed before it
    /// are kept.
    pub failure: Option<DecodeError>,
}

/// Parse the data codeword stream into segments, stopping at the
/// terminator, and analyze the trailing padding.
pub fn extract(data_codewords: &[u8], version: Version) -> ExtractedData {
    let bits = codewords_to_bits(data_codewords);
    let mut reader = BitReader::new(&bits);
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut failure = None;
    let data_end;

    loop {
        let start = reader.position();
        if reader.remaining() < 4 {
            data_end = start;
            break;
        }
        let indicator = match reader.read_bits(4) {
            Some(v) => v as u8,
            None => {
                data_end = start;
                break;
            }
        };
        if indicator == 0 {
            // Terminator. Rewind so padding analysis sees its zeros.
            data_end = start;
            break;
        }
        let Some(mode) = Mode::from_indicator(indicator) else {
            failure = Some(DecodeError::UnknownMode { value: indicator });
            data_end = start;
            break;
        };

        if mode == Mode::Eci {
            match read_eci_designator(&mut reader) {
                Ok(designator) => {
                    trace!(designator, "skipping ECI designator");
                    continue;
                }
                Err(err) => {
                    failure = Some(err);
                    data_end = start;
                    break;
                }
            }
        }

        let count_bits = mode.char_count_bits(version);
        let count = match reader.read_bits(count_bits) {
            Some(v) => v as usize,
            None => {
                failure = Some(DecodeError::ExhaustedBits {
                    stage: "character count",
                    needed: count_bits,
                    available: reader.remaining(),
                });
                data_end = start;
                break;
            }
        };

        let decoded = match mode {
            Mode::Numeric => modes::decode_numeric(&mut reader, count),
            Mode::Alphanumeric => modes::decode_alphanumeric(&mut reader, count),
            Mode::Byte => modes::decode_byte(&mut reader, count),
            Mode::Kanji => modes::decode_kanji(&mut reader, count),
            Mode::Eci => unreachable!(),
        };
        match decoded {
            Ok(segment_text) => {
                text.push_str(&segment_text);
                segments.push(Segment {
                    mode,
                    character_count: count,
                    text: segment_text,
                });
            }
            Err(err) => {
                failure = Some(err);
                data_end = start;
                break;
            }
        }
    }

    let padding = analyze_padding(&bits, data_end);
    let confidence = extraction_confidence(&bits, data_end, &padding);
    ExtractedData {
        segments,
        text,
        bits_used: data_end,
        total_bits: bits.len(),
        padding,
        confidence,
        failure,
    }
}

/// ECI designators are 8, 16, or 24 bits wide depending on the leading
/// bit pattern of the first byte.
fn read_eci_designator(reader: &mut BitReader<'_>) -> Result<u32, DecodeError> {
    let exhausted = |needed: usize, available: usize| DecodeError::ExhaustedBits {
        stage: "eci designator",
        needed,
        available,
    };
    let first = reader
        .read_bits(8)
        .ok_or(exhausted(8, reader.remaining()))?;
    if first & 0x80 == 0 {
        Ok(first & 0x7F)
    } else if first & 0xC0 == 0x80 {
        let rest = reader
            .read_bits(8)
            .ok_or(exhausted(8, reader.remaining()))?;
        Ok(((first & 0x3F) << 8) | rest)
    } else if first & 0xE0 == 0xC0 {
        let rest = reader
            .read_bits(16)
            .ok_or(exhausted(16, reader.remaining()))?;
        Ok(((first & 0x1F) << 16) | rest)
    } else {
        Err(DecodeError::MalformedSegment {
            mode: "eci",
            reason: "invalid designator prefix",
        })
    }
}

fn analyze_padding(bits: &[bool], data_end: usize) -> PaddingInfo {
    let total = bits.len();
    let mut pos = data_end;

    let mut terminator_bits = 0;
    while pos < total && terminator_bits < 4 && !bits[pos] {
        terminator_bits += 1;
        pos += 1;
    }
    // A terminator may be clipped short, or absent entirely, when the
    // data fills the region exactly.
    let terminator_present = terminator_bits == 4
        || (pos == total && terminator_bits == total - data_end);

    let boundary = (8 - pos % 8) % 8;
    let boundary_bits = boundary.min(total - pos);
    let boundary_clean = bits[pos..pos + boundary_bits].iter().all(|&b| !b);
    pos += boundary_bits;

    let mut pad_bytes = Vec::new();
    let mut pads_clean = true;
    while pos + 8 <= total {
        let byte = bits[pos..pos + 8]
            .iter()
            .fold(0u8, |acc, &b| (acc << 1) | b as u8);
        if byte != PAD_BYTES[pad_bytes.len() % 2] {
            pads_clean = false;
        }
        pad_bytes.push(byte);
        pos += 8;
    }

    PaddingInfo {
        terminator_bits,
        terminator_present,
        boundary_bits,
        pad_bytes,
        conformant: boundary_clean && pads_clean,
    }
}

/// Structural confidence: how much of the region is accounted for by
/// well-formed structure (0.4), terminator presence (0.3), and pad
/// conformance (0.3). A clean symbol scores exactly 1.0.
fn extraction_confidence(bits: &[bool], data_end: usize, padding: &PaddingInfo) -> f32 {
    let total = bits.len();
    if total == 0 {
        return 0.0;
    }
    let mut accounted = data_end + padding.terminator_bits;
    if padding.conformant {
        accounted += padding.boundary_bits + 8 * padding.pad_bytes.len();
    }
    let structure = accounted as f32 / total as f32;

    let mut score = 0.4 * structure;
    if padding.terminator_present {
        score += 0.3;
    }
    if padding.conformant {
        score += 0.3;
    }
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::stream::bits_to_codewords;

    fn v(n: u8) -> Version {
        Version::new(n).unwrap()
    }

    fn bit_string(bits: &[bool]) -> String {
        bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
    }

    #[test]
    fn test_numeric_segment_reference() {
        let bits = encode_segment("123", Mode::Numeric, v(1)).unwrap();
        assert_eq!(bit_string(&bits), "0001" .to_owned() + "0000000011" + "0001111011");
    }

    #[test]
    fn test_byte_segment_reference() {
        let bits = encode_segment("Hello", Mode::Byte, v(1)).unwrap();
        assert!(bit_string(&bits).starts_with("0100" ));
        assert_eq!(&bit_string(&bits)[4..12], "00000101");
        assert_eq!(bits.len(), 4 + 8 + 40);
    }

    #[test]
    fn test_segment_bit_len_matches_encoding() {
        for (text, mode) in [
            ("123456", Mode::Numeric),
            ("1234567", Mode::Numeric),
            ("HELLO WORLD", Mode::Alphanumeric),
            ("Hello", Mode::Byte),
        ] {
            let bits = encode_segment(text, mode, v(10)).unwrap();
            assert_eq!(bits.len(), segment_bit_len(mode, text.len(), v(10)));
        }
    }

    #[test]
    fn test_finalize_pads_to_capacity() {
        // "123" at v1-M: 24 data bits, 128-bit capacity.
        let bits = encode_segment("123", Mode::Numeric, v(1)).unwrap();
        let full = finalize(bits, 128);
        assert_eq!(full.len(), 128);

        let codewords = bits_to_codewords(&full);
        // Terminator plus boundary fill zero the fourth codeword, then
        // the pads alternate.
        assert_eq!(
            codewords,
            vec![
                0x10, 0x0C, 0x7B, 0x00, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC,
                0x11, 0xEC, 0x11
            ]
        );
    }

    #[test]
    fn test_finalize_clips_terminator() {
        let bits = vec![true; 126];
        let full = finalize(bits, 128);
        assert_eq!(full.len(), 128);
        assert!(!full[126] && !full[127]);
    }

    #[test]
    fn test_extract_roundtrip() {
        let bits = encode_segment("HELLO WORLD", Mode::Alphanumeric, v(1)).unwrap();
        let codewords = bits_to_codewords(&finalize(bits, 16 * 8));

        let extracted = extract(&codewords, v(1));
        assert_eq!(extracted.text, "HELLO WORLD");
        assert_eq!(extracted.segments.len(), 1);
        assert_eq!(extracted.segments[0].mode, Mode::Alphanumeric);
        assert_eq!(extracted.segments[0].character_count, 11);
        assert!(extracted.failure.is_none());
        assert!(extracted.padding.terminator_present);
        assert!(extracted.padding.conformant);
        assert_eq!(extracted.confidence, 1.0);
    }

    #[test]
    fn test_extract_exact_fill_has_no_terminator() {
        // 14 bytes of byte-mode data fill a 16-codeword region to the brim.
        let text = "abcdefghijklmn";
        let bits = encode_segment(text, Mode::Byte, v(1)).unwrap();
        assert_eq!(bits.len(), 124);
        let codewords = bits_to_codewords(&finalize(bits, 128));

        let extracted = extract(&codewords, v(1));
        assert_eq!(extracted.text, text);
        // The terminator exactly consumes the last four bits.
        assert!(extracted.padding.terminator_present);
        assert_eq!(extracted.padding.terminator_bits, 4);
        assert!(extracted.padding.pad_bytes.is_empty());
        assert_eq!(extracted.confidence, 1.0);
    }

    #[test]
    fn test_extract_flags_unknown_mode() {
        // 1110 is not an assigned mode indicator.
        let mut codewords = vec![0b1110_0000u8];
        codewords.extend([0; 15]);
        let extracted = extract(&codewords, v(1));
        assert!(matches!(
            extracted.failure,
            Some(DecodeError::UnknownMode { value: 0b1110 })
        ));
        assert!(extracted.segments.is_empty());
    }

    #[test]
    fn test_extract_flags_bad_padding() {
        let bits = encode_segment("123", Mode::Numeric, v(1)).unwrap();
        let mut codewords = bits_to_codewords(&finalize(bits, 128));
        // Corrupt one pad byte.
        let last = codewords.len() - 1;
        codewords[last] = 0xAB;

        let extracted = extract(&codewords, v(1));
        assert_eq!(extracted.text, "123");
        assert!(!extracted.padding.conformant);
        assert!(extracted.confidence < 1.0);
    }

    #[test]
    fn test_extract_multi_segment() {
        let mut bits = encode_segment("123", Mode::Numeric, v(2)).unwrap();
        bits.extend(encode_segment("AC", Mode::Alphanumeric, v(2)).unwrap());
        // v2-M holds 28 data codewords.
        let codewords = bits_to_codewords(&finalize(bits, 28 * 8));

        let extracted = extract(&codewords, v(2));
        assert_eq!(extracted.text, "123AC");
        assert_eq!(extracted.segments.len(), 2);
        assert_eq!(extracted.confidence, 1.0);
    }

    #[test]
    fn test_eci_designator_is_skipped() {
        let mut writer = BitWriter::new();
        writer.push_bits(Mode::Eci.indicator() as u32, 4);
        writer.push_bits(26, 8); // UTF-8 designator, single byte form
        let mut bits = writer.into_bits();
        bits.extend(encode_segment("HI", Mode::Alphanumeric, v(1)).unwrap());
        let codewords = bits_to_codewords(&finalize(bits, 128));

        let extracted = extract(&codewords, v(1));
        assert_eq!(extracted.text, "HI");
        assert!(extracted.failure.is_none());
    }
}
