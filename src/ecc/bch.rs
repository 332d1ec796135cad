//! BCH codes protecting the format and version information.
//!
//! Format info is BCH(15,5): 5 data bits (EC level + mask reference) plus
//! 10 check bits, XORed with 0x5412 before placement. Version info is
//! BCH(18,6): 6 data bits (the version number) plus 12 check bits, not
//! masked. Both codes have minimum distance high enough to repair up to
//! 3 bit errors, which is done by brute-force flip search over the short
//! words.

use crate::models::{ECLevel, MaskPattern};

/// Generator polynomial of the (15,5) format code.
pub const FORMAT_GENERATOR: u32 = 0x537;
/// Mask XORed onto the format word so it is never all zero.
pub const FORMAT_MASK: u16 = 0x5412;
/// Generator polynomial of the (18,6) version code.
pub const VERSION_GENERATOR: u32 = 0x1F25;

/// Polynomial remainder of `value` modulo `generator` over GF(2).
fn residue(value: u32, generator: u32) -> u32 {
    let generator_bits = 32 - generator.leading_zeros();
    let mut v = value;
    while v != 0 && 32 - v.leading_zeros() >= generator_bits {
        let shift = (32 - v.leading_zeros()) - generator_bits;
        v ^= generator << shift;
    }
    v
}

/// Build the masked 15-bit format word for a level and mask pattern.
pub fn encode_format(ec_level: ECLevel, mask: MaskPattern) -> u16 {
    let data = ((ec_level.format_bits() as u32) << 3) | mask.index() as u32;
    let shifted = data << 10;
    let word = shifted | residue(shifted, FORMAT_GENERATOR);
    (word as u16) ^ FORMAT_MASK
}

/// Build the 18-bit version word for versions 7 to 40.
pub fn encode_version(version: u8) -> u32 {
    let shifted = (version as u32) << 12;
    shifted | residue(shifted, VERSION_GENERATOR)
}

/// Repair an unmasked 15-bit format word, trying up to 3 bit flips.
/// Returns the corrected word and the number of flips.
pub fn correct_format(word: u16) -> Option<(u16, u8)> {
    correct(word as u32, 15, FORMAT_GENERATOR).map(|(w, e)| (w as u16, e))
}

/// Repair an 18-bit version word, trying up to 3 bit flips. The repaired
/// word must carry a version number in 7..=40.
pub fn correct_version(word: u32) -> Option<(u32, u8)> {
    let (corrected, errors) = correct(word, 18, VERSION_GENERATOR)?;
    let version = corrected >> 12;
    if (7..=40).contains(&version) {
        Some((corrected, errors))
    } else {
        None
    }
}

/// Confidence assigned to a word repaired with `error_bits` flips.
pub fn confidence(error_bits: u8) -> f32 {
    (1.0 - 0.25 * error_bits as f32).max(0.0)
}

fn correct(word: u32, bits: u32, generator: u32) -> Option<(u32, u8)> {
    if residue(word, generator) == 0 {
        return Some((word, 0));
    }
    for i in 0..bits {
        let test = word ^ (1 << i);
        if residue(test, generator) == 0 {
            return Some((test, 1));
        }
    }
    for i in 0..bits {
        for j in (i + 1)..bits {
            let test = word ^ (1 << i) ^ (1 << j);
            if residue(test, generator) == 0 {
                return Some((test, 2));
            }
        }
    }
    for i in 0..bits {
        for j in (i + 1)..bits {
            for k in (j + 1)..bits {
                let test = word ^ (1 << i) ^ (1 << j) ^ (1 << k);
                if residue(test, generator) == 0 {
                    return Some((test, 3));
                }
            }
        }
    }
    None
}
