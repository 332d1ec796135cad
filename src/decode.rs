//! The decode pipeline: format and version recovery, unmasking, module
//! reading, deinterleaving, block correction, and data extraction.
//!
//! Failures are carried in the outcome rather than aborting: whatever
//! data survives correction is still extracted and reported alongside
//! the diagnosis.

use tracing::debug;

use crate::bits::bits_to_codewords;
use crate::bits::segments;
use crate::ecc::{bch, correct_blocks, BlockPlan};
use crate::error::DecodeError;
use crate::matrix::{layout, mask, zigzag, FunctionMatrix};
use crate::models::{
    ECLevel, FormatCopy, FormatInfo, MaskPattern, Module, Segment, TriMatrix, TriStateSymbol,
    Version, VersionInfo,
};

/// Everything the decoder could recover from one symbol.
#[derive(Debug, Clone)]
pub struct DecodeOutcome {
    /// Concatenated text of all decoded segments (best effort).
    pub text: String,
    /// Decoded segments in stream order.
    pub segments: Vec<Segment>,
    /// Symbol version, once the dimension check passed.
    pub version: Option<Version>,
    /// Decoded format information, once extracted.
    pub format: Option<FormatInfo>,
    /// Decoded version information (versions 7 and up).
    pub version_info: Option<VersionInfo>,
    /// Codewords repaired across all blocks.
    pub corrected_errors: usize,
    /// True when every block verified clean after correction.
    pub recoverable: bool,
    /// Combined confidence, 0 to 1.
    pub confidence: f32,
    /// First hard fault encountered, if any.
    pub failure: Option<DecodeError>,
}

impl DecodeOutcome {
    /// True when decoding completed without a fault.
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    fn empty() -> Self {
        Self {
            text: String::new(),
            segments: Vec::new(),
            version: None,
            format: None,
            version_info: None,
            corrected_errors: 0,
            recoverable: false,
            confidence: 0.0,
            failure: None,
        }
    }

    fn fail(mut self, failure: DecodeError) -> Self {
        self.failure = Some(failure);
        self
    }
}

/// Decode a sampled symbol. The finder geometry in the input is trusted
/// as-is; only the module grid is interpreted.
pub fn decode(input: &TriStateSymbol) -> DecodeOutcome {
    let mut outcome = DecodeOutcome::empty();
    let size = input.matrix.size();
    debug!(size, pitch = input.module_pitch(), "decoding symbol");

    let version = match Version::from_size(size) {
        Ok(v) => v,
        Err(err) => return outcome.fail(err),
    };
    outcome.version = Some(version);

    let Some(format) = extract_format(&input.matrix) else {
        return outcome.fail(DecodeError::FormatUnreadable);
    };
    debug!(
        level = %format.ec_level.letter(),
        mask = format.mask_pattern.index(),
        errors = format.error_bits,
        "format recovered"
    );
    outcome.format = Some(format.clone());

    if version.has_version_info() {
        match extract_version(&input.matrix) {
            Some(info) if info.version == version.number() => {
                outcome.version_info = Some(info);
            }
            Some(info) => {
                return outcome.fail(DecodeError::VersionMismatch {
                    from_size: version.number(),
                    from_info: info.version,
                });
            }
            None => return outcome.fail(DecodeError::VersionUnreadable),
        }
    }

    let function = FunctionMatrix::build(version);
    let coords = zigzag::data_coordinates(&function.roles);
    let unknown_data = coords
        .iter()
        .filter(|&&(r, c)| input.matrix.get(r, c) == Module::Unknown)
        .count();

    let (mut grid, _) = input.matrix.to_bits();
    mask::apply(&mut grid, &function.roles, format.mask_pattern);

    let bits: Vec<bool> = coords.iter().map(|&(r, c)| grid.get(r, c)).collect();
    let codewords = bits_to_codewords(&bits);

    let plan = BlockPlan::lookup(version, format.ec_level);
    let blocks = plan.deinterleave(&codewords);
    let report = correct_blocks(&blocks);
    outcome.corrected_errors = report.total_errors;
    outcome.recoverable = report.recoverable();

    // Extraction runs even when correction failed; partial text is
    // better than none, and the failure tag tells the caller not to
    // trust it blindly.
    let extraction = segments::extract(&report.corrected_data, version);
    outcome.text = extraction.text;
    outcome.segments = extraction.segments;

    let version_confidence = outcome.version_info.map_or(1.0, |i| i.confidence);
    let known_ratio = if coords.is_empty() {
        0.0
    } else {
        1.0 - unknown_data as f32 / coords.len() as f32
    };
    outcome.confidence = (format.confidence
        * version_confidence
        * report.confidence
        * extraction.confidence
        * known_ratio)
        .clamp(0.0, 1.0);

    outcome.failure = if outcome.recoverable {
        extraction.failure
    } else {
        Some(DecodeError::Uncorrectable {
            failed: report.failed_blocks(),
            total: report.blocks.len(),
        })
    };
    outcome
}

/// Read both format copies, repair each, and keep the one that needed
/// fewer corrections. Ties go to the copy around the top-left finder.
fn extract_format(matrix: &TriMatrix) -> Option<FormatInfo> {
    let mut copies = [FormatCopy {
        raw_bits: 0,
        unknown_modules: 0,
        error_bits: None,
    }; 2];
    let mut best: Option<(u8, u16, u8)> = None;

    for location in 0..2u8 {
        let (raw, unknowns) = layout::read_format(matrix, location as usize);
        let mut copy = FormatCopy {
            raw_bits: raw,
            unknown_modules: unknowns,
            error_bits: None,
        };
        // A copy with most of its modules missing carries no signal.
        if unknowns <= 8 {
            let unmasked = raw ^ bch::FORMAT_MASK;
            if let Some((corrected, errors)) = bch::correct_format(unmasked) {
                copy.error_bits = Some(errors);
                if best.is_none_or(|(_, _, prev)| errors < prev) {
                    best = Some((location, corrected, errors));
                }
            }
        }
        copies[location as usize] = copy;
    }

    let (location, corrected, error_bits) = best?;
    let data = (corrected >> 10) as u8;
    Some(FormatInfo {
        ec_level: ECLevel::from_format_bits(data >> 3),
        mask_pattern: MaskPattern::from_index(data & 0b111),
        error_bits,
        confidence: bch::confidence(error_bits),
        location,
        copies,
    })
}

/// Read both version blocks and keep the better repair. Agreement of
/// both copies raises the confidence.
fn extract_version(matrix: &TriMatrix) -> Option<VersionInfo> {
    let mut repairs: [Option<(u32, u8)>; 2] = [None, None];
    for location in 0..2 {
        let (raw, unknowns) = layout::read_version(matrix, location);
        if unknowns > 6 {
            continue;
        }
        repairs[location] = bch::correct_version(raw);
    }

    let (word, error_bits) = match (repairs[0], repairs[1]) {
        (Some(a), Some(b)) => {
            if b.1 < a.1 {
                b
            } else {
                a
            }
        }
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => return None,
    };

    let version = (word >> 12) as u8;
    let mut confidence = bch::confidence(error_bits);
    if let (Some(a), Some(b)) = (repairs[0], repairs[1]) {
        if a.0 == b.0 {
            confidence =
                ((bch::confidence(a.1) + bch::confidence(b.1)) / 1.5).min(1.0);
        }
    }
    Some(VersionInfo {
        version,
        error_bits,
        confidence,
    })
}
