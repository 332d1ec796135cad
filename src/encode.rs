//! The encode pipeline: payload analysis, segment encoding, error
//! correction, interleaving, module placement, masking, and the format
//! and version information.

use tracing::debug;

use crate::bits::segments;
use crate::bits::{bits_to_codewords, codewords_to_bits};
use crate::ecc::{bch, rs_encoder, BlockPlan};
use crate::error::EncodeError;
use crate::matrix::{layout, mask, zigzag, FunctionMatrix};
use crate::models::{ECLevel, EncodedSymbol, MaskPattern, Mode, Version};

/// Knobs for [`encode`]. Anything left unset is chosen automatically.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Error correction level; defaults to M.
    pub ec_level: Option<ECLevel>,
    /// Pin a version instead of picking the smallest that fits.
    pub version: Option<Version>,
    /// Pin a mask pattern instead of penalty-based selection.
    pub mask: Option<MaskPattern>,
    /// Pin an encoding mode instead of analyzing the payload.
    pub mode: Option<Mode>,
}

/// Pick the densest mode that can represent every character.
pub fn select_mode(text: &str) -> Mode {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        Mode::Numeric
    } else if !text.is_empty()
        && text
            .chars()
            .all(|c| crate::bits::modes::alphanumeric_value(c).is_some())
    {
        Mode::Alphanumeric
    } else {
        Mode::Byte
    }
}

/// Smallest version whose data capacity holds the payload at `level`.
pub fn select_version(text: &str, mode: Mode, level: ECLevel) -> Result<Version, EncodeError> {
    let length = payload_length(text, mode);
    for number in 1..=40u8 {
        let version = Version::new(number)?;
        let capacity = BlockPlan::lookup(version, level).data_codewords * 8;
        if segments::segment_bit_len(mode, length, version) <= capacity {
            return Ok(version);
        }
    }
    Err(EncodeError::NoFittingVersion {
        needed: segments::segment_bit_len(mode, length, Version::MAX),
        level: level.letter(),
    })
}

fn payload_length(text: &str, mode: Mode) -> usize {
    match mode {
        Mode::Byte => text.len(),
        _ => text.chars().count(),
    }
}

/// Encode `text` into a complete symbol matrix.
pub fn encode(text: &str, options: &EncodeOptions) -> Result<EncodedSymbol, EncodeError> {
    let ec_level = options.ec_level.unwrap_or(ECLevel::M);
    let mode = options.mode.unwrap_or_else(|| select_mode(text));
    let version = match options.version {
        Some(v) => v,
        None => select_version(text, mode, ec_level)?,
    };
    debug!(
        version = version.number(),
        level = %ec_level.letter(),
        mode = mode.name(),
        "encoding"
    );

    let plan = BlockPlan::lookup(version, ec_level);
    let capacity_bits = plan.data_codewords * 8;
    let payload = segments::encode_segment(text, mode, version)?;
    if payload.len() > capacity_bits {
        return Err(EncodeError::CapacityExceeded {
            needed: payload.len(),
            capacity: capacity_bits,
            version: version.number(),
            level: ec_level.letter(),
        });
    }

    let data_codewords = bits_to_codewords(&segments::finalize(payload, capacity_bits));
    let data_blocks = plan.split_data(&data_codewords);
    let ec_blocks: Vec<Vec<u8>> = data_blocks
        .iter()
        .map(|block| rs_encoder::encode(block, plan.ec_per_block))
        .collect();
    let interleaved = plan.interleave(&data_blocks, &ec_blocks);

    let function = FunctionMatrix::build(version);
    let coords = zigzag::data_coordinates(&function.roles);
    let mut stream = codewords_to_bits(&interleaved);
    // Remainder bits fill the last few data modules with zeros.
    stream.resize(coords.len(), false);

    let mut grid = function.modules.clone();
    for (&(row, col), &bit) in coords.iter().zip(&stream) {
        grid.set(row, col, bit);
    }

    let mask_pattern = match options.mask {
        Some(pattern) => pattern,
        None => {
            let (pattern, score) = mask::select(&grid, &function.roles);
            debug!(pattern = pattern.index(), penalty = score.total(), "mask selected");
            pattern
        }
    };
    mask::apply(&mut grid, &function.roles, mask_pattern);

    layout::write_format(&mut grid, bch::encode_format(ec_level, mask_pattern));
    if version.has_version_info() {
        layout::write_version(&mut grid, bch::encode_version(version.number()));
    }

    Ok(EncodedSymbol {
        modules: grid,
        version,
        ec_level,
        mask_pattern,
    })
}
