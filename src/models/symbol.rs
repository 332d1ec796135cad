use crate::error::{DecodeError, EncodeError};

use super::{BitGrid, Point, TriMatrix};

/// QR Code Model 2 version, 1 to 40.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(u8);

impl Version {
    /// Smallest symbol, 21x21 modules.
    pub const MIN: Version = Version(1);
    /// Largest symbol, 177x177 modules.
    pub const MAX: Version = Version(40);

    /// Validate a version number.
    pub fn new(number: u8) -> Result<Self, EncodeError> {
        if (1..=40).contains(&number) {
            Ok(Self(number))
        } else {
            Err(EncodeError::InvalidVersion(number))
        }
    }

    /// Derive the version from a matrix side length.
    pub fn from_size(size: usize) -> Result<Self, DecodeError> {
        if size >= 21 && size <= 177 && (size - 17) % 4 == 0 {
            Ok(Self(((size - 17) / 4) as u8))
        } else {
            Err(DecodeError::InvalidDimension { size })
        }
    }

    /// The version number, 1 to 40.
    pub fn number(&self) -> u8 {
        self.0
    }

    /// Side length in modules: 4*version + 17.
    pub fn size(&self) -> usize {
        4 * self.0 as usize + 17
    }

    /// Versions 7 and up carry the two 18-bit version info blocks.
    pub fn has_version_info(&self) -> bool {
        self.0 >= 7
    }
}

/// Error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ECLevel {
    /// Low (~7% recovery capacity)
    L,
    /// Medium (~15% recovery capacity)
    M,
    /// Quartile (~25% recovery capacity)
    Q,
    /// High (~30% recovery capacity)
    H,
}

impl ECLevel {
    /// Row index into the per-level capacity tables (L, M, Q, H order).
    pub fn table_index(&self) -> usize {
        match self {
            ECLevel::L => 0,
            ECLevel::M => 1,
            ECLevel::Q => 2,
            ECLevel::H => 3,
        }
    }

    /// The two-bit field carried in the format information. Note the
    /// standard's ordering: L=01, M=00, Q=11, H=10.
    pub fn format_bits(&self) -> u8 {
        match self {
            ECLevel::L => 0b01,
            ECLevel::M => 0b00,
            ECLevel::Q => 0b11,
            ECLevel::H => 0b10,
        }
    }

    /// Inverse of [`format_bits`](Self::format_bits).
    pub fn from_format_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b01 => ECLevel::L,
            0b00 => ECLevel::M,
            0b11 => ECLevel::Q,
            _ => ECLevel::H,
        }
    }

    /// Single-letter name for diagnostics.
    pub fn letter(&self) -> char {
        match self {
            ECLevel::L => 'L',
            ECLevel::M => 'M',
            ECLevel::Q => 'Q',
            ECLevel::H => 'H',
        }
    }
}

/// Mask pattern (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskPattern {
    /// (row + col) % 2 == 0
    Pattern0 = 0,
    /// row % 2 == 0
    Pattern1 = 1,
    /// col % 3 == 0
    Pattern2 = 2,
    /// (row + col) % 3 == 0
    Pattern3 = 3,
    /// (row/2 + col/3) % 2 == 0
    Pattern4 = 4,
    /// (row*col)%2 + (row*col)%3 == 0
    Pattern5 = 5,
    /// ((row*col)%2 + (row*col)%3) % 2 == 0
    Pattern6 = 6,
    /// ((row+col)%2 + (row*col)%3) % 2 == 0
    Pattern7 = 7,
}

impl MaskPattern {
    /// All eight patterns in reference order.
    pub const ALL: [MaskPattern; 8] = [
        MaskPattern::Pattern0,
        MaskPattern::Pattern1,
        MaskPattern::Pattern2,
        MaskPattern::Pattern3,
        MaskPattern::Pattern4,
        MaskPattern::Pattern5,
        MaskPattern::Pattern6,
        MaskPattern::Pattern7,
    ];

    /// Get mask pattern from its 3-bit reference.
    pub fn from_index(bits: u8) -> Self {
        Self::ALL[(bits & 0x07) as usize]
    }

    /// The 3-bit reference carried in the format information.
    pub fn index(&self) -> u8 {
        *self as u8
    }

    /// Check if the data module at (row, col) is toggled by this pattern.
    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        match self {
            MaskPattern::Pattern0 => (row + col) % 2 == 0,
            MaskPattern::Pattern1 => row % 2 == 0,
            MaskPattern::Pattern2 => col % 3 == 0,
            MaskPattern::Pattern3 => (row + col) % 3 == 0,
            MaskPattern::Pattern4 => (row / 2 + col / 3) % 2 == 0,
            MaskPattern::Pattern5 => ((row * col) % 2 + (row * col) % 3) == 0,
            MaskPattern::Pattern6 => (((row * col) % 2) + ((row * col) % 3)) % 2 == 0,
            MaskPattern::Pattern7 => (((row + col) % 2) + ((row * col) % 3)) % 2 == 0,
        }
    }
}

/// Data encoding mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Digits 0-9, packed three per 10 bits.
    Numeric,
    /// The 45-character table, packed two per 11 bits.
    Alphanumeric,
    /// Raw 8-bit bytes.
    Byte,
    /// Shift-JIS double-byte characters, 13 bits each.
    Kanji,
    /// Extended Channel Interpretation designator.
    Eci,
}

impl Mode {
    /// The 4-bit mode indicator.
    pub fn indicator(&self) -> u8 {
        match self {
            Mode::Numeric => 0b0001,
            Mode::Alphanumeric => 0b0010,
            Mode::Byte => 0b0100,
            Mode::Kanji => 0b1000,
            Mode::Eci => 0b0111,
        }
    }

    /// Inverse of [`indicator`](Self::indicator). Zero is the terminator
    /// and maps to `None` along with every unassigned value.
    pub fn from_indicator(bits: u8) -> Option<Self> {
        match bits {
            0b0001 => Some(Mode::Numeric),
            0b0010 => Some(Mode::Alphanumeric),
            0b0100 => Some(Mode::Byte),
            0b1000 => Some(Mode::Kanji),
            0b0111 => Some(Mode::Eci),
            _ => None,
        }
    }

    /// Width of the character count field for this mode at `version`.
    pub fn char_count_bits(&self, version: Version) -> usize {
        let band = match version.number() {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match self {
            Mode::Numeric => [10, 12, 14][band],
            Mode::Alphanumeric => [9, 11, 13][band],
            Mode::Byte => [8, 16, 16][band],
            Mode::Kanji => [8, 10, 12][band],
            Mode::Eci => 0,
        }
    }

    /// Mode name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Numeric => "numeric",
            Mode::Alphanumeric => "alphanumeric",
            Mode::Byte => "byte",
            Mode::Kanji => "kanji",
            Mode::Eci => "eci",
        }
    }
}

/// One decoded data segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Encoding mode of the segment.
    pub mode: Mode,
    /// Value of the character count field (byte count for Byte mode).
    pub character_count: usize,
    /// Decoded text of the segment.
    pub text: String,
}

/// One of the two redundant 15-bit format reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatCopy {
    /// Raw bits as read from the matrix, before unmasking.
    pub raw_bits: u16,
    /// Modules of this copy that sampled as unknown.
    pub unknown_modules: usize,
    /// Bit errors BCH correction repaired, if the copy was decodable.
    pub error_bits: Option<u8>,
}

/// Decoded format information.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatInfo {
    /// Error correction level of the symbol.
    pub ec_level: ECLevel,
    /// Mask pattern applied to the data region.
    pub mask_pattern: MaskPattern,
    /// Bit errors corrected in the winning copy.
    pub error_bits: u8,
    /// max(0, 1 - 0.25 * error_bits) for the winning copy.
    pub confidence: f32,
    /// Which copy won: 0 = around the top-left finder, 1 = the split copy.
    pub location: u8,
    /// Per-copy read diagnostics.
    pub copies: [FormatCopy; 2],
}

/// Decoded version information (symbols of version 7 and up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VersionInfo {
    /// Version number carried by the corrected 18-bit word.
    pub version: u8,
    /// Bit errors corrected in the winning copy.
    pub error_bits: u8,
    /// max(0, 1 - 0.25 * error_bits), boosted when both copies agree.
    pub confidence: f32,
}

/// A fully rendered symbol matrix with its encoding parameters.
#[derive(Debug, Clone)]
pub struct EncodedSymbol {
    /// The module grid, function patterns and format/version info included.
    pub modules: BitGrid,
    /// Symbol version.
    pub version: Version,
    /// Error correction level.
    pub ec_level: ECLevel,
    /// Mask pattern that was applied (chosen or caller-pinned).
    pub mask_pattern: MaskPattern,
}

/// Sampled symbol as handed over by a detector: a tri-state module grid
/// plus the three finder centers in image coordinates. The geometry is
/// carried through untouched; decoding never re-derives it.
#[derive(Debug, Clone)]
pub struct TriStateSymbol {
    /// Sampled module grid.
    pub matrix: TriMatrix,
    /// Finder centers: top-left, top-right, bottom-left.
    pub finder_centers: [Point; 3],
}

impl TriStateSymbol {
    /// Wrap an encoded symbol for decoding, with synthetic finder centers
    /// at the pattern midpoints.
    pub fn from_encoded(symbol: &EncodedSymbol) -> Self {
        let size = symbol.modules.size() as f32;
        Self {
            matrix: TriMatrix::from_bits(&symbol.modules),
            finder_centers: [
                Point::new(3.5, 3.5),
                Point::new(size - 3.5, 3.5),
                Point::new(3.5, size - 3.5),
            ],
        }
    }

    /// Estimated module pitch in image units: the top edge spans
    /// `size - 7` modules between the top-left and top-right finder
    /// centers.
    pub fn module_pitch(&self) -> f32 {
        let span = self.finder_centers[0].distance(&self.finder_centers[1]);
        span / (self.matrix.size().max(8) - 7) as f32
    }
}
