//! Error types for every fallible stage of the codec.
//!
//! Nothing in this crate panics on malformed input; each pipeline stage
//! returns one of these enums (or carries it inside a `DecodeOutcome`).

use thiserror::Error;

/// Arithmetic misuse inside GF(256). These indicate a caller bug, not bad
/// symbol data, but they are surfaced as values rather than panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GfError {
    /// Division by the additive identity.
    #[error("division by zero in GF(256)")]
    DivisionByZero,
    /// Discrete logarithm of zero, which is undefined.
    #[error("logarithm of zero in GF(256)")]
    LogOfZero,
}

/// Failure of Reed-Solomon correction on a single codeword block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RsError {
    /// More errors located than the block's redundancy can repair.
    #[error("{detected} errors detected but only {max_correctable} correctable")]
    ExceedsCapacity {
        /// Number of error positions the locator polynomial found.
        detected: usize,
        /// floor(ec_codewords / 2) for this block.
        max_correctable: usize,
    },
    /// The locator polynomial degree disagrees with the root count, which
    /// means the error pattern is outside the decoder's reach.
    #[error("error locator has degree {degree} but {found} roots in range")]
    LocatorMismatch {
        /// Degree of the error locator polynomial.
        degree: usize,
        /// Number of in-range roots the Chien search found.
        found: usize,
    },
    /// The formal derivative of the locator vanished at an error location.
    #[error("error locator derivative is zero at position {position}")]
    DerivativeZero {
        /// Array index of the offending codeword.
        position: usize,
    },
    /// Syndromes were still non-zero after applying the corrections.
    #[error("syndromes non-zero after correction")]
    VerificationFailed,
    /// Field arithmetic misuse bubbled up from GF(256).
    #[error(transparent)]
    Gf(#[from] GfError),
}

/// Failure to encode a payload into a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The encoded bit stream does not fit the symbol's data capacity.
    #[error(
        "payload needs {needed} bits but version {version} level {level} holds {capacity}"
    )]
    CapacityExceeded {
        /// Bits required by the segment (indicator + count + payload).
        needed: usize,
        /// Data capacity in bits at the chosen version and level.
        capacity: usize,
        /// Symbol version number, 1 to 40.
        version: u8,
        /// Error correction level letter.
        level: char,
    },
    /// No version from 1 to 40 can hold the payload at the requested level.
    #[error("payload of {needed} bits fits no version at level {level}")]
    NoFittingVersion {
        /// Bits required at version 40 (the widest count field).
        needed: usize,
        /// Error correction level letter.
        level: char,
    },
    /// A character is not representable in the pinned encoding mode.
    #[error("character {character:?} is not valid in {mode} mode")]
    UnencodableCharacter {
        /// The offending character.
        character: char,
        /// Name of the pinned mode.
        mode: &'static str,
    },
    /// Version number outside 1 to 40.
    #[error("version {0} is outside 1..=40")]
    InvalidVersion(u8),
}

/// Failure inside the decode pipeline. Carried in `DecodeOutcome` so that
/// best-effort partial results survive alongside the diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Matrix side length is not 21 + 4k for k in 0..=39.
    #[error("matrix size {size} is not a valid symbol dimension")]
    InvalidDimension {
        /// Side length of the supplied matrix.
        size: usize,
    },
    /// Neither 15-bit format copy survived BCH correction.
    #[error("format information unreadable at both locations")]
    FormatUnreadable,
    /// Neither 18-bit version copy matched a published version word.
    #[error("version information unreadable at both locations")]
    VersionUnreadable,
    /// Version info decoded to a different version than the matrix size implies.
    #[error("version info says {from_info} but matrix size implies {from_size}")]
    VersionMismatch {
        /// Version derived from the matrix dimension.
        from_size: u8,
        /// Version carried by the corrected version word.
        from_info: u8,
    },
    /// A read ran past the end of the bit stream.
    #[error("{stage}: needed {needed} bits but only {available} remain")]
    ExhaustedBits {
        /// Pipeline stage or segment kind that was reading.
        stage: &'static str,
        /// Bits the read required.
        needed: usize,
        /// Bits that were actually left.
        available: usize,
    },
    /// A mode indicator outside the recognized set.
    #[error("unknown mode indicator {value:#06b}")]
    UnknownMode {
        /// The 4-bit indicator value.
        value: u8,
    },
    /// A segment payload held a value outside its mode's legal range.
    #[error("malformed {mode} segment: {reason}")]
    MalformedSegment {
        /// Name of the segment's mode.
        mode: &'static str,
        /// What was out of range.
        reason: &'static str,
    },
    /// One or more blocks failed Reed-Solomon correction.
    #[error("error correction failed in {failed} of {total} blocks")]
    Uncorrectable {
        /// Number of blocks whose correction failed.
        failed: usize,
        /// Total block count for this symbol.
        total: usize,
    },
}
