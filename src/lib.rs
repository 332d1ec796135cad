//! qr-symbol - QR Code (ISO/IEC 18004 Model 2) symbol codec
//!
//! A pure Rust implementation of everything between text and the module
//! matrix: segment encoding, Reed-Solomon and BCH error correction,
//! block interleaving, function pattern placement, masking, and the
//! reverse path from a sampled tri-state matrix back to text. Pixel
//! handling (camera input, rendering) is out of scope; a detector hands
//! over a [`TriStateSymbol`] and rendering consumes an
//! [`EncodedSymbol`].
//!
//! ```
//! use qr_symbol::{decode, encode, EncodeOptions, TriStateSymbol};
//!
//! let symbol = encode("HELLO WORLD", &EncodeOptions::default()).unwrap();
//! let outcome = decode(&TriStateSymbol::from_encoded(&symbol));
//! assert_eq!(outcome.text, "HELLO WORLD");
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Bitstream codec: segments, modes, terminator and padding.
pub mod bits;
/// The decode pipeline.
pub mod decode;
/// Error correction: GF(256), Reed-Solomon, BCH, block geometry.
pub mod ecc;
/// The encode pipeline.
pub mod encode;
/// Error types.
pub mod error;
/// Module matrix construction, masking, and traversal.
pub mod matrix;
/// Core data structures.
pub mod models;

pub use decode::{decode, DecodeOutcome};
pub use encode::{encode, EncodeOptions};
pub use error::{DecodeError, EncodeError};
pub use models::{
    BitGrid, ECLevel, EncodedSymbol, MaskPattern, Mode, Module, Point, Segment, TriMatrix,
    TriStateSymbol, Version,
};
