//! Bitstream codec: bit cursors, per-mode payload packing, and
//! segment/terminator/padding structure.

pub mod modes;
pub mod segments;
pub mod stream;

pub use segments::{ExtractedData, PaddingInfo};
pub use stream::{bits_to_codewords, codewords_to_bits, BitReader, BitWriter};
