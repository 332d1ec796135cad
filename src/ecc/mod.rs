//! Error correction: GF(256) arithmetic, Reed-Solomon encode/decode,
//! the BCH codes protecting format and version info, and codeword block
//! geometry.

pub mod bch;
pub mod blocks;
pub mod gf256;
pub mod poly;
pub mod rs_decoder;
pub mod rs_encoder;

pub use blocks::{BlockPlan, CodewordBlock};
pub use rs_decoder::{correct_blocks, CorrectionReport, ReedSolomonDecoder};
