//! Symbol matrix construction: function patterns, format/version bit
//! layout, masking, and the zigzag data traversal.

pub mod builder;
pub mod layout;
pub mod mask;
pub mod zigzag;

pub use builder::{alignment_centers, FunctionMatrix};
pub use mask::PenaltyScore;
