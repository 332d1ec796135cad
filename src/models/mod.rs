//! Core data structures shared by both pipelines.

mod matrix;
mod point;
mod symbol;

pub use matrix::{BitGrid, Module, ModuleRole, RoleGrid, TriMatrix};
pub use point::Point;
pub use symbol::{
    ECLevel, EncodedSymbol, FormatCopy, FormatInfo, MaskPattern, Mode, Segment, TriStateSymbol,
    Version, VersionInfo,
};
