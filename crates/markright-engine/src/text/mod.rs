//! # Text Coordinates
//!
//! Line/character positions, line splitting and rope slicing shared by the
//! scanner, the document host and the view.
//!
//! All overlay state is expressed in [`SourcePosition`]s; byte offsets only
//! appear where text is actually edited.

pub mod lines;
pub mod position;
pub mod slice;

pub use lines::{rope_lines, split_lines, strip_cr};
pub use position::{
    SourcePosition, SourceRange, byte_offset, position_at, utf16_len, utf16_to_byte,
};
pub use slice::{preview, slice_to_string};
