//! # Overlay Kinds
//!
//! Each region kind owns its syntax: delimiter constants and the detector
//! that recognizes it. The scanner only decides precedence; it never
//! hardcodes `|`, `$$` or fence markers itself.
//!
//! - **`Table`**: `PIPE = '|'`, header + separator + pipe rows
//! - **`MathBlock`**: `DELIM = "$$"`, three opener shapes
//! - **`DiagramFence`**: `FENCE = "```"`, `LANGUAGE = "mermaid"`
//! - **`Heading`**: `MARKER = '#'`, levels 1 through 6

pub mod diagram;
pub mod heading;
pub mod latex;
pub mod table;

pub use diagram::{DiagramFence, DiagramMatch};
pub use heading::{Heading, HeadingMatch, HeadingStyle};
pub use latex::{MathBlock, MathMatch};
pub use table::Table;
