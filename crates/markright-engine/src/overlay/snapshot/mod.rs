//! # Snapshot Testing Support
//!
//! - **`normalize`**: converts scanned regions to a stable, serializable
//!   `Snap` for `insta` snapshot assertions
//! - **`invariants`**: runtime checks for scanner correctness (whole-line
//!   ranges, no overlap, exact raw text, heading level bounds)

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{Snap, normalize};
