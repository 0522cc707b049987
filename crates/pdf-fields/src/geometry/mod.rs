//! Coordinate spaces for field placement
//!
//! Fields live in three coordinate spaces:
//! - Screen: pixels of the rendered page, either viewport-absolute or
//!   relative to the page's top-left corner
//! - Logical: units of the fixed 595.28 × 841.89 page, independent of zoom
//! - Relative: fractions of the logical page, the persisted representation

mod normalizer;
mod types;

pub use normalizer::*;
pub use types::*;
