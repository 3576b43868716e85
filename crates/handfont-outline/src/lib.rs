//! Glyph outlines for the handfont pipeline.
//!
//! [`vectorize`] turns a binary glyph mask into a [`GlyphOutline`]: closed
//! straight-line polygons in font design units, tagged outer or hole and
//! wound the TrueType way, plus advance width and left side bearing.

mod outline;
mod vectorize;

pub use outline::{signed_area, ContourPath, GlyphOutline};
pub use vectorize::{vectorize, OutlineParams};
