//! High-level facade crate for the `handfont-*` workspace.
//!
//! This crate provides:
//! - re-exports of the stage crates under short names
//! - the four end-to-end operations that turn handwriting into fonts
//! - [`PipelineConfig`], one JSON-loadable struct holding every tunable
//!
//! ## Quickstart
//!
//! ```no_run
//! use handfont::process_phrase;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let photo = std::fs::read("pangram.jpg")?;
//! let font = process_phrase(&photo, "the quick brown fox jumps over the lazy dog")?;
//! std::fs::write("MyHandwriting-Regular.ttf", &font.ttf)?;
//! std::fs::write("MyHandwriting-Regular.woff2", &font.woff2)?;
//! println!("glyphs for: {:?}", font.characters_found);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `handfont::core`: binary masks, bounding boxes, logger setup.
//! - `handfont::raster`: binarization, phrase segmentation, single glyph extraction.
//! - `handfont::outline`: mask to polygon outline in font units.
//! - `handfont::font`: TrueType and WOFF2 assembly.
//! - [`process_phrase`], [`process_single_glyph`], [`process_multi_glyph`],
//!   [`build_font`]: the pipeline entry points, each with a `*_with_config`
//!   variant.

pub use handfont_core as core;
pub use handfont_font as font;
pub use handfont_outline as outline;
pub use handfont_raster as raster;

pub use handfont_font::FontConfig;
pub use handfont_outline::{ContourPath, GlyphOutline};

mod config;
mod error;
mod pipeline;

pub use config::PipelineConfig;
pub use error::{IoError, PipelineError};
pub use pipeline::{
    build_font, build_font_with_config, process_multi_glyph, process_multi_glyph_with_config,
    process_phrase, process_phrase_with_config, process_single_glyph,
    process_single_glyph_with_config, FontOutput,
};
