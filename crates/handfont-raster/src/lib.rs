//! Raster stages of the handfont pipeline.
//!
//! - [`binarize`]: intensity image to [`BinaryMask`], with a photo preset
//!   (blur, adaptive threshold, closing, speck removal) and a canvas preset
//!   (Otsu threshold, light closing).
//! - [`segment`]: split a photographed phrase into one crop per letter.
//! - [`extract`]: center a single drawn character on a square canvas.
//!
//! [`BinaryMask`]: handfont_core::BinaryMask

mod binarize;
mod components;
mod decode;
mod error;
mod extract;
mod filter;
mod morphology;
mod segment;
mod threshold;

pub use binarize::{
    binarize, binarize_bytes, binarize_canvas, binarize_photo, BinarizeParams, ThresholdMethod,
};
pub use components::remove_small_components;
pub use decode::decode_luma;
pub use error::{RasterError, SegmentError};
pub use extract::{extract, ExtractParams};
pub use filter::{gaussian_blur, gaussian_kernel, sigma_for_kernel, BorderMode};
pub use morphology::close_rect;
pub use segment::{
    filter_small, find_regions, group_lines, median_height, merge_dots, phrase_letters,
    reading_order, segment, CharacterBlob, SegmentParams,
};
pub use threshold::{adaptive_threshold_inv, otsu_level, otsu_threshold_inv, threshold_inv};
