//! Core types shared by the handfont pipeline crates.
//!
//! This crate is intentionally small: the two-level [`BinaryMask`] raster
//! every stage exchanges, the pixel-space [`BoundingBox`], the rounding rule
//! used for every float-to-integer conversion, and logger setup.
//!
//! With the `image` feature, masks convert to and from `image::GrayImage`.

mod logger;
mod mask;
mod round;

pub use mask::{BinaryMask, BoundingBox, MaskError, BACKGROUND, FOREGROUND, TRACE_BORDER};
pub use round::{round_even, round_even_u8};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_ENV};
