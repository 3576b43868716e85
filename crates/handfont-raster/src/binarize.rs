//! Intensity image to binary ink mask.

use handfont_core::BinaryMask;
use image::GrayImage;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::components::remove_small_components;
use crate::decode::decode_luma;
use crate::filter::{gaussian_blur, BorderMode};
use crate::morphology::close_rect;
use crate::threshold::{adaptive_threshold_inv, otsu_threshold_inv};
use crate::RasterError;

/// How intensity is split into ink and paper.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Gaussian-weighted local mean minus `offset`; tolerates uneven lighting.
    Adaptive { block_size: u32, offset: i32 },
    /// Single global Otsu level; for clean two-tone input.
    Otsu,
}

/// Binarization settings. [`BinarizeParams::photo`] and
/// [`BinarizeParams::canvas`] are the two presets the pipeline uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinarizeParams {
    /// Odd Gaussian smoothing kernel size applied before thresholding.
    #[serde(default)]
    pub blur_kernel: Option<u32>,
    pub threshold: ThresholdMethod,
    /// Side of the square closing element; `<= 1` disables closing.
    pub close_size: u32,
    pub close_iterations: u32,
    /// Components below this many pixels are erased.
    #[serde(default)]
    pub min_component_area: Option<u32>,
}

impl BinarizeParams {
    /// Photographed paper: blur, adaptive threshold, 3x3 close, speck removal.
    pub fn photo() -> Self {
        Self {
            blur_kernel: Some(5),
            threshold: ThresholdMethod::Adaptive {
                block_size: 21,
                offset: 10,
            },
            close_size: 3,
            close_iterations: 1,
            min_component_area: Some(50),
        }
    }

    /// Canvas drawings: Otsu threshold and a light 2x2 close.
    pub fn canvas() -> Self {
        Self {
            blur_kernel: None,
            threshold: ThresholdMethod::Otsu,
            close_size: 2,
            close_iterations: 1,
            min_component_area: None,
        }
    }
}

impl Default for BinarizeParams {
    fn default() -> Self {
        Self::photo()
    }
}

/// Run the configured binarization on an intensity image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn binarize(img: &GrayImage, params: &BinarizeParams) -> BinaryMask {
    let blurred;
    let source = match params.blur_kernel {
        Some(k) if k > 1 => {
            blurred = gaussian_blur(img, k, BorderMode::Reflect101);
            &blurred
        }
        _ => img,
    };

    let thresholded = match params.threshold {
        ThresholdMethod::Adaptive { block_size, offset } => {
            adaptive_threshold_inv(source, block_size, offset)
        }
        ThresholdMethod::Otsu => otsu_threshold_inv(source),
    };

    let closed = close_rect(&thresholded, params.close_size, params.close_iterations);

    let mask = match params.min_component_area {
        Some(min_area) if min_area > 0 => {
            let (filtered, removed) = remove_small_components(&closed, min_area);
            log::debug!("removed {removed} components below {min_area} px");
            filtered
        }
        _ => closed,
    };
    log::debug!(
        "binarized {}x{} image, {} foreground px",
        mask.width(),
        mask.height(),
        mask.foreground_count()
    );
    mask
}

/// Photo pipeline on an already decoded intensity image.
pub fn binarize_photo(img: &GrayImage) -> BinaryMask {
    binarize(img, &BinarizeParams::photo())
}

/// Decode raw bytes and run the canvas pipeline.
pub fn binarize_canvas(bytes: &[u8]) -> Result<BinaryMask, RasterError> {
    let img = decode_luma(bytes)?;
    Ok(binarize(&img, &BinarizeParams::canvas()))
}

/// Decode raw bytes and run `params`.
pub fn binarize_bytes(bytes: &[u8], params: &BinarizeParams) -> Result<BinaryMask, RasterError> {
    let img = decode_luma(bytes)?;
    Ok(binarize(&img, params))
}
