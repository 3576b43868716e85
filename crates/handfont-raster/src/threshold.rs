//! Global (Otsu) and locally adaptive thresholding.
//!
//! Both produce inverted masks: dark ink on light paper becomes foreground.

use handfont_core::BinaryMask;
use image::GrayImage;

use crate::filter::{gaussian_blur, BorderMode};

/// Otsu threshold over every pixel of `img`.
///
/// Returns `None` for a single-intensity image: there is no second class to
/// separate. With exactly two intensities the midpoint is returned.
pub fn otsu_level(img: &GrayImage) -> Option<u8> {
    let samples = img.as_raw();
    if samples.is_empty() {
        return None;
    }

    let mut hist = [0u32; 256];
    for &v in samples {
        hist[v as usize] += 1;
    }
    let min_v = hist.iter().position(|&h| h > 0)? as u8;
    let max_v = hist.iter().rposition(|&h| h > 0)? as u8;
    if min_v == max_v {
        return None;
    }
    let nonzero_bins = hist.iter().filter(|&&h| h > 0).count();
    if nonzero_bins <= 2 {
        return Some(((min_v as u16 + max_v as u16) / 2) as u8);
    }

    let total = samples.len() as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = min_v;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    Some(best_t)
}

/// Inverted global threshold: `value <= level` is foreground.
pub fn threshold_inv(img: &GrayImage, level: u8) -> BinaryMask {
    BinaryMask::from_fn(img.width(), img.height(), |x, y| {
        img.get_pixel(x, y)[0] <= level
    })
}

/// Inverted Otsu threshold. A single-intensity image has no ink.
pub fn otsu_threshold_inv(img: &GrayImage) -> BinaryMask {
    match otsu_level(img) {
        Some(level) => threshold_inv(img, level),
        None => BinaryMask::new(img.width(), img.height()),
    }
}

/// Inverted Gaussian-weighted adaptive threshold.
///
/// A pixel is foreground when it is at least `offset` darker than the
/// Gaussian-weighted mean of its `block_size x block_size` neighborhood.
pub fn adaptive_threshold_inv(img: &GrayImage, block_size: u32, offset: i32) -> BinaryMask {
    let mean = gaussian_blur(img, block_size, BorderMode::Replicate);
    BinaryMask::from_fn(img.width(), img.height(), |x, y| {
        let v = img.get_pixel(x, y)[0] as i32;
        let m = mean.get_pixel(x, y)[0] as i32;
        v <= m - offset
    })
}
