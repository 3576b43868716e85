//! Separable Gaussian smoothing on 8-bit intensity images.

use handfont_core::round_even_u8;
use image::{GrayImage, Luma};

/// How samples beyond the image edge are synthesized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderMode {
    /// `dcb|abcd|cba`
    Reflect101,
    /// `aaa|abcd|ddd`
    Replicate,
}

impl BorderMode {
    #[inline]
    fn index(self, i: i64, n: i64) -> usize {
        if n == 1 {
            return 0;
        }
        let j = match self {
            BorderMode::Replicate => i.clamp(0, n - 1),
            BorderMode::Reflect101 => {
                let period = 2 * (n - 1);
                let m = i.rem_euclid(period);
                if m < n {
                    m
                } else {
                    period - m
                }
            }
        };
        j as usize
    }
}

/// Sigma implied by a kernel size when none is given explicitly.
pub fn sigma_for_kernel(ksize: u32) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1D Gaussian kernel of odd length `ksize`.
pub fn gaussian_kernel(ksize: u32) -> Vec<f32> {
    let sigma = sigma_for_kernel(ksize);
    let half = (ksize / 2) as f64;
    let scale = -0.5 / (sigma * sigma);
    let raw: Vec<f64> = (0..ksize)
        .map(|i| {
            let d = i as f64 - half;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| (v / sum) as f32).collect()
}

/// Blur with a `ksize x ksize` Gaussian; results are rounded half to even.
pub fn gaussian_blur(src: &GrayImage, ksize: u32, border: BorderMode) -> GrayImage {
    let kernel = gaussian_kernel(ksize.max(1) | 1);
    let radius = (kernel.len() / 2) as i64;
    let (w, h) = (src.width() as i64, src.height() as i64);
    let data = src.as_raw();

    let mut horizontal = vec![0f32; data.len()];
    for y in 0..h {
        let row = (y * w) as usize;
        for x in 0..w {
            let mut acc = 0f32;
            for (k, &kv) in kernel.iter().enumerate() {
                let sx = border.index(x + k as i64 - radius, w);
                acc += kv * data[row + sx] as f32;
            }
            horizontal[row + x as usize] = acc;
        }
    }

    GrayImage::from_fn(src.width(), src.height(), |x, y| {
        let (x, y) = (x as i64, y as i64);
        let mut acc = 0f32;
        for (k, &kv) in kernel.iter().enumerate() {
            let sy = border.index(y + k as i64 - radius, h);
            acc += kv * horizontal[sy * w as usize + x as usize];
        }
        Luma([round_even_u8(acc)])
    })
}
