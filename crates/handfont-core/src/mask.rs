use serde::{Deserialize, Serialize};

/// Pixel value used for foreground (ink) pixels.
pub const FOREGROUND: u8 = 255;
/// Pixel value used for background pixels.
pub const BACKGROUND: u8 = 0;
/// Margin added by [`BinaryMask::to_bordered_luma_image`].
pub const TRACE_BORDER: u32 = 1;

/// Errors produced when constructing a mask from raw data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    #[error("invalid mask buffer length (expected {expected} bytes, got {got})")]
    InvalidBufferLength { expected: usize, got: usize },
    #[error("invalid mask dimensions (width={width}, height={height})")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Axis-aligned box in pixel space. `x`/`y` is the top-left pixel; the box
/// covers `x..x + width` and `y..y + height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box containing every point, using the inclusive
    /// `max - min + 1` extent convention. `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for (x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x as f32 + self.width as f32 / 2.0
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Grow by `pad` pixels on every side, clamped to a `width x height` image.
    pub fn expanded(&self, pad: u32, width: u32, height: u32) -> BoundingBox {
        let x0 = self.x.saturating_sub(pad);
        let y0 = self.y.saturating_sub(pad);
        let x1 = self.right().saturating_add(pad).min(width);
        let y1 = self.bottom().saturating_add(pad).min(height);
        BoundingBox::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// Two-level raster, origin top-left, y growing downward.
///
/// Pixels are stored row-major and hold exactly [`FOREGROUND`] or
/// [`BACKGROUND`]. Transformations return a new mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl BinaryMask {
    /// An all-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![BACKGROUND; width as usize * height as usize],
        }
    }

    /// Build a mask from row-major data; any nonzero value becomes foreground.
    pub fn from_raw(width: u32, height: u32, mut data: Vec<u8>) -> Result<Self, MaskError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or(MaskError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(MaskError::InvalidBufferLength {
                expected,
                got: data.len(),
            });
        }
        for v in &mut data {
            *v = if *v != 0 { FOREGROUND } else { BACKGROUND };
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(if f(x, y) { FOREGROUND } else { BACKGROUND });
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// `true` if the mask has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Foreground test; out-of-range coordinates are background.
    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y as usize * self.width as usize + x as usize] != BACKGROUND
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v != BACKGROUND).count()
    }

    /// Bounding box of every foreground pixel, `None` if there is no ink.
    pub fn foreground_bounds(&self) -> Option<BoundingBox> {
        let w = self.width as usize;
        BoundingBox::from_points(
            self.data
                .iter()
                .enumerate()
                .filter(|(_, &v)| v != BACKGROUND)
                .map(|(i, _)| ((i % w) as u32, (i / w) as u32)),
        )
    }

    /// Copy out the region covered by `bbox`, clamped to the mask bounds.
    pub fn crop(&self, bbox: &BoundingBox) -> BinaryMask {
        let x0 = bbox.x.min(self.width);
        let y0 = bbox.y.min(self.height);
        let x1 = bbox.right().min(self.width);
        let y1 = bbox.bottom().min(self.height);
        let (w, h) = (x1 - x0, y1 - y0);
        let mut data = Vec::with_capacity(w as usize * h as usize);
        for y in y0..y1 {
            let row = y as usize * self.width as usize;
            data.extend_from_slice(&self.data[row + x0 as usize..row + x1 as usize]);
        }
        BinaryMask {
            width: w,
            height: h,
            data,
        }
    }

    /// Copy this mask into a new all-background canvas at offset `(ox, oy)`.
    /// Pixels falling outside the canvas are dropped.
    pub fn placed_on(&self, canvas_width: u32, canvas_height: u32, ox: u32, oy: u32) -> BinaryMask {
        let mut out = BinaryMask::new(canvas_width, canvas_height);
        for y in 0..self.height {
            let ty = y + oy;
            if ty >= canvas_height {
                break;
            }
            for x in 0..self.width {
                let tx = x + ox;
                if tx >= canvas_width {
                    break;
                }
                if self.is_foreground(x, y) {
                    out.data[ty as usize * canvas_width as usize + tx as usize] = FOREGROUND;
                }
            }
        }
        out
    }

    /// Convert to an 8-bit grayscale image (foreground = 255).
    #[cfg(feature = "image")]
    pub fn to_luma_image(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.data[y as usize * self.width as usize + x as usize]])
        })
    }

    /// Like [`to_luma_image`](Self::to_luma_image), framed by a
    /// [`TRACE_BORDER`]-pixel background margin.
    ///
    /// Border following only starts an outer border on a pixel with a
    /// background left neighbour, so ink in column 0 needs the margin to trace
    /// as an outer contour. Traced points are offset by [`TRACE_BORDER`].
    #[cfg(feature = "image")]
    pub fn to_bordered_luma_image(&self) -> image::GrayImage {
        let b = TRACE_BORDER;
        image::GrayImage::from_fn(self.width + 2 * b, self.height + 2 * b, |x, y| {
            let inside = x >= b && y >= b && x - b < self.width && y - b < self.height;
            if inside && self.is_foreground(x - b, y - b) {
                image::Luma([FOREGROUND])
            } else {
                image::Luma([BACKGROUND])
            }
        })
    }
}
