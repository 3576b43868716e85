//! Single-glyph extraction for drawn characters.

use handfont_core::BinaryMask;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractParams {
    /// Total padding added to the longer side of the ink box.
    pub padding: u32,
}

impl Default for ExtractParams {
    fn default() -> Self {
        Self { padding: 20 }
    }
}

/// Crop `mask` to its ink and center the crop on a square canvas of side
/// `max(width, height) + padding`.
///
/// A mask without foreground is returned unchanged.
pub fn extract(mask: &BinaryMask, params: &ExtractParams) -> BinaryMask {
    let Some(bounds) = mask.foreground_bounds() else {
        log::debug!("no ink to extract");
        return mask.clone();
    };
    let crop = mask.crop(&bounds);
    let side = bounds.width.max(bounds.height) + params.padding;
    let ox = (side - bounds.width) / 2;
    let oy = (side - bounds.height) / 2;
    log::debug!(
        "extracted {}x{} ink onto a {side}x{side} canvas",
        bounds.width,
        bounds.height
    );
    crop.placed_on(side, side, ox, oy)
}
