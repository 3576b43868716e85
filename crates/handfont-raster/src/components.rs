//! Connected-component filtering.

use handfont_core::BinaryMask;
use image::Luma;
use imageproc::region_labelling::{connected_components, Connectivity};

/// Zero out every 8-connected foreground component smaller than `min_area`
/// pixels. Returns the filtered mask and the number of components removed.
pub fn remove_small_components(mask: &BinaryMask, min_area: u32) -> (BinaryMask, usize) {
    let labels = connected_components(&mask.to_luma_image(), Connectivity::Eight, Luma([0u8]));

    let mut areas: Vec<u32> = Vec::new();
    for px in labels.pixels() {
        let label = px[0] as usize;
        if label == 0 {
            continue;
        }
        if areas.len() <= label {
            areas.resize(label + 1, 0);
        }
        areas[label] += 1;
    }
    let removed = areas
        .iter()
        .skip(1)
        .filter(|&&a| a > 0 && a < min_area)
        .count();

    let filtered = BinaryMask::from_fn(mask.width(), mask.height(), |x, y| {
        let label = labels.get_pixel(x, y)[0] as usize;
        label != 0 && areas[label] >= min_area
    });
    (filtered, removed)
}
