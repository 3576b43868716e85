//! Binary glyph mask to polygon outline.

use handfont_core::{round_even, BinaryMask, BoundingBox, TRACE_BORDER};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::geometry::approximate_polygon_dp;
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::outline::{signed_area, ContourPath, GlyphOutline};

/// Mapping from mask pixels to design units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineParams {
    /// Design units spanned by the ink height (ascender minus descender).
    pub target_height: u32,
    /// Design-unit y of the lowest ink row.
    pub descender: i32,
    /// Douglas-Peucker tolerance in source pixels.
    pub simplify_epsilon: f64,
    /// Side bearing as a fraction of the scaled ink width, applied per side.
    pub bearing_ratio: f64,
    /// Advance width of a glyph without ink.
    pub empty_advance: u32,
}

impl Default for OutlineParams {
    fn default() -> Self {
        Self {
            target_height: 1000,
            descender: -200,
            simplify_epsilon: 0.5,
            bearing_ratio: 0.12,
            empty_advance: 500,
        }
    }
}

/// Trace, simplify and scale every contour of `mask` into design units.
///
/// Ink is scaled uniformly so its height spans `target_height`, flipped to
/// a y-up frame with the bottom row at `descender`, and shifted right by the
/// left side bearing. Output is deterministic for a given mask.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mask, params), fields(width = mask.width(), height = mask.height()))
)]
pub fn vectorize(mask: &BinaryMask, params: &OutlineParams) -> GlyphOutline {
    let contours = trace(mask);
    let Some(bbox) = BoundingBox::from_points(
        contours
            .iter()
            .flat_map(|c| c.points.iter().map(|p| (p.x, p.y))),
    ) else {
        log::debug!("no contours; empty outline");
        return GlyphOutline::empty(params.empty_advance);
    };

    let scale = params.target_height as f64 / bbox.height as f64;
    let raw_width = round_even(bbox.width as f64 * scale).max(0);
    let lsb = round_even(raw_width as f64 * params.bearing_ratio).max(0);
    let advance = u32::try_from(i64::from(raw_width) + 2 * i64::from(lsb)).unwrap_or(u32::MAX);

    let paths: Vec<ContourPath> = contours
        .iter()
        .filter_map(|c| to_design_units(c, &bbox, scale, params))
        .map(|mut path| {
            for p in &mut path.points {
                p.0 = p.0.saturating_add(lsb);
            }
            path
        })
        .collect();

    log::debug!(
        "vectorized {} of {} contours, advance {advance}, lsb {lsb}",
        paths.len(),
        contours.len()
    );
    GlyphOutline {
        paths,
        advance_width: advance,
        left_side_bearing: lsb.unsigned_abs(),
    }
}

/// Contours of `mask` in its own pixel coordinates, edge ink included.
fn trace(mask: &BinaryMask) -> Vec<Contour<u32>> {
    let mut contours = find_contours::<u32>(&mask.to_bordered_luma_image());
    for contour in &mut contours {
        for p in &mut contour.points {
            p.x -= TRACE_BORDER;
            p.y -= TRACE_BORDER;
        }
    }
    contours
}

fn to_design_units(
    contour: &Contour<u32>,
    bbox: &BoundingBox,
    scale: f64,
    params: &OutlineParams,
) -> Option<ContourPath> {
    if contour.points.len() < 3 {
        return None;
    }
    let simplified = simplify_closed(&contour.points, params.simplify_epsilon);
    if simplified.len() < 3 {
        return None;
    }

    let top = params.target_height as f64 + params.descender as f64;
    let mut points: Vec<(i32, i32)> = simplified
        .iter()
        .map(|p| {
            let x = (p.x - bbox.x) as f64 * scale;
            let y = top - (p.y - bbox.y) as f64 * scale;
            (round_even(x), round_even(y))
        })
        .collect();

    let is_hole = contour.border_type == BorderType::Hole;
    let area = signed_area(&points);
    if (!is_hole && area > 0.0) || (is_hole && area < 0.0) {
        points.reverse();
    }
    Some(ContourPath::new(points, is_hole))
}

/// Douglas-Peucker on a closed ring, without the closing duplicate.
fn simplify_closed(points: &[Point<u32>], epsilon: f64) -> Vec<Point<u32>> {
    let mut out = if epsilon > 0.0 {
        approximate_polygon_dp(points, epsilon, true)
    } else {
        points.to_vec()
    };
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}
