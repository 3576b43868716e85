use serde::{Deserialize, Serialize};

/// One closed polygon in font design units.
///
/// The first point is not repeated at the end. Outer contours wind
/// clockwise (negative signed area), holes counter-clockwise.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContourPath {
    pub points: Vec<(i32, i32)>,
    pub is_hole: bool,
}

impl ContourPath {
    pub fn new(points: Vec<(i32, i32)>, is_hole: bool) -> Self {
        Self { points, is_hole }
    }

    /// A path needs at least three points to enclose anything.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 3
    }

    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// `(x_min, y_min, x_max, y_max)` of the points.
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        bounds_of(self.points.iter().copied())
    }
}

/// Shoelace signed area; positive for counter-clockwise in a y-up frame.
pub fn signed_area(points: &[(i32, i32)]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: i64 = (0..n)
        .map(|i| {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % n];
            x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64
        })
        .sum();
    twice as f64 / 2.0
}

/// Polygon outline and horizontal metrics of one glyph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlyphOutline {
    pub paths: Vec<ContourPath>,
    pub advance_width: u32,
    #[serde(rename = "lsb", alias = "left_side_bearing")]
    pub left_side_bearing: u32,
}

impl GlyphOutline {
    /// An outline without ink.
    pub fn empty(advance_width: u32) -> Self {
        Self {
            paths: Vec::new(),
            advance_width,
            left_side_bearing: 0,
        }
    }

    /// Paths with at least three points.
    pub fn drawable_paths(&self) -> impl Iterator<Item = &ContourPath> {
        self.paths.iter().filter(|p| p.is_drawable())
    }

    pub fn has_ink(&self) -> bool {
        self.drawable_paths().next().is_some()
    }

    /// Bounds over every drawable path.
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        bounds_of(self.drawable_paths().flat_map(|p| p.points.iter().copied()))
    }
}

fn bounds_of(mut points: impl Iterator<Item = (i32, i32)>) -> Option<(i32, i32, i32, i32)> {
    let (x, y) = points.next()?;
    Some(points.fold((x, y, x, y), |(x0, y0, x1, y1), (x, y)| {
        (x0.min(x), y0.min(y), x1.max(x), y1.max(y))
    }))
}
