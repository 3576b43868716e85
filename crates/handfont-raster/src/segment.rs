//! Phrase segmentation: one binary mask per handwritten letter.
//!
//! The segmenter works on a flat list of region boxes:
//! 1. outermost foreground regions are traced and boxed; tiny boxes dropped,
//! 2. dots and diacritics are merged into the stroke below them,
//! 3. boxes are grouped into text lines and sorted into reading order,
//! 4. boxes are paired positionally with the letters of the known phrase.
//!
//! Pairing is purely positional: a missed or spurious region shifts every
//! later letter by one.

use handfont_core::{BinaryMask, BoundingBox, TRACE_BORDER};
use imageproc::contours::{find_contours, BorderType};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::SegmentError;

/// Tuning knobs for segmentation; ratios are relative to the median box height.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentParams {
    /// Regions spanning at most this many pixels (`max - min`) in either
    /// direction are noise.
    pub min_dimension: u32,
    /// Width and height below `ratio * median` mark a dot candidate.
    pub dot_size_ratio: f32,
    /// Maximum vertical gap between a dot and its parent stroke.
    pub dot_gap_ratio: f32,
    /// Top-edge difference below `ratio * median` keeps a box on the current line.
    pub line_ratio: f32,
    /// Padding added around each crop, clamped to the mask.
    pub crop_padding: u32,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            min_dimension: 5,
            dot_size_ratio: 0.4,
            dot_gap_ratio: 0.8,
            line_ratio: 0.5,
            crop_padding: 4,
        }
    }
}

/// One phrase letter and the ink that was assigned to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterBlob {
    pub character: char,
    /// Region box in source mask coordinates, without padding.
    pub bbox: BoundingBox,
    /// Padded crop of the source mask.
    pub mask: BinaryMask,
}

/// Segment `mask` against the phrase the writer copied.
///
/// Returns at most one blob per distinct letter, first occurrence wins, in
/// reading order. Fails with [`SegmentError::NoMatches`] when no region could
/// be paired, e.g. for a phrase without letters.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(mask, phrase, params), fields(width = mask.width(), height = mask.height()))
)]
pub fn segment(
    mask: &BinaryMask,
    phrase: &str,
    params: &SegmentParams,
) -> Result<Vec<CharacterBlob>, SegmentError> {
    let regions = find_regions(mask);
    if regions.is_empty() {
        return Err(SegmentError::NoCharactersFound);
    }
    let total = regions.len();
    let boxes = filter_small(regions, params.min_dimension);
    if boxes.is_empty() {
        return Err(SegmentError::NoValidRegions { regions: total });
    }
    log::debug!("{} regions, {} above the size floor", total, boxes.len());

    let merged = merge_dots(&boxes, params);
    let ordered = reading_order(&merged, params);
    let letters = phrase_letters(phrase);
    log::debug!(
        "{} boxes after dot merge, {} phrase letters",
        ordered.len(),
        letters.len()
    );
    if ordered.len() != letters.len() {
        log::warn!(
            "segmented {} regions for {} phrase letters; pairing positionally",
            ordered.len(),
            letters.len()
        );
    }

    let mut blobs: Vec<CharacterBlob> = Vec::new();
    for (bbox, &character) in ordered.iter().zip(letters.iter()) {
        if blobs.iter().any(|b| b.character == character) {
            continue;
        }
        let padded = bbox.expanded(params.crop_padding, mask.width(), mask.height());
        blobs.push(CharacterBlob {
            character,
            bbox: *bbox,
            mask: mask.crop(&padded),
        });
    }
    if blobs.is_empty() {
        return Err(SegmentError::NoMatches);
    }
    Ok(blobs)
}

/// Bounding boxes of the outermost foreground regions, in tracing order.
///
/// Regions touching the image edge are traced like any other.
pub fn find_regions(mask: &BinaryMask) -> Vec<BoundingBox> {
    find_contours::<u32>(&mask.to_bordered_luma_image())
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            BoundingBox::from_points(
                c.points
                    .iter()
                    .map(|p| (p.x - TRACE_BORDER, p.y - TRACE_BORDER)),
            )
        })
        .collect()
}

/// Keep boxes whose pixel extent (`max - min`) exceeds `min_dimension` in
/// both directions, so a 6x6 blob is noise at the default of 5.
///
/// The same floor drops strokes exactly `min_dimension + 1` pixels wide: a
/// thin 6 px `l` or `i` stem vanishes at the default, and positional pairing
/// then shifts every later letter by one. Lower `min_dimension` for fine pens.
pub fn filter_small(boxes: Vec<BoundingBox>, min_dimension: u32) -> Vec<BoundingBox> {
    let extent = |len: u32| len.saturating_sub(1);
    boxes
        .into_iter()
        .filter(|b| extent(b.width) > min_dimension && extent(b.height) > min_dimension)
        .collect()
}

/// Upper median of the box heights.
pub fn median_height(boxes: &[BoundingBox]) -> Option<f32> {
    if boxes.is_empty() {
        return None;
    }
    let mut heights: Vec<u32> = boxes.iter().map(|b| b.height).collect();
    heights.sort_unstable();
    Some(heights[heights.len() / 2] as f32)
}

/// Merge dot-sized boxes into the nearest stroke directly below them.
///
/// Boxes are visited top to bottom. A dot candidate merges with the
/// unconsumed box below it whose horizontal center is within that box's
/// width of the dot's center and whose top edge is closest to the dot's
/// bottom edge, provided the gap is under `dot_gap_ratio * median`.
pub fn merge_dots(boxes: &[BoundingBox], params: &SegmentParams) -> Vec<BoundingBox> {
    let Some(median) = median_height(boxes) else {
        return Vec::new();
    };
    let small_limit = median * params.dot_size_ratio;
    let gap_limit = median * params.dot_gap_ratio;

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by_key(|&i| boxes[i].y);

    let mut used = vec![false; boxes.len()];
    let mut merged = Vec::with_capacity(boxes.len());
    let mut merges = 0usize;

    for &i in &order {
        if used[i] {
            continue;
        }
        let dot = boxes[i];
        let is_small = (dot.height as f32) < small_limit && (dot.width as f32) < small_limit;

        if is_small {
            if let Some(parent) = nearest_parent_below(boxes, &order, &used, i, gap_limit) {
                merged.push(dot.union(&boxes[parent]));
                used[i] = true;
                used[parent] = true;
                merges += 1;
                continue;
            }
        }

        merged.push(dot);
        used[i] = true;
    }
    log::debug!("merged {merges} dots into their strokes");
    merged
}

fn nearest_parent_below(
    boxes: &[BoundingBox],
    order: &[usize],
    used: &[bool],
    dot_index: usize,
    gap_limit: f32,
) -> Option<usize> {
    let dot = boxes[dot_index];
    let dot_bottom = dot.bottom() as f32;
    let mut best: Option<(usize, f32)> = None;
    for &j in order {
        if j == dot_index || used[j] {
            continue;
        }
        let parent = boxes[j];
        if parent.y <= dot.y {
            continue;
        }
        if (dot.center_x() - parent.center_x()).abs() >= parent.width as f32 {
            continue;
        }
        let gap = parent.y as f32 - dot_bottom;
        let closer = best.is_none_or(|(_, best_gap)| gap < best_gap);
        if gap < gap_limit && closer {
            best = Some((j, gap));
        }
    }
    best.map(|(j, _)| j)
}

/// Group boxes into text lines, top to bottom.
///
/// Each line is anchored at the top edge of its first box; a box joins the
/// line while its top edge is within `line_ratio * median` of the anchor.
/// Boxes within a line are sorted left to right.
pub fn group_lines(boxes: &[BoundingBox], params: &SegmentParams) -> Vec<Vec<BoundingBox>> {
    let Some(median) = median_height(boxes) else {
        return Vec::new();
    };
    let threshold = median * params.line_ratio;

    let mut by_y = boxes.to_vec();
    by_y.sort_by_key(|b| b.y);

    let mut lines: Vec<Vec<BoundingBox>> = Vec::new();
    let mut anchor_y = by_y[0].y;
    let mut current = Vec::new();
    for bbox in by_y {
        if (bbox.y as f32 - anchor_y as f32).abs() < threshold || current.is_empty() {
            current.push(bbox);
        } else {
            lines.push(std::mem::take(&mut current));
            anchor_y = bbox.y;
            current.push(bbox);
        }
    }
    lines.push(current);

    for line in &mut lines {
        line.sort_by_key(|b| b.x);
    }
    lines
}

/// Flatten [`group_lines`] into left-to-right, top-to-bottom order.
pub fn reading_order(boxes: &[BoundingBox], params: &SegmentParams) -> Vec<BoundingBox> {
    let lines = group_lines(boxes, params);
    log::debug!("{} text lines", lines.len());
    lines.into_iter().flatten().collect()
}

/// Lowercased alphabetic characters of `phrase`, in order.
pub fn phrase_letters(phrase: &str) -> Vec<char> {
    phrase
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphabetic())
        .collect()
}
