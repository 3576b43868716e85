use std::collections::BTreeMap;
use std::io::Cursor;

use handfont::font::FontBuildError;
use handfont::{
    build_font, process_multi_glyph, process_phrase, process_single_glyph, FontConfig,
    GlyphOutline, PipelineConfig, PipelineError,
};
use image::{GrayImage, ImageFormat, Luma};
use write_fonts::read::{FontRef, TableProvider};
use write_fonts::types::GlyphId;

const PAPER: u8 = 230;
const INK: u8 = 30;

fn png(img: &GrayImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[derive(Clone, Copy)]
enum Shape {
    /// Circle outline: center, outer radius, stroke width.
    Ring(i32, i32, i32, i32),
    /// Filled rectangle: x, y, width, height.
    Bar(i32, i32, i32, i32),
}

impl Shape {
    fn covers(&self, x: i32, y: i32) -> bool {
        match *self {
            Shape::Ring(cx, cy, r, stroke) => {
                let d2 = (x - cx).pow(2) + (y - cy).pow(2);
                d2 <= r * r && d2 > (r - stroke).pow(2)
            }
            Shape::Bar(bx, by, w, h) => x >= bx && x < bx + w && y >= by && y < by + h,
        }
    }
}

fn draw(width: u32, height: u32, shapes: &[Shape]) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let ink = shapes.iter().any(|s| s.covers(x as i32, y as i32));
        Luma([if ink { INK } else { PAPER }])
    })
}

/// Two lines of writing: `a b` on top, `c d` below.
fn ab_cd_photo() -> Vec<u8> {
    png(&draw(
        240,
        200,
        &[
            Shape::Ring(50, 50, 20, 6),
            Shape::Bar(110, 30, 8, 40),
            Shape::Ring(50, 150, 20, 6),
            Shape::Bar(110, 130, 8, 40),
        ],
    ))
}

fn disc_drawing() -> Vec<u8> {
    png(&GrayImage::from_fn(160, 160, |x, y| {
        let d2 = (x as i32 - 80).pow(2) + (y as i32 - 80).pow(2);
        Luma([if d2 <= 50 * 50 { 0 } else { 255 }])
    }))
}

fn ring_drawing() -> Vec<u8> {
    png(&GrayImage::from_fn(160, 160, |x, y| {
        let d2 = (x as i32 - 80).pow(2) + (y as i32 - 80).pow(2);
        Luma([if d2 <= 50 * 50 && d2 > 25 * 25 { 0 } else { 255 }])
    }))
}

fn blank_drawing() -> Vec<u8> {
    png(&GrayImage::from_pixel(120, 120, Luma([255])))
}

fn area(points: &[(i32, i32)]) -> i64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % n];
            x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64
        })
        .sum()
}

#[test]
fn phrase_photo_becomes_a_font_in_reading_order() {
    let out = process_phrase(&ab_cd_photo(), "ab cd").unwrap();
    assert_eq!(out.characters_found, vec!['a', 'b', 'c', 'd']);
    assert_eq!(&out.woff2[..4], b"wOF2");

    let font = FontRef::new(&out.ttf).unwrap();
    assert_eq!(font.maxp().unwrap().num_glyphs(), 6);
    let cmap = font.cmap().unwrap();
    for ch in ['a', 'b', 'c', 'd'] {
        let lower = cmap.map_codepoint(ch).unwrap();
        let upper = cmap.map_codepoint(ch.to_ascii_uppercase()).unwrap();
        assert_eq!(lower, upper, "{ch}");
        assert_ne!(lower, GlyphId::NOTDEF);
    }
    assert_eq!(cmap.map_codepoint(' '), Some(GlyphId::new(1)));
}

#[test]
fn phrase_without_ink_is_a_segmentation_error() {
    let blank = png(&GrayImage::from_pixel(100, 80, Luma([PAPER])));
    let err = process_phrase(&blank, "hello").unwrap_err();
    assert!(matches!(err, PipelineError::Segmentation(_)));
    assert!(err.is_empty_result());
}

#[test]
fn drawn_disc_is_one_clockwise_contour() {
    let outline = process_single_glyph(&disc_drawing(), 'o').unwrap();
    assert_eq!(outline.paths.len(), 1);
    let path = &outline.paths[0];
    assert!(!path.is_hole);
    assert!(area(&path.points) < 0);

    let (min_y, max_y) = path
        .points
        .iter()
        .fold((i32::MAX, i32::MIN), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    assert_eq!(max_y, 800);
    assert!(min_y <= -190, "{min_y}");

    let min_x = path.points.iter().map(|p| p.0).min().unwrap();
    assert_eq!(min_x as u32, outline.left_side_bearing);
    let max_x = path.points.iter().map(|p| p.0).max().unwrap();
    assert!(outline.advance_width as i32 >= max_x);
}

#[test]
fn drawn_ring_has_outer_and_hole() {
    let outline = process_single_glyph(&ring_drawing(), 'o').unwrap();
    assert_eq!(outline.paths.len(), 2);
    let outer = outline.paths.iter().find(|p| !p.is_hole).unwrap();
    let hole = outline.paths.iter().find(|p| p.is_hole).unwrap();
    assert!(area(&outer.points) < 0);
    assert!(area(&hole.points) > 0);
    let (ob, hb) = (outer.bounds().unwrap(), hole.bounds().unwrap());
    assert!(ob.0 < hb.0 && ob.1 < hb.1 && ob.2 > hb.2 && ob.3 > hb.3);
}

#[test]
fn blank_drawing_gives_an_empty_outline() {
    let outline = process_single_glyph(&blank_drawing(), 'x').unwrap();
    assert!(outline.paths.is_empty());
    assert_eq!(outline.advance_width, 500);
    assert_eq!(outline.left_side_bearing, 0);
}

#[test]
fn drawn_letters_skip_bad_keys_and_blank_pages() {
    let images: BTreeMap<String, Vec<u8>> = [
        ("O".to_string(), ring_drawing()),
        ("e".to_string(), disc_drawing()),
        ("x".to_string(), blank_drawing()),
        ("char_q".to_string(), disc_drawing()),
    ]
    .into_iter()
    .collect();
    let out = process_multi_glyph(&images).unwrap();
    assert_eq!(out.characters_found, vec!['e', 'o']);

    let font = FontRef::new(&out.ttf).unwrap();
    let cmap = font.cmap().unwrap();
    assert!(cmap.map_codepoint('x').is_none());
    assert_eq!(cmap.map_codepoint('O'), cmap.map_codepoint('o'));
}

#[test]
fn all_blank_drawings_fail_with_no_valid_glyphs() {
    let images: BTreeMap<String, Vec<u8>> =
        [("a".to_string(), blank_drawing())].into_iter().collect();
    let err = process_multi_glyph(&images).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::FontBuild(FontBuildError::NoValidGlyphs)
    ));
}

#[test]
fn undecodable_drawing_is_left_out_of_the_font() {
    let images: BTreeMap<String, Vec<u8>> = [
        ("a".to_string(), disc_drawing()),
        ("b".to_string(), b"GIF89a".to_vec()),
    ]
    .into_iter()
    .collect();
    let out = process_multi_glyph(&images).unwrap();
    assert_eq!(out.characters_found, vec!['a']);
    let font = FontRef::new(&out.ttf).unwrap();
    assert!(font.cmap().unwrap().map_codepoint('b').is_none());
}

#[test]
fn outlines_roundtrip_through_json_into_a_font() {
    let outline = process_single_glyph(&ring_drawing(), 'o').unwrap();
    let json = serde_json::to_string(&outline).unwrap();
    assert!(json.contains("\"lsb\""));
    let back: GlyphOutline = serde_json::from_str(&json).unwrap();
    assert_eq!(back, outline);

    let outlines: BTreeMap<char, GlyphOutline> = [('o', back)].into_iter().collect();
    let out = build_font(&outlines).unwrap();
    let font = FontRef::new(&out.ttf).unwrap();
    let gid = font.cmap().unwrap().map_codepoint('o').unwrap();
    let hmtx = font.hmtx().unwrap();
    assert_eq!(hmtx.advance(gid), Some(outline.advance_width as u16));
    assert_eq!(hmtx.side_bearing(gid), Some(outline.left_side_bearing as i16));
}

#[test]
fn family_name_reaches_the_font() {
    let mut config = PipelineConfig::default();
    config.font = FontConfig::default().with_family("Test Hand");
    let outline = process_single_glyph(&disc_drawing(), 'o').unwrap();
    let outlines: BTreeMap<char, GlyphOutline> = [('o', outline)].into_iter().collect();
    let a = handfont::build_font_with_config(&outlines, &config).unwrap();
    let b = build_font(&outlines).unwrap();
    assert_ne!(a.ttf, b.ttf);
    // Windows name records are UTF-16BE
    let needle: Vec<u8> = "Test Hand"
        .encode_utf16()
        .flat_map(|unit| unit.to_be_bytes())
        .collect();
    assert!(a.ttf.windows(needle.len()).any(|w| w == needle.as_slice()));
}
