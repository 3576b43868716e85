//! TrueType serialization of a [`FontAsset`].

use write_fonts::read::tables::glyf::CurvePoint;
use write_fonts::read::FontRef;
use write_fonts::tables::cmap::Cmap;
use write_fonts::tables::glyf::{Bbox, Contour, GlyfLocaBuilder, SimpleGlyph};
use write_fonts::tables::head::{Flags, Head, MacStyle};
use write_fonts::tables::hhea::Hhea;
use write_fonts::tables::hmtx::{Hmtx, LongMetric};
use write_fonts::tables::maxp::Maxp;
use write_fonts::tables::name::{Name, NameRecord};
use write_fonts::tables::os2::{Os2, SelectionFlags};
use write_fonts::tables::post::Post;
use write_fonts::types::{FWord, Fixed, GlyphId, LongDateTime, NameId, Tag, UfWord};
use write_fonts::FontBuilder;

use crate::{FontAsset, FontBuildError, FontConfig};

/// `head.checksumAdjustment` is `MAGIC - checksum(whole font)`.
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;
/// Offset of `checksumAdjustment` inside `head`.
const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

const WINDOWS_PLATFORM: u16 = 3;
const WINDOWS_UNICODE_BMP: u16 = 1;
const WINDOWS_ENGLISH_US: u16 = 0x409;

/// Serialize `asset` into a complete TrueType binary.
pub fn compile_ttf(asset: &FontAsset, config: &FontConfig) -> Result<Vec<u8>, FontBuildError> {
    let vendor = vendor_tag(&config.vendor_id)?;
    let glyphs = asset.glyphs();
    let num_glyphs = glyphs.len() as u16;

    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut bboxes: Vec<Option<Bbox>> = Vec::with_capacity(glyphs.len());
    let mut max_points = 0u16;
    let mut max_contours = 0u16;
    for record in glyphs {
        let mut glyph = SimpleGlyph {
            contours: record
                .contours
                .iter()
                .map(|c| {
                    Contour::from(
                        c.iter()
                            .map(|&(x, y)| CurvePoint::on_curve(x, y))
                            .collect::<Vec<_>>(),
                    )
                })
                .collect(),
            ..Default::default()
        };
        glyph.recompute_bounding_box();
        let compiled = glyf_builder.add_glyph(&glyph).map(|_| ());
        match compiled {
            Ok(_) if !glyph.contours.is_empty() => {
                let points: usize = glyph.contours.iter().map(Contour::len).sum();
                max_points = max_points.max(points.min(u16::MAX as usize) as u16);
                max_contours = max_contours.max(glyph.contours.len() as u16);
                bboxes.push(Some(glyph.bbox));
            }
            Ok(_) => bboxes.push(None),
            Err(err) => {
                log::warn!("glyph '{}' failed to compile ({err}); using empty glyph", record.name);
                glyf_builder.add_glyph(&SimpleGlyph::default())?;
                bboxes.push(None);
            }
        }
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let font_bbox = bboxes
        .iter()
        .flatten()
        .copied()
        .reduce(Bbox::union)
        .unwrap_or_default();

    let created = LongDateTime::new(config.timestamp);
    let head = Head {
        font_revision: Fixed::from_f64(config.revision()),
        checksum_adjustment: 0,
        flags: Flags::BASELINE_AT_Y_0 | Flags::LSB_AT_X_0,
        units_per_em: config.units_per_em,
        created,
        modified: created,
        x_min: font_bbox.x_min,
        y_min: font_bbox.y_min,
        x_max: font_bbox.x_max,
        y_max: font_bbox.y_max,
        mac_style: MacStyle::empty(),
        lowest_rec_ppem: 8,
        index_to_loc_format: loca_format as i16,
        ..Default::default()
    };

    let extents = HorizontalExtents::measure(glyphs, &bboxes);
    let hhea = Hhea {
        ascender: FWord::new(config.ascender),
        descender: FWord::new(config.descender),
        line_gap: FWord::new(config.line_gap),
        advance_width_max: UfWord::new(extents.advance_max),
        min_left_side_bearing: FWord::new(extents.min_lsb),
        min_right_side_bearing: FWord::new(extents.min_rsb),
        x_max_extent: FWord::new(extents.x_max_extent),
        caret_slope_rise: 1,
        caret_slope_run: 0,
        caret_offset: 0,
        number_of_h_metrics: num_glyphs,
    };
    let hmtx = Hmtx::new(
        glyphs
            .iter()
            .map(|g| LongMetric::new(g.advance, g.lsb))
            .collect(),
        Vec::new(),
    );
    let maxp = Maxp {
        num_glyphs,
        max_points: Some(max_points),
        max_contours: Some(max_contours),
        max_composite_points: Some(0),
        max_composite_contours: Some(0),
        max_zones: Some(2),
        max_twilight_points: Some(0),
        max_storage: Some(0),
        max_function_defs: Some(0),
        max_instruction_defs: Some(0),
        max_stack_elements: Some(0),
        max_size_of_instructions: Some(0),
        max_component_elements: Some(0),
        max_component_depth: Some(0),
    };

    let cmap = Cmap::from_mappings(
        asset
            .cmap()
            .iter()
            .map(|(&ch, &gid)| (ch, GlyphId::new(gid as u32))),
    )?;
    let os2 = os2_table(asset, config, vendor, &font_bbox);
    let name = name_table(config);
    let mut post = Post::new_v2(asset.glyph_names());
    post.underline_position = FWord::new(-100);
    post.underline_thickness = FWord::new(50);

    let mut builder = FontBuilder::new();
    builder
        .add_table(&head)?
        .add_table(&hhea)?
        .add_table(&maxp)?
        .add_table(&os2)?
        .add_table(&hmtx)?
        .add_table(&cmap)?
        .add_table(&loca)?
        .add_table(&glyf)?
        .add_table(&name)?
        .add_table(&post)?;
    let mut bytes = builder.build();
    apply_checksum_adjustment(&mut bytes)?;

    log::debug!(
        "compiled TrueType font: {num_glyphs} glyphs, {} bytes",
        bytes.len()
    );
    Ok(bytes)
}

struct HorizontalExtents {
    advance_max: u16,
    min_lsb: i16,
    min_rsb: i16,
    x_max_extent: i16,
}

impl HorizontalExtents {
    /// Side bearings and extents only count glyphs with contours.
    fn measure(glyphs: &[crate::GlyphRecord], bboxes: &[Option<Bbox>]) -> Self {
        let advance_max = glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
        let mut min_lsb = i16::MAX;
        let mut min_rsb = i16::MAX;
        let mut x_max_extent = i16::MIN;
        for (glyph, bbox) in glyphs.iter().zip(bboxes) {
            let Some(bbox) = bbox else { continue };
            let width = bbox.x_max as i32 - bbox.x_min as i32;
            let extent = glyph.lsb as i32 + width;
            let rsb = glyph.advance as i32 - extent;
            min_lsb = min_lsb.min(glyph.lsb);
            min_rsb = min_rsb.min(clamp_i16(rsb));
            x_max_extent = x_max_extent.max(clamp_i16(extent));
        }
        if x_max_extent == i16::MIN {
            return Self {
                advance_max,
                min_lsb: 0,
                min_rsb: 0,
                x_max_extent: 0,
            };
        }
        Self {
            advance_max,
            min_lsb,
            min_rsb,
            x_max_extent,
        }
    }
}

fn clamp_i16(v: i32) -> i16 {
    v.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

fn os2_table(asset: &FontAsset, config: &FontConfig, vendor: Tag, bbox: &Bbox) -> Os2 {
    let advances: Vec<u32> = asset
        .glyphs()
        .iter()
        .map(|g| g.advance as u32)
        .filter(|&a| a > 0)
        .collect();
    let avg_width = if advances.is_empty() {
        0
    } else {
        let sum: u32 = advances.iter().sum();
        (sum as f64 / advances.len() as f64).round() as i16
    };

    let codepoints = || asset.cmap().keys().map(|&c| c as u32);
    let first = codepoints().min().unwrap_or(0).min(0xFFFF) as u16;
    let last = codepoints().max().unwrap_or(0).min(0xFFFF) as u16;
    let mut unicode_range_1 = 0u32;
    if codepoints().any(|c| (0x20..0x7F).contains(&c)) {
        unicode_range_1 |= 1 << 0;
    }
    if codepoints().any(|c| (0x80..0x100).contains(&c)) {
        unicode_range_1 |= 1 << 1;
    }

    let upem = config.units_per_em as i32;
    let scaled = |ratio: f64| (upem as f64 * ratio).round() as i16;
    let win_ascent = (config.ascender as i32).max(bbox.y_max as i32).max(0);
    let win_descent = (-(config.descender as i32)).max(-(bbox.y_min as i32)).max(0);

    Os2 {
        x_avg_char_width: avg_width,
        us_weight_class: 400,
        us_width_class: 5,
        fs_type: 0,
        y_subscript_x_size: scaled(0.65),
        y_subscript_y_size: scaled(0.6),
        y_subscript_y_offset: scaled(0.075),
        y_superscript_x_size: scaled(0.65),
        y_superscript_y_size: scaled(0.6),
        y_superscript_y_offset: scaled(0.35),
        y_strikeout_size: scaled(0.05),
        y_strikeout_position: scaled(0.25),
        ul_unicode_range_1: unicode_range_1,
        ach_vend_id: vendor,
        fs_selection: SelectionFlags::REGULAR,
        us_first_char_index: first,
        us_last_char_index: last,
        s_typo_ascender: config.ascender,
        s_typo_descender: config.descender,
        s_typo_line_gap: config.line_gap,
        us_win_ascent: win_ascent.min(u16::MAX as i32) as u16,
        us_win_descent: win_descent.min(u16::MAX as i32) as u16,
        // Latin 1
        ul_code_page_range_1: Some(1),
        ul_code_page_range_2: Some(0),
        sx_height: Some(config.x_height),
        s_cap_height: Some(config.cap_height),
        us_default_char: Some(0),
        us_break_char: Some(0x20),
        us_max_context: Some(0),
        ..Default::default()
    }
}

fn name_table(config: &FontConfig) -> Name {
    let unique_id = format!(
        "{}.{:03};{};{}",
        config.version.0,
        config.version.1,
        config.vendor_id.trim(),
        config.postscript_name()
    );
    let entries = [
        (NameId::FAMILY_NAME, config.family_name.clone()),
        (NameId::SUBFAMILY_NAME, config.style_name.clone()),
        (NameId::UNIQUE_ID, unique_id),
        (NameId::FULL_NAME, config.full_name()),
        (NameId::VERSION_STRING, config.version_string()),
        (NameId::POSTSCRIPT_NAME, config.postscript_name()),
    ];
    let mut name = Name::default();
    for (id, value) in entries {
        name.name_record.push(NameRecord::new(
            WINDOWS_PLATFORM,
            WINDOWS_UNICODE_BMP,
            WINDOWS_ENGLISH_US,
            id,
            value.into(),
        ));
    }
    name.name_record.sort();
    name
}

/// Space-padded four-byte tag from 1 to 4 printable ASCII characters.
fn vendor_tag(id: &str) -> Result<Tag, FontBuildError> {
    let bytes = id.as_bytes();
    if bytes.is_empty() || bytes.len() > 4 || !bytes.iter().all(|b| (0x20..0x7F).contains(b)) {
        return Err(FontBuildError::InvalidVendorId(id.to_string()));
    }
    let mut raw = [b' '; 4];
    raw[..bytes.len()].copy_from_slice(bytes);
    Ok(Tag::new(&raw))
}

/// Sum of a byte run read as big-endian `u32` words, zero padded.
pub(crate) fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

/// Patch `head.checksumAdjustment` so the whole font sums to the magic value.
fn apply_checksum_adjustment(bytes: &mut [u8]) -> Result<(), FontBuildError> {
    let head_offset = {
        let font = FontRef::new(bytes)?;
        let record = font
            .table_directory
            .table_records()
            .iter()
            .find(|r| r.tag() == Tag::new(b"head"))
            .ok_or(FontBuildError::MissingTable("head"))?;
        record.offset() as usize
    };
    let at = head_offset + CHECKSUM_ADJUSTMENT_OFFSET;
    let slot = bytes
        .get_mut(at..at + 4)
        .ok_or(FontBuildError::MissingTable("head"))?;
    slot.copy_from_slice(&[0; 4]);
    let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(bytes));
    bytes[at..at + 4].copy_from_slice(&adjustment.to_be_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use handfont_outline::{ContourPath, GlyphOutline};
    use std::collections::BTreeMap;
    use write_fonts::read::tables::glyf::Glyph;
    use write_fonts::read::TableProvider;

    fn triangle() -> GlyphOutline {
        GlyphOutline {
            paths: vec![ContourPath::new(vec![(50, -200), (300, 800), (550, -200)], false)],
            advance_width: 600,
            left_side_bearing: 50,
        }
    }

    fn ring() -> GlyphOutline {
        GlyphOutline {
            paths: vec![
                ContourPath::new(vec![(100, -200), (100, 800), (900, 800), (900, -200)], false),
                ContourPath::new(vec![(300, 0), (700, 0), (700, 600), (300, 600)], true),
            ],
            advance_width: 1000,
            left_side_bearing: 100,
        }
    }

    fn build(outlines: &[(char, GlyphOutline)]) -> Vec<u8> {
        let map: BTreeMap<char, GlyphOutline> = outlines.iter().cloned().collect();
        let config = FontConfig::default();
        let asset = FontAsset::from_outlines(&map, &config).unwrap();
        compile_ttf(&asset, &config).unwrap()
    }

    #[test]
    fn font_reads_back_with_expected_tables() {
        let bytes = build(&[('a', triangle()), ('o', ring())]);
        let font = FontRef::new(&bytes).unwrap();
        let tags: Vec<Tag> = font
            .table_directory
            .table_records()
            .iter()
            .map(|r| r.tag())
            .collect();
        for tag in [
            b"OS/2", b"cmap", b"glyf", b"head", b"hhea", b"hmtx", b"loca", b"maxp", b"name",
            b"post",
        ] {
            assert!(tags.contains(&Tag::new(tag)), "missing {tag:?}");
        }

        let head = font.head().unwrap();
        assert_eq!(head.units_per_em(), 1000);
        assert_eq!(head.y_max(), 800);
        assert_eq!(head.y_min(), -200);
        assert_eq!(font.maxp().unwrap().num_glyphs(), 4);
        assert_eq!(font.hhea().unwrap().ascender().to_i16(), 800);
        assert_eq!(font.hhea().unwrap().descender().to_i16(), -200);
        let os2 = font.os2().unwrap();
        assert_eq!(os2.sx_height(), Some(500));
        assert_eq!(os2.s_cap_height(), Some(700));
        assert_eq!(os2.s_typo_descender(), -200);
        assert_ne!(os2.fs_selection().bits() & (1 << 6), 0, "regular bit");
    }

    #[test]
    fn post_carries_glyph_names_and_underline() {
        let bytes = build(&[('a', triangle()), ('o', ring())]);
        let font = FontRef::new(&bytes).unwrap();
        let post = font.post().unwrap();
        assert_eq!(post.version(), write_fonts::types::Version16Dot16::VERSION_2_0);
        assert_eq!(post.num_glyphs(), Some(4));
        assert_eq!(post.underline_position().to_i16(), -100);
        assert_eq!(post.underline_thickness().to_i16(), 50);
    }

    #[test]
    fn cmap_and_metrics_follow_glyph_order() {
        let bytes = build(&[('a', triangle()), ('o', ring())]);
        let font = FontRef::new(&bytes).unwrap();
        let cmap = font.cmap().unwrap();
        let a = cmap.map_codepoint('a').unwrap();
        assert_eq!(a, GlyphId::new(2));
        assert_eq!(cmap.map_codepoint('A'), Some(a));
        assert_eq!(cmap.map_codepoint('O'), cmap.map_codepoint('o'));
        assert_eq!(cmap.map_codepoint(' '), Some(GlyphId::new(1)));
        assert_eq!(cmap.map_codepoint('z'), None);

        let hmtx = font.hmtx().unwrap();
        assert_eq!(hmtx.advance(GlyphId::new(0)), Some(600));
        assert_eq!(hmtx.advance(GlyphId::new(1)), Some(250));
        assert_eq!(hmtx.advance(GlyphId::new(3)), Some(1000));
        assert_eq!(hmtx.side_bearing(GlyphId::new(3)), Some(100));
    }

    #[test]
    fn outlines_survive_serialization() {
        let bytes = build(&[('o', ring())]);
        let font = FontRef::new(&bytes).unwrap();
        let glyf = font.glyf().unwrap();
        let loca = font.loca(None).unwrap();

        let Some(Glyph::Simple(o)) = loca.get_glyf(GlyphId::new(2), &glyf).unwrap() else {
            panic!("expected a simple glyph");
        };
        assert_eq!(o.end_pts_of_contours().len(), 2);
        let points: Vec<(i16, i16)> = o.points().map(|p| (p.x, p.y)).collect();
        assert_eq!(points[..4], [(100, -200), (100, 800), (900, 800), (900, -200)]);
        assert_eq!(points[4..], [(300, 0), (700, 0), (700, 600), (300, 600)]);

        let Some(Glyph::Simple(notdef)) = loca.get_glyf(GlyphId::new(0), &glyf).unwrap() else {
            panic!("expected notdef outline");
        };
        assert_eq!(notdef.num_points(), 8);
        assert!(loca.get_glyf(GlyphId::new(1), &glyf).unwrap().is_none());
    }

    #[test]
    fn whole_font_checksum_matches_magic() {
        let bytes = build(&[('a', triangle())]);
        assert_eq!(checksum(&bytes), CHECKSUM_MAGIC);
    }

    #[test]
    fn output_is_byte_identical_across_runs() {
        let first = build(&[('a', triangle()), ('o', ring())]);
        let second = build(&[('a', triangle()), ('o', ring())]);
        assert_eq!(first, second);
    }

    #[test]
    fn vendor_id_is_validated() {
        assert_eq!(vendor_tag("AB").unwrap(), Tag::new(b"AB  "));
        assert!(vendor_tag("").is_err());
        assert!(vendor_tag("TOOLONG").is_err());
    }
}
