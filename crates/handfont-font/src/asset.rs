//! The font model both containers are serialized from.

use std::collections::BTreeMap;

use handfont_outline::GlyphOutline;

use crate::{FontBuildError, FontConfig};

/// `.notdef` box: outer 100,0 to 500,700, hole 150,50 to 450,650.
const NOTDEF_CONTOURS: [[(i16, i16); 4]; 2] = [
    [(100, 0), (100, 700), (500, 700), (500, 0)],
    [(150, 50), (450, 50), (450, 650), (150, 650)],
];

/// Largest coordinate magnitude whose point-to-point deltas still fit `i16`.
const COORD_LIMIT: i32 = 16_383;

pub const NOTDEF_NAME: &str = ".notdef";
pub const SPACE_NAME: &str = "space";

/// One entry of the glyph order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRecord {
    pub name: String,
    /// Closed straight-line contours; empty for blank glyphs.
    pub contours: Vec<Vec<(i16, i16)>>,
    pub advance: u16,
    pub lsb: i16,
}

impl GlyphRecord {
    fn blank(name: impl Into<String>, advance: u16, lsb: i16) -> Self {
        Self {
            name: name.into(),
            contours: Vec::new(),
            advance,
            lsb,
        }
    }
}

/// Glyph order, character map and per-glyph geometry of one font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontAsset {
    glyphs: Vec<GlyphRecord>,
    cmap: BTreeMap<char, u16>,
    characters: Vec<char>,
}

impl FontAsset {
    /// Build the font model from per-character outlines.
    ///
    /// Characters without a drawable path are dropped; the space character
    /// is reserved for the built-in space glyph. Fails with
    /// [`FontBuildError::NoValidGlyphs`] when nothing is left.
    pub fn from_outlines(
        outlines: &BTreeMap<char, GlyphOutline>,
        config: &FontConfig,
    ) -> Result<Self, FontBuildError> {
        let mut usable: Vec<(char, &GlyphOutline)> = Vec::with_capacity(outlines.len());
        for (&ch, outline) in outlines {
            if ch == ' ' {
                log::warn!("ignoring outline for the space character");
            } else if !outline.has_ink() {
                log::debug!("dropping {ch:?}: no drawable paths");
            } else {
                usable.push((ch, outline));
            }
        }
        if usable.is_empty() {
            return Err(FontBuildError::NoValidGlyphs);
        }
        let count = usable.len() + 2;
        if count > u16::MAX as usize {
            return Err(FontBuildError::TooManyGlyphs { count });
        }

        let mut glyphs = Vec::with_capacity(count);
        glyphs.push(GlyphRecord {
            name: NOTDEF_NAME.to_string(),
            contours: NOTDEF_CONTOURS.iter().map(|c| c.to_vec()).collect(),
            advance: config.notdef_advance,
            lsb: config.notdef_lsb,
        });
        glyphs.push(GlyphRecord::blank(SPACE_NAME, config.space_advance(), 0));

        let mut cmap = BTreeMap::new();
        cmap.insert(' ', 1u16);
        let mut characters = Vec::with_capacity(usable.len());

        for (index, (ch, outline)) in usable.iter().enumerate() {
            let gid = (index + 2) as u16;
            glyphs.push(glyph_record(*ch, outline));
            cmap.insert(*ch, gid);
            characters.push(*ch);
        }
        for (index, (ch, _)) in usable.iter().enumerate() {
            if let Some(upper) = single_uppercase(*ch) {
                if !outlines.contains_key(&upper) {
                    cmap.insert(upper, (index + 2) as u16);
                }
            }
        }

        log::debug!(
            "font model: {} glyphs, {} cmap entries",
            glyphs.len(),
            cmap.len()
        );
        Ok(Self {
            glyphs,
            cmap,
            characters,
        })
    }

    pub fn glyphs(&self) -> &[GlyphRecord] {
        &self.glyphs
    }

    /// Code point to glyph index.
    pub fn cmap(&self) -> &BTreeMap<char, u16> {
        &self.cmap
    }

    /// Supplied characters that made it into the font, in glyph order.
    pub fn characters(&self) -> &[char] {
        &self.characters
    }

    pub fn glyph_names(&self) -> impl Iterator<Item = &str> {
        self.glyphs.iter().map(|g| g.name.as_str())
    }
}

/// `uniXXXX` with at least four uppercase hex digits.
pub fn glyph_name(ch: char) -> String {
    format!("uni{:04X}", ch as u32)
}

fn single_uppercase(ch: char) -> Option<char> {
    if !ch.is_lowercase() {
        return None;
    }
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) if u != ch => Some(u),
        _ => None,
    }
}

fn glyph_record(ch: char, outline: &GlyphOutline) -> GlyphRecord {
    let name = glyph_name(ch);
    let advance = outline.advance_width.min(u16::MAX as u32) as u16;
    let lsb = outline.left_side_bearing.min(i16::MAX as u32) as i16;

    let contours: Option<Vec<Vec<(i16, i16)>>> = outline
        .drawable_paths()
        .map(|path| {
            path.points
                .iter()
                .map(|&p| to_font_point(p))
                .collect::<Option<Vec<_>>>()
        })
        .collect();

    match contours {
        Some(contours) => GlyphRecord {
            name,
            contours,
            advance,
            lsb,
        },
        None => {
            log::warn!("{ch:?}: outline exceeds TrueType coordinate range, using empty glyph");
            GlyphRecord::blank(name, advance, lsb)
        }
    }
}

fn to_font_point((x, y): (i32, i32)) -> Option<(i16, i16)> {
    let fits = |v: i32| (-COORD_LIMIT..=COORD_LIMIT).contains(&v);
    (fits(x) && fits(y)).then_some((x as i16, y as i16))
}
