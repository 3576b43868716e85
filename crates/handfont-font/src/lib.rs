//! Font assembly for the handfont pipeline.
//!
//! [`assemble`] turns a character to [`GlyphOutline`] mapping into two
//! containers of the same font: an uncompressed TrueType binary and its
//! WOFF2 re-encoding. Both carry byte-identical tables.
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use handfont_font::{assemble, FontConfig};
//! # fn outlines() -> BTreeMap<char, handfont_outline::GlyphOutline> { BTreeMap::new() }
//! let fonts = assemble(&outlines(), &FontConfig::default())?;
//! std::fs::write("hand.ttf", &fonts.ttf)?;
//! std::fs::write("hand.woff2", &fonts.woff2)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;

use handfont_outline::GlyphOutline;

#[cfg(feature = "tracing")]
use tracing::instrument;

mod asset;
mod config;
mod error;
mod ttf;
mod woff2;

pub use asset::{glyph_name, FontAsset, GlyphRecord, NOTDEF_NAME, SPACE_NAME};
pub use config::{FontConfig, DEFAULT_TIMESTAMP};
pub use error::FontBuildError;
pub use ttf::compile_ttf;
pub use woff2::encode_woff2;

/// The two serialized forms of one font.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontBinaries {
    pub ttf: Vec<u8>,
    pub woff2: Vec<u8>,
    /// Characters that received a glyph, in glyph order.
    pub characters: Vec<char>,
}

/// Build a font from per-character outlines and serialize it twice.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(outlines, config), fields(glyphs = outlines.len()))
)]
pub fn assemble(
    outlines: &BTreeMap<char, GlyphOutline>,
    config: &FontConfig,
) -> Result<FontBinaries, FontBuildError> {
    let asset = FontAsset::from_outlines(outlines, config)?;
    let ttf = compile_ttf(&asset, config)?;
    let woff2 = encode_woff2(&ttf)?;
    log::info!(
        "assembled '{}' with {} glyphs ({} bytes TTF, {} bytes WOFF2)",
        config.full_name(),
        asset.glyphs().len(),
        ttf.len(),
        woff2.len()
    );
    Ok(FontBinaries {
        ttf,
        woff2,
        characters: asset.characters().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use handfont_outline::ContourPath;
    use std::io::Read;
    use write_fonts::read::FontRef;
    use write_fonts::types::Tag;

    fn be32(data: &[u8], at: usize) -> u32 {
        u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
    }

    fn be16(data: &[u8], at: usize) -> u16 {
        u16::from_be_bytes([data[at], data[at + 1]])
    }

    fn sample() -> BTreeMap<char, GlyphOutline> {
        let bar = GlyphOutline {
            paths: vec![ContourPath::new(
                vec![(40, -200), (40, 800), (240, 800), (240, -200)],
                false,
            )],
            advance_width: 280,
            left_side_bearing: 40,
        };
        let ring = GlyphOutline {
            paths: vec![
                ContourPath::new(vec![(90, -200), (90, 800), (890, 800), (890, -200)], false),
                ContourPath::new(vec![(290, 0), (690, 0), (690, 600), (290, 600)], true),
            ],
            advance_width: 980,
            left_side_bearing: 90,
        };
        [('l', bar), ('o', ring)].into_iter().collect()
    }

    #[test]
    fn empty_mapping_has_no_valid_glyphs() {
        let err = assemble(&BTreeMap::new(), &FontConfig::default()).unwrap_err();
        assert!(matches!(err, FontBuildError::NoValidGlyphs));
    }

    #[test]
    fn woff2_wraps_the_same_tables() {
        let fonts = assemble(&sample(), &FontConfig::default()).unwrap();
        assert_eq!(fonts.characters, vec!['l', 'o']);

        let woff = &fonts.woff2;
        assert_eq!(&woff[..4], b"wOF2");
        assert_eq!(be32(woff, 4), 0x0001_0000);
        assert_eq!(be32(woff, 8) as usize, woff.len());
        assert_eq!(woff.len() % 4, 0);

        let ttf = FontRef::new(&fonts.ttf).unwrap();
        let records = ttf.table_directory.table_records();
        let num_tables = be16(woff, 12) as usize;
        assert_eq!(num_tables, records.len());
        let compressed_len = be32(woff, 20) as usize;

        // walk the directory: flags, optional tag, origLength
        let mut pos = 48;
        let mut lengths = Vec::new();
        for _ in 0..num_tables {
            let flags = woff[pos];
            pos += 1;
            if flags & 0x3F == 0x3F {
                pos += 4;
            }
            let mut value = 0u32;
            loop {
                let byte = woff[pos];
                pos += 1;
                value = (value << 7) | (byte & 0x7F) as u32;
                if byte & 0x80 == 0 {
                    break;
                }
            }
            lengths.push(value as usize);
        }

        let mut stream = Vec::new();
        brotli::Decompressor::new(&woff[pos..pos + compressed_len], 4096)
            .read_to_end(&mut stream)
            .unwrap();
        assert_eq!(stream.len(), lengths.iter().sum::<usize>());

        let mut offset = 0;
        for (record, len) in records.iter().zip(&lengths) {
            let original = ttf.table_data(record.tag()).unwrap();
            assert_eq!(&stream[offset..offset + len], original.as_bytes(), "{}", record.tag());
            offset += len;
        }
        assert!(records.iter().any(|r| r.tag() == Tag::new(b"glyf")));
    }

    #[test]
    fn assembly_is_deterministic() {
        let a = assemble(&sample(), &FontConfig::default()).unwrap();
        let b = assemble(&sample(), &FontConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
