//! End-to-end operations: image bytes in, font binaries or outlines out.

use std::collections::BTreeMap;

use handfont_core::BinaryMask;
use handfont_font::assemble;
use handfont_outline::{vectorize, GlyphOutline};
use handfont_raster::{binarize, decode_luma, extract, segment};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{PipelineConfig, PipelineError};

/// A finished font in both containers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontOutput {
    /// Uncompressed TrueType binary.
    pub ttf: Vec<u8>,
    /// WOFF2 re-encoding of the same tables.
    pub woff2: Vec<u8>,
    /// Characters that received a glyph.
    pub characters_found: Vec<char>,
}

/// Photo of a copied phrase to font, with default settings.
pub fn process_phrase(image_bytes: &[u8], phrase: &str) -> Result<FontOutput, PipelineError> {
    process_phrase_with_config(image_bytes, phrase, &PipelineConfig::default())
}

/// Photo of a copied phrase to font.
///
/// The photo is binarized, split into one region per letter and paired with
/// the phrase letters in reading order. `characters_found` keeps that order.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(image_bytes, config),
        fields(bytes = image_bytes.len(), phrase = %phrase)
    )
)]
pub fn process_phrase_with_config(
    image_bytes: &[u8],
    phrase: &str,
    config: &PipelineConfig,
) -> Result<FontOutput, PipelineError> {
    let img = decode_luma(image_bytes)?;
    let mask = binarize(&img, &config.photo);
    let blobs = segment(&mask, phrase, &config.segment)?;

    let mut order = Vec::with_capacity(blobs.len());
    let mut outlines = BTreeMap::new();
    for blob in &blobs {
        outlines.insert(blob.character, vectorize(&blob.mask, &config.outline));
        order.push(blob.character);
    }

    let fonts = assemble(&outlines, &config.font)?;
    let characters_found: Vec<char> = order
        .into_iter()
        .filter(|ch| fonts.characters.contains(ch))
        .collect();
    log::info!(
        "phrase font: {} of {} segmented characters kept",
        characters_found.len(),
        blobs.len()
    );
    Ok(FontOutput {
        ttf: fonts.ttf,
        woff2: fonts.woff2,
        characters_found,
    })
}

/// One drawn character to its outline, with default settings.
pub fn process_single_glyph(
    image_bytes: &[u8],
    character: char,
) -> Result<GlyphOutline, PipelineError> {
    process_single_glyph_with_config(image_bytes, character, &PipelineConfig::default())
}

/// One drawn character to its outline.
///
/// A blank drawing is not an error; it yields an outline without paths.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(image_bytes, config),
        fields(bytes = image_bytes.len())
    )
)]
pub fn process_single_glyph_with_config(
    image_bytes: &[u8],
    character: char,
    config: &PipelineConfig,
) -> Result<GlyphOutline, PipelineError> {
    let glyph = drawn_glyph_mask(image_bytes, config)
        .map_err(|err| PipelineError::for_glyph(character, err))?;
    let outline = vectorize(&glyph, &config.outline);
    log::debug!(
        "{character:?}: {} paths, advance {}",
        outline.paths.len(),
        outline.advance_width
    );
    Ok(outline)
}

/// Several drawn characters to a font, with default settings.
pub fn process_multi_glyph(
    images: &BTreeMap<String, Vec<u8>>,
) -> Result<FontOutput, PipelineError> {
    process_multi_glyph_with_config(images, &PipelineConfig::default())
}

/// Several drawn characters to a font.
///
/// Keys must be a single letter and are lowercased; anything else is
/// skipped. Characters whose drawing cannot be decoded or has no usable ink
/// are left out of the font; when none survive the result is
/// [`FontBuildError::NoValidGlyphs`](handfont_font::FontBuildError::NoValidGlyphs).
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(images, config), fields(inputs = images.len()))
)]
pub fn process_multi_glyph_with_config(
    images: &BTreeMap<String, Vec<u8>>,
    config: &PipelineConfig,
) -> Result<FontOutput, PipelineError> {
    let mut inputs: BTreeMap<char, &[u8]> = BTreeMap::new();
    for (key, bytes) in images {
        match normalize_key(key) {
            Some(ch) => {
                if inputs.insert(ch, bytes.as_slice()).is_some() {
                    log::warn!("duplicate drawing for {ch:?}, keeping {key:?}");
                }
            }
            None => log::warn!("ignoring drawing keyed {key:?}: not a single letter"),
        }
    }
    if inputs.is_empty() {
        return Err(PipelineError::NoValidInput);
    }

    let mut outlines = BTreeMap::new();
    for (&ch, bytes) in &inputs {
        match drawn_glyph_mask(bytes, config) {
            Ok(glyph) => {
                outlines.insert(ch, vectorize(&glyph, &config.outline));
            }
            Err(err) => log::warn!("skipping drawing for {ch:?}: {err}"),
        }
    }
    build_font_with_config(&outlines, config)
}

/// Precomputed outlines to a font, with default settings.
pub fn build_font(outlines: &BTreeMap<char, GlyphOutline>) -> Result<FontOutput, PipelineError> {
    build_font_with_config(outlines, &PipelineConfig::default())
}

/// Precomputed outlines to a font.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(outlines, config), fields(glyphs = outlines.len()))
)]
pub fn build_font_with_config(
    outlines: &BTreeMap<char, GlyphOutline>,
    config: &PipelineConfig,
) -> Result<FontOutput, PipelineError> {
    let fonts = assemble(outlines, &config.font)?;
    Ok(FontOutput {
        ttf: fonts.ttf,
        woff2: fonts.woff2,
        characters_found: fonts.characters,
    })
}

/// Canvas binarization followed by square centering.
fn drawn_glyph_mask(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<BinaryMask, PipelineError> {
    let img = decode_luma(image_bytes)?;
    let mask = binarize(&img, &config.canvas);
    Ok(extract(&mask, &config.extract))
}

/// `"a"`, `"B"`, `"é"` map to their lowercase letter; anything else is rejected.
fn normalize_key(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let ch = chars.next()?;
    if chars.next().is_some() || !ch.is_alphabetic() {
        return None;
    }
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => Some(l),
        _ => Some(ch),
    }
}
