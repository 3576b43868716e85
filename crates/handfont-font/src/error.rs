use write_fonts::read::ReadError;
use write_fonts::tables::cmap::CmapConflict;
use write_fonts::BuilderError;

/// Errors raised while assembling or serializing a font.
#[derive(thiserror::Error, Debug)]
pub enum FontBuildError {
    #[error("no valid glyphs to build a font from")]
    NoValidGlyphs,
    #[error("too many glyphs for a TrueType font: {count}")]
    TooManyGlyphs { count: usize },
    #[error("vendor id must be 1 to 4 printable ASCII characters, got {0:?}")]
    InvalidVendorId(String),
    #[error("character map conflict: {0}")]
    Cmap(#[from] CmapConflict),
    #[error("failed to compile glyph: {0}")]
    Glyph(#[from] write_fonts::error::Error),
    #[error("failed to compile table: {0}")]
    Table(#[from] BuilderError),
    #[error("assembled font does not parse: {0}")]
    Reparse(#[from] ReadError),
    #[error("font binary is missing the '{0}' table")]
    MissingTable(&'static str),
    #[error("WOFF2 compression failed: {0}")]
    Compress(#[from] std::io::Error),
}
