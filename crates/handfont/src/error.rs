use handfont_font::FontBuildError;
use handfont_raster::{RasterError, SegmentError};

/// Failures surfaced by the pipeline operations.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("invalid image")]
    Decode(#[source] RasterError),

    #[error("image preprocessing failed")]
    Preprocess(#[source] RasterError),

    #[error("character segmentation failed")]
    Segmentation(#[from] SegmentError),

    #[error("glyph processing failed for {character:?}")]
    GlyphProcess {
        character: char,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("no valid character images provided")]
    NoValidInput,

    #[error("font generation failed")]
    FontBuild(#[from] FontBuildError),
}

impl From<RasterError> for PipelineError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::Decode(_) => Self::Decode(err),
            RasterError::EmptyImage { .. } => Self::Preprocess(err),
        }
    }
}

impl PipelineError {
    pub(crate) fn for_glyph(character: char, source: impl Into<PipelineError>) -> Self {
        Self::GlyphProcess {
            character,
            source: Box::new(source.into()),
        }
    }

    /// True for the empty-result failures: nothing segmented, nothing supplied,
    /// or nothing left to put in a font.
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            Self::NoValidInput
                | Self::Segmentation(_)
                | Self::FontBuild(FontBuildError::NoValidGlyphs)
        )
    }
}

/// Errors raised while reading or writing JSON files.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
