/// Errors produced while decoding or binarizing an input image.
#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    #[error("could not decode image data: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels (width={width}, height={height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Errors returned by the phrase segmenter.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("no characters found in image")]
    NoCharactersFound,
    #[error("no valid character regions found ({regions} regions below the size floor)")]
    NoValidRegions { regions: usize },
    #[error("no segmented region could be paired with a phrase letter")]
    NoMatches,
}
