//! Error types for the OCR pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting up the engine or recognizing an image.
#[derive(Error, Debug)]
pub enum OcrError {
    /// No language was requested
    #[error("At least one language code is required")]
    NoLanguages,

    /// Language code with no known Tesseract model
    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),

    /// Confidence threshold outside [0, 1]
    #[error("Confidence threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("Tesseract not found. Please install Tesseract-OCR or set tesseract_path in config.json")]
    TesseractNotFound,

    #[error("Failed to download {code}.traineddata: {reason}")]
    TessdataDownload { code: String, reason: String },

    #[error("Image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("Failed to read image {}: {source}", path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Corrupt file or format the decoder does not support
    #[error("Failed to decode image {}: {source}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Tesseract failed: {0}")]
    TesseractFailed(String),

    #[error("Failed to read Tesseract output: {0}")]
    TesseractOutput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OcrError>;
