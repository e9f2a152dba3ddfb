//! Error types for pdfoutline.

use std::io;
use thiserror::Error;

/// Result type alias for pdfoutline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding documents or emitting outlines.
///
/// The structure-inference pipeline itself never fails on decodable input;
/// every variant here originates in decoding, configuration, or output.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognised as a PDF file.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF header carries a version string we cannot read.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// A page could not be turned into text fragments.
    #[error("Decode failure on page {page}: {reason}")]
    Decode { page: u32, reason: String },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),

    /// A configuration value is unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Error while rendering the outline (JSON, text).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::Render(format!("JSON error: {}", err))
        }
    }
}
