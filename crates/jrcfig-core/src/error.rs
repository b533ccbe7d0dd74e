//! Error types for the jrcfig-core library.

use thiserror::Error;

/// Main error type for the jrcfig library.
#[derive(Error, Debug)]
pub enum JrcfigError {
    /// PDF structure or content-stream error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Rasterization error from the rendering backend.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Image encoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading PDF structure.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid (zero-based) page index requested.
    #[error("invalid page index: {0}")]
    InvalidPage(usize),

    /// Placement rectangles of an image could not be determined.
    #[error("cannot locate image {image} on page index {page}: {reason}")]
    Placement {
        page: usize,
        image: String,
        reason: String,
    },
}

/// Errors related to rasterizing pages.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The native rendering library could not be bound.
    #[error("rendering library unavailable: {0}")]
    BackendUnavailable(String),

    /// The rendering library failed to open the document.
    #[error("failed to load document for rendering: {0}")]
    Load(String),

    /// Rendering a single page failed.
    #[error("failed to render page index {page}: {reason}")]
    Page { page: usize, reason: String },
}

/// Result type for the jrcfig library.
pub type Result<T> = std::result::Result<T, JrcfigError>;
