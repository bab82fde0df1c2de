//! PDF Core - Low-level PDF document adapter
//!
//! This crate provides functionality for:
//! - Loading PDF bytes into an editable page tree (encrypted input is rejected)
//! - Creating empty documents and copying pages between documents
//! - Setting page rotation and adding blank pages
//! - Embedding JPEG/PNG images and drawing them onto pages
//! - Stamping text overlays with the standard Helvetica-Bold font or an embedded TrueType font
//! - Stripping document metadata
//! - Serializing, optionally in a compacted form that merges duplicate objects
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{PdfDocument, SaveOptions};
//!
//! let source = PdfDocument::load(&bytes)?;
//! let mut output = PdfDocument::new();
//! for page in output.copy_pages(&source, &[2, 0])? {
//!     output.append_page(page)?;
//! }
//! let bytes = output.to_bytes(SaveOptions::default())?;
//! ```

mod compact;
mod document;
mod font;
mod image;
mod import;
mod metadata;
mod text;

pub use document::{ImageHandle, PageHandle, PageSize, PdfDocument, SaveOptions};
pub use font::{Font, FontData, FontHandle, StandardFont};
pub use image::{generate_image_operators, ImageFormat, ImageXObject};
pub use text::{generate_text_operators, Color, TextRenderContext, TextRun};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    OpenError(String),

    #[error("PDF is encrypted or password protected")]
    Encrypted,

    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Invalid page index: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Font cannot encode character {0:?}")]
    FontEncoding(char),

    #[error("PDF parsing error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Normalize a rotation in degrees to one of 0, 90, 180 or 270.
///
/// Values that are not a multiple of 90 are snapped down to the previous
/// quarter turn, matching how viewers treat a malformed `/Rotate`.
pub fn normalize_rotation(degrees: i64) -> i32 {
    let residue = degrees.rem_euclid(360);
    (residue - residue % 90) as i32
}
