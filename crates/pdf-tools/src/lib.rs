//! PDF Tools - Document transformation operations
//!
//! This crate provides one operation per tool, each a function of input
//! files and parameters that builds a fresh output document:
//! - [`merge`], [`split`], [`rotate`], [`organize`]
//! - [`compress`] (metadata stripping, compaction or full rasterization)
//! - [`images_to_pdf`] and [`pdf_to_images`]
//! - [`watermark`]
//!
//! It also contains the page range parser, watermark placement geometry, the
//! archive packer and the parameter types the UI fills in.
//!
//! # Example
//!
//! ```ignore
//! use pdf_tools::{split, InputFile};
//!
//! let input = InputFile::pdf("report.pdf", bytes);
//! let output = split(&input, "1-3, 7")?;
//! assert_eq!(output.suggested_name, "extracted.pdf");
//! ```

mod archive;
mod descriptors;
mod files;
pub mod geometry;
mod ops;
mod params;
mod report;
mod selection;
mod session;

pub use archive::ArchiveBuilder;
pub use descriptors::{PageDescriptor, PageDescriptorList};
pub use files::{InputFile, OutputFile};
pub use ops::{
    compress, images_to_pdf, merge, organize, page_count, pdf_to_images, render_thumbnail,
    rotate, split, watermark, CompressOutput,
};
pub use params::*;
pub use report::CompressionReport;
pub use selection::{format_selection, parse_ranges};
pub use session::{SessionState, ToolSession};

use pdf_core::PdfError;
use pdf_raster::RasterError;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced to the caller of an operation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolError {
    #[error("Not a readable PDF document: {0}")]
    MalformedDocument(String),

    #[error("Selection is empty: {0}")]
    EmptySelection(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Unsupported file {name} ({mime_type})")]
    UnsupportedAsset { name: String, mime_type: String },

    #[error("Failed to write output: {0}")]
    SerializationError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Fieldless discriminant of [`ToolError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    MalformedDocument,
    EmptySelection,
    RenderError,
    UnsupportedAsset,
    SerializationError,
    InvalidParameter,
}

impl ToolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::MalformedDocument(_) => ErrorKind::MalformedDocument,
            ToolError::EmptySelection(_) => ErrorKind::EmptySelection,
            ToolError::RenderError(_) => ErrorKind::RenderError,
            ToolError::UnsupportedAsset { .. } => ErrorKind::UnsupportedAsset,
            ToolError::SerializationError(_) => ErrorKind::SerializationError,
            ToolError::InvalidParameter(_) => ErrorKind::InvalidParameter,
        }
    }
}

impl From<PdfError> for ToolError {
    fn from(err: PdfError) -> Self {
        let message = err.to_string();
        match err {
            PdfError::OpenError(_)
            | PdfError::Encrypted
            | PdfError::ParseError(_)
            | PdfError::LopdfError(_)
            | PdfError::ImageError(_) => ToolError::MalformedDocument(message),
            PdfError::SaveError(_) | PdfError::IoError(_) => ToolError::SerializationError(message),
            PdfError::InvalidPage(..) | PdfError::FontParseError(_) | PdfError::FontEncoding(_) => {
                ToolError::InvalidParameter(message)
            }
        }
    }
}

impl From<RasterError> for ToolError {
    fn from(err: RasterError) -> Self {
        let message = err.to_string();
        match err {
            RasterError::Open(_) => ToolError::MalformedDocument(message),
            RasterError::InvalidPage { .. } => ToolError::InvalidParameter(message),
            RasterError::Render { .. }
            | RasterError::Encode(_)
            | RasterError::Backend(_)
            | RasterError::AlreadyConfigured => ToolError::RenderError(message),
        }
    }
}

impl From<zip::result::ZipError> for ToolError {
    fn from(err: zip::result::ZipError) -> Self {
        ToolError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for ToolError {
    fn from(err: std::io::Error) -> Self {
        ToolError::SerializationError(err.to_string())
    }
}

/// Result type for tool operations
pub type Result<T> = std::result::Result<T, ToolError>;
