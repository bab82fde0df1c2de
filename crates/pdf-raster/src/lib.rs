//! PDF Raster - Page rasterization
//!
//! This crate provides:
//! - The [`RasterBackend`]/[`RasterDocument`] traits that rendering engines implement
//! - A PDFium-backed implementation ([`PdfiumBackend`])
//! - Process-wide backend configuration, set once at startup ([`configure`])
//! - [`RenderSession`], a scoped handle that always closes the document
//! - JPEG/PNG encoding of rendered pages into [`RasterFrame`]s
//!
//! # Example
//!
//! ```ignore
//! use pdf_raster::{FrameEncoding, PdfiumBackend, RenderRotation, RenderSession};
//!
//! let backend = PdfiumBackend::from_config()?;
//! let mut session = RenderSession::open(&backend, &bytes)?;
//! let frame = session.render_frame(0, 2.0, RenderRotation::None, FrameEncoding::Jpeg { quality: 80 })?;
//! ```

mod backend;
mod config;
mod frame;
mod pdfium;

pub use backend::{RasterBackend, RasterDocument, RenderRotation, RenderSession};
pub use config::{configure, current_config, RasterConfig};
pub use frame::{encode_image, expected_frame_size, FrameEncoding, RasterFrame};
pub use pdf_core::PageSize;
pub use pdfium::PdfiumBackend;

use thiserror::Error;

/// Errors that can occur while rasterizing
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Failed to open document for rendering: {0}")]
    Open(String),

    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("Invalid page index: {index} (document has {count} pages)")]
    InvalidPage { index: usize, count: usize },

    #[error("Failed to encode frame: {0}")]
    Encode(String),

    #[error("Rendering backend unavailable: {0}")]
    Backend(String),

    #[error("Raster configuration was already set")]
    AlreadyConfigured,
}

/// Result type for raster operations
pub type Result<T> = std::result::Result<T, RasterError>;

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        RasterError::Encode(err.to_string())
    }
}
