//! PDFium rendering engine

use crate::backend::{RasterBackend, RasterDocument, RenderRotation};
use crate::config::{current_config, RasterConfig};
use crate::{PageSize, RasterError, Result};
use image::RgbaImage;
use log::{debug, warn};
use pdfium_render::prelude::*;

/// Renders pages through a bound PDFium library
pub struct PdfiumBackend {
    pdfium: Pdfium,
}

impl PdfiumBackend {
    /// Bind using the process-wide configuration
    pub fn from_config() -> Result<Self> {
        Self::with_config(&current_config())
    }

    pub fn with_config(config: &RasterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pdfium: Pdfium::new(bind(config)?),
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn bind(config: &RasterConfig) -> Result<Box<dyn PdfiumLibraryBindings>> {
    match &config.library_path {
        Some(path) => {
            debug!("binding pdfium at {}", path.display());
            Pdfium::bind_to_library(path.to_string_lossy().into_owned())
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| RasterError::Backend(format!("{e:?}")))
}

/// In the browser PDFium is the module loaded alongside the page
#[cfg(target_arch = "wasm32")]
fn bind(_config: &RasterConfig) -> Result<Box<dyn PdfiumLibraryBindings>> {
    Pdfium::bind_to_system_library().map_err(|e| RasterError::Backend(format!("{e:?}")))
}

impl RasterBackend for PdfiumBackend {
    fn open<'a>(&'a self, bytes: &[u8]) -> Result<Box<dyn RasterDocument + 'a>> {
        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes.to_vec(), None)
            .map_err(|e| RasterError::Open(format!("{e:?}")))?;
        let page_count = document.pages().len() as usize;

        Ok(Box::new(PdfiumDocument {
            document: Some(document),
            page_count,
        }))
    }
}

struct PdfiumDocument<'a> {
    /// `None` once closed
    document: Option<PdfDocument<'a>>,
    page_count: usize,
}

impl<'a> PdfiumDocument<'a> {
    fn page(&self, index: usize) -> Result<PdfPage<'_>> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| RasterError::Backend("document is closed".to_string()))?;
        let invalid = || RasterError::InvalidPage {
            index,
            count: self.page_count,
        };
        let page_index = index.try_into().map_err(|_| invalid())?;
        document.pages().get(page_index).map_err(|_| invalid())
    }
}

impl RasterDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_size(&self, index: usize) -> Result<PageSize> {
        let page = self.page(index)?;
        Ok(PageSize::new(
            page.width().value as f64,
            page.height().value as f64,
        ))
    }

    fn render_page(
        &mut self,
        index: usize,
        scale: f32,
        rotation: RenderRotation,
    ) -> Result<RgbaImage> {
        let page = self.page(index)?;
        let config = PdfRenderConfig::new()
            .scale_page_by_factor(scale)
            .rotate(rotation.into(), false);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| RasterError::Render {
                page: index,
                message: format!("{e:?}"),
            })?;
        Ok(bitmap.as_image().into_rgba8())
    }

    fn close(&mut self) {
        if self.document.take().is_some() {
            debug!("closed pdfium document ({} pages)", self.page_count);
        }
    }
}

impl Drop for PdfiumDocument<'_> {
    fn drop(&mut self) {
        if self.document.is_some() {
            warn!("pdfium document dropped without close");
        }
    }
}

impl From<RenderRotation> for PdfPageRenderRotation {
    fn from(rotation: RenderRotation) -> Self {
        match rotation {
            RenderRotation::None => PdfPageRenderRotation::None,
            RenderRotation::Degrees90 => PdfPageRenderRotation::Degrees90,
            RenderRotation::Degrees180 => PdfPageRenderRotation::Degrees180,
            RenderRotation::Degrees270 => PdfPageRenderRotation::Degrees270,
        }
    }
}
