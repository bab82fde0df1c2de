//! Backend traits and the scoped render session

use crate::frame::{encode_image, FrameEncoding, RasterFrame};
use crate::{PageSize, RasterError, Result};
use image::RgbaImage;
use log::debug;

/// Extra clockwise rotation applied while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderRotation {
    #[default]
    None,
    Degrees90,
    Degrees180,
    Degrees270,
}

impl RenderRotation {
    /// Rotation for a multiple of 90 degrees, normalized into 0..360
    pub fn from_degrees(degrees: i64) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::None),
            90 => Some(Self::Degrees90),
            180 => Some(Self::Degrees180),
            270 => Some(Self::Degrees270),
            _ => None,
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Degrees90 => 90,
            Self::Degrees180 => 180,
            Self::Degrees270 => 270,
        }
    }

    /// Whether output width and height trade places
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Degrees90 | Self::Degrees270)
    }
}

/// A document opened by a rendering engine
///
/// Handles are not assumed safe for concurrent use; pages are rendered one
/// at a time.
pub trait RasterDocument {
    fn page_count(&self) -> usize;

    /// Displayed page size in points, before any extra render rotation
    fn page_size(&self, index: usize) -> Result<PageSize>;

    /// Render a page to RGBA pixels
    ///
    /// `scale` is output pixels per point of page width at zero rotation.
    fn render_page(&mut self, index: usize, scale: f32, rotation: RenderRotation)
        -> Result<RgbaImage>;

    /// Release engine resources; further calls are no-ops
    fn close(&mut self);
}

/// A rendering engine
pub trait RasterBackend {
    /// Parse `bytes` into a renderable document
    fn open<'a>(&'a self, bytes: &[u8]) -> Result<Box<dyn RasterDocument + 'a>>;
}

/// An open document that is closed when the session ends, including when
/// a render fails part way through a batch.
pub struct RenderSession<'a> {
    document: Box<dyn RasterDocument + 'a>,
}

impl<'a> RenderSession<'a> {
    pub fn open<B: RasterBackend + ?Sized>(backend: &'a B, bytes: &[u8]) -> Result<Self> {
        let document = backend.open(bytes)?;
        debug!(
            "opened document for rendering: {} bytes, {} pages",
            bytes.len(),
            document.page_count()
        );
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    pub fn page_size(&self, index: usize) -> Result<PageSize> {
        self.check_index(index)?;
        self.document.page_size(index)
    }

    /// Render a page to pixels
    pub fn render_image(
        &mut self,
        index: usize,
        scale: f32,
        rotation: RenderRotation,
    ) -> Result<RgbaImage> {
        self.check_index(index)?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(RasterError::Render {
                page: index,
                message: format!("invalid scale {scale}"),
            });
        }

        let image = self.document.render_page(index, scale, rotation)?;
        debug!(
            "rendered page {index} at scale {scale}: {}x{}",
            image.width(),
            image.height()
        );
        Ok(image)
    }

    /// Render a page and encode it
    pub fn render_frame(
        &mut self,
        index: usize,
        scale: f32,
        rotation: RenderRotation,
        encoding: FrameEncoding,
    ) -> Result<RasterFrame> {
        let image = self.render_image(index, scale, rotation)?;
        let image_bytes = encode_image(&image, encoding)?;
        debug!("encoded page {index} as {encoding:?}: {} bytes", image_bytes.len());

        Ok(RasterFrame {
            page_index: index,
            pixel_width: image.width(),
            pixel_height: image.height(),
            encoding,
            image_bytes,
        })
    }

    /// Close the document now instead of at drop
    pub fn close(mut self) {
        self.document.close();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        let count = self.document.page_count();
        if index >= count {
            return Err(RasterError::InvalidPage { index, count });
        }
        Ok(())
    }
}

impl Drop for RenderSession<'_> {
    fn drop(&mut self) {
        self.document.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Letter-sized pages; counts how often close is called
    struct CountingBackend {
        closes: Rc<Cell<usize>>,
        fail_on: Option<usize>,
    }

    struct CountingDocument {
        closes: Rc<Cell<usize>>,
        closed: bool,
        fail_on: Option<usize>,
    }

    impl RasterBackend for CountingBackend {
        fn open<'a>(&'a self, _bytes: &[u8]) -> Result<Box<dyn RasterDocument + 'a>> {
            Ok(Box::new(CountingDocument {
                closes: Rc::clone(&self.closes),
                closed: false,
                fail_on: self.fail_on,
            }))
        }
    }

    impl RasterDocument for CountingDocument {
        fn page_count(&self) -> usize {
            3
        }

        fn page_size(&self, _index: usize) -> Result<PageSize> {
            Ok(PageSize::new(612.0, 792.0))
        }

        fn render_page(
            &mut self,
            index: usize,
            scale: f32,
            rotation: RenderRotation,
        ) -> Result<RgbaImage> {
            if self.fail_on == Some(index) {
                return Err(RasterError::Render {
                    page: index,
                    message: "boom".to_string(),
                });
            }
            let (w, h) = crate::expected_frame_size(PageSize::new(612.0, 792.0), scale, rotation);
            Ok(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
        }

        fn close(&mut self) {
            if !self.closed {
                self.closed = true;
                self.closes.set(self.closes.get() + 1);
            }
        }
    }

    fn backend(fail_on: Option<usize>) -> CountingBackend {
        CountingBackend {
            closes: Rc::new(Cell::new(0)),
            fail_on,
        }
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(RenderRotation::from_degrees(0), Some(RenderRotation::None));
        assert_eq!(RenderRotation::from_degrees(-90), Some(RenderRotation::Degrees270));
        assert_eq!(RenderRotation::from_degrees(450), Some(RenderRotation::Degrees90));
        assert_eq!(RenderRotation::from_degrees(45), None);
        assert!(RenderRotation::Degrees270.swaps_axes());
        assert!(!RenderRotation::Degrees180.swaps_axes());
    }

    #[test]
    fn test_render_frame_dimensions() {
        let backend = backend(None);
        let mut session = RenderSession::open(&backend, b"%PDF").unwrap();

        let frame = session
            .render_frame(0, 0.5, RenderRotation::Degrees90, FrameEncoding::Png)
            .unwrap();
        assert_eq!((frame.pixel_width, frame.pixel_height), (396, 306));
        assert_eq!(frame.page_index, 0);
        assert!(!frame.image_bytes.is_empty());
    }

    #[test]
    fn test_invalid_page_and_scale() {
        let backend = backend(None);
        let mut session = RenderSession::open(&backend, b"%PDF").unwrap();

        assert!(matches!(
            session.render_image(3, 1.0, RenderRotation::None),
            Err(RasterError::InvalidPage { index: 3, count: 3 })
        ));
        assert!(matches!(
            session.render_image(0, 0.0, RenderRotation::None),
            Err(RasterError::Render { page: 0, .. })
        ));
    }

    #[test]
    fn test_session_closes_once_on_drop() {
        let backend = backend(None);
        {
            let _session = RenderSession::open(&backend, b"%PDF").unwrap();
        }
        assert_eq!(backend.closes.get(), 1);
    }

    #[test]
    fn test_session_closes_after_failed_render() {
        let backend = backend(Some(1));
        let result = (|| -> Result<Vec<RasterFrame>> {
            let mut session = RenderSession::open(&backend, b"%PDF")?;
            (0..session.page_count())
                .map(|i| session.render_frame(i, 1.0, RenderRotation::None, FrameEncoding::Png))
                .collect()
        })();

        assert!(matches!(result, Err(RasterError::Render { page: 1, .. })));
        assert_eq!(backend.closes.get(), 1);
    }

    #[test]
    fn test_explicit_close_then_drop_is_idempotent() {
        let backend = backend(None);
        let session = RenderSession::open(&backend, b"%PDF").unwrap();
        session.close();
        assert_eq!(backend.closes.get(), 1);
    }
}
