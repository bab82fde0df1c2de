use crate::archive::{ArchiveBuilder, ZIP_MIME_TYPE};
use crate::params::{EXPORT_JPEG_QUALITY, EXPORT_RENDER_SCALE};
use crate::{InputFile, OutputFile, Result, ToolError};
use log::debug;
use pdf_core::PdfDocument;
use pdf_raster::{FrameEncoding, RasterBackend, RasterFrame, RenderRotation, RenderSession};

/// Render every page to a JPEG and pack them as `page-<n>.jpg`
///
/// Any page failing to render fails the whole export.
pub fn pdf_to_images<B>(file: &InputFile, backend: &B) -> Result<OutputFile>
where
    B: RasterBackend + ?Sized,
{
    let encoding = FrameEncoding::Jpeg {
        quality: EXPORT_JPEG_QUALITY,
    };
    let mut session = RenderSession::open(backend, &file.bytes)?;
    let mut archive = ArchiveBuilder::new();

    for index in 0..session.page_count() {
        let frame =
            session.render_frame(index, EXPORT_RENDER_SCALE, RenderRotation::None, encoding)?;
        let name = format!("page-{}.{}", index + 1, encoding.extension());
        archive.add(&name, &frame.image_bytes)?;
    }
    session.close();

    Ok(OutputFile::new(archive.finish()?, ZIP_MIME_TYPE, "images.zip"))
}

/// Render one page as a PNG exactly `target_width` pixels wide
///
/// The width is measured after `rotation` is applied.
pub fn render_thumbnail<B>(
    backend: &B,
    bytes: &[u8],
    page_index: usize,
    target_width: u32,
    rotation: RenderRotation,
) -> Result<RasterFrame>
where
    B: RasterBackend + ?Sized,
{
    if target_width == 0 {
        return Err(ToolError::InvalidParameter(
            "thumbnail width must be positive".to_string(),
        ));
    }

    let mut session = RenderSession::open(backend, bytes)?;
    let size = session.page_size(page_index)?.rotated(rotation.degrees());
    if size.width <= 0.0 {
        return Err(ToolError::RenderError(format!(
            "page {} has no width",
            page_index + 1
        )));
    }

    let scale = (target_width as f64 / size.width) as f32;
    debug!("thumbnail of page {page_index} at scale {scale}");
    Ok(session.render_frame(page_index, scale, rotation, FrameEncoding::Png)?)
}

/// Number of pages, for sizing page grids before a transform
pub fn page_count(bytes: &[u8]) -> Result<usize> {
    Ok(PdfDocument::load(bytes)?.page_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::fixtures::{pdf_with_pages, FakeBackend};
    use crate::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use zip::ZipArchive;

    #[test]
    fn test_archive_has_one_jpeg_per_page() {
        let backend = FakeBackend::new(3);
        let input = InputFile::pdf("doc.pdf", pdf_with_pages(3));
        let output = pdf_to_images(&input, &backend).unwrap();
        assert_eq!(output.suggested_name, "images.zip");
        assert_eq!(output.mime_type, "application/zip");

        let mut archive = ZipArchive::new(Cursor::new(output.bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["page-1.jpg", "page-2.jpg", "page-3.jpg"]);

        let mut jpeg = Vec::new();
        std::io::Read::read_to_end(&mut archive.by_name("page-2.jpg").unwrap(), &mut jpeg).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        // Letter at two pixels per point
        assert_eq!((decoded.width(), decoded.height()), (1224, 1584));
    }

    #[test]
    fn test_failed_page_fails_export() {
        let backend = FakeBackend {
            fail_on: Some(3),
            ..FakeBackend::new(4)
        };
        let input = InputFile::pdf("doc.pdf", pdf_with_pages(4));
        assert_eq!(
            pdf_to_images(&input, &backend).unwrap_err().kind(),
            ErrorKind::RenderError
        );
    }

    #[test]
    fn test_thumbnail_width() {
        let backend = FakeBackend::new(2);
        let bytes = pdf_with_pages(2);

        let frame = render_thumbnail(&backend, &bytes, 1, 200, RenderRotation::None).unwrap();
        assert_eq!(frame.pixel_width, 200);
        assert_eq!(frame.page_index, 1);

        let frame = render_thumbnail(&backend, &bytes, 0, 200, RenderRotation::Degrees90).unwrap();
        assert_eq!(frame.pixel_width, 200);
        assert!(frame.pixel_height < 200);
    }

    #[test]
    fn test_thumbnail_bad_arguments() {
        let backend = FakeBackend::new(1);
        let bytes = pdf_with_pages(1);
        assert_eq!(
            render_thumbnail(&backend, &bytes, 5, 100, RenderRotation::None)
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidParameter
        );
        assert_eq!(
            render_thumbnail(&backend, &bytes, 0, 0, RenderRotation::None)
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidParameter
        );
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(&pdf_with_pages(6)).unwrap(), 6);
        assert_eq!(
            page_count(b"%PDF-1.7 truncated").unwrap_err().kind(),
            ErrorKind::MalformedDocument
        );
    }
}
