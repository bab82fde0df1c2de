use super::{load, save};
use crate::params::{COMPRESS_JPEG_QUALITY, COMPRESS_RENDER_SCALE};
use crate::{CompressLevel, CompressionReport, InputFile, OutputFile, Result};
use log::{debug, warn};
use pdf_core::{ImageFormat, PdfDocument, SaveOptions};
use pdf_raster::{FrameEncoding, RasterBackend, RenderRotation, RenderSession};

/// Compressed file and how much it saved
#[derive(Debug, Clone)]
pub struct CompressOutput {
    pub file: OutputFile,
    pub report: CompressionReport,
}

/// Shrink a document
///
/// `Low` and `Medium` are lossless and never touch `backend`. `High` renders
/// every page to a JPEG and rebuilds the document from those images, dropping
/// text and vector content; the first page that fails to render aborts it.
pub fn compress<B>(file: &InputFile, level: CompressLevel, backend: &B) -> Result<CompressOutput>
where
    B: RasterBackend + ?Sized,
{
    let output = match level {
        CompressLevel::Low => {
            let mut doc = load(file)?;
            doc.strip_metadata()?;
            save(doc, SaveOptions::default(), "compressed.pdf")?
        }
        CompressLevel::Medium => {
            let mut doc = load(file)?;
            doc.strip_metadata()?;
            save(doc, SaveOptions::compact(), "compressed.pdf")?
        }
        CompressLevel::High => rasterize_document(file, backend)?,
    };

    let report = CompressionReport::new(file.bytes.len() as u64, output.len() as u64);
    if report.is_effective {
        debug!(
            "compressed {} ({level:?}): {} -> {} bytes",
            file.name, report.input_size, report.output_size
        );
    } else {
        warn!(
            "{} is already optimized ({level:?}): {} -> {} bytes",
            file.name, report.input_size, report.output_size
        );
    }

    Ok(CompressOutput {
        file: output,
        report,
    })
}

fn rasterize_document<B>(file: &InputFile, backend: &B) -> Result<OutputFile>
where
    B: RasterBackend + ?Sized,
{
    let mut session = RenderSession::open(backend, &file.bytes)?;
    let mut output = PdfDocument::new();

    for index in 0..session.page_count() {
        let frame = session.render_frame(
            index,
            COMPRESS_RENDER_SCALE,
            RenderRotation::None,
            FrameEncoding::Jpeg {
                quality: COMPRESS_JPEG_QUALITY,
            },
        )?;

        // Pages keep their point size; only the image is in whole pixels
        let size = session.page_size(index)?;
        let image = output.embed_image(&frame.image_bytes, ImageFormat::Jpeg)?;
        let page = output.add_page(size.width, size.height)?;
        output.draw_image(page, &image, 0.0, 0.0, size.width, size.height)?;
    }
    session.close();

    save(output, SaveOptions::default(), "compressed.pdf")
}
