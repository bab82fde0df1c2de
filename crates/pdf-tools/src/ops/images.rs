use super::save;
use crate::{InputFile, OutputFile, Result, ToolError};
use log::{debug, warn};
use pdf_core::{ImageFormat, PdfDocument, SaveOptions};

/// One page per JPEG/PNG image, each page sized to the image in points
///
/// Files of any other type are skipped with a warning.
pub fn images_to_pdf(files: &[InputFile]) -> Result<OutputFile> {
    if files.is_empty() {
        return Err(ToolError::InvalidParameter("no images selected".to_string()));
    }

    let mut output = PdfDocument::new();
    let mut skipped = 0;
    for file in files {
        match add_image_page(&mut output, file) {
            Ok(()) => {}
            Err(err @ ToolError::UnsupportedAsset { .. }) => {
                warn!("skipping {err}");
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    if output.page_count() == 0 {
        return Err(ToolError::EmptySelection(
            "none of the selected files is a JPEG or PNG image".to_string(),
        ));
    }
    debug!(
        "built {} pages from images, skipped {skipped}",
        output.page_count()
    );

    save(output, SaveOptions::default(), "images.pdf")
}

fn add_image_page(output: &mut PdfDocument, file: &InputFile) -> Result<()> {
    let format =
        ImageFormat::from_mime(&file.mime_type).ok_or_else(|| ToolError::UnsupportedAsset {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
        })?;

    let image = output.embed_image(&file.bytes, format)?;
    let (width, height) = (image.width as f64, image.height as f64);
    let page = output.add_page(width, height)?;
    output.draw_image(page, &image, 0.0, 0.0, width, height)?;
    Ok(())
}
