//! Transform operations
//!
//! Every operation builds one fresh output document per call and shares no
//! state with other calls.

mod compress;
mod images;
mod merge;
mod organize;
mod rasterize;
mod rotate;
mod split;
mod watermark;

pub use compress::{compress, CompressOutput};
pub use images::images_to_pdf;
pub use merge::merge;
pub use organize::organize;
pub use rasterize::{page_count, pdf_to_images, render_thumbnail};
pub use rotate::rotate;
pub use split::split;
pub use watermark::watermark;

use crate::{InputFile, OutputFile, Result};
use log::debug;
use pdf_core::{PdfDocument, SaveOptions};

fn load(file: &InputFile) -> Result<PdfDocument> {
    let doc = PdfDocument::load(&file.bytes)?;
    debug!(
        "loaded {} ({} bytes, {} pages)",
        file.name,
        file.bytes.len(),
        doc.page_count()
    );
    Ok(doc)
}

/// Copy `indices` of `source` to the end of `output`
fn append_pages(output: &mut PdfDocument, source: &PdfDocument, indices: &[usize]) -> Result<()> {
    for page in output.copy_pages(source, indices)? {
        output.append_page(page)?;
    }
    Ok(())
}

fn save(mut doc: PdfDocument, options: SaveOptions, suggested_name: &str) -> Result<OutputFile> {
    let bytes = doc.to_bytes(options)?;
    debug!(
        "serialized {suggested_name}: {} pages, {} bytes",
        doc.page_count(),
        bytes.len()
    );
    Ok(OutputFile::pdf(bytes, suggested_name))
}
