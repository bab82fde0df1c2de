use super::{append_pages, load, save};
use crate::selection::parse_ranges;
use crate::{InputFile, OutputFile, Result};
use log::debug;
use pdf_core::{PdfDocument, SaveOptions};

/// Extract the pages selected by a range expression, in ascending order
pub fn split(file: &InputFile, ranges: &str) -> Result<OutputFile> {
    let source = load(file)?;
    let selection = parse_ranges(ranges, source.page_count())?;
    debug!("extracting {} of {} pages", selection.len(), source.page_count());

    let mut output = PdfDocument::new();
    append_pages(&mut output, &source, &selection)?;
    save(output, SaveOptions::default(), "extracted.pdf")
}
