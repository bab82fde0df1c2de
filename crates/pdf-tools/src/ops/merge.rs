use super::{append_pages, load, save};
use crate::{InputFile, OutputFile, Result, ToolError};
use pdf_core::{PdfDocument, SaveOptions};

/// Concatenate every page of `files`, in file order
///
/// A single file yields a copy of it.
pub fn merge(files: &[InputFile]) -> Result<OutputFile> {
    if files.is_empty() {
        return Err(ToolError::InvalidParameter("no files to merge".to_string()));
    }

    let mut output = PdfDocument::new();
    for file in files {
        let source = load(file)?;
        let indices: Vec<usize> = (0..source.page_count()).collect();
        append_pages(&mut output, &source, &indices)?;
    }

    save(output, SaveOptions::default(), "merged.pdf")
}
