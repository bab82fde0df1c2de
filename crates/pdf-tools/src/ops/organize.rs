use super::{load, save};
use crate::{InputFile, OutputFile, PageDescriptor, Result, ToolError};
use log::debug;
use pdf_core::{PdfDocument, SaveOptions};

/// Build a document from `descriptors`: their order is the output order,
/// each adds its rotation to the source page's own, and excluded or omitted
/// pages are dropped.
pub fn organize(file: &InputFile, descriptors: &[PageDescriptor]) -> Result<OutputFile> {
    let source = load(file)?;
    let page_count = source.page_count();

    let included: Vec<&PageDescriptor> = descriptors.iter().filter(|d| d.included).collect();
    if included.is_empty() {
        return Err(ToolError::EmptySelection(
            "no pages left to organize".to_string(),
        ));
    }
    if let Some(bad) = included.iter().find(|d| d.original_index >= page_count) {
        return Err(ToolError::InvalidParameter(format!(
            "page {} does not exist in a {page_count}-page document",
            bad.original_index + 1
        )));
    }

    let indices: Vec<usize> = included.iter().map(|d| d.original_index).collect();
    let mut output = PdfDocument::new();
    let pages = output.copy_pages(&source, &indices)?;

    for (page, descriptor) in pages.into_iter().zip(&included) {
        output.append_page(page)?;
        if descriptor.rotation != 0 {
            let current = output.rotation(page)?;
            output.set_rotation(page, current as i64 + descriptor.rotation as i64)?;
        }
    }
    debug!("organized {} of {page_count} pages", included.len());

    save(output, SaveOptions::default(), "organized.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::fixtures::pdf_with_rotations;
    use crate::{ErrorKind, PageDescriptorList};
    use pretty_assertions::assert_eq;

    fn summary(bytes: &[u8]) -> Vec<(f64, i32)> {
        let doc = PdfDocument::load(bytes).unwrap();
        doc.pages()
            .into_iter()
            .enumerate()
            .map(|(i, page)| (doc.page_size(i).unwrap().width, doc.rotation(page).unwrap()))
            .collect()
    }

    #[test]
    fn test_reorder_delete_and_rotate() {
        let input = InputFile::pdf("doc.pdf", pdf_with_rotations(&[0, 0, 180]));
        let descriptors = vec![
            PageDescriptor::new(2).with_rotation(90),
            PageDescriptor::new(0),
        ];

        let output = organize(&input, &descriptors).unwrap();
        assert_eq!(summary(&output.bytes), vec![(120.0, 270), (100.0, 0)]);
        assert_eq!(output.suggested_name, "organized.pdf");
    }

    #[test]
    fn test_edited_list_drives_output() {
        let input = InputFile::pdf("doc.pdf", pdf_with_rotations(&[0, 0, 0]));
        let list = PageDescriptorList::from_page_count(3)
            .remove("page-1")
            .move_to("page-2", 0)
            .rotate_left("page-0");

        let output = organize(&input, list.descriptors()).unwrap();
        assert_eq!(summary(&output.bytes), vec![(120.0, 0), (100.0, 270)]);
    }

    #[test]
    fn test_excluded_pages_are_skipped() {
        let input = InputFile::pdf("doc.pdf", pdf_with_rotations(&[0, 0]));
        let mut hidden = PageDescriptor::new(0);
        hidden.included = false;

        let output = organize(&input, &[hidden.clone(), PageDescriptor::new(1)]).unwrap();
        assert_eq!(summary(&output.bytes), vec![(110.0, 0)]);

        assert_eq!(
            organize(&input, &[hidden]).unwrap_err().kind(),
            ErrorKind::EmptySelection
        );
    }

    #[test]
    fn test_out_of_range_descriptor() {
        let input = InputFile::pdf("doc.pdf", pdf_with_rotations(&[0, 0]));
        assert_eq!(
            organize(&input, &[PageDescriptor::new(5)]).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );
    }
}
