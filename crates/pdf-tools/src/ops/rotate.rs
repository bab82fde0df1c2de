use super::{load, save};
use crate::{InputFile, OutputFile, Result, ToolError};
use log::debug;
use pdf_core::SaveOptions;

/// Turn every page by `delta` degrees on top of its current rotation
///
/// `delta` must be a multiple of 90 within -270..=270; 0 is accepted and
/// leaves rotations unchanged.
pub fn rotate(file: &InputFile, delta: i64) -> Result<OutputFile> {
    if delta % 90 != 0 || !(-270..=270).contains(&delta) {
        return Err(ToolError::InvalidParameter(format!(
            "rotation must be a multiple of 90 between -270 and 270, got {delta}"
        )));
    }

    let mut doc = load(file)?;
    for page in doc.pages() {
        let current = doc.rotation(page)?;
        doc.set_rotation(page, current as i64 + delta)?;
    }
    debug!("rotated {} pages by {delta}", doc.page_count());

    save(doc, SaveOptions::default(), "rotated.pdf")
}
