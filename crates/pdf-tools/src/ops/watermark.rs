use super::{load, save};
use crate::geometry::{center_anchor, centered_origin, tile_anchors};
use crate::{InputFile, OutputFile, Result, WatermarkSpec};
use log::debug;
use pdf_core::{Font, SaveOptions, TextRun};

/// Stamp `spec.text` on every page, centered or tiled, over existing content
pub fn watermark(file: &InputFile, spec: &WatermarkSpec) -> Result<OutputFile> {
    spec.validate()?;

    let mut doc = load(file)?;
    let font: Font = spec.font.clone().into();
    // Also rejects text the font cannot encode before any page is touched
    let text_width = font.text_width_points(&spec.text, spec.font_size_pt)?;
    let font = doc.embed_font(font);
    let font_size = spec.font_size_pt as f64;
    let rotation = spec.rotation_deg as f64;

    let mut stamps = 0;
    for page in doc.pages() {
        let size = doc.page_handle_size(page)?;
        let anchors = if spec.tiled {
            tile_anchors(size, text_width, font_size)
        } else {
            vec![center_anchor(size)]
        };

        for anchor in anchors {
            let origin = centered_origin(anchor, text_width, font_size, rotation);
            doc.draw_text(
                page,
                font,
                &TextRun {
                    text: &spec.text,
                    font_size: spec.font_size_pt,
                    x: origin.x,
                    y: origin.y,
                    rotation_deg: rotation,
                    color: spec.color.into(),
                    opacity: spec.opacity,
                },
            )?;
            stamps += 1;
        }
    }
    debug!("stamped {stamps} watermarks over {} pages", doc.page_count());

    save(doc, SaveOptions::default(), "watermarked.pdf")
}
