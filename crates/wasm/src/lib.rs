//! WASM bindings for pdfdesk
//!
//! This crate provides a JavaScript-friendly API for every pdfdesk tool:
//! - Merge, split, rotate, organize and compress PDFs
//! - Images to PDF and PDF to images
//! - Text watermarks
//! - Page counts and thumbnails for the page grid
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { configureRenderer, split, watermark } from 'pdfdesk-wasm';
//!
//! await init();
//! configureRenderer();
//!
//! const extracted = split(pdfBytes, "1-3, 5");
//! download(extracted.bytes, extracted.suggestedName, extracted.mimeType);
//!
//! const stamped = watermark(pdfBytes, { text: "DRAFT", tiled: true });
//! ```

mod console;

use js_sys::{Array, Reflect, Uint8Array};
use pdf_core::FontData;
use pdf_raster::{PdfiumBackend, RasterConfig, RenderRotation};
use pdf_tools::{
    CompressLevel, CompressionReport, InputFile, OutputFile, PageDescriptor, ToolError,
    WatermarkFont, WatermarkSpec,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

// Initialize panic hook and console logging for the browser
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console::install();
}

/// Result of a tool run
#[wasm_bindgen]
pub struct ToolOutput {
    file: OutputFile,
    report: Option<CompressionReport>,
}

#[wasm_bindgen]
impl ToolOutput {
    /// Output bytes (Uint8Array)
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.file.bytes.clone()
    }

    #[wasm_bindgen(getter, js_name = mimeType)]
    pub fn mime_type(&self) -> String {
        self.file.mime_type.clone()
    }

    #[wasm_bindgen(getter, js_name = suggestedName)]
    pub fn suggested_name(&self) -> String {
        self.file.suggested_name.clone()
    }

    /// Compression report, or `undefined` for other tools
    ///
    /// @returns { inputSize, outputSize, savings, savingsPercent, isEffective }
    #[wasm_bindgen(getter)]
    pub fn report(&self) -> Result<JsValue, JsValue> {
        match &self.report {
            Some(report) => Ok(serde_wasm_bindgen::to_value(report)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

impl From<OutputFile> for ToolOutput {
    fn from(file: OutputFile) -> Self {
        Self { file, report: None }
    }
}

/// Configure the renderer; call once before rendering
///
/// @param libraryPath - Must be omitted in the browser, where the bundled
/// PDFium module is always used
#[wasm_bindgen(js_name = configureRenderer)]
pub fn configure_renderer(library_path: Option<String>) -> Result<(), JsValue> {
    let config = RasterConfig {
        library_path: library_path.map(Into::into),
    };
    pdf_raster::configure(config).map_err(|e| to_js_error(e.into()))
}

/// Merge PDFs in the given order
///
/// @param files - Array of { name, mimeType, bytes: Uint8Array }
#[wasm_bindgen]
pub fn merge(files: Array) -> Result<ToolOutput, JsValue> {
    let files = input_files(&files)?;
    run(pdf_tools::merge(&files))
}

/// Extract pages by range expression, e.g. "1-3, 5"
#[wasm_bindgen]
pub fn split(pdf: &[u8], ranges: &str) -> Result<ToolOutput, JsValue> {
    run(pdf_tools::split(&pdf_input(pdf), ranges))
}

/// Rotate every page by a multiple of 90 degrees
#[wasm_bindgen]
pub fn rotate(pdf: &[u8], delta: i32) -> Result<ToolOutput, JsValue> {
    run(pdf_tools::rotate(&pdf_input(pdf), delta as i64))
}

/// Reorder, rotate and drop pages
///
/// @param descriptors - Array of { id, originalIndex, rotation, included }
#[wasm_bindgen]
pub fn organize(pdf: &[u8], descriptors: JsValue) -> Result<ToolOutput, JsValue> {
    let descriptors: Vec<PageDescriptor> = serde_wasm_bindgen::from_value(descriptors)?;
    run(pdf_tools::organize(&pdf_input(pdf), &descriptors))
}

/// Compress with "low", "medium" or "high"
#[wasm_bindgen]
pub fn compress(pdf: &[u8], level: JsValue) -> Result<ToolOutput, JsValue> {
    let level: CompressLevel = if level.is_undefined() {
        CompressLevel::default()
    } else {
        serde_wasm_bindgen::from_value(level)?
    };
    let backend = backend()?;
    let output = pdf_tools::compress(&pdf_input(pdf), level, &backend).map_err(to_js_error)?;

    Ok(ToolOutput {
        file: output.file,
        report: Some(output.report),
    })
}

/// Size a compression level is expected to produce, for display before running
#[wasm_bindgen(js_name = estimateCompressedSize)]
pub fn estimate_compressed_size(level: &str, input_size: f64) -> Result<f64, JsValue> {
    let level: CompressLevel = serde_json::from_value(serde_json::Value::String(level.to_string()))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(level.estimated_size(input_size.max(0.0) as u64) as f64)
}

/// One page per JPEG/PNG image; other files are skipped
///
/// @param files - Array of { name, mimeType, bytes: Uint8Array }
#[wasm_bindgen(js_name = imagesToPdf)]
pub fn images_to_pdf(files: Array) -> Result<ToolOutput, JsValue> {
    let files = input_files(&files)?;
    run(pdf_tools::images_to_pdf(&files))
}

/// Render every page to JPEG, packed in a zip
#[wasm_bindgen(js_name = pdfToImages)]
pub fn pdf_to_images(pdf: &[u8]) -> Result<ToolOutput, JsValue> {
    let backend = backend()?;
    run(pdf_tools::pdf_to_images(&pdf_input(pdf), &backend))
}

/// Stamp text on every page
///
/// @param spec - { text, fontSizePt, opacity, color: {r,g,b}, rotationDeg, tiled }
/// @param fontBytes - Optional TrueType font for text outside Latin-1
#[wasm_bindgen]
pub fn watermark(pdf: &[u8], spec: JsValue, font_bytes: Option<Vec<u8>>) -> Result<ToolOutput, JsValue> {
    let mut spec: WatermarkSpec = serde_wasm_bindgen::from_value(spec)?;
    if let Some(bytes) = font_bytes {
        let font = FontData::from_ttf("WatermarkFont", &bytes)
            .map_err(|e| to_js_error(e.into()))?;
        spec.font = WatermarkFont::TrueType(font);
    }
    run(pdf_tools::watermark(&pdf_input(pdf), &spec))
}

/// Number of pages in a PDF
#[wasm_bindgen(js_name = pageCount)]
pub fn page_count(pdf: &[u8]) -> Result<u32, JsValue> {
    let count = pdf_tools::page_count(pdf).map_err(to_js_error)?;
    Ok(count as u32)
}

/// Render a page preview as PNG bytes
///
/// @param pageIndex - Zero-based page
/// @param targetWidth - Output width in pixels
/// @param rotation - Extra rotation: 0, 90, 180 or 270
#[wasm_bindgen(js_name = renderThumbnail)]
pub fn render_thumbnail(
    pdf: &[u8],
    page_index: u32,
    target_width: u32,
    rotation: i32,
) -> Result<Vec<u8>, JsValue> {
    let rotation = RenderRotation::from_degrees(rotation as i64).ok_or_else(|| {
        to_js_error(ToolError::InvalidParameter(format!(
            "rotation must be a multiple of 90, got {rotation}"
        )))
    })?;
    let backend = backend()?;
    let frame =
        pdf_tools::render_thumbnail(&backend, pdf, page_index as usize, target_width, rotation)
            .map_err(to_js_error)?;
    Ok(frame.image_bytes)
}

/// Zero-based pages selected by a range expression
#[wasm_bindgen(js_name = parseRanges)]
pub fn parse_ranges(expr: &str, page_count: u32) -> Result<Vec<u32>, JsValue> {
    let pages = pdf_tools::parse_ranges(expr, page_count as usize).map_err(to_js_error)?;
    Ok(pages.into_iter().map(|i| i as u32).collect())
}

/// Range expression for zero-based pages, e.g. [0, 1, 2, 4] -> "1-3, 5"
#[wasm_bindgen(js_name = formatSelection)]
pub fn format_selection(pages: Vec<u32>) -> String {
    let pages: Vec<usize> = pages.into_iter().map(|i| i as usize).collect();
    pdf_tools::format_selection(&pages)
}

fn run(result: pdf_tools::Result<OutputFile>) -> Result<ToolOutput, JsValue> {
    result.map(ToolOutput::from).map_err(to_js_error)
}

fn backend() -> Result<PdfiumBackend, JsValue> {
    PdfiumBackend::from_config().map_err(|e| to_js_error(e.into()))
}

fn pdf_input(bytes: &[u8]) -> InputFile {
    InputFile::pdf("document.pdf", bytes.to_vec())
}

fn input_files(files: &Array) -> Result<Vec<InputFile>, JsValue> {
    files
        .iter()
        .map(|file| {
            let text = |key: &str| -> Result<String, JsValue> {
                Ok(Reflect::get(&file, &JsValue::from_str(key))?
                    .as_string()
                    .unwrap_or_default())
            };
            let bytes = Reflect::get(&file, &JsValue::from_str("bytes"))?
                .dyn_into::<Uint8Array>()
                .map_err(|_| JsValue::from_str("file.bytes must be a Uint8Array"))?;

            Ok(InputFile::new(text("name")?, text("mimeType")?, bytes.to_vec()))
        })
        .collect()
}

/// A JS `Error` whose `name` is the error kind, e.g. "EmptySelection"
fn to_js_error(err: ToolError) -> JsValue {
    let error = js_sys::Error::new(&err.to_string());
    error.set_name(&format!("{:?}", err.kind()));
    error.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_format_selection() {
        assert_eq!(format_selection(vec![4, 0, 1, 2]), "1-3, 5");
    }

    #[wasm_bindgen_test]
    fn test_parse_ranges() {
        assert_eq!(parse_ranges("1-3,5,2", 10).unwrap(), vec![0, 1, 2, 4]);
    }

    #[wasm_bindgen_test]
    fn test_library_path_is_rejected_in_browser() {
        assert!(configure_renderer(Some("/usr/lib/libpdfium.so".to_string())).is_err());
    }

    #[wasm_bindgen_test]
    fn test_estimate() {
        assert_eq!(estimate_compressed_size("high", 1000.0).unwrap(), 400.0);
    }
}
