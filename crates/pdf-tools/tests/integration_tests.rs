//! End-to-end scenarios across pdf-tools operations

use image::{Rgba, RgbaImage};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_core::{PageSize, PdfDocument};
use pdf_raster::{expected_frame_size, RasterBackend, RasterDocument, RenderRotation};
use pdf_tools::{
    compress, format_selection, images_to_pdf, merge, organize, parse_ranges, pdf_to_images,
    rotate, split, watermark, CompressLevel, ErrorKind, InputFile, PageDescriptor,
    PageDescriptorList, ToolSession, WatermarkSpec,
};
use pretty_assertions::assert_eq;
use std::io::{Cursor, Read};

/// `rotations.len()` pages; page `i` is `200 + i` points wide so pages can be told apart
fn create_test_pdf(rotations: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });

    let kids: Vec<Object> = rotations
        .iter()
        .enumerate()
        .map(|(i, rotation)| {
            let content = format!("BT /F1 18 Tf 30 30 Td (Sheet {}) Tj ET", i + 1);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(200 + i as i64),
                    Object::Integer(300),
                ],
                "Rotate" => *rotation,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
                "Contents" => content_id,
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => rotations.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn pdf(rotations: &[i64]) -> InputFile {
    InputFile::pdf("input.pdf", create_test_pdf(rotations))
}

/// (width, rotation) per page
fn pages(bytes: &[u8]) -> Vec<(f64, i32)> {
    let doc = PdfDocument::load(bytes).unwrap();
    doc.pages()
        .into_iter()
        .enumerate()
        .map(|(i, page)| (doc.page_size(i).unwrap().width, doc.rotation(page).unwrap()))
        .collect()
}

/// A4 pages of solid white
struct WhitePages(usize);

struct WhiteDocument(usize);

impl RasterBackend for WhitePages {
    fn open<'a>(&'a self, _bytes: &[u8]) -> pdf_raster::Result<Box<dyn RasterDocument + 'a>> {
        Ok(Box::new(WhiteDocument(self.0)))
    }
}

impl RasterDocument for WhiteDocument {
    fn page_count(&self) -> usize {
        self.0
    }

    fn page_size(&self, _index: usize) -> pdf_raster::Result<PageSize> {
        Ok(PageSize::A4)
    }

    fn render_page(
        &mut self,
        _index: usize,
        scale: f32,
        rotation: RenderRotation,
    ) -> pdf_raster::Result<RgbaImage> {
        let (w, h) = expected_frame_size(PageSize::A4, scale, rotation);
        Ok(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])))
    }

    fn close(&mut self) {}
}

#[test]
fn test_split_rotate_reload() {
    let source = pdf(&[0, 90, 0, 180, 0]);

    let extracted = split(&source, "2,4").unwrap();
    assert_eq!(pages(&extracted.bytes), vec![(201.0, 90), (203.0, 180)]);

    let rotated = rotate(&InputFile::pdf("extracted.pdf", extracted.bytes), 90).unwrap();
    assert_eq!(pages(&rotated.bytes), vec![(201.0, 180), (203.0, 270)]);
    assert_eq!(pdf_tools::page_count(&rotated.bytes).unwrap(), 2);
}

#[test]
fn test_merge_then_split_round_trip() {
    let merged = merge(&[pdf(&[0, 0]), pdf(&[90, 0, 0])]).unwrap();
    let widths: Vec<f64> = pages(&merged.bytes).into_iter().map(|(w, _)| w).collect();
    assert_eq!(widths, vec![200.0, 201.0, 200.0, 201.0, 202.0]);

    let all = split(&InputFile::pdf("merged.pdf", merged.bytes.clone()), "1-5").unwrap();
    assert_eq!(pages(&all.bytes), pages(&merged.bytes));
}

#[test]
fn test_selection_feeds_split() {
    let source = pdf(&[0; 8]);
    let selection = vec![7, 1, 2, 3];
    let expr = format_selection(&selection);
    assert_eq!(expr, "2-4, 8");
    assert_eq!(parse_ranges(&expr, 8).unwrap(), vec![1, 2, 3, 7]);

    let output = split(&source, &expr).unwrap();
    assert_eq!(PdfDocument::load(&output.bytes).unwrap().page_count(), 4);
}

#[test]
fn test_organize_from_json_descriptors() {
    let json = r#"[
        {"id": "c", "originalIndex": 2, "rotation": 90},
        {"id": "b", "originalIndex": 1, "included": false},
        {"id": "a", "originalIndex": 0}
    ]"#;
    let descriptors: Vec<PageDescriptor> = serde_json::from_str(json).unwrap();

    let output = organize(&pdf(&[0, 0, 0]), &descriptors).unwrap();
    assert_eq!(pages(&output.bytes), vec![(202.0, 90), (200.0, 0)]);
}

#[test]
fn test_organize_list_versions() {
    let list = PageDescriptorList::from_page_count(3);
    let edited = list.rotate_right("page-0").remove("page-2");
    assert_eq!(edited.version(), 2);

    let output = organize(&pdf(&[270, 0, 0]), edited.descriptors()).unwrap();
    assert_eq!(pages(&output.bytes), vec![(200.0, 0), (201.0, 0)]);
}

#[test]
fn test_compress_all_levels_open() {
    let input = pdf(&[0, 0, 0]);
    let backend = WhitePages(3);

    for level in [CompressLevel::Low, CompressLevel::Medium, CompressLevel::High] {
        let output = compress(&input, level, &backend).unwrap();
        let doc = PdfDocument::load(&output.file.bytes).unwrap();
        assert_eq!(doc.page_count(), 3, "{level:?}");
        if level != CompressLevel::High {
            assert_eq!(doc.metadata_field("Author").as_deref(), Some(""), "{level:?}");
        }
        assert_eq!(output.report.output_size, output.file.bytes.len() as u64);
    }
}

#[test]
fn test_pdf_to_images_zip_readback() {
    let output = pdf_to_images(&pdf(&[0, 0]), &WhitePages(2)).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(output.bytes)).unwrap();
    assert_eq!(archive.len(), 2);

    let mut bytes = Vec::new();
    archive
        .by_name("page-1.jpg")
        .unwrap()
        .read_to_end(&mut bytes)
        .unwrap();
    let image = image::load_from_memory(&bytes).unwrap();
    assert_eq!((image.width(), image.height()), (1191, 1684));
}

#[test]
fn test_images_round_trip_through_pdf() {
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 75)
        .encode_image(&image::RgbImage::from_pixel(400, 300, image::Rgb([9, 9, 9])))
        .unwrap();
    let files = vec![
        InputFile::new("notes.txt", "text/plain", b"hello".to_vec()),
        InputFile::new("photo.jpg", "image/jpeg", jpeg),
    ];

    let output = images_to_pdf(&files).unwrap();
    let doc = PdfDocument::load(&output.bytes).unwrap();
    assert_eq!(doc.page_count(), 1);
    assert_eq!(doc.page_size(0).unwrap(), PageSize::new(400.0, 300.0));
}

#[test]
fn test_watermark_after_merge() {
    let merged = merge(&[pdf(&[0]), pdf(&[0])]).unwrap();
    let spec: WatermarkSpec =
        serde_json::from_str(r#"{"text": "COPY", "opacity": 0.25, "rotationDeg": 30}"#).unwrap();

    let output = watermark(&InputFile::pdf("merged.pdf", merged.bytes), &spec).unwrap();
    let doc = Document::load_mem(&output.bytes).unwrap();
    for page_id in doc.get_pages().into_values() {
        let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
        assert!(content.contains("(Sheet 1) Tj"));
        assert!(content.contains("Tm"));
    }
}

#[test]
fn test_session_retry_after_failure() {
    let mut session = ToolSession::new();
    session.select_files(vec![pdf(&[0, 0])]).unwrap();

    let err = session.run(|files| split(&files[0], "5-9")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptySelection);

    session.run(|files| split(&files[0], "2")).unwrap();
    let output = session.output().unwrap();
    assert_eq!(output.suggested_name, "extracted.pdf");
    assert_eq!(PdfDocument::load(&output.bytes).unwrap().page_count(), 1);
}

#[test]
fn test_malformed_input_everywhere() {
    let junk = InputFile::pdf("junk.pdf", b"%PDF-1.4\nthis is not a document".to_vec());
    assert_eq!(merge(&[junk.clone()]).unwrap_err().kind(), ErrorKind::MalformedDocument);
    assert_eq!(split(&junk, "1").unwrap_err().kind(), ErrorKind::MalformedDocument);
    assert_eq!(rotate(&junk, 90).unwrap_err().kind(), ErrorKind::MalformedDocument);
    assert_eq!(
        watermark(&junk, &WatermarkSpec::new("X")).unwrap_err().kind(),
        ErrorKind::MalformedDocument
    );
}
