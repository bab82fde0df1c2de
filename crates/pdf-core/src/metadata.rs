//! Document information dictionary

use crate::{PdfError, Result};
use lopdf::{Dictionary, Document, Object};

/// Descriptive fields cleared by [`strip`]
const TEXT_FIELDS: [&str; 6] = ["Title", "Author", "Subject", "Keywords", "Producer", "Creator"];

/// Producer written into newly created documents
const PRODUCER: &str = "pdfdesk";

/// Current time as a PDF date string (`D:YYYYMMDDHHmmSSZ`)
pub(crate) fn pdf_date_now() -> String {
    chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
}

/// Info dictionary for a freshly created document
pub(crate) fn fresh_info() -> Dictionary {
    let now = pdf_date_now();
    let mut info = Dictionary::new();
    info.set("Producer", Object::string_literal(PRODUCER));
    info.set("Creator", Object::string_literal(PRODUCER));
    info.set("CreationDate", Object::string_literal(now.clone()));
    info.set("ModDate", Object::string_literal(now));
    info
}

/// Clear the descriptive fields and reset both timestamps to now
///
/// A document without an Info dictionary gets a new one.
pub(crate) fn strip(doc: &mut Document) -> Result<()> {
    let now = pdf_date_now();

    let info = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => {
            let id = *id;
            doc.get_object_mut(id)?
                .as_dict_mut()
                .map_err(|_| PdfError::ParseError("Info is not a dictionary".to_string()))?
        }
        Ok(Object::Dictionary(_)) => doc
            .trailer
            .get_mut(b"Info")?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Info is not a dictionary".to_string()))?,
        _ => {
            let id = doc.add_object(Dictionary::new());
            doc.trailer.set("Info", Object::Reference(id));
            doc.get_object_mut(id)?
                .as_dict_mut()
                .map_err(|_| PdfError::ParseError("Info is not a dictionary".to_string()))?
        }
    };

    for field in TEXT_FIELDS {
        info.set(field, Object::string_literal(""));
    }
    info.set("CreationDate", Object::string_literal(now.clone()));
    info.set("ModDate", Object::string_literal(now));

    Ok(())
}

/// Read an Info field as text
///
/// UTF-16BE strings (with a byte order mark) are decoded; anything else is
/// read as Latin-1.
pub(crate) fn field(doc: &Document, key: &str) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_dictionary(*id).ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    match info.get(key.as_bytes()).ok()? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use pretty_assertions::assert_eq;

    fn document_with_info(info: Dictionary) -> Document {
        let mut doc = Document::with_version("1.7");
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);
        doc
    }

    #[test]
    fn test_strip_clears_fields() {
        let mut doc = document_with_info(dictionary! {
            "Title" => Object::string_literal("Quarterly report"),
            "Author" => Object::string_literal("Finance"),
            "Producer" => Object::string_literal("Some Writer 3.1"),
            "CreationDate" => Object::string_literal("D:20200101000000Z"),
        });

        strip(&mut doc).unwrap();

        for key in TEXT_FIELDS {
            assert_eq!(field(&doc, key).as_deref(), Some(""), "{key}");
        }
        let created = field(&doc, "CreationDate").unwrap();
        assert!(created.starts_with("D:"));
        assert_ne!(created, "D:20200101000000Z");
        assert_eq!(field(&doc, "ModDate").unwrap(), created);
    }

    #[test]
    fn test_strip_creates_missing_info() {
        let mut doc = Document::with_version("1.7");
        strip(&mut doc).unwrap();
        assert_eq!(field(&doc, "Title").as_deref(), Some(""));
    }

    #[test]
    fn test_direct_info_dictionary() {
        let mut doc = Document::with_version("1.7");
        doc.trailer.set(
            "Info",
            dictionary! { "Title" => Object::string_literal("direct") },
        );
        assert_eq!(field(&doc, "Title").as_deref(), Some("direct"));

        strip(&mut doc).unwrap();
        assert_eq!(field(&doc, "Title").as_deref(), Some(""));
    }

    #[test]
    fn test_decode_utf16_text_string() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_string(&bytes), "Hi");
        assert_eq!(decode_text_string(b"caf\xE9"), "café");
    }

    #[test]
    fn test_pdf_date_format() {
        let date = pdf_date_now();
        assert_eq!(date.len(), "D:20240101120000Z".len());
        assert!(date.ends_with('Z'));
    }
}
