//! Input and output byte buffers

use serde::Serialize;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// A file handed over by the file picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    /// Declared MIME type, e.g. `image/png`
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, PDF_MIME_TYPE, bytes)
    }
}

/// Operation result, ready to be offered as a download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputFile {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub suggested_name: String,
}

impl OutputFile {
    pub fn new(bytes: Vec<u8>, mime_type: &str, suggested_name: &str) -> Self {
        Self {
            bytes,
            mime_type: mime_type.to_string(),
            suggested_name: suggested_name.to_string(),
        }
    }

    pub fn pdf(bytes: Vec<u8>, suggested_name: &str) -> Self {
        Self::new(bytes, PDF_MIME_TYPE, suggested_name)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
