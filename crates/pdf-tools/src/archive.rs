//! Zip packing for multi-file outputs

use crate::Result;
use log::debug;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const ZIP_MIME_TYPE: &str = "application/zip";

/// Collects named entries into an in-memory zip archive
///
/// Entries are stored without compression; every entry is an already
/// compressed image.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    entries: usize,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
            entries: 0,
        }
    }

    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(bytes)?;
        self.entries += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let entries = self.entries;
        let bytes = self.writer.finish()?.into_inner();
        debug!("packed {entries} archive entries into {} bytes", bytes.len());
        Ok(bytes)
    }
}
