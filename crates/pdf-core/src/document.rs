//! PDF document wrapper

use crate::font::{Font, FontHandle};
use crate::image::{generate_image_operators, ImageFormat, ImageXObject};
use crate::import::PageImporter;
use crate::text::{generate_text_operators, TextRenderContext, TextRun};
use crate::{compact, metadata, normalize_rotation, PdfError, Result};
use log::debug;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap};

/// Attributes a page may inherit from its ancestors in the page tree
pub(crate) const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Parent chain depth limit when resolving inherited attributes
const MAX_TREE_DEPTH: usize = 32;

/// Page size in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// A4 portrait, used when a page carries no usable MediaBox
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size as seen after a quarter-turn rotation is applied
    pub fn rotated(self, degrees: i32) -> Self {
        if normalize_rotation(degrees as i64) % 180 == 0 {
            self
        } else {
            Self {
                width: self.height,
                height: self.width,
            }
        }
    }
}

/// A page object owned by a specific document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageHandle(pub(crate) ObjectId);

/// An image XObject embedded in a specific document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    id: ObjectId,
    /// Native width in pixels
    pub width: u32,
    /// Native height in pixels
    pub height: u32,
}

/// Serialization options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Drop unreachable objects and merge byte-identical ones before writing
    pub compact: bool,
}

impl SaveOptions {
    pub fn compact() -> Self {
        Self { compact: true }
    }
}

struct RegisteredFont {
    object_id: ObjectId,
    font: Font,
    /// TrueType font objects need (re)writing at save
    dirty: bool,
}

/// PDF Document wrapper providing page-level operations
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Root of the page tree
    pages_id: ObjectId,
    /// Fonts registered for text overlays
    fonts: Vec<RegisteredFont>,
    /// ExtGState objects by opacity in thousandths
    opacity_states: HashMap<u32, ObjectId>,
    /// Buffered content operators per page object
    page_content_buffer: BTreeMap<ObjectId, Vec<u8>>,
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDocument {
    /// Create a new empty document with a single empty page tree
    pub fn new() -> Self {
        let mut inner = Document::with_version("1.7");

        let pages_id = inner.new_object_id();
        inner.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );

        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        let info_id = inner.add_object(metadata::fresh_info());
        inner.trailer.set("Info", info_id);

        Self::from_parts(inner, pages_id)
    }

    /// Load a PDF document from bytes
    ///
    /// Encrypted documents are rejected with [`PdfError::Encrypted`].
    ///
    /// # Arguments
    /// * `data` - PDF file bytes
    pub fn load(data: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(data).map_err(|e| PdfError::OpenError(e.to_string()))?;

        if inner.trailer.get(b"Encrypt").is_ok() {
            return Err(PdfError::Encrypted);
        }

        let pages_id = pages_root(&inner)?;
        let doc = Self::from_parts(inner, pages_id);
        debug!(
            "loaded PDF: {} bytes, {} pages",
            data.len(),
            doc.page_count()
        );
        Ok(doc)
    }

    fn from_parts(inner: Document, pages_id: ObjectId) -> Self {
        Self {
            inner,
            pages_id,
            fonts: Vec::new(),
            opacity_states: HashMap::new(),
            page_content_buffer: BTreeMap::new(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Handles for all pages, in document order
    pub fn pages(&self) -> Vec<PageHandle> {
        self.inner.get_pages().into_values().map(PageHandle).collect()
    }

    /// Handle for the page at a zero-based index
    pub fn page(&self, index: usize) -> Result<PageHandle> {
        let pages = self.inner.get_pages();
        u32::try_from(index + 1)
            .ok()
            .and_then(|number| pages.get(&number))
            .map(|&id| PageHandle(id))
            .ok_or(PdfError::InvalidPage(index, pages.len()))
    }

    /// Access the underlying lopdf document
    pub fn inner(&self) -> &Document {
        &self.inner
    }

    /// Intrinsic size of the page at a zero-based index, ignoring rotation
    pub fn page_size(&self, index: usize) -> Result<PageSize> {
        let page = self.page(index)?;
        self.page_handle_size(page)
    }

    /// Intrinsic size of a page, from its (possibly inherited) MediaBox
    pub fn page_handle_size(&self, page: PageHandle) -> Result<PageSize> {
        let media_box = match self.inherited_attribute(page.0, b"MediaBox")? {
            Some(obj) => self.resolve(&obj)?.as_array().ok().cloned(),
            None => None,
        };

        let Some(media_box) = media_box else {
            return Ok(PageSize::A4);
        };

        let numbers: Vec<f64> = media_box.iter().filter_map(as_number).collect();
        if numbers.len() != 4 {
            return Err(PdfError::ParseError("Invalid MediaBox format".to_string()));
        }

        Ok(PageSize {
            width: (numbers[2] - numbers[0]).abs(),
            height: (numbers[3] - numbers[1]).abs(),
        })
    }

    /// Current rotation of a page, normalized to 0, 90, 180 or 270
    pub fn rotation(&self, page: PageHandle) -> Result<i32> {
        let rotation = match self.inherited_attribute(page.0, b"Rotate")? {
            Some(obj) => self.resolve(&obj)?.as_i64().unwrap_or(0),
            None => 0,
        };
        Ok(normalize_rotation(rotation))
    }

    /// Set the absolute rotation of a page
    ///
    /// The value is normalized to one of 0, 90, 180 or 270.
    pub fn set_rotation(&mut self, page: PageHandle, degrees: i64) -> Result<()> {
        let rotation = normalize_rotation(degrees);
        self.page_dict_mut(page.0)?
            .set("Rotate", Object::Integer(rotation as i64));
        Ok(())
    }

    /// Copy pages from another document into this one
    ///
    /// The copies, along with every object they reference, are owned by this
    /// document; `source` is left untouched. Inherited attributes are flattened
    /// into each copy. The returned handles are not yet part of the page tree;
    /// add them with [`PdfDocument::append_page`].
    ///
    /// # Arguments
    /// * `source` - Document to copy from
    /// * `indices` - Zero-based page indices, in the order the copies are returned
    pub fn copy_pages(&mut self, source: &PdfDocument, indices: &[usize]) -> Result<Vec<PageHandle>> {
        let source_pages = source.inner.get_pages();
        let mut importer = PageImporter::new(&source.inner, &mut self.inner);
        let mut copies = Vec::with_capacity(indices.len());

        for &index in indices {
            let page_id = u32::try_from(index + 1)
                .ok()
                .and_then(|number| source_pages.get(&number))
                .ok_or(PdfError::InvalidPage(index, source_pages.len()))?;
            copies.push(PageHandle(importer.import_page(*page_id)?));
        }

        debug!(
            "copied {} pages ({} objects)",
            copies.len(),
            importer.copied_objects()
        );
        Ok(copies)
    }

    /// Append a page to the end of the page tree
    pub fn append_page(&mut self, page: PageHandle) -> Result<()> {
        let pages_id = self.pages_id;
        self.page_dict_mut(page.0)?
            .set("Parent", Object::Reference(pages_id));

        let pages_dict = self
            .inner
            .get_object_mut(pages_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Pages object is not a dictionary".to_string()))?;

        let count = pages_dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        match pages_dict.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => kids.push(Object::Reference(page.0)),
            _ => pages_dict.set("Kids", vec![Object::Reference(page.0)]),
        }
        pages_dict.set("Count", Object::Integer(count + 1));

        Ok(())
    }

    /// Create a blank page of the given size and append it
    pub fn add_page(&mut self, width: f64, height: f64) -> Result<PageHandle> {
        let page_id = self.inner.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(width as f32),
                Object::Real(height as f32),
            ],
            "Resources" => Dictionary::new(),
        });

        let page = PageHandle(page_id);
        self.append_page(page)?;
        Ok(page)
    }

    /// Embed a JPEG or PNG image as an XObject
    ///
    /// PNG transparency is preserved through a soft mask.
    pub fn embed_image(&mut self, data: &[u8], format: ImageFormat) -> Result<ImageHandle> {
        let xobject = ImageXObject::from_bytes(data, format)?;
        let mut stream = xobject.to_pdf_stream();

        if let Some(mask) = &xobject.soft_mask {
            let mask_id = self.inner.add_object(mask.to_pdf_stream());
            stream.dict.set("SMask", Object::Reference(mask_id));
        }

        let id = self.inner.add_object(stream);
        debug!(
            "embedded {:?} image {}x{} ({} bytes)",
            format,
            xobject.width,
            xobject.height,
            data.len()
        );

        Ok(ImageHandle {
            id,
            width: xobject.width,
            height: xobject.height,
        })
    }

    /// Draw an embedded image onto a page
    ///
    /// # Arguments
    /// * `x`, `y` - Lower-left corner in points
    /// * `width`, `height` - Drawn size in points
    pub fn draw_image(
        &mut self,
        page: PageHandle,
        image: &ImageHandle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let name = self.register_resource(page.0, b"XObject", "Im", image.id)?;
        let operators = generate_image_operators(&name, x, y, width, height);
        self.buffer_content(page.0, &operators);
        Ok(())
    }

    /// Register a font for text overlays
    ///
    /// Standard fonts are written immediately; TrueType fonts are written at
    /// save time once every drawn character is known.
    pub fn embed_font(&mut self, font: Font) -> FontHandle {
        let object_id = match &font {
            Font::Standard(standard) => self.inner.add_object(standard.to_pdf_dictionary()),
            Font::TrueType(_) => self.inner.new_object_id(),
        };

        self.fonts.push(RegisteredFont {
            object_id,
            font,
            dirty: true,
        });
        FontHandle {
            slot: self.fonts.len() - 1,
        }
    }

    /// Look up a registered font
    pub fn font(&self, handle: FontHandle) -> Result<&Font> {
        self.fonts
            .get(handle.slot)
            .map(|registered| &registered.font)
            .ok_or_else(|| PdfError::ParseError("Unknown font handle".to_string()))
    }

    /// Draw a rotated, optionally translucent text run onto a page
    pub fn draw_text(&mut self, page: PageHandle, font: FontHandle, run: &TextRun<'_>) -> Result<()> {
        let registered = self
            .fonts
            .get_mut(font.slot)
            .ok_or_else(|| PdfError::ParseError("Unknown font handle".to_string()))?;

        let text_hex = registered.font.encode_text_hex(run.text)?;
        if let Font::TrueType(data) = &mut registered.font {
            data.add_chars(run.text);
            registered.dirty = true;
        }
        let font_id = registered.object_id;

        let font_name = self.register_resource(page.0, b"Font", "F", font_id)?;
        let graphics_state = if run.opacity < 1.0 {
            let state_id = self.opacity_state(run.opacity);
            Some(self.register_resource(page.0, b"ExtGState", "GS", state_id)?)
        } else {
            None
        };

        let ctx = TextRenderContext {
            font_name,
            font_size: run.font_size,
            color: run.color,
            rotation_deg: run.rotation_deg,
            graphics_state,
        };
        let operators = generate_text_operators(&text_hex, run.x, run.y, &ctx);
        self.buffer_content(page.0, &operators);
        Ok(())
    }

    /// Clear the document information fields and reset its timestamps
    pub fn strip_metadata(&mut self) -> Result<()> {
        metadata::strip(&mut self.inner)
    }

    /// Read a document information field such as "Title" or "Producer"
    pub fn metadata_field(&self, key: &str) -> Option<String> {
        metadata::field(&self.inner, key)
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self, options: SaveOptions) -> Result<Vec<u8>> {
        // 1. Flush buffered content streams to pages
        self.flush_content_buffers()?;

        // 2. Write TrueType fonts with their final character sets
        self.embed_fonts()?;

        let mut buffer = Vec::new();
        if options.compact {
            // Compaction renumbers objects, so work on a copy and keep our ids valid
            let mut compacted = self.inner.clone();
            let merged = compact::compact(&mut compacted);
            compacted.compress();
            compacted
                .save_to(&mut buffer)
                .map_err(|e| PdfError::SaveError(e.to_string()))?;
            debug!("compacted save merged {merged} duplicate objects");
        } else {
            self.inner.compress();
            self.inner
                .save_to(&mut buffer)
                .map_err(|e| PdfError::SaveError(e.to_string()))?;
        }

        debug!("saved PDF: {} pages, {} bytes", self.page_count(), buffer.len());
        Ok(buffer)
    }

    fn embed_fonts(&mut self) -> Result<()> {
        for registered in self.fonts.iter_mut().filter(|f| f.dirty) {
            if let Font::TrueType(data) = &registered.font {
                data.embed_into(&mut self.inner, registered.object_id)?;
            }
            registered.dirty = false;
        }
        Ok(())
    }

    /// Shared ExtGState for a fill/stroke opacity
    fn opacity_state(&mut self, opacity: f32) -> ObjectId {
        let opacity = opacity.clamp(0.0, 1.0);
        let key = (opacity * 1000.0).round() as u32;
        if let Some(id) = self.opacity_states.get(&key) {
            return *id;
        }

        let id = self.inner.add_object(dictionary! {
            "Type" => "ExtGState",
            "ca" => Object::Real(opacity),
            "CA" => Object::Real(opacity),
        });
        self.opacity_states.insert(key, id);
        id
    }

    /// Resolve a reference to the object it points to
    fn resolve<'a>(&'a self, obj: &'a Object) -> Result<&'a Object> {
        match obj {
            Object::Reference(id) => Ok(self.inner.get_object(*id)?),
            other => Ok(other),
        }
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.inner
            .get_object_mut(page_id)?
            .as_dict_mut()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))
    }

    /// Look up a page attribute, following the Parent chain if needed
    fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        inherited_attribute(&self.inner, page_id, key)
    }

    /// Add an object to one of a page's resource categories and return its name
    ///
    /// The page's (possibly shared or inherited) Resources dictionary is copied
    /// into the page so that other pages are unaffected. An object already
    /// present in the category keeps its existing name.
    fn register_resource(
        &mut self,
        page_id: ObjectId,
        category: &[u8],
        prefix: &str,
        object_id: ObjectId,
    ) -> Result<String> {
        let mut resources = match self.inherited_attribute(page_id, b"Resources")? {
            Some(obj) => self.resolve(&obj)?.as_dict().cloned().unwrap_or_default(),
            None => Dictionary::new(),
        };

        let mut entries = match resources.get(category) {
            Ok(obj) => self.resolve(obj)?.as_dict().cloned().unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };

        let existing = entries.iter().find_map(|(name, value)| match value {
            Object::Reference(id) if *id == object_id => {
                Some(String::from_utf8_lossy(name).into_owned())
            }
            _ => None,
        });

        let name = match existing {
            Some(name) => name,
            None => {
                let name = (1..)
                    .map(|n| format!("{prefix}{n}"))
                    .find(|candidate| !entries.has(candidate.as_bytes()))
                    .unwrap_or_else(|| prefix.to_string());
                entries.set(name.as_bytes(), Object::Reference(object_id));
                name
            }
        };

        resources.set(category, Object::Dictionary(entries));
        self.page_dict_mut(page_id)?
            .set("Resources", Object::Dictionary(resources));

        Ok(name)
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page_id: ObjectId, content: &[u8]) {
        self.page_content_buffer
            .entry(page_id)
            .or_default()
            .extend_from_slice(content);
    }

    /// Flush all buffered content to page streams
    ///
    /// Existing content is left in place and wrapped in `q`/`Q`, so overlays
    /// are drawn with an untouched graphics state on top of the original page.
    fn flush_content_buffers(&mut self) -> Result<()> {
        let buffers = std::mem::take(&mut self.page_content_buffer);
        if buffers.is_empty() {
            return Ok(());
        }

        let mut save_state_id = None;

        for (page_id, content) in buffers {
            let existing = self.existing_content_refs(page_id)?;

            let mut contents = Vec::with_capacity(existing.len() + 2);
            let overlay = if existing.is_empty() {
                content
            } else {
                let q_id = *save_state_id.get_or_insert_with(|| {
                    self.inner
                        .add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()))
                });
                contents.push(Object::Reference(q_id));
                contents.extend(existing.into_iter().map(Object::Reference));

                let mut overlay = b"\nQ\n".to_vec();
                overlay.extend_from_slice(&content);
                overlay
            };

            let overlay_id = self
                .inner
                .add_object(Stream::new(Dictionary::new(), overlay));
            contents.push(Object::Reference(overlay_id));

            self.page_dict_mut(page_id)?
                .set("Contents", Object::Array(contents));
        }

        Ok(())
    }

    /// Content stream references of a page, adopting direct streams as objects
    fn existing_content_refs(&mut self, page_id: ObjectId) -> Result<Vec<ObjectId>> {
        let contents = self
            .inner
            .get_object(page_id)?
            .as_dict()
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .get(b"Contents")
            .ok()
            .cloned();

        let items = match contents {
            None => return Ok(Vec::new()),
            Some(Object::Reference(id)) => match self.inner.get_object(id)? {
                Object::Array(items) => items.clone(),
                _ => return Ok(vec![id]),
            },
            Some(Object::Array(items)) => items,
            Some(other) => vec![other],
        };

        let mut refs = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Object::Reference(id) => refs.push(id),
                Object::Stream(stream) => refs.push(self.inner.add_object(stream)),
                _ => {}
            }
        }
        Ok(refs)
    }
}

/// Numeric value of an Integer or Real object
pub(crate) fn as_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Find the root Pages object through the trailer and catalog
fn pages_root(doc: &Document) -> Result<ObjectId> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::ParseError("Document trailer missing Root entry".to_string()))?;

    doc.get_dictionary(catalog_id)
        .map_err(|_| PdfError::ParseError("Catalog is not a dictionary".to_string()))?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|_| PdfError::ParseError("Catalog missing Pages entry".to_string()))
}

/// Look up a page attribute, following the Parent chain if needed
pub(crate) fn inherited_attribute(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<Object>> {
    let mut current_id = page_id;

    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc
            .get_dictionary(current_id)
            .map_err(|_| PdfError::ParseError("Page tree node is not a dictionary".to_string()))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value.clone()));
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => current_id = *parent_id,
            _ => break,
        }
    }

    Ok(None)
}
