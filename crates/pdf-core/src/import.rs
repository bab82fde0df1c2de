//! Copying pages and their object graphs between documents

use crate::document::{inherited_attribute, INHERITABLE_KEYS};
use crate::{PdfError, Result};
use log::warn;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{HashMap, VecDeque};

/// Copies pages from `source` into `dest`, sharing copied objects between
/// pages imported through the same importer.
pub(crate) struct PageImporter<'a> {
    source: &'a Document,
    dest: &'a mut Document,
    /// Source object id -> destination object id
    id_map: HashMap<ObjectId, ObjectId>,
    /// Source objects allocated in `dest` but not yet copied
    pending: VecDeque<ObjectId>,
}

impl<'a> PageImporter<'a> {
    pub fn new(source: &'a Document, dest: &'a mut Document) -> Self {
        Self {
            source,
            dest,
            id_map: HashMap::new(),
            pending: VecDeque::new(),
        }
    }

    /// Number of objects created in the destination so far
    pub fn copied_objects(&self) -> usize {
        self.id_map.len()
    }

    /// Copy one page and everything it references
    ///
    /// Importing the same page twice yields two distinct page objects that
    /// share their resources.
    pub fn import_page(&mut self, page_id: ObjectId) -> Result<ObjectId> {
        let page = self.flattened_page(page_id)?;

        let new_id = self.dest.new_object_id();
        // Annotations point back at their page through /P
        self.id_map.entry(page_id).or_insert(new_id);

        let copied = self.remap_dictionary(&page);
        self.dest.objects.insert(new_id, Object::Dictionary(copied));
        self.drain();

        Ok(new_id)
    }

    /// Page dictionary with inherited attributes pulled in and Parent removed
    fn flattened_page(&self, page_id: ObjectId) -> Result<Dictionary> {
        let mut page = self
            .source
            .get_dictionary(page_id)
            .map_err(|_| PdfError::ParseError("Page object is not a dictionary".to_string()))?
            .clone();

        for key in INHERITABLE_KEYS {
            if page.has(key) {
                continue;
            }
            if let Some(value) = inherited_attribute(self.source, page_id, key)? {
                page.set(key, value);
            }
        }

        page.remove(b"Parent");
        Ok(page)
    }

    /// Copy every allocated-but-uncopied object
    fn drain(&mut self) {
        while let Some(source_id) = self.pending.pop_front() {
            let Some(&dest_id) = self.id_map.get(&source_id) else {
                continue;
            };

            let object = match self.source.get_object(source_id) {
                Ok(object) => object.clone(),
                Err(e) => {
                    warn!("dangling reference {source_id:?} while copying page: {e}");
                    Object::Null
                }
            };

            let copied = match object {
                // A page reached through a link or annotation, not the page tree
                Object::Dictionary(mut dict) if is_page(&dict) => {
                    dict.remove(b"Parent");
                    Object::Dictionary(self.remap_dictionary(&dict))
                }
                other => self.remap(&other),
            };
            self.dest.objects.insert(dest_id, copied);
        }
    }

    /// Destination id for a source object, allocating it on first sight
    fn map_id(&mut self, source_id: ObjectId) -> ObjectId {
        if let Some(id) = self.id_map.get(&source_id) {
            return *id;
        }
        let id = self.dest.new_object_id();
        self.id_map.insert(source_id, id);
        self.pending.push_back(source_id);
        id
    }

    /// Rewrite references inside a direct object
    fn remap(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.map_id(*id)),
            Object::Array(items) => Object::Array(items.iter().map(|item| self.remap(item)).collect()),
            Object::Dictionary(dict) => Object::Dictionary(self.remap_dictionary(dict)),
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.remap_dictionary(&stream.dict);
                Object::Stream(stream)
            }
            other => other.clone(),
        }
    }

    fn remap_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copied = Dictionary::new();
        for (key, value) in dict.iter() {
            copied.set(key.clone(), self.remap(value));
        }
        copied
    }
}

fn is_page(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"Page")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};
    use pretty_assertions::assert_eq;

    /// Two pages sharing a font, with MediaBox and Rotate inherited from the root
    fn source_document() -> (Document, ObjectId, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for text in ["page one", "page two"] {
            let content = format!("BT /F1 12 Tf 10 10 Td ({text}) Tj ET");
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            page_ids.push(doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            }));
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
                "Count" => 2,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(300),
                    Object::Integer(400),
                ],
                "Rotate" => 90,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        (doc, page_ids[0], page_ids[1])
    }

    #[test]
    fn test_import_flattens_inherited_attributes() {
        let (source, first, _) = source_document();
        let mut dest = Document::with_version("1.7");

        let copied = PageImporter::new(&source, &mut dest).import_page(first).unwrap();
        let page = dest.get_dictionary(copied).unwrap();

        assert!(page.get(b"Parent").is_err());
        assert_eq!(page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
        assert_eq!(page.get(b"MediaBox").unwrap().as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_shared_resources_copied_once() {
        let (source, first, second) = source_document();
        let mut dest = Document::with_version("1.7");

        let mut importer = PageImporter::new(&source, &mut dest);
        let a = importer.import_page(first).unwrap();
        let b = importer.import_page(second).unwrap();
        drop(importer);

        let resources_of = |id: ObjectId| {
            dest.get_dictionary(id)
                .unwrap()
                .get(b"Resources")
                .unwrap()
                .as_reference()
                .unwrap()
        };
        assert_eq!(resources_of(a), resources_of(b));

        // Two pages, two content streams, one resources dict, one font
        assert_eq!(dest.objects.len(), 6);
    }

    #[test]
    fn test_source_is_untouched() {
        let (source, first, _) = source_document();
        let before = source.objects.len();
        let mut dest = Document::with_version("1.7");

        PageImporter::new(&source, &mut dest).import_page(first).unwrap();

        assert_eq!(source.objects.len(), before);
        assert!(source.get_dictionary(first).unwrap().get(b"Parent").is_ok());
    }

    #[test]
    fn test_same_page_twice_gives_distinct_copies() {
        let (source, first, _) = source_document();
        let mut dest = Document::with_version("1.7");

        let mut importer = PageImporter::new(&source, &mut dest);
        let a = importer.import_page(first).unwrap();
        let b = importer.import_page(first).unwrap();
        assert_ne!(a, b);
    }
}
