//! Lossless size reduction at save time
//!
//! Unreachable objects are dropped and byte-identical objects (fonts, images,
//! resource dictionaries that were copied once per source file) are merged
//! into a single shared object before the document is renumbered. Only
//! objects that are referenced purely for their content are merged; layers,
//! annotations, form fields and other objects referenced by identity are
//! always kept apart.

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::HashMap;

/// Merging can expose new duplicates (two dictionaries that only differed by
/// references to objects now merged), so deduplicate in a few passes.
const MAX_PASSES: usize = 4;

/// Compact `doc` in place and return how many objects were merged away
pub(crate) fn compact(doc: &mut Document) -> usize {
    doc.prune_objects();

    let mut merged = 0;
    for _ in 0..MAX_PASSES {
        let duplicates = find_duplicates(doc);
        if duplicates.is_empty() {
            break;
        }
        merged += duplicates.len();

        for object in doc.objects.values_mut() {
            redirect(object, &duplicates);
        }
        for value in doc.trailer.iter_mut().map(|(_, value)| value) {
            redirect(value, &duplicates);
        }
        for id in duplicates.keys() {
            doc.objects.remove(id);
        }
    }

    doc.renumber_objects();
    merged
}

/// Map each duplicate object id to the lowest id with the same content
fn find_duplicates(doc: &Document) -> HashMap<ObjectId, ObjectId> {
    let mut seen: HashMap<Vec<u8>, ObjectId> = HashMap::new();
    let mut duplicates = HashMap::new();

    // BTreeMap order: the lowest id of each group wins
    for (&id, object) in &doc.objects {
        if !is_shareable(object) {
            continue;
        }

        let mut key = Vec::new();
        fingerprint(object, &mut key);
        match seen.get(&key) {
            Some(&canonical) => {
                duplicates.insert(id, canonical);
            }
            None => {
                seen.insert(key, id);
            }
        }
    }

    duplicates
}

/// Resource categories a page's `/Resources` dictionary may hold
const RESOURCE_KEYS: &[&[u8]] = &[
    b"Font",
    b"XObject",
    b"ExtGState",
    b"ColorSpace",
    b"Pattern",
    b"Shading",
    b"ProcSet",
    b"Properties",
];

/// Whether an object can be swapped for an identical copy without changing the page
fn is_shareable(object: &Object) -> bool {
    match object {
        Object::Stream(_) => true,
        Object::Array(items) => items
            .iter()
            .all(|item| matches!(item, Object::Integer(_) | Object::Real(_))),
        Object::Dictionary(dict) => match dict.get(b"Type") {
            Ok(Object::Name(name)) => matches!(
                name.as_slice(),
                b"Font" | b"FontDescriptor" | b"XObject" | b"ExtGState" | b"Encoding"
            ),
            Ok(_) => false,
            Err(_) => {
                !dict.is_empty()
                    && dict
                        .iter()
                        .all(|(key, _)| RESOURCE_KEYS.contains(&key.as_slice()))
            }
        },
        _ => false,
    }
}

fn redirect(object: &mut Object, duplicates: &HashMap<ObjectId, ObjectId>) {
    match object {
        Object::Reference(id) => {
            if let Some(canonical) = duplicates.get(id) {
                *id = *canonical;
            }
        }
        Object::Array(items) => {
            for item in items {
                redirect(item, duplicates);
            }
        }
        Object::Dictionary(dict) => redirect_dictionary(dict, duplicates),
        Object::Stream(stream) => redirect_dictionary(&mut stream.dict, duplicates),
        _ => {}
    }
}

fn redirect_dictionary(dict: &mut Dictionary, duplicates: &HashMap<ObjectId, ObjectId>) {
    for (_, value) in dict.iter_mut() {
        redirect(value, duplicates);
    }
}

/// Unambiguous byte encoding of an object, with dictionary keys sorted
fn fingerprint(object: &Object, out: &mut Vec<u8>) {
    match object {
        Object::Null => out.push(b'n'),
        Object::Boolean(value) => out.extend_from_slice(&[b'b', *value as u8]),
        Object::Integer(value) => {
            out.push(b'i');
            out.extend_from_slice(&value.to_be_bytes());
        }
        Object::Real(value) => {
            out.push(b'r');
            out.extend_from_slice(&value.to_bits().to_be_bytes());
        }
        Object::Name(name) => {
            out.push(b'N');
            write_bytes(name, out);
        }
        Object::String(bytes, format) => {
            out.push(match format {
                StringFormat::Literal => b'S',
                StringFormat::Hexadecimal => b'H',
            });
            write_bytes(bytes, out);
        }
        Object::Array(items) => {
            out.push(b'A');
            out.extend_from_slice(&(items.len() as u64).to_be_bytes());
            for item in items {
                fingerprint(item, out);
            }
        }
        Object::Dictionary(dict) => {
            out.push(b'D');
            fingerprint_dictionary(dict, out);
        }
        Object::Stream(stream) => {
            out.push(b'T');
            fingerprint_dictionary(&stream.dict, out);
            write_bytes(&stream.content, out);
        }
        Object::Reference((number, generation)) => {
            out.push(b'R');
            out.extend_from_slice(&number.to_be_bytes());
            out.extend_from_slice(&generation.to_be_bytes());
        }
    }
}

fn fingerprint_dictionary(dict: &Dictionary, out: &mut Vec<u8>) {
    let mut entries: Vec<(&Vec<u8>, &Object)> = dict.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    out.extend_from_slice(&(entries.len() as u64).to_be_bytes());
    for (key, value) in entries {
        write_bytes(key, out);
        fingerprint(value, out);
    }
}

fn write_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    out.extend_from_slice(bytes);
}
