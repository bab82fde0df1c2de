//! Page composition for the organize tool
//!
//! The UI edits a [`PageDescriptorList`] by replacing it: every edit returns a
//! new list with a bumped version, so the value passed to
//! [`organize`](crate::organize) is exactly what the user last saw.

use pdf_core::normalize_rotation;
use serde::{Deserialize, Serialize};

/// One page of the intended output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageDescriptor {
    /// Stable identity for drag-and-drop; not interpreted
    pub id: String,
    /// Zero-based index into the source document
    pub original_index: usize,
    /// Quarter turns added on top of the page's own rotation, in degrees
    pub rotation: i32,
    pub included: bool,
}

impl Default for PageDescriptor {
    fn default() -> Self {
        Self {
            id: String::new(),
            original_index: 0,
            rotation: 0,
            included: true,
        }
    }
}

impl PageDescriptor {
    pub fn new(original_index: usize) -> Self {
        Self {
            id: format!("page-{original_index}"),
            original_index,
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, rotation: i32) -> Self {
        self.rotation = normalize_rotation(rotation as i64);
        self
    }
}

/// Versioned, immutable list of page descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDescriptorList {
    version: u64,
    descriptors: Vec<PageDescriptor>,
}

impl PageDescriptorList {
    /// Every page of an `n`-page document, in order and unrotated
    pub fn from_page_count(page_count: usize) -> Self {
        Self {
            version: 0,
            descriptors: (0..page_count).map(PageDescriptor::new).collect(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn descriptors(&self) -> &[PageDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn rotate_right(&self, id: &str) -> Self {
        self.rotate_by(id, 90)
    }

    pub fn rotate_left(&self, id: &str) -> Self {
        self.rotate_by(id, -90)
    }

    pub fn remove(&self, id: &str) -> Self {
        let Some(position) = self.position(id) else {
            return self.clone();
        };
        let mut descriptors = self.descriptors.clone();
        descriptors.remove(position);
        self.next(descriptors)
    }

    /// Move a page to `position`, clamped to the end of the list
    pub fn move_to(&self, id: &str, position: usize) -> Self {
        let Some(from) = self.position(id) else {
            return self.clone();
        };
        let mut descriptors = self.descriptors.clone();
        let descriptor = descriptors.remove(from);
        descriptors.insert(position.min(descriptors.len()), descriptor);
        self.next(descriptors)
    }

    fn rotate_by(&self, id: &str, delta: i32) -> Self {
        let Some(position) = self.position(id) else {
            return self.clone();
        };
        let mut descriptors = self.descriptors.clone();
        let descriptor = &mut descriptors[position];
        descriptor.rotation = normalize_rotation(descriptor.rotation as i64 + delta as i64);
        self.next(descriptors)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.id == id)
    }

    fn next(&self, descriptors: Vec<PageDescriptor>) -> Self {
        Self {
            version: self.version + 1,
            descriptors,
        }
    }
}
