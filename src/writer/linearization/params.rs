//! Linearization parameter dictionary.
//!
//! ISO 32000-1 Table F.1. The dictionary must be the first object in the
//! file, so it is written twice: once with the widest possible values to
//! reserve space, then with the real values and padding.

use crate::object::Object;
use serde::Serialize;

/// Linearization parameter dictionary entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinearizationParams {
    /// Total length of the file in bytes.
    pub file_length: u64,
    /// Offset and length of primary hint stream [offset, length].
    pub hint_stream: [u64; 2],
    /// Object number of first page's page object.
    pub first_page_object: u32,
    /// Offset of end of first page.
    pub end_of_first_page: u64,
    /// Number of pages in document.
    pub num_pages: u32,
    /// Offset of the main cross-reference stream.
    pub main_xref_offset: u64,
}

impl LinearizationParams {
    /// Create a new linearization parameters structure.
    pub fn new(num_pages: u32) -> Self {
        Self {
            num_pages,
            ..Self::default()
        }
    }

    /// Parameters whose serialized form is at least as long as any real one.
    pub fn placeholder() -> Self {
        Self {
            file_length: i64::MAX as u64,
            hint_stream: [i32::MAX as u64, i32::MAX as u64],
            first_page_object: i32::MAX as u32,
            end_of_first_page: i64::MAX as u64,
            num_pages: i32::MAX as u32,
            main_xref_offset: i64::MAX as u64,
        }
    }

    /// Build the linearization parameter dictionary as a PDF Object.
    pub fn to_object(&self) -> Object {
        Object::dict([
            ("Linearized", Object::Integer(1)),
            ("L", Object::Integer(self.file_length as i64)),
            (
                "H",
                Object::Array(vec![
                    Object::Integer(self.hint_stream[0] as i64),
                    Object::Integer(self.hint_stream[1] as i64),
                ]),
            ),
            ("O", Object::Integer(self.first_page_object as i64)),
            ("E", Object::Integer(self.end_of_first_page as i64)),
            ("N", Object::Integer(self.num_pages as i64)),
            ("T", Object::Integer(self.main_xref_offset as i64)),
        ])
    }
}
