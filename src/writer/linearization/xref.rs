//! Cross-reference streams.
//!
//! Both cross-reference sections of a linearized file are written as
//! uncompressed cross-reference streams with fixed field widths `[1 4 2]`,
//! so a placeholder stream with zeroed offsets has exactly the data length of
//! the final one.

use crate::error::LinearizationError;
use crate::object::{Dict, Object};

/// Field widths: entry type, offset or next free object, generation.
pub const FIELD_WIDTHS: [usize; 3] = [1, 4, 2];

/// Bytes per cross-reference stream entry.
pub const ENTRY_LEN: usize = FIELD_WIDTHS[0] + FIELD_WIDTHS[1] + FIELD_WIDTHS[2];

/// One cross-reference entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefEntry {
    /// Free object, linked to the next free object number.
    Free {
        /// Next free object number
        next: u32,
        /// Generation used if the number is reused
        generation: u16,
    },
    /// Object stored uncompressed at a byte offset.
    InUse {
        /// Byte offset of the `N G obj` header
        offset: u64,
        /// Generation number
        generation: u16,
    },
}

impl XrefEntry {
    /// Head of the free list, entry 0.
    pub fn free_head() -> Self {
        XrefEntry::Free {
            next: 0,
            generation: 65535,
        }
    }

    /// In-use entry at `offset`, generation 0.
    pub fn in_use(offset: u64) -> Self {
        XrefEntry::InUse {
            offset,
            generation: 0,
        }
    }

    /// Append the binary form of the entry.
    fn encode(&self, out: &mut Vec<u8>) -> Result<(), LinearizationError> {
        let (kind, field, generation) = match *self {
            XrefEntry::Free { next, generation } => (0u8, next as u64, generation),
            XrefEntry::InUse { offset, generation } => (1u8, offset, generation),
        };
        let field = u32::try_from(field).map_err(|_| LinearizationError::ValueOutOfRange {
            field: "xref offset",
            value: field,
        })?;
        out.push(kind);
        out.extend_from_slice(&field.to_be_bytes());
        out.extend_from_slice(&generation.to_be_bytes());
        Ok(())
    }
}

/// Cross-reference entries keyed by object number.
///
/// Entries are kept sorted; lookups use binary search.
#[derive(Debug, Clone, Default)]
pub struct XrefTable {
    entries: Vec<(u32, XrefEntry)>,
}

impl XrefTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entry for `number`, replacing any previous one.
    pub fn insert(&mut self, number: u32, entry: XrefEntry) {
        match self.entries.binary_search_by_key(&number, |(n, _)| *n) {
            Ok(pos) => self.entries[pos].1 = entry,
            Err(pos) => self.entries.insert(pos, (number, entry)),
        }
    }

    /// Entry for `number`.
    pub fn get(&self, number: u32) -> Result<&XrefEntry, LinearizationError> {
        self.entries
            .binary_search_by_key(&number, |(n, _)| *n)
            .map(|pos| &self.entries[pos].1)
            .map_err(|_| LinearizationError::MissingXrefEntry(number))
    }

    /// Entries for the contiguous range `first..first + count`.
    pub fn range(&self, first: u32, count: u32) -> Result<Vec<XrefEntry>, LinearizationError> {
        (first..first + count).map(|n| self.get(n).copied()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A cross-reference stream ready to be serialized.
#[derive(Debug, Clone)]
pub struct XrefStream {
    /// First object number covered.
    pub first: u32,
    /// Entries for `first..first + entries.len()`.
    pub entries: Vec<XrefEntry>,
    /// Trailer `/Size`.
    pub size: u32,
    /// Trailer `/Prev`.
    pub prev: Option<u64>,
}

impl XrefStream {
    /// Same-length stand-in for a stream covering `count` objects.
    pub fn placeholder(first: u32, count: u32, size: u32, with_prev: bool) -> Self {
        Self {
            first,
            entries: vec![XrefEntry::in_use(0); count as usize],
            size,
            prev: with_prev.then_some(i64::MAX as u64),
        }
    }

    /// Build the stream object, carrying `trailer` keys after the xref keys.
    pub fn to_object(&self, trailer: &Dict) -> Result<Object, LinearizationError> {
        let mut data = Vec::with_capacity(self.entries.len() * ENTRY_LEN);
        for entry in &self.entries {
            entry.encode(&mut data)?;
        }

        let mut dict = Dict::new();
        dict.insert("Type".to_string(), Object::name("XRef"));
        dict.insert("Size".to_string(), Object::Integer(self.size as i64));
        dict.insert(
            "Index".to_string(),
            Object::Array(vec![
                Object::Integer(self.first as i64),
                Object::Integer(self.entries.len() as i64),
            ]),
        );
        dict.insert(
            "W".to_string(),
            Object::Array(FIELD_WIDTHS.iter().map(|&w| Object::Integer(w as i64)).collect()),
        );
        if let Some(prev) = self.prev {
            dict.insert("Prev".to_string(), Object::Integer(prev as i64));
        }
        for (key, value) in trailer {
            dict.insert(key.clone(), value.clone());
        }

        Ok(Object::Stream {
            dict,
            data: bytes::Bytes::from(data),
        })
    }
}
