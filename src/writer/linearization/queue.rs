//! Output object numbering.
//!
//! Objects are numbered in the order they are enqueued. Four structures of the
//! linearized file (the linearization dictionary, both cross-reference streams
//! and the hint stream) need a number before their content can be computed;
//! they are enqueued as placeholders and resolved later, keeping the number
//! reserved for them.

use crate::error::LinearizationError;
use crate::object::{Object, ObjectRef};
use std::collections::HashMap;
use std::fmt;

/// Structures whose object numbers are reserved before their content exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Linearization parameter dictionary.
    LinearizationDict,
    /// First-page cross-reference stream.
    FirstXref,
    /// Primary hint stream.
    HintStream,
    /// Main cross-reference stream.
    SecondXref,
}

impl Placeholder {
    /// Short name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Placeholder::LinearizationDict => "linearization dictionary",
            Placeholder::FirstXref => "first-page xref stream",
            Placeholder::HintStream => "hint stream",
            Placeholder::SecondXref => "main xref stream",
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// State of a reserved slot.
#[derive(Debug, Clone, PartialEq)]
pub enum DummySlot {
    /// Number reserved, content unknown.
    Pending(u32),
    /// Content known.
    Resolved {
        /// Reserved object number
        number: u32,
        /// Final object
        object: Object,
        /// Serialized length in bytes
        length: u64,
    },
}

impl DummySlot {
    /// Reserved object number.
    pub fn number(&self) -> u32 {
        match self {
            DummySlot::Pending(number) | DummySlot::Resolved { number, .. } => *number,
        }
    }
}

/// A document object with its output number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedObject {
    /// Object in the input document.
    pub source: ObjectRef,
    /// Assigned output object number.
    pub number: u32,
    /// Serialized length, once written.
    pub length: Option<u64>,
}

/// Numbering queue for one linearization run.
#[derive(Debug, Clone)]
pub struct ObjectQueue {
    entries: Vec<QueuedObject>,
    index: HashMap<ObjectRef, usize>,
    dummies: HashMap<Placeholder, DummySlot>,
    next_id: u32,
}

impl Default for ObjectQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectQueue {
    /// Create an empty queue numbering from 1.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            dummies: HashMap::new(),
            next_id: 1,
        }
    }

    /// Continue numbering from `id`.
    pub fn set_next_id(&mut self, id: u32) {
        self.next_id = id;
    }

    /// Continue numbering from 1.
    pub fn reset_numbering(&mut self) {
        self.next_id = 1;
    }

    /// Number the next enqueued item will get.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Enqueue a document object and return its number.
    ///
    /// An object already in the queue keeps its first number.
    pub fn enqueue_object(&mut self, source: ObjectRef) -> u32 {
        if let Some(&pos) = self.index.get(&source) {
            log::warn!("Object {} enqueued twice, keeping first position", source);
            return self.entries[pos].number;
        }
        let number = self.next_id;
        self.next_id += 1;
        self.index.insert(source, self.entries.len());
        self.entries.push(QueuedObject {
            source,
            number,
            length: None,
        });
        number
    }

    /// Enqueue every object of a part, in order.
    pub fn enqueue_part(&mut self, part: &[ObjectRef]) {
        for &obj in part {
            self.enqueue_object(obj);
        }
    }

    /// Reserve a number for `kind`.
    pub fn enqueue_dummy(&mut self, kind: Placeholder) -> u32 {
        let number = self.next_id;
        self.next_id += 1;
        self.dummies.insert(kind, DummySlot::Pending(number));
        number
    }

    /// Replace the placeholder's content, keeping its number.
    pub fn replace_dummy(
        &mut self,
        kind: Placeholder,
        object: Object,
        length: u64,
    ) -> Result<u32, LinearizationError> {
        let slot = self
            .dummies
            .get_mut(&kind)
            .ok_or(LinearizationError::UnresolvedPlaceholder(kind.name()))?;
        let number = slot.number();
        *slot = DummySlot::Resolved {
            number,
            object,
            length,
        };
        Ok(number)
    }

    /// Number reserved for `kind`.
    pub fn dummy_number(&self, kind: Placeholder) -> Result<u32, LinearizationError> {
        self.dummies
            .get(&kind)
            .map(DummySlot::number)
            .ok_or(LinearizationError::UnresolvedPlaceholder(kind.name()))
    }

    /// Resolved object and length of `kind`.
    pub fn resolved(&self, kind: Placeholder) -> Result<(&Object, u64), LinearizationError> {
        match self.dummies.get(&kind) {
            Some(DummySlot::Resolved { object, length, .. }) => Ok((object, *length)),
            _ => Err(LinearizationError::UnresolvedPlaceholder(kind.name())),
        }
    }

    /// Output number of a document object.
    pub fn number_of(&self, source: ObjectRef) -> Result<u32, LinearizationError> {
        self.get(source)
            .map(|entry| entry.number)
            .ok_or(LinearizationError::UnqueuedObject(source))
    }

    /// Serialized length of a document object, failing if not yet written.
    pub fn length_of(&self, source: ObjectRef) -> Result<u64, LinearizationError> {
        self.get(source)
            .and_then(|entry| entry.length)
            .ok_or(LinearizationError::UnqueuedObject(source))
    }

    /// Queue entry of a document object.
    pub fn get(&self, source: ObjectRef) -> Option<&QueuedObject> {
        self.index.get(&source).map(|&pos| &self.entries[pos])
    }

    /// Record the serialized length of a document object.
    pub fn record_length(&mut self, source: ObjectRef, length: u64) -> Result<(), LinearizationError> {
        let pos = *self
            .index
            .get(&source)
            .ok_or(LinearizationError::UnqueuedObject(source))?;
        self.entries[pos].length = Some(length);
        Ok(())
    }

    /// Document objects in enqueue order.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedObject> {
        self.entries.iter()
    }

    /// Number of document objects (placeholders excluded).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no document object was enqueued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
