//! Error types for the linearizer.
//!
//! [`Error`] is the crate-wide error. Internal-consistency failures of the
//! linearization engine are reported through [`LinearizationError`], which names
//! the invariant that did not hold. None of them are recoverable: a run that
//! hits one is aborted and produces no output.

use crate::object::ObjectRef;

/// Result type alias for linearizer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while linearizing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Referenced object not found in the document
    #[error("Object not found: {0} {1} R")]
    ObjectNotFound(u32, u16),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Invalid PDF structure (generic)
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// Run statistics could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal invariant of the linearization engine failed
    #[error("Linearization failed: {0}")]
    Linearization(#[from] LinearizationError),
}

/// Fatal internal-consistency failures of a linearization run.
///
/// These indicate a classifier or partitioner bug (or an input the engine
/// cannot represent), never a condition worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinearizationError {
    /// The user-object map did not contain exactly one root object
    #[error("expected exactly one root object, found {0}")]
    RootCount(usize),

    /// The trailer has no /Root reference
    #[error("trailer has no /Root reference")]
    MissingRoot,

    /// The page tree contains no leaf pages
    #[error("page tree contains no pages")]
    EmptyPageTree,

    /// No object was tagged with the /Pages root key
    #[error("no objects are reachable from the /Pages root key")]
    EmptyPageTreeObjects,

    /// Partitioning placed a different number of objects than were tagged
    #[error("wrong number of objects placed: placed {placed}, tagged {tagged}")]
    ObjectCountMismatch {
        /// Objects placed into parts 4, 6, 7, 8 and 9
        placed: usize,
        /// Objects present in the user-object map
        tagged: usize,
    },

    /// A page object was not classified as private to its own page
    #[error("page object of page {page} is not private to that page")]
    PageObjectNotPrivate {
        /// Zero-based page index
        page: usize,
    },

    /// A category still held objects after its part was generated
    #[error("{remaining} {category} objects left unplaced")]
    UnplacedObjects {
        /// Name of the object category
        category: &'static str,
        /// Number of objects left over
        remaining: usize,
    },

    /// The shared object table does not have the expected number of entries
    #[error("shared object table has {actual} entries, expected {expected}")]
    SharedTableMismatch {
        /// Expected entry count
        expected: usize,
        /// Actual entry count
        actual: usize,
    },

    /// An object number has no cross-reference entry
    #[error("no cross-reference entry for object number {0}")]
    MissingXrefEntry(u32),

    /// A bit field wider than 32 bits was requested
    #[error("bit field width {0} exceeds 32 bits")]
    BitWidthOverflow(u32),

    /// A value does not fit its fixed-width hint table or xref field
    #[error("value {value} does not fit field {field}")]
    ValueOutOfRange {
        /// Field name
        field: &'static str,
        /// Offending value
        value: u64,
    },

    /// An object was referenced by number lookup but never enqueued
    #[error("object {0} was never enqueued")]
    UnqueuedObject(ObjectRef),

    /// A placeholder object was still pending when its content was needed
    #[error("placeholder {0} was never resolved")]
    UnresolvedPlaceholder(&'static str),

    /// A rewritten region grew beyond the space reserved for it in pass one
    #[error("{segment} needs {actual} bytes but only {reserved} were reserved")]
    SegmentOverflow {
        /// Name of the rewritten region
        segment: &'static str,
        /// Bytes reserved during pass one
        reserved: u64,
        /// Bytes required by the final content
        actual: u64,
    },

    /// The assembler was asked for a segment that was never recorded
    #[error("output segment {0} was never recorded")]
    MissingSegment(&'static str),

    /// The assembled stream length disagrees with the declared /L value
    #[error("assembled length {actual} differs from declared file length {declared}")]
    LengthMismatch {
        /// Length declared in the linearization dictionary
        declared: u64,
        /// Length actually assembled
        actual: u64,
    },
}
