//! # PDF Linearizer
//!
//! Rewrites PDF documents into linearized ("Fast Web View") form: the first
//! page and everything needed to display it come first in the file, followed
//! by a hint stream that lets a viewer fetch any other page with byte-range
//! requests.
//!
//! ## Pipeline
//!
//! ```text
//! Document
//!     ↓
//! [classifier] (who uses each object: pages, catalog keys, thumbnails)
//!     ↓
//! [partition] (parts 4, 6, 7, 8, 9 of Annex F)
//!     ↓
//! [queue] (final object numbers)
//!     ↓
//! pass one (object lengths and offsets) → [hints] (bit-packed hint tables)
//!     ↓
//! pass two (cross-reference streams, linearization dictionary)
//!     ↓
//! [assembler] → PDF bytes
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdf_linearizer::{linearize, Document, Object};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut doc = Document::new();
//! let pages = doc.new_object_ref();
//! let page = doc.add_object(Object::dict([
//!     ("Type", Object::name("Page")),
//!     ("Parent", Object::Reference(pages)),
//! ]));
//! doc.set_object(pages, Object::dict([
//!     ("Type", Object::name("Pages")),
//!     ("Kids", Object::Array(vec![Object::Reference(page)])),
//!     ("Count", Object::Integer(1)),
//! ]));
//! let catalog = doc.add_object(Object::dict([
//!     ("Type", Object::name("Catalog")),
//!     ("Pages", Object::Reference(pages)),
//! ]));
//! doc.set_root(catalog);
//!
//! let bytes = linearize(&doc)?;
//! std::fs::write("out.pdf", bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Standards Reference
//!
//! - ISO 32000-1:2008, Annex F "Linearized PDF"

#![warn(missing_docs)]

// Error handling
pub mod error;

// Object model
pub mod document;
pub mod object;

// Configuration
pub mod config;

// PDF writing
pub mod writer;

// Re-exports
pub use config::LinearizationConfig;
pub use document::Document;
pub use error::{Error, LinearizationError, Result};
pub use object::{Dict, Object, ObjectRef};
pub use writer::linearization::{
    linearize, linearize_with_config, LinearizationParams, LinearizationStats, LinearizedPdf,
    Linearizer, Stage,
};
