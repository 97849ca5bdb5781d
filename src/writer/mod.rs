//! PDF writing module.
//!
//! ## Architecture
//!
//! ```text
//! Document
//!     ↓
//! [Linearizer] (orders, numbers and hints objects)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! PDF bytes
//! ```

pub mod linearization;
mod object_serializer;

pub use linearization::{linearize, linearize_with_config, Linearizer};
pub use object_serializer::ObjectSerializer;
