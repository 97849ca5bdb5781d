//! In-memory PDF document model.
//!
//! A [`Document`] is an arena of indirect objects keyed by their
//! [`ObjectRef`], plus the trailer dictionary. This is the graph the
//! linearizer consumes; how it was produced (parsed, generated, merged) does
//! not matter.

use crate::error::{Error, LinearizationError, Result};
use crate::object::{Dict, Object, ObjectRef};
use std::collections::BTreeMap;

/// Upper bound on reference-to-reference hops when resolving a value.
const MAX_RESOLVE_HOPS: usize = 32;

static NULL: Object = Object::Null;

/// PDF document: indirect objects plus trailer.
#[derive(Debug, Clone)]
pub struct Document {
    version: (u8, u8),
    objects: BTreeMap<ObjectRef, Object>,
    trailer: Dict,
    max_id: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty PDF 1.4 document with an empty trailer.
    pub fn new() -> Self {
        Self::with_version(1, 4)
    }

    /// Create an empty document declaring the given header version.
    pub fn with_version(major: u8, minor: u8) -> Self {
        Self {
            version: (major, minor),
            objects: BTreeMap::new(),
            trailer: Dict::new(),
            max_id: 0,
        }
    }

    /// Header version as `(major, minor)`.
    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Change the header version.
    pub fn set_version(&mut self, major: u8, minor: u8) {
        self.version = (major, minor);
    }

    /// Reserve a fresh object reference without storing anything under it.
    ///
    /// Useful for building cyclic structures (a page pointing at its parent).
    pub fn new_object_ref(&mut self) -> ObjectRef {
        self.max_id += 1;
        ObjectRef::new(self.max_id, 0)
    }

    /// Store `obj` under a fresh object number and return its reference.
    pub fn add_object(&mut self, obj: Object) -> ObjectRef {
        let r = self.new_object_ref();
        self.objects.insert(r, obj);
        r
    }

    /// Store (or replace) the object under `r`.
    pub fn set_object(&mut self, r: ObjectRef, obj: Object) {
        self.max_id = self.max_id.max(r.id);
        self.objects.insert(r, obj);
    }

    /// Look up an indirect object.
    pub fn get(&self, r: ObjectRef) -> Option<&Object> {
        self.objects.get(&r)
    }

    /// Mutable lookup of an indirect object.
    pub fn get_mut(&mut self, r: ObjectRef) -> Option<&mut Object> {
        self.objects.get_mut(&r)
    }

    /// Look up an indirect object, failing with [`Error::ObjectNotFound`].
    pub fn load_object(&self, r: ObjectRef) -> Result<&Object> {
        self.get(r).ok_or(Error::ObjectNotFound(r.id, r.gen))
    }

    /// Follow indirect references until a direct value is reached.
    ///
    /// Dangling references resolve to `null`, as PDF readers treat them.
    pub fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        let mut current = obj;
        for _ in 0..MAX_RESOLVE_HOPS {
            match current {
                Object::Reference(r) => match self.objects.get(r) {
                    Some(target) => current = target,
                    None => return &NULL,
                },
                direct => return direct,
            }
        }
        log::warn!("Reference chain longer than {} hops, treating as null", MAX_RESOLVE_HOPS);
        &NULL
    }

    /// Trailer dictionary.
    pub fn trailer(&self) -> &Dict {
        &self.trailer
    }

    /// Mutable trailer dictionary.
    pub fn trailer_mut(&mut self) -> &mut Dict {
        &mut self.trailer
    }

    /// Point the trailer's `/Root` at `catalog`.
    pub fn set_root(&mut self, catalog: ObjectRef) {
        self.trailer
            .insert("Root".to_string(), Object::Reference(catalog));
    }

    /// Reference of the document catalog.
    pub fn catalog_ref(&self) -> Result<ObjectRef> {
        self.trailer
            .get("Root")
            .and_then(Object::as_reference)
            .ok_or_else(|| LinearizationError::MissingRoot.into())
    }

    /// Document catalog dictionary.
    pub fn catalog(&self) -> Result<&Dict> {
        self.load_object(self.catalog_ref()?)?.expect_dict()
    }

    /// Iterate over all indirect objects in object-number order.
    pub fn objects(&self) -> impl Iterator<Item = (&ObjectRef, &Object)> {
        self.objects.iter()
    }

    /// Number of indirect objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the document holds no indirect objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_page_document() -> Document {
        let mut doc = Document::new();
        let pages_ref = doc.new_object_ref();
        let p1 = doc.add_object(Object::dict([
            ("Type", Object::name("Page")),
            ("Parent", Object::Reference(pages_ref)),
        ]));
        let p2 = doc.add_object(Object::dict([
            ("Type", Object::name("Page")),
            ("Parent", Object::Reference(pages_ref)),
        ]));
        doc.set_object(
            pages_ref,
            Object::dict([
                ("Type", Object::name("Pages")),
                ("Kids", Object::Array(vec![Object::Reference(p1), Object::Reference(p2)])),
                ("Count", Object::Integer(2)),
            ]),
        );
        let catalog = doc.add_object(Object::dict([
            ("Type", Object::name("Catalog")),
            ("Pages", Object::Reference(pages_ref)),
        ]));
        doc.set_root(catalog);
        doc
    }

    #[test]
    fn test_add_object_assigns_sequential_numbers() {
        let mut doc = Document::new();
        let a = doc.add_object(Object::Integer(1));
        let b = doc.add_object(Object::Integer(2));
        assert_eq!(a, ObjectRef::new(1, 0));
        assert_eq!(b, ObjectRef::new(2, 0));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_set_object_advances_counter() {
        let mut doc = Document::new();
        doc.set_object(ObjectRef::new(10, 0), Object::Null);
        assert_eq!(doc.add_object(Object::Null), ObjectRef::new(11, 0));
    }

    #[test]
    fn test_resolve_follows_chain_and_dangling() {
        let mut doc = Document::new();
        let inner = doc.add_object(Object::Integer(5));
        let outer = doc.add_object(Object::Reference(inner));
        let value = Object::Reference(outer);
        assert_eq!(doc.resolve(&value).as_integer(), Some(5));

        let dangling = Object::Reference(ObjectRef::new(99, 0));
        assert!(doc.resolve(&dangling).is_null());
    }

    #[test]
    fn test_catalog_and_pages() {
        let doc = two_page_document();
        let pages = doc.catalog().unwrap()["Pages"].as_reference().unwrap();
        let kids = doc.get(pages).unwrap().as_dict().unwrap()["Kids"].as_array().unwrap();
        assert_eq!(kids.len(), 2);
        assert!(kids.iter().all(|k| doc.resolve(k).has_type("Page")));
    }

    #[test]
    fn test_missing_root() {
        let doc = Document::new();
        match doc.catalog_ref() {
            Err(Error::Linearization(LinearizationError::MissingRoot)) => {},
            other => panic!("Expected MissingRoot, got {:?}", other),
        }
    }

    #[test]
    fn test_load_object_not_found() {
        let doc = Document::new();
        assert!(matches!(
            doc.load_object(ObjectRef::new(3, 0)),
            Err(Error::ObjectNotFound(3, 0))
        ));
    }
}
