//! Object-graph classification.
//!
//! Walks the document from the trailer and records, for every reachable
//! indirect object, which "users" reach it: a page, a thumbnail of a page, a
//! catalog key, a trailer key, or the catalog itself. Before walking, the
//! inheritable page attributes are pushed down from the `/Pages` tree onto
//! the leaf pages, so that each page carries everything it needs.
//!
//! Page objects are traversal boundaries: a reference to another page is never
//! followed. This keeps the per-page object sets apart.

use super::multimap::BiMultiMap;
use crate::document::Document;
use crate::error::{Error, LinearizationError, Result};
use crate::object::{Object, ObjectRef};
use std::collections::HashSet;

/// Page attributes a `/Pages` node passes down to its descendants.
pub const INHERITABLE_KEYS: [&str; 4] = ["MediaBox", "CropBox", "Resources", "Rotate"];

/// Who reaches an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjUser {
    /// The document catalog itself.
    Root,
    /// A catalog entry, by key.
    RootKey(String),
    /// A trailer entry other than `/Root`, by key.
    TrailerKey(String),
    /// A page, by zero-based index.
    Page(usize),
    /// The `/Thumb` of a page, by zero-based page index.
    Thumbnail(usize),
}

/// Users of every reachable object, queryable both ways.
pub type UserObjectMap = BiMultiMap<ObjUser, ObjectRef>;

/// Output of [`classify`].
#[derive(Debug, Clone)]
pub struct Classification {
    /// Leaf page objects in document order.
    pub pages: Vec<ObjectRef>,
    /// Object users recorded by the traversal.
    pub user_map: UserObjectMap,
}

/// Prepare the page tree in `doc` and tag every reachable object.
///
/// `doc` is modified: inherited attributes move onto leaf pages and, with
/// `flatten_page_tree`, every page is re-parented under the root `/Pages`.
pub fn classify(doc: &mut Document, flatten_page_tree: bool) -> Result<Classification> {
    let pages = push_inherited_attributes(doc)?;
    if flatten_page_tree {
        flatten(doc, &pages)?;
    }

    let user_map = ObjectClassifier::new(doc).tag_objects(&pages)?;
    log::debug!(
        "Classified {} objects reachable from {} pages",
        user_map.len_values(),
        pages.len()
    );

    Ok(Classification { pages, user_map })
}

/// Traversal step for the page tree walk.
enum TreeStep {
    Visit(ObjectRef),
    /// Restore inherited values saved when entering a `/Pages` node.
    Restore(Vec<(String, Option<Object>)>),
}

/// Move `/MediaBox`, `/CropBox`, `/Resources` and `/Rotate` from `/Pages`
/// nodes onto the leaf pages that lack them. Returns the leaf pages in order.
///
/// Cycles, repeated pages, missing `/Kids` and unknown node types are logged
/// and the offending edge is skipped.
pub fn push_inherited_attributes(doc: &mut Document) -> Result<Vec<ObjectRef>> {
    let root_pages = pages_root(doc)?;

    let mut pages = Vec::new();
    let mut visited = HashSet::new();
    let mut inherited: Vec<(String, Object)> = Vec::new();
    let mut stack = vec![TreeStep::Visit(root_pages)];

    while let Some(step) = stack.pop() {
        let node_ref = match step {
            TreeStep::Visit(r) => r,
            TreeStep::Restore(saved) => {
                for (key, previous) in saved {
                    inherited.retain(|(k, _)| *k != key);
                    if let Some(value) = previous {
                        inherited.push((key, value));
                    }
                }
                continue;
            },
        };

        if !visited.insert(node_ref) {
            log::warn!("Page tree node {} visited twice (cycle or repeated kid), skipping", node_ref);
            continue;
        }

        let Some(node) = doc.get_mut(node_ref).and_then(Object::as_dict_mut) else {
            log::warn!("Page tree node {} is missing or not a dictionary, skipping", node_ref);
            continue;
        };

        let node_type = node.get("Type").and_then(Object::as_name).map(str::to_string);
        match node_type.as_deref() {
            Some("Pages") => {
                let mut saved = Vec::new();
                for key in INHERITABLE_KEYS {
                    if let Some(value) = node.shift_remove(key) {
                        let previous = inherited
                            .iter()
                            .position(|(k, _)| k == key)
                            .map(|i| inherited.remove(i).1);
                        saved.push((key.to_string(), previous));
                        inherited.push((key.to_string(), value));
                    }
                }

                let kids_value = node.get("Kids").cloned();
                stack.push(TreeStep::Restore(saved));

                let kids = match kids_value.as_ref().map(|k| doc.resolve(k)) {
                    Some(Object::Array(kids)) => kids,
                    _ => {
                        log::warn!("Pages node {} has no /Kids array", node_ref);
                        continue;
                    },
                };
                for kid in kids.iter().rev() {
                    match kid.as_reference() {
                        Some(kid_ref) => stack.push(TreeStep::Visit(kid_ref)),
                        None => log::warn!("Direct kid in pages node {} ignored", node_ref),
                    }
                }
            },
            Some("Page") => {
                for (key, value) in &inherited {
                    if !node.contains_key(key) {
                        node.insert(key.clone(), value.clone());
                    }
                }
                pages.push(node_ref);
            },
            other => {
                log::warn!("Invalid node type {:?} in page tree at {}, skipping", other, node_ref);
            },
        }
    }

    if pages.is_empty() {
        return Err(LinearizationError::EmptyPageTree.into());
    }
    Ok(pages)
}

/// Re-parent every leaf page directly under the root `/Pages` node.
///
/// Intermediate nodes become unreachable and are dropped from the output.
pub fn flatten(doc: &mut Document, pages: &[ObjectRef]) -> Result<()> {
    let root_pages = pages_root(doc)?;

    for &page in pages {
        if let Some(dict) = doc.get_mut(page).and_then(Object::as_dict_mut) {
            dict.insert("Parent".to_string(), Object::Reference(root_pages));
        }
    }

    let root = doc
        .get_mut(root_pages)
        .and_then(Object::as_dict_mut)
        .ok_or(Error::ObjectNotFound(root_pages.id, root_pages.gen))?;
    root.insert(
        "Kids".to_string(),
        Object::Array(pages.iter().map(|&p| Object::Reference(p)).collect()),
    );
    root.insert("Count".to_string(), Object::Integer(pages.len() as i64));

    log::debug!("Flattened page tree to {} direct kids", pages.len());
    Ok(())
}

fn pages_root(doc: &Document) -> Result<ObjectRef> {
    doc.catalog()?
        .get("Pages")
        .and_then(Object::as_reference)
        .ok_or_else(|| Error::InvalidPdf("catalog /Pages is not an indirect reference".to_string()))
}

/// Builds the user-object map for a prepared document.
pub struct ObjectClassifier<'a> {
    doc: &'a Document,
}

impl<'a> ObjectClassifier<'a> {
    /// Create a classifier over `doc`.
    pub fn new(doc: &'a Document) -> Self {
        Self { doc }
    }

    /// Tag every object reachable from the trailer.
    ///
    /// Pages are walked first, then trailer keys, then catalog keys, and the
    /// catalog itself is tagged [`ObjUser::Root`] last.
    pub fn tag_objects(&self, pages: &[ObjectRef]) -> Result<UserObjectMap> {
        let mut map = UserObjectMap::new();
        let root_ref = self.doc.catalog_ref()?;

        for (index, &page) in pages.iter().enumerate() {
            self.tag_reachable(ObjUser::Page(index), &Object::Reference(page), root_ref, &mut map);
        }

        for (key, value) in self.doc.trailer() {
            if key != "Root" {
                self.tag_reachable(ObjUser::TrailerKey(key.clone()), value, root_ref, &mut map);
            }
        }

        for (key, value) in self.doc.catalog()? {
            self.tag_reachable(ObjUser::RootKey(key.clone()), value, root_ref, &mut map);
        }

        map.insert(ObjUser::Root, root_ref);
        Ok(map)
    }

    /// Depth-first walk from `start`, tagging indirect objects with `user`.
    ///
    /// Only `start` itself may be a page; nested pages and the catalog end the
    /// walk. A page's `/Parent` is not followed, and its `/Thumb` is walked
    /// separately under [`ObjUser::Thumbnail`].
    fn tag_reachable(&self, user: ObjUser, start: &Object, root: ObjectRef, map: &mut UserObjectMap) {
        let mut visited = HashSet::new();
        let mut thumbs = Vec::new();
        let mut stack = vec![(start, true)];

        while let Some((value, top)) = stack.pop() {
            let (target, obj_ref) = match value {
                Object::Reference(r) => {
                    if visited.contains(r) || *r == root {
                        continue;
                    }
                    match self.doc.get(*r) {
                        Some(target) => (target, Some(*r)),
                        None => {
                            log::warn!("Dangling reference {} reached from {:?}", r, user);
                            continue;
                        },
                    }
                },
                direct => (direct, None),
            };

            let is_page = target.has_type("Page");
            if is_page && !top {
                continue;
            }

            if let Some(r) = obj_ref {
                visited.insert(r);
                map.insert(user.clone(), r);
            }

            match target {
                Object::Array(items) => {
                    stack.extend(items.iter().rev().map(|item| (item, false)));
                },
                Object::Dictionary(dict) | Object::Stream { dict, .. } => {
                    for (key, child) in dict.iter().rev() {
                        if is_page && key == "Thumb" {
                            thumbs.push(child);
                        } else if !(is_page && key == "Parent") {
                            stack.push((child, false));
                        }
                    }
                },
                _ => {},
            }
        }

        if let ObjUser::Page(index) = user {
            for thumb in thumbs {
                self.tag_reachable(ObjUser::Thumbnail(index), thumb, root, map);
            }
        }
    }
}
