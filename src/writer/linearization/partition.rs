//! Partitioning of tagged objects into the parts of a linearized file.
//!
//! Part numbers follow the linearized file layout: part 4 holds the catalog
//! and document-level objects, part 6 the first page, part 7 the private
//! objects of the remaining pages, part 8 objects shared between those pages,
//! and part 9 everything else.

use super::classifier::{Classification, ObjUser, UserObjectMap};
use crate::document::Document;
use crate::error::{LinearizationError, Result};
use crate::object::{Object, ObjectRef};
use indexmap::IndexSet;
use std::collections::HashMap;

/// Catalog keys whose objects are needed to open the document.
pub const OPEN_DOCUMENT_KEYS: [&str; 5] =
    ["ViewerPreferences", "PageMode", "Threads", "OpenAction", "AcroForm"];

/// Where an object belongs, decided from its users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    /// The document catalog.
    Root,
    /// Reachable from `/Outlines`.
    Outlines,
    /// Reachable from a key in [`OPEN_DOCUMENT_KEYS`].
    OpenDocument,
    /// Used by the first page only.
    FirstPagePrivate,
    /// Used by the first page and something else.
    FirstPageShared,
    /// Used by exactly one page other than the first.
    OtherPagePrivate,
    /// Used by several pages other than the first.
    OtherPageShared,
    /// Used by exactly one thumbnail.
    ThumbnailPrivate,
    /// Used by several thumbnails.
    ThumbnailShared,
    /// Anything else.
    Other,
}

/// Categorize an object from its users. The first matching rule wins;
/// trailer keys do not count.
pub fn categorize<'a>(users: impl IntoIterator<Item = &'a ObjUser>) -> ObjectCategory {
    let mut is_root = false;
    let mut in_outlines = false;
    let mut in_open_document = false;
    let mut in_first_page = false;
    let mut other_pages = 0usize;
    let mut thumbs = 0usize;
    let mut others = 0usize;

    for user in users {
        match user {
            ObjUser::Root => is_root = true,
            ObjUser::RootKey(key) if OPEN_DOCUMENT_KEYS.contains(&key.as_str()) => {
                in_open_document = true
            },
            ObjUser::RootKey(key) if key == "Outlines" => in_outlines = true,
            ObjUser::RootKey(_) => others += 1,
            ObjUser::TrailerKey(_) => {},
            ObjUser::Page(0) => in_first_page = true,
            ObjUser::Page(_) => other_pages += 1,
            ObjUser::Thumbnail(_) => thumbs += 1,
        }
    }

    if is_root {
        ObjectCategory::Root
    } else if in_outlines {
        ObjectCategory::Outlines
    } else if in_open_document {
        ObjectCategory::OpenDocument
    } else if in_first_page && others == 0 && other_pages == 0 && thumbs == 0 {
        ObjectCategory::FirstPagePrivate
    } else if in_first_page {
        ObjectCategory::FirstPageShared
    } else if other_pages == 1 && others == 0 && thumbs == 0 {
        ObjectCategory::OtherPagePrivate
    } else if other_pages > 1 {
        ObjectCategory::OtherPageShared
    } else if thumbs == 1 && others == 0 {
        ObjectCategory::ThumbnailPrivate
    } else if thumbs > 1 {
        ObjectCategory::ThumbnailShared
    } else {
        ObjectCategory::Other
    }
}

/// Placement of the outline objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineGroup {
    /// First object of the group (the outlines dictionary when indirect).
    pub first_object: Option<ObjectRef>,
    /// Number of objects in the group.
    pub nobjects: usize,
    /// Whether the group was placed in part 6.
    pub in_first_page: bool,
}

/// Object-level facts about one page, for the page offset hint table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageObjectInfo {
    /// Objects in the page's section (page object included).
    pub nobjects: usize,
    /// Indices into the shared object table referenced by the page.
    pub shared_identifiers: Vec<usize>,
}

/// Objects listed in the shared object hint table: part 6, then part 8.
#[derive(Debug, Clone, Default)]
pub struct SharedObjectTable {
    /// Table entries in index order.
    pub entries: Vec<ObjectRef>,
    /// Entries that belong to the first page (all of part 6).
    pub nshared_first_page: usize,
    /// First part 8 object, if any.
    pub first_shared_obj: Option<ObjectRef>,
    index: HashMap<ObjectRef, usize>,
}

impl SharedObjectTable {
    fn build(part6: &[ObjectRef], part8: &[ObjectRef]) -> Result<Self> {
        let mut table = Self {
            nshared_first_page: part6.len(),
            first_shared_obj: part8.first().copied(),
            ..Self::default()
        };
        for &obj in part6.iter().chain(part8) {
            table.index.insert(obj, table.entries.len());
            table.entries.push(obj);
        }

        let expected = part6.len() + part8.len();
        if table.entries.len() != expected {
            return Err(LinearizationError::SharedTableMismatch {
                expected,
                actual: table.entries.len(),
            }
            .into());
        }
        Ok(table)
    }

    /// Total number of entries.
    pub fn nshared_total(&self) -> usize {
        self.entries.len()
    }

    /// Index of `obj` in the table.
    pub fn index_of(&self, obj: &ObjectRef) -> Option<usize> {
        self.index.get(obj).copied()
    }
}

/// Objects of one document sorted into the parts of a linearized file.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Catalog and open-document objects.
    pub part4: Vec<ObjectRef>,
    /// First page objects, then outlines when shown at open.
    pub part6: Vec<ObjectRef>,
    /// Private objects of pages after the first, page by page.
    pub part7: Vec<ObjectRef>,
    /// Objects shared among pages after the first.
    pub part8: Vec<ObjectRef>,
    /// Page tree, thumbnails, outlines (unless in part 6), the rest.
    pub part9: Vec<ObjectRef>,
    /// Leaf page objects in order.
    pub pages: Vec<ObjectRef>,
    /// Per-page object counts and shared references.
    pub page_info: Vec<PageObjectInfo>,
    /// Shared object hint table contents.
    pub shared: SharedObjectTable,
    /// Outline group placement.
    pub outlines: OutlineGroup,
    /// Users of every placed object.
    pub user_map: UserObjectMap,
}

/// Category buckets, in user-map order.
#[derive(Default)]
struct Buckets {
    root: Vec<ObjectRef>,
    outlines: IndexSet<ObjectRef>,
    open_document: Vec<ObjectRef>,
    first_page_private: IndexSet<ObjectRef>,
    first_page_shared: Vec<ObjectRef>,
    other_page_private: IndexSet<ObjectRef>,
    other_page_shared: Vec<ObjectRef>,
    thumbnail_private: IndexSet<ObjectRef>,
    thumbnail_shared: Vec<ObjectRef>,
    other: IndexSet<ObjectRef>,
}

impl Partition {
    /// Sort the classified objects of `doc` into parts.
    pub fn build(doc: &Document, classification: Classification) -> Result<Self> {
        let Classification { pages, user_map } = classification;

        let mut buckets = Buckets::default();
        for (&obj, users) in user_map.iter_values() {
            match categorize(users) {
                ObjectCategory::Root => buckets.root.push(obj),
                ObjectCategory::Outlines => {
                    buckets.outlines.insert(obj);
                },
                ObjectCategory::OpenDocument => buckets.open_document.push(obj),
                ObjectCategory::FirstPagePrivate => {
                    buckets.first_page_private.insert(obj);
                },
                ObjectCategory::FirstPageShared => buckets.first_page_shared.push(obj),
                ObjectCategory::OtherPagePrivate => {
                    buckets.other_page_private.insert(obj);
                },
                ObjectCategory::OtherPageShared => buckets.other_page_shared.push(obj),
                ObjectCategory::ThumbnailPrivate => {
                    buckets.thumbnail_private.insert(obj);
                },
                ObjectCategory::ThumbnailShared => buckets.thumbnail_shared.push(obj),
                ObjectCategory::Other => {
                    buckets.other.insert(obj);
                },
            }
        }

        if buckets.root.len() != 1 {
            return Err(LinearizationError::RootCount(buckets.root.len()).into());
        }

        let catalog = doc.catalog()?;
        let outlines_root = catalog.get("Outlines").and_then(Object::as_reference);
        let outlines_in_first_page = catalog
            .get("PageMode")
            .map(|m| doc.resolve(m))
            .and_then(Object::as_name)
            == Some("UseOutlines")
            && catalog.get("Outlines").is_some_and(|o| !doc.resolve(o).is_null());

        let mut partition = Partition {
            part4: Vec::new(),
            part6: Vec::new(),
            part7: Vec::new(),
            part8: Vec::new(),
            part9: Vec::new(),
            page_info: vec![PageObjectInfo::default(); pages.len()],
            pages,
            shared: SharedObjectTable::default(),
            outlines: OutlineGroup {
                in_first_page: outlines_in_first_page,
                ..OutlineGroup::default()
            },
            user_map,
        };

        partition.part4.extend(buckets.root.drain(..));
        partition.part4.append(&mut buckets.open_document);

        partition.place_first_page(&mut buckets, outlines_root)?;
        partition.place_other_pages(&mut buckets)?;
        partition.part8.append(&mut buckets.other_page_shared);
        partition.place_remaining(doc, &mut buckets, outlines_root)?;

        let placed = partition.placed_count();
        let tagged = partition.user_map.len_values();
        if placed != tagged {
            return Err(LinearizationError::ObjectCountMismatch { placed, tagged }.into());
        }

        partition.shared = SharedObjectTable::build(&partition.part6, &partition.part8)?;
        partition.collect_page_shared_references();

        log::debug!(
            "Partitioned {} objects: part4={} part6={} part7={} part8={} part9={}",
            placed,
            partition.part4.len(),
            partition.part6.len(),
            partition.part7.len(),
            partition.part8.len(),
            partition.part9.len()
        );

        Ok(partition)
    }

    /// Part 6: first page object, its private then shared objects, outlines.
    fn place_first_page(
        &mut self,
        buckets: &mut Buckets,
        outlines_root: Option<ObjectRef>,
    ) -> Result<()> {
        let first_page = self.pages[0];
        if !buckets.first_page_private.shift_remove(&first_page) {
            return Err(LinearizationError::PageObjectNotPrivate { page: 0 }.into());
        }
        self.part6.push(first_page);
        self.part6.extend(buckets.first_page_private.drain(..));
        self.part6.append(&mut buckets.first_page_shared);

        if self.outlines.in_first_page {
            self.outlines = place_outlines(&mut self.part6, &mut buckets.outlines, outlines_root, true);
        }

        self.page_info[0].nobjects = self.part6.len();
        Ok(())
    }

    /// Part 7: for each later page, its page object then its private objects.
    fn place_other_pages(&mut self, buckets: &mut Buckets) -> Result<()> {
        for (index, &page) in self.pages.iter().enumerate().skip(1) {
            if !buckets.other_page_private.shift_remove(&page) {
                return Err(LinearizationError::PageObjectNotPrivate { page: index }.into());
            }
            self.part7.push(page);

            let mut nobjects = 1;
            for obj in self.user_map.values_of(&ObjUser::Page(index)) {
                if buckets.other_page_private.shift_remove(obj) {
                    self.part7.push(*obj);
                    nobjects += 1;
                }
            }
            self.page_info[index].nobjects = nobjects;
        }

        if !buckets.other_page_private.is_empty() {
            return Err(LinearizationError::UnplacedObjects {
                category: "other-page private",
                remaining: buckets.other_page_private.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Part 9: page tree, private thumbnails by page, shared thumbnails,
    /// outlines unless already placed, then everything else.
    fn place_remaining(
        &mut self,
        doc: &Document,
        buckets: &mut Buckets,
        outlines_root: Option<ObjectRef>,
    ) -> Result<()> {
        let pages_key = ObjUser::RootKey("Pages".to_string());
        if !self.user_map.contains_key(&pages_key) {
            return Err(LinearizationError::EmptyPageTreeObjects.into());
        }
        for obj in self.user_map.values_of(&pages_key) {
            if buckets.other.shift_remove(obj) {
                self.part9.push(*obj);
            }
        }

        for (index, &page) in self.pages.iter().enumerate() {
            let thumb = doc
                .get(page)
                .and_then(Object::as_dict)
                .and_then(|d| d.get("Thumb"))
                .and_then(Object::as_reference);
            if let Some(thumb) = thumb {
                if buckets.thumbnail_private.shift_remove(&thumb) {
                    self.part9.push(thumb);
                }
            }
            for obj in self.user_map.values_of(&ObjUser::Thumbnail(index)) {
                if buckets.thumbnail_private.shift_remove(obj) {
                    self.part9.push(*obj);
                }
            }
        }
        if !buckets.thumbnail_private.is_empty() {
            return Err(LinearizationError::UnplacedObjects {
                category: "thumbnail private",
                remaining: buckets.thumbnail_private.len(),
            }
            .into());
        }

        self.part9.append(&mut buckets.thumbnail_shared);

        if !self.outlines.in_first_page {
            self.outlines = place_outlines(&mut self.part9, &mut buckets.outlines, outlines_root, false);
        }

        self.part9.extend(buckets.other.drain(..));
        Ok(())
    }

    /// Shared-table indices of objects each later page shares with others.
    fn collect_page_shared_references(&mut self) {
        for index in 1..self.pages.len() {
            let identifiers: Vec<usize> = self
                .user_map
                .values_of(&ObjUser::Page(index))
                .filter(|obj| self.user_map.key_count(obj) > 1)
                .filter_map(|obj| self.shared.index_of(obj))
                .collect();
            self.page_info[index].shared_identifiers = identifiers;
        }
    }

    /// Objects placed in parts 4 through 9.
    pub fn placed_count(&self) -> usize {
        self.part4.len() + self.part6.len() + self.part7.len() + self.part8.len() + self.part9.len()
    }

    /// Objects numbered in the second half: parts 7, 8 and 9.
    pub fn second_half_len(&self) -> usize {
        self.part7.len() + self.part8.len() + self.part9.len()
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Append the outline group to `part`, outlines dictionary first.
fn place_outlines(
    part: &mut Vec<ObjectRef>,
    outlines: &mut IndexSet<ObjectRef>,
    outlines_root: Option<ObjectRef>,
    in_first_page: bool,
) -> OutlineGroup {
    let mut group = OutlineGroup {
        in_first_page,
        ..OutlineGroup::default()
    };

    if let Some(root) = outlines_root {
        if outlines.shift_remove(&root) {
            part.push(root);
            group.first_object = Some(root);
            group.nobjects = 1;
        }
    }
    if group.first_object.is_none() {
        group.first_object = outlines.first().copied();
    }

    group.nobjects += outlines.len();
    part.extend(outlines.drain(..));
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::linearization::classifier::classify;

    fn key(name: &str) -> ObjUser {
        ObjUser::RootKey(name.to_string())
    }

    #[test]
    fn test_categorize_first_match_wins() {
        use ObjectCategory::*;
        assert_eq!(categorize(&[ObjUser::Root, key("Outlines")]), Root);
        assert_eq!(categorize(&[key("Outlines"), key("OpenAction")]), Outlines);
        assert_eq!(categorize(&[key("AcroForm"), ObjUser::Page(0)]), OpenDocument);
        assert_eq!(categorize(&[ObjUser::Page(0)]), FirstPagePrivate);
        assert_eq!(
            categorize(&[ObjUser::Page(0), ObjUser::TrailerKey("Info".into())]),
            FirstPagePrivate
        );
        assert_eq!(categorize(&[ObjUser::Page(0), ObjUser::Page(3)]), FirstPageShared);
        assert_eq!(categorize(&[ObjUser::Page(0), ObjUser::Thumbnail(0)]), FirstPageShared);
        assert_eq!(categorize(&[ObjUser::Page(2)]), OtherPagePrivate);
        assert_eq!(categorize(&[ObjUser::Page(1), ObjUser::Page(2)]), OtherPageShared);
        assert_eq!(categorize(&[ObjUser::Thumbnail(1)]), ThumbnailPrivate);
        assert_eq!(
            categorize(&[ObjUser::Thumbnail(1), ObjUser::Thumbnail(2)]),
            ThumbnailShared
        );
        assert_eq!(categorize(&[ObjUser::Page(1), key("Names")]), Other);
        assert_eq!(categorize(&[key("Pages")]), Other);
        assert_eq!(categorize(&[ObjUser::TrailerKey("Info".into())]), Other);
    }

    struct Fixture {
        doc: Document,
        pages: Vec<ObjectRef>,
        image: ObjectRef,
        font: ObjectRef,
        contents: Vec<ObjectRef>,
    }

    /// Three pages; `font` on every page, `image` on pages 2 and 3 only.
    fn three_pages() -> Fixture {
        let mut doc = Document::new();
        let pages_ref = doc.new_object_ref();
        let font = doc.add_object(Object::dict([("Type", Object::name("Font"))]));
        let image = doc.add_object(Object::Stream {
            dict: Default::default(),
            data: bytes::Bytes::from_static(b"img"),
        });

        let mut pages = Vec::new();
        let mut contents = Vec::new();
        for i in 0..3 {
            let content = doc.add_object(Object::Stream {
                dict: Default::default(),
                data: bytes::Bytes::from(format!("BT (page {}) Tj ET", i)),
            });
            let mut xobjects = crate::object::Dict::new();
            if i > 0 {
                xobjects.insert("Im0".to_string(), Object::Reference(image));
            }
            let page = doc.add_object(Object::dict([
                ("Type", Object::name("Page")),
                ("Parent", Object::Reference(pages_ref)),
                ("Contents", Object::Reference(content)),
                (
                    "Resources",
                    Object::dict([
                        ("Font", Object::dict([("F1", Object::Reference(font))])),
                        ("XObject", Object::Dictionary(xobjects)),
                    ]),
                ),
            ]));
            pages.push(page);
            contents.push(content);
        }
        doc.set_object(
            pages_ref,
            Object::dict([
                ("Type", Object::name("Pages")),
                ("Kids", Object::Array(pages.iter().map(|&p| Object::Reference(p)).collect())),
                ("Count", Object::Integer(3)),
            ]),
        );
        let catalog = doc.add_object(Object::dict([
            ("Type", Object::name("Catalog")),
            ("Pages", Object::Reference(pages_ref)),
        ]));
        doc.set_root(catalog);

        Fixture {
            doc,
            pages,
            image,
            font,
            contents,
        }
    }

    fn partition(doc: &mut Document) -> Partition {
        let classification = classify(doc, false).unwrap();
        Partition::build(doc, classification).unwrap()
    }

    #[test]
    fn test_three_page_layout() {
        let mut fx = three_pages();
        let p = partition(&mut fx.doc);

        assert_eq!(p.part4, vec![fx.doc.catalog_ref().unwrap()]);
        assert_eq!(p.part6, vec![fx.pages[0], fx.contents[0], fx.font]);
        assert_eq!(
            p.part7,
            vec![fx.pages[1], fx.contents[1], fx.pages[2], fx.contents[2]]
        );
        assert_eq!(p.part8, vec![fx.image]);
        assert_eq!(p.part9.len(), 1);
        assert_eq!(p.placed_count(), p.user_map.len_values());

        assert_eq!(p.page_info[0].nobjects, 3);
        assert_eq!(p.page_info[1].nobjects, 2);
        assert_eq!(p.page_info[2].nobjects, 2);
    }

    #[test]
    fn test_shared_table_and_page_references() {
        let mut fx = three_pages();
        let p = partition(&mut fx.doc);

        assert_eq!(p.shared.nshared_first_page, 3);
        assert_eq!(p.shared.nshared_total(), 4);
        assert_eq!(p.shared.first_shared_obj, Some(fx.image));
        let image_index = p.shared.index_of(&fx.image).unwrap();
        let font_index = p.shared.index_of(&fx.font).unwrap();
        assert_eq!(image_index, 3);

        assert!(p.page_info[0].shared_identifiers.is_empty());
        for page in 1..3 {
            let ids = &p.page_info[page].shared_identifiers;
            assert!(ids.contains(&image_index));
            assert!(ids.contains(&font_index));
            assert_eq!(ids.len(), 2);
        }
    }

    #[test]
    fn test_single_page_goes_to_part6() {
        let mut doc = Document::new();
        let pages_ref = doc.new_object_ref();
        let content = doc.add_object(Object::Stream {
            dict: Default::default(),
            data: bytes::Bytes::from_static(b"q Q"),
        });
        let page = doc.add_object(Object::dict([
            ("Type", Object::name("Page")),
            ("Parent", Object::Reference(pages_ref)),
            ("Contents", Object::Reference(content)),
        ]));
        doc.set_object(
            pages_ref,
            Object::dict([
                ("Type", Object::name("Pages")),
                ("Kids", Object::Array(vec![Object::Reference(page)])),
                ("Count", Object::Integer(1)),
            ]),
        );
        let catalog = doc.add_object(Object::dict([("Pages", Object::Reference(pages_ref))]));
        doc.set_root(catalog);

        let p = partition(&mut doc);
        assert_eq!(p.part6, vec![page, content]);
        assert!(p.part7.is_empty());
        assert!(p.part8.is_empty());
        assert_eq!(p.part9, vec![pages_ref]);
        assert_eq!(p.shared.nshared_total(), p.shared.nshared_first_page);
        assert_eq!(p.shared.first_shared_obj, None);
    }

    fn add_outlines(doc: &mut Document, page_mode: Option<&str>) -> (ObjectRef, ObjectRef) {
        let outlines = doc.new_object_ref();
        let item = doc.add_object(Object::dict([
            ("Title", Object::String(b"Chapter".to_vec())),
            ("Parent", Object::Reference(outlines)),
        ]));
        doc.set_object(
            outlines,
            Object::dict([
                ("Type", Object::name("Outlines")),
                ("First", Object::Reference(item)),
                ("Last", Object::Reference(item)),
                ("Count", Object::Integer(1)),
            ]),
        );
        let catalog_ref = doc.catalog_ref().unwrap();
        let catalog = doc.get_mut(catalog_ref).unwrap().as_dict_mut().unwrap();
        catalog.insert("Outlines".to_string(), Object::Reference(outlines));
        if let Some(mode) = page_mode {
            catalog.insert("PageMode".to_string(), Object::name(mode));
        }
        (outlines, item)
    }

    #[test]
    fn test_outlines_in_first_page_with_use_outlines() {
        let mut fx = three_pages();
        let (outlines, item) = add_outlines(&mut fx.doc, Some("UseOutlines"));
        let p = partition(&mut fx.doc);

        assert!(p.outlines.in_first_page);
        assert_eq!(p.outlines.first_object, Some(outlines));
        assert_eq!(p.outlines.nobjects, 2);
        assert_eq!(&p.part6[p.part6.len() - 2..], &[outlines, item]);
        assert_eq!(p.page_info[0].nobjects, p.part6.len());
        assert_eq!(p.shared.nshared_first_page, p.part6.len());
    }

    #[test]
    fn test_outlines_in_part9_otherwise() {
        let mut fx = three_pages();
        let (outlines, item) = add_outlines(&mut fx.doc, None);
        let p = partition(&mut fx.doc);

        assert!(!p.outlines.in_first_page);
        assert_eq!(p.outlines.nobjects, 2);
        let pos = p.part9.iter().position(|&o| o == outlines).unwrap();
        assert_eq!(p.part9[pos + 1], item);
        assert!(!p.part6.contains(&outlines));
    }

    #[test]
    fn test_thumbnails_follow_page_tree_in_part9() {
        let mut fx = three_pages();
        let thumb = fx.doc.add_object(Object::Stream {
            dict: Default::default(),
            data: bytes::Bytes::from_static(b"t"),
        });
        fx.doc
            .get_mut(fx.pages[1])
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .insert("Thumb".to_string(), Object::Reference(thumb));
        let p = partition(&mut fx.doc);

        assert_eq!(p.part9.len(), 2);
        assert_eq!(p.part9[1], thumb);
    }

    #[test]
    fn test_direct_thumbnail_objects_are_placed() {
        let mut fx = three_pages();
        let color_space = fx.doc.add_object(Object::Array(vec![
            Object::name("Indexed"),
            Object::name("DeviceRGB"),
        ]));
        let mut thumb_dict = crate::object::Dict::new();
        thumb_dict.insert("ColorSpace".to_string(), Object::Reference(color_space));
        fx.doc
            .get_mut(fx.pages[2])
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .insert(
                "Thumb".to_string(),
                Object::Stream {
                    dict: thumb_dict,
                    data: bytes::Bytes::from_static(b"t"),
                },
            );
        let p = partition(&mut fx.doc);

        assert_eq!(p.part9.len(), 2);
        assert_eq!(p.part9[1], color_space);
        assert_eq!(p.placed_count(), fx.doc.len());
    }

    #[test]
    fn test_open_document_objects_in_part4() {
        let mut fx = three_pages();
        let action = fx.doc.add_object(Object::dict([("S", Object::name("JavaScript"))]));
        let catalog_ref = fx.doc.catalog_ref().unwrap();
        fx.doc
            .get_mut(catalog_ref)
            .unwrap()
            .as_dict_mut()
            .unwrap()
            .insert("OpenAction".to_string(), Object::Reference(action));

        let p = partition(&mut fx.doc);
        assert_eq!(p.part4, vec![catalog_ref, action]);
    }
}
