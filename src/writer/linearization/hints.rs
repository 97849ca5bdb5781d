//! Hint table construction.
//!
//! Three tables make up the primary hint stream: the page offset table, the
//! shared object table and, when the document has outlines, a generic hint
//! table for the outline group. Every numeric column is stored relative to
//! its minimum, in a width derived once from the column's range.
//!
//! Offsets are those of the first write pass, in which the hint stream itself
//! is absent.

use super::bit_writer::{bits_needed, BitWriter};
use super::classifier::ObjUser;
use super::partition::Partition;
use super::queue::ObjectQueue;
use crate::error::{LinearizationError, Result};
use crate::object::{Dict, Object};
use std::io::Write;

/// Denominator for shared object position fractions. Numerators are always
/// zero, so the value is arbitrary but must be non-zero.
const SHARED_DENOMINATOR: u64 = 4;

/// Offsets captured while writing the first pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PivotOffsets {
    /// End of part 4, where the hint stream will be inserted.
    pub hint_offset: u64,
    /// End of part 6.
    pub part6_end: u64,
    /// Offset of the first part 8 object.
    pub first_shared_offset: Option<u64>,
    /// Offset of the first outline object.
    pub outline_offset: Option<u64>,
    /// Total length of the outline group.
    pub outline_length: u64,
}

/// Check that a value fits a 32-bit hint table field.
fn field32(field: &'static str, value: u64) -> std::result::Result<u64, LinearizationError> {
    if value > u32::MAX as u64 {
        return Err(LinearizationError::ValueOutOfRange { field, value });
    }
    Ok(value)
}

/// Width for a column whose values span `min..=max`.
fn column_width(field: &'static str, min: u64, max: u64) -> std::result::Result<u32, LinearizationError> {
    let width = bits_needed(max - min);
    if width > 32 {
        return Err(LinearizationError::ValueOutOfRange {
            field,
            value: max - min,
        });
    }
    Ok(width)
}

/// Per-page entry of the page offset hint table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOffsetEntry {
    /// Objects in the page, minus the table minimum.
    pub delta_nobjects: u64,
    /// Page length, minus the table minimum.
    pub delta_page_length: u64,
    /// Number of shared object references.
    pub nshared_objects: u64,
    /// Shared object table indices.
    pub shared_identifiers: Vec<u64>,
    /// Position numerators, one per shared reference.
    pub shared_numerators: Vec<u64>,
    /// Content stream offset, minus the table minimum.
    pub delta_content_offset: u64,
    /// Content stream length, minus the table minimum.
    pub delta_content_length: u64,
}

/// Page offset hint table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOffsetHints {
    /// Least number of objects in a page.
    pub min_nobjects: u64,
    /// Location of the first page's page object.
    pub first_page_offset: u64,
    /// Bits per object count delta.
    pub nbits_delta_nobjects: u32,
    /// Least page length.
    pub min_page_length: u64,
    /// Bits per page length delta.
    pub nbits_delta_page_length: u32,
    /// Least content stream offset.
    pub min_content_offset: u64,
    /// Bits per content offset delta.
    pub nbits_delta_content_offset: u32,
    /// Least content stream length.
    pub min_content_length: u64,
    /// Bits per content length delta.
    pub nbits_delta_content_length: u32,
    /// Bits per shared reference count.
    pub nbits_nshared_objects: u32,
    /// Bits per shared object identifier.
    pub nbits_shared_identifier: u32,
    /// Bits per position numerator.
    pub nbits_shared_numerator: u32,
    /// Position denominator.
    pub shared_denominator: u64,
    /// One entry per page.
    pub entries: Vec<PageOffsetEntry>,
}

impl PageOffsetHints {
    /// Build the table from the partition and first-pass lengths.
    ///
    /// A page's length counts only the objects no other page uses; shared
    /// objects are described by the shared object table instead.
    pub fn build(partition: &Partition, queue: &ObjectQueue, first_page_offset: u64) -> Result<Self> {
        let map = &partition.user_map;
        let mut nobjects = Vec::with_capacity(partition.page_count());
        let mut lengths = Vec::with_capacity(partition.page_count());

        for (index, info) in partition.page_info.iter().enumerate() {
            let shared = &info.shared_identifiers;
            let mut length = 0u64;
            for obj in map.values_of(&ObjUser::Page(index)) {
                let used_elsewhere = map
                    .keys_of(obj)
                    .any(|user| matches!(user, ObjUser::Page(other) if *other != index));
                let listed = partition
                    .shared
                    .index_of(obj)
                    .is_some_and(|idx| shared.contains(&idx));
                if !used_elsewhere && !listed {
                    length += queue.length_of(*obj)?;
                }
            }
            nobjects.push(info.nobjects as u64);
            lengths.push(length);
        }

        let min_nobjects = nobjects.iter().copied().min().unwrap_or(0);
        let max_nobjects = nobjects.iter().copied().max().unwrap_or(0);
        let min_length = lengths.iter().copied().min().unwrap_or(0);
        let max_length = lengths.iter().copied().max().unwrap_or(0);
        let max_shared = partition
            .page_info
            .iter()
            .map(|info| info.shared_identifiers.len() as u64)
            .max()
            .unwrap_or(0);

        let nbits_delta_page_length = column_width("page length", min_length, max_length)?;
        let mut hints = PageOffsetHints {
            min_nobjects: field32("least object count", min_nobjects)?,
            first_page_offset: field32("first page offset", first_page_offset)?,
            nbits_delta_nobjects: column_width("object count", min_nobjects, max_nobjects)?,
            min_page_length: field32("least page length", min_length)?,
            nbits_delta_page_length,
            min_content_offset: 0,
            nbits_delta_content_offset: 0,
            // Content is described as the whole page, like other writers do.
            min_content_length: min_length,
            nbits_delta_content_length: nbits_delta_page_length,
            nbits_nshared_objects: bits_needed(max_shared),
            nbits_shared_identifier: bits_needed(partition.shared.nshared_total() as u64),
            nbits_shared_numerator: 0,
            shared_denominator: SHARED_DENOMINATOR,
            entries: Vec::with_capacity(partition.page_count()),
        };

        for ((info, count), length) in partition.page_info.iter().zip(&nobjects).zip(&lengths) {
            let shared_identifiers: Vec<u64> =
                info.shared_identifiers.iter().map(|&id| id as u64).collect();
            hints.entries.push(PageOffsetEntry {
                delta_nobjects: count - min_nobjects,
                delta_page_length: length - min_length,
                nshared_objects: shared_identifiers.len() as u64,
                shared_numerators: vec![0; shared_identifiers.len()],
                shared_identifiers,
                delta_content_offset: 0,
                delta_content_length: length - min_length,
            });
        }

        Ok(hints)
    }

    /// Write the header then each column, byte-aligned.
    pub fn write(&self, w: &mut BitWriter) -> std::result::Result<(), LinearizationError> {
        w.write_bits(self.min_nobjects, 32)?;
        w.write_bits(self.first_page_offset, 32)?;
        w.write_bits(self.nbits_delta_nobjects as u64, 16)?;
        w.write_bits(self.min_page_length, 32)?;
        w.write_bits(self.nbits_delta_page_length as u64, 16)?;
        w.write_bits(self.min_content_offset, 32)?;
        w.write_bits(self.nbits_delta_content_offset as u64, 16)?;
        w.write_bits(self.min_content_length, 32)?;
        w.write_bits(self.nbits_delta_content_length as u64, 16)?;
        w.write_bits(self.nbits_nshared_objects as u64, 16)?;
        w.write_bits(self.nbits_shared_identifier as u64, 16)?;
        w.write_bits(self.nbits_shared_numerator as u64, 16)?;
        w.write_bits(self.shared_denominator, 16)?;

        for entry in &self.entries {
            w.write_bits(entry.delta_nobjects, self.nbits_delta_nobjects)?;
        }
        w.flush();
        for entry in &self.entries {
            w.write_bits(entry.delta_page_length, self.nbits_delta_page_length)?;
        }
        w.flush();
        for entry in &self.entries {
            w.write_bits(entry.nshared_objects, self.nbits_nshared_objects)?;
        }
        w.flush();
        for entry in &self.entries {
            for &id in &entry.shared_identifiers {
                w.write_bits(id, self.nbits_shared_identifier)?;
            }
        }
        w.flush();
        for entry in &self.entries {
            for &numerator in &entry.shared_numerators {
                w.write_bits(numerator, self.nbits_shared_numerator)?;
            }
        }
        w.flush();
        for entry in &self.entries {
            w.write_bits(entry.delta_content_offset, self.nbits_delta_content_offset)?;
        }
        w.flush();
        for entry in &self.entries {
            w.write_bits(entry.delta_content_length, self.nbits_delta_content_length)?;
        }
        w.flush();
        Ok(())
    }
}

/// Shared object hint table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedObjectHints {
    /// Object number of the first part 8 object, or 0.
    pub first_shared_obj: u64,
    /// Offset of the first part 8 object, or 0.
    pub first_shared_offset: u64,
    /// Entries belonging to the first page.
    pub nshared_first_page: u64,
    /// Total entries.
    pub nshared_total: u64,
    /// Bits per object count in a group. Groups are single objects.
    pub nbits_nobjects: u32,
    /// Least group length.
    pub min_group_length: u64,
    /// Bits per group length delta.
    pub nbits_delta_group_length: u32,
    /// Group length deltas, in table order.
    pub delta_group_lengths: Vec<u64>,
}

impl SharedObjectHints {
    /// Build the table from the partition and first-pass lengths.
    pub fn build(
        partition: &Partition,
        queue: &ObjectQueue,
        first_shared_offset: Option<u64>,
    ) -> Result<Self> {
        let shared = &partition.shared;
        let lengths = shared
            .entries
            .iter()
            .map(|&obj| queue.length_of(obj))
            .collect::<std::result::Result<Vec<u64>, _>>()?;

        let min_length = lengths.iter().copied().min().unwrap_or(0);
        let max_length = lengths.iter().copied().max().unwrap_or(0);

        let mut hints = SharedObjectHints {
            nshared_first_page: shared.nshared_first_page as u64,
            nshared_total: shared.nshared_total() as u64,
            nbits_nobjects: 0,
            min_group_length: field32("least group length", min_length)?,
            nbits_delta_group_length: column_width("group length", min_length, max_length)?,
            delta_group_lengths: lengths.iter().map(|l| l - min_length).collect(),
            ..Self::default()
        };

        if hints.nshared_total > hints.nshared_first_page {
            if let Some(first) = shared.first_shared_obj {
                hints.first_shared_obj = queue.number_of(first)? as u64;
                let offset = first_shared_offset
                    .ok_or(LinearizationError::UnresolvedPlaceholder("first shared object offset"))?;
                hints.first_shared_offset = field32("first shared object offset", offset)?;
            }
        }

        Ok(hints)
    }

    /// Write the header then each column, byte-aligned.
    pub fn write(&self, w: &mut BitWriter) -> std::result::Result<(), LinearizationError> {
        w.write_bits(self.first_shared_obj, 32)?;
        w.write_bits(self.first_shared_offset, 32)?;
        w.write_bits(self.nshared_first_page, 32)?;
        w.write_bits(self.nshared_total, 32)?;
        w.write_bits(self.nbits_nobjects as u64, 16)?;
        w.write_bits(self.min_group_length, 32)?;
        w.write_bits(self.nbits_delta_group_length as u64, 16)?;

        for &delta in &self.delta_group_lengths {
            w.write_bits(delta, self.nbits_delta_group_length)?;
        }
        w.flush();
        // No content signatures.
        for _ in &self.delta_group_lengths {
            w.write_bits(0, 1)?;
        }
        w.flush();
        for _ in &self.delta_group_lengths {
            w.write_bits(0, self.nbits_nobjects)?;
        }
        w.flush();
        Ok(())
    }
}

/// Generic hint table, used for the outline group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericHints {
    /// Object number of the first object in the group.
    pub first_object_number: u64,
    /// Offset of the first object.
    pub first_object_offset: u64,
    /// Objects in the group.
    pub nobjects: u64,
    /// Total length of the group.
    pub group_length: u64,
}

impl GenericHints {
    /// Build the outline table, or `None` when there are no outlines.
    pub fn outlines(partition: &Partition, queue: &ObjectQueue, pivots: &PivotOffsets) -> Result<Option<Self>> {
        let group = &partition.outlines;
        let Some(first) = group.first_object.filter(|_| group.nobjects > 0) else {
            return Ok(None);
        };
        let offset = pivots
            .outline_offset
            .ok_or(LinearizationError::UnresolvedPlaceholder("outline offset"))?;

        Ok(Some(GenericHints {
            first_object_number: queue.number_of(first)? as u64,
            first_object_offset: field32("outline offset", offset)?,
            nobjects: group.nobjects as u64,
            group_length: field32("outline length", pivots.outline_length)?,
        }))
    }

    /// Write the four fields.
    pub fn write(&self, w: &mut BitWriter) -> std::result::Result<(), LinearizationError> {
        w.write_bits(self.first_object_number, 32)?;
        w.write_bits(self.first_object_offset, 32)?;
        w.write_bits(self.nobjects, 32)?;
        w.write_bits(self.group_length, 32)?;
        Ok(())
    }
}

/// All tables of the primary hint stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintTables {
    /// Page offset hint table.
    pub page_offset: PageOffsetHints,
    /// Shared object hint table.
    pub shared_object: SharedObjectHints,
    /// Outline hint table.
    pub outline: Option<GenericHints>,
}

/// Serialized hint tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedHints {
    /// Uncompressed table bytes.
    pub data: Vec<u8>,
    /// Offset of the shared object table in `data`.
    pub shared_offset: usize,
    /// Offset of the outline table in `data`.
    pub outline_offset: Option<usize>,
}

impl HintTables {
    /// Compute every table from the first pass results.
    pub fn build(partition: &Partition, queue: &ObjectQueue, pivots: &PivotOffsets) -> Result<Self> {
        Ok(HintTables {
            page_offset: PageOffsetHints::build(partition, queue, pivots.hint_offset)?,
            shared_object: SharedObjectHints::build(partition, queue, pivots.first_shared_offset)?,
            outline: GenericHints::outlines(partition, queue, pivots)?,
        })
    }

    /// Bit-pack the tables.
    pub fn encode(&self) -> Result<EncodedHints> {
        let mut w = BitWriter::new();
        self.page_offset.write(&mut w)?;
        let shared_offset = w.count();
        self.shared_object.write(&mut w)?;
        let outline_offset = match &self.outline {
            Some(outline) => {
                let offset = w.count();
                outline.write(&mut w)?;
                Some(offset)
            },
            None => None,
        };
        Ok(EncodedHints {
            data: w.finish(),
            shared_offset,
            outline_offset,
        })
    }
}

impl EncodedHints {
    /// Build the hint stream object, FlateDecode-compressed when `compress`.
    pub fn to_stream(&self, compress: bool) -> Result<Object> {
        let mut dict = Dict::new();
        let data = if compress {
            dict.insert("Filter".to_string(), Object::name("FlateDecode"));
            compress_data(&self.data)?
        } else {
            self.data.clone()
        };
        dict.insert("S".to_string(), Object::Integer(self.shared_offset as i64));
        if let Some(offset) = self.outline_offset {
            dict.insert("O".to_string(), Object::Integer(offset as i64));
        }
        Ok(Object::Stream {
            dict,
            data: bytes::Bytes::from(data),
        })
    }
}

/// Compress data using Flate/Deflate compression.
fn compress_data(data: &[u8]) -> std::io::Result<Vec<u8>> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::object::ObjectRef;
    use crate::writer::linearization::classifier::classify;
    use std::io::Read;

    /// Two pages sharing `font`; page 1 also has a private content stream.
    fn fixture() -> (Partition, ObjectQueue) {
        let mut doc = Document::new();
        let pages_ref = doc.new_object_ref();
        let font = doc.add_object(Object::dict([("Type", Object::name("Font"))]));
        let mut kids = Vec::new();
        for i in 0..2 {
            let content = doc.add_object(Object::Stream {
                dict: Dict::new(),
                data: bytes::Bytes::from(vec![b'x'; 10 * (i + 1)]),
            });
            let page = doc.add_object(Object::dict([
                ("Type", Object::name("Page")),
                ("Parent", Object::Reference(pages_ref)),
                ("Contents", Object::Reference(content)),
                ("Resources", Object::dict([("F1", Object::Reference(font))])),
            ]));
            kids.push(Object::Reference(page));
        }
        doc.set_object(
            pages_ref,
            Object::dict([
                ("Type", Object::name("Pages")),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(2)),
            ]),
        );
        let catalog = doc.add_object(Object::dict([("Pages", Object::Reference(pages_ref))]));
        doc.set_root(catalog);

        let classification = classify(&mut doc, false).unwrap();
        let partition = Partition::build(&doc, classification).unwrap();

        let mut queue = ObjectQueue::new();
        for part in [
            &partition.part4,
            &partition.part6,
            &partition.part7,
            &partition.part8,
            &partition.part9,
        ] {
            queue.enqueue_part(part);
        }
        let sources: Vec<ObjectRef> = queue.iter().map(|e| e.source).collect();
        for (i, source) in sources.into_iter().enumerate() {
            queue.record_length(source, 100 + i as u64).unwrap();
        }
        (partition, queue)
    }

    #[test]
    fn test_page_offset_table() {
        let (partition, queue) = fixture();
        let hints = PageOffsetHints::build(&partition, &queue, 500).unwrap();

        assert_eq!(hints.first_page_offset, 500);
        assert_eq!(hints.entries.len(), 2);
        assert_eq!(hints.min_content_offset, 0);
        assert_eq!(hints.nbits_delta_content_offset, 0);
        assert_eq!(hints.min_content_length, hints.min_page_length);
        assert_eq!(hints.shared_denominator, 4);

        // Page 0: page + content + font; page 1: page + content.
        assert_eq!(partition.page_info[0].nobjects, 3);
        assert_eq!(hints.min_nobjects, 2);
        assert_eq!(hints.entries[0].delta_nobjects, 1);
        assert_eq!(hints.entries[1].delta_nobjects, 0);

        // Page 1 lists the font, at index 2 of the shared table.
        assert_eq!(hints.entries[1].shared_identifiers, vec![2]);
        assert_eq!(hints.entries[1].shared_numerators, vec![0]);
        assert!(hints.entries[0].shared_identifiers.is_empty());
        assert_eq!(hints.nbits_shared_identifier, bits_needed(3));

        for entry in &hints.entries {
            assert_eq!(entry.delta_content_length, entry.delta_page_length);
        }
    }

    #[test]
    fn test_page_length_excludes_shared_objects() {
        let (partition, queue) = fixture();
        let hints = PageOffsetHints::build(&partition, &queue, 0).unwrap();

        let page_len = |page: usize| -> u64 {
            partition
                .user_map
                .values_of(&ObjUser::Page(page))
                .filter(|o| partition.user_map.key_count(o) == 1)
                .map(|o| queue.length_of(*o).unwrap())
                .sum()
        };
        let (l0, l1) = (page_len(0), page_len(1));
        let min = l0.min(l1);
        assert_eq!(hints.min_page_length, min);
        assert_eq!(hints.entries[0].delta_page_length, l0 - min);
        assert_eq!(hints.entries[1].delta_page_length, l1 - min);
    }

    #[test]
    fn test_shared_object_table_without_part8() {
        let (partition, queue) = fixture();
        let hints = SharedObjectHints::build(&partition, &queue, None).unwrap();

        assert_eq!(hints.nshared_first_page, 3);
        assert_eq!(hints.nshared_total, 3);
        assert_eq!(hints.first_shared_obj, 0);
        assert_eq!(hints.first_shared_offset, 0);
        assert_eq!(hints.delta_group_lengths.len(), 3);
        assert_eq!(*hints.delta_group_lengths.iter().min().unwrap(), 0);
    }

    #[test]
    fn test_encode_layout() {
        let (partition, queue) = fixture();
        let tables = HintTables::build(
            &partition,
            &queue,
            &PivotOffsets {
                hint_offset: 300,
                ..PivotOffsets::default()
            },
        )
        .unwrap();
        assert!(tables.outline.is_none());

        let encoded = tables.encode().unwrap();
        // Page offset header: five 32-bit and eight 16-bit fields.
        assert!(encoded.shared_offset >= 36);
        assert_eq!(&encoded.data[4..8], &300u32.to_be_bytes());
        assert_eq!(encoded.outline_offset, None);

        // Shared table begins with first_shared_obj = 0 and nshared_first_page = 3.
        let s = encoded.shared_offset;
        assert_eq!(&encoded.data[s..s + 4], &[0, 0, 0, 0]);
        assert_eq!(&encoded.data[s + 8..s + 12], &3u32.to_be_bytes());
    }

    #[test]
    fn test_stream_object() {
        let encoded = EncodedHints {
            data: vec![1, 2, 3, 4],
            shared_offset: 2,
            outline_offset: Some(3),
        };

        let plain = encoded.to_stream(false).unwrap();
        let dict = plain.as_dict().unwrap();
        assert!(!dict.contains_key("Filter"));
        assert_eq!(dict["S"].as_integer(), Some(2));
        assert_eq!(dict["O"].as_integer(), Some(3));

        let compressed = encoded.to_stream(true).unwrap();
        let Object::Stream { dict, data } = compressed else {
            panic!("Expected stream");
        };
        assert_eq!(dict["Filter"].as_name(), Some("FlateDecode"));
        let mut decoded = Vec::new();
        flate2::read::ZlibDecoder::new(&data[..])
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_field_range_checks() {
        assert!(field32("x", u32::MAX as u64).is_ok());
        assert_eq!(
            field32("x", 1 << 32),
            Err(LinearizationError::ValueOutOfRange {
                field: "x",
                value: 1 << 32
            })
        );
        assert_eq!(column_width("y", 10, 10).unwrap(), 0);
        assert_eq!(column_width("y", 0, 255).unwrap(), 8);
        assert!(column_width("y", 0, 1 << 40).is_err());
    }
}
