//! PDF Linearization (Fast Web View) support.
//!
//! Rewrites a document so that the first page, and everything a viewer needs
//! to show it, sits in a short prefix of the file.
//!
//! ## PDF Structure
//!
//! A linearized PDF produced here has these parts in order:
//! 1. Header
//! 2. Linearization parameter dictionary
//! 3. First-page cross-reference stream and trailer
//! 4. Document catalog and document-level objects
//! 5. Primary hint stream
//! 6. First-page section (objects for first page)
//! 7. Remaining pages
//! 8. Shared objects
//! 9. Other objects
//! 10. Main cross-reference stream and trailer
//!
//! Objects in parts 7 to 9 are numbered from 1; the first half follows them.
//!
//! ## Standards Reference
//!
//! - PDF Reference 1.7: Annex F "Linearized PDF"
//! - ISO 32000-1:2008: Annex F

pub mod assembler;
pub mod bit_writer;
pub mod classifier;
pub mod hints;
pub mod multimap;
pub mod params;
pub mod partition;
pub mod queue;
pub mod xref;

pub use assembler::{OutputAssembler, Segment};
pub use params::LinearizationParams;

use crate::config::LinearizationConfig;
use crate::document::Document;
use crate::error::{Error, LinearizationError, Result};
use crate::object::{Dict, Object, ObjectRef};
use crate::writer::ObjectSerializer;
use classifier::classify;
use hints::{HintTables, PivotOffsets};
use md5::{Digest, Md5};
use partition::Partition;
use queue::{ObjectQueue, Placeholder};
use serde::Serialize;
use std::io::Write;
use xref::{XrefEntry, XrefStream, XrefTable};

/// Trailer keys carried into both output trailers.
const TRAILER_KEYS: [&str; 3] = ["Root", "Info", "ID"];

/// Steps of a linearization run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Tag every object with its users.
    Classify,
    /// Sort objects into parts.
    Partition,
    /// Assign output object numbers.
    Enqueue,
    /// Serialize objects to learn lengths and offsets.
    Pass1Write,
    /// Compute and encode the hint tables.
    FillHints,
    /// Write cross-reference streams and the real parameter dictionary.
    Pass2Patch,
    /// Concatenate segments.
    Assemble,
    /// Finished.
    Done,
}

/// Summary of a linearization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinearizationStats {
    /// Number of pages.
    pub pages: usize,
    /// Number of document objects written.
    pub objects: usize,
    /// Objects in part 4.
    pub part4_objects: usize,
    /// Objects in part 6.
    pub part6_objects: usize,
    /// Objects in part 7.
    pub part7_objects: usize,
    /// Objects in part 8.
    pub part8_objects: usize,
    /// Objects in part 9.
    pub part9_objects: usize,
    /// Entries in the shared object hint table.
    pub shared_objects: usize,
    /// Serialized hint stream length.
    pub hint_stream_length: u64,
    /// Offset of the end of the first page.
    pub first_page_end: u64,
    /// Total file length.
    pub file_length: u64,
}

impl LinearizationStats {
    /// Render the statistics as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Output of a successful run.
#[derive(Debug, Clone)]
pub struct LinearizedPdf {
    bytes: Vec<u8>,
    params: LinearizationParams,
    stats: LinearizationStats,
}

impl LinearizedPdf {
    /// Copy of the file bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// File bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the file bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Write the file to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.bytes)?;
        Ok(())
    }

    /// Save the file to `path`.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Values written to the linearization parameter dictionary.
    pub fn params(&self) -> &LinearizationParams {
        &self.params
    }

    /// Run statistics.
    pub fn stats(&self) -> &LinearizationStats {
        &self.stats
    }

    /// File length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file is empty. Never true for a successful run.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Drives a linearization run.
#[derive(Debug, Clone)]
pub struct Linearizer {
    config: LinearizationConfig,
    stage: Stage,
}

impl Linearizer {
    /// Create a linearizer with the given options.
    pub fn new(config: LinearizationConfig) -> Self {
        Self {
            config,
            stage: Stage::Classify,
        }
    }

    /// Stage reached by the last run.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn advance(&mut self, next: Stage) {
        log::debug!("Linearization stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    /// Linearize `input`. The input document is left untouched.
    pub fn run(&mut self, input: &Document) -> Result<LinearizedPdf> {
        self.stage = Stage::Classify;
        if input.trailer().contains_key("Encrypt") {
            return Err(Error::Unsupported(
                "linearization of encrypted documents".to_string(),
            ));
        }

        let mut doc = input.clone();
        if self.config.generate_document_id && !doc.trailer().contains_key("ID") {
            let id = document_id(&doc)?;
            doc.trailer_mut().insert("ID".to_string(), id);
        }
        let classification = classify(&mut doc, self.config.flatten_page_tree)?;

        self.advance(Stage::Partition);
        let partition = Partition::build(&doc, classification)?;

        self.advance(Stage::Enqueue);
        let layout = Layout::enqueue(&partition)?;

        self.advance(Stage::Pass1Write);
        let mut run = Run::new(&doc, &partition, layout, &self.config)?;
        let pivots = run.write_pass_one()?;

        self.advance(Stage::FillHints);
        run.fill_hints(&pivots, self.config.compress_hint_stream)?;

        self.advance(Stage::Pass2Patch);
        let params = run.write_pass_two(&pivots)?;

        self.advance(Stage::Assemble);
        let bytes = run.assembler.assemble(params.file_length)?;

        let stats = LinearizationStats {
            pages: partition.page_count(),
            objects: run.queue.len(),
            part4_objects: partition.part4.len(),
            part6_objects: partition.part6.len(),
            part7_objects: partition.part7.len(),
            part8_objects: partition.part8.len(),
            part9_objects: partition.part9.len(),
            shared_objects: partition.shared.nshared_total(),
            hint_stream_length: params.hint_stream[1],
            first_page_end: params.end_of_first_page,
            file_length: params.file_length,
        };
        log::info!(
            "Linearized {} pages, {} objects into {} bytes",
            stats.pages,
            stats.objects,
            stats.file_length
        );

        self.advance(Stage::Done);
        Ok(LinearizedPdf {
            bytes,
            params,
            stats,
        })
    }
}

/// Linearize `doc` with default options.
pub fn linearize(doc: &Document) -> Result<Vec<u8>> {
    linearize_with_config(doc, &LinearizationConfig::default())
}

/// Linearize `doc` with the given options.
pub fn linearize_with_config(doc: &Document, config: &LinearizationConfig) -> Result<Vec<u8>> {
    Ok(Linearizer::new(config.clone()).run(doc)?.into_bytes())
}

/// File header: version line and binary marker.
fn header(version: (u8, u8)) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    writeln!(output, "%PDF-{}.{}", version.0, version.1)?;
    output.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");
    Ok(output)
}

/// Two identical MD5 digests over the document's serialized objects.
fn document_id(doc: &Document) -> Result<Object> {
    let serializer = ObjectSerializer::compact();
    let mut hasher = Md5::new();
    for (r, obj) in doc.objects() {
        hasher.update(serializer.serialize_indirect(r.id, r.gen, obj)?);
    }
    hasher.update(serializer.serialize(&Object::Dictionary(doc.trailer().clone()))?);
    let digest = hasher.finalize().to_vec();
    Ok(Object::Array(vec![
        Object::String(digest.clone()),
        Object::String(digest),
    ]))
}

/// Output numbering: the queue plus the sizes derived from it.
struct Layout {
    queue: ObjectQueue,
    second_half: u32,
    first_trailer_size: u32,
    second_trailer_size: u32,
}

impl Layout {
    fn enqueue(partition: &Partition) -> Result<Self> {
        let second_half = partition.second_half_len() as u32;
        let mut queue = ObjectQueue::new();

        queue.set_next_id(second_half + 2);
        queue.enqueue_dummy(Placeholder::LinearizationDict);
        queue.enqueue_dummy(Placeholder::FirstXref);
        queue.enqueue_part(&partition.part4);
        queue.enqueue_dummy(Placeholder::HintStream);
        queue.enqueue_part(&partition.part6);
        let first_trailer_size = queue.next_id();

        queue.reset_numbering();
        queue.enqueue_part(&partition.part7);
        queue.enqueue_part(&partition.part8);
        queue.enqueue_part(&partition.part9);
        queue.enqueue_dummy(Placeholder::SecondXref);
        let second_trailer_size = queue.next_id();

        if queue.len() != partition.placed_count() || second_trailer_size != second_half + 2 {
            return Err(LinearizationError::ObjectCountMismatch {
                placed: queue.len(),
                tagged: partition.placed_count(),
            }
            .into());
        }

        log::debug!(
            "Numbered {} objects: first half {}..{}, second half 1..{}",
            queue.len(),
            second_half + 2,
            first_trailer_size,
            second_trailer_size
        );
        Ok(Self {
            queue,
            second_half,
            first_trailer_size,
            second_trailer_size,
        })
    }
}

/// State shared by the write passes.
struct Run<'a> {
    doc: &'a Document,
    partition: &'a Partition,
    queue: ObjectQueue,
    serializer: ObjectSerializer,
    assembler: OutputAssembler,
    header: Vec<u8>,
    trailer: Dict,
    second_half: u32,
    first_trailer_size: u32,
    second_trailer_size: u32,
    first_xref_offset: u64,
    first_xref_end: u64,
}

impl<'a> Run<'a> {
    fn new(
        doc: &'a Document,
        partition: &'a Partition,
        layout: Layout,
        config: &LinearizationConfig,
    ) -> Result<Self> {
        let serializer = if config.compact_objects {
            ObjectSerializer::compact()
        } else {
            ObjectSerializer::new()
        };
        let mut run = Run {
            doc,
            partition,
            queue: layout.queue,
            serializer,
            assembler: OutputAssembler::new(),
            header: header(config.header_version(doc.version()))?,
            trailer: Dict::new(),
            second_half: layout.second_half,
            first_trailer_size: layout.first_trailer_size,
            second_trailer_size: layout.second_trailer_size,
            first_xref_offset: 0,
            first_xref_end: 0,
        };
        run.trailer = run.output_trailer();
        Ok(run)
    }

    /// First number of the first half.
    fn first_half_start(&self) -> u32 {
        self.second_half + 2
    }

    /// Rewrite references to output numbers; unqueued targets become null.
    fn renumber(&self, obj: &Object) -> Object {
        obj.map_references(&mut |r: ObjectRef| match self.queue.get(r) {
            Some(entry) => Object::Reference(ObjectRef::new(entry.number, 0)),
            None => Object::Null,
        })
    }

    /// Root, Info and ID of the input trailer, renumbered.
    fn output_trailer(&self) -> Dict {
        let input = self.doc.trailer();
        TRAILER_KEYS
            .iter()
            .filter_map(|&key| input.get(key).map(|v| (key.to_string(), self.renumber(v))))
            .collect()
    }

    fn serialize(&self, number: u32, obj: &Object) -> Result<Vec<u8>> {
        self.serializer.serialize_indirect(number, 0, obj)
    }

    fn first_xref_count(&self) -> u32 {
        self.first_trailer_size - self.first_half_start()
    }

    /// Write the placeholder prefix and every queued object.
    fn write_pass_one(&mut self) -> Result<PivotOffsets> {
        let lin_number = self.queue.dummy_number(Placeholder::LinearizationDict)?;
        let lin_dict = LinearizationParams::placeholder().to_object();
        let lin_bytes = self.serialize(lin_number, &lin_dict)?;
        self.queue
            .replace_dummy(Placeholder::LinearizationDict, lin_dict, lin_bytes.len() as u64)?;

        let mut prefix = self.header.clone();
        prefix.extend_from_slice(&lin_bytes);
        self.first_xref_offset = prefix.len() as u64;

        let xref_number = self.queue.dummy_number(Placeholder::FirstXref)?;
        let placeholder = XrefStream::placeholder(
            self.first_half_start(),
            self.first_xref_count(),
            self.first_trailer_size,
            true,
        );
        let xref_obj = placeholder.to_object(&self.trailer)?;
        let xref_bytes = self.serialize(xref_number, &xref_obj)?;
        self.queue
            .replace_dummy(Placeholder::FirstXref, xref_obj, xref_bytes.len() as u64)?;
        prefix.extend_from_slice(&xref_bytes);
        prefix.extend_from_slice(b"startxref\n0\n%%EOF\n");
        self.first_xref_end = self.assembler.record(Segment::Prefix, prefix);

        let partition = self.partition;
        let part4_end = partition.part4.last().copied();
        let part6_end = partition.part6.last().copied();
        let outline_first = partition
            .outlines
            .first_object
            .filter(|_| partition.outlines.nobjects > 0);
        let first_shared = partition.shared.first_shared_obj;

        let mut pivots = PivotOffsets::default();
        let mut outline_remaining = 0usize;
        let mut offset = self.first_xref_end;
        let mut buf = Vec::new();

        let order: Vec<(ObjectRef, u32)> = self.queue.iter().map(|e| (e.source, e.number)).collect();
        for (source, number) in order {
            let obj = self.renumber(self.doc.load_object(source)?);
            let bytes = self.serialize(number, &obj)?;
            let len = bytes.len() as u64;
            self.queue.record_length(source, len)?;
            buf.extend_from_slice(&bytes);
            offset += len;

            if outline_remaining > 0 {
                pivots.outline_length += len;
                outline_remaining -= 1;
            }
            if Some(source) == outline_first {
                pivots.outline_offset = Some(offset - len);
                pivots.outline_length = len;
                outline_remaining = partition.outlines.nobjects - 1;
            }
            if Some(source) == first_shared {
                pivots.first_shared_offset = Some(offset - len);
            }
            if Some(source) == part4_end {
                self.assembler
                    .record(Segment::FirstPart, std::mem::take(&mut buf));
                pivots.hint_offset = offset;
            }
            if Some(source) == part6_end {
                pivots.part6_end = offset;
            }
        }
        self.assembler.record(Segment::SecondPart, buf);

        log::debug!(
            "Pass one: prefix {} bytes, part 4 ends at {}, part 6 ends at {}",
            self.first_xref_end,
            pivots.hint_offset,
            pivots.part6_end
        );
        Ok(pivots)
    }

    /// Build the hint stream from pass one offsets.
    fn fill_hints(&mut self, pivots: &PivotOffsets, compress: bool) -> Result<()> {
        let tables = HintTables::build(self.partition, &self.queue, pivots)?;
        let encoded = tables.encode()?;
        let stream = encoded.to_stream(compress)?;

        let number = self.queue.dummy_number(Placeholder::HintStream)?;
        let bytes = self.serialize(number, &stream)?;
        let len = self.assembler.record(Segment::HintStream, bytes);
        self.queue.replace_dummy(Placeholder::HintStream, stream, len)?;

        log::debug!(
            "Hint stream: {} table bytes, {} bytes written, shared table at {}",
            encoded.data.len(),
            len,
            encoded.shared_offset
        );
        Ok(())
    }

    /// Serialized length of a resolved placeholder.
    fn resolved_len(&self, kind: Placeholder) -> Result<u64> {
        Ok(self.queue.resolved(kind)?.1)
    }

    /// Cross-reference offsets of every object, now that the hint stream
    /// length is known. Returns the table and the main xref offset.
    fn xref_table(&self) -> Result<(XrefTable, u64)> {
        let hint_len = self.resolved_len(Placeholder::HintStream)?;
        let mut table = XrefTable::new();
        table.insert(0, XrefEntry::free_head());
        table.insert(
            self.queue.dummy_number(Placeholder::LinearizationDict)?,
            XrefEntry::in_use(self.header.len() as u64),
        );
        table.insert(
            self.queue.dummy_number(Placeholder::FirstXref)?,
            XrefEntry::in_use(self.first_xref_offset),
        );

        let hint_number = self.queue.dummy_number(Placeholder::HintStream)?;
        let part4_end = self.partition.part4.last().copied();
        let mut offset = self.first_xref_end;
        for entry in self.queue.iter() {
            let len = entry
                .length
                .ok_or(LinearizationError::UnqueuedObject(entry.source))?;
            table.insert(entry.number, XrefEntry::in_use(offset));
            offset += len;
            if Some(entry.source) == part4_end {
                table.insert(hint_number, XrefEntry::in_use(offset));
                offset += hint_len;
            }
        }

        let main_number = self.queue.dummy_number(Placeholder::SecondXref)?;
        table.insert(main_number, XrefEntry::in_use(offset));
        Ok((table, offset))
    }

    /// Write both cross-reference streams and the real parameter dictionary.
    fn write_pass_two(&mut self, pivots: &PivotOffsets) -> Result<LinearizationParams> {
        let (table, main_xref_offset) = self.xref_table()?;
        let hint_len = self.resolved_len(Placeholder::HintStream)?;

        let main = XrefStream {
            first: 0,
            entries: table.range(0, self.second_trailer_size)?,
            size: self.second_trailer_size,
            prev: None,
        };
        let main_obj = main.to_object(&self.trailer)?;
        let main_number = self.queue.dummy_number(Placeholder::SecondXref)?;
        let mut tail = self.serialize(main_number, &main_obj)?;
        write!(tail, "startxref\n{}\n%%EOF\n", self.first_xref_offset)?;
        let tail_len = self.assembler.record(Segment::MainXref, tail);
        self.queue.replace_dummy(Placeholder::SecondXref, main_obj, tail_len)?;

        let mut params = LinearizationParams::new(self.partition.page_count() as u32);
        params.file_length = main_xref_offset + self.resolved_len(Placeholder::SecondXref)?;
        params.hint_stream = [pivots.hint_offset, hint_len];
        params.first_page_object = self.queue.number_of(self.partition.pages[0])?;
        params.end_of_first_page = pivots.part6_end + hint_len;
        params.main_xref_offset = main_xref_offset;

        let lin_number = self.queue.dummy_number(Placeholder::LinearizationDict)?;
        let lin_dict = params.to_object();
        let mut prefix = self.header.clone();
        prefix.extend_from_slice(&self.serialize(lin_number, &lin_dict)?);
        self.queue.replace_dummy(
            Placeholder::LinearizationDict,
            lin_dict,
            prefix.len() as u64 - self.header.len() as u64,
        )?;
        pad_to(&mut prefix, self.first_xref_offset)?;

        let first = XrefStream {
            first: self.first_half_start(),
            entries: table.range(self.first_half_start(), self.first_xref_count())?,
            size: self.first_trailer_size,
            prev: Some(main_xref_offset),
        };
        let first_obj = first.to_object(&self.trailer)?;
        let xref_number = self.queue.dummy_number(Placeholder::FirstXref)?;
        let xref_bytes = self.serialize(xref_number, &first_obj)?;
        self.queue
            .replace_dummy(Placeholder::FirstXref, first_obj, xref_bytes.len() as u64)?;
        prefix.extend_from_slice(&xref_bytes);
        prefix.extend_from_slice(b"startxref\n0\n%%EOF\n");
        pad_to(&mut prefix, self.first_xref_end)?;
        self.assembler.record(Segment::Prefix, prefix);

        log::debug!(
            "Pass two: main xref at {}, file length {}",
            params.main_xref_offset,
            params.file_length
        );
        Ok(params)
    }
}

/// Pad `buf` with whitespace up to `target` bytes, ending in a newline.
fn pad_to(buf: &mut Vec<u8>, target: u64) -> Result<()> {
    let len = buf.len() as u64;
    if len > target {
        return Err(LinearizationError::SegmentOverflow {
            segment: Segment::Prefix.name(),
            reserved: target,
            actual: len,
        }
        .into());
    }
    let gap = (target - len) as usize;
    if gap > 0 {
        buf.resize(buf.len() + gap - 1, b' ');
        buf.push(b'\n');
    }
    Ok(())
}
