//! Output assembly.
//!
//! Each write pass produces byte ranges for some of the file's segments. A
//! segment recorded twice keeps the latest bytes, which is how pass two
//! replaces the placeholder prefix. The final file is the segments in file
//! order, checked against the declared length.

use crate::error::{LinearizationError, Result};
use std::io::Write;

/// Byte ranges of a linearized file, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Header, linearization dictionary and first-page cross-reference stream.
    Prefix,
    /// Part 4 objects.
    FirstPart,
    /// Primary hint stream.
    HintStream,
    /// Parts 6 through 9.
    SecondPart,
    /// Main cross-reference stream and trailer.
    MainXref,
}

impl Segment {
    /// All segments in file order.
    pub const ORDER: [Segment; 5] = [
        Segment::Prefix,
        Segment::FirstPart,
        Segment::HintStream,
        Segment::SecondPart,
        Segment::MainXref,
    ];

    /// Segment name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Segment::Prefix => "prefix",
            Segment::FirstPart => "first part",
            Segment::HintStream => "hint stream",
            Segment::SecondPart => "second part",
            Segment::MainXref => "main xref",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Collects segment bytes across passes.
#[derive(Debug, Clone, Default)]
pub struct OutputAssembler {
    segments: [Option<Vec<u8>>; 5],
}

impl OutputAssembler {
    /// Create an assembler with no segments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the bytes of `segment`, returning its length.
    pub fn record(&mut self, segment: Segment, bytes: Vec<u8>) -> u64 {
        let len = bytes.len() as u64;
        if self.segments[segment.index()].replace(bytes).is_some() {
            log::debug!("Replaced {} segment ({} bytes)", segment.name(), len);
        }
        len
    }

    /// Bytes of `segment`, if recorded.
    pub fn get(&self, segment: Segment) -> Option<&[u8]> {
        self.segments[segment.index()].as_deref()
    }

    /// Length of `segment`.
    pub fn len_of(&self, segment: Segment) -> Result<u64> {
        self.get(segment)
            .map(|bytes| bytes.len() as u64)
            .ok_or_else(|| LinearizationError::MissingSegment(segment.name()).into())
    }

    /// Sum of all recorded segment lengths.
    pub fn total_len(&self) -> u64 {
        self.segments.iter().flatten().map(|s| s.len() as u64).sum()
    }

    fn check(&self, declared: u64) -> Result<()> {
        for segment in Segment::ORDER {
            self.len_of(segment)?;
        }
        let actual = self.total_len();
        if actual != declared {
            return Err(LinearizationError::LengthMismatch { declared, actual }.into());
        }
        Ok(())
    }

    /// Concatenate every segment, verifying the total equals `declared`.
    pub fn assemble(self, declared: u64) -> Result<Vec<u8>> {
        self.check(declared)?;
        let mut out = Vec::with_capacity(declared as usize);
        for bytes in self.segments.into_iter().flatten() {
            out.extend_from_slice(&bytes);
        }
        Ok(out)
    }

    /// Write every segment to `writer`, verifying the total equals `declared`.
    pub fn write_to<W: Write>(&self, writer: &mut W, declared: u64) -> Result<u64> {
        self.check(declared)?;
        for bytes in self.segments.iter().flatten() {
            writer.write_all(bytes)?;
        }
        Ok(declared)
    }
}
