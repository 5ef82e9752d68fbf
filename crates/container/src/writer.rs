use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::{Header, HEADER_BYTES};

/// Builds a container file: header, main segment, then slot segment.
///
/// Offsets in the header are computed from the payload lengths, so the
/// output is always self-consistent. Tests that need a damaged container
/// can patch [`ContainerWriter::header`] afterwards.
#[derive(Debug, Clone, Default)]
pub struct ContainerWriter {
    main_version: u32,
    sub_version: u32,
    owner_id: u64,
    segment: Vec<u8>,
    slot: Vec<u8>,
}

impl ContainerWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn versions(mut self, main_version: u32, sub_version: u32) -> Self {
        self.main_version = main_version;
        self.sub_version = sub_version;
        self
    }

    pub fn owner(mut self, owner_id: u64) -> Self {
        self.owner_id = owner_id;
        self
    }

    pub fn segment(mut self, bytes: Vec<u8>) -> Self {
        self.segment = bytes;
        self
    }

    pub fn slot(mut self, bytes: Vec<u8>) -> Self {
        self.slot = bytes;
        self
    }

    /// The header that [`to_bytes`](Self::to_bytes) will emit.
    #[must_use]
    pub fn header(&self) -> Header {
        let segment_offset = HEADER_BYTES as u64;
        let slot_offset = segment_offset + self.segment.len() as u64;
        Header {
            main_version: self.main_version,
            reserved: 0,
            sub_version: self.sub_version,
            owner_id: self.owner_id,
            segment_offset,
            slot_offset,
            segment_size: self.segment.len() as u64,
            slot_size: self.slot.len() as u64,
        }
    }

    /// Serializes the whole container into memory.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_BYTES + self.segment.len() + self.slot.len());
        out.extend_from_slice(&self.header().to_bytes());
        out.extend_from_slice(&self.segment);
        out.extend_from_slice(&self.slot);
        out
    }

    /// Writes the container to `path`, replacing any existing file.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        w.write_all(&self.to_bytes())?;
        w.flush()?;
        Ok(())
    }
}
