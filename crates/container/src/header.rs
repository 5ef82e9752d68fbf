//! Fixed-width container header.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{self, Read, Write};

use crate::ContainerError;

/// Size of the header in bytes: 3 × u32 + 5 × u64.
pub const HEADER_BYTES: usize = 4 + 4 + 4 + 8 + 8 + 8 + 8 + 8;

/// A container-relative byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentRange {
    pub offset: u64,
    pub size: u64,
}

/// Parsed container header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub main_version: u32,
    pub reserved: u32,
    pub sub_version: u32,
    /// Account that owns the save.
    pub owner_id: u64,
    pub segment_offset: u64,
    pub slot_offset: u64,
    pub segment_size: u64,
    pub slot_size: u64,
}

impl Header {
    /// The main segment ("A").
    #[must_use]
    pub fn segment(&self) -> SegmentRange {
        SegmentRange {
            offset: self.segment_offset,
            size: self.segment_size,
        }
    }

    /// The slot segment ("B").
    #[must_use]
    pub fn slot(&self) -> SegmentRange {
        SegmentRange {
            offset: self.slot_offset,
            size: self.slot_size,
        }
    }

    /// Encodes the header in on-disk order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_BYTES] {
        let mut b = [0u8; HEADER_BYTES];
        LittleEndian::write_u32(&mut b[0..4], self.main_version);
        LittleEndian::write_u32(&mut b[4..8], self.reserved);
        LittleEndian::write_u32(&mut b[8..12], self.sub_version);
        LittleEndian::write_u64(&mut b[12..20], self.owner_id);
        LittleEndian::write_u64(&mut b[20..28], self.segment_offset);
        LittleEndian::write_u64(&mut b[28..36], self.slot_offset);
        LittleEndian::write_u64(&mut b[36..44], self.segment_size);
        LittleEndian::write_u64(&mut b[44..52], self.slot_size);
        b
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }
}

/// Reads the fixed-width header from the current position of `r`.
///
/// # Errors
///
/// - [`ContainerError::Format`] if fewer than [`HEADER_BYTES`] bytes are
///   available.
/// - [`ContainerError::Io`] on any other read failure.
pub fn read_header<R: Read>(r: &mut R) -> Result<Header, ContainerError> {
    let mut buf = Vec::with_capacity(HEADER_BYTES);
    r.by_ref().take(HEADER_BYTES as u64).read_to_end(&mut buf)?;
    if buf.len() < HEADER_BYTES {
        return Err(ContainerError::Format {
            expected: HEADER_BYTES,
            found: buf.len(),
        });
    }

    let mut br = &buf[..];
    Ok(Header {
        main_version: br.read_u32::<LittleEndian>()?,
        reserved: br.read_u32::<LittleEndian>()?,
        sub_version: br.read_u32::<LittleEndian>()?,
        owner_id: br.read_u64::<LittleEndian>()?,
        segment_offset: br.read_u64::<LittleEndian>()?,
        slot_offset: br.read_u64::<LittleEndian>()?,
        segment_size: br.read_u64::<LittleEndian>()?,
        slot_size: br.read_u64::<LittleEndian>()?,
    })
}
