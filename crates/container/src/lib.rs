//! # Container - save file header and segment extraction
//!
//! A save container is a fixed 52-byte header followed by arbitrary payload.
//! The header names two byte ranges (the main segment and the "slot"
//! segment), each holding an independently encoded save table.
//!
//! ## Header layout
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ main_version (u32) | reserved (u32) | sub_version (u32)     │
//! │ owner_id (u64)                                              │
//! │ segment_offset (u64) | slot_offset (u64)                    │
//! │ segment_size (u64)   | slot_size (u64)                      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian, with no padding. Offsets and sizes are
//! never validated: a range may overlap another or run past the end of the
//! file. Bytes past the physical end read as zero (see [`read_segment`]).

mod header;
mod segment;
mod writer;

pub use header::{read_header, Header, SegmentRange, HEADER_BYTES};
pub use segment::read_segment;
pub use writer::ContainerWriter;

use std::io;
use thiserror::Error;

/// Errors raised while reading a container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The input ended before the fixed-width header was complete.
    #[error("truncated header: expected {expected} bytes, found {found}")]
    Format { expected: usize, found: usize },

    /// A read failure other than end-of-file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
