//! # Pipeline - save container import and CSV export
//!
//! Ties the [`container`], [`savetable`], [`codec`] and [`rowstore`] crates
//! together.
//!
//! ## Import
//!
//! ```text
//! container file
//!   |
//!   v
//! read_header ──> segment range, slot range
//!   |
//!   v
//! read_segment × 2  (EOF-tolerant, zero-filled)
//!   |
//!   v
//! SaveTable::new(segment) ──> flatten_segment ──┐
//! SaveTable::new(slot)    ──> flatten_segment ──┤
//!                                               v
//!                                     RowSink::upsert (one row at a time)
//! ```
//!
//! The main segment is always flattened before the slot segment, and within
//! a segment categories follow [`codec::DESCRIPTORS`] order, so first-seen
//! row ids are deterministic.
//!
//! ## Export
//!
//! [`RowSource::rows_by_id`](rowstore::RowSource::rows_by_id) ──> CSV with
//! header `id,idtype,unitid,val_index,value,table_ty`.
//!
//! ## Module Responsibilities
//!
//! | Module      | Purpose                                       |
//! |-------------|-----------------------------------------------|
//! | [`flatten`] | Units -> canonical rows -> sink               |
//! | [`import`]  | File handling, header, segments, report       |
//! | [`export`]  | Ordered rows -> CSV                           |

pub mod export;
pub mod flatten;
pub mod import;

pub use export::{export_csv, write_csv, CSV_HEADER};
pub use flatten::{flatten_segment, SegmentReport};
pub use import::{import_container, import_from, ImportReport};

use container::ContainerError;
use rowstore::StoreError;
use std::io;
use thiserror::Error;

/// Fatal pipeline errors.
///
/// An undecodable unit is not an error: it is skipped and counted in
/// [`SegmentReport::skipped_units`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Truncated header or container read failure.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// The row store rejected an upsert or read.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Opening the input or writing the output failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The CSV writer failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl PipelineError {
    /// `true` for a header shorter than its fixed width.
    #[must_use]
    pub fn is_format(&self) -> bool {
        matches!(self, PipelineError::Container(ContainerError::Format { .. }))
    }
}

#[cfg(test)]
mod tests;
