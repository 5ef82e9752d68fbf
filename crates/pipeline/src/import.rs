//! Import path: container file -> header -> segments -> rows.

use container::{read_header, read_segment, Header};
use rowstore::RowSink;
use savetable::SaveTable;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::info;

use crate::{flatten_segment, PipelineError, SegmentReport};

/// Result of importing one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub header: Header,
    /// Main segment ("A").
    pub segment: SegmentReport,
    /// Slot segment ("B").
    pub slot: SegmentReport,
}

impl ImportReport {
    /// Rows processed across both segments.
    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.segment.rows + self.slot.rows
    }

    #[must_use]
    pub fn skipped_units(&self) -> u64 {
        self.segment.skipped_units + self.slot.skipped_units
    }
}

/// Imports the container at `path` into `sink`.
///
/// The file is opened for the duration of the call only.
///
/// # Errors
///
/// See [`import_from`]; failing to open `path` is [`PipelineError::Io`].
pub fn import_container<P, S>(path: P, sink: &mut S) -> Result<ImportReport, PipelineError>
where
    P: AsRef<Path>,
    S: RowSink + ?Sized,
{
    let path = path.as_ref();
    info!(path = %path.display(), "importing container");
    let mut file = File::open(path)?;
    import_from(&mut file, sink)
}

/// Imports a container from any seekable reader.
///
/// Both segments are read in full before decoding starts. The main segment
/// is flattened before the slot segment, then the sink is flushed.
///
/// # Errors
///
/// - Truncated header -> [`PipelineError::Container`] (format).
/// - Non-EOF read failure -> [`PipelineError::Container`] (io).
/// - Sink failure -> [`PipelineError::Persistence`]; earlier rows remain.
pub fn import_from<R, S>(reader: &mut R, sink: &mut S) -> Result<ImportReport, PipelineError>
where
    R: Read + Seek,
    S: RowSink + ?Sized,
{
    let header = read_header(reader)?;
    info!(
        main_version = header.main_version,
        sub_version = header.sub_version,
        owner_id = header.owner_id,
        segment_offset = header.segment_offset,
        segment_size = header.segment_size,
        slot_offset = header.slot_offset,
        slot_size = header.slot_size,
        "container header"
    );

    let (a, b) = (header.segment(), header.slot());
    let segment = read_segment(reader, a.offset, a.size)?;
    let slot = read_segment(reader, b.offset, b.size)?;

    let segment_report = flatten_segment(&SaveTable::new(&segment), sink)?;
    info!(
        rows = segment_report.rows,
        skipped_units = segment_report.skipped_units,
        "main segment flattened"
    );

    let slot_report = flatten_segment(&SaveTable::new(&slot), sink)?;
    info!(
        rows = slot_report.rows,
        skipped_units = slot_report.skipped_units,
        "slot segment flattened"
    );

    sink.flush()?;

    Ok(ImportReport {
        header,
        segment: segment_report,
        slot: slot_report,
    })
}
