//! Flattening: one canonical row per value of every decodable unit.

use codec::DESCRIPTORS;
use rowstore::{CanonicalRow, RowSink};
use savetable::{UnitAccess, UnitTable};
use tracing::debug;

use crate::PipelineError;

/// Outcome of flattening one segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentReport {
    /// Rows handed to the sink (inserted, updated or unchanged).
    pub rows: u64,
    /// Units whose accessor returned nothing.
    pub skipped_units: u64,
}

/// Walks `table` in category order and upserts every value into `sink`.
///
/// Units that fail to decode contribute no rows and do not stop the walk.
/// The first sink error aborts; rows already upserted stay where they are.
pub fn flatten_segment<'a, T, S>(table: &T, sink: &mut S) -> Result<SegmentReport, PipelineError>
where
    T: UnitTable<'a> + ?Sized,
    S: RowSink + ?Sized,
{
    let mut report = SegmentReport::default();

    for descriptor in DESCRIPTORS.iter() {
        let category = descriptor.category;
        let units = table.units(category);

        for index in 0..units.len() {
            let Some(unit) = units.get(index) else {
                debug!(%category, index, "skipping undecodable unit");
                report.skipped_units += 1;
                continue;
            };

            for val_index in 0..unit.len() {
                let Some(value) = unit.value(val_index) else {
                    continue;
                };
                sink.upsert(&CanonicalRow {
                    idtype: unit.idtype(),
                    unit_id: unit.unit_id(),
                    val_index: val_index as u32,
                    value: value.to_cell(),
                    table_ty: category,
                })?;
                report.rows += 1;
            }
        }
    }

    Ok(report)
}
