//! Export path: persisted rows -> CSV.

use rowstore::RowSource;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::PipelineError;

/// Column names of the export, in order.
pub const CSV_HEADER: [&str; 6] = ["id", "idtype", "unitid", "val_index", "value", "table_ty"];

/// Writes every row of `source` to `out` as CSV, ascending by id.
///
/// `value` is the raw cell as unsigned decimal; it is never re-signed or
/// read back as a float. Returns the number of records written, header
/// excluded.
pub fn write_csv<S, W>(source: &S, out: W) -> Result<u64, PipelineError>
where
    S: RowSource + ?Sized,
    W: Write,
{
    let rows = source.rows_by_id()?;

    let mut w = csv::Writer::from_writer(out);
    w.write_record(CSV_HEADER)?;

    let mut written = 0u64;
    for r in &rows {
        w.write_record([
            r.id.to_string(),
            r.row.idtype.to_string(),
            r.row.unit_id.to_string(),
            r.row.val_index.to_string(),
            r.row.value.to_string(),
            r.row.table_ty.as_str().to_string(),
        ])?;
        written += 1;
    }
    w.flush()?;

    Ok(written)
}

/// Creates (or truncates) `path` and writes the CSV export into it.
pub fn export_csv<S, P>(source: &S, path: P) -> Result<u64, PipelineError>
where
    S: RowSource + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path)?;
    let written = write_csv(source, BufWriter::new(file))?;
    info!(path = %path.display(), rows = written, "csv export written");
    Ok(written)
}
