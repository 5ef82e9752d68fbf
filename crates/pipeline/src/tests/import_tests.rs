use super::helpers::{container_bytes, open_store, write_container, FailAfter, RecordingSink};
use crate::*;
use anyhow::Result;
use codec::{Category, Cell, Scalar};
use container::{ContainerWriter, HEADER_BYTES};
use rowstore::RowSource;
use savetable::SaveTableWriter;
use std::io::Cursor;
use tempfile::tempdir;

fn spec_segment() -> SaveTableWriter {
    let mut w = SaveTableWriter::new();
    w.push(Category::Bool, 1, 2, &[Scalar::Bool(true), Scalar::Bool(false)])
        .push(Category::Float, 3, 4, &[Scalar::Float(1.5)]);
    w
}

// --------------------- End to end ---------------------

#[test]
fn bool_and_float_units_import_three_rows() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("SaveData1.dat");
    let output = dir.path().join("dump.csv");

    let bytes = ContainerWriter::new()
        .segment(spec_segment().finish())
        .slot(Vec::new())
        .to_bytes();
    std::fs::write(&input, bytes)?;

    let mut store = open_store(&dir.path().join("rows.log"));
    let report = import_container(&input, &mut store)?;
    assert_eq!(report.total_rows(), 3);
    assert_eq!(report.slot, SegmentReport::default());

    export_csv(&store, &output)?;
    let csv = std::fs::read_to_string(&output)?;
    assert_eq!(
        csv,
        "id,idtype,unitid,val_index,value,table_ty\n\
         1,1,2,0,1,Bool\n\
         2,1,2,1,0,Bool\n\
         3,3,4,0,1069547520,Float\n"
    );
    Ok(())
}

#[test]
fn main_segment_rows_precede_slot_rows() -> Result<()> {
    let mut segment = SaveTableWriter::new();
    segment.push(Category::Float, 10, 1, &[Scalar::Float(2.0)]);
    let mut slot = SaveTableWriter::new();
    slot.push(Category::Bool, 20, 1, &[Scalar::Bool(true)])
        .push(Category::Long, 20, 2, &[Scalar::Long(-1)]);

    let mut sink = RecordingSink::default();
    let report = import_from(&mut Cursor::new(container_bytes(&segment, &slot)), &mut sink)?;

    assert_eq!(report.segment.rows, 1);
    assert_eq!(report.slot.rows, 2);
    assert_eq!(report.total_rows(), 3);
    assert!(sink.flushed);

    let tys: Vec<Category> = sink.rows.iter().map(|r| r.table_ty).collect();
    assert_eq!(tys, vec![Category::Float, Category::Bool, Category::Long]);
    Ok(())
}

#[test]
fn header_fields_are_reported() -> Result<()> {
    let bytes = container_bytes(&spec_segment(), &SaveTableWriter::new());
    let mut sink = RecordingSink::default();
    let report = import_from(&mut Cursor::new(bytes), &mut sink)?;

    assert_eq!(report.header.main_version, 1);
    assert_eq!(report.header.owner_id, 76_561_198_000_000_000);
    assert_eq!(report.header.segment_offset, HEADER_BYTES as u64);
    Ok(())
}

// --------------------- Idempotence ---------------------

#[test]
fn importing_twice_changes_nothing() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("SaveData1.dat");

    let mut slot = SaveTableWriter::new();
    slot.push(Category::Byte, 5, 5, &[Scalar::Byte(i8::MIN), Scalar::Byte(-1)]);
    write_container(&input, &spec_segment(), &slot);

    let mut store = open_store(&dir.path().join("rows.log"));
    let first = import_container(&input, &mut store)?;
    let after_first = store.rows_by_id()?;

    let second = import_container(&input, &mut store)?;
    let after_second = store.rows_by_id()?;

    assert_eq!(first.total_rows(), 5);
    assert_eq!(second.total_rows(), 5);
    assert_eq!(after_first, after_second);
    Ok(())
}

#[test]
fn reimport_into_reopened_store_keeps_ids() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("SaveData1.dat");
    let log = dir.path().join("rows.log");
    write_container(&input, &spec_segment(), &SaveTableWriter::new());

    let before = {
        let mut store = open_store(&log);
        import_container(&input, &mut store)?;
        store.rows_by_id()?
    };

    let mut store = open_store(&log);
    import_container(&input, &mut store)?;
    assert_eq!(store.rows_by_id()?, before);
    Ok(())
}

#[test]
fn changed_value_updates_in_place() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("SaveData1.dat");
    let mut store = open_store(&dir.path().join("rows.log"));

    let mut v1 = SaveTableWriter::new();
    v1.push(Category::UShort, 1, 1, &[Scalar::UShort(1), Scalar::UShort(2)]);
    write_container(&input, &v1, &SaveTableWriter::new());
    import_container(&input, &mut store)?;

    let mut v2 = SaveTableWriter::new();
    v2.push(Category::UShort, 1, 1, &[Scalar::UShort(1), Scalar::UShort(9)]);
    write_container(&input, &v2, &SaveTableWriter::new());
    import_container(&input, &mut store)?;

    let rows = store.rows_by_id()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].id, 2);
    assert_eq!(rows[1].row.value, Cell(9));
    Ok(())
}

// --------------------- Damaged containers ---------------------

#[test]
fn short_header_is_format_error() {
    let bytes = vec![0u8; HEADER_BYTES - 10];
    let mut sink = RecordingSink::default();
    let err = import_from(&mut Cursor::new(bytes), &mut sink).unwrap_err();
    assert!(err.is_format());
    assert!(sink.rows.is_empty());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let mut sink = RecordingSink::default();
    let err = import_container(dir.path().join("nope.dat"), &mut sink).unwrap_err();
    assert!(matches!(err, PipelineError::Io(_)));
}

#[test]
fn truncated_container_is_zero_filled_not_fatal() -> Result<()> {
    let mut bytes = container_bytes(&spec_segment(), &SaveTableWriter::new());
    // cut the slot segment entirely; its declared range now lies past EOF
    let slot_len = SaveTableWriter::new().finish().len();
    bytes.truncate(bytes.len() - slot_len);

    let mut sink = RecordingSink::default();
    let report = import_from(&mut Cursor::new(bytes), &mut sink)?;
    assert_eq!(report.segment.rows, 3);
    assert_eq!(report.slot.rows, 0);
    Ok(())
}

#[test]
fn oversized_segment_range_still_decodes() -> Result<()> {
    let writer = ContainerWriter::new().segment(spec_segment().finish());
    let mut header = writer.header();
    header.segment_size += 4096;

    let mut bytes = Vec::new();
    header.write_to(&mut bytes)?;
    bytes.extend_from_slice(&spec_segment().finish());

    let mut sink = RecordingSink::default();
    let report = import_from(&mut Cursor::new(bytes), &mut sink)?;
    assert_eq!(report.total_rows(), 3);
    Ok(())
}

#[test]
fn failed_import_keeps_committed_rows_and_rerun_completes() -> Result<()> {
    let dir = tempdir()?;
    let input = dir.path().join("SaveData1.dat");
    let log = dir.path().join("rows.log");
    write_container(&input, &spec_segment(), &SaveTableWriter::new());

    {
        let mut sink = FailAfter {
            inner: open_store(&log),
            remaining: 2,
        };
        let err = import_container(&input, &mut sink).unwrap_err();
        assert!(matches!(err, PipelineError::Persistence(_)));
    }

    let mut store = open_store(&log);
    assert_eq!(store.len(), 2);

    let report = import_container(&input, &mut store)?;
    assert_eq!(report.total_rows(), 3);
    let ids: Vec<u64> = store.rows_by_id()?.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    Ok(())
}
