//! End-to-end tests driving the built `saverows` binary.

use codec::{Category, Scalar};
use container::ContainerWriter;
use savetable::SaveTableWriter;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

/// Runs the binary with the store at `store`, logging kept quiet.
fn run_saverows(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_saverows"))
        .args(args)
        .env("SAVEROWS_STORE", store)
        .env("SAVEROWS_LOG", "warn")
        .output()
        .expect("failed to spawn saverows")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn sample_container(path: &Path) {
    let mut segment = SaveTableWriter::new();
    segment
        .push(Category::Bool, 1, 2, &[Scalar::Bool(true), Scalar::Bool(false)])
        .push(Category::Float, 3, 4, &[Scalar::Float(1.5)]);

    ContainerWriter::new()
        .versions(1, 0)
        .segment(segment.finish())
        .slot(SaveTableWriter::new().finish())
        .write_to_path(path)
        .unwrap();
}

#[test]
fn import_then_export() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("rows.log");
    let input = dir.path().join("SaveData1.dat");
    let output = dir.path().join("dump.csv");
    sample_container(&input);

    let out = run_saverows(&store, &["import", input.to_str().unwrap()]);
    assert!(out.status.success(), "import failed: {out:?}");
    assert_eq!(stdout(&out).trim(), "Import completed, 3 rows written");

    let out = run_saverows(&store, &["export", output.to_str().unwrap()]);
    assert!(out.status.success(), "export failed: {out:?}");
    assert_eq!(
        stdout(&out).trim(),
        format!("CSV export completed -> {}", output.display())
    );

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "id,idtype,unitid,val_index,value,table_ty\n\
         1,1,2,0,1,Bool\n\
         2,1,2,1,0,Bool\n\
         3,3,4,0,1069547520,Float\n"
    );
}

#[test]
fn repeated_import_does_not_duplicate_rows() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("rows.log");
    let input = dir.path().join("SaveData1.dat");
    let output = dir.path().join("dump.csv");
    sample_container(&input);

    for _ in 0..3 {
        let out = run_saverows(&store, &["import", input.to_str().unwrap()]);
        assert!(out.status.success());
        assert!(stdout(&out).contains("3 rows written"));
    }

    let out = run_saverows(&store, &["export", output.to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 4);
}

#[test]
fn export_of_fresh_store_is_header_only() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("nested").join("rows.log");
    let output = dir.path().join("dump.csv");

    let out = run_saverows(&store, &["export", output.to_str().unwrap()]);
    assert!(out.status.success());
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "id,idtype,unitid,val_index,value,table_ty\n"
    );
}

#[test]
fn truncated_header_exits_with_failure() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("rows.log");
    let input = dir.path().join("short.dat");
    fs::write(&input, [0u8; 20]).unwrap();

    let out = run_saverows(&store, &["import", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("ERROR"));
}

#[test]
fn missing_input_exits_with_failure() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("rows.log");
    let input = dir.path().join("does-not-exist.dat");

    let out = run_saverows(&store, &["import", input.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn bad_usage_touches_nothing() {
    let dir = tempdir().unwrap();
    let store = dir.path().join("rows.log");

    for args in [&[][..], &["import"][..], &["frobnicate", "x"][..], &["export", "a", "b"][..]] {
        let out = run_saverows(&store, args);
        assert_eq!(out.status.code(), Some(2), "args {args:?}");
    }
    assert!(!store.exists());
}
