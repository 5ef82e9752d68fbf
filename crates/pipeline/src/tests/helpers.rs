use codec::Category;
use config::StoreConfig;
use container::ContainerWriter;
use rowstore::{CanonicalRow, RowSink, RowStore, StoreError, Upsert};
use savetable::{SaveTable, SaveTableWriter, UnitAccess, UnitTable, UnitVector, UnitView};
use std::io;
use std::path::Path;

/// Serializes a container with the given main and slot tables.
pub fn container_bytes(segment: &SaveTableWriter, slot: &SaveTableWriter) -> Vec<u8> {
    ContainerWriter::new()
        .versions(1, 0)
        .owner(76_561_198_000_000_000)
        .segment(segment.finish())
        .slot(slot.finish())
        .to_bytes()
}

pub fn write_container(path: &Path, segment: &SaveTableWriter, slot: &SaveTableWriter) {
    std::fs::write(path, container_bytes(segment, slot)).unwrap();
}

pub fn open_store(path: &Path) -> RowStore {
    RowStore::open(&StoreConfig::new(path)).unwrap()
}

/// Sink that records every row in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub rows: Vec<CanonicalRow>,
    pub flushed: bool,
}

impl RowSink for RecordingSink {
    fn upsert(&mut self, row: &CanonicalRow) -> Result<Upsert, StoreError> {
        self.rows.push(*row);
        Ok(Upsert::Inserted(self.rows.len() as u64))
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.flushed = true;
        Ok(())
    }
}

/// Forwards to `inner` until `remaining` upserts have been accepted, then fails.
pub struct FailAfter<S> {
    pub inner: S,
    pub remaining: usize,
}

impl<S: RowSink> RowSink for FailAfter<S> {
    fn upsert(&mut self, row: &CanonicalRow) -> Result<Upsert, StoreError> {
        if self.remaining == 0 {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "store went away",
            )));
        }
        self.remaining -= 1;
        self.inner.upsert(row)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.inner.flush()
    }
}

/// A save table whose accessor fails for chosen `(category, index)` pairs.
pub struct MaskedTable<'a> {
    pub inner: SaveTable<'a>,
    pub fail: Vec<(Category, usize)>,
}

pub struct MaskedUnits<'a> {
    inner: UnitVector<'a>,
    fail: Vec<usize>,
}

impl<'a> UnitAccess<'a> for MaskedUnits<'a> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn get(&self, index: usize) -> Option<UnitView<'a>> {
        if self.fail.contains(&index) {
            return None;
        }
        self.inner.get(index)
    }
}

impl<'a> UnitTable<'a> for MaskedTable<'a> {
    type Units = MaskedUnits<'a>;

    fn units(&self, category: Category) -> MaskedUnits<'a> {
        MaskedUnits {
            inner: self.inner.units(category),
            fail: self
                .fail
                .iter()
                .filter(|(c, _)| *c == category)
                .map(|&(_, i)| i)
                .collect(),
        }
    }
}
