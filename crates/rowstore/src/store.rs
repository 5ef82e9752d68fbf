use config::StoreConfig;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::log::{RowLogReader, RowLogWriter};
use crate::{CanonicalRow, PersistedRow, RowKey, RowSink, RowSource, StoreError, Upsert};

/// In-memory view of the log: key index plus id-ordered rows.
#[derive(Debug, Default)]
struct RowIndex {
    keys: BTreeMap<RowKey, u64>,
    rows: BTreeMap<u64, CanonicalRow>,
    /// Id handed to the next new key. Ids start at 1.
    next_id: u64,
}

impl RowIndex {
    fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    /// Applies a replayed row image, checking it against what is known.
    fn apply(&mut self, rec: PersistedRow) -> Result<(), StoreError> {
        let key = rec.row.key();
        // a key may only ever live under one id, and an id under one key
        if matches!(self.keys.get(&key), Some(&existing) if existing != rec.id) {
            return Err(StoreError::Corrupt);
        }
        if matches!(self.rows.get(&rec.id), Some(old) if old.key() != key) {
            return Err(StoreError::Corrupt);
        }
        self.insert(rec.id, rec.row);
        self.next_id = self.next_id.max(rec.id.saturating_add(1));
        Ok(())
    }

    fn insert(&mut self, id: u64, row: CanonicalRow) {
        self.keys.insert(row.key(), id);
        self.rows.insert(id, row);
    }
}

/// File-backed row store.
///
/// # Write Path
///
/// 1. Look the key up in the in-memory index.
/// 2. Unknown key: take the next id. Known key with a different value: keep
///    its id. Known key with the same value: nothing to do.
/// 3. Append the row image to the log, then apply it in memory.
///
/// # Recovery
///
/// [`RowStore::open`] replays the log before opening it for append. A
/// truncated tail record is cut off so later appends start on a record
/// boundary.
pub struct RowStore {
    path: PathBuf,
    writer: RowLogWriter,
    index: RowIndex,
}

impl std::fmt::Debug for RowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStore")
            .field("path", &self.path)
            .field("rows", &self.index.rows.len())
            .field("next_id", &self.index.next_id)
            .finish()
    }
}

impl RowStore {
    /// Opens the store described by `config`, replaying any existing log.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures and [`StoreError::Corrupt`] from replay.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let path = config.path.clone();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let index = recover(&path)?;
        let writer = RowLogWriter::create(&path, config.sync)?;

        debug!(path = %path.display(), rows = index.rows.len(), "row store opened");
        Ok(Self {
            path,
            writer,
            index,
        })
    }

    /// Current row for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &RowKey) -> Option<PersistedRow> {
        let id = *self.index.keys.get(key)?;
        self.index.rows.get(&id).map(|row| PersistedRow { id, row: *row })
    }

    /// Number of distinct keys stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.rows.is_empty()
    }
}

/// Replays the log at `path` (if any) and trims a truncated tail.
fn recover(path: &Path) -> Result<RowIndex, StoreError> {
    let mut index = RowIndex::new();

    let mut reader = match RowLogReader::open(path) {
        Ok(r) => r,
        // no log yet -> fresh store
        Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => return Ok(index),
        Err(e) => return Err(e),
    };
    let valid = reader.replay(|rec| index.apply(rec))?;
    drop(reader);

    let file_len = std::fs::metadata(path)?.len();
    if valid < file_len {
        warn!(
            path = %path.display(),
            dropped = file_len - valid,
            "discarding truncated tail of row log"
        );
        OpenOptions::new().write(true).open(path)?.set_len(valid)?;
    }

    Ok(index)
}

impl RowSink for RowStore {
    fn upsert(&mut self, row: &CanonicalRow) -> Result<Upsert, StoreError> {
        let (id, outcome) = match self.index.keys.get(&row.key()) {
            Some(&id) => {
                if self.index.rows.get(&id).map(|r| r.value) == Some(row.value) {
                    return Ok(Upsert::Unchanged(id));
                }
                (id, Upsert::Updated(id))
            }
            None => (self.index.next_id, Upsert::Inserted(self.index.next_id)),
        };

        self.writer.append(&PersistedRow { id, row: *row })?;

        self.index.insert(id, *row);
        if matches!(outcome, Upsert::Inserted(_)) {
            self.index.next_id += 1;
        }
        Ok(outcome)
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.writer.sync_to_disk()
    }
}

impl RowSource for RowStore {
    fn rows_by_id(&self) -> Result<Vec<PersistedRow>, StoreError> {
        Ok(self
            .index
            .rows
            .iter()
            .map(|(&id, row)| PersistedRow { id, row: *row })
            .collect())
    }
}
