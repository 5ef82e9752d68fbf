//! # RowStore - persisted canonical rows
//!
//! Flattened save values end up here. The store keeps one row per
//! `(idtype, unit_id, val_index, table_ty)` key, assigns each new key a
//! monotonically increasing `id`, and updates the value in place when a key
//! is seen again.
//!
//! Durability comes from an append-only log. Every insert or changed value
//! appends a full row image; replaying the log on [`RowStore::open`]
//! rebuilds the key index and the id-ordered row map. The last image of an
//! id wins.
//!
//! ## Binary Record Format
//!
//! ```text
//! [record_len: u32 LE][crc32: u32 LE][body ...]
//! ```
//!
//! Body: `[id: u64][idtype: u32][unit_id: u32][val_index: u32][value: u64][table_ty: u8]`
//!
//! `record_len` includes the 4-byte CRC but **not** itself.
//!
//! There is no transaction around a batch of upserts: rows appended before
//! a failure stay in the log, and since upserts are idempotent the same
//! import can simply be run again.
//!
//! ## Example
//!
//! ```rust,no_run
//! use codec::{Category, Cell};
//! use config::StoreConfig;
//! use rowstore::{CanonicalRow, RowSink, RowSource, RowStore};
//!
//! let mut store = RowStore::open(&StoreConfig::new("rows.log")).unwrap();
//! store.upsert(&CanonicalRow {
//!     idtype: 1,
//!     unit_id: 2,
//!     val_index: 0,
//!     value: Cell(1),
//!     table_ty: Category::Bool,
//! }).unwrap();
//!
//! for row in store.rows_by_id().unwrap() {
//!     println!("{} {:?}", row.id, row.row);
//! }
//! ```

mod log;
mod store;

pub use log::{RowLogReader, RowLogWriter, BODY_BYTES};
pub use store::RowStore;

use codec::{Category, Cell};
use std::io;
use thiserror::Error;

/// Errors raised by the row store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A record failed CRC validation, had an unexpected length, named an
    /// unknown category, or contradicted the key index.
    #[error("corrupt record")]
    Corrupt,
}

/// Uniqueness key of a persisted row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    pub idtype: u32,
    pub unit_id: u32,
    pub val_index: u32,
    pub table_ty: Category,
}

/// One flattened value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalRow {
    pub idtype: u32,
    pub unit_id: u32,
    /// Position of the value inside its unit.
    pub val_index: u32,
    pub value: Cell,
    pub table_ty: Category,
}

impl CanonicalRow {
    #[must_use]
    pub fn key(&self) -> RowKey {
        RowKey {
            idtype: self.idtype,
            unit_id: self.unit_id,
            val_index: self.val_index,
            table_ty: self.table_ty,
        }
    }
}

/// A canonical row plus the id assigned when its key was first stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedRow {
    pub id: u64,
    pub row: CanonicalRow,
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// New key, stored under a fresh id.
    Inserted(u64),
    /// Known key, value replaced.
    Updated(u64),
    /// Known key, value already identical.
    Unchanged(u64),
}

impl Upsert {
    #[must_use]
    pub fn id(&self) -> u64 {
        match *self {
            Upsert::Inserted(id) | Upsert::Updated(id) | Upsert::Unchanged(id) => id,
        }
    }
}

/// Destination for flattened rows.
pub trait RowSink {
    /// Inserts `row`, or updates the value of the row with the same key.
    fn upsert(&mut self, row: &CanonicalRow) -> Result<Upsert, StoreError>;

    /// Makes every accepted upsert durable.
    fn flush(&mut self) -> Result<(), StoreError>;
}

/// Ordered read access to persisted rows.
pub trait RowSource {
    /// All rows by ascending id.
    fn rows_by_id(&self) -> Result<Vec<PersistedRow>, StoreError>;
}
