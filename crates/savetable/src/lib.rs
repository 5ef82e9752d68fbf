//! # SaveTable - typed unit tables inside a container segment
//!
//! Each segment of a save container is a FlatBuffers root table with one
//! vector per scalar [`Category`], in category order. Every vector element is
//! a *unit*: an `(idtype, unit_id)` pair plus a vector of scalars of that
//! category's native type.
//!
//! ## Wire layout
//!
//! ```text
//! buf[0..4]           root offset (u32 LE, from 0)
//!
//! table:   soffset (i32)        vtable = table - soffset
//! vtable:  vtable_len (u16) | table_len (u16) | field_off (u16) × N
//!          field_off == 0 or beyond vtable_len -> field absent
//! field:   scalars inline, vectors/tables as u32 offset from the field
//! vector:  len (u32) | elements (packed scalars or u32 table offsets)
//! ```
//!
//! | Table | Field 0      | Field 1       | Field 2          | …   |
//! |-------|--------------|---------------|------------------|-----|
//! | root  | `[BoolUnit]` | `[ByteUnit]`  | `[UByteUnit]`    | … 10 fields in category order |
//! | unit  | `idtype: u32`| `unit_id: u32`| `value_data: [T]`|     |
//!
//! ## Failure policy
//!
//! [`SaveTable::new`] never fails. Every offset is bounds-checked as it is
//! followed: a category vector that cannot be resolved reads as empty, and a
//! unit that cannot be resolved makes [`UnitAccess::get`] return `None`. The
//! caller skips that unit and moves on.

mod reader;
mod writer;

pub use reader::{SaveTable, UnitVector, UnitView};
pub use writer::SaveTableWriter;

use codec::Category;

/// Number of fields in the root table, one per category.
pub const ROOT_FIELDS: usize = 10;

pub(crate) const FIELD_IDTYPE: usize = 0;
pub(crate) const FIELD_UNIT_ID: usize = 1;
pub(crate) const FIELD_VALUE_DATA: usize = 2;

/// Indexed access to the units of one category.
///
/// `get` returns `None` when the unit at `index` cannot be decoded (or the
/// index is out of range). That is a skip, not an error.
pub trait UnitAccess<'a> {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<UnitView<'a>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Something that exposes one [`UnitAccess`] per category.
pub trait UnitTable<'a> {
    type Units: UnitAccess<'a>;

    fn units(&self, category: Category) -> Self::Units;
}
