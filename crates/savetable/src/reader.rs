use byteorder::{ByteOrder, LittleEndian};
use codec::{Category, Scalar, TypeDescriptor};

use crate::{UnitAccess, UnitTable, FIELD_IDTYPE, FIELD_UNIT_ID, FIELD_VALUE_DATA};

fn u16_at(buf: &[u8], pos: usize) -> Option<u16> {
    buf.get(pos..pos.checked_add(2)?).map(LittleEndian::read_u16)
}

fn u32_at(buf: &[u8], pos: usize) -> Option<u32> {
    buf.get(pos..pos.checked_add(4)?).map(LittleEndian::read_u32)
}

fn i32_at(buf: &[u8], pos: usize) -> Option<i32> {
    buf.get(pos..pos.checked_add(4)?).map(LittleEndian::read_i32)
}

/// Follows the u32 offset stored at `pos`.
fn follow(buf: &[u8], pos: usize) -> Option<usize> {
    let off = u32_at(buf, pos)? as usize;
    pos.checked_add(off)
}

/// A resolved table: position plus its validated vtable.
#[derive(Debug, Clone, Copy)]
struct Table {
    pos: usize,
    vtable: usize,
    vtable_len: usize,
}

impl Table {
    fn at(buf: &[u8], pos: usize) -> Option<Self> {
        let soffset = i64::from(i32_at(buf, pos)?);
        let vtable = usize::try_from(pos as i64 - soffset).ok()?;
        let vtable_len = usize::from(u16_at(buf, vtable)?);
        // vtable_len covers its own two u16 header fields
        if vtable_len < 4 || vtable.checked_add(vtable_len)? > buf.len() {
            return None;
        }
        Some(Self {
            pos,
            vtable,
            vtable_len,
        })
    }

    /// Absolute position of field `idx`, or `None` if the field is absent.
    fn field(&self, buf: &[u8], idx: usize) -> Option<usize> {
        let entry = 4 + 2 * idx;
        if entry + 2 > self.vtable_len {
            return None;
        }
        match u16_at(buf, self.vtable + entry)? {
            0 => None,
            off => self.pos.checked_add(usize::from(off)),
        }
    }

    /// Reads a u32 field. Absent fields yield `default`; a present field
    /// outside the buffer yields `None`.
    fn u32_field(&self, buf: &[u8], idx: usize, default: u32) -> Option<u32> {
        match self.field(buf, idx) {
            None => Some(default),
            Some(pos) => u32_at(buf, pos),
        }
    }
}

/// Read-only view over one segment's root table.
#[derive(Debug, Clone, Copy)]
pub struct SaveTable<'a> {
    buf: &'a [u8],
    root: Option<Table>,
}

impl<'a> SaveTable<'a> {
    /// Wraps a segment buffer. An unreadable root yields a table whose
    /// categories are all empty.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        let root = follow(buf, 0).and_then(|pos| Table::at(buf, pos));
        Self { buf, root }
    }

    /// Returns `true` if a root table was located.
    #[must_use]
    pub fn has_root(&self) -> bool {
        self.root.is_some()
    }

    /// The unit vector for `category`.
    #[must_use]
    pub fn units(&self, category: Category) -> UnitVector<'a> {
        let buf = self.buf;
        let resolved = self.root.and_then(|root| {
            let field = root.field(buf, category.index())?;
            let vec_pos = follow(buf, field)?;
            let declared = u32_at(buf, vec_pos)? as usize;
            let start = vec_pos + 4;
            // never index past the slots that actually exist
            let fits = (buf.len() - start) / 4;
            Some((start, declared.min(fits)))
        });
        let (start, len) = resolved.unwrap_or((0, 0));
        UnitVector {
            buf,
            descriptor: category.descriptor(),
            start,
            len,
        }
    }

    /// Total units across all categories, decodable or not.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        Category::ALL.iter().map(|&c| self.units(c).len()).sum()
    }
}

impl<'a> UnitTable<'a> for SaveTable<'a> {
    type Units = UnitVector<'a>;

    fn units(&self, category: Category) -> UnitVector<'a> {
        SaveTable::units(self, category)
    }
}

/// The units of one category.
#[derive(Debug, Clone, Copy)]
pub struct UnitVector<'a> {
    buf: &'a [u8],
    descriptor: &'static TypeDescriptor,
    start: usize,
    len: usize,
}

impl<'a> UnitVector<'a> {
    #[must_use]
    pub fn category(&self) -> Category {
        self.descriptor.category
    }

    fn decode(&self, index: usize) -> Option<UnitView<'a>> {
        let buf = self.buf;
        let slot = self.start + 4 * index;
        let table = Table::at(buf, follow(buf, slot)?)?;

        let idtype = table.u32_field(buf, FIELD_IDTYPE, 0)?;
        let unit_id = table.u32_field(buf, FIELD_UNIT_ID, 0)?;

        let (start, len) = match table.field(buf, FIELD_VALUE_DATA) {
            None => (0, 0),
            Some(field) => {
                let vec_pos = follow(buf, field)?;
                let len = u32_at(buf, vec_pos)? as usize;
                let start = vec_pos + 4;
                let bytes = len.checked_mul(self.descriptor.width)?;
                if start.checked_add(bytes)? > buf.len() {
                    return None;
                }
                (start, len)
            }
        };

        Some(UnitView {
            buf,
            descriptor: self.descriptor,
            idtype,
            unit_id,
            start,
            len,
        })
    }
}

impl<'a> UnitAccess<'a> for UnitVector<'a> {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> Option<UnitView<'a>> {
        if index >= self.len {
            return None;
        }
        self.decode(index)
    }
}

/// One decoded unit. The value vector is known to lie inside the buffer.
#[derive(Debug, Clone, Copy)]
pub struct UnitView<'a> {
    buf: &'a [u8],
    descriptor: &'static TypeDescriptor,
    idtype: u32,
    unit_id: u32,
    start: usize,
    len: usize,
}

impl<'a> UnitView<'a> {
    #[must_use]
    pub fn idtype(&self) -> u32 {
        self.idtype
    }

    #[must_use]
    pub fn unit_id(&self) -> u32 {
        self.unit_id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.descriptor.category
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value at `index` in native width.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<Scalar> {
        if index >= self.len {
            return None;
        }
        let pos = self.start + index * self.descriptor.width;
        self.descriptor.read_checked(self.buf.get(pos..)?)
    }

    /// All values in order.
    pub fn values(&self) -> impl Iterator<Item = Scalar> + 'a {
        let view = *self;
        (0..view.len).filter_map(move |i| view.value(i))
    }
}
