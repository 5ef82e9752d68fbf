use codec::{write_scalar, Category, Scalar, TypeDescriptor};

use crate::ROOT_FIELDS;

const ROOT_VTABLE_LEN: u16 = 4 + 2 * ROOT_FIELDS as u16;
const ROOT_TABLE_LEN: u16 = 4 + 4 * ROOT_FIELDS as u16;
const UNIT_VTABLE_LEN: u16 = 4 + 2 * 3;
const UNIT_TABLE_LEN: u16 = 4 + 4 * 3;

#[derive(Debug, Clone)]
struct PendingUnit {
    idtype: u32,
    unit_id: u32,
    values: Vec<Scalar>,
}

/// Encodes units into a root-table buffer readable by [`SaveTable`](crate::SaveTable).
///
/// Every category vector is emitted, empty ones included, and all offsets
/// point forward. Value vectors are aligned to their element width.
#[derive(Debug, Clone, Default)]
pub struct SaveTableWriter {
    units: [Vec<PendingUnit>; ROOT_FIELDS],
}

impl SaveTableWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a unit under `category`.
    ///
    /// Each value is stored at the category's native width, going through
    /// its canonical cell, so a value of another category is truncated or
    /// extended exactly as the cell codec would do it.
    pub fn push(
        &mut self,
        category: Category,
        idtype: u32,
        unit_id: u32,
        values: &[Scalar],
    ) -> &mut Self {
        let values = values
            .iter()
            .map(|v| v.to_cell().decode(category))
            .collect();
        self.units[category.index()].push(PendingUnit {
            idtype,
            unit_id,
            values,
        });
        self
    }

    /// Serializes everything queued so far.
    #[must_use]
    pub fn finish(&self) -> Vec<u8> {
        let mut out = vec![0u8; 4];

        let root_vtable = out.len();
        put_u16(&mut out, ROOT_VTABLE_LEN);
        put_u16(&mut out, ROOT_TABLE_LEN);
        for i in 0..ROOT_FIELDS {
            put_u16(&mut out, (4 + 4 * i) as u16);
        }

        align(&mut out, 4);
        let root = out.len();
        put_u32(&mut out, (root - root_vtable) as u32);
        out.resize(root + usize::from(ROOT_TABLE_LEN), 0);
        patch_u32(&mut out, 0, root as u32);

        for (i, units) in self.units.iter().enumerate() {
            let field = root + 4 + 4 * i;
            align(&mut out, 4);
            let vec_pos = out.len();
            patch_u32(&mut out, field, (vec_pos - field) as u32);

            put_u32(&mut out, units.len() as u32);
            let slots = out.len();
            out.resize(slots + 4 * units.len(), 0);

            let descriptor = Category::ALL[i].descriptor();
            for (j, unit) in units.iter().enumerate() {
                let slot = slots + 4 * j;
                let table = write_unit(&mut out, descriptor, unit);
                patch_u32(&mut out, slot, (table - slot) as u32);
            }
        }

        out
    }
}

/// Writes one unit (vtable, table, value vector) and returns the table position.
fn write_unit(out: &mut Vec<u8>, descriptor: &TypeDescriptor, unit: &PendingUnit) -> usize {
    align(out, 4);
    let vtable = out.len();
    put_u16(out, UNIT_VTABLE_LEN);
    put_u16(out, UNIT_TABLE_LEN);
    put_u16(out, 4); // idtype
    put_u16(out, 8); // unit_id
    put_u16(out, 12); // value_data

    align(out, 4);
    let table = out.len();
    put_u32(out, (table - vtable) as u32);
    put_u32(out, unit.idtype);
    put_u32(out, unit.unit_id);
    let field = out.len();
    put_u32(out, 0);

    // elements start right after the length prefix
    align(out, 4);
    if (out.len() + 4) % descriptor.width.max(4) != 0 {
        out.extend_from_slice(&[0u8; 4]);
    }
    let vec_pos = out.len();
    patch_u32(out, field, (vec_pos - field) as u32);
    put_u32(out, unit.values.len() as u32);
    for v in &unit.values {
        write_scalar(*v, out);
    }

    table
}

fn put_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn patch_u32(out: &mut [u8], pos: usize, v: u32) {
    out[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
}

fn align(out: &mut Vec<u8>, to: usize) {
    while out.len() % to != 0 {
        out.push(0);
    }
}
