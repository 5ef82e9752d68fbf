//! Static per-category layout table.

use byteorder::{ByteOrder, LittleEndian};

use crate::{Category, Scalar};

/// How the bits of a native value are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Signed,
    Unsigned,
    Float,
}

/// Native layout of one category's values inside a save table.
pub struct TypeDescriptor {
    pub category: Category,
    /// Element width in bytes as stored in a value vector.
    pub width: usize,
    pub kind: ScalarKind,
    /// Reads one little-endian element. `bytes` must hold at least `width` bytes.
    pub read: fn(&[u8]) -> Scalar,
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("category", &self.category)
            .field("width", &self.width)
            .field("kind", &self.kind)
            .finish()
    }
}

impl TypeDescriptor {
    /// Native width in bits (`Bool` is stored in a byte but carries one bit).
    #[must_use]
    pub fn bits(&self) -> u32 {
        match self.kind {
            ScalarKind::Bool => 1,
            _ => (self.width * 8) as u32,
        }
    }

    /// Reads one element, or `None` if `bytes` is shorter than `width`.
    #[must_use]
    pub fn read_checked(&self, bytes: &[u8]) -> Option<Scalar> {
        if bytes.len() < self.width {
            return None;
        }
        Some((self.read)(&bytes[..self.width]))
    }
}

fn read_bool(b: &[u8]) -> Scalar {
    Scalar::Bool(b[0] != 0)
}

fn read_byte(b: &[u8]) -> Scalar {
    Scalar::Byte(b[0] as i8)
}

fn read_ubyte(b: &[u8]) -> Scalar {
    Scalar::UByte(b[0])
}

fn read_short(b: &[u8]) -> Scalar {
    Scalar::Short(LittleEndian::read_i16(b))
}

fn read_ushort(b: &[u8]) -> Scalar {
    Scalar::UShort(LittleEndian::read_u16(b))
}

fn read_int(b: &[u8]) -> Scalar {
    Scalar::Int(LittleEndian::read_i32(b))
}

fn read_uint(b: &[u8]) -> Scalar {
    Scalar::UInt(LittleEndian::read_u32(b))
}

fn read_long(b: &[u8]) -> Scalar {
    Scalar::Long(LittleEndian::read_i64(b))
}

fn read_ulong(b: &[u8]) -> Scalar {
    Scalar::ULong(LittleEndian::read_u64(b))
}

// Bits go straight through u32 so no float arithmetic touches them.
fn read_float(b: &[u8]) -> Scalar {
    Scalar::Float(f32::from_bits(LittleEndian::read_u32(b)))
}

/// One entry per [`Category`], in enumeration order.
pub static DESCRIPTORS: [TypeDescriptor; 10] = [
    TypeDescriptor {
        category: Category::Bool,
        width: 1,
        kind: ScalarKind::Bool,
        read: read_bool,
    },
    TypeDescriptor {
        category: Category::Byte,
        width: 1,
        kind: ScalarKind::Signed,
        read: read_byte,
    },
    TypeDescriptor {
        category: Category::UByte,
        width: 1,
        kind: ScalarKind::Unsigned,
        read: read_ubyte,
    },
    TypeDescriptor {
        category: Category::Short,
        width: 2,
        kind: ScalarKind::Signed,
        read: read_short,
    },
    TypeDescriptor {
        category: Category::UShort,
        width: 2,
        kind: ScalarKind::Unsigned,
        read: read_ushort,
    },
    TypeDescriptor {
        category: Category::Int,
        width: 4,
        kind: ScalarKind::Signed,
        read: read_int,
    },
    TypeDescriptor {
        category: Category::UInt,
        width: 4,
        kind: ScalarKind::Unsigned,
        read: read_uint,
    },
    TypeDescriptor {
        category: Category::Long,
        width: 8,
        kind: ScalarKind::Signed,
        read: read_long,
    },
    TypeDescriptor {
        category: Category::ULong,
        width: 8,
        kind: ScalarKind::Unsigned,
        read: read_ulong,
    },
    TypeDescriptor {
        category: Category::Float,
        width: 4,
        kind: ScalarKind::Float,
        read: read_float,
    },
];

/// Writes `scalar` as a little-endian element of its native width.
pub fn write_scalar(scalar: Scalar, out: &mut Vec<u8>) {
    match scalar {
        Scalar::Bool(v) => out.push(u8::from(v)),
        Scalar::Byte(v) => out.push(v as u8),
        Scalar::UByte(v) => out.push(v),
        Scalar::Short(v) => out.extend_from_slice(&v.to_le_bytes()),
        Scalar::UShort(v) => out.extend_from_slice(&v.to_le_bytes()),
        Scalar::Int(v) => out.extend_from_slice(&v.to_le_bytes()),
        Scalar::UInt(v) => out.extend_from_slice(&v.to_le_bytes()),
        Scalar::Long(v) => out.extend_from_slice(&v.to_le_bytes()),
        Scalar::ULong(v) => out.extend_from_slice(&v.to_le_bytes()),
        Scalar::Float(v) => out.extend_from_slice(&v.to_bits().to_le_bytes()),
    }
}
