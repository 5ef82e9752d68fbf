//! # Codec - canonical 64-bit value cells
//!
//! Every scalar stored in a save table is flattened into a single `u64`
//! [`Cell`]. The conversion is bit-exact in both directions:
//!
//! | Category | Native | Cell encoding                               |
//! |----------|--------|---------------------------------------------|
//! | `Bool`   | bool   | `0` or `1`                                  |
//! | `Byte`   | i8     | sign-extended two's complement              |
//! | `UByte`  | u8     | zero-extended                               |
//! | `Short`  | i16    | sign-extended two's complement              |
//! | `UShort` | u16    | zero-extended                               |
//! | `Int`    | i32    | sign-extended two's complement              |
//! | `UInt`   | u32    | zero-extended                               |
//! | `Long`   | i64    | reinterpreted as u64                        |
//! | `ULong`  | u64    | unchanged                                   |
//! | `Float`  | f32    | raw IEEE-754 bits in the low 32 bits        |
//!
//! Floats are never widened to `f64`: NaN payloads, `-0.0` and infinities
//! survive a round trip untouched.
//!
//! The [`DESCRIPTORS`] table drives every per-category loop in the
//! workspace, in the fixed category order used by the save format.

mod descriptor;

pub use descriptor::{write_scalar, ScalarKind, TypeDescriptor, DESCRIPTORS};

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the ten scalar categories of a save table, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Category {
    Bool = 0,
    Byte = 1,
    UByte = 2,
    Short = 3,
    UShort = 4,
    Int = 5,
    UInt = 6,
    Long = 7,
    ULong = 8,
    Float = 9,
}

impl Category {
    /// All categories in enumeration order.
    pub const ALL: [Category; 10] = [
        Category::Bool,
        Category::Byte,
        Category::UByte,
        Category::Short,
        Category::UShort,
        Category::Int,
        Category::UInt,
        Category::Long,
        Category::ULong,
        Category::Float,
    ];

    /// The `table_ty` tag stored alongside each row.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Bool => "Bool",
            Category::Byte => "Byte",
            Category::UByte => "UByte",
            Category::Short => "Short",
            Category::UShort => "UShort",
            Category::Int => "Int",
            Category::UInt => "UInt",
            Category::Long => "Long",
            Category::ULong => "ULong",
            Category::Float => "Float",
        }
    }

    /// Position of this category in the root table (and in [`DESCRIPTORS`]).
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Category::index`].
    #[must_use]
    pub fn from_index(index: usize) -> Option<Category> {
        Category::ALL.get(index).copied()
    }

    /// Static layout information for this category.
    #[must_use]
    pub fn descriptor(self) -> &'static TypeDescriptor {
        &DESCRIPTORS[self.index()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a `table_ty` tag names no known category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown table_ty tag: {0:?}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// A decoded scalar in its native width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
}

impl Scalar {
    /// The category this scalar belongs to.
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Scalar::Bool(_) => Category::Bool,
            Scalar::Byte(_) => Category::Byte,
            Scalar::UByte(_) => Category::UByte,
            Scalar::Short(_) => Category::Short,
            Scalar::UShort(_) => Category::UShort,
            Scalar::Int(_) => Category::Int,
            Scalar::UInt(_) => Category::UInt,
            Scalar::Long(_) => Category::Long,
            Scalar::ULong(_) => Category::ULong,
            Scalar::Float(_) => Category::Float,
        }
    }

    /// Encodes the scalar into its canonical cell.
    #[must_use]
    pub fn to_cell(self) -> Cell {
        let raw = match self {
            Scalar::Bool(v) => u64::from(v),
            Scalar::Byte(v) => i64::from(v) as u64,
            Scalar::UByte(v) => u64::from(v),
            Scalar::Short(v) => i64::from(v) as u64,
            Scalar::UShort(v) => u64::from(v),
            Scalar::Int(v) => i64::from(v) as u64,
            Scalar::UInt(v) => u64::from(v),
            Scalar::Long(v) => v as u64,
            Scalar::ULong(v) => v,
            Scalar::Float(v) => u64::from(v.to_bits()),
        };
        Cell(raw)
    }
}

/// The canonical 64-bit storage cell for one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Cell(pub u64);

impl Cell {
    /// Raw cell bits.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Reinterprets the cell at the native width of `category`.
    ///
    /// Narrow categories truncate to their width, so a cell produced by
    /// [`Scalar::to_cell`] always decodes back to the original scalar.
    /// `Bool` treats any non-zero cell as `true`.
    #[must_use]
    pub fn decode(self, category: Category) -> Scalar {
        let raw = self.0;
        match category {
            Category::Bool => Scalar::Bool(raw != 0),
            Category::Byte => Scalar::Byte(raw as u8 as i8),
            Category::UByte => Scalar::UByte(raw as u8),
            Category::Short => Scalar::Short(raw as u16 as i16),
            Category::UShort => Scalar::UShort(raw as u16),
            Category::Int => Scalar::Int(raw as u32 as i32),
            Category::UInt => Scalar::UInt(raw as u32),
            Category::Long => Scalar::Long(raw as i64),
            Category::ULong => Scalar::ULong(raw),
            Category::Float => Scalar::Float(f32::from_bits((raw & 0xFFFF_FFFF) as u32)),
        }
    }
}

impl fmt::Display for Cell {
    /// Unsigned decimal, never re-signed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Scalar> for Cell {
    fn from(s: Scalar) -> Self {
        s.to_cell()
    }
}
