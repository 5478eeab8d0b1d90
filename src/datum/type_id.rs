//! Type identifiers and per-type limits.

use std::fmt;

/// Length sentinel marking a value as NULL, independent of its payload.
pub const VALUE_NULL: u32 = u32::MAX;

/// Length prefix marking a variable-length object as NULL in serialized form.
pub const OBJECT_LENGTH_NULL: i32 = -1;

/// Largest representable variable-length payload.
pub const VARCHAR_MAX_LEN: u32 = u32::MAX;

// The native minimum of every signed width is reserved as its NULL sentinel,
// so the usable range starts one above it.
pub const INT8_NULL: i8 = i8::MIN;
pub const INT16_NULL: i16 = i16::MIN;
pub const INT32_NULL: i32 = i32::MIN;
pub const INT64_NULL: i64 = i64::MIN;
pub const DECIMAL_NULL: f64 = f64::MIN;
pub const TIMESTAMP_NULL: u64 = u64::MAX;
pub const BOOLEAN_NULL: i8 = i8::MIN;

pub const INT8_MIN: i8 = i8::MIN + 1;
pub const INT16_MIN: i16 = i16::MIN + 1;
pub const INT32_MIN: i32 = i32::MIN + 1;
pub const INT64_MIN: i64 = i64::MIN + 1;
pub const DECIMAL_MIN: f64 = f32::MIN as f64;
pub const TIMESTAMP_MIN: u64 = 0;
pub const BOOLEAN_MIN: i8 = 0;

pub const INT8_MAX: i8 = i8::MAX;
pub const INT16_MAX: i16 = i16::MAX;
pub const INT32_MAX: i32 = i32::MAX;
pub const INT64_MAX: i64 = i64::MAX;
pub const DECIMAL_MAX: f64 = f64::MAX;
/// `9999-12-31 23:59:59.999999+14` in the packed timestamp encoding.
pub const TIMESTAMP_MAX: u64 = 11_231_999_986_399_999_999;
pub const BOOLEAN_MAX: i8 = 1;

/// SQL type identifier.
///
/// Every identifier resolves to exactly one behavior object through
/// [`get_instance`](super::get_instance). The discriminant doubles as the
/// element-type tag in the byte-stream encoding of arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TypeId {
    /// No type; the type of a default-constructed value.
    Invalid = 0,
    /// Positional parameter placeholder, stored like `Integer`.
    ParameterOffset = 1,
    /// Boolean, one byte.
    Boolean = 2,
    /// 1-byte integer.
    TinyInt = 3,
    /// 2-byte integer.
    SmallInt = 4,
    /// 4-byte integer.
    Integer = 5,
    /// 8-byte integer.
    BigInt = 6,
    /// 8-byte floating decimal.
    Decimal = 7,
    /// 8-byte packed timestamp.
    Timestamp = 8,
    /// Variable-length character data.
    Varchar = 9,
    /// Variable-length binary data.
    Varbinary = 10,
    /// Fixed-size array of values of one element type.
    Array = 11,
}

impl TypeId {
    /// All identifiers, in discriminant order.
    pub const ALL: [TypeId; 12] = [
        TypeId::Invalid,
        TypeId::ParameterOffset,
        TypeId::Boolean,
        TypeId::TinyInt,
        TypeId::SmallInt,
        TypeId::Integer,
        TypeId::BigInt,
        TypeId::Decimal,
        TypeId::Timestamp,
        TypeId::Varchar,
        TypeId::Varbinary,
        TypeId::Array,
    ];

    /// Returns the SQL display name (e.g., `"INTEGER"`).
    pub const fn display_name(self) -> &'static str {
        match self {
            TypeId::Invalid => "INVALID",
            TypeId::ParameterOffset => "PARAMETER_OFFSET",
            TypeId::Boolean => "BOOLEAN",
            TypeId::TinyInt => "TINYINT",
            TypeId::SmallInt => "SMALLINT",
            TypeId::Integer => "INTEGER",
            TypeId::BigInt => "BIGINT",
            TypeId::Decimal => "DECIMAL",
            TypeId::Timestamp => "TIMESTAMP",
            TypeId::Varchar => "VARCHAR",
            TypeId::Varbinary => "VARBINARY",
            TypeId::Array => "ARRAY",
        }
    }

    /// Returns the tuple slot size for fixed-length types, or `None` for
    /// variable-length, array and invalid types.
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            TypeId::Boolean | TypeId::TinyInt => Some(1),
            TypeId::SmallInt => Some(2),
            TypeId::Integer | TypeId::ParameterOffset => Some(4),
            TypeId::BigInt | TypeId::Decimal | TypeId::Timestamp => Some(8),
            TypeId::Invalid | TypeId::Varchar | TypeId::Varbinary | TypeId::Array => None,
        }
    }

    /// Returns true for the variable-length byte types.
    pub const fn is_varlen(self) -> bool {
        matches!(self, TypeId::Varchar | TypeId::Varbinary)
    }

    /// Returns true for the integer family.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            TypeId::TinyInt
                | TypeId::SmallInt
                | TypeId::Integer
                | TypeId::ParameterOffset
                | TypeId::BigInt
        )
    }

    /// Returns true for the integer family and decimal.
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || matches!(self, TypeId::Decimal)
    }

    /// Returns the byte used for this identifier in serialized form.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parses a serialized identifier byte.
    ///
    /// Returns `None` for bytes that do not name a type.
    pub const fn from_u8(byte: u8) -> Option<Self> {
        if (byte as usize) < Self::ALL.len() {
            Some(Self::ALL[byte as usize])
        } else {
            None
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
