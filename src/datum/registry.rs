//! Type behavior objects and the registry that resolves them.
//!
//! Each [`TypeId`] maps to exactly one stateless, immutable behavior object.
//! The objects are plain statics, so lookup is a match and they are shared
//! freely across threads.

use std::fmt;
use std::hash::Hasher;

use bytes::BytesMut;
use rustc_hash::FxHasher;

use super::array::ArrayType;
use super::boolean::BooleanType;
use super::invalid::InvalidType;
use super::numeric::{DecimalType, IntegerType};
use super::timestamp::TimestampType;
use super::varlen::VarlenType;
use super::{TypeId, Value, ValueError, ValueFactory};
use crate::pool::VarlenPool;

static INVALID: InvalidType = InvalidType;
static PARAMETER_OFFSET: IntegerType = IntegerType::new(TypeId::ParameterOffset);
static BOOLEAN: BooleanType = BooleanType;
static TINYINT: IntegerType = IntegerType::new(TypeId::TinyInt);
static SMALLINT: IntegerType = IntegerType::new(TypeId::SmallInt);
static INTEGER: IntegerType = IntegerType::new(TypeId::Integer);
static BIGINT: IntegerType = IntegerType::new(TypeId::BigInt);
static DECIMAL: DecimalType = DecimalType;
static TIMESTAMP: TimestampType = TimestampType;
static VARCHAR: VarlenType = VarlenType::new(TypeId::Varchar);
static VARBINARY: VarlenType = VarlenType::new(TypeId::Varbinary);
static ARRAY: ArrayType = ArrayType;

/// Binary operation routed to [`Type::operate_null`] when an operand is NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Min,
    Max,
}

impl BinaryOp {
    /// Operator as it appears in error messages.
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Min => "MIN",
            BinaryOp::Max => "MAX",
        }
    }

    /// Returns true for `Min` and `Max`.
    pub const fn is_extremum(self) -> bool {
        matches!(self, BinaryOp::Min | BinaryOp::Max)
    }
}

/// Returns the behavior object for `type_id`.
pub fn get_instance(type_id: TypeId) -> &'static dyn Type {
    match type_id {
        TypeId::Invalid => &INVALID,
        TypeId::ParameterOffset => &PARAMETER_OFFSET,
        TypeId::Boolean => &BOOLEAN,
        TypeId::TinyInt => &TINYINT,
        TypeId::SmallInt => &SMALLINT,
        TypeId::Integer => &INTEGER,
        TypeId::BigInt => &BIGINT,
        TypeId::Decimal => &DECIMAL,
        TypeId::Timestamp => &TIMESTAMP,
        TypeId::Varchar => &VARCHAR,
        TypeId::Varbinary => &VARBINARY,
        TypeId::Array => &ARRAY,
    }
}

/// Hash of any NULL value.
pub(super) fn null_hash() -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(0x6e75_6c6c);
    hasher.finish()
}

/// Copies the first `N` bytes of `src` into an array.
///
/// Callers check the length first.
pub(super) fn fixed_bytes<const N: usize>(src: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&src[..N]);
    buf
}

/// Per-type behavior.
///
/// [`Value`] checks NULL-ness and comparability before forwarding, so the
/// comparison and arithmetic methods only ever see non-NULL operands whose
/// types this object accepts. Anything a type does not support keeps the
/// default, which fails with `ValueError::IncompatibleType`.
pub trait Type: Send + Sync + fmt::Debug {
    /// Returns the identifier this object is registered under.
    fn type_id(&self) -> TypeId;

    /// Returns true if values of this type can be compared with `other`.
    fn is_comparable(&self, _other: TypeId) -> bool {
        false
    }

    fn compare_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("=", left.type_id(), right.type_id()))
    }

    fn compare_not_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("<>", left.type_id(), right.type_id()))
    }

    fn compare_less_than(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("<", left.type_id(), right.type_id()))
    }

    fn compare_less_than_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("<=", left.type_id(), right.type_id()))
    }

    fn compare_greater_than(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible(">", left.type_id(), right.type_id()))
    }

    fn compare_greater_than_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible(">=", left.type_id(), right.type_id()))
    }

    /// Result of a comparison with a NULL operand.
    fn compare_null(&self, _left: &Value<'_>, _right: &Value<'_>) -> Value<'static> {
        ValueFactory::boolean_null()
    }

    fn add(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("+", left.type_id(), right.type_id()))
    }

    fn subtract(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("-", left.type_id(), right.type_id()))
    }

    fn multiply(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("*", left.type_id(), right.type_id()))
    }

    fn divide(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("/", left.type_id(), right.type_id()))
    }

    fn modulo(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("%", left.type_id(), right.type_id()))
    }

    fn min(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("MIN", left.type_id(), right.type_id()))
    }

    fn max(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible("MAX", left.type_id(), right.type_id()))
    }

    fn sqrt(&self, val: &Value<'_>) -> Result<Value<'static>, ValueError> {
        Err(ValueError::unsupported("SQRT", val.type_id()))
    }

    /// Result of `op` with a NULL operand. Operations the type does not
    /// define fail exactly as they would for non-NULL operands.
    fn operate_null(
        &self,
        op: BinaryOp,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Err(ValueError::incompatible(op.symbol(), left.type_id(), right.type_id()))
    }

    fn is_zero(&self, val: &Value<'_>) -> Result<bool, ValueError> {
        Err(ValueError::unsupported("zero test", val.type_id()))
    }

    /// Returns true if the value's data lives inside the value.
    fn is_inlined(&self, _val: &Value<'_>) -> bool {
        true
    }

    /// Renders the value as text. NULL renders as `NULL`.
    fn format_value(&self, val: &Value<'_>) -> String;

    /// Hash consistent with `compare_equals` across comparable types.
    fn hash(&self, val: &Value<'_>) -> u64;

    /// Folds the value's hash into `seed`.
    fn hash_combine(&self, val: &Value<'_>, seed: &mut u64) {
        let hash = self.hash(val);
        *seed ^= hash
            .wrapping_add(0x9e37_79b9)
            .wrapping_add(*seed << 6)
            .wrapping_add(*seed >> 2);
    }

    fn serialize_to(
        &self,
        val: &Value<'_>,
        storage: &mut [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError>;

    fn serialize_to_stream(&self, val: &Value<'_>, out: &mut BytesMut) -> Result<(), ValueError>;

    fn deserialize_from<'s>(
        &self,
        storage: &'s [u8],
        inlined: bool,
        pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Value<'s>, ValueError>;

    fn deserialize_from_stream<'p>(
        &self,
        src: &mut BytesMut,
        pool: Option<&'p dyn VarlenPool>,
    ) -> Result<Value<'p>, ValueError>;

    /// Moves a serialized value from `src` to `dest` without copying pooled
    /// bytes.
    fn shallow_copy(
        &self,
        _dest: &mut [u8],
        _src: &mut [u8],
        _inlined: bool,
        _src_pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        Err(ValueError::unsupported("shallow copy", self.type_id()))
    }

    fn data<'v>(&self, val: &'v Value<'_>) -> Result<&'v [u8], ValueError> {
        Err(ValueError::unsupported("raw data access", val.type_id()))
    }

    fn data_from_storage<'s>(
        &self,
        _storage: &'s [u8],
        _inlined: bool,
        _pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Option<&'s [u8]>, ValueError> {
        Err(ValueError::unsupported("raw data access", self.type_id()))
    }

    fn length(&self, val: &Value<'_>) -> Result<u32, ValueError> {
        Err(ValueError::unsupported("length", val.type_id()))
    }

    /// Returns an owned deep copy of the value.
    fn copy(&self, val: &Value<'_>) -> Value<'static> {
        val.to_owned_value()
    }

    fn cast_as(&self, val: &Value<'_>, type_id: TypeId) -> Result<Value<'static>, ValueError>;

    fn element_at(&self, val: &Value<'_>, _idx: u64) -> Result<Value<'static>, ValueError> {
        Err(ValueError::unsupported("element access", val.type_id()))
    }

    fn element_type(&self, val: &Value<'_>) -> Result<TypeId, ValueError> {
        Err(ValueError::unsupported("element type", val.type_id()))
    }

    fn in_list(
        &self,
        list: &Value<'_>,
        _object: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Err(ValueError::unsupported("IN list", list.type_id()))
    }
}

/// Logs and builds the error for a cast the source type does not support.
pub(super) fn unsupported_cast(from: TypeId, to: TypeId) -> ValueError {
    tracing::debug!(%from, %to, "rejected cast");
    ValueError::IncompatibleType(format!("cannot cast {} to {}", from, to))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_total() {
        for type_id in TypeId::ALL {
            assert_eq!(get_instance(type_id).type_id(), type_id);
        }
    }

    #[test]
    fn test_registry_returns_same_instance() {
        for type_id in TypeId::ALL {
            let a = get_instance(type_id) as *const dyn Type as *const ();
            let b = get_instance(type_id) as *const dyn Type as *const ();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_hash_combine_depends_on_order() {
        let one = ValueFactory::integer(1);
        let two = ValueFactory::integer(2);

        let mut a = 0;
        one.hash_combine(&mut a);
        two.hash_combine(&mut a);

        let mut b = 0;
        two.hash_combine(&mut b);
        one.hash_combine(&mut b);

        assert_ne!(a, b);
    }

    #[test]
    fn test_null_hash_is_shared() {
        assert_eq!(
            ValueFactory::null_value_by_type(TypeId::Integer).hash_value(),
            ValueFactory::null_value_by_type(TypeId::Varchar).hash_value()
        );
    }
}
