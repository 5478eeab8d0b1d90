//! BOOLEAN behavior.

use std::cmp::Ordering;
use std::hash::Hasher;

use bytes::{Buf, BufMut, BytesMut};
use rustc_hash::FxHasher;

use super::registry::{Type, null_hash, unsupported_cast};
use super::value::Payload;
use super::{BOOLEAN_NULL, TypeId, Value, ValueError, ValueFactory};
use crate::ensure_buf_len;
use crate::pool::VarlenPool;

/// One-byte boolean; FALSE orders before TRUE.
#[derive(Debug)]
pub struct BooleanType;

impl BooleanType {
    fn raw_of(val: &Value<'_>) -> i8 {
        match *val.payload() {
            Payload::Boolean(v) if !val.is_null() => v,
            _ => BOOLEAN_NULL,
        }
    }

    fn compare_with<F>(
        op: &str,
        left: &Value<'_>,
        right: &Value<'_>,
        pred: F,
    ) -> Result<Value<'static>, ValueError>
    where
        F: Fn(Ordering) -> bool,
    {
        if right.type_id() != TypeId::Boolean {
            return Err(ValueError::incompatible(op, left.type_id(), right.type_id()));
        }
        Ok(ValueFactory::boolean(pred(
            Self::raw_of(left).cmp(&Self::raw_of(right)),
        )))
    }
}

impl Type for BooleanType {
    fn type_id(&self) -> TypeId {
        TypeId::Boolean
    }

    fn is_comparable(&self, other: TypeId) -> bool {
        other == TypeId::Boolean
    }

    fn compare_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Self::compare_with("=", left, right, |ord| ord == Ordering::Equal)
    }

    fn compare_not_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Self::compare_with("<>", left, right, |ord| ord != Ordering::Equal)
    }

    fn compare_less_than(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Self::compare_with("<", left, right, |ord| ord == Ordering::Less)
    }

    fn compare_less_than_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Self::compare_with("<=", left, right, |ord| ord != Ordering::Greater)
    }

    fn compare_greater_than(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Self::compare_with(">", left, right, |ord| ord == Ordering::Greater)
    }

    fn compare_greater_than_equals(
        &self,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        Self::compare_with(">=", left, right, |ord| ord != Ordering::Less)
    }

    fn format_value(&self, val: &Value<'_>) -> String {
        match Self::raw_of(val) {
            1 => "true".to_string(),
            0 => "false".to_string(),
            _ => "NULL".to_string(),
        }
    }

    fn hash(&self, val: &Value<'_>) -> u64 {
        if val.is_null() {
            return null_hash();
        }
        let mut hasher = FxHasher::default();
        hasher.write_i8(Self::raw_of(val));
        hasher.finish()
    }

    fn serialize_to(
        &self,
        val: &Value<'_>,
        storage: &mut [u8],
        _inlined: bool,
        _pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        ensure_buf_len!(storage, 1);
        storage[0] = Self::raw_of(val) as u8;
        Ok(())
    }

    fn serialize_to_stream(&self, val: &Value<'_>, out: &mut BytesMut) -> Result<(), ValueError> {
        out.put_i8(Self::raw_of(val));
        Ok(())
    }

    fn deserialize_from<'s>(
        &self,
        storage: &'s [u8],
        _inlined: bool,
        _pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Value<'s>, ValueError> {
        ensure_buf_len!(storage, 1);
        Ok(ValueFactory::boolean_from_raw(storage[0] as i8))
    }

    fn deserialize_from_stream<'p>(
        &self,
        src: &mut BytesMut,
        _pool: Option<&'p dyn VarlenPool>,
    ) -> Result<Value<'p>, ValueError> {
        ensure_buf_len!(src, 1);
        Ok(ValueFactory::boolean_from_raw(src.get_i8()))
    }

    fn cast_as(&self, val: &Value<'_>, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        match type_id {
            TypeId::Boolean => Ok(val.copy()),
            TypeId::Varchar if val.is_null() => Ok(ValueFactory::null_value_by_type(type_id)),
            TypeId::Varchar => Ok(ValueFactory::varchar_owned(self.format_value(val))),
            _ => Err(unsupported_cast(TypeId::Boolean, type_id)),
        }
    }
}

/// Parses boolean text, accepting `true/false`, `t/f`, `yes/no`, `on/off`
/// and `1/0` in any case.
pub(super) fn parse_boolean(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}
