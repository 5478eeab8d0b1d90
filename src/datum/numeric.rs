//! Integer-family and decimal behavior.
//!
//! Mixed-type arithmetic promotes to the wider operand:
//! TINYINT < SMALLINT < INTEGER < BIGINT < DECIMAL. PARAMETER_OFFSET ranks
//! with INTEGER and results are reported as INTEGER. Integer results outside
//! the result type's range fail with `ValueError::OutOfRange`; nothing wraps.

use std::cmp::Ordering;
use std::hash::Hasher;

use bytes::{Buf, BufMut, BytesMut};
use rustc_hash::FxHasher;

use super::registry::{BinaryOp, Type, fixed_bytes, null_hash, unsupported_cast};
use super::value::Payload;
use super::{
    DECIMAL_NULL, INT8_MAX, INT8_MIN, INT8_NULL, INT16_MAX, INT16_MIN, INT16_NULL, INT32_MAX,
    INT32_MIN, INT32_NULL, INT64_MAX, INT64_MIN, INT64_NULL, TypeId, Value, ValueError,
    ValueFactory,
};
use crate::ensure_buf_len;
use crate::pool::VarlenPool;

/// A non-NULL numeric payload widened for arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Decimal(f64),
}

impl Number {
    fn of(val: &Value<'_>) -> Option<Self> {
        match *val.payload() {
            Payload::TinyInt(v) => Some(Number::Int(v as i64)),
            Payload::SmallInt(v) => Some(Number::Int(v as i64)),
            Payload::Integer(v) => Some(Number::Int(v as i64)),
            Payload::BigInt(v) => Some(Number::Int(v)),
            Payload::Decimal(v) => Some(Number::Decimal(v)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Decimal(v) => v,
        }
    }
}

fn operands(op: &str, left: &Value<'_>, right: &Value<'_>) -> Result<(Number, Number), ValueError> {
    match (Number::of(left), Number::of(right)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(ValueError::incompatible(op, left.type_id(), right.type_id())),
    }
}

fn rank(type_id: TypeId) -> u8 {
    match type_id {
        TypeId::TinyInt => 0,
        TypeId::SmallInt => 1,
        TypeId::Integer | TypeId::ParameterOffset => 2,
        TypeId::BigInt => 3,
        _ => 4,
    }
}

/// Returns the result type of an arithmetic operation on `left` and `right`.
pub(super) fn promote(left: TypeId, right: TypeId) -> TypeId {
    let wider = if rank(left) >= rank(right) { left } else { right };
    match wider {
        TypeId::ParameterOffset => TypeId::Integer,
        other => other,
    }
}

fn out_of_range(type_id: TypeId, value: impl std::fmt::Display) -> ValueError {
    ValueError::OutOfRange(format!("{} is out of range for {}", value, type_id))
}

/// Builds an integer-family value, checking `value` against the type's
/// usable range.
pub(super) fn make_integer(type_id: TypeId, value: i64) -> Result<Value<'static>, ValueError> {
    let (min, max) = match type_id {
        TypeId::TinyInt => (INT8_MIN as i64, INT8_MAX as i64),
        TypeId::SmallInt => (INT16_MIN as i64, INT16_MAX as i64),
        TypeId::Integer | TypeId::ParameterOffset => (INT32_MIN as i64, INT32_MAX as i64),
        TypeId::BigInt => (INT64_MIN, INT64_MAX),
        _ => return Err(ValueError::unsupported("integer construction", type_id)),
    };
    if value < min || value > max {
        return Err(out_of_range(type_id, value));
    }

    Ok(match type_id {
        TypeId::TinyInt => ValueFactory::tinyint(value as i8),
        TypeId::SmallInt => ValueFactory::smallint(value as i16),
        TypeId::Integer => ValueFactory::integer(value as i32),
        TypeId::ParameterOffset => ValueFactory::parameter_offset(value as i32),
        _ => ValueFactory::bigint(value),
    })
}

/// Converts a decimal to an integer-family value, truncating toward zero.
pub(super) fn decimal_to_integer(type_id: TypeId, value: f64) -> Result<Value<'static>, ValueError> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < -I64_BOUND || truncated >= I64_BOUND {
        return Err(out_of_range(type_id, value));
    }
    make_integer(type_id, truncated as i64)
}

fn decimal_result(op: &str, a: f64, b: f64, result: f64) -> Result<Value<'static>, ValueError> {
    if (result.is_infinite() && a.is_finite() && b.is_finite()) || result == DECIMAL_NULL {
        return Err(ValueError::OutOfRange(format!(
            "{} {} {} overflows DECIMAL",
            a, op, b
        )));
    }
    Ok(ValueFactory::decimal(result))
}

fn arithmetic(
    op: &str,
    left: &Value<'_>,
    right: &Value<'_>,
    int_op: impl Fn(i64, i64) -> Option<i64>,
    decimal_op: impl Fn(f64, f64) -> f64,
) -> Result<Value<'static>, ValueError> {
    let (a, b) = operands(op, left, right)?;
    let result_type = promote(left.type_id(), right.type_id());

    match (a, b) {
        (Number::Int(a), Number::Int(b)) => {
            let result = int_op(a, b).ok_or_else(|| {
                ValueError::OutOfRange(format!("{} {} {} overflows {}", a, op, b, result_type))
            })?;
            make_integer(result_type, result)
        }
        _ => {
            let (a, b) = (a.as_f64(), b.as_f64());
            decimal_result(op, a, b, decimal_op(a, b))
        }
    }
}

fn is_zero_number(number: Number) -> bool {
    match number {
        Number::Int(v) => v == 0,
        Number::Decimal(v) => v == 0.0,
    }
}

fn checked_divide(left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
    let (_, divisor) = operands("/", left, right)?;
    if is_zero_number(divisor) {
        return Err(ValueError::DivideByZero);
    }
    arithmetic("/", left, right, i64::checked_div, |a, b| a / b)
}

fn checked_modulo(left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
    let (_, divisor) = operands("%", left, right)?;
    if is_zero_number(divisor) {
        return Err(ValueError::DivideByZero);
    }
    arithmetic("%", left, right, i64::checked_rem, |a, b| a % b)
}

/// Orders decimals with NaN above everything and equal to itself.
fn cmp_decimal(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(ord) => ord,
        None => a.is_nan().cmp(&b.is_nan()),
    }
}

/// 2^63 as a decimal; the first value past `i64::MAX`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Returns `d` as an integer if it is integral and fits `i64`.
fn integral(d: f64) -> Option<i64> {
    (d.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&d)).then_some(d as i64)
}

/// Orders an integer against a decimal by exact value.
fn cmp_int_decimal(i: i64, d: f64) -> Ordering {
    if d.is_nan() || d >= I64_BOUND {
        return Ordering::Less;
    }
    if d < -I64_BOUND {
        return Ordering::Greater;
    }
    let whole = d.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&d).unwrap_or(Ordering::Equal),
        ord => ord,
    }
}

fn cmp_numbers(a: Number, b: Number) -> Ordering {
    match (a, b) {
        (Number::Int(a), Number::Int(b)) => a.cmp(&b),
        (Number::Int(a), Number::Decimal(b)) => cmp_int_decimal(a, b),
        (Number::Decimal(a), Number::Int(b)) => cmp_int_decimal(b, a).reverse(),
        (Number::Decimal(a), Number::Decimal(b)) => cmp_decimal(a, b),
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
    let (a, b) = operands(op, left, right)?;
    Ok(ValueFactory::boolean(pred(cmp_numbers(a, b))))
}

/// Returns a copy of `right` if it orders as `replace_when` relative to
/// `left`, otherwise a copy of `left`.
fn pick(
    op: &str,
    left: &Value<'_>,
    right: &Value<'_>,
    replace_when: Ordering,
) -> Result<Value<'static>, ValueError> {
    let (a, b) = operands(op, left, right)?;
    if cmp_numbers(a, b) == replace_when {
        Ok(right.copy())
    } else {
        Ok(left.copy())
    }
}

/// Hashes a numeric value so that values comparing equal hash alike:
/// integers and integral decimals hash as integers, other decimals by their
/// bits.
fn hash_number(number: Number) -> u64 {
    let bits = match number {
        Number::Int(v) => v as u64,
        Number::Decimal(d) => match integral(d) {
            Some(v) => v as u64,
            None if d.is_nan() => f64::NAN.to_bits(),
            None => d.to_bits(),
        },
    };
    let mut hasher = FxHasher::default();
    hasher.write_u64(bits);
    hasher.finish()
}

/// Formats a decimal the way it renders as text.
fn format_decimal(value: f64) -> String {
    if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{}", value)
    }
}

fn cast_null(from: TypeId, to: TypeId) -> Result<Value<'static>, ValueError> {
    if to.is_numeric() || to == TypeId::Varchar {
        Ok(ValueFactory::null_value_by_type(to))
    } else {
        Err(unsupported_cast(from, to))
    }
}

// Behavior shared by every numeric type.
macro_rules! numeric_ops {
    () => {
        fn is_comparable(&self, other: TypeId) -> bool {
            other.is_numeric()
        }

        fn compare_equals(
            &self,
            left: &Value<'_>,
            right: &Value<'_>,
        ) -> Result<Value<'static>, ValueError> {
            compare_with("=", left, right, |ord| ord == Ordering::Equal)
        }

        fn compare_not_equals(
            &self,
            left: &Value<'_>,
            right: &Value<'_>,
        ) -> Result<Value<'static>, ValueError> {
            compare_with("<>", left, right, |ord| ord != Ordering::Equal)
        }

        fn compare_less_than(
            &self,
            left: &Value<'_>,
            right: &Value<'_>,
        ) -> Result<Value<'static>, ValueError> {
            compare_with("<", left, right, |ord| ord == Ordering::Less)
        }

        fn compare_less_than_equals(
            &self,
            left: &Value<'_>,
            right: &Value<'_>,
        ) -> Result<Value<'static>, ValueError> {
            compare_with("<=", left, right, |ord| ord != Ordering::Greater)
        }

        fn compare_greater_than(
            &self,
            left: &Value<'_>,
            right: &Value<'_>,
        ) -> Result<Value<'static>, ValueError> {
            compare_with(">", left, right, |ord| ord == Ordering::Greater)
        }

        fn compare_greater_than_equals(
            &self,
            left: &Value<'_>,
            right: &Value<'_>,
        ) -> Result<Value<'static>, ValueError> {
            compare_with(">=", left, right, |ord| ord != Ordering::Less)
        }

        fn add(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
            arithmetic("+", left, right, i64::checked_add, |a, b| a + b)
        }

        fn subtract(
            &self,
            left: &Value<'_>,
            right: &Value<'_>,
        ) -> Result<Value<'static>, ValueError> {
            arithmetic("-", left, right, i64::checked_sub, |a, b| a - b)
        }

        fn multiply(
            &self,
            left: &Value<'_>,
            right: &Value<'_>,
        ) -> Result<Value<'static>, ValueError> {
            arithmetic("*", left, right, i64::checked_mul, |a, b| a * b)
        }

        fn divide(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
            checked_divide(left, right)
        }

        fn modulo(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
            checked_modulo(left, right)
        }

        fn min(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
            pick("MIN", left, right, Ordering::Greater)
        }

        fn max(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
            pick("MAX", left, right, Ordering::Less)
        }

        fn sqrt(&self, val: &Value<'_>) -> Result<Value<'static>, ValueError> {
            if val.is_null() {
                return Ok(ValueFactory::null_value_by_type(TypeId::Decimal));
            }
            let value = Number::of(val)
                .ok_or_else(|| ValueError::unsupported("SQRT", val.type_id()))?
                .as_f64();
            if value < 0.0 {
                return Err(ValueError::InvalidOperation(format!(
                    "square root of negative number {}",
                    format_decimal(value)
                )));
            }
            Ok(ValueFactory::decimal(value.sqrt()))
        }

        fn operate_null(
            &self,
            op: BinaryOp,
            left: &Value<'_>,
            right: &Value<'_>,
        ) -> Result<Value<'static>, ValueError> {
            if !left.type_id().is_numeric() || !right.type_id().is_numeric() {
                return Err(ValueError::incompatible(
                    op.symbol(),
                    left.type_id(),
                    right.type_id(),
                ));
            }
            Ok(ValueFactory::null_value_by_type(promote(
                left.type_id(),
                right.type_id(),
            )))
        }

        fn is_zero(&self, val: &Value<'_>) -> Result<bool, ValueError> {
            let number =
                Number::of(val).ok_or_else(|| ValueError::unsupported("zero test", val.type_id()))?;
            Ok(!val.is_null() && is_zero_number(number))
        }

        fn hash(&self, val: &Value<'_>) -> u64 {
            match Number::of(val) {
                Some(number) if !val.is_null() => hash_number(number),
                _ => null_hash(),
            }
        }
    };
}

/// Behavior of TINYINT, SMALLINT, INTEGER, PARAMETER_OFFSET and BIGINT.
///
/// One instance per width; the width comes from the registered type id.
#[derive(Debug)]
pub struct IntegerType {
    type_id: TypeId,
}

impl IntegerType {
    pub(super) const fn new(type_id: TypeId) -> Self {
        Self { type_id }
    }

    fn size(&self) -> usize {
        match self.type_id {
            TypeId::TinyInt => 1,
            TypeId::SmallInt => 2,
            TypeId::BigInt => 8,
            _ => 4,
        }
    }

    fn null_raw(&self) -> i64 {
        match self.type_id {
            TypeId::TinyInt => INT8_NULL as i64,
            TypeId::SmallInt => INT16_NULL as i64,
            TypeId::BigInt => INT64_NULL,
            _ => INT32_NULL as i64,
        }
    }

    /// Builds a value from a raw payload; the NULL sentinel yields NULL.
    fn from_raw(&self, raw: i64) -> Value<'static> {
        match self.type_id {
            TypeId::TinyInt => ValueFactory::tinyint(raw as i8),
            TypeId::SmallInt => ValueFactory::smallint(raw as i16),
            TypeId::ParameterOffset => ValueFactory::parameter_offset(raw as i32),
            TypeId::BigInt => ValueFactory::bigint(raw),
            _ => ValueFactory::integer(raw as i32),
        }
    }

    /// Payload with NULL replaced by the sentinel.
    fn raw_of(&self, val: &Value<'_>) -> i64 {
        match Number::of(val) {
            Some(Number::Int(v)) if !val.is_null() => v,
            _ => self.null_raw(),
        }
    }
}

impl Type for IntegerType {
    fn type_id(&self) -> TypeId {
        self.type_id
    }

    numeric_ops!();

    fn format_value(&self, val: &Value<'_>) -> String {
        match Number::of(val) {
            Some(Number::Int(v)) if !val.is_null() => v.to_string(),
            _ => "NULL".to_string(),
        }
    }

    fn serialize_to(
        &self,
        val: &Value<'_>,
        storage: &mut [u8],
        _inlined: bool,
        _pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        let size = self.size();
        ensure_buf_len!(storage, size);
        // Little-endian truncation keeps the low-order bytes of the width.
        storage[..size].copy_from_slice(&self.raw_of(val).to_le_bytes()[..size]);
        Ok(())
    }

    fn serialize_to_stream(&self, val: &Value<'_>, out: &mut BytesMut) -> Result<(), ValueError> {
        let size = self.size();
        out.put_slice(&self.raw_of(val).to_be_bytes()[8 - size..]);
        Ok(())
    }

    fn deserialize_from<'s>(
        &self,
        storage: &'s [u8],
        _inlined: bool,
        _pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Value<'s>, ValueError> {
        let size = self.size();
        ensure_buf_len!(storage, size);
        let raw = match size {
            1 => i8::from_le_bytes(fixed_bytes(storage)) as i64,
            2 => i16::from_le_bytes(fixed_bytes(storage)) as i64,
            4 => i32::from_le_bytes(fixed_bytes(storage)) as i64,
            _ => i64::from_le_bytes(fixed_bytes(storage)),
        };
        Ok(self.from_raw(raw))
    }

    fn deserialize_from_stream<'p>(
        &self,
        src: &mut BytesMut,
        _pool: Option<&'p dyn VarlenPool>,
    ) -> Result<Value<'p>, ValueError> {
        let size = self.size();
        ensure_buf_len!(src, size);
        let raw = match size {
            1 => src.get_i8() as i64,
            2 => src.get_i16() as i64,
            4 => src.get_i32() as i64,
            _ => src.get_i64(),
        };
        Ok(self.from_raw(raw))
    }

    fn cast_as(&self, val: &Value<'_>, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        if val.is_null() {
            return cast_null(self.type_id, type_id);
        }
        let value = self.raw_of(val);
        match type_id {
            t if t.is_integer() => make_integer(t, value),
            TypeId::Decimal => Ok(ValueFactory::decimal(value as f64)),
            TypeId::Varchar => Ok(ValueFactory::varchar_owned(value.to_string())),
            _ => Err(unsupported_cast(self.type_id, type_id)),
        }
    }
}

/// Behavior of DECIMAL (8-byte floating point).
#[derive(Debug)]
pub struct DecimalType;

impl DecimalType {
    fn raw_of(val: &Value<'_>) -> f64 {
        match *val.payload() {
            Payload::Decimal(v) if !val.is_null() => v,
            _ => DECIMAL_NULL,
        }
    }
}

impl Type for DecimalType {
    fn type_id(&self) -> TypeId {
        TypeId::Decimal
    }

    numeric_ops!();

    fn format_value(&self, val: &Value<'_>) -> String {
        if val.is_null() {
            return "NULL".to_string();
        }
        format_decimal(Self::raw_of(val))
    }

    fn serialize_to(
        &self,
        val: &Value<'_>,
        storage: &mut [u8],
        _inlined: bool,
        _pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        ensure_buf_len!(storage, 8);
        storage[..8].copy_from_slice(&Self::raw_of(val).to_le_bytes());
        Ok(())
    }

    fn serialize_to_stream(&self, val: &Value<'_>, out: &mut BytesMut) -> Result<(), ValueError> {
        out.put_f64(Self::raw_of(val));
        Ok(())
    }

    fn deserialize_from<'s>(
        &self,
        storage: &'s [u8],
        _inlined: bool,
        _pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Value<'s>, ValueError> {
        ensure_buf_len!(storage, 8);
        Ok(ValueFactory::decimal(f64::from_le_bytes(fixed_bytes(storage))))
    }

    fn deserialize_from_stream<'p>(
        &self,
        src: &mut BytesMut,
        _pool: Option<&'p dyn VarlenPool>,
    ) -> Result<Value<'p>, ValueError> {
        ensure_buf_len!(src, 8);
        Ok(ValueFactory::decimal(src.get_f64()))
    }

    fn cast_as(&self, val: &Value<'_>, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        if val.is_null() {
            return cast_null(TypeId::Decimal, type_id);
        }
        let value = Self::raw_of(val);
        match type_id {
            t if t.is_integer() => decimal_to_integer(t, value),
            TypeId::Decimal => Ok(ValueFactory::decimal(value)),
            TypeId::Varchar => Ok(ValueFactory::varchar_owned(format_decimal(value))),
            _ => Err(unsupported_cast(TypeId::Decimal, type_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i32) -> Value<'static> {
        ValueFactory::integer(v)
    }

    #[test]
    fn test_promotion() {
        let sum = ValueFactory::tinyint(1).add(&ValueFactory::smallint(2)).unwrap();
        assert_eq!(sum.type_id(), TypeId::SmallInt);
        assert_eq!(sum.get_as::<i16>().unwrap(), 3);

        let sum = int(1).add(&ValueFactory::bigint(2)).unwrap();
        assert_eq!(sum.type_id(), TypeId::BigInt);

        let sum = int(1).add(&ValueFactory::decimal(0.5)).unwrap();
        assert_eq!(sum.type_id(), TypeId::Decimal);
        assert_eq!(sum.get_as::<f64>().unwrap(), 1.5);

        let sum = ValueFactory::parameter_offset(1).add(&ValueFactory::tinyint(1)).unwrap();
        assert_eq!(sum.type_id(), TypeId::Integer);
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(int(7).subtract(&int(10)).unwrap(), int(-3));
        assert_eq!(int(6).multiply(&int(7)).unwrap(), int(42));
        assert_eq!(int(7).divide(&int(2)).unwrap(), int(3));
        assert_eq!(int(-7).divide(&int(2)).unwrap(), int(-3));
        assert_eq!(int(7).modulo(&int(3)).unwrap(), int(1));
        assert_eq!(int(-7).modulo(&int(3)).unwrap(), int(-1));
    }

    #[test]
    fn test_overflow_is_out_of_range() {
        assert!(matches!(
            ValueFactory::tinyint(100).add(&ValueFactory::tinyint(100)),
            Err(ValueError::OutOfRange(_))
        ));
        assert!(matches!(
            int(INT32_MAX).add(&int(1)),
            Err(ValueError::OutOfRange(_))
        ));
        // The NULL sentinel is not a reachable result.
        assert!(matches!(
            int(INT32_MIN).subtract(&int(1)),
            Err(ValueError::OutOfRange(_))
        ));
        assert!(matches!(
            ValueFactory::bigint(INT64_MAX).multiply(&ValueFactory::bigint(2)),
            Err(ValueError::OutOfRange(_))
        ));
        assert!(matches!(
            ValueFactory::decimal(f64::MAX).multiply(&ValueFactory::decimal(2.0)),
            Err(ValueError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(int(1).divide(&int(0)), Err(ValueError::DivideByZero));
        assert_eq!(int(1).modulo(&int(0)), Err(ValueError::DivideByZero));
        assert_eq!(
            ValueFactory::decimal(1.0).divide(&ValueFactory::decimal(-0.0)),
            Err(ValueError::DivideByZero)
        );
        assert_eq!(
            int(1).divide(&ValueFactory::decimal(0.0)),
            Err(ValueError::DivideByZero)
        );
    }

    #[test]
    fn test_decimal_modulo() {
        let result = ValueFactory::decimal(7.5).modulo(&int(2)).unwrap();
        assert_eq!(result.get_as::<f64>().unwrap(), 1.5);
    }

    #[test]
    fn test_mixed_comparisons() {
        assert!(int(5).compare_equals(&ValueFactory::decimal(5.0)).unwrap().is_true());
        assert!(ValueFactory::tinyint(1)
            .compare_less_than(&ValueFactory::bigint(2))
            .unwrap()
            .is_true());
        assert!(ValueFactory::decimal(2.5)
            .compare_greater_than_equals(&int(2))
            .unwrap()
            .is_true());
        assert!(int(3).compare_not_equals(&int(3)).unwrap().is_false());
        assert!(int(3).compare_less_than_equals(&int(3)).unwrap().is_true());
        assert!(int(3).compare_greater_than(&int(3)).unwrap().is_false());
    }

    #[test]
    fn test_decimal_nan_and_zero_equality() {
        let nan = ValueFactory::decimal(f64::NAN);
        assert_eq!(nan, ValueFactory::decimal(f64::NAN));
        assert_eq!(nan.hash_value(), ValueFactory::decimal(f64::NAN).hash_value());
        assert!(nan.compare_greater_than(&ValueFactory::decimal(f64::MAX)).unwrap().is_true());

        let zero = ValueFactory::decimal(0.0);
        let neg_zero = ValueFactory::decimal(-0.0);
        assert_eq!(zero, neg_zero);
        assert_eq!(zero.hash_value(), neg_zero.hash_value());
    }

    #[test]
    fn test_cross_type_hash() {
        assert_eq!(int(5).hash_value(), ValueFactory::decimal(5.0).hash_value());
        assert_eq!(int(5).hash_value(), ValueFactory::tinyint(5).hash_value());
        assert_ne!(int(5).hash_value(), int(6).hash_value());
    }

    #[test]
    fn test_bigint_decimal_equality_is_exact() {
        let two_53 = 1i64 << 53;
        let above = ValueFactory::bigint(two_53 + 1);
        let exact = ValueFactory::bigint(two_53);
        let decimal = ValueFactory::decimal(two_53 as f64);

        assert_ne!(above, decimal);
        assert_ne!(decimal, above);
        assert_eq!(decimal, exact);
        assert_ne!(above, exact);
        assert!(above.compare_greater_than(&decimal).unwrap().is_true());
        assert!(decimal.compare_less_than(&above).unwrap().is_true());
        assert_eq!(decimal.hash_value(), exact.hash_value());

        let max = ValueFactory::bigint(i64::MAX);
        let bound = ValueFactory::decimal(9_223_372_036_854_775_808.0);
        assert!(max.compare_less_than(&bound).unwrap().is_true());
        assert!(ValueFactory::bigint(i64::MIN + 1)
            .compare_greater_than(&ValueFactory::decimal(-1e19))
            .unwrap()
            .is_true());
    }

    #[test]
    fn test_int_decimal_fraction_ordering() {
        assert!(int(2).compare_less_than(&ValueFactory::decimal(2.5)).unwrap().is_true());
        assert!(int(-2).compare_greater_than(&ValueFactory::decimal(-2.5)).unwrap().is_true());
        assert!(int(0).compare_equals(&ValueFactory::decimal(-0.0)).unwrap().is_true());
        assert!(int(i32::MAX)
            .compare_less_than(&ValueFactory::decimal(f64::NAN))
            .unwrap()
            .is_true());
        assert!(int(1)
            .compare_greater_than(&ValueFactory::decimal(f64::NEG_INFINITY))
            .unwrap()
            .is_true());
    }

    #[test]
    fn test_min_max() {
        let min = int(3).min(&ValueFactory::bigint(2)).unwrap();
        assert_eq!(min.type_id(), TypeId::BigInt);
        assert_eq!(min.get_as::<i64>().unwrap(), 2);

        let max = int(3).max(&ValueFactory::decimal(2.5)).unwrap();
        assert_eq!(max.type_id(), TypeId::Integer);

        assert!(matches!(
            int(3).min(&ValueFactory::boolean(true)),
            Err(ValueError::IncompatibleType(_))
        ));
    }

    #[test]
    fn test_sqrt() {
        let root = int(16).sqrt().unwrap();
        assert_eq!(root.type_id(), TypeId::Decimal);
        assert_eq!(root.get_as::<f64>().unwrap(), 4.0);

        assert!(matches!(int(-1).sqrt(), Err(ValueError::InvalidOperation(_))));

        let null = ValueFactory::null_value_by_type(TypeId::Integer).sqrt().unwrap();
        assert!(null.is_null());
        assert_eq!(null.type_id(), TypeId::Decimal);
    }

    #[test]
    fn test_operate_null() {
        let null = ValueFactory::null_value_by_type(TypeId::SmallInt);
        let result = null.add(&ValueFactory::bigint(1)).unwrap();
        assert!(result.is_null());
        assert_eq!(result.type_id(), TypeId::BigInt);

        let result = int(1).divide(&ValueFactory::null_value_by_type(TypeId::Decimal)).unwrap();
        assert!(result.is_null());
        assert_eq!(result.type_id(), TypeId::Decimal);

        // The zero check never runs for NULL operands.
        let result = null.divide(&int(0)).unwrap();
        assert!(result.is_null());

        assert!(matches!(
            null.add(&ValueFactory::varchar("1")),
            Err(ValueError::IncompatibleType(_))
        ));
    }

    #[test]
    fn test_is_zero() {
        assert!(int(0).is_zero().unwrap());
        assert!(!int(1).is_zero().unwrap());
        assert!(ValueFactory::decimal(-0.0).is_zero().unwrap());
        assert!(matches!(
            ValueFactory::boolean(false).is_zero(),
            Err(ValueError::IncompatibleType(_))
        ));
    }

    #[test]
    fn test_casts() {
        let value = int(300);
        assert_eq!(
            value.cast_as(TypeId::BigInt).unwrap(),
            ValueFactory::bigint(300)
        );
        assert!(matches!(
            value.cast_as(TypeId::TinyInt),
            Err(ValueError::OutOfRange(_))
        ));
        assert_eq!(value.cast_as(TypeId::Varchar).unwrap().to_string(), "300");
        assert_eq!(
            value.cast_as(TypeId::Decimal).unwrap().get_as::<f64>().unwrap(),
            300.0
        );
        assert!(matches!(
            value.cast_as(TypeId::Boolean),
            Err(ValueError::IncompatibleType(_))
        ));

        let decimal = ValueFactory::decimal(-2.9);
        assert_eq!(decimal.cast_as(TypeId::Integer).unwrap(), int(-2));
        assert!(matches!(
            ValueFactory::decimal(1e20).cast_as(TypeId::BigInt),
            Err(ValueError::OutOfRange(_))
        ));
        assert!(matches!(
            ValueFactory::decimal(f64::NAN).cast_as(TypeId::Integer),
            Err(ValueError::OutOfRange(_))
        ));

        let null = ValueFactory::null_value_by_type(TypeId::Integer)
            .cast_as(TypeId::Varchar)
            .unwrap();
        assert!(null.is_null());
        assert_eq!(null.type_id(), TypeId::Varchar);
    }

    #[test]
    fn test_storage_widths() {
        let mut storage = [0xffu8; 8];
        ValueFactory::smallint(-2)
            .serialize_to(&mut storage, true, None)
            .unwrap();
        assert_eq!(&storage[..2], &(-2i16).to_le_bytes());
        assert_eq!(&storage[2..], &[0xff; 6]);

        let null = ValueFactory::null_value_by_type(TypeId::Integer);
        null.serialize_to(&mut storage, true, None).unwrap();
        assert_eq!(&storage[..4], &INT32_NULL.to_le_bytes());

        let value = Value::deserialize_from(&storage, TypeId::Integer, true, None).unwrap();
        assert!(value.is_null());

        let mut short = [0u8; 3];
        assert_eq!(
            int(1).serialize_to(&mut short, true, None),
            Err(ValueError::BufferTooSmall {
                required: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_stream_is_big_endian() {
        let mut buf = BytesMut::new();
        int(0x0102_0304).serialize_to_stream(&mut buf).unwrap();
        assert_eq!(&buf[..], &[1, 2, 3, 4]);

        let value = Value::deserialize_from_stream(&mut buf, TypeId::Integer, None).unwrap();
        assert_eq!(value, int(0x0102_0304));
        assert!(buf.is_empty());

        let mut short = BytesMut::from(&[0u8, 1][..]);
        assert!(matches!(
            Value::deserialize_from_stream(&mut short, TypeId::BigInt, None),
            Err(ValueError::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_format() {
        assert_eq!(int(-12).to_string(), "-12");
        assert_eq!(ValueFactory::decimal(1.25).to_string(), "1.25");
        assert_eq!(ValueFactory::decimal(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(
            ValueFactory::null_value_by_type(TypeId::BigInt).to_string(),
            "NULL"
        );
    }
}
