//! Constructors for every kind of value.

use std::borrow::Cow;

use super::value::{Elements, Payload};
use super::{
    BOOLEAN_NULL, DECIMAL_NULL, INT8_NULL, INT16_NULL, INT32_NULL, INT64_NULL, TIMESTAMP_NULL,
    TypeId, Value, ValueError,
};

/// Builds values.
///
/// Scalar constructors treat the type's NULL sentinel as NULL, so
/// `ValueFactory::integer(INT32_NULL)` is the same as
/// `ValueFactory::null_value_by_type(TypeId::Integer)`.
///
/// Variable-length constructors come in two flavors: the borrowing ones wrap
/// caller memory that must outlive the value, the `_owned` ones take
/// ownership of a buffer.
pub struct ValueFactory;

impl ValueFactory {
    pub fn boolean(value: bool) -> Value<'static> {
        Value::scalar(TypeId::Boolean, Payload::Boolean(value as i8), false)
    }

    /// Builds a boolean from its one-byte representation.
    ///
    /// The NULL sentinel is NULL, zero is FALSE and any other byte is TRUE.
    pub fn boolean_from_raw(raw: i8) -> Value<'static> {
        match raw {
            BOOLEAN_NULL => Value::scalar(TypeId::Boolean, Payload::Boolean(raw), true),
            0 => Self::boolean(false),
            _ => Self::boolean(true),
        }
    }

    pub fn boolean_null() -> Value<'static> {
        Self::boolean_from_raw(BOOLEAN_NULL)
    }

    pub fn tinyint(value: i8) -> Value<'static> {
        Value::scalar(TypeId::TinyInt, Payload::TinyInt(value), value == INT8_NULL)
    }

    pub fn smallint(value: i16) -> Value<'static> {
        Value::scalar(TypeId::SmallInt, Payload::SmallInt(value), value == INT16_NULL)
    }

    pub fn integer(value: i32) -> Value<'static> {
        Value::scalar(TypeId::Integer, Payload::Integer(value), value == INT32_NULL)
    }

    pub fn parameter_offset(value: i32) -> Value<'static> {
        Value::scalar(
            TypeId::ParameterOffset,
            Payload::Integer(value),
            value == INT32_NULL,
        )
    }

    pub fn bigint(value: i64) -> Value<'static> {
        Value::scalar(TypeId::BigInt, Payload::BigInt(value), value == INT64_NULL)
    }

    pub fn decimal(value: f64) -> Value<'static> {
        Value::scalar(TypeId::Decimal, Payload::Decimal(value), value == DECIMAL_NULL)
    }

    /// Builds a timestamp from its packed representation.
    pub fn timestamp(value: u64) -> Value<'static> {
        Value::scalar(
            TypeId::Timestamp,
            Payload::Timestamp(value),
            value == TIMESTAMP_NULL,
        )
    }

    /// Wraps borrowed text. The value does not own it.
    pub fn varchar(value: &str) -> Value<'_> {
        Value::varlen(TypeId::Varchar, Cow::Borrowed(value.as_bytes()))
    }

    pub fn varchar_owned(value: String) -> Value<'static> {
        Value::varlen(TypeId::Varchar, Cow::Owned(value.into_bytes()))
    }

    /// Wraps borrowed bytes. The value does not own them.
    pub fn varbinary(value: &[u8]) -> Value<'_> {
        Value::varlen(TypeId::Varbinary, Cow::Borrowed(value))
    }

    pub fn varbinary_owned(value: Vec<u8>) -> Value<'static> {
        Value::varlen(TypeId::Varbinary, Cow::Owned(value))
    }

    /// Builds a VARCHAR or VARBINARY value over `data`.
    pub(super) fn varlen(type_id: TypeId, data: Cow<'_, [u8]>) -> Value<'_> {
        debug_assert!(type_id.is_varlen());
        Value::varlen(type_id, data)
    }

    /// Wraps a caller-owned element sequence as an array value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::IncompatibleType` if `element_type` cannot be an
    /// element type or an element has a different type.
    pub fn array<'a>(
        elements: &'a [Value<'a>],
        element_type: TypeId,
    ) -> Result<Value<'a>, ValueError> {
        check_elements(elements, element_type)?;
        Ok(Value::array(Some(Elements::Borrowed(elements)), element_type))
    }

    /// Builds an array value that owns its elements.
    ///
    /// # Errors
    ///
    /// Same as [`array`](Self::array).
    pub fn array_owned(
        elements: Vec<Value<'_>>,
        element_type: TypeId,
    ) -> Result<Value<'_>, ValueError> {
        check_elements(&elements, element_type)?;
        Ok(Value::array(Some(Elements::Owned(elements)), element_type))
    }

    /// Builds a NULL array.
    pub fn array_null(element_type: TypeId) -> Value<'static> {
        Value::array(None, element_type)
    }

    /// Builds the NULL value of `type_id`.
    pub fn null_value_by_type(type_id: TypeId) -> Value<'static> {
        match type_id {
            TypeId::Boolean => Self::boolean_null(),
            TypeId::TinyInt => Self::tinyint(INT8_NULL),
            TypeId::SmallInt => Self::smallint(INT16_NULL),
            TypeId::Integer => Self::integer(INT32_NULL),
            TypeId::ParameterOffset => Self::parameter_offset(INT32_NULL),
            TypeId::BigInt => Self::bigint(INT64_NULL),
            TypeId::Decimal => Self::decimal(DECIMAL_NULL),
            TypeId::Timestamp => Self::timestamp(TIMESTAMP_NULL),
            TypeId::Varchar | TypeId::Varbinary => Value::varlen_null(type_id),
            TypeId::Array => Self::array_null(TypeId::Invalid),
            TypeId::Invalid => Value::default(),
        }
    }

    /// Builds the zero value of a numeric or variable-length type.
    ///
    /// Variable-length zeros are the empty string.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::IncompatibleType` for types without a zero.
    pub fn zero_value_by_type(type_id: TypeId) -> Result<Value<'static>, ValueError> {
        Ok(match type_id {
            TypeId::Boolean => Self::boolean(false),
            TypeId::TinyInt => Self::tinyint(0),
            TypeId::SmallInt => Self::smallint(0),
            TypeId::Integer => Self::integer(0),
            TypeId::ParameterOffset => Self::parameter_offset(0),
            TypeId::BigInt => Self::bigint(0),
            TypeId::Decimal => Self::decimal(0.0),
            TypeId::Timestamp => Self::timestamp(0),
            TypeId::Varchar | TypeId::Varbinary => Value::varlen(type_id, Cow::Borrowed(&[])),
            TypeId::Array | TypeId::Invalid => {
                return Err(ValueError::unsupported("zero value", type_id));
            }
        })
    }
}

fn check_elements(elements: &[Value<'_>], element_type: TypeId) -> Result<(), ValueError> {
    if matches!(element_type, TypeId::Array | TypeId::Invalid) {
        return Err(ValueError::unsupported("array element", element_type));
    }
    match elements.iter().find(|e| e.type_id() != element_type) {
        Some(mismatch) => Err(ValueError::IncompatibleType(format!(
            "{} element in {} array",
            mismatch.type_id(),
            element_type
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::VALUE_NULL;

    #[test]
    fn test_sentinels_construct_null() {
        assert!(ValueFactory::tinyint(INT8_NULL).is_null());
        assert!(ValueFactory::smallint(INT16_NULL).is_null());
        assert!(ValueFactory::integer(INT32_NULL).is_null());
        assert!(ValueFactory::bigint(INT64_NULL).is_null());
        assert!(ValueFactory::decimal(DECIMAL_NULL).is_null());
        assert!(ValueFactory::timestamp(TIMESTAMP_NULL).is_null());
        assert!(ValueFactory::boolean_from_raw(BOOLEAN_NULL).is_null());

        assert!(!ValueFactory::integer(0).is_null());
        assert!(!ValueFactory::decimal(f64::NAN).is_null());
    }

    #[test]
    fn test_boolean_from_raw_normalizes() {
        for raw in [1i8, 5, -1, i8::MAX] {
            let value = ValueFactory::boolean_from_raw(raw);
            assert!(!value.is_null());
            assert!(value.is_true(), "raw {}", raw);
            assert_eq!(value.to_string(), "true");
            assert_eq!(value, ValueFactory::boolean(true));
        }
        assert!(ValueFactory::boolean_from_raw(0).is_false());

        let storage = [5u8];
        let value = Value::deserialize_from(&storage, TypeId::Boolean, true, None).unwrap();
        assert!(value.is_true());
    }

    #[test]
    fn test_null_value_by_type() {
        for type_id in TypeId::ALL {
            let null = ValueFactory::null_value_by_type(type_id);
            assert!(null.is_null(), "{}", type_id);
            assert_eq!(null.type_id(), type_id);
        }
        let null = ValueFactory::null_value_by_type(TypeId::Varchar);
        assert_eq!(null.length().unwrap(), VALUE_NULL);
    }

    #[test]
    fn test_zero_value_by_type() {
        for type_id in [
            TypeId::TinyInt,
            TypeId::SmallInt,
            TypeId::Integer,
            TypeId::BigInt,
            TypeId::Decimal,
        ] {
            assert!(ValueFactory::zero_value_by_type(type_id).unwrap().is_zero().unwrap());
        }
        let empty = ValueFactory::zero_value_by_type(TypeId::Varchar).unwrap();
        assert_eq!(empty.length().unwrap(), 0);
        assert!(!empty.is_null());

        assert!(ValueFactory::zero_value_by_type(TypeId::Array).is_err());
    }

    #[test]
    fn test_varlen_ownership() {
        let text = String::from("hello");
        assert!(!ValueFactory::varchar(&text).owns_data());
        assert!(ValueFactory::varchar_owned(text.clone()).owns_data());
        assert!(!ValueFactory::varbinary(b"ab").owns_data());
        assert!(ValueFactory::varbinary_owned(vec![1, 2]).owns_data());
    }

    #[test]
    fn test_array_element_checks() {
        let elements = [ValueFactory::integer(1), ValueFactory::integer(2)];
        let array = ValueFactory::array(&elements, TypeId::Integer).unwrap();
        assert!(!array.owns_data());
        assert_eq!(array.element_type().unwrap(), TypeId::Integer);

        assert!(matches!(
            ValueFactory::array(&elements, TypeId::BigInt),
            Err(ValueError::IncompatibleType(_))
        ));
        assert!(matches!(
            ValueFactory::array_owned(vec![], TypeId::Array),
            Err(ValueError::IncompatibleType(_))
        ));

        let owned = ValueFactory::array_owned(elements.to_vec(), TypeId::Integer).unwrap();
        assert!(owned.owns_data());
    }
}
