//! ARRAY behavior.
//!
//! Stream encoding:
//!
//! ```text
//! +--------------+-------------------+---------------------------+
//! | count (i32)  | element type (u8) | count element encodings   |
//! +--------------+-------------------+---------------------------+
//! ```
//!
//! A count of -1 is a NULL array. In tuple storage the stream encoding is
//! the payload of an ordinary variable-length slot.

use std::hash::Hasher;

use bytes::{Buf, BufMut, BytesMut};
use rustc_hash::FxHasher;

use super::registry::{Type, get_instance, null_hash, unsupported_cast};
use super::value::Extent;
use super::varlen::{read_slot, write_slot};
use super::{OBJECT_LENGTH_NULL, TypeId, Value, ValueError, ValueFactory};
use crate::ensure_buf_len;
use crate::pool::VarlenPool;

/// Array of values sharing one element type. Not comparable; supports
/// element access and `IN` membership.
#[derive(Debug)]
pub struct ArrayType;

impl ArrayType {
    fn element_type_of(val: &Value<'_>) -> TypeId {
        match val.extent() {
            Extent::Element(type_id) => type_id,
            Extent::Length(_) => TypeId::Invalid,
        }
    }

    fn decode_stream(src: &mut BytesMut) -> Result<Value<'static>, ValueError> {
        ensure_buf_len!(src, 5);
        let count = src.get_i32();
        let tag = src.get_u8();
        let element_type = TypeId::from_u8(tag)
            .ok_or_else(|| ValueError::InvalidFormat(format!("unknown element type {}", tag)))?;

        if count == OBJECT_LENGTH_NULL {
            return Ok(ValueFactory::array_null(element_type));
        }
        if count < 0 {
            return Err(ValueError::InvalidFormat(format!(
                "negative array length {}",
                count
            )));
        }

        let behavior = get_instance(element_type);
        let mut elements = Vec::with_capacity((count as usize).min(src.len()));
        for _ in 0..count {
            elements.push(behavior.deserialize_from_stream(src, None)?);
        }
        ValueFactory::array_owned(elements, element_type)
            .map_err(|e| ValueError::InvalidFormat(e.to_string()))
    }
}

impl Type for ArrayType {
    fn type_id(&self) -> TypeId {
        TypeId::Array
    }

    fn is_inlined(&self, _val: &Value<'_>) -> bool {
        false
    }

    fn format_value(&self, val: &Value<'_>) -> String {
        match val.elements() {
            Some(elements) => {
                let items: Vec<String> = elements.iter().map(|e| e.to_string()).collect();
                format!("[{}]", items.join(", "))
            }
            None => "NULL".to_string(),
        }
    }

    fn hash(&self, val: &Value<'_>) -> u64 {
        let Some(elements) = val.elements() else {
            return null_hash();
        };
        let mut seed = elements.len() as u64;
        for element in elements {
            element.hash_combine(&mut seed);
        }
        let mut hasher = FxHasher::default();
        hasher.write_u64(seed);
        hasher.finish()
    }

    fn serialize_to(
        &self,
        val: &Value<'_>,
        storage: &mut [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        if val.is_null() {
            return write_slot(None, storage, inlined, pool);
        }
        let mut encoded = BytesMut::new();
        self.serialize_to_stream(val, &mut encoded)?;
        write_slot(Some(&encoded[..]), storage, inlined, pool)
    }

    fn serialize_to_stream(&self, val: &Value<'_>, out: &mut BytesMut) -> Result<(), ValueError> {
        let element_type = Self::element_type_of(val);
        let Some(elements) = val.elements() else {
            out.put_i32(OBJECT_LENGTH_NULL);
            out.put_u8(element_type.to_u8());
            return Ok(());
        };

        let count = i32::try_from(elements.len()).map_err(|_| {
            ValueError::OutOfRange(format!("{} elements exceeds the array limit", elements.len()))
        })?;
        out.put_i32(count);
        out.put_u8(element_type.to_u8());
        for element in elements {
            element.serialize_to_stream(out)?;
        }
        Ok(())
    }

    /// NULL slots read back as a NULL array of INVALID element type.
    fn deserialize_from<'s>(
        &self,
        storage: &'s [u8],
        inlined: bool,
        pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Value<'s>, ValueError> {
        match read_slot(storage, inlined, pool)? {
            Some(bytes) => Self::decode_stream(&mut BytesMut::from(bytes)),
            None => Ok(ValueFactory::array_null(TypeId::Invalid)),
        }
    }

    fn deserialize_from_stream<'p>(
        &self,
        src: &mut BytesMut,
        _pool: Option<&'p dyn VarlenPool>,
    ) -> Result<Value<'p>, ValueError> {
        Self::decode_stream(src)
    }

    fn cast_as(&self, val: &Value<'_>, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        match type_id {
            TypeId::Array => Ok(val.copy()),
            _ => Err(unsupported_cast(TypeId::Array, type_id)),
        }
    }

    fn element_at(&self, val: &Value<'_>, idx: u64) -> Result<Value<'static>, ValueError> {
        let Some(elements) = val.elements() else {
            return Ok(ValueFactory::null_value_by_type(Self::element_type_of(val)));
        };
        usize::try_from(idx)
            .ok()
            .and_then(|idx| elements.get(idx))
            .map(Value::copy)
            .ok_or_else(|| {
                ValueError::OutOfRange(format!(
                    "index {} out of bounds for array of length {}",
                    idx,
                    elements.len()
                ))
            })
    }

    fn element_type(&self, val: &Value<'_>) -> Result<TypeId, ValueError> {
        Ok(Self::element_type_of(val))
    }

    /// TRUE if a non-NULL element equals `object`. Otherwise NULL if any
    /// element is NULL, else FALSE. A NULL list or object yields NULL.
    fn in_list(&self, list: &Value<'_>, object: &Value<'_>) -> Result<Value<'static>, ValueError> {
        let element_type = Self::element_type_of(list);
        let Some(elements) = list.elements() else {
            return Ok(ValueFactory::boolean_null());
        };
        if object.is_null() {
            return Ok(ValueFactory::boolean_null());
        }
        if !get_instance(element_type).is_comparable(object.type_id()) {
            return Err(ValueError::incompatible("IN", element_type, object.type_id()));
        }

        let mut saw_null = false;
        for element in elements {
            if element.is_null() {
                saw_null = true;
            } else if element.compare_equals(object)?.is_true() {
                return Ok(ValueFactory::boolean(true));
            }
        }
        Ok(if saw_null {
            ValueFactory::boolean_null()
        } else {
            ValueFactory::boolean(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::MemoryVarlenPool;

    fn ints(values: &[i32]) -> Vec<Value<'static>> {
        values.iter().map(|&v| ValueFactory::integer(v)).collect()
    }

    #[test]
    fn test_element_at() {
        let array = ValueFactory::array_owned(ints(&[10, 20, 30]), TypeId::Integer).unwrap();
        assert_eq!(array.element_at(1).unwrap(), ValueFactory::integer(20));
        assert!(matches!(array.element_at(3), Err(ValueError::OutOfRange(_))));
        assert!(matches!(
            ValueFactory::integer(1).element_at(0),
            Err(ValueError::IncompatibleType(_))
        ));
    }

    #[test]
    fn test_element_at_copies() {
        let elements = [ValueFactory::varchar("borrowed")];
        let array = ValueFactory::array(&elements, TypeId::Varchar).unwrap();
        let element = array.element_at(0).unwrap();
        assert!(element.owns_data());
        assert_eq!(element.data().unwrap(), b"borrowed");
    }

    #[test]
    fn test_in_list() {
        let array = ValueFactory::array_owned(ints(&[1, 2, 3]), TypeId::Integer).unwrap();
        assert!(array.in_list(&ValueFactory::integer(2)).unwrap().is_true());
        assert!(array.in_list(&ValueFactory::bigint(3)).unwrap().is_true());
        assert!(array.in_list(&ValueFactory::integer(4)).unwrap().is_false());

        let null = ValueFactory::null_value_by_type(TypeId::Integer);
        assert!(array.in_list(&null).unwrap().is_null());

        let mut with_null = ints(&[1]);
        with_null.push(ValueFactory::null_value_by_type(TypeId::Integer));
        let array = ValueFactory::array_owned(with_null, TypeId::Integer).unwrap();
        assert!(array.in_list(&ValueFactory::integer(1)).unwrap().is_true());
        assert!(array.in_list(&ValueFactory::integer(5)).unwrap().is_null());

        assert!(matches!(
            array.in_list(&ValueFactory::varchar("1")),
            Err(ValueError::IncompatibleType(_))
        ));
    }

    #[test]
    fn test_not_comparable() {
        let a = ValueFactory::array_owned(ints(&[1]), TypeId::Integer).unwrap();
        let b = ValueFactory::array_owned(ints(&[1]), TypeId::Integer).unwrap();
        assert!(!a.check_comparable(&b));
        assert!(matches!(a.compare_equals(&b), Err(ValueError::IncompatibleType(_))));
        // Structural equality still holds for collections keyed by value.
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
    }

    #[test]
    fn test_format() {
        let array = ValueFactory::array_owned(ints(&[1, 2]), TypeId::Integer).unwrap();
        assert_eq!(array.to_string(), "[1, 2]");
        assert_eq!(ValueFactory::array_null(TypeId::Integer).to_string(), "NULL");
    }

    #[test]
    fn test_stream_encoding() {
        let array = ValueFactory::array_owned(ints(&[7]), TypeId::Integer).unwrap();
        let mut buf = BytesMut::new();
        array.serialize_to_stream(&mut buf).unwrap();
        assert_eq!(&buf[..], &[0, 0, 0, 1, TypeId::Integer.to_u8(), 0, 0, 0, 7]);

        let decoded = Value::deserialize_from_stream(&mut buf, TypeId::Array, None).unwrap();
        assert_eq!(decoded, array);
        assert!(decoded.owns_data());
    }

    #[test]
    fn test_stream_null_keeps_element_type() {
        let mut buf = BytesMut::new();
        ValueFactory::array_null(TypeId::Decimal)
            .serialize_to_stream(&mut buf)
            .unwrap();
        let decoded = Value::deserialize_from_stream(&mut buf, TypeId::Array, None).unwrap();
        assert!(decoded.is_null());
        assert_eq!(decoded.element_type().unwrap(), TypeId::Decimal);
    }

    #[test]
    fn test_stream_rejects_bad_element_type() {
        let mut buf = BytesMut::new();
        buf.put_i32(0);
        buf.put_u8(200);
        assert!(matches!(
            Value::deserialize_from_stream(&mut buf, TypeId::Array, None),
            Err(ValueError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_pooled_storage() {
        let pool = MemoryVarlenPool::new();
        let elements = vec![
            ValueFactory::varchar_owned("a".to_string()),
            ValueFactory::null_value_by_type(TypeId::Varchar),
        ];
        let array = ValueFactory::array_owned(elements, TypeId::Varchar).unwrap();

        let mut storage = [0u8; 8];
        array.serialize_to(&mut storage, false, Some(&pool)).unwrap();
        let decoded = Value::deserialize_from(&storage, TypeId::Array, false, Some(&pool)).unwrap();
        assert_eq!(decoded, array);
    }
}
