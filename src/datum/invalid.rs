//! INVALID behavior: the type of a default-constructed value.

use bytes::BytesMut;

use super::registry::{Type, null_hash, unsupported_cast};
use super::{TypeId, Value, ValueError};
use crate::pool::VarlenPool;

/// Rejects everything except rendering and hashing.
#[derive(Debug)]
pub struct InvalidType;

impl Type for InvalidType {
    fn type_id(&self) -> TypeId {
        TypeId::Invalid
    }

    fn format_value(&self, _val: &Value<'_>) -> String {
        "NULL".to_string()
    }

    fn hash(&self, _val: &Value<'_>) -> u64 {
        null_hash()
    }

    fn serialize_to(
        &self,
        _val: &Value<'_>,
        _storage: &mut [u8],
        _inlined: bool,
        _pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        Err(ValueError::unsupported("serialization", TypeId::Invalid))
    }

    fn serialize_to_stream(&self, _val: &Value<'_>, _out: &mut BytesMut) -> Result<(), ValueError> {
        Err(ValueError::unsupported("serialization", TypeId::Invalid))
    }

    fn deserialize_from<'s>(
        &self,
        _storage: &'s [u8],
        _inlined: bool,
        _pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Value<'s>, ValueError> {
        Err(ValueError::unsupported("deserialization", TypeId::Invalid))
    }

    fn deserialize_from_stream<'p>(
        &self,
        _src: &mut BytesMut,
        _pool: Option<&'p dyn VarlenPool>,
    ) -> Result<Value<'p>, ValueError> {
        Err(ValueError::unsupported("deserialization", TypeId::Invalid))
    }

    fn cast_as(&self, _val: &Value<'_>, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        Err(unsupported_cast(TypeId::Invalid, type_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_value_rejects_operations() {
        let value = Value::default();
        assert_eq!(value.to_string(), "NULL");
        assert!(value.cast_as(TypeId::Integer).is_err());
        assert!(value.serialize_to(&mut [0u8; 8], true, None).is_err());
        assert!(value.serialize_to_stream(&mut BytesMut::new()).is_err());
        assert!(!value.check_comparable(&Value::default()));
    }
}
