//! VARCHAR and VARBINARY behavior, and the variable-length slot layout
//! shared with arrays.
//!
//! Inlined slot:
//!
//! ```text
//! +-------------+------------------+
//! | len (i32)   | bytes[len]       |     len = -1 encodes NULL
//! +-------------+------------------+
//! ```
//!
//! Non-inlined slot: an 8-byte [`VarlenHandle`] (zero encodes NULL) whose
//! pool block holds the same `len | bytes` layout.
//!
//! All slot integers are little-endian.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::hash::Hasher;

use bytes::{Buf, BufMut, BytesMut};
use rustc_hash::FxHasher;

use super::boolean::parse_boolean;
use super::numeric::{decimal_to_integer, make_integer};
use super::registry::{BinaryOp, Type, fixed_bytes, null_hash, unsupported_cast};
use super::timestamp::parse_timestamp;
use super::{OBJECT_LENGTH_NULL, TypeId, VALUE_NULL, Value, ValueError, ValueFactory};
use crate::ensure_buf_len;
use crate::pool::{VarlenHandle, VarlenPool};

const LEN_SIZE: usize = 4;

fn object_length(len: usize) -> Result<i32, ValueError> {
    i32::try_from(len).map_err(|_| {
        ValueError::OutOfRange(format!("{} bytes exceeds the variable-length limit", len))
    })
}

/// Converts a buffer length to a value length. [`VALUE_NULL`] is reserved.
fn value_length(len: usize) -> Result<u32, ValueError> {
    u32::try_from(len)
        .ok()
        .filter(|&len| len != VALUE_NULL)
        .ok_or_else(|| {
            ValueError::OutOfRange(format!("{} bytes exceeds the variable-length limit", len))
        })
}

/// Reads a `len | bytes` object from the front of `src`.
fn read_object(src: &[u8]) -> Result<Option<&[u8]>, ValueError> {
    ensure_buf_len!(src, LEN_SIZE);
    let len = i32::from_le_bytes(fixed_bytes(src));
    if len == OBJECT_LENGTH_NULL {
        return Ok(None);
    }
    if len < 0 {
        return Err(ValueError::InvalidFormat(format!(
            "negative object length {}",
            len
        )));
    }
    let end = LEN_SIZE + len as usize;
    ensure_buf_len!(src, end);
    Ok(Some(&src[LEN_SIZE..end]))
}

/// Writes `bytes` (or NULL) into a variable-length slot.
pub(super) fn write_slot(
    bytes: Option<&[u8]>,
    storage: &mut [u8],
    inlined: bool,
    pool: Option<&dyn VarlenPool>,
) -> Result<(), ValueError> {
    if inlined {
        let (len, body) = match bytes {
            Some(bytes) => (object_length(bytes.len())?, bytes),
            None => (OBJECT_LENGTH_NULL, &[][..]),
        };
        let end = LEN_SIZE + body.len();
        ensure_buf_len!(storage, end);
        storage[..LEN_SIZE].copy_from_slice(&len.to_le_bytes());
        storage[LEN_SIZE..end].copy_from_slice(body);
        return Ok(());
    }

    ensure_buf_len!(storage, VarlenHandle::SIZE);
    let Some(bytes) = bytes else {
        storage[..VarlenHandle::SIZE].fill(0);
        return Ok(());
    };

    let pool = pool.ok_or(ValueError::MissingPool)?;
    let (handle, _) = allocate_object(pool, bytes)?;
    storage[..VarlenHandle::SIZE].copy_from_slice(&handle.to_raw().to_le_bytes());
    tracing::trace!(handle = handle.to_raw(), len = bytes.len(), "varlen data written to pool");
    Ok(())
}

/// Copies `bytes` into a new `len | bytes` pool block and returns the handle
/// and the block's copy of `bytes`.
fn allocate_object<'p>(
    pool: &'p dyn VarlenPool,
    bytes: &[u8],
) -> Result<(VarlenHandle, &'p [u8]), ValueError> {
    let len = object_length(bytes.len())?;
    let mut object = Vec::with_capacity(LEN_SIZE + bytes.len());
    object.extend_from_slice(&len.to_le_bytes());
    object.extend_from_slice(bytes);
    let (handle, block) = pool.allocate(&object)?;
    Ok((handle, &block[LEN_SIZE..]))
}

/// Reads the bytes of a variable-length slot, or `None` for NULL.
///
/// Results borrow from `storage` (inlined) or `pool` (not inlined).
pub(super) fn read_slot<'s>(
    storage: &'s [u8],
    inlined: bool,
    pool: Option<&'s dyn VarlenPool>,
) -> Result<Option<&'s [u8]>, ValueError> {
    if inlined {
        return read_object(storage);
    }

    ensure_buf_len!(storage, VarlenHandle::SIZE);
    let raw = u64::from_le_bytes(fixed_bytes(storage));
    let Some(handle) = VarlenHandle::from_raw(raw) else {
        return Ok(None);
    };
    let pool = pool.ok_or(ValueError::MissingPool)?;
    let block = pool.get(handle).ok_or_else(|| {
        tracing::debug!(handle = raw, "slot references a block missing from the pool");
        ValueError::DanglingReference(raw)
    })?;
    read_object(block)
}

/// Moves a variable-length slot. Pooled data is not copied: the handle moves
/// to `dest` and `src` is reset to NULL.
pub(super) fn move_slot(
    dest: &mut [u8],
    src: &mut [u8],
    inlined: bool,
    src_pool: Option<&dyn VarlenPool>,
) -> Result<(), ValueError> {
    if inlined {
        let len = read_object(src)?.map_or(0, <[u8]>::len);
        let end = LEN_SIZE + len;
        ensure_buf_len!(dest, end);
        dest[..end].copy_from_slice(&src[..end]);
        return Ok(());
    }

    ensure_buf_len!(src, VarlenHandle::SIZE);
    ensure_buf_len!(dest, VarlenHandle::SIZE);
    let raw = u64::from_le_bytes(fixed_bytes(src));
    if let Some(handle) = VarlenHandle::from_raw(raw)
        && let Some(pool) = src_pool
        && pool.get(handle).is_none()
    {
        tracing::debug!(handle = raw, "shallow copy of a dangling slot");
        return Err(ValueError::DanglingReference(raw));
    }
    dest[..VarlenHandle::SIZE].copy_from_slice(&src[..VarlenHandle::SIZE]);
    src[..VarlenHandle::SIZE].fill(0);
    Ok(())
}

/// Writes a stream object: i32 length (-1 for NULL) then the bytes.
pub(super) fn put_object(bytes: Option<&[u8]>, out: &mut BytesMut) -> Result<(), ValueError> {
    match bytes {
        Some(bytes) => {
            out.put_i32(object_length(bytes.len())?);
            out.put_slice(bytes);
        }
        None => out.put_i32(OBJECT_LENGTH_NULL),
    }
    Ok(())
}

/// Splits a stream object off the front of `src`.
pub(super) fn take_object(src: &mut BytesMut) -> Result<Option<BytesMut>, ValueError> {
    ensure_buf_len!(src, LEN_SIZE);
    let len = src.get_i32();
    if len == OBJECT_LENGTH_NULL {
        return Ok(None);
    }
    if len < 0 {
        return Err(ValueError::InvalidFormat(format!(
            "negative object length {}",
            len
        )));
    }
    let len = len as usize;
    ensure_buf_len!(src, len);
    Ok(Some(src.split_to(len)))
}

/// Behavior of VARCHAR and VARBINARY.
///
/// The two compare bytewise with each other. VARCHAR text is expected to be
/// UTF-8 but is not validated; invalid sequences render lossily.
#[derive(Debug)]
pub struct VarlenType {
    type_id: TypeId,
}

impl VarlenType {
    pub(super) const fn new(type_id: TypeId) -> Self {
        Self { type_id }
    }

    fn bytes_of<'v>(val: &'v Value<'_>) -> &'v [u8] {
        val.varlen_bytes().unwrap_or_default()
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
        match (left.varlen_bytes(), right.varlen_bytes()) {
            (Some(a), Some(b)) => Ok(ValueFactory::boolean(pred(a.cmp(b)))),
            _ => Err(ValueError::incompatible(op, left.type_id(), right.type_id())),
        }
    }

    fn cast_text(&self, val: &Value<'_>, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        let text = String::from_utf8_lossy(Self::bytes_of(val));
        let conversion = || ValueError::Conversion {
            value: text.to_string(),
            target: type_id,
        };
        let trimmed = text.trim();

        match type_id {
            TypeId::Boolean => Ok(ValueFactory::boolean(
                parse_boolean(trimmed).ok_or_else(conversion)?,
            )),
            t if t.is_integer() => match trimmed.parse::<i64>() {
                Ok(v) => make_integer(t, v),
                // Accept "1.0"-style input the way a decimal cast would.
                Err(_) => decimal_to_integer(t, trimmed.parse::<f64>().map_err(|_| conversion())?),
            },
            TypeId::Decimal => Ok(ValueFactory::decimal(
                trimmed.parse::<f64>().map_err(|_| conversion())?,
            )),
            TypeId::Timestamp => Ok(ValueFactory::timestamp(
                parse_timestamp(trimmed).ok_or_else(conversion)?,
            )),
            _ => Err(unsupported_cast(self.type_id, type_id)),
        }
    }
}

impl Type for VarlenType {
    fn type_id(&self) -> TypeId {
        self.type_id
    }

    fn is_comparable(&self, other: TypeId) -> bool {
        other.is_varlen()
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

    fn min(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        if Self::compare_with("MIN", left, right, |ord| ord == Ordering::Greater)?.is_true() {
            Ok(right.copy())
        } else {
            Ok(left.copy())
        }
    }

    fn max(&self, left: &Value<'_>, right: &Value<'_>) -> Result<Value<'static>, ValueError> {
        if Self::compare_with("MAX", left, right, |ord| ord == Ordering::Less)?.is_true() {
            Ok(right.copy())
        } else {
            Ok(left.copy())
        }
    }

    /// Only MIN and MAX are defined, and only against varlen operands.
    fn operate_null(
        &self,
        op: BinaryOp,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        if !op.is_extremum() || !left.type_id().is_varlen() || !right.type_id().is_varlen() {
            return Err(ValueError::incompatible(
                op.symbol(),
                left.type_id(),
                right.type_id(),
            ));
        }
        Ok(ValueFactory::null_value_by_type(self.type_id))
    }

    fn is_inlined(&self, _val: &Value<'_>) -> bool {
        false
    }

    fn format_value(&self, val: &Value<'_>) -> String {
        if val.is_null() {
            return "NULL".to_string();
        }
        let bytes = Self::bytes_of(val);
        match self.type_id {
            TypeId::Varbinary => {
                let mut text = String::with_capacity(2 + bytes.len() * 2);
                text.push_str("\\x");
                for byte in bytes {
                    text.push_str(&format!("{:02x}", byte));
                }
                text
            }
            _ => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    fn hash(&self, val: &Value<'_>) -> u64 {
        if val.is_null() {
            return null_hash();
        }
        let mut hasher = FxHasher::default();
        hasher.write(Self::bytes_of(val));
        hasher.finish()
    }

    fn serialize_to(
        &self,
        val: &Value<'_>,
        storage: &mut [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        let bytes = if val.is_null() {
            None
        } else {
            Some(Self::bytes_of(val))
        };
        write_slot(bytes, storage, inlined, pool)
    }

    fn serialize_to_stream(&self, val: &Value<'_>, out: &mut BytesMut) -> Result<(), ValueError> {
        let bytes = if val.is_null() {
            None
        } else {
            Some(Self::bytes_of(val))
        };
        put_object(bytes, out)
    }

    fn deserialize_from<'s>(
        &self,
        storage: &'s [u8],
        inlined: bool,
        pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Value<'s>, ValueError> {
        Ok(match read_slot(storage, inlined, pool)? {
            Some(bytes) => ValueFactory::varlen(self.type_id, Cow::Borrowed(bytes)),
            None => ValueFactory::null_value_by_type(self.type_id),
        })
    }

    fn deserialize_from_stream<'p>(
        &self,
        src: &mut BytesMut,
        pool: Option<&'p dyn VarlenPool>,
    ) -> Result<Value<'p>, ValueError> {
        let Some(bytes) = take_object(src)? else {
            return Ok(ValueFactory::null_value_by_type(self.type_id));
        };
        match pool {
            Some(pool) => {
                let (handle, block) = allocate_object(pool, &bytes[..])?;
                tracing::trace!(handle = handle.to_raw(), len = bytes.len(), "stream data copied to pool");
                Ok(ValueFactory::varlen(self.type_id, Cow::Borrowed(block)))
            }
            None => Ok(ValueFactory::varlen(self.type_id, Cow::Owned(bytes.to_vec()))),
        }
    }

    fn shallow_copy(
        &self,
        dest: &mut [u8],
        src: &mut [u8],
        inlined: bool,
        src_pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        move_slot(dest, src, inlined, src_pool)
    }

    fn data<'v>(&self, val: &'v Value<'_>) -> Result<&'v [u8], ValueError> {
        Ok(Self::bytes_of(val))
    }

    fn data_from_storage<'s>(
        &self,
        storage: &'s [u8],
        inlined: bool,
        pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Option<&'s [u8]>, ValueError> {
        read_slot(storage, inlined, pool)
    }

    fn length(&self, val: &Value<'_>) -> Result<u32, ValueError> {
        if val.is_null() {
            return Ok(VALUE_NULL);
        }
        value_length(Self::bytes_of(val).len())
    }

    fn cast_as(&self, val: &Value<'_>, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        let supported = match self.type_id {
            TypeId::Varchar => {
                type_id.is_varlen()
                    || type_id.is_numeric()
                    || matches!(type_id, TypeId::Boolean | TypeId::Timestamp)
            }
            _ => type_id.is_varlen(),
        };
        if !supported {
            return Err(unsupported_cast(self.type_id, type_id));
        }
        if val.is_null() {
            return Ok(ValueFactory::null_value_by_type(type_id));
        }
        if type_id.is_varlen() {
            return Ok(ValueFactory::varlen(
                type_id,
                Cow::Owned(Self::bytes_of(val).to_vec()),
            ));
        }
        self.cast_text(val, type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::MemoryVarlenPool;

    #[test]
    fn test_bytewise_ordering() {
        let abc = ValueFactory::varchar("abc");
        let abd = ValueFactory::varchar("abd");
        let ab = ValueFactory::varchar("ab");
        assert!(abc.compare_less_than(&abd).unwrap().is_true());
        assert!(ab.compare_less_than(&abc).unwrap().is_true());
        assert!(abc.compare_equals(&ValueFactory::varbinary(b"abc")).unwrap().is_true());
        assert_eq!(abc.min(&abd).unwrap(), abc);
        assert_eq!(abc.max(&ab).unwrap(), abc);
    }

    #[test]
    fn test_format() {
        assert_eq!(ValueFactory::varchar("héllo").to_string(), "héllo");
        assert_eq!(
            ValueFactory::varbinary(&[0xde, 0xad, 0x01]).to_string(),
            "\\xdead01"
        );
        assert_eq!(
            ValueFactory::null_value_by_type(TypeId::Varchar).to_string(),
            "NULL"
        );
    }

    #[test]
    fn test_value_length_reserves_null_sentinel() {
        assert_eq!(value_length(0), Ok(0));
        assert_eq!(value_length(VALUE_NULL as usize - 1), Ok(VALUE_NULL - 1));
        assert!(matches!(value_length(VALUE_NULL as usize), Err(ValueError::OutOfRange(_))));
        assert!(matches!(value_length(usize::MAX), Err(ValueError::OutOfRange(_))));
    }

    #[test]
    fn test_null_is_not_a_length() {
        let empty = ValueFactory::varchar("");
        assert!(!empty.is_null());
        assert_eq!(empty.length().unwrap(), 0);

        let null = ValueFactory::null_value_by_type(TypeId::Varchar);
        assert!(null.is_null());
        assert_eq!(null.length().unwrap(), VALUE_NULL);
        assert_eq!(null.data().unwrap(), b"");
        assert_ne!(null, empty);
    }

    #[test]
    fn test_length_and_data() {
        let value = ValueFactory::varchar("four");
        assert_eq!(value.length().unwrap(), 4);
        assert_eq!(value.data().unwrap(), b"four");
        assert!(!value.is_inlined());

        assert!(matches!(
            ValueFactory::integer(1).length(),
            Err(ValueError::IncompatibleType(_))
        ));
    }

    #[test]
    fn test_casts_from_text() {
        let cast = |text: &str, ty| ValueFactory::varchar(text).cast_as(ty);

        assert_eq!(cast(" 42 ", TypeId::Integer).unwrap(), ValueFactory::integer(42));
        assert_eq!(cast("7.9", TypeId::SmallInt).unwrap(), ValueFactory::smallint(7));
        assert_eq!(cast("2.5", TypeId::Decimal).unwrap(), ValueFactory::decimal(2.5));
        assert_eq!(cast("yes", TypeId::Boolean).unwrap(), ValueFactory::boolean(true));
        assert!(matches!(
            cast("300", TypeId::TinyInt),
            Err(ValueError::OutOfRange(_))
        ));
        assert_eq!(
            cast("abc", TypeId::Integer),
            Err(ValueError::Conversion {
                value: "abc".to_string(),
                target: TypeId::Integer
            })
        );

        let binary = ValueFactory::varchar("raw").cast_as(TypeId::Varbinary).unwrap();
        assert_eq!(binary.type_id(), TypeId::Varbinary);
        assert!(binary.owns_data());

        assert!(matches!(
            ValueFactory::varbinary(b"1").cast_as(TypeId::Integer),
            Err(ValueError::IncompatibleType(_))
        ));
    }

    #[test]
    fn test_inlined_slot_layout() {
        let mut storage = [0u8; 16];
        ValueFactory::varchar("hi")
            .serialize_to(&mut storage, true, None)
            .unwrap();
        assert_eq!(&storage[..6], &[2, 0, 0, 0, b'h', b'i']);

        let value = Value::deserialize_from(&storage, TypeId::Varchar, true, None).unwrap();
        assert!(!value.owns_data());
        assert_eq!(value.data().unwrap(), b"hi");

        ValueFactory::null_value_by_type(TypeId::Varchar)
            .serialize_to(&mut storage, true, None)
            .unwrap();
        assert_eq!(&storage[..4], &OBJECT_LENGTH_NULL.to_le_bytes());
        assert!(Value::deserialize_from(&storage, TypeId::Varchar, true, None)
            .unwrap()
            .is_null());
    }

    #[test]
    fn test_inlined_slot_too_small() {
        let mut storage = [0u8; 5];
        assert_eq!(
            ValueFactory::varchar("hello").serialize_to(&mut storage, true, None),
            Err(ValueError::BufferTooSmall {
                required: 9,
                available: 5
            })
        );
    }

    #[test]
    fn test_pooled_slot() {
        let pool = MemoryVarlenPool::new();
        let mut storage = [0u8; 8];
        ValueFactory::varbinary(&[1, 2, 3])
            .serialize_to(&mut storage, false, Some(&pool))
            .unwrap();
        assert_eq!(pool.block_count(), 1);
        assert_ne!(storage, [0u8; 8]);

        let value = Value::deserialize_from(&storage, TypeId::Varbinary, false, Some(&pool)).unwrap();
        assert!(!value.owns_data());
        assert_eq!(value.data().unwrap(), &[1, 2, 3]);

        assert_eq!(
            Value::data_from_storage(TypeId::Varbinary, &storage, false, Some(&pool)).unwrap(),
            Some(&[1u8, 2, 3][..])
        );
    }

    #[test]
    fn test_pooled_slot_errors() {
        let mut storage = [0u8; 8];
        assert_eq!(
            ValueFactory::varchar("x").serialize_to(&mut storage, false, None),
            Err(ValueError::MissingPool)
        );

        storage.copy_from_slice(&99u64.to_le_bytes());
        let pool = MemoryVarlenPool::new();
        assert_eq!(
            Value::deserialize_from(&storage, TypeId::Varchar, false, Some(&pool)),
            Err(ValueError::DanglingReference(99))
        );
    }

    #[test]
    fn test_shallow_copy_moves_handle() {
        let pool = MemoryVarlenPool::new();
        let mut src = [0u8; 8];
        let mut dest = [0u8; 8];
        ValueFactory::varchar("shared")
            .serialize_to(&mut src, false, Some(&pool))
            .unwrap();
        let handle = src;

        Value::shallow_copy_to(&mut dest, &mut src, TypeId::Varchar, false, Some(&pool)).unwrap();
        assert_eq!(dest, handle);
        assert_eq!(src, [0u8; 8]);
        assert_eq!(pool.block_count(), 1);

        let moved = Value::deserialize_from(&dest, TypeId::Varchar, false, Some(&pool)).unwrap();
        assert_eq!(moved.data().unwrap(), b"shared");
        assert!(Value::deserialize_from(&src, TypeId::Varchar, false, Some(&pool))
            .unwrap()
            .is_null());
    }

    #[test]
    fn test_shallow_copy_inlined() {
        let mut src = [0u8; 12];
        let mut dest = [0u8; 12];
        ValueFactory::varchar("abc")
            .serialize_to(&mut src, true, None)
            .unwrap();
        Value::shallow_copy_to(&mut dest, &mut src, TypeId::Varchar, true, None).unwrap();
        assert_eq!(dest[..7], src[..7]);

        assert!(matches!(
            Value::shallow_copy_to(&mut dest, &mut src, TypeId::Integer, true, None),
            Err(ValueError::IncompatibleType(_))
        ));
    }

    #[test]
    fn test_stream_into_pool() {
        let mut buf = BytesMut::new();
        ValueFactory::varchar("streamed")
            .serialize_to_stream(&mut buf)
            .unwrap();
        assert_eq!(&buf[..4], &8i32.to_be_bytes());

        let pool = MemoryVarlenPool::new();
        let value = Value::deserialize_from_stream(&mut buf, TypeId::Varchar, Some(&pool)).unwrap();
        assert!(!value.owns_data());
        assert_eq!(value.data().unwrap(), b"streamed");
        drop(value);
        assert_eq!(pool.block_count(), 1);
    }

    #[test]
    fn test_stream_columns_share_pool() {
        let mut buf = BytesMut::new();
        for text in ["first", "second", "third"] {
            ValueFactory::varchar(text).serialize_to_stream(&mut buf).unwrap();
        }

        let mut pool = MemoryVarlenPool::new();
        {
            let a = Value::deserialize_from_stream(&mut buf, TypeId::Varchar, Some(&pool)).unwrap();
            let b = Value::deserialize_from_stream(&mut buf, TypeId::Varchar, Some(&pool)).unwrap();
            let c = Value::deserialize_from_stream(&mut buf, TypeId::Varchar, Some(&pool)).unwrap();
            assert_eq!(a.data().unwrap(), b"first");
            assert_eq!(b.data().unwrap(), b"second");
            assert_eq!(c.data().unwrap(), b"third");
            assert_eq!(pool.block_count(), 3);
        }

        pool.clear();
        assert_eq!(pool.block_count(), 0);
        assert_eq!(pool.allocated_bytes(), 0);
    }

    #[test]
    fn test_stream_truncated() {
        let mut buf = BytesMut::new();
        buf.put_i32(10);
        buf.put_slice(b"short");
        assert!(matches!(
            Value::deserialize_from_stream(&mut buf, TypeId::Varchar, None),
            Err(ValueError::BufferTooSmall {
                required: 10,
                available: 5
            })
        ));
    }
}
