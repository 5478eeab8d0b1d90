//! The uniform value container.
//!
//! A [`Value`] is a type reference, a tagged payload and an extent. The
//! extent is either a byte length (scalars and variable-length data, with
//! [`VALUE_NULL`] marking a NULL scalar) or, for arrays, the element type.
//! NULL variable-length data and NULL arrays have no payload at all. Every
//! operation with semantic content is forwarded to the [`Type`] behavior
//! object registered for the value's [`TypeId`].
//!
//! Variable-length bytes are either owned by the value or borrowed from
//! somewhere that outlives it (inlined tuple storage, pool memory, a caller's
//! buffer). The borrow is tracked by the `'a` lifetime, so an owned buffer is
//! released exactly once when its value drops and a borrowed one never is.

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::BytesMut;

use super::registry::{BinaryOp, Type, get_instance};
use super::{TypeId, VALUE_NULL, ValueError};
use crate::pool::VarlenPool;

/// Physical payload of a value. The active variant always matches the
/// value's type. Scalar NULL-ness is tracked by [`Extent`]; variable-length
/// and array NULL-ness by the payload itself.
pub(super) enum Payload<'a> {
    Boolean(i8),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Decimal(f64),
    Timestamp(u64),
    /// `None` is a NULL VARCHAR or VARBINARY.
    Varlen(Option<Cow<'a, [u8]>>),
    /// `None` is a NULL array.
    Array(Option<Elements<'a>>),
}

/// Element storage of an array value.
pub(super) enum Elements<'a> {
    /// Wraps a sequence owned by the caller.
    Borrowed(&'a [Value<'a>]),
    Owned(Vec<Value<'a>>),
}

impl<'a> Elements<'a> {
    pub(super) fn as_slice(&self) -> &[Value<'a>] {
        match self {
            Elements::Borrowed(elements) => elements,
            Elements::Owned(elements) => elements,
        }
    }
}

/// Byte length or array element type. The interpretation is selected by the
/// value's type, never by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Extent {
    Length(u32),
    Element(TypeId),
}

/// A SQL value of any supported type.
///
/// Values are built through [`ValueFactory`](super::ValueFactory), by
/// deserialization, or as the result of another value's operation.
///
/// # Ownership
///
/// - `Clone` deep-copies: the clone always owns its buffer.
/// - Moves transfer the buffer; `std::mem::take` leaves an invalid NULL
///   behind whose drop releases nothing.
/// - `std::mem::swap` exchanges buffers together with everything else.
///
/// # Example
///
/// ```
/// use enhance_datum::datum::ValueFactory;
///
/// let five = ValueFactory::integer(5);
/// let seven = ValueFactory::integer(7);
/// let sum = five.add(&seven).unwrap();
/// assert!(sum.compare_equals(&ValueFactory::integer(12)).unwrap().is_true());
/// ```
pub struct Value<'a> {
    ty: &'static dyn Type,
    payload: Payload<'a>,
    extent: Extent,
}

impl<'a> Value<'a> {
    // Construction is reserved for the factory and the behavior objects.

    pub(super) fn scalar(type_id: TypeId, payload: Payload<'static>, is_null: bool) -> Self {
        Self {
            ty: get_instance(type_id),
            payload,
            extent: Extent::Length(if is_null { VALUE_NULL } else { 0 }),
        }
    }

    pub(super) fn varlen(type_id: TypeId, data: Cow<'a, [u8]>) -> Self {
        Self {
            ty: get_instance(type_id),
            // Saturates for oversized buffers; `length` reports those as
            // out of range and NULL-ness never depends on this field.
            extent: Extent::Length(u32::try_from(data.len()).unwrap_or(VALUE_NULL)),
            payload: Payload::Varlen(Some(data)),
        }
    }

    pub(super) fn varlen_null(type_id: TypeId) -> Self {
        Self {
            ty: get_instance(type_id),
            payload: Payload::Varlen(None),
            extent: Extent::Length(VALUE_NULL),
        }
    }

    pub(super) fn array(elements: Option<Elements<'a>>, element_type: TypeId) -> Self {
        Self {
            ty: get_instance(TypeId::Array),
            payload: Payload::Array(elements),
            extent: Extent::Element(element_type),
        }
    }

    pub(super) fn payload(&self) -> &Payload<'a> {
        &self.payload
    }

    pub(super) fn extent(&self) -> Extent {
        self.extent
    }

    /// Returns the array elements, or `None` for NULL and non-array values.
    pub(super) fn elements(&self) -> Option<&[Value<'a>]> {
        match &self.payload {
            Payload::Array(Some(elements)) => Some(elements.as_slice()),
            _ => None,
        }
    }

    /// Returns the variable-length bytes (empty for NULL), or `None` for
    /// non-varlen values.
    pub(super) fn varlen_bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Varlen(data) => Some(data.as_deref().unwrap_or_default()),
            _ => None,
        }
    }

    /// Returns the behavior object for this value's type.
    pub fn behavior(&self) -> &'static dyn Type {
        self.ty
    }

    /// Returns the type of this value.
    pub fn type_id(&self) -> TypeId {
        self.ty.type_id()
    }

    /// Returns true if this value is NULL.
    ///
    /// Scalar payload bits under NULL are meaningless; only the extent
    /// decides for them.
    pub fn is_null(&self) -> bool {
        match &self.payload {
            Payload::Varlen(data) => data.is_none(),
            Payload::Array(elements) => elements.is_none(),
            _ => self.extent == Extent::Length(VALUE_NULL),
        }
    }

    /// Returns true if this value owns its variable-length buffer.
    ///
    /// Always false for scalars, which have no buffer.
    pub fn owns_data(&self) -> bool {
        match &self.payload {
            Payload::Varlen(Some(Cow::Owned(_))) => true,
            Payload::Array(Some(Elements::Owned(_))) => true,
            _ => false,
        }
    }

    /// Returns true for a boolean TRUE.
    ///
    /// Only defined for boolean values.
    pub fn is_true(&self) -> bool {
        debug_assert_eq!(self.type_id(), TypeId::Boolean, "is_true on non-boolean value");
        matches!(self.payload, Payload::Boolean(1)) && !self.is_null()
    }

    /// Returns true for a boolean FALSE.
    ///
    /// Only defined for boolean values.
    pub fn is_false(&self) -> bool {
        debug_assert_eq!(self.type_id(), TypeId::Boolean, "is_false on non-boolean value");
        matches!(self.payload, Payload::Boolean(0)) && !self.is_null()
    }

    /// Reads the scalar payload as `T`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::IncompatibleType` if `T` is not the physical
    /// representation of this value's type.
    pub fn get_as<T: Primitive>(&self) -> Result<T, ValueError> {
        T::extract(self).ok_or_else(|| {
            ValueError::IncompatibleType(format!(
                "{} payload cannot be read as {}",
                self.type_id(),
                std::any::type_name::<T>()
            ))
        })
    }

    /// Deep-copies this value into one that owns all of its data.
    pub fn to_owned_value(&self) -> Value<'static> {
        let payload = match &self.payload {
            Payload::Boolean(v) => Payload::Boolean(*v),
            Payload::TinyInt(v) => Payload::TinyInt(*v),
            Payload::SmallInt(v) => Payload::SmallInt(*v),
            Payload::Integer(v) => Payload::Integer(*v),
            Payload::BigInt(v) => Payload::BigInt(*v),
            Payload::Decimal(v) => Payload::Decimal(*v),
            Payload::Timestamp(v) => Payload::Timestamp(*v),
            Payload::Varlen(data) => {
                Payload::Varlen(data.as_ref().map(|data| Cow::Owned(data.to_vec())))
            }
            Payload::Array(elements) => Payload::Array(elements.as_ref().map(|elements| {
                Elements::Owned(elements.as_slice().iter().map(Value::to_owned_value).collect())
            })),
        };
        Value {
            ty: self.ty,
            payload,
            extent: self.extent,
        }
    }

    /// Converts this value into one that owns all of its data, reusing
    /// buffers it already owns.
    pub fn into_owned(self) -> Value<'static> {
        let payload = match self.payload {
            Payload::Boolean(v) => Payload::Boolean(v),
            Payload::TinyInt(v) => Payload::TinyInt(v),
            Payload::SmallInt(v) => Payload::SmallInt(v),
            Payload::Integer(v) => Payload::Integer(v),
            Payload::BigInt(v) => Payload::BigInt(v),
            Payload::Decimal(v) => Payload::Decimal(v),
            Payload::Timestamp(v) => Payload::Timestamp(v),
            Payload::Varlen(data) => {
                Payload::Varlen(data.map(|data| Cow::Owned(data.into_owned())))
            }
            Payload::Array(elements) => Payload::Array(elements.map(|elements| match elements {
                Elements::Borrowed(elements) => {
                    Elements::Owned(elements.iter().map(Value::to_owned_value).collect())
                }
                Elements::Owned(elements) => {
                    Elements::Owned(elements.into_iter().map(Value::into_owned).collect())
                }
            })),
        };
        Value {
            ty: self.ty,
            payload,
            extent: self.extent,
        }
    }

    /// Renders `"Type: <name>, Value: <text>"`.
    pub fn info(&self) -> String {
        format!("Type: {}, Value: {}", self.type_id(), self)
    }

    // Comparisons. The comparability check always runs first; NULL operands
    // are then routed to the type's NULL hook instead of the comparison.

    fn ensure_comparable(&self, other: &Value<'_>, op: &str) -> Result<(), ValueError> {
        if self.check_comparable(other) {
            Ok(())
        } else {
            Err(ValueError::incompatible(op, self.type_id(), other.type_id()))
        }
    }

    /// SQL `=`, returning a boolean value.
    pub fn compare_equals(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.ensure_comparable(other, "=")?;
        if self.is_null() || other.is_null() {
            return Ok(self.ty.compare_null(self, other));
        }
        self.ty.compare_equals(self, other)
    }

    /// SQL `<>`, returning a boolean value.
    pub fn compare_not_equals(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.ensure_comparable(other, "<>")?;
        if self.is_null() || other.is_null() {
            return Ok(self.ty.compare_null(self, other));
        }
        self.ty.compare_not_equals(self, other)
    }

    /// SQL `<`, returning a boolean value.
    pub fn compare_less_than(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.ensure_comparable(other, "<")?;
        if self.is_null() || other.is_null() {
            return Ok(self.ty.compare_null(self, other));
        }
        self.ty.compare_less_than(self, other)
    }

    /// SQL `<=`, returning a boolean value.
    pub fn compare_less_than_equals(
        &self,
        other: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        self.ensure_comparable(other, "<=")?;
        if self.is_null() || other.is_null() {
            return Ok(self.ty.compare_null(self, other));
        }
        self.ty.compare_less_than_equals(self, other)
    }

    /// SQL `>`, returning a boolean value.
    pub fn compare_greater_than(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.ensure_comparable(other, ">")?;
        if self.is_null() || other.is_null() {
            return Ok(self.ty.compare_null(self, other));
        }
        self.ty.compare_greater_than(self, other)
    }

    /// SQL `>=`, returning a boolean value.
    pub fn compare_greater_than_equals(
        &self,
        other: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        self.ensure_comparable(other, ">=")?;
        if self.is_null() || other.is_null() {
            return Ok(self.ty.compare_null(self, other));
        }
        self.ty.compare_greater_than_equals(self, other)
    }

    // Arithmetic. Any NULL operand goes to `operate_null`, never to the
    // operator itself.

    /// Returns `self + other`.
    pub fn add(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        if self.is_null() || other.is_null() {
            return self.ty.operate_null(BinaryOp::Add, self, other);
        }
        self.ty.add(self, other)
    }

    /// Returns `self - other`.
    pub fn subtract(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        if self.is_null() || other.is_null() {
            return self.ty.operate_null(BinaryOp::Subtract, self, other);
        }
        self.ty.subtract(self, other)
    }

    /// Returns `self * other`.
    pub fn multiply(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        if self.is_null() || other.is_null() {
            return self.ty.operate_null(BinaryOp::Multiply, self, other);
        }
        self.ty.multiply(self, other)
    }

    /// Returns `self / other`.
    pub fn divide(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        if self.is_null() || other.is_null() {
            return self.ty.operate_null(BinaryOp::Divide, self, other);
        }
        self.ty.divide(self, other)
    }

    /// Returns `self % other`.
    pub fn modulo(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        if self.is_null() || other.is_null() {
            return self.ty.operate_null(BinaryOp::Modulo, self, other);
        }
        self.ty.modulo(self, other)
    }

    /// Returns a copy of the smaller operand.
    pub fn min(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        if self.is_null() || other.is_null() {
            return self.ty.operate_null(BinaryOp::Min, self, other);
        }
        self.ty.min(self, other)
    }

    /// Returns a copy of the larger operand.
    pub fn max(&self, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        if self.is_null() || other.is_null() {
            return self.ty.operate_null(BinaryOp::Max, self, other);
        }
        self.ty.max(self, other)
    }

    /// Returns the square root as a decimal.
    pub fn sqrt(&self) -> Result<Value<'static>, ValueError> {
        self.ty.sqrt(self)
    }

    /// Returns the NULL result the type defines for `op` with `other`.
    pub fn operate_null(&self, op: BinaryOp, other: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.ty.operate_null(op, self, other)
    }

    /// Returns true if this numeric value is zero.
    pub fn is_zero(&self) -> Result<bool, ValueError> {
        self.ty.is_zero(self)
    }

    /// Returns true if the data lives inside the value itself rather than
    /// behind an indirection.
    pub fn is_inlined(&self) -> bool {
        self.ty.is_inlined(self)
    }

    /// Returns true if this is an integer-family value.
    pub fn check_integer(&self) -> bool {
        self.type_id().is_integer()
    }

    /// Returns true if comparisons between `self` and `other` are defined.
    pub fn check_comparable(&self, other: &Value<'_>) -> bool {
        self.ty.is_comparable(other.type_id())
    }

    /// Computes a hash consistent with [`compare_equals`](Self::compare_equals).
    pub fn hash_value(&self) -> u64 {
        self.ty.hash(self)
    }

    /// Folds this value's hash into `seed`.
    pub fn hash_combine(&self, seed: &mut u64) {
        self.ty.hash_combine(self, seed)
    }

    /// Serializes this value into a tuple slot.
    ///
    /// With `inlined`, variable-length bytes are written into `storage`.
    /// Without it, they are allocated from `pool` and `storage` receives a
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::BufferTooSmall` if the slot is too small and
    /// `ValueError::MissingPool` if a pool is needed but not supplied.
    pub fn serialize_to(
        &self,
        storage: &mut [u8],
        inlined: bool,
        pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        self.ty.serialize_to(self, storage, inlined, pool)
    }

    /// Appends the byte-stream encoding of this value to `out`.
    pub fn serialize_to_stream(&self, out: &mut BytesMut) -> Result<(), ValueError> {
        self.ty.serialize_to_stream(self, out)
    }

    /// Reads a value of `type_id` from a tuple slot.
    ///
    /// Variable-length results borrow from `storage` (inlined) or from `pool`
    /// (not inlined) and do not own their bytes.
    pub fn deserialize_from<'s>(
        storage: &'s [u8],
        type_id: TypeId,
        inlined: bool,
        pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Value<'s>, ValueError> {
        get_instance(type_id).deserialize_from(storage, inlined, pool)
    }

    /// Reads a value of `type_id` from the front of `src`.
    ///
    /// With a pool, variable-length bytes are copied into it and the result
    /// borrows them; without one the result owns its bytes.
    pub fn deserialize_from_stream<'p>(
        src: &mut BytesMut,
        type_id: TypeId,
        pool: Option<&'p dyn VarlenPool>,
    ) -> Result<Value<'p>, ValueError> {
        get_instance(type_id).deserialize_from_stream(src, pool)
    }

    /// Moves serialized variable-length data from slot `src` to slot `dest`
    /// without copying pooled bytes.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::IncompatibleType` for non-varlen types.
    pub fn shallow_copy_to(
        dest: &mut [u8],
        src: &mut [u8],
        type_id: TypeId,
        inlined: bool,
        src_pool: Option<&dyn VarlenPool>,
    ) -> Result<(), ValueError> {
        get_instance(type_id).shallow_copy(dest, src, inlined, src_pool)
    }

    /// Returns the raw variable-length bytes.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::IncompatibleType` for non-varlen types.
    pub fn data(&self) -> Result<&[u8], ValueError> {
        self.ty.data(self)
    }

    /// Reads raw variable-length bytes straight from a tuple slot.
    ///
    /// Returns `None` for a NULL slot.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::IncompatibleType` for non-varlen types.
    pub fn data_from_storage<'s>(
        type_id: TypeId,
        storage: &'s [u8],
        inlined: bool,
        pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Option<&'s [u8]>, ValueError> {
        match type_id {
            TypeId::Varchar | TypeId::Varbinary => {
                get_instance(type_id).data_from_storage(storage, inlined, pool)
            }
            _ => Err(ValueError::unsupported("raw data access", type_id)),
        }
    }

    /// Returns the variable-length byte count ([`VALUE_NULL`] for NULL).
    ///
    /// # Errors
    ///
    /// Returns `ValueError::IncompatibleType` for non-varlen types.
    pub fn length(&self) -> Result<u32, ValueError> {
        self.ty.length(self)
    }

    /// Returns an owned copy of this value.
    pub fn copy(&self) -> Value<'static> {
        self.ty.copy(self)
    }

    /// Converts this value to `type_id`.
    pub fn cast_as(&self, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        self.ty.cast_as(self, type_id)
    }

    /// Returns a copy of the array element at `idx`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` past the end and
    /// `ValueError::IncompatibleType` for non-array values.
    pub fn element_at(&self, idx: u64) -> Result<Value<'static>, ValueError> {
        self.ty.element_at(self, idx)
    }

    /// Returns the element type of an array value.
    pub fn element_type(&self) -> Result<TypeId, ValueError> {
        self.ty.element_type(self)
    }

    /// Tests whether `object` is an element of this array.
    pub fn in_list(&self, object: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.ty.in_list(self, object)
    }
}

impl Default for Value<'_> {
    fn default() -> Self {
        Value {
            ty: get_instance(TypeId::Invalid),
            payload: Payload::Integer(0),
            extent: Extent::Length(VALUE_NULL),
        }
    }
}

impl Clone for Value<'_> {
    fn clone(&self) -> Self {
        self.to_owned_value()
    }
}

impl PartialEq for Value<'_> {
    /// NULLs of comparable types are equal to each other; everything else
    /// goes through `compare_equals`.
    fn eq(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null()
                && other.is_null()
                && (self.type_id() == other.type_id() || self.check_comparable(other));
        }

        if let (Some(left), Some(right)) = (self.elements(), other.elements()) {
            return self.extent == other.extent
                && left.len() == right.len()
                && left.iter().zip(right).all(|(l, r)| l == r);
        }

        self.compare_equals(other)
            .map(|result| result.is_true())
            .unwrap_or(false)
    }
}

impl Eq for Value<'_> {}

impl Hash for Value<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_value());
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ty.format_value(self))
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.type_id())
            .field("value", &self.ty.format_value(self))
            .field("owns_data", &self.owns_data())
            .finish()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Physical scalar representations readable with [`Value::get_as`].
pub trait Primitive: sealed::Sealed + Copy {
    #[doc(hidden)]
    fn extract(value: &Value<'_>) -> Option<Self>;
}

macro_rules! primitive {
    ($ty:ty, $($variant:ident)|+) => {
        impl sealed::Sealed for $ty {}

        impl Primitive for $ty {
            fn extract(value: &Value<'_>) -> Option<Self> {
                match value.payload {
                    $(Payload::$variant(v) => Some(v),)+
                    _ => None,
                }
            }
        }
    };
}

primitive!(i8, Boolean | TinyInt);
primitive!(i16, SmallInt);
primitive!(i32, Integer);
primitive!(i64, BigInt);
primitive!(f64, Decimal);
primitive!(u64, Timestamp);

impl sealed::Sealed for bool {}

impl Primitive for bool {
    fn extract(value: &Value<'_>) -> Option<Self> {
        match value.payload {
            Payload::Boolean(v) => Some(v == 1),
            _ => None,
        }
    }
}
