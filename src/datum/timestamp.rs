//! TIMESTAMP behavior and the packed timestamp encoding.
//!
//! A timestamp is a single `u64` packing the calendar fields in mixed radix:
//!
//! ```text
//! ((((month * 32 + day) * 27 + (tz + 12)) * 10000 + year) * 100000
//!     + seconds_of_day) * 1000000 + microseconds
//! ```
//!
//! `tz` is a whole-hour UTC offset in `-12..=14`. Ordering of packed values
//! is the ordering of the integers, not of the instants they denote.

use std::cmp::Ordering;
use std::hash::Hasher;

use bytes::{Buf, BufMut, BytesMut};
use rustc_hash::FxHasher;

use super::registry::{BinaryOp, Type, fixed_bytes, null_hash, unsupported_cast};
use super::value::Payload;
use super::{TIMESTAMP_NULL, TypeId, Value, ValueError, ValueFactory};
use crate::ensure_buf_len;
use crate::pool::VarlenPool;

/// Calendar fields of a packed timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampParts {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub microsecond: u32,
    /// Whole-hour UTC offset.
    pub tz: i32,
}

impl TimestampParts {
    /// Packs the fields, or returns `None` if any is out of range.
    pub fn pack(&self) -> Option<u64> {
        let valid = self.year <= 9999
            && (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
            && self.microsecond < 1_000_000
            && (-12..=14).contains(&self.tz);
        if !valid {
            return None;
        }

        let seconds_of_day = (self.hour * 3600 + self.minute * 60 + self.second) as u64;
        let mut packed = self.month as u64 * 32 + self.day as u64;
        packed = packed * 27 + (self.tz + 12) as u64;
        packed = packed * 10_000 + self.year as u64;
        packed = packed * 100_000 + seconds_of_day;
        Some(packed * 1_000_000 + self.microsecond as u64)
    }

    /// Unpacks a packed timestamp.
    pub fn unpack(mut packed: u64) -> Self {
        let microsecond = (packed % 1_000_000) as u32;
        packed /= 1_000_000;
        let mut seconds = (packed % 100_000) as u32;
        packed /= 100_000;
        let second = seconds % 60;
        seconds /= 60;
        let minute = seconds % 60;
        seconds /= 60;
        let hour = seconds % 24;
        let year = (packed % 10_000) as u32;
        packed /= 10_000;
        let tz = (packed % 27) as i32 - 12;
        packed /= 27;
        let day = (packed % 32) as u32;
        packed /= 32;

        Self {
            year,
            month: packed as u32,
            day,
            hour,
            minute,
            second,
            microsecond,
            tz,
        }
    }
}

/// Renders a packed timestamp as `YYYY-MM-DD HH:MM:SS.ffffff+TZ`.
pub(super) fn format_timestamp(packed: u64) -> String {
    let p = TimestampParts::unpack(packed);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:06}{}{:02}",
        p.year,
        p.month,
        p.day,
        p.hour,
        p.minute,
        p.second,
        p.microsecond,
        if p.tz >= 0 { '+' } else { '-' },
        p.tz.abs()
    )
}

/// Parses `YYYY-MM-DD HH:MM:SS[.ffffff][+TZ|-TZ]`.
///
/// A missing offset means `+00`.
pub(super) fn parse_timestamp(text: &str) -> Option<u64> {
    let (date, time) = text.trim().split_once(' ')?;

    let mut date_fields = date.splitn(3, '-');
    let year = date_fields.next()?.parse().ok()?;
    let month = date_fields.next()?.parse().ok()?;
    let day = date_fields.next()?.parse().ok()?;

    let (clock, tz) = match time.find(['+', '-']) {
        Some(pos) => {
            let tz: i32 = time[pos + 1..].parse().ok()?;
            let tz = if time.as_bytes()[pos] == b'-' { -tz } else { tz };
            (&time[..pos], tz)
        }
        None => (time, 0),
    };

    let (hms, fraction) = match clock.split_once('.') {
        Some((hms, fraction)) => (hms, fraction),
        None => (clock, ""),
    };
    if fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let microsecond = if fraction.is_empty() {
        0
    } else {
        // Right-pad to microseconds: ".5" is 500000.
        format!("{:0<6}", fraction).parse().ok()?
    };

    let mut clock_fields = hms.splitn(3, ':');
    let hour = clock_fields.next()?.parse().ok()?;
    let minute = clock_fields.next()?.parse().ok()?;
    let second = clock_fields.next()?.parse().ok()?;

    TimestampParts {
        year,
        month,
        day,
        hour,
        minute,
        second,
        microsecond,
        tz,
    }
    .pack()
}

/// Packed 8-byte timestamp. Only comparable with itself.
#[derive(Debug)]
pub struct TimestampType;

impl TimestampType {
    fn raw_of(val: &Value<'_>) -> u64 {
        match *val.payload() {
            Payload::Timestamp(v) if !val.is_null() => v,
            _ => TIMESTAMP_NULL,
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
        if right.type_id() != TypeId::Timestamp {
            return Err(ValueError::incompatible(op, left.type_id(), right.type_id()));
        }
        Ok(ValueFactory::boolean(pred(
            Self::raw_of(left).cmp(&Self::raw_of(right)),
        )))
    }
}

impl Type for TimestampType {
    fn type_id(&self) -> TypeId {
        TypeId::Timestamp
    }

    fn is_comparable(&self, other: TypeId) -> bool {
        other == TypeId::Timestamp
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

    fn operate_null(
        &self,
        op: BinaryOp,
        left: &Value<'_>,
        right: &Value<'_>,
    ) -> Result<Value<'static>, ValueError> {
        if !op.is_extremum() || right.type_id() != TypeId::Timestamp {
            return Err(ValueError::incompatible(
                op.symbol(),
                left.type_id(),
                right.type_id(),
            ));
        }
        Ok(ValueFactory::null_value_by_type(TypeId::Timestamp))
    }

    fn format_value(&self, val: &Value<'_>) -> String {
        if val.is_null() {
            return "NULL".to_string();
        }
        format_timestamp(Self::raw_of(val))
    }

    fn hash(&self, val: &Value<'_>) -> u64 {
        if val.is_null() {
            return null_hash();
        }
        let mut hasher = FxHasher::default();
        hasher.write_u64(Self::raw_of(val));
        hasher.finish()
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
        out.put_u64(Self::raw_of(val));
        Ok(())
    }

    fn deserialize_from<'s>(
        &self,
        storage: &'s [u8],
        _inlined: bool,
        _pool: Option<&'s dyn VarlenPool>,
    ) -> Result<Value<'s>, ValueError> {
        ensure_buf_len!(storage, 8);
        Ok(ValueFactory::timestamp(u64::from_le_bytes(fixed_bytes(storage))))
    }

    fn deserialize_from_stream<'p>(
        &self,
        src: &mut BytesMut,
        _pool: Option<&'p dyn VarlenPool>,
    ) -> Result<Value<'p>, ValueError> {
        ensure_buf_len!(src, 8);
        Ok(ValueFactory::timestamp(src.get_u64()))
    }

    fn cast_as(&self, val: &Value<'_>, type_id: TypeId) -> Result<Value<'static>, ValueError> {
        match type_id {
            TypeId::Timestamp => Ok(val.copy()),
            TypeId::Varchar if val.is_null() => Ok(ValueFactory::null_value_by_type(type_id)),
            TypeId::Varchar => Ok(ValueFactory::varchar_owned(self.format_value(val))),
            _ => Err(unsupported_cast(TypeId::Timestamp, type_id)),
        }
    }
}
