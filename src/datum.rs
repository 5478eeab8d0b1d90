//! SQL values and the type system behind them.
//!
//! [`Value`] is the single runtime container for a typed column value. All
//! semantics live in per-type behavior objects implementing [`Type`], which
//! [`get_instance`] resolves from a [`TypeId`]. Values are built with
//! [`ValueFactory`] or by deserializing tuple storage and byte streams.
//!
//! NULL is a property of the value, independent of its payload bits:
//! comparisons with NULL yield a NULL boolean, arithmetic with NULL yields the
//! NULL of the result type, and neither ever reaches the type's ordinary
//! operator.
//!
//! ```
//! use enhance_datum::datum::{TypeId, ValueFactory};
//!
//! let a = ValueFactory::integer(2);
//! let b = ValueFactory::decimal(0.5);
//! let sum = a.add(&b).unwrap();
//! assert_eq!(sum.type_id(), TypeId::Decimal);
//!
//! let null = ValueFactory::null_value_by_type(TypeId::Integer);
//! assert!(a.compare_equals(&null).unwrap().is_null());
//! ```

mod array;
mod boolean;
mod error;
mod factory;
mod invalid;
mod numeric;
mod registry;
mod timestamp;
mod type_id;
mod value;
mod varlen;

pub use error::ValueError;
pub use factory::ValueFactory;
pub use registry::{BinaryOp, Type, get_instance};
pub use timestamp::TimestampParts;
pub use type_id::*;
pub use value::{Primitive, Value};
