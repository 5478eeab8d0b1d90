//! Runtime value and type subsystem of the enhance execution layer.
//!
//! - [`datum`]: the [`Value`](datum::Value) container, type behavior
//!   registry, casts and (de)serialization.
//! - [`pool`]: out-of-record storage for variable-length data.

pub mod datum;
pub mod pool;
