//! Errors from value operations.

use thiserror::Error;

use super::TypeId;

/// Errors from value operations, casts and (de)serialization.
///
/// These are programmer or plan errors rather than transient conditions, so
/// nothing at this layer retries; they surface to the immediate caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    /// Operation is undefined for the value's type, or the operand types
    /// cannot be combined.
    #[error("incompatible type: {0}")]
    IncompatibleType(String),

    /// Array index beyond bounds, or numeric result outside the target range.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// Division or modulo by zero.
    #[error("division by zero")]
    DivideByZero,

    /// Arithmetic that is defined for the type but not for this input.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Text could not be parsed as the cast target type.
    #[error("cannot convert \"{value}\" to {target}")]
    Conversion {
        /// Offending input, rendered as text.
        value: String,
        /// Target type of the cast.
        target: TypeId,
    },

    /// Buffer too small for the operation.
    #[error("buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall {
        /// Bytes required.
        required: usize,
        /// Bytes available.
        available: usize,
    },

    /// Malformed serialized data.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Non-inlined serialization was requested without a pool.
    #[error("non-inlined variable-length data requires a pool")]
    MissingPool,

    /// The pool cannot satisfy the allocation.
    #[error("varlen pool exhausted: requested {requested} bytes, {available} available")]
    PoolExhausted {
        /// Bytes requested.
        requested: usize,
        /// Bytes still available under the pool bound.
        available: usize,
    },

    /// A tuple slot references a pool block that does not exist.
    #[error("dangling varlen pool reference: {0:#x}")]
    DanglingReference(u64),
}

impl ValueError {
    pub(crate) fn incompatible(op: &str, left: TypeId, right: TypeId) -> Self {
        ValueError::IncompatibleType(format!("{} is not defined for {} and {}", op, left, right))
    }

    pub(crate) fn unsupported(op: &str, ty: TypeId) -> Self {
        ValueError::IncompatibleType(format!("{} is not defined for {}", op, ty))
    }
}

/// Returns `ValueError::BufferTooSmall` if the buffer is too small.
#[macro_export]
macro_rules! ensure_buf_len {
    ($buf:expr, $required:expr) => {
        if $buf.len() < $required {
            return Err($crate::datum::ValueError::BufferTooSmall {
                required: $required,
                available: $buf.len(),
            });
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ValueError::incompatible("ADD", TypeId::Boolean, TypeId::Integer).to_string(),
            "incompatible type: ADD is not defined for BOOLEAN and INTEGER"
        );
        assert_eq!(ValueError::DivideByZero.to_string(), "division by zero");
        assert_eq!(
            ValueError::BufferTooSmall {
                required: 8,
                available: 2
            }
            .to_string(),
            "buffer too small: need 8 bytes, have 2"
        );
        assert_eq!(
            ValueError::Conversion {
                value: "abc".to_string(),
                target: TypeId::Integer
            }
            .to_string(),
            "cannot convert \"abc\" to INTEGER"
        );
        assert_eq!(
            ValueError::DanglingReference(0x2a).to_string(),
            "dangling varlen pool reference: 0x2a"
        );
    }

    #[test]
    fn test_ensure_buf_len() {
        fn check(buf: &[u8]) -> Result<(), ValueError> {
            ensure_buf_len!(buf, 4);
            Ok(())
        }
        assert!(check(&[0; 4]).is_ok());
        assert_eq!(
            check(&[0; 3]),
            Err(ValueError::BufferTooSmall {
                required: 4,
                available: 3
            })
        );
    }
}
