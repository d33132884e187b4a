//! Error handling for the PIR core.
//!
//! Every failure in this crate is a parameter-choice defect, not a
//! transient fault: callers must treat the current configuration as
//! invalid rather than retry or accept a degraded result.

use std::fmt;

/// Error type shared by all protocol phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PirError {
    /// Fewer clean erasure-code replicas than the decode threshold.
    InsufficientShares { clean: usize, needed: usize },
    /// The modulus lacks the roots of unity (or evaluation points) the
    /// requested dimension needs.
    InvalidModulus { q: u32, n: u32 },
    /// A buffer offset/length pair falls outside its buffer.
    DimensionMismatch {
        offset: usize,
        length: usize,
        buffer: usize,
    },
    /// `Field::inv` on zero or a non-unit.
    NotInvertible { value: u32, modulus: u32 },
    /// A protocol parameter set that fails validation.
    InvalidParams(String),
}

impl fmt::Display for PirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PirError::InsufficientShares { clean, needed } => write!(
                f,
                "erasure decode needs {} clean replicas, only {} available",
                needed, clean
            ),
            PirError::InvalidModulus { q, n } => {
                write!(f, "modulus {} admits no primitive {}-th root of unity", q, n)
            }
            PirError::DimensionMismatch {
                offset,
                length,
                buffer,
            } => write!(
                f,
                "range {}..{} out of bounds for buffer of length {}",
                offset,
                offset + length,
                buffer
            ),
            PirError::NotInvertible { value, modulus } => {
                write!(f, "{} is not invertible mod {}", value, modulus)
            }
            PirError::InvalidParams(reason) => write!(f, "invalid parameters: {}", reason),
        }
    }
}

impl std::error::Error for PirError {}

/// Result type for all PIR operations.
pub type Result<T> = std::result::Result<T, PirError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PirError::InsufficientShares { clean: 2, needed: 4 };
        assert!(err.to_string().contains("4 clean replicas"));

        let err = PirError::InvalidModulus { q: 15, n: 8 };
        assert!(err.to_string().contains("8-th root"));

        let err = PirError::DimensionMismatch {
            offset: 8,
            length: 4,
            buffer: 10,
        };
        assert!(err.to_string().contains("8..12"));

        let err = PirError::NotInvertible {
            value: 0,
            modulus: 17,
        };
        assert!(err.to_string().contains("not invertible"));
    }
}
