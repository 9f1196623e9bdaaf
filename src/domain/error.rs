//! Domain validation errors.
//!
//! These errors are returned when a curve configuration or the address
//! ledger would violate one of its invariants. Curve errors are always
//! fatal for the configuration that produced them: there is no partially
//! valid curve.
//!
//! # Examples
//!
//! ```
//! use lpforge::domain::curve::{CurveGenerator, SideMode};
//! use lpforge::domain::error::CurveError;
//!
//! let result = CurveGenerator::linear(0, 120, 4, SideMode::Both);
//! assert!(matches!(result, Err(CurveError::LevelOutOfRange { field: "end_level", .. })));
//! ```

use alloy_primitives::Address;
use thiserror::Error;

/// Errors raised while generating or validating a curve configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// A utilization level outside `0..=100`.
    #[error("{field} must be within 0..=100, got {value}")]
    LevelOutOfRange {
        /// Offending parameter name.
        field: &'static str,
        /// The rejected value.
        value: u32,
    },

    /// The derived utilization target is not strictly inside `(0, 10000)`.
    #[error("utilization target {value} bps must be strictly between 0 and 10000")]
    TargetOutOfRange {
        /// The rejected target in basis points.
        value: u32,
    },

    /// Bucket count outside the supported ladder length.
    #[error("bucket_count must be within 1..={max}, got {value}")]
    BucketCount {
        /// The rejected bucket count.
        value: usize,
        /// Largest supported bucket count.
        max: usize,
    },

    /// Unrecognised side mode string.
    #[error("unknown side mode '{0}', expected both, long or short")]
    UnknownSideMode(String),

    /// Fee and distribution sequences differ in length.
    #[error("fee rates ({fee}) and distribution rates ({distribution}) differ in length")]
    LengthMismatch {
        /// Number of fee rates.
        fee: usize,
        /// Number of distribution rates.
        distribution: usize,
    },

    /// No buckets at all.
    #[error("curve has no buckets")]
    Empty,

    /// Fee rates are not strictly ascending.
    #[error("fee rates must be strictly ascending, {previous} is followed by {next}")]
    NotAscending {
        /// Earlier fee rate.
        previous: i16,
        /// The fee rate that breaks the ordering.
        next: i16,
    },

    /// A zero fee rate, which belongs to neither side of the book.
    #[error("fee rate 0 is not a valid bucket")]
    ZeroFeeRate,

    /// A ladder-based curve was configured without a utilization target.
    #[error("utilization_target_bps is required for the standard ladder")]
    MissingTarget,

    /// A fee ladder summing to zero cannot be normalized.
    #[error("cannot normalize a fee ladder whose absolute sum is zero")]
    ZeroWeight,
}

/// Errors raised by the address ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A required singleton has not been recorded.
    #[error("{name} is not initialized in the address ledger")]
    NotFound {
        /// Logical singleton name.
        name: String,
    },

    /// A singleton was already recorded with another address.
    #[error("{name} already recorded as {existing}, refusing to overwrite with {requested}")]
    Conflict {
        /// Logical singleton name.
        name: String,
        /// Address already recorded.
        existing: Address,
        /// Address that was rejected.
        requested: Address,
    },
}
