//! Fee-bucket ladders and liquidity distribution curves.
//!
//! A [`CurveConfig`] pairs a strictly ascending ladder of signed fee rates
//! (negative buckets on one side of the book, positive on the other) with a
//! parallel sequence of distribution weights and a utilization target. It is
//! computed once per instance and embedded verbatim into the instance's
//! constructor arguments, so every function in this module is a pure,
//! deterministic function of its inputs. All arithmetic is integer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CurveError;

/// Scale applied to utilization levels before sampling.
pub const SCALE: i64 = 100;

/// Full distribution total in basis points.
pub const TOTAL_BPS: u64 = 10_000;

/// Smallest weight any bucket of the default distribution receives.
pub const MIN_DISTRIBUTION_BPS: u16 = 10;

/// Highest accepted utilization level.
pub const MAX_LEVEL: u32 = 100;

/// One side of the standard fee ladder, in basis points.
#[rustfmt::skip]
pub const STANDARD_FEE_LADDER: [i16; 36] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9,                                // 0.01% ~ 0.09%
    10, 20, 30, 40, 50, 60, 70, 80, 90,                       // 0.1% ~ 0.9%
    100, 200, 300, 400, 500, 600, 700, 800, 900,              // 1% ~ 9%
    1000, 1500, 2000, 2500, 3000, 3500, 4000, 4500, 5000,     // 10% ~ 50%
];

/// Fixed-point precision used for the square-root warp.
const SQRT_PRECISION: u128 = 1_000_000;

/// Which side(s) of the book a curve covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideMode {
    /// Two-sided book: mirrored negative half followed by the positive half.
    #[default]
    Both,
    /// Positive fee buckets only.
    #[serde(alias = "long-only", alias = "longOnly")]
    Long,
    /// Negative fee buckets only.
    #[serde(alias = "short-only", alias = "shortOnly")]
    Short,
}

impl fmt::Display for SideMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Both => write!(f, "both"),
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

impl FromStr for SideMode {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(Self::Both),
            "long" | "long-only" | "longonly" => Ok(Self::Long),
            "short" | "short-only" | "shortonly" => Ok(Self::Short),
            other => Err(CurveError::UnknownSideMode(other.to_string())),
        }
    }
}

/// Sample spacing used by the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    /// Uniformly spaced samples.
    #[default]
    Linear,
    /// Square-root warped samples, denser towards the end level.
    Sqrt,
}

impl fmt::Display for Spacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Sqrt => write!(f, "sqrt"),
        }
    }
}

/// A validated fee ladder with matching distribution weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurveConfig {
    fee_rates: Vec<i16>,
    distribution_rates: Vec<u16>,
    utilization_target_bps: u16,
}

impl CurveConfig {
    /// Build a curve from explicit sequences.
    ///
    /// # Errors
    ///
    /// Returns the first invariant the inputs violate.
    pub fn new(
        fee_rates: Vec<i16>,
        distribution_rates: Vec<u16>,
        utilization_target_bps: u32,
    ) -> Result<Self, CurveError> {
        validate_target(utilization_target_bps)?;
        let curve = Self {
            fee_rates,
            distribution_rates,
            utilization_target_bps: utilization_target_bps as u16,
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Build a curve from a fee ladder using the floored default distribution.
    ///
    /// # Errors
    ///
    /// Returns an error if the ladder or target is invalid.
    pub fn from_ladder(fee_rates: Vec<i16>, utilization_target_bps: u32) -> Result<Self, CurveError> {
        let distribution_rates = default_distribution(&fee_rates)?;
        Self::new(fee_rates, distribution_rates, utilization_target_bps)
    }

    /// The standard ladder restricted to `side`, with default distribution.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is out of range.
    pub fn standard(side: SideMode, utilization_target_bps: u32) -> Result<Self, CurveError> {
        let (fee_rates, _) = compose(side, &STANDARD_FEE_LADDER, &[0; 36]);
        Self::from_ladder(fee_rates, utilization_target_bps)
    }

    /// Sanity-check every invariant of the curve.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.fee_rates.len() != self.distribution_rates.len() {
            return Err(CurveError::LengthMismatch {
                fee: self.fee_rates.len(),
                distribution: self.distribution_rates.len(),
            });
        }
        if self.fee_rates.is_empty() {
            return Err(CurveError::Empty);
        }
        if self.fee_rates.contains(&0) {
            return Err(CurveError::ZeroFeeRate);
        }
        if let Some(pair) = self.fee_rates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(CurveError::NotAscending {
                previous: pair[0],
                next: pair[1],
            });
        }
        validate_target(u32::from(self.utilization_target_bps))
    }

    #[must_use]
    pub fn fee_rates(&self) -> &[i16] {
        &self.fee_rates
    }

    #[must_use]
    pub fn distribution_rates(&self) -> &[u16] {
        &self.distribution_rates
    }

    #[must_use]
    pub const fn utilization_target_bps(&self) -> u16 {
        self.utilization_target_bps
    }

    /// Number of fee buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fee_rates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fee_rates.is_empty()
    }
}

/// Deterministic curve generator over a utilization range.
///
/// `start_level` and `end_level` are percentages in `0..=100`. The generator
/// samples `bucket_count` interior points of the scaled range, halves them
/// with ceiling rounding and composes the result according to the side mode.
/// Fee rates are the first `bucket_count` entries of the standard ladder.
pub struct CurveGenerator;

impl CurveGenerator {
    /// Uniformly spaced curve.
    ///
    /// # Errors
    ///
    /// Returns a [`CurveError`] naming the offending parameter.
    pub fn linear(
        start_level: u32,
        end_level: u32,
        bucket_count: usize,
        side: SideMode,
    ) -> Result<CurveConfig, CurveError> {
        Self::generate(Spacing::Linear, start_level, end_level, bucket_count, side)
    }

    /// Square-root spaced curve, concentrating samples near `end_level`.
    ///
    /// # Errors
    ///
    /// Returns a [`CurveError`] naming the offending parameter.
    pub fn sqrt(
        start_level: u32,
        end_level: u32,
        bucket_count: usize,
        side: SideMode,
    ) -> Result<CurveConfig, CurveError> {
        Self::generate(Spacing::Sqrt, start_level, end_level, bucket_count, side)
    }

    /// Generate a curve with the given spacing.
    ///
    /// # Errors
    ///
    /// Returns a [`CurveError`] naming the offending parameter.
    pub fn generate(
        spacing: Spacing,
        start_level: u32,
        end_level: u32,
        bucket_count: usize,
        side: SideMode,
    ) -> Result<CurveConfig, CurveError> {
        if start_level > MAX_LEVEL {
            return Err(CurveError::LevelOutOfRange {
                field: "start_level",
                value: start_level,
            });
        }
        if end_level > MAX_LEVEL {
            return Err(CurveError::LevelOutOfRange {
                field: "end_level",
                value: end_level,
            });
        }
        if bucket_count == 0 || bucket_count > STANDARD_FEE_LADDER.len() {
            return Err(CurveError::BucketCount {
                value: bucket_count,
                max: STANDARD_FEE_LADDER.len(),
            });
        }

        let target = utilization_target(start_level, end_level);
        validate_target(target)?;

        let half = half_curve(spacing, start_level, end_level, bucket_count);
        let (fee_rates, distribution_rates) =
            compose(side, &STANDARD_FEE_LADDER[..bucket_count], &half);
        CurveConfig::new(fee_rates, distribution_rates, target)
    }
}

/// The full standard ladder: reversed negated side followed by the positive side.
#[must_use]
pub fn standard_two_sided_ladder() -> Vec<i16> {
    compose(SideMode::Both, &STANDARD_FEE_LADDER, &[0; 36]).0
}

/// Utilization target in basis points for a level range.
#[must_use]
pub fn utilization_target(start_level: u32, end_level: u32) -> u32 {
    50 * start_level.abs_diff(end_level) + 100 * start_level.min(end_level)
}

/// Proportional distribution of [`TOTAL_BPS`] over the absolute fee rates,
/// with every bucket floored at [`MIN_DISTRIBUTION_BPS`].
///
/// # Errors
///
/// Returns [`CurveError::ZeroWeight`] if every fee rate is zero.
pub fn default_distribution(fee_rates: &[i16]) -> Result<Vec<u16>, CurveError> {
    let sum: u64 = fee_rates.iter().map(|x| u64::from(x.unsigned_abs())).sum();
    if sum == 0 {
        return Err(CurveError::ZeroWeight);
    }

    Ok(fee_rates
        .iter()
        .map(|x| {
            let weight = u64::from(x.unsigned_abs()) * TOTAL_BPS / sum;
            // weight <= TOTAL_BPS, always fits
            (weight as u16).max(MIN_DISTRIBUTION_BPS)
        })
        .collect())
}

fn validate_target(target: u32) -> Result<(), CurveError> {
    if target == 0 || u64::from(target) >= TOTAL_BPS {
        return Err(CurveError::TargetOutOfRange { value: target });
    }
    Ok(())
}

/// Interior samples of the scaled range, halved with ceiling rounding.
fn half_curve(spacing: Spacing, start_level: u32, end_level: u32, count: usize) -> Vec<u16> {
    let lo = i64::from(start_level) * SCALE;
    let hi = i64::from(end_level) * SCALE;
    let span = hi - lo;
    let div = count as i64 + 2;

    (0..count as i64)
        .map(|i| {
            let value = match spacing {
                Spacing::Linear => ceil_div(lo * div + span * (i + 1), 2 * div),
                Spacing::Sqrt => {
                    let precision = SQRT_PRECISION as i64;
                    let frac = isqrt((i as u128 + 1) * SQRT_PRECISION * SQRT_PRECISION / div as u128)
                        as i64;
                    ceil_div(lo * precision + span * frac, 2 * precision)
                }
            };
            // samples lie between two levels <= 10000, halved
            value as u16
        })
        .collect()
}

/// Compose one half of a curve into the requested side layout.
fn compose(side: SideMode, half_fee: &[i16], half_dist: &[u16]) -> (Vec<i16>, Vec<u16>) {
    let mirrored_fee = half_fee.iter().rev().map(|x| -x);
    let mirrored_dist = half_dist.iter().rev().copied();
    match side {
        SideMode::Both => (
            mirrored_fee.chain(half_fee.iter().copied()).collect(),
            mirrored_dist.chain(half_dist.iter().copied()).collect(),
        ),
        SideMode::Long => (half_fee.to_vec(), half_dist.to_vec()),
        SideMode::Short => (mirrored_fee.collect(), mirrored_dist.collect()),
    }
}

/// Integer division rounding towards positive infinity. `b` must be positive.
fn ceil_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && a > 0 {
        q + 1
    } else {
        q
    }
}

/// Floor of the square root.
fn isqrt(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_both_matches_worked_example() {
        let curve = CurveGenerator::linear(0, 50, 4, SideMode::Both).unwrap();
        assert_eq!(curve.fee_rates(), &[-4, -3, -2, -1, 1, 2, 3, 4]);
        assert_eq!(
            curve.distribution_rates(),
            &[1667, 1250, 834, 417, 417, 834, 1250, 1667]
        );
        assert_eq!(curve.utilization_target_bps(), 2500);
    }

    #[test]
    fn sqrt_concentrates_towards_end_level() {
        let linear = CurveGenerator::linear(0, 100, 2, SideMode::Long).unwrap();
        let sqrt = CurveGenerator::sqrt(0, 100, 2, SideMode::Long).unwrap();
        assert_eq!(linear.distribution_rates(), &[1250, 2500]);
        assert_eq!(sqrt.distribution_rates(), &[2500, 3536]);
        assert_eq!(sqrt.utilization_target_bps(), 5000);
    }

    #[test]
    fn short_side_is_reversed_and_negated() {
        let long = CurveGenerator::linear(10, 60, 3, SideMode::Long).unwrap();
        let short = CurveGenerator::linear(10, 60, 3, SideMode::Short).unwrap();
        let expected_fee: Vec<i16> = long.fee_rates().iter().rev().map(|x| -x).collect();
        let expected_dist: Vec<u16> = long.distribution_rates().iter().rev().copied().collect();
        assert_eq!(short.fee_rates(), expected_fee.as_slice());
        assert_eq!(short.distribution_rates(), expected_dist.as_slice());
    }

    #[test]
    fn descending_range_is_supported() {
        let curve = CurveGenerator::linear(80, 20, 4, SideMode::Long).unwrap();
        let dist = curve.distribution_rates();
        assert!(dist.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(curve.utilization_target_bps(), 5000);
    }

    #[test]
    fn level_above_hundred_names_the_parameter() {
        assert_eq!(
            CurveGenerator::linear(101, 50, 4, SideMode::Both),
            Err(CurveError::LevelOutOfRange {
                field: "start_level",
                value: 101
            })
        );
    }

    #[test]
    fn zero_target_is_rejected() {
        assert_eq!(
            CurveGenerator::sqrt(0, 0, 4, SideMode::Both),
            Err(CurveError::TargetOutOfRange { value: 0 })
        );
    }

    #[test]
    fn full_range_target_is_rejected() {
        assert_eq!(
            CurveGenerator::linear(100, 100, 4, SideMode::Both),
            Err(CurveError::TargetOutOfRange { value: 10_000 })
        );
    }

    #[test]
    fn bucket_count_is_bounded_by_ladder() {
        assert!(matches!(
            CurveGenerator::linear(0, 50, 0, SideMode::Both),
            Err(CurveError::BucketCount { value: 0, .. })
        ));
        assert!(matches!(
            CurveGenerator::linear(0, 50, 37, SideMode::Both),
            Err(CurveError::BucketCount { value: 37, .. })
        ));
    }

    #[test]
    fn side_mode_parsing_rejects_unknown_values() {
        assert_eq!("long-only".parse::<SideMode>(), Ok(SideMode::Long));
        assert_eq!("Both".parse::<SideMode>(), Ok(SideMode::Both));
        assert_eq!(
            "sideways".parse::<SideMode>(),
            Err(CurveError::UnknownSideMode("sideways".into()))
        );
    }

    #[test]
    fn default_distribution_floors_small_buckets() {
        let (ladder, _) = compose(SideMode::Both, &STANDARD_FEE_LADDER, &[0; 36]);
        let dist = default_distribution(&ladder).unwrap();
        assert_eq!(ladder.len(), 72);
        // sum of |rates| is 63990, so a 1 bps bucket rounds to 0 before the floor
        assert_eq!(dist[35], MIN_DISTRIBUTION_BPS);
        assert_eq!(dist[71], 781);
        assert!(dist.iter().all(|w| *w >= MIN_DISTRIBUTION_BPS));
    }

    #[test]
    fn default_distribution_rejects_all_zero_ladder() {
        assert_eq!(default_distribution(&[0, 0]), Err(CurveError::ZeroWeight));
    }

    #[test]
    fn validate_rejects_unsorted_ladder() {
        assert_eq!(
            CurveConfig::new(vec![-1, 2, 1], vec![10, 10, 10], 5000),
            Err(CurveError::NotAscending {
                previous: 2,
                next: 1
            })
        );
    }

    #[test]
    fn validate_rejects_length_mismatch() {
        assert_eq!(
            CurveConfig::new(vec![1, 2], vec![10], 5000),
            Err(CurveError::LengthMismatch {
                fee: 2,
                distribution: 1
            })
        );
    }

    #[test]
    fn standard_long_curve_uses_positive_half() {
        let curve = CurveConfig::standard(SideMode::Long, 7500).unwrap();
        assert_eq!(curve.fee_rates(), &STANDARD_FEE_LADDER);
        assert_eq!(curve.len(), 36);
    }

    #[test]
    fn isqrt_is_floor() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(500_000_000_000), 707_106);
    }

    #[test]
    fn ceil_div_rounds_up_positive_only() {
        assert_eq!(ceil_div(5, 2), 3);
        assert_eq!(ceil_div(4, 2), 2);
        assert_eq!(ceil_div(-5, 2), -2);
    }
}
