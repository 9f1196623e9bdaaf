//! Conversion between whole-token amounts and ERC-20 base units.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors converting a decimal amount to base units.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("amount {0} is negative")]
    Negative(Decimal),

    #[error("amount {amount} overflows 256 bits at {decimals} decimals")]
    Overflow { amount: Decimal, decimals: u8 },
}

/// Convert a whole-token amount to base units, truncating extra precision.
///
/// # Errors
///
/// Returns an error for negative amounts or amounts that overflow `U256`.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<U256, UnitsError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(UnitsError::Negative(amount));
    }

    let mantissa = U256::from(amount.mantissa().unsigned_abs());
    let scale = amount.scale();
    let decimals_u32 = u32::from(decimals);

    if decimals_u32 >= scale {
        let factor = pow10(decimals_u32 - scale);
        mantissa
            .checked_mul(factor)
            .ok_or(UnitsError::Overflow { amount, decimals })
    } else {
        Ok(mantissa / pow10(scale - decimals_u32))
    }
}

/// Render base units as a decimal string without trailing zeros.
#[must_use]
pub fn format_base_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

fn pow10(exp: u32) -> U256 {
    U256::from(10u64).pow(U256::from(exp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_whole_tokens() {
        assert_eq!(to_base_units(dec!(1), 6), Ok(U256::from(1_000_000u64)));
        assert_eq!(
            to_base_units(dec!(1), 18),
            Ok(U256::from(1_000_000_000_000_000_000u128))
        );
    }

    #[test]
    fn truncates_extra_precision() {
        assert_eq!(to_base_units(dec!(1.1234567), 6), Ok(U256::from(1_123_456u64)));
    }

    #[test]
    fn zero_decimals_truncate_fraction() {
        assert_eq!(to_base_units(dec!(12.9), 0), Ok(U256::from(12u64)));
    }

    #[test]
    fn rejects_negative_amounts() {
        assert_eq!(to_base_units(dec!(-1), 6), Err(UnitsError::Negative(dec!(-1))));
    }

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(format_base_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_base_units(U256::from(2_000_000u64), 6), "2");
        assert_eq!(format_base_units(U256::from(5u64), 6), "0.000005");
        assert_eq!(format_base_units(U256::from(42u64), 0), "42");
    }
}
