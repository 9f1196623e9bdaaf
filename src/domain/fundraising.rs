//! Time-boxed fundraising rounds bound to one liquidity-provider instance.

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::units::{to_base_units, UnitsError};

/// Rewards are paid in an 18-decimal token.
pub const REWARD_TOKEN_DECIMALS: u8 = 18;

/// The instance a round raises capital for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FundraisingTarget {
    /// An explicit instance address.
    Lp { lp: Address },
    /// The `index`-th instance provisioned for `market`, in ledger order.
    MarketInstance { market: Address, index: usize },
}

/// A fundraising round as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundraisingSpec {
    #[serde(flatten)]
    pub target: FundraisingTarget,
    /// Reward paid out to depositors, in whole reward tokens.
    pub total_reward: Decimal,
    /// In whole settlement tokens.
    pub min_raising_target: Decimal,
    /// In whole settlement tokens.
    pub max_raising_target: Decimal,
    /// In whole settlement tokens.
    #[serde(default)]
    pub min_deposit: Decimal,
    /// Unix timestamp (seconds).
    pub start_time_of_warmup: u64,
    /// Seconds.
    pub max_duration_of_warmup: u64,
    /// Seconds.
    pub duration_of_lockup: u64,
}

/// Parameters of a round in base units, ready for ABI encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundraisingTerms {
    pub lp: Address,
    pub total_reward: U256,
    pub min_raising_target: U256,
    pub max_raising_target: U256,
    pub start_time_of_warmup: u64,
    pub max_duration_of_warmup: u64,
    pub duration_of_lockup: u64,
    pub min_deposit: U256,
}

impl FundraisingSpec {
    /// Check the spec is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns the offending field and reason.
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        if self.min_raising_target > self.max_raising_target {
            return Err((
                "min_raising_target",
                format!(
                    "{} exceeds max_raising_target {}",
                    self.min_raising_target, self.max_raising_target
                ),
            ));
        }
        if self.max_raising_target <= Decimal::ZERO {
            return Err(("max_raising_target", "must be greater than 0".into()));
        }
        if self.max_duration_of_warmup == 0 {
            return Err(("max_duration_of_warmup", "must be greater than 0".into()));
        }
        if self.duration_of_lockup == 0 {
            return Err(("duration_of_lockup", "must be greater than 0".into()));
        }
        Ok(())
    }

    /// Convert to base units for a given instance and settlement precision.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be represented.
    pub fn terms(&self, lp: Address, settlement_decimals: u8) -> Result<FundraisingTerms, UnitsError> {
        Ok(FundraisingTerms {
            lp,
            total_reward: to_base_units(self.total_reward, REWARD_TOKEN_DECIMALS)?,
            min_raising_target: to_base_units(self.min_raising_target, settlement_decimals)?,
            max_raising_target: to_base_units(self.max_raising_target, settlement_decimals)?,
            start_time_of_warmup: self.start_time_of_warmup,
            max_duration_of_warmup: self.max_duration_of_warmup,
            duration_of_lockup: self.duration_of_lockup,
            min_deposit: to_base_units(self.min_deposit, settlement_decimals)?,
        })
    }

    /// Deployment name the round is stored under, stable across runs.
    #[must_use]
    pub fn deployment_name(&self, lp: Address) -> String {
        format!("BP-{lp}-{}", self.start_time_of_warmup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use rust_decimal_macros::dec;

    fn spec() -> FundraisingSpec {
        FundraisingSpec {
            target: FundraisingTarget::Lp {
                lp: address!("00000000000000000000000000000000000000aa"),
            },
            total_reward: dec!(100),
            min_raising_target: dec!(1000),
            max_raising_target: dec!(5000),
            min_deposit: dec!(10),
            start_time_of_warmup: 1_700_000_000,
            max_duration_of_warmup: 3 * 24 * 3600,
            duration_of_lockup: 30 * 24 * 3600,
        }
    }

    #[test]
    fn valid_spec_passes() {
        assert!(spec().validate().is_ok());
    }

    #[test]
    fn min_above_max_is_rejected() {
        let mut s = spec();
        s.min_raising_target = dec!(6000);
        assert_eq!(s.validate().unwrap_err().0, "min_raising_target");
    }

    #[test]
    fn zero_lockup_is_rejected() {
        let mut s = spec();
        s.duration_of_lockup = 0;
        assert_eq!(s.validate().unwrap_err().0, "duration_of_lockup");
    }

    #[test]
    fn terms_use_reward_and_settlement_precision() {
        let terms = spec().terms(Address::ZERO, 6).unwrap();
        assert_eq!(terms.total_reward, U256::from(100u64) * U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(terms.max_raising_target, U256::from(5_000_000_000u64));
        assert_eq!(terms.min_deposit, U256::from(10_000_000u64));
    }

    #[test]
    fn target_parses_from_either_shape() {
        let by_lp: FundraisingTarget =
            serde_json::from_str(r#"{"lp":"0x00000000000000000000000000000000000000aa"}"#).unwrap();
        assert!(matches!(by_lp, FundraisingTarget::Lp { .. }));

        let by_index: FundraisingTarget = serde_json::from_str(
            r#"{"market":"0x00000000000000000000000000000000000000bb","index":1}"#,
        )
        .unwrap();
        assert!(matches!(by_index, FundraisingTarget::MarketInstance { index: 1, .. }));
    }

    #[test]
    fn deployment_name_is_deterministic() {
        let s = spec();
        assert_eq!(s.deployment_name(Address::ZERO), s.deployment_name(Address::ZERO));
        assert!(s.deployment_name(Address::ZERO).ends_with("-1700000000"));
    }
}
