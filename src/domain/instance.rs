//! Risk-tier specifications for liquidity-provider instances.
//!
//! An [`InstanceSpec`] describes one tier (name, tag, curve, monetary
//! thresholds). For every market the orchestrator turns the spec into a
//! [`CurveConfig`] and a set of [`InstanceTerms`] expressed in the market's
//! settlement-token base units.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::curve::{CurveConfig, CurveGenerator, SideMode, Spacing};
use super::error::CurveError;
use super::market::SettlementToken;
use super::units::{to_base_units, UnitsError};

/// Where an instance's curve comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CurveSource {
    /// The standard fee ladder with the floored default distribution.
    Standard {
        #[serde(default)]
        side: SideMode,
    },
    /// Generated over a utilization range.
    Generated {
        #[serde(default)]
        spacing: Spacing,
        start_level: u32,
        end_level: u32,
        bucket_count: usize,
        #[serde(default)]
        side: SideMode,
    },
}

impl Default for CurveSource {
    fn default() -> Self {
        Self::Standard {
            side: SideMode::Both,
        }
    }
}

impl CurveSource {
    /// Build the curve. Generated curves derive their own target.
    ///
    /// # Errors
    ///
    /// Returns the curve validation failure.
    pub fn build(&self, utilization_target_bps: Option<u32>) -> Result<CurveConfig, CurveError> {
        match *self {
            Self::Standard { side } => {
                let target = utilization_target_bps.ok_or(CurveError::MissingTarget)?;
                CurveConfig::standard(side, target)
            }
            Self::Generated {
                spacing,
                start_level,
                end_level,
                bucket_count,
                side,
            } => CurveGenerator::generate(spacing, start_level, end_level, bucket_count, side),
        }
    }
}

/// Per-asset adjustment of monetary thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPolicy {
    /// Settlement token symbol the policy applies to.
    pub symbol: String,
    /// Thresholds are divided by this after decimal scaling.
    pub threshold_divisor: u32,
}

/// Ordered set of asset policies; the first match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPolicies(Vec<AssetPolicy>);

impl AssetPolicies {
    #[must_use]
    pub fn new(policies: Vec<AssetPolicy>) -> Self {
        Self(policies)
    }

    /// Divisor for a symbol, 1 when no policy matches.
    #[must_use]
    pub fn divisor_for(&self, symbol: &str) -> u32 {
        self.0
            .iter()
            .find(|p| p.symbol == symbol)
            .map_or(1, |p| p.threshold_divisor.max(1))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[AssetPolicy] {
        &self.0
    }
}

/// Monetary thresholds of one instance in settlement-token base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceTerms {
    pub automation_fee_reserved: U256,
    pub min_holding_value_to_rebalance: U256,
    pub initial_liquidity: Option<U256>,
}

/// One risk tier provisioned for every market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub name: String,
    pub tag: String,
    /// Required for the standard ladder, derived for generated curves.
    #[serde(default)]
    pub utilization_target_bps: Option<u32>,
    #[serde(default = "default_rebalance_bps")]
    pub rebalance_bps: u16,
    #[serde(default = "default_rebalance_checking_interval")]
    pub rebalance_checking_interval: u64,
    #[serde(default = "default_settle_checking_interval")]
    pub settle_checking_interval: u64,
    #[serde(default = "default_automation_fee_reserved")]
    pub automation_fee_reserved: Decimal,
    #[serde(default)]
    pub min_holding_value_to_rebalance: Decimal,
    #[serde(default)]
    pub initial_liquidity: Option<Decimal>,
    #[serde(default)]
    pub curve: CurveSource,
}

const fn default_rebalance_bps() -> u16 {
    500
}

const fn default_rebalance_checking_interval() -> u64 {
    24 * 60 * 60
}

const fn default_settle_checking_interval() -> u64 {
    60
}

fn default_automation_fee_reserved() -> Decimal {
    Decimal::ONE
}

impl InstanceSpec {
    /// A standard-ladder tier with default thresholds.
    #[must_use]
    pub fn standard(name: &str, tag: &str, utilization_target_bps: u32) -> Self {
        Self {
            name: name.to_string(),
            tag: tag.to_string(),
            utilization_target_bps: Some(utilization_target_bps),
            rebalance_bps: default_rebalance_bps(),
            rebalance_checking_interval: default_rebalance_checking_interval(),
            settle_checking_interval: default_settle_checking_interval(),
            automation_fee_reserved: default_automation_fee_reserved(),
            min_holding_value_to_rebalance: Decimal::ZERO,
            initial_liquidity: None,
            curve: CurveSource::default(),
        }
    }

    /// The three standard risk tiers.
    #[must_use]
    pub fn default_tiers() -> Vec<Self> {
        vec![
            Self::standard("Junior Pool", "Low Risk", 7500),
            Self::standard("Mezzanine Pool", "Mid Risk", 5000),
            Self::standard("Senior Pool", "High Risk", 2500),
        ]
    }

    /// Build this tier's curve.
    ///
    /// # Errors
    ///
    /// Returns the curve validation failure.
    pub fn curve_config(&self) -> Result<CurveConfig, CurveError> {
        self.curve.build(self.utilization_target_bps)
    }

    /// Thresholds scaled to `token` and adjusted by the matching policy.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount cannot be represented in base units.
    pub fn terms_for(
        &self,
        token: &SettlementToken,
        policies: &AssetPolicies,
    ) -> Result<InstanceTerms, UnitsError> {
        let divisor = U256::from(policies.divisor_for(&token.symbol));
        let scale = |amount: Decimal| -> Result<U256, UnitsError> {
            Ok(to_base_units(amount, token.decimals)? / divisor)
        };

        Ok(InstanceTerms {
            automation_fee_reserved: scale(self.automation_fee_reserved)?,
            min_holding_value_to_rebalance: scale(self.min_holding_value_to_rebalance)?,
            initial_liquidity: self.initial_liquidity.map(scale).transpose()?,
        })
    }

    /// Stable identifier used in deployment names.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .chars()
            .filter_map(|c| match c {
                c if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase()),
                ' ' | '-' | '_' => Some('-'),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use rust_decimal_macros::dec;

    fn token(symbol: &str, decimals: u8) -> SettlementToken {
        SettlementToken {
            symbol: symbol.into(),
            decimals,
            address: Address::ZERO,
        }
    }

    #[test]
    fn default_tiers_cover_three_targets() {
        let targets: Vec<_> = InstanceSpec::default_tiers()
            .iter()
            .map(|t| t.curve_config().unwrap().utilization_target_bps())
            .collect();
        assert_eq!(targets, vec![7500, 5000, 2500]);
    }

    #[test]
    fn standard_curve_requires_target() {
        let mut spec = InstanceSpec::standard("Pool", "Tag", 5000);
        spec.utilization_target_bps = None;
        assert_eq!(spec.curve_config(), Err(CurveError::MissingTarget));
    }

    #[test]
    fn generated_curve_ignores_configured_target() {
        let mut spec = InstanceSpec::standard("Pool", "Tag", 9000);
        spec.curve = CurveSource::Generated {
            spacing: Spacing::Linear,
            start_level: 0,
            end_level: 50,
            bucket_count: 4,
            side: SideMode::Both,
        };
        assert_eq!(spec.curve_config().unwrap().utilization_target_bps(), 2500);
    }

    #[test]
    fn terms_scale_by_token_decimals() {
        let mut spec = InstanceSpec::standard("Pool", "Tag", 5000);
        spec.initial_liquidity = Some(dec!(1000));
        let terms = spec
            .terms_for(&token("USDC", 6), &AssetPolicies::default())
            .unwrap();
        assert_eq!(terms.automation_fee_reserved, U256::from(1_000_000u64));
        assert_eq!(terms.initial_liquidity, Some(U256::from(1_000_000_000u64)));
    }

    #[test]
    fn asset_policy_divides_thresholds() {
        let mut spec = InstanceSpec::standard("Pool", "Tag", 5000);
        spec.initial_liquidity = Some(dec!(10));
        let policies = AssetPolicies::new(vec![AssetPolicy {
            symbol: "cBTC".into(),
            threshold_divisor: 2,
        }]);
        let terms = spec.terms_for(&token("cBTC", 8), &policies).unwrap();
        assert_eq!(terms.automation_fee_reserved, U256::from(50_000_000u64));
        assert_eq!(terms.initial_liquidity, Some(U256::from(500_000_000u64)));
    }

    #[test]
    fn slug_is_lowercase_and_dashed() {
        assert_eq!(InstanceSpec::standard("Mezzanine Pool", "t", 1).slug(), "mezzanine-pool");
    }
}
