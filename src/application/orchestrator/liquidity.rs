//! Deposits into and withdrawals from provisioned instances.

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::Orchestrator;
use crate::contracts::{IERC20Metadata, ILPRegistry, ILP};
use crate::domain::ledger::REGISTRY;
use crate::domain::summary::{EntryStatus, RunSummary, SeedStatus, SummaryEntry};
use crate::domain::units::{format_base_units, to_base_units};
use crate::error::{ConfigError, Error, Result};
use crate::port::ProvisionEvent;

/// Decimals of instance tokens.
pub const LP_TOKEN_DECIMALS: u8 = 18;

impl Orchestrator {
    /// Deposit `amount` whole settlement tokens into `lp`.
    ///
    /// Returns the deposited amount in base units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientBalance`] when the wallet holds less than
    /// `amount`, or the chain error of a failed call.
    pub async fn add_liquidity(&self, lp: Address, amount: Decimal) -> Result<U256> {
        let token = self.read(lp, ILP::settlementTokenCall {}).await?;
        let symbol = self.read(token, IERC20Metadata::symbolCall {}).await?;
        let decimals = self.read(token, IERC20Metadata::decimalsCall {}).await?;
        let base = to_base_units(amount, decimals).map_err(|e| ConfigError::InvalidValue {
            field: "amount",
            reason: e.to_string(),
        })?;

        self.deposit(lp, token, &symbol, decimals, base).await?;
        Ok(base)
    }

    /// Redeem `amount` instance tokens from `lp`.
    ///
    /// Returns the redeemed amount in base units.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InsufficientBalance`] when the wallet holds fewer
    /// instance tokens, or the chain error of a failed call.
    pub async fn remove_liquidity(&self, lp: Address, amount: Decimal) -> Result<U256> {
        let base =
            to_base_units(amount, LP_TOKEN_DECIMALS).map_err(|e| ConfigError::InvalidValue {
                field: "amount",
                reason: e.to_string(),
            })?;
        let owner = self.sender();

        let held = self.read(lp, ILP::balanceOfCall { account: owner }).await?;
        if held < base {
            return Err(Error::InsufficientBalance {
                token: format!("LP {lp}"),
                required: format_base_units(base, LP_TOKEN_DECIMALS),
                available: format_base_units(held, LP_TOKEN_DECIMALS),
            });
        }

        self.send(
            lp,
            ILP::removeLiquidityCall {
                lpTokenAmount: base,
                recipient: owner,
            },
        )
        .await?;
        self.observer
            .observe(ProvisionEvent::LiquidityRemoved { lp, amount: base });
        Ok(base)
    }

    /// Approve and deposit `amount` base units of `token` into `lp`.
    pub(super) async fn deposit(
        &self,
        lp: Address,
        token: Address,
        symbol: &str,
        decimals: u8,
        amount: U256,
    ) -> Result<()> {
        let owner = self.sender();
        let balance = self
            .read(token, IERC20Metadata::balanceOfCall { account: owner })
            .await?;
        if balance < amount {
            return Err(Error::InsufficientBalance {
                token: symbol.to_string(),
                required: format_base_units(amount, decimals),
                available: format_base_units(balance, decimals),
            });
        }

        let allowance = self
            .read(
                token,
                IERC20Metadata::allowanceCall {
                    owner,
                    spender: lp,
                },
            )
            .await?;
        if allowance < amount {
            debug!(token = %symbol, spender = %lp, "Approving");
            self.send(
                token,
                IERC20Metadata::approveCall {
                    spender: lp,
                    amount,
                },
            )
            .await?;
        }

        self.send(
            lp,
            ILP::addLiquidityCall {
                amount,
                recipient: owner,
            },
        )
        .await?;
        self.observer
            .observe(ProvisionEvent::LiquidityAdded { lp, amount });
        Ok(())
    }

    /// Deposit each tier's configured initial liquidity into the registered
    /// instances of `market`.
    ///
    /// Instances are matched to tiers by name and tag. Tiers without an
    /// initial amount are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is not recorded, the market is not
    /// listed, or the registry cannot be read. Per-tier failures, including
    /// a tier matching zero or several instances, are recorded in the
    /// summary.
    pub async fn seed_market(&self, market: Address) -> Result<RunSummary> {
        let registry = self.ledger.lookup_singleton(REGISTRY)?;
        let info = self
            .markets
            .list_markets()
            .await?
            .into_iter()
            .find(|m| m.address == market)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "market",
                reason: format!("{market} is not listed by the market factory"),
            })?;

        let lps = self
            .read(registry, ILPRegistry::lpListByMarketCall { market })
            .await?;
        let mut described = Vec::with_capacity(lps.len());
        for lp in lps {
            let name = self.read(lp, ILP::lpNameCall {}).await?;
            let tag = self.read(lp, ILP::lpTagCall {}).await?;
            described.push((lp, name, tag));
        }

        let mut summary = RunSummary::new();
        for spec in &self.settings.instances {
            let subject = format!("{} @ {market}", spec.name);
            let matches: Vec<Address> = described
                .iter()
                .filter(|(_, name, tag)| *name == spec.name && *tag == spec.tag)
                .map(|(lp, _, _)| *lp)
                .collect();
            let lp = match matches.as_slice() {
                [lp] => *lp,
                _ => {
                    let error = Error::Config(ConfigError::InvalidValue {
                        field: "instances",
                        reason: format!(
                            "expected exactly one registered '{}' ({}) instance, found {}",
                            spec.name,
                            spec.tag,
                            matches.len()
                        ),
                    });
                    self.report_failure(&mut summary, subject, Some(market), &error);
                    continue;
                }
            };

            let token = &info.settlement_token;
            let terms = match spec.terms_for(token, &self.settings.policies) {
                Ok(terms) => terms,
                Err(e) => {
                    let error = Error::Config(ConfigError::InvalidValue {
                        field: "instances",
                        reason: e.to_string(),
                    });
                    self.report_failure(&mut summary, subject, Some(market), &error);
                    continue;
                }
            };

            let seeding = match terms.initial_liquidity.filter(|a| !a.is_zero()) {
                None => SeedStatus::Skipped,
                Some(amount) => {
                    match self
                        .deposit(lp, token.address, &token.symbol, token.decimals, amount)
                        .await
                    {
                        Ok(()) => SeedStatus::Seeded {
                            amount: format_base_units(amount, token.decimals),
                        },
                        Err(e) => {
                            self.report_failure(&mut summary, subject, Some(market), &e);
                            continue;
                        }
                    }
                }
            };

            summary.push(SummaryEntry {
                subject,
                market: Some(market),
                status: EntryStatus::Reused { address: lp },
                seeding: Some(seeding),
            });
        }

        let seeded = summary
            .entries()
            .iter()
            .filter(|e| matches!(e.seeding, Some(SeedStatus::Seeded { .. })))
            .count();
        info!(
            market = %market,
            seeded,
            failed = summary.failures().count(),
            "Market seeding finished"
        );
        Ok(summary)
    }
}
