//! Registry membership of provisioned instances.

use std::collections::BTreeSet;

use alloy_primitives::Address;
use tracing::{debug, info};

use super::{BulkOutcome, Orchestrator, RemovableLiquidity, UnregisteredInstance};
use crate::application::retry::with_retry;
use crate::contracts::{ILPRegistry, ILP};
use crate::domain::ledger::REGISTRY;
use crate::error::Result;
use crate::port::outbound::chain;
use crate::port::ProvisionEvent;

impl Orchestrator {
    /// Register `lp` for `market` unless the registry already lists it.
    ///
    /// Returns `true` when a registration transaction was sent.
    pub(super) async fn register_instance(&self, market: Address, lp: Address) -> Result<bool> {
        let registry = self.ledger.lookup_singleton(REGISTRY)?;
        let listed = self
            .read(registry, ILPRegistry::lpListByMarketCall { market })
            .await?;
        if listed.contains(&lp) {
            debug!(market = %market, lp = %lp, "Already registered");
            return Ok(false);
        }

        self.send(registry, ILPRegistry::registerCall { lp }).await?;
        self.observer
            .observe(ProvisionEvent::Registered { market, lp });
        Ok(true)
    }

    /// Register every instance in the ledger. Local networks only.
    ///
    /// # Errors
    ///
    /// Fails before sending anything when the network is not local or the
    /// registry is not recorded. Per-instance failures are collected.
    pub async fn register_all(&self) -> Result<BulkOutcome> {
        self.require_local("register-all")?;
        self.ledger.lookup_singleton(REGISTRY)?;

        let mut outcome = BulkOutcome::default();
        for &market in self.ledger.markets() {
            for &lp in self.ledger.instances_of(market) {
                match self.register_instance(market, lp).await {
                    Ok(true) => outcome.succeeded.push(lp),
                    Ok(false) => outcome.skipped.push(lp),
                    Err(e) => self.bulk_failure(&mut outcome, lp, &e),
                }
            }
        }
        info!(
            registered = outcome.succeeded.len(),
            skipped = outcome.skipped.len(),
            failed = outcome.failed.len(),
            "Bulk registration finished"
        );
        Ok(outcome)
    }

    /// Unregister every instance in the ledger. Local networks only.
    ///
    /// # Errors
    ///
    /// Fails before sending anything when the network is not local or the
    /// registry is not recorded. Per-instance failures are collected.
    pub async fn unregister_all(&self) -> Result<BulkOutcome> {
        self.require_local("unregister-all")?;
        self.ledger.lookup_singleton(REGISTRY)?;

        let mut outcome = BulkOutcome::default();
        for &market in self.ledger.markets() {
            for &lp in self.ledger.instances_of(market) {
                match self.unregister_instance(market, lp).await {
                    Ok(true) => outcome.succeeded.push(lp),
                    Ok(false) => outcome.skipped.push(lp),
                    Err(e) => self.bulk_failure(&mut outcome, lp, &e),
                }
            }
        }
        info!(
            unregistered = outcome.succeeded.len(),
            skipped = outcome.skipped.len(),
            failed = outcome.failed.len(),
            "Bulk unregistration finished"
        );
        Ok(outcome)
    }

    /// Register a single instance, looking up its market on chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is not recorded or a call fails.
    pub async fn register_lp(&self, lp: Address) -> Result<bool> {
        let market = self.read(lp, ILP::marketCall {}).await?;
        self.register_instance(market, lp).await
    }

    /// Unregister a single instance, looking up its market on chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is not recorded or a call fails.
    pub async fn unregister_lp(&self, lp: Address) -> Result<bool> {
        let market = self.read(lp, ILP::marketCall {}).await?;
        self.unregister_instance(market, lp).await
    }

    async fn unregister_instance(&self, market: Address, lp: Address) -> Result<bool> {
        let registry = self.ledger.lookup_singleton(REGISTRY)?;
        let listed = self
            .read(registry, ILPRegistry::lpListByMarketCall { market })
            .await?;
        if !listed.contains(&lp) {
            debug!(market = %market, lp = %lp, "Not registered");
            return Ok(false);
        }

        self.send(registry, ILPRegistry::unregisterCall { lp }).await?;
        self.observer
            .observe(ProvisionEvent::Unregistered { market, lp });
        Ok(true)
    }

    /// Every instance the registry has ever unregistered, oldest first.
    ///
    /// `registry` overrides the ledger's registry address.
    ///
    /// # Errors
    ///
    /// Returns an error if no registry is known or the log query fails.
    pub async fn list_unregistered(
        &self,
        registry: Option<Address>,
    ) -> Result<Vec<UnregisteredInstance>> {
        let registry = match registry {
            Some(address) => address,
            None => self.ledger.lookup_singleton(REGISTRY)?,
        };

        let client = self.chain();
        let events = with_retry(
            self.provisioner.retry_policy(),
            "LPUnregistered logs",
            move || chain::events_since::<ILPRegistry::LPUnregistered>(client, registry, 0),
        )
        .await
        .into_result()?;

        let mut seen = BTreeSet::new();
        let instances: Vec<_> = events
            .into_iter()
            .filter(|event| seen.insert((event.market, event.lp)))
            .map(|event| UnregisteredInstance {
                market: event.market,
                lp: event.lp,
            })
            .collect();
        debug!(registry = %registry, count = instances.len(), "Unregistered instances");
        Ok(instances)
    }

    /// Unregistered instances the wallet still holds tokens of.
    ///
    /// # Errors
    ///
    /// Returns an error if the log query or a balance read fails.
    pub async fn list_removable(
        &self,
        registry: Option<Address>,
    ) -> Result<Vec<RemovableLiquidity>> {
        let owner = self.sender();
        let mut removable = Vec::new();
        for instance in self.list_unregistered(registry).await? {
            let amount = self
                .read(instance.lp, ILP::balanceOfCall { account: owner })
                .await?;
            if !amount.is_zero() {
                removable.push(RemovableLiquidity {
                    market: instance.market,
                    lp: instance.lp,
                    amount,
                });
            }
        }
        Ok(removable)
    }

    /// Withdraw the wallet's whole balance from every unregistered instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the removable set cannot be listed. Failed
    /// withdrawals are collected.
    pub async fn remove_unregistered_liquidity(
        &self,
        registry: Option<Address>,
    ) -> Result<BulkOutcome> {
        let owner = self.sender();
        let mut outcome = BulkOutcome::default();
        for item in self.list_removable(registry).await? {
            let call = ILP::removeLiquidityCall {
                lpTokenAmount: item.amount,
                recipient: owner,
            };
            match self.send(item.lp, call).await {
                Ok(_) => {
                    self.observer.observe(ProvisionEvent::LiquidityRemoved {
                        lp: item.lp,
                        amount: item.amount,
                    });
                    outcome.succeeded.push(item.lp);
                }
                Err(e) => self.bulk_failure(&mut outcome, item.lp, &e),
            }
        }
        Ok(outcome)
    }
}
