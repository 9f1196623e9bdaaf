//! Provisioning orchestrator.
//!
//! Sequences the deployment stages
//!
//! ```text
//! Registry -> AutomationAdapter(LP) -> InstanceLogic
//!   -> [per market, per tier: Instance -> Register -> Seed]
//!   -> AutomationAdapter(Fundraising) -> FundraisingFactory
//!   -> [per round: Fundraising]
//! ```
//!
//! and the follow-up operations (registration, liquidity, rebalance tasks)
//! that read the [`AddressLedger`] to locate what was provisioned.
//!
//! Singleton stages are fatal to the run. Failures inside the per-market
//! and per-round fan-out are caught at the loop boundary, recorded in the
//! [`RunSummary`] and the run moves on.

mod liquidity;
mod provision;
mod registry;
pub mod settings;
mod tasks;

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use serde::Serialize;
use tracing::{info, warn};

use crate::application::provisioner::ResourceProvisioner;
use crate::application::retry::with_retry;
use crate::application::transaction::submit_once;
use crate::contracts::ILPRegistry;
use crate::domain::ledger::{
    AddressLedger, AUTOMATION_ADAPTER_FUNDRAISING, AUTOMATION_ADAPTER_LP, FUNDRAISING_FACTORY,
    INSTANCE_LOGIC, REGISTRY,
};
use crate::domain::resource::{ProvisioningTask, ResourceKind};
use crate::domain::summary::{FailureKind, RunSummary};
use crate::error::{ConfigError, Error, LedgerError, Result};
use crate::port::outbound::chain;
use crate::port::{ChainClient, Confirmer, MarketDirectory, ProvisionEvent, ProvisionObserver, TxReceipt};

pub use liquidity::LP_TOKEN_DECIMALS;
pub use settings::{ContractNames, NetworkProfile, ProvisionSettings, RegistrationMode};

/// Per-address outcome of a bulk operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<Address>,
    /// Nothing to do, e.g. already registered.
    pub skipped: Vec<Address>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub address: Address,
    pub kind: FailureKind,
    pub reason: String,
}

impl BulkOutcome {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// An instance that was once unregistered from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnregisteredInstance {
    pub market: Address,
    pub lp: Address,
}

/// Instance tokens the wallet still holds in an unregistered instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemovableLiquidity {
    pub market: Address,
    pub lp: Address,
    pub amount: U256,
}

/// Drives provisioning and follow-up operations for one network.
pub struct Orchestrator {
    provisioner: ResourceProvisioner,
    markets: Arc<dyn MarketDirectory>,
    confirmer: Arc<dyn Confirmer>,
    observer: Arc<dyn ProvisionObserver>,
    settings: ProvisionSettings,
    ledger: AddressLedger,
}

impl Orchestrator {
    pub fn new(
        provisioner: ResourceProvisioner,
        markets: Arc<dyn MarketDirectory>,
        confirmer: Arc<dyn Confirmer>,
        observer: Arc<dyn ProvisionObserver>,
        settings: ProvisionSettings,
        ledger: AddressLedger,
    ) -> Self {
        Self {
            provisioner,
            markets,
            confirmer,
            observer,
            settings,
            ledger,
        }
    }

    #[must_use]
    pub const fn ledger(&self) -> &AddressLedger {
        &self.ledger
    }

    #[must_use]
    pub fn into_ledger(self) -> AddressLedger {
        self.ledger
    }

    #[must_use]
    pub const fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    /// Fill the ledger from the deployment store and the on-chain registry.
    ///
    /// Instances come from the store first, in deployment order, so ones
    /// that were never registered or have since been unregistered are
    /// found too. Registry entries the store does not know are appended
    /// after them. Only persistent networks are reconciled. Nothing is
    /// written on chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the store, the market directory or the registry
    /// cannot be read.
    pub async fn reconcile(&mut self) -> Result<()> {
        if !self.settings.network.persistent {
            return Ok(());
        }

        for (key, name) in self.singleton_names() {
            if let Some(record) = self.provisioner.existing(&name)? {
                self.ledger.record_singleton(key, record.address)?;
            }
        }

        self.restore_instances()?;

        let Ok(registry) = self.ledger.lookup_singleton(REGISTRY) else {
            info!(network = %self.settings.network.name, "No registry deployed yet, nothing to reconcile");
            return Ok(());
        };

        let markets = self.markets.list_markets().await?;
        for market in &markets {
            let lps = self
                .read(
                    registry,
                    ILPRegistry::lpListByMarketCall {
                        market: market.address,
                    },
                )
                .await?;
            for lp in lps {
                if !self.ledger.contains_instance(market.address, lp) {
                    self.ledger.append_instance(market.address, lp);
                }
            }
        }

        info!(
            network = %self.settings.network.name,
            markets = self.ledger.markets().len(),
            instances = self.ledger.all_instance_addresses().len(),
            "Ledger reconciled"
        );
        Ok(())
    }

    /// Append every stored instance to the ledger, oldest first.
    fn restore_instances(&mut self) -> Result<()> {
        let mut instances: Vec<_> = self
            .provisioner
            .store()
            .all()?
            .into_iter()
            .filter(|(_, record)| record.kind == Some(ResourceKind::Instance))
            .filter_map(|(_, record)| {
                record
                    .related
                    .map(|market| (record.block_number, record.deployed_at, market, record.address))
            })
            .collect();
        instances.sort_by_key(|&(block, deployed_at, ..)| (block, deployed_at));

        for (_, _, market, lp) in instances {
            if !self.ledger.contains_instance(market, lp) {
                self.ledger.append_instance(market, lp);
            }
        }
        Ok(())
    }

    /// Ledger key and deployment name of every singleton.
    fn singleton_names(&self) -> [(&'static str, String); 5] {
        let backend = self.settings.network.automation;
        let names = &self.settings.contracts;
        [
            (REGISTRY, names.registry.clone()),
            (AUTOMATION_ADAPTER_LP, names.automate_lp_for(backend)),
            (INSTANCE_LOGIC, names.instance_logic_for(backend)),
            (AUTOMATION_ADAPTER_FUNDRAISING, names.automate_bp_for(backend)),
            (FUNDRAISING_FACTORY, names.bp_factory.clone()),
        ]
    }

    fn chain(&self) -> &dyn ChainClient {
        self.provisioner.chain()
    }

    fn sender(&self) -> Address {
        self.chain().sender()
    }

    /// Typed read-only call under the retry policy.
    async fn read<C>(&self, to: Address, call: C) -> Result<C::Return>
    where
        C: SolCall + Clone,
    {
        let client = self.chain();
        with_retry(self.provisioner.retry_policy(), C::SIGNATURE, move || {
            let call = call.clone();
            async move { chain::read(client, to, call).await }
        })
        .await
        .into_result()
    }

    /// Typed transaction, submitted once and retried by hash.
    async fn send<C: SolCall>(&self, to: Address, call: C) -> Result<TxReceipt> {
        submit_once(
            self.chain(),
            self.provisioner.retry_policy(),
            C::SIGNATURE,
            Some(to),
            call.abi_encode().into(),
        )
        .await
    }

    /// Refuse `operation` unless the network is tagged local.
    fn require_local(&self, operation: &'static str) -> Result<()> {
        if self.settings.network.local {
            Ok(())
        } else {
            Err(ConfigError::NetworkNotLocal {
                network: self.settings.network.name.clone(),
                operation,
            }
            .into())
        }
    }

    /// Every ledger dependency of `task` must already be recorded.
    fn ensure_dependencies(&self, task: &ProvisioningTask) -> Result<()> {
        for name in &task.depends_on {
            if !self.ledger.has_singleton(name) {
                return Err(LedgerError::NotFound { name: name.clone() }.into());
            }
        }
        Ok(())
    }

    /// Log and report a failure caught at a fan-out boundary.
    fn report_failure(
        &self,
        summary: &mut RunSummary,
        subject: String,
        market: Option<Address>,
        error: &Error,
    ) {
        let kind = error.kind();
        warn!(subject = %subject, %kind, error = %error, "Skipping after failure");
        self.observer.observe(ProvisionEvent::Failed {
            subject: subject.clone(),
            kind,
            reason: error.to_string(),
        });
        summary.failed(subject, market, kind, error.to_string());
    }

    /// Log and count a failure inside a bulk operation.
    fn bulk_failure(&self, outcome: &mut BulkOutcome, address: Address, error: &Error) {
        let kind = error.kind();
        warn!(address = %address, %kind, error = %error, "Bulk step failed");
        self.observer.observe(ProvisionEvent::Failed {
            subject: address.to_string(),
            kind,
            reason: error.to_string(),
        });
        outcome.failed.push(BulkFailure {
            address,
            kind,
            reason: error.to_string(),
        });
    }
}
