//! Provisioning stages: singletons, per-market instances, fundraising rounds.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolValue};
use chrono::Utc;
use tracing::{debug, info};

use super::{Orchestrator, RegistrationMode};
use crate::contracts::{BPConfig, IAutomationRegistry, IBPFactory, IERC20Metadata, ILP, LPConfig, LPMeta};
use crate::domain::curve::CurveConfig;
use crate::domain::fundraising::{FundraisingSpec, FundraisingTarget, FundraisingTerms};
use crate::domain::instance::{InstanceSpec, InstanceTerms};
use crate::domain::ledger::{
    AUTOMATION_ADAPTER_FUNDRAISING, AUTOMATION_ADAPTER_LP, FUNDRAISING_FACTORY, INSTANCE_LOGIC,
    REGISTRY,
};
use crate::domain::market::MarketInfo;
use crate::domain::resource::{ProvisioningTask, ResourceKind, ResourceRecord};
use crate::domain::summary::{EntryStatus, RunSummary, SeedStatus, SummaryEntry};
use crate::error::{ChainError, ConfigError, Error, LedgerError, Result};
use crate::port::{DeploymentRecord, ProvisionEvent};

impl Orchestrator {
    /// Provision everything: singletons, every market's instances and
    /// every configured fundraising round.
    ///
    /// # Errors
    ///
    /// Returns an error only when a singleton stage fails or the market
    /// list cannot be read. Per-market and per-round failures are recorded
    /// in the returned summary.
    pub async fn provision_all(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        self.provision_instance_singletons(&mut summary).await?;

        let markets = self.markets.list_markets().await?;
        info!(
            markets = markets.len(),
            tiers = self.settings.instances.len(),
            "Provisioning instances"
        );
        for market in &markets {
            self.provision_market_instances(market, &mut summary).await;
        }

        if self.settings.registration == RegistrationMode::Bulk {
            let outcome = self.register_all().await?;
            for failure in outcome.failed {
                summary.failed(
                    format!("register {}", failure.address),
                    None,
                    failure.kind,
                    failure.reason,
                );
            }
        }

        self.provision_fundraising_singletons(&mut summary).await?;
        self.provision_fundraising_rounds(&mut summary).await;

        info!(
            created = summary.created_count(),
            reused = summary.reused_count(),
            failed = summary.failures().count(),
            "Provisioning finished"
        );
        Ok(summary)
    }

    /// Provision the instances of a single market.
    ///
    /// # Errors
    ///
    /// Returns an error when a singleton stage fails or the market is not
    /// listed by the market directory.
    pub async fn provision_market(&mut self, market: Address) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        self.provision_instance_singletons(&mut summary).await?;

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

        self.provision_market_instances(&info, &mut summary).await;
        Ok(summary)
    }

    /// Provision the fundraising singletons and every configured round.
    ///
    /// # Errors
    ///
    /// Returns an error when a singleton stage fails.
    pub async fn provision_fundraising(&mut self) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        self.provision_fundraising_singletons(&mut summary).await?;
        self.provision_fundraising_rounds(&mut summary).await;
        Ok(summary)
    }

    async fn provision_instance_singletons(&mut self, summary: &mut RunSummary) -> Result<()> {
        let backend = self.settings.network.automation;
        let names = self.settings.contracts.clone();

        let registry = self
            .deploy_singleton(
                REGISTRY,
                ProvisioningTask::new(
                    ResourceKind::Registry,
                    names.registry.clone(),
                    names.registry.clone(),
                    (self.settings.network.market_factory,).abi_encode_params().into(),
                ),
            )
            .await?;
        summary.push(singleton_entry(&registry));

        let adapter_name = names.automate_lp_for(backend);
        let adapter = self
            .deploy_singleton(
                AUTOMATION_ADAPTER_LP,
                ProvisioningTask::new(
                    ResourceKind::AutomationAdapter,
                    adapter_name.clone(),
                    adapter_name,
                    (self.settings.network.automation_address,).abi_encode_params().into(),
                ),
            )
            .await?;
        if backend.needs_allowlist() {
            self.allowlist(adapter.address).await?;
        }
        summary.push(singleton_entry(&adapter));

        let logic_name = names.instance_logic_for(backend);
        let logic = self
            .deploy_singleton(
                INSTANCE_LOGIC,
                ProvisioningTask::new(
                    ResourceKind::InstanceLogic,
                    logic_name.clone(),
                    logic_name,
                    (adapter.address,).abi_encode_params().into(),
                )
                .depends_on([AUTOMATION_ADAPTER_LP]),
            )
            .await?;
        summary.push(singleton_entry(&logic));

        Ok(())
    }

    async fn provision_fundraising_singletons(&mut self, summary: &mut RunSummary) -> Result<()> {
        let backend = self.settings.network.automation;
        let adapter_name = self.settings.contracts.automate_bp_for(backend);
        let factory_name = self.settings.contracts.bp_factory.clone();

        let adapter = self
            .deploy_singleton(
                AUTOMATION_ADAPTER_FUNDRAISING,
                ProvisioningTask::new(
                    ResourceKind::AutomationAdapter,
                    adapter_name.clone(),
                    adapter_name,
                    (self.settings.network.automation_address,).abi_encode_params().into(),
                ),
            )
            .await?;
        if backend.needs_allowlist() {
            self.allowlist(adapter.address).await?;
        }
        summary.push(singleton_entry(&adapter));

        let factory = self
            .deploy_singleton(
                FUNDRAISING_FACTORY,
                ProvisioningTask::new(
                    ResourceKind::FundraisingFactory,
                    factory_name.clone(),
                    factory_name,
                    (adapter.address,).abi_encode_params().into(),
                )
                .depends_on([AUTOMATION_ADAPTER_FUNDRAISING]),
            )
            .await?;
        summary.push(singleton_entry(&factory));

        Ok(())
    }

    /// Provision `task` and record it under `key` in the ledger.
    async fn deploy_singleton(
        &mut self,
        key: &'static str,
        task: ProvisioningTask,
    ) -> Result<ResourceRecord> {
        self.ensure_dependencies(&task)?;
        let record = self.provisioner.provision(&task).await?;
        self.ledger.record_singleton(key, record.address)?;
        Ok(record)
    }

    /// Allow-list an automation adapter with the automation registry.
    async fn allowlist(&self, adapter: Address) -> Result<()> {
        let registry = self.settings.network.automation_address;
        let listed = self
            .read(
                registry,
                IAutomationRegistry::isWhitelistedRegistrarCall { registrar: adapter },
            )
            .await?;
        if listed {
            debug!(adapter = %adapter, "Adapter already allow-listed");
            return Ok(());
        }

        self.send(
            registry,
            IAutomationRegistry::addWhitelistedRegistrarCall { registrar: adapter },
        )
        .await?;
        self.observer
            .observe(ProvisionEvent::Allowlisted { adapter });
        Ok(())
    }

    /// Provision every configured tier for `market`, recording each outcome.
    async fn provision_market_instances(&mut self, market: &MarketInfo, summary: &mut RunSummary) {
        info!(
            market = %market.address,
            token = %market.settlement_token.symbol,
            "Provisioning market"
        );
        for spec in self.settings.instances.clone() {
            let subject = format!("{} @ {}", spec.name, market.address);
            match self.provision_instance(market, &spec).await {
                Ok((record, seeding)) => summary.push(SummaryEntry {
                    subject,
                    market: Some(market.address),
                    status: record_status(&record),
                    seeding,
                }),
                Err(e) => self.report_failure(summary, subject, Some(market.address), &e),
            }
        }
    }

    async fn provision_instance(
        &mut self,
        market: &MarketInfo,
        spec: &InstanceSpec,
    ) -> Result<(ResourceRecord, Option<SeedStatus>)> {
        let curve = spec.curve_config()?;
        let terms = spec
            .terms_for(&market.settlement_token, &self.settings.policies)
            .map_err(|e| ConfigError::InvalidValue {
                field: "instances",
                reason: e.to_string(),
            })?;

        let logic = self.ledger.lookup_singleton(INSTANCE_LOGIC)?;
        let adapter = self.ledger.lookup_singleton(AUTOMATION_ADAPTER_LP)?;
        let artifact = self
            .settings
            .contracts
            .instance_for(self.settings.network.automation);
        let name = format!("{artifact}-{}-{}", market.address, spec.slug());
        let args = instance_constructor_args(logic, adapter, market.address, spec, &curve, &terms);

        let task = ProvisioningTask::new(ResourceKind::Instance, name, artifact, args)
            .depends_on([INSTANCE_LOGIC, AUTOMATION_ADAPTER_LP])
            .related_to(market.address);
        self.ensure_dependencies(&task)?;

        if self.provisioner.existing(&task.name)?.is_none() {
            let prompt = format!(
                "Deploy {} ({}) for market {} settling in {}?",
                spec.name, spec.tag, market.address, market.settlement_token.symbol
            );
            if !self.confirmer.confirm(&prompt, false)? {
                return Err(Error::UserRejected {
                    subject: format!("{} for market {}", spec.name, market.address),
                });
            }
        }

        let record = self.provisioner.provision(&task).await?;
        if !self.ledger.contains_instance(market.address, record.address) {
            self.ledger.append_instance(market.address, record.address);
        }

        if self.settings.registration == RegistrationMode::PerInstance {
            self.register_instance(market.address, record.address).await?;
        }

        let seeding = if self.settings.seed_liquidity {
            Some(
                self.seed_instance(record.address, market, terms.initial_liquidity)
                    .await,
            )
        } else {
            None
        };

        Ok((record, seeding))
    }

    async fn provision_fundraising_rounds(&mut self, summary: &mut RunSummary) {
        for spec in self.settings.fundraising.clone() {
            let subject = match spec.target {
                FundraisingTarget::Lp { lp } => format!("BP for {lp}"),
                FundraisingTarget::MarketInstance { market, index } => {
                    format!("BP for instance #{index} of {market}")
                }
            };
            match self.provision_round(&spec).await {
                Ok(record) => summary.push(SummaryEntry {
                    subject,
                    market: None,
                    status: record_status(&record),
                    seeding: None,
                }),
                Err(e) => self.report_failure(summary, subject, None, &e),
            }
        }
    }

    async fn provision_round(&mut self, spec: &FundraisingSpec) -> Result<ResourceRecord> {
        spec.validate()
            .map_err(|(field, reason)| ConfigError::InvalidValue { field, reason })?;
        let factory = self.ledger.lookup_singleton(FUNDRAISING_FACTORY)?;
        let lp = self.resolve_fundraising_target(spec.target)?;

        let name = spec.deployment_name(lp);
        if let Some(record) = self.provisioner.existing(&name)? {
            self.observer.observe(ProvisionEvent::Reused {
                kind: ResourceKind::Fundraising,
                name,
                address: record.address,
            });
            return Ok(record);
        }

        let token = self.read(lp, ILP::settlementTokenCall {}).await?;
        let decimals = self.read(token, IERC20Metadata::decimalsCall {}).await?;
        let terms = spec.terms(lp, decimals).map_err(|e| ConfigError::InvalidValue {
            field: "fundraising",
            reason: e.to_string(),
        })?;

        let call = IBPFactory::createBPCall {
            config: bp_config(&terms),
        };
        let calldata: Bytes = call.abi_encode().into();
        info!(lp = %lp, name = %name, "Creating fundraising round");
        let receipt = self.send(factory, call).await?;

        let created = receipt
            .find_event::<IBPFactory::BPCreated>()
            .ok_or_else(|| ChainError::MissingEvent {
                event: "BPCreated",
                tx_hash: receipt.tx_hash.to_string(),
            })?;

        self.provisioner.store().save(
            &name,
            &DeploymentRecord {
                address: created.bp,
                artifact: "BP".into(),
                constructor_args: calldata,
                kind: Some(ResourceKind::Fundraising),
                related: Some(lp),
                tx_hash: Some(receipt.tx_hash),
                block_number: receipt.block_number,
                deployed_at: Utc::now(),
            },
        )?;
        self.observer.observe(ProvisionEvent::Created {
            kind: ResourceKind::Fundraising,
            name: name.clone(),
            address: created.bp,
            related: Some(lp),
            block_number: receipt.block_number,
        });

        Ok(ResourceRecord::created(name, created.bp, receipt.block_number))
    }

    fn resolve_fundraising_target(&self, target: FundraisingTarget) -> Result<Address> {
        match target {
            FundraisingTarget::Lp { lp } => Ok(lp),
            FundraisingTarget::MarketInstance { market, index } => self
                .ledger
                .instances_of(market)
                .get(index)
                .copied()
                .ok_or_else(|| {
                    LedgerError::NotFound {
                        name: format!("instance #{index} of market {market}"),
                    }
                    .into()
                }),
        }
    }

    /// Seed a freshly provisioned instance. Never fails the instance.
    async fn seed_instance(
        &self,
        lp: Address,
        market: &MarketInfo,
        amount: Option<U256>,
    ) -> SeedStatus {
        let Some(amount) = amount.filter(|a| !a.is_zero()) else {
            return SeedStatus::Skipped;
        };

        let held = match self
            .read(lp, ILP::balanceOfCall { account: self.sender() })
            .await
        {
            Ok(held) => held,
            Err(e) => return self.seed_failure(lp, &e),
        };
        if !held.is_zero() {
            debug!(lp = %lp, held = %held, "Instance already seeded");
            return SeedStatus::Skipped;
        }

        let token = &market.settlement_token;
        match self
            .deposit(lp, token.address, &token.symbol, token.decimals, amount)
            .await
        {
            Ok(()) => SeedStatus::Seeded {
                amount: crate::domain::units::format_base_units(amount, token.decimals),
            },
            Err(e) => self.seed_failure(lp, &e),
        }
    }

    fn seed_failure(&self, lp: Address, error: &Error) -> SeedStatus {
        let kind = error.kind();
        tracing::warn!(lp = %lp, %kind, error = %error, "Seeding skipped, instance kept");
        self.observer.observe(ProvisionEvent::Failed {
            subject: format!("seed {lp}"),
            kind,
            reason: error.to_string(),
        });
        SeedStatus::Failed {
            kind,
            reason: error.to_string(),
        }
    }
}

fn record_status(record: &ResourceRecord) -> EntryStatus {
    if record.newly_created {
        EntryStatus::Created {
            address: record.address,
        }
    } else {
        EntryStatus::Reused {
            address: record.address,
        }
    }
}

fn singleton_entry(record: &ResourceRecord) -> SummaryEntry {
    SummaryEntry {
        subject: record.name.clone(),
        market: None,
        status: record_status(record),
        seeding: None,
    }
}

/// ABI-encoded instance constructor arguments.
fn instance_constructor_args(
    logic: Address,
    adapter: Address,
    market: Address,
    spec: &InstanceSpec,
    curve: &CurveConfig,
    terms: &InstanceTerms,
) -> Bytes {
    let meta = LPMeta {
        lpName: spec.name.clone(),
        tag: spec.tag.clone(),
    };
    let config = LPConfig {
        market,
        utilizationTargetBPS: curve.utilization_target_bps(),
        rebalanceBPS: spec.rebalance_bps,
        rebalanceCheckingInterval: U256::from(spec.rebalance_checking_interval),
        settleCheckingInterval: U256::from(spec.settle_checking_interval),
        automationFeeReserved: terms.automation_fee_reserved,
        minHoldingValueToRebalance: terms.min_holding_value_to_rebalance,
    };
    (
        logic,
        meta,
        config,
        curve.fee_rates().to_vec(),
        curve.distribution_rates().to_vec(),
        adapter,
    )
        .abi_encode_params()
        .into()
}

fn bp_config(terms: &FundraisingTerms) -> BPConfig {
    BPConfig {
        lp: terms.lp,
        totalReward: terms.total_reward,
        minRaisingTarget: terms.min_raising_target,
        maxRaisingTarget: terms.max_raising_target,
        startTimeOfWarmup: U256::from(terms.start_time_of_warmup),
        maxDurationOfWarmup: U256::from(terms.max_duration_of_warmup),
        durationOfLockup: U256::from(terms.duration_of_lockup),
        minDeposit: terms.min_deposit,
    }
}
