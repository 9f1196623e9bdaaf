//! Run settings for the provisioning orchestrator.

use alloy_primitives::Address;
use serde::Deserialize;

use crate::application::retry::RetryPolicy;
use crate::domain::automation::AutomationBackend;
use crate::domain::fundraising::FundraisingSpec;
use crate::domain::instance::{AssetPolicies, InstanceSpec};

/// Artifact base names of the deployed contracts.
///
/// Backend-specific contracts get the backend suffix appended, so
/// `instance = "LP"` deploys `LPGelato` or `LPMate2`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContractNames {
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(default = "default_instance_logic")]
    pub instance_logic: String,
    #[serde(default = "default_instance")]
    pub instance: String,
    #[serde(default = "default_automate_lp")]
    pub automate_lp: String,
    #[serde(default = "default_automate_bp")]
    pub automate_bp: String,
    #[serde(default = "default_bp_factory")]
    pub bp_factory: String,
}

fn default_registry() -> String {
    "LPRegistry".into()
}

fn default_instance_logic() -> String {
    "LPLogic".into()
}

fn default_instance() -> String {
    "LP".into()
}

fn default_automate_lp() -> String {
    "AutomateLP".into()
}

fn default_automate_bp() -> String {
    "AutomateBP".into()
}

fn default_bp_factory() -> String {
    "BPFactory".into()
}

impl Default for ContractNames {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            instance_logic: default_instance_logic(),
            instance: default_instance(),
            automate_lp: default_automate_lp(),
            automate_bp: default_automate_bp(),
            bp_factory: default_bp_factory(),
        }
    }
}

impl ContractNames {
    #[must_use]
    pub fn instance_logic_for(&self, backend: AutomationBackend) -> String {
        format!("{}{}", self.instance_logic, backend.contract_name_suffix())
    }

    #[must_use]
    pub fn instance_for(&self, backend: AutomationBackend) -> String {
        format!("{}{}", self.instance, backend.contract_name_suffix())
    }

    #[must_use]
    pub fn automate_lp_for(&self, backend: AutomationBackend) -> String {
        format!("{}{}", self.automate_lp, backend.contract_name_suffix())
    }

    #[must_use]
    pub fn automate_bp_for(&self, backend: AutomationBackend) -> String {
        format!("{}{}", self.automate_bp, backend.contract_name_suffix())
    }
}

/// When instances are registered with the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationMode {
    /// Right after each instance is provisioned.
    #[default]
    PerInstance,
    /// Once, after every market is done. Local networks only.
    Bulk,
}

/// The network a run targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkProfile {
    pub name: String,
    pub chain_id: u64,
    /// Ephemeral development node.
    pub local: bool,
    /// Ledger is reconciled from the store and the registry at startup.
    pub persistent: bool,
    pub automation: AutomationBackend,
    /// Resolved automation entry point.
    pub automation_address: Address,
    pub market_factory: Address,
}

/// Everything the orchestrator needs besides its collaborators.
#[derive(Debug, Clone)]
pub struct ProvisionSettings {
    pub network: NetworkProfile,
    pub contracts: ContractNames,
    pub instances: Vec<InstanceSpec>,
    pub fundraising: Vec<FundraisingSpec>,
    pub policies: AssetPolicies,
    pub seed_liquidity: bool,
    pub registration: RegistrationMode,
    pub retry: RetryPolicy,
}
