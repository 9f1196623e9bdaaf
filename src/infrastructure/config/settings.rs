//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file with environment variable overrides
//! for sensitive values like `WALLET_PRIVATE_KEY`.
//!
//! # Example
//!
//! ```no_run
//! use lpforge::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("lpforge.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::network::NetworkConfig;
use crate::application::orchestrator::{
    ContractNames, NetworkProfile, ProvisionSettings, RegistrationMode,
};
use crate::application::retry::RetryPolicy;
use crate::domain::fundraising::FundraisingSpec;
use crate::domain::instance::{AssetPolicies, AssetPolicy, InstanceSpec};
use crate::error::{ConfigError, Result};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "lpforge.toml";

/// Private key of the first account every local development node funds.
const LOCAL_DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Where deployment records are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentsConfig {
    #[serde(default = "default_deployments_dir")]
    pub dir: PathBuf,
}

fn default_deployments_dir() -> PathBuf {
    PathBuf::from("deployments")
}

impl Default for DeploymentsConfig {
    fn default() -> Self {
        Self {
            dir: default_deployments_dir(),
        }
    }
}

/// Compiled contracts and the inputs needed to verify them.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    #[serde(default = "default_artifacts_dir")]
    pub dir: PathBuf,
    /// Full solc version used for explorer verification.
    #[serde(default)]
    pub compiler_version: Option<String>,
    /// Standard-JSON compiler input used for explorer verification.
    #[serde(default)]
    pub standard_input: Option<PathBuf>,
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: default_artifacts_dir(),
            compiler_version: None,
            standard_input: None,
        }
    }
}

/// `[provision]` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisionConfig {
    /// Deposit each tier's `initial_liquidity` right after provisioning.
    #[serde(default)]
    pub seed_liquidity: bool,
    #[serde(default)]
    pub registration: RegistrationMode,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Name of the active entry in `networks`.
    pub network: String,

    pub networks: BTreeMap<String, NetworkConfig>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub retry: RetryPolicy,

    #[serde(default)]
    pub deployments: DeploymentsConfig,

    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    #[serde(default)]
    pub contracts: ContractNames,

    #[serde(default)]
    pub provision: ProvisionConfig,

    #[serde(default)]
    pub asset_policies: Vec<AssetPolicy>,

    /// Risk tiers provisioned for every market.
    #[serde(default = "InstanceSpec::default_tiers")]
    pub instances: Vec<InstanceSpec>,

    #[serde(default)]
    pub fundraising: Vec<FundraisingSpec>,

    /// Loaded from `WALLET_PRIVATE_KEY`, never from the file.
    #[serde(skip)]
    pub private_key: Option<String>,

    /// Loaded from `EXPLORER_API_KEY`, never from the file.
    #[serde(skip)]
    pub explorer_api_key: Option<String>,
}

fn env_secret(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Secrets are read from `WALLET_PRIVATE_KEY` and `EXPLORER_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.private_key = env_secret("WALLET_PRIVATE_KEY");
        config.explorer_api_key = env_secret("EXPLORER_API_KEY");
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Switch the active network and re-validate.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not configured or the combination is
    /// invalid.
    pub fn select_network(&mut self, name: &str) -> Result<()> {
        self.network = name.to_string();
        self.validate()
    }

    /// Initialize the tracing subscriber.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// The active network table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownNetwork`] if it is not configured.
    pub fn active_network(&self) -> Result<&NetworkConfig> {
        self.networks.get(&self.network).ok_or_else(|| {
            ConfigError::UnknownNetwork {
                name: self.network.clone(),
            }
            .into()
        })
    }

    /// Signing key for the active network.
    ///
    /// Local networks fall back to the development node's funded account.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] on other networks without a key.
    pub fn signing_key(&self) -> Result<String> {
        if let Some(key) = &self.private_key {
            return Ok(key.clone());
        }
        if self.active_network()?.is_local() {
            return Ok(LOCAL_DEV_PRIVATE_KEY.to_string());
        }
        Err(ConfigError::MissingField {
            field: "WALLET_PRIVATE_KEY",
        }
        .into())
    }

    /// Resolved profile of the active network.
    ///
    /// # Errors
    ///
    /// Returns an error if the network is unknown or no automation address
    /// can be resolved.
    pub fn network_profile(&self) -> Result<NetworkProfile> {
        let network = self.active_network()?;
        let automation_address =
            network
                .resolve_automation_address()
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "automation_address",
                    reason: format!(
                        "{} has no known address on chain {}; set automation_address",
                        network.automation, network.chain_id
                    ),
                })?;

        Ok(NetworkProfile {
            name: self.network.clone(),
            chain_id: network.chain_id,
            local: network.is_local(),
            persistent: network.is_persistent(),
            automation: network.automation,
            automation_address,
            market_factory: network.market_factory,
        })
    }

    /// Everything the orchestrator needs from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the network profile cannot be resolved.
    pub fn provision_settings(&self) -> Result<ProvisionSettings> {
        Ok(ProvisionSettings {
            network: self.network_profile()?,
            contracts: self.contracts.clone(),
            instances: self.instances.clone(),
            fundraising: self.fundraising.clone(),
            policies: AssetPolicies::new(self.asset_policies.clone()),
            seed_liquidity: self.provision.seed_liquidity,
            registration: self.provision.registration,
            retry: self.retry,
        })
    }

    /// Validate configuration values.
    ///
    /// Curves are built here so a bad tier fails before any transaction.
    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        let network = self.active_network()?;
        if network.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "rpc_url" }.into());
        }
        if network.confirmation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "confirmation_timeout_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.provision.registration == RegistrationMode::Bulk && !network.is_local() {
            return Err(ConfigError::NetworkNotLocal {
                network: self.network.clone(),
                operation: "bulk registration",
            }
            .into());
        }

        if self.instances.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "instances",
                reason: "at least one tier is required".to_string(),
            }
            .into());
        }
        let mut slugs = BTreeSet::new();
        for spec in &self.instances {
            if !slugs.insert(spec.slug()) {
                return Err(ConfigError::InvalidValue {
                    field: "instances",
                    reason: format!("duplicate tier name '{}'", spec.name),
                }
                .into());
            }
            spec.curve_config()?.validate()?;
        }

        for policy in &self.asset_policies {
            if policy.threshold_divisor == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "threshold_divisor",
                    reason: format!("{} divisor must be greater than 0", policy.symbol),
                }
                .into());
            }
        }

        for spec in &self.fundraising {
            spec.validate()
                .map_err(|(field, reason)| ConfigError::InvalidValue { field, reason })?;
        }

        Ok(())
    }
}
