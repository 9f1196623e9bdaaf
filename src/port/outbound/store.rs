//! Deployment store port.
//!
//! The store is the provisioning backend's memory: a named deployment is
//! created at most once per network namespace, and every later run finds
//! it here instead of sending a transaction.

use alloy_primitives::{Address, Bytes, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::error::Result;

/// What was deployed under a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub address: Address,
    pub artifact: String,
    pub constructor_args: Bytes,
    /// Absent in records written before kinds were stored.
    #[serde(default)]
    pub kind: Option<ResourceKind>,
    /// Market of an instance, LP of a fundraising round.
    #[serde(default)]
    pub related: Option<Address>,
    #[serde(default)]
    pub tx_hash: Option<B256>,
    #[serde(default)]
    pub block_number: Option<u64>,
    pub deployed_at: DateTime<Utc>,
}

/// Persistence of named deployments.
pub trait DeploymentStore: Send + Sync {
    /// Record for `name`, if deployed.
    fn get(&self, name: &str) -> Result<Option<DeploymentRecord>>;

    /// Store or replace the record for `name`.
    fn save(&self, name: &str, record: &DeploymentRecord) -> Result<()>;

    /// Every stored deployment, ordered by name.
    fn all(&self) -> Result<Vec<(String, DeploymentRecord)>>;
}
