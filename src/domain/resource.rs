//! Named on-chain resources and their provisioning descriptors.

use std::collections::BTreeSet;
use std::fmt;

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// Outcome of provisioning one named resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    /// Deployment name, unique within a network namespace.
    pub name: String,
    /// Contract address.
    pub address: Address,
    /// True when this call created the contract, false when it was reused.
    pub newly_created: bool,
    /// Block the creation transaction was included in, when created now.
    pub block_number: Option<u64>,
}

impl ResourceRecord {
    #[must_use]
    pub fn created(name: impl Into<String>, address: Address, block_number: Option<u64>) -> Self {
        Self {
            name: name.into(),
            address,
            newly_created: true,
            block_number,
        }
    }

    #[must_use]
    pub fn reused(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            newly_created: false,
            block_number: None,
        }
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.newly_created { "created" } else { "reused" };
        write!(f, "{} at {} ({state})", self.name, self.address)
    }
}

/// What a provisioned contract is, for observers and indexers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Registry,
    AutomationAdapter,
    InstanceLogic,
    Instance,
    FundraisingFactory,
    Fundraising,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Registry => "registry",
            Self::AutomationAdapter => "automation adapter",
            Self::InstanceLogic => "instance logic",
            Self::Instance => "instance",
            Self::FundraisingFactory => "fundraising factory",
            Self::Fundraising => "fundraising",
        };
        f.write_str(label)
    }
}

/// Transient descriptor of one deployment within a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningTask {
    pub kind: ResourceKind,
    /// Deployment name used for idempotence.
    pub name: String,
    /// Compiled artifact providing the creation bytecode.
    pub artifact: String,
    /// ABI-encoded constructor arguments.
    pub constructor_args: Bytes,
    /// Ledger singletons that must exist before this task runs.
    pub depends_on: BTreeSet<String>,
    /// Market or instance the resource belongs to.
    pub related: Option<Address>,
}

impl ProvisioningTask {
    #[must_use]
    pub fn new(
        kind: ResourceKind,
        name: impl Into<String>,
        artifact: impl Into<String>,
        constructor_args: Bytes,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            artifact: artifact.into(),
            constructor_args,
            depends_on: BTreeSet::new(),
            related: None,
        }
    }

    #[must_use]
    pub fn related_to(mut self, address: Address) -> Self {
        self.related = Some(address);
        self
    }

    /// Add ledger dependencies.
    #[must_use]
    pub fn depends_on<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(names.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_collects_dependencies() {
        let task = ProvisioningTask::new(ResourceKind::Instance, "LP", "LPMate2", Bytes::new())
            .depends_on(["registry", "instance-logic"])
            .depends_on(["registry"]);
        assert_eq!(task.depends_on.len(), 2);
        assert!(task.depends_on.contains("instance-logic"));
    }

    #[test]
    fn record_display_shows_state() {
        let record = ResourceRecord::reused("Registry", Address::ZERO);
        assert!(record.to_string().ends_with("(reused)"));
        assert!(!record.newly_created);
    }
}
