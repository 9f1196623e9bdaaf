//! Provisioning observer port.
//!
//! The orchestrator reports what it does as structured [`ProvisionEvent`]s
//! instead of writing log lines directly, so core logic can be tested
//! without asserting on log text.

use alloy_primitives::{Address, U256};

use crate::domain::resource::ResourceKind;
use crate::domain::summary::FailureKind;

/// Something observable happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionEvent {
    /// A contract was created by this run.
    Created {
        kind: ResourceKind,
        name: String,
        address: Address,
        /// Market for instances, instance for fundraising rounds.
        related: Option<Address>,
        block_number: Option<u64>,
    },
    /// A named deployment already existed and was reused.
    Reused {
        kind: ResourceKind,
        name: String,
        address: Address,
    },
    Registered {
        market: Address,
        lp: Address,
    },
    Unregistered {
        market: Address,
        lp: Address,
    },
    /// An automation adapter was allow-listed with the automation registry.
    Allowlisted {
        adapter: Address,
    },
    LiquidityAdded {
        lp: Address,
        amount: U256,
    },
    LiquidityRemoved {
        lp: Address,
        amount: U256,
    },
    RebalanceTask {
        lp: Address,
        created: bool,
    },
    /// A step failed and the run moved on.
    Failed {
        subject: String,
        kind: FailureKind,
        reason: String,
    },
    VerificationFailed {
        address: Address,
        reason: String,
    },
}

/// Receives provisioning events.
pub trait ProvisionObserver: Send + Sync {
    fn observe(&self, event: ProvisionEvent);
}

/// Discards every event.
pub struct NullObserver;

impl ProvisionObserver for NullObserver {
    fn observe(&self, _event: ProvisionEvent) {}
}

/// Writes events through `tracing`.
pub struct LogObserver;

impl ProvisionObserver for LogObserver {
    fn observe(&self, event: ProvisionEvent) {
        use tracing::{info, warn};
        match event {
            ProvisionEvent::Created {
                kind,
                name,
                address,
                related,
                block_number,
            } => {
                info!(
                    %kind,
                    name = %name,
                    address = %address,
                    related = ?related,
                    block = ?block_number,
                    "Deployed"
                );
            }
            ProvisionEvent::Reused {
                kind,
                name,
                address,
            } => {
                info!(%kind, name = %name, address = %address, "Previously deployed");
            }
            ProvisionEvent::Registered { market, lp } => {
                info!(market = %market, lp = %lp, "Registered");
            }
            ProvisionEvent::Unregistered { market, lp } => {
                info!(market = %market, lp = %lp, "Unregistered");
            }
            ProvisionEvent::Allowlisted { adapter } => {
                info!(adapter = %adapter, "Allow-listed with automation registry");
            }
            ProvisionEvent::LiquidityAdded { lp, amount } => {
                info!(lp = %lp, amount = %amount, "Liquidity added");
            }
            ProvisionEvent::LiquidityRemoved { lp, amount } => {
                info!(lp = %lp, amount = %amount, "Liquidity removed");
            }
            ProvisionEvent::RebalanceTask { lp, created } => {
                if created {
                    info!(lp = %lp, "Rebalance task created");
                } else {
                    info!(lp = %lp, "Rebalance task cancelled");
                }
            }
            ProvisionEvent::Failed {
                subject,
                kind,
                reason,
            } => {
                warn!(subject = %subject, %kind, reason = %reason, "Step failed");
            }
            ProvisionEvent::VerificationFailed { address, reason } => {
                warn!(address = %address, reason = %reason, "Verification failed");
            }
        }
    }
}
