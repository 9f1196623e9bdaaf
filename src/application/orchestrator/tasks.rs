//! Rebalance automation tasks of provisioned instances.

use alloy_primitives::Address;
use tracing::info;

use super::{BulkOutcome, Orchestrator};
use crate::contracts::ILP;
use crate::error::Result;
use crate::port::ProvisionEvent;

impl Orchestrator {
    /// Create the rebalance task of every instance in the ledger.
    ///
    /// Individual failures are collected and do not stop the loop.
    ///
    /// # Errors
    ///
    /// Never fails as a whole; kept fallible for parity with other bulk
    /// operations.
    pub async fn create_rebalance_tasks(&self) -> Result<BulkOutcome> {
        self.for_each_instance(true).await
    }

    /// Cancel the rebalance task of every instance in the ledger.
    ///
    /// # Errors
    ///
    /// Never fails as a whole; individual failures are collected.
    pub async fn cancel_rebalance_tasks(&self) -> Result<BulkOutcome> {
        self.for_each_instance(false).await
    }

    async fn for_each_instance(&self, create: bool) -> Result<BulkOutcome> {
        let mut outcome = BulkOutcome::default();
        for lp in self.ledger.all_instance_addresses() {
            match self.toggle_rebalance_task(lp, create).await {
                Ok(()) => outcome.succeeded.push(lp),
                Err(e) => self.bulk_failure(&mut outcome, lp, &e),
            }
        }
        info!(
            create,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Rebalance tasks updated"
        );
        Ok(outcome)
    }

    async fn toggle_rebalance_task(&self, lp: Address, create: bool) -> Result<()> {
        if create {
            self.send(lp, ILP::createRebalanceTaskCall {}).await?;
        } else {
            self.send(lp, ILP::cancelRebalanceTaskCall {}).await?;
        }
        self.observer
            .observe(ProvisionEvent::RebalanceTask { lp, created: create });
        Ok(())
    }
}
