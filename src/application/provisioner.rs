//! Idempotent deployment of named resources.
//!
//! A name is deployed at most once per network namespace. The
//! [`DeploymentStore`] is consulted before anything is sent; a hit returns
//! the stored address with `newly_created = false` and performs no
//! transaction.

use std::sync::Arc;

use alloy_primitives::Address;
use chrono::Utc;
use tracing::{info, warn};

use crate::application::retry::RetryPolicy;
use crate::application::transaction::submit_once;
use crate::domain::resource::{ProvisioningTask, ResourceRecord};
use crate::error::{ChainError, Result};
use crate::port::{
    Artifact, ArtifactSource, ChainClient, DeploymentRecord, DeploymentStore, ProvisionEvent,
    ProvisionObserver, SourceVerifier, VerificationRequest,
};

/// Deploys single named resources through the chain client.
pub struct ResourceProvisioner {
    chain: Arc<dyn ChainClient>,
    store: Arc<dyn DeploymentStore>,
    artifacts: Arc<dyn ArtifactSource>,
    verifier: Arc<dyn SourceVerifier>,
    observer: Arc<dyn ProvisionObserver>,
    retry: RetryPolicy,
}

impl ResourceProvisioner {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        store: Arc<dyn DeploymentStore>,
        artifacts: Arc<dyn ArtifactSource>,
        verifier: Arc<dyn SourceVerifier>,
        observer: Arc<dyn ProvisionObserver>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            chain,
            store,
            artifacts,
            verifier,
            observer,
            retry,
        }
    }

    #[must_use]
    pub fn chain(&self) -> &dyn ChainClient {
        self.chain.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &dyn DeploymentStore {
        self.store.as_ref()
    }

    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Stored deployment for `name`, without deploying.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn existing(&self, name: &str) -> Result<Option<ResourceRecord>> {
        Ok(self
            .store
            .get(name)?
            .map(|record| ResourceRecord::reused(name, record.address)))
    }

    /// Deploy `task` unless its name is already deployed.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be loaded, the creation
    /// transaction fails after every retry, or the record cannot be saved.
    /// Verification failures are never returned.
    pub async fn provision(&self, task: &ProvisioningTask) -> Result<ResourceRecord> {
        if let Some(record) = self.existing(&task.name)? {
            self.observer.observe(ProvisionEvent::Reused {
                kind: task.kind,
                name: task.name.clone(),
                address: record.address,
            });
            return Ok(record);
        }

        let artifact = self.artifacts.load(&task.artifact)?;
        let init_code = artifact.init_code(&task.constructor_args);
        info!(
            name = %task.name,
            artifact = %task.artifact,
            args_len = task.constructor_args.len(),
            "Deploying"
        );

        let receipt =
            submit_once(self.chain.as_ref(), &self.retry, &task.name, None, init_code).await?;

        let address = receipt
            .contract_address
            .ok_or_else(|| ChainError::MissingContractAddress {
                tx_hash: receipt.tx_hash.to_string(),
            })?;

        self.store.save(
            &task.name,
            &DeploymentRecord {
                address,
                artifact: task.artifact.clone(),
                constructor_args: task.constructor_args.clone(),
                kind: Some(task.kind),
                related: task.related,
                tx_hash: Some(receipt.tx_hash),
                block_number: receipt.block_number,
                deployed_at: Utc::now(),
            },
        )?;

        self.observer.observe(ProvisionEvent::Created {
            kind: task.kind,
            name: task.name.clone(),
            address,
            related: task.related,
            block_number: receipt.block_number,
        });

        self.verify(&artifact, address, task).await;

        Ok(ResourceRecord::created(
            task.name.clone(),
            address,
            receipt.block_number,
        ))
    }

    async fn verify(&self, artifact: &Artifact, address: Address, task: &ProvisioningTask) {
        let request = VerificationRequest {
            address,
            contract_name: artifact.qualified_name(),
            constructor_args: task.constructor_args.clone(),
        };
        if let Err(e) = self.verifier.verify(&request).await {
            warn!(name = %task.name, address = %address, error = %e, "Source verification failed");
            self.observer.observe(ProvisionEvent::VerificationFailed {
                address,
                reason: e.to_string(),
            });
        }
    }
}
