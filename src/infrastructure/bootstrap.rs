//! Composition root: wires configuration into adapters and the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::adapter::outbound::artifact::FileArtifactSource;
use crate::adapter::outbound::confirm::{DialoguerConfirmer, StaticConfirmer};
use crate::adapter::outbound::explorer::{ExplorerSettings, ExplorerVerifier, NoopVerifier};
use crate::adapter::outbound::market::FactoryMarketDirectory;
use crate::adapter::outbound::rpc::{RpcChainClient, RpcSettings};
use crate::adapter::outbound::store::{InMemoryDeploymentStore, JsonFileDeploymentStore};
use crate::application::orchestrator::Orchestrator;
use crate::application::provisioner::ResourceProvisioner;
use crate::domain::ledger::AddressLedger;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::{
    ChainClient, Confirmer, DeploymentStore, LogObserver, ProvisionObserver, SourceVerifier,
};

/// Command-line choices that affect wiring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    /// Answer every confirmation prompt with yes.
    pub assume_yes: bool,
}

/// Connect a signing chain client to the active network.
///
/// # Errors
///
/// Returns an error if the network, key or RPC URL is invalid.
pub fn build_chain_client(config: &Config) -> Result<Arc<dyn ChainClient>> {
    let network = config.active_network()?;
    let settings = RpcSettings {
        rpc_url: network.rpc_url.clone(),
        chain_id: network.chain_id,
        confirmation_timeout: Duration::from_secs(network.confirmation_timeout_secs),
        confirmations: network.confirmations,
    };
    let client = RpcChainClient::connect(&settings, &config.signing_key()?)?;
    info!(
        network = %config.network,
        chain_id = network.chain_id,
        sender = %client.sender(),
        "Chain client connected"
    );
    Ok(Arc::new(client))
}

/// File store for persistent networks, memory otherwise.
///
/// # Errors
///
/// Returns an error if the network is unknown.
pub fn build_store(config: &Config) -> Result<Arc<dyn DeploymentStore>> {
    let network = config.active_network()?;
    if network.is_persistent() {
        let store = JsonFileDeploymentStore::new(&config.deployments.dir, &config.network);
        debug!(dir = %store.dir().display(), "Using file deployment store");
        Ok(Arc::new(store))
    } else {
        debug!("Using in-memory deployment store");
        Ok(Arc::new(InMemoryDeploymentStore::new()))
    }
}

/// Explorer verifier when fully configured, no-op otherwise.
///
/// # Errors
///
/// Returns an error if the network is unknown.
pub fn build_verifier(config: &Config) -> Result<Arc<dyn SourceVerifier>> {
    let network = config.active_network()?;
    if network.is_local() {
        return Ok(Arc::new(NoopVerifier));
    }

    let settings = match (
        &network.explorer_api_url,
        &config.explorer_api_key,
        &config.artifacts.compiler_version,
        &config.artifacts.standard_input,
    ) {
        (Some(api_url), Some(api_key), Some(compiler_version), Some(standard_input)) => {
            ExplorerSettings {
                api_url: api_url.clone(),
                api_key: api_key.clone(),
                compiler_version: compiler_version.clone(),
                standard_input: standard_input.clone(),
            }
        }
        _ => {
            debug!("Explorer verification not configured");
            return Ok(Arc::new(NoopVerifier));
        }
    };
    Ok(Arc::new(ExplorerVerifier::new(settings)))
}

#[must_use]
pub fn build_confirmer(options: SessionOptions) -> Arc<dyn Confirmer> {
    if options.assume_yes {
        Arc::new(StaticConfirmer(true))
    } else {
        Arc::new(DialoguerConfirmer)
    }
}

/// Build an orchestrator for the active network and reconcile its ledger.
///
/// # Errors
///
/// Returns an error if any collaborator cannot be built or reconciliation
/// fails.
pub async fn build_orchestrator(config: &Config, options: SessionOptions) -> Result<Orchestrator> {
    let settings = config.provision_settings()?;
    let chain = build_chain_client(config)?;
    let observer: Arc<dyn ProvisionObserver> = Arc::new(LogObserver);

    let provisioner = ResourceProvisioner::new(
        Arc::clone(&chain),
        build_store(config)?,
        Arc::new(FileArtifactSource::new(&config.artifacts.dir)),
        build_verifier(config)?,
        Arc::clone(&observer),
        settings.retry,
    );
    let markets = Arc::new(FactoryMarketDirectory::new(
        chain,
        settings.network.market_factory,
        settings.retry,
    ));

    let mut orchestrator = Orchestrator::new(
        provisioner,
        markets,
        build_confirmer(options),
        observer,
        settings,
        AddressLedger::new(),
    );
    orchestrator.reconcile().await?;
    Ok(orchestrator)
}
