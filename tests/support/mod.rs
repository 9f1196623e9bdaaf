#![allow(dead_code)]

pub mod artifacts;
pub mod chain;
pub mod recording;

use std::sync::Arc;

use alloy_primitives::Address;

use lpforge::adapter::outbound::market::FactoryMarketDirectory;
use lpforge::adapter::outbound::store::InMemoryDeploymentStore;
use lpforge::application::orchestrator::{
    ContractNames, NetworkProfile, Orchestrator, ProvisionSettings, RegistrationMode,
};
use lpforge::application::provisioner::ResourceProvisioner;
use lpforge::application::retry::RetryPolicy;
use lpforge::domain::automation::AutomationBackend;
use lpforge::domain::instance::{AssetPolicies, InstanceSpec};
use lpforge::domain::ledger::AddressLedger;

use self::artifacts::StaticArtifacts;
use self::chain::{MockChain, MARKET_FACTORY};
use self::recording::{CountingConfirmer, RecordingObserver, RecordingVerifier};

/// Automation registry the test network resolves to.
pub const AUTOMATION: Address = Address::repeat_byte(0xa0);

/// Settings for a local development network with the default tiers.
pub fn local_settings() -> ProvisionSettings {
    ProvisionSettings {
        network: NetworkProfile {
            name: "anvil".into(),
            chain_id: 31337,
            local: true,
            persistent: false,
            automation: AutomationBackend::Mate2,
            automation_address: AUTOMATION,
            market_factory: MARKET_FACTORY,
        },
        contracts: ContractNames::default(),
        instances: InstanceSpec::default_tiers(),
        fundraising: Vec::new(),
        policies: AssetPolicies::default(),
        seed_liquidity: false,
        registration: RegistrationMode::PerInstance,
        retry: RetryPolicy::none(),
    }
}

/// Same as [`local_settings`] on a shared, persistent network.
pub fn shared_settings() -> ProvisionSettings {
    let mut settings = local_settings();
    settings.network.name = "arbitrum-sepolia".into();
    settings.network.chain_id = 421_614;
    settings.network.local = false;
    settings.network.persistent = true;
    settings
}

/// Collaborators shared between orchestrators built in one test.
pub struct Harness {
    pub chain: Arc<MockChain>,
    pub store: Arc<InMemoryDeploymentStore>,
    pub artifacts: Arc<StaticArtifacts>,
    pub verifier: Arc<RecordingVerifier>,
    pub observer: Arc<RecordingObserver>,
    pub confirmer: Arc<CountingConfirmer>,
}

impl Harness {
    /// A chain with `markets` USDC markets and an approving operator.
    pub fn new(markets: u8) -> Self {
        Self::with_chain(MockChain::with_markets(markets))
    }

    pub fn with_chain(chain: MockChain) -> Self {
        Self {
            chain: Arc::new(chain),
            store: Arc::new(InMemoryDeploymentStore::new()),
            artifacts: Arc::new(StaticArtifacts::new()),
            verifier: Arc::new(RecordingVerifier::new()),
            observer: Arc::new(RecordingObserver::new()),
            confirmer: Arc::new(CountingConfirmer::new(true)),
        }
    }

    pub fn rejecting(mut self) -> Self {
        self.confirmer = Arc::new(CountingConfirmer::new(false));
        self
    }

    pub fn with_verifier(mut self, verifier: RecordingVerifier) -> Self {
        self.verifier = Arc::new(verifier);
        self
    }

    pub fn provisioner(&self, retry: RetryPolicy) -> ResourceProvisioner {
        ResourceProvisioner::new(
            self.chain.clone(),
            self.store.clone(),
            self.artifacts.clone(),
            self.verifier.clone(),
            self.observer.clone(),
            retry,
        )
    }

    pub fn orchestrator(&self, settings: ProvisionSettings) -> Orchestrator {
        self.orchestrator_with_ledger(settings, AddressLedger::new())
    }

    pub fn orchestrator_with_ledger(
        &self,
        settings: ProvisionSettings,
        ledger: AddressLedger,
    ) -> Orchestrator {
        let markets = Arc::new(FactoryMarketDirectory::new(
            self.chain.clone(),
            MARKET_FACTORY,
            settings.retry,
        ));
        Orchestrator::new(
            self.provisioner(settings.retry),
            markets,
            self.confirmer.clone(),
            self.observer.clone(),
            settings,
            ledger,
        )
    }
}
