//! Port definitions for the hexagonal architecture.
//!
//! Outbound ports are implemented by adapters under `adapter::outbound` and
//! by test doubles. The application layer only ever sees these traits.

pub mod outbound;

pub use outbound::artifact::{Artifact, ArtifactSource};
pub use outbound::chain::{ChainClient, LogEntry, SignedTransaction, TxReceipt};
pub use outbound::confirm::Confirmer;
pub use outbound::market::MarketDirectory;
pub use outbound::observer::{LogObserver, NullObserver, ProvisionEvent, ProvisionObserver};
pub use outbound::store::{DeploymentRecord, DeploymentStore};
pub use outbound::verifier::{SourceVerifier, VerificationRequest};
