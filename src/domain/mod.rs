//! Chain-agnostic domain logic: curves, ledger, tiers and run summaries.

pub mod automation;
pub mod curve;
pub mod error;
pub mod fundraising;
pub mod instance;
pub mod ledger;
pub mod market;
pub mod resource;
pub mod summary;
pub mod units;

pub use automation::AutomationBackend;
pub use curve::{CurveConfig, CurveGenerator, SideMode, Spacing};
pub use fundraising::{FundraisingSpec, FundraisingTarget, FundraisingTerms};
pub use instance::{AssetPolicies, AssetPolicy, CurveSource, InstanceSpec, InstanceTerms};
pub use ledger::AddressLedger;
pub use market::{MarketInfo, SettlementToken};
pub use resource::{ProvisioningTask, ResourceKind, ResourceRecord};
pub use summary::{EntryStatus, FailureKind, RunSummary, SeedStatus, SummaryEntry};
