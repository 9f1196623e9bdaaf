//! Outbound adapters (driven side).

pub mod artifact;
pub mod confirm;
pub mod explorer;
pub mod market;
pub mod rpc;
pub mod store;
