//! Outbound ports: the collaborators the orchestrator drives.

pub mod artifact;
pub mod chain;
pub mod confirm;
pub mod market;
pub mod observer;
pub mod store;
pub mod verifier;
