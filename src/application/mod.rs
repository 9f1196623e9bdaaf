//! Application services (use cases).
//!
//! These services sequence domain logic and drive the outbound ports
//! to implement the provisioning use cases.

pub mod orchestrator;
pub mod provisioner;
pub mod retry;
pub mod transaction;
