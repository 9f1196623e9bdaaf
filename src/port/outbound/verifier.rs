//! Source verification port.
//!
//! Verification is cosmetic. Callers log failures and carry on.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;

use crate::error::Result;

/// Everything an explorer needs to match deployed bytecode to source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub address: Address,
    /// Contract name, qualified with its source path when known.
    pub contract_name: String,
    pub constructor_args: Bytes,
}

#[async_trait]
pub trait SourceVerifier: Send + Sync {
    async fn verify(&self, request: &VerificationRequest) -> Result<()>;
}
