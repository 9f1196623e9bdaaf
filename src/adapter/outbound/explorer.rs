//! Block-explorer source verification (Etherscan-compatible API).

use std::fs;
use std::path::PathBuf;

use alloy_primitives::hex;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::port::{SourceVerifier, VerificationRequest};

/// Explorer endpoint and compiler inputs shared by every verification.
#[derive(Debug, Clone)]
pub struct ExplorerSettings {
    pub api_url: String,
    pub api_key: String,
    /// Full compiler version, e.g. `v0.8.24+commit.e11b9ed9`.
    pub compiler_version: String,
    /// Solidity standard-JSON input of the build.
    pub standard_input: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    #[serde(default)]
    result: String,
}

/// Submits `verifysourcecode` requests and logs the returned GUID.
///
/// The explorer's asynchronous check is not polled.
pub struct ExplorerVerifier {
    http: reqwest::Client,
    settings: ExplorerSettings,
}

impl ExplorerVerifier {
    #[must_use]
    pub fn new(settings: ExplorerSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }
}

#[async_trait]
impl SourceVerifier for ExplorerVerifier {
    async fn verify(&self, request: &VerificationRequest) -> Result<()> {
        let source = fs::read_to_string(&self.settings.standard_input)?;
        let address = request.address.to_string();
        let constructor_args = hex::encode(&request.constructor_args);

        let form = [
            ("apikey", self.settings.api_key.as_str()),
            ("module", "contract"),
            ("action", "verifysourcecode"),
            ("contractaddress", address.as_str()),
            ("sourceCode", source.as_str()),
            ("codeformat", "solidity-standard-json-input"),
            ("contractname", request.contract_name.as_str()),
            ("compilerversion", self.settings.compiler_version.as_str()),
            // misspelling is part of the API
            ("constructorArguements", constructor_args.as_str()),
        ];

        debug!(address = %request.address, contract = %request.contract_name, "Submitting verification");
        let response: ExplorerResponse = self
            .http
            .post(&self.settings.api_url)
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match classify(&response) {
            Outcome::Submitted => {
                info!(address = %request.address, guid = %response.result, "Verification submitted");
                Ok(())
            }
            Outcome::AlreadyVerified => {
                debug!(address = %request.address, "Already verified");
                Ok(())
            }
            Outcome::Rejected => Err(Error::Verification(response.result)),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Submitted,
    AlreadyVerified,
    Rejected,
}

fn classify(response: &ExplorerResponse) -> Outcome {
    if response.status == "1" {
        Outcome::Submitted
    } else if response.result.to_ascii_lowercase().contains("already verified") {
        Outcome::AlreadyVerified
    } else {
        Outcome::Rejected
    }
}

/// Used when no explorer is configured and on local networks.
pub struct NoopVerifier;

#[async_trait]
impl SourceVerifier for NoopVerifier {
    async fn verify(&self, _request: &VerificationRequest) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: &str, result: &str) -> ExplorerResponse {
        ExplorerResponse {
            status: status.into(),
            result: result.into(),
        }
    }

    #[test]
    fn status_one_is_submitted() {
        assert_eq!(classify(&response("1", "guid")), Outcome::Submitted);
    }

    #[test]
    fn already_verified_is_not_a_failure() {
        assert_eq!(
            classify(&response("0", "Contract source code already verified")),
            Outcome::AlreadyVerified
        );
    }

    #[test]
    fn other_errors_are_rejected() {
        assert_eq!(classify(&response("0", "Invalid API Key")), Outcome::Rejected);
    }
}
