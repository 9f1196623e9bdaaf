//! Per-network connection and deployment settings.

use alloy_primitives::Address;
use serde::Deserialize;

use crate::domain::automation::AutomationBackend;

/// Tag marking an ephemeral development node.
pub const TAG_LOCAL: &str = "local";

/// Tag marking a public test network.
pub const TAG_TEST: &str = "test";

/// One `[networks.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    /// Free-form tags; `local` and `test` are understood.
    #[serde(default)]
    pub tags: Vec<String>,
    pub automation: AutomationBackend,
    /// Overrides the backend's known address for this chain.
    #[serde(default)]
    pub automation_address: Option<Address>,
    pub market_factory: Address,
    /// Etherscan-compatible API endpoint. Verification is skipped without it.
    #[serde(default)]
    pub explorer_api_url: Option<String>,
    /// Keep deployments on disk and reconcile at startup. Defaults to
    /// `true` for every network not tagged `local`.
    #[serde(default)]
    pub persist: Option<bool>,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
}

const fn default_confirmation_timeout_secs() -> u64 {
    120
}

const fn default_confirmations() -> u64 {
    1
}

impl NetworkConfig {
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        self.has_tag(TAG_LOCAL)
    }

    #[must_use]
    pub fn is_test(&self) -> bool {
        self.has_tag(TAG_TEST)
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persist.unwrap_or(!self.is_local())
    }

    /// Automation entry point, the override first.
    #[must_use]
    pub fn resolve_automation_address(&self) -> Option<Address> {
        self.automation_address.or_else(|| {
            self.automation
                .resolve_address(self.chain_id, self.is_local() || self.is_test())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(extra: &str) -> NetworkConfig {
        toml::from_str(&format!(
            r#"
            rpc_url = "http://127.0.0.1:8545"
            chain_id = 31337
            automation = "mate2"
            market_factory = "0x0000000000000000000000000000000000000001"
            {extra}
            "#
        ))
        .unwrap()
    }

    #[test]
    fn local_networks_are_ephemeral_by_default() {
        let local = network(r#"tags = ["local"]"#);
        assert!(local.is_local());
        assert!(!local.is_persistent());

        let shared = network("");
        assert!(!shared.is_local());
        assert!(shared.is_persistent());
    }

    #[test]
    fn persist_flag_overrides_default() {
        let local = network("tags = [\"local\"]\npersist = true");
        assert!(local.is_persistent());
    }

    #[test]
    fn override_wins_over_known_address() {
        let net = network(
            r#"automation_address = "0x00000000000000000000000000000000000000aa""#,
        );
        assert_eq!(
            net.resolve_automation_address(),
            Some(Address::with_last_byte(0xaa))
        );
    }

    #[test]
    fn local_tag_resolves_reference_address() {
        let net = network(r#"tags = ["local"]"#);
        assert!(net.resolve_automation_address().is_some());
    }

    #[test]
    fn defaults_apply() {
        let net = network("");
        assert_eq!(net.confirmation_timeout_secs, 120);
        assert_eq!(net.confirmations, 1);
    }
}
