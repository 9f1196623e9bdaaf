//! Automation backends that keep instances and fundraising rounds ticking.
//!
//! Each backend knows where its automation entry point lives, whether the
//! adapter must be allow-listed with the backend's registry, and which
//! contract flavour (artifact name suffix) it pairs with.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

/// Arbitrum Sepolia, the reference deployment for test and local networks.
pub const ARBITRUM_SEPOLIA: u64 = 421_614;

/// Gelato `Automate` entry point, identical on every supported chain.
const GELATO_AUTOMATE: Address = address!("2A6C106ae13B558BB9E2Ec64Bd2f1f7BEFF3A5E0");

const GELATO_CHAINS: &[u64] = &[1, 10, 137, 8453, 42_161, ARBITRUM_SEPOLIA];

const MATE2_AUTOMATION: &[(u64, Address)] = &[
    (31_337, address!("A58c89bB5a9EA4F1ceA61fF661ED2342D845441B")),
    (ARBITRUM_SEPOLIA, address!("A58c89bB5a9EA4F1ceA61fF661ED2342D845441B")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutomationBackend {
    Gelato,
    Mate2,
}

impl AutomationBackend {
    /// Automation entry point for a chain.
    ///
    /// Test and local networks resolve against [`ARBITRUM_SEPOLIA`].
    #[must_use]
    pub fn resolve_address(self, chain_id: u64, test_or_local: bool) -> Option<Address> {
        let chain_id = if test_or_local { ARBITRUM_SEPOLIA } else { chain_id };
        match self {
            Self::Gelato => GELATO_CHAINS.contains(&chain_id).then_some(GELATO_AUTOMATE),
            Self::Mate2 => MATE2_AUTOMATION
                .iter()
                .find(|(id, _)| *id == chain_id)
                .map(|(_, address)| *address),
        }
    }

    /// Whether adapters must be allow-listed with the automation registry.
    #[must_use]
    pub const fn needs_allowlist(self) -> bool {
        matches!(self, Self::Mate2)
    }

    /// Suffix appended to backend-specific artifact names.
    #[must_use]
    pub const fn contract_name_suffix(self) -> &'static str {
        match self {
            Self::Gelato => "Gelato",
            Self::Mate2 => "Mate2",
        }
    }
}

impl fmt::Display for AutomationBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gelato => write!(f, "gelato"),
            Self::Mate2 => write!(f, "mate2"),
        }
    }
}

impl FromStr for AutomationBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gelato" => Ok(Self::Gelato),
            "mate2" => Ok(Self::Mate2),
            other => Err(format!("unknown automation backend '{other}'")),
        }
    }
}
