//! Market and settlement-token metadata.

use alloy_primitives::Address;
use serde::Serialize;

/// ERC-20 token markets settle in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementToken {
    pub symbol: String,
    pub decimals: u8,
    pub address: Address,
}

/// A market instances are provisioned for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketInfo {
    pub address: Address,
    pub settlement_token: SettlementToken,
}

impl MarketInfo {
    #[must_use]
    pub fn new(address: Address, settlement_token: SettlementToken) -> Self {
        Self {
            address,
            settlement_token,
        }
    }
}
