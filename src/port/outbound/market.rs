//! Market directory port.

use async_trait::async_trait;

use crate::domain::market::MarketInfo;
use crate::error::Result;

/// Enumerates the markets instances are provisioned for.
#[async_trait]
pub trait MarketDirectory: Send + Sync {
    /// All markets with their settlement token metadata, in a stable order.
    async fn list_markets(&self) -> Result<Vec<MarketInfo>>;
}
