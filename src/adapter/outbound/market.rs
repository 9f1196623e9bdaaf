//! Market directory backed by the on-chain market factory.

use std::sync::Arc;

use alloy_primitives::Address;
use async_trait::async_trait;
use tracing::debug;

use crate::application::retry::{with_retry, RetryPolicy};
use crate::contracts::{IERC20Metadata, IMarketFactory};
use crate::domain::market::{MarketInfo, SettlementToken};
use crate::error::{ConfigError, Result};
use crate::port::outbound::chain;
use crate::port::{ChainClient, MarketDirectory};

/// Reads markets from a market factory, grouped by settlement token.
pub struct FactoryMarketDirectory {
    chain: Arc<dyn ChainClient>,
    factory: Address,
    retry: RetryPolicy,
}

impl FactoryMarketDirectory {
    pub fn new(chain: Arc<dyn ChainClient>, factory: Address, retry: RetryPolicy) -> Self {
        Self {
            chain,
            factory,
            retry,
        }
    }

    async fn token(&self, address: Address) -> Result<SettlementToken> {
        let client = self.chain.as_ref();
        let symbol = with_retry(&self.retry, "symbol()", move || {
            chain::read(client, address, IERC20Metadata::symbolCall {})
        })
        .await
        .into_result()?;
        let decimals = with_retry(&self.retry, "decimals()", move || {
            chain::read(client, address, IERC20Metadata::decimalsCall {})
        })
        .await
        .into_result()?;

        Ok(SettlementToken {
            symbol,
            decimals,
            address,
        })
    }
}

#[async_trait]
impl MarketDirectory for FactoryMarketDirectory {
    async fn list_markets(&self) -> Result<Vec<MarketInfo>> {
        let client = self.chain.as_ref();
        let factory = self.factory;

        let tokens = with_retry(&self.retry, "registeredSettlementTokens()", move || {
            chain::read(client, factory, IMarketFactory::registeredSettlementTokensCall {})
        })
        .await
        .into_result()?;
        if tokens.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "market_factory",
                reason: format!("{factory} has no registered settlement tokens"),
            }
            .into());
        }

        let mut markets = Vec::new();
        for token_address in tokens {
            let token = self.token(token_address).await?;
            let addresses = with_retry(&self.retry, "getMarketsBySettlmentToken()", move || {
                chain::read(
                    client,
                    factory,
                    IMarketFactory::getMarketsBySettlmentTokenCall {
                        settlementToken: token_address,
                    },
                )
            })
            .await
            .into_result()?;
            debug!(token = %token.symbol, markets = addresses.len(), "Markets by settlement token");

            markets.extend(
                addresses
                    .into_iter()
                    .map(|address| MarketInfo::new(address, token.clone())),
            );
        }
        Ok(markets)
    }
}
