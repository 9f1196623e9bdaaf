//! JSON-RPC chain client backed by an alloy provider.
//!
//! Transactions are filled and signed locally so their hash is known before
//! anything reaches the node. Receipts are polled by that hash.

use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::network::eip2718::Encodable2718;
use alloy_provider::network::{Ethereum, EthereumWallet, TransactionBuilder};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types_eth::{Filter, Log, TransactionReceipt, TransactionRequest};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{ChainError, ConfigError, Result};
use crate::port::{ChainClient, LogEntry, SignedTransaction, TxReceipt};

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Connection settings for [`RpcChainClient`].
#[derive(Debug, Clone)]
pub struct RpcSettings {
    pub rpc_url: String,
    pub chain_id: u64,
    /// How long to wait for a transaction to be mined.
    pub confirmation_timeout: Duration,
    pub confirmations: u64,
}

/// Signs with a local private key and talks to one HTTP endpoint.
pub struct RpcChainClient {
    provider: DynProvider,
    wallet: EthereumWallet,
    sender: Address,
    chain_id: u64,
    confirmation_timeout: Duration,
    confirmations: u64,
}

impl RpcChainClient {
    /// Connect to `settings.rpc_url`, signing with `private_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or the URL is invalid.
    pub fn connect(settings: &RpcSettings, private_key: &str) -> Result<Self> {
        let signer = PrivateKeySigner::from_str(private_key.trim())
            .map_err(|e| ConfigError::InvalidValue {
                field: "WALLET_PRIVATE_KEY",
                reason: e.to_string(),
            })?
            .with_chain_id(Some(settings.chain_id));
        let sender = signer.address();

        let rpc_url: url::Url =
            settings
                .rpc_url
                .parse()
                .map_err(|e: url::ParseError| ConfigError::InvalidValue {
                    field: "rpc_url",
                    reason: e.to_string(),
                })?;

        let provider = ProviderBuilder::new().connect_http(rpc_url).erased();

        Ok(Self {
            provider,
            wallet: EthereumWallet::from(signer),
            sender,
            chain_id: settings.chain_id,
            confirmation_timeout: settings.confirmation_timeout,
            confirmations: settings.confirmations.max(1),
        })
    }

    /// Whether the node knows `tx_hash`, pending or mined.
    async fn is_known(&self, tx_hash: B256) -> bool {
        matches!(
            self.provider.get_transaction_by_hash(tx_hash).await,
            Ok(Some(_))
        )
    }

    /// Receipt of `tx_hash` once it has enough confirmations.
    async fn confirmed_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        let Some(receipt) = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(rpc_error)?
        else {
            return Ok(None);
        };
        if self.confirmations > 1 {
            let mined = receipt.block_number.unwrap_or_default();
            let head = self.provider.get_block_number().await.map_err(rpc_error)?;
            if head.saturating_sub(mined) + 1 < self.confirmations {
                return Ok(None);
            }
        }
        Ok(Some(receipt))
    }
}

fn rpc_error(e: impl std::fmt::Display) -> ChainError {
    ChainError::Rpc(e.to_string())
}

fn to_log_entry(log: &Log) -> LogEntry {
    LogEntry {
        address: log.address(),
        topics: log.topics().to_vec(),
        data: log.data().data.clone(),
        block_number: log.block_number,
    }
}

fn to_receipt(receipt: &TransactionReceipt) -> TxReceipt {
    TxReceipt {
        tx_hash: receipt.transaction_hash,
        contract_address: receipt.contract_address,
        block_number: receipt.block_number,
        logs: receipt.inner.logs().iter().map(to_log_entry).collect(),
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn sign(&self, to: Option<Address>, data: Bytes) -> Result<SignedTransaction> {
        let tx = TransactionRequest::default().with_from(self.sender);
        let tx = match to {
            Some(to) => tx.with_to(to).with_input(data),
            None => tx.with_deploy_code(data),
        };

        let gas = self.provider.estimate_gas(tx.clone()).await.map_err(rpc_error)?;
        let fees = self.provider.estimate_eip1559_fees().await.map_err(rpc_error)?;
        let nonce = self
            .provider
            .get_transaction_count(self.sender)
            .pending()
            .await
            .map_err(rpc_error)?;

        let tx = tx
            .with_chain_id(self.chain_id)
            .with_nonce(nonce)
            .with_gas_limit(gas)
            .with_max_fee_per_gas(fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas);
        let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(tx, &self.wallet)
            .await
            .map_err(rpc_error)?;

        Ok(SignedTransaction {
            tx_hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
            to,
        })
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<()> {
        let Err(e) = self.provider.send_raw_transaction(&tx.raw).await else {
            debug!(tx_hash = %tx.tx_hash, to = ?tx.to, "Transaction submitted");
            return Ok(());
        };
        if self.is_known(tx.tx_hash).await {
            debug!(tx_hash = %tx.tx_hash, error = %e, "Transaction already known to the node");
            return Ok(());
        }
        Err(rpc_error(e).into())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt> {
        let deadline = Instant::now() + self.confirmation_timeout;
        loop {
            match self.confirmed_receipt(tx_hash).await {
                Ok(Some(receipt)) if !receipt.status() => {
                    return Err(ChainError::Reverted {
                        tx_hash: tx_hash.to_string(),
                    }
                    .into());
                }
                Ok(Some(receipt)) => return Ok(to_receipt(&receipt)),
                Ok(None) => {}
                Err(e) => warn!(tx_hash = %tx_hash, error = %e, "Receipt poll failed"),
            }
            if Instant::now() >= deadline {
                return Err(ChainError::ReceiptTimeout {
                    tx_hash: tx_hash.to_string(),
                    waited_secs: self.confirmation_timeout.as_secs(),
                }
                .into());
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default()
            .with_from(self.sender)
            .with_to(to)
            .with_input(data);
        Ok(self.provider.call(tx).await.map_err(rpc_error)?)
    }

    async fn get_logs(
        &self,
        address: Address,
        event_signature: B256,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>> {
        let filter = Filter::new()
            .address(address)
            .event_signature(event_signature)
            .from_block(from_block)
            .to_block(to_block);
        let logs = self.provider.get_logs(&filter).await.map_err(rpc_error)?;
        Ok(logs.iter().map(to_log_entry).collect())
    }

    async fn current_block_number(&self) -> Result<u64> {
        Ok(self.provider.get_block_number().await.map_err(rpc_error)?)
    }
}
