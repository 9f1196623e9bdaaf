//! Chain client port.
//!
//! The orchestrator depends on a handful of operation shapes: sign a
//! transaction, broadcast it, wait for its receipt, perform a read-only
//! call, fetch logs for an event signature, and read the current block
//! number. Submission is split so a lost response can be retried against
//! the same transaction hash instead of signing a second transaction. Typed
//! helpers on top of the raw shapes live in this module as free functions so
//! they work with `&dyn ChainClient`.

use alloy_primitives::{Address, Bytes, B256};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;

use crate::error::{ChainError, Result};

/// A log emitted by a transaction or returned by a log query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub block_number: Option<u64>,
}

impl LogEntry {
    /// Decode this log as `E`, `None` when it is a different event.
    #[must_use]
    pub fn decode<E: SolEvent>(&self) -> Option<E> {
        if self.topics.first() != Some(&E::SIGNATURE_HASH) {
            return None;
        }
        E::decode_raw_log(self.topics.iter().copied(), &self.data).ok()
    }
}

/// Receipt of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: B256,
    /// Set for contract creation transactions.
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
    pub logs: Vec<LogEntry>,
}

impl TxReceipt {
    /// First log in the receipt that decodes as `E`.
    #[must_use]
    pub fn find_event<E: SolEvent>(&self) -> Option<E> {
        self.logs.iter().find_map(LogEntry::decode::<E>)
    }
}

/// A signed transaction that has not necessarily reached the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub tx_hash: B256,
    /// EIP-2718 encoding, broadcast verbatim.
    pub raw: Bytes,
    pub to: Option<Address>,
}

/// Transaction submission and state reads against one network.
///
/// Implementations own transport, signing and confirmation timeouts.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Address transactions are sent from.
    fn sender(&self) -> Address;

    /// Sign a transaction for `to` without touching chain state.
    ///
    /// `to == None` creates a contract from `data`.
    async fn sign(&self, to: Option<Address>, data: Bytes) -> Result<SignedTransaction>;

    /// Hand a signed transaction to the network.
    ///
    /// Broadcasting the same transaction twice is harmless: a node that
    /// already knows the hash accepts it as submitted.
    async fn broadcast(&self, tx: &SignedTransaction) -> Result<()>;

    /// Wait until `tx_hash` is mined.
    ///
    /// A reverted transaction is [`ChainError::Reverted`]. A hash that is
    /// not mined in time is [`ChainError::ReceiptTimeout`].
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt>;

    /// Execute a read-only call and return the raw return data.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Logs emitted by `address` with `event_signature` in a block range.
    async fn get_logs(
        &self,
        address: Address,
        event_signature: B256,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>>;

    async fn current_block_number(&self) -> Result<u64>;
}

/// Perform a typed read-only call.
///
/// # Errors
///
/// Returns the transport error or a decode failure.
pub async fn read<C: SolCall>(chain: &dyn ChainClient, to: Address, call: C) -> Result<C::Return> {
    let raw = chain.call(to, call.abi_encode().into()).await?;
    C::abi_decode_returns(&raw).map_err(|e| {
        ChainError::Decode {
            what: C::SIGNATURE,
            reason: e.to_string(),
        }
        .into()
    })
}

/// Fetch and decode every `E` emitted by `address` up to the current block.
///
/// # Errors
///
/// Returns the transport error.
pub async fn events_since<E: SolEvent>(
    chain: &dyn ChainClient,
    address: Address,
    from_block: u64,
) -> Result<Vec<E>> {
    let to_block = chain.current_block_number().await?;
    let logs = chain
        .get_logs(address, E::SIGNATURE_HASH, from_block, to_block)
        .await?;
    Ok(logs.iter().filter_map(LogEntry::decode::<E>).collect())
}
