//! Retried transaction submission that never sends twice.
//!
//! Each stage gets its own retry budget. Signing has no side effect and
//! broadcasting repeats the same signed bytes, so neither can double a
//! transaction. Waiting polls one hash. A revert is final and stops the
//! whole submission without a backoff.

use alloy_primitives::{Address, Bytes};
use tracing::debug;

use crate::application::retry::{with_retry_if, RetryPolicy};
use crate::error::{Error, Result};
use crate::port::{ChainClient, TxReceipt};

/// Submit `data` to `to` (or create a contract when `to` is `None`) and
/// return its receipt.
///
/// # Errors
///
/// Returns the last transient failure once a stage exhausts `policy`, or
/// the first final one (a revert) at once.
pub async fn submit_once(
    chain: &dyn ChainClient,
    policy: &RetryPolicy,
    label: &str,
    to: Option<Address>,
    data: Bytes,
) -> Result<TxReceipt> {
    let tx = with_retry_if(
        policy,
        label,
        || chain.sign(to, data.clone()),
        Error::is_transient,
    )
    .await
    .into_result()?;
    debug!(operation = label, tx_hash = %tx.tx_hash, "Transaction signed");

    with_retry_if(policy, label, || chain.broadcast(&tx), Error::is_transient)
        .await
        .into_result()?;

    with_retry_if(
        policy,
        label,
        || chain.wait_for_receipt(tx.tx_hash),
        Error::is_transient,
    )
    .await
    .into_result()
}
