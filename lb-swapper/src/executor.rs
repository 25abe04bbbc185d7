//! Simulate-then-submit execution of swap instructions

use std::{sync::Arc, time::Duration};

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, TxHash};
use tracing::{info, instrument, warn};

use crate::{
    chain_client::{errors::ChainClientError, ChainClient, TxReceipt},
    error::{SwapError, SwapResult},
    helpers::unix_now,
    instructions::SwapInstructions,
};

// -------------
// | Constants |
// -------------

/// The default bound on waiting for a transaction to be mined
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);
/// The default interval between receipt polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

// ------------
// | Executor |
// ------------

/// Submits swap instructions to the router once a dry run succeeds
#[derive(Clone)]
pub struct SwapExecutor {
    /// The client used for simulation and submission
    client: Arc<dyn ChainClient>,
    /// The bound on waiting for the swap to be mined
    confirmation_timeout: Duration,
    /// The interval between receipt polls
    poll_interval: Duration,
}

impl SwapExecutor {
    /// Create a new executor
    pub fn new(
        client: Arc<dyn ChainClient>,
        confirmation_timeout: Duration,
        poll_interval: Duration,
    ) -> Self {
        Self { client, confirmation_timeout, poll_interval }
    }

    /// Execute the swap from `account` through the router at `router`
    ///
    /// Nothing is submitted unless the instructions validate and the dry run
    /// succeeds. The submission itself is never retried
    #[instrument(skip_all, fields(method = instructions.method_name(), router = %router))]
    pub async fn execute(
        &self,
        instructions: &SwapInstructions,
        router: Address,
        account: Address,
    ) -> SwapResult<TxReceipt> {
        instructions.validate(unix_now())?;
        let tx = instructions.to_tx(router, account);

        self.client.call(&tx).await.map_err(|e| match e {
            ChainClientError::Reverted { reason } => SwapError::SimulationReverted { reason },
            e => SwapError::from(e),
        })?;
        info!("swap simulation succeeded, submitting");

        let tx_hash = submit_once(self.client.as_ref(), tx, account).await?;
        info!("swap submitted: {tx_hash:#x}");

        let receipt = wait_for_confirmation(
            self.client.as_ref(),
            tx_hash,
            self.confirmation_timeout,
            self.poll_interval,
        )
        .await
        .ok_or(SwapError::ConfirmationTimeout { tx_hash })?;

        if !receipt.success {
            return Err(SwapError::TransactionReverted { tx_hash });
        }

        info!(
            "swap confirmed in block {:?}, gas cost {} wei",
            receipt.block_number,
            receipt.gas_cost()
        );
        Ok(receipt)
    }
}

// -----------
// | Helpers |
// -----------

/// Broadcast a transaction exactly once
///
/// On failure the sender's pending nonce is compared against its value before
/// the broadcast; if it advanced, or cannot be read, the transaction may have
/// landed regardless of the error
pub(crate) async fn submit_once(
    client: &dyn ChainClient,
    tx: TransactionRequest,
    from: Address,
) -> SwapResult<TxHash> {
    let nonce_before = client.pending_nonce(from).await.ok();
    let err = match client.send_transaction(tx).await {
        Ok(tx_hash) => return Ok(tx_hash),
        Err(e) => e,
    };

    let nonce_after = client.pending_nonce(from).await.ok();
    let may_have_landed = match (nonce_before, nonce_after) {
        (Some(before), Some(after)) => after > before,
        _ => true,
    };

    warn!("submission failed (may have landed: {may_have_landed}): {err}");
    Err(SwapError::SubmissionFailed { reason: err.to_string(), may_have_landed })
}

/// Wait for a broadcast transaction to be mined
///
/// Returns `None` when the outcome is unknown: the timeout elapsed, or the
/// receipt could not be read
pub(crate) async fn wait_for_confirmation(
    client: &dyn ChainClient,
    tx_hash: TxHash,
    timeout: Duration,
    poll_interval: Duration,
) -> Option<TxReceipt> {
    match tokio::time::timeout(timeout, client.wait_for_receipt(tx_hash, poll_interval)).await {
        Ok(Ok(receipt)) => Some(receipt),
        Ok(Err(e)) => {
            warn!("cannot read receipt of tx {tx_hash:#x}: {e}");
            None
        },
        Err(_) => {
            warn!("tx {tx_hash:#x} not mined within {timeout:?}");
            None
        },
    }
}
