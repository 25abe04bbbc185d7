//! Ensures the router may pull the input token before a swap

use std::{sync::Arc, time::Duration};

use alloy::{network::TransactionBuilder, rpc::types::TransactionRequest};
use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use tracing::{info, instrument};

use crate::{
    abis::IERC20::{allowanceCall, approveCall},
    chain_client::{errors::ChainClientError, ChainClient, TxReceipt},
    error::{SwapError, SwapResult},
    executor::{submit_once, wait_for_confirmation},
    helpers::{retry_with_backoff, RetryConfig},
    types::Token,
};

/// Checks and, when needed, raises ERC20 allowances
#[derive(Clone)]
pub struct AllowanceManager {
    /// The client used for reads and the approval submission
    client: Arc<dyn ChainClient>,
    /// The bound on waiting for the approval to be mined
    confirmation_timeout: Duration,
    /// The interval between receipt polls
    poll_interval: Duration,
    /// The retry policy for allowance reads
    retry: RetryConfig,
}

impl AllowanceManager {
    /// Create a new allowance manager
    pub fn new(
        client: Arc<dyn ChainClient>,
        confirmation_timeout: Duration,
        poll_interval: Duration,
        retry: RetryConfig,
    ) -> Self {
        Self { client, confirmation_timeout, poll_interval, retry }
    }

    /// Make sure `spender` may move `amount` of `token` on behalf of `owner`
    ///
    /// Returns the receipt of the approval if one was sent, or `None` when the
    /// input is native or the existing allowance already covers `amount`
    #[instrument(skip_all, fields(token = %token, spender = %spender, amount = %amount))]
    pub async fn ensure_allowance(
        &self,
        token: &Token,
        owner: Address,
        spender: Address,
        amount: U256,
        is_native: bool,
    ) -> SwapResult<Option<TxReceipt>> {
        if is_native {
            info!("input is the native asset, no approval needed");
            return Ok(None);
        }

        let allowance = self.read_allowance(token.address, owner, spender).await?;
        if allowance >= amount {
            info!("existing allowance of {allowance} covers the swap");
            return Ok(None);
        }

        let calldata = approveCall { spender, value: amount }.abi_encode();
        let tx = TransactionRequest::default()
            .with_from(owner)
            .with_to(token.address)
            .with_input(calldata);

        let output = self.client.call(&tx).await.map_err(|e| match e {
            ChainClientError::Reverted { reason } => SwapError::ApprovalRejected(reason),
            e => SwapError::from(e),
        })?;

        // Some tokens return nothing from `approve`, only an explicit `false` rejects
        if !output.is_empty() && !approveCall::abi_decode_returns(&output).unwrap_or(true) {
            return Err(SwapError::approval_rejected("approve returned false"));
        }

        let tx_hash = submit_once(self.client.as_ref(), tx, owner).await?;
        info!("approval submitted: {tx_hash:#x}");

        let receipt = wait_for_confirmation(
            self.client.as_ref(),
            tx_hash,
            self.confirmation_timeout,
            self.poll_interval,
        )
        .await
        .ok_or(SwapError::ApprovalTimeout { tx_hash })?;

        if !receipt.success {
            return Err(SwapError::approval_rejected(format!(
                "approval {tx_hash:#x} reverted on-chain"
            )));
        }

        info!("approved {token} allowance for {spender:#x} at: {tx_hash:#x}");
        Ok(Some(receipt))
    }

    /// Read the current allowance, retrying transient failures
    async fn read_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> SwapResult<U256> {
        let calldata = allowanceCall { owner, spender }.abi_encode();
        let tx = TransactionRequest::default().with_to(token).with_input(calldata);

        let (client, tx) = (&self.client, &tx);
        let output = retry_with_backoff(
            &self.retry,
            "allowance read",
            ChainClientError::is_transient,
            || async move { client.call(tx).await },
        )
        .await?;

        let allowance =
            allowanceCall::abi_decode_returns(&output).map_err(ChainClientError::from)?;
        Ok(allowance)
    }
}
