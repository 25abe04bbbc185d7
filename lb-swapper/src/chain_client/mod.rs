//! The chain client, a thin seam over the RPC node that the allowance manager
//! and the swap executor submit through
//!
//! The workflow only depends on the [`ChainClient`] trait so that the RPC node
//! can be swapped for a test double.

use std::time::Duration;

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use tracing::{debug, warn};

use self::errors::ChainClientError;

pub mod errors;
pub mod rpc;

/// The confirmed outcome of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// The hash of the transaction
    pub tx_hash: TxHash,
    /// The block in which the transaction was included
    pub block_number: Option<u64>,
    /// The gas used by the transaction
    pub gas_used: u64,
    /// The price paid per unit of gas
    pub effective_gas_price: u128,
    /// Whether the transaction executed successfully
    pub success: bool,
}

impl TxReceipt {
    /// Compute the gas cost of the transaction in wei
    pub fn gas_cost(&self) -> U256 {
        U256::from(self.gas_used) * U256::from(self.effective_gas_price)
    }
}

/// The chain operations the swap workflow relies on
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The address that signs and sends transactions
    fn signer_address(&self) -> Address;

    /// Execute a read-only call against the latest state, returning its output
    ///
    /// A call that would revert yields `ChainClientError::Reverted`
    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ChainClientError>;

    /// Sign and broadcast a transaction, returning its hash
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ChainClientError>;

    /// Fetch the receipt of a transaction, if it has been mined
    async fn get_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, ChainClientError>;

    /// The next nonce of the given account, including pending transactions
    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainClientError>;

    /// Poll until the transaction is mined
    ///
    /// Transient poll errors are logged and polled through. Does not bound the
    /// wait; callers wrap this in a timeout
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        poll_interval: Duration,
    ) -> Result<TxReceipt, ChainClientError> {
        loop {
            match self.get_receipt(tx_hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => debug!("tx {tx_hash:#x} not yet mined"),
                Err(e) if e.is_transient() => warn!("polling receipt of {tx_hash:#x}: {e}"),
                Err(e) => return Err(e),
            }

            tokio::time::sleep(poll_interval).await;
        }
    }
}
