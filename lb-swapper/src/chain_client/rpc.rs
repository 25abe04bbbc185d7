//! The RPC-backed chain client, an alloy provider stack that includes a local
//! signer derived from a raw private key

use std::str::FromStr;

use alloy::{
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    transports::{http::reqwest::Url, RpcError, TransportErrorKind},
};
use alloy_primitives::{Address, Bytes, TxHash};
use alloy_sol_types::decode_revert_reason;
use async_trait::async_trait;

use super::{errors::ChainClientError, ChainClient, TxReceipt};

/// The substring nodes use in error messages for reverted calls that carry no
/// revert data
const REVERT_MESSAGE_MARKER: &str = "revert";

/// A chain client that talks to an RPC node over HTTP
#[derive(Clone)]
pub struct RpcChainClient {
    /// The signing provider
    provider: DynProvider,
    /// The address of the configured signer
    signer_address: Address,
}

impl RpcChainClient {
    /// Create a new client from an RPC url and a hex-encoded private key
    pub fn new(rpc_url: &str, private_key: &str) -> Result<Self, ChainClientError> {
        let signer = PrivateKeySigner::from_str(private_key.trim_start_matches("0x"))
            .map_err(|e| ChainClientError::Initialization(format!("invalid private key: {e}")))?;
        let url = Url::parse(rpc_url)
            .map_err(|e| ChainClientError::Initialization(format!("invalid rpc url: {e}")))?;

        let signer_address = signer.address();
        let provider = ProviderBuilder::new().wallet(signer).connect_http(url);

        Ok(Self { provider: DynProvider::new(provider), signer_address })
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn signer_address(&self) -> Address {
        self.signer_address
    }

    async fn call(&self, tx: &TransactionRequest) -> Result<Bytes, ChainClientError> {
        self.provider.call(tx.clone()).await.map_err(classify_call_error)
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ChainClientError> {
        let pending =
            self.provider.send_transaction(tx).await.map_err(ChainClientError::rpc)?;
        Ok(*pending.tx_hash())
    }

    async fn get_receipt(&self, tx_hash: TxHash) -> Result<Option<TxReceipt>, ChainClientError> {
        let maybe_receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(ChainClientError::rpc)?;

        Ok(maybe_receipt.map(to_tx_receipt))
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainClientError> {
        self.provider.get_transaction_count(address).pending().await.map_err(ChainClientError::rpc)
    }
}

// -----------
// | Helpers |
// -----------

/// Convert an alloy receipt into the client's receipt type
fn to_tx_receipt(receipt: TransactionReceipt) -> TxReceipt {
    TxReceipt {
        tx_hash: receipt.transaction_hash,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        effective_gas_price: receipt.effective_gas_price,
        success: receipt.status(),
    }
}

/// Separate reverts from transport failures, decoding the revert reason when
/// the node returns revert data
fn classify_call_error(err: RpcError<TransportErrorKind>) -> ChainClientError {
    let Some(payload) = err.as_error_resp() else {
        return ChainClientError::rpc(err);
    };

    if let Some(data) = payload.as_revert_data() {
        let reason = decode_revert_reason(&data).unwrap_or_else(|| format!("revert data {data}"));
        return ChainClientError::reverted(reason);
    }

    let message = payload.message.to_string();
    if message.to_lowercase().contains(REVERT_MESSAGE_MARKER) {
        return ChainClientError::reverted(message);
    }

    ChainClientError::rpc(err)
}
