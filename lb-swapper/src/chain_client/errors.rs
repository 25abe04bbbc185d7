//! Possible errors thrown by the chain client

use thiserror::Error;

/// The error type returned by the chain client
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainClientError {
    #[error("Failed to initialize chain client: {0}")]
    /// Error thrown when the RPC client fails to initialize
    Initialization(String),

    #[error("execution reverted: {reason}")]
    /// The node reported that the call reverts against current state
    Reverted {
        /// The decoded revert reason, or the raw node message when the revert
        /// data cannot be decoded
        reason: String,
    },

    #[error("RPC error: {0}")]
    /// An error interacting with the lower level rpc client
    Rpc(String),

    #[error("ABI error: {0}")]
    /// Error thrown when return data can't be decoded
    Abi(String),
}

impl ChainClientError {
    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }

    /// Create a new revert error
    #[allow(clippy::needless_pass_by_value)]
    pub fn reverted<T: ToString>(reason: T) -> Self {
        Self::Reverted { reason: reason.to_string() }
    }

    /// Create a new RPC error
    #[allow(clippy::needless_pass_by_value)]
    pub fn rpc<T: ToString>(msg: T) -> Self {
        Self::Rpc(msg.to_string())
    }

    /// Create a new ABI error
    #[allow(clippy::needless_pass_by_value)]
    pub fn abi<T: ToString>(msg: T) -> Self {
        Self::Abi(msg.to_string())
    }
}

impl From<alloy_sol_types::Error> for ChainClientError {
    fn from(e: alloy_sol_types::Error) -> Self {
        Self::Abi(e.to_string())
    }
}
