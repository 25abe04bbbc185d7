//! Error types for the swapper

use alloy_primitives::TxHash;
use thiserror::Error;

use crate::chain_client::errors::ChainClientError;

/// Type alias for Results using SwapError
pub type SwapResult<T> = Result<T, SwapError>;

/// The error type emitted by the swap workflow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// No route produced a usable quote
    #[error("no viable route: no route returned a usable quote")]
    NoViableRoute,
    /// The approval simulation reverted, or the mined approval failed
    #[error("approval rejected: {0}")]
    ApprovalRejected(String),
    /// The approval was submitted but its receipt was not read in time
    #[error("approval {tx_hash:#x} not confirmed in time, outcome unknown")]
    ApprovalTimeout {
        /// The hash of the submitted approval
        tx_hash: TxHash,
    },
    /// The swap simulation reverted, nothing was submitted
    #[error("swap simulation reverted: {reason}")]
    SimulationReverted {
        /// The decoded revert reason, if any
        reason: String,
    },
    /// Broadcasting the transaction failed after a successful simulation
    #[error("submission failed (may have landed: {may_have_landed}): {reason}")]
    SubmissionFailed {
        /// The underlying error
        reason: String,
        /// Whether the account nonce advanced despite the error
        may_have_landed: bool,
    },
    /// The swap was submitted but its receipt was not read in time
    #[error("transaction {tx_hash:#x} not confirmed in time, outcome unknown")]
    ConfirmationTimeout {
        /// The hash of the submitted transaction
        tx_hash: TxHash,
    },
    /// The transaction was mined with a failed status
    #[error("transaction {tx_hash:#x} reverted on-chain")]
    TransactionReverted {
        /// The hash of the mined transaction
        tx_hash: TxHash,
    },
    /// Quoting did not finish within the configured bound
    #[error("timed out waiting for route quotes")]
    QuoteTimeout,
    /// The swap instructions failed validation
    #[error("invalid swap instructions: {0}")]
    InvalidInstructions(String),
    /// An error parsing a value
    #[error("parse error: {0}")]
    Parse(String),
    /// An invalid configuration value
    #[error("config error: {0}")]
    Config(String),
    /// An error talking to the chain
    #[error("rpc error: {0}")]
    Rpc(String),
}

#[allow(clippy::needless_pass_by_value)]
impl SwapError {
    /// Create a new approval rejected error
    pub fn approval_rejected<T: ToString>(e: T) -> Self {
        SwapError::ApprovalRejected(e.to_string())
    }

    /// Create a new invalid instructions error
    pub fn invalid_instructions<T: ToString>(e: T) -> Self {
        SwapError::InvalidInstructions(e.to_string())
    }

    /// Create a new parse error
    pub fn parse<T: ToString>(e: T) -> Self {
        SwapError::Parse(e.to_string())
    }

    /// Create a new config error
    pub fn config<T: ToString>(e: T) -> Self {
        SwapError::Config(e.to_string())
    }

    /// Create a new rpc error
    pub fn rpc<T: ToString>(e: T) -> Self {
        SwapError::Rpc(e.to_string())
    }

    /// Whether the error leaves the on-chain outcome undetermined
    pub fn is_outcome_unknown(&self) -> bool {
        match self {
            SwapError::ApprovalTimeout { .. } | SwapError::ConfirmationTimeout { .. } => true,
            SwapError::SubmissionFailed { may_have_landed, .. } => *may_have_landed,
            _ => false,
        }
    }
}

impl From<ChainClientError> for SwapError {
    fn from(e: ChainClientError) -> Self {
        SwapError::Rpc(e.to_string())
    }
}
