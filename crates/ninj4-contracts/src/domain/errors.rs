//! # Domain Errors
//!
//! Error taxonomy for the contract adapter.
//!
//! | Class | Variants | Handling |
//! |-------|----------|----------|
//! | Transient read | `Rpc`, `Transport`, `Abi` | Defaulted by read operations |
//! | Initialization | `RpcNotConfigured`, `NoWalletProvider`, `WalletNotConnected`, `WrongNetwork`, `Config` | Raised before any network call |
//! | Sale state | `NoActiveSale`, `InvalidQuantity`, `WalletLimitReached` | Raised before submission |
//! | Transaction | `TransactionRejected`, `TransactionReverted`, `ReceiptTimeout` | Propagated unchanged |

use primitive_types::H256;
use thiserror::Error;

use crate::config::ConfigError;

/// Contract adapter error types.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message returned by the node
        message: String,
    },

    /// The request never produced a usable JSON-RPC response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Return data could not be decoded against the expected ABI.
    #[error("ABI decode error: {0}")]
    Abi(String),

    /// No RPC endpoint is configured for the selected network.
    #[error("No RPC endpoint configured")]
    RpcNotConfigured,

    /// A write was attempted but no wallet provider was supplied.
    #[error("No wallet provider available")]
    NoWalletProvider,

    /// The wallet provider reports no connected account.
    #[error("Wallet not connected, please connect a wallet first")]
    WalletNotConnected,

    /// The wallet is on a different chain than the configured one.
    #[error("Wrong network: expected chain id {expected}, wallet is on {actual}")]
    WrongNetwork {
        /// Configured chain id
        expected: u64,
        /// Chain id reported by the wallet
        actual: u64,
    },

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The drop contract has no active claim condition.
    #[error("No active sale")]
    NoActiveSale,

    /// The requested mint quantity is outside the allowed range.
    #[error("Invalid mint quantity {requested}: {reason}")]
    InvalidQuantity {
        /// Quantity requested by the caller
        requested: u64,
        /// Why it was refused
        reason: String,
    },

    /// Minting would exceed the per-wallet allowance.
    #[error("Per-wallet mint limit reached ({minted} minted, limit {limit})")]
    WalletLimitReached {
        /// Tokens already minted by the wallet
        minted: u64,
        /// Per-wallet limit
        limit: u64,
    },

    /// The wallet refused to submit the transaction.
    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    /// The transaction was mined but reverted.
    #[error("Transaction reverted: {hash:#x}")]
    TransactionReverted {
        /// Hash of the reverted transaction
        hash: H256,
    },

    /// No receipt appeared within the polling budget.
    #[error("Timed out waiting for receipt of {hash:#x}")]
    ReceiptTimeout {
        /// Hash of the pending transaction
        hash: H256,
    },
}

impl ContractError {
    /// Whether this is a transient read failure that read paths may default.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ContractError::Rpc { .. } | ContractError::Transport(_) | ContractError::Abi(_)
        )
    }

    /// Whether the error was raised before anything was sent to the network.
    pub fn is_pre_submission(&self) -> bool {
        matches!(
            self,
            ContractError::RpcNotConfigured
                | ContractError::NoWalletProvider
                | ContractError::WalletNotConnected
                | ContractError::WrongNetwork { .. }
                | ContractError::Config(_)
                | ContractError::NoActiveSale
                | ContractError::InvalidQuantity { .. }
                | ContractError::WalletLimitReached { .. }
        )
    }

    /// Message suitable for showing to the person who triggered the action.
    pub fn user_message(&self) -> String {
        match self {
            ContractError::NoActiveSale => "The sale is not active right now".to_string(),
            ContractError::WalletLimitReached { limit, .. } => {
                format!("You reached the per-wallet mint limit ({limit})")
            }
            ContractError::InvalidQuantity { reason, .. } => reason.clone(),
            other => format!("Mint failed: {other}"),
        }
    }
}

/// Result alias used throughout the crate.
pub type ContractResult<T> = Result<T, ContractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_display() {
        let err = ContractError::Rpc {
            code: -32000,
            message: "execution reverted".to_string(),
        };
        assert_eq!(err.to_string(), "RPC error -32000: execution reverted");
        assert!(err.is_transient());
    }

    #[test]
    fn test_wrong_network_display() {
        let err = ContractError::WrongNetwork {
            expected: 1776,
            actual: 1,
        };
        assert!(err.to_string().contains("1776"));
        assert!(err.is_pre_submission());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_reverted_shows_full_hash() {
        let err = ContractError::TransactionReverted {
            hash: H256::repeat_byte(0xab),
        };
        assert!(err.to_string().contains(&"ab".repeat(32)));
    }

    #[test]
    fn test_user_message_for_limit() {
        let err = ContractError::WalletLimitReached { minted: 1, limit: 1 };
        assert_eq!(err.user_message(), "You reached the per-wallet mint limit (1)");
    }

    #[test]
    fn test_transaction_errors_are_not_pre_submission() {
        let err = ContractError::TransactionRejected("user denied".into());
        assert!(!err.is_pre_submission());
        assert!(err.user_message().starts_with("Mint failed"));
    }
}
