//! # Outbound Ports
//!
//! What the adapter needs from the outside world: a read-only RPC node, a
//! wallet that owns keys and submits transactions, and a clock.

use async_trait::async_trait;

use crate::domain::{Address, ContractResult, Hash, TxReceipt, TxRequest};

/// Read-only JSON-RPC node connection.
///
/// Never depends on a connected wallet.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// `eth_call` against the latest block; returns raw return data.
    async fn call(&self, to: Address, data: Vec<u8>) -> ContractResult<Vec<u8>>;

    /// `eth_chainId`.
    async fn chain_id(&self) -> ContractResult<u64>;

    /// `eth_blockNumber`.
    async fn block_number(&self) -> ContractResult<u64>;

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    async fn transaction_receipt(&self, hash: Hash) -> ContractResult<Option<TxReceipt>>;

    /// Endpoint identifier for logging.
    fn endpoint(&self) -> &str;
}

/// Wallet session (the browser-extension role): account selection, signing
/// and submission all happen on the wallet side.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts the wallet exposes; the first one is the active account.
    async fn accounts(&self) -> ContractResult<Vec<Address>>;

    /// Chain the wallet is currently connected to.
    async fn chain_id(&self) -> ContractResult<u64>;

    /// Sign and broadcast; returns the transaction hash.
    async fn send_transaction(&self, tx: &TxRequest) -> ContractResult<Hash>;
}

/// Source of "now" for sale-window checks.
pub trait Clock: Send + Sync {
    /// Current unix time in seconds.
    fn now_unix(&self) -> u64;
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_unix(&self) -> u64 {
        self.0
    }
}

/// Placeholder wallet for read-only deployments; every call fails with
/// [`ContractError::NoWalletProvider`](crate::domain::ContractError::NoWalletProvider).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWallet;

#[async_trait]
impl WalletProvider for NoWallet {
    async fn accounts(&self) -> ContractResult<Vec<Address>> {
        Err(crate::domain::ContractError::NoWalletProvider)
    }

    async fn chain_id(&self) -> ContractResult<u64> {
        Err(crate::domain::ContractError::NoWalletProvider)
    }

    async fn send_transaction(&self, _tx: &TxRequest) -> ContractResult<Hash> {
        Err(crate::domain::ContractError::NoWalletProvider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ContractError, U256};

    #[test]
    fn test_no_wallet_chain_id() {
        tokio_test::assert_err!(tokio_test::block_on(NoWallet.chain_id()));
    }

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(1_700_000_000).now_unix(), 1_700_000_000);
    }

    #[tokio::test]
    async fn test_no_wallet_refuses_everything() {
        let wallet = NoWallet;
        assert!(matches!(
            wallet.accounts().await,
            Err(ContractError::NoWalletProvider)
        ));
        let tx = TxRequest {
            from: Address::zero(),
            to: Address::zero(),
            data: vec![],
            value: U256::zero(),
        };
        assert!(matches!(
            wallet.send_transaction(&tx).await,
            Err(ContractError::NoWalletProvider)
        ));
    }
}
