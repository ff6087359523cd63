//! Bespoke mint contract: one token per wallet, no sale switch.

use crate::abi::functions as f;
use crate::domain::{Address, ContractError, ContractResult, OwnedToken, TxRequest, U256};
use crate::ports::RpcTransport;

/// Fixed per-wallet allowance of the simple contract.
pub const SIMPLE_MAX_PER_WALLET: u64 = 1;

/// Reject anything but a single token.
pub fn check_simple_quantity(quantity: u64) -> ContractResult<()> {
    if quantity != SIMPLE_MAX_PER_WALLET {
        return Err(ContractError::InvalidQuantity {
            requested: quantity,
            reason: "NINJ4 mints exactly one token per transaction".into(),
        });
    }
    Ok(())
}

/// Simple mint contract at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleContract {
    /// Contract address.
    pub address: Address,
}

impl SimpleContract {
    /// Bind to `address`.
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// `maxSupply()`.
    pub async fn max_supply(&self, rpc: &dyn RpcTransport) -> ContractResult<u64> {
        let data = rpc.call(self.address, f::no_args(f::MAX_SUPPLY)).await?;
        f::decode_u64(&data)
    }

    /// `hasMinted(owner)`.
    pub async fn has_minted(&self, rpc: &dyn RpcTransport, owner: Address) -> ContractResult<bool> {
        let data = rpc.call(self.address, f::with_address(f::HAS_MINTED, owner)).await?;
        f::decode_bool(&data)
    }

    /// `1` if `owner` already minted, else `0`.
    pub async fn minted_count(&self, rpc: &dyn RpcTransport, owner: Address) -> ContractResult<u64> {
        Ok(u64::from(self.has_minted(rpc, owner).await?))
    }

    /// `ownerTokensWithURI(owner)`.
    pub async fn owner_tokens_with_uri(
        &self,
        rpc: &dyn RpcTransport,
        owner: Address,
    ) -> ContractResult<Vec<OwnedToken>> {
        let data = rpc
            .call(self.address, f::with_address(f::OWNER_TOKENS_WITH_URI, owner))
            .await?;
        f::decode_owner_tokens(&data)
    }

    /// Reject anything but a single token. No network access.
    pub fn check_quantity(&self, quantity: u64) -> ContractResult<()> {
        check_simple_quantity(quantity)
    }

    /// Bare `mint()` from `from`.
    pub fn mint_request(&self, from: Address, quantity: u64) -> ContractResult<TxRequest> {
        self.check_quantity(quantity)?;
        Ok(TxRequest {
            from,
            to: self.address,
            data: f::no_args(f::MINT),
            value: U256::zero(),
        })
    }
}
