//! # Contract Variants
//!
//! The collection is deployed either as the bespoke one-per-wallet mint
//! contract or as a generic drop contract. The shape is chosen once from
//! configuration and every read and write dispatches through
//! [`ContractVariant`].
//!
//! ```text
//! ContractVariant
//! ├── Simple(SimpleContract)  mint(), maxSupply(), hasMinted(), ownerTokensWithURI()
//! └── Drop(DropContract)      claim(...), maxTotalSupply(), claim conditions
//! ```
//!
//! Calls shared by both shapes (`totalMinted`, `ownerOf`, `tokenURI`,
//! `balanceOf`) live on the enum itself.

pub mod drop;
pub mod simple;

pub use drop::DropContract;
pub use simple::{check_simple_quantity, SimpleContract, SIMPLE_MAX_PER_WALLET};

use crate::abi::functions as f;
use crate::domain::{
    Address, ClaimCondition, ContractError, ContractKind, ContractResult, TxRequest, U256,
};
use crate::ports::RpcTransport;

/// Contract shape bound to an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractVariant {
    /// One-per-wallet mint contract.
    Simple(SimpleContract),
    /// Claim-condition driven drop contract.
    Drop(DropContract),
}

impl ContractVariant {
    /// Bind `kind` to `address`.
    pub fn new(kind: ContractKind, address: Address) -> Self {
        match kind {
            ContractKind::Simple => ContractVariant::Simple(SimpleContract::new(address)),
            ContractKind::Drop => ContractVariant::Drop(DropContract::new(address)),
        }
    }

    /// Shape tag.
    pub fn kind(&self) -> ContractKind {
        match self {
            ContractVariant::Simple(_) => ContractKind::Simple,
            ContractVariant::Drop(_) => ContractKind::Drop,
        }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        match self {
            ContractVariant::Simple(c) => c.address,
            ContractVariant::Drop(c) => c.address,
        }
    }

    /// `totalMinted()`.
    pub async fn total_minted(&self, rpc: &dyn RpcTransport) -> ContractResult<u64> {
        let data = rpc.call(self.address(), f::no_args(f::TOTAL_MINTED)).await?;
        f::decode_u64(&data)
    }

    /// `maxSupply()` or `maxTotalSupply()`.
    pub async fn max_supply(&self, rpc: &dyn RpcTransport) -> ContractResult<u64> {
        match self {
            ContractVariant::Simple(c) => c.max_supply(rpc).await,
            ContractVariant::Drop(c) => c.max_total_supply(rpc).await,
        }
    }

    /// Per-wallet allowance; `fallback` when a drop condition leaves it unset.
    pub async fn max_per_wallet(&self, rpc: &dyn RpcTransport, fallback: u64) -> ContractResult<u64> {
        match self {
            ContractVariant::Simple(_) => Ok(SIMPLE_MAX_PER_WALLET),
            ContractVariant::Drop(c) => c.max_per_wallet(rpc, fallback).await,
        }
    }

    /// Whether minting is open at `now`.
    pub async fn is_mint_active(&self, rpc: &dyn RpcTransport, now: u64) -> ContractResult<bool> {
        match self {
            ContractVariant::Simple(_) => Ok(true),
            ContractVariant::Drop(c) => c.is_claim_active(rpc, now).await,
        }
    }

    /// Tokens `owner` minted under the current rules.
    pub async fn minted_count(&self, rpc: &dyn RpcTransport, owner: Address) -> ContractResult<u64> {
        match self {
            ContractVariant::Simple(c) => c.minted_count(rpc, owner).await,
            ContractVariant::Drop(c) => c.claimed_by_wallet(rpc, owner).await,
        }
    }

    /// Whether `owner` minted at least once.
    pub async fn has_minted(&self, rpc: &dyn RpcTransport, owner: Address) -> ContractResult<bool> {
        match self {
            ContractVariant::Simple(c) => c.has_minted(rpc, owner).await,
            ContractVariant::Drop(c) => Ok(c.claimed_by_wallet(rpc, owner).await? > 0),
        }
    }

    /// Active claim condition; always `None` for the simple contract.
    pub async fn active_condition(
        &self,
        rpc: &dyn RpcTransport,
    ) -> ContractResult<Option<ClaimCondition>> {
        match self {
            ContractVariant::Simple(_) => Ok(None),
            ContractVariant::Drop(c) => Ok(c.active_condition(rpc).await?.map(|(_, cond)| cond)),
        }
    }

    /// Build the mint or claim transaction for `from`.
    pub async fn mint_request(
        &self,
        rpc: &dyn RpcTransport,
        from: Address,
        quantity: u64,
    ) -> ContractResult<TxRequest> {
        match self {
            ContractVariant::Simple(c) => c.mint_request(from, quantity),
            ContractVariant::Drop(c) => c.claim_request(rpc, from, quantity).await,
        }
    }

    /// `ownerOf(tokenId)`.
    pub async fn owner_of(&self, rpc: &dyn RpcTransport, token_id: u64) -> ContractResult<Address> {
        let data = rpc
            .call(self.address(), f::with_uint(f::OWNER_OF, U256::from(token_id)))
            .await?;
        f::decode_address(&data)
    }

    /// `tokenURI(tokenId)`.
    pub async fn token_uri(&self, rpc: &dyn RpcTransport, token_id: u64) -> ContractResult<String> {
        let data = rpc
            .call(self.address(), f::with_uint(f::TOKEN_URI, U256::from(token_id)))
            .await?;
        f::decode_string(&data)
    }

    /// `balanceOf(owner)`.
    pub async fn balance_of(&self, rpc: &dyn RpcTransport, owner: Address) -> ContractResult<u64> {
        let data = rpc.call(self.address(), f::with_address(f::BALANCE_OF, owner)).await?;
        f::decode_u64(&data)
    }
}

/// Whether an RPC error is a contract revert rather than a transport fault.
pub fn is_revert(err: &ContractError) -> bool {
    match err {
        ContractError::Rpc { code, message } => *code == 3 || message.contains("revert"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MockChain, MOCK_CONTRACT};

    #[test]
    fn test_variant_from_kind() {
        let simple = ContractVariant::new(ContractKind::Simple, MOCK_CONTRACT);
        let drop = ContractVariant::new(ContractKind::Drop, MOCK_CONTRACT);
        assert_eq!(simple.kind(), ContractKind::Simple);
        assert_eq!(drop.kind(), ContractKind::Drop);
        assert_eq!(drop.address(), MOCK_CONTRACT);
    }

    #[test]
    fn test_is_revert() {
        assert!(is_revert(&ContractError::Rpc {
            code: -32000,
            message: "execution reverted".into()
        }));
        assert!(is_revert(&ContractError::Rpc {
            code: 3,
            message: "!CONDITION".into()
        }));
        assert!(!is_revert(&ContractError::Transport("timeout".into())));
    }

    #[tokio::test]
    async fn test_shared_reads() {
        let alice = Address::repeat_byte(0xa1);
        let bob = Address::repeat_byte(0xb0);
        let chain = MockChain::simple().with_tokens(&[alice, bob, alice]);
        let variant = ContractVariant::new(ContractKind::Simple, MOCK_CONTRACT);

        assert_eq!(variant.total_minted(&chain).await.unwrap(), 3);
        assert_eq!(variant.owner_of(&chain, 2).await.unwrap(), bob);
        assert_eq!(variant.balance_of(&chain, alice).await.unwrap(), 2);
        assert_eq!(
            variant.token_uri(&chain, 3).await.unwrap(),
            "ipfs://QmNinj4Collection/3.json"
        );
        assert!(variant.owner_of(&chain, 9).await.is_err());
    }

    #[tokio::test]
    async fn test_simple_is_always_active() {
        let chain = MockChain::simple();
        let variant = ContractVariant::new(ContractKind::Simple, MOCK_CONTRACT);
        assert!(variant.is_mint_active(&chain, 0).await.unwrap());
        assert_eq!(variant.max_per_wallet(&chain, 7).await.unwrap(), SIMPLE_MAX_PER_WALLET);
        assert!(variant.active_condition(&chain).await.unwrap().is_none());
        assert_eq!(chain.call_count(), 0);
    }
}
