//! # Inbound Ports
//!
//! The uniform collection API consumed by front-ends, independent of which
//! contract shape backs the collection.

use async_trait::async_trait;

use crate::domain::{
    Address, ClaimCondition, CollectionState, ContractResult, OwnedToken, ReadOutcome,
    SaleStatus, TxReceipt,
};

/// Collection API - inbound port.
///
/// Reads never fail: they return the configured fallback and log. Writes
/// return every failure to the caller and are never retried.
#[async_trait]
pub trait CollectionApi: Send + Sync {
    /// Tokens minted so far; `0` when unknown.
    async fn get_total_minted(&self) -> u64;

    /// Collection cap; configured fallback when unknown.
    async fn get_max_supply(&self) -> u64;

    /// Per-wallet mint allowance.
    async fn get_max_per_wallet(&self) -> u64;

    /// Whether minting is open; `false` on any read error.
    async fn is_mint_active(&self) -> bool;

    /// Tokens `address` minted under the current sale rules.
    async fn get_minted_count(&self, address: Address) -> u64;

    /// Submit a mint/claim for the connected account and wait for the receipt.
    async fn mint(&self, quantity: u64) -> ContractResult<TxReceipt>;

    /// Token ids owned by `address` (full scan of the minted range).
    async fn get_user_nfts(&self, address: Address) -> Vec<u64>;

    /// Tokens owned by `address` with their URIs.
    async fn get_owner_tokens_with_uri(&self, address: Address) -> Vec<OwnedToken>;

    /// All four counters, read concurrently.
    async fn collection_state(&self) -> CollectionState;

    /// Sale phase derived from [`CollectionApi::collection_state`].
    async fn sale_status(&self) -> SaleStatus;

    /// Total minted, distinguishing fallbacks from real reads.
    async fn read_total_minted(&self) -> ReadOutcome<u64>;

    /// Active drop-contract condition; `None` for the simple contract.
    async fn get_active_claim_condition(&self) -> ContractResult<Option<ClaimCondition>>;
}
