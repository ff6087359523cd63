//! # Collection Service
//!
//! Single entry point over both contract shapes.
//!
//! Reads never fail: each `read_*` returns a [`ReadOutcome`] carrying either
//! the chain value or the fallback plus the reason, and logs the failure at
//! `warn`. Writes surface every error and are never retried.

use std::cmp::min;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

use super::binding::{ReadBinding, WriteBinding};
use crate::adapters::{HttpRpcTransport, HttpWalletProvider, MetadataClient, SystemClock};
use crate::config::AdapterConfig;
use crate::contracts::{check_simple_quantity, is_revert, ContractVariant};
use crate::domain::{
    check_mint_allowance, invariant_minted_within_supply, invariant_unique_token_ids, sale_status,
    Address, ClaimCondition, CollectionState, ContractError, ContractKind, ContractResult, Hash,
    OwnedToken, OwnedTokenDetails, ReadOutcome, SaleStatus, TxReceipt,
};
use crate::ports::{Clock, CollectionApi, NoWallet, RpcTransport, WalletProvider};

/// Builds the node transport from configuration on first read.
pub type Connector<R> = Box<dyn Fn(&AdapterConfig) -> ContractResult<R> + Send + Sync>;

/// Progress of an ownership scan.
enum Scan {
    Start,
    Next { next: u64, last: u64 },
    Done,
}

/// Collection Service - normalizes the simple and drop contracts.
pub struct CollectionService<R, W, C> {
    /// Configuration.
    config: AdapterConfig,
    /// Node transport factory.
    connector: Connector<R>,
    /// Lazily created read binding.
    read: OnceCell<ReadBinding<R>>,
    /// Wallet session provider.
    wallet: W,
    /// Current write binding, rebuilt on account change.
    write: RwLock<Option<WriteBinding>>,
    /// Time source for sale windows.
    clock: C,
}

impl CollectionService<HttpRpcTransport, HttpWalletProvider, SystemClock> {
    /// Service over HTTP JSON-RPC, with the wallet endpoint from `rpc.wallet_url`.
    pub fn from_config(config: AdapterConfig) -> ContractResult<Self> {
        let wallet = HttpWalletProvider::from_config(&config)?;
        if !wallet.is_configured() {
            info!("[ninj4] No wallet endpoint configured, service is read-only");
        }
        Ok(Self::new(config, HttpRpcTransport::from_config, wallet, SystemClock))
    }
}

impl<R, C> CollectionService<R, NoWallet, C>
where
    R: RpcTransport + Clone + 'static,
    C: Clock,
{
    /// Read-only service; every write fails with `NoWalletProvider`.
    pub fn read_only(config: AdapterConfig, transport: R, clock: C) -> Self {
        Self::with_transport(config, transport, NoWallet, clock)
    }
}

impl<R, W, C> CollectionService<R, W, C>
where
    R: RpcTransport + 'static,
    W: WalletProvider,
    C: Clock,
{
    /// Create a service; `connector` runs once, on the first read.
    pub fn new<F>(config: AdapterConfig, connector: F, wallet: W, clock: C) -> Self
    where
        F: Fn(&AdapterConfig) -> ContractResult<R> + Send + Sync + 'static,
    {
        Self {
            config,
            connector: Box::new(connector),
            read: OnceCell::new(),
            wallet,
            write: RwLock::new(None),
            clock,
        }
    }

    /// Create a service over an existing transport.
    pub fn with_transport(config: AdapterConfig, transport: R, wallet: W, clock: C) -> Self
    where
        R: Clone,
    {
        Self::new(config, move |_| Ok(transport.clone()), wallet, clock)
    }

    /// Configuration in use.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    // =========================================================================
    // BINDINGS
    // =========================================================================

    /// Read binding, created on first use and cached for the service lifetime.
    pub async fn read_binding(&self) -> ContractResult<&ReadBinding<R>> {
        self.read
            .get_or_try_init(|| async {
                let address = self.config.contract_address()?;
                let transport = (self.connector)(&self.config)?;
                let variant = ContractVariant::new(self.config.contract.kind, address);
                info!(
                    "[ninj4] Read binding ready: {} contract {:#x} via {}",
                    variant.kind(),
                    address,
                    transport.endpoint()
                );
                Ok::<_, ContractError>(ReadBinding { transport, variant })
            })
            .await
    }

    /// Write binding for the wallet's current account.
    ///
    /// Rebuilt whenever the account differs from the cached one; dropped
    /// when the wallet reports no account.
    pub async fn ensure_write_binding(&self) -> ContractResult<WriteBinding> {
        let accounts = self.wallet.accounts().await?;
        let Some(account) = accounts.first().copied() else {
            if self.write.write().await.take().is_some() {
                info!("[ninj4] Wallet disconnected, write binding dropped");
            }
            return Err(ContractError::WalletNotConnected);
        };

        let chain_id = self.wallet.chain_id().await?;
        if let Some(expected) = self.config.chain_id() {
            if chain_id != expected {
                return Err(ContractError::WrongNetwork {
                    expected,
                    actual: chain_id,
                });
            }
        }

        let mut current = self.write.write().await;
        if let Some(binding) = current.as_ref() {
            if binding.account == account && binding.chain_id == chain_id {
                return Ok(*binding);
            }
        }
        let binding = WriteBinding { account, chain_id };
        info!(
            "[ninj4] Write binding created for {:#x} on chain {}",
            account, chain_id
        );
        *current = Some(binding);
        Ok(binding)
    }

    /// Account of the current write binding.
    pub async fn connected_account(&self) -> Option<Address> {
        self.write.read().await.as_ref().map(|b| b.account)
    }

    // =========================================================================
    // READS
    // =========================================================================

    fn settle<T>(&self, what: &str, result: ContractResult<T>, fallback: T) -> ReadOutcome<T> {
        match result {
            Ok(value) => ReadOutcome::Value(value),
            Err(e) => {
                warn!("[ninj4] Failed to read {}: {}", what, e);
                ReadOutcome::Defaulted {
                    value: fallback,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// `totalMinted()`, `0` on failure.
    pub async fn read_total_minted(&self) -> ReadOutcome<u64> {
        let result: ContractResult<u64> = async {
            let binding = self.read_binding().await?;
            binding.variant.total_minted(binding.rpc()).await
        }
        .await;
        self.settle("totalMinted", result, 0)
    }

    /// Collection cap, `nft.max_supply` on failure.
    pub async fn read_max_supply(&self) -> ReadOutcome<u64> {
        let result: ContractResult<u64> = async {
            let binding = self.read_binding().await?;
            binding.variant.max_supply(binding.rpc()).await
        }
        .await;
        self.settle("maxSupply", result, self.config.nft.max_supply)
    }

    /// Per-wallet allowance, `nft.max_per_wallet` on failure.
    pub async fn read_max_per_wallet(&self) -> ReadOutcome<u64> {
        let fallback = self.config.nft.max_per_wallet;
        let result: ContractResult<u64> = async {
            let binding = self.read_binding().await?;
            binding.variant.max_per_wallet(binding.rpc(), fallback).await
        }
        .await;
        self.settle("maxPerWallet", result, fallback)
    }

    /// Sale predicate, `false` on failure.
    pub async fn read_mint_active(&self) -> ReadOutcome<bool> {
        let now = self.clock.now_unix();
        let result: ContractResult<bool> = async {
            let binding = self.read_binding().await?;
            binding.variant.is_mint_active(binding.rpc(), now).await
        }
        .await;
        self.settle("mint status", result, false)
    }

    /// Tokens `address` minted, `0` on failure.
    pub async fn read_minted_count(&self, address: Address) -> ReadOutcome<u64> {
        let result: ContractResult<u64> = async {
            let binding = self.read_binding().await?;
            binding.variant.minted_count(binding.rpc(), address).await
        }
        .await;
        self.settle("minted count", result, 0)
    }

    /// Whether `address` minted at least once; `false` on failure.
    pub async fn has_minted(&self, address: Address) -> bool {
        let result: ContractResult<bool> = async {
            let binding = self.read_binding().await?;
            binding.variant.has_minted(binding.rpc(), address).await
        }
        .await;
        self.settle("hasMinted", result, false).value()
    }

    /// `balanceOf(address)`, `0` on failure.
    pub async fn get_balance_of(&self, address: Address) -> u64 {
        let result: ContractResult<u64> = async {
            let binding = self.read_binding().await?;
            binding.variant.balance_of(binding.rpc(), address).await
        }
        .await;
        self.settle("balanceOf", result, 0).value()
    }

    /// `tokenURI(tokenId)`, empty on failure.
    pub async fn get_token_uri(&self, token_id: u64) -> String {
        let result: ContractResult<String> = async {
            let binding = self.read_binding().await?;
            binding.variant.token_uri(binding.rpc(), token_id).await
        }
        .await;
        self.settle("tokenURI", result, String::new()).value()
    }

    // =========================================================================
    // OWNERSHIP SCAN
    // =========================================================================

    /// Owned ids in `start..=end`, queried concurrently.
    async fn owned_in_range(&self, owner: Address, start: u64, end: u64) -> ContractResult<Vec<u64>> {
        let binding = self.read_binding().await?;
        let owners = join_all((start..=end).map(|id| binding.variant.owner_of(binding.rpc(), id))).await;
        let mut ids = Vec::new();
        for (id, result) in (start..=end).zip(owners) {
            if result? == owner {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Owned ids, one batch of `scan.batch_size` `ownerOf` queries per item.
    /// Covers the `totalMinted` ids from [`AdapterConfig::first_token_id`].
    /// Batches run one after another; the stream ends after the first error.
    pub fn user_nft_batches(
        &self,
        owner: Address,
    ) -> impl Stream<Item = ContractResult<Vec<u64>>> + Send + '_ {
        let batch_size = self.config.scan.batch_size.max(1) as u64;
        let first = self.config.first_token_id();
        stream::unfold(Scan::Start, move |scan| async move {
            let (next, last) = match scan {
                Scan::Done => return None,
                Scan::Start => match self.read_binding().await {
                    Ok(binding) => match binding.variant.total_minted(binding.rpc()).await {
                        Ok(0) => return None,
                        Ok(total) => (first, first.saturating_add(total - 1)),
                        Err(e) => return Some((Err(e), Scan::Done)),
                    },
                    Err(e) => return Some((Err(e), Scan::Done)),
                },
                Scan::Next { next, last } => (next, last),
            };
            if next > last {
                return None;
            }
            let end = min(next.saturating_add(batch_size - 1), last);
            debug!("[ninj4] Scanning ownerOf {}..={} (last {})", next, end, last);
            match self.owned_in_range(owner, next, end).await {
                Ok(ids) if end == last => Some((Ok(ids), Scan::Done)),
                Ok(ids) => Some((Ok(ids), Scan::Next { next: end + 1, last })),
                Err(e) => Some((Err(e), Scan::Done)),
            }
        })
    }

    /// Lazy stream of owned token ids in ascending order.
    pub fn user_nfts_stream(
        &self,
        owner: Address,
    ) -> impl Stream<Item = ContractResult<u64>> + Send + '_ {
        self.user_nft_batches(owner)
            .map(|batch| {
                let items: Vec<ContractResult<u64>> = match batch {
                    Ok(ids) => ids.into_iter().map(Ok).collect(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(items)
            })
            .flatten()
    }

    /// `tokenURI` for each id, queried concurrently.
    async fn tokens_with_uri(&self, ids: Vec<u64>) -> ContractResult<Vec<OwnedToken>> {
        let binding = self.read_binding().await?;
        let uris = join_all(ids.iter().map(|id| binding.variant.token_uri(binding.rpc(), *id))).await;
        ids.into_iter()
            .zip(uris)
            .map(|(token_id, uri)| -> ContractResult<OwnedToken> {
                Ok(OwnedToken {
                    token_id,
                    token_uri: uri?,
                })
            })
            .collect()
    }

    async fn owner_tokens(&self, owner: Address) -> ContractResult<Vec<OwnedToken>> {
        let binding = self.read_binding().await?;
        if let ContractVariant::Simple(contract) = &binding.variant {
            match contract.owner_tokens_with_uri(binding.rpc(), owner).await {
                Ok(tokens) => return Ok(tokens),
                Err(e) if is_revert(&e) => {
                    debug!("[ninj4] ownerTokensWithURI unavailable, scanning: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
        let ids: Vec<u64> = self.user_nfts_stream(owner).try_collect().await?;
        self.tokens_with_uri(ids).await
    }

    /// Owned tokens joined with their metadata documents.
    pub async fn owned_tokens_with_metadata(
        &self,
        owner: Address,
        metadata: &MetadataClient,
    ) -> Vec<OwnedTokenDetails> {
        let tokens = self.get_owner_tokens_with_uri(owner).await;
        join_all(tokens.into_iter().map(|token| metadata.details(token))).await
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Poll for the receipt of `hash`. The transaction is already broadcast,
    /// so transient poll failures only use up a poll; running out of polls
    /// reports the hash.
    async fn wait_for_receipt(&self, rpc: &dyn RpcTransport, hash: Hash) -> ContractResult<TxReceipt> {
        let interval = Duration::from_millis(self.config.rpc.receipt_poll_interval_ms);
        for attempt in 1..=self.config.rpc.receipt_max_polls {
            match rpc.transaction_receipt(hash).await {
                Ok(Some(receipt)) => return Ok(receipt),
                Ok(None) => {
                    debug!("[ninj4] Receipt for {:#x} pending (poll {})", hash, attempt);
                }
                Err(e) if e.is_transient() => {
                    warn!("[ninj4] Receipt poll {} for {:#x} failed: {}", attempt, hash, e);
                }
                Err(e) => return Err(e),
            }
            tokio::time::sleep(interval).await;
        }
        Err(ContractError::ReceiptTimeout { hash })
    }

    /// Latest block height seen by the node.
    pub async fn latest_block(&self) -> ContractResult<u64> {
        let binding = self.read_binding().await?;
        binding.rpc().block_number().await
    }

    /// Mint after checking the connected account's allowance and the sale
    /// window.
    pub async fn mint_checked(&self, quantity: u64) -> ContractResult<TxReceipt> {
        let binding = self.ensure_write_binding().await?;
        let (max_per_wallet, minted, active) = futures::join!(
            self.read_max_per_wallet(),
            self.read_minted_count(binding.account),
            self.read_mint_active(),
        );
        check_mint_allowance(quantity, minted.value(), max_per_wallet.value())?;
        if !active.value() {
            return Err(ContractError::NoActiveSale);
        }
        self.mint(quantity).await
    }
}

#[async_trait]
impl<R, W, C> CollectionApi for CollectionService<R, W, C>
where
    R: RpcTransport + 'static,
    W: WalletProvider,
    C: Clock,
{
    async fn get_total_minted(&self) -> u64 {
        self.read_total_minted().await.value()
    }

    async fn get_max_supply(&self) -> u64 {
        self.read_max_supply().await.value()
    }

    async fn get_max_per_wallet(&self) -> u64 {
        self.read_max_per_wallet().await.value()
    }

    async fn is_mint_active(&self) -> bool {
        self.read_mint_active().await.value()
    }

    async fn get_minted_count(&self, address: Address) -> u64 {
        self.read_minted_count(address).await.value()
    }

    async fn mint(&self, quantity: u64) -> ContractResult<TxReceipt> {
        if self.config.contract.kind == ContractKind::Simple {
            check_simple_quantity(quantity)?;
        }
        let read = self.read_binding().await?;
        let binding = self.ensure_write_binding().await?;
        let tx = read
            .variant
            .mint_request(read.rpc(), binding.account, quantity)
            .await?;

        info!(
            "[ninj4] Minting {} token(s) for {:#x} ({})",
            quantity,
            binding.account,
            read.variant.kind()
        );
        let hash = self.wallet.send_transaction(&tx).await?;
        info!("[ninj4] Transaction sent: {:#x}", hash);

        let receipt = self.wait_for_receipt(read.rpc(), hash).await?;
        if !receipt.status {
            warn!("[ninj4] Transaction reverted: {:#x}", hash);
            return Err(ContractError::TransactionReverted { hash });
        }
        info!(
            "[ninj4] Transaction confirmed in block {}: {:#x}",
            receipt.block_number, hash
        );
        Ok(receipt)
    }

    async fn get_user_nfts(&self, address: Address) -> Vec<u64> {
        if address.is_zero() {
            return Vec::new();
        }
        match self.user_nfts_stream(address).try_collect::<Vec<u64>>().await {
            Ok(ids) => {
                debug_assert!(invariant_unique_token_ids(&ids));
                info!("[ninj4] Found {} token(s) for {:#x}", ids.len(), address);
                ids
            }
            Err(e) => {
                warn!("[ninj4] Failed to scan tokens of {:#x}: {}", address, e);
                Vec::new()
            }
        }
    }

    async fn get_owner_tokens_with_uri(&self, address: Address) -> Vec<OwnedToken> {
        if address.is_zero() {
            return Vec::new();
        }
        match self.owner_tokens(address).await {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("[ninj4] Failed to read tokens of {:#x}: {}", address, e);
                Vec::new()
            }
        }
    }

    async fn collection_state(&self) -> CollectionState {
        let (total_minted, max_supply, max_per_wallet, sale_active) = futures::join!(
            self.get_total_minted(),
            self.get_max_supply(),
            self.get_max_per_wallet(),
            self.is_mint_active(),
        );
        let state = CollectionState {
            total_minted,
            max_supply,
            max_per_wallet,
            sale_active,
        };
        if !invariant_minted_within_supply(&state) {
            warn!(
                "[ninj4] totalMinted {} exceeds max supply {}",
                state.total_minted, state.max_supply
            );
        }
        state
    }

    async fn sale_status(&self) -> SaleStatus {
        sale_status(&self.collection_state().await)
    }

    async fn read_total_minted(&self) -> ReadOutcome<u64> {
        CollectionService::read_total_minted(self).await
    }

    async fn get_active_claim_condition(&self) -> ContractResult<Option<ClaimCondition>> {
        let binding = self.read_binding().await?;
        binding.variant.active_condition(binding.rpc()).await
    }
}
