//! # In-Memory Chain
//!
//! Fake node + wallet implementing [`RpcTransport`] and [`WalletProvider`]
//! over a single collection contract. Calldata is dispatched by selector,
//! so the adapter is exercised through the real ABI codec.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::outbound::{RpcTransport, WalletProvider};
use crate::abi::{functions as f, selector, Token};
use crate::domain::{
    is_condition_active, is_native_currency, Address, ClaimCondition, ContractError,
    ContractKind, ContractResult, Hash, OwnedToken, TxReceipt, TxRequest, U256,
};

/// Mutable state behind a [`MockChain`].
#[derive(Debug, Clone)]
pub struct MockChainState {
    /// Contract shape being simulated.
    pub kind: ContractKind,
    /// Collection contract address.
    pub contract: Address,
    /// Chain id reported by the node.
    pub chain_id: u64,
    /// Chain id reported by the wallet.
    pub wallet_chain_id: u64,
    /// Token id → owner.
    pub owners: BTreeMap<u64, Address>,
    /// Id of the first minted token: 1 for the simple contract, 0 for the drop.
    pub first_token_id: u64,
    /// Collection cap.
    pub max_supply: u64,
    /// Simple contract: wallets that already minted.
    pub has_minted: HashSet<Address>,
    /// Drop contract: active condition id and record.
    pub condition: Option<(U256, ClaimCondition)>,
    /// Drop contract: claimed per wallet under the active condition.
    pub claimed_by_wallet: HashMap<Address, u64>,
    /// Whether the contract exposes `ownerTokensWithURI`.
    pub supports_owner_tokens_with_uri: bool,
    /// Every `eth_call` fails.
    pub fail_reads: bool,
    /// `eth_call` for these selectors fails.
    pub failing_selectors: HashSet<[u8; 4]>,
    /// Selectors of every `eth_call`, in order.
    pub calls: Vec<[u8; 4]>,
    /// Wallet accounts (first is active).
    pub accounts: Vec<Address>,
    /// Wallet rejects submissions with this message.
    pub reject_with: Option<String>,
    /// Transactions submitted through the wallet.
    pub sent: Vec<TxRequest>,
    /// Mined receipts.
    pub receipts: HashMap<Hash, TxReceipt>,
    /// Receipt polls answered with "pending" before the receipt shows up.
    pub pending_polls: u32,
    /// Receipt polls failing with a transport error before any answer.
    pub failing_receipt_polls: u32,
    /// Current block height.
    pub block_number: u64,
    /// Timestamp of the next block (unix seconds).
    pub timestamp: u64,
}

/// Shared handle to an in-memory chain.
#[derive(Debug, Clone)]
pub struct MockChain {
    state: Arc<Mutex<MockChainState>>,
}

/// Default contract address used by the mock.
pub const MOCK_CONTRACT: Address = Address([0xc0; 20]);

/// Chain id used by the mock (Injective EVM mainnet).
pub const MOCK_CHAIN_ID: u64 = 1776;

impl MockChain {
    /// New chain simulating `kind` with 500 max supply and no tokens.
    pub fn new(kind: ContractKind) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockChainState {
                kind,
                contract: MOCK_CONTRACT,
                chain_id: MOCK_CHAIN_ID,
                wallet_chain_id: MOCK_CHAIN_ID,
                owners: BTreeMap::new(),
                first_token_id: kind.first_token_id(),
                max_supply: 500,
                has_minted: HashSet::new(),
                condition: None,
                claimed_by_wallet: HashMap::new(),
                supports_owner_tokens_with_uri: kind == ContractKind::Simple,
                fail_reads: false,
                failing_selectors: HashSet::new(),
                calls: Vec::new(),
                accounts: Vec::new(),
                reject_with: None,
                sent: Vec::new(),
                receipts: HashMap::new(),
                pending_polls: 0,
                failing_receipt_polls: 0,
                block_number: 1,
                timestamp: 1_700_000_000,
            })),
        }
    }

    /// Simple mint contract.
    pub fn simple() -> Self {
        Self::new(ContractKind::Simple)
    }

    /// Drop contract.
    pub fn drop_contract() -> Self {
        Self::new(ContractKind::Drop)
    }

    /// Lock the state for inspection or setup.
    pub fn state(&self) -> MutexGuard<'_, MockChainState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Assign the next token ids to the given owners in order.
    pub fn with_tokens(self, owners: &[Address]) -> Self {
        {
            let mut state = self.state();
            for owner in owners {
                let id = state.next_token_id();
                state.owners.insert(id, *owner);
                state.has_minted.insert(*owner);
            }
        }
        self
    }

    /// Set the collection cap.
    pub fn with_max_supply(self, max_supply: u64) -> Self {
        self.state().max_supply = max_supply;
        self
    }

    /// Install an active claim condition.
    pub fn with_condition(self, id: u64, condition: ClaimCondition) -> Self {
        self.state().condition = Some((U256::from(id), condition));
        self
    }

    /// Connect a wallet account.
    pub fn connect(&self, account: Address) {
        self.state().accounts = vec![account];
    }

    /// Disconnect the wallet.
    pub fn disconnect(&self) {
        self.state().accounts.clear();
    }

    /// Make every read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Make reads of one function fail.
    pub fn fail_function(&self, signature: &str) {
        self.state().failing_selectors.insert(selector(signature));
    }

    /// Number of `eth_call`s served so far.
    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Number of `eth_call`s for one function.
    pub fn calls_to(&self, signature: &str) -> usize {
        let sel = selector(signature);
        self.state().calls.iter().filter(|s| **s == sel).count()
    }

    /// Transactions submitted through the wallet.
    pub fn sent_transactions(&self) -> Vec<TxRequest> {
        self.state().sent.clone()
    }

    fn token_uri(id: u64) -> String {
        format!("ipfs://QmNinj4Collection/{id}.json")
    }
}

impl MockChainState {
    fn total_minted(&self) -> u64 {
        self.owners.len() as u64
    }

    fn next_token_id(&self) -> u64 {
        self.first_token_id + self.total_minted()
    }

    fn dispatch(&mut self, data: &[u8]) -> ContractResult<Vec<u8>> {
        if data.len() < 4 {
            return Err(revert("missing selector"));
        }
        let mut sel = [0u8; 4];
        sel.copy_from_slice(&data[..4]);
        let args = &data[4..];
        self.calls.push(sel);

        if self.fail_reads || self.failing_selectors.contains(&sel) {
            return Err(ContractError::Transport("connection refused".into()));
        }

        let uint = |v: u64| crate::abi::encode(&[Token::Uint(U256::from(v))]);
        let arg_address = || -> ContractResult<Address> {
            crate::abi::decode_single(crate::abi::ParamType::Address, args)?.into_address()
        };
        let arg_uint = || -> ContractResult<U256> {
            crate::abi::decode_single(crate::abi::ParamType::Uint, args)?.into_uint()
        };

        let is = |sig: &str| sel == selector(sig);
        let simple = self.kind == ContractKind::Simple;

        if is(f::TOTAL_MINTED) {
            Ok(uint(self.total_minted()))
        } else if is(f::BALANCE_OF) {
            let owner = arg_address()?;
            Ok(uint(self.owners.values().filter(|o| **o == owner).count() as u64))
        } else if is(f::OWNER_OF) {
            let id = arg_uint()?;
            match self.owners.get(&id.low_u64()) {
                Some(owner) => Ok(crate::abi::encode(&[Token::Address(*owner)])),
                None => Err(revert("ERC721: invalid token ID")),
            }
        } else if is(f::TOKEN_URI) {
            let id = arg_uint()?.low_u64();
            if !self.owners.contains_key(&id) {
                return Err(revert("URI query for nonexistent token"));
            }
            Ok(crate::abi::encode(&[Token::String(MockChain::token_uri(id))]))
        } else if simple && is(f::MAX_SUPPLY) {
            Ok(uint(self.max_supply))
        } else if simple && is(f::HAS_MINTED) {
            let owner = arg_address()?;
            Ok(crate::abi::encode(&[Token::Bool(self.has_minted.contains(&owner))]))
        } else if self.supports_owner_tokens_with_uri && is(f::OWNER_TOKENS_WITH_URI) {
            let owner = arg_address()?;
            let tokens: Vec<OwnedToken> = self
                .owners
                .iter()
                .filter(|(_, o)| **o == owner)
                .map(|(id, _)| OwnedToken {
                    token_id: *id,
                    token_uri: MockChain::token_uri(*id),
                })
                .collect();
            Ok(f::encode_owner_tokens(&tokens))
        } else if !simple && is(f::MAX_TOTAL_SUPPLY) {
            Ok(uint(self.max_supply))
        } else if !simple && is(f::GET_ACTIVE_CLAIM_CONDITION_ID) {
            match &self.condition {
                Some((id, _)) => Ok(crate::abi::encode(&[Token::Uint(*id)])),
                None => Err(revert("!CONDITION")),
            }
        } else if !simple && is(f::GET_CLAIM_CONDITION_BY_ID) {
            let id = arg_uint()?;
            match &self.condition {
                Some((active, condition)) if *active == id => {
                    Ok(f::encode_claim_condition(condition))
                }
                _ => Err(revert("!CONDITION")),
            }
        } else if !simple && is(f::GET_SUPPLY_CLAIMED_BY_WALLET) {
            let decoded = crate::abi::decode(
                &[crate::abi::ParamType::Uint, crate::abi::ParamType::Address],
                args,
            )?;
            let wallet = decoded
                .get(1)
                .cloned()
                .ok_or_else(|| revert("bad args"))?
                .into_address()?;
            Ok(uint(self.claimed_by_wallet.get(&wallet).copied().unwrap_or(0)))
        } else {
            Err(revert("function selector was not recognized"))
        }
    }

    fn execute(&mut self, tx: &TxRequest) -> bool {
        if tx.to != self.contract || tx.data.len() < 4 {
            return false;
        }
        let sel = &tx.data[..4];
        if self.kind == ContractKind::Simple && sel == selector(f::MINT) {
            if self.has_minted.contains(&tx.from) || self.total_minted() >= self.max_supply {
                return false;
            }
            let id = self.next_token_id();
            self.owners.insert(id, tx.from);
            self.has_minted.insert(tx.from);
            return true;
        }
        if self.kind == ContractKind::Drop && sel == selector(f::CLAIM) {
            let Ok(args) = f::decode_claim_args(&tx.data[4..]) else {
                return false;
            };
            let receiver = args.first().cloned().and_then(|t| t.into_address().ok());
            let quantity = args.get(1).cloned().and_then(|t| t.into_uint().ok());
            let (Some(receiver), Some(quantity)) = (receiver, quantity) else {
                return false;
            };
            let quantity = quantity.low_u64();
            if self.max_supply > 0 && self.total_minted() + quantity > self.max_supply {
                return false;
            }
            let first_id = self.next_token_id();
            let Some((_, condition)) = self.condition.as_mut() else {
                return false;
            };
            if !is_condition_active(condition, self.timestamp) {
                return false;
            }
            let expected = condition.price_per_token.saturating_mul(U256::from(quantity));
            if is_native_currency(&condition.currency) && tx.value != expected {
                return false;
            }
            let claimed = self.claimed_by_wallet.get(&tx.from).copied().unwrap_or(0);
            let limit = condition.quantity_limit_per_wallet;
            if !limit.is_zero() && U256::from(claimed + quantity) > limit {
                return false;
            }
            condition.supply_claimed = condition.supply_claimed.saturating_add(U256::from(quantity));
            for id in first_id..first_id + quantity {
                self.owners.insert(id, receiver);
            }
            *self.claimed_by_wallet.entry(tx.from).or_insert(0) += quantity;
            return true;
        }
        false
    }
}

fn revert(reason: &str) -> ContractError {
    ContractError::Rpc {
        code: 3,
        message: format!("execution reverted: {reason}"),
    }
}

#[async_trait]
impl RpcTransport for MockChain {
    async fn call(&self, to: Address, data: Vec<u8>) -> ContractResult<Vec<u8>> {
        let mut state = self.state();
        if to != state.contract {
            state.calls.push([0u8; 4]);
            return Ok(Vec::new());
        }
        state.dispatch(&data)
    }

    async fn chain_id(&self) -> ContractResult<u64> {
        Ok(self.state().chain_id)
    }

    async fn block_number(&self) -> ContractResult<u64> {
        Ok(self.state().block_number)
    }

    async fn transaction_receipt(&self, hash: Hash) -> ContractResult<Option<TxReceipt>> {
        let mut state = self.state();
        if state.failing_receipt_polls > 0 {
            state.failing_receipt_polls -= 1;
            return Err(ContractError::Transport("connection reset".into()));
        }
        if state.pending_polls > 0 {
            state.pending_polls -= 1;
            return Ok(None);
        }
        Ok(state.receipts.get(&hash).cloned())
    }

    fn endpoint(&self) -> &str {
        "mock://chain"
    }
}

#[async_trait]
impl WalletProvider for MockChain {
    async fn accounts(&self) -> ContractResult<Vec<Address>> {
        Ok(self.state().accounts.clone())
    }

    async fn chain_id(&self) -> ContractResult<u64> {
        Ok(self.state().wallet_chain_id)
    }

    async fn send_transaction(&self, tx: &TxRequest) -> ContractResult<Hash> {
        let mut state = self.state();
        if let Some(reason) = state.reject_with.clone() {
            return Err(ContractError::TransactionRejected(reason));
        }
        state.sent.push(tx.clone());
        state.block_number += 1;
        let hash = Hash::from_low_u64_be(state.sent.len() as u64);
        let status = state.execute(tx);
        let receipt = TxReceipt {
            transaction_hash: hash,
            block_number: state.block_number,
            status,
            gas_used: U256::from(if status { 95_000u64 } else { 30_000u64 }),
            from: tx.from,
            to: Some(tx.to),
        };
        state.receipts.insert(hash, receipt);
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_total_minted() {
        let chain = MockChain::simple().with_tokens(&[Address::repeat_byte(1); 3]);
        let data = chain.call(MOCK_CONTRACT, f::no_args(f::TOTAL_MINTED)).await.unwrap();
        assert_eq!(f::decode_u64(&data).unwrap(), 3);
        assert_eq!(chain.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_simple_has_no_claim_conditions() {
        let chain = MockChain::simple();
        let result = chain
            .call(MOCK_CONTRACT, f::no_args(f::GET_ACTIVE_CLAIM_CONDITION_ID))
            .await;
        assert!(matches!(result, Err(ContractError::Rpc { .. })));
    }

    #[tokio::test]
    async fn test_mock_fail_reads() {
        let chain = MockChain::simple();
        chain.set_fail_reads(true);
        let result = chain.call(MOCK_CONTRACT, f::no_args(f::TOTAL_MINTED)).await;
        assert!(matches!(result, Err(ContractError::Transport(_))));
    }

    #[tokio::test]
    async fn test_mock_mint_once_per_wallet() {
        let chain = MockChain::simple();
        let from = Address::repeat_byte(7);
        let tx = TxRequest {
            from,
            to: MOCK_CONTRACT,
            data: f::no_args(f::MINT),
            value: U256::zero(),
        };
        let first = chain.send_transaction(&tx).await.unwrap();
        let second = chain.send_transaction(&tx).await.unwrap();
        let r1 = chain.transaction_receipt(first).await.unwrap().unwrap();
        let r2 = chain.transaction_receipt(second).await.unwrap().unwrap();
        assert!(r1.status);
        assert!(!r2.status);
        assert_eq!(chain.state().owners.len(), 1);
    }
}
