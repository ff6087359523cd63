//! Drop contract: sales are governed by the active claim condition, which
//! is looked up by id immediately before every use and never cached.

use tracing::debug;

use super::is_revert;
use crate::abi::functions as f;
use crate::domain::{
    condition_wallet_limit, is_condition_active, is_supply_exhausted, native_value,
    public_allowlist_proof, total_price, Address, ClaimCondition, ContractError, ContractResult, TxRequest, U256,
};
use crate::ports::RpcTransport;

/// Drop contract at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropContract {
    /// Contract address.
    pub address: Address,
}

impl DropContract {
    /// Bind to `address`.
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// `maxTotalSupply()`.
    pub async fn max_total_supply(&self, rpc: &dyn RpcTransport) -> ContractResult<u64> {
        let data = rpc.call(self.address, f::no_args(f::MAX_TOTAL_SUPPLY)).await?;
        f::decode_u64(&data)
    }

    /// `getActiveClaimConditionId()`; `None` when the contract reverts because
    /// no condition is set.
    pub async fn active_condition_id(&self, rpc: &dyn RpcTransport) -> ContractResult<Option<U256>> {
        match rpc
            .call(self.address, f::no_args(f::GET_ACTIVE_CLAIM_CONDITION_ID))
            .await
        {
            Ok(data) => Ok(Some(f::decode_uint(&data)?)),
            Err(e) if is_revert(&e) => {
                debug!("[ninj4] No active claim condition: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// `getClaimConditionById(id)`.
    pub async fn claim_condition(
        &self,
        rpc: &dyn RpcTransport,
        id: U256,
    ) -> ContractResult<ClaimCondition> {
        let data = rpc
            .call(self.address, f::with_uint(f::GET_CLAIM_CONDITION_BY_ID, id))
            .await?;
        f::decode_claim_condition(&data)
    }

    /// Active condition id and record.
    pub async fn active_condition(
        &self,
        rpc: &dyn RpcTransport,
    ) -> ContractResult<Option<(U256, ClaimCondition)>> {
        let Some(id) = self.active_condition_id(rpc).await? else {
            return Ok(None);
        };
        let condition = self.claim_condition(rpc, id).await?;
        Ok(Some((id, condition)))
    }

    /// `totalMinted()`.
    pub async fn total_minted(&self, rpc: &dyn RpcTransport) -> ContractResult<u64> {
        let data = rpc.call(self.address, f::no_args(f::TOTAL_MINTED)).await?;
        f::decode_u64(&data)
    }

    /// Whether `totalMinted` has reached `maxTotalSupply`.
    pub async fn is_sold_out(&self, rpc: &dyn RpcTransport) -> ContractResult<bool> {
        let (total, max) = futures::try_join!(self.total_minted(rpc), self.max_total_supply(rpc))?;
        Ok(is_supply_exhausted(total, max))
    }

    /// Whether claims are accepted at `now`: the collection is not sold out
    /// and the active condition is open.
    pub async fn is_claim_active(&self, rpc: &dyn RpcTransport, now: u64) -> ContractResult<bool> {
        if self.is_sold_out(rpc).await? {
            debug!("[ninj4] Drop sold out");
            return Ok(false);
        }
        Ok(self
            .active_condition(rpc)
            .await?
            .is_some_and(|(_, condition)| is_condition_active(&condition, now)))
    }

    /// Condition's per-wallet limit, `fallback` when unset or when no
    /// condition exists.
    pub async fn max_per_wallet(&self, rpc: &dyn RpcTransport, fallback: u64) -> ContractResult<u64> {
        Ok(match self.active_condition(rpc).await? {
            Some((_, condition)) => condition_wallet_limit(&condition, fallback),
            None => fallback,
        })
    }

    /// `getSupplyClaimedByWallet(activeId, wallet)`; `0` without a condition.
    pub async fn claimed_by_wallet(&self, rpc: &dyn RpcTransport, wallet: Address) -> ContractResult<u64> {
        let Some(id) = self.active_condition_id(rpc).await? else {
            return Ok(0);
        };
        let data = rpc
            .call(self.address, f::supply_claimed_by_wallet(id, wallet))
            .await?;
        f::decode_u64(&data)
    }

    /// Public-sale `claim` for `quantity` tokens to `receiver`, priced from
    /// the active condition.
    pub async fn claim_request(
        &self,
        rpc: &dyn RpcTransport,
        receiver: Address,
        quantity: u64,
    ) -> ContractResult<TxRequest> {
        if quantity == 0 {
            return Err(ContractError::InvalidQuantity {
                requested: 0,
                reason: "Quantity must be at least 1".into(),
            });
        }
        let (_, condition) = self
            .active_condition(rpc)
            .await?
            .ok_or(ContractError::NoActiveSale)?;

        let total = total_price(&condition, quantity);
        let proof = public_allowlist_proof(&condition);
        let data = f::claim(
            receiver,
            quantity,
            condition.currency,
            condition.price_per_token,
            &proof,
            &[],
        );
        Ok(TxRequest {
            from: receiver,
            to: self.address,
            data,
            value: native_value(&condition, total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{selector, Token};
    use crate::domain::NATIVE_TOKEN;
    use crate::ports::{MockChain, MOCK_CONTRACT};

    fn open_condition(price: u64, currency: Address) -> ClaimCondition {
        ClaimCondition {
            start_timestamp: U256::from(1_000u64),
            max_claimable_supply: U256::from(500u64),
            supply_claimed: U256::zero(),
            quantity_limit_per_wallet: U256::from(3u64),
            price_per_token: U256::from(price),
            currency,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_condition_is_none() {
        let chain = MockChain::drop_contract();
        let contract = DropContract::new(MOCK_CONTRACT);
        assert!(contract.active_condition(&chain).await.unwrap().is_none());
        assert!(!contract.is_claim_active(&chain, u64::MAX).await.unwrap());
        assert_eq!(contract.max_per_wallet(&chain, 4).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let chain = MockChain::drop_contract().with_condition(0, open_condition(1, NATIVE_TOKEN));
        chain.set_fail_reads(true);
        let contract = DropContract::new(MOCK_CONTRACT);
        assert!(matches!(
            contract.active_condition(&chain).await,
            Err(ContractError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_claim_request_native_value() {
        let chain = MockChain::drop_contract().with_condition(2, open_condition(250, NATIVE_TOKEN));
        let receiver = Address::repeat_byte(0x44);
        let tx = DropContract::new(MOCK_CONTRACT)
            .claim_request(&chain, receiver, 2)
            .await
            .unwrap();

        assert_eq!(tx.value, U256::from(500u64));
        assert_eq!(&tx.data[..4], &selector(f::CLAIM));
        let args = f::decode_claim_args(&tx.data[4..]).unwrap();
        assert_eq!(args[0], Token::Address(receiver));
        assert_eq!(args[2], Token::Address(NATIVE_TOKEN));
        assert_eq!(args[3], Token::Uint(U256::from(250u64)));
    }

    #[tokio::test]
    async fn test_claim_request_erc20_sends_no_value() {
        let usdt = Address::repeat_byte(0x55);
        let chain = MockChain::drop_contract().with_condition(0, open_condition(250, usdt));
        let tx = DropContract::new(MOCK_CONTRACT)
            .claim_request(&chain, Address::repeat_byte(0x44), 1)
            .await
            .unwrap();
        assert!(tx.value.is_zero());
    }

    #[tokio::test]
    async fn test_claim_request_without_condition() {
        let chain = MockChain::drop_contract();
        let result = DropContract::new(MOCK_CONTRACT)
            .claim_request(&chain, Address::repeat_byte(0x44), 1)
            .await;
        assert!(matches!(result, Err(ContractError::NoActiveSale)));
    }

    #[tokio::test]
    async fn test_uncapped_condition_closes_when_sold_out() {
        let mut uncapped = open_condition(0, NATIVE_TOKEN);
        uncapped.max_claimable_supply = U256::zero();
        let chain = MockChain::drop_contract()
            .with_max_supply(3)
            .with_tokens(&[Address::repeat_byte(0x01); 2])
            .with_condition(0, uncapped);
        let contract = DropContract::new(MOCK_CONTRACT);
        assert!(contract.is_claim_active(&chain, 2_000).await.unwrap());

        chain.state().owners.insert(2, Address::repeat_byte(0x02));
        assert!(contract.is_sold_out(&chain).await.unwrap());
        assert!(!contract.is_claim_active(&chain, 2_000).await.unwrap());
    }

    #[tokio::test]
    async fn test_sold_out_check_fails_on_read_error() {
        let chain = MockChain::drop_contract().with_condition(0, open_condition(0, NATIVE_TOKEN));
        chain.fail_function(f::MAX_TOTAL_SUPPLY);
        let contract = DropContract::new(MOCK_CONTRACT);
        assert!(contract.is_claim_active(&chain, 2_000).await.is_err());
    }

    #[tokio::test]
    async fn test_claimed_by_wallet() {
        let wallet = Address::repeat_byte(0x66);
        let chain = MockChain::drop_contract().with_condition(1, open_condition(0, NATIVE_TOKEN));
        chain.state().claimed_by_wallet.insert(wallet, 2);
        let contract = DropContract::new(MOCK_CONTRACT);
        assert_eq!(contract.claimed_by_wallet(&chain, wallet).await.unwrap(), 2);
        assert_eq!(contract.max_per_wallet(&chain, 1).await.unwrap(), 3);
    }
}
