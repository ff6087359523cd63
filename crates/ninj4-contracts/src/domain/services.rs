//! # Domain Services
//!
//! Pure sale rules shared by both contract shapes. No I/O, no async.

use super::entities::{AllowlistProof, ClaimCondition, CollectionState};
use super::errors::{ContractError, ContractResult};
use super::value_objects::{is_native_currency, SaleStatus, U256};

/// Whether a claim condition accepts claims at `now` (unix seconds).
///
/// Open once `start_timestamp <= now` and while supply remains
/// (`max_claimable_supply == 0` means unlimited).
pub fn is_condition_active(condition: &ClaimCondition, now: u64) -> bool {
    let started = condition.start_timestamp <= U256::from(now);
    let has_supply = condition.max_claimable_supply.is_zero()
        || condition.supply_claimed < condition.max_claimable_supply;
    started && has_supply
}

/// Whether the collection cap is reached (`max_supply == 0` means uncapped).
pub fn is_supply_exhausted(total_minted: u64, max_supply: u64) -> bool {
    max_supply > 0 && total_minted >= max_supply
}

/// `price_per_token × quantity`, saturating.
pub fn total_price(condition: &ClaimCondition, quantity: u64) -> U256 {
    condition
        .price_per_token
        .saturating_mul(U256::from(quantity))
}

/// Native value to attach to a claim paying `total` in the condition's currency.
pub fn native_value(condition: &ClaimCondition, total: U256) -> U256 {
    if is_native_currency(&condition.currency) {
        total
    } else {
        U256::zero()
    }
}

/// Empty proof mirroring the condition's current public-sale rules.
pub fn public_allowlist_proof(condition: &ClaimCondition) -> AllowlistProof {
    AllowlistProof {
        proof: Vec::new(),
        quantity_limit_per_wallet: condition.quantity_limit_per_wallet,
        price_per_token: condition.price_per_token,
        currency: condition.currency,
    }
}

/// Per-wallet limit carried by a condition, `fallback` when unset.
pub fn condition_wallet_limit(condition: &ClaimCondition, fallback: u64) -> u64 {
    let limit = condition.quantity_limit_per_wallet;
    if limit.is_zero() {
        fallback
    } else if limit > U256::from(u64::MAX) {
        u64::MAX
    } else {
        limit.as_u64()
    }
}

/// Sale phase derived from collection counters.
pub fn sale_status(state: &CollectionState) -> SaleStatus {
    if state.sale_active {
        SaleStatus::Active
    } else if is_supply_exhausted(state.total_minted, state.max_supply) {
        SaleStatus::Ended
    } else {
        SaleStatus::NotStarted
    }
}

/// Check a requested quantity against the per-wallet allowance.
pub fn check_mint_allowance(quantity: u64, minted: u64, max_per_wallet: u64) -> ContractResult<()> {
    if quantity == 0 || quantity > max_per_wallet {
        return Err(ContractError::InvalidQuantity {
            requested: quantity,
            reason: format!("Enter a value between 1 and {max_per_wallet}"),
        });
    }
    if minted.saturating_add(quantity) > max_per_wallet {
        return Err(ContractError::WalletLimitReached {
            minted,
            limit: max_per_wallet,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Address, NATIVE_TOKEN};
    use proptest::prelude::*;

    fn condition(start: u64, max: u64, claimed: u64) -> ClaimCondition {
        ClaimCondition {
            start_timestamp: U256::from(start),
            max_claimable_supply: U256::from(max),
            supply_claimed: U256::from(claimed),
            quantity_limit_per_wallet: U256::from(1u64),
            price_per_token: U256::from(10u64).pow(U256::from(16u64)),
            currency: NATIVE_TOKEN,
            ..Default::default()
        }
    }

    #[test]
    fn test_condition_active_when_started_with_supply() {
        assert!(is_condition_active(&condition(100, 500, 10), 100));
        assert!(is_condition_active(&condition(100, 0, 10_000), 200));
    }

    #[test]
    fn test_condition_inactive_before_start() {
        assert!(!is_condition_active(&condition(1_000, 500, 0), 999));
    }

    #[test]
    fn test_condition_inactive_when_exhausted() {
        assert!(!is_condition_active(&condition(0, 500, 500), u64::MAX));
    }

    #[test]
    fn test_supply_exhausted() {
        assert!(is_supply_exhausted(500, 500));
        assert!(is_supply_exhausted(501, 500));
        assert!(!is_supply_exhausted(499, 500));
        assert!(!is_supply_exhausted(10_000, 0));
    }

    #[test]
    fn test_total_price_and_value() {
        let c = condition(0, 0, 0);
        let total = total_price(&c, 3);
        assert_eq!(total, U256::from(3u64) * U256::from(10u64).pow(U256::from(16u64)));
        assert_eq!(native_value(&c, total), total);

        let erc20 = ClaimCondition {
            currency: Address::repeat_byte(0x42),
            ..c
        };
        assert_eq!(native_value(&erc20, total), U256::zero());
    }

    #[test]
    fn test_public_proof_mirrors_condition() {
        let c = condition(0, 0, 0);
        let proof = public_allowlist_proof(&c);
        assert!(proof.proof.is_empty());
        assert_eq!(proof.price_per_token, c.price_per_token);
        assert_eq!(proof.quantity_limit_per_wallet, U256::one());
        assert_eq!(proof.currency, NATIVE_TOKEN);
    }

    #[test]
    fn test_wallet_limit_fallback() {
        let mut c = condition(0, 0, 0);
        assert_eq!(condition_wallet_limit(&c, 5), 1);
        c.quantity_limit_per_wallet = U256::zero();
        assert_eq!(condition_wallet_limit(&c, 5), 5);
        c.quantity_limit_per_wallet = U256::MAX;
        assert_eq!(condition_wallet_limit(&c, 5), u64::MAX);
    }

    #[test]
    fn test_sale_status() {
        let mut state = CollectionState {
            total_minted: 500,
            max_supply: 500,
            max_per_wallet: 1,
            sale_active: false,
        };
        assert_eq!(sale_status(&state), SaleStatus::Ended);
        state.total_minted = 10;
        assert_eq!(sale_status(&state), SaleStatus::NotStarted);
        state.sale_active = true;
        assert_eq!(sale_status(&state), SaleStatus::Active);
    }

    #[test]
    fn test_mint_allowance() {
        assert!(check_mint_allowance(1, 0, 1).is_ok());
        assert!(matches!(
            check_mint_allowance(1, 1, 1),
            Err(ContractError::WalletLimitReached { minted: 1, limit: 1 })
        ));
        assert!(matches!(
            check_mint_allowance(0, 0, 1),
            Err(ContractError::InvalidQuantity { requested: 0, .. })
        ));
        assert!(matches!(
            check_mint_allowance(3, 0, 2),
            Err(ContractError::InvalidQuantity { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_never_active_before_start(start in 1u64..u64::MAX, delta in 1u64..1_000_000, max in 0u64..10_000, claimed in 0u64..10_000) {
            let now = start.saturating_sub(delta);
            prop_assume!(now < start);
            prop_assert!(!is_condition_active(&condition(start, max, claimed), now));
        }

        #[test]
        fn prop_never_active_when_exhausted(start in 0u64..u64::MAX, now in 0u64..u64::MAX, max in 1u64..10_000, extra in 0u64..10_000) {
            prop_assert!(!is_condition_active(&condition(start, max, max + extra), now));
        }
    }
}
