//! # Value Objects
//!
//! Immutable primitives shared by the adapter: addresses, contract shape,
//! degraded read results and sale status.

use serde::{Deserialize, Serialize};
use std::fmt;

pub use primitive_types::{H160 as Address, H256 as Hash, U256};

/// Native-token sentinel used by drop contracts for the chain's gas token.
pub const NATIVE_TOKEN: Address = Address([0xee; 20]);

/// Parse a `0x`-prefixed (or bare) 40-digit hex address, any letter case.
pub fn parse_address(s: &str) -> Option<Address> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if digits.len() != 40 {
        return None;
    }
    let bytes = hex::decode(digits).ok()?;
    Some(Address::from_slice(&bytes))
}

/// Lowercase `0x` hex form used in RPC payloads and logs.
pub fn format_address(address: &Address) -> String {
    format!("{address:#x}")
}

/// Whether `currency` means "pay in the chain's native token".
///
/// Both the zero address and the `0xEeee…` sentinel are treated as native.
pub fn is_native_currency(currency: &Address) -> bool {
    currency.is_zero() || *currency == NATIVE_TOKEN
}

// =============================================================================
// CONTRACT SHAPE
// =============================================================================

/// Which on-chain contract interface the collection is deployed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    /// Bespoke one-per-wallet contract with a bare `mint()`.
    #[default]
    Simple,
    /// Generic drop contract driven by claim conditions.
    Drop,
}

impl ContractKind {
    /// Id of the first token the contract mints: the simple contract counts
    /// from 1, the ERC721A-based drop from 0.
    pub fn first_token_id(self) -> u64 {
        match self {
            ContractKind::Simple => 1,
            ContractKind::Drop => 0,
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractKind::Simple => write!(f, "simple"),
            ContractKind::Drop => write!(f, "drop"),
        }
    }
}

// =============================================================================
// READ OUTCOME
// =============================================================================

/// Result of a read that never fails outright.
///
/// `Defaulted` carries the fallback value together with the reason the real
/// read was unavailable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    /// Value read from chain.
    Value(T),
    /// Read failed; `value` is the configured fallback.
    Defaulted {
        /// Fallback value
        value: T,
        /// Why the read failed
        reason: String,
    },
}

impl<T> ReadOutcome<T> {
    /// The value, whether read or defaulted.
    pub fn value(self) -> T {
        match self {
            ReadOutcome::Value(v) | ReadOutcome::Defaulted { value: v, .. } => v,
        }
    }

    /// Borrow the value.
    pub fn get(&self) -> &T {
        match self {
            ReadOutcome::Value(v) | ReadOutcome::Defaulted { value: v, .. } => v,
        }
    }

    /// True when the value came from a fallback.
    pub fn is_defaulted(&self) -> bool {
        matches!(self, ReadOutcome::Defaulted { .. })
    }
}

// =============================================================================
// SALE STATUS
// =============================================================================

/// Coarse sale phase shown to collectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Minting is possible now.
    Active,
    /// Supply is exhausted.
    Ended,
    /// Sale window not open (or state unknown).
    NotStarted,
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleStatus::Active => write!(f, "active"),
            SaleStatus::Ended => write!(f, "ended"),
            SaleStatus::NotStarted => write!(f, "not started"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_mixed_case() {
        let lower = parse_address("0x2b11c9c19fdaee8db3f63b54fbb3077fb455c683").unwrap();
        let mixed = parse_address("0x2B11c9C19fdAeE8dB3f63b54fbb3077Fb455C683").unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_parse_address_rejects_bad_length() {
        assert!(parse_address("0x1234").is_none());
        assert!(parse_address("not an address").is_none());
    }

    #[test]
    fn test_format_address_round_trip() {
        let addr = parse_address("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
        assert_eq!(
            format_address(&addr),
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        );
    }

    #[test]
    fn test_native_currency() {
        assert!(is_native_currency(&Address::zero()));
        assert!(is_native_currency(&NATIVE_TOKEN));
        assert!(!is_native_currency(&Address::repeat_byte(0x11)));
    }

    #[test]
    fn test_read_outcome_value() {
        let read: ReadOutcome<u64> = ReadOutcome::Value(7);
        let fallback: ReadOutcome<u64> = ReadOutcome::Defaulted {
            value: 500,
            reason: "timeout".into(),
        };
        assert!(!read.is_defaulted());
        assert!(fallback.is_defaulted());
        assert_eq!(*fallback.get(), 500);
        assert_eq!(read.value(), 7);
    }

    #[test]
    fn test_contract_kind_serde() {
        let kind: ContractKind = serde_json::from_str("\"drop\"").unwrap();
        assert_eq!(kind, ContractKind::Drop);
        assert_eq!(ContractKind::default(), ContractKind::Simple);
    }
}
