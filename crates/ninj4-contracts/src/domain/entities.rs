//! # Domain Entities
//!
//! Read-only mirrors of on-chain records plus the transaction and metadata
//! shapes the adapter hands to callers.

use serde::{Deserialize, Serialize};

use super::value_objects::{Address, Hash, U256};

/// Snapshot of collection counters, derived fresh on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollectionState {
    /// Tokens minted so far.
    pub total_minted: u64,
    /// Hard cap (0 means uncapped/unknown).
    pub max_supply: u64,
    /// Tokens one wallet may mint.
    pub max_per_wallet: u64,
    /// Whether minting is currently possible.
    pub sale_active: bool,
}

impl CollectionState {
    /// Tokens left before the cap, or `None` when uncapped.
    pub fn remaining(&self) -> Option<u64> {
        (self.max_supply > 0).then(|| self.max_supply.saturating_sub(self.total_minted))
    }
}

/// Claim condition of a drop contract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClaimCondition {
    /// Unix seconds at which the condition opens.
    pub start_timestamp: U256,
    /// Supply available under this condition (0 = unlimited).
    pub max_claimable_supply: U256,
    /// Supply already claimed under this condition.
    pub supply_claimed: U256,
    /// Per-wallet limit (0 = unset).
    pub quantity_limit_per_wallet: U256,
    /// Allow-list merkle root (zero for public sales).
    pub merkle_root: Hash,
    /// Price of one token in `currency` base units.
    pub price_per_token: U256,
    /// ERC-20 currency, or the native sentinel.
    pub currency: Address,
    /// Free-form condition metadata URI.
    pub metadata: String,
}

/// Allow-list proof submitted with `claim`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllowlistProof {
    /// Merkle proof nodes (empty for public sales).
    pub proof: Vec<Hash>,
    /// Per-wallet limit the proof asserts.
    pub quantity_limit_per_wallet: U256,
    /// Price the proof asserts.
    pub price_per_token: U256,
    /// Currency the proof asserts.
    pub currency: Address,
}

/// A token held by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedToken {
    /// Token id.
    pub token_id: u64,
    /// Metadata URI as stored on chain.
    #[serde(rename = "tokenURI")]
    pub token_uri: String,
}

/// Transaction handed to the wallet for signing and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// Sender (the connected account).
    pub from: Address,
    /// Contract address.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Vec<u8>,
    /// Native value attached.
    pub value: U256,
}

/// Confirmed transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash.
    pub transaction_hash: Hash,
    /// Block the transaction was included in.
    pub block_number: u64,
    /// `true` when execution succeeded.
    pub status: bool,
    /// Gas consumed.
    pub gas_used: U256,
    /// Sender.
    pub from: Address,
    /// Recipient contract.
    pub to: Option<Address>,
}

/// One trait entry of token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAttribute {
    /// Trait category, e.g. "Tier".
    pub trait_type: String,
    /// Trait value; numbers are stringified.
    #[serde(deserialize_with = "deserialize_trait_value")]
    pub value: String,
}

/// ERC-721 metadata JSON.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Description text.
    #[serde(default)]
    pub description: Option<String>,
    /// Image URI (may be `ipfs://`).
    #[serde(default)]
    pub image: Option<String>,
    /// Traits.
    #[serde(default)]
    pub attributes: Vec<TokenAttribute>,
}

impl TokenMetadata {
    /// Value of a trait by category.
    pub fn attribute(&self, trait_type: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.trait_type == trait_type)
            .map(|a| a.value.as_str())
    }

    /// The collection's "Tier" trait.
    pub fn tier(&self) -> Option<&str> {
        self.attribute("Tier")
    }

    /// Whether the token is in the rare tier.
    pub fn is_rare(&self) -> bool {
        self.tier() == Some("Rare")
    }

    /// Name from metadata, or `NINJ4 #<id>`.
    pub fn display_name(&self, token_id: u64) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("NINJ4 #{token_id}"))
    }
}

/// Owned token joined with its metadata (if it could be fetched).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedTokenDetails {
    /// Token id and URI.
    pub token: OwnedToken,
    /// Fetched metadata, `None` when the fetch failed.
    pub metadata: Option<TokenMetadata>,
    /// Resolved HTTP image URL, if any.
    pub image_url: Option<String>,
}

impl OwnedTokenDetails {
    /// Display name with the default fallback.
    pub fn name(&self) -> String {
        match &self.metadata {
            Some(m) => m.display_name(self.token.token_id),
            None => format!("NINJ4 #{}", self.token.token_id),
        }
    }
}

fn deserialize_trait_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_supply() {
        let state = CollectionState {
            total_minted: 120,
            max_supply: 500,
            max_per_wallet: 1,
            sale_active: true,
        };
        assert_eq!(state.remaining(), Some(380));

        let uncapped = CollectionState::default();
        assert_eq!(uncapped.remaining(), None);
    }

    #[test]
    fn test_metadata_tier_and_name() {
        let json = r#"{
            "name": "",
            "image": "ipfs://QmImage/1.png",
            "attributes": [
                {"trait_type": "Tier", "value": "Rare"},
                {"trait_type": "Level", "value": 3}
            ]
        }"#;
        let meta: TokenMetadata = serde_json::from_str(json).unwrap();
        assert!(meta.is_rare());
        assert_eq!(meta.attribute("Level"), Some("3"));
        assert_eq!(meta.display_name(42), "NINJ4 #42");
    }

    #[test]
    fn test_owned_token_json_shape() {
        let token = OwnedToken {
            token_id: 7,
            token_uri: "ipfs://cid/7.json".into(),
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["tokenId"], 7);
        assert_eq!(json["tokenURI"], "ipfs://cid/7.json");
    }
}
