//! # Adapter Configuration
//!
//! Network selection, contract address and shape, fallback constants and
//! polling knobs. Loadable from TOML with environment overrides:
//!
//! ```toml
//! network = "testnet"
//!
//! [contract]
//! address = "0x2B11c9C19fdAeE8dB3f63b54fbb3077Fb455C683"
//! kind = "simple"
//!
//! [nft]
//! max_supply = 500
//! max_per_wallet = 1
//!
//! [scan]
//! batch_size = 50
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{parse_address, Address, ContractKind, DEFAULT_IPFS_GATEWAY};

/// Environment variable overriding the RPC endpoint.
pub const ENV_RPC_URL: &str = "NINJ4_RPC_URL";
/// Environment variable overriding the contract address.
pub const ENV_CONTRACT_ADDRESS: &str = "NINJ4_CONTRACT_ADDRESS";
/// Environment variable overriding the network type.
pub const ENV_NETWORK: &str = "NINJ4_NETWORK";
/// Environment variable naming the wallet endpoint.
pub const ENV_WALLET_URL: &str = "NINJ4_WALLET_URL";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config {path}: {error}")]
    Io {
        /// Path of the file that failed to load.
        path: String,
        /// Error message from the I/O operation.
        error: String,
    },

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// An address field is not a 20-byte hex address.
    #[error("Invalid address for {field}: {value}")]
    InvalidAddress {
        /// Offending field
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// A value is out of range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Which network the collection lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Local development chain (Anvil / Hardhat).
    Local,
    /// Injective EVM testnet.
    #[default]
    Testnet,
    /// Injective EVM mainnet.
    Mainnet,
}

impl std::str::FromStr for NetworkType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(NetworkType::Local),
            "testnet" => Ok(NetworkType::Testnet),
            "mainnet" => Ok(NetworkType::Mainnet),
            other => Err(ConfigError::Invalid(format!("unknown network '{other}'"))),
        }
    }
}

/// Public chain endpoint preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPreset {
    /// EVM chain id.
    pub chain_id: u64,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Human readable name.
    pub name: String,
    /// Block explorer base URL.
    pub explorer: String,
}

impl ChainPreset {
    /// Injective EVM mainnet.
    pub fn injective_mainnet() -> Self {
        Self {
            chain_id: 1776,
            rpc_url: "https://sentry.tm.injective.network:443".into(),
            name: "Injective Mainnet".into(),
            explorer: "https://explorer.injective.network".into(),
        }
    }

    /// Injective EVM testnet.
    pub fn injective_testnet() -> Self {
        Self {
            chain_id: 1439,
            rpc_url: "https://k8s.testnet.json-rpc.injective.network/".into(),
            name: "Injective Testnet".into(),
            explorer: "https://testnet.blockscout.injective.network/".into(),
        }
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{}", self.explorer.trim_end_matches('/'), tx_hash)
    }
}

/// Local development chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalChainConfig {
    /// Use the local chain when no public network is selected.
    pub enabled: bool,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// EVM chain id.
    pub chain_id: u64,
    /// Contract deployed on the local chain.
    pub contract_address: String,
}

impl Default for LocalChainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rpc_url: "http://localhost:8545".into(),
            chain_id: 31337,
            contract_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".into(),
        }
    }
}

/// Collection contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Contract address on the public network.
    pub address: String,
    /// Contract shape.
    pub kind: ContractKind,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: "0x2B11c9C19fdAeE8dB3f63b54fbb3077Fb455C683".into(),
            kind: ContractKind::Simple,
        }
    }
}

/// Collection constants used as fallbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NftConfig {
    /// Cap reported when `maxSupply` cannot be read.
    pub max_supply: u64,
    /// Per-wallet limit when the contract does not carry one.
    pub max_per_wallet: u64,
    /// Collection name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
}

impl Default for NftConfig {
    fn default() -> Self {
        Self {
            max_supply: 500,
            max_per_wallet: 1,
            name: "NINJ4".into(),
            symbol: "NINJ4".into(),
        }
    }
}

/// Transport knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Overrides the network preset endpoint.
    pub url: Option<String>,
    /// Wallet JSON-RPC endpoint (signing node or wallet bridge).
    pub wallet_url: Option<String>,
    /// HTTP request timeout.
    pub request_timeout_secs: u64,
    /// Delay between receipt polls.
    pub receipt_poll_interval_ms: u64,
    /// Receipt polls before giving up.
    pub receipt_max_polls: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: None,
            wallet_url: None,
            request_timeout_secs: 30,
            receipt_poll_interval_ms: 1_000,
            receipt_max_polls: 120,
        }
    }
}

/// Ownership scan knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Concurrent `ownerOf` queries per batch.
    pub batch_size: usize,
    /// First token id to scan; unset uses the contract shape's numbering.
    pub first_token_id: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            first_token_id: None,
        }
    }
}

/// Metadata gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpfsConfig {
    /// HTTP gateway used for `ipfs://` URIs.
    pub gateway: String,
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_IPFS_GATEWAY.into(),
        }
    }
}

/// Complete adapter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Selected network.
    pub network: NetworkType,
    /// Local chain settings.
    pub local_chain: LocalChainConfig,
    /// Contract address and shape.
    pub contract: ContractConfig,
    /// Collection fallbacks.
    pub nft: NftConfig,
    /// Transport settings.
    pub rpc: RpcConfig,
    /// Ownership scan settings.
    pub scan: ScanConfig,
    /// IPFS gateway.
    pub ipfs: IpfsConfig,
}

impl AdapterConfig {
    /// Config for tests: local chain, tiny polling interval.
    pub fn for_testing() -> Self {
        Self {
            network: NetworkType::Local,
            local_chain: LocalChainConfig {
                enabled: true,
                chain_id: 1776,
                contract_address: format!("0x{}", "c0".repeat(20)),
                ..LocalChainConfig::default()
            },
            rpc: RpcConfig {
                receipt_poll_interval_ms: 1,
                receipt_max_polls: 5,
                ..RpcConfig::default()
            },
            scan: ScanConfig {
                batch_size: 4,
                first_token_id: None,
            },
            ..Self::default()
        }
    }

    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `NINJ4_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(network) = std::env::var(ENV_NETWORK) {
            self.network = network.parse()?;
        }
        if let Ok(url) = std::env::var(ENV_RPC_URL) {
            if !url.is_empty() {
                self.rpc.url = Some(url);
            }
        }
        if let Ok(address) = std::env::var(ENV_CONTRACT_ADDRESS) {
            if !address.is_empty() {
                if self.uses_local_chain() {
                    self.local_chain.contract_address = address;
                } else {
                    self.contract.address = address;
                }
            }
        }
        if let Ok(url) = std::env::var(ENV_WALLET_URL) {
            if !url.is_empty() {
                self.rpc.wallet_url = Some(url);
            }
        }
        Ok(self)
    }

    /// Check ranges and addresses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.contract_address()?;
        if self.scan.batch_size == 0 {
            return Err(ConfigError::Invalid("scan.batch_size cannot be 0".into()));
        }
        if self.nft.max_per_wallet == 0 {
            return Err(ConfigError::Invalid("nft.max_per_wallet cannot be 0".into()));
        }
        if self.rpc.receipt_max_polls == 0 {
            return Err(ConfigError::Invalid("rpc.receipt_max_polls cannot be 0".into()));
        }
        Ok(())
    }

    /// First token id of the ownership scan.
    pub fn first_token_id(&self) -> u64 {
        self.scan
            .first_token_id
            .unwrap_or_else(|| self.contract.kind.first_token_id())
    }

    /// Public network preset for the selected network, if any.
    pub fn preset(&self) -> Option<ChainPreset> {
        match self.network {
            NetworkType::Testnet => Some(ChainPreset::injective_testnet()),
            NetworkType::Mainnet => Some(ChainPreset::injective_mainnet()),
            NetworkType::Local => None,
        }
    }

    /// Whether reads and writes target the local chain.
    pub fn uses_local_chain(&self) -> bool {
        self.network == NetworkType::Local && self.local_chain.enabled
    }

    /// RPC endpoint: explicit override, then network preset, then local chain.
    pub fn rpc_url(&self) -> Option<String> {
        if let Some(url) = self.rpc.url.as_ref().filter(|u| !u.is_empty()) {
            return Some(url.clone());
        }
        if let Some(preset) = self.preset() {
            return Some(preset.rpc_url);
        }
        self.local_chain
            .enabled
            .then(|| self.local_chain.rpc_url.clone())
    }

    /// Chain id the wallet must be on.
    pub fn chain_id(&self) -> Option<u64> {
        match self.preset() {
            Some(preset) => Some(preset.chain_id),
            None => self.local_chain.enabled.then_some(self.local_chain.chain_id),
        }
    }

    /// Contract address for the selected network.
    pub fn contract_address(&self) -> Result<Address, ConfigError> {
        let (field, raw) = if self.uses_local_chain() {
            ("local_chain.contract_address", &self.local_chain.contract_address)
        } else {
            ("contract.address", &self.contract.address)
        };
        parse_address(raw).ok_or_else(|| ConfigError::InvalidAddress {
            field,
            value: raw.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdapterConfig::default();
        assert_eq!(config.network, NetworkType::Testnet);
        assert_eq!(config.nft.max_supply, 500);
        assert_eq!(config.nft.max_per_wallet, 1);
        assert_eq!(config.scan.batch_size, 50);
        assert_eq!(config.chain_id(), Some(1439));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = AdapterConfig::for_testing();
        assert!(config.uses_local_chain());
        assert_eq!(config.rpc_url().as_deref(), Some("http://localhost:8545"));
        assert_eq!(config.contract_address().unwrap(), Address::repeat_byte(0xc0));
    }

    #[test]
    fn test_local_without_enabled_chain_has_no_rpc() {
        let config = AdapterConfig {
            network: NetworkType::Local,
            ..AdapterConfig::default()
        };
        assert!(config.rpc_url().is_none());
        assert!(config.chain_id().is_none());
    }

    #[test]
    fn test_rpc_override_wins() {
        let mut config = AdapterConfig::default();
        config.rpc.url = Some("http://127.0.0.1:9999".into());
        assert_eq!(config.rpc_url().as_deref(), Some("http://127.0.0.1:9999"));
    }

    #[test]
    fn test_parse_toml() {
        let config = AdapterConfig::parse(
            r#"
            network = "mainnet"

            [contract]
            address = "0x2B11c9C19fdAeE8dB3f63b54fbb3077Fb455C683"
            kind = "drop"

            [scan]
            batch_size = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.network, NetworkType::Mainnet);
        assert_eq!(config.contract.kind, ContractKind::Drop);
        assert_eq!(config.scan.batch_size, 25);
        assert_eq!(config.first_token_id(), 0);
        assert_eq!(config.nft.max_supply, 500);
        assert_eq!(config.chain_id(), Some(1776));
    }

    #[test]
    fn test_first_token_id_override() {
        let mut config = AdapterConfig::default();
        assert_eq!(config.first_token_id(), 1);
        config.contract.kind = ContractKind::Drop;
        assert_eq!(config.first_token_id(), 0);
        config.scan.first_token_id = Some(1);
        assert_eq!(config.first_token_id(), 1);
    }

    #[test]
    fn test_parse_rejects_unknown_network() {
        assert!(matches!(
            AdapterConfig::parse("network = \"devnet\""),
            Err(ConfigError::Parse(_))
        ));
        assert!("devnet".parse::<NetworkType>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_address() {
        let mut config = AdapterConfig::default();
        config.contract.address = "0x1234".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAddress { field: "contract.address", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let mut config = AdapterConfig::default();
        config.scan.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explorer_tx_url() {
        let preset = ChainPreset::injective_testnet();
        assert_eq!(
            preset.tx_url("0xabc"),
            "https://testnet.blockscout.injective.network/tx/0xabc"
        );
    }
}
