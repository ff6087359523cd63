//! # NINJ4 Contracts
//!
//! Read/write access to the NINJ4 NFT collection on Injective EVM.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! The collection has been deployed with two incompatible contract shapes:
//! a bespoke one-per-wallet mint contract and a generic drop contract driven
//! by claim conditions. This crate puts both behind one API:
//! - Collection counters (total minted, max supply, per-wallet limit)
//! - Sale predicate
//! - Mint / claim submission with receipt confirmation
//! - Owned-token enumeration with metadata URIs
//!
//! ## Failure Semantics
//!
//! | Path | On error |
//! |------|----------|
//! | Reads | Fallback value, logged at `warn`, reported as `ReadOutcome::Defaulted` |
//! | Writes | Error returned unchanged, never retried |
//!
//! ## Module Structure
//!
//! ```text
//! ninj4-contracts/
//! ├── domain/          # Entities, value objects, errors, sale rules, invariants
//! ├── abi/             # Solidity ABI codec, selectors, contract function table
//! ├── contracts/       # ContractVariant: Simple and Drop
//! ├── ports/           # CollectionApi (inbound), RpcTransport/WalletProvider/Clock (outbound), MockChain
//! ├── adapters/        # reqwest JSON-RPC transport and wallet, metadata client, system clock
//! ├── application/     # CollectionService orchestrating everything
//! └── config.rs        # AdapterConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod adapters;
pub mod application;
pub mod config;
pub mod contracts;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{HttpRpcTransport, HttpWalletProvider, MetadataClient, SystemClock};
pub use application::{CollectionService, Connector, ReadBinding, WriteBinding};
pub use config::{AdapterConfig, ChainPreset, ConfigError, NetworkType};
pub use contracts::{ContractVariant, DropContract, SimpleContract, SIMPLE_MAX_PER_WALLET};
pub use domain::{
    format_address, parse_address, resolve_ipfs_uri, Address, AllowlistProof,
    ClaimCondition, CollectionState, ContractError, ContractKind, ContractResult, Hash,
    OwnedToken, OwnedTokenDetails, ReadOutcome, SaleStatus, TokenMetadata, TxReceipt, TxRequest,
    DEFAULT_IPFS_GATEWAY, NATIVE_TOKEN, U256,
};
pub use ports::{
    Clock, CollectionApi, FixedClock, MockChain, NoWallet, RpcTransport, WalletProvider,
    MOCK_CHAIN_ID, MOCK_CONTRACT,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
