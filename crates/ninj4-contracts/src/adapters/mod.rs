//! # Adapters
//!
//! Concrete implementations of the outbound ports.
//!
//! - `http_rpc`: reqwest JSON-RPC node transport and wallet provider
//! - `metadata`: token metadata fetcher with IPFS gateway rewriting
//! - `clock`: system clock

pub mod clock;
pub mod http_rpc;
pub mod metadata;

pub use clock::SystemClock;
pub use http_rpc::{HttpRpcTransport, HttpWalletProvider};
pub use metadata::MetadataClient;
