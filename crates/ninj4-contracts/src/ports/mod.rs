//! # Ports
//!
//! Inbound API trait and outbound dependency traits, plus an in-memory
//! chain implementing the outbound side for tests and demos.

pub mod inbound;
pub mod mock;
pub mod outbound;

pub use inbound::CollectionApi;
pub use mock::{MockChain, MockChainState, MOCK_CHAIN_ID, MOCK_CONTRACT};
pub use outbound::{Clock, FixedClock, NoWallet, RpcTransport, WalletProvider};
