//! Contract bindings held by the service.
//!
//! The read binding is created once and never depends on a wallet. The
//! write binding is a snapshot of the wallet session and is replaced, not
//! mutated, whenever the connected account changes.

use crate::contracts::ContractVariant;
use crate::domain::Address;
use crate::ports::RpcTransport;

/// Read-only connection: node transport plus the bound contract.
#[derive(Debug)]
pub struct ReadBinding<R> {
    /// Node connection.
    pub transport: R,
    /// Contract shape and address.
    pub variant: ContractVariant,
}

impl<R: RpcTransport> ReadBinding<R> {
    /// Transport as a trait object for contract calls.
    pub fn rpc(&self) -> &dyn RpcTransport {
        &self.transport
    }
}

/// Wallet session the write path is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteBinding {
    /// Connected account; signs and pays for mints.
    pub account: Address,
    /// Chain the wallet was on when the binding was made.
    pub chain_id: u64,
}
