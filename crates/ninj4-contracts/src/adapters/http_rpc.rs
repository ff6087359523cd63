//! JSON-RPC over HTTP for the node and the wallet endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::AdapterConfig;
use crate::domain::{
    format_address, parse_address, Address, ContractError, ContractResult, Hash, TxReceipt,
    TxRequest, U256,
};
use crate::ports::{RpcTransport, WalletProvider};

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Receipt as returned by `eth_getTransactionReceipt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReceipt {
    transaction_hash: String,
    block_number: Option<String>,
    status: Option<String>,
    gas_used: Option<String>,
    from: String,
    to: Option<String>,
}

impl RawReceipt {
    fn into_receipt(self) -> ContractResult<TxReceipt> {
        Ok(TxReceipt {
            transaction_hash: parse_hash(&self.transaction_hash)?,
            block_number: self.block_number.as_deref().map(parse_hex_u64).transpose()?.unwrap_or(0),
            status: self.status.as_deref().map(parse_hex_u64).transpose()? == Some(1),
            gas_used: self.gas_used.as_deref().map(parse_hex_u256).transpose()?.unwrap_or_default(),
            from: parse_rpc_address(&self.from)?,
            to: self.to.as_deref().map(parse_rpc_address).transpose()?,
        })
    }
}

/// Shared JSON-RPC 2.0 client.
#[derive(Debug)]
struct JsonRpcClient {
    http_client: reqwest::Client,
    url: String,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    fn new(url: String, timeout_secs: u64) -> ContractResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ContractError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http_client,
            url,
            request_id: AtomicU64::new(1),
        })
    }

    async fn request<P: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> ContractResult<Option<R>> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };
        debug!("[ninj4] {} #{} -> {}", method, id, self.url);

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ContractError::Transport(format!("failed to send {method}: {e}")))?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| ContractError::Transport(format!("failed to parse {method} response: {e}")))?;

        if let Some(error) = rpc_response.error {
            return Err(ContractError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(rpc_response.result)
    }

    async fn call<P: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> ContractResult<R> {
        self.request(method, params)
            .await?
            .ok_or_else(|| ContractError::Transport(format!("{method} response missing result")))
    }
}

/// Read-only node connection.
#[derive(Debug, Clone)]
pub struct HttpRpcTransport {
    client: Arc<JsonRpcClient>,
}

impl HttpRpcTransport {
    /// Connect to `url`.
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> ContractResult<Self> {
        Ok(Self {
            client: Arc::new(JsonRpcClient::new(url.into(), timeout_secs)?),
        })
    }

    /// Connect to the endpoint selected by `config`.
    pub fn from_config(config: &AdapterConfig) -> ContractResult<Self> {
        let url = config.rpc_url().ok_or(ContractError::RpcNotConfigured)?;
        Self::new(url, config.rpc.request_timeout_secs)
    }
}

#[async_trait]
impl RpcTransport for HttpRpcTransport {
    async fn call(&self, to: Address, data: Vec<u8>) -> ContractResult<Vec<u8>> {
        let params = json!([
            { "to": format_address(&to), "data": format!("0x{}", hex::encode(&data)) },
            "latest"
        ]);
        let result: String = self.client.call("eth_call", params).await?;
        parse_hex_bytes(&result)
    }

    async fn chain_id(&self) -> ContractResult<u64> {
        let result: String = self.client.call("eth_chainId", Vec::<()>::new()).await?;
        parse_hex_u64(&result)
    }

    async fn block_number(&self) -> ContractResult<u64> {
        let result: String = self.client.call("eth_blockNumber", Vec::<()>::new()).await?;
        parse_hex_u64(&result)
    }

    async fn transaction_receipt(&self, hash: Hash) -> ContractResult<Option<TxReceipt>> {
        let raw: Option<RawReceipt> = self
            .client
            .request("eth_getTransactionReceipt", [format!("{hash:#x}")])
            .await?;
        raw.map(RawReceipt::into_receipt).transpose()
    }

    fn endpoint(&self) -> &str {
        &self.client.url
    }
}

/// Wallet reached over JSON-RPC (signing node or wallet bridge). Without
/// an endpoint every call fails with `NoWalletProvider`.
#[derive(Debug, Clone)]
pub struct HttpWalletProvider {
    client: Option<Arc<JsonRpcClient>>,
}

impl HttpWalletProvider {
    /// Wallet at `url`.
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> ContractResult<Self> {
        Ok(Self {
            client: Some(Arc::new(JsonRpcClient::new(url.into(), timeout_secs)?)),
        })
    }

    /// Wallet from `rpc.wallet_url`, absent when unset.
    pub fn from_config(config: &AdapterConfig) -> ContractResult<Self> {
        match config.rpc.wallet_url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => Self::new(url, config.rpc.request_timeout_secs),
            None => Ok(Self { client: None }),
        }
    }

    /// Whether a wallet endpoint is configured.
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> ContractResult<&JsonRpcClient> {
        self.client.as_deref().ok_or(ContractError::NoWalletProvider)
    }
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn accounts(&self) -> ContractResult<Vec<Address>> {
        let accounts: Vec<String> = self.client()?.call("eth_accounts", Vec::<()>::new()).await?;
        accounts.iter().map(|a| parse_rpc_address(a)).collect()
    }

    async fn chain_id(&self) -> ContractResult<u64> {
        let result: String = self.client()?.call("eth_chainId", Vec::<()>::new()).await?;
        parse_hex_u64(&result)
    }

    async fn send_transaction(&self, tx: &TxRequest) -> ContractResult<Hash> {
        let result: String = self
            .client()?
            .call("eth_sendTransaction", [transaction_object(tx)])
            .await
            .map_err(|e| match e {
                ContractError::Rpc { code, message } => {
                    ContractError::TransactionRejected(format!("{message} (code {code})"))
                }
                other => other,
            })?;
        parse_hash(&result)
    }
}

/// `eth_sendTransaction` parameter object.
fn transaction_object(tx: &TxRequest) -> serde_json::Value {
    json!({
        "from": format_address(&tx.from),
        "to": format_address(&tx.to),
        "data": format!("0x{}", hex::encode(&tx.data)),
        "value": format!("0x{:x}", tx.value),
    })
}

// =============================================================================
// HEX HELPERS
// =============================================================================

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// Parse a `0x` quantity.
pub fn parse_hex_u64(s: &str) -> ContractResult<u64> {
    let digits = strip_hex_prefix(s);
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| ContractError::Transport(format!("invalid hex quantity '{s}': {e}")))
}

fn parse_hex_u256(s: &str) -> ContractResult<U256> {
    let digits = strip_hex_prefix(s);
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| ContractError::Transport(format!("invalid hex quantity '{s}': {e:?}")))
}

/// Parse `0x` data.
pub fn parse_hex_bytes(s: &str) -> ContractResult<Vec<u8>> {
    hex::decode(strip_hex_prefix(s))
        .map_err(|e| ContractError::Transport(format!("invalid hex data: {e}")))
}

fn parse_hash(s: &str) -> ContractResult<Hash> {
    let bytes = parse_hex_bytes(s)?;
    if bytes.len() != 32 {
        return Err(ContractError::Transport(format!("invalid transaction hash '{s}'")));
    }
    Ok(Hash::from_slice(&bytes))
}

fn parse_rpc_address(s: &str) -> ContractResult<Address> {
    parse_address(s).ok_or_else(|| ContractError::Transport(format!("invalid address '{s}'")))
}
