//! Token metadata over HTTP, with `ipfs://` URIs routed through a gateway.

use std::time::Duration;

use tracing::warn;

use crate::config::AdapterConfig;
use crate::domain::{
    resolve_ipfs_uri, ContractError, ContractResult, OwnedToken, OwnedTokenDetails, TokenMetadata,
};

/// Fetches and decodes ERC-721 metadata JSON.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http_client: reqwest::Client,
    gateway: String,
}

impl MetadataClient {
    /// Client resolving `ipfs://` through `gateway`.
    pub fn new(gateway: impl Into<String>, timeout_secs: u64) -> ContractResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ContractError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http_client,
            gateway: gateway.into(),
        })
    }

    /// Client using `ipfs.gateway` and `rpc.request_timeout_secs`.
    pub fn from_config(config: &AdapterConfig) -> ContractResult<Self> {
        Self::new(config.ipfs.gateway.clone(), config.rpc.request_timeout_secs)
    }

    /// Gateway in use.
    pub fn gateway(&self) -> &str {
        &self.gateway
    }

    /// HTTP URL for a token or image URI.
    pub fn resolve(&self, uri: &str) -> String {
        resolve_ipfs_uri(uri, &self.gateway)
    }

    /// GET and decode the metadata document at `token_uri`.
    pub async fn fetch(&self, token_uri: &str) -> ContractResult<TokenMetadata> {
        let url = self.resolve(token_uri);
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ContractError::Transport(format!("failed to fetch {url}: {e}")))?;
        if !response.status().is_success() {
            return Err(ContractError::Transport(format!(
                "metadata request to {url} returned {}",
                response.status()
            )));
        }
        response
            .json::<TokenMetadata>()
            .await
            .map_err(|e| ContractError::Abi(format!("invalid metadata at {url}: {e}")))
    }

    /// Token joined with its metadata; a failed fetch leaves `metadata` empty.
    pub async fn details(&self, token: OwnedToken) -> OwnedTokenDetails {
        if token.token_uri.is_empty() {
            return OwnedTokenDetails {
                token,
                metadata: None,
                image_url: None,
            };
        }
        match self.fetch(&token.token_uri).await {
            Ok(metadata) => {
                let image_url = metadata.image.as_deref().map(|img| self.resolve(img));
                OwnedTokenDetails {
                    token,
                    metadata: Some(metadata),
                    image_url,
                }
            }
            Err(e) => {
                warn!("[ninj4] Metadata for token #{} unavailable: {}", token.token_id, e);
                OwnedTokenDetails {
                    token,
                    metadata: None,
                    image_url: None,
                }
            }
        }
    }
}
