//! NINJ4 Terminal
//!
//! Command-line front-end for the NINJ4 collection: stats, sale status,
//! owned tokens with metadata, and minting through a wallet endpoint.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ninj4_contracts::{
    parse_address, AdapterConfig, Address, CollectionApi, CollectionService, ContractKind,
    MetadataClient, NetworkType, SaleStatus,
};

/// NINJ4 collection terminal
#[derive(Parser, Debug)]
#[command(name = "ninj4")]
#[command(about = "Stats, minting and owned tokens for the NINJ4 collection")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "NINJ4_CONFIG")]
    config: Option<PathBuf>,

    /// Network: local, testnet or mainnet
    #[arg(short, long)]
    network: Option<NetworkType>,

    /// JSON-RPC endpoint, overrides the network preset
    #[arg(long)]
    rpc_url: Option<String>,

    /// Collection contract address
    #[arg(long)]
    contract: Option<String>,

    /// Contract shape
    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// Wallet JSON-RPC endpoint used to sign and send mints
    #[arg(long)]
    wallet_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Simple,
    Drop,
}

impl From<KindArg> for ContractKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Simple => ContractKind::Simple,
            KindArg::Drop => ContractKind::Drop,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collection counters
    Stats,
    /// Sale phase and active claim condition
    Status,
    /// Token ids held by an address (full ownership scan)
    Owned {
        /// Owner address
        address: String,
    },
    /// Tokens held by an address with their URIs
    Tokens {
        /// Owner address
        address: String,
        /// Fetch each token's metadata document
        #[arg(long)]
        metadata: bool,
    },
    /// Mint with the connected wallet account
    Mint {
        /// Tokens to mint
        #[arg(short, long, default_value_t = 1)]
        quantity: u64,
    },
    /// Metadata document of one token
    Metadata {
        /// Token id
        token_id: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        "[ninj4] {} contract on {:?} ({})",
        config.contract.kind,
        config.network,
        config.rpc_url().unwrap_or_else(|| "no RPC".into())
    );

    let service = CollectionService::from_config(config.clone())
        .context("Failed to set up collection service")?;

    match args.command {
        Command::Stats => {
            stats(&service).await;
            match service.latest_block().await {
                Ok(block) => println!("Chain head:     {block}"),
                Err(e) => warn!("[ninj4] Failed to read block height: {}", e),
            }
        }
        Command::Status => status(&service).await?,
        Command::Owned { address } => {
            let owner = owner_arg(&address)?;
            let ids = service.get_user_nfts(owner).await;
            if ids.is_empty() {
                println!("No NINJ4 tokens held by {address}");
            } else {
                let list: Vec<String> = ids.iter().map(|id| format!("#{id}")).collect();
                println!("{} token(s): {}", ids.len(), list.join(", "));
            }
        }
        Command::Tokens { address, metadata } => {
            let owner = owner_arg(&address)?;
            tokens(&service, &config, owner, metadata).await?;
        }
        Command::Mint { quantity } => mint(&service, &config, quantity).await?,
        Command::Metadata { token_id } => {
            let uri = service.get_token_uri(token_id).await;
            anyhow::ensure!(!uri.is_empty(), "Token #{token_id} has no URI (not minted?)");
            let client = MetadataClient::from_config(&config)?;
            let metadata = client
                .fetch(&uri)
                .await
                .with_context(|| format!("Failed to fetch metadata for token #{token_id}"))?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
    }

    Ok(())
}

/// Config file (or defaults), then `NINJ4_*` variables, then flags.
fn load_config(args: &Args) -> Result<AdapterConfig> {
    let config = match &args.config {
        Some(path) => AdapterConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AdapterConfig::default(),
    };
    let mut config = config.with_env_overrides()?;

    if let Some(network) = args.network {
        config.network = network;
        if network == NetworkType::Local {
            config.local_chain.enabled = true;
        }
    }
    if let Some(url) = &args.rpc_url {
        config.rpc.url = Some(url.clone());
    }
    if let Some(address) = &args.contract {
        if config.uses_local_chain() {
            config.local_chain.contract_address = address.clone();
        } else {
            config.contract.address = address.clone();
        }
    }
    if let Some(kind) = args.kind {
        config.contract.kind = kind.into();
    }
    if let Some(url) = &args.wallet_url {
        config.rpc.wallet_url = Some(url.clone());
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn owner_arg(address: &str) -> Result<Address> {
    parse_address(address).with_context(|| format!("'{address}' is not a valid address"))
}

async fn stats<S: CollectionApi>(service: &S) {
    let state = service.collection_state().await;
    println!("Minted:         {} / {}", state.total_minted, state.max_supply);
    if let Some(remaining) = state.remaining() {
        println!("Remaining:      {remaining}");
    }
    println!("Per wallet:     {}", state.max_per_wallet);
    println!("Mint active:    {}", if state.sale_active { "yes" } else { "no" });
}

async fn status<S: CollectionApi>(service: &S) -> Result<()> {
    let sale = service.sale_status().await;
    println!("Sale: {sale}");
    if let Some(condition) = service.get_active_claim_condition().await? {
        println!("Starts at:      {}", condition.start_timestamp);
        println!("Claimed:        {} / {}", condition.supply_claimed, condition.max_claimable_supply);
        println!("Price:          {} (currency {:#x})", condition.price_per_token, condition.currency);
        println!("Wallet limit:   {}", condition.quantity_limit_per_wallet);
    } else if sale == SaleStatus::NotStarted {
        println!("No active claim condition");
    }
    Ok(())
}

async fn tokens<R, W, C>(
    service: &CollectionService<R, W, C>,
    config: &AdapterConfig,
    owner: Address,
    with_metadata: bool,
) -> Result<()>
where
    R: ninj4_contracts::RpcTransport + 'static,
    W: ninj4_contracts::WalletProvider,
    C: ninj4_contracts::Clock,
{
    if !with_metadata {
        for token in service.get_owner_tokens_with_uri(owner).await {
            println!("#{:<6} {}", token.token_id, token.token_uri);
        }
        return Ok(());
    }

    let client = MetadataClient::from_config(config)?;
    for details in service.owned_tokens_with_metadata(owner, &client).await {
        let tier = details
            .metadata
            .as_ref()
            .and_then(|m| m.tier())
            .unwrap_or("-");
        println!(
            "#{:<6} {:<20} {:<10} {}",
            details.token.token_id,
            details.name(),
            tier,
            details.image_url.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn mint<R, W, C>(
    service: &CollectionService<R, W, C>,
    config: &AdapterConfig,
    quantity: u64,
) -> Result<()>
where
    R: ninj4_contracts::RpcTransport + 'static,
    W: ninj4_contracts::WalletProvider,
    C: ninj4_contracts::Clock,
{
    match service.mint_checked(quantity).await {
        Ok(receipt) => {
            let hash = format!("{:#x}", receipt.transaction_hash);
            println!("Minted in block {}: {}", receipt.block_number, hash);
            if let Some(preset) = config.preset() {
                println!("{}", preset.tx_url(&hash));
            }
            Ok(())
        }
        Err(e) => {
            let mut message = e.user_message();
            if !e.is_pre_submission() {
                message.push_str(" The transaction may already be on chain; check your wallet before retrying.");
            }
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mint_command() {
        let args = Args::try_parse_from(["ninj4", "--kind", "drop", "mint", "-q", "2"]).unwrap();
        assert!(matches!(args.command, Command::Mint { quantity: 2 }));
        assert!(matches!(args.kind, Some(KindArg::Drop)));
    }

    #[test]
    fn test_parse_network_flag() {
        let args = Args::try_parse_from(["ninj4", "--network", "mainnet", "stats"]).unwrap();
        assert_eq!(args.network, Some(NetworkType::Mainnet));
        assert!(Args::try_parse_from(["ninj4", "--network", "devnet", "stats"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "ninj4",
            "--network",
            "local",
            "--contract",
            "0x1111111111111111111111111111111111111111",
            "--kind",
            "drop",
            "stats",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert!(config.uses_local_chain());
        assert_eq!(config.contract.kind, ContractKind::Drop);
        assert_eq!(
            config.contract_address().unwrap(),
            Address::repeat_byte(0x11)
        );
    }

    #[test]
    fn test_status_against_mock_chain() {
        use ninj4_contracts::{FixedClock, MockChain};

        let chain = MockChain::simple();
        let service = CollectionService::with_transport(
            AdapterConfig::for_testing(),
            chain.clone(),
            chain,
            FixedClock(1_700_000_000),
        );
        tokio_test::assert_ok!(tokio_test::block_on(status(&service)));
    }

    #[test]
    fn test_mint_error_after_broadcast_warns_about_retry() {
        use ninj4_contracts::{FixedClock, MockChain};

        let chain = MockChain::simple();
        chain.connect(Address::repeat_byte(0x21));
        chain.state().failing_receipt_polls = 100;
        let config = AdapterConfig::for_testing();
        let service = CollectionService::with_transport(
            config.clone(),
            chain.clone(),
            chain.clone(),
            FixedClock(1_700_000_000),
        );

        let err = tokio_test::block_on(mint(&service, &config, 1)).unwrap_err();
        assert!(err.to_string().contains("may already be on chain"));

        let err = tokio_test::block_on(mint(&service, &config, 2)).unwrap_err();
        assert!(!err.to_string().contains("may already be on chain"));
        assert_eq!(chain.sent_transactions().len(), 1);
    }

    #[test]
    fn test_owner_arg_rejects_garbage() {
        assert!(owner_arg("0x1234").is_err());
        assert!(owner_arg("0x1111111111111111111111111111111111111111").is_ok());
    }
}
