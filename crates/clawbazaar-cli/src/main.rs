// ClawBazaar CLI - command-line interface for the ClawBazaar marketplace

mod api;
mod config;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;
use std::time::Duration;

use clawbazaar_chain::{
    abi, parse_private_key, private_key_to_address, Address, LegacyTransaction, RpcClient, U256,
};

use api::ApiClient;
use config::Config;

/// Gas limit for contract writes. The wrapper is deliberately thin: no
/// estimation round-trip.
const DEFAULT_GAS_LIMIT: u64 = 300_000;

/// How long to wait for a transaction to be mined.
const CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(120);

/// BZAAR token decimals.
const BZAAR_DECIMALS: u32 = 18;

/// ClawBazaar - NFT editions marketplace tool
#[derive(Parser)]
#[command(name = "clawbazaar")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an API key (and optionally a wallet private key) locally
    Login,
    /// Register a new agent and receive an API key
    Register {
        /// Unique handle (lowercase letters, digits, '-', '_')
        handle: String,

        /// Display name shown on the marketplace
        #[arg(long)]
        display_name: Option<String>,

        /// Base wallet address (0x...)
        #[arg(long)]
        wallet: Option<String>,
    },
    /// Create a new edition (off-chain record + metadata for pinning)
    CreateEdition {
        /// Edition title
        title: String,

        /// Image reference (ipfs:// or https://)
        #[arg(long)]
        image_url: String,

        /// Total supply (1-1000)
        #[arg(long)]
        max_supply: u32,

        /// Price per unit in BZAAR (e.g. "25.5")
        #[arg(long)]
        price: String,

        /// Long description
        #[arg(long)]
        description: Option<String>,

        /// Per-wallet mint cap (default 10)
        #[arg(long)]
        max_per_wallet: Option<u32>,

        /// Mint window length in hours (open-ended if omitted)
        #[arg(long)]
        duration_hours: Option<u32>,

        /// Creator royalty in basis points
        #[arg(long)]
        royalty_bps: Option<u32>,
    },
    /// Record the on-chain creation of an edition
    Confirm {
        /// Edition id (UUID from create-edition)
        edition_id: String,

        /// Edition id assigned by the editions contract
        #[arg(long)]
        on_chain_id: u64,

        /// Editions contract address
        #[arg(long)]
        contract: String,

        /// Creation transaction hash
        #[arg(long)]
        tx_hash: String,

        /// Pinned metadata URI
        #[arg(long)]
        metadata_uri: String,
    },
    /// Mint units of an edition (on-chain, then recorded via the API)
    Mint {
        /// Edition id (UUID)
        edition_id: String,

        /// Number of units
        #[arg(long, default_value_t = 1)]
        amount: u32,

        /// Record an already-executed mint instead of sending a transaction
        #[arg(long)]
        tx_hash: Option<String>,
    },
    /// Close an edition early
    Close {
        /// Edition id (UUID)
        edition_id: String,
    },
    /// List editions
    List {
        /// Only active editions
        #[arg(long)]
        active: bool,

        /// Filter by creating agent id
        #[arg(long)]
        agent_id: Option<String>,
    },
    /// Show one edition with its recent mints
    Detail {
        /// Edition id (UUID)
        edition_id: String,
    },
    /// List your own editions
    MyEditions,
    /// Buy a listed token on the marketplace
    Buy {
        /// Marketplace token id
        token_id: u64,
    },
    /// List a token for sale on the marketplace
    ListNft {
        /// Marketplace token id
        token_id: u64,

        /// Asking price in BZAAR
        #[arg(long)]
        price: String,
    },
    /// Approve the marketplace to spend BZAAR
    Approve {
        /// Amount in BZAAR
        amount: String,

        /// Spender (defaults to the marketplace contract)
        #[arg(long)]
        spender: Option<String>,
    },
    /// Show a BZAAR balance
    Balance {
        /// Address to query (defaults to your wallet)
        address: Option<String>,
    },
    /// Manage local configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the current configuration (secrets redacted)
    Show,
    /// Set a field, e.g. `config set rpc_url https://mainnet.base.org`
    Set { field: String, value: String },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Login => handle_login(),
        Commands::Register {
            handle,
            display_name,
            wallet,
        } => handle_register(&handle, display_name.as_deref(), wallet.as_deref()),
        Commands::CreateEdition {
            title,
            image_url,
            max_supply,
            price,
            description,
            max_per_wallet,
            duration_hours,
            royalty_bps,
        } => handle_create_edition(
            &title,
            &image_url,
            max_supply,
            &price,
            description.as_deref(),
            max_per_wallet,
            duration_hours,
            royalty_bps,
        ),
        Commands::Confirm {
            edition_id,
            on_chain_id,
            contract,
            tx_hash,
            metadata_uri,
        } => handle_confirm(&edition_id, on_chain_id, &contract, &tx_hash, &metadata_uri),
        Commands::Mint {
            edition_id,
            amount,
            tx_hash,
        } => handle_mint(&edition_id, amount, tx_hash.as_deref()),
        Commands::Close { edition_id } => handle_close(&edition_id),
        Commands::List { active, agent_id } => handle_list(active, agent_id.as_deref()),
        Commands::Detail { edition_id } => handle_detail(&edition_id),
        Commands::MyEditions => handle_my_editions(),
        Commands::Buy { token_id } => handle_buy(token_id),
        Commands::ListNft { token_id, price } => handle_list_nft(token_id, &price),
        Commands::Approve { amount, spender } => handle_approve(&amount, spender.as_deref()),
        Commands::Balance { address } => handle_balance(address.as_deref()),
        Commands::Config { action } => handle_config(action),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn api_client(config: &Config) -> ApiClient {
    ApiClient::new(config.api_url(), config.api_key.clone())
}

fn handle_login() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = rpassword::prompt_password("API key: ")?;
    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    config.api_key = Some(api_key.trim().to_string());

    let private_key =
        rpassword::prompt_password("Wallet private key (optional, press Enter to skip): ")?;
    if !private_key.trim().is_empty() {
        let key = parse_private_key(private_key.trim())?;
        let wallet = private_key_to_address(&key);
        config.private_key = Some(private_key.trim().to_string());
        config.wallet_address = Some(format!("{wallet}"));
        println!("Wallet: {}", wallet);
    }

    config.save()?;
    println!("{} Credentials saved to {}", "✓".green().bold(), config::config_path()?.display());
    Ok(())
}

fn handle_register(
    handle: &str,
    display_name: Option<&str>,
    wallet: Option<&str>,
) -> Result<()> {
    let mut config = Config::load()?;
    let client = api_client(&config);

    let response = client.register(handle, display_name, wallet)?;
    let api_key = response["api_key"]
        .as_str()
        .context("Response is missing api_key")?
        .to_string();

    config.api_key = Some(api_key.clone());
    config.save()?;

    println!("{} Agent '{}' registered", "✓".green().bold(), handle);
    println!();
    println!("  Agent id: {}", response["agent_id"].as_str().unwrap_or("?"));
    println!("  API key:  {}", api_key);
    println!();
    println!("The key has been saved to your config. It will not be shown again by the server.");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_create_edition(
    title: &str,
    image_url: &str,
    max_supply: u32,
    price: &str,
    description: Option<&str>,
    max_per_wallet: Option<u32>,
    duration_hours: Option<u32>,
    royalty_bps: Option<u32>,
) -> Result<()> {
    let config = Config::load()?;
    let client = api_client(&config);

    let response = client.create_edition(
        title,
        image_url,
        max_supply,
        price,
        description,
        max_per_wallet,
        duration_hours,
        royalty_bps,
    )?;

    println!("{} Edition created", "✓".green().bold());
    println!();
    println!("  Edition id: {}", response["edition_id"].as_str().unwrap_or("?"));
    println!("  Creator:    {}", response["creator_wallet"].as_str().unwrap_or("?"));
    println!();
    println!("Metadata for pinning:");
    println!("{}", serde_json::to_string_pretty(&response["metadata"])?);
    println!();
    println!(
        "Next: pin the metadata, create the edition on-chain, then run\n\
         'clawbazaar confirm <edition_id> --on-chain-id ... --contract ... \
         --tx-hash ... --metadata-uri ...'"
    );
    Ok(())
}

fn handle_confirm(
    edition_id: &str,
    on_chain_id: u64,
    contract: &str,
    tx_hash: &str,
    metadata_uri: &str,
) -> Result<()> {
    let config = Config::load()?;
    let client = api_client(&config);

    let response =
        client.confirm_edition(edition_id, on_chain_id, contract, tx_hash, metadata_uri)?;

    println!(
        "{} {}",
        "✓".green().bold(),
        response["message"].as_str().unwrap_or("Edition confirmed")
    );
    println!("  On-chain id: {}", on_chain_id);
    Ok(())
}

fn handle_mint(edition_id: &str, amount: u32, tx_hash: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let client = api_client(&config);

    let tx_hash = match tx_hash {
        Some(h) => h.to_string(),
        None => mint_on_chain(&config, &client, edition_id, amount)?,
    };

    let response = client.mint(edition_id, amount, &tx_hash)?;

    println!("{} Minted {} unit(s)", "✓".green().bold(), amount);
    println!();
    println!("  Edition numbers: {}", response["edition_numbers"]);
    println!(
        "  Supply:          {}/{} minted, {} remaining",
        response["total_minted"],
        response["total_minted"].as_i64().unwrap_or(0)
            + response["remaining"].as_i64().unwrap_or(0),
        response["remaining"]
    );
    Ok(())
}

/// Executes the on-chain leg of a mint: looks up the edition's contract
/// linkage, sends mintEdition, and waits for confirmation.
fn mint_on_chain(
    config: &Config,
    client: &ApiClient,
    edition_id: &str,
    amount: u32,
) -> Result<String> {
    let detail = client.edition_detail(edition_id)?;
    let edition = &detail["edition"];

    let on_chain_id = edition["edition_id_on_chain"]
        .as_u64()
        .context("Edition is not confirmed on-chain yet; mint after the creator confirms it")?;
    let contract = edition["contract_address"]
        .as_str()
        .context("Edition has no contract address")?;

    println!(
        "Minting {} of on-chain edition {} at {}...",
        amount,
        on_chain_id,
        truncate_middle(contract)
    );

    let data = abi::mint_edition(on_chain_id, u64::from(amount));
    send_contract_tx(config, contract, data)
}

fn handle_close(edition_id: &str) -> Result<()> {
    let config = Config::load()?;
    let client = api_client(&config);

    let response = client.close_edition(edition_id)?;
    println!(
        "{} {}",
        "✓".green().bold(),
        response["message"].as_str().unwrap_or("Edition closed")
    );
    Ok(())
}

fn handle_list(active: bool, agent_id: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let client = api_client(&config);

    let response = client.list_editions(if active { Some(true) } else { None }, agent_id)?;
    print_editions(&response["editions"]);
    Ok(())
}

fn handle_detail(edition_id: &str) -> Result<()> {
    let config = Config::load()?;
    let client = api_client(&config);

    let response = client.edition_detail(edition_id)?;
    let edition = &response["edition"];

    println!("{}", edition["title"].as_str().unwrap_or("?").bold());
    if let Some(desc) = edition["description"].as_str() {
        println!("{}", desc.dimmed());
    }
    println!();
    println!("  Creator:   {}", edition["creator_handle"].as_str().unwrap_or("?"));
    println!(
        "  Supply:    {}/{} minted",
        edition["total_minted"], edition["max_supply"]
    );
    println!("  Price:     {} BZAAR", edition["price_bzaar"].as_str().unwrap_or("?"));
    println!("  Active:    {}", edition["is_active"]);
    match edition["edition_id_on_chain"].as_u64() {
        Some(id) => println!("  On-chain:  #{}", id),
        None => println!("  On-chain:  {}", "unconfirmed".yellow()),
    }

    let mints = response["recent_mints"].as_array().cloned().unwrap_or_default();
    if !mints.is_empty() {
        println!();
        println!("Recent mints:");
        for mint in &mints {
            println!(
                "  #{:<4} {} by {}",
                mint["edition_number"],
                truncate_middle(mint["tx_hash"].as_str().unwrap_or("?")),
                mint["minter_handle"].as_str().unwrap_or("?")
            );
        }
    }
    Ok(())
}

fn handle_my_editions() -> Result<()> {
    let config = Config::load()?;
    let client = api_client(&config);

    let response = client.my_editions()?;
    print_editions(&response["editions"]);
    Ok(())
}

fn handle_buy(token_id: u64) -> Result<()> {
    let config = Config::load()?;
    let marketplace = config.require_contract("marketplace_contract")?.to_string();

    let tx_hash = send_contract_tx(&config, &marketplace, abi::buy_item(token_id))?;
    println!("{} Bought token #{} ({})", "✓".green().bold(), token_id, truncate_middle(&tx_hash));
    Ok(())
}

fn handle_list_nft(token_id: u64, price: &str) -> Result<()> {
    let config = Config::load()?;
    let marketplace = config.require_contract("marketplace_contract")?.to_string();
    let price_wei = to_wei(price)?;

    let tx_hash = send_contract_tx(&config, &marketplace, abi::list_item(token_id, price_wei))?;
    println!(
        "{} Listed token #{} for {} BZAAR ({})",
        "✓".green().bold(),
        token_id,
        price,
        truncate_middle(&tx_hash)
    );
    Ok(())
}

fn handle_approve(amount: &str, spender: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let token = config.require_contract("bzaar_token")?.to_string();
    let spender = match spender {
        Some(s) => s.to_string(),
        None => config.require_contract("marketplace_contract")?.to_string(),
    };
    let spender_addr = parse_address(&spender)?;
    let amount_wei = to_wei(amount)?;

    let tx_hash = send_contract_tx(&config, &token, abi::approve(spender_addr, amount_wei))?;
    println!(
        "{} Approved {} BZAAR for {} ({})",
        "✓".green().bold(),
        amount,
        truncate_middle(&spender),
        truncate_middle(&tx_hash)
    );
    Ok(())
}

fn handle_balance(address: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let token = config.require_contract("bzaar_token")?.to_string();

    let address = match address {
        Some(a) => a.to_string(),
        None => config
            .wallet_address
            .clone()
            .context("No wallet configured; pass an address or run 'clawbazaar login'")?,
    };

    let rpc = RpcClient::new(config.rpc_url());
    let result = rpc.eth_call(parse_address(&token)?, &abi::balance_of(parse_address(&address)?))?;
    let balance = abi::decode_u256(&result)?;

    println!("{}: {} BZAAR", address, from_wei(balance));
    Ok(())
}

fn handle_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("Config file: {}", config::config_path()?.display());
            println!();
            println!("  api_url:              {}", config.api_url());
            println!("  api_key:              {}", redact(config.api_key.as_deref()));
            println!("  rpc_url:              {}", config.rpc_url());
            println!("  chain_id:             {}", config.chain_id());
            println!("  private_key:          {}", redact(config.private_key.as_deref()));
            println!("  wallet_address:       {}", config.wallet_address.as_deref().unwrap_or("(unset)"));
            println!("  editions_contract:    {}", config.editions_contract.as_deref().unwrap_or("(unset)"));
            println!("  marketplace_contract: {}", config.marketplace_contract.as_deref().unwrap_or("(unset)"));
            println!("  bzaar_token:          {}", config.bzaar_token.as_deref().unwrap_or("(unset)"));
            Ok(())
        }
        ConfigAction::Set { field, value } => {
            if !config::is_known_field(&field) {
                return Err(anyhow!("Unknown config field '{}'", field));
            }
            let mut config = Config::load()?;
            config.set_field(&field, &value);
            config.save()?;
            println!("{} {} updated", "✓".green().bold(), field);
            Ok(())
        }
    }
}

/// Signs and submits a contract call, waits for confirmation, and returns
/// the transaction hash.
fn send_contract_tx(config: &Config, to: &str, data: Vec<u8>) -> Result<String> {
    let key = parse_private_key(config.require_private_key()?)?;
    let from = private_key_to_address(&key);
    let rpc = RpcClient::new(config.rpc_url());

    let tx = LegacyTransaction {
        nonce: rpc.transaction_count(from)?,
        gas_price: rpc.gas_price()?,
        gas_limit: DEFAULT_GAS_LIMIT,
        to: parse_address(to)?,
        value: U256::ZERO,
        data,
        chain_id: config.chain_id(),
    };

    let signed = tx.sign(&key)?;
    let tx_hash = rpc.send_raw_transaction(&signed)?;
    println!("  Submitted {}", truncate_middle(&tx_hash));

    let receipt = rpc.wait_for_receipt(&tx_hash, CONFIRMATION_TIMEOUT)?;
    println!(
        "  Confirmed in block {}",
        receipt.block_number.as_deref().unwrap_or("?")
    );
    Ok(tx_hash)
}

fn parse_address(value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .map_err(|e| anyhow!("Invalid address '{}': {}", value, e))
}

/// Parses a decimal BZAAR amount ("1.5") into 18-decimal token units.
fn to_wei(amount: &str) -> Result<U256> {
    let amount = amount.trim();
    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(anyhow!("Invalid amount '{}'", amount));
    }
    if frac.len() > BZAAR_DECIMALS as usize {
        return Err(anyhow!(
            "Amount '{}' has more than {} decimal places",
            amount,
            BZAAR_DECIMALS
        ));
    }
    let whole: U256 = if whole.is_empty() {
        U256::ZERO
    } else {
        whole
            .parse()
            .map_err(|_| anyhow!("Invalid amount '{}'", amount))?
    };
    let mut frac_units = U256::ZERO;
    if !frac.is_empty() {
        let padded = format!("{:0<width$}", frac, width = BZAAR_DECIMALS as usize);
        frac_units = padded
            .parse()
            .map_err(|_| anyhow!("Invalid amount '{}'", amount))?;
    }
    let scale = U256::from(10u64).pow(U256::from(BZAAR_DECIMALS));
    Ok(whole * scale + frac_units)
}

/// Formats 18-decimal token units as a decimal string, trimming trailing
/// zeros.
fn from_wei(units: U256) -> String {
    let scale = U256::from(10u64).pow(U256::from(BZAAR_DECIMALS));
    let whole = units / scale;
    let frac = units % scale;
    if frac.is_zero() {
        return whole.to_string();
    }
    let frac_str = format!("{:0>width$}", frac, width = BZAAR_DECIMALS as usize);
    format!("{}.{}", whole, frac_str.trim_end_matches('0'))
}

/// Truncates a hash or address for readability: "0x1234...abcd".
fn truncate_middle(value: &str) -> String {
    if value.len() <= 14 {
        return value.to_string();
    }
    format!("{}...{}", &value[..8], &value[value.len() - 4..])
}

fn redact(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => {
            let head: String = v.chars().take(6).collect();
            format!("{}... (set)", head)
        }
        _ => "(unset)".to_string(),
    }
}

fn print_editions(editions: &Value) {
    let editions = editions.as_array().cloned().unwrap_or_default();
    if editions.is_empty() {
        println!("No editions found.");
        return;
    }
    for edition in &editions {
        let status = if edition["is_active"].as_bool().unwrap_or(false) {
            "active".green()
        } else {
            "closed".dimmed()
        };
        println!(
            "{}  {:<32} {:>4}/{:<4} {:>10} BZAAR  [{}]",
            edition["id"].as_str().unwrap_or("?"),
            edition["title"].as_str().unwrap_or("?"),
            edition["total_minted"],
            edition["max_supply"],
            edition["price_bzaar"].as_str().unwrap_or("?"),
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_wei_whole() {
        assert_eq!(to_wei("1").unwrap(), U256::from(10u64).pow(U256::from(18u64)));
        assert_eq!(to_wei("0").unwrap(), U256::ZERO);
    }

    #[test]
    fn test_to_wei_fractional() {
        assert_eq!(
            to_wei("1.5").unwrap(),
            U256::from(1_500_000_000_000_000_000u64)
        );
        assert_eq!(to_wei("0.000000000000000001").unwrap(), U256::from(1u64));
        assert_eq!(to_wei(".5").unwrap(), U256::from(500_000_000_000_000_000u64));
    }

    #[test]
    fn test_to_wei_rejects_garbage() {
        assert!(to_wei("").is_err());
        assert!(to_wei(".").is_err());
        assert!(to_wei("abc").is_err());
        assert!(to_wei("1.0000000000000000001").is_err()); // 19 decimals
    }

    #[test]
    fn test_from_wei() {
        assert_eq!(from_wei(U256::ZERO), "0");
        assert_eq!(from_wei(U256::from(1_500_000_000_000_000_000u64)), "1.5");
        assert_eq!(
            from_wei(U256::from(10u64).pow(U256::from(18u64))),
            "1"
        );
        assert_eq!(from_wei(U256::from(1u64)), "0.000000000000000001");
    }

    #[test]
    fn test_wei_roundtrip_of_price_strings() {
        for s in ["25.5", "0.01", "1000"] {
            assert_eq!(from_wei(to_wei(s).unwrap()), s);
        }
    }

    #[test]
    fn test_truncate_middle() {
        let hash = format!("0x{}", "ab".repeat(32));
        let short = truncate_middle(&hash);
        assert!(short.starts_with("0xababab"));
        assert!(short.contains("..."));
        assert_eq!(truncate_middle("0xshort"), "0xshort");
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact(None), "(unset)");
        assert_eq!(redact(Some("")), "(unset)");
        let r = redact(Some("bzr_secretsecret"));
        assert!(r.starts_with("bzr_se"));
        assert!(!r.contains("secretsecret"));
    }

    #[test]
    fn test_redact_multibyte_values() {
        // Values are not guaranteed to be ASCII; redaction must not split
        // a character.
        assert_eq!(redact(Some("ключ-секрет")), "ключ-с... (set)");
        assert_eq!(redact(Some("鍵")), "鍵... (set)");
    }
}
