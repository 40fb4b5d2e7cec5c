// Config module - local key-value store for credentials and endpoints.
// File values live in ~/.clawbazaar/config.json; CLAWBAZAAR_* environment
// variables override stored values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default hosted API base URL.
pub const DEFAULT_API_URL: &str = "https://api.clawbazaar.art";

/// Default Base RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://mainnet.base.org";

/// Base mainnet chain id.
pub const DEFAULT_CHAIN_ID: u64 = 8453;

/// Stored configuration. Every field is optional in the file; accessors
/// apply defaults or fail with a pointer at the fix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub rpc_url: Option<String>,
    pub chain_id: Option<u64>,
    pub private_key: Option<String>,
    pub wallet_address: Option<String>,
    pub editions_contract: Option<String>,
    pub marketplace_contract: Option<String>,
    pub bzaar_token: Option<String>,
}

/// (field, environment variable) pairs, env wins over the file.
const ENV_OVERRIDES: &[&str] = &[
    "api_url",
    "api_key",
    "rpc_url",
    "chain_id",
    "private_key",
    "wallet_address",
    "editions_contract",
    "marketplace_contract",
    "bzaar_token",
];

impl Config {
    /// Loads the config file (if any) and applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match std::fs::read_to_string(config_path()?) {
            Ok(content) => serde_json::from_str(&content)
                .context("Failed to parse config file; fix or delete it")?,
            Err(_) => Config::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Applies overrides from a lookup function. The lookup receives names
    /// like `CLAWBAZAAR_API_KEY`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for field in ENV_OVERRIDES {
            let var = format!("CLAWBAZAAR_{}", field.to_uppercase());
            if let Some(value) = lookup(&var) {
                self.set_field(field, &value);
            }
        }
    }

    /// Sets a field by name. Unknown names are ignored by `apply_overrides`
    /// construction; `config set` validates first via [`is_known_field`].
    pub fn set_field(&mut self, field: &str, value: &str) {
        let value = value.to_string();
        match field {
            "api_url" => self.api_url = Some(value),
            "api_key" => self.api_key = Some(value),
            "rpc_url" => self.rpc_url = Some(value),
            "chain_id" => self.chain_id = value.parse().ok(),
            "private_key" => self.private_key = Some(value),
            "wallet_address" => self.wallet_address = Some(value),
            "editions_contract" => self.editions_contract = Some(value),
            "marketplace_contract" => self.marketplace_contract = Some(value),
            "bzaar_token" => self.bzaar_token = Some(value),
            _ => {}
        }
    }

    /// Writes the config file with owner-only permissions.
    pub fn save(&self) -> Result<()> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::write(&path, &json)?;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(&path, &json)?;
        }

        Ok(())
    }

    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn rpc_url(&self) -> String {
        self.rpc_url
            .clone()
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string())
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id.unwrap_or(DEFAULT_CHAIN_ID)
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty()).context(
            "No API key configured. Run 'clawbazaar login' or set CLAWBAZAAR_API_KEY.",
        )
    }

    pub fn require_private_key(&self) -> Result<&str> {
        self.private_key.as_deref().filter(|k| !k.is_empty()).context(
            "No private key configured. Run 'clawbazaar login' or set CLAWBAZAAR_PRIVATE_KEY.",
        )
    }

    pub fn require_contract(&self, field: &str) -> Result<&str> {
        let value = match field {
            "editions_contract" => self.editions_contract.as_deref(),
            "marketplace_contract" => self.marketplace_contract.as_deref(),
            "bzaar_token" => self.bzaar_token.as_deref(),
            _ => None,
        };
        value.filter(|v| !v.is_empty()).with_context(|| {
            format!(
                "No {} configured. Run 'clawbazaar config set {} <address>'.",
                field, field
            )
        })
    }
}

/// True for field names `config set` accepts.
pub fn is_known_field(field: &str) -> bool {
    ENV_OVERRIDES.contains(&field)
}

/// Path to the config file: $CLAWBAZAAR_HOME/config.json or
/// ~/.clawbazaar/config.json.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CLAWBAZAAR_HOME") {
        return Ok(PathBuf::from(dir));
    }

    #[cfg(unix)]
    let home = std::env::var("HOME").context("HOME environment variable not set")?;

    #[cfg(windows)]
    let home = std::env::var("USERPROFILE").context("USERPROFILE environment variable not set")?;

    Ok(PathBuf::from(home).join(".clawbazaar"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.rpc_url(), DEFAULT_RPC_URL);
        assert_eq!(config.chain_id(), DEFAULT_CHAIN_ID);
        assert!(config.require_api_key().is_err());
        assert!(config.require_private_key().is_err());
    }

    #[test]
    fn test_env_overrides_stored_values() {
        let mut config = Config {
            api_key: Some("bzr_from_file".to_string()),
            chain_id: Some(1),
            ..Default::default()
        };

        let mut env = HashMap::new();
        env.insert("CLAWBAZAAR_API_KEY".to_string(), "bzr_from_env".to_string());
        env.insert("CLAWBAZAAR_CHAIN_ID".to_string(), "8453".to_string());

        config.apply_overrides(|name| env.get(name).cloned());

        assert_eq!(config.require_api_key().unwrap(), "bzr_from_env");
        assert_eq!(config.chain_id(), 8453);
        // Untouched fields keep their file values (here: absent).
        assert!(config.rpc_url.is_none());
    }

    #[test]
    fn test_unparseable_chain_id_override_is_dropped() {
        let mut config = Config {
            chain_id: Some(1),
            ..Default::default()
        };
        config.set_field("chain_id", "not-a-number");
        // Falls back to the default rather than keeping a stale value.
        assert_eq!(config.chain_id(), DEFAULT_CHAIN_ID);
    }

    #[test]
    fn test_known_fields() {
        assert!(is_known_field("api_key"));
        assert!(is_known_field("bzaar_token"));
        assert!(!is_known_field("apikey"));
        assert!(!is_known_field(""));
    }

    #[test]
    fn test_require_contract() {
        let mut config = Config::default();
        assert!(config.require_contract("bzaar_token").is_err());
        config.set_field("bzaar_token", "0x0000000000000000000000000000000000000001");
        assert_eq!(
            config.require_contract("bzaar_token").unwrap(),
            "0x0000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        // Route config_path through the temp dir for this test.
        std::env::set_var("CLAWBAZAAR_HOME", dir.path());

        let mut config = Config::default();
        config.set_field("api_key", "bzr_saved");
        config.set_field("wallet_address", "0x0000000000000000000000000000000000000002");
        config.save().unwrap();

        let content = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
        let reloaded: Config = serde_json::from_str(&content).unwrap();
        assert_eq!(reloaded.api_key.as_deref(), Some("bzr_saved"));

        std::env::remove_var("CLAWBAZAAR_HOME");
    }
}
