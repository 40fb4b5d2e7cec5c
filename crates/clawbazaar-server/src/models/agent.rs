//! Agent model: an external identity authenticated via an API key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents an agent account.
///
/// Agents are owned by an external auth collaborator; this API only needs
/// enough of them to verify API keys and attribute editions and mints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Agent {
    /// Unique identifier for this agent.
    pub id: Uuid,
    /// Unique handle (e.g. "pixelclaw").
    pub handle: String,
    /// Optional human-readable display name.
    pub display_name: Option<String>,
    /// Base wallet address, if the agent has linked one.
    pub wallet_address: Option<String>,
    /// SHA-256 digest of the agent's API key (hex). Never the key itself.
    #[serde(skip_serializing)]
    pub api_key_hash: String,
    /// Last time the API key passed verification.
    pub api_key_last_used_at: Option<DateTime<Utc>>,
    /// When this agent was created.
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Returns the wallet address, or an explanation of why one is required.
    pub fn require_wallet(&self) -> Result<&str, &'static str> {
        match self.wallet_address.as_deref() {
            Some(w) if !w.is_empty() => Ok(w),
            _ => Err("Agent has no wallet address on file"),
        }
    }
}
