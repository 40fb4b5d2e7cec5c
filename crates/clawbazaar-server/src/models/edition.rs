//! Edition model: a limited-run mintable item.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Default per-wallet mint cap when the creator does not supply one.
pub const DEFAULT_MAX_PER_WALLET: i32 = 10;

/// Inclusive bounds on an edition's max_supply.
pub const MIN_MAX_SUPPLY: i32 = 1;
pub const MAX_MAX_SUPPLY: i32 = 1000;

/// Represents a limited-run edition stored in the database.
///
/// An edition is created unconfirmed (all on-chain linkage fields null),
/// confirmed once by its creator, minted against until exhausted or closed,
/// and never deleted through this API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Edition {
    /// Unique identifier for this edition.
    pub id: Uuid,
    /// The creating agent.
    pub agent_id: Uuid,
    /// Edition title, used as the metadata name.
    pub title: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Image reference for the artwork.
    pub image_url: String,
    /// Total number of units that can ever be minted (1..=1000).
    pub max_supply: i32,
    /// Per-wallet mint cap.
    pub max_per_wallet: i32,
    /// Price per unit, denominated in BZAAR.
    pub price_bzaar: BigDecimal,
    /// Creator royalty in basis points.
    pub royalty_bps: i32,
    /// End of the mint window, if the edition is time-limited.
    pub mint_end: Option<DateTime<Utc>>,
    /// Units minted so far. Never exceeds max_supply.
    pub total_minted: i32,
    /// False once sold out or explicitly closed.
    pub is_active: bool,
    /// On-chain edition id, null until confirmed.
    pub edition_id_on_chain: Option<i64>,
    /// Editions contract address, null until confirmed.
    pub contract_address: Option<String>,
    /// Hash of the on-chain creation transaction, null until confirmed.
    pub creation_tx_hash: Option<String>,
    /// Pinned metadata URI, null until confirmed.
    pub ipfs_metadata_uri: Option<String>,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to insert a new edition.
#[derive(Debug, Clone)]
pub struct NewEdition {
    pub agent_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub max_supply: i32,
    pub max_per_wallet: i32,
    pub price_bzaar: BigDecimal,
    pub royalty_bps: i32,
    pub mint_end: Option<DateTime<Utc>>,
}

impl Edition {
    /// Units still available to mint.
    pub fn remaining(&self) -> i32 {
        self.max_supply - self.total_minted
    }

    /// True if the mint window (when set) has elapsed as of `now`.
    pub fn mint_window_elapsed(&self, now: DateTime<Utc>) -> bool {
        matches!(self.mint_end, Some(end) if end <= now)
    }

    /// Builds the ERC-1155-style metadata object for off-chain pinning.
    pub fn metadata(&self, creator_handle: &str) -> serde_json::Value {
        serde_json::json!({
            "name": self.title,
            "description": self.description.clone().unwrap_or_default(),
            "image": self.image_url,
            "attributes": [
                { "trait_type": "Creator", "value": creator_handle },
                { "trait_type": "Max Supply", "value": self.max_supply },
                { "trait_type": "Price (BZAAR)", "value": self.price_bzaar.to_string() },
                { "trait_type": "Royalty (bps)", "value": self.royalty_bps },
            ],
        })
    }
}
