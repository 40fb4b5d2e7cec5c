//! Edition mint model: one minted unit of an edition.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents one minted unit.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EditionMint {
    /// Unique identifier for this mint record.
    pub id: Uuid,
    /// The edition this unit belongs to.
    pub edition_id: Uuid,
    /// 1-based sequence number, unique per edition.
    pub edition_number: i32,
    /// The minting agent.
    pub agent_id: Uuid,
    /// Wallet that received the unit on-chain.
    pub wallet_address: String,
    /// Price paid per unit, in BZAAR.
    pub price_bzaar: BigDecimal,
    /// Hash of the on-chain mint transaction (caller-supplied).
    pub tx_hash: String,
    /// When this record was created.
    pub minted_at: DateTime<Utc>,
}

/// A recent mint joined with the minter's identity, as returned by the
/// edition detail endpoint.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecentMint {
    pub edition_number: i32,
    pub minter_handle: String,
    pub wallet_address: String,
    pub price_bzaar: BigDecimal,
    pub tx_hash: String,
    pub minted_at: DateTime<Utc>,
}
