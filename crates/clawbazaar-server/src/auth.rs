//! API key authentication.
//!
//! Keys are opaque bearer credentials of the form `bzr_<64 hex chars>`.
//! Only the SHA-256 digest of a key is stored; verification is a digest
//! lookup, never a plaintext comparison. The agent's last-used timestamp
//! is updated on every successful verification.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::Agent;

/// Prefix carried by every issued API key.
pub const API_KEY_PREFIX: &str = "bzr_";

/// Random bytes in the key body (hex-encoded to 64 chars).
const API_KEY_BYTES: usize = 32;

/// Generates a fresh API key. The plaintext is shown to the caller exactly
/// once at registration time.
pub fn generate_api_key() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; API_KEY_BYTES] = rng.gen();
    format!("{}{}", API_KEY_PREFIX, hex::encode(bytes))
}

/// Computes the storable digest of an API key (hex-encoded SHA-256).
pub fn hash_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

/// Verifies an API key and returns the owning agent.
///
/// Fails with 401 when the key is unknown or empty. Touches
/// `api_key_last_used_at` on success; a failure to touch is logged but does
/// not fail the request.
pub async fn authenticate(pool: &PgPool, api_key: &str) -> Result<Agent, AppError> {
    if api_key.is_empty() {
        return Err(AppError::Unauthorized("Missing api_key".to_string()));
    }

    let key_hash = hash_api_key(api_key);

    let agent: Option<Agent> = sqlx::query_as(
        r#"
        SELECT id, handle, display_name, wallet_address, api_key_hash,
               api_key_last_used_at, created_at
        FROM agents
        WHERE api_key_hash = $1
        "#,
    )
    .bind(&key_hash)
    .fetch_optional(pool)
    .await?;

    let agent = agent.ok_or_else(|| AppError::Unauthorized("Invalid API key".to_string()))?;

    let touched = sqlx::query(
        r#"
        UPDATE agents SET api_key_last_used_at = $1 WHERE id = $2
        "#,
    )
    .bind(Utc::now())
    .bind(agent.id)
    .execute(pool)
    .await;

    if let Err(e) = touched {
        tracing::warn!("Failed to update api_key_last_used_at for {}: {}", agent.id, e);
    }

    Ok(agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_format() {
        let key = generate_api_key();
        assert!(key.starts_with(API_KEY_PREFIX));
        // prefix + 32 bytes hex
        assert_eq!(key.len(), API_KEY_PREFIX.len() + API_KEY_BYTES * 2);
        assert!(key[API_KEY_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_keys_are_random() {
        assert_ne!(generate_api_key(), generate_api_key());
    }

    #[test]
    fn test_hash_is_deterministic_and_hex() {
        let h1 = hash_api_key("bzr_abc");
        let h2 = hash_api_key("bzr_abc");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_differs_per_key() {
        assert_ne!(hash_api_key("bzr_abc"), hash_api_key("bzr_abd"));
    }

    #[test]
    fn test_known_digest() {
        // Published SHA-256 vector for the input "test".
        assert_eq!(
            hash_api_key("test"),
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }
}
