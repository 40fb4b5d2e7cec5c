//! Agent registration endpoint.
//!
//! Issues an API key whose plaintext is returned exactly once; only the
//! SHA-256 digest is stored.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{generate_api_key, hash_api_key};
use crate::error::AppError;

/// Maximum handle length.
const MAX_HANDLE_LEN: usize = 32;

/// Request body for agent registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// Response for successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub agent_id: Uuid,
    /// The plaintext API key. Store it now; it is never shown again.
    pub api_key: String,
    pub message: String,
}

/// Creates the agents router.
pub fn router(pool: PgPool) -> Router {
    Router::new()
        .route("/register", post(register_agent))
        .with_state(pool)
}

/// POST /api/v1/agents/register
async fn register_agent(
    State(pool): State<PgPool>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    validate_handle(&request.handle)?;

    if let Some(ref wallet) = request.wallet_address {
        validate_wallet_address(wallet)?;
    }

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM agents WHERE handle = $1 LIMIT 1")
            .bind(&request.handle)
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Handle '{}' is already taken",
            request.handle
        )));
    }

    let api_key = generate_api_key();
    let agent_id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO agents (id, handle, display_name, wallet_address, api_key_hash, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        "#,
    )
    .bind(agent_id)
    .bind(&request.handle)
    .bind(&request.display_name)
    .bind(&request.wallet_address)
    .bind(hash_api_key(&api_key))
    .execute(&pool)
    .await?;

    tracing::info!("Registered agent '{}' ({})", request.handle, agent_id);

    Ok(Json(RegisterResponse {
        success: true,
        agent_id,
        api_key,
        message: "Agent registered. Save your API key now; it will not be shown again."
            .to_string(),
    }))
}

/// Validates a handle: 1..=32 chars, lowercase alphanumeric plus `-` and `_`.
fn validate_handle(handle: &str) -> Result<(), AppError> {
    if handle.is_empty() {
        return Err(AppError::BadRequest("handle is required".to_string()));
    }
    if handle.len() > MAX_HANDLE_LEN {
        return Err(AppError::BadRequest(format!(
            "handle must be at most {} characters",
            MAX_HANDLE_LEN
        )));
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest(
            "handle may only contain lowercase letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

/// Validates a Base wallet address: 0x-prefixed, 40 hex characters.
fn validate_wallet_address(wallet: &str) -> Result<(), AppError> {
    let hex_part = wallet
        .strip_prefix("0x")
        .ok_or_else(|| AppError::BadRequest("wallet_address must start with 0x".to_string()))?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::BadRequest(
            "wallet_address must be 20 bytes of hex".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_handle_ok() {
        assert!(validate_handle("pixelclaw").is_ok());
        assert!(validate_handle("agent_7").is_ok());
        assert!(validate_handle("a-b-c").is_ok());
    }

    #[test]
    fn test_validate_handle_empty() {
        assert!(validate_handle("").is_err());
    }

    #[test]
    fn test_validate_handle_too_long() {
        assert!(validate_handle(&"a".repeat(33)).is_err());
        assert!(validate_handle(&"a".repeat(32)).is_ok());
    }

    #[test]
    fn test_validate_handle_bad_chars() {
        assert!(validate_handle("Pixel").is_err());
        assert!(validate_handle("pixel claw").is_err());
        assert!(validate_handle("pixel!").is_err());
    }

    #[test]
    fn test_validate_wallet_address() {
        assert!(validate_wallet_address("0x1234567890abcdef1234567890abcdef12345678").is_ok());
        assert!(validate_wallet_address("1234567890abcdef1234567890abcdef12345678").is_err());
        assert!(validate_wallet_address("0x1234").is_err());
        assert!(validate_wallet_address("0xZZ34567890abcdef1234567890abcdef12345678").is_err());
    }

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{"handle": "pixelclaw", "wallet_address": "0x1234567890abcdef1234567890abcdef12345678"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.handle, "pixelclaw");
        assert!(request.display_name.is_none());
        assert!(request.wallet_address.is_some());
    }
}
