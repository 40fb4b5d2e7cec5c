//! Edition lifecycle endpoints: create, confirm, mint, close, and reads.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::authenticate;
use crate::error::AppError;
use crate::models::edition::{DEFAULT_MAX_PER_WALLET, MAX_MAX_SUPPLY, MIN_MAX_SUPPLY};
use crate::models::{Edition, NewEdition, RecentMint};

/// How many recent mints the detail endpoint returns.
const RECENT_MINTS_LIMIT: i64 = 10;

/// Creates the editions router.
pub fn router(pool: PgPool) -> Router {
    Router::new()
        .route("/create", post(create_edition))
        .route("/confirm", post(confirm_edition))
        .route("/mint", post(mint_edition))
        .route("/close", post(close_edition))
        .route("/list", get(list_editions))
        .route("/detail", get(edition_detail))
        .route("/my-editions", post(my_editions))
        .with_state(pool)
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Request body for edition creation.
#[derive(Debug, Deserialize)]
pub struct CreateEditionRequest {
    pub api_key: String,
    pub title: String,
    pub image_url: String,
    pub max_supply: i32,
    pub price_bzaar: BigDecimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub max_per_wallet: Option<i32>,
    #[serde(default)]
    pub duration_hours: Option<i64>,
    #[serde(default)]
    pub royalty_bps: Option<i32>,
}

/// Response for successful edition creation.
#[derive(Debug, Serialize)]
pub struct CreateEditionResponse {
    pub success: bool,
    pub edition_id: Uuid,
    pub creator_wallet: String,
    /// Metadata object for off-chain pinning and later on-chain registration.
    pub metadata: serde_json::Value,
    pub message: String,
}

/// POST /api/v1/editions/create
///
/// Inserts a new edition in the unconfirmed state. No chain call happens
/// here; on-chain creation is the caller's responsibility, reported back
/// via /confirm.
async fn create_edition(
    State(pool): State<PgPool>,
    Json(request): Json<CreateEditionRequest>,
) -> Result<Json<CreateEditionResponse>, AppError> {
    validate_create_request(&request)?;

    let agent = authenticate(&pool, &request.api_key).await?;
    let creator_wallet = agent
        .require_wallet()
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .to_string();

    let new_edition = NewEdition {
        agent_id: agent.id,
        title: request.title.clone(),
        description: request.description.clone(),
        image_url: request.image_url.clone(),
        max_supply: request.max_supply,
        max_per_wallet: request.max_per_wallet.unwrap_or(DEFAULT_MAX_PER_WALLET),
        price_bzaar: request.price_bzaar.clone(),
        royalty_bps: request.royalty_bps.unwrap_or(0),
        mint_end: compute_mint_end(Utc::now(), request.duration_hours),
    };

    let edition = insert_edition(&pool, &new_edition).await?;

    tracing::info!(
        "Agent '{}' created edition '{}' ({})",
        agent.handle,
        edition.title,
        edition.id
    );

    let metadata = edition.metadata(&agent.handle);

    Ok(Json(CreateEditionResponse {
        success: true,
        edition_id: edition.id,
        creator_wallet,
        metadata,
        message: "Edition created. Register it on-chain, then call /confirm with the \
                  transaction details."
            .to_string(),
    }))
}

/// Validates creation input: required fields and numeric bounds.
fn validate_create_request(request: &CreateEditionRequest) -> Result<(), AppError> {
    if request.title.trim().is_empty() {
        return Err(AppError::BadRequest("title is required".to_string()));
    }
    if request.image_url.trim().is_empty() {
        return Err(AppError::BadRequest("image_url is required".to_string()));
    }
    if request.max_supply < MIN_MAX_SUPPLY || request.max_supply > MAX_MAX_SUPPLY {
        return Err(AppError::BadRequest(format!(
            "max_supply must be between {} and {}",
            MIN_MAX_SUPPLY, MAX_MAX_SUPPLY
        )));
    }
    if request.price_bzaar < BigDecimal::from(0) {
        return Err(AppError::BadRequest(
            "price_bzaar must not be negative".to_string(),
        ));
    }
    if let Some(cap) = request.max_per_wallet {
        if cap < 1 {
            return Err(AppError::BadRequest(
                "max_per_wallet must be at least 1".to_string(),
            ));
        }
    }
    if let Some(hours) = request.duration_hours {
        if hours < 1 {
            return Err(AppError::BadRequest(
                "duration_hours must be at least 1".to_string(),
            ));
        }
    }
    if let Some(bps) = request.royalty_bps {
        if !(0..=10_000).contains(&bps) {
            return Err(AppError::BadRequest(
                "royalty_bps must be between 0 and 10000".to_string(),
            ));
        }
    }
    Ok(())
}

/// Computes the mint window end: now + duration, or none for open-ended.
fn compute_mint_end(now: DateTime<Utc>, duration_hours: Option<i64>) -> Option<DateTime<Utc>> {
    duration_hours.map(|h| now + Duration::hours(h))
}

/// Inserts a new edition row with total_minted = 0 and no chain linkage.
async fn insert_edition(pool: &PgPool, new_edition: &NewEdition) -> Result<Edition, AppError> {
    let edition = sqlx::query_as::<_, Edition>(
        r#"
        INSERT INTO editions
            (id, agent_id, title, description, image_url, max_supply, max_per_wallet,
             price_bzaar, royalty_bps, mint_end, total_minted, is_active, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, TRUE, NOW())
        RETURNING id, agent_id, title, description, image_url, max_supply, max_per_wallet,
                  price_bzaar, royalty_bps, mint_end, total_minted, is_active,
                  edition_id_on_chain, contract_address, creation_tx_hash,
                  ipfs_metadata_uri, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new_edition.agent_id)
    .bind(&new_edition.title)
    .bind(&new_edition.description)
    .bind(&new_edition.image_url)
    .bind(new_edition.max_supply)
    .bind(new_edition.max_per_wallet)
    .bind(&new_edition.price_bzaar)
    .bind(new_edition.royalty_bps)
    .bind(new_edition.mint_end)
    .fetch_one(pool)
    .await?;

    Ok(edition)
}

// ---------------------------------------------------------------------------
// Confirm
// ---------------------------------------------------------------------------

/// Request body for confirming on-chain creation.
#[derive(Debug, Deserialize)]
pub struct ConfirmEditionRequest {
    pub api_key: String,
    pub edition_id: Uuid,
    pub edition_id_on_chain: i64,
    pub contract_address: String,
    pub creation_tx_hash: String,
    pub ipfs_metadata_uri: String,
}

/// Response for successful confirmation.
#[derive(Debug, Serialize)]
pub struct ConfirmEditionResponse {
    pub success: bool,
    pub edition_id: Uuid,
    pub edition_id_on_chain: i64,
    pub message: String,
}

/// POST /api/v1/editions/confirm
///
/// Records on-chain creation details. Single-use: a second confirmation
/// attempt is rejected rather than overwritten, so an edition can never be
/// re-pointed at a different on-chain id.
async fn confirm_edition(
    State(pool): State<PgPool>,
    Json(request): Json<ConfirmEditionRequest>,
) -> Result<Json<ConfirmEditionResponse>, AppError> {
    validate_confirm_request(&request)?;

    let agent = authenticate(&pool, &request.api_key).await?;
    let edition = fetch_edition(&pool, request.edition_id).await?;

    if edition.agent_id != agent.id {
        return Err(AppError::Forbidden(
            "Only the creating agent can confirm this edition".to_string(),
        ));
    }

    // The unconfirmed check lives inside the UPDATE so two concurrent
    // confirmations cannot both pass a prior read and overwrite each other.
    let result = sqlx::query(
        r#"
        UPDATE editions
        SET edition_id_on_chain = $2,
            contract_address = $3,
            creation_tx_hash = $4,
            ipfs_metadata_uri = $5
        WHERE id = $1
          AND edition_id_on_chain IS NULL
        "#,
    )
    .bind(edition.id)
    .bind(request.edition_id_on_chain)
    .bind(&request.contract_address)
    .bind(&request.creation_tx_hash)
    .bind(&request.ipfs_metadata_uri)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "Edition {} is already confirmed on-chain",
            edition.id
        )));
    }

    Ok(Json(ConfirmEditionResponse {
        success: true,
        edition_id: edition.id,
        edition_id_on_chain: request.edition_id_on_chain,
        message: "Edition confirmed on-chain".to_string(),
    }))
}

/// Validates confirmation input.
fn validate_confirm_request(request: &ConfirmEditionRequest) -> Result<(), AppError> {
    if request.edition_id_on_chain < 0 {
        return Err(AppError::BadRequest(
            "edition_id_on_chain must not be negative".to_string(),
        ));
    }
    validate_address(&request.contract_address, "contract_address")?;
    validate_tx_hash(&request.creation_tx_hash, "creation_tx_hash")?;
    if request.ipfs_metadata_uri.trim().is_empty() {
        return Err(AppError::BadRequest(
            "ipfs_metadata_uri is required".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Mint
// ---------------------------------------------------------------------------

/// Request body for recording an on-chain mint.
#[derive(Debug, Deserialize)]
pub struct MintRequest {
    pub api_key: String,
    pub edition_id: Uuid,
    pub amount: i32,
    /// Hash of the already-executed on-chain mint transaction. Trusted as
    /// supplied; there is no on-chain reconciliation step.
    pub tx_hash: String,
}

/// Response for a successful mint.
#[derive(Debug, Serialize)]
pub struct MintResponse {
    pub success: bool,
    pub edition_id: Uuid,
    pub amount_minted: i32,
    pub edition_numbers: Vec<i32>,
    pub total_minted: i32,
    pub remaining: i32,
}

/// POST /api/v1/editions/mint
///
/// Records `amount` minted units. The capacity check and the counter
/// increment are one conditional UPDATE inside a transaction, so two
/// concurrent requests can never push total_minted past max_supply. The
/// UPDATE's row lock also serializes the per-wallet count check that
/// follows it.
async fn mint_edition(
    State(pool): State<PgPool>,
    Json(request): Json<MintRequest>,
) -> Result<Json<MintResponse>, AppError> {
    validate_mint_amount(request.amount)?;
    validate_tx_hash(&request.tx_hash, "tx_hash")?;

    let agent = authenticate(&pool, &request.api_key).await?;
    let minter_wallet = agent
        .require_wallet()
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .to_string();

    let mut tx = pool.begin().await?;

    // Conditional check-and-increment under the supply ceiling. Zero rows
    // means the edition is missing, closed, expired, or out of headroom;
    // the follow-up read tells us which.
    let updated: Option<(i32, i32, i32, BigDecimal)> = sqlx::query_as(
        r#"
        UPDATE editions
        SET total_minted = total_minted + $2,
            is_active = total_minted + $2 < max_supply
        WHERE id = $1
          AND is_active
          AND (mint_end IS NULL OR mint_end > NOW())
          AND total_minted + $2 <= max_supply
        RETURNING total_minted, max_supply, max_per_wallet, price_bzaar
        "#,
    )
    .bind(request.edition_id)
    .bind(request.amount)
    .fetch_optional(&mut *tx)
    .await?;

    let (new_total, max_supply, max_per_wallet, price_bzaar) = match updated {
        Some(row) => row,
        None => {
            drop(tx);
            return Err(mint_rejection(&pool, request.edition_id, request.amount).await);
        }
    };

    let (already_minted,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM edition_mints WHERE edition_id = $1 AND agent_id = $2",
    )
    .bind(request.edition_id)
    .bind(agent.id)
    .fetch_one(&mut *tx)
    .await?;

    if already_minted + i64::from(request.amount) > i64::from(max_per_wallet) {
        // Dropping the transaction rolls back the counter update.
        return Err(AppError::Conflict(format!(
            "Exceeds per-wallet cap of {} ({} already minted by this wallet)",
            max_per_wallet, already_minted
        )));
    }

    let edition_numbers = assigned_numbers(new_total, request.amount);
    for &number in &edition_numbers {
        sqlx::query(
            r#"
            INSERT INTO edition_mints
                (id, edition_id, edition_number, agent_id, wallet_address,
                 price_bzaar, tx_hash, minted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.edition_id)
        .bind(number)
        .bind(agent.id)
        .bind(&minter_wallet)
        .bind(&price_bzaar)
        .bind(&request.tx_hash)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Agent '{}' minted {} of edition {} ({}/{})",
        agent.handle,
        request.amount,
        request.edition_id,
        new_total,
        max_supply
    );

    Ok(Json(MintResponse {
        success: true,
        edition_id: request.edition_id,
        amount_minted: request.amount,
        edition_numbers,
        total_minted: new_total,
        remaining: max_supply - new_total,
    }))
}

/// Bounds a mint amount. The upper bound matches the largest possible
/// supply, keeping `total_minted + amount` far from integer overflow.
fn validate_mint_amount(amount: i32) -> Result<(), AppError> {
    if !(1..=MAX_MAX_SUPPLY).contains(&amount) {
        return Err(AppError::BadRequest(format!(
            "amount must be between 1 and {}",
            MAX_MAX_SUPPLY
        )));
    }
    Ok(())
}

/// The 1-based edition numbers assigned by a mint that brought the total
/// to `new_total`.
fn assigned_numbers(new_total: i32, amount: i32) -> Vec<i32> {
    (new_total - amount + 1..=new_total).collect()
}

/// Classifies why the conditional mint update matched no row.
async fn mint_rejection(pool: &PgPool, edition_id: Uuid, amount: i32) -> AppError {
    match fetch_edition(pool, edition_id).await {
        Err(e) => e,
        Ok(edition) => classify_mint_rejection(&edition, amount, Utc::now()),
    }
}

/// Rejection reasons, checked in order: inactive, window elapsed,
/// supply exceeded.
fn classify_mint_rejection(edition: &Edition, amount: i32, now: DateTime<Utc>) -> AppError {
    if !edition.is_active {
        return AppError::Conflict(format!("Edition {} is not active", edition.id));
    }
    if edition.mint_window_elapsed(now) {
        return AppError::Conflict(format!(
            "Mint window for edition {} has ended",
            edition.id
        ));
    }
    AppError::Conflict(format!(
        "Minting {} would exceed max supply ({} remaining)",
        amount,
        edition.remaining()
    ))
}

// ---------------------------------------------------------------------------
// Close
// ---------------------------------------------------------------------------

/// Request body for closing an edition.
#[derive(Debug, Deserialize)]
pub struct CloseEditionRequest {
    pub api_key: String,
    pub edition_id: Uuid,
}

/// Response for a successful close.
#[derive(Debug, Serialize)]
pub struct CloseEditionResponse {
    pub success: bool,
    pub edition_id: Uuid,
    pub total_minted: i32,
    pub message: String,
}

/// POST /api/v1/editions/close
///
/// Deactivates an edition regardless of remaining supply. Irreversible via
/// this API. Closing an already-closed edition is an explicit error, not a
/// silent success.
async fn close_edition(
    State(pool): State<PgPool>,
    Json(request): Json<CloseEditionRequest>,
) -> Result<Json<CloseEditionResponse>, AppError> {
    let agent = authenticate(&pool, &request.api_key).await?;
    let edition = fetch_edition(&pool, request.edition_id).await?;

    if edition.agent_id != agent.id {
        return Err(AppError::Forbidden(
            "Only the creating agent can close this edition".to_string(),
        ));
    }
    if !edition.is_active {
        return Err(AppError::Conflict(format!(
            "Edition {} is already closed",
            edition.id
        )));
    }

    sqlx::query("UPDATE editions SET is_active = FALSE WHERE id = $1")
        .bind(edition.id)
        .execute(&pool)
        .await?;

    Ok(Json(CloseEditionResponse {
        success: true,
        edition_id: edition.id,
        total_minted: edition.total_minted,
        message: format!(
            "Edition closed with {} of {} minted",
            edition.total_minted, edition.max_supply
        ),
    }))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// An edition joined with its creator's handle, as returned by the read
/// endpoints.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EditionSummary {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub creator_handle: String,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub max_supply: i32,
    pub max_per_wallet: i32,
    pub price_bzaar: BigDecimal,
    pub royalty_bps: i32,
    pub mint_end: Option<DateTime<Utc>>,
    pub total_minted: i32,
    pub is_active: bool,
    pub edition_id_on_chain: Option<i64>,
    pub contract_address: Option<String>,
    pub creation_tx_hash: Option<String>,
    pub ipfs_metadata_uri: Option<String>,
    pub created_at: DateTime<Utc>,
}

const SUMMARY_COLUMNS: &str = r#"
    e.id, e.agent_id, a.handle AS creator_handle, e.title, e.description,
    e.image_url, e.max_supply, e.max_per_wallet, e.price_bzaar, e.royalty_bps,
    e.mint_end, e.total_minted, e.is_active, e.edition_id_on_chain,
    e.contract_address, e.creation_tx_hash, e.ipfs_metadata_uri, e.created_at
"#;

/// Query parameters for the list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub agent_id: Option<Uuid>,
}

/// Response for the list and my-editions endpoints.
#[derive(Debug, Serialize)]
pub struct EditionsResponse {
    pub editions: Vec<EditionSummary>,
}

/// GET /api/v1/editions/list
async fn list_editions(
    State(pool): State<PgPool>,
    Query(query): Query<ListQuery>,
) -> Result<Json<EditionsResponse>, AppError> {
    let sql = format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM editions e
        JOIN agents a ON a.id = e.agent_id
        WHERE ($1::boolean IS NULL OR e.is_active = $1)
          AND ($2::uuid IS NULL OR e.agent_id = $2)
        ORDER BY e.created_at DESC
        "#
    );

    let editions: Vec<EditionSummary> = sqlx::query_as(&sql)
        .bind(query.active)
        .bind(query.agent_id)
        .fetch_all(&pool)
        .await?;

    Ok(Json(EditionsResponse { editions }))
}

/// Query parameters for the detail endpoint.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    pub id: Uuid,
}

/// Response for the detail endpoint.
#[derive(Debug, Serialize)]
pub struct EditionDetailResponse {
    pub edition: EditionSummary,
    pub recent_mints: Vec<RecentMint>,
}

/// GET /api/v1/editions/detail?id=
async fn edition_detail(
    State(pool): State<PgPool>,
    Query(query): Query<DetailQuery>,
) -> Result<Json<EditionDetailResponse>, AppError> {
    let sql = format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM editions e
        JOIN agents a ON a.id = e.agent_id
        WHERE e.id = $1
        "#
    );

    let edition: Option<EditionSummary> = sqlx::query_as(&sql)
        .bind(query.id)
        .fetch_optional(&pool)
        .await?;

    let edition =
        edition.ok_or_else(|| AppError::NotFound(format!("Edition {} not found", query.id)))?;

    let recent_mints: Vec<RecentMint> = sqlx::query_as(
        r#"
        SELECT m.edition_number, a.handle AS minter_handle, m.wallet_address,
               m.price_bzaar, m.tx_hash, m.minted_at
        FROM edition_mints m
        JOIN agents a ON a.id = m.agent_id
        WHERE m.edition_id = $1
        ORDER BY m.minted_at DESC, m.edition_number DESC
        LIMIT $2
        "#,
    )
    .bind(query.id)
    .bind(RECENT_MINTS_LIMIT)
    .fetch_all(&pool)
    .await?;

    Ok(Json(EditionDetailResponse {
        edition,
        recent_mints,
    }))
}

/// Request body for my-editions.
#[derive(Debug, Deserialize)]
pub struct MyEditionsRequest {
    pub api_key: String,
}

/// POST /api/v1/editions/my-editions
async fn my_editions(
    State(pool): State<PgPool>,
    Json(request): Json<MyEditionsRequest>,
) -> Result<Json<EditionsResponse>, AppError> {
    let agent = authenticate(&pool, &request.api_key).await?;

    let sql = format!(
        r#"
        SELECT {SUMMARY_COLUMNS}
        FROM editions e
        JOIN agents a ON a.id = e.agent_id
        WHERE e.agent_id = $1
        ORDER BY e.created_at DESC
        "#
    );

    let editions: Vec<EditionSummary> = sqlx::query_as(&sql)
        .bind(agent.id)
        .fetch_all(&pool)
        .await?;

    Ok(Json(EditionsResponse { editions }))
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Loads an edition or fails with 404.
async fn fetch_edition(pool: &PgPool, edition_id: Uuid) -> Result<Edition, AppError> {
    let edition: Option<Edition> = sqlx::query_as(
        r#"
        SELECT id, agent_id, title, description, image_url, max_supply, max_per_wallet,
               price_bzaar, royalty_bps, mint_end, total_minted, is_active,
               edition_id_on_chain, contract_address, creation_tx_hash,
               ipfs_metadata_uri, created_at
        FROM editions
        WHERE id = $1
        "#,
    )
    .bind(edition_id)
    .fetch_optional(pool)
    .await?;

    edition.ok_or_else(|| AppError::NotFound(format!("Edition {} not found", edition_id)))
}

/// Validates a 0x-prefixed 20-byte hex address.
fn validate_address(value: &str, field: &str) -> Result<(), AppError> {
    let hex_part = value
        .strip_prefix("0x")
        .ok_or_else(|| AppError::BadRequest(format!("{} must start with 0x", field)))?;
    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::BadRequest(format!(
            "{} must be 20 bytes of hex",
            field
        )));
    }
    Ok(())
}

/// Validates a 0x-prefixed 32-byte hex transaction hash.
fn validate_tx_hash(value: &str, field: &str) -> Result<(), AppError> {
    let hex_part = value
        .strip_prefix("0x")
        .ok_or_else(|| AppError::BadRequest(format!("{} must start with 0x", field)))?;
    if hex_part.len() != 64 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AppError::BadRequest(format!(
            "{} must be 32 bytes of hex",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn create_request() -> CreateEditionRequest {
        CreateEditionRequest {
            api_key: "bzr_test".to_string(),
            title: "Claw Dreams #1".to_string(),
            image_url: "ipfs://QmExample/claw.png".to_string(),
            max_supply: 100,
            price_bzaar: BigDecimal::from_str("25.5").unwrap(),
            description: None,
            max_per_wallet: None,
            duration_hours: None,
            royalty_bps: None,
        }
    }

    fn edition(total_minted: i32, max_supply: i32) -> Edition {
        Edition {
            id: Uuid::new_v4(),
            agent_id: Uuid::new_v4(),
            title: "Claw Dreams #1".to_string(),
            description: None,
            image_url: "ipfs://QmExample/claw.png".to_string(),
            max_supply,
            max_per_wallet: 10,
            price_bzaar: BigDecimal::from(10),
            royalty_bps: 0,
            mint_end: None,
            total_minted,
            is_active: true,
            edition_id_on_chain: None,
            contract_address: None,
            creation_tx_hash: None,
            ipfs_metadata_uri: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_create_ok() {
        assert!(validate_create_request(&create_request()).is_ok());
    }

    #[test]
    fn test_validate_create_missing_title() {
        let mut r = create_request();
        r.title = "  ".to_string();
        assert!(validate_create_request(&r).is_err());
    }

    #[test]
    fn test_validate_create_missing_image() {
        let mut r = create_request();
        r.image_url = String::new();
        assert!(validate_create_request(&r).is_err());
    }

    #[test]
    fn test_validate_create_max_supply_bounds() {
        let mut r = create_request();
        r.max_supply = 0;
        assert!(validate_create_request(&r).is_err());
        r.max_supply = 1001;
        assert!(validate_create_request(&r).is_err());
        r.max_supply = 1;
        assert!(validate_create_request(&r).is_ok());
        r.max_supply = 1000;
        assert!(validate_create_request(&r).is_ok());
    }

    #[test]
    fn test_validate_create_negative_price() {
        let mut r = create_request();
        r.price_bzaar = BigDecimal::from_str("-0.01").unwrap();
        assert!(validate_create_request(&r).is_err());
    }

    #[test]
    fn test_validate_create_optional_bounds() {
        let mut r = create_request();
        r.max_per_wallet = Some(0);
        assert!(validate_create_request(&r).is_err());
        r.max_per_wallet = Some(1);
        assert!(validate_create_request(&r).is_ok());

        r.duration_hours = Some(0);
        assert!(validate_create_request(&r).is_err());
        r.duration_hours = Some(24);
        assert!(validate_create_request(&r).is_ok());

        r.royalty_bps = Some(10_001);
        assert!(validate_create_request(&r).is_err());
        r.royalty_bps = Some(10_000);
        assert!(validate_create_request(&r).is_ok());
    }

    #[test]
    fn test_compute_mint_end() {
        let now = Utc::now();
        assert!(compute_mint_end(now, None).is_none());
        assert_eq!(
            compute_mint_end(now, Some(48)),
            Some(now + Duration::hours(48))
        );
    }

    #[test]
    fn test_validate_mint_amount_bounds() {
        assert!(validate_mint_amount(0).is_err());
        assert!(validate_mint_amount(-1).is_err());
        assert!(validate_mint_amount(1).is_ok());
        assert!(validate_mint_amount(MAX_MAX_SUPPLY).is_ok());
        assert!(validate_mint_amount(MAX_MAX_SUPPLY + 1).is_err());
        assert!(validate_mint_amount(i32::MAX).is_err());
    }

    #[test]
    fn test_assigned_numbers_start_after_previous_total() {
        // Total went from 40 to 43: this mint got 41, 42, 43.
        assert_eq!(assigned_numbers(43, 3), vec![41, 42, 43]);
    }

    #[test]
    fn test_assigned_numbers_first_mint() {
        assert_eq!(assigned_numbers(1, 1), vec![1]);
    }

    #[test]
    fn test_assigned_numbers_full_supply() {
        assert_eq!(assigned_numbers(5, 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_classify_rejection_inactive() {
        let mut e = edition(3, 10);
        e.is_active = false;
        let err = classify_mint_rejection(&e, 1, Utc::now());
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("not active")));
    }

    #[test]
    fn test_classify_rejection_window_elapsed() {
        let mut e = edition(3, 10);
        e.mint_end = Some(Utc::now() - Duration::hours(1));
        let err = classify_mint_rejection(&e, 1, Utc::now());
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("window")));
    }

    #[test]
    fn test_classify_rejection_supply_exceeded() {
        let e = edition(8, 10);
        let err = classify_mint_rejection(&e, 5, Utc::now());
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("2 remaining")));
    }

    #[test]
    fn test_classify_rejection_order_inactive_before_supply() {
        // A closed, exhausted edition reports "not active", the first check.
        let mut e = edition(10, 10);
        e.is_active = false;
        let err = classify_mint_rejection(&e, 1, Utc::now());
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains("not active")));
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address("0x1234567890abcdef1234567890abcdef12345678", "f").is_ok());
        assert!(validate_address("0x1234", "f").is_err());
        assert!(validate_address("1234567890abcdef1234567890abcdef12345678", "f").is_err());
    }

    #[test]
    fn test_validate_tx_hash() {
        let good = format!("0x{}", "ab".repeat(32));
        assert!(validate_tx_hash(&good, "tx_hash").is_ok());
        assert!(validate_tx_hash(&good[..10], "tx_hash").is_err());
        assert!(validate_tx_hash(&good[2..], "tx_hash").is_err());
        let bad = format!("0x{}", "zz".repeat(32));
        assert!(validate_tx_hash(&bad, "tx_hash").is_err());
    }

    #[test]
    fn test_mint_request_deserialization() {
        let json = format!(
            r#"{{"api_key": "bzr_x", "edition_id": "550e8400-e29b-41d4-a716-446655440000",
                 "amount": 2, "tx_hash": "0x{}"}}"#,
            "cd".repeat(32)
        );
        let request: MintRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.amount, 2);
        assert_eq!(
            request.edition_id.to_string(),
            "550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn test_mint_response_serialization() {
        let response = MintResponse {
            success: true,
            edition_id: Uuid::new_v4(),
            amount_minted: 2,
            edition_numbers: vec![4, 5],
            total_minted: 5,
            remaining: 95,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["edition_numbers"], serde_json::json!([4, 5]));
        assert_eq!(json["remaining"], 95);
    }

    #[test]
    fn test_create_request_accepts_string_price() {
        let json = r#"{"api_key": "bzr_x", "title": "T", "image_url": "ipfs://x",
                       "max_supply": 10, "price_bzaar": "12.75"}"#;
        let request: CreateEditionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.price_bzaar, BigDecimal::from_str("12.75").unwrap());
        assert!(request.max_per_wallet.is_none());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListQuery = serde_json::from_str("{}").unwrap();
        assert!(query.active.is_none());
        assert!(query.agent_id.is_none());
    }
}
