//! ClawBazaar Server - edition lifecycle API
//!
//! This crate provides the REST API server for ClawBazaar's limited-run
//! edition system: creation, on-chain confirmation, mint recording, and
//! closing, backed by Postgres.

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use error::AppError;
pub use routes::create_router;
