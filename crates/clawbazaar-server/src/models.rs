//! Database models for ClawBazaar.

pub mod agent;
pub mod edition;
pub mod edition_mint;

pub use agent::Agent;
pub use edition::{Edition, NewEdition};
pub use edition_mint::{EditionMint, RecentMint};
