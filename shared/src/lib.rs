//! Shared types and domain logic for the Stockroom inventory tracker
//!
//! This crate contains the models shared between the backend and the
//! frontend (via WASM), the stock ledger engine and the inventory health
//! deriver. Storage is abstracted behind the traits in [`ledger`] and
//! [`health`], so the engine runs unchanged against PostgreSQL or the
//! in-memory store.

pub mod error;
pub mod health;
pub mod ledger;
#[cfg(feature = "memory-store")]
pub mod memory;
pub mod models;
pub mod types;
pub mod validation;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
