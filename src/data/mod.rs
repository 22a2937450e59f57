//! Data layer module
//!
//! Handles all data persistence:
//! - SQLite database operations
//! - Stored models and typed identifiers

mod database;
mod models;

pub use database::Database;
pub use models::*;
