//! Database module: models, schema and storage for the credit records.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and their choice columns
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `rows.rs`: row decoding and inserts usable inside a transaction
//! - `sqlite.rs`: pooled storage API used by handlers and the score ledger

pub mod models;
pub mod rows;
pub mod schema;
pub mod sqlite;

pub use schema::SQLITE_INIT;
pub use sqlite::{CibilStorage, SqlitePool, connect};
