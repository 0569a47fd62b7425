//! # WKMP Common Library
//!
//! Shared code for WKMP services:
//! - Error and result types
//! - Bootstrap configuration (TOML) and root folder resolution
//! - Logging initialization
//! - SQLite pool initialization
//! - Timestamp helpers

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod logging;
pub mod time;

pub use error::{Error, Result};
