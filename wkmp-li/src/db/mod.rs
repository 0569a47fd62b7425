//! Database access for wkmp-li
//!
//! Shared SQLite database; wkmp-li owns the `metadata_cache` table.

pub mod cache;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Open the database at `db_path` and create wkmp-li tables
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    let pool = wkmp_common::db::init_database(db_path).await?;
    cache::create_cache_table(&pool).await?;
    Ok(pool)
}
