//! Metadata cache
//!
//! Avoids re-reading tags for files that have not changed since the last
//! scan. Loaded in bulk at scan start, rewritten in bulk at scan end, never
//! updated incrementally.
//!
//! Staleness is judged by exact add/modify timestamp equality only. A file
//! rewritten within the same second keeps its old cache entry; comparing
//! content would mean reading every file, which is what the cache avoids.
//!
//! Storage failures never abort a scan: a failed read is a full cache miss,
//! a failed write is logged and ignored.

pub mod codec;
pub mod entry;

pub use entry::CacheEntry;

use crate::model::RawSong;
use anyhow::Result;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// In-memory snapshot of the persisted cache for one scan
#[derive(Debug, Default)]
pub struct MetadataCache {
    entries: HashMap<u64, CacheEntry>,
    invalidated: bool,
}

impl MetadataCache {
    pub fn new(entries: impl IntoIterator<Item = CacheEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.file_id, e)).collect(),
            invalidated: false,
        }
    }

    /// Fill `raw` from a fresh cache entry
    ///
    /// Returns `false` and marks the whole cache invalidated when the file
    /// has no entry or either timestamp differs.
    pub fn populate(&mut self, raw: &mut RawSong) -> bool {
        match self.entries.get(&raw.file_id) {
            Some(entry)
                if entry.date_added == raw.date_added
                    && entry.date_modified == raw.date_modified =>
            {
                entry.apply_to(raw);
                true
            }
            Some(_) => {
                debug!(file_id = raw.file_id, file = %raw.file_name, "Stale cache entry");
                self.invalidated = true;
                false
            }
            None => {
                debug!(file_id = raw.file_id, file = %raw.file_name, "No cache entry");
                self.invalidated = true;
                false
            }
        }
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache persistence on the shared SQLite database
#[derive(Clone)]
pub struct CacheRepository {
    pool: SqlitePool,
}

impl CacheRepository {
    /// Wrap `pool`, creating the cache table if needed
    pub async fn open(pool: SqlitePool) -> Result<Self> {
        crate::db::cache::create_cache_table(&pool).await?;
        Ok(Self { pool })
    }

    /// Load every persisted entry; `None` (logged) on storage failure
    pub async fn read(&self) -> Option<MetadataCache> {
        match crate::db::cache::load_all_entries(&self.pool).await {
            Ok(entries) => {
                let cache = MetadataCache::new(entries);
                info!(entries = cache.len(), "Metadata cache loaded");
                Some(cache)
            }
            Err(e) => {
                warn!(error = %e, "Failed to read metadata cache, extracting all files");
                None
            }
        }
    }

    /// Replace the persisted cache with `songs`; returns whether it succeeded
    pub async fn write(&self, songs: &[RawSong]) -> bool {
        let entries: Vec<CacheEntry> = songs.iter().map(CacheEntry::from_raw).collect();
        match crate::db::cache::replace_all_entries(&self.pool, &entries).await {
            Ok(()) => {
                info!(entries = entries.len(), "Metadata cache written");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to write metadata cache");
                false
            }
        }
    }
}
