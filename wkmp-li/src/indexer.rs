//! One library scan, from file stubs to a finished [`Library`]
//!
//! Stages: cache lookup, extraction of the misses, graph build, cache
//! rewrite. Cancellation is honoured between stages; a cancelled scan
//! discards everything it extracted and produces no library.

use crate::cache::CacheRepository;
use crate::extraction::{ExtractionPipeline, LoftyTagReader, TagReader};
use crate::library::{Library, LibraryBuilder, LibraryError};
use crate::model::RawSong;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use wkmp_common::config::MusicSettings;

/// Scan failures; the caller keeps whatever library it already had
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Scan cancelled")]
    Cancelled,

    #[error("Library construction failed: {0}")]
    Library(#[from] LibraryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Counters for one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Stubs handed to the scan
    pub total: usize,
    /// Songs filled from the metadata cache
    pub cache_hits: usize,
    /// Songs whose tags were read successfully
    pub extracted: usize,
    /// Songs whose tag read failed (kept with enumerator metadata)
    pub extraction_failed: usize,
    pub cache_written: bool,
}

#[derive(Debug)]
pub struct IndexOutcome {
    pub library: Library,
    pub stats: ScanStats,
}

pub struct Indexer {
    cache: CacheRepository,
    settings: MusicSettings,
    reader: Arc<dyn TagReader>,
}

impl Indexer {
    pub fn new(cache: CacheRepository, settings: MusicSettings) -> Self {
        Self {
            cache,
            settings,
            reader: Arc::new(LoftyTagReader::new()),
        }
    }

    /// Replace the tag reader (tests, alternate backends)
    pub fn with_reader(mut self, reader: Arc<dyn TagReader>) -> Self {
        self.reader = reader;
        self
    }

    pub async fn index(
        &self,
        stubs: Vec<RawSong>,
        cancel: &CancellationToken,
    ) -> Result<IndexOutcome, IndexError> {
        let mut stats = ScanStats {
            total: stubs.len(),
            ..ScanStats::default()
        };
        info!(files = stats.total, "Starting library scan");

        // Cache stage
        let mut cache = self.cache.read().await;
        let mut songs = Vec::with_capacity(stubs.len());
        let mut pending = Vec::new();
        for mut stub in stubs {
            let hit = cache.as_mut().is_some_and(|c| c.populate(&mut stub));
            if hit {
                songs.push(stub);
            } else {
                pending.push(stub);
            }
        }
        stats.cache_hits = songs.len();
        info!(hits = stats.cache_hits, misses = pending.len(), "Cache stage complete");
        check_cancelled(cancel)?;

        // Extraction stage
        let pipeline = ExtractionPipeline::new(Arc::clone(&self.reader))
            .with_pool_size(self.settings.extraction_pool_size);
        let (extracted, pipeline_stats) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Scan cancelled during extraction");
                return Err(IndexError::Cancelled);
            }
            result = pipeline.extract_all(pending) => result,
        };
        stats.extracted = pipeline_stats.extracted;
        stats.extraction_failed = pipeline_stats.failed;
        songs.extend(extracted);
        info!(
            extracted = stats.extracted,
            failed = stats.extraction_failed,
            "Extraction stage complete"
        );
        check_cancelled(cancel)?;

        // Build stage
        let builder = LibraryBuilder::new(&self.settings);
        let (built, songs) = tokio::task::spawn_blocking(move || {
            let built = builder.build(&songs);
            (built, songs)
        })
        .await
        .map_err(|e| IndexError::Internal(format!("Library build task failed: {}", e)))?;
        let library = built.map_err(|e| {
            error!(error = %e, "Library construction failed");
            IndexError::from(e)
        })?;
        check_cancelled(cancel)?;

        // Cache write stage; rows for deleted files also force a rewrite
        let needs_write = match &cache {
            None => true,
            Some(cache) => cache.is_invalidated() || cache.len() != stats.cache_hits,
        };
        if needs_write {
            stats.cache_written = self.cache.write(&songs).await;
        }

        info!(
            songs = library.songs().len(),
            albums = library.albums().len(),
            artists = library.artists().len(),
            genres = library.genres().len(),
            cache_written = stats.cache_written,
            "Library scan complete"
        );
        Ok(IndexOutcome { library, stats })
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), IndexError> {
    if cancel.is_cancelled() {
        info!("Scan cancelled");
        return Err(IndexError::Cancelled);
    }
    Ok(())
}
