//! Extraction pipeline
//!
//! Fills in tag metadata for songs the cache could not populate. Tag
//! reading sits behind [`TagReader`] so the pipeline can be driven without
//! real audio files.

pub mod lofty_reader;
pub mod pipeline;
pub mod tags;

pub use lofty_reader::LoftyTagReader;
pub use pipeline::{ExtractionPipeline, PipelineStats};
pub use tags::ExtractedTags;

use std::path::Path;
use thiserror::Error;

/// Per-file extraction errors
///
/// Never fatal to a scan: the song keeps whatever metadata it already had.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// I/O error (file open/read)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt file or unsupported container
    #[error("Failed to parse tags: {0}")]
    Parse(String),

    /// The blocking read task panicked or was cancelled
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Reads tags and audio properties from one file
pub trait TagReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<ExtractedTags, ExtractionError>;
}
