//! wkmp-li - Library Indexer
//!
//! Turns an on-device audio collection into a navigable library:
//! - [`model`]: raw, unlinked metadata and its grouping-equivalence rules
//! - [`identity`]: stable UIDs and locale-aware collation keys
//! - [`cache`]: persisted metadata cache with staleness detection
//! - [`extraction`]: bounded-concurrency tag extraction
//! - [`library`]: graph builder producing the immutable [`Library`]
//! - [`indexer`]: one scan from file stubs to library, tying the above together

pub mod cache;
pub mod db;
pub mod enumerator;
pub mod extraction;
pub mod identity;
pub mod indexer;
pub mod library;
pub mod model;

pub use crate::identity::{MusicKind, Uid};
pub use crate::indexer::{IndexError, IndexOutcome, Indexer, ScanStats};
pub use crate::library::{Library, LibraryBuilder, LibraryError};
pub use crate::model::RawSong;
