//! Raw entity model
//!
//! Extracted-but-unlinked metadata. A [`RawSong`] is filled by the cache and
//! the extraction pipeline, then consumed once by the graph builder. The
//! grouping keys ([`RawAlbum`], [`RawArtist`], [`RawGenre`]) exist only to
//! bucket songs.

pub mod date;
pub mod raw;
pub mod release;

pub use date::{Date, DateRange};
pub use raw::{RawAlbum, RawArtist, RawGenre, RawSong};
pub use release::{Disc, Refinement, ReleaseType};
