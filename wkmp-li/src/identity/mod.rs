//! Identity & collation
//!
//! [`Uid`] gives every finalized node a stable identity across scans and
//! restarts. [`CollationKey`] drives user-facing sort order and is never
//! used for identity or grouping.

pub mod collation;
pub mod uid;

pub use collation::CollationKey;
pub use uid::{MusicKind, Uid, UidHasher};
