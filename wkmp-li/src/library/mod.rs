//! Immutable music library graph
//!
//! The [`Library`] is the sole owner of every node. Nodes refer to each
//! other through index newtypes ([`SongId`], [`AlbumId`], [`ArtistId`],
//! [`GenreId`]) into its arenas, so Song/Album/Artist/Genre links run both
//! ways without shared ownership. Each arena is stored in collation order,
//! ties broken by UID.
//!
//! Nodes are produced by [`LibraryBuilder`] and expose only `&self`
//! accessors; a library never changes after it is built.

pub mod builder;
pub mod genres;
pub mod separators;

pub use builder::LibraryBuilder;
pub use separators::Separators;

use crate::identity::{CollationKey, MusicKind, Uid};
use crate::model::{Date, DateRange, Disc, ReleaseType};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Library construction errors
///
/// These indicate a grouping defect, not bad input: no library is
/// produced and the previous one (if any) stays in place.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{kind} {name:?} has no songs")]
    EmptyNode { kind: MusicKind, name: String },
}

macro_rules! node_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position in the library's sorted list
            pub fn index(self) -> usize {
                self.0
            }
        }
    };
}

node_id!(
    /// Index of a [`Song`] in [`Library::songs`]
    SongId
);
node_id!(
    /// Index of an [`Album`] in [`Library::albums`]
    AlbumId
);
node_id!(
    /// Index of an [`Artist`] in [`Library::artists`]
    ArtistId
);
node_id!(
    /// Index of a [`Genre`] in [`Library::genres`]
    GenreId
);

/// One audio file
#[derive(Debug, Clone)]
pub struct Song {
    pub(crate) uid: Uid,
    pub(crate) name: String,
    pub(crate) sort_name: Option<String>,
    pub(crate) collation: CollationKey,
    pub(crate) file_id: u64,
    pub(crate) path: PathBuf,
    pub(crate) mime_type: String,
    pub(crate) size: u64,
    pub(crate) duration_ms: Option<u64>,
    pub(crate) date_added: i64,
    pub(crate) date_modified: i64,
    pub(crate) track: Option<u32>,
    pub(crate) disc: Option<Disc>,
    pub(crate) date: Option<Date>,
    pub(crate) album: AlbumId,
    pub(crate) artists: Vec<ArtistId>,
    pub(crate) genres: Vec<GenreId>,
}

impl Song {
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Title tag, or the file name without extension
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort_name(&self) -> Option<&str> {
        self.sort_name.as_deref()
    }

    pub fn collation_key(&self) -> &CollationKey {
        &self.collation
    }

    pub fn file_id(&self) -> u64 {
        self.file_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    pub fn date_added(&self) -> i64 {
        self.date_added
    }

    pub fn date_modified(&self) -> i64 {
        self.date_modified
    }

    pub fn track(&self) -> Option<u32> {
        self.track
    }

    pub fn disc(&self) -> Option<&Disc> {
        self.disc.as_ref()
    }

    pub fn date(&self) -> Option<Date> {
        self.date
    }

    pub fn album(&self) -> AlbumId {
        self.album
    }

    /// Linked artists in tag order
    pub fn artists(&self) -> &[ArtistId] {
        &self.artists
    }

    /// Linked genres in tag order; empty when the file has no genre tag
    pub fn genres(&self) -> &[GenreId] {
        &self.genres
    }
}

#[derive(Debug, Clone)]
pub struct Album {
    pub(crate) uid: Uid,
    pub(crate) name: String,
    pub(crate) sort_name: Option<String>,
    pub(crate) collation: CollationKey,
    pub(crate) release_type: ReleaseType,
    pub(crate) dates: Option<DateRange>,
    pub(crate) duration_ms: u64,
    pub(crate) date_added: i64,
    pub(crate) songs: Vec<SongId>,
    pub(crate) artists: Vec<ArtistId>,
}

impl Album {
    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort_name(&self) -> Option<&str> {
        self.sort_name.as_deref()
    }

    pub fn collation_key(&self) -> &CollationKey {
        &self.collation
    }

    pub fn release_type(&self) -> ReleaseType {
        self.release_type
    }

    /// Earliest to latest song date
    pub fn dates(&self) -> Option<DateRange> {
        self.dates
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Earliest `date_added` of its songs
    pub fn date_added(&self) -> i64 {
        self.date_added
    }

    /// Songs ordered by disc, then track
    pub fn songs(&self) -> &[SongId] {
        &self.songs
    }

    /// Album artists in tag order
    pub fn artists(&self) -> &[ArtistId] {
        &self.artists
    }
}

#[derive(Debug, Clone)]
pub struct Artist {
    pub(crate) uid: Uid,
    pub(crate) name: Option<String>,
    pub(crate) sort_name: Option<String>,
    pub(crate) collation: CollationKey,
    pub(crate) songs: Vec<SongId>,
    pub(crate) explicit_albums: Vec<AlbumId>,
    pub(crate) implicit_albums: Vec<AlbumId>,
    pub(crate) genres: Vec<GenreId>,
    pub(crate) duration_ms: u64,
}

impl Artist {
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// `None` for the unknown-artist placeholder
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_unknown(&self) -> bool {
        self.name.is_none()
    }

    pub fn sort_name(&self) -> Option<&str> {
        self.sort_name.as_deref()
    }

    pub fn collation_key(&self) -> &CollationKey {
        &self.collation
    }

    /// Songs crediting this artist
    pub fn songs(&self) -> &[SongId] {
        &self.songs
    }

    /// Albums crediting this artist as album artist
    pub fn explicit_albums(&self) -> &[AlbumId] {
        &self.explicit_albums
    }

    /// Other albums holding songs by this artist
    pub fn implicit_albums(&self) -> &[AlbumId] {
        &self.implicit_albums
    }

    /// Genres of its songs, most frequent first
    pub fn genres(&self) -> &[GenreId] {
        &self.genres
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

#[derive(Debug, Clone)]
pub struct Genre {
    pub(crate) uid: Uid,
    pub(crate) name: String,
    pub(crate) collation: CollationKey,
    pub(crate) songs: Vec<SongId>,
    pub(crate) albums: Vec<AlbumId>,
    pub(crate) artists: Vec<ArtistId>,
    pub(crate) duration_ms: u64,
}

impl Genre {
    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collation_key(&self) -> &CollationKey {
        &self.collation
    }

    pub fn songs(&self) -> &[SongId] {
        &self.songs
    }

    /// Albums ranked by how many of their songs carry this genre
    pub fn albums(&self) -> &[AlbumId] {
        &self.albums
    }

    /// Artists ranked by how many of their songs carry this genre
    pub fn artists(&self) -> &[ArtistId] {
        &self.artists
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// Any node, as returned by UID lookup
#[derive(Debug, Clone, Copy)]
pub enum MusicNode<'a> {
    Song(&'a Song),
    Album(&'a Album),
    Artist(&'a Artist),
    Genre(&'a Genre),
}

impl MusicNode<'_> {
    pub fn uid(&self) -> Uid {
        match self {
            MusicNode::Song(song) => song.uid,
            MusicNode::Album(album) => album.uid,
            MusicNode::Artist(artist) => artist.uid,
            MusicNode::Genre(genre) => genre.uid,
        }
    }

    pub fn kind(&self) -> MusicKind {
        self.uid().kind()
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            MusicNode::Song(song) => Some(song.name()),
            MusicNode::Album(album) => Some(album.name()),
            MusicNode::Artist(artist) => artist.name(),
            MusicNode::Genre(genre) => Some(genre.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeRef {
    Song(SongId),
    Album(AlbumId),
    Artist(ArtistId),
    Genre(GenreId),
}

/// Result of one successful scan
#[derive(Debug, Clone, Default)]
pub struct Library {
    pub(crate) songs: Vec<Song>,
    pub(crate) albums: Vec<Album>,
    pub(crate) artists: Vec<Artist>,
    pub(crate) genres: Vec<Genre>,
    pub(crate) uid_map: HashMap<Uid, NodeRef>,
}

impl Library {
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn song(&self, id: SongId) -> Option<&Song> {
        self.songs.get(id.0)
    }

    pub fn album(&self, id: AlbumId) -> Option<&Album> {
        self.albums.get(id.0)
    }

    pub fn artist(&self, id: ArtistId) -> Option<&Artist> {
        self.artists.get(id.0)
    }

    pub fn genre(&self, id: GenreId) -> Option<&Genre> {
        self.genres.get(id.0)
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn find(&self, uid: &Uid) -> Option<MusicNode<'_>> {
        match *self.uid_map.get(uid)? {
            NodeRef::Song(id) => self.song(id).map(MusicNode::Song),
            NodeRef::Album(id) => self.album(id).map(MusicNode::Album),
            NodeRef::Artist(id) => self.artist(id).map(MusicNode::Artist),
            NodeRef::Genre(id) => self.genre(id).map(MusicNode::Genre),
        }
    }

    /// Look up a UID in its string form; malformed strings find nothing
    pub fn find_str(&self, uid: &str) -> Option<MusicNode<'_>> {
        self.find(&Uid::parse(uid)?)
    }
}
