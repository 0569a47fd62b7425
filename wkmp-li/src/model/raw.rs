//! Raw songs and their grouping keys
//!
//! Grouping keys compare in two tiers:
//! 1. both sides carry a MusicBrainz id: compare only the ids, case-sensitively;
//! 2. neither side carries one: compare names case-insensitively (albums also
//!    compare their artists' names, in order).
//!
//! A key with an id never equals a key without one. Hash codes are computed
//! once at construction; `Hash` only feeds the cached value.

use super::date::Date;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use unicase::UniCase;

/// Extracted-but-unlinked metadata for one audio file
///
/// File identity fields are always present (they come from the enumerator).
/// Tag fields start unset and are filled by the cache or by extraction.
/// List-valued tag fields hold raw values exactly as read, before any
/// multi-value separator parsing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSong {
    pub file_id: u64,
    /// Unix seconds
    pub date_added: i64,
    /// Unix seconds
    pub date_modified: i64,
    pub file_name: String,
    pub directory: PathBuf,
    pub size: u64,
    pub duration_ms: Option<u64>,
    pub mime_type: String,

    pub musicbrainz_id: Option<String>,
    pub name: Option<String>,
    pub sort_name: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub subtitle: Option<String>,
    pub date: Option<Date>,

    pub album_musicbrainz_id: Option<String>,
    pub album_name: Option<String>,
    pub album_sort_name: Option<String>,
    pub release_types: Vec<String>,

    pub artist_musicbrainz_ids: Vec<String>,
    pub artist_names: Vec<String>,
    pub artist_sort_names: Vec<String>,

    pub album_artist_musicbrainz_ids: Vec<String>,
    pub album_artist_names: Vec<String>,
    pub album_artist_sort_names: Vec<String>,

    pub genre_names: Vec<String>,
}

impl RawSong {
    /// Enumerator-shaped stub: file identity only, every tag field unset
    pub fn stub(
        file_id: u64,
        date_added: i64,
        date_modified: i64,
        path: &Path,
        size: u64,
        mime_type: &str,
    ) -> Self {
        Self {
            file_id,
            date_added,
            date_modified,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            size,
            mime_type: mime_type.to_string(),
            ..Self::default()
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.file_name)
    }

    /// File name without its extension
    pub fn file_stem(&self) -> &str {
        match self.file_name.rfind('.') {
            Some(dot) if dot > 0 => &self.file_name[..dot],
            _ => &self.file_name,
        }
    }

    /// Name of the directory holding the file
    pub fn directory_name(&self) -> Option<String> {
        self.directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

fn hash_name(state: &mut DefaultHasher, name: Option<&str>) {
    match name {
        Some(name) => {
            state.write_u8(1);
            UniCase::new(name).hash(state);
        }
        None => state.write_u8(0),
    }
}

fn names_equal(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => UniCase::new(a) == UniCase::new(b),
        (None, None) => true,
        _ => false,
    }
}

/// Artist grouping key; a `None` name is the unknown-artist placeholder
#[derive(Debug, Clone)]
pub struct RawArtist {
    pub musicbrainz_id: Option<String>,
    pub name: Option<String>,
    pub sort_name: Option<String>,
    hash: u64,
}

impl RawArtist {
    pub fn new(musicbrainz_id: Option<String>, name: Option<String>, sort_name: Option<String>) -> Self {
        let mut state = DefaultHasher::new();
        match &musicbrainz_id {
            Some(id) => {
                state.write_u8(1);
                id.hash(&mut state);
            }
            None => hash_name(&mut state, name.as_deref()),
        }

        Self {
            musicbrainz_id,
            name,
            sort_name,
            hash: state.finish(),
        }
    }

    pub fn unknown() -> Self {
        Self::new(None, None, None)
    }

    pub fn is_unknown(&self) -> bool {
        self.musicbrainz_id.is_none() && self.name.is_none()
    }
}

impl PartialEq for RawArtist {
    fn eq(&self, other: &Self) -> bool {
        match (&self.musicbrainz_id, &other.musicbrainz_id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => names_equal(self.name.as_deref(), other.name.as_deref()),
            _ => false,
        }
    }
}

impl Eq for RawArtist {}

impl Hash for RawArtist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Album grouping key
#[derive(Debug, Clone)]
pub struct RawAlbum {
    pub musicbrainz_id: Option<String>,
    pub name: String,
    pub sort_name: Option<String>,
    pub release_types: Vec<String>,
    /// Album artists, falling back to track artists, then the placeholder
    pub raw_artists: Vec<RawArtist>,
    hash: u64,
}

impl RawAlbum {
    pub fn new(
        musicbrainz_id: Option<String>,
        name: String,
        sort_name: Option<String>,
        release_types: Vec<String>,
        raw_artists: Vec<RawArtist>,
    ) -> Self {
        let mut state = DefaultHasher::new();
        match &musicbrainz_id {
            Some(id) => {
                state.write_u8(1);
                id.hash(&mut state);
            }
            None => {
                hash_name(&mut state, Some(&name));
                state.write_usize(raw_artists.len());
                for artist in &raw_artists {
                    hash_name(&mut state, artist.name.as_deref());
                }
            }
        }

        Self {
            musicbrainz_id,
            name,
            sort_name,
            release_types,
            raw_artists,
            hash: state.finish(),
        }
    }
}

impl PartialEq for RawAlbum {
    fn eq(&self, other: &Self) -> bool {
        match (&self.musicbrainz_id, &other.musicbrainz_id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => {
                names_equal(Some(&self.name), Some(&other.name))
                    && self.raw_artists.len() == other.raw_artists.len()
                    && self
                        .raw_artists
                        .iter()
                        .zip(&other.raw_artists)
                        .all(|(a, b)| names_equal(a.name.as_deref(), b.name.as_deref()))
            }
            _ => false,
        }
    }
}

impl Eq for RawAlbum {}

impl Hash for RawAlbum {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

/// Genre grouping key; genres carry no MusicBrainz id
#[derive(Debug, Clone)]
pub struct RawGenre {
    pub name: String,
    hash: u64,
}

impl RawGenre {
    pub fn new(name: String) -> Self {
        let mut state = DefaultHasher::new();
        hash_name(&mut state, Some(&name));
        Self {
            name,
            hash: state.finish(),
        }
    }
}

impl PartialEq for RawGenre {
    fn eq(&self, other: &Self) -> bool {
        names_equal(Some(&self.name), Some(&other.name))
    }
}

impl Eq for RawGenre {}

impl Hash for RawGenre {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}
