//! Persisted cache record

use crate::model::{Date, RawSong};

/// Everything needed to rebuild a [`RawSong`] without reading the file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheEntry {
    pub file_id: u64,
    pub date_added: i64,
    pub date_modified: i64,
    pub size: u64,
    pub duration_ms: Option<u64>,

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

impl CacheEntry {
    pub fn from_raw(raw: &RawSong) -> Self {
        Self {
            file_id: raw.file_id,
            date_added: raw.date_added,
            date_modified: raw.date_modified,
            size: raw.size,
            duration_ms: raw.duration_ms,
            musicbrainz_id: raw.musicbrainz_id.clone(),
            name: raw.name.clone(),
            sort_name: raw.sort_name.clone(),
            track: raw.track,
            disc: raw.disc,
            subtitle: raw.subtitle.clone(),
            date: raw.date,
            album_musicbrainz_id: raw.album_musicbrainz_id.clone(),
            album_name: raw.album_name.clone(),
            album_sort_name: raw.album_sort_name.clone(),
            release_types: raw.release_types.clone(),
            artist_musicbrainz_ids: raw.artist_musicbrainz_ids.clone(),
            artist_names: raw.artist_names.clone(),
            artist_sort_names: raw.artist_sort_names.clone(),
            album_artist_musicbrainz_ids: raw.album_artist_musicbrainz_ids.clone(),
            album_artist_names: raw.album_artist_names.clone(),
            album_artist_sort_names: raw.album_artist_sort_names.clone(),
            genre_names: raw.genre_names.clone(),
        }
    }

    /// Copy every cached tag field onto `raw`; file identity stays untouched
    pub fn apply_to(&self, raw: &mut RawSong) {
        if self.duration_ms.is_some() {
            raw.duration_ms = self.duration_ms;
        }
        raw.musicbrainz_id = self.musicbrainz_id.clone();
        raw.name = self.name.clone();
        raw.sort_name = self.sort_name.clone();
        raw.track = self.track;
        raw.disc = self.disc;
        raw.subtitle = self.subtitle.clone();
        raw.date = self.date;
        raw.album_musicbrainz_id = self.album_musicbrainz_id.clone();
        raw.album_name = self.album_name.clone();
        raw.album_sort_name = self.album_sort_name.clone();
        raw.release_types = self.release_types.clone();
        raw.artist_musicbrainz_ids = self.artist_musicbrainz_ids.clone();
        raw.artist_names = self.artist_names.clone();
        raw.artist_sort_names = self.artist_sort_names.clone();
        raw.album_artist_musicbrainz_ids = self.album_artist_musicbrainz_ids.clone();
        raw.album_artist_names = self.album_artist_names.clone();
        raw.album_artist_sort_names = self.album_artist_sort_names.clone();
        raw.genre_names = self.genre_names.clone();
    }
}
