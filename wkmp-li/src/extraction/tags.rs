//! Normalised tag map and per-family precedence rules
//!
//! Readers put every tag item under a generic Vorbis-style key
//! (`TITLE`, `ARTIST`, `ALBUMARTIST`, ...). [`ExtractedTags::apply`] then
//! picks, per tag family, the richest variant that is present.

use crate::model::{Date, RawSong};
use std::collections::HashMap;

const SONG_MBID_KEYS: &[&str] = &["MUSICBRAINZ_RELEASETRACKID", "MUSICBRAINZ_TRACKID"];
const DATE_KEYS: &[&str] = &["ORIGINALDATE", "ORIGINALYEAR", "DATE", "RELEASEDATE", "YEAR"];
const SUBTITLE_KEYS: &[&str] = &["DISCSUBTITLE", "SETSUBTITLE"];
const RELEASE_TYPE_KEYS: &[&str] = &["RELEASETYPE", "MUSICBRAINZ_ALBUMTYPE"];
const ARTIST_KEYS: &[&str] = &["ARTISTS", "ARTIST"];
const ARTIST_SORT_KEYS: &[&str] = &["ARTISTS_SORT", "ARTISTSORT"];
const ALBUM_ARTIST_KEYS: &[&str] = &["ALBUMARTISTS", "ALBUMARTIST"];
const ALBUM_ARTIST_SORT_KEYS: &[&str] = &["ALBUMARTISTS_SORT", "ALBUMARTISTSORT"];

/// Spelling variants (mostly ID3v2 `TXXX` descriptions) of generic keys
const KEY_ALIASES: &[(&str, &str)] = &[
    ("ALBUM ARTIST", "ALBUMARTIST"),
    ("ALBUM_ARTIST", "ALBUMARTIST"),
    ("ARTISTSSORT", "ARTISTS_SORT"),
    ("ALBUMARTISTSSORT", "ALBUMARTISTS_SORT"),
    ("ORIGINAL DATE", "ORIGINALDATE"),
    ("ORIGINAL YEAR", "ORIGINALYEAR"),
    ("RELEASE TYPE", "RELEASETYPE"),
    ("MUSICBRAINZ ALBUM TYPE", "MUSICBRAINZ_ALBUMTYPE"),
    ("MUSICBRAINZ ALBUM ID", "MUSICBRAINZ_ALBUMID"),
    ("MUSICBRAINZ ARTIST ID", "MUSICBRAINZ_ARTISTID"),
    ("MUSICBRAINZ ALBUM ARTIST ID", "MUSICBRAINZ_ALBUMARTISTID"),
    ("MUSICBRAINZ RELEASE TRACK ID", "MUSICBRAINZ_RELEASETRACKID"),
    ("MUSICBRAINZ TRACK ID", "MUSICBRAINZ_TRACKID"),
];

/// Map a raw tag key onto its generic upper-case name
pub fn normalize_key(key: &str) -> String {
    let key = key.trim();
    let key = match key.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("TXXX:") => &key[5..],
        _ => key,
    };
    let upper = key.to_uppercase();

    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, generic)| generic.to_string())
        .unwrap_or(upper)
}

/// Tags read from one file, keyed by generic name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedTags {
    fields: HashMap<String, Vec<String>>,
    duration_ms: Option<u64>,
}

impl ExtractedTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_duration_ms(&mut self, duration_ms: u64) {
        self.duration_ms = Some(duration_ms);
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    /// Add a value under the generic form of `key`; blank values are dropped
    pub fn insert(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.fields
            .entry(normalize_key(key))
            .or_default()
            .push(value.to_string());
    }

    /// Take over every key of `other` that this map does not have yet
    ///
    /// Used to layer a lower-priority tag (e.g. ID3v1) under a richer one.
    pub fn merge_missing(&mut self, other: ExtractedTags) {
        for (key, values) in other.fields {
            self.fields.entry(key).or_insert(values);
        }
        if self.duration_ms.is_none() {
            self.duration_ms = other.duration_ms;
        }
    }

    pub fn values(&self, key: &str) -> &[String] {
        self.fields.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Values of the first key in `keys` that has any
    fn values_of(&self, keys: &[&str]) -> &[String] {
        keys.iter()
            .map(|key| self.values(key))
            .find(|values| !values.is_empty())
            .unwrap_or(&[])
    }

    fn first_of(&self, keys: &[&str]) -> Option<&String> {
        self.values_of(keys).first()
    }

    /// Copy extracted fields onto `raw`, leaving fields the tags lack untouched
    pub fn apply(&self, raw: &mut RawSong) {
        if let Some(duration_ms) = self.duration_ms {
            raw.duration_ms = Some(duration_ms);
        }

        set_text(&mut raw.musicbrainz_id, self.first_of(SONG_MBID_KEYS));
        set_text(&mut raw.name, self.first_of(&["TITLE"]));
        set_text(&mut raw.sort_name, self.first_of(&["TITLESORT"]));
        if let Some(track) = self.first_of(&["TRACKNUMBER"]).and_then(|v| parse_position(v)) {
            raw.track = Some(track);
        }
        if let Some(disc) = self.first_of(&["DISCNUMBER"]).and_then(|v| parse_position(v)) {
            raw.disc = Some(disc);
        }
        set_text(&mut raw.subtitle, self.first_of(SUBTITLE_KEYS));

        // First variant that actually parses wins, not merely the first present
        let date = DATE_KEYS
            .iter()
            .flat_map(|key| self.values(key))
            .find_map(|value| Date::parse(value));
        if date.is_some() {
            raw.date = date;
        }

        set_text(&mut raw.album_musicbrainz_id, self.first_of(&["MUSICBRAINZ_ALBUMID"]));
        set_text(&mut raw.album_name, self.first_of(&["ALBUM"]));
        set_text(&mut raw.album_sort_name, self.first_of(&["ALBUMSORT"]));
        set_list(&mut raw.release_types, self.values_of(RELEASE_TYPE_KEYS));

        set_list(&mut raw.artist_musicbrainz_ids, self.values("MUSICBRAINZ_ARTISTID"));
        set_list(&mut raw.artist_names, self.values_of(ARTIST_KEYS));
        set_list(&mut raw.artist_sort_names, self.values_of(ARTIST_SORT_KEYS));

        set_list(
            &mut raw.album_artist_musicbrainz_ids,
            self.values("MUSICBRAINZ_ALBUMARTISTID"),
        );
        set_list(&mut raw.album_artist_names, self.values_of(ALBUM_ARTIST_KEYS));
        set_list(&mut raw.album_artist_sort_names, self.values_of(ALBUM_ARTIST_SORT_KEYS));

        set_list(&mut raw.genre_names, self.values("GENRE"));
    }
}

fn set_text(target: &mut Option<String>, value: Option<&String>) {
    if let Some(value) = value {
        *target = Some(value.clone());
    }
}

fn set_list(target: &mut Vec<String>, values: &[String]) {
    if !values.is_empty() {
        *target = values.to_vec();
    }
}

/// Track/disc position from `N` or `N/M`; zero is treated as absent
fn parse_position(value: &str) -> Option<u32> {
    let number = value.split('/').next()?.trim();
    number.parse::<u32>().ok().filter(|n| *n > 0)
}
