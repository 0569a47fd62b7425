//! Tag reader backed by lofty
//!
//! Every tag present in the file is read. The primary tag (ID3v2 for MP3,
//! Vorbis comments for FLAC/Ogg, MP4 ilst for M4A) takes priority; other
//! tags such as ID3v1 only fill keys the primary one lacks.

use super::{ExtractedTags, ExtractionError, TagReader};
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, Tag};
use std::path::Path;
use tracing::debug;

/// [`TagReader`] for every container lofty understands
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTagReader;

impl LoftyTagReader {
    pub fn new() -> Self {
        Self
    }
}

impl TagReader for LoftyTagReader {
    fn read(&self, path: &Path) -> Result<ExtractedTags, ExtractionError> {
        let tagged_file = Probe::open(path)
            .map_err(|e| ExtractionError::Io(std::io::Error::other(e)))?
            .read()
            .map_err(|e| ExtractionError::Parse(format!("Failed to read audio file tags: {}", e)))?;

        let mut extracted = ExtractedTags::new();
        let duration = tagged_file.properties().duration();
        if !duration.is_zero() {
            extracted.set_duration_ms(duration.as_millis() as u64);
        }

        let primary_type = tagged_file.primary_tag_type();
        let primary = tagged_file.primary_tag();
        if let Some(tag) = primary {
            extracted.merge_missing(tag_fields(tag));
        }
        for tag in tagged_file.tags().iter().filter(|t| t.tag_type() != primary_type) {
            extracted.merge_missing(tag_fields(tag));
        }

        if extracted.is_empty() {
            debug!(file = ?path, "No tags found in audio file");
        }

        Ok(extracted)
    }
}

/// Flatten one tag into generic keys
fn tag_fields(tag: &Tag) -> ExtractedTags {
    let mut fields = ExtractedTags::new();

    for item in tag.items() {
        let Some(key) = generic_key(item.key()) else {
            continue;
        };
        if let Some(text) = item.value().text() {
            // ID3v2.4 packs multiple values into one frame, NUL-separated
            for value in text.split('\0') {
                fields.insert(&key, value);
            }
        }
    }

    if fields.values("YEAR").is_empty() {
        if let Some(year) = tag.year() {
            fields.insert("YEAR", &year.to_string());
        }
    }

    fields
}

fn generic_key(key: &ItemKey) -> Option<String> {
    let generic = match key {
        ItemKey::TrackTitle => "TITLE",
        ItemKey::TrackTitleSortOrder => "TITLESORT",
        ItemKey::TrackArtist => "ARTIST",
        ItemKey::TrackArtistSortOrder => "ARTISTSORT",
        ItemKey::AlbumTitle => "ALBUM",
        ItemKey::AlbumTitleSortOrder => "ALBUMSORT",
        ItemKey::AlbumArtist => "ALBUMARTIST",
        ItemKey::AlbumArtistSortOrder => "ALBUMARTISTSORT",
        ItemKey::TrackNumber => "TRACKNUMBER",
        ItemKey::DiscNumber => "DISCNUMBER",
        ItemKey::SetSubtitle => "SETSUBTITLE",
        ItemKey::RecordingDate => "DATE",
        ItemKey::ReleaseDate => "RELEASEDATE",
        ItemKey::OriginalReleaseDate => "ORIGINALDATE",
        ItemKey::Genre => "GENRE",
        ItemKey::MusicBrainzRecordingId => "MUSICBRAINZ_TRACKID",
        ItemKey::MusicBrainzTrackId => "MUSICBRAINZ_RELEASETRACKID",
        ItemKey::MusicBrainzReleaseId => "MUSICBRAINZ_ALBUMID",
        ItemKey::MusicBrainzArtistId => "MUSICBRAINZ_ARTISTID",
        ItemKey::MusicBrainzReleaseArtistId => "MUSICBRAINZ_ALBUMARTISTID",
        ItemKey::Unknown(raw) => return Some(super::tags::normalize_key(raw)),
        _ => return None,
    };
    Some(generic.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_generic_keys() {
        assert_eq!(generic_key(&ItemKey::TrackArtist).as_deref(), Some("ARTIST"));
        assert_eq!(
            generic_key(&ItemKey::OriginalReleaseDate).as_deref(),
            Some("ORIGINALDATE")
        );
        assert_eq!(
            generic_key(&ItemKey::Unknown("Artists".to_string())).as_deref(),
            Some("ARTISTS")
        );
        assert_eq!(
            generic_key(&ItemKey::Unknown("MusicBrainz Album Type".to_string())).as_deref(),
            Some("MUSICBRAINZ_ALBUMTYPE")
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let reader = LoftyTagReader::new();
        let result = reader.read(Path::new("/nonexistent/path/song.mp3"));
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn test_garbage_file_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".flac").tempfile().unwrap();
        file.write_all(b"definitely not a flac stream").unwrap();

        let reader = LoftyTagReader::new();
        assert!(reader.read(file.path()).is_err());
    }
}
