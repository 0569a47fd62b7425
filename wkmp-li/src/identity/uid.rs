//! Deterministic UIDs
//!
//! A node is identified by its MusicBrainz id when the tags carry a valid
//! one, otherwise by a SHA-256 digest of its semantically stable fields,
//! truncated to 128 bits. The entity kind is part of both forms, so a song
//! and an album built from identical bytes never collide.

use crate::model::Date;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

const HASH_NAMESPACE: &str = "wkmp";
const MUSICBRAINZ_NAMESPACE: &str = "org.musicbrainz";

/// Entity kind a UID belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MusicKind {
    Song,
    Album,
    Artist,
    Genre,
}

impl MusicKind {
    fn code(self) -> char {
        match self {
            MusicKind::Song => 's',
            MusicKind::Album => 'l',
            MusicKind::Artist => 'r',
            MusicKind::Genre => 'g',
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "s" => Some(MusicKind::Song),
            "l" => Some(MusicKind::Album),
            "r" => Some(MusicKind::Artist),
            "g" => Some(MusicKind::Genre),
            _ => None,
        }
    }
}

impl fmt::Display for MusicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MusicKind::Song => "song",
            MusicKind::Album => "album",
            MusicKind::Artist => "artist",
            MusicKind::Genre => "genre",
        };
        f.write_str(name)
    }
}

/// Global identity of a finalized library node
///
/// Two UIDs are equal iff format, kind and value all match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Uid {
    MusicBrainz { kind: MusicKind, id: Uuid },
    ContentHash { kind: MusicKind, hash: Uuid },
}

impl Uid {
    /// UID from a MusicBrainz id; `None` if the id is not a valid UUID
    pub fn musicbrainz(kind: MusicKind, id: &str) -> Option<Self> {
        Uuid::parse_str(id.trim())
            .ok()
            .map(|id| Uid::MusicBrainz { kind, id })
    }

    /// Lowercase hyphenated form of a MusicBrainz id; `None` if not a UUID
    ///
    /// Grouping keys carry ids in this form so that grouping and identity
    /// agree on which ids are equal.
    pub fn canonical_musicbrainz_id(id: &str) -> Option<String> {
        Uuid::parse_str(id.trim())
            .ok()
            .map(|id| id.hyphenated().to_string())
    }

    /// UID from a digest of the fields fed by `update`
    pub fn hashed(kind: MusicKind, update: impl FnOnce(&mut UidHasher)) -> Self {
        let mut hasher = UidHasher::new(kind);
        update(&mut hasher);
        Uid::ContentHash {
            kind,
            hash: hasher.finish(),
        }
    }

    pub fn kind(&self) -> MusicKind {
        match self {
            Uid::MusicBrainz { kind, .. } | Uid::ContentHash { kind, .. } => *kind,
        }
    }

    /// Parse the `Display` form; malformed input is `None`
    pub fn parse(value: &str) -> Option<Self> {
        value.parse().ok()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uid::MusicBrainz { kind, id } => {
                write!(f, "{}:{}-{}", MUSICBRAINZ_NAMESPACE, kind.code(), id.hyphenated())
            }
            Uid::ContentHash { kind, hash } => {
                write!(f, "{}:{}-{}", HASH_NAMESPACE, kind.code(), hash.hyphenated())
            }
        }
    }
}

/// Error for strings that are not in UID format
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Malformed UID: {0}")]
pub struct UidParseError(String);

impl FromStr for Uid {
    type Err = UidParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || UidParseError(value.to_string());

        let (namespace, rest) = value.split_once(':').ok_or_else(malformed)?;
        let (code, id) = rest.split_once('-').ok_or_else(malformed)?;
        let kind = MusicKind::from_code(code).ok_or_else(malformed)?;
        let id = Uuid::parse_str(id).map_err(|_| malformed())?;

        match namespace {
            HASH_NAMESPACE => Ok(Uid::ContentHash { kind, hash: id }),
            MUSICBRAINZ_NAMESPACE => Ok(Uid::MusicBrainz { kind, id }),
            _ => Err(malformed()),
        }
    }
}

impl Serialize for Uid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Feeds node fields into the UID digest
///
/// Strings are lowercased before hashing. Every field is written with a
/// presence marker and a length prefix, so `["ab"]` and `["a", "b"]` or a
/// missing field and an empty one never produce the same byte stream.
pub struct UidHasher {
    digest: Sha256,
}

impl UidHasher {
    fn new(kind: MusicKind) -> Self {
        let mut digest = Sha256::new();
        digest.update([kind.code() as u8]);
        Self { digest }
    }

    pub fn update_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(value) => {
                let folded = value.to_lowercase();
                self.digest.update([1u8]);
                self.digest.update((folded.len() as u64).to_le_bytes());
                self.digest.update(folded.as_bytes());
            }
            None => self.digest.update([0u8]),
        }
        self
    }

    pub fn update_strs(&mut self, values: &[String]) -> &mut Self {
        self.digest.update((values.len() as u64).to_le_bytes());
        for value in values {
            self.update_str(Some(value));
        }
        self
    }

    pub fn update_int(&mut self, value: Option<u32>) -> &mut Self {
        match value {
            Some(value) => {
                self.digest.update([1u8]);
                self.digest.update(value.to_le_bytes());
            }
            None => self.digest.update([0u8]),
        }
        self
    }

    pub fn update_date(&mut self, value: Option<&Date>) -> &mut Self {
        self.update_str(value.map(|d| d.to_string()).as_deref())
    }

    fn finish(self) -> Uuid {
        let digest = self.digest.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest[..16]);
        Uuid::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MBID: &str = "8a4b9cbc-7b79-4c33-a1c9-2a1f4c2b1d0e";

    #[test]
    fn test_canonical_musicbrainz_id() {
        let upper = MBID.to_uppercase();
        assert_eq!(Uid::canonical_musicbrainz_id(&upper).as_deref(), Some(MBID));
        assert_eq!(
            Uid::canonical_musicbrainz_id(&format!(" {} ", MBID)).as_deref(),
            Some(MBID)
        );
        assert_eq!(Uid::canonical_musicbrainz_id("not-a-uuid"), None);
        assert_eq!(Uid::canonical_musicbrainz_id(""), None);
    }

    #[test]
    fn test_musicbrainz_uid_round_trips_through_display() {
        let uid = Uid::musicbrainz(MusicKind::Album, MBID).unwrap();
        let text = uid.to_string();
        assert_eq!(text, format!("org.musicbrainz:l-{}", MBID));
        assert_eq!(Uid::parse(&text), Some(uid));
    }

    #[test]
    fn test_invalid_musicbrainz_id_is_none() {
        assert_eq!(Uid::musicbrainz(MusicKind::Song, "not-a-uuid"), None);
    }

    #[test]
    fn test_hashed_uid_is_deterministic_and_case_folded() {
        let a = Uid::hashed(MusicKind::Artist, |h| {
            h.update_str(Some("Radiohead"));
        });
        let b = Uid::hashed(MusicKind::Artist, |h| {
            h.update_str(Some("RADIOHEAD"));
        });
        assert_eq!(a, b);
        assert_eq!(Uid::parse(&a.to_string()), Some(a));
    }

    #[test]
    fn test_kind_separates_identical_input() {
        let artist = Uid::hashed(MusicKind::Artist, |h| {
            h.update_str(Some("Rock"));
        });
        let genre = Uid::hashed(MusicKind::Genre, |h| {
            h.update_str(Some("Rock"));
        });
        assert_ne!(artist, genre);
        assert_ne!(
            Uid::musicbrainz(MusicKind::Song, MBID),
            Uid::musicbrainz(MusicKind::Album, MBID)
        );
    }

    #[test]
    fn test_format_is_part_of_identity() {
        let id = Uuid::parse_str(MBID).unwrap();
        assert_ne!(
            Uid::MusicBrainz { kind: MusicKind::Song, id },
            Uid::ContentHash { kind: MusicKind::Song, hash: id }
        );
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let joined = Uid::hashed(MusicKind::Song, |h| {
            h.update_strs(&["ab".to_string()]);
        });
        let split = Uid::hashed(MusicKind::Song, |h| {
            h.update_strs(&["a".to_string(), "b".to_string()]);
        });
        let missing = Uid::hashed(MusicKind::Song, |h| {
            h.update_str(None);
        });
        let empty = Uid::hashed(MusicKind::Song, |h| {
            h.update_str(Some(""));
        });
        assert_ne!(joined, split);
        assert_ne!(missing, empty);
    }

    #[test]
    fn test_malformed_strings_do_not_parse() {
        for value in [
            "",
            "wkmp",
            "wkmp:s",
            "wkmp:x-8a4b9cbc-7b79-4c33-a1c9-2a1f4c2b1d0e",
            "other:s-8a4b9cbc-7b79-4c33-a1c9-2a1f4c2b1d0e",
            "wkmp:s-not-a-uuid",
        ] {
            assert_eq!(Uid::parse(value), None, "{value} should not parse");
        }
    }
}
