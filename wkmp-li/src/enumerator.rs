//! Audio file enumeration
//!
//! Walks the music root and turns every audio file into a [`RawSong`] stub
//! carrying file identity only. Tag fields are left for the cache and the
//! extraction pipeline.

use crate::model::RawSong;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};
use wkmp_common::config::MusicSettings;
use wkmp_common::time::system_time_to_unix_seconds;

/// Enumeration errors; unreadable entries below the root are only logged
#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Extension to MIME type for every container the indexer reads
const AUDIO_TYPES: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("flac", "audio/flac"),
    ("ogg", "audio/ogg"),
    ("oga", "audio/ogg"),
    ("opus", "audio/opus"),
    ("m4a", "audio/mp4"),
    ("mp4", "audio/mp4"),
    ("aac", "audio/aac"),
    ("wav", "audio/wav"),
    ("aiff", "audio/aiff"),
    ("aif", "audio/aiff"),
    ("wv", "audio/x-wavpack"),
    ("ape", "audio/x-ape"),
    ("mpc", "audio/x-musepack"),
];

/// Directories holding non-music audio, skipped with `exclude_non_music`
const NON_MUSIC_DIRS: &[&str] = &[
    "podcasts",
    "audiobooks",
    "ringtones",
    "alarms",
    "notifications",
    "recordings",
];

const IGNORED_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", ".git", ".svn"];

/// MIME type for a file, by extension
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    AUDIO_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Stable file id: first 8 bytes of SHA-256 over the root-relative path
pub fn file_id_for(relative: &Path) -> u64 {
    let normalized = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let digest = Sha256::digest(normalized.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

fn should_enter(entry: &DirEntry, exclude_non_music: bool, visited: &mut HashSet<PathBuf>) -> bool {
    let file_name = entry.file_name().to_string_lossy();
    if IGNORED_NAMES.iter().any(|ignored| file_name == *ignored) {
        return false;
    }

    if entry.file_type().is_dir() {
        if exclude_non_music
            && entry.depth() > 0
            && NON_MUSIC_DIRS.iter().any(|dir| file_name.eq_ignore_ascii_case(dir))
        {
            debug!(dir = %entry.path().display(), "Skipping non-music directory");
            return false;
        }

        // Symlink loops
        if entry.path_is_symlink() {
            if let Ok(canonical) = entry.path().canonicalize() {
                if !visited.insert(canonical) {
                    warn!(dir = %entry.path().display(), "Symlink loop detected");
                    return false;
                }
            }
        }
    }

    true
}

fn stub_for(root: &Path, entry: &DirEntry, mime_type: &str) -> Option<RawSong> {
    let metadata = match entry.metadata() {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(file = %entry.path().display(), error = %e, "Cannot read file metadata");
            return None;
        }
    };

    let modified = metadata.modified().ok()?;
    let added = metadata.created().unwrap_or(modified);
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());

    Some(RawSong::stub(
        file_id_for(relative),
        system_time_to_unix_seconds(added),
        system_time_to_unix_seconds(modified),
        entry.path(),
        metadata.len(),
        mime_type,
    ))
}

/// Every audio file below `root` as a stub, sorted by path
pub fn enumerate(root: &Path, settings: &MusicSettings) -> Result<Vec<RawSong>, EnumerateError> {
    if !root.exists() {
        return Err(EnumerateError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(EnumerateError::NotADirectory(root.to_path_buf()));
    }

    let mut visited = HashSet::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| should_enter(e, settings.exclude_non_music, &mut visited));

    let mut songs = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Error accessing entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(mime_type) = mime_type_for(entry.path()) else {
            continue;
        };
        if let Some(song) = stub_for(root, &entry, mime_type) {
            songs.push(song);
        }
    }

    songs.sort_by_key(|song| song.path());
    info!(root = %root.display(), files = songs.len(), "Enumerated audio files");
    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"not really audio").unwrap();
    }

    fn names(songs: &[RawSong]) -> Vec<String> {
        songs.iter().map(|s| s.file_name.clone()).collect()
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type_for(Path::new("a/b.MP3")), Some("audio/mpeg"));
        assert_eq!(mime_type_for(Path::new("b.flac")), Some("audio/flac"));
        assert_eq!(mime_type_for(Path::new("cover.jpg")), None);
        assert_eq!(mime_type_for(Path::new("README")), None);
    }

    #[test]
    fn test_file_id_is_stable_and_path_sensitive() {
        let a = file_id_for(Path::new("Artist/Album/01.mp3"));
        assert_eq!(a, file_id_for(Path::new("Artist/Album/01.mp3")));
        assert_ne!(a, file_id_for(Path::new("Artist/Album/02.mp3")));
    }

    #[test]
    fn test_enumerate_finds_audio_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "B/02.flac");
        touch(dir.path(), "A/01.mp3");
        touch(dir.path(), "A/cover.jpg");

        let songs = enumerate(dir.path(), &MusicSettings::default()).unwrap();

        assert_eq!(names(&songs), vec!["01.mp3", "02.flac"]);
        assert_eq!(songs[0].mime_type, "audio/mpeg");
        assert_eq!(songs[0].size, 16);
        assert_eq!(songs[0].directory, dir.path().join("A"));
        assert!(songs[0].name.is_none());
        assert_eq!(songs[0].file_id, file_id_for(Path::new("A/01.mp3")));
    }

    #[test]
    fn test_non_music_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "Music/song.mp3");
        touch(dir.path(), "Podcasts/episode.mp3");
        touch(dir.path(), "ringtones/ring.ogg");

        let excluded = enumerate(dir.path(), &MusicSettings::default()).unwrap();
        assert_eq!(names(&excluded), vec!["song.mp3"]);

        let settings = MusicSettings {
            exclude_non_music: false,
            ..MusicSettings::default()
        };
        let included = enumerate(dir.path(), &settings).unwrap();
        assert_eq!(included.len(), 3);
    }

    #[test]
    fn test_missing_root() {
        let result = enumerate(Path::new("/nonexistent/music/root"), &MusicSettings::default());
        assert!(matches!(result, Err(EnumerateError::PathNotFound(_))));
    }
}
