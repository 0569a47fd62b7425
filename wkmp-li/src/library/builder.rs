//! Graph construction
//!
//! One synchronous pass over the fully extracted song list:
//! 1. songs: resolve names and artists, derive UIDs, collapse duplicates;
//! 2. albums: bucket songs by [`RawAlbum`];
//! 3. artists: bucket songs (track artists first) and albums (album
//!    artists first) by [`RawArtist`];
//! 4. genres: bucket songs by [`RawGenre`];
//! 5. finalize: restore tag order on every link list, reject empty nodes,
//!    sort each arena and freeze it into a [`Library`].
//!
//! Staging structs are mutable and private; only the finalized nodes leave
//! this module.

use super::genres::resolve_genre_names;
use super::separators::Separators;
use super::{
    Album, AlbumId, Artist, ArtistId, Genre, GenreId, Library, LibraryError, NodeRef, Song, SongId,
};
use crate::identity::{CollationKey, MusicKind, Uid};
use crate::model::{DateRange, Disc, RawAlbum, RawArtist, RawGenre, RawSong, ReleaseType};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use tracing::{debug, info, warn};
use wkmp_common::config::MusicSettings;

/// Builds a [`Library`] from raw songs
///
/// Output is fully determined by the input set: building twice from the
/// same songs yields identical UIDs, membership and order.
#[derive(Debug, Clone)]
pub struct LibraryBuilder {
    separators: Separators,
}

struct SongStage<'a> {
    raw: &'a RawSong,
    uid: Uid,
    name: String,
    collation: CollationKey,
    album_key: RawAlbum,
    artists: Vec<RawArtist>,
    genres: Vec<RawGenre>,
    album: usize,
    artist_links: Vec<usize>,
    genre_links: Vec<usize>,
}

struct AlbumStage {
    key: RawAlbum,
    songs: Vec<usize>,
    artist_links: Vec<usize>,
}

struct ArtistStage {
    key: RawArtist,
    songs: Vec<usize>,
    albums: Vec<usize>,
}

struct GenreStage {
    key: RawGenre,
    songs: Vec<usize>,
}

impl LibraryBuilder {
    pub fn new(settings: &MusicSettings) -> Self {
        Self {
            separators: Separators::parse(&settings.separators),
        }
    }

    pub fn build(&self, raw_songs: &[RawSong]) -> Result<Library, LibraryError> {
        let mut songs = self.prepare_songs(raw_songs);
        let mut albums = group_albums(&mut songs);
        let artists = group_artists(&mut songs, &mut albums);
        let genres = group_genres(&mut songs);

        restore_tag_order(&mut songs, &mut albums, &artists, &genres);
        validate(&albums, &artists, &genres)?;

        let library = freeze(&songs, &albums, &artists, &genres);
        info!(
            songs = library.songs.len(),
            albums = library.albums.len(),
            artists = library.artists.len(),
            genres = library.genres.len(),
            "Library built"
        );
        Ok(library)
    }

    fn prepare_songs<'a>(&self, raw_songs: &'a [RawSong]) -> Vec<SongStage<'a>> {
        // Input order depends on extraction completion; duplicates keep the
        // lowest (file id, path)
        let mut ordered: Vec<&RawSong> = raw_songs.iter().collect();
        ordered.sort_by(|a, b| {
            a.file_id
                .cmp(&b.file_id)
                .then_with(|| a.path().cmp(&b.path()))
        });

        let mut seen = HashSet::with_capacity(raw_songs.len());
        let mut songs = Vec::with_capacity(raw_songs.len());

        for raw in ordered {
            let song = self.prepare_song(raw);
            if !seen.insert(song.uid) {
                debug!(uid = %song.uid, file = %raw.path().display(), "Collapsing duplicate song");
                continue;
            }
            songs.push(song);
        }

        songs.sort_by(|a, b| a.collation.cmp(&b.collation).then_with(|| a.uid.cmp(&b.uid)));
        songs
    }

    fn prepare_song<'a>(&self, raw: &'a RawSong) -> SongStage<'a> {
        let name = non_blank(raw.name.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| raw.file_stem().to_string());

        // Unparsed fields only, so the UID survives separator changes
        let uid = raw
            .musicbrainz_id
            .as_deref()
            .and_then(|id| Uid::musicbrainz(MusicKind::Song, id))
            .unwrap_or_else(|| {
                Uid::hashed(MusicKind::Song, |h| {
                    h.update_str(Some(&name))
                        .update_str(raw.album_name.as_deref())
                        .update_date(raw.date.as_ref())
                        .update_int(raw.track)
                        .update_int(raw.disc)
                        .update_strs(&raw.artist_names)
                        .update_strs(&raw.album_artist_names);
                })
            });

        let track_artists = self.raw_artists(
            &raw.artist_musicbrainz_ids,
            &raw.artist_names,
            &raw.artist_sort_names,
        );
        let album_artists = self.raw_artists(
            &raw.album_artist_musicbrainz_ids,
            &raw.album_artist_names,
            &raw.album_artist_sort_names,
        );

        let album_name = non_blank(raw.album_name.as_deref())
            .map(str::to_string)
            .or_else(|| raw.directory_name())
            .unwrap_or_default();
        let album_key = RawAlbum::new(
            raw.album_musicbrainz_id
                .as_deref()
                .and_then(Uid::canonical_musicbrainz_id),
            album_name,
            non_blank(raw.album_sort_name.as_deref()).map(str::to_string),
            self.separators.split(&raw.release_types),
            prefer(&album_artists, &track_artists),
        );

        let mut genres: Vec<RawGenre> = Vec::new();
        for name in resolve_genre_names(&raw.genre_names, &self.separators) {
            let genre = RawGenre::new(name);
            if !genres.contains(&genre) {
                genres.push(genre);
            }
        }

        SongStage {
            raw,
            uid,
            collation: CollationKey::new(&name, raw.sort_name.as_deref()),
            name,
            album_key,
            artists: prefer(&track_artists, &album_artists),
            genres,
            album: 0,
            artist_links: Vec::new(),
            genre_links: Vec::new(),
        }
    }

    /// Split names, then zip ids and sort names when the counts line up
    fn raw_artists(&self, ids: &[String], names: &[String], sort_names: &[String]) -> Vec<RawArtist> {
        let names = self.separators.split(names);
        let ids = self.separators.split(ids);
        let sort_names = self.separators.split(sort_names);
        let ids_match = ids.len() == names.len();
        let sorts_match = sort_names.len() == names.len();

        let mut artists: Vec<RawArtist> = Vec::with_capacity(names.len());
        for (i, name) in names.into_iter().enumerate() {
            let artist = RawArtist::new(
                ids.get(i)
                    .filter(|_| ids_match)
                    .and_then(|id| Uid::canonical_musicbrainz_id(id)),
                Some(name),
                sort_names.get(i).filter(|_| sorts_match).cloned(),
            );
            if !artists.contains(&artist) {
                artists.push(artist);
            }
        }
        artists
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// First non-empty list, else the unknown-artist placeholder
fn prefer(first: &[RawArtist], second: &[RawArtist]) -> Vec<RawArtist> {
    if !first.is_empty() {
        first.to_vec()
    } else if !second.is_empty() {
        second.to_vec()
    } else {
        vec![RawArtist::unknown()]
    }
}

/// Index of `key`'s bucket, creating it with `make` when new
fn bucket<K: Hash + Eq + Clone, S>(
    index: &mut HashMap<K, usize>,
    stages: &mut Vec<S>,
    key: &K,
    make: impl FnOnce(K) -> S,
) -> usize {
    if let Some(&existing) = index.get(key) {
        return existing;
    }
    let next = stages.len();
    index.insert(key.clone(), next);
    stages.push(make(key.clone()));
    next
}

fn group_albums(songs: &mut [SongStage<'_>]) -> Vec<AlbumStage> {
    let mut index = HashMap::new();
    let mut albums = Vec::new();

    for (si, song) in songs.iter_mut().enumerate() {
        let ai = bucket(&mut index, &mut albums, &song.album_key, |key| AlbumStage {
            key,
            songs: Vec::new(),
            artist_links: Vec::new(),
        });
        albums[ai].songs.push(si);
        song.album = ai;
    }

    albums
}

fn group_artists(songs: &mut [SongStage<'_>], albums: &mut [AlbumStage]) -> Vec<ArtistStage> {
    let mut index = HashMap::new();
    let mut artists: Vec<ArtistStage> = Vec::new();
    let make = |key| ArtistStage {
        key,
        songs: Vec::new(),
        albums: Vec::new(),
    };

    for (si, song) in songs.iter_mut().enumerate() {
        for raw in &song.artists {
            let ri = bucket(&mut index, &mut artists, raw, make);
            if !song.artist_links.contains(&ri) {
                song.artist_links.push(ri);
                artists[ri].songs.push(si);
            }
        }
    }

    for (ai, album) in albums.iter_mut().enumerate() {
        for raw in &album.key.raw_artists {
            let ri = bucket(&mut index, &mut artists, raw, make);
            if !album.artist_links.contains(&ri) {
                album.artist_links.push(ri);
                artists[ri].albums.push(ai);
            }
        }
    }

    artists
}

fn group_genres(songs: &mut [SongStage<'_>]) -> Vec<GenreStage> {
    let mut index = HashMap::new();
    let mut genres: Vec<GenreStage> = Vec::new();

    for (si, song) in songs.iter_mut().enumerate() {
        for raw in &song.genres {
            let gi = bucket(&mut index, &mut genres, raw, |key| GenreStage {
                key,
                songs: Vec::new(),
            });
            if !song.genre_links.contains(&gi) {
                song.genre_links.push(gi);
                genres[gi].songs.push(si);
            }
        }
    }

    genres
}

/// Position of `key` in an item's own raw list
fn tag_position<K: PartialEq>(raw: &[K], key: &K) -> usize {
    raw.iter().position(|r| r == key).unwrap_or(usize::MAX)
}

/// Reorder link lists to follow each item's tag order, not bucket order
fn restore_tag_order(
    songs: &mut [SongStage<'_>],
    albums: &mut [AlbumStage],
    artists: &[ArtistStage],
    genres: &[GenreStage],
) {
    for song in songs.iter_mut() {
        song.artist_links
            .sort_by_key(|&ri| tag_position(&song.artists, &artists[ri].key));
        song.genre_links
            .sort_by_key(|&gi| tag_position(&song.genres, &genres[gi].key));
    }
    for album in albums.iter_mut() {
        album
            .artist_links
            .sort_by_key(|&ri| tag_position(&album.key.raw_artists, &artists[ri].key));
    }
}

fn validate(
    albums: &[AlbumStage],
    artists: &[ArtistStage],
    genres: &[GenreStage],
) -> Result<(), LibraryError> {
    if let Some(album) = albums.iter().find(|a| a.songs.is_empty()) {
        return Err(LibraryError::EmptyNode {
            kind: MusicKind::Album,
            name: album.key.name.clone(),
        });
    }
    if let Some(artist) = artists.iter().find(|a| a.songs.is_empty() && a.albums.is_empty()) {
        return Err(LibraryError::EmptyNode {
            kind: MusicKind::Artist,
            name: artist.key.name.clone().unwrap_or_default(),
        });
    }
    if let Some(genre) = genres.iter().find(|g| g.songs.is_empty()) {
        return Err(LibraryError::EmptyNode {
            kind: MusicKind::Genre,
            name: genre.key.name.clone(),
        });
    }
    Ok(())
}

fn album_uid(key: &RawAlbum) -> Uid {
    key.musicbrainz_id
        .as_deref()
        .and_then(|id| Uid::musicbrainz(MusicKind::Album, id))
        .unwrap_or_else(|| {
            let artist_names: Vec<String> =
                key.raw_artists.iter().filter_map(|a| a.name.clone()).collect();
            Uid::hashed(MusicKind::Album, |h| {
                h.update_str(Some(&key.name)).update_strs(&artist_names);
            })
        })
}

fn artist_uid(key: &RawArtist) -> Uid {
    key.musicbrainz_id
        .as_deref()
        .and_then(|id| Uid::musicbrainz(MusicKind::Artist, id))
        .unwrap_or_else(|| {
            Uid::hashed(MusicKind::Artist, |h| {
                h.update_str(key.name.as_deref());
            })
        })
}

fn genre_uid(key: &RawGenre) -> Uid {
    Uid::hashed(MusicKind::Genre, |h| {
        h.update_str(Some(&key.name));
    })
}

/// Old stage indices in (collation, uid) order, plus the old-to-new map
fn sorted_order(meta: &[(Uid, CollationKey)]) -> (Vec<usize>, Vec<usize>) {
    let mut order: Vec<usize> = (0..meta.len()).collect();
    order.sort_by(|&a, &b| meta[a].1.cmp(&meta[b].1).then_with(|| meta[a].0.cmp(&meta[b].0)));

    let mut remap = vec![0; order.len()];
    for (new, &old) in order.iter().enumerate() {
        remap[old] = new;
    }
    (order, remap)
}

/// Most frequent first, then longest total duration, then list order
fn rank<T: Copy + Ord + Hash>(entries: impl IntoIterator<Item = (T, u64)>) -> Vec<T> {
    let mut totals: HashMap<T, (usize, u64)> = HashMap::new();
    for (item, duration_ms) in entries {
        let total = totals.entry(item).or_default();
        total.0 += 1;
        total.1 += duration_ms;
    }

    let mut ranked: Vec<(T, (usize, u64))> = totals.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1 .0
            .cmp(&a.1 .0)
            .then_with(|| b.1 .1.cmp(&a.1 .1))
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.into_iter().map(|(item, _)| item).collect()
}

fn freeze(
    songs: &[SongStage<'_>],
    albums: &[AlbumStage],
    artists: &[ArtistStage],
    genres: &[GenreStage],
) -> Library {
    let album_meta: Vec<_> = albums
        .iter()
        .map(|a| (album_uid(&a.key), CollationKey::new(&a.key.name, a.key.sort_name.as_deref())))
        .collect();
    let artist_meta: Vec<_> = artists
        .iter()
        .map(|a| {
            let name = a.key.name.as_deref().unwrap_or_default();
            (artist_uid(&a.key), CollationKey::new(name, a.key.sort_name.as_deref()))
        })
        .collect();
    let genre_meta: Vec<_> = genres
        .iter()
        .map(|g| (genre_uid(&g.key), CollationKey::new(&g.key.name, None)))
        .collect();

    let (album_order, album_remap) = sorted_order(&album_meta);
    let (artist_order, artist_remap) = sorted_order(&artist_meta);
    let (genre_order, genre_remap) = sorted_order(&genre_meta);

    // Songs were sorted during preparation, so stage index == SongId
    let final_songs: Vec<Song> = songs
        .iter()
        .map(|s| Song {
            uid: s.uid,
            name: s.name.clone(),
            sort_name: s.raw.sort_name.clone(),
            collation: s.collation.clone(),
            file_id: s.raw.file_id,
            path: s.raw.path(),
            mime_type: s.raw.mime_type.clone(),
            size: s.raw.size,
            duration_ms: s.raw.duration_ms,
            date_added: s.raw.date_added,
            date_modified: s.raw.date_modified,
            track: s.raw.track,
            disc: s.raw.disc.map(|number| Disc {
                number,
                name: s.raw.subtitle.clone(),
            }),
            date: s.raw.date,
            album: AlbumId(album_remap[s.album]),
            artists: s.artist_links.iter().map(|&r| ArtistId(artist_remap[r])).collect(),
            genres: s.genre_links.iter().map(|&g| GenreId(genre_remap[g])).collect(),
        })
        .collect();

    let duration_of = |si: usize| final_songs[si].duration_ms.unwrap_or(0);

    let final_albums: Vec<Album> = album_order
        .iter()
        .map(|&old| {
            let stage = &albums[old];
            let (uid, collation) = album_meta[old].clone();

            let mut song_ids: Vec<SongId> = stage.songs.iter().map(|&si| SongId(si)).collect();
            song_ids.sort_by_key(|id| {
                let song = &final_songs[id.0];
                (song.disc.as_ref().map(|d| d.number), song.track, id.0)
            });

            Album {
                uid,
                name: stage.key.name.clone(),
                sort_name: stage.key.sort_name.clone(),
                collation,
                release_type: ReleaseType::parse(&stage.key.release_types),
                dates: DateRange::from_dates(stage.songs.iter().filter_map(|&si| final_songs[si].date)),
                duration_ms: stage.songs.iter().map(|&si| duration_of(si)).sum(),
                date_added: stage
                    .songs
                    .iter()
                    .map(|&si| final_songs[si].date_added)
                    .min()
                    .unwrap_or_default(),
                songs: song_ids,
                artists: stage
                    .artist_links
                    .iter()
                    .map(|&r| ArtistId(artist_remap[r]))
                    .collect(),
            }
        })
        .collect();

    let final_artists: Vec<Artist> = artist_order
        .iter()
        .map(|&old| {
            // Songs were bucketed in SongId order, so stage.songs is sorted
            let stage = &artists[old];
            let (uid, collation) = artist_meta[old].clone();

            let mut explicit_albums: Vec<AlbumId> =
                stage.albums.iter().map(|&ai| AlbumId(album_remap[ai])).collect();
            explicit_albums.sort_unstable();

            let mut implicit_albums: Vec<AlbumId> = Vec::new();
            for &si in &stage.songs {
                let album = final_songs[si].album;
                if !explicit_albums.contains(&album) && !implicit_albums.contains(&album) {
                    implicit_albums.push(album);
                }
            }
            implicit_albums.sort_unstable();

            let genres = rank(stage.songs.iter().flat_map(|&si| {
                final_songs[si].genres.iter().map(move |&g| (g, duration_of(si)))
            }));

            Artist {
                uid,
                name: stage.key.name.clone(),
                sort_name: stage.key.sort_name.clone(),
                collation,
                songs: stage.songs.iter().map(|&si| SongId(si)).collect(),
                explicit_albums,
                implicit_albums,
                genres,
                duration_ms: stage.songs.iter().map(|&si| duration_of(si)).sum(),
            }
        })
        .collect();

    let final_genres: Vec<Genre> = genre_order
        .iter()
        .map(|&old| {
            let stage = &genres[old];
            let (uid, collation) = genre_meta[old].clone();

            Genre {
                uid,
                name: stage.key.name.clone(),
                collation,
                songs: stage.songs.iter().map(|&si| SongId(si)).collect(),
                albums: rank(
                    stage
                        .songs
                        .iter()
                        .map(|&si| (final_songs[si].album, duration_of(si))),
                ),
                artists: rank(stage.songs.iter().flat_map(|&si| {
                    final_songs[si].artists.iter().map(move |&r| (r, duration_of(si)))
                })),
                duration_ms: stage.songs.iter().map(|&si| duration_of(si)).sum(),
            }
        })
        .collect();

    let mut library = Library {
        songs: final_songs,
        albums: final_albums,
        artists: final_artists,
        genres: final_genres,
        uid_map: HashMap::new(),
    };
    library.uid_map = build_uid_map(&library);
    library
}

fn build_uid_map(library: &Library) -> HashMap<Uid, NodeRef> {
    let nodes = library
        .songs
        .iter()
        .enumerate()
        .map(|(i, s)| (s.uid, NodeRef::Song(SongId(i))))
        .chain(
            library
                .albums
                .iter()
                .enumerate()
                .map(|(i, a)| (a.uid, NodeRef::Album(AlbumId(i)))),
        )
        .chain(
            library
                .artists
                .iter()
                .enumerate()
                .map(|(i, a)| (a.uid, NodeRef::Artist(ArtistId(i)))),
        )
        .chain(
            library
                .genres
                .iter()
                .enumerate()
                .map(|(i, g)| (g.uid, NodeRef::Genre(GenreId(i)))),
        );

    let mut uid_map = HashMap::with_capacity(
        library.songs.len() + library.albums.len() + library.artists.len() + library.genres.len(),
    );
    for (uid, node) in nodes {
        if let Some(existing) = uid_map.get(&uid) {
            // Distinct buckets can share a MusicBrainz id only through bad tags
            warn!(%uid, ?existing, ?node, "UID collision, keeping first node");
            continue;
        }
        uid_map.insert(uid, node);
    }
    uid_map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::MusicNode;
    use crate::model::Date;
    use std::path::{Path, PathBuf};

    const ALBUM_MBID: &str = "0f3e6a4c-1d2b-4c5d-8e9f-a0b1c2d3e4f5";

    fn raw(id: u64, title: &str, album: &str, artists: &[&str]) -> RawSong {
        let path = Path::new("/music").join(album).join(format!("{}.mp3", title));
        let mut song = RawSong::stub(id, 1000 + id as i64, 2000, &path, 4096, "audio/mpeg");
        song.name = Some(title.to_string());
        song.album_name = Some(album.to_string());
        song.artist_names = artists.iter().map(|a| a.to_string()).collect();
        song.duration_ms = Some(60_000);
        song
    }

    fn build(songs: &[RawSong]) -> Library {
        LibraryBuilder::new(&MusicSettings::default()).build(songs).unwrap()
    }

    fn artist_names(library: &Library, ids: &[ArtistId]) -> Vec<String> {
        ids.iter()
            .map(|&id| library.artist(id).unwrap().name().unwrap_or("?").to_string())
            .collect()
    }

    #[test]
    fn test_end_to_end_grouping() {
        let mut solo = raw(3, "Solo", "Other", &["B"]);
        solo.genre_names = vec!["Rock".to_string()];
        let songs = vec![
            raw(1, "One", "X", &["A"]),
            raw(2, "Two", "x", &["a"]),
            solo,
        ];

        let library = build(&songs);

        assert_eq!(library.songs().len(), 3);
        assert_eq!(library.albums().len(), 2);
        assert_eq!(library.artists().len(), 2);
        assert_eq!(library.genres().len(), 1);

        let artist_a = library
            .artists()
            .iter()
            .find(|a| a.name() == Some("A"))
            .unwrap();
        assert_eq!(artist_a.explicit_albums().len(), 1);
        let album = library.album(artist_a.explicit_albums()[0]).unwrap();
        assert_eq!(album.songs().len(), 2);
        assert_eq!(album.duration_ms(), 120_000);
        assert_eq!(album.date_added(), 1001);
    }

    #[test]
    fn test_build_is_idempotent() {
        let songs = vec![
            raw(1, "Zebra", "Beta", &["Q"]),
            raw(2, "apple", "Alpha", &["P", "Q"]),
            raw(3, "Mango", "Alpha", &["P"]),
        ];
        let mut reversed = songs.clone();
        reversed.reverse();

        let first = build(&songs);
        let second = build(&reversed);

        let uids = |lib: &Library| -> Vec<Uid> {
            lib.songs()
                .iter()
                .map(|s| s.uid())
                .chain(lib.albums().iter().map(|a| a.uid()))
                .chain(lib.artists().iter().map(|a| a.uid()))
                .collect()
        };
        assert_eq!(uids(&first), uids(&second));
        assert_eq!(
            first.songs().iter().map(|s| s.name()).collect::<Vec<_>>(),
            vec!["apple", "Mango", "Zebra"]
        );
    }

    #[test]
    fn test_musicbrainz_album_id_groups_across_name_case() {
        let mut a = raw(1, "One", "Foo", &["A"]);
        let mut b = raw(2, "Two", "FOO", &["A"]);
        a.album_musicbrainz_id = Some(ALBUM_MBID.to_string());
        b.album_musicbrainz_id = Some(ALBUM_MBID.to_string());

        let library = build(&[a, b]);
        assert_eq!(library.albums().len(), 1);
        assert!(matches!(library.albums()[0].uid(), Uid::MusicBrainz { .. }));
    }

    #[test]
    fn test_identified_album_never_merges_with_unidentified() {
        let mut a = raw(1, "One", "Foo", &["A"]);
        let b = raw(2, "Two", "Foo", &["A"]);
        a.album_musicbrainz_id = Some(ALBUM_MBID.to_string());

        let library = build(&[a, b]);
        assert_eq!(library.albums().len(), 2);
    }

    #[test]
    fn test_song_uid_stable_across_separators() {
        let mut song = raw(1, "Duet", "Pairs", &["A; B"]);
        song.album_artist_names = vec!["A; B".to_string()];

        let plain = LibraryBuilder::new(&MusicSettings::default())
            .build(std::slice::from_ref(&song))
            .unwrap();
        let split = LibraryBuilder::new(&MusicSettings {
            separators: ";".to_string(),
            ..MusicSettings::default()
        })
        .build(std::slice::from_ref(&song))
        .unwrap();

        assert_eq!(plain.songs()[0].uid(), split.songs()[0].uid());
        assert_eq!(plain.artists().len(), 1);
        assert_eq!(split.artists().len(), 2);
    }

    #[test]
    fn test_links_follow_tag_order() {
        // "A" is bucketed first through the earlier-sorting song
        let songs = vec![raw(1, "aaa", "First", &["A"]), raw(2, "zzz", "Second", &["B", "A"])];
        let library = build(&songs);

        let song = library.songs().iter().find(|s| s.name() == "zzz").unwrap();
        assert_eq!(artist_names(&library, song.artists()), vec!["B", "A"]);
    }

    #[test]
    fn test_song_genres_follow_tag_order() {
        let mut first = raw(1, "aaa", "First", &["A"]);
        let mut second = raw(2, "zzz", "Second", &["A"]);
        first.genre_names = vec!["Jazz".to_string()];
        second.genre_names = vec!["Rock".to_string(), "Jazz".to_string()];

        let library = build(&[first, second]);

        let song = library.songs().iter().find(|s| s.name() == "zzz").unwrap();
        let genres: Vec<_> = song
            .genres()
            .iter()
            .map(|&id| library.genre(id).unwrap().name())
            .collect();
        assert_eq!(genres, vec!["Rock", "Jazz"]);
    }

    #[test]
    fn test_album_artists_follow_tag_order() {
        // "A" is bucketed first through the earlier-sorting song
        let first = raw(1, "aaa", "First", &["A"]);
        let mut second = raw(2, "zzz", "Second", &["C"]);
        second.album_artist_names = vec!["B".to_string(), "A".to_string()];

        let library = build(&[first, second]);

        let album = library.albums().iter().find(|a| a.name() == "Second").unwrap();
        assert_eq!(artist_names(&library, album.artists()), vec!["B", "A"]);
    }

    #[test]
    fn test_duplicate_survivor_independent_of_input_order() {
        let a = raw(1, "Same", "Album", &["A"]);
        let mut b = raw(2, "Same", "Album", &["A"]);
        b.directory = PathBuf::from("/music/copy2");
        b.duration_ms = Some(120_000);

        let forward = build(&[a.clone(), b.clone()]);
        let backward = build(&[b, a]);

        for library in [&forward, &backward] {
            assert_eq!(library.songs().len(), 1);
            assert_eq!(library.songs()[0].file_id(), 1);
            assert_eq!(library.albums()[0].duration_ms(), 60_000);
        }
        assert_eq!(forward.songs()[0].path(), backward.songs()[0].path());
    }

    #[test]
    fn test_invalid_album_mbid_groups_as_unidentified() {
        let mut tagged = raw(1, "One", "Foo", &["A"]);
        let plain = raw(2, "Two", "Foo", &["A"]);
        tagged.album_musicbrainz_id = Some("not-a-uuid".to_string());

        let library = build(&[tagged, plain]);

        assert_eq!(library.albums().len(), 1);
        let album = &library.albums()[0];
        assert!(matches!(album.uid(), Uid::ContentHash { .. }));
        assert_eq!(album.songs().len(), 2);
    }

    #[test]
    fn test_album_mbid_case_variants_group_together() {
        let mut lower = raw(1, "One", "Foo", &["A"]);
        let mut upper = raw(2, "Two", "Foo", &["A"]);
        lower.album_musicbrainz_id = Some(ALBUM_MBID.to_string());
        upper.album_musicbrainz_id = Some(ALBUM_MBID.to_uppercase());

        let library = build(&[lower, upper]);

        assert_eq!(library.albums().len(), 1);
        assert_eq!(library.albums()[0].songs().len(), 2);
    }

    #[test]
    fn test_artist_mbid_normalized_before_grouping() {
        const ARTIST_MBID: &str = "5b11f4ce-a62d-471e-81fc-a69a8278c7da";
        let mut lower = raw(1, "One", "Alpha", &["Band"]);
        let mut upper = raw(2, "Two", "Beta", &["Band"]);
        let mut invalid = raw(3, "Three", "Gamma", &["Band"]);
        lower.artist_musicbrainz_ids = vec![ARTIST_MBID.to_string()];
        upper.artist_musicbrainz_ids = vec![ARTIST_MBID.to_uppercase()];
        invalid.artist_musicbrainz_ids = vec!["bogus".to_string()];

        let library = build(&[lower, upper, invalid]);

        // The identified artist and the unidentified one stay apart
        assert_eq!(library.artists().len(), 2);
        let mut uids: Vec<Uid> = library.artists().iter().map(|a| a.uid()).collect();
        uids.dedup();
        assert_eq!(uids.len(), 2);
        for artist in library.artists() {
            assert!(matches!(library.find(&artist.uid()), Some(MusicNode::Artist(_))));
        }

        let identified = library
            .artists()
            .iter()
            .find(|a| matches!(a.uid(), Uid::MusicBrainz { .. }))
            .unwrap();
        assert_eq!(identified.songs().len(), 2);
    }

    #[test]
    fn test_duplicate_songs_collapse() {
        let library = build(&[raw(1, "Same", "Album", &["A"]), raw(2, "Same", "Album", &["A"])]);
        assert_eq!(library.songs().len(), 1);
        assert_eq!(library.albums()[0].songs().len(), 1);
    }

    #[test]
    fn test_name_fallbacks() {
        let path = Path::new("/music/Dir Album/07 Untitled.flac");
        let song = RawSong::stub(9, 0, 0, path, 1, "audio/flac");

        let library = build(&[song]);
        assert_eq!(library.songs()[0].name(), "07 Untitled");
        assert_eq!(library.albums()[0].name(), "Dir Album");

        let artist = &library.artists()[0];
        assert!(artist.is_unknown());
        assert_eq!(artist.songs().len(), 1);
        assert!(library.genres().is_empty());
        assert!(library.songs()[0].genres().is_empty());
    }

    #[test]
    fn test_album_artist_priority() {
        let mut a = raw(1, "One", "Hits", &["Singer"]);
        let mut b = raw(2, "Two", "Hits", &["Other Singer"]);
        a.album_artist_names = vec!["Various Artists".to_string()];
        b.album_artist_names = vec!["Various Artists".to_string()];

        let library = build(&[a, b]);
        assert_eq!(library.albums().len(), 1);
        let album = &library.albums()[0];
        assert_eq!(artist_names(&library, album.artists()), vec!["Various Artists"]);

        let various = library
            .artists()
            .iter()
            .find(|a| a.name() == Some("Various Artists"))
            .unwrap();
        assert!(various.songs().is_empty());
        assert_eq!(various.explicit_albums().len(), 1);

        let singer = library.artists().iter().find(|a| a.name() == Some("Singer")).unwrap();
        assert!(singer.explicit_albums().is_empty());
        assert_eq!(singer.implicit_albums(), album_ids(&library, "Hits").as_slice());
    }

    fn album_ids(library: &Library, name: &str) -> Vec<AlbumId> {
        library
            .albums()
            .iter()
            .enumerate()
            .filter(|(_, a)| a.name() == name)
            .map(|(i, _)| AlbumId(i))
            .collect()
    }

    #[test]
    fn test_album_songs_ordered_by_disc_then_track() {
        let mut songs = Vec::new();
        for (id, title, disc, track) in [(1, "a", 2, 1), (2, "b", 1, 2), (3, "c", 1, 1)] {
            let mut song = raw(id, title, "Set", &["A"]);
            song.disc = Some(disc);
            song.track = Some(track);
            songs.push(song);
        }
        songs[0].date = Date::parse("2001");
        songs[1].date = Date::parse("1999-02");

        let library = build(&songs);
        let album = &library.albums()[0];
        let titles: Vec<_> = album
            .songs()
            .iter()
            .map(|&id| library.song(id).unwrap().name())
            .collect();
        assert_eq!(titles, vec!["c", "b", "a"]);

        let dates = album.dates().unwrap();
        assert_eq!(dates.min.to_string(), "1999-02");
        assert_eq!(dates.max.to_string(), "2001");
    }

    #[test]
    fn test_numeric_genres_resolve_and_rank() {
        let mut a = raw(1, "One", "Alpha", &["A"]);
        let mut b = raw(2, "Two", "Alpha", &["A"]);
        let mut c = raw(3, "Three", "Beta", &["A"]);
        a.genre_names = vec!["(17)".to_string()];
        b.genre_names = vec!["rock".to_string()];
        c.genre_names = vec!["8".to_string()];

        let library = build(&[a, b, c]);
        let genre_names: Vec<_> = library.genres().iter().map(|g| g.name()).collect();
        assert_eq!(genre_names, vec!["Jazz", "Rock"]);

        let artist = &library.artists()[0];
        let ranked: Vec<_> = artist
            .genres()
            .iter()
            .map(|&id| library.genre(id).unwrap().name())
            .collect();
        assert_eq!(ranked, vec!["Rock", "Jazz"]);
    }

    #[test]
    fn test_find_by_uid() {
        let library = build(&[raw(1, "One", "Alpha", &["A"])]);
        let album = &library.albums()[0];

        let found = library.find(&album.uid()).unwrap();
        assert!(matches!(found, MusicNode::Album(_)));
        assert_eq!(found.name(), Some("Alpha"));

        let by_str = library.find_str(&album.uid().to_string()).unwrap();
        assert_eq!(by_str.uid(), album.uid());

        assert!(library.find_str("wkmp:x-garbage").is_none());
        assert!(library.find_str("").is_none());
    }

    #[test]
    fn test_empty_input_builds_empty_library() {
        let library = build(&[]);
        assert!(library.is_empty());
        assert!(library.albums().is_empty());
    }

    #[test]
    fn test_articles_ignored_in_sort_order() {
        let songs = vec![
            raw(1, "One", "The Zoo", &["A"]),
            raw(2, "Two", "Middle", &["A"]),
            raw(3, "Three", "a Beginning", &["A"]),
        ];
        let library = build(&songs);
        let names: Vec<_> = library.albums().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["a Beginning", "Middle", "The Zoo"]);
    }
}
