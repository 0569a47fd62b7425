//! Metadata cache table
//!
//! One row per file id. List columns use the escaped `;` encoding from
//! [`crate::cache::codec`]; dates are ISO-8601 text.

use crate::cache::codec::{join_escaped, split_escaped};
use crate::cache::CacheEntry;
use crate::model::Date;
use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Create the cache table if it doesn't exist
pub async fn create_cache_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS metadata_cache (
            file_id INTEGER PRIMARY KEY,
            date_added INTEGER NOT NULL,
            date_modified INTEGER NOT NULL,
            size INTEGER NOT NULL,
            duration_ms INTEGER,
            musicbrainz_id TEXT,
            name TEXT,
            sort_name TEXT,
            track INTEGER,
            disc INTEGER,
            subtitle TEXT,
            date TEXT,
            album_musicbrainz_id TEXT,
            album_name TEXT,
            album_sort_name TEXT,
            release_types TEXT,
            artist_musicbrainz_ids TEXT,
            artist_names TEXT,
            artist_sort_names TEXT,
            album_artist_musicbrainz_ids TEXT,
            album_artist_names TEXT,
            album_artist_sort_names TEXT,
            genre_names TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Load every cache row
pub async fn load_all_entries(pool: &SqlitePool) -> Result<Vec<CacheEntry>> {
    let rows = sqlx::query("SELECT * FROM metadata_cache")
        .fetch_all(pool)
        .await?;

    rows.iter().map(entry_from_row).collect()
}

/// Delete all rows and insert `entries` in one transaction
pub async fn replace_all_entries(pool: &SqlitePool, entries: &[CacheEntry]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM metadata_cache")
        .execute(&mut *tx)
        .await?;

    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO metadata_cache (
                file_id, date_added, date_modified, size, duration_ms,
                musicbrainz_id, name, sort_name, track, disc, subtitle, date,
                album_musicbrainz_id, album_name, album_sort_name, release_types,
                artist_musicbrainz_ids, artist_names, artist_sort_names,
                album_artist_musicbrainz_ids, album_artist_names, album_artist_sort_names,
                genre_names
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        // Ids and sizes are stored bit-for-bit in SQLite's signed integers
        .bind(entry.file_id as i64)
        .bind(entry.date_added)
        .bind(entry.date_modified)
        .bind(entry.size as i64)
        .bind(entry.duration_ms.map(|d| d as i64))
        .bind(&entry.musicbrainz_id)
        .bind(&entry.name)
        .bind(&entry.sort_name)
        .bind(entry.track.map(i64::from))
        .bind(entry.disc.map(i64::from))
        .bind(&entry.subtitle)
        .bind(entry.date.map(|d| d.to_string()))
        .bind(&entry.album_musicbrainz_id)
        .bind(&entry.album_name)
        .bind(&entry.album_sort_name)
        .bind(join_escaped(&entry.release_types))
        .bind(join_escaped(&entry.artist_musicbrainz_ids))
        .bind(join_escaped(&entry.artist_names))
        .bind(join_escaped(&entry.artist_sort_names))
        .bind(join_escaped(&entry.album_artist_musicbrainz_ids))
        .bind(join_escaped(&entry.album_artist_names))
        .bind(join_escaped(&entry.album_artist_sort_names))
        .bind(join_escaped(&entry.genre_names))
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Count cache rows
pub async fn count_entries(pool: &SqlitePool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM metadata_cache")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

fn entry_from_row(row: &SqliteRow) -> Result<CacheEntry> {
    let list = |column: &str| -> Result<Vec<String>> {
        let value: Option<String> = row.try_get(column)?;
        Ok(split_escaped(value.as_deref()))
    };
    let small = |column: &str| -> Result<Option<u32>> {
        let value: Option<i64> = row.try_get(column)?;
        Ok(value.and_then(|v| u32::try_from(v).ok()))
    };

    let date: Option<String> = row.try_get("date")?;
    let file_id: i64 = row.try_get("file_id")?;
    let size: i64 = row.try_get("size")?;
    let duration_ms: Option<i64> = row.try_get("duration_ms")?;

    Ok(CacheEntry {
        file_id: file_id as u64,
        date_added: row.try_get("date_added")?,
        date_modified: row.try_get("date_modified")?,
        size: size as u64,
        duration_ms: duration_ms.map(|d| d as u64),
        musicbrainz_id: row.try_get("musicbrainz_id")?,
        name: row.try_get("name")?,
        sort_name: row.try_get("sort_name")?,
        track: small("track")?,
        disc: small("disc")?,
        subtitle: row.try_get("subtitle")?,
        date: date.as_deref().and_then(Date::parse),
        album_musicbrainz_id: row.try_get("album_musicbrainz_id")?,
        album_name: row.try_get("album_name")?,
        album_sort_name: row.try_get("album_sort_name")?,
        release_types: list("release_types")?,
        artist_musicbrainz_ids: list("artist_musicbrainz_ids")?,
        artist_names: list("artist_names")?,
        artist_sort_names: list("artist_sort_names")?,
        album_artist_musicbrainz_ids: list("album_artist_musicbrainz_ids")?,
        album_artist_names: list("album_artist_names")?,
        album_artist_sort_names: list("album_artist_sort_names")?,
        genre_names: list("genre_names")?,
    })
}
