//! wkmp-li - Library Indexer
//!
//! Scans the music root folder once and prints the resulting library.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wkmp_common::config::{
    default_config_path, load_toml_config, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use wkmp_li::cache::CacheRepository;
use wkmp_li::{Indexer, Library, ScanStats, Uid};

const MODULE_NAME: &str = "library-indexer";

#[derive(Debug, Parser)]
#[command(name = "wkmp-li", version, about = "Index a music collection")]
struct Args {
    /// Music root folder (overrides WKMP_ROOT_FOLDER and the config file)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Metadata cache database (default: <root>/wkmp.db)
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// TOML config file (default: <config dir>/wkmp/library-indexer.toml)
    #[arg(long, value_name = "FILE", env = "WKMP_LI_CONFIG")]
    config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct AlbumSummary {
    uid: Uid,
    name: String,
    artists: Vec<String>,
    songs: usize,
}

#[derive(Serialize)]
struct Summary {
    root: PathBuf,
    stats: ScanStats,
    songs: usize,
    albums: Vec<AlbumSummary>,
    artists: usize,
    genres: Vec<String>,
}

impl Summary {
    fn new(root: PathBuf, stats: ScanStats, library: &Library) -> Self {
        let albums = library
            .albums()
            .iter()
            .map(|album| AlbumSummary {
                uid: album.uid(),
                name: album.name().to_string(),
                artists: album
                    .artists()
                    .iter()
                    .filter_map(|&id| library.artist(id))
                    .map(|artist| artist.name().unwrap_or("Unknown Artist").to_string())
                    .collect(),
                songs: album.songs().len(),
            })
            .collect();

        Self {
            root,
            stats,
            songs: library.songs().len(),
            albums,
            artists: library.artists().len(),
            genres: library.genres().iter().map(|g| g.name().to_string()).collect(),
        }
    }

    fn print_text(&self) {
        println!("Library at {}", self.root.display());
        println!(
            "  {} songs, {} albums, {} artists, {} genres",
            self.songs,
            self.albums.len(),
            self.artists,
            self.genres.len()
        );
        println!(
            "  {} from cache, {} extracted, {} unreadable",
            self.stats.cache_hits, self.stats.extracted, self.stats.extraction_failed
        );
        for album in self.albums.iter().take(20) {
            println!(
                "  {} - {} ({} songs)",
                album.artists.join(", "),
                album.name,
                album.songs
            );
        }
        if self.albums.len() > 20 {
            println!("  ... {} more albums", self.albums.len() - 20);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match args.config.as_deref() {
        Some(path) => load_toml_config(path),
        None => default_config_path(MODULE_NAME)
            .filter(|path| path.exists())
            .map(|path| load_toml_config(&path))
            .unwrap_or_else(TomlConfig::default),
    };

    wkmp_common::logging::init_tracing(&config.logging)?;
    info!("Starting wkmp-li (Library Indexer) v{}", env!("CARGO_PKG_VERSION"));

    // An explicitly named config file ranks with the command line
    let explicit_root = args
        .root
        .clone()
        .or_else(|| args.config.as_ref().and(config.root_folder.clone()));
    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_arg(explicit_root)
        .resolve();
    info!(root = %root_folder.display(), "Resolved root folder");

    let initializer = RootFolderInitializer::new(root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = args
        .database
        .clone()
        .or_else(|| config.database_path.clone())
        .unwrap_or_else(|| initializer.database_path());
    info!(database = %db_path.display(), "Opening metadata cache");
    let pool = wkmp_li::db::init_database_pool(&db_path).await?;
    let cache = CacheRepository::open(pool).await?;

    let stubs = wkmp_li::enumerator::enumerate(&root_folder, &config.music)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling scan");
            ctrl_c.cancel();
        }
    });

    let indexer = Indexer::new(cache, config.music.clone());
    let outcome = indexer.index(stubs, &cancel).await?;

    let summary = Summary::new(root_folder, outcome.stats, &outcome.library);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        summary.print_text();
    }

    Ok(())
}
