//! Bounded extraction pool
//!
//! Songs arrive on a channel, at most `pool_size` tag reads run at once, and
//! every song that comes in goes out again (completion order, not input
//! order). A failed read is logged and the song passes through with the
//! metadata it already had.

use super::{ExtractionError, TagReader};
use crate::model::RawSong;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Counters for one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub received: usize,
    pub extracted: usize,
    pub failed: usize,
}

pub struct ExtractionPipeline {
    reader: Arc<dyn TagReader>,
    pool_size: usize,
}

impl ExtractionPipeline {
    pub const DEFAULT_POOL_SIZE: usize = 8;

    pub fn new(reader: Arc<dyn TagReader>) -> Self {
        Self {
            reader,
            pool_size: Self::DEFAULT_POOL_SIZE,
        }
    }

    /// Number of reads kept in flight; clamped to at least one
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Drive the pool until `input` closes and every in-flight read finished
    ///
    /// Stops early if the `output` receiver goes away.
    pub async fn run(
        &self,
        mut input: mpsc::Receiver<RawSong>,
        output: mpsc::Sender<RawSong>,
    ) -> PipelineStats {
        let mut in_flight = FuturesUnordered::new();
        let mut input_open = true;
        let mut stats = PipelineStats::default();

        loop {
            tokio::select! {
                biased;

                // Drain completions first so finished songs never wait on new input
                Some((song, extracted)) = in_flight.next(), if !in_flight.is_empty() => {
                    if extracted {
                        stats.extracted += 1;
                    } else {
                        stats.failed += 1;
                    }
                    if output.send(song).await.is_err() {
                        warn!(pending = in_flight.len(), "Extraction output closed, stopping pipeline");
                        break;
                    }
                }

                received = input.recv(), if input_open && in_flight.len() < self.pool_size => {
                    match received {
                        Some(song) => {
                            stats.received += 1;
                            in_flight.push(extract_one(Arc::clone(&self.reader), song));
                        }
                        None => input_open = false,
                    }
                }

                else => break,
            }
        }

        debug!(
            received = stats.received,
            extracted = stats.extracted,
            failed = stats.failed,
            "Extraction pipeline finished"
        );
        stats
    }

    /// Run every song in `songs` through the pool and collect the results
    pub async fn extract_all(&self, songs: Vec<RawSong>) -> (Vec<RawSong>, PipelineStats) {
        let capacity = self.pool_size * 2;
        let (input_tx, input_rx) = mpsc::channel(capacity);
        let (output_tx, mut output_rx) = mpsc::channel(capacity);
        let expected = songs.len();

        let feed = async move {
            for song in songs {
                if input_tx.send(song).await.is_err() {
                    break;
                }
            }
        };

        let collect = async move {
            let mut collected = Vec::with_capacity(expected);
            while let Some(song) = output_rx.recv().await {
                collected.push(song);
            }
            collected
        };

        let ((), stats, collected) = tokio::join!(feed, self.run(input_rx, output_tx), collect);
        (collected, stats)
    }
}

/// Read one file on the blocking pool and apply what was found
async fn extract_one(reader: Arc<dyn TagReader>, mut song: RawSong) -> (RawSong, bool) {
    let path = song.path();
    let task_path = path.clone();

    let result = tokio::task::spawn_blocking(move || reader.read(&task_path))
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))
        .and_then(|read| read);

    match result {
        Ok(tags) => {
            tags.apply(&mut song);
            (song, true)
        }
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Tag extraction failed, keeping existing metadata");
            (song, false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractedTags;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Titles each song after its file stem, fails on "bad", panics on "panic"
    #[derive(Default)]
    struct StubReader {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl TagReader for StubReader {
        fn read(&self, path: &Path) -> Result<ExtractedTags, ExtractionError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));
            self.active.fetch_sub(1, Ordering::SeqCst);

            let stem = path.file_stem().unwrap().to_string_lossy().to_string();
            if stem.starts_with("bad") {
                return Err(ExtractionError::Parse("corrupt".to_string()));
            }
            if stem.starts_with("panic") {
                panic!("reader blew up");
            }

            let mut tags = ExtractedTags::new();
            tags.insert("TITLE", &stem.to_uppercase());
            tags.set_duration_ms(1000);
            Ok(tags)
        }
    }

    fn song(id: u64, name: &str) -> RawSong {
        RawSong::stub(id, 0, 0, &Path::new("/music").join(name), 100, "audio/mpeg")
    }

    #[tokio::test]
    async fn test_every_song_comes_out() {
        let pipeline = ExtractionPipeline::new(Arc::new(StubReader::default())).with_pool_size(3);
        let songs: Vec<_> = (0..20).map(|i| song(i, &format!("track{}.mp3", i))).collect();

        let (mut out, stats) = pipeline.extract_all(songs).await;
        out.sort_by_key(|s| s.file_id);

        assert_eq!(out.len(), 20);
        assert_eq!(stats.received, 20);
        assert_eq!(stats.extracted, 20);
        assert_eq!(out[4].name.as_deref(), Some("TRACK4"));
        assert_eq!(out[4].duration_ms, Some(1000));
    }

    #[tokio::test]
    async fn test_failures_pass_through_unchanged() {
        let pipeline = ExtractionPipeline::new(Arc::new(StubReader::default())).with_pool_size(2);
        let mut bad = song(2, "bad.mp3");
        bad.name = Some("Cached Title".to_string());
        let songs = vec![song(1, "good.mp3"), bad, song(3, "panic.mp3")];

        let (mut out, stats) = pipeline.extract_all(songs).await;
        out.sort_by_key(|s| s.file_id);

        assert_eq!(out.len(), 3);
        assert_eq!(stats.extracted, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(out[0].name.as_deref(), Some("GOOD"));
        assert_eq!(out[1].name.as_deref(), Some("Cached Title"));
        assert!(out[2].name.is_none());
    }

    #[tokio::test]
    async fn test_pool_size_bounds_concurrency() {
        let reader = Arc::new(StubReader::default());
        let pipeline = ExtractionPipeline::new(reader.clone()).with_pool_size(4);
        let songs: Vec<_> = (0..32).map(|i| song(i, &format!("t{}.flac", i))).collect();

        let (out, _) = pipeline.extract_all(songs).await;

        assert_eq!(out.len(), 32);
        assert!(reader.peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let pipeline = ExtractionPipeline::new(Arc::new(StubReader::default()));
        let (out, stats) = pipeline.extract_all(Vec::new()).await;
        assert!(out.is_empty());
        assert_eq!(stats, PipelineStats::default());
    }

    #[test]
    fn test_pool_size_clamped() {
        let pipeline = ExtractionPipeline::new(Arc::new(StubReader::default())).with_pool_size(0);
        assert_eq!(pipeline.pool_size(), 1);
    }

    #[tokio::test]
    async fn test_closed_output_stops_run() {
        let pipeline = ExtractionPipeline::new(Arc::new(StubReader::default())).with_pool_size(2);
        let (input_tx, input_rx) = mpsc::channel(4);
        let (output_tx, output_rx) = mpsc::channel(1);
        drop(output_rx);

        input_tx.send(song(1, "a.mp3")).await.unwrap();
        input_tx.send(song(2, "b.mp3")).await.unwrap();
        drop(input_tx);

        let stats = pipeline.run(input_rx, output_tx).await;
        assert!(stats.received >= 1);
    }
}
