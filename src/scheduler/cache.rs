use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::quran::Reciter;
use crate::services::timing::{TimingSource, VerseTimingTable};

/// Lazy chapter→timing-table cache with deduplicated population.
///
/// Each chapter is fetched at most once per process lifetime, even under
/// concurrent requests: all callers for an uncached chapter share one
/// in-flight fetch through the chapter's `OnceCell`. Nothing is ever evicted;
/// the chapter count is small and fixed.
///
/// A fetch failure is swallowed into an empty table for that chapter (logged,
/// not retried): playback availability wins over word highlighting.
pub struct ChapterTimingCache<S> {
    source: S,
    chapters: Mutex<HashMap<u32, Arc<OnceCell<Arc<VerseTimingTable>>>>>,
}

impl<S: TimingSource> ChapterTimingCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            chapters: Mutex::new(HashMap::new()),
        }
    }

    /// The timing table for `chapter`, fetching it on first request.
    pub async fn chapter(&self, reciter: &Reciter, chapter: u32) -> Arc<VerseTimingTable> {
        let cell = {
            let mut chapters = self.chapters.lock().await;
            Arc::clone(chapters.entry(chapter).or_default())
        };

        cell.get_or_init(|| async {
            match self.source.segments(reciter, chapter).await {
                Ok(table) => {
                    debug!(chapter, verses = table.len(), "cached chapter timings");
                    Arc::new(table)
                }
                Err(e) => {
                    warn!(chapter, error = %e, "timing fetch failed, caching empty table");
                    Arc::new(VerseTimingTable::new())
                }
            }
        })
        .await
        .clone()
    }
}
