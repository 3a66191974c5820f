use std::sync::Arc;
use std::time::Duration;

use tilawah::quran::{Reciter, VerseKey};
use tilawah::scheduler::{ChapterTimingCache, WordScheduler};
use tilawah::services::timing::HttpTimingSource;
use tokio::sync::mpsc;

/// Demo driver: schedule one verse against the live timing service and log
/// each word highlight as it fires.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tilawah=debug")),
        )
        .init();
    tracing::info!("tilawah demo starting");

    let cache = Arc::new(ChapterTimingCache::new(HttpTimingSource::new()));

    // Session ends with a terminal None; route callbacks to a channel so the
    // main task can wait for it.
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scheduler = WordScheduler::new(
        cache,
        Arc::new(move |word| {
            let _ = tx.send(word);
        }),
    );

    let reciter = Reciter::gapless("mishari_alafasy");
    let verse = VerseKey::new(1, 1);
    scheduler.schedule(verse, &reciter, 0.0);

    // Skip the synchronous reset emitted by schedule() itself.
    let _ = rx.recv().await;

    // If the verse has no timing data nothing ever arrives; don't hang.
    let drained = tokio::time::timeout(Duration::from_secs(30), async {
        while let Some(event) = rx.recv().await {
            match event {
                Some(word) => tracing::info!(verse = %word.verse, word = word.number, "highlight"),
                None => {
                    tracing::info!("verse complete");
                    break;
                }
            }
        }
    })
    .await;
    if drained.is_err() {
        tracing::warn!("no word events arrived, giving up");
    }
    Ok(())
}
