use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::quran::{Reciter, VerseKey, Word};
use crate::scheduler::cache::ChapterTimingCache;
use crate::services::timing::{TimingSegment, TimingSource};

/// Invoked with each word as its audible start is reached, and with `None`
/// on reset: when a session is superseded, cancelled, or has fired its last
/// word.
pub type WordCallback = Arc<dyn Fn(Option<Word>) + Send + Sync>;

/// Schedules word-boundary callbacks for the one verse currently playing.
///
/// At most one session is live at a time; `schedule` supersedes the previous
/// session whatever state it is in. Correctness against late timer firings
/// and late fetch completions rests on the generation counter: every armed
/// session captures the generation it was created under and compares it
/// against the live counter at every point it could emit, so a superseded
/// session can never invoke the callback. Every compare-and-emit happens
/// under the generation lock, and so does the increment-and-reset in
/// `supersede`, so a session task on another worker thread cannot slip a
/// stale word in behind a newer session's reset. The per-session
/// cancellation token additionally stops armed sleeps early; that is
/// cleanup, not the guard.
///
/// `schedule`/`cancel` take `&mut self` and must be called from within a
/// tokio runtime.
pub struct WordScheduler<S: TimingSource> {
    cache: Arc<ChapterTimingCache<S>>,
    on_word: WordCallback,
    generation: Arc<Mutex<u64>>,
    active: Option<CancellationToken>,
}

/// The callback never re-enters the scheduler (it would need the `&mut self`
/// the caller already holds), so holding the lock across it cannot deadlock;
/// a panicking callback poisons it, which we shrug off.
fn lock_generation(live: &Mutex<u64>) -> MutexGuard<'_, u64> {
    live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<S: TimingSource> WordScheduler<S> {
    pub fn new(cache: Arc<ChapterTimingCache<S>>, on_word: WordCallback) -> Self {
        Self {
            cache,
            on_word,
            generation: Arc::new(Mutex::new(0)),
            active: None,
        }
    }

    /// Start highlighting `verse`, whose audio is already `playback_offset`
    /// seconds in. Supersedes any live session, synchronously emitting its
    /// terminal `None`, then resolves timing data and arms the word timers
    /// asynchronously.
    ///
    /// Words whose start lies before `playback_offset` never fire. A verse
    /// with no timing data (or a chapter whose fetch failed) schedules
    /// nothing and emits nothing further.
    pub fn schedule(&mut self, verse: VerseKey, reciter: &Reciter, playback_offset: f64) {
        let generation = self.supersede();
        debug!(%verse, generation, playback_offset, "scheduling verse");

        let token = CancellationToken::new();
        self.active = Some(token.clone());

        // Fire delays are anchored here, not after the fetch: network latency
        // consumes playback time rather than shifting every word late.
        let started = Instant::now();

        let cache = Arc::clone(&self.cache);
        let live = Arc::clone(&self.generation);
        let on_word = Arc::clone(&self.on_word);
        let reciter = reciter.clone();

        tokio::spawn(async move {
            run_session(
                cache, live, on_word, token, reciter, verse, playback_offset, started, generation,
            )
            .await;
        });
    }

    /// Stop the live session, if any, and synchronously emit the terminal
    /// `None`. Idempotent.
    pub fn cancel(&mut self) {
        self.supersede();
        debug!("schedule cancelled");
    }

    /// Invalidate the live session at every emission point and emit its
    /// terminal `None`. Returns the new generation.
    fn supersede(&mut self) -> u64 {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
        let mut live = lock_generation(&self.generation);
        *live += 1;
        let generation = *live;
        // Emitted under the lock: once this reset is observed, the old
        // session's compare-and-emit can no longer pass.
        (self.on_word)(None);
        generation
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_session<S: TimingSource>(
    cache: Arc<ChapterTimingCache<S>>,
    live: Arc<Mutex<u64>>,
    on_word: WordCallback,
    token: CancellationToken,
    reciter: Reciter,
    verse: VerseKey,
    playback_offset: f64,
    started: Instant,
    generation: u64,
) {
    // Populate the cache unconditionally; even a superseded session's fetch
    // is useful to whoever schedules this chapter next.
    let table = cache.chapter(&reciter, verse.chapter).await;

    if *lock_generation(&live) != generation {
        trace!(%verse, generation, "superseded during fetch");
        return;
    }
    let Some(segments) = table.get(&verse) else {
        debug!(%verse, "no timing data, nothing scheduled");
        return;
    };

    // Input order is untrusted; fire order is defined by start offset alone.
    let mut segments: Vec<TimingSegment> = segments.clone();
    segments.sort_by_key(|s| s.start_ms);

    for segment in segments {
        let delay = segment.start_ms as f64 / 1000.0 - playback_offset;
        // Non-finite offsets yield non-finite delays; skip them like
        // already-passed words rather than feed them to the timer.
        if !delay.is_finite() || delay < 0.0 {
            continue;
        }

        tokio::select! {
            _ = token.cancelled() => return,
            _ = time::sleep_until(started + Duration::from_secs_f64(delay)) => {}
        }
        // A sleep that completed before the stop took effect still must not
        // emit for a dead session. Compare and emit under one lock hold, or
        // a supersede on another thread could land its reset in between.
        {
            let current = lock_generation(&live);
            if *current != generation {
                return;
            }
            (on_word)(Some(Word { verse, number: segment.word }));
        }
    }

    // Explicit terminal event: the verse is done, not paused.
    let current = lock_generation(&live);
    if *current == generation {
        (on_word)(None);
    }
}
