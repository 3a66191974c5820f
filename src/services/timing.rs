use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::quran::{Reciter, VerseKey};

pub const TIMING_BASE_URL: &str = "https://api.qurancdn.com/api/qdc";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// One word's audible interval within a verse, milliseconds from the start
/// of the chapter's gapless audio file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSegment {
    /// 1-based ordinal of the word within the verse text.
    pub word: u32,
    pub start_ms: u32,
    pub end_ms: u32,
}

/// Per-verse word segments for one chapter, words ordered as received.
/// Consumers must not rely on segment order; the scheduler sorts by start.
pub type VerseTimingTable = HashMap<VerseKey, Vec<TimingSegment>>;

/// Source of per-word time alignment data for a (reciter, chapter) pair.
/// Pure fetch-and-decode: no caching, no scheduling.
pub trait TimingSource: Send + Sync + 'static {
    fn segments(
        &self,
        reciter: &Reciter,
        chapter: u32,
    ) -> impl Future<Output = Result<VerseTimingTable>> + Send;
}

/// Timing source backed by the remote audio-segments endpoint.
pub struct HttpTimingSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTimingSource {
    pub fn new() -> Self {
        Self::with_base_url(TIMING_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for HttpTimingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingSource for HttpTimingSource {
    async fn segments(&self, reciter: &Reciter, chapter: u32) -> Result<VerseTimingTable> {
        // No timing data is defined for per-verse audio; empty, not an error.
        let Some(reciter_id) = reciter.timing_id() else {
            debug!(reciter = %reciter.slug, "no gapless audio, skipping timing fetch");
            return Ok(VerseTimingTable::new());
        };

        let url = format!(
            "{}/audio/reciters/{}/audio_files?chapter={}&segments=true",
            self.base_url, reciter_id, chapter
        );
        debug!(%url, "fetching word timings");

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let decoded: AudioFilesResponse = serde_json::from_str(&body)?;
        decode_timing_table(decoded)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AudioFilesResponse {
    pub audio_files: Vec<AudioFileTimings>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AudioFileTimings {
    #[allow(dead_code)]
    pub chapter_id: Option<u32>,
    #[serde(default)]
    pub verse_timings: Vec<VerseTiming>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerseTiming {
    pub verse_key: String,
    #[serde(default)]
    pub segments: Vec<Vec<i64>>,
}

/// Validate the decoded wire shape into a [`VerseTimingTable`].
///
/// Segment arrays shorter than three elements, negative values, or
/// unparseable verse keys all fail the whole response (schema mismatch);
/// elements past the third are ignored.
pub(crate) fn decode_timing_table(response: AudioFilesResponse) -> Result<VerseTimingTable> {
    let mut table = VerseTimingTable::new();
    for file in response.audio_files {
        for timing in file.verse_timings {
            let key: VerseKey = timing
                .verse_key
                .parse()
                .map_err(Error::Decode)?;
            let mut segments = Vec::with_capacity(timing.segments.len());
            for raw in &timing.segments {
                let (&word, &start, &end) = match raw.as_slice() {
                    [w, s, e, ..] => (w, s, e),
                    _ => {
                        return Err(Error::Decode(format!(
                            "segment for {} has {} elements, expected 3",
                            key,
                            raw.len()
                        )))
                    }
                };
                const MAX: i64 = u32::MAX as i64;
                if !(1..=MAX).contains(&word) || !(0..=MAX).contains(&start) || !(0..=MAX).contains(&end) {
                    return Err(Error::Decode(format!(
                        "segment [{}, {}, {}] for {} out of range",
                        word, start, end, key
                    )));
                }
                segments.push(TimingSegment {
                    word: word as u32,
                    start_ms: start as u32,
                    end_ms: end as u32,
                });
            }
            table.insert(key, segments);
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Result<VerseTimingTable> {
        let response: AudioFilesResponse = serde_json::from_str(json)?;
        decode_timing_table(response)
    }

    #[test]
    fn decodes_segment_triples() {
        let table = decode(
            r#"{"audio_files":[{"chapter_id":2,"verse_timings":[
                {"verse_key":"2:5","segments":[[1,0,500],[2,500,1200]]}]}]}"#,
        )
        .unwrap();

        let segments = &table[&VerseKey::new(2, 5)];
        assert_eq!(
            segments,
            &vec![
                TimingSegment { word: 1, start_ms: 0, end_ms: 500 },
                TimingSegment { word: 2, start_ms: 500, end_ms: 1200 },
            ]
        );
    }

    #[test]
    fn extra_segment_elements_are_ignored() {
        let table = decode(
            r#"{"audio_files":[{"chapter_id":1,"verse_timings":[
                {"verse_key":"1:1","segments":[[1,0,250,99]]}]}]}"#,
        )
        .unwrap();
        assert_eq!(
            table[&VerseKey::new(1, 1)],
            vec![TimingSegment { word: 1, start_ms: 0, end_ms: 250 }]
        );
    }

    #[test]
    fn short_segment_array_fails_decode() {
        let err = decode(
            r#"{"audio_files":[{"chapter_id":1,"verse_timings":[
                {"verse_key":"1:1","segments":[[1,0]]}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn negative_values_fail_decode() {
        let err = decode(
            r#"{"audio_files":[{"chapter_id":1,"verse_timings":[
                {"verse_key":"1:1","segments":[[1,-5,250]]}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn oversized_values_fail_decode() {
        // 2^32 does not fit a millisecond offset; truncating it would wrap.
        let err = decode(
            r#"{"audio_files":[{"chapter_id":1,"verse_timings":[
                {"verse_key":"1:1","segments":[[1,4294967296,4294967297]]}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn bad_verse_key_fails_decode() {
        let err = decode(
            r#"{"audio_files":[{"chapter_id":1,"verse_timings":[
                {"verse_key":"nonsense","segments":[]}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn non_json_body_fails_decode() {
        assert!(matches!(decode("<html>502</html>"), Err(Error::Decode(_))));
    }
}
