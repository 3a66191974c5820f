use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::annotation::markup;
use crate::error::{Error, Result};
use crate::quran::{TajweedRule, VerseKey};

pub const TAJWEED_BASE_URL: &str = "https://api.qurancdn.com/api/qdc";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const VERSES_PER_PAGE: u32 = 50;

/// Per-verse rule colours for one chapter, aligned by word position
/// (index 0 = word 1). Non-word glyphs are already filtered out; a `None`
/// entry means that word carries no recognised rule.
pub type ChapterColorTable = HashMap<VerseKey, Vec<Option<TajweedRule>>>;

/// Source of per-word rule-colour data for a chapter.
pub trait TajweedSource: Send + Sync {
    fn chapter_colors(
        &self,
        chapter: u32,
    ) -> impl Future<Output = Result<ChapterColorTable>> + Send;
}

/// Tajweed source backed by the remote verses endpoint, requesting the
/// tajweed-annotated word text and walking the response pagination.
pub struct HttpTajweedSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTajweedSource {
    pub fn new() -> Self {
        Self::with_base_url(TAJWEED_BASE_URL)
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

impl Default for HttpTajweedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TajweedSource for HttpTajweedSource {
    async fn chapter_colors(&self, chapter: u32) -> Result<ChapterColorTable> {
        let mut table = ChapterColorTable::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{}/verses/by_chapter/{}?words=true&word_fields=text_uthmani_tajweed&per_page={}&page={}",
                self.base_url, chapter, VERSES_PER_PAGE, page
            );
            debug!(%url, "fetching tajweed words");

            let body = self
                .client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await?;

            let decoded: VersesResponse = serde_json::from_str(&body)?;
            merge_color_page(&mut table, decoded.verses)?;

            match decoded.pagination.and_then(|p| p.next_page) {
                Some(next) => page = next,
                None => break,
            }
        }

        Ok(table)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VersesResponse {
    pub verses: Vec<VerseWords>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Pagination {
    pub next_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerseWords {
    pub verse_key: String,
    #[serde(default)]
    pub words: Vec<WordEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WordEntry {
    pub char_type_name: String,
    pub text_uthmani_tajweed: Option<String>,
}

/// Fold one response page into the colour table. Entries whose type is not
/// `"word"` (verse-end marks and the like) are dropped before alignment, so
/// colour index i always corresponds to word i+1 of the verse text.
pub(crate) fn merge_color_page(
    table: &mut ChapterColorTable,
    verses: Vec<VerseWords>,
) -> Result<()> {
    for verse in verses {
        let key: VerseKey = verse.verse_key.parse().map_err(Error::Decode)?;
        let colors: Vec<Option<TajweedRule>> = verse
            .words
            .iter()
            .filter(|w| w.char_type_name == "word")
            .map(|w| {
                w.text_uthmani_tajweed
                    .as_deref()
                    .and_then(markup::first_class_attr)
                    .and_then(TajweedRule::from_tag)
            })
            .collect();
        table.insert(key, colors);
    }
    Ok(())
}
