use std::collections::HashMap;
use std::future::Future;

use tracing::{debug, warn};

use crate::error::Result;
use crate::quran::{Page, TajweedRule, VerseKey};
use crate::services::tajweed::{ChapterColorTable, TajweedSource};

/// Upper bound on probed word positions per verse. A termination guard for
/// inconsistent local data, not a domain bound: no verse in the text reaches
/// 50 words, but nothing here proves that.
const WORD_PROBE_LIMIT: usize = 50;

/// Display annotation for one word: a tajweed rule colour, a transliteration,
/// or both. Annotations carrying neither are never produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordAnnotation {
    pub verse: VerseKey,
    /// 1-based ordinal of the word within its verse.
    pub word: u32,
    pub rule: Option<TajweedRule>,
    pub transliteration: Option<String>,
}

/// Per-verse annotations for one page, word ordinal ascending. Verses that
/// produced no annotations are absent, never present with an empty list.
pub type AnnotationTable = HashMap<VerseKey, Vec<WordAnnotation>>;

/// Local per-word transliteration lookup.
///
/// Transient failure and "not found" are equivalent to this crate: both mean
/// the word has no transliteration.
pub trait TransliterationLookup: Send + Sync {
    fn transliteration(
        &self,
        verse: VerseKey,
        word: u32,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Builds per-word display annotations for a page by combining the remote
/// rule-colour source with the local transliteration lookup.
pub struct AnnotationProvider<T, L> {
    tajweed: T,
    lookup: L,
}

impl<T: TajweedSource, L: TransliterationLookup> AnnotationProvider<T, L> {
    pub fn new(tajweed: T, lookup: L) -> Self {
        Self { tajweed, lookup }
    }

    /// Annotations for every verse on `page`.
    ///
    /// Colour data is fetched once per distinct chapter on the page; a
    /// transport or decode failure there fails the whole call. Individual
    /// transliteration lookups never do — a failed lookup is an absent
    /// transliteration.
    pub async fn annotations(&self, page: &Page) -> Result<AnnotationTable> {
        let mut colors_by_chapter: HashMap<u32, ChapterColorTable> = HashMap::new();
        for chapter in page.chapters() {
            let colors = self.tajweed.chapter_colors(chapter).await?;
            colors_by_chapter.insert(chapter, colors);
        }

        let mut table = AnnotationTable::new();
        for &verse in &page.verses {
            let colors = colors_by_chapter
                .get(&verse.chapter)
                .and_then(|c| c.get(&verse))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            if colors.is_empty() {
                debug!(%verse, "no rule colours, transliteration-only fallback");
            }

            let annotations = self.annotate_verse(verse, colors).await;
            if !annotations.is_empty() {
                table.insert(verse, annotations);
            }
        }
        Ok(table)
    }

    /// Probe word positions 1, 2, 3, … merging the aligned colour (while the
    /// colour list lasts) with the local transliteration. Past the end of the
    /// colour list the scan stops at the first word with no transliteration;
    /// with an empty colour list this degenerates to the pure fallback scan.
    async fn annotate_verse(
        &self,
        verse: VerseKey,
        colors: &[Option<TajweedRule>],
    ) -> Vec<WordAnnotation> {
        let mut annotations = Vec::new();
        let limit = colors.len().max(WORD_PROBE_LIMIT);

        for position in 1..=limit {
            let rule = colors.get(position - 1).copied().flatten();
            let transliteration = self.word_text(verse, position as u32).await;

            if position > colors.len() && transliteration.is_none() {
                break;
            }
            if rule.is_some() || transliteration.is_some() {
                annotations.push(WordAnnotation {
                    verse,
                    word: position as u32,
                    rule,
                    transliteration,
                });
            }
        }
        annotations
    }

    /// One word's transliteration; failures and empty strings are absence.
    async fn word_text(&self, verse: VerseKey, word: u32) -> Option<String> {
        match self.lookup.transliteration(verse, word).await {
            Ok(Some(text)) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!(%verse, word, error = %e, "transliteration lookup failed");
                None
            }
        }
    }
}
