use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tilawah::annotation::{AnnotationProvider, TransliterationLookup, WordAnnotation};
use tilawah::error::{Error, Result};
use tilawah::quran::{Page, TajweedRule, VerseKey};
use tilawah::services::tajweed::{ChapterColorTable, TajweedSource};

struct FakeTajweed {
    chapters: HashMap<u32, ChapterColorTable>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl FakeTajweed {
    fn new(chapters: HashMap<u32, ChapterColorTable>) -> Self {
        Self { chapters, fail: false, calls: Arc::new(AtomicUsize::new(0)) }
    }

    fn failing() -> Self {
        let mut fake = Self::new(HashMap::new());
        fake.fail = true;
        fake
    }
}

impl TajweedSource for FakeTajweed {
    async fn chapter_colors(&self, chapter: u32) -> Result<ChapterColorTable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Decode("simulated styling failure".into()));
        }
        Ok(self.chapters.get(&chapter).cloned().unwrap_or_default())
    }
}

struct FakeLookup {
    texts: HashMap<(VerseKey, u32), String>,
    errors: HashSet<(VerseKey, u32)>,
    probed: Arc<Mutex<Vec<u32>>>,
}

impl FakeLookup {
    fn with_words(verse: VerseKey, words: &[u32]) -> Self {
        let texts = words
            .iter()
            .map(|&w| ((verse, w), format!("word-{}", w)))
            .collect();
        Self { texts, errors: HashSet::new(), probed: Arc::new(Mutex::new(Vec::new())) }
    }

    fn empty() -> Self {
        Self::with_words(VerseKey::new(1, 1), &[])
    }
}

impl TransliterationLookup for FakeLookup {
    async fn transliteration(&self, verse: VerseKey, word: u32) -> Result<Option<String>> {
        self.probed.lock().unwrap().push(word);
        if self.errors.contains(&(verse, word)) {
            return Err(Error::Decode("simulated lookup failure".into()));
        }
        Ok(self.texts.get(&(verse, word)).cloned())
    }
}

fn colors(verse: VerseKey, rules: Vec<Option<TajweedRule>>) -> HashMap<u32, ChapterColorTable> {
    let mut table = ChapterColorTable::new();
    table.insert(verse, rules);
    HashMap::from([(verse.chapter, table)])
}

fn words_of(annotations: &[WordAnnotation]) -> Vec<u32> {
    annotations.iter().map(|a| a.word).collect()
}

#[tokio::test]
async fn merges_colour_alignment_with_transliteration() {
    let verse = VerseKey::new(2, 5);
    let tajweed = FakeTajweed::new(colors(
        verse,
        vec![
            Some(TajweedRule::Ghunnah),
            Some(TajweedRule::Iqlab),
            Some(TajweedRule::Qalqalah),
        ],
    ));
    let lookup = FakeLookup::with_words(verse, &[1, 2, 4]);
    let provider = AnnotationProvider::new(tajweed, lookup);

    let table = provider
        .annotations(&Page::new(1, vec![verse]))
        .await
        .unwrap();
    let annotations = &table[&verse];

    assert_eq!(words_of(annotations), vec![1, 2, 3, 4]);
    // Word 3: colour only.
    assert_eq!(annotations[2].rule, Some(TajweedRule::Qalqalah));
    assert_eq!(annotations[2].transliteration, None);
    // Word 4: transliteration only, discovered past the colour list.
    assert_eq!(annotations[3].rule, None);
    assert_eq!(annotations[3].transliteration.as_deref(), Some("word-4"));
}

#[tokio::test]
async fn fallback_scan_stops_at_first_missing_word() {
    let verse = VerseKey::new(2, 5);
    let tajweed = FakeTajweed::new(HashMap::new()); // no colour data at all
    let lookup = FakeLookup::with_words(verse, &[1, 2, 3, 4, 5]);
    let probed = Arc::clone(&lookup.probed);
    let provider = AnnotationProvider::new(tajweed, lookup);

    let table = provider
        .annotations(&Page::new(1, vec![verse]))
        .await
        .unwrap();
    let annotations = &table[&verse];

    assert_eq!(words_of(annotations), vec![1, 2, 3, 4, 5]);
    assert!(annotations.iter().all(|a| a.rule.is_none()));
    assert!(annotations.iter().all(|a| a.transliteration.is_some()));

    // Position 6 is the terminating probe; nothing beyond it is touched.
    let max = probed.lock().unwrap().iter().copied().max().unwrap();
    assert_eq!(max, 6);
}

#[tokio::test]
async fn fallback_scan_is_capped_at_fifty_words() {
    let verse = VerseKey::new(2, 5);
    let tajweed = FakeTajweed::new(HashMap::new());
    let all: Vec<u32> = (1..=80).collect();
    let lookup = FakeLookup::with_words(verse, &all);
    let provider = AnnotationProvider::new(tajweed, lookup);

    let table = provider
        .annotations(&Page::new(1, vec![verse]))
        .await
        .unwrap();
    assert_eq!(table[&verse].len(), 50, "probe bound must terminate the scan");
}

#[tokio::test]
async fn verse_with_no_annotations_is_omitted() {
    let with_data = VerseKey::new(2, 5);
    let without = VerseKey::new(2, 6);
    let tajweed = FakeTajweed::new(colors(with_data, vec![Some(TajweedRule::Ikhafa)]));
    let lookup = FakeLookup::empty();
    let provider = AnnotationProvider::new(tajweed, lookup);

    let table = provider
        .annotations(&Page::new(1, vec![with_data, without]))
        .await
        .unwrap();

    assert!(table.contains_key(&with_data));
    assert!(!table.contains_key(&without), "no empty-list entries");
}

#[tokio::test]
async fn unknown_rule_positions_inside_colour_list_do_not_terminate() {
    let verse = VerseKey::new(2, 5);
    // Word 1 carried no recognised rule; word 2 did. No transliterations.
    let tajweed = FakeTajweed::new(colors(verse, vec![None, Some(TajweedRule::Silent)]));
    let lookup = FakeLookup::empty();
    let provider = AnnotationProvider::new(tajweed, lookup);

    let table = provider
        .annotations(&Page::new(1, vec![verse]))
        .await
        .unwrap();
    assert_eq!(words_of(&table[&verse]), vec![2]);
}

#[tokio::test]
async fn lookup_failure_is_absence_not_abort() {
    let verse = VerseKey::new(2, 5);
    let tajweed = FakeTajweed::new(colors(
        verse,
        vec![Some(TajweedRule::Ghunnah), Some(TajweedRule::Iqlab)],
    ));
    let mut lookup = FakeLookup::with_words(verse, &[1, 2]);
    lookup.errors.insert((verse, 2));
    let provider = AnnotationProvider::new(tajweed, lookup);

    let table = provider
        .annotations(&Page::new(1, vec![verse]))
        .await
        .unwrap();
    let annotations = &table[&verse];

    assert_eq!(words_of(annotations), vec![1, 2]);
    assert_eq!(annotations[1].rule, Some(TajweedRule::Iqlab));
    assert_eq!(annotations[1].transliteration, None, "failed lookup degrades to absence");
}

#[tokio::test]
async fn empty_transliteration_counts_as_absent() {
    let verse = VerseKey::new(2, 5);
    let tajweed = FakeTajweed::new(HashMap::new());
    let mut lookup = FakeLookup::with_words(verse, &[1]);
    lookup.texts.insert((verse, 2), String::new()); // present but empty
    let provider = AnnotationProvider::new(tajweed, lookup);

    let table = provider
        .annotations(&Page::new(1, vec![verse]))
        .await
        .unwrap();
    assert_eq!(words_of(&table[&verse]), vec![1], "empty text terminates the fallback scan");
}

#[tokio::test]
async fn colour_fetch_failure_fails_the_page_call() {
    let provider = AnnotationProvider::new(FakeTajweed::failing(), FakeLookup::empty());
    let result = provider
        .annotations(&Page::new(1, vec![VerseKey::new(2, 5)]))
        .await;
    assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test]
async fn one_colour_fetch_per_chapter_on_the_page() {
    let a = VerseKey::new(2, 5);
    let b = VerseKey::new(2, 6);
    let c = VerseKey::new(3, 1);
    let mut chapters = colors(a, vec![Some(TajweedRule::Ghunnah)]);
    chapters
        .entry(2)
        .or_default()
        .insert(b, vec![Some(TajweedRule::Iqlab)]);
    chapters.extend(colors(c, vec![Some(TajweedRule::Qalqalah)]));

    let tajweed = FakeTajweed::new(chapters);
    let calls = Arc::clone(&tajweed.calls);
    let provider = AnnotationProvider::new(tajweed, FakeLookup::empty());

    let table = provider
        .annotations(&Page::new(1, vec![a, b, c]))
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2, "chapters 2 and 3, once each");
    assert_eq!(table.len(), 3);
}
