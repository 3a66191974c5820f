pub mod reciters;

pub use reciters::{AudioDelivery, Reciter, DEFAULT_TIMING_RECITER_ID};

use std::fmt;
use std::str::FromStr;

/// Identity of one verse: (chapter, verse number), both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VerseKey {
    pub chapter: u32,
    pub verse: u32,
}

impl VerseKey {
    pub fn new(chapter: u32, verse: u32) -> Self {
        Self { chapter, verse }
    }
}

impl fmt::Display for VerseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

impl FromStr for VerseKey {
    type Err = String;

    /// Parses the remote services' `"chapter:verse"` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (c, v) = s
            .split_once(':')
            .ok_or_else(|| format!("bad verse key '{}'", s))?;
        let chapter: u32 = c.parse().map_err(|_| format!("bad chapter in '{}'", s))?;
        let verse: u32 = v.parse().map_err(|_| format!("bad verse in '{}'", s))?;
        if chapter == 0 || verse == 0 {
            return Err(format!("verse key '{}' must be 1-based", s));
        }
        Ok(VerseKey { chapter, verse })
    }
}

/// One word within a verse, as delivered to the highlight callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Word {
    pub verse: VerseKey,
    /// 1-based ordinal of the word within its verse text.
    pub number: u32,
}

/// A mushaf page: its number plus the verses laid out on it.
/// The page→verse mapping comes from the layout database, which is the
/// caller's concern; this crate only consumes the result.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: u32,
    pub verses: Vec<VerseKey>,
}

impl Page {
    pub fn new(number: u32, verses: Vec<VerseKey>) -> Self {
        Self { number, verses }
    }

    /// Distinct chapters represented on this page, ascending.
    pub fn chapters(&self) -> Vec<u32> {
        let mut chapters: Vec<u32> = self.verses.iter().map(|v| v.chapter).collect();
        chapters.sort_unstable();
        chapters.dedup();
        chapters
    }
}

/// Tajweed pronunciation-rule categories, as tagged by the remote styling
/// service. Closed set; unknown tags resolve to no rule, never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TajweedRule {
    HamzatWasl,
    Silent,
    LaamShamsiyah,
    MaddaNormal,
    MaddaPermissible,
    MaddaNecessary,
    MaddaObligatory,
    Qalqalah,
    Ikhafa,
    IkhafaShafawi,
    IdghamGhunnah,
    IdghamWoGhunnah,
    IdghamShafawi,
    Iqlab,
    Ghunnah,
}

impl TajweedRule {
    /// Resolve a `class` attribute value from the styling payload.
    pub fn from_tag(tag: &str) -> Option<Self> {
        use TajweedRule::*;
        match tag {
            "ham_wasl" => Some(HamzatWasl),
            "slnt" => Some(Silent),
            "laam_shamsiyah" => Some(LaamShamsiyah),
            "madda_normal" => Some(MaddaNormal),
            "madda_permissible" => Some(MaddaPermissible),
            "madda_necessary" => Some(MaddaNecessary),
            "madda_obligatory" => Some(MaddaObligatory),
            "qalaqah" => Some(Qalqalah),
            "ikhafa" => Some(Ikhafa),
            "ikhafa_shafawi" => Some(IkhafaShafawi),
            "idgham_ghunnah" => Some(IdghamGhunnah),
            "idgham_wo_ghunnah" => Some(IdghamWoGhunnah),
            "idgham_shafawi" => Some(IdghamShafawi),
            "iqlab" => Some(Iqlab),
            "ghunnah" => Some(Ghunnah),
            _ => None,
        }
    }

    /// Fixed display colour for this rule, as `#rrggbb`.
    pub fn color(&self) -> &'static str {
        use TajweedRule::*;
        match self {
            HamzatWasl => "#aaaaaa",
            Silent => "#aaaaaa",
            LaamShamsiyah => "#aaaaaa",
            MaddaNormal => "#537fff",
            MaddaPermissible => "#4050ff",
            MaddaNecessary => "#000ebc",
            MaddaObligatory => "#2144c1",
            Qalqalah => "#dd0008",
            Ikhafa => "#9400a8",
            IkhafaShafawi => "#d500b7",
            IdghamGhunnah => "#169777",
            IdghamWoGhunnah => "#169200",
            IdghamShafawi => "#58b800",
            Iqlab => "#26bffd",
            Ghunnah => "#ff7e1e",
        }
    }
}
