/// How a reciter's audio is delivered. Word timing data only exists for
/// gapless recitations (one continuous file per chapter); per-verse audio
/// has no segment alignment defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioDelivery {
    Gapless,
    PerVerse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reciter {
    /// Stable slug identifying the recitation, e.g. `"mishari_alafasy"`.
    pub slug: String,
    pub delivery: AudioDelivery,
}

impl Reciter {
    pub fn gapless(slug: &str) -> Self {
        Self { slug: slug.to_string(), delivery: AudioDelivery::Gapless }
    }

    pub fn per_verse(slug: &str) -> Self {
        Self { slug: slug.to_string(), delivery: AudioDelivery::PerVerse }
    }

    /// Numeric ID used by the remote timing service for this reciter.
    ///
    /// `None` for per-verse audio (no timing data exists). Gapless reciters
    /// missing from the table fall back to [`DEFAULT_TIMING_RECITER_ID`].
    pub fn timing_id(&self) -> Option<u32> {
        match self.delivery {
            AudioDelivery::PerVerse => None,
            AudioDelivery::Gapless => Some(
                TIMING_IDS
                    .iter()
                    .find(|(slug, _)| *slug == self.slug)
                    .map(|(_, id)| *id)
                    .unwrap_or(DEFAULT_TIMING_RECITER_ID),
            ),
        }
    }
}

/// Fallback timing-service reciter: Mishari Rashid al-`Afasy, the service's
/// reference recitation. Used for any gapless reciter absent from the table.
pub const DEFAULT_TIMING_RECITER_ID: u32 = 7;

/// Recitation slug → timing-service numeric ID.
const TIMING_IDS: &[(&str, u32)] = &[
    ("abdul_basit_mujawwad", 1),
    ("abdul_basit_murattal", 2),
    ("abdurrahmaan_as_sudais", 3),
    ("abu_bakr_shatri", 4),
    ("hani_ar_rifai", 5),
    ("khalil_al_husary", 6),
    ("mishari_alafasy", 7),
    ("minshawi_mujawwad", 8),
    ("minshawi_murattal", 9),
    ("saud_ash_shuraym", 10),
    ("mahmoud_khalil_al_husary", 12),
];
