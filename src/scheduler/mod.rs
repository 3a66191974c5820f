pub mod cache;
pub mod word_scheduler;

pub use cache::ChapterTimingCache;
pub use word_scheduler::{WordCallback, WordScheduler};
