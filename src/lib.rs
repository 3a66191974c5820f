pub mod annotation;
pub mod error;
pub mod quran;
pub mod scheduler;
pub mod services;

// Re-export specific items if needed for convenient access
pub use annotation::AnnotationProvider;
pub use error::{Error, Result};
pub use scheduler::{ChapterTimingCache, WordScheduler};
