pub mod markup;
pub mod provider;

pub use provider::{AnnotationProvider, AnnotationTable, TransliterationLookup, WordAnnotation};
