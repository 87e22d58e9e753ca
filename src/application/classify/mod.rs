//! Classification of raw complaints: label normalization, keyword
//! categorization and priority derivation.

pub mod categorizer;
pub mod classifier;
pub mod normalizer;
pub mod priority;

pub use categorizer::KeywordCategorizer;
pub use classifier::{ComplaintClassifier, DEFAULT_MAX_TEXT_CHARS};
pub use normalizer::LabelNormalizer;
pub use priority::{DEFAULT_HIGH_PRIORITY_THRESHOLD, derive_priority};
