pub mod application;
pub mod domain;
pub mod infra;
pub mod session;

pub use application::aggregate::{RollingWindow, SharedWindow, WindowSummary};
pub use application::classify::{ComplaintClassifier, KeywordCategorizer, LabelNormalizer};
pub use domain::{ClassifyError, ComplaintRecord, Priority, RawComplaint, Sentiment, Taxonomy};
pub use session::{IngestSession, IngestStats};
