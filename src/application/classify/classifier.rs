use log::debug;

use super::categorizer::KeywordCategorizer;
use super::normalizer::LabelNormalizer;
use super::priority::{DEFAULT_HIGH_PRIORITY_THRESHOLD, derive_priority};
use crate::domain::{ClassifyError, ClassifyResult, ComplaintRecord, RawComplaint};

/// Default display length for stored complaint text.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 90;

/// Turns one raw complaint into a complete [`ComplaintRecord`].
#[derive(Debug, Clone)]
pub struct ComplaintClassifier {
    normalizer: LabelNormalizer,
    categorizer: KeywordCategorizer,
    high_priority_threshold: f64,
    max_text_chars: Option<usize>,
}

impl Default for ComplaintClassifier {
    fn default() -> Self {
        Self::new(LabelNormalizer::default(), KeywordCategorizer::default())
    }
}

impl ComplaintClassifier {
    pub fn new(normalizer: LabelNormalizer, categorizer: KeywordCategorizer) -> Self {
        Self {
            normalizer,
            categorizer,
            high_priority_threshold: DEFAULT_HIGH_PRIORITY_THRESHOLD,
            max_text_chars: Some(DEFAULT_MAX_TEXT_CHARS),
        }
    }

    pub fn with_high_priority_threshold(mut self, threshold: f64) -> Self {
        self.high_priority_threshold = threshold;
        self
    }

    /// `None` keeps the full text.
    pub fn with_max_text_chars(mut self, max: Option<usize>) -> Self {
        self.max_text_chars = max;
        self
    }

    pub fn normalizer(&self) -> &LabelNormalizer {
        &self.normalizer
    }

    pub fn classify(&self, raw: &RawComplaint) -> ClassifyResult<ComplaintRecord> {
        let text = raw.text.trim();
        if text.is_empty() {
            return Err(ClassifyError::invalid("text", "complaint text is empty"));
        }
        if let Some(score) = raw.score
            && !(score.is_finite() && (0.0..=1.0).contains(&score))
        {
            return Err(ClassifyError::invalid(
                "score",
                format!("{score} is outside [0, 1]"),
            ));
        }

        let sentiment = self.normalizer.normalize(raw.label.as_deref().unwrap_or(""));
        let taxonomy = self.categorizer.taxonomy();
        // A zero-shot suggestion is only trusted when it names a known label.
        let category = match raw.category.as_deref().and_then(|c| taxonomy.resolve_label(c)) {
            Some(label) => label,
            None => self.categorizer.categorize(text),
        };
        let priority = derive_priority(sentiment, raw.score, self.high_priority_threshold);

        debug!(
            "classified label={:?} -> {} / {} / {}",
            raw.label, sentiment, category, priority
        );

        ComplaintRecord::new(
            self.display_text(text),
            sentiment,
            category,
            priority,
            raw.score,
        )
    }

    fn display_text(&self, text: &str) -> String {
        match self.max_text_chars {
            Some(max) if text.chars().count() > max => {
                let head: String = text.chars().take(max).collect();
                format!("{}...", head.trim_end())
            }
            _ => text.to_string(),
        }
    }
}
