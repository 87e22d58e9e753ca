use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ClassifyError, ClassifyResult, Priority, Sentiment};

/// One classified complaint.
///
/// Fields are private and only readable through accessors: a record is
/// complete when constructed and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplaintRecord {
    id: Uuid,
    text: String,
    sentiment: Sentiment,
    category: String,
    priority: Priority,
    /// Classifier confidence in `[0, 1]`, when the upstream model reported one.
    confidence: Option<f64>,
    /// Capture time, set once at creation.
    timestamp: DateTime<Utc>,
}

impl ComplaintRecord {
    /// Build a record captured now.
    pub fn new(
        text: impl Into<String>,
        sentiment: Sentiment,
        category: impl Into<String>,
        priority: Priority,
        confidence: Option<f64>,
    ) -> ClassifyResult<Self> {
        Self::captured_at(text, sentiment, category, priority, confidence, Utc::now())
    }

    /// Build a record with an explicit capture time.
    pub fn captured_at(
        text: impl Into<String>,
        sentiment: Sentiment,
        category: impl Into<String>,
        priority: Priority,
        confidence: Option<f64>,
        timestamp: DateTime<Utc>,
    ) -> ClassifyResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ClassifyError::invalid("text", "complaint text is empty"));
        }
        let category = category.into();
        if category.trim().is_empty() {
            return Err(ClassifyError::invalid("category", "category label is empty"));
        }
        if let Some(score) = confidence
            && !(score.is_finite() && (0.0..=1.0).contains(&score))
        {
            return Err(ClassifyError::invalid(
                "confidence",
                format!("{score} is outside [0, 1]"),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            text,
            sentiment,
            category,
            priority,
            confidence,
            timestamp,
        })
    }

    /// Rehydrate a stored record, keeping its original id.
    pub(crate) fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Unclassified input as produced by an external source: the complaint text
/// plus whatever the upstream model service reported for it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawComplaint {
    /// Missing in a prediction means empty, which the classifier rejects.
    #[serde(default)]
    pub text: String,
    /// Raw sentiment label, e.g. `NEG`, `LABEL_0`, `negativ`.
    #[serde(default, alias = "sentiment")]
    pub label: Option<String>,
    #[serde(default, alias = "confidence")]
    pub score: Option<f64>,
    /// Category suggested by a zero-shot classifier, if any.
    #[serde(default)]
    pub category: Option<String>,
}

impl RawComplaint {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
