use crate::domain::{Priority, Sentiment};

/// Confidence above which a negative complaint is escalated to `High`.
pub const DEFAULT_HIGH_PRIORITY_THRESHOLD: f64 = 0.8;

/// Negative and confident is `High`, negative otherwise is `Medium`,
/// everything else is `Low`.
pub fn derive_priority(sentiment: Sentiment, confidence: Option<f64>, threshold: f64) -> Priority {
    match (sentiment, confidence) {
        (Sentiment::Negative, Some(score)) if score > threshold => Priority::High,
        (Sentiment::Negative, _) => Priority::Medium,
        _ => Priority::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalates_confident_negatives() {
        let t = DEFAULT_HIGH_PRIORITY_THRESHOLD;
        assert_eq!(derive_priority(Sentiment::Negative, Some(0.95), t), Priority::High);
        assert_eq!(derive_priority(Sentiment::Negative, Some(0.8), t), Priority::Medium);
        assert_eq!(derive_priority(Sentiment::Negative, None, t), Priority::Medium);
    }

    #[test]
    fn non_negative_is_low_regardless_of_confidence() {
        let t = DEFAULT_HIGH_PRIORITY_THRESHOLD;
        assert_eq!(derive_priority(Sentiment::Positive, Some(0.99), t), Priority::Low);
        assert_eq!(derive_priority(Sentiment::Neutral, Some(0.99), t), Priority::Low);
    }
}
