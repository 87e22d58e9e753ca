use crate::domain::{LabelScheme, Sentiment};

/// Folds raw sentiment labels from any upstream model into a [`Sentiment`].
#[derive(Debug, Clone, Default)]
pub struct LabelNormalizer {
    scheme: LabelScheme,
}

impl LabelNormalizer {
    pub fn new(scheme: LabelScheme) -> Self {
        Self { scheme }
    }

    /// Never fails: a label no marker group recognizes is `Neutral`.
    pub fn normalize(&self, raw: &str) -> Sentiment {
        let label = raw.to_lowercase();
        self.scheme
            .groups()
            .iter()
            .find(|group| group.markers.iter().any(|m| label.contains(m.as_str())))
            .map(|group| group.sentiment)
            .unwrap_or(Sentiment::Neutral)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LabelMarkers;

    fn normalize(raw: &str) -> Sentiment {
        LabelNormalizer::default().normalize(raw)
    }

    #[test]
    fn folds_common_label_schemes() {
        assert_eq!(normalize("LABEL_0"), Sentiment::Negative);
        assert_eq!(normalize("LABEL_2"), Sentiment::Positive);
        assert_eq!(normalize("LABEL_1"), Sentiment::Neutral);
        assert_eq!(normalize("NEG"), Sentiment::Negative);
        assert_eq!(normalize("POSITIVE"), Sentiment::Positive);
        assert_eq!(normalize("negativ"), Sentiment::Negative);
        assert_eq!(normalize("positiv"), Sentiment::Positive);
        assert_eq!(normalize("neutral"), Sentiment::Neutral);
        assert_eq!(normalize("+"), Sentiment::Positive);
        assert_eq!(normalize("-1"), Sentiment::Negative);
    }

    #[test]
    fn unknown_labels_are_neutral() {
        assert_eq!(normalize("xyz"), Sentiment::Neutral);
        assert_eq!(normalize(""), Sentiment::Neutral);
        assert_eq!(normalize("mixed"), Sentiment::Neutral);
    }

    #[test]
    fn negative_markers_win_over_positive() {
        // Contains both "0" and "2".
        assert_eq!(normalize("LABEL_20"), Sentiment::Negative);
        assert_eq!(normalize("pos/neg"), Sentiment::Negative);
    }

    #[test]
    fn canonical_spellings_are_fixed_points() {
        for sentiment in Sentiment::ALL {
            assert_eq!(normalize(&sentiment.to_string()), sentiment);
            assert_eq!(normalize(sentiment.code()), sentiment);
            let twice = normalize(&normalize(&sentiment.to_string()).to_string());
            assert_eq!(twice, sentiment);
        }
    }

    #[test]
    fn custom_scheme_is_used_in_order() {
        let normalizer = LabelNormalizer::new(
            LabelScheme::new(vec![
                LabelMarkers::new(Sentiment::Positive, &["gut"]),
                LabelMarkers::new(Sentiment::Negative, &["schlecht"]),
            ])
            .unwrap(),
        );
        assert_eq!(normalizer.normalize("GUT"), Sentiment::Positive);
        assert_eq!(normalizer.normalize("nicht gut, schlecht"), Sentiment::Positive);
        assert_eq!(normalizer.normalize("Schlecht"), Sentiment::Negative);
        assert_eq!(normalizer.normalize("LABEL_0"), Sentiment::Neutral);
    }
}
