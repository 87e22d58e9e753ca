use crate::domain::{MatchStrategy, Taxonomy};

/// Assigns one taxonomy label to free text by keyword substring matching.
///
/// Matching runs over raw substrings of the lower-cased text, not word tokens,
/// so short fragments such as `konto` also hit compounds like `Kundenkonto`.
#[derive(Debug, Clone, Default)]
pub struct KeywordCategorizer {
    taxonomy: Taxonomy,
}

impl KeywordCategorizer {
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Always returns a member of the taxonomy; the default when nothing matches.
    pub fn categorize(&self, text: &str) -> &str {
        let text = text.to_lowercase();
        let matched = match self.taxonomy.strategy() {
            MatchStrategy::FirstMatch => self.first_match(&text),
            MatchStrategy::MostHits => self.most_hits(&text),
        };
        matched.unwrap_or(self.taxonomy.default_category())
    }

    fn first_match(&self, text: &str) -> Option<&str> {
        self.taxonomy
            .rules()
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|rule| rule.label.as_str())
    }

    fn most_hits(&self, text: &str) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for rule in self.taxonomy.rules() {
            let hits = rule
                .keywords
                .iter()
                .filter(|k| text.contains(k.as_str()))
                .count();
            // Strictly greater keeps the earlier category on ties.
            if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
                best = Some((rule.label.as_str(), hits));
            }
        }
        best.map(|(label, _)| label)
    }
}
