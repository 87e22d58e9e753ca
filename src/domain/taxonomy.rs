use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::{ClassifyError, ClassifyResult};

/// How a text is matched against the category keyword table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// First category in precedence order with any keyword hit.
    #[default]
    FirstMatch,
    /// Category with the most keyword hits; ties go to the earlier category.
    MostHits,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstMatch => write!(f, "first_match"),
            Self::MostHits => write!(f, "most_hits"),
        }
    }
}

impl FromStr for MatchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "first_match" | "first" => Ok(Self::FirstMatch),
            "most_hits" | "score" | "scoring" => Ok(Self::MostHits),
            other => Err(format!("invalid match strategy: {other}")),
        }
    }
}

/// One category label and the keyword fragments that select it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(label: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            label: label.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Validated category taxonomy: rules in precedence order plus a default label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    rules: Vec<CategoryRule>,
    default_category: String,
    strategy: MatchStrategy,
}

impl Taxonomy {
    pub fn new(
        rules: Vec<CategoryRule>,
        default_category: impl Into<String>,
        strategy: MatchStrategy,
    ) -> ClassifyResult<Self> {
        let default_category = default_category.into().trim().to_string();
        if default_category.is_empty() {
            return Err(ClassifyError::invalid(
                "taxonomy",
                "default category label is empty",
            ));
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(rules.len());
        for rule in rules {
            let label = rule.label.trim().to_string();
            if label.is_empty() {
                return Err(ClassifyError::invalid("taxonomy", "category label is empty"));
            }
            if !seen.insert(label.to_lowercase()) {
                return Err(ClassifyError::invalid(
                    "taxonomy",
                    format!("duplicate category label: {label}"),
                ));
            }
            let mut keywords = Vec::with_capacity(rule.keywords.len());
            for keyword in rule.keywords {
                let keyword = keyword.to_lowercase();
                if keyword.trim().is_empty() {
                    return Err(ClassifyError::invalid(
                        "taxonomy",
                        format!("empty keyword in category {label}"),
                    ));
                }
                keywords.push(keyword);
            }
            normalized.push(CategoryRule { label, keywords });
        }

        // A default naming one of the rules is that rule's category.
        let default_category = normalized
            .iter()
            .find(|r| same_label(&r.label, &default_category))
            .map(|r| r.label.clone())
            .unwrap_or(default_category);

        Ok(Self {
            rules: normalized,
            default_category,
            strategy,
        })
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Every label a text can be assigned, in precedence order with the
    /// default last. This is the fixed order charts are rendered in.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.rules.iter().map(|r| r.label.clone()).collect();
        if !labels.iter().any(|l| same_label(l, &self.default_category)) {
            labels.push(self.default_category.clone());
        }
        labels
    }

    /// Resolve a label case-insensitively to its canonical spelling.
    pub fn resolve_label(&self, label: &str) -> Option<&str> {
        let wanted = label.trim();
        self.rules
            .iter()
            .map(|r| r.label.as_str())
            .chain(std::iter::once(self.default_category.as_str()))
            .find(|l| same_label(l, wanted))
    }

    pub fn contains(&self, label: &str) -> bool {
        same_label(label, &self.default_category)
            || self.rules.iter().any(|r| same_label(&r.label, label))
    }

    /// Keyword sets for German and English complaint text. Product defects
    /// precede delivery because defect reports usually mention the shipment too.
    pub fn default_rules() -> Vec<CategoryRule> {
        vec![
            CategoryRule::new(
                "Product",
                &[
                    "defekt",
                    "kaputt",
                    "broken",
                    "funktioniert nicht",
                    "produkt",
                    "defect",
                ],
            ),
            CategoryRule::new(
                "Billing",
                &[
                    "billing",
                    "rechnung",
                    "geld",
                    "refund",
                    "rückerstattung",
                    "zahlung",
                    "abgebucht",
                    "abbuchung",
                    "invoice",
                    "charged",
                ],
            ),
            CategoryRule::new(
                "Account",
                &["account", "login", "password", "passwort", "konto", "anmeldung"],
            ),
            CategoryRule::new(
                "Delivery",
                &[
                    "delivery",
                    "lieferung",
                    "versand",
                    "spät",
                    "nicht angekommen",
                    "paket",
                ],
            ),
        ]
    }

    pub const DEFAULT_CATEGORY: &'static str = "Support";
}

fn same_label(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            rules: Self::default_rules(),
            default_category: Self::DEFAULT_CATEGORY.to_string(),
            strategy: MatchStrategy::FirstMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_put_default_last() {
        let taxonomy = Taxonomy::default();
        assert_eq!(
            taxonomy.labels(),
            vec!["Product", "Billing", "Account", "Delivery", "Support"]
        );
    }

    #[test]
    fn default_already_in_rules_is_not_duplicated() {
        let taxonomy = Taxonomy::new(
            vec![CategoryRule::new("Support", &["hilfe"])],
            "Support",
            MatchStrategy::FirstMatch,
        )
        .unwrap();
        assert_eq!(taxonomy.labels(), vec!["Support"]);
    }

    #[test]
    fn default_differing_only_in_case_folds_onto_rule() {
        let taxonomy = Taxonomy::new(
            vec![CategoryRule::new("support", &["hilfe"])],
            "Support",
            MatchStrategy::FirstMatch,
        )
        .unwrap();
        assert_eq!(taxonomy.labels(), vec!["support"]);
        assert_eq!(taxonomy.default_category(), "support");
        assert!(taxonomy.contains("SUPPORT"));
        assert_eq!(taxonomy.resolve_label("Support"), Some("support"));
    }

    #[test]
    fn rejects_invalid_tables() {
        assert!(Taxonomy::new(vec![], "  ", MatchStrategy::FirstMatch).is_err());
        assert!(
            Taxonomy::new(
                vec![
                    CategoryRule::new("Billing", &["geld"]),
                    CategoryRule::new("billing", &["rechnung"]),
                ],
                "Support",
                MatchStrategy::FirstMatch,
            )
            .is_err()
        );
        assert!(
            Taxonomy::new(
                vec![CategoryRule::new("Billing", &[" "])],
                "Support",
                MatchStrategy::FirstMatch,
            )
            .is_err()
        );
    }

    #[test]
    fn empty_rule_table_with_default_is_valid() {
        let taxonomy = Taxonomy::new(vec![], "support", MatchStrategy::FirstMatch).unwrap();
        assert_eq!(taxonomy.labels(), vec!["support"]);
    }

    #[test]
    fn resolves_labels_case_insensitively() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.resolve_label("billing"), Some("Billing"));
        assert_eq!(taxonomy.resolve_label(" SUPPORT "), Some("Support"));
        assert_eq!(taxonomy.resolve_label("service"), None);
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!(
            MatchStrategy::from_str("most-hits").unwrap(),
            MatchStrategy::MostHits
        );
        assert_eq!(MatchStrategy::FirstMatch.to_string(), "first_match");
        assert!(MatchStrategy::from_str("random").is_err());
    }
}
