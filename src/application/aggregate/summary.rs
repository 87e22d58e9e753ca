use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

static WORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{L}+").unwrap());

/// Shorter letter runs are mostly articles and particles.
const MIN_TERM_CHARS: usize = 4;

/// Headline metrics shown above the charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WindowSummary {
    pub total: usize,
    pub negative: usize,
    pub high_priority: usize,
    /// Category with the highest count; `None` while the window is empty.
    pub most_common: Option<String>,
}

/// Term counts over `texts`, highest count first, then alphabetical.
pub fn term_frequencies<'a>(texts: impl Iterator<Item = &'a str>, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for word in WORD_REGEX.find_iter(text) {
            let term = word.as_str().to_lowercase();
            if term.chars().count() >= MIN_TERM_CHARS {
                *counts.entry(term).or_insert(0) += 1;
            }
        }
    }

    let mut terms: Vec<(String, usize)> = counts.into_iter().collect();
    terms.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
    terms.truncate(limit);
    terms
}
