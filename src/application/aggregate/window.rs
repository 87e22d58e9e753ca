//! Fixed-capacity FIFO window over the most recent classified complaints.
//!
//! Tallies are updated on every append and eviction so that they always equal
//! the multiset counts of the records currently held.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::summary::{WindowSummary, term_frequencies};
use crate::domain::{ClassifyError, ClassifyResult, ComplaintRecord, Priority, Sentiment, Taxonomy};

/// Window size used by the live dashboards.
pub const DEFAULT_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    /// Every category of the taxonomy, in chart order.
    labels: Vec<String>,
    records: VecDeque<ComplaintRecord>,
    category_counts: HashMap<String, usize>,
    sentiment_counts: BTreeMap<Sentiment, usize>,
    priority_counts: BTreeMap<Priority, usize>,
}

impl RollingWindow {
    pub fn new(capacity: usize, taxonomy: &Taxonomy) -> ClassifyResult<Self> {
        if capacity == 0 {
            return Err(ClassifyError::invalid(
                "capacity",
                "window capacity must be at least 1",
            ));
        }
        let labels = taxonomy.labels();
        Ok(Self {
            capacity,
            category_counts: labels.iter().map(|l| (l.clone(), 0)).collect(),
            sentiment_counts: Sentiment::ALL.iter().map(|s| (*s, 0)).collect(),
            priority_counts: Priority::ALL.iter().map(|p| (*p, 0)).collect(),
            labels,
            records: VecDeque::with_capacity(capacity),
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Append at the tail and evict from the head down to capacity.
    ///
    /// Returns the evicted records, oldest first. A record whose category is
    /// not part of the taxonomy is rejected without touching the window.
    pub fn append(&mut self, record: ComplaintRecord) -> ClassifyResult<Vec<ComplaintRecord>> {
        if !self.category_counts.contains_key(record.category()) {
            return Err(ClassifyError::invalid(
                "category",
                format!("{} is not part of the taxonomy", record.category()),
            ));
        }

        self.tally(&record, true);
        self.records.push_back(record);

        let mut evicted = Vec::new();
        while self.records.len() > self.capacity {
            if let Some(oldest) = self.records.pop_front() {
                self.tally(&oldest, false);
                evicted.push(oldest);
            }
        }
        Ok(evicted)
    }

    fn tally(&mut self, record: &ComplaintRecord, add: bool) {
        let bump = |count: &mut usize| {
            if add {
                *count += 1;
            } else {
                *count -= 1;
            }
        };
        if let Some(count) = self.category_counts.get_mut(record.category()) {
            bump(count);
        }
        bump(self.sentiment_counts.entry(record.sentiment()).or_insert(0));
        bump(self.priority_counts.entry(record.priority()).or_insert(0));
    }

    /// Count for every taxonomy category, zero-count ones included, in chart order.
    pub fn counts_by_category(&self) -> Vec<(String, usize)> {
        self.labels
            .iter()
            .map(|label| {
                let count = self.category_counts.get(label).copied().unwrap_or(0);
                (label.clone(), count)
            })
            .collect()
    }

    /// Count for each of the three sentiments.
    pub fn counts_by_sentiment(&self) -> BTreeMap<Sentiment, usize> {
        self.sentiment_counts.clone()
    }

    pub fn counts_by_priority(&self) -> BTreeMap<Priority, usize> {
        self.priority_counts.clone()
    }

    /// Category x priority counts with every cell present.
    pub fn priority_matrix(&self) -> Vec<(String, BTreeMap<Priority, usize>)> {
        let mut matrix: Vec<(String, BTreeMap<Priority, usize>)> = self
            .labels
            .iter()
            .map(|label| (label.clone(), Priority::ALL.iter().map(|p| (*p, 0)).collect()))
            .collect();
        for record in &self.records {
            if let Some((_, row)) = matrix.iter_mut().find(|(l, _)| l == record.category()) {
                *row.entry(record.priority()).or_insert(0) += 1;
            }
        }
        matrix
    }

    /// Copy of the window contents, oldest first.
    pub fn snapshot(&self) -> Vec<ComplaintRecord> {
        self.records.iter().cloned().collect()
    }

    /// The `n` most recent records, newest first.
    pub fn latest(&self, n: usize) -> Vec<ComplaintRecord> {
        self.records.iter().rev().take(n).cloned().collect()
    }

    pub fn summary(&self) -> WindowSummary {
        // Ties resolve to the earlier category in chart order.
        let most_common = self
            .counts_by_category()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .fold(None::<(String, usize)>, |best, (label, count)| match best {
                Some((_, top)) if top >= count => best,
                _ => Some((label, count)),
            })
            .map(|(label, _)| label);

        WindowSummary {
            total: self.records.len(),
            negative: self.sentiment_counts.get(&Sentiment::Negative).copied().unwrap_or(0),
            high_priority: self.priority_counts.get(&Priority::High).copied().unwrap_or(0),
            most_common,
        }
    }

    /// Most frequent terms across negative complaints.
    pub fn top_negative_terms(&self, limit: usize) -> Vec<(String, usize)> {
        term_frequencies(
            self.records
                .iter()
                .filter(|r| r.sentiment().is_negative())
                .map(|r| r.text()),
            limit,
        )
    }
}
