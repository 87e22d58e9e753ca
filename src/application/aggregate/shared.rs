use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::summary::WindowSummary;
use super::window::RollingWindow;
use crate::domain::{ClassifyResult, ComplaintRecord, Priority, Sentiment};

/// A [`RollingWindow`] shared between several producers and readers.
///
/// Each call holds the lock for its whole read-modify-write, so a reader sees
/// the state between two appends and never a half-applied one.
#[derive(Debug, Clone)]
pub struct SharedWindow {
    inner: Arc<Mutex<RollingWindow>>,
}

impl SharedWindow {
    pub fn new(window: RollingWindow) -> Self {
        Self {
            inner: Arc::new(Mutex::new(window)),
        }
    }

    pub fn append(&self, record: ComplaintRecord) -> ClassifyResult<Vec<ComplaintRecord>> {
        self.inner.lock().append(record)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn counts_by_category(&self) -> Vec<(String, usize)> {
        self.inner.lock().counts_by_category()
    }

    pub fn counts_by_sentiment(&self) -> BTreeMap<Sentiment, usize> {
        self.inner.lock().counts_by_sentiment()
    }

    pub fn counts_by_priority(&self) -> BTreeMap<Priority, usize> {
        self.inner.lock().counts_by_priority()
    }

    pub fn snapshot(&self) -> Vec<ComplaintRecord> {
        self.inner.lock().snapshot()
    }

    pub fn summary(&self) -> WindowSummary {
        self.inner.lock().summary()
    }

    /// Run `f` against a consistent view of the window.
    pub fn read<R>(&self, f: impl FnOnce(&RollingWindow) -> R) -> R {
        f(&self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Taxonomy;
    use std::thread;

    #[test]
    fn concurrent_producers_keep_tallies_consistent() {
        let window = SharedWindow::new(RollingWindow::new(20, &Taxonomy::default()).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|producer| {
                let window = window.clone();
                thread::spawn(move || {
                    for n in 0..50 {
                        let record = ComplaintRecord::new(
                            format!("producer {producer} complaint {n}"),
                            Sentiment::Negative,
                            "Billing",
                            Priority::Medium,
                            None,
                        )
                        .unwrap();
                        window.append(record).unwrap();
                        window.read(|w| {
                            let total: usize = w.counts_by_sentiment().values().sum();
                            assert_eq!(total, w.len());
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(window.len(), 20);
        let billing = window
            .counts_by_category()
            .into_iter()
            .find(|(label, _)| label == "Billing")
            .map(|(_, count)| count);
        assert_eq!(billing, Some(20));
    }
}
