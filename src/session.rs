//! One live monitoring session: a classifier, the rolling window it feeds,
//! and optionally the archive every record is also written to.
//!
//! Sessions are explicit values handed to whichever loop needs them; several
//! producers may share one session by cloning it.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use crate::application::aggregate::SharedWindow;
use crate::application::classify::ComplaintClassifier;
use crate::domain::{ComplaintRecord, RawComplaint};
use crate::infra::db::ComplaintRepository;
use crate::infra::source::ComplaintSource;

/// Give up on a source after this many fetch errors in a row.
const MAX_CONSECUTIVE_FETCH_ERRORS: usize = 5;

/// Per-source outcome of [`IngestSession::drain`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub source: String,
    pub ingested: usize,
    /// Inputs rejected as invalid (e.g. empty text).
    pub skipped: usize,
    /// Fetch errors reported by the source.
    pub failed: usize,
}

#[derive(Clone)]
pub struct IngestSession {
    classifier: Arc<ComplaintClassifier>,
    window: SharedWindow,
    archive: Option<ComplaintRepository>,
}

impl IngestSession {
    pub fn new(classifier: ComplaintClassifier, window: SharedWindow) -> Self {
        Self {
            classifier: Arc::new(classifier),
            window,
            archive: None,
        }
    }

    pub fn with_archive(mut self, archive: ComplaintRepository) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn window(&self) -> &SharedWindow {
        &self.window
    }

    /// Classify one complaint and commit it to the window (and archive).
    pub fn ingest(&self, raw: &RawComplaint) -> Result<ComplaintRecord> {
        let record = self.classifier.classify(raw)?;
        let evicted = self.window.append(record.clone())?;

        log::info!(
            "{} | {} | {} | {}",
            record.category().to_uppercase(),
            record.sentiment().code(),
            record.priority(),
            record.text()
        );
        if !evicted.is_empty() {
            log::debug!("evicted {} record(s) from window", evicted.len());
        }

        if let Some(archive) = &self.archive
            && let Err(err) = archive.save(&record)
        {
            log::warn!("Failed to archive complaint {}: {:#}", record.id(), err);
        }

        Ok(record)
    }

    /// Pull every complaint from `source`, pausing `interval` between items.
    ///
    /// Source reads and archive writes block, so each one runs on tokio's
    /// blocking pool rather than on the async worker.
    pub async fn drain(
        &self,
        mut source: Box<dyn ComplaintSource>,
        interval: Duration,
    ) -> IngestStats {
        let mut stats = IngestStats {
            source: source.name().to_string(),
            ..Default::default()
        };
        let mut consecutive_errors = 0;

        loop {
            let fetched = tokio::task::spawn_blocking(move || {
                let next = source.fetch();
                (source, next)
            })
            .await;
            let next = match fetched {
                Ok((returned, next)) => {
                    source = returned;
                    next
                }
                Err(err) => {
                    log::error!("Fetch task for {} failed: {}", stats.source, err);
                    stats.failed += 1;
                    break;
                }
            };

            match next {
                Ok(Some(raw)) => {
                    consecutive_errors = 0;
                    let session = self.clone();
                    let outcome = tokio::task::spawn_blocking(move || session.ingest(&raw)).await;
                    match outcome {
                        Ok(Ok(_)) => stats.ingested += 1,
                        Ok(Err(err)) => {
                            log::warn!("Skipping complaint from {}: {:#}", stats.source, err);
                            stats.skipped += 1;
                        }
                        Err(err) => {
                            log::error!("Ingest task for {} failed: {}", stats.source, err);
                            stats.failed += 1;
                        }
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    stats.failed += 1;
                    consecutive_errors += 1;
                    log::warn!("Failed to fetch from {}: {:#}", stats.source, err);
                    if consecutive_errors >= MAX_CONSECUTIVE_FETCH_ERRORS {
                        log::error!(
                            "Giving up on {} after {} consecutive errors",
                            stats.source,
                            consecutive_errors
                        );
                        break;
                    }
                }
            }

            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        }

        log::info!(
            "{}: {} ingested, {} skipped, {} failed",
            stats.source,
            stats.ingested,
            stats.skipped,
            stats.failed
        );
        stats
    }
}
