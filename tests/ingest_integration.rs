//! Integration tests for ingesting complaint files into a shared session.

use std::time::Duration;

use complaintpro::infra::db::Database;
use complaintpro::infra::source::{StaticSource, demo_complaints, open_source};
use complaintpro::{ComplaintClassifier, IngestSession, RollingWindow, Sentiment, SharedWindow, Taxonomy};

fn session(capacity: usize) -> anyhow::Result<IngestSession> {
    let window = RollingWindow::new(capacity, &Taxonomy::default())?;
    Ok(IngestSession::new(
        ComplaintClassifier::default(),
        SharedWindow::new(window),
    ))
}

#[tokio::test]
async fn test_csv_and_jsonl_inputs_feed_one_window() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let csv_path = dir.path().join("predictions.csv");
    std::fs::write(
        &csv_path,
        "Text,Label,Score\n\
         Rechnung doppelt abgebucht,NEG,0.91\n\
         Paket nicht angekommen,LABEL_0,0.4\n\
         ,NEG,0.9\n",
    )?;
    let jsonl_path = dir.path().join("predictions.jsonl");
    std::fs::write(
        &jsonl_path,
        "{\"text\": \"Passwort vergessen, Login gesperrt\", \"label\": \"negativ\"}\n\
         \n\
         {\"text\": \"Alles bestens\", \"sentiment\": \"positive\", \"confidence\": 0.99}\n",
    )?;

    let db = Database::open_in_memory()?;
    let session = session(20)?.with_archive(db.complaint_repo());

    let mut handles = Vec::new();
    for path in [&csv_path, &jsonl_path] {
        let source = open_source(path)?;
        let session = session.clone();
        handles.push(tokio::spawn(async move {
            session.drain(source, Duration::ZERO).await
        }));
    }
    let mut ingested = 0;
    let mut skipped = 0;
    for handle in handles {
        let stats = handle.await?;
        ingested += stats.ingested;
        skipped += stats.skipped;
    }

    assert_eq!(ingested, 4);
    assert_eq!(skipped, 1);

    let window = session.window();
    assert_eq!(window.len(), 4);
    let sentiments = window.counts_by_sentiment();
    assert_eq!(sentiments[&Sentiment::Negative], 3);
    assert_eq!(sentiments[&Sentiment::Positive], 1);

    let categories = window.counts_by_category();
    let get = |label: &str| {
        categories
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
    };
    assert_eq!(get("Billing"), Some(1));
    assert_eq!(get("Delivery"), Some(1));
    assert_eq!(get("Account"), Some(1));
    assert_eq!(get("Support"), Some(1));
    assert_eq!(get("Product"), Some(0));

    assert_eq!(db.complaint_repo().count()?, 4);
    Ok(())
}

#[tokio::test]
async fn test_demo_set_fills_a_small_window() -> anyhow::Result<()> {
    let session = session(5)?;
    let demo = demo_complaints();
    let total = demo.len();

    let stats = session
        .drain(Box::new(StaticSource::new("demo", demo)), Duration::ZERO)
        .await;

    assert_eq!(stats.ingested, total);
    assert_eq!(session.window().len(), 5);
    let summary = session.window().summary();
    assert_eq!(summary.total, 5);
    assert_eq!(
        session
            .window()
            .counts_by_category()
            .iter()
            .map(|(_, c)| c)
            .sum::<usize>(),
        5
    );
    Ok(())
}

#[test]
fn test_unknown_input_format_is_rejected() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("predictions.xlsx");
    std::fs::write(&path, "")?;
    assert!(open_source(&path).is_err());
    Ok(())
}
