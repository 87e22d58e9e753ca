use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::application::aggregate::RollingWindow;
use crate::domain::{ComplaintRecord, Priority, Sentiment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub title: String,
    pub include_summary: bool,
    pub include_categories: bool,
    pub include_sentiment: bool,
    pub include_priority_matrix: bool,
    /// How many of the newest complaints to list; 0 skips the table.
    pub latest: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "Complaint Report".to_string(),
            include_summary: true,
            include_categories: true,
            include_sentiment: true,
            include_priority_matrix: true,
            latest: 10,
        }
    }
}

/// Flat CSV row for one record.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Text")]
    text: &'a str,
    #[serde(rename = "Category")]
    category: &'a str,
    #[serde(rename = "Sentiment")]
    sentiment: &'static str,
    #[serde(rename = "Priority")]
    priority: String,
    #[serde(rename = "Confidence")]
    confidence: Option<f64>,
}

impl<'a> From<&'a ComplaintRecord> for CsvRow<'a> {
    fn from(record: &'a ComplaintRecord) -> Self {
        Self {
            time: record.timestamp().format("%Y-%m-%d %H:%M").to_string(),
            text: record.text(),
            category: record.category(),
            sentiment: record.sentiment().code(),
            priority: record.priority().to_string(),
            confidence: record.confidence(),
        }
    }
}

pub struct ReportExporter;

impl ReportExporter {
    pub fn to_markdown(window: &RollingWindow, options: &ExportOptions) -> String {
        let mut md = String::new();
        md.push_str(&format!("# {}\n\n", options.title));

        if options.include_summary {
            let summary = window.summary();
            md.push_str("## Overview\n\n");
            md.push_str("| Metric | Value |\n| :--- | :--- |\n");
            md.push_str(&format!("| **Total Complaints** | {} |\n", summary.total));
            md.push_str(&format!("| **Negative** | {} |\n", summary.negative));
            md.push_str(&format!("| **High Priority** | {} |\n", summary.high_priority));
            md.push_str(&format!(
                "| **Most Common** | {} |\n",
                summary.most_common.as_deref().unwrap_or("-")
            ));
            md.push('\n');
        }

        if options.include_categories {
            md.push_str("## Complaints by Category\n\n");
            md.push_str("| Category | Count |\n| :--- | ---: |\n");
            for (label, count) in window.counts_by_category() {
                md.push_str(&format!("| {} | {} |\n", escape_cell(&label), count));
            }
            md.push('\n');
        }

        if options.include_sentiment {
            md.push_str("## Sentiment Distribution\n\n");
            md.push_str("| Sentiment | Count |\n| :--- | ---: |\n");
            let counts = window.counts_by_sentiment();
            for sentiment in Sentiment::ALL {
                md.push_str(&format!(
                    "| {} {} | {} |\n",
                    sentiment_marker(sentiment),
                    sentiment,
                    counts.get(&sentiment).copied().unwrap_or(0)
                ));
            }
            md.push('\n');
        }

        if options.include_priority_matrix {
            md.push_str("## Priority by Category\n\n");
            md.push_str("| Category | High | Medium | Low |\n| :--- | ---: | ---: | ---: |\n");
            for (label, row) in window.priority_matrix() {
                let cell = |p: Priority| row.get(&p).copied().unwrap_or(0);
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    escape_cell(&label),
                    cell(Priority::High),
                    cell(Priority::Medium),
                    cell(Priority::Low)
                ));
            }
            md.push('\n');
        }

        if options.latest > 0 {
            md.push_str(&format!("## Latest {} Complaints\n\n", options.latest));
            let latest = window.latest(options.latest);
            if latest.is_empty() {
                md.push_str("No complaints yet.\n\n");
            } else {
                md.push_str("| Time | Category | Sentiment | Priority | Text |\n");
                md.push_str("| :--- | :--- | :--- | :--- | :--- |\n");
                for record in latest {
                    md.push_str(&format!(
                        "| {} | {} | {} | {} | {} |\n",
                        record.timestamp().format("%H:%M:%S"),
                        escape_cell(record.category()),
                        record.sentiment().code(),
                        record.priority(),
                        escape_cell(record.text())
                    ));
                }
                md.push('\n');
            }
        }

        md
    }

    /// Write records as CSV with a `Time,Text,Category,Sentiment,Priority,Confidence` header.
    pub fn write_csv<W: Write>(records: &[ComplaintRecord], writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for record in records {
            writer
                .serialize(CsvRow::from(record))
                .context("Failed to write complaint row")?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn sentiment_marker(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "🟢",
        Sentiment::Negative => "🔴",
        Sentiment::Neutral => "🟡",
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
