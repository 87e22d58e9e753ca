//! Complaint sources: where raw complaint text and upstream model output come from.
//!
//! The classification core never reads files itself; it is handed
//! [`RawComplaint`]s by one of these sources.

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::domain::RawComplaint;

/// A fallible, pull-based stream of raw complaints.
pub trait ComplaintSource: Send {
    /// Human readable origin, used in log lines.
    fn name(&self) -> &str;

    /// Next complaint, `Ok(None)` once the source is exhausted.
    fn fetch(&mut self) -> Result<Option<RawComplaint>>;
}

/// CSV file with a `Text` column and optional label, score and category columns.
pub struct CsvSource {
    name: String,
    reader: csv::Reader<File>,
    columns: CsvColumns,
    row: usize,
}

#[derive(Debug, Clone, Copy)]
struct CsvColumns {
    text: usize,
    label: Option<usize>,
    score: Option<usize>,
    category: Option<usize>,
}

impl CsvColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();
        let find = |names: &[&str]| names.iter().find_map(|n| index.get(*n).copied());

        let Some(text) = find(&["text"]) else {
            bail!("CSV must have a column named 'Text'");
        };
        Ok(Self {
            text,
            label: find(&["label", "sentiment"]),
            score: find(&["score", "confidence"]),
            category: find(&["category"]),
        })
    }
}

impl CsvSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
        let headers = reader
            .headers()
            .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
            .clone();
        let columns = CsvColumns::from_headers(&headers)
            .with_context(|| format!("Unsupported CSV layout: {}", path.display()))?;
        Ok(Self {
            name: path.display().to_string(),
            reader,
            columns,
            row: 0,
        })
    }
}

impl ComplaintSource for CsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> Result<Option<RawComplaint>> {
        let mut record = csv::StringRecord::new();
        if !self.reader.read_record(&mut record)? {
            return Ok(None);
        }
        self.row += 1;

        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let score = match cell(self.columns.score) {
            Some(raw) => Some(raw.parse::<f64>().with_context(|| {
                format!("{} row {}: invalid score '{}'", self.name, self.row, raw)
            })?),
            None => None,
        };

        Ok(Some(RawComplaint {
            text: cell(Some(self.columns.text)).unwrap_or_default(),
            label: cell(self.columns.label),
            score,
            category: cell(self.columns.category),
        }))
    }
}

/// One JSON prediction object per line, as returned by the prediction API.
pub struct JsonLinesSource {
    name: String,
    lines: std::io::Lines<BufReader<File>>,
    line_no: usize,
}

impl JsonLinesSource {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?;
        Ok(Self {
            name: path.display().to_string(),
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }
}

impl ComplaintSource for JsonLinesSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> Result<Option<RawComplaint>> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line.with_context(|| format!("Failed to read {}", self.name))?;
            if line.trim().is_empty() {
                continue;
            }
            let raw: RawComplaint = serde_json::from_str(&line)
                .with_context(|| format!("{} line {}: invalid prediction", self.name, self.line_no))?;
            return Ok(Some(raw));
        }
        Ok(None)
    }
}

/// In-memory source, mainly for tests and canned demo data.
pub struct StaticSource {
    name: String,
    items: std::vec::IntoIter<RawComplaint>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, items: Vec<RawComplaint>) -> Self {
        Self {
            name: name.into(),
            items: items.into_iter(),
        }
    }
}

impl ComplaintSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> Result<Option<RawComplaint>> {
        Ok(self.items.next())
    }
}

/// Canned predictions used when no input is given.
pub fn demo_complaints() -> Vec<RawComplaint> {
    vec![
        RawComplaint::text("Rechnung doppelt abgebucht und keine Rückerstattung erhalten")
            .with_label("NEG")
            .with_score(0.94),
        RawComplaint::text("Mein Konto funktioniert nicht und die Lieferung ist verspätet")
            .with_label("NEG")
            .with_score(0.87),
        RawComplaint::text("Paket nicht angekommen, Sendungsverfolgung zeigt nichts")
            .with_label("NEG")
            .with_score(0.71),
        RawComplaint::text("The blender arrived broken, the glass jar is cracked")
            .with_label("negative")
            .with_score(0.97),
        RawComplaint::text("Login via app keeps failing after the password reset")
            .with_label("LABEL_0")
            .with_score(0.66),
        RawComplaint::text("Support hat schnell geholfen, danke!")
            .with_label("POS")
            .with_score(0.92),
        RawComplaint::text("Hotline war erreichbar, Problem noch offen")
            .with_label("NEU")
            .with_score(0.58),
        RawComplaint::text("Refund arrived within two days, great service")
            .with_label("positive")
            .with_score(0.95),
    ]
}

/// Open a source by file extension.
pub fn open_source(path: &Path) -> Result<Box<dyn ComplaintSource>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => Ok(Box::new(CsvSource::open(path)?)),
        "jsonl" | "ndjson" | "json" => Ok(Box::new(JsonLinesSource::open(path)?)),
        other => bail!("Unsupported input format '{}' for {}", other, path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn drain(source: &mut dyn ComplaintSource) -> Vec<RawComplaint> {
        let mut out = Vec::new();
        while let Some(raw) = source.fetch().unwrap() {
            out.push(raw);
        }
        out
    }

    #[test]
    fn reads_csv_with_optional_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "complaints.csv",
            "ID,Text,Sentiment,Confidence\n1,Mein Konto funktioniert nicht,NEG,0.93\n2,\"Lieferung, endlich da\",,\n",
        );
        let mut source = open_source(&path).unwrap();
        let items = drain(source.as_mut());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "Mein Konto funktioniert nicht");
        assert_eq!(items[0].label.as_deref(), Some("NEG"));
        assert_eq!(items[0].score, Some(0.93));
        assert_eq!(items[1].text, "Lieferung, endlich da");
        assert_eq!(items[1].label, None);
        assert_eq!(items[1].score, None);
    }

    #[test]
    fn csv_without_text_column_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.csv", "Body\nhello\n");
        let err = CsvSource::open(&path).err().unwrap();
        assert!(format!("{err:#}").contains("'Text'"));
    }

    #[test]
    fn csv_with_bad_score_reports_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.csv", "text,score\nkaputt,high\n");
        let mut source = CsvSource::open(&path).unwrap();
        let err = source.fetch().unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn reads_json_lines_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "predictions.jsonl",
            "{\"text\":\"Rechnung falsch\",\"sentiment\":\"NEG\",\"score\":0.88,\"category\":\"billing\"}\n\n{\"text\":\"Alles gut\",\"label\":\"LABEL_2\"}\n",
        );
        let mut source = open_source(&path).unwrap();
        let items = drain(source.as_mut());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category.as_deref(), Some("billing"));
        assert_eq!(items[1].label.as_deref(), Some("LABEL_2"));
    }

    #[test]
    fn invalid_json_line_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad.jsonl", "\nnot json\n");
        let mut source = JsonLinesSource::open(&path).unwrap();
        let err = source.fetch().unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(open_source(Path::new("complaints.parquet")).is_err());
    }

    #[test]
    fn demo_set_is_well_formed() {
        let demo = demo_complaints();
        assert!(!demo.is_empty());
        assert!(demo.iter().all(|d| !d.text.trim().is_empty() && d.label.is_some()));
    }

    #[test]
    fn static_source_yields_in_order() {
        let mut source = StaticSource::new(
            "demo",
            vec![RawComplaint::text("a"), RawComplaint::text("b")],
        );
        assert_eq!(source.name(), "demo");
        assert_eq!(source.fetch().unwrap().unwrap().text, "a");
        assert_eq!(source.fetch().unwrap().unwrap().text, "b");
        assert!(source.fetch().unwrap().is_none());
    }
}
