use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Row, params};
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use super::DbConn;
use crate::domain::{ComplaintRecord, Priority, Sentiment};

/// Repository for archived complaint records.
#[derive(Clone)]
pub struct ComplaintRepository {
    conn: DbConn,
}

impl ComplaintRepository {
    pub fn new(conn: DbConn) -> Self {
        Self { conn }
    }

    pub fn save(&self, record: &ComplaintRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO complaints
                (id, text, sentiment, category, priority, confidence, captured_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.id().to_string(),
                record.text(),
                record.sentiment().to_string(),
                record.category(),
                record.priority().to_string(),
                record.confidence(),
                record.timestamp().to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )
        .context("save complaint")?;
        Ok(())
    }

    /// Most recent records first.
    pub fn list_recent(&self, limit: usize) -> Result<Vec<ComplaintRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, text, sentiment, category, priority, confidence, captured_at
            FROM complaints
            ORDER BY captured_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], Self::row_to_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM complaints", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Counts over the full history, largest first.
    pub fn counts_by_category(&self) -> Result<Vec<(String, usize)>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT category, COUNT(*) AS n
            FROM complaints
            GROUP BY category
            ORDER BY n DESC, category ASC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let label: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((label, count as usize))
        })?;
        let mut counts = Vec::new();
        for row in rows {
            counts.push(row?);
        }
        Ok(counts)
    }

    /// Counts over the full history for all three sentiments.
    pub fn counts_by_sentiment(&self) -> Result<BTreeMap<Sentiment, usize>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT sentiment, COUNT(*) FROM complaints GROUP BY sentiment")?;
        let rows = stmt.query_map([], |row| {
            let sentiment: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((sentiment, count as usize))
        })?;

        let mut counts: BTreeMap<Sentiment, usize> =
            Sentiment::ALL.iter().map(|s| (*s, 0)).collect();
        for row in rows {
            let (raw, count) = row?;
            let sentiment = Sentiment::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("corrupt sentiment in archive: {e}"))?;
            *counts.entry(sentiment).or_insert(0) += count;
        }
        Ok(counts)
    }

    pub fn delete_all(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let affected = conn.execute("DELETE FROM complaints", [])?;
        Ok(affected)
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ComplaintRecord> {
        let id: String = row.get(0)?;
        let id = Uuid::parse_str(&id).map_err(|e| conversion_error(0, e.to_string()))?;
        let sentiment: String = row.get(2)?;
        let sentiment = Sentiment::from_str(&sentiment).map_err(|e| conversion_error(2, e))?;
        let priority: String = row.get(4)?;
        let priority = Priority::from_str(&priority).map_err(|e| conversion_error(4, e))?;
        let captured_at: String = row.get(6)?;
        let captured_at = DateTime::parse_from_rfc3339(&captured_at)
            .map_err(|e| conversion_error(6, e.to_string()))?
            .with_timezone(&Utc);

        let text: String = row.get(1)?;
        let category: String = row.get(3)?;
        let confidence: Option<f64> = row.get(5)?;
        let record = ComplaintRecord::captured_at(
            text,
            sentiment,
            category,
            priority,
            confidence,
            captured_at,
        )
        .map_err(|e| conversion_error(1, e.to_string()))?;
        Ok(record.with_id(id))
    }
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}
