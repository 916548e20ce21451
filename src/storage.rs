use crate::error::Result;
use crate::types::ReportRecord;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Start of the fetch window: today minus the lookback, or today when no
/// positive lookback was requested.
pub fn start_date(lookback_days: Option<u32>, now: DateTime<Utc>) -> NaiveDate {
    let today = now.date_naive();
    match lookback_days {
        Some(days) if days > 0 => today - Duration::days(i64::from(days)),
        _ => today,
    }
}

/// Storage trait for reading report records
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Fetch all records for a table whose timestamp is at or after the
    /// start date, in stored (oldest-first) order. Unknown tables are empty.
    async fn fetch_since(&self, table: &str, start_date: NaiveDate) -> Result<Vec<ReportRecord>>;
}

/// In-memory store implementation for development/testing
pub struct InMemoryStore {
    tables: Arc<Mutex<HashMap<String, Vec<ReportRecord>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Load a seed file shaped as `{"table-name": [record, ...], ...}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let tables: HashMap<String, Vec<ReportRecord>> = serde_json::from_str(&content)?;
        debug!(tables = tables.len(), path = %path.display(), "seeded store from file");
        Ok(Self {
            tables: Arc::new(Mutex::new(tables)),
        })
    }

    pub fn insert(&self, table: &str, record: ReportRecord) {
        let mut tables = self.tables.lock().unwrap();
        tables.entry(table.to_string()).or_default().push(record);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportStore for InMemoryStore {
    async fn fetch_since(&self, table: &str, start_date: NaiveDate) -> Result<Vec<ReportRecord>> {
        // Timestamps are ISO-like, so the date-prefix comparison is a plain
        // string comparison, same as the backing store's filter expression.
        let start = start_date.format("%Y-%m-%d").to_string();

        let tables = self.tables.lock().unwrap();
        let records: Vec<ReportRecord> = tables
            .get(table)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.time.as_str() >= start.as_str())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!(table, start = %start, count = records.len(), "fetched records");
        Ok(records)
    }
}
