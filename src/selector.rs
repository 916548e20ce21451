use crate::metrics;
use crate::types::ReportRecord;
use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::warn;

/// How Policy A treats multiple candidate records on the same calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupMode {
    /// One record per calendar day; the first candidate claims the day.
    Strict,
    /// Keep every record that matches the window rules.
    Loose,
}

/// What Policy B returns when today has no afternoon reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotFallback {
    /// Fall back to the most recent record available (input is oldest-first).
    LatestRecord,
    /// Return nothing.
    Empty,
}

/// Selection tuning. The defaults are the production behavior: strict
/// per-day dedup, latest-record fallback, and the 14:00–16:00 UTC
/// afternoon window treated as the canonical daily snapshot time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub dedup: DedupMode,
    pub fallback: SnapshotFallback,
    pub afternoon_start: u32,
    pub afternoon_end: u32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            dedup: DedupMode::Strict,
            fallback: SnapshotFallback::LatestRecord,
            afternoon_start: crate::constants::AFTERNOON_START_HOUR,
            afternoon_end: crate::constants::AFTERNOON_END_HOUR,
        }
    }
}

/// Two-stage temporal record selector.
///
/// Given the records fetched for a page, picks the representative reading(s)
/// to return: a per-day history when a lookback window was requested, or a
/// single current snapshot otherwise. The reference time is passed in by the
/// caller so results are reproducible in tests.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    config: SelectorConfig,
}

impl Selector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Select the representative records for the request.
    ///
    /// A lookback of zero is a current-snapshot request, exactly like an
    /// absent lookback — the value, not its presence, picks the policy.
    /// Records whose timestamp cannot be split into day and hour are skipped
    /// with a warning rather than misparsed or fatal.
    pub fn select(
        &self,
        records: &[ReportRecord],
        lookback_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Vec<ReportRecord> {
        match lookback_days {
            Some(days) if days > 0 => self.select_window(records, now),
            _ => self.select_snapshot(records, now),
        }
    }

    /// Policy A: one representative reading per covered day, newest first.
    fn select_window(&self, records: &[ReportRecord], now: DateTime<Utc>) -> Vec<ReportRecord> {
        let today = now.date_naive();
        let current_hour = now.hour();

        let mut claimed_days: HashSet<NaiveDate> = HashSet::new();
        let mut picked: Vec<ReportRecord> = Vec::new();

        for record in records {
            let Some((day, hour)) = record.day_and_hour() else {
                self.skip_malformed(record);
                continue;
            };
            if self.config.dedup == DedupMode::Strict && claimed_days.contains(&day) {
                continue;
            }

            // Today's reading stands in until the afternoon window opens;
            // for any day, the 14:00–16:00 reading is the canonical one.
            let provisional_today = current_hour < self.config.afternoon_start && day == today;
            let canonical_afternoon =
                hour >= self.config.afternoon_start && hour < self.config.afternoon_end;

            if provisional_today || canonical_afternoon {
                claimed_days.insert(day);
                picked.push(record.clone());
            }
        }

        picked.sort_by(|a, b| a.time.cmp(&b.time));
        picked.reverse();
        picked
    }

    /// Policy B: the single latest afternoon reading for today, falling back
    /// to the most recent record available.
    fn select_snapshot(&self, records: &[ReportRecord], now: DateTime<Utc>) -> Vec<ReportRecord> {
        let today = now.date_naive();

        let latest_afternoon = records.iter().rev().find(|record| {
            match record.day_and_hour() {
                Some((day, hour)) => {
                    day == today
                        && hour >= self.config.afternoon_start
                        && hour < self.config.afternoon_end
                }
                None => {
                    self.skip_malformed(record);
                    false
                }
            }
        });

        if let Some(record) = latest_afternoon {
            return vec![record.clone()];
        }

        match self.config.fallback {
            SnapshotFallback::LatestRecord => records.last().cloned().into_iter().collect(),
            SnapshotFallback::Empty => Vec::new(),
        }
    }

    fn skip_malformed(&self, record: &ReportRecord) {
        warn!(time = %record.time, "skipping record with malformed timestamp");
        metrics::select::malformed_skipped();
    }
}
