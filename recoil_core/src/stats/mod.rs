//! Per-setup practice statistics: all-time best, one rolled-up entry per
//! practice day and the raw scores of the day still in progress.

pub mod migrate;

use recoil_schema::{DayNumber, DayResult, TrialSetup, TrialStats};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::settings::{Settings, StorageError, StringAttribute};
use crate::time::day::today;

/// Linear-interpolation percentile over a sorted copy of `values`.
/// `NaN` for empty input or negative `p`; `p` above 1 is treated as 1.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() || p < 0.0 {
        return f64::NAN;
    }
    let p = p.min(1.0);
    let mut xs = values.to_vec();
    xs.sort_by(f64::total_cmp);

    let i = (xs.len() - 1) as f64 * p;
    let lo = i.floor() as usize;
    let f = i - lo as f64;
    if f == 0.0 {
        return xs[lo];
    }
    let hi = (lo + 1).min(xs.len() - 1);
    (1.0 - f) * xs[lo] + f * xs[hi]
}

/// Rolls a stale day into `day_results`. Returns whether anything changed.
pub fn touch(stats: &mut TrialStats, today: DayNumber) -> bool {
    if stats.today == today {
        return false;
    }
    if !stats.today_results.is_empty() {
        stats.day_results.push(DayResult(
            stats.today,
            stats.today_results.len(),
            percentile(&stats.today_results, 0.5),
            percentile(&stats.today_results, 1.0),
        ));
    }
    stats.today_results.clear();
    stats.today = today;
    true
}

/// Numbers handed to the display collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSummary {
    pub best_all_time: f64,
    pub today_count: usize,
    pub today_median: f64,
    pub today_best: f64,
    pub days: usize,
}

impl StatsSummary {
    pub fn of(stats: &TrialStats) -> Self {
        Self {
            best_all_time: stats.best_all_time,
            today_count: stats.today_results.len(),
            today_median: percentile(&stats.today_results, 0.5),
            today_best: percentile(&stats.today_results, 1.0),
            days: stats.day_results.len(),
        }
    }
}

/// The whole stats collection, persisted as one JSON array under `game:stats`.
#[derive(Debug, Clone)]
pub struct StatsBook {
    attr: StringAttribute,
    records: Vec<TrialStats>,
}

impl StatsBook {
    pub fn empty(attr: StringAttribute) -> Self {
        Self {
            attr,
            records: Vec::new(),
        }
    }

    pub fn load(settings: &Settings, attr: StringAttribute) -> Self {
        Self::load_on(settings, attr, today())
    }

    /// Parses, migrates and touches every stored record. Never fails: records
    /// that cannot be migrated are skipped.
    pub fn load_on(settings: &Settings, attr: StringAttribute, day: DayNumber) -> Self {
        let raw = attr.get(settings);
        let mut book = Self::empty(attr);
        book.records = parse_records(&raw);
        book.touch_all(day);
        debug!(records = book.records.len(), "stats loaded");
        book
    }

    pub fn records(&self) -> &[TrialStats] {
        &self.records
    }

    pub fn touch_all(&mut self, day: DayNumber) {
        for s in self.records.iter_mut() {
            touch(s, day);
        }
    }

    /// Record for `setup`, rolled over to `day` first.
    pub fn stats_for_setup(&mut self, setup: &TrialSetup, day: DayNumber) -> Option<&TrialStats> {
        let i = self.position(setup)?;
        touch(&mut self.records[i], day);
        Some(&self.records[i])
    }

    pub fn add_stat(
        &mut self,
        settings: &mut Settings,
        score: f64,
        setup: &TrialSetup,
    ) -> Result<&TrialStats, EngineError> {
        self.add_stat_on(settings, score, setup, today())
    }

    pub fn add_stat_on(
        &mut self,
        settings: &mut Settings,
        score: f64,
        setup: &TrialSetup,
        day: DayNumber,
    ) -> Result<&TrialStats, EngineError> {
        let i = match self.position(setup) {
            Some(i) => i,
            None => {
                self.records.push(TrialStats::new(setup.clone(), day));
                self.records.len() - 1
            }
        };
        let s = &mut self.records[i];
        touch(s, day);
        s.today_results.push(score);
        s.best_all_time = s.best_all_time.max(score);

        self.persist(settings)?;
        Ok(&self.records[i])
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(&self.records)?)
    }

    fn persist(&self, settings: &mut Settings) -> Result<(), StorageError> {
        let json = self.to_json()?;
        settings.set(self.attr.key(), &json)
    }

    fn position(&self, setup: &TrialSetup) -> Option<usize> {
        self.records.iter().position(|s| &s.setup == setup)
    }
}

fn parse_records(raw: &str) -> Vec<TrialStats> {
    let values = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => values,
        Ok(_) => {
            warn!("stored stats are not an array, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "stored stats are not valid json, starting empty");
            return Vec::new();
        }
    };
    values.into_iter().filter_map(migrate::migrate_record).collect()
}
