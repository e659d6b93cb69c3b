use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Local calendar date packed as `YYYYMMDD`, e.g. 2021-04-30 is `20210430`.
pub type DayNumber = u32;

/// Milliseconds since trial start.
pub type Millis = f64;

pub const STATS_SCHEMA_VERSION: u32 = 3;

/// One weapon of the bundled data table.
///
/// The pattern is stored as two parallel coordinate arrays next to `time_points`,
/// one entry per shot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeaponRecord {
    pub name: String,
    pub mags: Vec<MagazineRecord>,
    pub time_points: Vec<Millis>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default)]
    pub modifiers: BTreeMap<String, ModifierRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MagazineRecord {
    pub size: usize,
    pub audio: String,
}

/// Partial override of a weapon, applied while the named modifier is active.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModifierRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mags: Option<Vec<MagazineRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_points: Option<Vec<Millis>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<f64>>,
}

/// Statistics bucket key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TrialSetup {
    pub weapon: String,
    pub mag: usize,
    pub hint: bool,
    pub moving: bool,
}

/// `[day, count, median, best]` on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DayResult(pub DayNumber, pub usize, pub f64, pub f64);

impl DayResult {
    pub fn day(&self) -> DayNumber {
        self.0
    }

    pub fn count(&self) -> usize {
        self.1
    }

    pub fn median(&self) -> f64 {
        self.2
    }

    pub fn best(&self) -> f64 {
        self.3
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrialStats {
    #[serde(rename = "v")]
    pub version: u32,
    pub setup: TrialSetup,
    pub day_results: Vec<DayResult>,
    pub best_all_time: f64,
    pub today: DayNumber,
    pub today_results: Vec<f64>,
}

impl TrialStats {
    pub fn new(setup: TrialSetup, today: DayNumber) -> Self {
        Self {
            version: STATS_SCHEMA_VERSION,
            setup,
            day_results: Vec::new(),
            best_all_time: 0.0,
            today,
            today_results: Vec::new(),
        }
    }
}
