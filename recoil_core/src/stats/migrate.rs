//! Forward migration of persisted stats records.
//!
//! Each step lifts a raw JSON record by exactly one schema version, or drops it
//! by returning `None`. Steps run in order until the record reaches
//! [`STATS_SCHEMA_VERSION`], then the result is validated by deserializing it.

use recoil_schema::{TrialStats, STATS_SCHEMA_VERSION};
use serde_json::{json, Map, Value};
use tracing::warn;

/// Day bucket assigned to results stored before days were tracked per record.
const UNVERSIONED_TODAY: u64 = 20210423;

pub struct Migration {
    pub from: u32,
    pub name: &'static str,
    pub step: fn(Value) -> Option<Value>,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        from: 0,
        name: "versioned record layout",
        step: from_unversioned,
    },
    Migration {
        from: 1,
        name: "drop path-only setups",
        step: drop_path_only,
    },
    Migration {
        from: 2,
        name: "typed setup fields",
        step: typed_setup,
    },
];

/// Brings one raw record to the current schema. `None` means the record is
/// skipped; the reason is logged.
pub fn migrate_record(mut record: Value) -> Option<TrialStats> {
    if !record.get("setup").is_some_and(Value::is_object) {
        warn!("skipping stats record without setup");
        return None;
    }
    let mut version = match record.get("v") {
        None | Some(Value::Null) => 0,
        Some(v) => u32::try_from(v.as_u64()?).ok()?,
    };
    if version > STATS_SCHEMA_VERSION {
        warn!(version, "skipping stats record from a newer schema");
        return None;
    }

    while version < STATS_SCHEMA_VERSION {
        let m = MIGRATIONS.iter().find(|m| m.from == version)?;
        record = match (m.step)(record) {
            Some(r) => r,
            None => {
                warn!(from = version, step = m.name, "stats record dropped by migration");
                return None;
            }
        };
        version += 1;
        record["v"] = json!(version);
    }

    let mut stats: TrialStats = match serde_json::from_value(record) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "skipping malformed stats record");
            return None;
        }
    };
    restore_best(&mut stats);
    Some(stats)
}

/// `bestAllTime` never drops below any best that was ever recorded.
fn restore_best(stats: &mut TrialStats) {
    let best = stats
        .day_results
        .iter()
        .map(|d| d.best())
        .chain(stats.today_results.iter().copied())
        .filter(|v| v.is_finite())
        .fold(stats.best_all_time, f64::max);
    stats.best_all_time = best;
}

fn setup_mut(record: &mut Value) -> Option<&mut Map<String, Value>> {
    record.get_mut("setup")?.as_object_mut()
}

fn is_unset_attachment(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s == "0",
        Some(Value::Number(n)) => n.as_u64() == Some(0),
        _ => false,
    }
}

/// Unversioned records kept parallel `days`/`medianByDay`/`bestByDay` arrays
/// with zero-based month and day, and allowed barrel/stock attachments.
pub fn from_unversioned(record: Value) -> Option<Value> {
    let s = record.get("setup")?.as_object()?;
    if !is_unset_attachment(s.get("barrel")) || !is_unset_attachment(s.get("stock")) {
        return None;
    }

    let mut setup = Map::new();
    setup.insert("weapon".into(), s.get("weapon").cloned().unwrap_or(json!("")));
    setup.insert("mag".into(), s.get("mag").cloned().unwrap_or(json!("0")));
    setup.insert("hint".into(), s.get("hint").cloned().unwrap_or(json!("true")));
    if let Some(p) = s.get("pacer") {
        setup.insert("pacer".into(), p.clone());
    }

    let days = record.get("days")?.as_array()?;
    let medians = record.get("medianByDay")?.as_array()?;
    let bests = record.get("bestByDay")?.as_array()?;
    let mut day_results = Vec::with_capacity(days.len());
    for (i, d) in days.iter().enumerate() {
        let d = d.as_u64()?;
        let day = (d / 100 + 1) * 100 + d % 100 + 1;
        day_results.push(json!([day, 0, medians.get(i)?, bests.get(i)?]));
    }

    Some(json!({
        "v": 1,
        "setup": setup,
        "today": UNVERSIONED_TODAY,
        "dayResults": day_results,
        "todayResults": record.get("todayResults").cloned().unwrap_or(json!([])),
        "bestAllTime": record.get("bestAllTime").cloned().unwrap_or(json!(0)),
    }))
}

/// Setups that only showed the path without the pacer were retired.
pub fn drop_path_only(mut record: Value) -> Option<Value> {
    let s = setup_mut(&mut record)?;
    if s.get("hint") == Some(&json!("true")) && s.get("pacer") == Some(&json!("false")) {
        return None;
    }
    s.remove("pacer");
    Some(record)
}

/// String-typed `hint`/`mag` become bool/number and `moving` is introduced.
pub fn typed_setup(mut record: Value) -> Option<Value> {
    let s = setup_mut(&mut record)?;
    let hint = match s.get("hint") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(h)) => h == "true",
        _ => false,
    };
    let mag = match s.get("mag") {
        Some(Value::Number(n)) => n.as_u64()?,
        Some(Value::String(m)) => m.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    s.insert("hint".into(), json!(hint));
    s.insert("mag".into(), json!(mag));
    s.insert("moving".into(), json!(false));
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use recoil_schema::{DayResult, TrialSetup};

    fn unversioned() -> Value {
        json!({
            "setup": { "weapon": "r301", "mag": "1", "hint": "true", "barrel": "0", "stock": "0", "pacer": "true" },
            "days": [20210322],
            "medianByDay": [40.0],
            "bestByDay": [62.0],
            "todayResults": [50.0],
            "bestAllTime": 61.0
        })
    }

    #[test]
    fn steps_cover_every_version() {
        for v in 0..STATS_SCHEMA_VERSION {
            assert!(MIGRATIONS.iter().any(|m| m.from == v), "missing step from {v}");
        }
    }

    #[test]
    fn unversioned_converts_day_numbers() {
        let v1 = from_unversioned(unversioned()).unwrap();
        assert_eq!(v1["v"], 1);
        assert_eq!(v1["dayResults"][0], json!([20210423, 0, 40.0, 62.0]));
        assert_eq!(v1["today"], 20210423);
        assert_eq!(v1["setup"]["pacer"], "true");
    }

    #[test]
    fn attachments_are_dropped() {
        let mut r = unversioned();
        r["setup"]["barrel"] = json!("2");
        assert!(from_unversioned(r).is_none());
    }

    #[test]
    fn path_only_setup_is_dropped() {
        let r = json!({ "v": 1, "setup": { "hint": "true", "pacer": "false" } });
        assert!(drop_path_only(r).is_none());

        let r = json!({ "v": 1, "setup": { "hint": "false", "pacer": "false" } });
        let out = drop_path_only(r).unwrap();
        assert!(out["setup"].get("pacer").is_none());
    }

    #[test]
    fn typed_setup_converts_strings() {
        let r = json!({ "v": 2, "setup": { "weapon": "r99", "hint": "false", "mag": "2" } });
        let out = typed_setup(r).unwrap();
        assert_eq!(out["setup"], json!({ "weapon": "r99", "hint": false, "mag": 2, "moving": false }));
    }

    #[test]
    fn full_chain_reaches_current_version() {
        let stats = migrate_record(unversioned()).unwrap();
        assert_eq!(stats.version, STATS_SCHEMA_VERSION);
        assert_eq!(
            stats.setup,
            TrialSetup { weapon: "r301".into(), mag: 1, hint: true, moving: false }
        );
        assert_eq!(stats.day_results, vec![DayResult(20210423, 0, 40.0, 62.0)]);
        assert_eq!(stats.best_all_time, 62.0);
    }

    #[test]
    fn current_records_are_unchanged() {
        let stats = migrate_record(unversioned()).unwrap();
        let again = migrate_record(serde_json::to_value(&stats).unwrap()).unwrap();
        assert_eq!(stats, again);
    }

    #[test]
    fn out_of_range_version_is_skipped() {
        let stats = migrate_record(unversioned()).unwrap();
        let mut value = serde_json::to_value(&stats).unwrap();
        value["v"] = json!(u64::from(u32::MAX) + u64::from(STATS_SCHEMA_VERSION) + 1);
        assert!(migrate_record(value).is_none());
    }

    #[test]
    fn malformed_records_are_skipped() {
        assert!(migrate_record(json!({ "v": 3 })).is_none());
        assert!(migrate_record(json!({ "v": 3, "setup": { "weapon": "x" } })).is_none());
        assert!(migrate_record(json!({ "v": 9, "setup": {} })).is_none());
        assert!(migrate_record(json!({ "v": "three", "setup": {} })).is_none());
        assert!(migrate_record(json!({ "setup": { "weapon": "r301" }, "days": [1], "medianByDay": [], "bestByDay": [] })).is_none());
    }
}
