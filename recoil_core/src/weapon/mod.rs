mod error;

pub use error::{DataError, DataErrorKind};

use std::collections::BTreeMap;

use recoil_schema::{MagazineRecord, Millis, ModifierRecord, WeaponRecord};
use tracing::info;

use crate::error::EngineError;
use crate::geometry::{points_from_xy, record_pattern, Point};

const BUNDLED_WEAPONS: &str = include_str!("../../data/weapons.json");

/// Every combination of a weapon's modifiers is validated at load, so the
/// count per weapon is capped.
pub const MAX_MODIFIERS: usize = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct Magazine {
    pub size: usize,
    pub audio_clip: String,
}

impl From<&MagazineRecord> for Magazine {
    fn from(m: &MagazineRecord) -> Self {
        Self {
            size: m.size,
            audio_clip: m.audio.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModifierId(pub String);

impl ModifierId {
    /// Parses the comma separated `modifiers` setting.
    pub fn parse_list(s: &str) -> Vec<ModifierId> {
        s.split(',')
            .map(str::trim)
            .filter(|x| !x.is_empty())
            .map(|x| ModifierId(x.to_string()))
            .collect()
    }
}

/// The fields a modifier may replace. Anything left `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaponFields {
    pub mags: Option<Vec<Magazine>>,
    pub time_points: Option<Vec<Millis>>,
    pub pattern: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponOverride {
    pub applies_when: ModifierId,
    pub fields: WeaponFields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub name: String,
    pub mags: Vec<Magazine>,
    /// Cumulative milliseconds at which shot `i` reaches `pattern[i]`.
    pub time_points: Vec<Millis>,
    /// Raw, sensitivity independent recoil offset per shot.
    pub pattern: Vec<Point>,
    pub overrides: Vec<WeaponOverride>,
}

impl Weapon {
    pub fn magazine(&self, index: usize) -> Option<&Magazine> {
        self.mags.get(index)
    }

    /// Copy of this weapon with every active override merged in, in table order.
    /// The returned weapon carries no overrides of its own.
    pub fn with_modifiers(&self, active: &[ModifierId]) -> Weapon {
        let mut w = Weapon {
            overrides: Vec::new(),
            ..self.clone()
        };
        for o in self.overrides.iter().filter(|o| active.contains(&o.applies_when)) {
            w.apply(&o.fields);
        }
        w
    }

    fn apply(&mut self, fields: &WeaponFields) {
        if let Some(mags) = &fields.mags {
            self.mags = mags.clone();
        }
        if let Some(t) = &fields.time_points {
            self.time_points = t.clone();
        }
        if let Some(p) = &fields.pattern {
            self.pattern = p.clone();
        }
    }

    pub fn validate(&self) -> Result<(), DataError> {
        let err = |code, msg: &str| DataError::new(code, msg).with_weapon(&self.name);

        if self.name.trim().is_empty() {
            return Err(DataError::new("W2001", "weapon name must be non-empty"));
        }
        if self.pattern.is_empty() {
            return Err(err("W2002", "pattern must have at least one shot"));
        }
        if self.pattern.len() != self.time_points.len() {
            return Err(err(
                "W2003",
                &format!(
                    "pattern has {} shots but {} time points",
                    self.pattern.len(),
                    self.time_points.len()
                ),
            ));
        }
        if let Some(i) = self.pattern.iter().position(|p| !p.is_finite()) {
            return Err(err("W2004", "pattern offsets must be finite").with_index(i));
        }

        let mut prev = 0.0;
        for (i, &t) in self.time_points.iter().enumerate() {
            if !t.is_finite() || t < 0.0 {
                return Err(err("W3002", "time points must be finite and >= 0").with_index(i));
            }
            if t < prev {
                return Err(err("W3001", "time points must not decrease").with_index(i));
            }
            prev = t;
        }

        if self.mags.is_empty() {
            return Err(err("W4001", "at least one magazine is required"));
        }
        for (i, m) in self.mags.iter().enumerate() {
            if m.size == 0 {
                return Err(err("W4002", "magazine size must be > 0").with_index(i));
            }
            if m.size > self.pattern.len() {
                return Err(err(
                    "W4003",
                    &format!(
                        "magazine size {} exceeds pattern length {}",
                        m.size,
                        self.pattern.len()
                    ),
                )
                .with_index(i));
            }
        }
        Ok(())
    }
}

impl TryFrom<&WeaponRecord> for Weapon {
    type Error = DataError;

    fn try_from(r: &WeaponRecord) -> Result<Self, Self::Error> {
        if r.x.len() != r.y.len() {
            return Err(DataError::new("W2003", "x and y must have the same length")
                .with_weapon(&r.name));
        }
        let overrides = r
            .modifiers
            .iter()
            .map(|(id, m)| {
                override_from_record(m)
                    .map_err(|e| e.with_weapon(&r.name).with_modifier(id))
                    .map(|fields| WeaponOverride {
                        applies_when: ModifierId(id.clone()),
                        fields,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Weapon {
            name: r.name.clone(),
            mags: r.mags.iter().map(Magazine::from).collect(),
            time_points: r.time_points.clone(),
            pattern: record_pattern(r),
            overrides,
        })
    }
}

fn override_from_record(m: &ModifierRecord) -> Result<WeaponFields, DataError> {
    let pattern = match (&m.x, &m.y) {
        (None, None) => None,
        (Some(x), Some(y)) if x.len() == y.len() => Some(points_from_xy(x, y)),
        (Some(_), Some(_)) => {
            return Err(DataError::new("W5002", "modifier x and y must have the same length"))
        }
        _ => return Err(DataError::new("W5001", "modifier must override x and y together")),
    };
    Ok(WeaponFields {
        mags: m.mags.as_ref().map(|v| v.iter().map(Magazine::from).collect()),
        time_points: m.time_points.clone(),
        pattern,
    })
}

/// Validates the merge of every non-empty subset of `w`'s modifiers.
fn validate_combinations(w: &Weapon) -> Result<(), DataError> {
    let ids: Vec<ModifierId> = w.overrides.iter().map(|o| o.applies_when.clone()).collect();
    if ids.len() > MAX_MODIFIERS {
        return Err(DataError::new(
            "W5003",
            format!("{} modifiers exceed the limit of {MAX_MODIFIERS}", ids.len()),
        )
        .with_weapon(&w.name));
    }
    for mask in 1u32..(1 << ids.len()) {
        let active: Vec<ModifierId> = ids
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, id)| id.clone())
            .collect();
        w.with_modifiers(&active).validate().map_err(|e| {
            let names: Vec<&str> = active.iter().map(|id| id.0.as_str()).collect();
            e.with_modifier(names.join(","))
        })?;
    }
    Ok(())
}

/// Read-only weapon data, keyed by name. Every weapon and every modifier
/// combination has been validated on construction.
#[derive(Debug, Clone, Default)]
pub struct WeaponTable {
    weapons: BTreeMap<String, Weapon>,
}

impl WeaponTable {
    /// The table bundled with the crate.
    pub fn bundled() -> Result<Self, DataError> {
        Self::from_json_str(BUNDLED_WEAPONS)
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        let records: Vec<WeaponRecord> = serde_json::from_str(json)
            .map_err(|e| DataError::new("W1001", format!("invalid weapon table json: {e}")))?;
        Self::from_records(&records)
    }

    pub fn from_records(records: &[WeaponRecord]) -> Result<Self, DataError> {
        let mut weapons = BTreeMap::new();
        for r in records {
            let w = Weapon::try_from(r)?;
            w.validate()?;
            validate_combinations(&w)?;

            if weapons.contains_key(&w.name) {
                return Err(DataError::new("W2005", "duplicate weapon name").with_weapon(&w.name));
            }
            weapons.insert(w.name.clone(), w);
        }
        info!(weapons = weapons.len(), "weapon table loaded");
        Ok(Self { weapons })
    }

    pub fn get(&self, name: &str) -> Option<&Weapon> {
        self.weapons.get(name)
    }

    /// Resolves `name` with the active modifiers applied to a private copy.
    pub fn select(&self, name: &str, active: &[ModifierId]) -> Result<Weapon, EngineError> {
        self.get(name)
            .map(|w| w.with_modifiers(active))
            .ok_or_else(|| EngineError::WeaponNotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Weapon> {
        self.weapons.values()
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }
}

/// Parses the bundled data table once.
pub fn load_weapons() -> Result<WeaponTable, DataError> {
    WeaponTable::bundled()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> WeaponRecord {
        serde_json::from_value(serde_json::json!({
            "name": "test",
            "mags": [{ "size": 2, "audio": "a0" }, { "size": 3, "audio": "a1" }],
            "time_points": [0.0, 100.0, 200.0],
            "x": [0.0, 2.0, 4.0],
            "y": [0.0, 0.0, 0.0],
            "modifiers": {
                "fast": { "time_points": [0.0, 50.0, 100.0] }
            }
        }))
        .unwrap()
    }

    #[test]
    fn bundled_table_is_consistent() {
        let table = load_weapons().unwrap();
        assert!(!table.is_empty());
        for w in table.iter() {
            assert_eq!(w.pattern.len(), w.time_points.len(), "{}", w.name);
            assert!(w.time_points.windows(2).all(|t| t[0] <= t[1]), "{}", w.name);
        }
    }

    #[test]
    fn modifiers_do_not_touch_the_table() {
        let table = WeaponTable::from_records(&[record()]).unwrap();
        let fast = table.select("test", &[ModifierId("fast".into())]).unwrap();
        assert_eq!(fast.time_points, vec![0.0, 50.0, 100.0]);
        assert!(fast.overrides.is_empty());

        let base = table.get("test").unwrap();
        assert_eq!(base.time_points, vec![0.0, 100.0, 200.0]);
    }

    #[test]
    fn unknown_weapon_is_not_found() {
        let table = WeaponTable::from_records(&[record()]).unwrap();
        let err = table.select("nope", &[]).unwrap_err();
        assert!(matches!(err, EngineError::WeaponNotFound(n) if n == "nope"));
    }

    #[test]
    fn magazine_larger_than_pattern_is_rejected() {
        let mut r = record();
        r.mags[1].size = 4;
        let err = WeaponTable::from_records(&[r]).unwrap_err();
        assert_eq!(err.code, "W4003");
        assert_eq!(err.kind, DataErrorKind::Magazine);
        assert_eq!(err.index, Some(1));
    }

    #[test]
    fn zero_magazine_is_rejected() {
        let mut r = record();
        r.mags[0].size = 0;
        assert_eq!(WeaponTable::from_records(&[r]).unwrap_err().code, "W4002");
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut r = record();
        r.time_points.pop();
        assert_eq!(WeaponTable::from_records(&[r]).unwrap_err().code, "W2003");
    }

    #[test]
    fn decreasing_time_points_are_rejected() {
        let mut r = record();
        r.time_points = vec![0.0, 100.0, 90.0];
        let err = WeaponTable::from_records(&[r]).unwrap_err();
        assert_eq!(err.code, "W3001");
        assert_eq!(err.index, Some(2));
    }

    #[test]
    fn equal_consecutive_time_points_are_allowed() {
        let mut r = record();
        r.time_points = vec![0.0, 100.0, 100.0];
        assert!(WeaponTable::from_records(&[r]).is_ok());
    }

    #[test]
    fn broken_modifier_is_rejected_at_load() {
        let mut r = record();
        r.modifiers.get_mut("fast").unwrap().time_points = Some(vec![0.0]);
        let err = WeaponTable::from_records(&[r]).unwrap_err();
        assert_eq!(err.code, "W2003");
        assert_eq!(err.modifier.as_deref(), Some("fast"));
    }

    #[test]
    fn broken_modifier_pair_is_rejected_at_load() {
        let r: WeaponRecord = serde_json::from_value(serde_json::json!({
            "name": "pair",
            "mags": [{ "size": 3, "audio": "a0" }],
            "time_points": [0.0, 100.0, 200.0],
            "x": [0.0, 1.0, 2.0],
            "y": [0.0, 0.0, 0.0],
            "modifiers": {
                "a": {
                    "mags": [{ "size": 5, "audio": "a5" }],
                    "time_points": [0.0, 1.0, 2.0, 3.0, 4.0],
                    "x": [0.0, 1.0, 2.0, 3.0, 4.0],
                    "y": [0.0, 0.0, 0.0, 0.0, 0.0]
                },
                "b": {
                    "time_points": [0.0, 50.0, 100.0],
                    "x": [0.0, 1.0, 2.0],
                    "y": [0.0, 1.0, 2.0]
                },
                "c": {
                    "mags": [{ "size": 5, "audio": "a5" }],
                    "time_points": [0.0, 1.0, 2.0, 3.0, 4.0],
                    "x": [0.0, 1.0, 2.0, 3.0, 4.0],
                    "y": [0.0, 0.0, 0.0, 0.0, 0.0]
                }
            }
        }))
        .unwrap();
        let err = WeaponTable::from_records(&[r]).unwrap_err();
        assert_eq!(err.code, "W4003");
        assert_eq!(err.modifier.as_deref(), Some("a,b"));
    }

    #[test]
    fn too_many_modifiers_are_rejected() {
        let mut r = record();
        let fast = r.modifiers["fast"].clone();
        for i in 0..MAX_MODIFIERS {
            r.modifiers.insert(format!("m{i}"), fast.clone());
        }
        let err = WeaponTable::from_records(&[r]).unwrap_err();
        assert_eq!(err.code, "W5003");
        assert_eq!(err.kind, DataErrorKind::Modifier);
    }

    #[test]
    fn modifier_pattern_needs_both_axes() {
        let mut r = record();
        r.modifiers.get_mut("fast").unwrap().x = Some(vec![0.0, 1.0, 2.0]);
        assert_eq!(WeaponTable::from_records(&[r]).unwrap_err().code, "W5001");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = WeaponTable::from_records(&[record(), record()]).unwrap_err();
        assert_eq!(err.code, "W2005");
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = WeaponTable::from_json_str("{").unwrap_err();
        assert_eq!(err.kind, DataErrorKind::Parse);
    }

    #[test]
    fn parse_modifier_list() {
        assert_eq!(
            ModifierId::parse_list(" fast, ,boosted"),
            vec![ModifierId("fast".into()), ModifierId("boosted".into())]
        );
        assert!(ModifierId::parse_list("").is_empty());
    }
}
