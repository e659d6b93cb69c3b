use std::str::FromStr;

use tracing::warn;

use crate::target::MotionMode;
use crate::weapon::ModifierId;

use super::{BooleanAttribute, NumericAttribute, Settings, StorageError, StringAttribute};

pub const NAMESPACE: &str = "game";

/// How recoil is presented; both modes share the same scoring geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoilDisplay {
    /// The crosshair moves, the world stays put.
    #[default]
    Weapon,
    /// The crosshair is pinned and the world moves against it.
    Target,
}

impl FromStr for RecoilDisplay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weapon" => Ok(Self::Weapon),
            "target" => Ok(Self::Target),
            other => Err(format!("unknown recoil display mode: {other}")),
        }
    }
}

/// What is revealed after a trial finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceMode {
    None,
    #[default]
    Hits,
    Lines,
}

impl FromStr for TraceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "hits" => Ok(Self::Hits),
            "lines" => Ok(Self::Lines),
            other => Err(format!("unknown trace mode: {other}")),
        }
    }
}

/// Handles for every key of the `game` namespace.
#[derive(Debug, Clone)]
pub struct GameSettings {
    pub weapon: StringAttribute,
    pub mag: NumericAttribute,
    pub sens: NumericAttribute,
    pub hint: BooleanAttribute,
    pub target_motion: StringAttribute,
    pub target_speed: NumericAttribute,
    pub fire_speed: NumericAttribute,
    pub invert_y: BooleanAttribute,
    pub recoil_display: StringAttribute,
    pub trace: StringAttribute,
    pub modifiers: StringAttribute,
    pub volume: NumericAttribute,
    pub mute: BooleanAttribute,
    pub stats: StringAttribute,
    pub current: StringAttribute,
}

impl Default for GameSettings {
    fn default() -> Self {
        let s = |k: &str, d: &str| StringAttribute::new(NAMESPACE, k, d.to_string());
        let n = |k: &str, d: f64| NumericAttribute::new(NAMESPACE, k, d);
        let b = |k: &str, d: bool| BooleanAttribute::new(NAMESPACE, k, d);
        Self {
            weapon: s("weapon", "r301"),
            mag: n("mag", 0.0),
            sens: n("sens", 5.0),
            hint: b("hint", true),
            target_motion: s("target-motion", "stationary"),
            target_speed: n("target-speed", 100.0),
            fire_speed: n("speed", 100.0),
            invert_y: b("invert-y", false),
            recoil_display: s("recoil-mode", "weapon"),
            trace: s("trace", "hits"),
            modifiers: s("modifiers", ""),
            volume: n("volume", 50.0),
            mute: b("mute", false),
            stats: s("stats", "[]"),
            current: s("current", ""),
        }
    }
}

impl GameSettings {
    /// Writes the default of every key that was never stored.
    pub fn init(&self, settings: &mut Settings) -> Result<(), StorageError> {
        for a in [
            &self.weapon,
            &self.target_motion,
            &self.recoil_display,
            &self.trace,
            &self.modifiers,
            &self.stats,
            &self.current,
        ] {
            a.init(settings)?;
        }
        for a in [
            &self.mag,
            &self.sens,
            &self.target_speed,
            &self.fire_speed,
            &self.volume,
        ] {
            a.init(settings)?;
        }
        for a in [&self.hint, &self.invert_y, &self.mute] {
            a.init(settings)?;
        }
        Ok(())
    }

    /// Keys whose change requires the target to be reconfigured.
    pub fn target_keys(&self) -> [&str; 6] {
        [
            self.target_motion.key(),
            self.target_speed.key(),
            self.weapon.key(),
            self.mag.key(),
            self.sens.key(),
            self.modifiers.key(),
        ]
    }

    pub fn magazine_index(&self, settings: &Settings) -> usize {
        let v = self.mag.get(settings);
        if v >= 0.0 {
            v as usize
        } else {
            0
        }
    }

    pub fn motion_mode(&self, settings: &Settings) -> MotionMode {
        parse_or_default(&self.target_motion, settings)
    }

    pub fn recoil_display(&self, settings: &Settings) -> RecoilDisplay {
        parse_or_default(&self.recoil_display, settings)
    }

    pub fn trace_mode(&self, settings: &Settings) -> TraceMode {
        parse_or_default(&self.trace, settings)
    }

    pub fn active_modifiers(&self, settings: &Settings) -> Vec<ModifierId> {
        ModifierId::parse_list(&self.modifiers.get(settings))
    }

    /// `configured percent / 100`, clamped to `[0.1, 1]`.
    pub fn fire_speed_multiplier(&self, settings: &Settings) -> f64 {
        (self.fire_speed.get(settings) / 100.0).clamp(0.1, 1.0)
    }

    /// Speed in units per millisecond.
    pub fn target_speed_per_ms(&self, settings: &Settings) -> f64 {
        self.target_speed.get(settings).max(0.0) / 1000.0
    }
}

fn parse_or_default<T>(attr: &StringAttribute, settings: &Settings) -> T
where
    T: FromStr<Err = String> + Default,
{
    let raw = attr.get(settings);
    raw.parse().unwrap_or_else(|e| {
        warn!(key = attr.key(), error = %e, "falling back to default");
        T::default()
    })
}

/// Sensitivity to screen scale, `clamp(1 / sens, 0.1, 10)`.
pub fn sensitivity_scale(sens: f64) -> f64 {
    if sens <= 0.0 {
        return 10.0;
    }
    (1.0 / sens).clamp(0.1, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;

    #[test]
    fn init_writes_all_defaults_once() {
        let mut settings = Settings::new(MemoryStore::from_pairs([("game:sens", "2")]));
        let game = GameSettings::default();
        game.init(&mut settings).unwrap();

        assert_eq!(settings.get("game:weapon").as_deref(), Some("r301"));
        assert_eq!(settings.get("game:sens").as_deref(), Some("2"));
        assert_eq!(settings.get("game:stats").as_deref(), Some("[]"));
        assert_eq!(settings.get("game:hint").as_deref(), Some("true"));
    }

    #[test]
    fn fire_speed_is_clamped() {
        let mut settings = Settings::new(MemoryStore::new());
        let game = GameSettings::default();
        assert_eq!(game.fire_speed_multiplier(&settings), 1.0);

        game.fire_speed.set(&mut settings, 250.0).unwrap();
        assert_eq!(game.fire_speed_multiplier(&settings), 1.0);

        game.fire_speed.set(&mut settings, 2.0).unwrap();
        assert_eq!(game.fire_speed_multiplier(&settings), 0.1);

        game.fire_speed.set(&mut settings, 50.0).unwrap();
        assert_eq!(game.fire_speed_multiplier(&settings), 0.5);
    }

    #[test]
    fn unknown_mode_falls_back() {
        let mut settings = Settings::new(MemoryStore::new());
        let game = GameSettings::default();
        game.target_motion.set(&mut settings, "orbit".to_string()).unwrap();
        assert_eq!(game.motion_mode(&settings), MotionMode::Stationary);

        game.target_motion.set(&mut settings, "moving".to_string()).unwrap();
        assert_eq!(game.motion_mode(&settings), MotionMode::FreelyMoving);

        game.trace.set(&mut settings, "lines".to_string()).unwrap();
        assert_eq!(game.trace_mode(&settings), TraceMode::Lines);
    }

    #[test]
    fn scale_is_clamped() {
        assert_eq!(sensitivity_scale(1.0), 1.0);
        assert_eq!(sensitivity_scale(5.0), 0.2);
        assert_eq!(sensitivity_scale(0.01), 10.0);
        assert_eq!(sensitivity_scale(100.0), 0.1);
        assert_eq!(sensitivity_scale(0.0), 10.0);
    }
}
