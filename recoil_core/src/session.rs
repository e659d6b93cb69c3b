//! Process-scoped engine state: settings, weapon table, stats, the target and
//! at most one trial. Everything runs on the host's frame tick.

use std::cell::Cell;
use std::rc::Rc;

use recoil_schema::{DayNumber, Millis, TrialSetup};
use tracing::{debug, info, warn};

use crate::audio::{gain, CueHandle};
use crate::error::EngineError;
use crate::geometry::{Point, Rect};
use crate::input::events::InputKind;
use crate::input::InputQueue;
use crate::settings::{sensitivity_scale, GameSettings, KeyValueStore, Settings};
use crate::stats::{percentile, StatsBook};
use crate::target::{wander_bounds, Target, TargetConfig};
use crate::time::day::today;
use crate::time::frame_clock::FrameClock;
use crate::trial::{FrameOutcome, Trial, TrialConfig, TrialResult};
use crate::weapon::{Weapon, WeaponTable};

#[derive(Debug, Clone, Default)]
pub struct SessionFrame {
    /// Redraw needed.
    pub changed: bool,
    pub trial: FrameOutcome,
}

pub struct Session {
    settings: Settings,
    game: GameSettings,
    weapons: WeaponTable,
    stats: StatsBook,
    target: Target,
    trial: Option<Trial>,
    cursor: Point,
    viewport: Rect,
    clock: FrameClock,
    audio: Option<CueHandle>,
    target_dirty: Rc<Cell<bool>>,
    pinned_day: Option<DayNumber>,
}

impl Session {
    pub fn new(
        store: impl KeyValueStore + 'static,
        weapons: WeaponTable,
        viewport: Rect,
    ) -> Result<Self, EngineError> {
        Self::with_target(store, weapons, viewport, Target::new(viewport.center()))
    }

    /// Deterministic target wandering.
    pub fn with_seed(
        store: impl KeyValueStore + 'static,
        weapons: WeaponTable,
        viewport: Rect,
        seed: u64,
    ) -> Result<Self, EngineError> {
        Self::with_target(store, weapons, viewport, Target::with_seed(viewport.center(), seed))
    }

    fn with_target(
        store: impl KeyValueStore + 'static,
        weapons: WeaponTable,
        viewport: Rect,
        target: Target,
    ) -> Result<Self, EngineError> {
        let mut settings = Settings::new(store);
        let game = GameSettings::default();
        game.init(&mut settings)?;
        let stats = StatsBook::load(&settings, game.stats.clone());

        let target_dirty = Rc::new(Cell::new(true));
        for key in game.target_keys() {
            let flag = target_dirty.clone();
            settings.watch(key, move |_| flag.set(true));
        }

        let mut session = Self {
            settings,
            game,
            weapons,
            stats,
            target,
            trial: None,
            cursor: viewport.center(),
            viewport,
            clock: FrameClock::new(),
            audio: None,
            target_dirty,
            pinned_day: None,
        };
        session.refresh_target();
        Ok(session)
    }

    pub fn attach_audio(&mut self, handle: CueHandle) {
        self.audio = Some(handle);
    }

    /// Uses `day` instead of the local calendar for statistics.
    pub fn pin_day(&mut self, day: DayNumber) {
        self.pinned_day = Some(day);
    }

    fn day(&self) -> DayNumber {
        self.pinned_day.unwrap_or_else(today)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn game(&self) -> &GameSettings {
        &self.game
    }

    pub fn weapons(&self) -> &WeaponTable {
        &self.weapons
    }

    pub fn stats(&self) -> &StatsBook {
        &self.stats
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn trial(&self) -> Option<&Trial> {
        self.trial.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.trial.as_ref().is_some_and(Trial::is_running)
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn move_cursor(&mut self, position: Point) {
        self.cursor = position;
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.target_dirty.set(true);
    }

    fn selected_weapon(&self) -> Result<Weapon, EngineError> {
        let name = self.game.weapon.get(&self.settings);
        let active = self.game.active_modifiers(&self.settings);
        self.weapons.select(&name, &active)
    }

    pub fn current_setup(&self) -> Result<TrialSetup, EngineError> {
        Ok(self.trial_config()?.setup())
    }

    fn trial_config(&self) -> Result<TrialConfig, EngineError> {
        let s = &self.settings;
        Ok(TrialConfig {
            weapon: self.selected_weapon()?,
            magazine: self.game.magazine_index(s),
            scale: sensitivity_scale(self.game.sens.get(s)),
            invert_y: self.game.invert_y.get(s),
            fire_speed: self.game.fire_speed_multiplier(s),
            hint: self.game.hint.get(s),
            display: self.game.recoil_display(s),
            trace: self.game.trace_mode(s),
            motion: self.game.motion_mode(s),
        })
    }

    /// Builds and starts a trial. Ignored while one is running. Resolution
    /// errors abort before settings are suspended.
    pub fn press_trigger(&mut self, now: Millis) -> Result<bool, EngineError> {
        if self.is_running() {
            debug!("trigger pressed during a running trial, ignored");
            return Ok(false);
        }
        if self.target_dirty.get() {
            self.refresh_target();
        }
        let mut trial = Trial::new(self.trial_config()?)?;

        self.settings.suspend_updates();
        trial.start(now, self.cursor, &mut self.target);
        if let Some(audio) = &self.audio {
            let volume = self.game.volume.get(&self.settings);
            if let Some(volume) = gain(volume, self.game.mute.get(&self.settings)) {
                audio.play(trial.audio_clip(), volume);
            }
        }
        self.trial = Some(trial);
        Ok(true)
    }

    pub fn release_trigger(&mut self) -> Result<Option<TrialResult>, EngineError> {
        let result = match self.trial.as_mut() {
            Some(trial) => trial.release(&mut self.target),
            None => None,
        };
        match result {
            Some(r) => self.complete(r).map(Some),
            None => Ok(None),
        }
    }

    /// One animation tick at absolute time `now`.
    pub fn frame(&mut self, now: Millis) -> Result<SessionFrame, EngineError> {
        let dt = self.clock.tick(now);
        if self.target_dirty.get() && !self.is_running() {
            self.refresh_target();
        }
        let mut changed = self.target.frame(dt);

        let mut outcome = match self.trial.as_mut() {
            Some(trial) => trial.frame(now, self.cursor, &mut self.target),
            None => FrameOutcome::default(),
        };
        changed |= outcome.changed;
        if let Some(result) = outcome.result.take() {
            outcome.result = Some(self.complete(result)?);
        }
        Ok(SessionFrame {
            changed,
            trial: outcome,
        })
    }

    /// Applies queued host input in arrival order and returns every trial that
    /// finished through a release.
    pub fn drain(&mut self, queue: &InputQueue) -> Result<Vec<TrialResult>, EngineError> {
        let mut finished = Vec::new();
        for event in queue.drain() {
            match event.kind {
                InputKind::CursorMoved(p) => self.move_cursor(p),
                InputKind::TriggerPressed => {
                    if let Err(e) = self.press_trigger(event.timestamp_ms) {
                        warn!(error = %e, "trial not started");
                    }
                }
                InputKind::TriggerReleased => finished.extend(self.release_trigger()?),
            }
        }
        Ok(finished)
    }

    /// Settings notifications are resumed before anything else so a failing
    /// stats write cannot leave them suspended. The target is then
    /// repositioned for the current motion mode.
    fn complete(&mut self, result: TrialResult) -> Result<TrialResult, EngineError> {
        self.settings.resume_updates();
        self.refresh_target();

        if result.recordable {
            let day = self.day();
            self.stats
                .add_stat_on(&mut self.settings, result.percentage, &result.setup, day)?;
        }
        let line = self.summary_line(&result);
        info!(summary = %line, "trial complete");
        self.game.current.set(&mut self.settings, line)?;
        Ok(result)
    }

    /// `score: X best: Y median: Z` for the finished trial's setup.
    fn summary_line(&mut self, result: &TrialResult) -> String {
        let day = self.day();
        match self.stats.stats_for_setup(&result.setup, day) {
            Some(s) => {
                let medians: Vec<f64> = s
                    .today_results
                    .iter()
                    .copied()
                    .chain(s.day_results.iter().map(|d| d.median()))
                    .collect();
                let median = percentile(&medians, 0.5);
                format!(
                    "score: {} best: {} median: {}",
                    result.percentage,
                    s.best_all_time,
                    format_number(median)
                )
            }
            None => format!("score: {} best: - median: -", result.percentage),
        }
    }

    /// Scaled hint path anchored at `anchor`. `None` when the sensitivity
    /// field is not a number or the selection does not resolve.
    pub fn pattern_preview(&self, anchor: Point) -> Option<Vec<Point>> {
        let sens = match self.game.sens.try_get(&self.settings) {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "pattern preview disabled");
                return None;
            }
        };
        let mut config = self.trial_config().ok()?;
        config.scale = sensitivity_scale(sens);
        let size = config.weapon.magazine(config.magazine)?.size;
        Some(
            config
                .scaled_pattern(size)
                .into_iter()
                .map(|p| anchor - p)
                .collect(),
        )
    }

    fn refresh_target(&mut self) {
        self.target_dirty.set(false);
        let s = &self.settings;
        let scaled = match self.trial_config() {
            Ok(c) => {
                let size = c.weapon.magazine(c.magazine).map_or(0, |m| m.size);
                c.scaled_pattern(size)
            }
            Err(e) => {
                warn!(error = %e, "target bounds fall back to an empty pattern");
                Vec::new()
            }
        };
        let config = TargetConfig {
            mode: self.game.motion_mode(s),
            speed: self.game.target_speed_per_ms(s),
            bounds: wander_bounds(&scaled, self.viewport),
        };
        debug!(mode = ?config.mode, speed = config.speed, "target reconfigured");
        self.target.on_settings_updated(config);
    }
}

fn format_number(v: f64) -> String {
    if v.is_nan() {
        "-".to_string()
    } else {
        format!("{}", (v * 10.0).round() / 10.0)
    }
}
