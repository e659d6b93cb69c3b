//! One trial: a single trigger hold through (part of) a magazine.
//!
//! A trial is built per trigger press and runs `Idle -> Running -> Finished`.
//! The host drives it with absolute timestamps; every shot whose time point
//! has been reached is scored against the target position at that frame.

pub mod recoil;

use recoil_schema::{Millis, TrialSetup};
use tracing::{debug, info};

use crate::error::EngineError;
use crate::geometry::Point;
use crate::score::{distance_score, to_percentage};
use crate::settings::{RecoilDisplay, TraceMode};
use crate::target::{MotionMode, Target};
use crate::weapon::Weapon;

/// How far ahead of the scored recoil the visual groups are drawn, in
/// fire-speed-scaled milliseconds (1.25 frames at 60 Hz).
pub const LOOKAHEAD_MS: Millis = 1.25 * 16.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Idle,
    Running,
    Finished,
}

/// Everything a trial needs, resolved from settings before it is built.
#[derive(Debug, Clone)]
pub struct TrialConfig {
    /// Weapon with the active modifiers already merged in.
    pub weapon: Weapon,
    pub magazine: usize,
    pub scale: f64,
    pub invert_y: bool,
    /// Elapsed-time multiplier in `[0.1, 1]`.
    pub fire_speed: f64,
    pub hint: bool,
    pub display: RecoilDisplay,
    pub trace: TraceMode,
    pub motion: MotionMode,
}

impl TrialConfig {
    pub fn setup(&self) -> TrialSetup {
        TrialSetup {
            weapon: self.weapon.name.clone(),
            mag: self.magazine,
            hint: self.hint,
            moving: self.motion == MotionMode::FreelyMoving,
        }
    }

    /// Raw pattern scaled to screen units, optionally mirrored vertically.
    pub fn scaled_pattern(&self, shots: usize) -> Vec<Point> {
        let flip = if self.invert_y { -1.0 } else { 1.0 };
        self.weapon
            .pattern
            .iter()
            .take(shots)
            .map(|p| *p * Point::new(self.scale, self.scale * flip))
            .collect()
    }
}

/// Render offsets of the recoil-affected groups, relative to their rest
/// positions. Pure presentation state, zero outside a trial.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisualGroups {
    pub crosshair: Point,
    pub hint: Point,
    pub wall: Point,
    pub target: Point,
    /// The OS cursor is replaced by a fixed crosshair.
    pub cursor_hidden: bool,
}

impl VisualGroups {
    fn for_display(display: RecoilDisplay, compensated: Point) -> Self {
        match display {
            RecoilDisplay::Weapon => Self {
                crosshair: compensated,
                ..Self::default()
            },
            RecoilDisplay::Target => Self {
                crosshair: Point::ZERO,
                hint: -compensated,
                wall: -compensated,
                target: -compensated,
                cursor_hidden: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub index: usize,
    pub cursor: Point,
    /// Where the shot landed, `cursor + pattern[index]`.
    pub hit: Point,
    pub target: Point,
    pub to_target: Point,
    /// Sensitivity-normalized distance between `hit` and `target`.
    pub miss_distance: f64,
    pub score: f64,
}

/// Post-trial overlay revealed for the selected trace mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trace {
    pub markers: Vec<Point>,
    pub lines: Vec<(Point, Point)>,
}

impl Trace {
    fn reveal(mode: TraceMode, hits: &[HitRecord]) -> Self {
        let markers = || -> Vec<Point> { hits.iter().map(|h| h.hit).collect() };
        match mode {
            TraceMode::None => Self::default(),
            TraceMode::Hits => Self {
                markers: markers(),
                lines: Vec::new(),
            },
            TraceMode::Lines => Self {
                markers: markers(),
                lines: hits.windows(2).map(|w| (w[0].hit, w[1].hit)).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub setup: TrialSetup,
    pub shots: usize,
    pub magazine_size: usize,
    pub total_score: f64,
    /// `total_score / shots`, clamped to `[0, 1]`; 0 when nothing was fired.
    pub score: f64,
    pub percentage: f64,
    /// Full magazine at unscaled fire speed.
    pub recordable: bool,
    pub hits: Vec<HitRecord>,
    pub trace: Trace,
}

#[derive(Debug, Clone, Default)]
pub struct FrameOutcome {
    /// Redraw needed.
    pub changed: bool,
    /// Shots registered during this frame.
    pub hits: Vec<HitRecord>,
    pub result: Option<TrialResult>,
}

#[derive(Debug, Clone)]
pub struct Trial {
    config: TrialConfig,
    state: TrialState,
    magazine_size: usize,
    audio_clip: String,
    scaled_pattern: Vec<Point>,
    start_time: Millis,
    start_position: Point,
    hint_path: Vec<Point>,
    hits: Vec<HitRecord>,
    total_score: f64,
    groups: VisualGroups,
}

impl Trial {
    pub fn new(config: TrialConfig) -> Result<Self, EngineError> {
        let mag = config
            .weapon
            .magazine(config.magazine)
            .ok_or_else(|| EngineError::MagazineNotFound {
                weapon: config.weapon.name.clone(),
                index: config.magazine,
            })?;
        let magazine_size = mag.size;
        let audio_clip = mag.audio_clip.clone();
        let scaled_pattern = config.scaled_pattern(magazine_size);
        Ok(Self {
            config,
            state: TrialState::Idle,
            magazine_size,
            audio_clip,
            scaled_pattern,
            start_time: 0.0,
            start_position: Point::ZERO,
            hint_path: Vec::new(),
            hits: Vec::new(),
            total_score: 0.0,
            groups: VisualGroups::default(),
        })
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn state(&self) -> TrialState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TrialState::Running
    }

    pub fn magazine_size(&self) -> usize {
        self.magazine_size
    }

    pub fn audio_clip(&self) -> &str {
        &self.audio_clip
    }

    pub fn start_position(&self) -> Point {
        self.start_position
    }

    /// Where the cursor should be for each shot; empty unless hint mode is on.
    pub fn hint_path(&self) -> &[Point] {
        &self.hint_path
    }

    pub fn hits(&self) -> &[HitRecord] {
        &self.hits
    }

    pub fn groups(&self) -> VisualGroups {
        self.groups
    }

    /// Starts from `Idle` only; returns whether the trial started.
    pub fn start(&mut self, now: Millis, cursor: Point, target: &mut Target) -> bool {
        if self.state != TrialState::Idle {
            return false;
        }
        self.state = TrialState::Running;
        self.start_time = now;
        self.start_position = cursor;
        if target.mode() != MotionMode::FreelyMoving {
            target.place(cursor);
        }
        self.hint_path = if self.config.hint {
            self.scaled_pattern.iter().map(|p| cursor - *p).collect()
        } else {
            Vec::new()
        };
        self.groups = VisualGroups::for_display(self.config.display, Point::ZERO);
        debug!(
            weapon = %self.config.weapon.name,
            magazine = self.magazine_size,
            fire_speed = self.config.fire_speed,
            "trial started"
        );
        true
    }

    fn elapsed(&self, now: Millis) -> Millis {
        ((now - self.start_time) * self.config.fire_speed).max(0.0)
    }

    /// Advances to `now`. A no-op unless running, so extra calls are harmless.
    pub fn frame(&mut self, now: Millis, cursor: Point, target: &mut Target) -> FrameOutcome {
        if self.state != TrialState::Running {
            return FrameOutcome::default();
        }
        let tp = &self.config.weapon.time_points;
        let elapsed = self.elapsed(now);
        let current = recoil::sample(tp, &self.scaled_pattern, self.magazine_size, elapsed);
        let ahead = recoil::sample(
            tp,
            &self.scaled_pattern,
            self.magazine_size,
            elapsed + LOOKAHEAD_MS,
        );

        let delta = cursor - self.start_position;
        let groups = VisualGroups::for_display(self.config.display, ahead.vector + delta);
        let mut changed = groups != self.groups;
        self.groups = groups;

        if self.config.motion == MotionMode::PathFollowing {
            let offset = -current.vector;
            if offset != target.offset() {
                target.set_offset(offset);
                changed = true;
            }
        }

        let reached = current.shot.map_or(0, |i| i + 1);
        let first_new = self.hits.len();
        while self.hits.len() < reached {
            let index = self.hits.len();
            let target_pos = target.position();
            let hit = cursor + self.scaled_pattern[index];
            let miss_distance = hit.distance(target_pos) / self.config.scale;
            let score = distance_score(miss_distance);
            self.total_score += score;
            debug!(index, miss_distance, score, "shot");
            self.hits.push(HitRecord {
                index,
                cursor,
                hit,
                target: target_pos,
                to_target: target_pos - cursor,
                miss_distance,
                score,
            });
        }
        let hits = self.hits[first_new..].to_vec();
        changed |= !hits.is_empty();

        let result = if self.hits.len() >= self.magazine_size {
            Some(self.finish(target))
        } else {
            None
        };
        FrameOutcome {
            changed: changed || result.is_some(),
            hits,
            result,
        }
    }

    /// Early stop. `None` unless the trial was running.
    pub fn release(&mut self, target: &mut Target) -> Option<TrialResult> {
        if self.state != TrialState::Running {
            return None;
        }
        Some(self.finish(target))
    }

    fn finish(&mut self, target: &mut Target) -> TrialResult {
        self.state = TrialState::Finished;
        let shots = self.hits.len();
        let score = if shots == 0 {
            0.0
        } else {
            (self.total_score / shots as f64).clamp(0.0, 1.0)
        };
        let recordable = self.config.fire_speed == 1.0 && shots >= self.magazine_size;

        self.groups = VisualGroups::default();
        target.set_offset(Point::ZERO);

        let percentage = to_percentage(score);
        info!(shots, percentage, recordable, "trial finished");
        TrialResult {
            setup: self.config.setup(),
            shots,
            magazine_size: self.magazine_size,
            total_score: self.total_score,
            score,
            percentage,
            recordable,
            hits: self.hits.clone(),
            trace: Trace::reveal(self.config.trace, &self.hits),
        }
    }
}
