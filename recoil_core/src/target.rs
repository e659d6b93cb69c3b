use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionMode {
    /// Fixed at the trial start position.
    #[default]
    Stationary,
    /// Drawn where the weapon should be aimed; logically still at the start.
    PathFollowing,
    /// Patrols the wander rectangle at constant speed.
    FreelyMoving,
}

impl FromStr for MotionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stationary" => Ok(Self::Stationary),
            "path" => Ok(Self::PathFollowing),
            "moving" => Ok(Self::FreelyMoving),
            other => Err(format!("unknown target motion: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetConfig {
    pub mode: MotionMode,
    /// Units per millisecond.
    pub speed: f64,
    pub bounds: Rect,
}

/// The aim point. `offset` is purely visual and never affects scoring.
#[derive(Debug, Clone)]
pub struct Target {
    position: Point,
    offset: Point,
    mode: MotionMode,
    speed: f64,
    bounds: Rect,
    destination: Point,
    rng: StdRng,
}

impl Target {
    pub fn new(position: Point) -> Self {
        Self::with_rng(position, StdRng::from_entropy())
    }

    pub fn with_seed(position: Point, seed: u64) -> Self {
        Self::with_rng(position, StdRng::seed_from_u64(seed))
    }

    fn with_rng(position: Point, rng: StdRng) -> Self {
        Self {
            position,
            offset: Point::ZERO,
            mode: MotionMode::Stationary,
            speed: 0.0,
            bounds: Rect::new(position, position),
            destination: position,
            rng,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn destination(&self) -> Point {
        self.destination
    }

    pub fn moving(&self) -> bool {
        self.mode == MotionMode::FreelyMoving && self.speed > 0.0
    }

    pub fn set_offset(&mut self, offset: Point) {
        self.offset = offset;
    }

    /// Snaps to `position` with zero offset.
    pub fn place(&mut self, position: Point) {
        self.position = position;
        self.offset = Point::ZERO;
    }

    pub fn on_settings_updated(&mut self, config: TargetConfig) {
        let entering_free_motion =
            config.mode == MotionMode::FreelyMoving && self.mode != MotionMode::FreelyMoving;
        self.mode = config.mode;
        self.speed = config.speed.max(0.0);
        self.bounds = config.bounds;
        if entering_free_motion && !self.bounds.contains(self.position) {
            self.position = self.bounds.center();
        }
        self.destination = self.bounds.sample(&mut self.rng);
    }

    /// Advances towards the current destination. On arrival the target stops
    /// exactly on it and picks the next one. Returns whether a redraw is needed.
    pub fn frame(&mut self, time_diff_ms: f64) -> bool {
        if !self.moving() || time_diff_ms <= 0.0 {
            return false;
        }
        let step = self.speed * time_diff_ms;
        let to = self.destination - self.position;
        let remaining = to.length();
        if step >= remaining {
            self.position = self.destination;
            self.destination = self.bounds.sample(&mut self.rng);
        } else {
            self.position += to / remaining * step;
        }
        true
    }
}

/// Area the freely moving target may wander in so that every recoil offset
/// drawn relative to it (`target - p`) stays inside `viewport`. Collapses to
/// the viewport center on an axis where the excursion does not fit.
pub fn wander_bounds(scaled_pattern: &[Point], viewport: Rect) -> Rect {
    let extent = Rect::bounding(scaled_pattern.iter().copied())
        .unwrap_or_else(|| Rect::new(Point::ZERO, Point::ZERO));
    let mut min = viewport.min + extent.max;
    let mut max = viewport.max + extent.min;
    let center = viewport.center();
    if min.x > max.x {
        min.x = center.x;
        max.x = center.x;
    }
    if min.y > max.y {
        min.y = center.y;
        max.y = center.y;
    }
    Rect { min, max }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moving_config(bounds: Rect) -> TargetConfig {
        TargetConfig {
            mode: MotionMode::FreelyMoving,
            speed: 0.1,
            bounds,
        }
    }

    #[test]
    fn stationary_target_never_redraws() {
        let mut t = Target::with_seed(Point::new(5.0, 5.0), 1);
        assert!(!t.frame(16.0));
        assert_eq!(t.position(), Point::new(5.0, 5.0));
    }

    #[test]
    fn entering_free_motion_recenters_outside_position() {
        let bounds = Rect::new(Point::new(100.0, 100.0), Point::new(200.0, 200.0));
        let mut t = Target::with_seed(Point::new(0.0, 0.0), 2);
        t.on_settings_updated(moving_config(bounds));
        assert_eq!(t.position(), Point::new(150.0, 150.0));
        assert!(bounds.contains(t.destination()));
    }

    #[test]
    fn inside_position_is_kept() {
        let bounds = Rect::new(Point::new(0.0, 0.0), Point::new(200.0, 200.0));
        let mut t = Target::with_seed(Point::new(10.0, 20.0), 3);
        t.on_settings_updated(moving_config(bounds));
        assert_eq!(t.position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn moves_at_configured_speed() {
        let bounds = Rect::new(Point::new(0.0, 0.0), Point::new(1000.0, 1000.0));
        let mut t = Target::with_seed(Point::new(500.0, 500.0), 4);
        t.on_settings_updated(moving_config(bounds));
        let before = t.position();
        let dest = t.destination();
        assert!(t.frame(10.0));
        let travelled = t.position().distance(before);
        if dest.distance(before) > 1.0 {
            assert!((travelled - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn never_overshoots_destination() {
        let bounds = Rect::new(Point::new(0.0, 0.0), Point::new(50.0, 50.0));
        let mut t = Target::with_seed(Point::new(25.0, 25.0), 5);
        t.on_settings_updated(moving_config(bounds));
        for _ in 0..500 {
            let dest = t.destination();
            let before = t.position();
            t.frame(33.0);
            assert!(bounds.contains(t.position()));
            let travelled = t.position().distance(before);
            assert!(travelled <= before.distance(dest) + 1e-9);
        }
    }

    #[test]
    fn wander_bounds_keep_pattern_on_screen() {
        let pattern = [Point::new(0.0, 0.0), Point::new(-20.0, -100.0), Point::new(30.0, -150.0)];
        let viewport = Rect::from_size(800.0, 600.0);
        let b = wander_bounds(&pattern, viewport);
        assert_eq!(b.min, Point::new(30.0, 0.0));
        assert_eq!(b.max, Point::new(780.0, 450.0));
    }

    #[test]
    fn wander_bounds_collapse_when_pattern_too_big() {
        let pattern = [Point::new(0.0, 0.0), Point::new(0.0, -900.0)];
        let b = wander_bounds(&pattern, Rect::from_size(800.0, 600.0));
        assert_eq!(b.min.y, 300.0);
        assert_eq!(b.max.y, 300.0);
        assert!(b.min.x < b.max.x);
    }
}
