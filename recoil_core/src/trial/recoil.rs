use recoil_schema::Millis;

use crate::geometry::Point;

/// Recoil state at one instant of a trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoilSample {
    /// Interpolated offset at the sampled time.
    pub vector: Point,
    /// Last shot whose time point has been reached.
    pub shot: Option<usize>,
}

impl RecoilSample {
    pub const NONE: RecoilSample = RecoilSample {
        vector: Point::ZERO,
        shot: None,
    };
}

/// Samples the first `shots` keyframes at `elapsed`. Zero before the first
/// time point, linear between keyframes, holding the last offset afterwards.
pub fn sample(time_points: &[Millis], pattern: &[Point], shots: usize, elapsed: Millis) -> RecoilSample {
    let n = shots.min(time_points.len()).min(pattern.len());
    if n == 0 || elapsed < time_points[0] {
        return RecoilSample::NONE;
    }
    let i = time_points[..n].partition_point(|&t| t <= elapsed) - 1;
    if i + 1 == n {
        return RecoilSample {
            vector: pattern[i],
            shot: Some(i),
        };
    }
    let span = time_points[i + 1] - time_points[i];
    let f = (elapsed - time_points[i]) / span;
    RecoilSample {
        vector: pattern[i].lerp(pattern[i + 1], f),
        shot: Some(i),
    }
}
