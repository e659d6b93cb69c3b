//! 2-D point math shared by the target, trial and rendering glue.
//!
//! `Point` is glam's `DVec2`, which already covers add/sub/scalar scale,
//! per-axis scale (`p * DVec2::new(sx, sy)`), `distance` and `length`.

use glam::DVec2;
use rand::Rng;
use recoil_schema::WeaponRecord;

pub type Point = DVec2;

pub trait PointExt {
    /// Rounds both coordinates to the nearest multiple of `step`.
    fn align(self, step: f64) -> Self;
    fn close_to(self, other: Self) -> bool;
}

impl PointExt for Point {
    fn align(self, step: f64) -> Self {
        if step <= 0.0 {
            return self;
        }
        (self / step).round() * step
    }

    fn close_to(self, other: Self) -> bool {
        self.distance(other) < 0.1
    }
}

pub(crate) fn points_from_xy(x: &[f64], y: &[f64]) -> Vec<Point> {
    x.iter().zip(y).map(|(&x, &y)| Point::new(x, y)).collect()
}

pub(crate) fn record_pattern(record: &WeaponRecord) -> Vec<Point> {
    points_from_xy(&record.x, &record.y)
}

/// Axis-aligned rectangle, `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(Point::ZERO, Point::new(width, height))
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Point {
        self.max - self.min
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Uniformly distributed point inside the rectangle.
    pub fn sample(&self, rng: &mut impl Rng) -> Point {
        let t = Point::new(rng.gen::<f64>(), rng.gen::<f64>());
        self.min + self.size() * t
    }

    /// Smallest rectangle containing every point, `None` for an empty input.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |r, p| Self {
            min: r.min.min(p),
            max: r.max.max(p),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn align_rounds_to_grid() {
        assert_eq!(Point::new(12.4, -7.6).align(5.0), Point::new(10.0, -10.0));
        assert_eq!(Point::new(1.3, 2.7).align(0.0), Point::new(1.3, 2.7));
    }

    #[test]
    fn close_to_uses_tenth_of_unit() {
        assert!(Point::new(1.0, 1.0).close_to(Point::new(1.05, 1.0)));
        assert!(!Point::new(1.0, 1.0).close_to(Point::new(1.2, 1.0)));
    }

    #[test]
    fn rect_normalizes_corners() {
        let r = Rect::new(Point::new(10.0, 0.0), Point::new(0.0, 20.0));
        assert_eq!(r.min, Point::new(0.0, 0.0));
        assert_eq!(r.max, Point::new(10.0, 20.0));
        assert_eq!(r.center(), Point::new(5.0, 10.0));
    }

    #[test]
    fn samples_stay_inside() {
        let r = Rect::new(Point::new(-5.0, 3.0), Point::new(5.0, 4.0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(r.contains(r.sample(&mut rng)));
        }
    }

    #[test]
    fn bounding_box_of_points() {
        let r = Rect::bounding([Point::new(1.0, -2.0), Point::new(-3.0, 4.0), Point::new(0.0, 0.0)])
            .unwrap();
        assert_eq!(r.min, Point::new(-3.0, -2.0));
        assert_eq!(r.max, Point::new(1.0, 4.0));
        assert!(Rect::bounding(std::iter::empty()).is_none());
    }
}
