/// Decay constant of [`distance_score`]; a 100 unit miss scores about 0.018.
pub const DISTANCE_DECAY: f64 = 0.0004;

/// Maps a miss distance in sensitivity-normalized units to a score in `[0, 1]`.
/// Negative distances score like 0.
pub fn distance_score(miss_distance: f64) -> f64 {
    let d = miss_distance.max(0.0);
    (-DISTANCE_DECAY * d * d).exp().clamp(0.0, 1.0)
}

/// Trial score as the integer percentage recorded into statistics.
pub fn to_percentage(score: f64) -> f64 {
    (score.clamp(0.0, 1.0) * 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn perfect_aim_scores_one() {
        assert!(distance_score(0.0) > 0.99);
        assert!(distance_score(1000.0) < 0.01);
        assert!(distance_score(100.0) < 0.02);
    }

    #[test]
    fn negative_distance_is_clamped() {
        assert_eq!(distance_score(-5.0), distance_score(0.0));
    }

    #[test]
    fn percentage_rounds() {
        assert_eq!(to_percentage(0.994), 99.0);
        assert_eq!(to_percentage(0.996), 100.0);
        assert_eq!(to_percentage(1.7), 100.0);
    }

    proptest! {
        #[test]
        fn score_is_monotonic(a in 0.0f64..2000.0, b in 0.0f64..2000.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(distance_score(near) >= distance_score(far));
        }

        #[test]
        fn score_stays_in_unit_range(d in -1000.0f64..5000.0) {
            let s = distance_score(d);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
