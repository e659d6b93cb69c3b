use anyhow::Context;
use recoil_core::trial::recoil;
use recoil_core::trial::{HitRecord, TrialResult};
use recoil_core::Session;

/// Scripted trigger hold.
#[derive(Debug, Clone)]
pub struct Script {
    /// `1.0` cancels the recoil exactly, `0.0` never moves the cursor.
    pub compensate: f64,
    pub release_after: Option<usize>,
    pub frame_ms: f64,
}

/// Presses at t=0, pumps frames while moving the cursor against the recoil
/// and prints one row per registered shot.
pub fn run_trial(session: &mut Session, script: &Script) -> anyhow::Result<TrialResult> {
    anyhow::ensure!(script.frame_ms > 0.0, "frame interval must be positive");

    session.frame(0.0)?;
    session.press_trigger(0.0).context("trial could not start")?;
    let trial = session.trial().context("no trial after trigger press")?;
    let config = trial.config().clone();
    let start = trial.start_position();
    let mag = trial.magazine_size();
    let scaled = config.scaled_pattern(mag);

    println!(
        "Trial: {} mag {} ({} shots) scale {:.3}",
        config.weapon.name, config.magazine, mag, config.scale
    );
    println!("shot |   time ms |   miss | score");
    println!("-----|-----------|--------|------");

    let mut now = 0.0;
    let mut fired = 0;
    loop {
        let elapsed = now * config.fire_speed;
        let r = recoil::sample(&config.weapon.time_points, &scaled, mag, elapsed);
        session.move_cursor(start - r.vector * script.compensate);

        let frame = session.frame(now)?;
        for hit in &frame.trial.hits {
            print_hit(hit, now);
        }
        fired += frame.trial.hits.len();
        if let Some(result) = frame.trial.result {
            return Ok(result);
        }
        if script.release_after.is_some_and(|n| fired >= n) {
            return session
                .release_trigger()?
                .context("trial ended without a result");
        }
        now += script.frame_ms;
    }
}

fn print_hit(hit: &HitRecord, now: f64) {
    println!(
        "{:4} | {:9.1} | {:6.2} | {:.3}",
        hit.index, now, hit.miss_distance, hit.score
    );
}
