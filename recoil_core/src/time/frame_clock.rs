use recoil_schema::Millis;

/// Turns absolute frame timestamps from the host's animation pump into
/// per-frame deltas.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_frame: Option<Millis>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous tick; 0 on the first tick and when the
    /// host clock goes backwards.
    pub fn tick(&mut self, now: Millis) -> Millis {
        let diff = self.last_frame.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame = Some(now);
        diff
    }

    pub fn last_frame(&self) -> Option<Millis> {
        self.last_frame
    }
}
