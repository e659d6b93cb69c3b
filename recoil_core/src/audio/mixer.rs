use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

/// One clip to play, with the gain already resolved from the volume setting.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCue {
    pub clip_id: String,
    /// Linear gain in `[0, 1]`.
    pub volume: f32,
}

/// Sending side kept by the session. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct CueHandle {
    cue_tx: Sender<AudioCue>,
}

/// Host side; the host owns playback.
#[derive(Debug)]
pub struct CueReceiver {
    cue_rx: Receiver<AudioCue>,
}

pub fn cue_channel() -> (CueHandle, CueReceiver) {
    let (tx, rx) = unbounded();
    (CueHandle { cue_tx: tx }, CueReceiver { cue_rx: rx })
}

/// Volume setting (percent) to linear gain. `None` when nothing should play.
pub fn gain(volume_percent: f64, mute: bool) -> Option<f32> {
    if mute || !volume_percent.is_finite() || volume_percent <= 0.0 {
        return None;
    }
    Some((volume_percent / 100.0).min(1.0) as f32)
}

impl CueHandle {
    pub fn play(&self, clip_id: &str, volume: f32) {
        debug!(clip_id, volume, "audio cue");
        let _ = self.cue_tx.send(AudioCue {
            clip_id: clip_id.to_string(),
            volume,
        });
    }
}

impl CueReceiver {
    pub fn try_next(&self) -> Option<AudioCue> {
        self.cue_rx.try_recv().ok()
    }

    pub fn pending(&self) -> Vec<AudioCue> {
        self.cue_rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_follows_volume_and_mute() {
        assert_eq!(gain(50.0, false), Some(0.5));
        assert_eq!(gain(150.0, false), Some(1.0));
        assert_eq!(gain(50.0, true), None);
        assert_eq!(gain(0.0, false), None);
        assert_eq!(gain(f64::NAN, false), None);
    }

    #[test]
    fn cues_arrive_in_order() {
        let (handle, rx) = cue_channel();
        handle.play("r301_0", 0.5);
        handle.clone().play("r301_1", 1.0);
        let got = rx.pending();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].clip_id, "r301_0");
        assert_eq!(got[1].volume, 1.0);
        assert!(rx.try_next().is_none());
    }
}
