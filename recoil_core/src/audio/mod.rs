mod mixer;

pub use mixer::{cue_channel, gain, AudioCue, CueHandle, CueReceiver};
