use crate::geometry::Point;
use recoil_schema::Millis;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputKind {
    TriggerPressed,
    TriggerReleased,
    CursorMoved(Point),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    /// Host clock time of the event, same timeline as the frame pump.
    pub timestamp_ms: Millis,
    pub kind: InputKind,
}

impl InputEvent {
    pub fn press(timestamp_ms: Millis) -> Self {
        Self {
            timestamp_ms,
            kind: InputKind::TriggerPressed,
        }
    }

    pub fn release(timestamp_ms: Millis) -> Self {
        Self {
            timestamp_ms,
            kind: InputKind::TriggerReleased,
        }
    }

    pub fn cursor(timestamp_ms: Millis, position: Point) -> Self {
        Self {
            timestamp_ms,
            kind: InputKind::CursorMoved(position),
        }
    }
}
