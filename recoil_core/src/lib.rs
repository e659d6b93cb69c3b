//! Recoil-control trainer engine.
//!
//! The host owns windowing, rendering and audio playback; it feeds input and
//! animation ticks into a [`session::Session`] and draws the state it exposes.

pub mod audio;
pub mod error;
pub mod geometry;
pub mod input;
pub mod score;
pub mod session;
pub mod settings;
pub mod stats;
pub mod target;
pub mod time;
pub mod trial;
pub mod weapon;

pub use error::EngineError;
pub use geometry::{Point, PointExt, Rect};
pub use session::{Session, SessionFrame};
