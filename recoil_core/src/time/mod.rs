pub mod day;
pub mod frame_clock;
