//! Frame timing.
//!
//! The runtime owns one `FrameClock` and ticks it once per presented frame.
//! `tick` takes the timestamp explicitly so the clamping logic is testable
//! without sleeping.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
