//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the application: the [`App`] callbacks, the per-frame context and the
//! redraw scheduling request.

mod app;
mod ctx;

pub use app::{App, AppControl, FrameRequest};
pub use ctx::{FrameCtx, WindowCtx};
