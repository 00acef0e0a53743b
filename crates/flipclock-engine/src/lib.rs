//! Flip clock engine crate.
//!
//! Owns the platform + GPU runtime pieces used by the clock: the winit loop,
//! the wgpu device, the renderer-agnostic draw list and the shape renderers
//! that consume it.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
pub mod text;
