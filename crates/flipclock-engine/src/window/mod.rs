//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single clock window, and wires them to
//! the GPU layer.

mod mode;
mod runtime;

pub use mode::WindowMode;
pub use runtime::{Runtime, RuntimeConfig};
