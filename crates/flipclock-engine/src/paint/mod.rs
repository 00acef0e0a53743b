//! Paint model shared between the clock scene and renderers.
//!
//! Scope: color representation (linear, premultiplied alpha). Geometry types
//! remain in `coords`.

pub mod color;

pub use color::Color;
