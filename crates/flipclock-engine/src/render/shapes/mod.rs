//! Shape renderers.
//!
//! Each renderer collects instances for its shape during a frame, uploads them
//! once, and draws instance ranges on request so the scene renderer can
//! interleave shapes in paint order.

mod common;

pub(super) mod circle;
pub(super) mod rounded_rect;
pub(super) mod text;

pub(super) use common::SharedBuffers;
