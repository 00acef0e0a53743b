use std::time::Instant;

use winit::event::WindowEvent;

use super::ctx::{FrameCtx, WindowCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// When the application wants its next frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameRequest {
    /// Redraw as fast as the surface presents (an animation is running).
    Continuous,
    /// Sleep until the given instant, then redraw once.
    At(Instant),
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for window events before the runtime handles them.
    fn on_window_event(&mut self, window: &WindowCtx<'_>, event: &WindowEvent) -> AppControl {
        let _ = (window, event);
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Queried each time the event loop goes idle.
    fn next_frame(&self) -> FrameRequest {
        FrameRequest::Continuous
    }
}
