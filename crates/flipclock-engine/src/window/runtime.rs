use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, FrameRequest, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

use super::WindowMode;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Size used in windowed mode.
    pub initial_size: LogicalSize<f64>,
    pub mode: WindowMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Flip Clock".to_string(),
            initial_size: LogicalSize::new(1000.0, 700.0),
            mode: WindowMode::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `app` until the window closes or the app
    /// asks to exit. Window or GPU setup failures are returned.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Maps a frame request to the loop's control flow and whether to redraw now.
fn schedule(request: FrameRequest, now: Instant) -> (ControlFlow, bool) {
    match request {
        FrameRequest::Continuous => (ControlFlow::Wait, true),
        FrameRequest::At(deadline) if deadline <= now => (ControlFlow::Wait, true),
        FrameRequest::At(deadline) => (ControlFlow::WaitUntil(deadline), false),
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    exit_requested: bool,
    error: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            window: None,
            exit_requested: false,
            error: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_fullscreen(self.config.mode.fullscreen());

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        log::info!(
            "window created ({:?}, {}x{} px, scale {:.2})",
            self.config.mode,
            window.inner_size().width,
            window.inner_size().height,
            window.scale_factor()
        );

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            clock: FrameClock::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(mut entry) => {
                // GPU setup can take a while; don't count it as frame time.
                entry.with_clock_mut(|c| c.reset(Instant::now()));
                entry.with_window(|w| w.request_redraw());
                self.window = Some(entry);
            }
            Err(e) => {
                log::error!("{e:#}");
                self.error = Some(e);
                self.request_exit(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        let Some(entry) = self.window.as_ref() else { return; };

        let (flow, redraw_now) = schedule(self.app.next_frame(), Instant::now());
        event_loop.set_control_flow(flow);
        if redraw_now {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else { return; };

        let control = entry.with_window(|w| app.on_window_event(&WindowCtx { window: w }, &event));
        if control == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.window = None;
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let control = entry.with_mut(|fields| {
                    let time = fields.clock.tick(Instant::now());
                    let mut ctx = FrameCtx {
                        window: WindowCtx { window: fields.window },
                        gpu: fields.gpu,
                        time,
                    };
                    app.on_frame(&mut ctx)
                });

                if control == AppControl::Exit {
                    self.request_exit(event_loop);
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn continuous_redraws_immediately() {
        let now = Instant::now();
        assert_eq!(schedule(FrameRequest::Continuous, now), (ControlFlow::Wait, true));
    }

    #[test]
    fn future_deadline_sleeps_until_it() {
        let now = Instant::now();
        let at = now + Duration::from_millis(400);
        assert_eq!(schedule(FrameRequest::At(at), now), (ControlFlow::WaitUntil(at), false));
    }

    #[test]
    fn reached_deadline_redraws() {
        let now = Instant::now();
        assert_eq!(schedule(FrameRequest::At(now), now), (ControlFlow::Wait, true));
        assert_eq!(
            schedule(FrameRequest::At(now), now + Duration::from_millis(3)),
            (ControlFlow::Wait, true)
        );
    }
}
