use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use flipclock_engine::core::{App as EngineApp, AppControl, FrameCtx, FrameRequest, WindowCtx};
use flipclock_engine::device::GpuInit;
use flipclock_engine::render::SceneRenderer;
use flipclock_engine::window::{Runtime, RuntimeConfig, WindowMode};

use crate::display::FlipDisplay;
use crate::flip_unit::Spring;
use crate::layout::ClockLayout;
use crate::scene::ClockScene;
use crate::theme::Theme;
use crate::time_source::{ClockTime, ConfigError, DatePattern, HourCycle, TimeFormat, TimeSource};

// ── Application ───────────────────────────────────────────────────────────

/// Flip clock application builder.
///
/// ```rust,ignore
/// Application::new()
///     .font(std::fs::read("DejaVuSans-Bold.ttf")?)
///     .date_format("%Y年%m月%d日")?
///     .run()?;
/// ```
pub struct Application {
    title:  String,
    width:  f64,
    height: f64,
    mode:   WindowMode,
    fonts:  Vec<Vec<u8>>,
    format: TimeFormat,
    theme:  Theme,
    spring: Spring,
}

impl Application {
    pub fn new() -> Self {
        Self {
            title:  "Flip Clock".to_string(),
            width:  1000.0,
            height: 700.0,
            mode:   WindowMode::Fullscreen,
            fonts:  Vec::new(),
            format: TimeFormat::system(),
            theme:  Theme::default(),
            spring: Spring::default(),
        }
    }

    /// Set the window title.
    pub fn title(mut self, t: impl Into<String>) -> Self {
        self.title = t.into();
        self
    }

    /// Set the windowed-mode size in logical pixels.
    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width  = width;
        self.height = height;
        self
    }

    /// Start full screen (the default) or windowed.
    pub fn window_mode(mut self, mode: WindowMode) -> Self {
        self.mode = mode;
        self
    }

    /// Register a font. The first one that loads is used for all text.
    pub fn font(mut self, data: Vec<u8>) -> Self {
        self.fonts.push(data);
        self
    }

    /// Set the strftime pattern of the date label.
    pub fn date_format(mut self, pattern: impl Into<String>) -> Result<Self, ConfigError> {
        self.format.date = DatePattern::new(pattern)?;
        Ok(self)
    }

    /// Use the long date of a locale tag such as `"de-DE"` instead of the
    /// system locale. Replaces any pattern set with
    /// [`date_format`](Self::date_format).
    pub fn locale(mut self, tag: &str) -> Result<Self, ConfigError> {
        let localized = TimeFormat::for_locale(tag)?;
        self.format.date = localized.date;
        self.format.locale = localized.locale;
        Ok(self)
    }

    pub fn hour_cycle(mut self, cycle: HourCycle) -> Self {
        self.format.hour_cycle = cycle;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Spring driving every flip.
    pub fn spring(mut self, spring: Spring) -> Self {
        self.spring = spring;
        self
    }

    /// Opens the window and runs the clock until the window closes.
    pub fn run(self) -> anyhow::Result<()> {
        let config = RuntimeConfig {
            title:        self.title.clone(),
            initial_size: LogicalSize::new(self.width, self.height),
            mode:         self.mode,
        };
        let state = ClockApp::new(self);
        Runtime::run(config, GpuInit::default(), state)
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

// ── ClockApp ──────────────────────────────────────────────────────────────

/// Internal state that implements `flipclock_engine::core::App`.
struct ClockApp {
    time:     TimeSource,
    display:  Rc<RefCell<FlipDisplay>>,
    scene:    ClockScene,
    renderer: SceneRenderer,
    theme:    Theme,
}

impl ClockApp {
    fn new(app: Application) -> Self {
        let mut scene = ClockScene::new();
        for (i, bytes) in app.fonts.iter().enumerate() {
            if let Err(e) = scene.load_font(bytes) {
                log::warn!("font #{i} rejected: {e}");
            }
        }
        if scene.font().is_none() {
            log::warn!("no usable font; digits and date will not be drawn");
        }

        let display = Rc::new(RefCell::new(FlipDisplay::with_spring(app.spring)));
        let mut time = TimeSource::system(app.format);
        let sink = display.clone();
        time.subscribe(move |t: &ClockTime| {
            sink.borrow_mut().apply(t);
        });
        // After font loading, so the first deadline matches the wall time
        // that start() reads.
        time.start(Instant::now());

        Self {
            time,
            display,
            scene,
            renderer: SceneRenderer::new(),
            theme:    app.theme,
        }
    }
}

impl EngineApp for ClockApp {
    fn on_window_event(&mut self, window: &WindowCtx<'_>, event: &WindowEvent) -> AppControl {
        if let WindowEvent::KeyboardInput { event: key, .. } = event {
            if let Some(mode) = mode_for_key(&key.logical_key, key.state, key.repeat, window.mode()) {
                window.set_mode(mode);
            }
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        // Advance running flips first so a flip started by this tick is
        // drawn at progress 0.
        self.display.borrow_mut().advance(ctx.time.dt);
        self.time.poll(ctx.time.now);

        let viewport = ctx.window.viewport();
        let layout = ClockLayout::compute(viewport.width, viewport.height);
        self.scene.paint(&self.display.borrow(), &layout, &self.theme);

        // ── Render ────────────────────────────────────────────────────────
        let dl       = &mut self.scene.draw_list;
        let fs       = &self.scene.font_system;
        let renderer = &mut self.renderer;

        ctx.render(self.theme.background, |rctx, target| {
            renderer.render(rctx, target, dl, fs);
        })
    }

    fn next_frame(&self) -> FrameRequest {
        if self.display.borrow().is_animating() {
            return FrameRequest::Continuous;
        }
        match self.time.next_tick() {
            Some(at) => FrameRequest::At(at),
            None => FrameRequest::Continuous,
        }
    }
}

/// F11 toggles full screen; Escape leaves it.
fn mode_for_key(key: &Key, state: ElementState, repeat: bool, current: WindowMode) -> Option<WindowMode> {
    if state != ElementState::Pressed || repeat {
        return None;
    }
    match key {
        Key::Named(NamedKey::F11) => Some(current.toggled()),
        Key::Named(NamedKey::Escape) if current == WindowMode::Fullscreen => Some(WindowMode::Windowed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f11_toggles_mode() {
        let f11 = Key::Named(NamedKey::F11);
        assert_eq!(
            mode_for_key(&f11, ElementState::Pressed, false, WindowMode::Windowed),
            Some(WindowMode::Fullscreen)
        );
        assert_eq!(
            mode_for_key(&f11, ElementState::Pressed, false, WindowMode::Fullscreen),
            Some(WindowMode::Windowed)
        );
    }

    #[test]
    fn escape_only_leaves_fullscreen() {
        let esc = Key::Named(NamedKey::Escape);
        assert_eq!(
            mode_for_key(&esc, ElementState::Pressed, false, WindowMode::Fullscreen),
            Some(WindowMode::Windowed)
        );
        assert_eq!(mode_for_key(&esc, ElementState::Pressed, false, WindowMode::Windowed), None);
    }

    #[test]
    fn releases_and_repeats_are_ignored() {
        let f11 = Key::Named(NamedKey::F11);
        assert_eq!(mode_for_key(&f11, ElementState::Released, false, WindowMode::Windowed), None);
        assert_eq!(mode_for_key(&f11, ElementState::Pressed, true, WindowMode::Windowed), None);
        assert_eq!(mode_for_key(&Key::Character("f".into()), ElementState::Pressed, false, WindowMode::Windowed), None);
    }

    #[test]
    fn builder_defaults_and_validation() {
        let app = Application::new();
        assert_eq!(app.mode, WindowMode::Fullscreen);
        assert_eq!(app.format, TimeFormat::system());

        let app = app.hour_cycle(HourCycle::H12).date_format("%Y年%m月%d日").unwrap();
        assert_eq!(app.format.hour_cycle, HourCycle::H12);
        assert_eq!(app.format.date.as_str(), "%Y年%m月%d日");

        assert!(Application::new().date_format("%").is_err());
    }

    #[test]
    fn locale_keeps_hour_cycle() {
        let app = Application::new().hour_cycle(HourCycle::H12).locale("de-DE").unwrap();
        assert_eq!(app.format.hour_cycle, HourCycle::H12);
        assert_eq!(app.format.date, DatePattern::long("de"));
        assert!(Application::new().locale("zz").is_err());
    }

    #[test]
    fn clock_app_publishes_on_creation() {
        let state = ClockApp::new(Application::new());
        assert!(state.time.current().is_some());
        assert!(state.time.next_tick().is_some());
        let label = state.display.borrow().date_label().to_owned();
        assert_eq!(label, state.time.current().map(|t| t.date_label.clone()).unwrap_or_default());
    }
}
