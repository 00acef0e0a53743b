//! Split-flap desk clock on top of `flipclock-engine`.
//!
//! Data flows one way: a [`TimeSource`] samples the wall clock on each second
//! boundary and pushes a [`ClockTime`] to its observers; the [`FlipDisplay`]
//! turns changed digits into spring-driven flips; every frame the
//! [`ClockScene`] paints the display into a draw list using the geometry from
//! [`ClockLayout`].
//!
//! # Quick start
//!
//! ```rust,ignore
//! use flipclock::Application;
//!
//! Application::new()
//!     .font(std::fs::read("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf")?)
//!     .run()?;
//! ```
//!
//! # Headless use
//!
//! ```rust,ignore
//! let clock = ManualClock::new(start);
//! let mut source = TimeSource::new(clock.clone(), TimeFormat::default());
//! let display = Rc::new(RefCell::new(FlipDisplay::new()));
//! let sink = display.clone();
//! source.subscribe(move |t: &ClockTime| { sink.borrow_mut().apply(t); });
//! source.start(Instant::now());
//! ```

pub mod app;
pub mod display;
pub mod flip_unit;
pub mod layout;
pub mod painter;
pub mod scene;
pub mod theme;
pub mod time_source;

pub use app::Application;
pub use display::FlipDisplay;
pub use flip_unit::{Flap, FlipFrame, FlipState, FlipUnit, Spring};
pub use layout::ClockLayout;
pub use scene::ClockScene;
pub use theme::Theme;
pub use flipclock_engine::window::WindowMode;
pub use time_source::{
    ClockTime, ConfigError, DatePattern, HourCycle, ManualClock, SystemClock, TimeFormat,
    TimeObserver, TimeSource, WallClock,
};
