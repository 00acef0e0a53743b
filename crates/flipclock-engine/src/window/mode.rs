use winit::window::{Fullscreen, Window};

/// How the window is presented.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum WindowMode {
    /// Regular decorated window.
    #[default]
    Windowed,
    /// Borderless full screen on the window's current monitor.
    Fullscreen,
}

impl WindowMode {
    /// The winit full-screen setting for this mode.
    pub(crate) fn fullscreen(self) -> Option<Fullscreen> {
        match self {
            WindowMode::Windowed => None,
            WindowMode::Fullscreen => Some(Fullscreen::Borderless(None)),
        }
    }

    pub(crate) fn of(window: &Window) -> Self {
        if window.fullscreen().is_some() {
            WindowMode::Fullscreen
        } else {
            WindowMode::Windowed
        }
    }

    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            WindowMode::Windowed => WindowMode::Fullscreen,
            WindowMode::Fullscreen => WindowMode::Windowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_is_borderless_on_current_monitor() {
        assert!(matches!(WindowMode::Fullscreen.fullscreen(), Some(Fullscreen::Borderless(None))));
        assert!(WindowMode::Windowed.fullscreen().is_none());
    }

    #[test]
    fn toggle_round_trips() {
        assert_eq!(WindowMode::Windowed.toggled(), WindowMode::Fullscreen);
        assert_eq!(WindowMode::default().toggled().toggled(), WindowMode::default());
    }
}
