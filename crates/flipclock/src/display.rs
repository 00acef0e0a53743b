use crate::flip_unit::{FlipUnit, Spring};
use crate::time_source::ClockTime;

/// Number of digit slots: HH MM SS.
pub const SLOT_COUNT: usize = 6;

/// The six flip units plus the date label, fed by [`ClockTime`] snapshots.
///
/// Units are independent; each keeps its own spring state and only the
/// common tick starts them together.
#[derive(Debug, Clone)]
pub struct FlipDisplay {
    units: [FlipUnit; SLOT_COUNT],
    date_label: String,
}

impl Default for FlipDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl FlipDisplay {
    /// All units at rest on '0'.
    pub fn new() -> Self {
        Self::with_spring(Spring::default())
    }

    pub fn with_spring(spring: Spring) -> Self {
        Self {
            units: std::array::from_fn(|_| FlipUnit::with_spring('0', spring)),
            date_label: String::new(),
        }
    }

    /// Assigns each slot its digit from `time`. Returns how many units
    /// started a flip.
    pub fn apply(&mut self, time: &ClockTime) -> usize {
        let mut started = 0;
        for (unit, digit) in self.units.iter_mut().zip(time.digits()) {
            if unit.set_target(digit) {
                started += 1;
            }
        }
        if self.date_label != time.date_label {
            self.date_label.clone_from(&time.date_label);
        }
        if started > 0 {
            log::trace!("{started} unit(s) flipping to {}:{}:{}", time.hour, time.minute, time.second);
        }
        started
    }

    /// Advances every unit's animation by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        for unit in &mut self.units {
            unit.advance(dt);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.units.iter().any(FlipUnit::is_animating)
    }

    #[inline]
    pub fn units(&self) -> &[FlipUnit; SLOT_COUNT] {
        &self.units
    }

    #[inline]
    pub fn date_label(&self) -> &str {
        &self.date_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flip_unit::FlipState;

    fn time(h: &str, m: &str, s: &str) -> ClockTime {
        ClockTime {
            hour: h.into(),
            minute: m.into(),
            second: s.into(),
            date_label: "Wednesday, December 24, 2025".into(),
        }
    }

    #[test]
    fn starts_at_zero() {
        let display = FlipDisplay::new();
        assert!(display.units().iter().all(|u| u.state() == FlipState::Idle('0')));
        assert!(!display.is_animating());
        assert_eq!(display.date_label(), "");
    }

    #[test]
    fn apply_flips_only_changed_slots() {
        let mut display = FlipDisplay::new();
        assert_eq!(display.apply(&time("00", "00", "07")), 1);
        assert_eq!(display.date_label(), "Wednesday, December 24, 2025");

        let states: Vec<_> = display.units().iter().map(FlipUnit::state).collect();
        assert_eq!(states[5], FlipState::Flipping { old: '0', new: '7', progress: 0.0 });
        assert!(states[..5].iter().all(|s| *s == FlipState::Idle('0')));

        assert_eq!(display.apply(&time("00", "00", "07")), 0);
    }

    #[test]
    fn units_advance_independently() {
        let mut display = FlipDisplay::new();
        display.apply(&time("00", "00", "01"));
        display.advance(0.05);
        display.apply(&time("00", "10", "01"));

        let units = display.units();
        assert!(units[5].progress() > 0.0);
        assert_eq!(units[2].progress(), 0.0);
        assert!(units[2].is_animating());

        for _ in 0..120 {
            display.advance(1.0 / 60.0);
        }
        assert!(!display.is_animating());
    }
}
