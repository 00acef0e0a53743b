use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Delta time is clamped so animations stay stable when the loop was asleep
/// (an idle clock wakes once per second), paused by a debugger, or stalled.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps (0.1 ms to 250 ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the clock baseline to `now`.
    ///
    /// Call when resuming so the first frame does not see the whole pause.
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Advances the clock to `now` and returns a new `FrameTime`.
    pub fn tick(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_measured_between_ticks() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new();
        clock.reset(t0);
        let ft = clock.tick(t0 + Duration::from_millis(16));
        assert!((ft.dt - 0.016).abs() < 1e-6);
        assert_eq!(ft.frame_index, 0);
        assert_eq!(clock.tick(t0 + Duration::from_millis(32)).frame_index, 1);
    }

    #[test]
    fn long_stall_is_clamped() {
        let t0 = Instant::now();
        let mut clock = FrameClock::new();
        clock.reset(t0);
        let ft = clock.tick(t0 + Duration::from_secs(1));
        assert_eq!(ft.dt, 0.25);
    }

    #[test]
    fn zero_and_backwards_time_use_minimum() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::new();
        clock.reset(t0);
        assert!((clock.tick(t0).dt - 0.0001).abs() < 1e-7);
        assert!((clock.tick(t0 - Duration::from_millis(5)).dt - 0.0001).abs() < 1e-7);
    }
}
