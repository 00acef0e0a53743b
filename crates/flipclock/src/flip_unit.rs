use flipclock_engine::scene::FlapFace;

/// Progress of a completed flip, in degrees.
pub const FLIP_END: f32 = 180.0;

/// Progress at which the flap stands perpendicular and swaps faces.
pub const FLIP_MID: f32 = 90.0;

/// Largest integration step; longer frames are split into substeps.
const MAX_STEP: f32 = 1.0 / 240.0;

/// Distance from [`FLIP_END`] at which a flip counts as complete.
const SETTLE_EPS: f32 = 0.01;

/// Damped spring driving flip progress toward [`FLIP_END`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Spring {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl Default for Spring {
    fn default() -> Self {
        Self { stiffness: 170.0, damping: 15.0, mass: 1.0 }
    }
}

impl Spring {
    /// A spring that actually moves: positive stiffness and mass, non-negative damping.
    pub fn is_valid(&self) -> bool {
        self.stiffness.is_finite()
            && self.damping.is_finite()
            && self.mass.is_finite()
            && self.stiffness > 0.0
            && self.mass > 0.0
            && self.damping >= 0.0
    }

    #[inline]
    fn acceleration(&self, x: f32, v: f32, target: f32) -> f32 {
        (-self.stiffness * (x - target) - self.damping * v) / self.mass
    }
}

/// Animation state of a [`FlipUnit`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum FlipState {
    Idle(char),
    /// `progress` in degrees, `[0, 180)`.
    Flipping { old: char, new: char, progress: f32 },
}

/// The rotating half of a card.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Flap {
    /// `Front` is the old top half, `Back` is the new bottom half.
    pub face: FlapFace,
    pub value: char,
    /// Rotation about the hinge, in degrees.
    pub angle: f32,
    /// Amount of black composited over the flap, `[0, 0.5]`.
    pub shade: f32,
}

/// What to draw for one unit at the current instant.
///
/// `top` and `bottom` are the static halves behind the flap.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlipFrame {
    pub top: char,
    pub bottom: char,
    pub flap: Option<Flap>,
}

/// One split-flap digit.
///
/// A new target restarts the flip from the last committed value; an
/// in-flight flip is not blended.
#[derive(Debug, Clone)]
pub struct FlipUnit {
    old: char,
    new: char,
    progress: f32,
    velocity: f32,
    flipping: bool,
    spring: Spring,
}

impl FlipUnit {
    pub fn new(value: char) -> Self {
        Self::with_spring(value, Spring::default())
    }

    pub fn with_spring(value: char, spring: Spring) -> Self {
        let spring = if spring.is_valid() {
            spring
        } else {
            log::warn!("ignoring invalid flip spring {spring:?}");
            Spring::default()
        };
        Self { old: value, new: value, progress: 0.0, velocity: 0.0, flipping: false, spring }
    }

    #[inline]
    pub fn old_value(&self) -> char {
        self.old
    }

    #[inline]
    pub fn new_value(&self) -> char {
        self.new
    }

    /// Flip progress in degrees; `0` at rest.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.flipping
    }

    pub fn state(&self) -> FlipState {
        if self.flipping {
            FlipState::Flipping { old: self.old, new: self.new, progress: self.progress }
        } else {
            FlipState::Idle(self.new)
        }
    }

    /// Starts a flip to `value` unless it is already the committed value.
    ///
    /// Returns `true` if a flip (re)started.
    pub fn set_target(&mut self, value: char) -> bool {
        if value == self.new {
            return false;
        }
        if self.flipping {
            log::trace!("flip {}→{} interrupted at {:.1}°", self.old, self.new, self.progress);
        }
        self.old = self.new;
        self.new = value;
        self.progress = 0.0;
        self.velocity = 0.0;
        self.flipping = true;
        true
    }

    /// Steps the spring by `dt` seconds. Progress never decreases and never
    /// passes [`FLIP_END`]; reaching it returns the unit to rest.
    pub fn advance(&mut self, dt: f32) {
        if !self.flipping || dt <= 0.0 || !dt.is_finite() {
            return;
        }

        let steps = (dt / MAX_STEP).ceil().max(1.0);
        let h = dt / steps;
        for _ in 0..steps as u32 {
            let a = self.spring.acceleration(self.progress, self.velocity, FLIP_END);
            self.velocity += a * h;
            let next = self.progress + self.velocity * h;
            self.progress = next.clamp(self.progress, FLIP_END);

            if self.progress >= FLIP_END - SETTLE_EPS {
                self.settle();
                return;
            }
        }
    }

    pub fn frame(&self) -> FlipFrame {
        if !self.flipping {
            return FlipFrame { top: self.new, bottom: self.new, flap: None };
        }

        let p = self.progress;
        if p <= FLIP_MID {
            FlipFrame {
                top: self.new,
                bottom: self.old,
                flap: Some(Flap { face: FlapFace::Front, value: self.old, angle: p, shade: p / FLIP_END }),
            }
        } else {
            FlipFrame {
                top: self.new,
                bottom: self.new,
                flap: Some(Flap {
                    face: FlapFace::Back,
                    value: self.new,
                    angle: p,
                    shade: (FLIP_END - p) / FLIP_END,
                }),
            }
        }
    }

    fn settle(&mut self) {
        self.old = self.new;
        self.progress = 0.0;
        self.velocity = 0.0;
        self.flipping = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const FRAME: f32 = 1.0 / 60.0;

    fn run_to_rest(unit: &mut FlipUnit) -> usize {
        let mut frames = 0;
        while unit.is_animating() {
            unit.advance(FRAME);
            frames += 1;
            assert!(frames < 600, "flip never settled");
        }
        frames
    }

    #[test]
    fn starts_idle() {
        let unit = FlipUnit::new('0');
        assert_eq!(unit.state(), FlipState::Idle('0'));
        assert_eq!(unit.frame(), FlipFrame { top: '0', bottom: '0', flap: None });
    }

    #[test]
    fn same_target_does_not_restart() {
        let mut unit = FlipUnit::new('4');
        assert!(!unit.set_target('4'));
        assert_eq!(unit.state(), FlipState::Idle('4'));

        assert!(unit.set_target('5'));
        unit.advance(0.05);
        let before = unit.progress();
        assert!(!unit.set_target('5'));
        assert_eq!(unit.progress(), before);
    }

    #[test]
    fn new_target_flips_to_rest() {
        let mut unit = FlipUnit::new('1');
        assert!(unit.set_target('2'));
        assert_eq!(unit.state(), FlipState::Flipping { old: '1', new: '2', progress: 0.0 });

        let frames = run_to_rest(&mut unit);
        assert!(frames < 60, "took {frames} frames");
        assert_eq!(unit.state(), FlipState::Idle('2'));
        assert_eq!(unit.old_value(), '2');
    }

    #[test]
    fn interruption_restarts_from_committed_value() {
        let mut unit = FlipUnit::new('1');
        unit.set_target('2');
        unit.advance(0.08);
        assert!(unit.progress() > 0.0);

        assert!(unit.set_target('3'));
        assert_eq!(unit.state(), FlipState::Flipping { old: '2', new: '3', progress: 0.0 });
    }

    #[test]
    fn first_half_shows_old_top_flap() {
        let mut unit = FlipUnit::new('7');
        unit.set_target('8');
        unit.progress = 45.0;

        let frame = unit.frame();
        assert_eq!((frame.top, frame.bottom), ('8', '7'));
        assert_eq!(frame.flap, Some(Flap { face: FlapFace::Front, value: '7', angle: 45.0, shade: 0.25 }));
    }

    #[test]
    fn second_half_shows_new_bottom_flap() {
        let mut unit = FlipUnit::new('7');
        unit.set_target('8');
        unit.progress = 135.0;

        let frame = unit.frame();
        assert_eq!((frame.top, frame.bottom), ('8', '8'));
        assert_eq!(frame.flap, Some(Flap { face: FlapFace::Back, value: '8', angle: 135.0, shade: 0.25 }));
    }

    #[test]
    fn perpendicular_is_still_first_half() {
        let mut unit = FlipUnit::new('7');
        unit.set_target('8');
        unit.progress = FLIP_MID;
        assert_eq!(unit.frame().flap.map(|f| f.face), Some(FlapFace::Front));
    }

    #[test]
    fn invalid_spring_falls_back_to_default() {
        let unit = FlipUnit::with_spring('0', Spring { stiffness: 0.0, damping: 1.0, mass: 1.0 });
        assert_eq!(unit.spring, Spring::default());
        let unit = FlipUnit::with_spring('0', Spring { mass: f32::NAN, ..Spring::default() });
        assert_eq!(unit.spring, Spring::default());
    }

    #[test]
    fn non_positive_dt_is_ignored() {
        let mut unit = FlipUnit::new('0');
        unit.set_target('1');
        unit.advance(0.0);
        unit.advance(-1.0);
        unit.advance(f32::NAN);
        assert_eq!(unit.progress(), 0.0);
    }

    proptest! {
        #[test]
        fn progress_is_monotonic_and_bounded(steps in prop::collection::vec(0.0f32..0.25, 1..200)) {
            let mut unit = FlipUnit::new('0');
            unit.set_target('1');
            let mut last = 0.0;
            for dt in steps {
                unit.advance(dt);
                if !unit.is_animating() {
                    prop_assert_eq!(unit.state(), FlipState::Idle('1'));
                    break;
                }
                prop_assert!(unit.progress() >= last);
                prop_assert!(unit.progress() < FLIP_END);
                last = unit.progress();
            }
        }

        #[test]
        fn overdamped_springs_still_settle(damping in 30.0f32..80.0) {
            let spring = Spring { damping, ..Spring::default() };
            let mut unit = FlipUnit::with_spring('0', spring);
            unit.set_target('1');
            for _ in 0..2_000 {
                unit.advance(FRAME);
            }
            prop_assert!(!unit.is_animating());
        }
    }
}
