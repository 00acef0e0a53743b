use flipclock_engine::paint::Color;

/// Palette and card proportions.
///
/// Proportions are fractions of the card height unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    /// Card faces and backing plate.
    pub card: Color,
    pub digit: Color,
    pub dots: Color,
    pub date: Color,

    pub corner_radius: f32,
    pub digit_size: f32,
    /// Upward nudge of the digit glyphs, as a fraction of the digit size.
    pub digit_lift: f32,
    /// Thickness of the split line, in logical pixels.
    pub divider: f32,
    /// Camera distance for the flap perspective.
    pub perspective: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::grey(0.10),
            card: Color::grey(0.15),
            digit: Color::white(),
            dots: Color::grey(0.30),
            date: Color::grey(0.40),

            corner_radius: 0.1,
            digit_size: 0.8,
            digit_lift: 0.035,
            divider: 2.0,
            perspective: 2.0,
        }
    }
}
