/// Per-corner radii for a rounded rectangle (logical pixels).
///
/// Corners follow CSS order: top-left, top-right, bottom-right, bottom-left.
/// Negative values are treated as zero by renderers.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    #[inline]
    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self { top_left, top_right, bottom_right, bottom_left }
    }

    /// Uniform radius on all four corners.
    #[inline]
    pub const fn all(r: f32) -> Self {
        Self::new(r, r, r, r)
    }

    /// Rounded top edge, square bottom edge.
    #[inline]
    pub const fn top(r: f32) -> Self {
        Self::new(r, r, 0.0, 0.0)
    }

    /// Square top edge, rounded bottom edge.
    #[inline]
    pub const fn bottom(r: f32) -> Self {
        Self::new(0.0, 0.0, r, r)
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::all(0.0)
    }

    #[inline]
    pub(crate) fn to_array(self) -> [f32; 4] {
        [
            self.top_left.max(0.0),
            self.top_right.max(0.0),
            self.bottom_right.max(0.0),
            self.bottom_left.max(0.0),
        ]
    }
}
