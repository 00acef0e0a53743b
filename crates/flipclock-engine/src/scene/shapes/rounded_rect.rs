use crate::coords::{CornerRadii, Rect};
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};

/// Rounded rectangle draw payload. Zero radii give a plain rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundedRectCmd {
    pub rect: Rect,
    pub radii: CornerRadii,
    pub color: Color,
}

impl DrawList {
    /// Records a rounded rectangle with per-corner radii.
    #[inline]
    pub fn push_rounded_rect(&mut self, z: ZIndex, rect: Rect, radii: CornerRadii, color: Color) {
        self.push(z, DrawCmd::RoundedRect(RoundedRectCmd { rect, radii, color }));
    }

    /// Records a sharp-cornered rectangle.
    #[inline]
    pub fn push_rect(&mut self, z: ZIndex, rect: Rect, color: Color) {
        self.push_rounded_rect(z, rect, CornerRadii::zero(), color);
    }
}
