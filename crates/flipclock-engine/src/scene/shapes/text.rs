use crate::coords::Vec2;
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList, ZIndex};
use crate::text::FontId;

/// How [`TextCmd::origin`] relates to the laid-out text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum TextAnchor {
    /// `origin` is the top-left of the text block.
    #[default]
    TopLeft,
    /// `origin` is the center of the glyphs' ink bounds.
    Center,
}

/// Text draw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCmd {
    pub text: String,
    pub font: FontId,
    /// Font size in logical pixels.
    pub size: f32,
    pub color: Color,
    pub origin: Vec2,
    pub anchor: TextAnchor,
}

impl DrawList {
    /// Records a text draw command.
    pub fn push_text(
        &mut self,
        z: ZIndex,
        text: impl Into<String>,
        font: FontId,
        size: f32,
        color: Color,
        origin: Vec2,
        anchor: TextAnchor,
    ) {
        self.push(z, DrawCmd::Text(TextCmd {
            text: text.into(),
            font,
            size,
            color,
            origin,
            anchor,
        }));
    }
}
