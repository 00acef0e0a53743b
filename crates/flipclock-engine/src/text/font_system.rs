use std::fmt;

use fontdue::layout::{GlyphRasterConfig, Layout, LayoutSettings, TextStyle};

use crate::coords::{Rect, Vec2};
use crate::scene::TextAnchor;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
///
/// The default id refers to the first font loaded.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct FontId(pub(crate) usize);

/// A rasterizable glyph positioned by a layout pass, in the layout's pixel space.
#[derive(Debug, Copy, Clone)]
pub(crate) struct PlacedGlyph {
    pub key: GlyphRasterConfig,
    pub bounds: Rect,
}

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading. The system is owned by the application
/// and handed to the scene renderer each frame so new glyphs can be rasterized
/// on demand.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("loaded font {:?} ({} glyphs)", id, self.fonts[id.0].glyph_count());
        Ok(id)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Lays out `text` at `px` pixels and appends its rasterizable glyphs to `out`.
    ///
    /// Returns the font on success so callers can rasterize the glyph keys.
    pub(crate) fn lay_out(
        &self,
        layout: &mut Layout<()>,
        text: &str,
        id: FontId,
        px: f32,
        out: &mut Vec<PlacedGlyph>,
    ) -> Option<&fontdue::Font> {
        let font = self.get(id)?;

        layout.reset(&LayoutSettings::default());
        layout.append(&[font], &TextStyle::new(text, px, 0));

        out.extend(
            layout
                .glyphs()
                .iter()
                .filter(|g| g.char_data.rasterize() && g.width > 0 && g.height > 0)
                .map(|g| PlacedGlyph {
                    key: g.key,
                    bounds: Rect::new(g.x, g.y, g.width as f32, g.height as f32),
                }),
        );
        Some(font)
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Union of glyph bitmap rects.
pub(crate) fn ink_rect(glyphs: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    glyphs
        .into_iter()
        .map(|r| (r.origin, r.max()))
        .reduce(|(min_a, max_a), (min_b, max_b)| {
            (
                Vec2::new(min_a.x.min(min_b.x), min_a.y.min(min_b.y)),
                Vec2::new(max_a.x.max(max_b.x), max_a.y.max(max_b.y)),
            )
        })
        .map(|(min, max)| Rect::new(min.x, min.y, max.x - min.x, max.y - min.y))
}

/// Offset added to laid-out glyph positions so that `anchor` lands on the origin.
pub(crate) fn anchor_offset(anchor: TextAnchor, ink: Option<Rect>) -> Vec2 {
    match (anchor, ink) {
        (TextAnchor::Center, Some(ink)) => Vec2::zero() - ink.center(),
        _ => Vec2::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ink_rect_unions_glyph_bitmaps() {
        let ink = ink_rect([
            Rect::new(0.0, 4.0, 10.0, 20.0),
            Rect::new(12.0, 2.0, 8.0, 18.0),
        ]);
        assert_eq!(ink, Some(Rect::new(0.0, 2.0, 20.0, 22.0)));
    }

    #[test]
    fn ink_rect_of_nothing_is_none() {
        assert_eq!(ink_rect(std::iter::empty()), None);
    }

    #[test]
    fn center_anchor_moves_ink_center_to_origin() {
        let ink = Rect::new(2.0, 6.0, 20.0, 30.0);
        let off = anchor_offset(TextAnchor::Center, Some(ink));
        assert_eq!(ink.center() + off, Vec2::zero());
    }

    #[test]
    fn top_left_anchor_keeps_layout_position() {
        let ink = Some(Rect::new(2.0, 6.0, 20.0, 30.0));
        assert_eq!(anchor_offset(TextAnchor::TopLeft, ink), Vec2::zero());
        assert_eq!(anchor_offset(TextAnchor::Center, None), Vec2::zero());
    }

    #[test]
    fn unknown_font_lays_out_nothing() {
        let fonts = FontSystem::new();
        assert!(fonts.is_empty());
        let mut layout = Layout::new(fontdue::layout::CoordinateSystem::PositiveYDown);
        let mut glyphs = Vec::new();
        assert!(fonts.lay_out(&mut layout, "12", FontId::default(), 40.0, &mut glyphs).is_none());
        assert!(glyphs.is_empty());
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        let mut fonts = FontSystem::new();
        let err = fonts.load_font(b"not a font").unwrap_err();
        assert!(err.to_string().starts_with("font load error"));
    }
}
