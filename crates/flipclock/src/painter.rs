use flipclock_engine::coords::{CornerRadii, Rect, Vec2};
use flipclock_engine::paint::Color;
use flipclock_engine::scene::{DrawList, FlipTransform, TextAnchor, ZIndex};
use flipclock_engine::text::FontId;

/// Drawing surface used by [`ClockScene`](crate::scene::ClockScene).
///
/// Wraps the engine's `DrawList` and hands out increasing z-indices, so
/// later calls paint over earlier ones regardless of shape.
pub struct Painter<'a> {
    draw_list: &'a mut DrawList,
    z: i32,
}

impl<'a> Painter<'a> {
    pub fn new(draw_list: &'a mut DrawList) -> Self {
        Self { draw_list, z: 0 }
    }

    // ── drawing ───────────────────────────────────────────────────────────

    /// Solid axis-aligned rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let z = self.next_z();
        self.draw_list.push_rect(z, rect, color);
    }

    /// Rounded rectangle with per-corner radii.
    pub fn fill_rounded_rect(&mut self, rect: Rect, radii: CornerRadii, color: Color) {
        let z = self.next_z();
        self.draw_list.push_rounded_rect(z, rect, radii, color);
    }

    pub fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let z = self.next_z();
        self.draw_list.push_circle(z, center, radius, color);
    }

    /// Text positioned by `anchor` relative to `origin`.
    pub fn text(
        &mut self,
        text: impl Into<String>,
        font: FontId,
        size: f32,
        color: Color,
        origin: Vec2,
        anchor: TextAnchor,
    ) {
        let z = self.next_z();
        self.draw_list.push_text(z, text, font, size, color, origin, anchor);
    }

    // ── scopes ────────────────────────────────────────────────────────────

    /// Begin a clip region. Must be paired with [`pop_clip`](Self::pop_clip).
    pub fn push_clip(&mut self, rect: Rect) {
        self.draw_list.push_clip(rect);
    }

    pub fn pop_clip(&mut self) {
        self.draw_list.pop_clip();
    }

    /// Begin a flip scope. Must be paired with [`pop_flip`](Self::pop_flip).
    pub fn push_flip(&mut self, flip: FlipTransform) {
        self.draw_list.push_flip(flip);
    }

    pub fn pop_flip(&mut self) {
        self.draw_list.pop_flip();
    }

    // ── internal ──────────────────────────────────────────────────────────

    #[inline]
    fn next_z(&mut self) -> ZIndex {
        let z = ZIndex::new(self.z);
        self.z += 1;
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipclock_engine::scene::FlapFace;

    #[test]
    fn z_increases_per_call() {
        let mut list = DrawList::new();
        {
            let mut p = Painter::new(&mut list);
            p.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::white());
            p.fill_circle(Vec2::new(2.0, 2.0), 1.0, Color::white());
            p.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::white());
        }
        let zs: Vec<i32> = list.items().iter().map(|i| i.key.z.0).collect();
        assert_eq!(zs, vec![0, 1, 2]);
    }

    #[test]
    fn scopes_reach_the_draw_list() {
        let mut list = DrawList::new();
        let clip = Rect::new(0.0, 0.0, 10.0, 5.0);
        let flip = FlipTransform::new(Vec2::new(5.0, 5.0), 30.0, 20.0, FlapFace::Front);
        {
            let mut p = Painter::new(&mut list);
            p.push_flip(flip);
            p.push_clip(clip);
            p.fill_rect(clip, Color::white());
            p.pop_clip();
            p.pop_flip();
            p.fill_rect(clip, Color::white());
        }
        let items = list.items();
        assert_eq!((items[0].clip_rect, items[0].flip), (Some(clip), Some(flip)));
        assert_eq!((items[1].clip_rect, items[1].flip), (None, None));
    }
}
