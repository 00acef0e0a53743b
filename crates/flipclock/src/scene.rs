use flipclock_engine::coords::{CornerRadii, Rect, Vec2};
use flipclock_engine::paint::Color;
use flipclock_engine::scene::{DrawList, FlapFace, FlipTransform, TextAnchor};
use flipclock_engine::text::{FontId, FontLoadError, FontSystem};

use crate::display::FlipDisplay;
use crate::flip_unit::FlipFrame;
use crate::layout::ClockLayout;
use crate::painter::Painter;
use crate::theme::Theme;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Half {
    Top,
    Bottom,
}

/// Colors of one half-card; the flap darkens all of them together.
#[derive(Debug, Copy, Clone)]
struct HalfPaint {
    face: Color,
    digit: Color,
    divider: Color,
}

impl HalfPaint {
    fn of(theme: &Theme) -> Self {
        Self { face: theme.card, digit: theme.digit, divider: theme.background }
    }

    fn darkened(self, amount: f32) -> Self {
        Self {
            face: self.face.darkened(amount),
            digit: self.digit.darkened(amount),
            divider: self.divider.darkened(amount),
        }
    }
}

/// Owns the fonts and the per-frame draw list of the clock.
///
/// The fields are public so the application can hand `&mut draw_list` and
/// `&font_system` to the scene renderer as disjoint borrows.
///
/// ```rust,ignore
/// let mut scene = ClockScene::new();
/// scene.load_font(&font_bytes)?;
///
/// // every frame:
/// scene.paint(&display, &ClockLayout::compute(w, h), &theme);
/// renderer.render(rctx, target, &mut scene.draw_list, &scene.font_system);
/// ```
#[derive(Default)]
pub struct ClockScene {
    pub font_system: FontSystem,
    pub draw_list: DrawList,
    font: Option<FontId>,
}

impl ClockScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a font; the first one loaded is used for digits and the date.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let id = self.font_system.load_font(bytes)?;
        self.font.get_or_insert(id);
        Ok(id)
    }

    /// Font used for text, if any was loaded. Without one only the cards
    /// and separators are drawn.
    #[inline]
    pub fn font(&self) -> Option<FontId> {
        self.font
    }

    /// Rebuilds the draw list for the current display state.
    pub fn paint(&mut self, display: &FlipDisplay, layout: &ClockLayout, theme: &Theme) -> &mut DrawList {
        self.draw_list.clear();
        if layout.is_empty() {
            return &mut self.draw_list;
        }

        let font = self.font;
        let mut p = Painter::new(&mut self.draw_list);

        for (unit, card) in display.units().iter().zip(layout.cards) {
            paint_unit(&mut p, card, unit.frame(), font, theme);
        }

        for dot in layout.dots {
            p.fill_circle(dot, layout.dot_radius, theme.dots);
        }

        if let Some(font) = font {
            if !display.date_label().is_empty() {
                p.text(
                    display.date_label(),
                    font,
                    layout.date_font_size,
                    theme.date,
                    layout.date_center,
                    TextAnchor::Center,
                );
            }
        }

        &mut self.draw_list
    }
}

/// Backing plate, static halves, then the flap on top.
fn paint_unit(p: &mut Painter<'_>, card: Rect, frame: FlipFrame, font: Option<FontId>, theme: &Theme) {
    let radius = card.size.y * theme.corner_radius;
    let paint = HalfPaint::of(theme);

    p.fill_rounded_rect(card, CornerRadii::all(radius), theme.card);
    paint_half(p, card, Half::Top, frame.top, paint, font, theme);
    paint_half(p, card, Half::Bottom, frame.bottom, paint, font, theme);

    let Some(flap) = frame.flap else { return; };

    let hinge = card.center();
    let depth = card.size.y * theme.perspective;
    let half = match flap.face {
        FlapFace::Front => Half::Top,
        FlapFace::Back => Half::Bottom,
    };

    p.push_flip(FlipTransform::new(hinge, flap.angle, depth, flap.face));
    paint_half(p, card, half, flap.value, paint.darkened(flap.shade), font, theme);
    p.pop_flip();
}

/// One half of a card: rounded outer corners, the digit clipped to the half,
/// and a divider along the inner edge.
fn paint_half(
    p: &mut Painter<'_>,
    card: Rect,
    half: Half,
    value: char,
    paint: HalfPaint,
    font: Option<FontId>,
    theme: &Theme,
) {
    let radius = card.size.y * theme.corner_radius;
    let (region, radii) = match half {
        Half::Top => (card.top_half(), CornerRadii::top(radius)),
        Half::Bottom => (card.bottom_half(), CornerRadii::bottom(radius)),
    };

    p.fill_rounded_rect(region, radii, paint.face);

    if let Some(font) = font {
        let size = card.size.y * theme.digit_size;
        let center = card.center() - Vec2::new(0.0, size * theme.digit_lift);
        p.push_clip(region);
        p.text(value.to_string(), font, size, paint.digit, center, TextAnchor::Center);
        p.pop_clip();
    }

    let thickness = theme.divider.min(region.size.y);
    let divider_y = match half {
        Half::Top => region.max().y - thickness,
        Half::Bottom => region.origin.y,
    };
    p.fill_rect(Rect::new(region.origin.x, divider_y, region.size.x, thickness), paint.divider);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::ClockTime;
    use flipclock_engine::scene::DrawCmd;

    fn scene_with_font() -> ClockScene {
        ClockScene { font: Some(FontId::default()), ..ClockScene::new() }
    }

    fn texts(list: &DrawList) -> Vec<String> {
        list.items()
            .iter()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect()
    }

    fn flip_seconds(display: &mut FlipDisplay, second: &str) {
        display.apply(&ClockTime {
            hour: "00".into(),
            minute: "00".into(),
            second: second.into(),
            date_label: "Thursday, January 1, 2026".into(),
        });
    }

    #[test]
    fn resting_clock_draws_cards_and_dots() {
        let mut scene = scene_with_font();
        let display = FlipDisplay::new();
        let layout = ClockLayout::compute(1000.0, 700.0);
        let list = scene.paint(&display, &layout, &Theme::default());

        // Per card: plate, and per half a face, a digit and a divider.
        assert_eq!(list.len(), 6 * 7 + 4);
        assert_eq!(texts(list), vec!["0"; 12]);
        assert!(list.items().iter().all(|i| i.flip.is_none()));
        let circles = list.items().iter().filter(|i| matches!(i.cmd, DrawCmd::Circle(_))).count();
        assert_eq!(circles, 4);
    }

    #[test]
    fn first_half_flap_shows_old_top() {
        let mut scene = scene_with_font();
        let mut display = FlipDisplay::new();
        flip_seconds(&mut display, "01");
        display.advance(0.03);
        assert!(display.units()[5].progress() <= 90.0);

        let theme = Theme::default();
        let layout = ClockLayout::compute(1000.0, 700.0);
        let list = scene.paint(&display, &layout, &theme);

        let flapped: Vec<_> = list.items().iter().filter(|i| i.flip.is_some()).collect();
        assert_eq!(flapped.len(), 3);
        let flip = flapped[0].flip.unwrap();
        assert_eq!(flip.face, FlapFace::Front);
        assert_eq!(flip.pivot, layout.cards[5].center());
        assert_eq!(flapped[1].clip_rect, Some(layout.cards[5].top_half()));
        match &flapped[1].cmd {
            DrawCmd::Text(t) => assert_eq!(t.text, "0"),
            other => panic!("expected flap digit, got {other:?}"),
        }
        // Shaded face.
        match &flapped[0].cmd {
            DrawCmd::RoundedRect(r) => assert!(r.color.r < theme.card.r),
            other => panic!("expected flap face, got {other:?}"),
        }

        // Static bottom half still shows the old digit.
        let digits = texts(list);
        assert_eq!(&digits[10..12], &["1", "0"]);
    }

    #[test]
    fn second_half_flap_shows_new_bottom() {
        let mut scene = scene_with_font();
        let mut display = FlipDisplay::new();
        flip_seconds(&mut display, "01");
        while display.units()[5].progress() <= 90.0 {
            display.advance(1.0 / 240.0);
        }
        assert!(display.is_animating());

        let layout = ClockLayout::compute(1000.0, 700.0);
        let list = scene.paint(&display, &layout, &Theme::default());
        let flapped: Vec<_> = list.items().iter().filter(|i| i.flip.is_some()).collect();
        assert_eq!(flapped[0].flip.map(|f| f.face), Some(FlapFace::Back));
        assert_eq!(flapped[1].clip_rect, Some(layout.cards[5].bottom_half()));
        assert!(texts(list).iter().skip(10).take(3).all(|d| d == "1"));
    }

    #[test]
    fn without_font_only_shapes_are_drawn() {
        let mut scene = ClockScene::new();
        assert!(scene.font().is_none());
        let mut display = FlipDisplay::new();
        flip_seconds(&mut display, "05");
        let list = scene.paint(&display, &ClockLayout::compute(800.0, 600.0), &Theme::default());
        assert!(texts(list).is_empty());
        assert!(!list.is_empty());
    }

    #[test]
    fn empty_layout_draws_nothing() {
        let mut scene = scene_with_font();
        let list = scene.paint(&FlipDisplay::new(), &ClockLayout::compute(10.0, 10.0), &Theme::default());
        assert!(list.is_empty());
    }

    #[test]
    fn dividers_use_background_at_split() {
        let mut scene = ClockScene::new();
        let theme = Theme::default();
        let layout = ClockLayout::compute(1000.0, 700.0);
        let list = scene.paint(&FlipDisplay::new(), &layout, &theme);
        let split = layout.cards[0].center().y;

        let dividers: Vec<Rect> = list
            .items()
            .iter()
            .filter_map(|i| match &i.cmd {
                DrawCmd::RoundedRect(r) if r.color == theme.background => Some(r.rect),
                _ => None,
            })
            .collect();
        assert_eq!(dividers.len(), 12);
        assert!((dividers[0].max().y - split).abs() < 1e-3);
        assert!((dividers[1].origin.y - split).abs() < 1e-3);
    }
}
