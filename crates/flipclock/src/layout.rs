//! Responsive card geometry.
//!
//! Everything is derived from the viewport size on each frame; nothing is
//! stored between frames.

use flipclock_engine::coords::{Rect, Vec2};

use crate::display::SLOT_COUNT;

/// Side margin as a fraction of the viewport width.
pub const SIDE_MARGIN: f32 = 0.1;
/// Fixed vertical margin, in logical pixels.
pub const VERTICAL_MARGIN: f32 = 60.0;
/// Share of the available height the cards may use; the rest is for the date.
pub const HEIGHT_SHARE: f32 = 0.75;
/// Card width / card height.
pub const CARD_ASPECT: f32 = 0.6;
/// Gap between the two digits of a pair, in card widths.
pub const SMALL_GAP: f32 = 0.05;
/// Gap between digit pairs, in card widths.
pub const LARGE_GAP: f32 = 0.3;
/// Row width in card widths: 6 cards, 3 small gaps, 2 large gaps.
pub const ROW_FACTOR: f32 = SLOT_COUNT as f32 + 3.0 * SMALL_GAP + 2.0 * LARGE_GAP;

const DOT_DIAMETER: f32 = 0.12;
const DOT_SPACING: f32 = 0.2;
const DATE_FONT: f32 = 0.12;

/// Geometry of one frame, in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockLayout {
    pub card_width: f32,
    pub card_height: f32,
    pub small_gap: f32,
    pub large_gap: f32,
    /// Card rects in slot order.
    pub cards: [Rect; SLOT_COUNT],
    /// Separator dot centers: upper and lower dot of the H:M gap, then of the M:S gap.
    pub dots: [Vec2; 4],
    pub dot_radius: f32,
    pub date_center: Vec2,
    pub date_font_size: f32,
}

impl ClockLayout {
    /// Lays out the clock in a `width` × `height` viewport.
    ///
    /// Degenerate viewports (zero, negative or non-finite) collapse the cards
    /// to zero size instead of producing negative geometry.
    pub fn compute(width: f32, height: f32) -> Self {
        let width = non_negative(width);
        let height = non_negative(height);

        let available_w = width * (1.0 - 2.0 * SIDE_MARGIN);
        let available_h = height - VERTICAL_MARGIN;

        let from_width = available_w / ROW_FACTOR;
        let from_height = available_h * HEIGHT_SHARE * CARD_ASPECT;
        let card_width = from_width.min(from_height).max(0.0);
        let card_height = card_width / CARD_ASPECT;

        let small_gap = card_width * SMALL_GAP;
        let large_gap = card_width * LARGE_GAP;

        let row_width = card_width * ROW_FACTOR;
        let center_y = height * 0.5;
        let top = center_y - card_height * 0.5;

        let mut cards = [Rect::default(); SLOT_COUNT];
        let mut x = (width - row_width) * 0.5;
        for (i, card) in cards.iter_mut().enumerate() {
            *card = Rect::new(x, top, card_width, card_height);
            x += card_width + if i % 2 == 0 { small_gap } else { large_gap };
        }

        let dot_radius = card_width * DOT_DIAMETER * 0.5;
        let dot_offset = card_height * DOT_SPACING * 0.5 + dot_radius;
        let gap_centers = [
            cards[1].max().x + large_gap * 0.5,
            cards[3].max().x + large_gap * 0.5,
        ];
        let dots = [
            Vec2::new(gap_centers[0], center_y - dot_offset),
            Vec2::new(gap_centers[0], center_y + dot_offset),
            Vec2::new(gap_centers[1], center_y - dot_offset),
            Vec2::new(gap_centers[1], center_y + dot_offset),
        ];

        let date_center = Vec2::new(
            width * 0.5,
            center_y + card_height * 0.5 + (height - card_height) * 0.25,
        );

        Self {
            card_width,
            card_height,
            small_gap,
            large_gap,
            cards,
            dots,
            dot_radius,
            date_center,
            date_font_size: card_height * DATE_FONT,
        }
    }

    /// Total width of the card row.
    #[inline]
    pub fn row_width(&self) -> f32 {
        SLOT_COUNT as f32 * self.card_width + 3.0 * self.small_gap + 2.0 * self.large_gap
    }

    /// `true` when the viewport leaves no room for cards.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.card_width <= 0.0
    }
}

#[inline]
fn non_negative(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn reference_window() {
        let l = ClockLayout::compute(1000.0, 700.0);
        // 800 / 6.75 against 0.75 * 640 * 0.6 = 288.
        assert!((l.card_width - 800.0 / 6.75).abs() < EPS, "{}", l.card_width);
        assert!((l.card_width - 118.518).abs() < EPS);
        assert!((l.card_height - l.card_width / 0.6).abs() < EPS);
        assert!((l.cards[0].origin.x - 100.0).abs() < EPS);
        assert!((l.cards[5].max().x - 900.0).abs() < EPS);
        assert!((l.date_font_size - l.card_height * 0.12).abs() < EPS);
    }

    #[test]
    fn short_wide_window_is_height_bound() {
        let l = ClockLayout::compute(3000.0, 400.0);
        assert!((l.card_width - 0.75 * 340.0 * 0.6).abs() < EPS);
        assert!(l.row_width() < 2400.0);
        // Row stays centered.
        let left = l.cards[0].origin.x;
        let right = 3000.0 - l.cards[5].max().x;
        assert!((left - right).abs() < EPS);
    }

    #[test]
    fn gaps_alternate_small_and_large() {
        let l = ClockLayout::compute(1000.0, 700.0);
        let gaps: Vec<f32> = l.cards.windows(2).map(|w| w[1].origin.x - w[0].max().x).collect();
        let expected = [l.small_gap, l.large_gap, l.small_gap, l.large_gap, l.small_gap];
        for (g, e) in gaps.iter().zip(expected) {
            assert!((g - e).abs() < EPS, "{gaps:?}");
        }
    }

    #[test]
    fn dots_sit_inside_large_gaps() {
        let l = ClockLayout::compute(1000.0, 700.0);
        assert!((l.dot_radius * 2.0 - l.card_width * 0.12).abs() < EPS);
        for (pair, card) in [(0, 1), (2, 3)] {
            let gap_left = l.cards[card].max().x;
            for dot in &l.dots[pair * 2..pair * 2 + 2] {
                assert!(dot.x - l.dot_radius >= gap_left);
                assert!(dot.x + l.dot_radius <= gap_left + l.large_gap);
            }
            let spacing = l.dots[pair * 2 + 1].y - l.dots[pair * 2].y - 2.0 * l.dot_radius;
            assert!((spacing - l.card_height * 0.2).abs() < EPS);
        }
    }

    #[test]
    fn date_sits_below_cards() {
        let l = ClockLayout::compute(1000.0, 700.0);
        assert!((l.date_center.x - 500.0).abs() < EPS);
        assert!(l.date_center.y > l.cards[0].max().y);
        assert!(l.date_center.y < 700.0);
    }

    #[test]
    fn degenerate_viewports_collapse() {
        for (w, h) in [(0.0, 0.0), (-50.0, 300.0), (800.0, 40.0), (f32::NAN, 500.0), (600.0, f32::INFINITY)] {
            let l = ClockLayout::compute(w, h);
            assert_eq!(l.card_width, 0.0, "{w}x{h}");
            assert_eq!(l.card_height, 0.0);
            assert!(l.is_empty());
            assert!(l.cards.iter().all(|r| r.is_finite()));
            assert!(l.date_center.is_finite());
        }
    }

    proptest! {
        #[test]
        fn cards_fit_and_keep_aspect(w in 100.0f32..8000.0, h in 100.0f32..8000.0) {
            let l = ClockLayout::compute(w, h);
            prop_assert!(l.card_width > 0.0);
            let tol = w * 1e-5;
            prop_assert!(l.row_width() <= 0.8 * w + tol);
            prop_assert!(l.card_height <= h);
            prop_assert!((l.card_width / l.card_height - CARD_ASPECT).abs() < 1e-5);
            prop_assert!(l.cards[0].origin.x >= 0.1 * w - tol);
            prop_assert!(l.cards[5].max().x <= 0.9 * w + tol);
        }

        #[test]
        fn never_negative(w in -1000.0f32..8000.0, h in -1000.0f32..8000.0) {
            let l = ClockLayout::compute(w, h);
            prop_assert!(l.card_width >= 0.0);
            prop_assert!(l.card_height >= 0.0);
            prop_assert!(l.dot_radius >= 0.0);
            prop_assert!(l.date_font_size >= 0.0);
        }
    }
}
