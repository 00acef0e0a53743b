//! Font loading and layout helpers shared by the text renderer.

mod font_system;

pub use font_system::{FontId, FontLoadError, FontSystem};

pub(crate) use font_system::{anchor_offset, ink_rect, PlacedGlyph};
