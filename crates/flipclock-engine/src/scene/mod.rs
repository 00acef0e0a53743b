//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic draw commands
//! - provide deterministic ordering (z-index + insertion order)
//! - scope clip rects and flip transforms over ranges of commands
//! - keep shape-specific helpers isolated per shape file under `scene::shapes`

mod cmd;
mod flip;
mod key;
mod list;

pub mod shapes;

pub use cmd::DrawCmd;
pub use flip::{FlapFace, FlipTransform};
pub use key::{SortKey, ZIndex};
pub use list::{DrawItem, DrawList};
pub use shapes::circle::CircleCmd;
pub use shapes::rounded_rect::RoundedRectCmd;
pub use shapes::text::{TextAnchor, TextCmd};
