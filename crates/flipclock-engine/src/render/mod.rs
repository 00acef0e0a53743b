//! GPU rendering subsystem.
//!
//! [`SceneRenderer`] consumes a `scene` draw stream and issues GPU commands via
//! wgpu. Shape renderers own their pipelines and instance buffers; the scene
//! renderer walks the draw list once, batches consecutive items of the same
//! shape and replays the batches in paint order inside a single render pass.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shaders apply the item's flip transform, then convert to NDC
//!   using a viewport uniform.

mod ctx;
mod scene;
mod shapes;

pub use ctx::{RenderCtx, RenderTarget};
pub use scene::SceneRenderer;
