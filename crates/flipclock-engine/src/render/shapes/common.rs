//! Shared GPU types and utilities used by all shape renderers.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::{Rect, Viewport};
use crate::render::RenderCtx;
use crate::scene::FlipTransform;

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

/// Layout entry for the viewport uniform at `@group(0) @binding(0)`.
pub(super) fn viewport_bgl_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<ViewportUniform>() as u64),
        },
        count: None,
    }
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── shared buffers ────────────────────────────────────────────────────────

/// Unit quad and viewport uniform shared by every shape pipeline.
pub(crate) struct SharedBuffers {
    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
    pub(super) viewport_ubo: wgpu::Buffer,
}

impl SharedBuffers {
    pub(crate) fn new(device: &wgpu::Device) -> Self {
        Self {
            quad_vbo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("flipclock quad vbo"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            quad_ibo: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("flipclock quad ibo"),
                contents: bytemuck::cast_slice(&QUAD_INDICES),
                usage: wgpu::BufferUsages::INDEX,
            }),
            viewport_ubo: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("flipclock viewport ubo"),
                size: std::mem::size_of::<ViewportUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
        }
    }

    pub(crate) fn write_viewport(&self, queue: &wgpu::Queue, viewport: Viewport) {
        queue.write_buffer(
            &self.viewport_ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform { viewport: viewport.to_uniform(), _pad: [0.0; 2] }),
        );
    }

    /// Binds the quad geometry; callers bind their instance buffer at slot 1.
    pub(super) fn bind_quad(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
    }
}

// ── instance buffer ───────────────────────────────────────────────────────

/// Growable per-frame instance buffer.
pub(super) struct InstanceBuffer {
    label: &'static str,
    buffer: Option<wgpu::Buffer>,
    capacity: usize,
}

impl InstanceBuffer {
    pub(super) const fn new(label: &'static str) -> Self {
        Self { label, buffer: None, capacity: 0 }
    }

    /// Writes `data` at offset zero, growing the buffer to the next power of two first.
    pub(super) fn upload<T: Pod>(&mut self, ctx: &RenderCtx<'_>, data: &[T]) {
        if data.is_empty() {
            return;
        }
        if data.len() > self.capacity || self.buffer.is_none() {
            let new_cap = data.len().next_power_of_two().max(64);
            self.buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.label),
                size: (new_cap * std::mem::size_of::<T>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = new_cap;
        }
        if let Some(buffer) = self.buffer.as_ref() {
            ctx.queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
        }
    }

    #[inline]
    pub(super) fn buffer(&self) -> Option<&wgpu::Buffer> {
        self.buffer.as_ref()
    }
}

// ── pipeline ──────────────────────────────────────────────────────────────

/// Builds an instanced quad pipeline with premultiplied-alpha blending.
pub(super) fn create_quad_pipeline(
    ctx: &RenderCtx<'_>,
    name: &str,
    source: &'static str,
    bind_group_layout: &wgpu::BindGroupLayout,
    instance_layout: wgpu::VertexBufferLayout<'static>,
) -> wgpu::RenderPipeline {
    let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("flipclock {name} shader")),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("flipclock {name} pipeline layout")),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("flipclock {name} pipeline")),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[QuadVertex::layout(), instance_layout],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: ctx.surface_format,
                blend: Some(premul_alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

// ── instance packing ──────────────────────────────────────────────────────

/// Clip used for unclipped items; far outside any realistic window.
const NO_CLIP: [f32; 4] = [-1.0e9, -1.0e9, 1.0e9, 1.0e9];

/// Packs a local-space clip rect as `(x0, y0, x1, y1)`.
///
/// Returns `None` when the clip is empty and the item should not be drawn.
pub(super) fn pack_clip(clip: Option<Rect>) -> Option<[f32; 4]> {
    match clip {
        None => Some(NO_CLIP),
        Some(r) => {
            let r = r.normalized();
            if r.is_empty() || !r.is_finite() {
                None
            } else {
                let max = r.max();
                Some([r.origin.x, r.origin.y, max.x, max.y])
            }
        }
    }
}

/// Packs a flip transform; all zeros means drawn flat.
pub(super) fn pack_flip(flip: Option<FlipTransform>) -> [f32; 4] {
    flip.map_or([0.0; 4], FlipTransform::to_gpu)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::scene::FlapFace;

    #[test]
    fn unclipped_items_get_the_open_clip() {
        assert_eq!(pack_clip(None), Some(NO_CLIP));
    }

    #[test]
    fn clip_is_packed_as_corners() {
        assert_eq!(pack_clip(Some(Rect::new(10.0, 20.0, 30.0, 40.0))), Some([10.0, 20.0, 40.0, 60.0]));
    }

    #[test]
    fn empty_clip_skips_item() {
        assert_eq!(pack_clip(Some(Rect::new(10.0, 20.0, 0.0, 40.0))), None);
    }

    #[test]
    fn flat_items_have_zero_flip() {
        assert_eq!(pack_flip(None), [0.0; 4]);
        let flip = FlipTransform::new(Vec2::new(1.0, 2.0), 180.0, 50.0, FlapFace::Back);
        assert_eq!(pack_flip(Some(flip)), [1.0, 2.0, 0.0, 50.0]);
    }
}
