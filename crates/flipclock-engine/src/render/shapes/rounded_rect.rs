use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::render::RenderCtx;
use crate::scene::{DrawItem, RoundedRectCmd};

use super::common::{
    create_quad_pipeline, pack_clip, pack_flip, viewport_bgl_entry, InstanceBuffer, SharedBuffers,
};

/// Renderer for `DrawCmd::RoundedRect`.
///
/// Coverage comes from a signed-distance function evaluated in the item's
/// local space, so edges stay antialiased while a flap is foreshortened.
pub(crate) struct RoundedRectRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,

    instances: Vec<RoundedRectInstance>,
    instance_buffer: InstanceBuffer,
}

impl Default for RoundedRectRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group: None,
            instances: Vec::new(),
            instance_buffer: InstanceBuffer::new("flipclock rounded_rect instance vbo"),
        }
    }
}

impl RoundedRectRenderer {
    /// Ensures GPU state for the surface format and drops last frame's instances.
    pub(crate) fn prepare(&mut self, ctx: &RenderCtx<'_>, shared: &SharedBuffers) {
        self.instances.clear();

        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flipclock rounded_rect bgl"),
            entries: &[viewport_bgl_entry()],
        });

        let pipeline = create_quad_pipeline(
            ctx,
            "rounded_rect",
            concat!(include_str!("shaders/common.wgsl"), include_str!("shaders/rounded_rect.wgsl")),
            &bgl,
            RoundedRectInstance::layout(),
        );

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("flipclock rounded_rect bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shared.viewport_ubo.as_entire_binding(),
            }],
        }));
        self.pipeline = Some(pipeline);
        self.pipeline_format = Some(ctx.surface_format);
    }

    /// Number of instances collected so far this frame.
    #[inline]
    pub(crate) fn len(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Appends an instance for `cmd`; empty, non-finite or fully clipped shapes are skipped.
    pub(crate) fn push(&mut self, item: &DrawItem, cmd: &RoundedRectCmd) {
        let r = cmd.rect.normalized();
        if r.is_empty() || !r.is_finite() || !cmd.color.is_finite() {
            return;
        }
        let Some(clip) = pack_clip(item.clip_rect) else { return; };

        self.instances.push(RoundedRectInstance {
            origin: r.origin.to_array(),
            size: r.size.to_array(),
            radii: cmd.radii.to_array(),
            color: cmd.color.to_array(),
            clip,
            flip: pack_flip(item.flip),
        });
    }

    pub(crate) fn upload(&mut self, ctx: &RenderCtx<'_>) {
        self.instance_buffer.upload(ctx, &self.instances);
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, shared: &SharedBuffers, range: Range<u32>) {
        let Some(pipeline)   = self.pipeline.as_ref()         else { return; };
        let Some(bind_group) = self.bind_group.as_ref()       else { return; };
        let Some(instances)  = self.instance_buffer.buffer()  else { return; };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        shared.bind_quad(rpass);
        rpass.set_vertex_buffer(1, instances.slice(..));
        rpass.draw_indexed(0..6, 0, range);
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (88 bytes):
///
///  offset  0  origin  [f32; 2]   loc 1
///  offset  8  size    [f32; 2]   loc 2
///  offset 16  radii   [f32; 4]   loc 3  (tl, tr, br, bl)
///  offset 32  color   [f32; 4]   loc 4
///  offset 48  clip    [f32; 4]   loc 5  (x0, y0, x1, y1)
///  offset 64  flip    [f32; 4]   loc 6  (pivot.x, pivot.y, rotation, depth)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct RoundedRectInstance {
    origin: [f32; 2],
    size: [f32; 2],
    radii: [f32; 4],
    color: [f32; 4],
    clip: [f32; 4],
    flip: [f32; 4],
}

impl RoundedRectInstance {
    const ATTRS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4, // radii
        4 => Float32x4, // color
        5 => Float32x4, // clip
        6 => Float32x4  // flip
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RoundedRectInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
