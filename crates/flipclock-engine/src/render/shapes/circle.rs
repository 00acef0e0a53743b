use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::render::RenderCtx;
use crate::scene::{CircleCmd, DrawItem};

use super::common::{
    create_quad_pipeline, pack_clip, pack_flip, viewport_bgl_entry, InstanceBuffer, SharedBuffers,
};

/// Renderer for `DrawCmd::Circle` (filled, antialiased).
pub(crate) struct CircleRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,

    instances: Vec<CircleInstance>,
    instance_buffer: InstanceBuffer,
}

impl Default for CircleRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group: None,
            instances: Vec::new(),
            instance_buffer: InstanceBuffer::new("flipclock circle instance vbo"),
        }
    }
}

impl CircleRenderer {
    pub(crate) fn prepare(&mut self, ctx: &RenderCtx<'_>, shared: &SharedBuffers) {
        self.instances.clear();

        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flipclock circle bgl"),
            entries: &[viewport_bgl_entry()],
        });

        let pipeline = create_quad_pipeline(
            ctx,
            "circle",
            concat!(include_str!("shaders/common.wgsl"), include_str!("shaders/circle.wgsl")),
            &bgl,
            CircleInstance::layout(),
        );

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("flipclock circle bind group"),
            layout: &bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shared.viewport_ubo.as_entire_binding(),
            }],
        }));
        self.pipeline = Some(pipeline);
        self.pipeline_format = Some(ctx.surface_format);
    }

    #[inline]
    pub(crate) fn len(&self) -> u32 {
        self.instances.len() as u32
    }

    pub(crate) fn push(&mut self, item: &DrawItem, cmd: &CircleCmd) {
        if cmd.radius <= 0.0 || !cmd.radius.is_finite() || !cmd.center.is_finite() {
            return;
        }
        let Some(clip) = pack_clip(item.clip_rect) else { return; };

        self.instances.push(CircleInstance {
            center: cmd.center.to_array(),
            radius: [cmd.radius, 0.0],
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

/// Instance data layout (64 bytes):
///
///  offset  0  center  [f32; 2]   loc 1
///  offset  8  radius  [f32; 2]   loc 2  (.x = radius)
///  offset 16  color   [f32; 4]   loc 3
///  offset 32  clip    [f32; 4]   loc 4
///  offset 48  flip    [f32; 4]   loc 5
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CircleInstance {
    center: [f32; 2],
    radius: [f32; 2],
    color: [f32; 4],
    clip: [f32; 4],
    flip: [f32; 4],
}

impl CircleInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2, // center
        2 => Float32x2, // radius
        3 => Float32x4, // color
        4 => Float32x4, // clip
        5 => Float32x4  // flip
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CircleInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
