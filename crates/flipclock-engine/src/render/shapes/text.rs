use std::collections::HashMap;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout};

use crate::render::RenderCtx;
use crate::scene::{DrawItem, TextCmd};
use crate::text::{anchor_offset, ink_rect, FontSystem, PlacedGlyph};

use super::common::{
    create_quad_pipeline, pack_clip, pack_flip, viewport_bgl_entry, InstanceBuffer, SharedBuffers,
};

// ── atlas constants ────────────────────────────────────────────────────────

const ATLAS_SIZE: u32 = 2048;
const GLYPH_PADDING: u32 = 1; // pixels between glyphs in the atlas

struct CachedGlyph {
    uv_min: [f32; 2],
    uv_max: [f32; 2],
}

/// Rasterization scale for a window scale factor, quantized to quarter steps
/// so small DPI jitter does not thrash the glyph cache.
fn raster_scale(scale_factor: f32) -> f32 {
    if !scale_factor.is_finite() {
        return 1.0;
    }
    ((scale_factor * 4.0).round() / 4.0).max(0.25)
}

/// Renderer for `DrawCmd::Text`.
///
/// Maintains a 2048 × 2048 R8Unorm glyph atlas. Glyphs are rasterized at the
/// window's scale factor on first use via fontdue and cached, keyed by
/// `fontdue::layout::GlyphRasterConfig` (font, glyph index and pixel size).
///
/// When the atlas runs out of space the glyphs that did not fit are skipped
/// for that frame, and the atlas is cleared and repopulated on the next one.
pub(crate) struct TextRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group: Option<wgpu::BindGroup>,

    atlas_texture: Option<wgpu::Texture>,
    atlas_cursor_x: u32,
    atlas_cursor_y: u32,
    atlas_row_height: u32,
    atlas_full: bool,
    glyph_cache: HashMap<GlyphRasterConfig, CachedGlyph>,

    instances: Vec<GlyphInstance>,
    instance_buffer: InstanceBuffer,

    // reusable scratch
    layout: Layout<()>,
    placed: Vec<PlacedGlyph>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group: None,
            atlas_texture: None,
            atlas_cursor_x: GLYPH_PADDING,
            atlas_cursor_y: GLYPH_PADDING,
            atlas_row_height: 0,
            atlas_full: false,
            glyph_cache: HashMap::new(),
            instances: Vec::new(),
            instance_buffer: InstanceBuffer::new("flipclock text instance vbo"),
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            placed: Vec::new(),
        }
    }
}

impl TextRenderer {
    pub(crate) fn prepare(&mut self, ctx: &RenderCtx<'_>, shared: &SharedBuffers) {
        self.instances.clear();

        if self.atlas_full {
            log::info!(
                "glyph atlas full; resetting ({} cached glyphs dropped)",
                self.glyph_cache.len()
            );
            self.reset_atlas();
        }

        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let texture = self.atlas_texture.get_or_insert_with(|| {
            ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("flipclock text atlas"),
                size: wgpu::Extent3d {
                    width: ATLAS_SIZE,
                    height: ATLAS_SIZE,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::R8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            })
        });
        let atlas_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("flipclock text sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("flipclock text bgl"),
            entries: &[
                viewport_bgl_entry(),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = create_quad_pipeline(
            ctx,
            "text",
            concat!(include_str!("shaders/common.wgsl"), include_str!("shaders/text.wgsl")),
            &bgl,
            GlyphInstance::layout(),
        );

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("flipclock text bind group"),
            layout: &bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: shared.viewport_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        }));
        self.pipeline = Some(pipeline);
        self.pipeline_format = Some(ctx.surface_format);
    }

    #[inline]
    pub(crate) fn len(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Lays out `cmd`, rasterizing any glyphs not yet in the atlas, and appends
    /// one instance per visible glyph.
    pub(crate) fn push(&mut self, ctx: &RenderCtx<'_>, item: &DrawItem, cmd: &TextCmd, fonts: &FontSystem) {
        if cmd.text.is_empty() || cmd.size <= 0.0 || !cmd.size.is_finite() || !cmd.origin.is_finite() {
            return;
        }
        let Some(clip) = pack_clip(item.clip_rect) else { return; };

        let scale = raster_scale(ctx.scale_factor);

        self.placed.clear();
        let Some(font) = fonts.lay_out(&mut self.layout, &cmd.text, cmd.font, cmd.size * scale, &mut self.placed)
        else {
            log::warn!("unknown font {:?}; skipping text {:?}", cmd.font, cmd.text);
            return;
        };

        let offset = anchor_offset(cmd.anchor, ink_rect(self.placed.iter().map(|g| g.bounds)));
        let color = cmd.color.to_array();
        let flip = pack_flip(item.flip);

        // Index loop: `try_place_glyph` needs `&mut self` while `placed` is borrowed.
        for i in 0..self.placed.len() {
            let glyph = self.placed[i];

            if !self.glyph_cache.contains_key(&glyph.key) {
                let (metrics, bitmap) = font.rasterize_config(glyph.key);
                if metrics.width == 0 || metrics.height == 0 {
                    continue;
                }
                let Some(entry) =
                    self.try_place_glyph(ctx, &bitmap, metrics.width as u32, metrics.height as u32)
                else {
                    continue;
                };
                self.glyph_cache.insert(glyph.key, entry);
            }
            let Some(cached) = self.glyph_cache.get(&glyph.key) else { continue; };

            // Physical layout px back to logical px around the command origin.
            let min = cmd.origin + (glyph.bounds.origin + offset) * (1.0 / scale);
            let max = min + glyph.bounds.size * (1.0 / scale);

            self.instances.push(GlyphInstance {
                dst_min: min.to_array(),
                dst_max: max.to_array(),
                uv_min: cached.uv_min,
                uv_max: cached.uv_max,
                color,
                clip,
                flip,
            });
        }
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

    // ── atlas helpers ──────────────────────────────────────────────────────

    fn reset_atlas(&mut self) {
        self.glyph_cache.clear();
        self.atlas_cursor_x = GLYPH_PADDING;
        self.atlas_cursor_y = GLYPH_PADDING;
        self.atlas_row_height = 0;
        self.atlas_full = false;
    }

    fn try_place_glyph(
        &mut self,
        ctx: &RenderCtx<'_>,
        bitmap: &[u8],
        w: u32,
        h: u32,
    ) -> Option<CachedGlyph> {
        if self.atlas_full {
            return None;
        }

        // Advance to a new shelf row when the glyph doesn't fit horizontally.
        if self.atlas_cursor_x + w + GLYPH_PADDING > ATLAS_SIZE {
            self.atlas_cursor_y += self.atlas_row_height + GLYPH_PADDING;
            self.atlas_cursor_x = GLYPH_PADDING;
            self.atlas_row_height = 0;
        }

        if self.atlas_cursor_y + h + GLYPH_PADDING > ATLAS_SIZE || w + 2 * GLYPH_PADDING > ATLAS_SIZE {
            log::warn!("glyph atlas is full ({ATLAS_SIZE}×{ATLAS_SIZE}); some glyphs skipped this frame");
            self.atlas_full = true;
            return None;
        }

        let gx = self.atlas_cursor_x;
        let gy = self.atlas_cursor_y;

        let atlas = self.atlas_texture.as_ref()?;

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: atlas,
                mip_level: 0,
                origin: wgpu::Origin3d { x: gx, y: gy, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            bitmap,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(w),
                rows_per_image: Some(h),
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );

        self.atlas_cursor_x += w + GLYPH_PADDING;
        self.atlas_row_height = self.atlas_row_height.max(h);

        let atlas_f = ATLAS_SIZE as f32;
        Some(CachedGlyph {
            uv_min: [gx as f32 / atlas_f, gy as f32 / atlas_f],
            uv_max: [(gx + w) as f32 / atlas_f, (gy + h) as f32 / atlas_f],
        })
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (80 bytes):
///
///  offset  0  dst_min  [f32; 2]   loc 1
///  offset  8  dst_max  [f32; 2]   loc 2
///  offset 16  uv_min   [f32; 2]   loc 3
///  offset 24  uv_max   [f32; 2]   loc 4
///  offset 32  color    [f32; 4]   loc 5
///  offset 48  clip     [f32; 4]   loc 6
///  offset 64  flip     [f32; 4]   loc 7
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min:  [f32; 2],
    uv_max:  [f32; 2],
    color:   [f32; 4],
    clip:    [f32; 4],
    flip:    [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        1 => Float32x2, // dst_min
        2 => Float32x2, // dst_max
        3 => Float32x2, // uv_min
        4 => Float32x2, // uv_max
        5 => Float32x4, // color
        6 => Float32x4, // clip
        7 => Float32x4  // flip
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_scale_quantizes_to_quarters() {
        assert_eq!(raster_scale(1.0), 1.0);
        assert_eq!(raster_scale(1.1), 1.0);
        assert_eq!(raster_scale(1.4), 1.5);
        assert_eq!(raster_scale(2.0), 2.0);
    }

    #[test]
    fn raster_scale_has_a_floor() {
        assert_eq!(raster_scale(0.0), 0.25);
        assert_eq!(raster_scale(f32::NAN), 1.0);
    }

    #[test]
    fn fresh_renderer_has_empty_atlas() {
        let r = TextRenderer::default();
        assert_eq!(r.len(), 0);
        assert!(!r.atlas_full);
        assert_eq!((r.atlas_cursor_x, r.atlas_cursor_y), (GLYPH_PADDING, GLYPH_PADDING));
    }
}
