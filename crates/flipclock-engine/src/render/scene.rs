use std::ops::Range;

use crate::scene::{DrawCmd, DrawList};
use crate::text::FontSystem;

use super::shapes::circle::CircleRenderer;
use super::shapes::rounded_rect::RoundedRectRenderer;
use super::shapes::text::TextRenderer;
use super::shapes::SharedBuffers;
use super::{RenderCtx, RenderTarget};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum BatchKind {
    RoundedRect,
    Circle,
    Text,
}

/// Contiguous run of instances of one shape kind, in paint order.
#[derive(Debug, Clone, Eq, PartialEq)]
struct Batch {
    kind: BatchKind,
    range: Range<u32>,
}

/// Records `start..end` for `kind`, merging with the previous batch when the
/// shape kind did not change.
fn extend_batches(batches: &mut Vec<Batch>, kind: BatchKind, start: u32, end: u32) {
    if start >= end {
        return;
    }
    match batches.last_mut() {
        Some(last) if last.kind == kind && last.range.end == start => last.range.end = end,
        _ => batches.push(Batch { kind, range: start..end }),
    }
}

/// Draws a [`DrawList`] in paint order within a single render pass.
///
/// Items of different shapes interleave freely: a card recorded after some
/// text covers that text, whatever the shapes involved.
#[derive(Default)]
pub struct SceneRenderer {
    shared: Option<SharedBuffers>,
    rounded_rects: RoundedRectRenderer,
    circles: CircleRenderer,
    text: TextRenderer,
    batches: Vec<Batch>,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `draw_list` over the target's current contents.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
        fonts: &FontSystem,
    ) {
        let shared = self.shared.get_or_insert_with(|| SharedBuffers::new(ctx.device));
        shared.write_viewport(ctx.queue, ctx.viewport);

        self.rounded_rects.prepare(ctx, shared);
        self.circles.prepare(ctx, shared);
        self.text.prepare(ctx, shared);

        // ── collect instances and batches in paint order ───────────────────
        self.batches.clear();
        for item in draw_list.iter_in_paint_order() {
            let (kind, start, end) = match &item.cmd {
                DrawCmd::RoundedRect(cmd) => {
                    let start = self.rounded_rects.len();
                    self.rounded_rects.push(item, cmd);
                    (BatchKind::RoundedRect, start, self.rounded_rects.len())
                }
                DrawCmd::Circle(cmd) => {
                    let start = self.circles.len();
                    self.circles.push(item, cmd);
                    (BatchKind::Circle, start, self.circles.len())
                }
                DrawCmd::Text(cmd) => {
                    let start = self.text.len();
                    self.text.push(ctx, item, cmd, fonts);
                    (BatchKind::Text, start, self.text.len())
                }
            };
            extend_batches(&mut self.batches, kind, start, end);
        }

        self.rounded_rects.upload(ctx);
        self.circles.upload(ctx);
        self.text.upload(ctx);

        // ── replay ─────────────────────────────────────────────────────────
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("flipclock scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(shared) = self.shared.as_ref() else { return; };
        for batch in &self.batches {
            let range = batch.range.clone();
            match batch.kind {
                BatchKind::RoundedRect => self.rounded_rects.draw(&mut rpass, shared, range),
                BatchKind::Circle => self.circles.draw(&mut rpass, shared, range),
                BatchKind::Text => self.text.draw(&mut rpass, shared, range),
            }
        }

        log::trace!(
            "scene: {} items in {} batches",
            draw_list.len(),
            self.batches.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_same_kind_merges() {
        let mut batches = Vec::new();
        extend_batches(&mut batches, BatchKind::RoundedRect, 0, 1);
        extend_batches(&mut batches, BatchKind::RoundedRect, 1, 2);
        assert_eq!(batches, vec![Batch { kind: BatchKind::RoundedRect, range: 0..2 }]);
    }

    #[test]
    fn kind_change_starts_new_batch_and_resumes_ranges() {
        let mut batches = Vec::new();
        extend_batches(&mut batches, BatchKind::RoundedRect, 0, 1);
        extend_batches(&mut batches, BatchKind::Text, 0, 3);
        extend_batches(&mut batches, BatchKind::RoundedRect, 1, 2);
        assert_eq!(batches, vec![
            Batch { kind: BatchKind::RoundedRect, range: 0..1 },
            Batch { kind: BatchKind::Text, range: 0..3 },
            Batch { kind: BatchKind::RoundedRect, range: 1..2 },
        ]);
    }

    #[test]
    fn skipped_items_do_not_split_batches() {
        let mut batches = Vec::new();
        extend_batches(&mut batches, BatchKind::Circle, 0, 1);
        extend_batches(&mut batches, BatchKind::Text, 0, 0);
        extend_batches(&mut batches, BatchKind::Circle, 1, 2);
        assert_eq!(batches, vec![Batch { kind: BatchKind::Circle, range: 0..2 }]);
    }
}
