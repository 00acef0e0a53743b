use crate::coords::Rect;

use super::{DrawCmd, FlipTransform, SortKey, ZIndex};

/// A single draw item: sort key + command + the scopes active when recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub key: SortKey,
    pub cmd: DrawCmd,
    /// Clip rect in the item's local (pre-flip) logical pixels. `None` = unclipped.
    pub clip_rect: Option<Rect>,
    /// Flip transform applied to the item's geometry. `None` = drawn flat.
    pub flip: Option<FlipTransform>,
}

/// Recorded draw stream for a frame.
///
/// Performance characteristics:
/// - `push()` is O(1)
/// - paint-order iteration reuses an internal index buffer; no per-frame allocation once warmed
///
/// # Scopes
///
/// [`push_clip`](Self::push_clip) / [`pop_clip`](Self::pop_clip) restrict
/// commands to a rect; nested clips intersect with their parent.
/// [`push_flip`](Self::push_flip) / [`pop_flip`](Self::pop_flip) attach a
/// [`FlipTransform`] to every command recorded in between. Clips are expressed
/// in the same local space as the geometry, so a half-card clipped to its own
/// bounds stays clipped while the flap rotates.
///
/// ```ignore
/// list.push_flip(hinge);
/// list.push_clip(top_half);
/// // ... push the flap ...
/// list.pop_clip();
/// list.pop_flip();
/// ```
#[derive(Debug, Default)]
pub struct DrawList {
    items: Vec<DrawItem>,
    next_order: u32,

    sorted_indices: Vec<usize>,
    sorted_dirty: bool,

    /// Top is the effective clip, already intersected with all parents.
    clip_stack: Vec<Rect>,
    flip_stack: Vec<FlipTransform>,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded items and scopes. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_order = 0;
        self.sorted_dirty = true;
        self.sorted_indices.clear();
        self.clip_stack.clear();
        self.flip_stack.clear();
    }

    /// Returns items in insertion order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pushes a draw command with the given z-index under the active scopes.
    #[inline]
    pub fn push(&mut self, z: ZIndex, cmd: DrawCmd) {
        let order = self.next_order;
        self.next_order = self.next_order.wrapping_add(1);

        self.items.push(DrawItem {
            key: SortKey::new(z, order),
            cmd,
            clip_rect: self.clip_stack.last().copied(),
            flip: self.flip_stack.last().copied(),
        });

        self.sorted_dirty = true;
    }

    /// Begins a clip region, intersected with any parent clip.
    ///
    /// Calls must be balanced with [`pop_clip`](Self::pop_clip).
    #[inline]
    pub fn push_clip(&mut self, rect: Rect) {
        let effective = match self.clip_stack.last() {
            None => rect.normalized(),
            // No overlap with the parent: a zero-area clip makes renderers drop the items.
            Some(&parent) => parent.intersect(rect).unwrap_or_default(),
        };
        self.clip_stack.push(effective);
    }

    /// Ends the most recent clip region.
    #[inline]
    pub fn pop_clip(&mut self) {
        debug_assert!(!self.clip_stack.is_empty(), "pop_clip called without matching push_clip");
        self.clip_stack.pop();
    }

    /// Begins a flip scope. Flips do not compose; the innermost one wins.
    ///
    /// Calls must be balanced with [`pop_flip`](Self::pop_flip).
    #[inline]
    pub fn push_flip(&mut self, flip: FlipTransform) {
        self.flip_stack.push(flip);
    }

    /// Ends the most recent flip scope.
    #[inline]
    pub fn pop_flip(&mut self) {
        debug_assert!(!self.flip_stack.is_empty(), "pop_flip called without matching push_flip");
        self.flip_stack.pop();
    }

    /// Iterates items in paint order (back-to-front) without cloning draw commands.
    pub fn iter_in_paint_order(&mut self) -> impl Iterator<Item = &DrawItem> {
        if self.sorted_dirty {
            self.rebuild_sorted_indices();
        }

        self.sorted_indices.iter().map(|&i| &self.items[i])
    }

    fn rebuild_sorted_indices(&mut self) {
        self.sorted_indices.clear();
        self.sorted_indices.extend(0..self.items.len());

        // Stable ordering is ensured by SortKey including insertion order.
        let items = &self.items;
        self.sorted_indices.sort_by_key(|&i| items[i].key);

        self.sorted_dirty = false;
    }
}
