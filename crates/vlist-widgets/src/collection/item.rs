#![forbid(unsafe_code)]

//! Reusable item wrappers.
//!
//! A [`ReusableItem`] pairs a host element with its current binding. The
//! wrapper outlives any single binding: scrolling rebinds it to another
//! index instead of destroying it.
//!
//! # Lifecycle
//!
//! ```text
//! Unbound ──bind──▶ Bound(estimate) ──measure──▶ Bound(measured)
//!                        │                            │
//!                        └────────────┬───────────────┘
//!                                     ▼
//!                           Hidden | Unbound (released)
//! ```
//!
//! A third, transient state exists during drag: a drag ghost is a visible,
//! zero-height placeholder standing in for the dragged index. It is never
//! bound to the source.

use vlist_core::geometry::Size;

/// Handle to a pooled wrapper.
///
/// The key stays the same while the wrapper is reused across bindings. It
/// goes stale only when the pool destroys the wrapper (full rebuild).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    slot: u32,
    generation: u32,
}

impl ItemKey {
    #[inline]
    #[must_use]
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.slot as usize
    }

    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// A pooled host element plus its binding state.
#[derive(Debug, Clone)]
pub struct ReusableItem<E> {
    element: E,
    pub(crate) index: Option<usize>,
    pub(crate) id: Option<u64>,
    pub(crate) visible: bool,
    pub(crate) drag_ghost: bool,
    pub(crate) layout_size: Size,
    pub(crate) needs_layout: bool,
}

impl<E> ReusableItem<E> {
    pub(crate) fn new(element: E) -> Self {
        Self {
            element,
            index: None,
            id: None,
            visible: false,
            drag_ghost: false,
            layout_size: Size::new(0.0, f32::NAN),
            needs_layout: false,
        }
    }

    #[must_use]
    pub fn element(&self) -> &E {
        &self.element
    }

    #[must_use]
    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    pub(crate) fn into_element(self) -> E {
        self.element
    }

    /// Index this item occupies in the window, ghost placeholders included.
    #[inline]
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Index the item is bound to on the source. `None` for ghosts.
    #[inline]
    #[must_use]
    pub fn bound_index(&self) -> Option<usize> {
        if self.drag_ghost { None } else { self.index }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    #[must_use]
    pub fn is_drag_ghost(&self) -> bool {
        self.drag_ghost
    }

    /// Last size reported by the host layout. Height is NaN until the first
    /// measurement.
    #[inline]
    #[must_use]
    pub fn layout_size(&self) -> Size {
        self.layout_size
    }

    /// True between a bind and the first geometry report for it.
    #[inline]
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.needs_layout
    }

    /// Bound, shown and not a placeholder.
    #[inline]
    #[must_use]
    pub fn is_realized(&self) -> bool {
        self.visible && !self.drag_ghost && self.index.is_some()
    }

    pub(crate) fn make_ghost(&mut self, index: usize) {
        self.index = Some(index);
        self.id = None;
        self.visible = true;
        self.drag_ghost = true;
        self.layout_size.height = 0.0;
        self.needs_layout = false;
    }

    pub(crate) fn hide(&mut self) {
        self.index = None;
        self.id = None;
        self.visible = false;
        self.drag_ghost = false;
        self.needs_layout = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_item_is_unbound_and_unmeasured() {
        let item = ReusableItem::new(());
        assert_eq!(item.index(), None);
        assert!(!item.is_visible());
        assert!(item.layout_size().height.is_nan());
    }

    #[test]
    fn ghost_reports_no_bound_index() {
        let mut item = ReusableItem::new(());
        item.make_ghost(4);
        assert_eq!(item.index(), Some(4));
        assert_eq!(item.bound_index(), None);
        assert_eq!(item.layout_size().height, 0.0);
        assert!(!item.is_realized());
    }
}
