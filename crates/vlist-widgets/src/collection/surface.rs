#![forbid(unsafe_code)]

//! Scroll-surface collaborator and the content container's paint order.
//!
//! The surface is whatever scrollable viewport hosts the collection: it
//! reports viewport size and scroll offset and accepts the geometry the
//! controller derives (content height, top padding, scrollbar ranges).
//!
//! [`ContentContainer`] mirrors the children of the surface's content
//! element. Its order is paint order: index 0 paints first (back), the last
//! entry paints on top (front).

use vlist_core::geometry::{Size, Vec2};

use super::item::ItemKey;

/// Viewport hosting a virtualized collection.
pub trait ScrollSurface {
    fn viewport_size(&self) -> Size;

    fn scroll_offset(&self) -> Vec2;

    /// Move the viewport. Does not notify the controller; callers that
    /// change the offset also call `on_scroll`.
    fn set_scroll_offset(&mut self, offset: Vec2);

    /// Total height of the scrollable content.
    fn set_content_height(&mut self, height: f32);

    /// Height of all unrealized items above the first realized one.
    fn set_content_padding_top(&mut self, padding: f32);

    /// Largest valid vertical offset.
    fn set_vertical_range(&mut self, max: f32);

    /// Largest valid horizontal offset.
    fn set_horizontal_range(&mut self, max: f32) {
        let _ = max;
    }
}

/// Paint-ordered children of the content element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentContainer {
    children: Vec<ItemKey>,
}

impl ContentContainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<ItemKey> {
        self.children.get(position).copied()
    }

    #[must_use]
    pub fn position(&self, key: ItemKey) -> Option<usize> {
        self.children.iter().position(|k| *k == key)
    }

    #[must_use]
    pub fn children(&self) -> &[ItemKey] {
        &self.children
    }

    /// Append on top of every other child.
    pub fn push(&mut self, key: ItemKey) {
        self.remove(key);
        self.children.push(key);
    }

    /// Insert at `position` (clamped to the end).
    pub fn insert(&mut self, position: usize, key: ItemKey) {
        self.remove(key);
        let position = position.min(self.children.len());
        self.children.insert(position, key);
    }

    /// Detach `key`. Returns whether it was a child.
    pub fn remove(&mut self, key: ItemKey) -> bool {
        match self.position(key) {
            Some(pos) => {
                self.children.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Move `key` so it paints first.
    pub fn send_to_back(&mut self, key: ItemKey) {
        if self.remove(key) {
            self.children.insert(0, key);
        }
    }

    /// Move `key` so it paints last.
    pub fn bring_to_front(&mut self, key: ItemKey) {
        if self.remove(key) {
            self.children.push(key);
        }
    }

    /// Move `key` directly behind `sibling`.
    pub fn place_behind(&mut self, key: ItemKey, sibling: ItemKey) {
        if key == sibling || self.position(sibling).is_none() {
            return;
        }
        if !self.remove(key) {
            return;
        }
        if let Some(pos) = self.position(sibling) {
            self.children.insert(pos, key);
        }
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }
}
