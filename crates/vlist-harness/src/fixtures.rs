#![forbid(unsafe_code)]

//! Reference source and surface for driving controllers in tests.
//!
//! [`RecordingSource`] owns a list of `(id, height)` entries and counts every
//! lifecycle call it receives. It panics on protocol violations (double
//! bind, unbind of an unbound element, destroying a bound element) so tests
//! fail at the offending call rather than on a later assertion.

use vlist_core::geometry::{Size, Vec2};
use vlist_widgets::collection::{CollectionSource, ScrollSurface};

/// Element handed to the controller. Tracks its current binding.
#[derive(Debug, Clone, PartialEq)]
pub struct TestElement {
    /// Creation order, stable for the element's lifetime.
    pub serial: u64,
    pub bound: Option<usize>,
    pub bind_count: u32,
}

/// Lifecycle call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub made: u64,
    pub bound: u64,
    pub unbound: u64,
    pub destroyed: u64,
}

impl SourceStats {
    /// Bindings currently held by live elements.
    #[must_use]
    pub fn live_bindings(&self) -> u64 {
        self.bound - self.unbound
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: u64,
    height: f32,
}

/// In-memory collection with per-item heights.
#[derive(Debug, Default)]
pub struct RecordingSource {
    entries: Vec<Entry>,
    next_id: u64,
    stats: SourceStats,
}

impl RecordingSource {
    /// `count` items, all `height` tall.
    #[must_use]
    pub fn uniform(count: usize, height: f32) -> Self {
        Self::with_heights(std::iter::repeat_n(height, count))
    }

    /// One item per height, ids assigned in order.
    #[must_use]
    pub fn with_heights(heights: impl IntoIterator<Item = f32>) -> Self {
        let mut source = Self::default();
        for height in heights {
            source.push(height);
        }
        source
    }

    #[must_use]
    pub fn stats(&self) -> SourceStats {
        self.stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Layout height of the item at `index`.
    #[must_use]
    pub fn height(&self, index: usize) -> Option<f32> {
        self.entries.get(index).map(|e| e.height)
    }

    /// Sum of every item height.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.entries.iter().map(|e| e.height).sum()
    }

    /// Top edge of `index` in exact content coordinates.
    #[must_use]
    pub fn offset_of(&self, index: usize) -> f32 {
        self.entries.iter().take(index).map(|e| e.height).sum()
    }

    pub fn set_height(&mut self, index: usize, height: f32) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.height = height;
        }
    }

    /// Append an item and return its id.
    pub fn push(&mut self, height: f32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry { id, height });
        id
    }

    /// Insert a new item at `index` and return its id.
    pub fn insert(&mut self, index: usize, height: f32) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let index = index.min(self.entries.len());
        self.entries.insert(index, Entry { id, height });
        id
    }

    pub fn remove(&mut self, index: usize) -> Option<u64> {
        (index < self.entries.len()).then(|| self.entries.remove(index).id)
    }

    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Reorder: take the item at `from` and reinsert it at `to`.
    pub fn move_item(&mut self, from: usize, to: usize) {
        if from >= self.entries.len() {
            return;
        }
        let entry = self.entries.remove(from);
        let to = to.min(self.entries.len());
        self.entries.insert(to, entry);
    }
}

impl CollectionSource for RecordingSource {
    type Element = TestElement;

    fn item_count(&self) -> usize {
        self.entries.len()
    }

    fn id_for_index(&self, index: usize) -> u64 {
        self.entries.get(index).map_or(u64::MAX, |e| e.id)
    }

    fn make_item(&mut self) -> TestElement {
        self.stats.made += 1;
        TestElement {
            serial: self.stats.made,
            bound: None,
            bind_count: 0,
        }
    }

    fn bind_item(&mut self, element: &mut TestElement, index: usize) {
        assert_eq!(
            element.bound, None,
            "element {} bound to {index} while still bound",
            element.serial
        );
        assert!(index < self.entries.len(), "bind past end: {index}");
        element.bound = Some(index);
        element.bind_count += 1;
        self.stats.bound += 1;
    }

    fn unbind_item(&mut self, element: &mut TestElement, index: usize) {
        assert_eq!(
            element.bound,
            Some(index),
            "element {} unbound from {index} but bound to {:?}",
            element.serial,
            element.bound
        );
        element.bound = None;
        self.stats.unbound += 1;
    }

    fn destroy_item(&mut self, element: TestElement) {
        assert_eq!(
            element.bound, None,
            "element {} destroyed while bound",
            element.serial
        );
        self.stats.destroyed += 1;
    }
}

/// Scroll surface that records every update it receives.
#[derive(Debug, Clone, Default)]
pub struct TestSurface {
    pub viewport: Size,
    pub offset: Vec2,
    pub content_height: f32,
    pub padding_top: f32,
    pub vertical_range: f32,
    pub horizontal_range: f32,
    /// Number of programmatic offset changes.
    pub offset_writes: u32,
}

impl TestSurface {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: Size::new(width, height),
            ..Self::default()
        }
    }
}

impl ScrollSurface for TestSurface {
    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn scroll_offset(&self) -> Vec2 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.offset_writes += 1;
    }

    fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
    }

    fn set_content_padding_top(&mut self, padding: f32) {
        self.padding_top = padding;
    }

    fn set_vertical_range(&mut self, max: f32) {
        self.vertical_range = max;
    }

    fn set_horizontal_range(&mut self, max: f32) {
        self.horizontal_range = max;
    }
}
