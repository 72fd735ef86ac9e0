//! Minimal source and surface for unit tests.

use vlist_core::geometry::{Size, Vec2};

use super::source::CollectionSource;
use super::surface::ScrollSurface;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Element {
    pub bound: Option<usize>,
}

#[derive(Debug, Default)]
pub struct ListSource {
    pub ids: Vec<u64>,
    pub made: usize,
    pub binds: usize,
    pub unbinds: usize,
    pub destroyed: usize,
}

impl ListSource {
    pub fn new(count: usize) -> Self {
        Self {
            ids: (0..count as u64).collect(),
            ..Self::default()
        }
    }
}

impl CollectionSource for ListSource {
    type Element = Element;

    fn item_count(&self) -> usize {
        self.ids.len()
    }

    fn id_for_index(&self, index: usize) -> u64 {
        self.ids[index]
    }

    fn make_item(&mut self) -> Element {
        self.made += 1;
        Element::default()
    }

    fn bind_item(&mut self, element: &mut Element, index: usize) {
        assert_eq!(element.bound, None, "bind without unbind");
        element.bound = Some(index);
        self.binds += 1;
    }

    fn unbind_item(&mut self, element: &mut Element, _index: usize) {
        assert!(element.bound.is_some(), "unbind of unbound element");
        element.bound = None;
        self.unbinds += 1;
    }

    fn destroy_item(&mut self, element: Element) {
        assert_eq!(element.bound, None, "destroyed while bound");
        self.destroyed += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub viewport: Size,
    pub offset: Vec2,
    pub content_height: f32,
    pub padding: f32,
    pub vertical_range: f32,
    pub horizontal_range: f32,
}

impl RecordingSurface {
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }
}

impl ScrollSurface for RecordingSurface {
    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn scroll_offset(&self) -> Vec2 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    fn set_content_height(&mut self, height: f32) {
        self.content_height = height;
    }

    fn set_content_padding_top(&mut self, padding: f32) {
        self.padding = padding;
    }

    fn set_vertical_range(&mut self, max: f32) {
        self.vertical_range = max;
    }

    fn set_horizontal_range(&mut self, max: f32) {
        self.horizontal_range = max;
    }
}
