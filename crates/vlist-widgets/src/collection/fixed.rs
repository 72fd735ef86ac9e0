#![forbid(unsafe_code)]

//! Fixed-height virtualization.
//!
//! Every item is `H` points tall, so index and offset convert exactly:
//! `offset = index * H`. All operations are O(1) apart from rebinding the
//! items that entered the window.

use std::fmt;

use vlist_core::config::VirtualizationConfig;
use vlist_core::geometry::{Size, Vec2};

#[cfg(feature = "tracing")]
use vlist_core::logging::trace;

use super::item::ItemKey;
use super::source::CollectionSource;
use super::surface::ScrollSurface;
use super::vertical::VerticalController;
use super::view_state::ViewState;
use super::{CollectionVirtualizer, FixedItemHeight, ScrollTarget};

/// Virtualizer for collections whose items share one height.
pub struct FixedHeightController<S: CollectionSource, V: ScrollSurface> {
    base: VerticalController<S, V>,
    /// Height after snapping to the pixel grid.
    item_height: f32,
}

impl<S: CollectionSource, V: ScrollSurface> fmt::Debug for FixedHeightController<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedHeightController")
            .field("item_height", &self.item_height)
            .field("base", &self.base)
            .finish()
    }
}

impl<S: CollectionSource, V: ScrollSurface> FixedHeightController<S, V> {
    /// Create a controller with items `item_height` points tall.
    ///
    /// # Errors
    ///
    /// [`vlist_core::Error::InvalidItemHeight`] for NaN, infinite, zero or
    /// negative heights; [`vlist_core::Error::Config`] for invalid config.
    pub fn new(
        source: S,
        surface: V,
        config: VirtualizationConfig,
        item_height: f32,
    ) -> vlist_core::Result<Self> {
        let height = FixedItemHeight::new(item_height)?;
        let base = VerticalController::new(source, surface, config)?;
        Ok(Self::from_base(base, height))
    }

    pub(crate) fn from_base(base: VerticalController<S, V>, height: FixedItemHeight) -> Self {
        let item_height = height.resolve(base.config().pixels_per_point);
        Self { base, item_height }
    }

    pub(crate) fn into_base(self) -> VerticalController<S, V> {
        self.base
    }

    /// Item height in points after pixel snapping.
    #[inline]
    #[must_use]
    pub fn item_height(&self) -> f32 {
        self.item_height
    }

    /// Number of wrappers needed to cover `viewport_height`.
    fn wanted_item_count(&self, viewport_height: f32) -> usize {
        let count = self.base.item_count();
        let fit = (viewport_height / self.item_height).ceil();
        let fit = if fit.is_finite() && fit > 0.0 { fit as usize } else { 0 };
        fit.saturating_add(self.base.config().extra_visible_items)
            .min(count)
    }

    fn first_index_for(&self, y: f32) -> usize {
        let count = self.base.item_count();
        let first = (y.max(0.0) / self.item_height).floor();
        let first = if first.is_finite() { first as usize } else { 0 };
        first.min(count.saturating_sub(1))
    }

    pub(crate) fn relayout(&mut self) {
        let viewport = self.base.viewport();
        self.resize(viewport, 0);
    }
}

impl<S: CollectionSource, V: ScrollSurface> CollectionVirtualizer<S, V>
    for FixedHeightController<S, V>
{
    fn base(&self) -> &VerticalController<S, V> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut VerticalController<S, V> {
        &mut self.base
    }

    fn refresh(&mut self, rebuild: bool) {
        self.base.refresh(rebuild);
        self.relayout();
    }

    fn scroll_to_item(&mut self, target: ScrollTarget) {
        let count = self.base.item_count();
        if count == 0 {
            return;
        }
        let h = self.item_height;
        let viewport_height = self.base.viewport().height;
        let current = self.base.scroll_offset();
        let content = count as f32 * h;
        let max = (content - viewport_height).max(0.0);

        let y = match target {
            ScrollTarget::Last => max,
            ScrollTarget::Index(index) => {
                if index >= count {
                    return;
                }
                let top = index as f32 * h;
                let bottom = top + h;
                if top >= current.y && bottom <= current.y + viewport_height {
                    return;
                }
                if top < current.y {
                    top
                } else {
                    bottom - viewport_height
                }
            }
        };
        let y = y.clamp(0.0, max);
        if y == current.y {
            return;
        }
        #[cfg(feature = "tracing")]
        trace!(?target, from = current.y, to = y, "scroll to item");
        let offset = current.with_y(y);
        self.base.move_scroll_offset(offset);
        self.on_scroll(offset);
    }

    fn resize(&mut self, size: Size, _layout_pass: u64) {
        if !size.is_valid() {
            return;
        }
        self.base.set_viewport(size);
        let count = self.base.item_count();
        let max = self.base.apply_content_height(count as f32 * self.item_height);
        self.base.clamp_scroll_offset(max);

        let wanted = self.wanted_item_count(size.height);
        let current = self.base.active_items().len();
        if wanted > current {
            let first = self.base.first_visible_index();
            for pos in current..wanted {
                let key = self.base.get_or_make_item_at(None, None);
                self.base.setup(key, first + pos, false);
            }
        } else {
            for pos in (wanted..current).rev() {
                self.base.release_item(pos);
            }
        }

        let offset = self.base.scroll_offset();
        self.on_scroll(offset);
    }

    fn on_scroll(&mut self, offset: Vec2) {
        if !offset.is_finite() {
            return;
        }
        self.base.record_scroll_offset(offset);
        let count = self.base.item_count();
        let first = self.first_index_for(offset.y);
        self.base.apply_padding(first as f32 * self.item_height);
        self.base.apply_content_height(count as f32 * self.item_height);
        if first != self.base.first_visible_index() {
            self.base.reconcile_window(first);
        }
    }

    fn index_from_position(&self, position: Vec2) -> usize {
        if !position.y.is_finite() {
            return 0;
        }
        self.first_index_for(position.y)
    }

    fn expected_item_height(&self, _index: usize) -> f32 {
        self.item_height
    }

    fn expected_content_height(&self) -> f32 {
        self.base.item_count() as f32 * self.item_height
    }

    fn on_item_geometry_changed(&mut self, key: ItemKey, size: Size) {
        // Height is fixed; only width feeds the horizontal range.
        let _ = self.base.record_geometry(key, size);
    }

    fn restore_view_state(&mut self, state: ViewState) {
        self.base.restore(state);
        self.on_scroll(state.scroll_offset);
    }
}
