#![forbid(unsafe_code)]

//! Dynamic-height virtualization.
//!
//! Item heights are only known after the host lays an item out. Until then
//! the running average of measured heights stands in, so content height and
//! the scrollbar stay plausible from the first frame.
//!
//! Work is split between immediate and deferred paths:
//!
//! - `on_scroll`, `resize` and geometry reports update offsets, padding and
//!   the window start right away.
//! - The *fill* pass (binding enough items to cover the viewport, plus
//!   overscan in the direction of travel) is deferred to [`tick`], so a burst
//!   of scroll events in one frame costs one fill.
//! - The scroll direction falls back to idle one tick after the fill that
//!   used it, unless another scroll arrives first.
//!
//! # Invariants
//!
//! 1. `content_padding == heights.offset_of_index(first_visible_index)`
//!    after every scroll, fill and geometry update.
//! 2. A geometry report only triggers a scroll reconciliation when the
//!    measured height differs from the cached one.
//! 3. A forced target set by `scroll_to_item` survives until a fill pass
//!    finds every realized item measured, or until the user scrolls to a
//!    different offset.
//! 4. While stuck to the bottom, late height changes keep the offset at the
//!    end of the content.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | NaN offset or viewport | Event ignored |
//! | Zero, negative or NaN height report | Item marked measured, height not cached |
//! | Source shrank below cached indices | Stale heights dropped on next refresh |
//! | Scroll while items await layout | Fill deferred until they report |
//!
//! [`tick`]: super::CollectionVirtualizer::tick

use std::fmt;

use rustc_hash::FxHashSet;
use vlist_core::config::VirtualizationConfig;
use vlist_core::geometry::{Size, Vec2};
use vlist_core::schedule::{ScheduleHandle, Scheduler};

#[cfg(feature = "tracing")]
use vlist_core::logging::{debug, trace};

use super::height_cache::HeightCache;
use super::item::ItemKey;
use super::source::CollectionSource;
use super::surface::ScrollSurface;
use super::vertical::VerticalController;
use super::view_state::ViewState;
use super::{CollectionVirtualizer, ScrollTarget};

/// Vertical direction of the most recent user scroll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollDirection {
    #[default]
    Idle,
    Up,
    Down,
}

impl ScrollDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredTask {
    Fill,
    ResetScrollDirection,
}

/// What last moved the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    None,
    Resize,
    Scroll,
    ForcedScroll,
}

/// Virtualizer for collections whose item heights are discovered by layout.
pub struct DynamicHeightController<S: CollectionSource, V: ScrollSurface> {
    base: VerticalController<S, V>,
    heights: HeightCache,
    /// Indices bound but not yet measured.
    waiting: FxHashSet<usize>,
    forced_first: Option<usize>,
    forced_last: Option<usize>,
    stick_to_bottom: bool,
    last_change: Change,
    direction: ScrollDirection,
    last_layout_pass: Option<u64>,
    scheduler: Scheduler<DeferredTask>,
    fill_handle: Option<ScheduleHandle>,
    reset_handle: Option<ScheduleHandle>,
}

impl<S: CollectionSource, V: ScrollSurface> fmt::Debug for DynamicHeightController<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicHeightController")
            .field("cached_heights", &self.heights.len())
            .field("waiting", &self.waiting.len())
            .field("forced_first", &self.forced_first)
            .field("forced_last", &self.forced_last)
            .field("stick_to_bottom", &self.stick_to_bottom)
            .field("direction", &self.direction)
            .field("base", &self.base)
            .finish()
    }
}

impl<S: CollectionSource, V: ScrollSurface> DynamicHeightController<S, V> {
    /// # Errors
    ///
    /// [`vlist_core::Error::Config`] if `config` fails validation.
    pub fn new(source: S, surface: V, config: VirtualizationConfig) -> vlist_core::Result<Self> {
        let base = VerticalController::new(source, surface, config)?;
        Ok(Self::from_base(base))
    }

    pub(crate) fn from_base(base: VerticalController<S, V>) -> Self {
        let heights = HeightCache::new(base.config().default_item_height);
        Self {
            base,
            heights,
            waiting: FxHashSet::default(),
            forced_first: None,
            forced_last: None,
            stick_to_bottom: false,
            last_change: Change::None,
            direction: ScrollDirection::Idle,
            last_layout_pass: None,
            scheduler: Scheduler::new(),
            fill_handle: None,
            reset_handle: None,
        }
    }

    pub(crate) fn into_base(self) -> VerticalController<S, V> {
        self.base
    }

    #[must_use]
    pub fn height_cache(&self) -> &HeightCache {
        &self.heights
    }

    #[inline]
    #[must_use]
    pub fn is_stuck_to_bottom(&self) -> bool {
        self.stick_to_bottom
    }

    #[inline]
    #[must_use]
    pub fn scroll_direction(&self) -> ScrollDirection {
        self.direction
    }

    /// Whether `index` is bound and awaiting its first measurement.
    #[must_use]
    pub fn is_waiting_for_layout(&self, index: usize) -> bool {
        self.waiting.contains(&index)
    }

    #[must_use]
    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Pending `scroll_to_item` target pinned to the top or bottom edge.
    #[must_use]
    pub fn forced_target(&self) -> Option<usize> {
        self.forced_first.or(self.forced_last)
    }

    #[must_use]
    pub fn is_fill_scheduled(&self) -> bool {
        self.fill_handle
            .is_some_and(|handle| self.scheduler.is_pending(handle))
    }

    fn schedule_fill(&mut self) {
        self.fill_handle = Some(self.scheduler.schedule(DeferredTask::Fill));
    }

    fn schedule_direction_reset(&mut self) {
        self.reset_handle = Some(self.scheduler.schedule(DeferredTask::ResetScrollDirection));
    }

    // ------------------------------------------------------------------
    // Window math
    // ------------------------------------------------------------------

    /// Topmost index that should be visible at offset `y`.
    fn top_index_for_scroll(&self, y: f32, count: usize) -> usize {
        let last = count.saturating_sub(1);
        if let Some(first) = self.forced_first {
            return first.min(last);
        }
        if let Some(target) = self.forced_last {
            // Walk up from the target until the viewport is covered.
            let viewport_height = self.base.viewport().height;
            let mut index = target.min(last);
            let mut covered = self.expected_item_height(index);
            while index > 0 && covered < viewport_height {
                index -= 1;
                covered += self.expected_item_height(index);
            }
            return index;
        }
        self.heights.index_at_offset(y, count)
    }

    /// Overscan rows placed above and below the visible range.
    fn overscan(&self) -> (usize, usize) {
        if self.stick_to_bottom {
            return (0, 0);
        }
        let extra = self.base.config().additional_items;
        match self.direction {
            ScrollDirection::Up => (extra, 0),
            ScrollDirection::Down | ScrollDirection::Idle => (0, extra),
        }
    }

    /// First realized index for offset `y`, overscan included.
    fn window_start(&self, y: f32, count: usize) -> usize {
        let (above, _) = self.overscan();
        self.top_index_for_scroll(y, count).saturating_sub(above)
    }

    /// Content height, vertical range and offset clamp.
    fn update_dimensions(&mut self) -> f32 {
        let content = self.expected_content_height();
        let max = self.base.apply_content_height(content);
        if let Some(clamped) = self.base.clamp_scroll_offset(max) {
            self.handle_scroll(clamped, false);
        }
        max
    }

    fn collect_waiting(&mut self) {
        let base = &self.base;
        let fresh = base
            .items_needing_layout()
            .filter_map(|key| base.item(key).and_then(|item| item.bound_index()));
        self.waiting.extend(fresh);
    }

    fn prune_waiting(&mut self, count: usize) {
        let base = &self.base;
        self.waiting.retain(|&index| {
            index < count
                && base
                    .item_for_index(index)
                    .and_then(|key| base.item(key))
                    .is_some_and(|item| item.needs_layout())
        });
    }

    fn ensure_item(&mut self, position: usize, index: usize) {
        let key = match self.base.active_items().get(position) {
            Some(key) => *key,
            None => self.base.get_or_make_item_at(None, None),
        };
        self.base.setup(key, index, false);
    }

    // ------------------------------------------------------------------
    // Scroll handling
    // ------------------------------------------------------------------

    /// Shared scroll path. `user` scrolls update direction and change kind;
    /// internal reconciliation keeps them.
    fn handle_scroll(&mut self, offset: Vec2, user: bool) {
        if !offset.is_finite() {
            return;
        }
        let previous = self.base.scroll_offset().y;
        self.base.record_scroll_offset(offset);
        let y = offset.y.max(0.0);
        let max = self.base.scrollable_height();
        self.stick_to_bottom =
            max > 0.0 && (y - max).abs() <= self.base.config().stick_to_bottom_epsilon;

        if user {
            if offset.y != previous && self.forced_target().is_some() {
                // The user moved away from the offset `scroll_to_item` wrote.
                #[cfg(feature = "tracing")]
                trace!(target = ?self.forced_target(), "forced target dropped by user scroll");
                self.forced_first = None;
                self.forced_last = None;
            }
            if y > previous {
                self.direction = ScrollDirection::Down;
            } else if y < previous {
                self.direction = ScrollDirection::Up;
            }
            self.last_change = if self.forced_target().is_some() {
                Change::ForcedScroll
            } else {
                Change::Scroll
            };
            if let Some(handle) = self.reset_handle.take() {
                self.scheduler.cancel(handle);
            }
        }

        let count = self.base.item_count();
        if count == 0 {
            self.base.set_first_visible_index(0);
            self.base.apply_padding(0.0);
            return;
        }
        let first = self.window_start(y, count);
        if first != self.base.first_visible_index() {
            self.base.reconcile_window(first);
        }
        let padding = self.heights.offset_of_index(first);
        self.base.apply_padding(padding);
        self.schedule_fill();
    }

    /// Reconcile surface geometry after cached heights changed.
    ///
    /// With `dimensions_only` just content height, range and offset clamp are
    /// updated. Otherwise the offset is re-anchored: to the bottom when
    /// stuck, to a forced target when one is pending, else shifted by the
    /// change in padding so visible content does not jump.
    pub fn apply_scroll_view_update(&mut self, dimensions_only: bool) {
        if dimensions_only {
            self.update_dimensions();
            return;
        }
        let count = self.base.item_count();
        let previous_padding = self.base.content_padding();
        let padding = if count == 0 {
            0.0
        } else {
            self.heights.offset_of_index(self.base.first_visible_index())
        };
        let content = self.expected_content_height();
        let max = self.base.apply_content_height(content);
        let viewport_height = self.base.viewport().height;
        let current = self.base.scroll_offset();

        let target = if self.stick_to_bottom {
            max
        } else if let Some(first) = self.forced_first {
            self.heights.offset_of_index(first)
        } else if let Some(last) = self.forced_last {
            self.heights.content_height_for_index(last) - viewport_height
        } else {
            current.y + (padding - previous_padding)
        };
        let target = if target.is_finite() {
            target.clamp(0.0, max)
        } else {
            current.y.clamp(0.0, max)
        };

        self.base.apply_padding(padding);
        let offset = current.with_y(target);
        if target != current.y {
            #[cfg(feature = "tracing")]
            trace!(from = current.y, to = target, padding, "re-anchored scroll offset");
            self.base.move_scroll_offset(offset);
        }
        self.handle_scroll(offset, false);
    }

    // ------------------------------------------------------------------
    // Fill
    // ------------------------------------------------------------------

    /// Bind enough items to cover the viewport plus overscan, hide the rest
    /// and set authoritative padding.
    pub fn fill(&mut self) {
        let count = self.base.item_count();
        let viewport_height = self.base.viewport().height;
        if count == 0 || !(viewport_height > 0.0) {
            let keys: Vec<ItemKey> = self.base.active_items().to_vec();
            for key in keys {
                self.base.hide_item(key);
            }
            self.waiting.clear();
            return;
        }

        self.prune_waiting(count);
        if !self.waiting.is_empty() && self.last_change == Change::Scroll {
            #[cfg(feature = "tracing")]
            trace!(waiting = self.waiting.len(), "fill deferred until layout");
            return;
        }

        let offset = self.base.scroll_offset().y.max(0.0);
        let top = self.top_index_for_scroll(offset, count);
        let (above, below) = self.overscan();
        let mut first = top.saturating_sub(above);
        // Backfill while the padding still starts below the viewport top.
        while first > 0 && self.heights.offset_of_index(first) > offset {
            first -= 1;
        }
        if first != self.base.first_visible_index() {
            self.base.reconcile_window(first);
        }
        let padding = self.heights.offset_of_index(first);

        let viewport_bottom = offset + viewport_height;
        let mut position = 0;
        let mut index = first;
        let mut bottom = padding;
        while index < count && (bottom < viewport_bottom || index < top) {
            self.ensure_item(position, index);
            bottom += self.expected_item_height(index);
            index += 1;
            position += 1;
        }
        let end = index.saturating_add(below).min(count);
        while index < end {
            self.ensure_item(position, index);
            index += 1;
            position += 1;
        }

        let leftover: Vec<ItemKey> = self
            .base
            .active_items()
            .get(position..)
            .map(<[ItemKey]>::to_vec)
            .unwrap_or_default();
        for key in leftover {
            self.base.hide_item(key);
        }

        self.base.apply_padding(padding);
        let content = self.expected_content_height();
        self.base.apply_content_height(content);
        self.collect_waiting();

        #[cfg(feature = "tracing")]
        trace!(
            first,
            last = index,
            padding,
            waiting = self.waiting.len(),
            direction = self.direction.as_str(),
            "fill"
        );

        if self.waiting.is_empty() {
            self.forced_first = None;
            self.forced_last = None;
            self.last_change = Change::None;
        }
        // Overscan follows the direction until the next idle tick.
        if self.direction != ScrollDirection::Idle {
            self.schedule_direction_reset();
        }
    }

    pub(crate) fn relayout(&mut self) {
        self.apply_scroll_view_update(true);
        self.schedule_fill();
    }
}

impl<S: CollectionSource, V: ScrollSurface> CollectionVirtualizer<S, V>
    for DynamicHeightController<S, V>
{
    fn base(&self) -> &VerticalController<S, V> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut VerticalController<S, V> {
        &mut self.base
    }

    fn refresh(&mut self, rebuild: bool) {
        let count = self.base.item_count();
        self.heights.clean(count);
        if rebuild {
            self.heights.clear();
            self.waiting.clear();
            self.forced_first = None;
            self.forced_last = None;
            self.stick_to_bottom = false;
            self.last_layout_pass = None;
            self.scheduler.clear();
            self.fill_handle = None;
            self.reset_handle = None;
        } else {
            let base = &self.base;
            let source = base.source();
            let stale: Vec<usize> = base
                .active_items()
                .iter()
                .filter_map(|key| base.item(*key))
                .filter_map(|item| {
                    let index = item.bound_index()?;
                    let changed = index >= count || item.id() != Some(source.id_for_index(index));
                    changed.then_some(index)
                })
                .collect();
            for index in stale {
                self.heights.unregister(index);
            }
        }

        self.base.refresh(rebuild);
        self.waiting.retain(|&index| index < count);
        #[cfg(feature = "tracing")]
        debug!(rebuild, count, cached = self.heights.len(), "refresh");
        // A view pinned to the bottom follows appended content.
        self.apply_scroll_view_update(!self.stick_to_bottom);
        self.schedule_fill();
    }

    fn scroll_to_item(&mut self, target: ScrollTarget) {
        let count = self.base.item_count();
        if count == 0 {
            return;
        }
        self.apply_scroll_view_update(true);
        let viewport_height = self.base.viewport().height;
        let current = self.base.scroll_offset();
        let max = self.base.scrollable_height();

        let y = match target {
            ScrollTarget::Last => {
                self.forced_first = None;
                self.forced_last = Some(count - 1);
                self.stick_to_bottom = true;
                max
            }
            ScrollTarget::Index(index) => {
                if index >= count {
                    return;
                }
                let top = self.heights.offset_of_index(index);
                let bottom = self.heights.content_height_for_index(index);
                if top >= current.y && bottom <= current.y + viewport_height {
                    return;
                }
                if top < current.y {
                    self.forced_first = Some(index);
                    self.forced_last = None;
                    top
                } else {
                    self.forced_first = None;
                    self.forced_last = Some(index);
                    bottom - viewport_height
                }
            }
        };
        let y = y.clamp(0.0, max);
        self.last_change = Change::ForcedScroll;
        #[cfg(feature = "tracing")]
        debug!(?target, from = current.y, to = y, "scroll to item");

        if y == current.y {
            self.schedule_fill();
            return;
        }
        let offset = current.with_y(y);
        self.base.move_scroll_offset(offset);
        self.handle_scroll(offset, true);
    }

    fn resize(&mut self, size: Size, layout_pass: u64) {
        if !size.is_valid() {
            return;
        }
        self.base.set_viewport(size);
        self.update_dimensions();
        if self.last_layout_pass == Some(layout_pass) {
            return;
        }
        self.last_layout_pass = Some(layout_pass);
        if self.forced_target().is_none() {
            self.last_change = Change::Resize;
        }

        let count = self.base.item_count();
        if count == 0 {
            return;
        }
        let first = self.base.first_visible_index().min(count - 1);
        let mut needed = 0;
        let mut covered = 0.0;
        while first + needed < count && covered < size.height {
            covered += self.expected_item_height(first + needed);
            needed += 1;
        }
        let current = self.base.active_items().len();
        for position in current..needed {
            let key = self.base.get_or_make_item_at(None, None);
            self.base.setup(key, first + position, false);
        }
        self.collect_waiting();
        #[cfg(feature = "tracing")]
        debug!(
            layout_pass,
            viewport_height = size.height,
            active = self.base.active_items().len(),
            "resize"
        );
        self.schedule_fill();
    }

    fn on_scroll(&mut self, offset: Vec2) {
        self.handle_scroll(offset, true);
    }

    fn index_from_position(&self, position: Vec2) -> usize {
        self.heights
            .index_at_offset(position.y, self.base.item_count())
    }

    fn expected_item_height(&self, index: usize) -> f32 {
        if self.base.dragged_index() == Some(index) {
            let dragged = self
                .base
                .dragged_item()
                .and_then(|key| self.base.item(key))
                .map(|item| item.layout_size().height)
                .filter(|h| h.is_finite() && *h > 0.0);
            if let Some(height) = dragged {
                return height;
            }
        }
        self.heights.expected_item_height(index)
    }

    fn expected_content_height(&self) -> f32 {
        self.heights
            .expected_content_height(self.base.item_count())
    }

    fn on_item_geometry_changed(&mut self, key: ItemKey, size: Size) {
        let Some(index) = self.base.record_geometry(key, size) else {
            return;
        };
        self.waiting.remove(&index);
        let height = self.base.config().snap(size.height);
        if !(size.height.is_finite() && height > 0.0) {
            // The last waiting item may have been holding back a fill.
            if self.waiting.is_empty() {
                self.schedule_fill();
            }
            return;
        }
        if self.heights.register(index, height) {
            #[cfg(feature = "tracing")]
            trace!(index, height, "registered item height");
            self.apply_scroll_view_update(false);
        } else if self.waiting.is_empty() {
            self.schedule_fill();
        }
    }

    fn restore_view_state(&mut self, state: ViewState) {
        self.base.restore(state);
        let count = self.base.item_count();
        if count > 0 {
            self.forced_first = Some(state.first_visible_index.min(count - 1));
            self.forced_last = None;
        }
        let offset = self.base.scroll_offset();
        self.handle_scroll(offset, false);
        self.schedule_fill();
    }

    fn tick(&mut self) -> bool {
        let tasks = self.scheduler.take_pending();
        if tasks.is_empty() {
            return false;
        }
        for task in tasks {
            match task {
                DeferredTask::Fill => {
                    self.fill_handle = None;
                    self.fill();
                }
                DeferredTask::ResetScrollDirection => {
                    self.reset_handle = None;
                    self.direction = ScrollDirection::Idle;
                }
            }
        }
        true
    }

    fn has_pending_work(&self) -> bool {
        !self.scheduler.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::test_support::{ListSource, RecordingSurface};
    use pretty_assertions::assert_eq;

    type Controller = DynamicHeightController<ListSource, RecordingSurface>;

    fn controller(count: usize) -> Controller {
        let viewport = Size::new(300.0, 200.0);
        let mut c = DynamicHeightController::new(
            ListSource::new(count),
            RecordingSurface::new(viewport),
            VirtualizationConfig::default().with_default_item_height(20.0),
        )
        .unwrap();
        c.resize(viewport, 1);
        c
    }

    /// Report `height` for every item awaiting layout and tick until idle.
    fn settle(c: &mut Controller, height: f32) {
        for _ in 0..32 {
            let keys: Vec<ItemKey> = c.base().items_needing_layout().collect();
            for key in &keys {
                c.on_item_geometry_changed(*key, Size::new(100.0, height));
            }
            if !c.tick() && keys.is_empty() {
                return;
            }
        }
        panic!("layout did not settle");
    }

    #[test]
    fn resize_realizes_estimated_viewport() {
        let c = controller(100);
        // 200 / 20 estimated rows
        assert_eq!(c.base().active_items().len(), 10);
        assert_eq!(c.waiting_count(), 10);
        assert!(c.is_fill_scheduled());
    }

    #[test]
    fn fill_adds_overscan_below_when_idle() {
        let mut c = controller(100);
        settle(&mut c, 20.0);
        assert_eq!(c.base().visible_item_count(), 15);
        assert_eq!(c.base().first_visible_index(), 0);
        assert_eq!(c.height_cache().len(), 15);
    }

    #[test]
    fn same_layout_pass_does_not_regrow() {
        let mut c = controller(100);
        settle(&mut c, 20.0);
        let active = c.base().active_items().to_vec();
        c.resize(Size::new(300.0, 400.0), 1);
        assert_eq!(c.base().active_items(), &active[..]);
        c.resize(Size::new(300.0, 400.0), 2);
        assert!(c.base().active_items().len() > active.len());
    }

    #[test]
    fn measured_heights_replace_estimates() {
        let mut c = controller(10);
        settle(&mut c, 30.0);
        assert_eq!(c.expected_content_height(), 300.0);
        assert_eq!(c.expected_item_height(3), 30.0);
        assert_eq!(c.base().surface().content_height, 300.0);
    }

    #[test]
    fn geometry_for_hidden_or_bad_height_is_ignored() {
        let mut c = controller(10);
        let key = c.base().active_items()[0];
        c.on_item_geometry_changed(key, Size::new(10.0, f32::NAN));
        c.on_item_geometry_changed(key, Size::new(10.0, -4.0));
        assert!(c.height_cache().is_empty());
        assert!(!c.is_waiting_for_layout(0));
    }

    #[test]
    fn bad_heights_for_last_waiting_items_release_deferred_fill() {
        let mut c = controller(100);
        settle(&mut c, 20.0);
        c.on_scroll(Vec2::new(0.0, 1_000.0));
        assert!(c.tick());
        // Scrolling again before layout defers the next fill.
        c.on_scroll(Vec2::new(0.0, 1_020.0));
        assert!(c.tick());
        assert!(c.waiting_count() > 0);
        assert!(!c.has_pending_work());

        let keys: Vec<ItemKey> = c.base().items_needing_layout().collect();
        for key in keys {
            c.on_item_geometry_changed(key, Size::new(100.0, f32::NAN));
        }
        assert_eq!(c.waiting_count(), 0);
        assert!(c.is_fill_scheduled());
        while c.tick() {}
        assert_eq!(c.scroll_direction(), ScrollDirection::Idle);
    }

    #[test]
    fn scroll_direction_tracks_and_resets() {
        let mut c = controller(100);
        settle(&mut c, 20.0);
        c.on_scroll(Vec2::new(0.0, 100.0));
        assert_eq!(c.scroll_direction(), ScrollDirection::Down);
        // Fill runs with the direction, reset follows on the next tick.
        assert!(c.tick());
        assert_eq!(c.scroll_direction(), ScrollDirection::Down);
        while c.tick() {}
        assert_eq!(c.scroll_direction(), ScrollDirection::Idle);
        c.on_scroll(Vec2::new(0.0, 40.0));
        assert_eq!(c.scroll_direction(), ScrollDirection::Up);
    }

    #[test]
    fn scroll_to_last_sticks_to_bottom() {
        let mut c = controller(100);
        settle(&mut c, 20.0);
        c.scroll_to_item(ScrollTarget::Last);
        assert!(c.is_stuck_to_bottom());
        settle(&mut c, 20.0);
        let max = c.base().scrollable_height();
        assert_eq!(c.base().scroll_offset().y, max);
        assert_eq!(max, 100.0 * 20.0 - 200.0);
        assert_eq!(c.forced_target(), None);
    }

    #[test]
    fn stuck_view_follows_late_height_growth() {
        let mut c = controller(50);
        settle(&mut c, 20.0);
        c.scroll_to_item(ScrollTarget::Last);
        settle(&mut c, 20.0);
        let last = c.base().last_visible_item().unwrap();
        c.on_item_geometry_changed(last, Size::new(100.0, 60.0));
        while c.tick() {}
        assert!(c.is_stuck_to_bottom());
        assert_eq!(c.base().scroll_offset().y, c.base().scrollable_height());
    }

    #[test]
    fn refresh_drops_heights_of_removed_items() {
        let mut c = controller(20);
        settle(&mut c, 25.0);
        assert_eq!(c.height_cache().highest_cached_index(), Some(14));
        c.base_mut().source_mut().ids.truncate(5);
        c.refresh(false);
        assert!(c.height_cache().highest_cached_index().is_some_and(|h| h < 5));
        assert!(c.base().visible_item_count() <= 5);
    }

    #[test]
    fn refresh_unregisters_changed_ids() {
        let mut c = controller(20);
        settle(&mut c, 25.0);
        c.base_mut().source_mut().ids[2] = 999;
        c.refresh(false);
        assert_eq!(c.height_cache().get(2), None);
        assert_eq!(c.height_cache().get(3), Some(25.0));
    }

    #[test]
    fn empty_source_is_harmless() {
        let mut c = controller(0);
        c.on_scroll(Vec2::new(0.0, 50.0));
        c.scroll_to_item(ScrollTarget::Last);
        while c.tick() {}
        assert_eq!(c.base().active_items().len(), 0);
        assert_eq!(c.expected_content_height(), 0.0);
    }
}
