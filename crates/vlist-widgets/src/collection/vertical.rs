#![forbid(unsafe_code)]

//! Shared vertical controller: binding, window reconciliation, pooling and
//! drag support.
//!
//! Both strategies wrap a [`VerticalController`]. It owns the source, the
//! surface, the pool and the *active list*: the ordered wrappers realizing
//! indices `first_visible_index + position`. Strategies decide which window
//! to realize; this type moves wrappers into that window with as little
//! rebinding as possible.
//!
//! # Invariants
//!
//! 1. At most one active wrapper is bound to a given index.
//! 2. Active wrapper at position `p` is bound to `first_visible_index + p`,
//!    hidden, or a drag ghost.
//! 3. Every active wrapper is a child of the content container. The dragged
//!    wrapper stays in the container while it is out of the active list.
//! 4. Every `bind_item` is matched by one `unbind_item` before the wrapper is
//!    rebound, released or destroyed.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Index beyond source | Wrapper hidden and unbound |
//! | Stale key | Operation ignored |
//! | Scroll by more than the window | Plain rebind, no swap |

use std::fmt;

use smallvec::SmallVec;
use vlist_core::config::VirtualizationConfig;
use vlist_core::geometry::{Size, Vec2};

#[cfg(feature = "tracing")]
use vlist_core::logging::{debug, trace};

use super::item::{ItemKey, ReusableItem};
use super::pool::ItemPool;
use super::source::CollectionSource;
use super::surface::{ContentContainer, ScrollSurface};
use super::view_state::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DragState {
    key: ItemKey,
    index: usize,
}

/// Common state and binding logic for vertical collection views.
pub struct VerticalController<S: CollectionSource, V: ScrollSurface> {
    source: S,
    surface: V,
    config: VirtualizationConfig,
    pool: ItemPool<S::Element>,
    active: Vec<ItemKey>,
    container: ContentContainer,
    state: ViewState,
    viewport: Size,
    drag: Option<DragState>,
    widest_item: f32,
    persistence_id: Option<String>,
    /// Reused buffer for wrappers moving between window ends.
    scratch: SmallVec<[ItemKey; 16]>,
}

impl<S: CollectionSource, V: ScrollSurface> fmt::Debug for VerticalController<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerticalController")
            .field("item_count", &self.source.item_count())
            .field("active", &self.active)
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("pool_len", &self.pool.len())
            .field("drag", &self.drag)
            .finish()
    }
}

impl<S: CollectionSource, V: ScrollSurface> VerticalController<S, V> {
    /// Create a controller over `source` and `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`vlist_core::Error::Config`] if `config` fails validation.
    pub fn new(source: S, surface: V, config: VirtualizationConfig) -> vlist_core::Result<Self> {
        let config = config.validated()?;
        let viewport = surface.viewport_size();
        let scroll_offset = surface.scroll_offset();
        Ok(Self {
            source,
            surface,
            config,
            pool: ItemPool::new(),
            active: Vec::new(),
            container: ContentContainer::new(),
            state: ViewState {
                scroll_offset: if scroll_offset.is_finite() {
                    scroll_offset
                } else {
                    Vec2::ZERO
                },
                ..ViewState::default()
            },
            viewport,
            drag: None,
            widest_item: 0.0,
            persistence_id: None,
            scratch: SmallVec::new(),
        })
    }

    /// Key persisted state by `id`.
    #[must_use]
    pub fn with_persistence_id(mut self, id: impl Into<String>) -> Self {
        self.persistence_id = Some(id.into());
        self
    }

    pub fn set_persistence_id(&mut self, id: impl Into<String>) {
        self.persistence_id = Some(id.into());
    }

    #[must_use = "use the persistence id (if any)"]
    pub fn persistence_id(&self) -> Option<&str> {
        self.persistence_id.as_deref()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable source access. Call `refresh` after changing its contents.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[must_use]
    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    #[must_use]
    pub fn config(&self) -> &VirtualizationConfig {
        &self.config
    }

    #[must_use]
    pub fn pool(&self) -> &ItemPool<S::Element> {
        &self.pool
    }

    #[must_use]
    pub fn container(&self) -> &ContentContainer {
        &self.container
    }

    /// Active wrappers in window order.
    #[must_use]
    pub fn active_items(&self) -> &[ItemKey] {
        &self.active
    }

    #[must_use]
    pub fn item(&self, key: ItemKey) -> Option<&ReusableItem<S::Element>> {
        self.pool.get(key)
    }

    #[inline]
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.source.item_count()
    }

    #[inline]
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    #[inline]
    #[must_use]
    pub fn scroll_offset(&self) -> Vec2 {
        self.state.scroll_offset
    }

    #[inline]
    #[must_use]
    pub fn first_visible_index(&self) -> usize {
        self.state.first_visible_index
    }

    #[inline]
    #[must_use]
    pub fn content_padding(&self) -> f32 {
        self.state.content_padding
    }

    #[inline]
    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.state.content_height
    }

    #[must_use]
    pub fn view_state(&self) -> ViewState {
        self.state
    }

    /// Largest valid vertical offset for the current content height.
    #[must_use]
    pub fn scrollable_height(&self) -> f32 {
        (self.state.content_height - self.viewport.height).max(0.0)
    }

    /// Widest width reported by any realized item since the last rebuild.
    #[inline]
    #[must_use]
    pub fn widest_item_width(&self) -> f32 {
        self.widest_item
    }

    // ------------------------------------------------------------------
    // Visible-item queries
    // ------------------------------------------------------------------

    /// First active wrapper that is bound and shown.
    #[must_use]
    pub fn first_visible_item(&self) -> Option<ItemKey> {
        self.active
            .iter()
            .copied()
            .find(|k| self.pool.get(*k).is_some_and(ReusableItem::is_realized))
    }

    /// Last active wrapper that is bound and shown.
    #[must_use]
    pub fn last_visible_item(&self) -> Option<ItemKey> {
        self.active
            .iter()
            .rev()
            .copied()
            .find(|k| self.pool.get(*k).is_some_and(ReusableItem::is_realized))
    }

    /// Number of active wrappers bound and shown.
    #[must_use]
    pub fn visible_item_count(&self) -> usize {
        self.active
            .iter()
            .filter(|k| self.pool.get(**k).is_some_and(ReusableItem::is_realized))
            .count()
    }

    /// Active wrapper bound to `index`.
    #[must_use]
    pub fn item_for_index(&self, index: usize) -> Option<ItemKey> {
        let pos = index.checked_sub(self.state.first_visible_index)?;
        let key = *self.active.get(pos)?;
        let item = self.pool.get(key)?;
        (item.bound_index() == Some(index) && item.is_visible()).then_some(key)
    }

    /// Realized wrappers bound since their last geometry report.
    pub fn items_needing_layout(&self) -> impl Iterator<Item = ItemKey> + '_ {
        self.active.iter().copied().filter(|k| {
            self.pool
                .get(*k)
                .is_some_and(|item| item.is_realized() && item.needs_layout())
        })
    }

    // ------------------------------------------------------------------
    // Drag
    // ------------------------------------------------------------------

    #[must_use]
    pub fn dragged_index(&self) -> Option<usize> {
        self.drag.map(|d| d.index)
    }

    #[must_use]
    pub fn dragged_item(&self) -> Option<ItemKey> {
        self.drag.map(|d| d.key)
    }

    /// Lift `key` out of the window; a zero-height ghost holds its index.
    ///
    /// Returns `false` if a drag is already running or `key` is not a bound
    /// active wrapper.
    pub fn start_drag_item(&mut self, key: ItemKey) -> bool {
        if self.drag.is_some() {
            return false;
        }
        let Some(pos) = self.active.iter().position(|k| *k == key) else {
            return false;
        };
        let Some(index) = self.pool.get(key).and_then(ReusableItem::bound_index) else {
            return false;
        };
        self.active.remove(pos);
        self.drag = Some(DragState { key, index });
        let container_pos = self.container.position(key);
        let ghost = self.get_or_make_item_at(Some(pos), container_pos);
        self.setup(ghost, index, true);
        #[cfg(feature = "tracing")]
        debug!(index, position = pos, "drag started");
        true
    }

    /// Put the dragged wrapper back into the window and drop the ghost.
    ///
    /// The wrapper lands at `drop_index` when that index is inside the
    /// window, else where its ghost sits. With neither in the window it is
    /// released. Rebinding after a reorder is left to the caller's
    /// `refresh`.
    pub fn finish_drag(&mut self, drop_index: Option<usize>) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        #[cfg(feature = "tracing")]
        debug!(from = drag.index, to = ?drop_index, "drag ended");

        let first = self.state.first_visible_index;
        let window = self.active.len();
        let ghost_pos = self
            .active
            .iter()
            .position(|k| self.pool.get(*k).is_some_and(ReusableItem::is_drag_ghost));
        let slot = drop_index
            .and_then(|index| index.checked_sub(first))
            .filter(|pos| *pos < window)
            .or(ghost_pos);
        let Some(slot) = slot else {
            self.discard(drag.key);
            return;
        };

        // Keep the window length: the dragged wrapper takes the ghost's place,
        // or the trailing wrapper's when the ghost scrolled away.
        match ghost_pos {
            Some(pos) => {
                let ghost = self.active.remove(pos);
                self.discard(ghost);
            }
            None => {
                self.release_item(window - 1);
            }
        }
        let slot = slot.min(self.active.len());
        self.active.insert(slot, drag.key);
        match self.active.get(slot + 1) {
            Some(next) => self.container.place_behind(drag.key, *next),
            None => self.container.bring_to_front(drag.key),
        }
        if let Some(item) = self.pool.get_mut(drag.key) {
            // Still bound to the index it was lifted from.
            item.needs_layout = true;
        }
    }

    // ------------------------------------------------------------------
    // Binding
    // ------------------------------------------------------------------

    /// Bind the wrapper `key` to `index`.
    ///
    /// Skips the rebind when the wrapper already shows the same id at the
    /// same index, unless `force` is set.
    pub fn setup(&mut self, key: ItemKey, index: usize, force: bool) {
        let count = self.source.item_count();
        let drag = self.drag;
        let first = self.state.first_visible_index;
        let Some(item) = self.pool.get_mut(key) else {
            return;
        };

        if let Some(drag) = drag {
            if drag.index == index && drag.key != key {
                if let Some(old) = item.bound_index() {
                    self.source.unbind_item(item.element_mut(), old);
                }
                item.make_ghost(index);
                return;
            }
        }

        let was_ghost = item.drag_ghost;
        item.drag_ghost = false;

        if index >= count {
            if let Some(old) = item.index.filter(|_| !was_ghost) {
                self.source.unbind_item(item.element_mut(), old);
            }
            item.hide();
            return;
        }

        let id = self.source.id_for_index(index);
        if !force && !was_ghost && item.visible && item.index == Some(index) && item.id == Some(id)
        {
            return;
        }
        item.visible = true;

        // Keep paint order aligned with window order.
        match index.checked_sub(first) {
            Some(rel) if rel >= self.container.len() => self.container.bring_to_front(key),
            Some(rel) => {
                if let Some(sibling) = self.container.get(rel) {
                    self.container.place_behind(key, sibling);
                }
            }
            None => self.container.send_to_back(key),
        }

        if let Some(old) = item.index.filter(|_| !was_ghost) {
            self.source.unbind_item(item.element_mut(), old);
        }
        item.index = Some(index);
        item.id = Some(id);
        self.source.bind_item(item.element_mut(), index);
        item.needs_layout = true;
        #[cfg(feature = "tracing")]
        trace!(slot = key.slot(), index, id, "bound item");
    }

    /// Hide and unbind `key` while keeping it active.
    pub fn hide_item(&mut self, key: ItemKey) {
        let Some(item) = self.pool.get_mut(key) else {
            return;
        };
        if let Some(old) = item.bound_index() {
            self.source.unbind_item(item.element_mut(), old);
        }
        item.hide();
    }

    /// Take a wrapper for active position `active_pos` and container position
    /// `container_pos` (`None` appends).
    ///
    /// A hidden active wrapper is moved into place before the pool is asked
    /// for another.
    pub fn get_or_make_item_at(
        &mut self,
        active_pos: Option<usize>,
        container_pos: Option<usize>,
    ) -> ItemKey {
        let hidden = self
            .active
            .iter()
            .position(|k| self.pool.get(*k).is_some_and(|item| !item.visible));
        let key = match hidden {
            Some(pos) => self.active.remove(pos),
            None => {
                let source = &mut self.source;
                self.pool.get_or_make(|| source.make_item())
            }
        };
        let pos = active_pos.map_or(self.active.len(), |p| p.min(self.active.len()));
        self.active.insert(pos, key);
        match container_pos {
            Some(p) => self.container.insert(p, key),
            None => self.container.push(key),
        }
        key
    }

    /// Unbind the wrapper at active `position` and return it to the pool.
    pub fn release_item(&mut self, position: usize) -> Option<ItemKey> {
        if position >= self.active.len() {
            return None;
        }
        let key = self.active.remove(position);
        self.discard(key);
        Some(key)
    }

    fn discard(&mut self, key: ItemKey) {
        if let Some(item) = self.pool.get_mut(key) {
            if let Some(old) = item.bound_index() {
                self.source.unbind_item(item.element_mut(), old);
            }
            item.hide();
        }
        self.container.remove(key);
        self.pool.release(key);
    }

    // ------------------------------------------------------------------
    // Window reconciliation
    // ------------------------------------------------------------------

    /// Shift the realized window so it starts at `new_first`.
    ///
    /// Wrappers leaving one end are moved to the other and only indices that
    /// changed are rebound, so a scroll of `Δ` items costs `Δ` binds.
    pub fn reconcile_window(&mut self, new_first: usize) {
        let old_first = self.state.first_visible_index;
        self.state.first_visible_index = new_first;
        if self.active.is_empty() || new_first == old_first {
            return;
        }
        let len = self.active.len();
        if new_first < old_first {
            let moving = (old_first - new_first).min(len);
            for _ in 0..moving {
                if let Some(last) = self.active.pop() {
                    self.container.send_to_back(last);
                    self.scratch.push(last);
                }
            }
            self.scratch.reverse();
            self.active.splice(0..0, self.scratch.drain(..));
        } else {
            let moving = new_first - old_first;
            if moving < len {
                for key in self.active.drain(..moving) {
                    self.container.bring_to_front(key);
                    self.scratch.push(key);
                }
                self.active.extend(self.scratch.drain(..));
            }
        }
        #[cfg(feature = "tracing")]
        trace!(old_first, new_first, active = len, "reconciled window");

        for pos in 0..self.active.len() {
            let key = self.active[pos];
            self.setup(key, new_first + pos, false);
        }
    }

    /// Revalidate or rebuild the active window.
    ///
    /// `rebuild` destroys every wrapper. Otherwise in-range wrappers are
    /// rebound in place (always when `always_rebind_on_refresh`, else only on
    /// id change) and shown wrappers past the end are released.
    pub fn refresh(&mut self, rebuild: bool) {
        let count = self.source.item_count();
        if rebuild {
            let dragged = self.drag.take().map(|d| d.key);
            let active = std::mem::take(&mut self.active);
            for key in active.into_iter().chain(dragged) {
                if let Some(item) = self.pool.get_mut(key) {
                    if let Some(old) = item.bound_index() {
                        self.source.unbind_item(item.element_mut(), old);
                    }
                    item.hide();
                }
            }
            let source = &mut self.source;
            self.pool.clear(|element| source.destroy_item(element));
            self.container.clear();
            self.widest_item = 0.0;
            self.state.first_visible_index = self
                .state
                .first_visible_index
                .min(count.saturating_sub(1));
            #[cfg(feature = "tracing")]
            debug!(count, "rebuilt collection");
            return;
        }

        let first = self.state.first_visible_index;
        let force = self.config.always_rebind_on_refresh;
        let mut pos = 0;
        while pos < self.active.len() {
            let key = self.active[pos];
            let index = first + pos;
            let visible = self.pool.get(key).is_some_and(|item| item.visible);
            if index < count {
                self.setup(key, index, force);
                pos += 1;
            } else if visible {
                self.release_item(pos);
            } else {
                pos += 1;
            }
        }
        self.state.first_visible_index = first.min(count.saturating_sub(1));
    }

    // ------------------------------------------------------------------
    // Surface updates (strategy use)
    // ------------------------------------------------------------------

    pub(crate) fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
        self.update_horizontal_range();
    }

    pub(crate) fn set_first_visible_index(&mut self, first: usize) {
        self.state.first_visible_index = first;
    }

    pub(crate) fn record_scroll_offset(&mut self, offset: Vec2) {
        self.state.scroll_offset = offset;
    }

    pub(crate) fn apply_padding(&mut self, padding: f32) {
        self.state.content_padding = padding;
        self.surface.set_content_padding_top(padding);
    }

    /// Push content height and vertical range to the surface. Returns the
    /// new scrollable height.
    pub(crate) fn apply_content_height(&mut self, height: f32) -> f32 {
        self.state.content_height = height;
        self.surface.set_content_height(height);
        let scrollable = self.scrollable_height();
        self.surface.set_vertical_range(scrollable);
        scrollable
    }

    /// Clamp the vertical offset into `0..=max`. Returns the clamped offset
    /// if it moved.
    pub(crate) fn clamp_scroll_offset(&mut self, max: f32) -> Option<Vec2> {
        let offset = self.state.scroll_offset;
        let y = offset.y.clamp(0.0, max.max(0.0));
        if y == offset.y {
            return None;
        }
        let clamped = offset.with_y(y);
        self.state.scroll_offset = clamped;
        self.surface.set_scroll_offset(clamped);
        Some(clamped)
    }

    /// Move the surface to `offset` and record it.
    pub(crate) fn move_scroll_offset(&mut self, offset: Vec2) {
        self.state.scroll_offset = offset;
        self.surface.set_scroll_offset(offset);
    }

    /// Store the reported size of `key`. Returns the bound index when the
    /// wrapper is realized and in range.
    pub(crate) fn record_geometry(&mut self, key: ItemKey, size: Size) -> Option<usize> {
        let count = self.source.item_count();
        let item = self.pool.get_mut(key)?;
        if item.drag_ghost || !item.visible {
            return None;
        }
        let index = item.index?;
        item.layout_size = size;
        item.needs_layout = false;
        if size.width.is_finite() && size.width > self.widest_item {
            self.widest_item = size.width;
            self.update_horizontal_range();
        }
        (index < count).then_some(index)
    }

    fn update_horizontal_range(&mut self) {
        let range = (self.widest_item - self.viewport.width).max(0.0);
        if range.is_finite() {
            self.surface.set_horizontal_range(range);
        }
    }

    /// Replace scroll state with a restored snapshot.
    pub(crate) fn restore(&mut self, state: ViewState) {
        let offset = if state.scroll_offset.is_finite() {
            state.scroll_offset
        } else {
            Vec2::ZERO
        };
        // The window index is recomputed by the strategy from the offset.
        self.state.scroll_offset = offset;
        if state.content_padding.is_finite() {
            self.state.content_padding = state.content_padding;
        }
        if state.content_height.is_finite() {
            self.state.content_height = state.content_height;
        }
        self.surface.set_scroll_offset(offset);
    }
}
