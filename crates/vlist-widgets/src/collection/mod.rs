#![forbid(unsafe_code)]

//! Virtualized collection views.
//!
//! A collection view realizes only the items intersecting its viewport and
//! recycles their wrappers as the user scrolls. Two strategies share one
//! contract ([`CollectionVirtualizer`]):
//!
//! - [`FixedHeightController`]: every item has the same height; O(1) math.
//! - [`DynamicHeightController`]: heights are discovered after layout and
//!   cached; unmeasured items are estimated with the running average.
//!
//! [`VirtualizationController`] is the closed sum of both, for hosts that
//! switch strategy at runtime.
//!
//! # Host protocol
//!
//! 1. Call `resize(viewport, layout_pass)` on every layout pass.
//! 2. Call `on_scroll(offset)` after the user scrolls the surface.
//! 3. Lay out the wrappers returned by `items_needing_layout()` and report
//!    each with `on_item_geometry_changed(key, size)`.
//! 4. Call `tick()` once per idle frame to run deferred fill work.
//! 5. Call `refresh(false)` after the source changes, `refresh(true)` after
//!    the element template changes.
//!
//! # Example
//!
//! ```ignore
//! use vlist_widgets::collection::{CollectionVirtualizer, DynamicHeightController};
//!
//! let mut view = DynamicHeightController::new(source, surface, config)?;
//! view.resize(Size::new(320.0, 480.0), 1);
//! view.tick();
//! for key in view.base().items_needing_layout().collect::<Vec<_>>() {
//!     view.on_item_geometry_changed(key, measure(key));
//! }
//! ```

pub mod dynamic;
pub mod fixed;
pub mod height_cache;
pub mod item;
pub mod pool;
pub mod source;
pub mod surface;
pub mod vertical;
pub mod view_state;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;

use vlist_core::config::VirtualizationConfig;
use vlist_core::geometry::{Size, Vec2, round_to_pixel_grid};

pub use dynamic::{DynamicHeightController, ScrollDirection};
pub use fixed::FixedHeightController;
pub use height_cache::HeightCache;
pub use item::{ItemKey, ReusableItem};
pub use pool::ItemPool;
pub use source::CollectionSource;
pub use surface::{ContentContainer, ScrollSurface};
pub use vertical::VerticalController;
pub use view_state::ViewState;

use crate::stateful::{StateKey, Stateful};

/// Where `scroll_to_item` should bring into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Index(usize),
    /// The last item, keeping the view pinned to the bottom.
    Last,
}

impl From<usize> for ScrollTarget {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A fixed item height known to be finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedItemHeight(f32);

impl FixedItemHeight {
    /// # Errors
    ///
    /// [`vlist_core::Error::InvalidItemHeight`] unless `height` is finite
    /// and `> 0`.
    pub fn new(height: f32) -> vlist_core::Result<Self> {
        if height.is_finite() && height > 0.0 {
            Ok(Self(height))
        } else {
            Err(vlist_core::Error::InvalidItemHeight(height))
        }
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }

    /// Snap to the pixel grid, never below one device pixel.
    #[must_use]
    pub fn resolve(self, pixels_per_point: f32) -> f32 {
        let snapped = round_to_pixel_grid(self.0, pixels_per_point);
        let min = 1.0 / pixels_per_point;
        if min.is_finite() && snapped < min {
            min
        } else {
            snapped
        }
    }
}

/// Strategy selector for [`VirtualizationController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VirtualizationMethod {
    FixedHeight(FixedItemHeight),
    DynamicHeight,
}

impl VirtualizationMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FixedHeight(_) => "fixed_height",
            Self::DynamicHeight => "dynamic_height",
        }
    }
}

impl fmt::Display for VirtualizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// Operations every virtualization strategy provides.
pub trait CollectionVirtualizer<S: CollectionSource, V: ScrollSurface> {
    /// Shared binding and pooling state.
    fn base(&self) -> &VerticalController<S, V>;

    fn base_mut(&mut self) -> &mut VerticalController<S, V>;

    /// Revalidate bindings against the source, or destroy every wrapper and
    /// start over when `rebuild` is set.
    fn refresh(&mut self, rebuild: bool);

    /// Scroll the minimum distance that brings `target` fully into view.
    fn scroll_to_item(&mut self, target: ScrollTarget);

    /// Viewport size changed. Heavy work runs once per distinct
    /// `layout_pass`.
    fn resize(&mut self, size: Size, layout_pass: u64);

    /// The surface scrolled to `offset`.
    fn on_scroll(&mut self, offset: Vec2);

    /// Index of the item under content position `position`.
    fn index_from_position(&self, position: Vec2) -> usize;

    fn expected_item_height(&self, index: usize) -> f32;

    fn expected_content_height(&self) -> f32;

    /// The host laid out `key` at `size`.
    fn on_item_geometry_changed(&mut self, key: ItemKey, size: Size);

    /// Apply a persisted snapshot.
    fn restore_view_state(&mut self, state: ViewState);

    /// Run deferred work. Returns whether anything ran.
    fn tick(&mut self) -> bool {
        false
    }

    /// Whether deferred work is waiting for `tick`.
    fn has_pending_work(&self) -> bool {
        false
    }

    /// Begin dragging `key`; its index is held by a ghost placeholder.
    fn start_drag_item(&mut self, key: ItemKey) -> bool {
        self.base_mut().start_drag_item(key)
    }

    /// Finish a drag. The host applies any reorder to the source before
    /// calling this; bindings are then revalidated.
    fn end_drag(&mut self, drop_index: Option<usize>) {
        self.base_mut().finish_drag(drop_index);
        self.refresh(false);
    }
}

// ---------------------------------------------------------------------------
// Closed strategy set
// ---------------------------------------------------------------------------

/// Either strategy behind one type.
pub enum VirtualizationController<S: CollectionSource, V: ScrollSurface> {
    Fixed(FixedHeightController<S, V>),
    Dynamic(DynamicHeightController<S, V>),
}

impl<S: CollectionSource, V: ScrollSurface> fmt::Debug for VirtualizationController<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(c) => f.debug_tuple("Fixed").field(c).finish(),
            Self::Dynamic(c) => f.debug_tuple("Dynamic").field(c).finish(),
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            VirtualizationController::Fixed($c) => $body,
            VirtualizationController::Dynamic($c) => $body,
        }
    };
}

impl<S: CollectionSource, V: ScrollSurface> VirtualizationController<S, V> {
    /// Build a controller using `method`.
    ///
    /// # Errors
    ///
    /// [`vlist_core::Error::Config`] if `config` fails validation.
    pub fn new(
        source: S,
        surface: V,
        config: VirtualizationConfig,
        method: VirtualizationMethod,
    ) -> vlist_core::Result<Self> {
        let base = VerticalController::new(source, surface, config)?;
        Ok(Self::from_base(base, method))
    }

    fn from_base(base: VerticalController<S, V>, method: VirtualizationMethod) -> Self {
        match method {
            VirtualizationMethod::FixedHeight(height) => {
                Self::Fixed(FixedHeightController::from_base(base, height))
            }
            VirtualizationMethod::DynamicHeight => {
                Self::Dynamic(DynamicHeightController::from_base(base))
            }
        }
    }

    #[must_use]
    pub fn method(&self) -> VirtualizationMethod {
        match self {
            Self::Fixed(c) => VirtualizationMethod::FixedHeight(FixedItemHeight(c.item_height())),
            Self::Dynamic(_) => VirtualizationMethod::DynamicHeight,
        }
    }

    /// Swap strategy, keeping source, surface, config and scroll position.
    ///
    /// Every wrapper is destroyed; the new strategy realizes a fresh window.
    #[must_use]
    pub fn switch_method(self, method: VirtualizationMethod) -> Self {
        let state = self.base().view_state();
        let mut base = match self {
            Self::Fixed(c) => c.into_base(),
            Self::Dynamic(c) => c.into_base(),
        };
        base.refresh(true);
        let mut next = Self::from_base(base, method);
        next.restore_view_state(state);
        match &mut next {
            Self::Fixed(c) => c.relayout(),
            Self::Dynamic(c) => c.relayout(),
        }
        next
    }
}

impl<S: CollectionSource, V: ScrollSurface> CollectionVirtualizer<S, V>
    for VirtualizationController<S, V>
{
    fn base(&self) -> &VerticalController<S, V> {
        dispatch!(self, c => c.base())
    }

    fn base_mut(&mut self) -> &mut VerticalController<S, V> {
        dispatch!(self, c => c.base_mut())
    }

    fn refresh(&mut self, rebuild: bool) {
        dispatch!(self, c => c.refresh(rebuild));
    }

    fn scroll_to_item(&mut self, target: ScrollTarget) {
        dispatch!(self, c => c.scroll_to_item(target));
    }

    fn resize(&mut self, size: Size, layout_pass: u64) {
        dispatch!(self, c => c.resize(size, layout_pass));
    }

    fn on_scroll(&mut self, offset: Vec2) {
        dispatch!(self, c => c.on_scroll(offset));
    }

    fn index_from_position(&self, position: Vec2) -> usize {
        dispatch!(self, c => c.index_from_position(position))
    }

    fn expected_item_height(&self, index: usize) -> f32 {
        dispatch!(self, c => c.expected_item_height(index))
    }

    fn expected_content_height(&self) -> f32 {
        dispatch!(self, c => c.expected_content_height())
    }

    fn on_item_geometry_changed(&mut self, key: ItemKey, size: Size) {
        dispatch!(self, c => c.on_item_geometry_changed(key, size));
    }

    fn restore_view_state(&mut self, state: ViewState) {
        dispatch!(self, c => c.restore_view_state(state));
    }

    fn tick(&mut self) -> bool {
        dispatch!(self, c => c.tick())
    }

    fn has_pending_work(&self) -> bool {
        dispatch!(self, c => c.has_pending_work())
    }

    fn start_drag_item(&mut self, key: ItemKey) -> bool {
        dispatch!(self, c => c.start_drag_item(key))
    }

    fn end_drag(&mut self, drop_index: Option<usize>) {
        dispatch!(self, c => c.end_drag(drop_index));
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

const STATE_WIDGET_TYPE: &str = "CollectionView";

macro_rules! impl_stateful {
    ($ty:ident) => {
        impl<S: CollectionSource, V: ScrollSurface> Stateful for $ty<S, V> {
            type State = ViewState;

            fn state_key(&self) -> StateKey {
                StateKey::new(
                    STATE_WIDGET_TYPE,
                    self.base().persistence_id().unwrap_or("default"),
                )
            }

            fn save_state(&self) -> ViewState {
                self.base().view_state()
            }

            fn restore_state(&mut self, state: ViewState) {
                self.restore_view_state(state);
            }
        }
    };
}

impl_stateful!(FixedHeightController);
impl_stateful!(DynamicHeightController);
impl_stateful!(VirtualizationController);
