#![forbid(unsafe_code)]

//! Virtualized collection controllers.
//!
//! # Role in vlist
//! `vlist-widgets` turns a [`CollectionSource`](collection::CollectionSource)
//! of arbitrarily many items into a small window of recycled wrappers laid
//! out on a host [`ScrollSurface`](collection::ScrollSurface). Hosts drive it
//! with layout, scroll and geometry events; it answers with bind/unbind calls
//! and surface updates (content height, padding, offset, ranges).
//!
//! # Primary responsibilities
//! - **Item pool**: generational wrapper storage with a free list.
//! - **Height cache**: measured heights with O(log n) prefix sums.
//! - **Strategies**: fixed-height and dynamic-height virtualization behind
//!   one trait, plus a runtime-switchable controller.
//! - **Persistence**: [`Stateful`](stateful::Stateful) snapshots of scroll
//!   state, JSON-encoded with the `state-persistence` feature.

pub mod collection;
pub mod stateful;

pub use collection::{
    CollectionSource, CollectionVirtualizer, DynamicHeightController, FixedHeightController,
    FixedItemHeight, HeightCache, ItemKey, ItemPool, ScrollSurface, ScrollTarget,
    VirtualizationController, VirtualizationMethod, ViewState,
};
pub use stateful::{StateKey, Stateful};
