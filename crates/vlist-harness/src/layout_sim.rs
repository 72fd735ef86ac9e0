#![forbid(unsafe_code)]

//! Host layout simulation.
//!
//! A real host runs a layout pass, measures freshly bound wrappers, reports
//! their geometry and gives the controller an idle tick. [`LayoutSim`] plays
//! that role deterministically, taking item heights from the
//! [`RecordingSource`] so tests can assert against exact geometry.
//!
//! # Invariants
//!
//! 1. Every wrapper returned by `items_needing_layout` is reported once per
//!    round with its source height.
//! 2. `settle` stops at the first round with no deferred work and nothing
//!    left to measure, or after `max_rounds`.

use vlist_core::geometry::{Size, Vec2};
use vlist_widgets::collection::{CollectionVirtualizer, ItemKey, ScrollTarget};

use crate::fixtures::{RecordingSource, TestSurface};

/// Outcome of [`LayoutSim::settle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleReport {
    pub rounds: usize,
    pub measured: usize,
    pub settled: bool,
}

/// Deterministic stand-in for a host's layout and frame loop.
#[derive(Debug, Clone)]
pub struct LayoutSim {
    max_rounds: usize,
    item_width: f32,
    layout_pass: u64,
}

impl Default for LayoutSim {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutSim {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_rounds: 256,
            item_width: 100.0,
            layout_pass: 0,
        }
    }

    #[must_use]
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds.max(1);
        self
    }

    /// Width reported for every measured wrapper.
    #[must_use]
    pub fn with_item_width(mut self, width: f32) -> Self {
        self.item_width = width;
        self
    }

    #[must_use]
    pub fn layout_pass(&self) -> u64 {
        self.layout_pass
    }

    /// Report geometry for every wrapper awaiting layout. Returns how many
    /// were measured.
    pub fn measure<C>(&self, view: &mut C) -> usize
    where
        C: CollectionVirtualizer<RecordingSource, TestSurface>,
    {
        let keys: Vec<ItemKey> = view.base().items_needing_layout().collect();
        let mut measured = 0;
        for key in keys {
            let base = view.base();
            let Some(height) = base
                .item(key)
                .and_then(|item| item.bound_index())
                .and_then(|index| base.source().height(index))
            else {
                continue;
            };
            view.on_item_geometry_changed(key, Size::new(self.item_width, height));
            measured += 1;
        }
        measured
    }

    /// Alternate measuring and ticking until the controller is idle.
    pub fn settle<C>(&self, view: &mut C) -> SettleReport
    where
        C: CollectionVirtualizer<RecordingSource, TestSurface>,
    {
        let mut report = SettleReport::default();
        while report.rounds < self.max_rounds {
            report.rounds += 1;
            let measured = self.measure(view);
            report.measured += measured;
            let ran = view.tick();
            if !ran && measured == 0 && !view.has_pending_work() {
                report.settled = true;
                break;
            }
        }
        report
    }

    /// Run a new layout pass at the surface's viewport size, then settle.
    pub fn run_layout<C>(&mut self, view: &mut C) -> SettleReport
    where
        C: CollectionVirtualizer<RecordingSource, TestSurface>,
    {
        self.layout_pass += 1;
        let viewport = view.base().surface().viewport;
        view.resize(viewport, self.layout_pass);
        self.settle(view)
    }

    /// Resize the surface's viewport and run a layout pass.
    pub fn resize_to<C>(&mut self, view: &mut C, width: f32, height: f32) -> SettleReport
    where
        C: CollectionVirtualizer<RecordingSource, TestSurface>,
    {
        view.base_mut().surface_mut().viewport = Size::new(width, height);
        self.run_layout(view)
    }

    /// User scroll: move the surface to `y` (clamped to its vertical range
    /// like a real scroll view), notify and settle.
    pub fn scroll_to<C>(&self, view: &mut C, y: f32) -> SettleReport
    where
        C: CollectionVirtualizer<RecordingSource, TestSurface>,
    {
        let surface = view.base().surface();
        let y = y.clamp(0.0, surface.vertical_range.max(0.0));
        let offset = Vec2::new(surface.offset.x, y);
        view.base_mut().surface_mut().offset = offset;
        view.on_scroll(offset);
        self.settle(view)
    }

    pub fn scroll_by<C>(&self, view: &mut C, dy: f32) -> SettleReport
    where
        C: CollectionVirtualizer<RecordingSource, TestSurface>,
    {
        let y = view.base().surface().offset.y + dy;
        self.scroll_to(view, y.max(0.0))
    }

    /// Programmatic `scroll_to_item`, then settle.
    pub fn scroll_to_item<C>(&self, view: &mut C, target: impl Into<ScrollTarget>) -> SettleReport
    where
        C: CollectionVirtualizer<RecordingSource, TestSurface>,
    {
        view.scroll_to_item(target.into());
        self.settle(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlist_core::VirtualizationConfig;
    use vlist_widgets::collection::DynamicHeightController;

    #[test]
    fn settle_reaches_quiescence() {
        let mut view = DynamicHeightController::new(
            RecordingSource::uniform(100, 24.0),
            TestSurface::new(200.0, 240.0),
            VirtualizationConfig::default(),
        )
        .unwrap();
        let mut sim = LayoutSim::new();
        let report = sim.run_layout(&mut view);
        assert!(report.settled, "{report:?}");
        assert!(report.measured >= 10);
        assert!(!view.has_pending_work());
        assert_eq!(view.base().items_needing_layout().count(), 0);
    }

    #[test]
    fn layout_pass_counter_advances() {
        let mut view = DynamicHeightController::new(
            RecordingSource::uniform(5, 24.0),
            TestSurface::new(200.0, 240.0),
            VirtualizationConfig::default(),
        )
        .unwrap();
        let mut sim = LayoutSim::new();
        sim.run_layout(&mut view);
        sim.run_layout(&mut view);
        assert_eq!(sim.layout_pass(), 2);
    }
}
