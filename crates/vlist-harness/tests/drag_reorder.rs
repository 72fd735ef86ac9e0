#![forbid(unsafe_code)]

//! Drag-to-reorder: ghost placeholders, paint order and rebinding after the
//! host reorders its source.
//!
//! Run with: cargo test -p vlist-harness --test drag_reorder

use pretty_assertions::assert_eq;
use tracing::Level;
use vlist_core::VirtualizationConfig;
use vlist_harness::{LayoutSim, RecordingSource, TestSurface, check_window};
use vlist_widgets::collection::{
    CollectionSource, CollectionVirtualizer, DynamicHeightController, FixedHeightController,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::INFO)
        .try_init();
}

fn fixed(count: usize) -> (FixedHeightController<RecordingSource, TestSurface>, LayoutSim) {
    let mut view = FixedHeightController::new(
        RecordingSource::uniform(count, 20.0),
        TestSurface::new(300.0, 200.0),
        VirtualizationConfig::default(),
        20.0,
    )
    .expect("valid fixed height");
    let mut sim = LayoutSim::new();
    sim.run_layout(&mut view);
    (view, sim)
}

#[test]
fn ghost_holds_the_dragged_slot() {
    init_tracing();
    let (mut view, _) = fixed(100);
    let key = view.base().active_items()[3];
    let id = view.base().item(key).and_then(|item| item.id());

    assert!(view.start_drag_item(key));
    assert_eq!(view.base().dragged_index(), Some(3));
    assert_eq!(view.base().dragged_item(), Some(key));

    let ghost = view.base().active_items()[3];
    assert_ne!(ghost, key);
    let ghost_item = view.base().item(ghost).unwrap();
    assert!(ghost_item.is_drag_ghost());
    assert_eq!(ghost_item.index(), Some(3));
    assert_eq!(ghost_item.layout_size().height, 0.0);

    // The lifted wrapper stays bound and painted.
    let lifted = view.base().item(key).unwrap();
    assert_eq!(lifted.bound_index(), Some(3));
    assert_eq!(lifted.id(), id);
    assert!(view.base().container().position(key).is_some());
    assert_eq!(view.base().container().len(), 13);
    check_window(view.base()).unwrap();
}

#[test]
fn second_drag_is_rejected() {
    init_tracing();
    let (mut view, _) = fixed(100);
    let a = view.base().active_items()[1];
    let b = view.base().active_items()[2];
    assert!(view.start_drag_item(a));
    assert!(!view.start_drag_item(b));
    assert!(!view.start_drag_item(a));
}

#[test]
fn drop_after_reorder_rebinds_in_place() {
    init_tracing();
    let (mut view, mut sim) = fixed(100);
    let key = view.base().active_items()[3];
    let moved_id = Some(view.base().source().id_for_index(3));
    view.start_drag_item(key);

    view.base_mut().source_mut().move_item(3, 7);
    view.end_drag(Some(7));
    sim.run_layout(&mut view);

    assert_eq!(view.base().dragged_index(), None);
    assert_eq!(view.base().active_items()[7], key);
    assert_eq!(view.base().container().len(), 12);
    check_window(view.base()).unwrap();

    let base = view.base();
    let bound_id = |pos: usize| base.item(base.active_items()[pos]).and_then(|i| i.id());
    assert_eq!(bound_id(7), moved_id);
    assert_eq!(base.source().stats().live_bindings(), 12);
    // The ghost went back to the pool.
    assert_eq!(base.pool().released_len(), 1);
}

#[test]
fn ghost_scrolled_away_releases_dragged_item() {
    init_tracing();
    let (mut view, sim) = fixed(100);
    let key = view.base().active_items()[2];
    view.start_drag_item(key);
    sim.scroll_to(&mut view, 1_000.0);
    assert!(
        view.base()
            .active_items()
            .iter()
            .all(|k| !view.base().item(*k).unwrap().is_drag_ghost())
    );

    view.end_drag(None);
    assert_eq!(view.base().dragged_item(), None);
    assert!(!view.base().pool().is_in_use(key));
    assert!(view.base().container().position(key).is_none());
    check_window(view.base()).unwrap();
    assert_eq!(
        view.base().source().stats().live_bindings(),
        view.base().visible_item_count() as u64
    );
}

#[test]
fn drop_into_window_after_ghost_scrolled_away() {
    init_tracing();
    let (mut view, mut sim) = fixed(100);
    let key = view.base().active_items()[2];
    let moved_id = Some(view.base().source().id_for_index(2));
    view.start_drag_item(key);
    sim.scroll_to(&mut view, 1_000.0);
    assert_eq!(view.base().first_visible_index(), 50);

    view.base_mut().source_mut().move_item(2, 52);
    view.end_drag(Some(52));
    sim.run_layout(&mut view);

    let base = view.base();
    assert_eq!(base.dragged_item(), None);
    assert!(base.pool().is_in_use(key));
    assert_eq!(base.active_items()[2], key);
    assert_eq!(base.item(key).and_then(|i| i.bound_index()), Some(52));
    assert_eq!(base.item(key).and_then(|i| i.id()), moved_id);
    assert_eq!(base.container().len(), base.visible_item_count());
    check_window(base).unwrap();
    assert_eq!(
        base.source().stats().live_bindings(),
        base.visible_item_count() as u64
    );
}

#[test]
fn ghost_reappears_when_scrolled_back() {
    init_tracing();
    let (mut view, sim) = fixed(100);
    let key = view.base().active_items()[2];
    view.start_drag_item(key);
    sim.scroll_to(&mut view, 1_000.0);
    sim.scroll_to(&mut view, 0.0);

    let ghost = view.base().active_items()[2];
    assert!(view.base().item(ghost).unwrap().is_drag_ghost());
    check_window(view.base()).unwrap();

    view.end_drag(Some(2));
    assert_eq!(view.base().active_items()[2], key);
    check_window(view.base()).unwrap();
}

#[test]
fn dynamic_drag_keeps_dragged_height_in_layout() {
    init_tracing();
    let source = RecordingSource::with_heights((0..60).map(|i| 20.0 + (i % 3) as f32 * 10.0));
    let mut view = DynamicHeightController::new(
        source,
        TestSurface::new(300.0, 240.0),
        VirtualizationConfig::default(),
    )
    .unwrap();
    let mut sim = LayoutSim::new();
    sim.run_layout(&mut view);
    let content = view.expected_content_height();

    let key = view.base().item_for_index(2).unwrap();
    assert!(view.start_drag_item(key));
    sim.settle(&mut view);
    assert_eq!(view.expected_item_height(2), 40.0);
    assert_eq!(view.expected_content_height(), content);
    check_window(view.base()).unwrap();

    view.base_mut().source_mut().move_item(2, 5);
    view.end_drag(Some(5));
    sim.settle(&mut view);

    assert_eq!(view.height_cache().get(5), Some(40.0));
    assert_eq!(view.height_cache().get(2), Some(20.0));
    assert_eq!(view.base().dragged_item(), None);
    check_window(view.base()).unwrap();
}
