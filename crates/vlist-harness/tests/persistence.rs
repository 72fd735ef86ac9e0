#![forbid(unsafe_code)]

//! View-state persistence and strategy switching.
//!
//! Run with: cargo test -p vlist-harness --test persistence

use pretty_assertions::assert_eq;
use tracing::{Level, info};
use vlist_core::{Error, Vec2, VirtualizationConfig};
use vlist_harness::{LayoutSim, RecordingSource, TestSurface, check_window};
use vlist_widgets::collection::{
    CollectionVirtualizer, DynamicHeightController, FixedHeightController, FixedItemHeight,
    VirtualizationController, VirtualizationMethod,
};
use vlist_widgets::{Stateful, ViewState};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::INFO)
        .try_init();
}

fn fixed(count: usize) -> FixedHeightController<RecordingSource, TestSurface> {
    FixedHeightController::new(
        RecordingSource::uniform(count, 20.0),
        TestSurface::new(300.0, 200.0),
        VirtualizationConfig::default(),
        20.0,
    )
    .expect("valid fixed height")
}

fn cyclic_dynamic(count: usize) -> DynamicHeightController<RecordingSource, TestSurface> {
    DynamicHeightController::new(
        RecordingSource::with_heights((0..count).map(|i| 20.0 + (i % 3) as f32 * 10.0)),
        TestSurface::new(300.0, 240.0),
        VirtualizationConfig::default(),
    )
    .expect("valid config")
}

#[test]
fn state_key_defaults_and_uses_persistence_id() {
    init_tracing();
    let mut view = fixed(10);
    assert_eq!(view.state_key().canonical(), "CollectionView::default");
    view.base_mut().set_persistence_id("inbox");
    assert_eq!(view.state_key().canonical(), "CollectionView::inbox");
    assert_eq!(view.base().persistence_id(), Some("inbox"));
}

#[test]
fn fixed_state_round_trips_through_json() {
    init_tracing();
    let mut sim = LayoutSim::new();
    let mut view = fixed(100);
    sim.run_layout(&mut view);
    sim.scroll_to(&mut view, 333.0);
    let saved = view.save_state();
    assert_eq!(saved.first_visible_index, 16);
    assert_eq!(saved.content_padding, 320.0);

    let json = saved.to_json().unwrap();
    info!(%json, "saved fixed view state");
    let decoded = ViewState::from_json(&json).unwrap();

    let mut restored = fixed(100);
    sim.run_layout(&mut restored);
    restored.restore_state(decoded);
    sim.settle(&mut restored);

    assert_eq!(restored.save_state(), saved);
    assert_eq!(restored.base().surface().offset, Vec2::new(0.0, 333.0));
    assert_eq!(restored.base().surface().padding_top, 320.0);
    check_window(restored.base()).unwrap();
}

#[test]
fn dynamic_restore_pins_first_visible_item() {
    init_tracing();
    let mut sim = LayoutSim::new();
    let mut view = cyclic_dynamic(200);
    sim.run_layout(&mut view);
    sim.scroll_to(&mut view, 1_000.0);
    let saved = view.save_state();
    assert!(saved.first_visible_index > 0);

    let mut restored = cyclic_dynamic(200);
    sim.run_layout(&mut restored);
    restored.restore_state(ViewState::from_json(&saved.to_json().unwrap()).unwrap());
    let report = sim.settle(&mut restored);
    assert!(report.settled);

    let first = restored.base().first_visible_index();
    assert_eq!(first, saved.first_visible_index);
    assert!(restored.base().item_for_index(first).is_some());
    assert_eq!(
        restored.base().scroll_offset().y,
        restored.height_cache().offset_of_index(first)
    );
    check_window(restored.base()).unwrap();
}

#[test]
fn restore_into_smaller_collection_clamps_on_layout() {
    init_tracing();
    let mut sim = LayoutSim::new();
    let mut view = fixed(100);
    sim.run_layout(&mut view);
    sim.scroll_to(&mut view, 900.0);
    let saved = view.save_state();

    let mut small = fixed(8);
    small.restore_state(saved);
    sim.run_layout(&mut small);

    assert_eq!(small.base().scroll_offset().y, 0.0);
    assert_eq!(small.base().first_visible_index(), 0);
    assert_eq!(small.base().visible_item_count(), 8);
    check_window(small.base()).unwrap();
}

#[test]
fn malformed_state_is_a_persistence_error() {
    init_tracing();
    let err = ViewState::from_json(r#"{"scroll_offset":{"x":0.0}}"#).unwrap_err();
    assert!(matches!(err, Error::Persistence(_)), "{err}");

    let huge = r#"{"scroll_offset":{"x":0.0,"y":1e999},"first_visible_index":0,"content_padding":0.0,"content_height":0.0}"#;
    assert!(ViewState::from_json(huge).is_err());
}

#[test]
fn switching_strategy_keeps_scroll_position() {
    init_tracing();
    let mut sim = LayoutSim::new();
    let config = VirtualizationConfig::default().with_default_item_height(20.0);
    let fixed20 = VirtualizationMethod::FixedHeight(FixedItemHeight::new(20.0).unwrap());
    let mut view = VirtualizationController::new(
        RecordingSource::uniform(100, 20.0),
        TestSurface::new(300.0, 200.0),
        config,
        fixed20,
    )
    .unwrap();
    sim.run_layout(&mut view);
    sim.scroll_to_item(&mut view, 50);
    assert_eq!(view.base().scroll_offset().y, 820.0);
    let made = view.base().source().stats().made;

    let mut view = view.switch_method(VirtualizationMethod::DynamicHeight);
    sim.run_layout(&mut view);
    assert_eq!(view.method(), VirtualizationMethod::DynamicHeight);
    assert_eq!(view.base().scroll_offset().y, 820.0);
    assert_eq!(view.base().first_visible_index(), 41);
    assert_eq!(view.base().source().stats().destroyed, made);
    check_window(view.base()).unwrap();

    let mut view = view.switch_method(fixed20);
    sim.run_layout(&mut view);
    assert_eq!(view.method(), fixed20);
    assert_eq!(view.base().scroll_offset().y, 820.0);
    assert_eq!(view.base().first_visible_index(), 41);
    assert_eq!(view.base().source().stats().live_bindings(), 12);
}
