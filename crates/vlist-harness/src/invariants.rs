#![forbid(unsafe_code)]

//! Structural checks shared by scenario and property tests.

use std::collections::HashSet;

use vlist_widgets::collection::{CollectionSource, ScrollSurface, VerticalController};

/// Verify the active window and container agree with the controller's
/// documented invariants. Returns a description of the first violation.
///
/// # Errors
///
/// A message naming the violated rule and the offending position.
pub fn check_window<S, V>(base: &VerticalController<S, V>) -> Result<(), String>
where
    S: CollectionSource,
    V: ScrollSurface,
{
    let first = base.first_visible_index();
    let count = base.item_count();
    let mut seen = HashSet::new();

    for (position, key) in base.active_items().iter().enumerate() {
        let item = base
            .item(*key)
            .ok_or_else(|| format!("active position {position} holds a stale key"))?;
        if base.container().position(*key).is_none() {
            return Err(format!("active position {position} missing from container"));
        }
        if !item.is_visible() {
            continue;
        }
        let Some(index) = item.index() else {
            return Err(format!("visible item at position {position} has no index"));
        };
        if index != first + position {
            return Err(format!(
                "position {position} bound to {index}, expected {}",
                first + position
            ));
        }
        if index >= count {
            return Err(format!("position {position} bound past end ({index} >= {count})"));
        }
        if !seen.insert(index) {
            return Err(format!("index {index} bound twice"));
        }
    }

    if let Some(dragged) = base.dragged_item() {
        if base.container().position(dragged).is_none() {
            return Err("dragged item left the container".to_string());
        }
    }

    let expected_children = base.active_items().len() + usize::from(base.dragged_item().is_some());
    if base.container().len() != expected_children {
        return Err(format!(
            "container has {} children, expected {expected_children}",
            base.container().len()
        ));
    }
    Ok(())
}

/// Whether the realized window covers `[offset, offset + viewport)` in the
/// controller's own content coordinates: padding plus the measured heights
/// of the realized items, in window order.
#[must_use]
pub fn covers_viewport<S, V>(base: &VerticalController<S, V>) -> bool
where
    S: CollectionSource,
    V: ScrollSurface,
{
    let count = base.item_count();
    if count == 0 {
        return true;
    }
    let top = base.scroll_offset().y;
    let bottom = top + base.viewport().height;
    if base.content_padding() > top + 0.5 {
        return false;
    }
    let mut end = base.content_padding();
    let mut last = None;
    for item in base.active_items().iter().filter_map(|key| base.item(*key)) {
        if !item.is_realized() {
            continue;
        }
        let height = item.layout_size().height;
        if !height.is_finite() {
            return false;
        }
        end += height;
        last = item.bound_index();
    }
    end >= bottom - 0.5 || last == Some(count - 1)
}
