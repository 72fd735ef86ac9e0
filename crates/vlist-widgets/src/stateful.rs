#![forbid(unsafe_code)]

//! Widget state persistence contract.
//!
//! A [`Stateful`] widget exposes the subset of its state that should survive
//! a session (scroll position, first realized index) as a plain value. The
//! host decides where that value is stored; widgets only produce and accept
//! it. Transient data such as measured heights and pooled items is never part
//! of the persisted state.
//!
//! # Invariants
//!
//! 1. `state_key()` is stable for the lifetime of a widget instance.
//! 2. `restore_state(save_state())` leaves the observable scroll state
//!    unchanged.
//! 3. Restored state may be clamped on the next layout pass if the content
//!    shrank in between.

use std::fmt;

/// Identifies one persisted widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    /// Widget kind, e.g. `"CollectionView"`.
    pub widget_type: &'static str,
    /// Instance id; `"default"` when the widget has no persistence id.
    pub instance_id: String,
}

impl StateKey {
    #[must_use]
    pub fn new(widget_type: &'static str, instance_id: impl Into<String>) -> Self {
        Self {
            widget_type,
            instance_id: instance_id.into(),
        }
    }

    /// Flat storage key: `widget_type::instance_id`.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}::{}", self.widget_type, self.instance_id)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.widget_type, self.instance_id)
    }
}

/// Widgets whose user-facing state can be saved and restored.
pub trait Stateful {
    /// Persisted snapshot type.
    type State: Clone + Default;

    fn state_key(&self) -> StateKey;

    fn save_state(&self) -> Self::State;

    fn restore_state(&mut self, state: Self::State);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_key_joins_parts() {
        let key = StateKey::new("CollectionView", "inbox");
        assert_eq!(key.canonical(), "CollectionView::inbox");
        assert_eq!(key.to_string(), key.canonical());
    }
}
