#![forbid(unsafe_code)]

//! Persisted scroll and padding state.
//!
//! Together these values satisfy
//! `content_padding ≈ content_height_for_index(first_visible_index - 1)`.
//! Measured heights are not persisted: after a restore the dynamic strategy
//! re-estimates and re-measures, keeping `first_visible_index` pinned until
//! layout catches up.

use vlist_core::geometry::Vec2;

/// Scroll state that survives sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "state-persistence",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ViewState {
    /// Viewport offset in content coordinates.
    pub scroll_offset: Vec2,
    /// Index of the first realized item.
    pub first_visible_index: usize,
    /// Height of all unrealized items above `first_visible_index`.
    pub content_padding: f32,
    /// Estimated total content height.
    pub content_height: f32,
}

#[cfg(feature = "state-persistence")]
impl ViewState {
    /// Encode as JSON.
    pub fn to_json(&self) -> vlist_core::Result<String> {
        serde_json::to_string(self).map_err(|e| vlist_core::Error::Persistence(e.to_string()))
    }

    /// Decode from JSON produced by [`ViewState::to_json`].
    pub fn from_json(json: &str) -> vlist_core::Result<Self> {
        let state: Self =
            serde_json::from_str(json).map_err(|e| vlist_core::Error::Persistence(e.to_string()))?;
        if !state.scroll_offset.is_finite()
            || !state.content_padding.is_finite()
            || !state.content_height.is_finite()
        {
            return Err(vlist_core::Error::Persistence(
                "non-finite geometry in view state".to_string(),
            ));
        }
        Ok(state)
    }
}

#[cfg(all(test, feature = "state-persistence"))]
mod tests {
    use super::*;

    #[test]
    fn json_keeps_scroll_fields() {
        let state = ViewState {
            scroll_offset: Vec2::new(0.0, 340.0),
            first_visible_index: 17,
            content_padding: 340.0,
            content_height: 2000.0,
        };
        let json = state.to_json().unwrap();
        assert!(json.contains("\"first_visible_index\":17"), "{json}");
        assert_eq!(ViewState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn garbage_is_a_persistence_error() {
        let err = ViewState::from_json("{not json").unwrap_err();
        assert!(matches!(err, vlist_core::Error::Persistence(_)));
    }
}
