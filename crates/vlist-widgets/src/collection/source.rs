#![forbid(unsafe_code)]

//! Data-source collaborator.
//!
//! The controller never stores domain data. It asks the source how many
//! entries exist, which id sits at an index (for rebind diffing), and hands
//! pooled elements back to it for binding, unbinding and destruction.

/// Supplies items and binds them to visual elements.
///
/// Every `bind_item` call is eventually paired with exactly one
/// `unbind_item` call for the same element before it is rebound, released
/// or destroyed.
pub trait CollectionSource {
    /// The host's visual element type.
    type Element;

    /// Number of entries, indexed `0..item_count()`.
    fn item_count(&self) -> usize;

    /// Stable identity of the entry at `index`.
    ///
    /// Defaults to the index itself, so a reorder leaves every `(index, id)`
    /// pair unchanged and rows only rebind on refresh while
    /// `always_rebind_on_refresh` is set. Sources that turn it off must
    /// return real ids.
    fn id_for_index(&self, index: usize) -> u64 {
        index as u64
    }

    /// Construct a fresh element. Called only when the pool has nothing to
    /// reuse.
    fn make_item(&mut self) -> Self::Element;

    /// Fill `element` with the entry at `index`.
    fn bind_item(&mut self, element: &mut Self::Element, index: usize);

    /// Release per-binding resources held by `element`.
    fn unbind_item(&mut self, element: &mut Self::Element, index: usize) {
        let _ = (element, index);
    }

    /// Dispose of an element the pool no longer keeps.
    fn destroy_item(&mut self, element: Self::Element) {
        drop(element);
    }
}
