#![forbid(unsafe_code)]

//! Arena pool of reusable item wrappers.
//!
//! Wrappers live in slots addressed by [`ItemKey`]. Releasing a wrapper keeps
//! its element alive on a reuse list so the next request rebinds it instead
//! of asking the source for a new one. Only [`ItemPool::clear`] destroys
//! elements.
//!
//! # Invariants
//!
//! 1. A slot is either empty, in use, or on the reuse list, never two at once.
//! 2. `get_or_make` never calls `make` while the reuse list is non-empty.
//! 3. Keys issued before `clear` are rejected afterwards (generation check).
//! 4. `created_count - destroyed_count == live wrappers` at all times.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Stale or unknown key | `get`/`release` return `None`/`false` |
//! | Double release | Second call returns `false` |

use super::item::{ItemKey, ReusableItem};

#[derive(Debug, Clone)]
struct Slot<E> {
    item: Option<ReusableItem<E>>,
    generation: u32,
    in_use: bool,
}

/// Recycles [`ReusableItem`] wrappers.
#[derive(Debug, Clone)]
pub struct ItemPool<E> {
    slots: Vec<Slot<E>>,
    /// Slots holding a released, reusable wrapper.
    released: Vec<u32>,
    /// Empty slots available for new wrappers.
    free_list: Vec<u32>,
    created: u64,
    reused: u64,
    released_total: u64,
    destroyed: u64,
}

impl<E> Default for ItemPool<E> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            released: Vec::new(),
            free_list: Vec::new(),
            created: 0,
            reused: 0,
            released_total: 0,
            destroyed: 0,
        }
    }
}

impl<E> ItemPool<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a released wrapper, or build one with `make`.
    pub fn get_or_make(&mut self, make: impl FnOnce() -> E) -> ItemKey {
        if let Some(slot_idx) = self.released.pop() {
            let slot = &mut self.slots[slot_idx as usize];
            slot.in_use = true;
            self.reused += 1;
            return ItemKey::new(slot_idx, slot.generation);
        }
        let slot_idx = self.alloc_slot();
        let slot = &mut self.slots[slot_idx as usize];
        slot.item = Some(ReusableItem::new(make()));
        slot.in_use = true;
        self.created += 1;
        ItemKey::new(slot_idx, slot.generation)
    }

    /// Return an in-use wrapper to the reuse list.
    pub fn release(&mut self, key: ItemKey) -> bool {
        match self.slot_mut(key) {
            Some(slot) if slot.in_use => {
                slot.in_use = false;
                self.released.push(key.slot() as u32);
                self.released_total += 1;
                true
            }
            _ => false,
        }
    }

    /// Destroy every wrapper, in use or released, through `destroy`.
    pub fn clear(&mut self, mut destroy: impl FnMut(E)) {
        self.released.clear();
        self.free_list.clear();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if let Some(item) = slot.item.take() {
                destroy(item.into_element());
                self.destroyed += 1;
            }
            slot.in_use = false;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_list.push(idx as u32);
        }
        // Pop order hands out low slots first.
        self.free_list.reverse();
    }

    #[must_use]
    pub fn get(&self, key: ItemKey) -> Option<&ReusableItem<E>> {
        self.slots
            .get(key.slot())
            .filter(|slot| slot.generation == key.generation())
            .and_then(|slot| slot.item.as_ref())
    }

    pub fn get_mut(&mut self, key: ItemKey) -> Option<&mut ReusableItem<E>> {
        self.slot_mut(key).and_then(|slot| slot.item.as_mut())
    }

    /// Whether `key` refers to a wrapper currently handed out.
    #[must_use]
    pub fn is_in_use(&self, key: ItemKey) -> bool {
        self.slots
            .get(key.slot())
            .is_some_and(|slot| slot.generation == key.generation() && slot.in_use)
    }

    /// Wrappers currently handed out.
    #[must_use]
    pub fn in_use_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.in_use).count()
    }

    /// Wrappers waiting on the reuse list.
    #[inline]
    #[must_use]
    pub fn released_len(&self) -> usize {
        self.released.len()
    }

    /// Live wrappers (in use plus released).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free_list.len())
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements built through `make`.
    #[inline]
    #[must_use]
    pub fn created_count(&self) -> u64 {
        self.created
    }

    /// Requests served from the reuse list.
    #[inline]
    #[must_use]
    pub fn reused_count(&self) -> u64 {
        self.reused
    }

    /// Successful `release` calls.
    #[inline]
    #[must_use]
    pub fn released_count(&self) -> u64 {
        self.released_total
    }

    /// Elements handed to `destroy`.
    #[inline]
    #[must_use]
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }

    fn slot_mut(&mut self, key: ItemKey) -> Option<&mut Slot<E>> {
        self.slots
            .get_mut(key.slot())
            .filter(|slot| slot.generation == key.generation())
    }

    fn alloc_slot(&mut self) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                item: None,
                generation: 0,
                in_use: false,
            });
            idx
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_wrapper_is_reused_before_making() {
        let mut pool = ItemPool::new();
        let a = pool.get_or_make(|| "a");
        assert!(pool.release(a));
        let b = pool.get_or_make(|| panic!("must reuse"));
        assert_eq!(a, b);
        assert_eq!(pool.created_count(), 1);
        assert_eq!(pool.reused_count(), 1);
    }

    #[test]
    fn double_release_is_rejected() {
        let mut pool = ItemPool::new();
        let a = pool.get_or_make(|| 1);
        assert!(pool.release(a));
        assert!(!pool.release(a));
        assert_eq!(pool.released_len(), 1);
        assert_eq!(pool.released_count(), 1);
    }

    #[test]
    fn clear_destroys_everything_and_invalidates_keys() {
        let mut pool = ItemPool::new();
        let a = pool.get_or_make(|| 1);
        let b = pool.get_or_make(|| 2);
        pool.release(b);
        let mut destroyed = Vec::new();
        pool.clear(|e| destroyed.push(e));
        destroyed.sort_unstable();
        assert_eq!(destroyed, vec![1, 2]);
        assert_eq!(pool.destroyed_count(), 2);
        assert!(pool.get(a).is_none());
        assert!(pool.is_empty());

        let c = pool.get_or_make(|| 3);
        assert_eq!(c.slot(), 0);
        assert_ne!(c, a);
        assert_eq!(pool.get(c).map(|i| *i.element()), Some(3));
    }

    #[test]
    fn live_count_tracks_created_minus_destroyed() {
        let mut pool = ItemPool::new();
        let keys: Vec<_> = (0..5).map(|i| pool.get_or_make(|| i)).collect();
        pool.release(keys[1]);
        pool.release(keys[3]);
        assert_eq!(pool.len(), 5);
        assert_eq!(pool.in_use_count(), 3);
        assert_eq!(
            pool.created_count() - pool.destroyed_count(),
            pool.len() as u64
        );
    }
}
