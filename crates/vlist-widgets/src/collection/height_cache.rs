#![forbid(unsafe_code)]

//! Measured item heights with running cumulative sums.
//!
//! Only measured indices are stored. Every query about unmeasured indices
//! extrapolates with the running average of measured heights, so scrollbar
//! size and fill decisions stay plausible before layout data exists.
//!
//! For each cached index `k` the cache keeps `ContentInfo { sum, count }`:
//! the total height and number of measured entries in `0..=k`. The content
//! height up to any index `k` is then
//!
//! ```text
//! info(k').sum + (k + 1 - info(k').count) * average
//! ```
//!
//! where `k'` is the greatest cached index `<= k`.
//!
//! # Invariants
//!
//! 1. `info(k).sum` equals the sum of cached heights at indices `<= k`.
//! 2. `content_height_for_index` is non-decreasing in `k` (heights are > 0).
//! 3. `accumulated_height` equals the sum of all cached heights.
//! 4. `highest_cached_index` is the largest cached key, or `None`.
//!
//! # Complexity
//!
//! | Operation | Time |
//! |-----------|------|
//! | `content_height_for_index` | O(log n) |
//! | `register` / `unregister` | O(log n + suffix) |
//! | `index_at_offset` | O(log N · log n) |

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ContentInfo {
    sum: f32,
    count: usize,
}

/// Per-index measured heights plus cumulative content sums.
#[derive(Debug, Clone)]
pub struct HeightCache {
    item_heights: BTreeMap<usize, f32>,
    content_info: BTreeMap<usize, ContentInfo>,
    accumulated: f32,
    highest_cached: Option<usize>,
    default_height: f32,
}

impl HeightCache {
    /// Create an empty cache estimating `default_height` until something is
    /// measured.
    #[must_use]
    pub fn new(default_height: f32) -> Self {
        Self {
            item_heights: BTreeMap::new(),
            content_info: BTreeMap::new(),
            accumulated: 0.0,
            highest_cached: None,
            default_height,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.item_heights.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_heights.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.item_heights.get(&index).copied()
    }

    #[inline]
    #[must_use]
    pub fn highest_cached_index(&self) -> Option<usize> {
        self.highest_cached
    }

    #[inline]
    #[must_use]
    pub fn accumulated_height(&self) -> f32 {
        self.accumulated
    }

    /// Mean of measured heights, or the default when nothing is measured.
    #[must_use]
    pub fn average_height(&self) -> f32 {
        if self.item_heights.is_empty() {
            self.default_height
        } else {
            self.accumulated / self.item_heights.len() as f32
        }
    }

    /// Measured height at `index`, else the running average.
    #[must_use]
    pub fn expected_item_height(&self, index: usize) -> f32 {
        self.get(index).unwrap_or_else(|| self.average_height())
    }

    /// Record `height` for `index`. Returns `false` if it was already cached
    /// with exactly that value.
    pub fn register(&mut self, index: usize, height: f32) -> bool {
        let previous = self.item_heights.insert(index, height);
        if previous == Some(height) {
            return false;
        }
        let delta = height - previous.unwrap_or(0.0);
        let is_new = previous.is_none();
        self.accumulated += delta;

        let before = self
            .content_info
            .range(..index)
            .next_back()
            .map(|(_, info)| *info)
            .unwrap_or_default();
        self.content_info.insert(
            index,
            ContentInfo {
                sum: before.sum + height,
                count: before.count + 1,
            },
        );
        for (_, info) in self.content_info.range_mut(index + 1..) {
            info.sum += delta;
            if is_new {
                info.count += 1;
            }
        }

        self.highest_cached = Some(self.highest_cached.map_or(index, |h| h.max(index)));
        true
    }

    /// Forget the height at `index`. Returns whether anything was removed.
    pub fn unregister(&mut self, index: usize) -> bool {
        let Some(height) = self.item_heights.remove(&index) else {
            return false;
        };
        self.accumulated -= height;
        self.content_info.remove(&index);
        for (_, info) in self.content_info.range_mut(index + 1..) {
            info.sum -= height;
            info.count -= 1;
        }
        if self.item_heights.is_empty() {
            // Drop float residue once nothing is cached.
            self.accumulated = 0.0;
        }
        if self.highest_cached == Some(index) {
            self.highest_cached = self.item_heights.keys().next_back().copied();
        }
        true
    }

    /// Height of items `0..=index`.
    #[must_use]
    pub fn content_height_for_index(&self, index: usize) -> f32 {
        let info = self
            .content_info
            .range(..=index)
            .next_back()
            .map(|(_, info)| *info)
            .unwrap_or_default();
        let unmeasured = (index + 1).saturating_sub(info.count);
        info.sum + unmeasured as f32 * self.average_height()
    }

    /// Height of items `0..index` (the top edge of `index`).
    #[must_use]
    pub fn offset_of_index(&self, index: usize) -> f32 {
        if index == 0 {
            0.0
        } else {
            self.content_height_for_index(index - 1)
        }
    }

    /// Estimated height of a collection of `count` items.
    #[must_use]
    pub fn expected_content_height(&self, count: usize) -> f32 {
        if count == 0 {
            0.0
        } else {
            self.content_height_for_index(count - 1)
        }
    }

    /// Index of the item covering `offset` in a collection of `count` items.
    ///
    /// Returns the smallest `k` with `content_height_for_index(k) > offset`,
    /// clamped to `count - 1`.
    #[must_use]
    pub fn index_at_offset(&self, offset: f32, count: usize) -> usize {
        if count == 0 || !(offset > 0.0) {
            return 0;
        }
        let (mut lo, mut hi) = (0usize, count - 1);
        if self.content_height_for_index(hi) <= offset {
            return hi;
        }
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.content_height_for_index(mid) > offset {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }

    /// Drop entries at indices `>= count`. Lazy: does nothing unless the
    /// highest cached index fell out of bounds.
    pub fn clean(&mut self, count: usize) -> usize {
        if self.highest_cached.is_none_or(|h| h < count) {
            return 0;
        }
        let stale: Vec<usize> = self.item_heights.range(count..).map(|(k, _)| *k).collect();
        for index in stale.iter().rev() {
            self.unregister(*index);
        }
        stale.len()
    }

    pub fn clear(&mut self) {
        self.item_heights.clear();
        self.content_info.clear();
        self.accumulated = 0.0;
        self.highest_cached = None;
    }
}
