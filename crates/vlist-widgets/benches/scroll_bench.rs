//! Scroll throughput benchmarks for both virtualization strategies.
//!
//! Each iteration sweeps a long collection top to bottom in viewport-sized
//! steps, reporting geometry for every freshly bound wrapper the way a host
//! layout pass would.
//!
//! Run with: cargo bench -p vlist-widgets --bench scroll_bench

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vlist_core::{Size, Vec2, VirtualizationConfig};
use vlist_widgets::collection::{
    CollectionSource, CollectionVirtualizer, DynamicHeightController, FixedHeightController,
    HeightCache, ItemKey, ScrollSurface,
};

const VIEWPORT: Size = Size::new(320.0, 480.0);

// =============================================================================
// Fixtures
// =============================================================================

struct BenchSource {
    heights: Vec<f32>,
}

impl BenchSource {
    /// Heights cycle through a small deterministic pattern.
    fn new(count: usize) -> Self {
        let heights = (0..count).map(|i| 16.0 + (i % 7) as f32 * 6.0).collect();
        Self { heights }
    }
}

impl CollectionSource for BenchSource {
    type Element = Option<usize>;

    fn item_count(&self) -> usize {
        self.heights.len()
    }

    fn make_item(&mut self) -> Option<usize> {
        None
    }

    fn bind_item(&mut self, element: &mut Option<usize>, index: usize) {
        *element = Some(index);
    }

    fn unbind_item(&mut self, element: &mut Option<usize>, _index: usize) {
        *element = None;
    }
}

#[derive(Default)]
struct NullSurface {
    offset: Vec2,
}

impl ScrollSurface for NullSurface {
    fn viewport_size(&self) -> Size {
        VIEWPORT
    }

    fn scroll_offset(&self) -> Vec2 {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    fn set_content_height(&mut self, _height: f32) {}

    fn set_content_padding_top(&mut self, _padding: f32) {}

    fn set_vertical_range(&mut self, _max: f32) {}
}

fn measure<C: CollectionVirtualizer<BenchSource, NullSurface>>(view: &mut C) {
    let keys: Vec<ItemKey> = view.base().items_needing_layout().collect();
    for key in keys {
        let height = view
            .base()
            .item(key)
            .and_then(|item| item.bound_index())
            .map_or(20.0, |index| view.base().source().heights[index]);
        view.on_item_geometry_changed(key, Size::new(VIEWPORT.width, height));
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_fixed_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll/fixed_sweep");

    for count in [1_000usize, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("items", count), &count, |b, &count| {
            b.iter(|| {
                let mut view = FixedHeightController::new(
                    BenchSource::new(count),
                    NullSurface::default(),
                    VirtualizationConfig::default(),
                    20.0,
                )
                .expect("valid fixed height");
                view.resize(VIEWPORT, 1);
                let end = count as f32 * 20.0;
                let mut y = 0.0;
                while y < end {
                    view.on_scroll(Vec2::new(0.0, y));
                    y += VIEWPORT.height / 2.0;
                }
                black_box(view.base().pool().created_count())
            })
        });
    }

    group.finish();
}

fn bench_dynamic_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll/dynamic_sweep");
    group.sample_size(20);

    for count in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::new("items", count), &count, |b, &count| {
            b.iter(|| {
                let mut view = DynamicHeightController::new(
                    BenchSource::new(count),
                    NullSurface::default(),
                    VirtualizationConfig::default(),
                )
                .expect("valid config");
                view.resize(VIEWPORT, 1);
                let mut y = 0.0;
                let mut steps = 0u32;
                while y < view.base().scrollable_height() && steps < 4_000 {
                    view.on_scroll(Vec2::new(0.0, y));
                    for _ in 0..4 {
                        view.tick();
                        measure(&mut view);
                    }
                    y += VIEWPORT.height / 2.0;
                    steps += 1;
                }
                black_box(view.height_cache().len())
            })
        });
    }

    group.finish();
}

fn bench_height_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("height_cache");

    for count in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::new("register", count), &count, |b, &count| {
            b.iter(|| {
                let mut cache = HeightCache::new(20.0);
                for index in 0..count {
                    cache.register(index, 16.0 + (index % 5) as f32);
                }
                black_box(cache.accumulated_height())
            })
        });

        let mut cache = HeightCache::new(20.0);
        for index in (0..count).step_by(3) {
            cache.register(index, 16.0 + (index % 5) as f32);
        }
        group.bench_with_input(
            BenchmarkId::new("index_at_offset", count),
            &cache,
            |b, cache| {
                b.iter(|| {
                    let total = cache.expected_content_height(count);
                    let mut acc = 0usize;
                    let mut y = 0.0;
                    while y < total {
                        acc ^= cache.index_at_offset(black_box(y), count);
                        y += 97.0;
                    }
                    black_box(acc)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_fixed_sweep,
    bench_dynamic_sweep,
    bench_height_cache
);
criterion_main!(benches);
