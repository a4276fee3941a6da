#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use aero_surface_layout::{
    Format, Generation, LayoutEngine, Plane, ResourceDescriptor, Selector, TileMode, UsageFlags,
};
#[cfg(not(target_arch = "wasm32"))]
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

#[cfg(not(target_arch = "wasm32"))]
fn criterion_config() -> Criterion {
    match std::env::var("AERO_BENCH_PROFILE").as_deref() {
        Ok("ci") => Criterion::default()
            .warm_up_time(Duration::from_millis(150))
            .measurement_time(Duration::from_millis(400))
            .sample_size(10)
            .noise_threshold(0.05),
        _ => Criterion::default()
            .warm_up_time(Duration::from_secs(1))
            .measurement_time(Duration::from_secs(2))
            .sample_size(50)
            .noise_threshold(0.03),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn workloads() -> Vec<(&'static str, ResourceDescriptor)> {
    vec![
        (
            "tile_x_full_chain",
            ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 1024, 1024)
                .with_tile_mode(TileMode::TileX)
                .with_max_lod(10),
        ),
        (
            "tile_ys_array_tail",
            ResourceDescriptor::texture_2d(Format::R16G16B16A16Float, 2048, 2048)
                .with_tile_mode(TileMode::TileYs)
                .with_max_lod(11)
                .with_array_size(6),
        ),
        (
            "nv12_compressed",
            ResourceDescriptor::texture_2d(Format::Nv12, 1920, 1080)
                .with_tile_mode(TileMode::TileY)
                .with_usage(UsageFlags::MEDIA | UsageFlags::COMPRESSION_METADATA),
        ),
        (
            "msaa_depth_hiz",
            ResourceDescriptor::texture_2d(Format::D32Float, 1920, 1080)
                .with_tile_mode(TileMode::TileY)
                .with_samples(4)
                .with_usage(UsageFlags::DEPTH | UsageFlags::COMPRESSION_METADATA),
        ),
    ]
}

#[cfg(not(target_arch = "wasm32"))]
fn bench_create_layout(c: &mut Criterion) {
    let engine = LayoutEngine::for_generation(Generation::Gen12);
    let mut group = c.benchmark_group("create_layout");
    for (name, desc) in workloads() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &desc, |b, desc| {
            b.iter(|| {
                let layout = engine.create_layout(black_box(desc)).unwrap();
                black_box(layout.allocation_size());
            })
        });
    }
    group.finish();
}

#[cfg(not(target_arch = "wasm32"))]
fn bench_query_offset(c: &mut Criterion) {
    let engine = LayoutEngine::for_generation(Generation::Gen12);
    let mut group = c.benchmark_group("query_offset");
    for (name, desc) in workloads() {
        let layout = engine.create_layout(&desc).unwrap();
        let selectors: Vec<Selector> = if desc.format.is_planar() {
            vec![Selector::mip(0), Selector::mip(0).with_plane(Plane::U)]
        } else {
            (0..=desc.max_lod)
                .flat_map(|mip| {
                    (0..desc.array_size)
                        .map(move |array| Selector::mip(mip).with_array_index(array))
                })
                .collect()
        };
        group.bench_with_input(BenchmarkId::from_parameter(name), &selectors, |b, selectors| {
            b.iter(|| {
                for selector in selectors {
                    black_box(layout.query_offset(black_box(selector)).unwrap());
                }
            })
        });
    }
    group.finish();
}

#[cfg(not(target_arch = "wasm32"))]
criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_create_layout, bench_query_offset
}
#[cfg(not(target_arch = "wasm32"))]
criterion_main!(benches);
