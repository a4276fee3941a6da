use aero_surface_layout::{
    Dimension, Format, Generation, LayoutEngine, Plane, ResourceDescriptor, Selector, TileMode,
    UsageFlags,
};
use pretty_assertions::assert_eq;

fn engine(generation: Generation) -> LayoutEngine {
    LayoutEngine::for_generation(generation)
}

#[test]
fn one_d_mips_share_a_single_row() {
    let desc = ResourceDescriptor::texture_1d(Format::R32Float, 200).with_max_lod(3);
    let layout = engine(Generation::Gen9).create_layout(&desc).unwrap();
    assert_eq!(layout.geometry().block_height, 1);
    // 256 + 128 + 64 + 64 elements of 4 bytes.
    assert_eq!(layout.pitch(), 2048);

    let mip2 = layout.query_offset(&Selector::mip(2)).unwrap();
    assert_eq!(mip2.tile_base_offset, 384 * 4);
}

#[test]
fn one_d_standard_tile_packs_a_tail() {
    // Ys 32bpe 1D tile holds 16384 elements; threshold 8192.
    let desc = ResourceDescriptor::texture_1d(Format::R32Float, 16384)
        .with_tile_mode(TileMode::TileYs)
        .with_max_lod(14);
    let layout = engine(Generation::Gen9).create_layout(&desc).unwrap();
    assert_eq!(layout.mip_tail_start_lod(), 1);
    let tail: Vec<_> = layout.mips()[1..]
        .iter()
        .map(|m| m.offset.x)
        .collect();
    assert!(tail.iter().all(|&x| x == 16384));

    let mip1 = layout.query_offset(&Selector::mip(1)).unwrap();
    let mip2 = layout.query_offset(&Selector::mip(2)).unwrap();
    assert_eq!(mip1.tile_base_offset, 65536);
    assert_eq!(mip2.tile_base_offset, 65536);
    assert!(mip1.x_offset_bytes > mip2.x_offset_bytes);
}

#[test]
fn legacy_3d_slices_stack_at_qpitch() {
    let desc = ResourceDescriptor::texture_3d(Format::R8G8B8A8Unorm, 64, 64, 8)
        .with_tile_mode(TileMode::TileY)
        .with_max_lod(1);
    let layout = engine(Generation::Gen9).create_layout(&desc).unwrap();
    let geometry = layout.geometry();
    assert!(!geometry.is_volume_tiled());
    assert_eq!(geometry.slices, 8);
    // Mip 0 (64 rows) plus mip 1 (32 rows), tile aligned.
    assert_eq!(layout.qpitch(), 96);

    let slice5 = layout
        .query_offset(&Selector::mip(0).with_slice(5))
        .unwrap();
    // 5 * 96 rows = 15 tile rows, two tiles per row.
    assert_eq!(slice5.tile_base_offset, 15 * 2 * 4096);

    // Mip 1 has 4 slices.
    assert!(layout
        .query_offset(&Selector::mip(1).with_slice(4))
        .is_err());
}

#[test]
fn standard_tile_volumes_group_slices_into_slabs() {
    // Ys 32bpe 3D tile: 32x32x16.
    let desc = ResourceDescriptor::texture_3d(Format::R32Float, 64, 32, 48)
        .with_tile_mode(TileMode::TileYs);
    let layout = engine(Generation::Gen9).create_layout(&desc).unwrap();
    let geometry = layout.geometry();
    assert!(geometry.is_volume_tiled());
    assert_eq!((geometry.slices, layout.qpitch()), (3, 32));
    assert_eq!(layout.total_size(), 2 * 3 * 65536);

    let offset = layout
        .query_offset(&Selector::mip(0).with_slice(20))
        .unwrap();
    // Slab 1, slice 4 within it.
    assert_eq!(offset.tile_base_offset, 2 * 65536);
    assert_eq!(offset.z_offset, 4);
}

#[test]
fn cube_arrays_index_faces_within_layers() {
    let desc = ResourceDescriptor::cube(Format::R8G8B8A8Unorm, 32)
        .with_tile_mode(TileMode::TileY)
        .with_array_size(2);
    let layout = engine(Generation::Gen9).create_layout(&desc).unwrap();
    assert_eq!(layout.geometry().slices, 12);
    assert_eq!(layout.qpitch(), 32);

    let offset = layout
        .query_offset(&Selector::mip(0).with_array_index(1).with_face(3))
        .unwrap();
    // Slice 9, one 4 KiB tile per slice.
    assert_eq!(offset.tile_base_offset, 9 * 4096);
}

#[test]
fn buffers_use_the_exact_byte_width() {
    let desc = ResourceDescriptor::buffer(Format::R8G8B8A8Unorm, 5000);
    let layout = engine(Generation::Gen12).create_layout(&desc).unwrap();
    assert_eq!(layout.geometry().dimension, Dimension::Buffer);
    assert_eq!(layout.pitch(), 20000);
    assert_eq!(layout.total_size(), 20480);
}

#[test]
fn planar_chroma_offsets_across_generations() {
    let desc = ResourceDescriptor::texture_2d(Format::P010, 100, 50);
    let expected = [
        (Generation::Gen8, 52),
        (Generation::Gen9, 52),
        (Generation::Gen12, 64),
    ];
    for (generation, chroma_row) in expected {
        let layout = engine(generation).create_layout(&desc).unwrap();
        let uv = layout.planar().unwrap().plane(Plane::U).unwrap();
        assert_eq!(uv.y_offset_rows, chroma_row, "{generation:?}");
    }
}

#[test]
fn i420_planes_are_a_byte_stream() {
    let desc = ResourceDescriptor::texture_2d(Format::I420, 64, 32).with_usage(UsageFlags::MEDIA);
    let layout = engine(Generation::Gen9).create_layout(&desc).unwrap();
    // Media pitch alignment lifts the 64-byte row to 128.
    assert_eq!(layout.pitch(), 128);

    let u = layout
        .query_offset(&Selector::mip(0).with_plane(Plane::U))
        .unwrap();
    let v = layout
        .query_offset(&Selector::mip(0).with_plane(Plane::V))
        .unwrap();
    assert_eq!(u.tile_base_offset, 128 * 32);
    assert_eq!(v.tile_base_offset, 128 * 32 + 64 * 16);
}
