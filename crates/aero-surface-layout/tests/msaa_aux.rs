use aero_surface_layout::{
    AuxComponent, AuxPlacement, Format, Generation, GenerationRules, LayoutEngine, MsaaFamily,
    ResourceDescriptor, TileMode, UsageFlags, Workarounds,
};
use pretty_assertions::assert_eq;

#[test]
fn arrayed_msaa_stacks_sample_planes() {
    let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 100, 60)
        .with_tile_mode(TileMode::TileY)
        .with_samples(8);
    let layout = LayoutEngine::for_generation(Generation::Gen9)
        .create_layout(&desc)
        .unwrap();
    let msaa = layout.msaa().unwrap();
    assert_eq!(msaa.family, MsaaFamily::Arrayed);
    // One sample plane: 60 rows aligned to the 32-row tile.
    assert_eq!(layout.qpitch(), 64);
    assert_eq!(layout.geometry().slices, 8);
    assert_eq!(layout.total_size(), layout.pitch() * 64 * 8);
}

#[test]
fn interleaved_depth_scales_the_surface() {
    let single = ResourceDescriptor::texture_2d(Format::D16Unorm, 64, 64)
        .with_tile_mode(TileMode::TileY)
        .with_usage(UsageFlags::DEPTH);
    let engine = LayoutEngine::for_generation(Generation::Gen9);
    let base = engine.create_layout(&single).unwrap();
    let x4 = engine.create_layout(&single.with_samples(4)).unwrap();

    assert_eq!(x4.msaa().unwrap().family, MsaaFamily::Interleaved);
    // 4x doubles both dimensions.
    assert_eq!(x4.pitch(), 2 * base.pitch());
    assert_eq!(x4.qpitch(), 2 * base.qpitch());
    assert_eq!(x4.geometry().slices, 1);
}

#[test]
fn interleaved_depth_on_ys_narrows_the_tile() {
    let desc = ResourceDescriptor::texture_2d(Format::D32Float, 128, 128)
        .with_tile_mode(TileMode::TileYs)
        .with_samples(4);
    let layout = LayoutEngine::for_generation(Generation::Gen9)
        .create_layout(&desc)
        .unwrap();
    let tile = layout.geometry().tile;
    assert_eq!((tile.width, tile.height, tile.samples), (64, 64, 4));
    assert_eq!(layout.geometry().element_bytes, 16);
    // 128 pixels x 16 bytes = two tile columns, two tile rows.
    assert_eq!(layout.pitch(), 2048);
    assert_eq!(layout.total_size(), 4 * 65536);
}

#[test]
fn mcs_accompanies_compressed_msaa_color() {
    let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 256, 256)
        .with_tile_mode(TileMode::TileY)
        .with_samples(8)
        .with_array_size(2)
        .with_usage(UsageFlags::RENDER_TARGET | UsageFlags::COMPRESSION_METADATA);
    let layout = LayoutEngine::for_generation(Generation::Gen9)
        .create_layout(&desc)
        .unwrap();
    let mcs = layout.msaa().unwrap().mcs.as_ref().unwrap();
    // 8x MCS is 32 bits per pixel, one slice per array layer.
    assert_eq!(mcs.tile.bytes_per_element, 4);
    assert_eq!(mcs.slices, 2);
    assert_eq!(mcs.pitch, 1024);

    let aux = layout.aux_layout().unwrap();
    assert_eq!(aux.region(AuxComponent::Mcs).unwrap().size, mcs.total_size);
}

#[test]
fn unified_aux_lands_after_the_aligned_main_surface() {
    let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 100, 100)
        .with_tile_mode(TileMode::TileY)
        .with_usage(UsageFlags::COMPRESSION_METADATA | UsageFlags::UNIFIED_AUX);
    let layout = LayoutEngine::for_generation(Generation::Gen12)
        .create_layout(&desc)
        .unwrap();
    let aux = layout.aux_layout().unwrap();

    assert_eq!(aux.placement, AuxPlacement::Unified);
    assert!(aux.base_offset >= layout.total_size());
    assert_eq!(aux.base_offset % (64 * 1024), 0);
    assert_eq!(layout.allocation_size(), aux.base_offset + aux.size);
}

#[test]
fn aux_64kb_workaround_moves_gen9_unified_aux() {
    // 512-byte pitch, 64 rows: a 32 KiB main surface.
    let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 100, 60)
        .with_tile_mode(TileMode::TileY)
        .with_usage(UsageFlags::COMPRESSION_METADATA | UsageFlags::UNIFIED_AUX);
    let plain = LayoutEngine::for_generation(Generation::Gen9)
        .create_layout(&desc)
        .unwrap();
    let rules = GenerationRules::for_generation(Generation::Gen9)
        .with_workarounds(Workarounds::AUX_64KB_ALIGN);
    let workaround = LayoutEngine::new(rules).create_layout(&desc).unwrap();

    assert_eq!(plain.total_size(), 32 * 1024);
    assert_eq!(plain.aux_layout().unwrap().base_offset, 32 * 1024);
    assert_eq!(workaround.aux_layout().unwrap().base_offset, 64 * 1024);
    assert_eq!(workaround.total_size(), plain.total_size());
}

#[test]
fn separate_aux_offsets_start_at_zero() {
    let desc = ResourceDescriptor::texture_2d(Format::D24UnormS8Uint, 64, 64)
        .with_tile_mode(TileMode::TileY)
        .with_usage(
            UsageFlags::DEPTH | UsageFlags::COMPRESSION_METADATA | UsageFlags::CLEAR_COLOR,
        );
    let layout = LayoutEngine::for_generation(Generation::Gen12)
        .create_layout(&desc)
        .unwrap();
    let aux = layout.aux_layout().unwrap();

    assert_eq!(aux.placement, AuxPlacement::Separate);
    assert_eq!(aux.offset_of(AuxComponent::HiZ), Some(0));
    let hiz_size = aux.region(AuxComponent::HiZ).unwrap().size;
    assert_eq!(aux.offset_of(AuxComponent::Ccs), Some(hiz_size));
    assert!(aux.clear_color_offset().unwrap() > hiz_size);
    assert_eq!(aux.compression_state_offset(), None);
    assert_eq!(layout.allocation_size(), layout.total_size());
}
