//! Mip packing.
//!
//! Mip 0 sits at the block origin and mip 1 directly below it. Mips 2 and up stack downwards
//! in a column to the right of mip 1, so the block is `max(w0, w1 + column)` wide. 1D surfaces
//! lay every mip side by side in a single row instead.
//!
//! On standard tiles the trailing mips that fit within half a tile collapse into a single
//! tail tile. The tail occupies the position the first tail mip would have taken, except that
//! a tail starting at mip 2 goes below mip 1 and leaves the right column empty. Inside the
//! tail every mip sits at a fixed slot from [`crate::miptail`].

use crate::align::Alignment;
use crate::descriptor::Dimension;
use crate::engine::SurfaceParams;
use crate::miptail::{tail_slot, MipTailSlot};
use crate::platform::GenerationRules;
use crate::tile::TileShape;
use crate::util::{add_u32, align_up_u32, mip_extent};
use crate::Result;

/// Placement of a mip inside the mip block: `x` in elements, `y` in rows, `z` in slices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MipOffset {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipDescriptor {
    pub level: u32,
    /// Unaligned extent in texels.
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Aligned extent in elements (rows for height, slices for depth).
    pub aligned_width: u32,
    pub aligned_height: u32,
    pub aligned_depth: u32,
    /// Origin of the mip, or of the tail tile for tail-resident mips.
    pub offset: MipOffset,
    pub tail_slot: Option<MipTailSlot>,
}

impl MipDescriptor {
    pub fn is_in_mip_tail(&self) -> bool {
        self.tail_slot.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipPlan {
    pub mips: Vec<MipDescriptor>,
    /// Block extent of one array slice, in elements and rows.
    pub block_width: u32,
    pub block_height: u32,
    pub block_depth: u32,
    /// First tail-resident level, or `max_lod + 1` when there is no tail.
    pub mip_tail_start_lod: u32,
}

pub(crate) fn plan_mips(
    rules: &GenerationRules,
    params: &SurfaceParams,
    alignment: &Alignment,
    tile: &TileShape,
) -> Result<MipPlan> {
    let format = params.format;
    let levels = params.max_lod + 1;
    let mut mips = Vec::with_capacity(levels as usize);

    for level in 0..levels {
        let width = mip_extent(params.width, level);
        let height = match params.dimension {
            Dimension::OneD | Dimension::Buffer => 1,
            _ => mip_extent(params.height, level),
        };
        let depth = if params.dimension == Dimension::ThreeD {
            mip_extent(params.depth, level)
        } else {
            1
        };
        mips.push(MipDescriptor {
            level,
            width,
            height,
            depth,
            aligned_width: align_up_u32(
                format.width_in_elements(width),
                alignment.h_elements(),
            )?,
            aligned_height: align_up_u32(
                format.height_in_elements(height),
                alignment.v_elements(),
            )?,
            aligned_depth: align_up_u32(depth, alignment.d_align)?,
            offset: MipOffset::default(),
            tail_slot: None,
        });
    }

    let tail_start = find_tail_start(rules, params, tile, &mips);
    let (block_width, block_height) = match params.dimension {
        Dimension::OneD | Dimension::Buffer => place_row(&mut mips, tail_start, tile)?,
        _ => place_columns(&mut mips, tail_start, tile)?,
    };

    if let Some(start) = tail_start {
        for mip in mips.iter_mut().skip(start as usize) {
            mip.tail_slot = Some(tail_slot(
                params.dimension,
                params.tile_mode,
                format.bits_per_element,
                mip.level - start,
            )?);
        }
    }

    for mip in &mips {
        tracing::trace!(
            level = mip.level,
            x = mip.offset.x,
            y = mip.offset.y,
            aligned_width = mip.aligned_width,
            aligned_height = mip.aligned_height,
            tail_slot = mip.tail_slot.map(|s| s.index),
            "placed mip"
        );
    }

    let block_depth = mips.first().map_or(1, |m| m.aligned_depth);
    Ok(MipPlan {
        mips,
        block_width,
        block_height,
        block_depth,
        mip_tail_start_lod: tail_start.unwrap_or(levels),
    })
}

/// First level whose element extent fits the tail threshold, if the tail holds at least two
/// mips.
fn find_tail_start(
    rules: &GenerationRules,
    params: &SurfaceParams,
    tile: &TileShape,
    mips: &[MipDescriptor],
) -> Option<u32> {
    if !rules.supports_mip_tail(params.tile_mode) || params.tile_samples > 1 {
        return None;
    }
    let (max_w, max_h, max_d) = tile.mip_tail_threshold(params.dimension);
    let format = params.format;
    let start = mips.iter().position(|mip| {
        format.width_in_elements(mip.width) <= max_w
            && format.height_in_elements(mip.height) <= max_h
            && mip.depth <= max_d
    })? as u32;
    (start < params.max_lod).then_some(start)
}

fn place_row(
    mips: &mut [MipDescriptor],
    tail_start: Option<u32>,
    tile: &TileShape,
) -> Result<(u32, u32)> {
    let first_tail = tail_start.map_or(mips.len(), |k| k as usize);
    let mut x = 0u32;
    for mip in &mut mips[..first_tail] {
        mip.offset.x = x;
        x = add_u32(x, mip.aligned_width, "1D mip row")?;
    }
    if tail_start.is_some() {
        for mip in &mut mips[first_tail..] {
            mip.offset.x = x;
        }
        x = add_u32(x, tile.width, "1D mip tail")?;
    }
    let height = mips.first().map_or(1, |m| m.aligned_height);
    Ok((x, height))
}

fn place_columns(
    mips: &mut [MipDescriptor],
    tail_start: Option<u32>,
    tile: &TileShape,
) -> Result<(u32, u32)> {
    let w0 = mips[0].aligned_width;
    let h0 = mips[0].aligned_height;
    if mips.len() == 1 {
        return Ok((w0, h0));
    }

    let place_tail = |mips: &mut [MipDescriptor], from: usize, x: u32, y: u32| {
        for mip in &mut mips[from..] {
            mip.offset = MipOffset { x, y, z: 0 };
        }
    };

    match tail_start {
        Some(0) => {
            place_tail(mips, 0, 0, 0);
            return Ok((tile.width, tile.height));
        }
        Some(1) => {
            place_tail(mips, 1, 0, h0);
            return Ok((w0.max(tile.width), add_u32(h0, tile.height, "mip block")?));
        }
        _ => {}
    }

    let (w1, h1) = (mips[1].aligned_width, mips[1].aligned_height);
    mips[1].offset = MipOffset { x: 0, y: h0, z: 0 };

    if tail_start == Some(2) {
        let below_mip1 = add_u32(h0, h1, "mip block")?;
        place_tail(mips, 2, 0, below_mip1);
        let width = w0.max(w1).max(tile.width);
        return Ok((width, add_u32(below_mip1, tile.height, "mip block")?));
    }

    let first_tail = tail_start.map_or(mips.len(), |k| k as usize);
    let mut y = h0;
    let mut column_width = 0;
    for mip in &mut mips[2..first_tail] {
        mip.offset = MipOffset { x: w1, y, z: 0 };
        y = add_u32(y, mip.aligned_height, "mip column")?;
        column_width = column_width.max(mip.aligned_width);
    }
    if tail_start.is_some() {
        place_tail(mips, first_tail, w1, y);
        y = add_u32(y, tile.height, "mip column")?;
        column_width = column_width.max(tile.width);
    }

    let width = w0.max(add_u32(w1, column_width, "mip block")?);
    let height = add_u32(h0, h1.max(y - h0), "mip block")?;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::resolve_alignment;
    use crate::descriptor::ResourceDescriptor;
    use crate::format::Format;
    use crate::platform::Generation;
    use crate::tile::{resolve_tile_shape, TileMode};

    fn plan(generation: Generation, desc: ResourceDescriptor) -> MipPlan {
        let rules = GenerationRules::for_generation(generation);
        let params = SurfaceParams::from_descriptor(&desc);
        let alignment = resolve_alignment(&rules, &params).unwrap();
        let tile = resolve_tile_shape(
            &rules,
            params.tile_mode,
            params.format.bits_per_element,
            params.dimension,
            1,
        )
        .unwrap();
        plan_mips(&rules, &params, &alignment, &tile).unwrap()
    }

    fn offsets(plan: &MipPlan) -> Vec<(u32, u32)> {
        plan.mips.iter().map(|m| (m.offset.x, m.offset.y)).collect()
    }

    #[test]
    fn right_column_starts_at_mip2() {
        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 256, 256)
            .with_tile_mode(TileMode::TileY)
            .with_max_lod(4);
        let plan = plan(Generation::Gen9, desc);
        assert_eq!(
            offsets(&plan),
            vec![(0, 0), (0, 256), (128, 256), (128, 320), (128, 352)]
        );
        assert_eq!(plan.block_width, 256);
        assert_eq!(plan.block_height, 256 + 128);
        assert_eq!(plan.mip_tail_start_lod, 5);
    }

    #[test]
    fn narrow_mip0_lets_the_column_widen_the_block() {
        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 16, 64)
            .with_tile_mode(TileMode::TileY)
            .with_max_lod(2);
        let plan = plan(Generation::Gen9, desc);
        // Mip 1 and mip 2 both align up to 16 elements, side by side.
        assert_eq!(plan.block_width, 32);
        assert_eq!(plan.block_height, 64 + 32);
    }

    #[test]
    fn single_level_has_no_column() {
        let desc = ResourceDescriptor::texture_2d(Format::R8Unorm, 33, 5);
        let plan = plan(Generation::Gen9, desc);
        assert_eq!((plan.block_width, plan.block_height), (48, 8));
        assert_eq!(plan.mips.len(), 1);
    }

    #[test]
    fn ys_tail_packs_into_the_column() {
        // 32bpe Ys tile is 128x128 elements, tail threshold 64x64.
        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 512, 512)
            .with_tile_mode(TileMode::TileYs)
            .with_max_lod(9);
        let plan = plan(Generation::Gen9, desc);
        assert_eq!(plan.mip_tail_start_lod, 3);
        let tail = &plan.mips[3..];
        assert!(tail.iter().all(|m| m.offset == MipOffset { x: 256, y: 640, z: 0 }));
        assert_eq!(tail[0].tail_slot.map(|s| (s.x, s.y)), Some((64, 0)));
        assert_eq!(tail[1].tail_slot.map(|s| (s.x, s.y)), Some((0, 64)));
        assert_eq!(plan.block_width, 512);
        assert_eq!(plan.block_height, 512 + 256);
    }

    #[test]
    fn tail_at_mip2_goes_below_mip1() {
        // 128x128 at 32bpe: mip 1 already fits the 64x64 threshold.
        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 128, 128)
            .with_tile_mode(TileMode::TileYs)
            .with_max_lod(7);
        let p1 = plan(Generation::Gen9, desc);
        assert_eq!(p1.mip_tail_start_lod, 1);
        assert_eq!(p1.mips[1].offset, MipOffset { x: 0, y: 128, z: 0 });

        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 256, 256)
            .with_tile_mode(TileMode::TileYs)
            .with_max_lod(8);
        let plan = plan(Generation::Gen9, desc);
        assert_eq!(plan.mip_tail_start_lod, 2);
        assert_eq!(plan.mips[2].offset, MipOffset { x: 0, y: 256 + 128, z: 0 });
        assert_eq!(plan.block_width, 256);
        assert_eq!(plan.block_height, 256 + 128 + 128);
    }

    #[test]
    fn whole_chain_in_tail() {
        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 64, 64)
            .with_tile_mode(TileMode::TileYs)
            .with_max_lod(6);
        let plan = plan(Generation::Gen9, desc);
        assert_eq!(plan.mip_tail_start_lod, 0);
        assert_eq!((plan.block_width, plan.block_height), (128, 128));
        assert!(plan.mips.iter().all(MipDescriptor::is_in_mip_tail));
    }

    #[test]
    fn tail_needs_more_than_the_last_mip() {
        // Only the last level fits the threshold: no tail.
        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 128, 128)
            .with_tile_mode(TileMode::TileYs)
            .with_max_lod(1);
        let plan = plan(Generation::Gen9, desc);
        assert_eq!(plan.mip_tail_start_lod, 2);
        assert!(plan.mips.iter().all(|m| !m.is_in_mip_tail()));

        let disabled = GenerationRules::for_generation(Generation::Gen9)
            .with_workarounds(crate::platform::Workarounds::DISABLE_MIPTAIL);
        let desc = desc.with_max_lod(7);
        let params = SurfaceParams::from_descriptor(&desc);
        let alignment = resolve_alignment(&disabled, &params).unwrap();
        let tile = resolve_tile_shape(&disabled, TileMode::TileYs, 32, Dimension::TwoD, 1)
            .unwrap();
        let plan = plan_mips(&disabled, &params, &alignment, &tile).unwrap();
        assert_eq!(plan.mip_tail_start_lod, 8);
    }

    #[test]
    fn one_d_mips_sit_side_by_side() {
        let desc = ResourceDescriptor::texture_1d(Format::R32Float, 200).with_max_lod(3);
        let plan = plan(Generation::Gen9, desc);
        assert_eq!(offsets(&plan), vec![(0, 0), (256, 0), (384, 0), (448, 0)]);
        assert_eq!((plan.block_width, plan.block_height), (512, 1));
    }

    #[test]
    fn volume_tiles_align_depth() {
        let desc = ResourceDescriptor::texture_3d(Format::R8Unorm, 64, 64, 20)
            .with_tile_mode(TileMode::TileYf)
            .with_max_lod(1);
        let plan = plan(Generation::Gen9, desc);
        assert_eq!(plan.block_depth, 32);
        assert_eq!(plan.mips[1].aligned_depth, 16);
    }

    #[test]
    fn aligned_extents_never_grow() {
        let desc = ResourceDescriptor::texture_2d(Format::Bc3RgbaUnorm, 1000, 300)
            .with_tile_mode(TileMode::TileY)
            .with_max_lod(9);
        let plan = plan(Generation::Gen9, desc);
        for pair in plan.mips.windows(2) {
            assert!(pair[0].aligned_width >= pair[1].aligned_width);
            assert!(pair[0].aligned_height >= pair[1].aligned_height);
        }
    }
}
