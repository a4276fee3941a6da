//! Pitch and size finalization.

use crate::align::Alignment;
use crate::descriptor::{Dimension, UsageFlags};
use crate::engine::SurfaceParams;
use crate::mip::{MipDescriptor, MipPlan};
use crate::platform::GenerationRules;
use crate::tile::{TileMode, TileShape};
use crate::util::{align_up_u32, align_up_u64, mul_u64};
use crate::{LayoutError, Result};

/// Immutable geometry of one surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceGeometry {
    pub dimension: Dimension,
    pub tile: TileShape,
    pub alignment: Alignment,
    /// Bytes per element, including samples packed into the element.
    pub element_bytes: u32,
    pub block_width: u32,
    pub block_height: u32,
    pub block_depth: u32,
    pub pitch: u64,
    /// Byte multiple every pitch of this surface must honour.
    pub pitch_alignment: u64,
    /// Rows between consecutive array layers, depth slices or depth slabs.
    pub qpitch: u32,
    /// Number of QPitch-spaced slices.
    pub slices: u32,
    pub total_rows: u64,
    pub total_size: u64,
    pub mip_tail_start_lod: u32,
    pub mips: Vec<MipDescriptor>,
}

impl SurfaceGeometry {
    pub fn tile_mode(&self) -> TileMode {
        self.tile.mode
    }

    pub fn max_lod(&self) -> u32 {
        self.mips.len().saturating_sub(1) as u32
    }

    pub fn mip(&self, level: u32) -> Option<&MipDescriptor> {
        self.mips.get(level as usize)
    }

    pub fn has_mip_tail(&self) -> bool {
        self.mip_tail_start_lod <= self.max_lod()
    }

    pub fn pitch_in_tiles(&self) -> Option<u64> {
        self.tile
            .mode
            .is_tiled()
            .then(|| self.pitch / u64::from(self.tile.width_bytes()))
    }

    /// Whether depth slices are grouped into volume tiles rather than stacked at QPitch.
    pub fn is_volume_tiled(&self) -> bool {
        self.dimension == Dimension::ThreeD && self.tile.depth > 1
    }
}

/// Turn a mip plan into pitch, QPitch and total size.
pub(crate) fn finalize(
    rules: &GenerationRules,
    params: &SurfaceParams,
    plan: MipPlan,
    alignment: Alignment,
    tile: TileShape,
) -> Result<SurfaceGeometry> {
    let element_bytes = tile.bytes_per_element * tile.samples;
    let width_bytes = mul_u64(
        u64::from(plan.block_width),
        u64::from(element_bytes),
        "block width",
    )?;

    let (pitch, pitch_alignment) = if tile.mode.is_tiled() {
        let granularity = u64::from(tile.width_bytes());
        (align_up_u64(width_bytes, granularity)?, granularity)
    } else if params.dimension == Dimension::Buffer {
        (width_bytes, 1)
    } else {
        let mut granularity = u64::from(rules.linear_pitch_align);
        if params.usage.contains(UsageFlags::MEDIA) {
            granularity = granularity.max(u64::from(rules.media_pitch_align));
        }
        let pitch = width_bytes.max(u64::from(rules.min_pitch));
        (align_up_u64(pitch, granularity)?, granularity)
    };

    let qpitch = align_up_u32(plan.block_height, tile.height)?;
    let slices = if params.dimension == Dimension::ThreeD {
        plan.block_depth / tile.depth
    } else {
        params.layers
    };
    let total_rows = mul_u64(u64::from(qpitch), u64::from(slices), "surface rows")?;
    let total_size = size_for_rows(rules, pitch, total_rows, &tile)?;

    Ok(SurfaceGeometry {
        dimension: params.dimension,
        tile,
        alignment,
        element_bytes,
        block_width: plan.block_width,
        block_height: plan.block_height,
        block_depth: plan.block_depth,
        pitch,
        pitch_alignment,
        qpitch,
        slices,
        total_rows,
        total_size,
        mip_tail_start_lod: plan.mip_tail_start_lod,
        mips: plan.mips,
    })
}

/// Page-rounded size of `rows` rows of `pitch` bytes. Volume tiles carry `tile.depth` slices
/// per row.
pub(crate) fn size_for_rows(
    rules: &GenerationRules,
    pitch: u64,
    rows: u64,
    tile: &TileShape,
) -> Result<u64> {
    let raw = mul_u64(
        mul_u64(pitch, rows, "surface size")?,
        u64::from(tile.depth),
        "surface size",
    )?;
    let size = align_up_u64(raw, rules.page_size)?;
    if size > rules.max_surface_size {
        return Err(LayoutError::SizeOverflow("surface size beyond the generation limit"));
    }
    Ok(size)
}
