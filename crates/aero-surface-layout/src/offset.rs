//! Sub-resource offset queries.
//!
//! Hardware surface state addresses whole tiles while shaders and copy engines need the texel
//! position inside that tile, so every query answers with both: the byte offset of the tile
//! containing the sub-resource origin and the remainder within it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptor::{Dimension, CUBE_FACES};
use crate::engine::ResourceLayout;
use crate::msaa::MsaaFamily;
use crate::pitch::SurfaceGeometry;
use crate::planar::Plane;
use crate::util::{add_u64, mul_u64};
use crate::{LayoutError, Result};

/// Identifies one sub-resource. Unused coordinates stay 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Selector {
    pub mip: u32,
    pub array_index: u32,
    pub face: u32,
    /// Depth slice of a 3D resource.
    pub slice: u32,
    pub plane: Plane,
    /// Sample of an arrayed multisampled surface.
    pub sample: u32,
}

impl Selector {
    pub fn mip(mip: u32) -> Self {
        Self {
            mip,
            ..Self::default()
        }
    }

    pub fn with_array_index(mut self, array_index: u32) -> Self {
        self.array_index = array_index;
        self
    }

    pub fn with_face(mut self, face: u32) -> Self {
        self.face = face;
        self
    }

    pub fn with_slice(mut self, slice: u32) -> Self {
        self.slice = slice;
        self
    }

    pub fn with_plane(mut self, plane: Plane) -> Self {
        self.plane = plane;
        self
    }

    pub fn with_sample(mut self, sample: u32) -> Self {
        self.sample = sample;
        self
    }
}

/// Tile-granular base plus intra-tile remainder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SubresourceOffset {
    pub tile_base_offset: u64,
    pub x_offset_bytes: u32,
    pub y_offset_rows: u32,
    pub z_offset: u32,
}

fn check(what: &'static str, index: u32, limit: u32) -> Result<()> {
    if index >= limit {
        return Err(LayoutError::OffsetOutOfRange { what, index, limit });
    }
    Ok(())
}

pub(crate) fn query_offset(
    layout: &ResourceLayout,
    selector: &Selector,
) -> Result<SubresourceOffset> {
    let desc = layout.descriptor();
    let geometry = layout.geometry();

    check("mip", selector.mip, geometry.max_lod() + 1)?;
    let faces = if desc.dimension == Dimension::Cube {
        CUBE_FACES
    } else {
        1
    };
    check("face", selector.face, faces)?;
    check("array", selector.array_index, desc.array_size)?;

    let arrayed_samples = match layout.msaa() {
        Some(msaa) if msaa.family == MsaaFamily::Arrayed => msaa.samples,
        _ => 1,
    };
    check("sample", selector.sample, arrayed_samples)?;

    let mip = &geometry.mips[selector.mip as usize];
    let depth_slices = if desc.dimension == Dimension::ThreeD {
        mip.depth
    } else {
        1
    };
    check("slice", selector.slice, depth_slices)?;

    if let Some(planes) = layout.planar() {
        let plane = planes.plane(selector.plane).ok_or(LayoutError::OffsetOutOfRange {
            what: "plane",
            index: selector.plane as u32,
            limit: planes.planes.len() as u32,
        })?;
        if planes.byte_stream || !geometry.tile_mode().is_tiled() {
            return Ok(SubresourceOffset {
                tile_base_offset: plane.offset,
                ..SubresourceOffset::default()
            });
        }
        return split(geometry, plane.x_offset_bytes, plane.y_offset_rows);
    }
    check("plane", selector.plane as u32, 1)?;

    // Index of the QPitch-spaced slice holding the sub-resource.
    let (slice_index, mut z) = if geometry.is_volume_tiled() {
        let tile_depth = geometry.tile.depth;
        (selector.slice / tile_depth, selector.slice % tile_depth)
    } else {
        let layer = selector.array_index * faces + selector.face;
        (
            layer * arrayed_samples + selector.sample + selector.slice,
            0,
        )
    };

    let y = add_u64(
        mul_u64(u64::from(slice_index), u64::from(geometry.qpitch), "slice offset")?,
        u64::from(mip.offset.y),
        "mip offset",
    )?;
    let x_bytes = mul_u64(
        u64::from(mip.offset.x),
        u64::from(geometry.element_bytes),
        "mip offset",
    )?;

    let mut offset = split(geometry, x_bytes, y)?;
    if let Some(slot) = mip.tail_slot {
        offset.x_offset_bytes += slot.x * geometry.element_bytes;
        offset.y_offset_rows += slot.y;
        z += slot.z;
    }
    offset.z_offset = z;
    Ok(offset)
}

/// Split an absolute byte column and row into tile base and remainder.
fn split(geometry: &SurfaceGeometry, x_bytes: u64, y: u64) -> Result<SubresourceOffset> {
    let tile = &geometry.tile;
    if !tile.mode.is_tiled() {
        let linear = add_u64(mul_u64(y, geometry.pitch, "row offset")?, x_bytes, "offset")?;
        return Ok(SubresourceOffset {
            tile_base_offset: linear,
            ..SubresourceOffset::default()
        });
    }

    let tile_width = u64::from(tile.width_bytes());
    let tile_height = u64::from(tile.height);
    let tile_row = y / tile_height;
    let tile_col = x_bytes / tile_width;
    let tile_base_offset = add_u64(
        mul_u64(tile_row, tile.row_bytes(geometry.pitch), "tile row offset")?,
        mul_u64(tile_col, u64::from(tile.size_bytes), "tile column offset")?,
        "tile offset",
    )?;
    Ok(SubresourceOffset {
        tile_base_offset,
        x_offset_bytes: (x_bytes % tile_width) as u32,
        y_offset_rows: (y % tile_height) as u32,
        z_offset: 0,
    })
}
