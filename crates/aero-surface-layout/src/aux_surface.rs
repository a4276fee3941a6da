//! Compression metadata placement.
//!
//! An aux allocation is built from up to four regions, each starting on a page boundary:
//! a secondary surface (HiZ for depth, MCS for multisampled color), the CCS covering the main
//! surface (one segment per plane for planar media), a clear-color block and a
//! compression-state block.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptor::{ResourceDescriptor, UsageFlags};
use crate::engine::{layout_surface, SurfaceParams};
use crate::format::FormatInfo;
use crate::msaa::MsaaLayout;
use crate::pitch::SurfaceGeometry;
use crate::planar::{Plane, PlanarLayout};
use crate::platform::{AuxPolicy, GenerationRules, Workarounds};
use crate::tile::TileMode;
use crate::util::{add_u64, align_up_u64, mul_u64};
use crate::{LayoutError, Result};

pub const CLEAR_COLOR_SIZE: u64 = 4096;
pub const COMPRESSION_STATE_SIZE: u64 = 4096;

/// Legacy CCS is rounded to TileY: 128 bytes by 32 rows.
const CCS_TILE_WIDTH_BYTES: u64 = 128;
const CCS_TILE_HEIGHT: u64 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AuxComponent {
    Ccs,
    HiZ,
    Mcs,
    ClearColor,
    CompressionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AuxPlacement {
    /// Appended to the main allocation at `base_offset`.
    Unified,
    /// A separate allocation; offsets are relative to its own base.
    Separate,
}

/// One region of the aux allocation. `offset` is relative to the aux base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuxRegion {
    pub component: AuxComponent,
    pub offset: u64,
    pub size: u64,
}

/// CCS covering one plane (or the whole surface for non-planar resources).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcsSegment {
    pub plane: Plane,
    pub offset: u64,
    pub pitch: u64,
    pub rows: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxLayout {
    pub placement: AuxPlacement,
    /// Offset of the aux base from the start of the main surface; 0 for separate aux.
    pub base_offset: u64,
    /// Row pitch of the first CCS segment, 0 without CCS.
    pub pitch: u64,
    pub size: u64,
    pub regions: Vec<AuxRegion>,
    pub ccs: Vec<CcsSegment>,
    pub hiz: Option<SurfaceGeometry>,
}

impl AuxLayout {
    pub fn is_unified(&self) -> bool {
        self.placement == AuxPlacement::Unified
    }

    pub fn region(&self, component: AuxComponent) -> Option<&AuxRegion> {
        self.regions.iter().find(|r| r.component == component)
    }

    /// Offset of `component`, from the main surface for unified aux and from the aux base
    /// otherwise.
    pub fn offset_of(&self, component: AuxComponent) -> Option<u64> {
        self.region(component).map(|r| self.base_offset + r.offset)
    }

    pub fn clear_color_offset(&self) -> Option<u64> {
        self.offset_of(AuxComponent::ClearColor)
    }

    pub fn compression_state_offset(&self) -> Option<u64> {
        self.offset_of(AuxComponent::CompressionState)
    }
}

struct RegionBuilder {
    page_size: u64,
    cursor: u64,
    regions: Vec<AuxRegion>,
}

impl RegionBuilder {
    fn push(&mut self, component: AuxComponent, size: u64) -> Result<u64> {
        let offset = align_up_u64(self.cursor, self.page_size)?;
        self.cursor = add_u64(offset, size, "aux size")?;
        self.regions.push(AuxRegion {
            component,
            offset,
            size,
        });
        Ok(offset)
    }
}

/// Resolve the aux layout for a resource requesting compression metadata.
pub(crate) fn resolve(
    rules: &GenerationRules,
    desc: &ResourceDescriptor,
    geometry: &SurfaceGeometry,
    planes: Option<&PlanarLayout>,
    msaa: Option<&MsaaLayout>,
) -> Result<Option<AuxLayout>> {
    if !desc.usage.contains(UsageFlags::COMPRESSION_METADATA) {
        return Ok(None);
    }

    let depth = desc.is_depth_or_stencil();
    let multisampled = desc.samples > 1;
    let mut builder = RegionBuilder {
        page_size: rules.page_size,
        cursor: 0,
        regions: Vec::new(),
    };

    let mut hiz = None;
    if depth {
        if !desc.format.info().has_depth() {
            return Err(LayoutError::unsupported(format!(
                "{:?} has no depth to build HiZ for",
                desc.format
            )));
        }
        let geometry = layout_hiz(rules, desc)?;
        builder.push(AuxComponent::HiZ, geometry.total_size)?;
        hiz = Some(geometry);
    } else if multisampled {
        let mcs = msaa.and_then(|m| m.mcs.as_ref()).ok_or_else(|| {
            LayoutError::unsupported("multisampled color compression needs an MCS")
        })?;
        builder.push(AuxComponent::Mcs, mcs.total_size)?;
    }

    let segments = match rules.aux {
        // Legacy generations compress depth through HiZ and MSAA through MCS only.
        AuxPolicy::LegacyCcs { .. } if depth || multisampled => Vec::new(),
        AuxPolicy::LegacyCcs { row_divisor } => vec![legacy_ccs(desc, geometry, row_divisor)?],
        AuxPolicy::Unified {
            main_bytes_per_aux_byte,
        } => unified_ccs(geometry, planes, main_bytes_per_aux_byte)?,
    };

    let mut ccs = Vec::with_capacity(segments.len());
    if !segments.is_empty() {
        let mut offset = align_up_u64(builder.cursor, rules.page_size)?;
        let start = offset;
        for mut segment in segments {
            segment.offset = offset;
            offset = add_u64(offset, segment.size, "ccs size")?;
            ccs.push(segment);
        }
        builder.push(AuxComponent::Ccs, offset - start)?;
    }

    if desc.usage.contains(UsageFlags::CLEAR_COLOR) {
        builder.push(AuxComponent::ClearColor, CLEAR_COLOR_SIZE)?;
    }
    if desc.usage.contains(UsageFlags::MEDIA) {
        builder.push(AuxComponent::CompressionState, COMPRESSION_STATE_SIZE)?;
    }

    let size = align_up_u64(builder.cursor, rules.page_size)?;
    let (placement, base_offset) = if desc.usage.contains(UsageFlags::UNIFIED_AUX) {
        let alignment = rules.unified_aux_alignment();
        if rules.workarounds.contains(Workarounds::AUX_64KB_ALIGN)
            && alignment != rules.unified_aux_main_align
        {
            tracing::debug!(alignment, "aux 64 KiB workaround raised unified aux alignment");
        }
        (
            AuxPlacement::Unified,
            align_up_u64(geometry.total_size, alignment)?,
        )
    } else {
        (AuxPlacement::Separate, 0)
    };

    Ok(Some(AuxLayout {
        placement,
        base_offset,
        pitch: ccs.first().map_or(0, |s| s.pitch),
        size,
        regions: builder.regions,
        ccs,
        hiz,
    }))
}

fn legacy_ccs(
    desc: &ResourceDescriptor,
    geometry: &SurfaceGeometry,
    row_divisor: u32,
) -> Result<CcsSegment> {
    let info = desc.format.info();
    if desc.format.is_planar() {
        return Err(LayoutError::unsupported(format!(
            "{:?} has no legacy CCS layout",
            desc.format
        )));
    }
    if !matches!(
        geometry.tile_mode(),
        TileMode::TileY | TileMode::TileYf | TileMode::TileYs
    ) {
        return Err(LayoutError::unsupported(format!(
            "legacy CCS needs a Y-class tile, not {:?}",
            geometry.tile_mode()
        )));
    }
    let pitch_divisor = match info.bits_per_element {
        32 => 8,
        64 => 4,
        128 => 2,
        bits => {
            return Err(LayoutError::unsupported(format!(
                "legacy CCS for {bits} bits per element"
            )))
        }
    };

    let pitch = align_up_u64(geometry.pitch / pitch_divisor, CCS_TILE_WIDTH_BYTES)?;
    let rows = align_up_u64(
        geometry.total_rows.div_ceil(u64::from(row_divisor)),
        CCS_TILE_HEIGHT,
    )?;
    Ok(CcsSegment {
        plane: Plane::Y,
        offset: 0,
        pitch,
        rows,
        size: mul_u64(pitch, rows, "ccs size")?,
    })
}

fn unified_ccs(
    geometry: &SurfaceGeometry,
    planes: Option<&PlanarLayout>,
    main_bytes_per_aux_byte: u32,
) -> Result<Vec<CcsSegment>> {
    let tile = &geometry.tile;
    let pitch_in_tiles = geometry
        .pitch_in_tiles()
        .ok_or_else(|| LayoutError::unsupported("linear surfaces cannot be compressed"))?;
    let aux_per_tile = u64::from(tile.size_bytes / main_bytes_per_aux_byte);
    let pitch = mul_u64(pitch_in_tiles, aux_per_tile, "ccs pitch")?;
    let tile_height = u64::from(tile.height);

    let segment = |plane: Plane, main_rows: u64| -> Result<CcsSegment> {
        let rows = main_rows.div_ceil(tile_height);
        Ok(CcsSegment {
            plane,
            offset: 0,
            pitch,
            rows,
            size: mul_u64(pitch, rows, "ccs size")?,
        })
    };

    match planes {
        Some(planes) => {
            let mut segments = Vec::with_capacity(planes.planes.len());
            let mut last_row = None;
            for plane in &planes.planes {
                // Side-by-side chroma planes share their rows and their CCS.
                if last_row == Some(plane.y_offset_rows) {
                    continue;
                }
                last_row = Some(plane.y_offset_rows);
                segments.push(segment(plane.plane, plane.rows)?);
            }
            Ok(segments)
        }
        None => Ok(vec![segment(Plane::Y, geometry.total_rows)?]),
    }
}

/// HiZ: TileY, 128 bits per 8x4 pixel block, same mip chain and slices as the depth surface.
fn layout_hiz(rules: &GenerationRules, desc: &ResourceDescriptor) -> Result<SurfaceGeometry> {
    let params = SurfaceParams {
        dimension: desc.dimension,
        format: FormatInfo::HIZ,
        width: desc.width,
        height: desc.height,
        depth: desc.depth,
        max_lod: desc.max_lod,
        layers: desc.layer_count(),
        tile_mode: TileMode::TileY,
        usage: UsageFlags::HIZ,
        samples: 1,
        tile_samples: 1,
    };
    layout_surface(rules, &params)
}
