//! Multisampled surfaces.
//!
//! Color targets store each sample as its own slice ("arrayed"). Depth and stencil store the
//! samples of a pixel next to each other ("interleaved"): inside the element on standard
//! tiles, by scaling the surface dimensions on legacy tiles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptor::{Dimension, ResourceDescriptor, UsageFlags};
use crate::engine::{layout_surface, SurfaceParams};
use crate::format::Format;
use crate::pitch::SurfaceGeometry;
use crate::platform::{GenerationRules, InterleaveFactor};
use crate::tile::TileMode;
use crate::util::div_ceil_u32;
use crate::{LayoutError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MsaaFamily {
    Arrayed,
    Interleaved,
}

impl MsaaFamily {
    pub fn of(desc: &ResourceDescriptor) -> Self {
        if desc.is_depth_or_stencil() {
            MsaaFamily::Interleaved
        } else {
            MsaaFamily::Arrayed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsaaLayout {
    pub family: MsaaFamily,
    pub samples: u32,
    /// Dimension scaling applied to interleaved surfaces on legacy tiles.
    pub interleave: Option<InterleaveFactor>,
    /// Companion compression-control surface.
    pub mcs: Option<SurfaceGeometry>,
}

/// MCS element format by sample count.
pub fn mcs_format(samples: u32) -> Format {
    match samples {
        2 | 4 => Format::R8Unorm,
        8 => Format::R32Uint,
        _ => Format::R32G32Uint,
    }
}

/// Build the main-surface parameters for `desc` and, when multisampled, its MSAA layout.
pub(crate) fn resolve(
    rules: &GenerationRules,
    desc: &ResourceDescriptor,
) -> Result<(SurfaceParams, Option<MsaaLayout>)> {
    let mut params = SurfaceParams::from_descriptor(desc);
    if desc.samples <= 1 {
        return Ok((params, None));
    }

    let family = MsaaFamily::of(desc);
    let mut interleave = None;
    match family {
        MsaaFamily::Arrayed => {
            params.layers = params
                .layers
                .checked_mul(desc.samples)
                .ok_or(LayoutError::SizeOverflow("sample slices"))?;
        }
        MsaaFamily::Interleaved if desc.tile_mode.is_standard_tile() => {
            params.tile_samples = desc.samples;
        }
        MsaaFamily::Interleaved => {
            let factor = rules.interleave_factor(desc.samples).ok_or_else(|| {
                LayoutError::unsupported(format!("{}x interleaved MSAA", desc.samples))
            })?;
            params.width = div_ceil_u32(desc.width, factor.width_div)
                .checked_mul(factor.width_mul)
                .ok_or(LayoutError::SizeOverflow("interleaved width"))?;
            params.height = div_ceil_u32(desc.height, factor.height_div)
                .checked_mul(factor.height_mul)
                .ok_or(LayoutError::SizeOverflow("interleaved height"))?;
            interleave = Some(factor);
        }
    }

    let mcs = if family == MsaaFamily::Arrayed
        && desc.usage.contains(UsageFlags::COMPRESSION_METADATA)
    {
        Some(layout_mcs(rules, desc)?)
    } else {
        None
    };

    tracing::trace!(
        ?family,
        samples = desc.samples,
        width = params.width,
        height = params.height,
        layers = params.layers,
        "resolved multisampled surface"
    );

    Ok((
        params,
        Some(MsaaLayout {
            family,
            samples: desc.samples,
            interleave,
            mcs,
        }),
    ))
}

/// MCS: TileY, one element per pixel, one slice per array layer.
fn layout_mcs(rules: &GenerationRules, desc: &ResourceDescriptor) -> Result<SurfaceGeometry> {
    let params = SurfaceParams {
        dimension: Dimension::TwoD,
        format: mcs_format(desc.samples).info(),
        width: desc.width,
        height: desc.height,
        depth: 1,
        max_lod: 0,
        layers: desc.array_size,
        tile_mode: TileMode::TileY,
        usage: UsageFlags::empty(),
        samples: 1,
        tile_samples: 1,
    };
    layout_surface(rules, &params)
}
