//! Plane placement for planar YUV and RGB formats.
//!
//! The luma (or first) plane is the surface laid out by the mip planner; chroma planes follow
//! it in the same allocation. Each format is described by a [`PlanarRule`] rather than code.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptor::{ResourceDescriptor, UsageFlags};
use crate::format::Format;
use crate::pitch::{size_for_rows, SurfaceGeometry};
use crate::platform::{AuxPolicy, GenerationRules, SIZE_64KB};
use crate::tile::TileMode;
use crate::util::{add_u64, align_up_u64, gcd_u64, lcm_u64, mul_u64};
use crate::{LayoutError, Result};

/// Plane selector. RGB planar formats name their planes by storage order: `Y` is the first
/// stored plane, `U` the second and `V` the third.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Plane {
    #[default]
    Y,
    U,
    V,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arrangement {
    /// One interleaved chroma plane below luma.
    SemiPlanar,
    /// Separate chroma planes stacked below luma at full pitch.
    Stacked,
    /// Two chroma planes sharing rows, each half the pitch wide.
    SideBySide,
    /// Planes packed back to back as one linear byte stream at half pitch.
    ByteStream,
}

#[derive(Debug, Clone, Copy)]
struct PlanarRule {
    arrangement: Arrangement,
    /// Chroma height is `ceil(luma height / height_div)`.
    height_div: u32,
    /// Chroma planes in storage order.
    chroma: &'static [Plane],
    /// IMC formats align every plane to 16 rows.
    imc: bool,
}

const fn planar_rule(
    arrangement: Arrangement,
    height_div: u32,
    chroma: &'static [Plane],
    imc: bool,
) -> PlanarRule {
    PlanarRule {
        arrangement,
        height_div,
        chroma,
        imc,
    }
}

fn rule_for(format: Format) -> Option<PlanarRule> {
    use Arrangement::*;
    use Plane::{U, V};
    let rule = match format {
        Format::Nv12 | Format::Nv21 | Format::P010 | Format::P016 => {
            planar_rule(SemiPlanar, 2, &[U], false)
        }
        Format::P208 => planar_rule(SemiPlanar, 1, &[U], false),
        Format::Imc1 => planar_rule(Stacked, 2, &[V, U], true),
        Format::Imc3 => planar_rule(Stacked, 2, &[U, V], true),
        Format::Imc2 => planar_rule(SideBySide, 2, &[V, U], true),
        Format::Imc4 => planar_rule(SideBySide, 2, &[U, V], true),
        Format::Yvu9 => planar_rule(Stacked, 4, &[V, U], false),
        Format::Rgbp | Format::Bgrp => planar_rule(Stacked, 1, &[U, V], false),
        Format::Yv12 => planar_rule(ByteStream, 2, &[V, U], false),
        Format::I420 | Format::Iyuv => planar_rule(ByteStream, 2, &[U, V], false),
        _ => return None,
    };
    Some(rule)
}

/// Reject tile modes a planar format has no layout for.
pub(crate) fn check_tiling(format: Format, tile_mode: TileMode) -> Result<()> {
    match rule_for(format) {
        Some(rule) if rule.arrangement == Arrangement::ByteStream && tile_mode.is_tiled() => {
            Err(LayoutError::UnsupportedTilingForFormat { format, tile_mode })
        }
        Some(_) => Ok(()),
        None => Err(LayoutError::unsupported(format!("{format:?} is not planar"))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    pub plane: Plane,
    /// Byte offset of the plane's first byte from the surface start.
    pub offset: u64,
    pub x_offset_bytes: u64,
    pub y_offset_rows: u64,
    pub row_pitch: u64,
    pub rows: u64,
    /// One past the last byte the plane touches.
    pub end: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarLayout {
    pub planes: Vec<PlaneLayout>,
    pub total_rows: u64,
    pub total_size: u64,
    /// Planes live in one linear byte stream rather than on a shared pitch.
    pub byte_stream: bool,
    semi_planar: bool,
}

impl PlanarLayout {
    /// Look up a plane. Semi-planar formats answer `U` and `V` with the interleaved chroma
    /// plane.
    pub fn plane(&self, plane: Plane) -> Option<&PlaneLayout> {
        let plane = if self.semi_planar && plane == Plane::V {
            Plane::U
        } else {
            plane
        };
        self.planes.iter().find(|p| p.plane == plane)
    }
}

pub(crate) fn resolve(
    rules: &GenerationRules,
    desc: &ResourceDescriptor,
    geometry: &SurfaceGeometry,
) -> Result<PlanarLayout> {
    check_tiling(desc.format, desc.tile_mode)?;
    let rule = rule_for(desc.format)
        .ok_or_else(|| LayoutError::unsupported(format!("{:?} is not planar", desc.format)))?;

    let pitch = geometry.pitch;
    let tiled = geometry.tile_mode().is_tiled();
    let mut row_align = if tiled {
        u64::from(geometry.tile.height)
    } else {
        u64::from(rules.planar_row_align)
    };
    if rule.imc {
        row_align = lcm_u64(row_align, u64::from(rules.imc_plane_row_align))?;
    }

    let mut start_align = row_align;
    if desc.usage.contains(UsageFlags::UNIFIED_AUX)
        && matches!(rules.aux, AuxPolicy::Unified { .. })
    {
        let rows_per_64kb = SIZE_64KB / gcd_u64(SIZE_64KB, pitch);
        start_align = lcm_u64(row_align, rows_per_64kb)?;
        tracing::debug!(start_align, "aligning plane starts to 64 KiB for unified aux");
    }

    let luma_rows = align_up_u64(u64::from(geometry.block_height), row_align)?;
    let chroma_rows = align_up_u64(
        u64::from(desc.height.div_ceil(rule.height_div)),
        row_align,
    )?;

    let mut planes = vec![PlaneLayout {
        plane: Plane::Y,
        offset: 0,
        x_offset_bytes: 0,
        y_offset_rows: 0,
        row_pitch: pitch,
        rows: luma_rows,
        end: mul_u64(pitch, luma_rows, "luma plane")?,
    }];

    let total_rows = match rule.arrangement {
        Arrangement::SemiPlanar | Arrangement::Stacked => {
            let mut y = luma_rows;
            for &plane in rule.chroma {
                y = align_up_u64(y, start_align)?;
                let offset = mul_u64(y, pitch, "plane offset")?;
                let next = add_u64(y, chroma_rows, "plane rows")?;
                planes.push(PlaneLayout {
                    plane,
                    offset,
                    x_offset_bytes: 0,
                    y_offset_rows: y,
                    row_pitch: pitch,
                    rows: chroma_rows,
                    end: mul_u64(next, pitch, "plane end")?,
                });
                y = next;
            }
            y
        }
        Arrangement::SideBySide => {
            let y = align_up_u64(luma_rows, start_align)?;
            let half = pitch / 2;
            let last_row = mul_u64(y + chroma_rows - 1, pitch, "plane end")?;
            for (column, &plane) in rule.chroma.iter().enumerate() {
                let x = half * column as u64;
                planes.push(PlaneLayout {
                    plane,
                    offset: mul_u64(y, pitch, "plane offset")? + x,
                    x_offset_bytes: x,
                    y_offset_rows: y,
                    row_pitch: half,
                    rows: chroma_rows,
                    end: last_row + x + half,
                });
            }
            y + chroma_rows
        }
        Arrangement::ByteStream => {
            let half = pitch / 2;
            let chroma_rows = luma_rows.div_ceil(u64::from(rule.height_div));
            let chroma_bytes = mul_u64(half, chroma_rows, "chroma plane")?;
            let mut offset = mul_u64(pitch, luma_rows, "luma plane")?;
            for &plane in rule.chroma {
                planes.push(PlaneLayout {
                    plane,
                    offset,
                    x_offset_bytes: offset % pitch,
                    y_offset_rows: offset / pitch,
                    row_pitch: half,
                    rows: chroma_rows,
                    end: offset + chroma_bytes,
                });
                offset = add_u64(offset, chroma_bytes, "byte stream")?;
            }
            offset.div_ceil(pitch)
        }
    };

    let total_size = size_for_rows(rules, pitch, total_rows, &geometry.tile)?;
    Ok(PlanarLayout {
        planes,
        total_rows,
        total_size,
        byte_stream: rule.arrangement == Arrangement::ByteStream,
        semi_planar: rule.arrangement == Arrangement::SemiPlanar,
    })
}
