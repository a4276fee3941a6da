//! HAlign/VAlign/DAlign resolution.

use crate::descriptor::{Dimension, UsageFlags};
use crate::engine::SurfaceParams;
use crate::format::FormatKind;
use crate::platform::{AlignUnit, GenerationRules, TexAlign};
use crate::tile::resolve_tile_shape;
use crate::{LayoutError, Result};

/// Mip alignment of a surface.
///
/// `h_align`/`v_align` are reported the way surface state expects them: in compressed blocks
/// for block formats on generations with [`AlignUnit::CompressedBlocks`], in texels otherwise.
/// Layout itself always works in elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub h_align: u32,
    pub v_align: u32,
    pub d_align: u32,
    pub unit: AlignUnit,
    h_elements: u32,
    v_elements: u32,
}

impl Alignment {
    pub fn h_elements(&self) -> u32 {
        self.h_elements
    }

    pub fn v_elements(&self) -> u32 {
        self.v_elements
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlignClass {
    HiZ,
    SeparateStencil,
    StandardTile,
    Depth,
    BlockCompressed,
    PackedYuv,
    OneD,
    CompressedColor,
    AllOther,
}

fn classify(params: &SurfaceParams) -> AlignClass {
    let kind = params.format.kind;
    if params.usage.contains(UsageFlags::HIZ) || kind == FormatKind::HiZ {
        AlignClass::HiZ
    } else if kind == FormatKind::Stencil {
        AlignClass::SeparateStencil
    } else if params.tile_mode.is_standard_tile() {
        AlignClass::StandardTile
    } else if params.usage.contains(UsageFlags::DEPTH) || params.format.has_depth() {
        AlignClass::Depth
    } else if kind == FormatKind::BlockCompressed {
        AlignClass::BlockCompressed
    } else if kind == FormatKind::PackedYuv {
        AlignClass::PackedYuv
    } else if params.dimension == Dimension::OneD {
        AlignClass::OneD
    } else if params.usage.contains(UsageFlags::COMPRESSION_METADATA) {
        AlignClass::CompressedColor
    } else {
        AlignClass::AllOther
    }
}

pub(crate) fn resolve_alignment(
    rules: &GenerationRules,
    params: &SurfaceParams,
) -> Result<Alignment> {
    let format = params.format;
    let block_compressed = format.is_block_compressed();
    let unit = if block_compressed {
        rules.align_unit
    } else {
        AlignUnit::Texels
    };

    if params.dimension == Dimension::Buffer {
        return Ok(Alignment {
            h_align: 1,
            v_align: 1,
            d_align: 1,
            unit,
            h_elements: 1,
            v_elements: 1,
        });
    }

    let table = &rules.tex_align;
    let class = classify(params);
    let texels = match class {
        AlignClass::StandardTile => {
            let tile = resolve_tile_shape(
                rules,
                params.tile_mode,
                format.bits_per_element,
                params.dimension,
                params.tile_samples,
            )?;
            let d_align = if params.dimension == Dimension::ThreeD {
                tile.depth
            } else {
                1
            };
            return Ok(Alignment {
                h_align: report(unit, tile.width, format.block_width),
                v_align: report(unit, tile.height, format.block_height),
                d_align,
                unit,
                h_elements: tile.width,
                v_elements: tile.height,
            });
        }
        AlignClass::HiZ => table.hiz,
        AlignClass::SeparateStencil => table.separate_stencil,
        AlignClass::Depth if format.bits_per_element == 16 => {
            if matches!(params.samples, 2 | 8) {
                table.depth_16bit_2x_8x
            } else {
                table.depth_16bit
            }
        }
        AlignClass::Depth => table.depth,
        AlignClass::BlockCompressed => table.block_compressed,
        AlignClass::PackedYuv => table.packed_yuv,
        AlignClass::OneD => TexAlign {
            width: table.one_d_width,
            height: 1,
        },
        AlignClass::CompressedColor => table.compressed_color,
        AlignClass::AllOther => table.all_other,
    };

    let h_elements = texels_to_elements(texels.width, format.block_width, "horizontal")?;
    let v_elements = texels_to_elements(texels.height, format.block_height, "vertical")?;

    Ok(Alignment {
        h_align: report(unit, h_elements, format.block_width),
        v_align: report(unit, v_elements, format.block_height),
        d_align: 1,
        unit,
        h_elements,
        v_elements,
    })
}

fn texels_to_elements(texels: u32, block: u32, axis: &str) -> Result<u32> {
    if texels % block != 0 {
        return Err(LayoutError::unsupported(format!(
            "{axis} alignment of {texels} texels is not a multiple of the {block}-texel block"
        )));
    }
    Ok(texels / block)
}

fn report(unit: AlignUnit, elements: u32, block: u32) -> u32 {
    match unit {
        AlignUnit::CompressedBlocks => elements,
        AlignUnit::Texels => elements * block,
    }
}
