//! Per-generation layout rules.
//!
//! A generation's rule set is a plain `Copy` value: alignment tables, pitch constants, the tile
//! modes it knows about and a few policy enums. The engine is parameterized by one
//! [`GenerationRules`] and passes it through every stage explicitly.

use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tile::TileMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Generation {
    Gen8,
    Gen9,
    Gen12,
}

bitflags! {
    /// Hardware workarounds that alter layout decisions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Workarounds: u32 {
        const DISABLE_MIPTAIL = 1 << 0;
        const AUX_64KB_ALIGN = 1 << 1;
    }
}

/// Units in which alignment of block-compressed formats is reported to surface state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlignUnit {
    Texels,
    CompressedBlocks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexAlign {
    pub width: u32,
    pub height: u32,
}

const fn align(width: u32, height: u32) -> TexAlign {
    TexAlign { width, height }
}

/// Raw texel alignment per surface class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexAlignTable {
    pub all_other: TexAlign,
    pub compressed_color: TexAlign,
    pub block_compressed: TexAlign,
    pub depth: TexAlign,
    pub depth_16bit: TexAlign,
    /// 16-bit depth at 2x and 8x.
    pub depth_16bit_2x_8x: TexAlign,
    pub separate_stencil: TexAlign,
    pub hiz: TexAlign,
    pub packed_yuv: TexAlign,
    pub one_d_width: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipTailPolicy {
    Unsupported,
    /// Small trailing mips of the listed 4 KiB/64 KiB tile modes pack into one tile.
    StandardTiles(&'static [TileMode]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxPolicy {
    /// Separate CCS surface scaled from the main pitch, one aux row per `row_divisor` main rows.
    LegacyCcs { row_divisor: u32 },
    /// One aux byte per `main_bytes_per_aux_byte` main bytes, tracked per main tile.
    Unified { main_bytes_per_aux_byte: u32 },
}

/// Interleaved-MSAA dimension expansion: `ceil(dim / div) * mul`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterleaveFactor {
    pub samples: u32,
    pub width_div: u32,
    pub width_mul: u32,
    pub height_div: u32,
    pub height_mul: u32,
}

pub const INTERLEAVE_FACTORS: [InterleaveFactor; 4] = [
    InterleaveFactor { samples: 2, width_div: 2, width_mul: 4, height_div: 1, height_mul: 1 },
    InterleaveFactor { samples: 4, width_div: 2, width_mul: 4, height_div: 2, height_mul: 4 },
    InterleaveFactor { samples: 8, width_div: 2, width_mul: 8, height_div: 2, height_mul: 4 },
    InterleaveFactor { samples: 16, width_div: 2, width_mul: 8, height_div: 2, height_mul: 8 },
];

pub const PAGE_SIZE: u64 = 4096;
pub const SIZE_64KB: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRules {
    pub generation: Generation,
    pub max_lod: u32,
    pub max_2d_dimension: u32,
    pub max_3d_dimension: u32,
    pub max_array_size: u32,
    pub max_surface_size: u64,
    pub page_size: u64,
    pub min_pitch: u32,
    pub linear_pitch_align: u32,
    pub media_pitch_align: u32,
    pub tex_align: TexAlignTable,
    pub align_unit: AlignUnit,
    pub tile_modes: &'static [TileMode],
    pub mip_tail: MipTailPolicy,
    pub max_samples: u32,
    pub interleave: &'static [InterleaveFactor],
    pub planar_row_align: u32,
    pub imc_plane_row_align: u32,
    pub aux: AuxPolicy,
    pub unified_aux_main_align: u64,
    pub workarounds: Workarounds,
}

pub const GEN8_RULES: GenerationRules = GenerationRules {
    generation: Generation::Gen8,
    max_lod: 14,
    max_2d_dimension: 16384,
    max_3d_dimension: 2048,
    max_array_size: 2048,
    max_surface_size: 2 << 30,
    page_size: PAGE_SIZE,
    min_pitch: 32,
    linear_pitch_align: 64,
    media_pitch_align: 128,
    tex_align: TexAlignTable {
        all_other: align(4, 4),
        compressed_color: align(16, 4),
        block_compressed: align(4, 4),
        depth: align(4, 4),
        depth_16bit: align(8, 4),
        depth_16bit_2x_8x: align(8, 4),
        separate_stencil: align(8, 8),
        hiz: align(16, 8),
        packed_yuv: align(4, 4),
        one_d_width: 4,
    },
    align_unit: AlignUnit::Texels,
    tile_modes: &[TileMode::Linear, TileMode::TileX, TileMode::TileY, TileMode::TileW],
    mip_tail: MipTailPolicy::Unsupported,
    max_samples: 8,
    interleave: &INTERLEAVE_FACTORS,
    planar_row_align: 2,
    imc_plane_row_align: 16,
    aux: AuxPolicy::LegacyCcs { row_divisor: 16 },
    unified_aux_main_align: PAGE_SIZE,
    workarounds: Workarounds::empty(),
};

pub const GEN9_RULES: GenerationRules = GenerationRules {
    generation: Generation::Gen9,
    max_surface_size: 256 << 30,
    tex_align: TexAlignTable {
        all_other: align(16, 4),
        compressed_color: align(16, 4),
        block_compressed: align(16, 16),
        depth: align(8, 4),
        depth_16bit: align(8, 4),
        depth_16bit_2x_8x: align(8, 8),
        separate_stencil: align(8, 8),
        hiz: align(16, 8),
        packed_yuv: align(4, 4),
        one_d_width: 64,
    },
    align_unit: AlignUnit::CompressedBlocks,
    tile_modes: &[
        TileMode::Linear,
        TileMode::TileX,
        TileMode::TileY,
        TileMode::TileW,
        TileMode::TileYf,
        TileMode::TileYs,
    ],
    mip_tail: MipTailPolicy::StandardTiles(&[TileMode::TileYf, TileMode::TileYs]),
    max_samples: 16,
    planar_row_align: 4,
    ..GEN8_RULES
};

pub const GEN12_RULES: GenerationRules = GenerationRules {
    generation: Generation::Gen12,
    tex_align: TexAlignTable {
        all_other: align(16, 4),
        compressed_color: align(16, 4),
        block_compressed: align(16, 16),
        depth: align(8, 4),
        depth_16bit: align(8, 8),
        depth_16bit_2x_8x: align(8, 8),
        separate_stencil: align(16, 8),
        hiz: align(16, 16),
        packed_yuv: align(4, 4),
        one_d_width: 64,
    },
    tile_modes: &[TileMode::Linear, TileMode::TileX, TileMode::TileY, TileMode::TileYs],
    mip_tail: MipTailPolicy::StandardTiles(&[TileMode::TileYs]),
    planar_row_align: 16,
    aux: AuxPolicy::Unified {
        main_bytes_per_aux_byte: 256,
    },
    unified_aux_main_align: SIZE_64KB,
    ..GEN9_RULES
};

impl GenerationRules {
    pub const fn for_generation(generation: Generation) -> Self {
        match generation {
            Generation::Gen8 => GEN8_RULES,
            Generation::Gen9 => GEN9_RULES,
            Generation::Gen12 => GEN12_RULES,
        }
    }

    pub fn with_workarounds(mut self, workarounds: Workarounds) -> Self {
        self.workarounds |= workarounds;
        self
    }

    pub fn supports_tile_mode(&self, mode: TileMode) -> bool {
        self.tile_modes.contains(&mode)
    }

    pub fn supports_mip_tail(&self, mode: TileMode) -> bool {
        if self.workarounds.contains(Workarounds::DISABLE_MIPTAIL) {
            return false;
        }
        match self.mip_tail {
            MipTailPolicy::Unsupported => false,
            MipTailPolicy::StandardTiles(modes) => modes.contains(&mode),
        }
    }

    pub fn interleave_factor(&self, samples: u32) -> Option<InterleaveFactor> {
        self.interleave.iter().copied().find(|f| f.samples == samples)
    }

    /// Alignment applied to the main surface size before a unified aux region.
    pub fn unified_aux_alignment(&self) -> u64 {
        if self.workarounds.contains(Workarounds::AUX_64KB_ALIGN) {
            self.unified_aux_main_align.max(SIZE_64KB)
        } else {
            self.unified_aux_main_align
        }
    }
}

/// Serializable platform selection, resolved once into [`GenerationRules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlatformConfig {
    pub generation: Generation,
    #[cfg_attr(feature = "serde", serde(default))]
    pub workarounds: Workarounds,
}

impl PlatformConfig {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            workarounds: Workarounds::empty(),
        }
    }

    pub fn rules(&self) -> GenerationRules {
        GenerationRules::for_generation(self.generation).with_workarounds(self.workarounds)
    }
}

impl From<Generation> for GenerationRules {
    fn from(generation: Generation) -> Self {
        Self::for_generation(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_mode_support_differs_per_generation() {
        let gen8 = GenerationRules::for_generation(Generation::Gen8);
        let gen9 = GenerationRules::for_generation(Generation::Gen9);
        let gen12 = GenerationRules::for_generation(Generation::Gen12);

        assert!(!gen8.supports_tile_mode(TileMode::TileYs));
        assert!(gen9.supports_tile_mode(TileMode::TileYf));
        assert!(!gen12.supports_tile_mode(TileMode::TileYf));
        assert!(!gen12.supports_tile_mode(TileMode::TileW));
        assert!(gen12.supports_tile_mode(TileMode::TileYs));
    }

    #[test]
    fn disable_miptail_workaround_wins() {
        let rules = GenerationRules::for_generation(Generation::Gen9);
        assert!(rules.supports_mip_tail(TileMode::TileYs));
        assert!(!rules.supports_mip_tail(TileMode::TileY));

        let rules = rules.with_workarounds(Workarounds::DISABLE_MIPTAIL);
        assert!(!rules.supports_mip_tail(TileMode::TileYs));
    }

    #[test]
    fn aux_alignment_honours_workaround() {
        let gen9 = GenerationRules::for_generation(Generation::Gen9);
        assert_eq!(gen9.unified_aux_alignment(), PAGE_SIZE);
        assert_eq!(
            gen9.with_workarounds(Workarounds::AUX_64KB_ALIGN)
                .unified_aux_alignment(),
            SIZE_64KB
        );
        assert_eq!(
            GenerationRules::for_generation(Generation::Gen12).unified_aux_alignment(),
            SIZE_64KB
        );
    }

    #[test]
    fn interleave_factors_cover_all_sample_counts() {
        let rules = GenerationRules::for_generation(Generation::Gen9);
        for samples in [2, 4, 8, 16] {
            assert!(rules.interleave_factor(samples).is_some());
        }
        assert!(rules.interleave_factor(3).is_none());
    }
}
