//! Tile geometry lookup.
//!
//! Shapes are constant tables keyed by tile mode, element size, dimensionality and (for the
//! 4 KiB/64 KiB standard tiles) the interleaved sample count. Nothing here is derived from the
//! surface being laid out.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptor::Dimension;
use crate::platform::GenerationRules;
use crate::{LayoutError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TileMode {
    Linear,
    /// 512 B x 8 rows.
    TileX,
    /// 128 B x 32 rows.
    TileY,
    /// 64 B x 64 rows, separate stencil only.
    TileW,
    /// 4 KiB standard tile.
    TileYf,
    /// 64 KiB standard tile.
    TileYs,
}

impl TileMode {
    pub fn is_tiled(self) -> bool {
        self != TileMode::Linear
    }

    /// Standard tiles have per-format shapes and support mip tails.
    pub fn is_standard_tile(self) -> bool {
        matches!(self, TileMode::TileYf | TileMode::TileYs)
    }
}

/// One tile, measured in elements of the format it was resolved for.
///
/// `width * height * depth * bytes_per_element * samples == size_bytes`, where `samples` is
/// the sample count packed inside the tile (1 except for interleaved MSAA standard tiles).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileShape {
    pub mode: TileMode,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub bytes_per_element: u32,
    pub samples: u32,
    pub size_bytes: u32,
}

impl TileShape {
    /// Bytes in one row of the tile. Interleaved samples widen every pixel.
    pub fn width_bytes(&self) -> u32 {
        self.width * self.bytes_per_element * self.samples
    }

    /// Bytes covered by one row of tiles spanning `pitch` bytes.
    pub fn row_bytes(&self, pitch: u64) -> u64 {
        pitch / u64::from(self.width_bytes()) * u64::from(self.size_bytes)
    }

    /// Mip tail threshold in elements (half the tile along each tiled axis).
    pub fn mip_tail_threshold(&self, dimension: Dimension) -> (u32, u32, u32) {
        match dimension {
            Dimension::OneD => (self.width / 2, 1, 1),
            Dimension::ThreeD => (self.width / 2, self.height / 2, self.depth / 2),
            _ => (self.width / 2, self.height / 2, 1),
        }
    }
}

// Columns: 8, 16, 32, 64, 128 bits per element.
const YF_2D: [(u32, u32); 5] = [(64, 64), (64, 32), (32, 32), (32, 16), (16, 16)];
const YS_2D: [(u32, u32); 5] = [(256, 256), (256, 128), (128, 128), (128, 64), (64, 64)];
const YF_3D: [(u32, u32, u32); 5] = [
    (16, 16, 16),
    (8, 16, 16),
    (8, 8, 16),
    (8, 8, 8),
    (4, 8, 8),
];
const YS_3D: [(u32, u32, u32); 5] = [
    (64, 32, 32),
    (32, 32, 32),
    (32, 32, 16),
    (32, 16, 16),
    (16, 16, 16),
];

/// Width and height divisors of an interleaved MSAA standard tile, by sample count.
const MSAA_TILE_DIVISORS: [(u32, u32, u32); 4] = [(2, 2, 1), (4, 2, 2), (8, 4, 2), (16, 4, 4)];

pub(crate) fn bpe_index(bits_per_element: u32) -> Option<usize> {
    match bits_per_element {
        8 => Some(0),
        16 => Some(1),
        32 => Some(2),
        64 => Some(3),
        128 => Some(4),
        _ => None,
    }
}

/// Resolve the tile shape for a surface.
///
/// `samples` is the sample count stored inside each tile; only interleaved MSAA surfaces on
/// standard tiles pass a value other than 1.
pub fn resolve_tile_shape(
    rules: &GenerationRules,
    mode: TileMode,
    bits_per_element: u32,
    dimension: Dimension,
    samples: u32,
) -> Result<TileShape> {
    if !rules.supports_tile_mode(mode) {
        return Err(LayoutError::unsupported(format!(
            "{mode:?} is not available on {:?}",
            rules.generation
        )));
    }

    let bytes = bits_per_element / 8;
    if bytes == 0 || bits_per_element % 8 != 0 {
        return Err(LayoutError::unsupported(format!(
            "{bits_per_element} bits per element is not byte sized"
        )));
    }

    if mode == TileMode::Linear {
        return Ok(TileShape {
            mode,
            width: 1,
            height: 1,
            depth: 1,
            bytes_per_element: bytes,
            samples: 1,
            size_bytes: bytes,
        });
    }

    let index = bpe_index(bits_per_element).ok_or_else(|| {
        LayoutError::unsupported(format!("{mode:?} with {bits_per_element} bits per element"))
    })?;

    if dimension == Dimension::Buffer {
        return Err(LayoutError::unsupported("buffers are always linear"));
    }
    if samples > 1 && !(mode.is_standard_tile() && dimension == Dimension::TwoD) {
        return Err(LayoutError::unsupported(format!(
            "{mode:?} has no {samples}x in-tile sample layout for {dimension:?}"
        )));
    }

    let legacy = |width_bytes: u32, height: u32| TileShape {
        mode,
        width: width_bytes / bytes,
        height,
        depth: 1,
        bytes_per_element: bytes,
        samples: 1,
        size_bytes: 4096,
    };

    match mode {
        TileMode::Linear => Err(LayoutError::unsupported("linear surfaces have no tile")),
        TileMode::TileX | TileMode::TileY => {
            if dimension == Dimension::OneD {
                return Err(LayoutError::unsupported(format!(
                    "1D surfaces cannot use {mode:?}"
                )));
            }
            Ok(if mode == TileMode::TileX {
                legacy(512, 8)
            } else {
                legacy(128, 32)
            })
        }
        TileMode::TileW => {
            if bits_per_element != 8 || !matches!(dimension, Dimension::TwoD | Dimension::Cube) {
                return Err(LayoutError::unsupported(
                    "TileW only holds 8-bit 2D stencil surfaces",
                ));
            }
            Ok(legacy(64, 64))
        }
        TileMode::TileYf | TileMode::TileYs => {
            let size_bytes = if mode == TileMode::TileYf { 4096 } else { 65536 };
            let (width, height, depth) = match dimension {
                Dimension::OneD => (size_bytes / bytes, 1, 1),
                Dimension::ThreeD => {
                    if mode == TileMode::TileYf {
                        YF_3D[index]
                    } else {
                        YS_3D[index]
                    }
                }
                _ => {
                    let (w, h) = if mode == TileMode::TileYf {
                        YF_2D[index]
                    } else {
                        YS_2D[index]
                    };
                    (w, h, 1)
                }
            };
            let (width, height) = if samples > 1 {
                let (_, wd, hd) = MSAA_TILE_DIVISORS
                    .iter()
                    .copied()
                    .find(|(s, _, _)| *s == samples)
                    .ok_or_else(|| {
                        LayoutError::unsupported(format!("{samples}x standard tile"))
                    })?;
                (width / wd, height / hd)
            } else {
                (width, height)
            };
            Ok(TileShape {
                mode,
                width,
                height,
                depth,
                bytes_per_element: bytes,
                samples,
                size_bytes,
            })
        }
    }
}
