//! Fixed mip tail slot offsets.
//!
//! Once mips are small enough they stop being placed geometrically and land in fixed slots of
//! a single standard tile. The slot positions are hardware constants, stored here in elements
//! with columns for 128, 64, 32, 16 and 8 bits per element. The tables describe the 64 KiB
//! tile; a 4 KiB tile is the same pattern entered four slots later.

use crate::descriptor::Dimension;
use crate::tile::{bpe_index, TileMode};
use crate::{LayoutError, Result};

/// Slots skipped when the tail lives in a 4 KiB standard tile.
pub const TILE_YF_SLOT_SHIFT: u32 = 4;

const SLOTS_2D: [[(u32, u32); 5]; 15] = [
    [(32, 0), (64, 0), (64, 0), (128, 0), (128, 0)],
    [(0, 32), (0, 32), (0, 64), (0, 64), (0, 128)],
    [(16, 0), (32, 0), (32, 0), (64, 0), (64, 0)],
    [(0, 16), (0, 16), (0, 32), (0, 32), (0, 64)],
    [(8, 0), (16, 0), (16, 0), (32, 0), (32, 0)],
    [(4, 8), (8, 8), (8, 16), (16, 16), (16, 32)],
    [(0, 12), (0, 12), (0, 24), (0, 24), (0, 48)],
    [(0, 8), (0, 8), (0, 16), (0, 16), (0, 32)],
    [(4, 4), (8, 4), (8, 8), (16, 8), (16, 16)],
    [(4, 0), (8, 0), (8, 0), (16, 0), (16, 0)],
    [(0, 4), (0, 4), (0, 8), (0, 8), (0, 16)],
    [(3, 0), (6, 0), (4, 4), (8, 4), (0, 12)],
    [(2, 0), (4, 0), (4, 0), (8, 0), (0, 8)],
    [(1, 0), (2, 0), (0, 4), (0, 4), (0, 4)],
    [(0, 0), (0, 0), (0, 0), (0, 0), (0, 0)],
];
const SLOTS_3D: [[(u32, u32, u32); 5]; 15] = [
    [(8, 0, 0), (16, 0, 0), (16, 0, 0), (16, 0, 0), (32, 0, 0)],
    [(0, 8, 0), (8, 0, 0), (0, 16, 0), (0, 16, 0), (16, 0, 0)],
    [(0, 0, 8), (0, 8, 0), (8, 0, 0), (0, 0, 16), (0, 16, 0)],
    [(4, 0, 0), (0, 0, 8), (0, 8, 0), (8, 0, 0), (0, 0, 16)],
    [(0, 4, 0), (4, 0, 0), (0, 0, 8), (0, 8, 0), (8, 0, 0)],
    [(0, 0, 4), (0, 4, 0), (4, 0, 0), (0, 0, 8), (0, 8, 0)],
    [(2, 0, 0), (0, 0, 4), (0, 4, 0), (4, 0, 0), (0, 0, 8)],
    [(0, 2, 0), (2, 0, 0), (0, 0, 4), (0, 4, 0), (4, 0, 0)],
    [(0, 0, 2), (0, 2, 0), (2, 0, 0), (0, 0, 4), (0, 4, 0)],
    [(1, 0, 0), (0, 0, 2), (0, 2, 0), (2, 0, 0), (0, 0, 4)],
    [(0, 1, 0), (1, 0, 0), (0, 0, 2), (0, 2, 0), (2, 0, 0)],
    [(0, 0, 1), (0, 1, 0), (1, 0, 0), (0, 0, 2), (0, 2, 0)],
    [(0, 0, 0), (0, 0, 1), (0, 1, 0), (1, 0, 0), (0, 0, 2)],
    [(0, 0, 0), (0, 0, 0), (0, 0, 1), (0, 1, 0), (1, 0, 0)],
    [(0, 0, 0), (0, 0, 0), (0, 0, 0), (0, 0, 1), (0, 1, 0)],
];
const SLOTS_1D: [[u32; 5]; 16] = [
    [2048, 4096, 8192, 16384, 32768],
    [1024, 2048, 4096, 8192, 16384],
    [512, 1024, 2048, 4096, 8192],
    [256, 512, 1024, 2048, 4096],
    [128, 256, 512, 1024, 2048],
    [64, 128, 256, 512, 1024],
    [32, 64, 128, 256, 512],
    [16, 32, 64, 128, 256],
    [8, 16, 32, 64, 128],
    [4, 8, 16, 32, 64],
    [2, 4, 8, 16, 32],
    [1, 2, 4, 8, 16],
    [0, 1, 2, 4, 8],
    [0, 0, 1, 2, 4],
    [0, 0, 0, 1, 2],
    [0, 0, 0, 0, 1],
];

/// Position of one tail-resident mip inside the tail tile, in elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipTailSlot {
    pub index: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Slot for the mip `levels_into_tail` levels past the first tail-resident mip.
pub fn tail_slot(
    dimension: Dimension,
    mode: TileMode,
    bits_per_element: u32,
    levels_into_tail: u32,
) -> Result<MipTailSlot> {
    let shift = match mode {
        TileMode::TileYs => 0,
        TileMode::TileYf => TILE_YF_SLOT_SHIFT,
        _ => return Err(LayoutError::unsupported(format!("{mode:?} has no mip tail"))),
    };
    let column = bpe_index(bits_per_element)
        .map(|i| 4 - i)
        .ok_or_else(|| {
            LayoutError::unsupported(format!("mip tail for {bits_per_element} bits per element"))
        })?;
    let index = levels_into_tail + shift;
    let row = index as usize;
    let out_of_table =
        || LayoutError::unsupported(format!("mip tail slot {index} for {dimension:?}"));

    let (x, y, z) = match dimension {
        Dimension::OneD => (SLOTS_1D.get(row).ok_or_else(out_of_table)?[column], 0, 0),
        Dimension::ThreeD => SLOTS_3D.get(row).ok_or_else(out_of_table)?[column],
        Dimension::TwoD | Dimension::Cube => {
            let (x, y) = SLOTS_2D.get(row).ok_or_else(out_of_table)?[column];
            (x, y, 0)
        }
        Dimension::Buffer => return Err(out_of_table()),
    };

    Ok(MipTailSlot { index, x, y, z })
}
