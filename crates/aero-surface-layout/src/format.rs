//! Surface formats as seen by the layout engine.
//!
//! The engine only cares about the size of one addressable element and the texel footprint of
//! that element: a plain texel for ordinary formats, a compression block for BC/ASTC, a pixel
//! pair for packed 4:2:2 YUV. Planar YUV formats describe their luma plane here; plane
//! arrangement lives in [`crate::planar`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::platform::Generation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Format {
    R8Unorm,
    R8G8Unorm,
    R16Unorm,
    R16Float,
    B5G6R5Unorm,
    R8G8B8Unorm,
    R8G8B8A8Unorm,
    B8G8R8A8Unorm,
    R10G10B10A2Unorm,
    R32Uint,
    R32Float,
    R16G16B16A16Float,
    R32G32Uint,
    R32G32Float,
    R32G32B32Float,
    R32G32B32A32Float,
    D16Unorm,
    D24UnormS8Uint,
    D32Float,
    S8Uint,
    Bc1RgbaUnorm,
    Bc2RgbaUnorm,
    Bc3RgbaUnorm,
    Bc4RUnorm,
    Bc5RgUnorm,
    Bc7RgbaUnorm,
    Astc8x8Unorm,
    Yuy2,
    Uyvy,
    Nv12,
    Nv21,
    P010,
    P016,
    P208,
    Imc1,
    Imc2,
    Imc3,
    Imc4,
    Yvu9,
    Rgbp,
    Bgrp,
    Yv12,
    I420,
    Iyuv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    Color,
    Depth,
    DepthStencil,
    Stencil,
    BlockCompressed,
    /// Two horizontally adjacent pixels share one element (4:2:2 packed).
    PackedYuv,
    Planar,
    /// Hierarchical-depth metadata; only produced internally for depth aux.
    HiZ,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub bits_per_element: u32,
    pub block_width: u32,
    pub block_height: u32,
    pub block_depth: u32,
    pub kind: FormatKind,
    pub min_generation: Generation,
}

impl FormatInfo {
    const fn texel(bits_per_element: u32, kind: FormatKind) -> Self {
        Self {
            bits_per_element,
            block_width: 1,
            block_height: 1,
            block_depth: 1,
            kind,
            min_generation: Generation::Gen8,
        }
    }

    const fn block(bits_per_element: u32, block_width: u32, block_height: u32) -> Self {
        Self {
            bits_per_element,
            block_width,
            block_height,
            block_depth: 1,
            kind: FormatKind::BlockCompressed,
            min_generation: Generation::Gen8,
        }
    }

    const fn since(mut self, generation: Generation) -> Self {
        self.min_generation = generation;
        self
    }

    /// HiZ stores 128 bits per 8x4 pixel block.
    pub(crate) const HIZ: FormatInfo = FormatInfo {
        bits_per_element: 128,
        block_width: 8,
        block_height: 4,
        block_depth: 1,
        kind: FormatKind::HiZ,
        min_generation: Generation::Gen8,
    };

    pub fn bytes_per_element(&self) -> u32 {
        self.bits_per_element / 8
    }

    pub fn is_block_compressed(&self) -> bool {
        self.kind == FormatKind::BlockCompressed
    }

    pub fn has_depth(&self) -> bool {
        matches!(self.kind, FormatKind::Depth | FormatKind::DepthStencil)
    }

    /// Width of a texel extent in elements.
    pub fn width_in_elements(&self, texels: u32) -> u32 {
        texels.div_ceil(self.block_width)
    }

    pub fn height_in_elements(&self, texels: u32) -> u32 {
        texels.div_ceil(self.block_height)
    }
}

impl Format {
    pub const fn info(self) -> FormatInfo {
        use FormatKind::*;
        use Generation::Gen9;
        match self {
            Format::R8Unorm => FormatInfo::texel(8, Color),
            Format::R8G8Unorm | Format::R16Unorm | Format::R16Float | Format::B5G6R5Unorm => {
                FormatInfo::texel(16, Color)
            }
            Format::R8G8B8Unorm => FormatInfo::texel(24, Color),
            Format::R8G8B8A8Unorm
            | Format::B8G8R8A8Unorm
            | Format::R10G10B10A2Unorm
            | Format::R32Uint
            | Format::R32Float => FormatInfo::texel(32, Color),
            Format::R16G16B16A16Float | Format::R32G32Uint | Format::R32G32Float => {
                FormatInfo::texel(64, Color)
            }
            Format::R32G32B32Float => FormatInfo::texel(96, Color),
            Format::R32G32B32A32Float => FormatInfo::texel(128, Color),
            Format::D16Unorm => FormatInfo::texel(16, Depth),
            Format::D24UnormS8Uint => FormatInfo::texel(32, DepthStencil),
            Format::D32Float => FormatInfo::texel(32, Depth),
            Format::S8Uint => FormatInfo::texel(8, Stencil),
            Format::Bc1RgbaUnorm | Format::Bc4RUnorm => FormatInfo::block(64, 4, 4),
            Format::Bc2RgbaUnorm
            | Format::Bc3RgbaUnorm
            | Format::Bc5RgUnorm
            | Format::Bc7RgbaUnorm => FormatInfo::block(128, 4, 4),
            Format::Astc8x8Unorm => FormatInfo::block(128, 8, 8).since(Gen9),
            Format::Yuy2 | Format::Uyvy => FormatInfo {
                bits_per_element: 32,
                block_width: 2,
                block_height: 1,
                block_depth: 1,
                kind: PackedYuv,
                min_generation: Generation::Gen8,
            },
            Format::P010 | Format::P016 => FormatInfo::texel(16, Planar),
            Format::Nv12
            | Format::Nv21
            | Format::P208
            | Format::Imc1
            | Format::Imc2
            | Format::Imc3
            | Format::Imc4
            | Format::Yvu9
            | Format::Rgbp
            | Format::Bgrp
            | Format::Yv12
            | Format::I420
            | Format::Iyuv => FormatInfo::texel(8, Planar),
        }
    }

    pub fn is_planar(self) -> bool {
        self.info().kind == FormatKind::Planar
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_formats_report_elements() {
        let bc1 = Format::Bc1RgbaUnorm.info();
        assert_eq!(bc1.bytes_per_element(), 8);
        assert_eq!(bc1.width_in_elements(13), 4);
        assert_eq!(bc1.height_in_elements(1), 1);
        assert!(bc1.is_block_compressed());

        let astc = Format::Astc8x8Unorm.info();
        assert_eq!(astc.width_in_elements(17), 3);
        assert_eq!(astc.min_generation, Generation::Gen9);
    }

    #[test]
    fn packed_yuv_covers_two_pixels_per_element() {
        let yuy2 = Format::Yuy2.info();
        assert_eq!(yuy2.width_in_elements(640), 320);
        assert_eq!(yuy2.bytes_per_element(), 4);
        assert!(!Format::Yuy2.is_planar());
        assert!(Format::Nv12.is_planar());
        assert_eq!(Format::P010.info().bits_per_element, 16);
    }
}
