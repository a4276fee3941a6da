use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::format::{Format, FormatKind};
use crate::platform::GenerationRules;
use crate::tile::TileMode;
use crate::{LayoutError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dimension {
    OneD,
    TwoD,
    ThreeD,
    Cube,
    Buffer,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct UsageFlags: u32 {
        const RENDER_TARGET = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
        const HIZ = 1 << 3;
        const MEDIA = 1 << 4;
        /// Lossless compression metadata (CCS, MCS or HiZ) accompanies the surface.
        const COMPRESSION_METADATA = 1 << 5;
        /// Aux data is appended to the main allocation instead of living on its own.
        const UNIFIED_AUX = 1 << 6;
        const CLEAR_COLOR = 1 << 7;
        /// Probe-only: compute the layout but never back it with memory.
        const NO_BACKING_MEMORY = 1 << 8;
    }
}

pub const CUBE_FACES: u32 = 6;

/// Logical description of a resource. Immutable once layout begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResourceDescriptor {
    pub dimension: Dimension,
    pub format: Format,
    pub width: u32,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub height: u32,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub depth: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_lod: u32,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub array_size: u32,
    #[cfg_attr(feature = "serde", serde(default = "one"))]
    pub samples: u32,
    #[cfg_attr(feature = "serde", serde(default = "linear"))]
    pub tile_mode: TileMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub usage: UsageFlags,
}

#[cfg(feature = "serde")]
fn one() -> u32 {
    1
}

#[cfg(feature = "serde")]
fn linear() -> TileMode {
    TileMode::Linear
}

impl ResourceDescriptor {
    fn new(dimension: Dimension, format: Format, width: u32, height: u32, depth: u32) -> Self {
        Self {
            dimension,
            format,
            width,
            height,
            depth,
            max_lod: 0,
            array_size: 1,
            samples: 1,
            tile_mode: TileMode::Linear,
            usage: UsageFlags::empty(),
        }
    }

    pub fn texture_1d(format: Format, width: u32) -> Self {
        Self::new(Dimension::OneD, format, width, 1, 1)
    }

    pub fn texture_2d(format: Format, width: u32, height: u32) -> Self {
        Self::new(Dimension::TwoD, format, width, height, 1)
    }

    pub fn texture_3d(format: Format, width: u32, height: u32, depth: u32) -> Self {
        Self::new(Dimension::ThreeD, format, width, height, depth)
    }

    pub fn cube(format: Format, size: u32) -> Self {
        Self::new(Dimension::Cube, format, size, size, 1)
    }

    pub fn buffer(format: Format, width: u32) -> Self {
        Self::new(Dimension::Buffer, format, width, 1, 1)
    }

    pub fn with_max_lod(mut self, max_lod: u32) -> Self {
        self.max_lod = max_lod;
        self
    }

    pub fn with_array_size(mut self, array_size: u32) -> Self {
        self.array_size = array_size;
        self
    }

    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_tile_mode(mut self, tile_mode: TileMode) -> Self {
        self.tile_mode = tile_mode;
        self
    }

    pub fn with_usage(mut self, usage: UsageFlags) -> Self {
        self.usage |= usage;
        self
    }

    /// Number of 2D slices stacked at QPitch: array layers, times six for cubes.
    pub fn layer_count(&self) -> u32 {
        if self.dimension == Dimension::Cube {
            self.array_size.saturating_mul(CUBE_FACES)
        } else {
            self.array_size
        }
    }

    pub fn is_depth_or_stencil(&self) -> bool {
        self.usage
            .intersects(UsageFlags::DEPTH | UsageFlags::STENCIL | UsageFlags::HIZ)
            || self.format.info().has_depth()
            || self.format.info().kind == FormatKind::Stencil
    }

    /// Check the invariants every layout relies on.
    pub fn validate(&self, rules: &GenerationRules) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.depth == 0 || self.array_size == 0 {
            return Err(LayoutError::invalid(format!(
                "zero dimension: {}x{}x{} array {}",
                self.width, self.height, self.depth, self.array_size
            )));
        }
        if self.max_lod > rules.max_lod {
            return Err(LayoutError::invalid(format!(
                "max_lod {} exceeds the {:?} cap of {}",
                self.max_lod, rules.generation, rules.max_lod
            )));
        }
        if self.array_size > rules.max_array_size {
            return Err(LayoutError::invalid(format!(
                "array size {} exceeds {}",
                self.array_size, rules.max_array_size
            )));
        }

        let info = self.format.info();
        if info.min_generation > rules.generation {
            return Err(LayoutError::unsupported(format!(
                "{:?} requires {:?} or later",
                self.format, info.min_generation
            )));
        }

        match self.dimension {
            Dimension::OneD => {
                if self.height != 1 || self.depth != 1 {
                    return Err(LayoutError::invalid("1D surfaces have height and depth 1"));
                }
                self.check_extent(self.width, rules.max_2d_dimension)?;
            }
            Dimension::TwoD | Dimension::Cube => {
                if self.depth != 1 {
                    return Err(LayoutError::invalid("2D surfaces have depth 1"));
                }
                if self.dimension == Dimension::Cube && self.width != self.height {
                    return Err(LayoutError::invalid(format!(
                        "cube faces must be square, got {}x{}",
                        self.width, self.height
                    )));
                }
                self.check_extent(self.width, rules.max_2d_dimension)?;
                self.check_extent(self.height, rules.max_2d_dimension)?;
            }
            Dimension::ThreeD => {
                if self.array_size != 1 {
                    return Err(LayoutError::invalid("3D surfaces cannot be arrayed"));
                }
                for extent in [self.width, self.height, self.depth] {
                    self.check_extent(extent, rules.max_3d_dimension)?;
                }
            }
            Dimension::Buffer => {
                if self.height != 1
                    || self.depth != 1
                    || self.max_lod != 0
                    || self.array_size != 1
                    || self.samples != 1
                {
                    return Err(LayoutError::invalid(
                        "buffers are one-dimensional, single mip, single sample",
                    ));
                }
                if self.tile_mode != TileMode::Linear {
                    return Err(LayoutError::unsupported("buffers are always linear"));
                }
            }
        }

        if !matches!(self.samples, 1 | 2 | 4 | 8 | 16) {
            return Err(LayoutError::invalid(format!(
                "sample count {} is not a power of two up to 16",
                self.samples
            )));
        }
        if self.samples > 1 {
            if self.samples > rules.max_samples {
                return Err(LayoutError::unsupported(format!(
                    "{}x MSAA on {:?}",
                    self.samples, rules.generation
                )));
            }
            if self.dimension != Dimension::TwoD || self.max_lod != 0 {
                return Err(LayoutError::invalid(
                    "multisampled surfaces must be 2D with a single mip",
                ));
            }
        }

        if self.dimension == Dimension::OneD && info.block_height > 1 {
            return Err(LayoutError::unsupported(format!(
                "{:?} blocks span rows and cannot form a 1D surface",
                self.format
            )));
        }

        if self.tile_mode == TileMode::TileW && info.kind != FormatKind::Stencil {
            return Err(LayoutError::unsupported(format!(
                "TileW holds separate stencil only, not {:?}",
                self.format
            )));
        }
        // Stencil and HiZ keep their own alignment, which never lines up with a Yf/Ys miptail.
        if self.tile_mode.is_standard_tile()
            && (info.kind == FormatKind::Stencil || self.usage.contains(UsageFlags::HIZ))
        {
            return Err(LayoutError::unsupported(format!(
                "{:?} cannot hold separate stencil or HiZ data",
                self.tile_mode
            )));
        }

        if self
            .usage
            .intersects(UsageFlags::UNIFIED_AUX | UsageFlags::CLEAR_COLOR)
            && !self.usage.contains(UsageFlags::COMPRESSION_METADATA)
        {
            return Err(LayoutError::invalid(
                "aux placement flags require compression metadata",
            ));
        }

        if info.kind == FormatKind::Planar
            && (self.dimension != Dimension::TwoD
                || self.max_lod != 0
                || self.array_size != 1
                || self.samples != 1)
        {
            return Err(LayoutError::invalid(format!(
                "planar {:?} surfaces must be single 2D images",
                self.format
            )));
        }

        Ok(())
    }

    fn check_extent(&self, extent: u32, max: u32) -> Result<()> {
        if extent > max {
            return Err(LayoutError::invalid(format!(
                "extent {extent} exceeds maximum {max} for {:?}",
                self.dimension
            )));
        }
        Ok(())
    }
}
