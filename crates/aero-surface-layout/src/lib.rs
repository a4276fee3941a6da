//! Physical memory layout of tiled GPU surfaces.
//!
//! Given a [`ResourceDescriptor`] and a generation's [`GenerationRules`], the engine resolves
//! the tile shape and mip alignment, packs the mip chain (including standard-tile mip tails),
//! and finalizes pitch, QPitch and size. Planar YUV planes, multisampled surfaces and
//! compression metadata (CCS, HiZ, MCS, clear color) are placed on top of that geometry.
//!
//! - [`LayoutEngine::create_layout`]: compute a [`ResourceLayout`] once per resource
//! - [`ResourceLayout::query_offset`]: tile base and intra-tile remainder of a sub-resource
//! - [`ResourceLayout::aux_layout`]: compression metadata placement, if any
//!
//! Everything here is pure computation over immutable tables; layouts are `Send + Sync` and
//! queries may run concurrently.

mod align;
mod aux_surface;
mod descriptor;
mod engine;
mod error;
mod format;
mod mip;
mod miptail;
mod msaa;
mod offset;
mod pitch;
mod planar;
mod platform;
mod tile;
mod util;

pub use align::Alignment;
pub use aux_surface::{
    AuxComponent, AuxLayout, AuxPlacement, AuxRegion, CcsSegment, CLEAR_COLOR_SIZE,
    COMPRESSION_STATE_SIZE,
};
pub use descriptor::{Dimension, ResourceDescriptor, UsageFlags, CUBE_FACES};
pub use engine::{LayoutEngine, PackedMipInfo, ResourceLayout};
pub use error::{LayoutError, Result};
pub use format::{Format, FormatInfo, FormatKind};
pub use mip::{MipDescriptor, MipOffset};
pub use miptail::{tail_slot, MipTailSlot, TILE_YF_SLOT_SHIFT};
pub use msaa::{mcs_format, MsaaFamily, MsaaLayout};
pub use offset::{Selector, SubresourceOffset};
pub use pitch::SurfaceGeometry;
pub use planar::{Plane, PlanarLayout, PlaneLayout};
pub use platform::{
    AlignUnit, AuxPolicy, Generation, GenerationRules, InterleaveFactor, MipTailPolicy,
    PlatformConfig, TexAlign, TexAlignTable, Workarounds, GEN12_RULES, GEN8_RULES, GEN9_RULES,
    INTERLEAVE_FACTORS, PAGE_SIZE, SIZE_64KB,
};
pub use tile::{resolve_tile_shape, TileMode, TileShape};
