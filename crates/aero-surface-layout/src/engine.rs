//! Resource creation and the cached per-resource layout.

use tracing::debug;

use crate::align::{resolve_alignment, Alignment};
use crate::aux_surface::{self, AuxLayout};
use crate::descriptor::{Dimension, ResourceDescriptor, UsageFlags};
use crate::format::FormatInfo;
use crate::mip::{plan_mips, MipDescriptor};
use crate::msaa::{self, MsaaLayout};
use crate::offset::{self, Selector, SubresourceOffset};
use crate::pitch::{finalize, size_for_rows, SurfaceGeometry};
use crate::planar::{self, PlanarLayout};
use crate::platform::{Generation, GenerationRules, PlatformConfig};
use crate::tile::{resolve_tile_shape, TileMode};
use crate::{LayoutError, Result};

/// Everything the layout stages read about one surface.
///
/// The main surface of a resource maps 1:1 from its descriptor except for multisampling;
/// HiZ and MCS companions are built directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SurfaceParams {
    pub dimension: Dimension,
    pub format: FormatInfo,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub max_lod: u32,
    /// 2D slices stacked at QPitch (array layers, cube faces, arrayed samples).
    pub layers: u32,
    pub tile_mode: TileMode,
    pub usage: UsageFlags,
    pub samples: u32,
    /// Samples stored inside each tile element.
    pub tile_samples: u32,
}

impl SurfaceParams {
    pub(crate) fn from_descriptor(desc: &ResourceDescriptor) -> Self {
        Self {
            dimension: desc.dimension,
            format: desc.format.info(),
            width: desc.width,
            height: desc.height,
            depth: desc.depth,
            max_lod: desc.max_lod,
            layers: desc.layer_count(),
            tile_mode: desc.tile_mode,
            usage: desc.usage,
            samples: desc.samples,
            tile_samples: 1,
        }
    }
}

/// Alignment, tile lookup, mip packing and pitch/size for one surface.
pub(crate) fn layout_surface(
    rules: &GenerationRules,
    params: &SurfaceParams,
) -> Result<SurfaceGeometry> {
    let alignment = resolve_alignment(rules, params)?;
    let tile = resolve_tile_shape(
        rules,
        params.tile_mode,
        params.format.bits_per_element,
        params.dimension,
        params.tile_samples,
    )?;
    let plan = plan_mips(rules, params, &alignment, &tile)?;
    finalize(rules, params, plan, alignment, tile)
}

/// Layout engine bound to one generation's rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEngine {
    rules: GenerationRules,
}

impl LayoutEngine {
    pub fn new(rules: GenerationRules) -> Self {
        Self { rules }
    }

    pub fn for_generation(generation: Generation) -> Self {
        Self::new(GenerationRules::for_generation(generation))
    }

    pub fn from_config(config: &PlatformConfig) -> Self {
        Self::new(config.rules())
    }

    pub fn rules(&self) -> &GenerationRules {
        &self.rules
    }

    /// Compute the complete layout of a resource.
    ///
    /// Either every part of the layout is computed or an error is returned; there is no
    /// partial result.
    pub fn create_layout(&self, desc: &ResourceDescriptor) -> Result<ResourceLayout> {
        let rules = &self.rules;
        desc.validate(rules)?;
        if desc.format.is_planar() {
            planar::check_tiling(desc.format, desc.tile_mode)?;
        }

        let (params, msaa) = msaa::resolve(rules, desc)?;
        let mut geometry = layout_surface(rules, &params)?;
        let planes = attach_planes(rules, desc, &mut geometry)?;
        let aux =
            aux_surface::resolve(rules, desc, &geometry, planes.as_ref(), msaa.as_ref())?;

        debug!(
            generation = ?rules.generation,
            format = ?desc.format,
            tile_mode = ?geometry.tile_mode(),
            pitch = geometry.pitch,
            qpitch = geometry.qpitch,
            size = geometry.total_size,
            mip_tail_start_lod = geometry.mip_tail_start_lod,
            aux_size = aux.as_ref().map(|a| a.size),
            "created surface layout"
        );

        Ok(ResourceLayout {
            descriptor: *desc,
            rules: *rules,
            geometry,
            planes,
            msaa,
            aux,
        })
    }
}

fn attach_planes(
    rules: &GenerationRules,
    desc: &ResourceDescriptor,
    geometry: &mut SurfaceGeometry,
) -> Result<Option<PlanarLayout>> {
    if !desc.format.is_planar() {
        return Ok(None);
    }
    let planes = planar::resolve(rules, desc, geometry)?;
    geometry.total_rows = planes.total_rows;
    geometry.total_size = planes.total_size;
    Ok(Some(planes))
}

/// Tiled-resource summary of how the mip chain maps onto tiles of one array slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PackedMipInfo {
    pub standard_mips: u32,
    pub packed_mips: u32,
    pub tiles_for_packed_mips: u32,
    /// Tile index of the mip tail, counting the tiles of every standard mip before it.
    pub start_tile_for_packed_mips: u64,
}

/// Layout of one resource, computed once and read-only afterwards (pitch/size overrides
/// aside).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    descriptor: ResourceDescriptor,
    rules: GenerationRules,
    geometry: SurfaceGeometry,
    planes: Option<PlanarLayout>,
    msaa: Option<MsaaLayout>,
    aux: Option<AuxLayout>,
}

impl ResourceLayout {
    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    pub fn rules(&self) -> &GenerationRules {
        &self.rules
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    pub fn pitch(&self) -> u64 {
        self.geometry.pitch
    }

    pub fn qpitch(&self) -> u32 {
        self.geometry.qpitch
    }

    pub fn total_size(&self) -> u64 {
        self.geometry.total_size
    }

    pub fn tile_mode(&self) -> TileMode {
        self.geometry.tile_mode()
    }

    pub fn alignment(&self) -> &Alignment {
        &self.geometry.alignment
    }

    pub fn mips(&self) -> &[MipDescriptor] {
        &self.geometry.mips
    }

    pub fn mip_tail_start_lod(&self) -> u32 {
        self.geometry.mip_tail_start_lod
    }

    pub fn planar(&self) -> Option<&PlanarLayout> {
        self.planes.as_ref()
    }

    pub fn msaa(&self) -> Option<&MsaaLayout> {
        self.msaa.as_ref()
    }

    pub fn aux_layout(&self) -> Option<&AuxLayout> {
        self.aux.as_ref()
    }

    pub fn query_offset(&self, selector: &Selector) -> Result<SubresourceOffset> {
        offset::query_offset(self, selector)
    }

    /// Bytes the resource occupies, including an appended unified aux region.
    pub fn allocation_size(&self) -> u64 {
        match &self.aux {
            Some(aux) if aux.is_unified() => aux.base_offset + aux.size,
            _ => self.geometry.total_size,
        }
    }

    /// Probe-only resources are fully laid out but never backed by memory.
    pub fn needs_backing_memory(&self) -> bool {
        !self.descriptor.usage.contains(UsageFlags::NO_BACKING_MEMORY)
    }

    pub fn packed_mip_info(&self) -> PackedMipInfo {
        let geometry = &self.geometry;
        let levels = geometry.max_lod() + 1;
        let standard_mips = geometry.mip_tail_start_lod.min(levels);
        let packed_mips = levels - standard_mips;
        if !geometry.tile_mode().is_tiled() {
            return PackedMipInfo {
                standard_mips,
                packed_mips,
                ..PackedMipInfo::default()
            };
        }

        let tile = &geometry.tile;
        let start_tile_for_packed_mips = geometry.mips[..standard_mips as usize]
            .iter()
            .map(|mip| {
                u64::from(mip.aligned_width.div_ceil(tile.width))
                    * u64::from(mip.aligned_height.div_ceil(tile.height))
                    * u64::from(mip.aligned_depth.div_ceil(tile.depth))
            })
            .sum();
        PackedMipInfo {
            standard_mips,
            packed_mips,
            tiles_for_packed_mips: u32::from(packed_mips > 0),
            start_tile_for_packed_mips,
        }
    }

    /// Replace the computed pitch and size with caller-chosen larger values.
    ///
    /// The pitch must keep the surface's pitch granularity and the size must stay page aligned
    /// and cover every row at the new pitch. Plane offsets and aux placement are recomputed.
    pub fn override_pitch_and_size(&mut self, pitch: u64, size: u64) -> Result<()> {
        let rules = &self.rules;
        let current = &self.geometry;
        if pitch < current.pitch || pitch % current.pitch_alignment != 0 {
            return Err(LayoutError::InvalidOverride(format!(
                "pitch {pitch} must be a multiple of {} and at least {}",
                current.pitch_alignment, current.pitch
            )));
        }

        let mut geometry = current.clone();
        geometry.pitch = pitch;
        geometry.total_size = size_for_rows(rules, pitch, geometry.total_rows, &geometry.tile)
            .map_err(|err| LayoutError::InvalidOverride(err.to_string()))?;
        let planes = attach_planes(rules, &self.descriptor, &mut geometry)?;

        let minimum = geometry.total_size;
        if size < minimum || size % rules.page_size != 0 || size > rules.max_surface_size {
            return Err(LayoutError::InvalidOverride(format!(
                "size {size} must be page aligned and between {minimum} and {}",
                rules.max_surface_size
            )));
        }
        geometry.total_size = size;

        let aux = aux_surface::resolve(
            rules,
            &self.descriptor,
            &geometry,
            planes.as_ref(),
            self.msaa.as_ref(),
        )?;
        debug!(pitch, size, "overrode surface pitch and size");

        self.geometry = geometry;
        self.planes = planes;
        self.aux = aux;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;

    fn gen9() -> LayoutEngine {
        LayoutEngine::for_generation(Generation::Gen9)
    }

    #[test]
    fn from_descriptor_counts_cube_faces() {
        let desc = ResourceDescriptor::cube(Format::R8G8B8A8Unorm, 16).with_array_size(2);
        let params = SurfaceParams::from_descriptor(&desc);
        assert_eq!(params.layers, 12);
        assert_eq!(params.tile_samples, 1);
    }

    #[test]
    fn failed_validation_yields_no_layout() {
        let desc = ResourceDescriptor::texture_2d(Format::R8Unorm, 0, 4);
        assert!(matches!(
            gen9().create_layout(&desc),
            Err(LayoutError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn packed_mip_info_counts_standard_tiles() {
        // 32bpe Ys: 128x128 element tiles, tail starts at 64x64.
        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 512, 256)
            .with_tile_mode(TileMode::TileYs)
            .with_max_lod(9);
        let layout = gen9().create_layout(&desc).unwrap();
        let info = layout.packed_mip_info();
        assert_eq!(info.standard_mips, 3);
        assert_eq!(info.packed_mips, 7);
        assert_eq!(info.tiles_for_packed_mips, 1);
        // 4x2 + 2x1 + 1x1 tiles.
        assert_eq!(info.start_tile_for_packed_mips, 11);
    }

    #[test]
    fn packed_mip_info_without_tail() {
        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 64, 64).with_max_lod(3);
        let info = gen9().create_layout(&desc).unwrap().packed_mip_info();
        assert_eq!(
            info,
            PackedMipInfo {
                standard_mips: 4,
                ..PackedMipInfo::default()
            }
        );
    }

    #[test]
    fn override_grows_pitch_and_size() {
        let desc = ResourceDescriptor::texture_2d(Format::R8G8B8A8Unorm, 100, 100)
            .with_tile_mode(TileMode::TileY);
        let mut layout = gen9().create_layout(&desc).unwrap();
        assert_eq!(layout.pitch(), 512);
        assert_eq!(layout.total_size(), 512 * 128);

        assert!(matches!(
            layout.override_pitch_and_size(600, 1 << 20),
            Err(LayoutError::InvalidOverride(_))
        ));
        assert!(matches!(
            layout.override_pitch_and_size(1024, 4096),
            Err(LayoutError::InvalidOverride(_))
        ));
        layout.override_pitch_and_size(1024, 1 << 20).unwrap();
        assert_eq!((layout.pitch(), layout.total_size()), (1024, 1 << 20));
    }

    #[test]
    fn probe_only_resources_are_still_laid_out() {
        let desc = ResourceDescriptor::texture_2d(Format::R8Unorm, 64, 64)
            .with_usage(UsageFlags::NO_BACKING_MEMORY);
        let layout = gen9().create_layout(&desc).unwrap();
        assert!(!layout.needs_backing_memory());
        assert_eq!(layout.total_size(), 4096);
        assert_eq!(layout.allocation_size(), 4096);
    }
}
