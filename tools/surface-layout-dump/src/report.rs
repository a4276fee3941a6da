//! JSON view of a computed layout.

use aero_surface_layout::{
    AuxComponent, AuxPlacement, Dimension, Format, Generation, MsaaFamily, Plane,
    ResourceLayout, Selector, SubresourceOffset, TileMode,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LayoutReport {
    pub generation: Generation,
    pub format: Format,
    pub dimension: Dimension,
    pub tile_mode: TileMode,
    pub alignment: AlignmentReport,
    pub tile: TileReport,
    pub pitch: u64,
    pub qpitch: u32,
    pub slices: u32,
    pub total_size: u64,
    pub allocation_size: u64,
    pub needs_backing_memory: bool,
    pub mip_tail_start_lod: u32,
    pub mips: Vec<MipReport>,
    pub packed_mips: PackedMipsReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planes: Option<Vec<PlaneReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msaa: Option<MsaaReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aux: Option<AuxReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
pub struct AlignmentReport {
    pub h: u32,
    pub v: u32,
    pub d: u32,
}

#[derive(Debug, Serialize)]
pub struct TileReport {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub size_bytes: u32,
}

#[derive(Debug, Serialize)]
pub struct MipReport {
    pub level: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub x: u32,
    pub y: u32,
    pub z: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_slot: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PackedMipsReport {
    pub standard_mips: u32,
    pub packed_mips: u32,
    pub tiles_for_packed_mips: u32,
    pub start_tile_for_packed_mips: u64,
}

#[derive(Debug, Serialize)]
pub struct PlaneReport {
    pub plane: Plane,
    pub offset: u64,
    pub x_offset_bytes: u64,
    pub y_offset_rows: u64,
    pub row_pitch: u64,
    pub rows: u64,
}

#[derive(Debug, Serialize)]
pub struct MsaaReport {
    pub family: MsaaFamily,
    pub samples: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcs_size: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct AuxReport {
    pub placement: AuxPlacement,
    pub base_offset: u64,
    pub pitch: u64,
    pub size: u64,
    pub regions: Vec<AuxRegionReport>,
}

#[derive(Debug, Serialize)]
pub struct AuxRegionReport {
    pub component: AuxComponent,
    pub offset: u64,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub selector: Selector,
    pub offset: SubresourceOffset,
}

impl LayoutReport {
    pub fn new(layout: &ResourceLayout, queries: Vec<QueryReport>) -> Self {
        let desc = layout.descriptor();
        let geometry = layout.geometry();
        let alignment = layout.alignment();
        let packed = layout.packed_mip_info();

        Self {
            generation: layout.rules().generation,
            format: desc.format,
            dimension: desc.dimension,
            tile_mode: layout.tile_mode(),
            alignment: AlignmentReport {
                h: alignment.h_align,
                v: alignment.v_align,
                d: alignment.d_align,
            },
            tile: TileReport {
                width: geometry.tile.width,
                height: geometry.tile.height,
                depth: geometry.tile.depth,
                size_bytes: geometry.tile.size_bytes,
            },
            pitch: layout.pitch(),
            qpitch: layout.qpitch(),
            slices: geometry.slices,
            total_size: layout.total_size(),
            allocation_size: layout.allocation_size(),
            needs_backing_memory: layout.needs_backing_memory(),
            mip_tail_start_lod: layout.mip_tail_start_lod(),
            mips: layout
                .mips()
                .iter()
                .map(|mip| MipReport {
                    level: mip.level,
                    width: mip.width,
                    height: mip.height,
                    depth: mip.depth,
                    x: mip.offset.x,
                    y: mip.offset.y,
                    z: mip.offset.z,
                    tail_slot: mip.tail_slot.map(|slot| slot.index),
                })
                .collect(),
            packed_mips: PackedMipsReport {
                standard_mips: packed.standard_mips,
                packed_mips: packed.packed_mips,
                tiles_for_packed_mips: packed.tiles_for_packed_mips,
                start_tile_for_packed_mips: packed.start_tile_for_packed_mips,
            },
            planes: layout.planar().map(|planar| {
                planar
                    .planes
                    .iter()
                    .map(|p| PlaneReport {
                        plane: p.plane,
                        offset: p.offset,
                        x_offset_bytes: p.x_offset_bytes,
                        y_offset_rows: p.y_offset_rows,
                        row_pitch: p.row_pitch,
                        rows: p.rows,
                    })
                    .collect()
            }),
            msaa: layout.msaa().map(|msaa| MsaaReport {
                family: msaa.family,
                samples: msaa.samples,
                mcs_size: msaa.mcs.as_ref().map(|mcs| mcs.total_size),
            }),
            aux: layout.aux_layout().map(|aux| AuxReport {
                placement: aux.placement,
                base_offset: aux.base_offset,
                pitch: aux.pitch,
                size: aux.size,
                regions: aux
                    .regions
                    .iter()
                    .map(|r| AuxRegionReport {
                        component: r.component,
                        offset: r.offset,
                        size: r.size,
                    })
                    .collect(),
            }),
            queries,
        }
    }
}
