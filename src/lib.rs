#![doc = include_str!("../readme.md")]

mod area;
mod bvtree;
mod compact_cell;
mod compact_heightfield;
mod compact_span;
mod contours;
pub(crate) mod math;
mod region;
mod vertex_region;

pub use area::AreaType;
pub use bvtree::{BvNode, BvTree, NULL_INDEX};
pub use compact_cell::CompactCell;
pub use compact_heightfield::CompactHeightfield;
pub use compact_span::CompactSpan;
pub use contours::{
    BuildContoursFlags, Contour, ContourError, ContourSet, ContourSetReadOnlyError, ContourVertex,
};
pub use math::{Aabb2d, Aabb3d};
pub use region::RegionId;
pub use vertex_region::VertexRegion;
