//! The transient, widened region tag carried by contour vertices while a
//! contour is being walked and simplified.
//!
//! A [`RegionId`] only has 16 bits to work with, which is enough for a
//! persistent per-span tag. While a contour is being built, a vertex needs
//! more: the neighbor's region id, whether that neighbor is across an area
//! boundary, and whether the vertex sits on a tile border. [`VertexRegion`]
//! packs all of that into a `u32`: bits 0-15 mirror [`RegionId`] (including
//! [`RegionId::BORDER`]), bit 16 marks a border vertex, and bit 17 marks an
//! area border.

use crate::{area::AreaType, region::RegionId};

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertexRegion: u32 {
        /// Mirrors [`RegionId::BORDER`].
        const BORDER = 0x8000;

        /// The vertex lies on a tile border and should later be removed to
        /// match up with the tile it borders. Set during contour walking,
        /// read during simplification.
        const VERTEX_BORDER = 0x1_0000;

        /// The vertex lies on a boundary between two different area types.
        /// Set during contour walking; such vertices are mandatory and
        /// survive simplification.
        const AREA_BORDER = 0x2_0000;
    }
}

impl VertexRegion {
    /// No region, no flags.
    pub const NONE: Self = Self::from_bits_truncate(0);

    /// Mask over the region-id-and-border bits (bits 0-15), i.e. the bits
    /// that round-trip through a plain [`RegionId`].
    pub const REGION_MASK: u32 = RegionId::BORDER.bits() as u32 | RegionId::ID_MASK as u32;

    /// Combines a region id with an area type into a single vertex region
    /// tag, with the area packed into bits 16 and up alongside the
    /// [`VertexRegion`] flags that share that range.
    #[inline]
    pub(crate) fn pack(region: RegionId, area: AreaType) -> Self {
        Self::from_bits_retain(region.bits() as u32 | ((area.0 as u32) << 16))
    }

    /// The region id portion, with area bits and vertex-only flags stripped.
    #[inline]
    pub fn region_id(self) -> RegionId {
        RegionId::from_bits_retain((self.bits() & Self::REGION_MASK) as u16)
    }

    /// Whether `self` and `other` were packed with the same area type.
    ///
    /// Only meaningful for tags produced via [`VertexRegion::pack`]; plain
    /// `VERTEX_BORDER`/`AREA_BORDER` flags don't affect the comparison since
    /// they live in the same bits as the packed area - callers must compare
    /// before setting those flags, as contour walking does.
    #[inline]
    pub fn is_same_area(self, other: Self) -> bool {
        (self.bits() >> 16) == (other.bits() >> 16)
    }

    /// Marks this vertex as lying on a tile border.
    #[inline]
    pub fn set_border_vertex(&mut self) {
        *self |= Self::VERTEX_BORDER;
    }

    /// Marks this vertex as lying on an area boundary.
    #[inline]
    pub fn set_area_border(&mut self) {
        *self |= Self::AREA_BORDER;
    }
}

impl From<RegionId> for VertexRegion {
    fn from(region: RegionId) -> Self {
        Self::from_bits_retain(region.bits() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_round_trips_region_id() {
        let region = RegionId::from(5) | RegionId::BORDER;
        let packed = VertexRegion::pack(region, AreaType(2));
        assert_eq!(packed.region_id(), region);
    }

    #[test]
    fn same_area_compares_packed_bits() {
        let a = VertexRegion::pack(RegionId::from(1), AreaType(3));
        let b = VertexRegion::pack(RegionId::from(2), AreaType(3));
        let c = VertexRegion::pack(RegionId::from(1), AreaType(4));
        assert!(a.is_same_area(b));
        assert!(!a.is_same_area(c));
    }

    #[test]
    fn flags_do_not_disturb_region_id() {
        let mut v = VertexRegion::pack(RegionId::from(7), AreaType(1));
        v.set_border_vertex();
        v.set_area_border();
        assert_eq!(v.region_id().id(), 7);
        assert!(v.contains(VertexRegion::VERTEX_BORDER));
        assert!(v.contains(VertexRegion::AREA_BORDER));
    }
}
