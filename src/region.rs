bitflags::bitflags! {
    /// The region tag carried by a [`CompactSpan`](crate::compact_span::CompactSpan).
    ///
    /// Bit 15 is a flag; bits 0-14 hold the region's numeric id. Use
    /// [`RegionId::id`] to read the id portion and [`RegionId::remove_flags`]
    /// to strip flags while keeping the id.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct RegionId: u16 {
        /// Heightfield border flag.
        /// If a region id has this bit set, then the region is a border
        /// region (background/world-edge) and its spans are considered
        /// un-walkable.
        const BORDER = 0x8000;
    }
}

impl RegionId {
    /// The region with no id and no flags. Used for spans that are not in a region.
    pub const NONE: Self = Self::from_bits_truncate(0);

    /// Mask over the id-only bits of a region id.
    pub const ID_MASK: u16 = 0x7fff;

    /// The id portion of this region tag, with flags stripped.
    #[inline]
    pub fn id(self) -> u16 {
        self.bits() & Self::ID_MASK
    }

    /// Whether this region is a border region (world edge / background).
    #[inline]
    pub fn is_border(self) -> bool {
        self.contains(Self::BORDER)
    }

    /// Whether this region is either [`RegionId::NONE`] or a border region.
    ///
    /// Spans tagged this way are excluded from contour generation: they are
    /// either unwalkable or part of the artificial tile-border skirt.
    #[inline]
    pub fn is_border_or_null(self) -> bool {
        self == Self::NONE || self.is_border()
    }

    /// Whether two region tags refer to the same region, ignoring flags.
    #[inline]
    pub fn is_same_region(self, other: Self) -> bool {
        self.id() == other.id()
    }

    /// Strips all flags, keeping only the id.
    #[inline]
    pub fn remove_flags(self) -> Self {
        Self::from_bits_truncate(self.id())
    }

    pub(crate) fn inc(&mut self) {
        *self = Self::from(self.bits() + 1);
    }
}

impl Default for RegionId {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<u16> for RegionId {
    fn from(value: u16) -> Self {
        RegionId::from_bits_truncate(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_or_null() {
        assert!(RegionId::NONE.is_border_or_null());
        assert!(RegionId::from(1).contains(RegionId::BORDER).then_some(()).is_none());
        assert!((RegionId::from(1) | RegionId::BORDER).is_border_or_null());
        assert!(!RegionId::from(1).is_border_or_null());
    }

    #[test]
    fn same_region_ignores_flags() {
        let a = RegionId::from(3);
        let b = RegionId::from(3) | RegionId::BORDER;
        assert!(a.is_same_region(b));
        assert_eq!(b.remove_flags(), a);
    }

    #[test]
    fn inc_preserves_value() {
        let mut r = RegionId::from(1);
        r.inc();
        assert_eq!(r.id(), 2);
    }
}
