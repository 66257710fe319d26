use crate::{
    area::AreaType,
    compact_cell::CompactCell,
    compact_span::CompactSpan,
    math::{Aabb3d, dir_offset_x, dir_offset_z},
    region::RegionId,
};

/// A packed representation of a heightfield that has already been
/// rasterized and partitioned into regions upstream.
///
/// Building a `CompactHeightfield` from raw geometry (rasterization,
/// neighbor linking, watershed region partitioning) is outside this
/// crate's scope; upstream collaborators are expected to populate
/// [`CompactHeightfield::new`] with their own cells, spans and areas.
#[derive(Debug, Clone)]
pub struct CompactHeightfield {
    /// The width of the heightfield along the x-axis in cell units.
    pub width: u16,
    /// The depth of the heightfield along the z-axis in cell units.
    pub height: u16,
    /// The AABB border size used during the build of the field.
    pub border_size: u16,
    /// The maximum region id of any span within the field.
    pub max_region: RegionId,
    /// The AABB of the heightfield in world space.
    pub aabb: Aabb3d,
    /// The size of each cell on the xz-plane.
    pub cell_size: f32,
    /// The size of each cell along the y-axis.
    pub cell_height: f32,
    /// The cells in the heightfield. \[Size: `width * height`\]
    pub cells: Vec<CompactCell>,
    /// All walkable spans in the heightfield.
    pub spans: Vec<CompactSpan>,
    /// The area type of each span. \[Size: `spans.len()`\]
    pub areas: Vec<AreaType>,
}

impl CompactHeightfield {
    /// Builds a `CompactHeightfield` from already-computed cells, spans and
    /// areas. Callers are responsible for having established neighbor
    /// connections and region ids beforehand.
    pub fn new(
        width: u16,
        height: u16,
        border_size: u16,
        max_region: RegionId,
        aabb: Aabb3d,
        cell_size: f32,
        cell_height: f32,
        cells: Vec<CompactCell>,
        spans: Vec<CompactSpan>,
        areas: Vec<AreaType>,
    ) -> Self {
        Self {
            width,
            height,
            border_size,
            max_region,
            aabb,
            cell_size,
            cell_height,
            cells,
            spans,
            areas,
        }
    }

    #[inline]
    pub(crate) fn column_index(&self, x: u16, z: u16) -> usize {
        x as usize + z as usize * self.width as usize
    }

    /// Returns the cell at the given coordinates. Returns `None` if the coordinates are invalid.
    #[inline]
    pub fn get_cell_at(&self, x: u16, z: u16) -> Option<&CompactCell> {
        self.cells.get(self.column_index(x, z))
    }

    /// Returns the cell at the given coordinates. Panics if the coordinates are invalid.
    #[inline]
    pub fn cell_at(&self, x: u16, z: u16) -> &CompactCell {
        &self.cells[self.column_index(x, z)]
    }

    /// Returns the cell mutably at the given coordinates. Returns `None` if the coordinates are invalid.
    #[inline]
    pub fn get_cell_at_mut(&mut self, x: u16, z: u16) -> Option<&mut CompactCell> {
        let index = self.column_index(x, z);
        self.cells.get_mut(index)
    }

    /// Returns the cell mutably at the given coordinates. Panics if the coordinates are invalid.
    #[inline]
    pub fn cell_at_mut(&mut self, x: u16, z: u16) -> &mut CompactCell {
        let index = self.column_index(x, z);
        &mut self.cells[index]
    }

    /// Resolves a span's connection in the given direction to the neighbor
    /// cell's grid coordinates and the neighbor span's flat index.
    ///
    /// `con` is the connection nibble returned by [`CompactSpan::con`].
    pub(crate) fn con_indices(&self, x: i32, z: i32, dir: u8, con: u8) -> (i32, i32, usize) {
        let neighbor_x = x + dir_offset_x(dir) as i32;
        let neighbor_z = z + dir_offset_z(dir) as i32;
        let cell_index = neighbor_x as usize + neighbor_z as usize * self.width as usize;
        let span_index = self.cells[cell_index].index() as usize + con as usize;
        (neighbor_x, neighbor_z, span_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_field(width: u16, height: u16) -> CompactHeightfield {
        CompactHeightfield::new(
            width,
            height,
            0,
            RegionId::NONE,
            Aabb3d::default(),
            1.0,
            1.0,
            vec![CompactCell::default(); width as usize * height as usize],
            vec![],
            vec![],
        )
    }

    #[test]
    fn column_index_is_row_major() {
        let field = empty_field(4, 3);
        assert_eq!(field.column_index(0, 0), 0);
        assert_eq!(field.column_index(3, 0), 3);
        assert_eq!(field.column_index(0, 1), 4);
        assert_eq!(field.column_index(2, 2), 10);
    }

    #[test]
    fn cell_at_mut_writes_through() {
        let mut field = empty_field(2, 2);
        field.cell_at_mut(1, 1).set_count(3);
        assert_eq!(field.cell_at(1, 1).count(), 3);
    }
}
