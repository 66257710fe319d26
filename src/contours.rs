use glam::{U16Vec3, Vec2};

use crate::{
    area::AreaType,
    compact_heightfield::CompactHeightfield,
    math::{Aabb3d, dir_rotate_ccw, dir_rotate_cw, distance_point_to_segment_sq_2d},
    region::RegionId,
    vertex_region::VertexRegion,
};

/// The number of steps a single contour walk may take before it is considered
/// malformed. A closed 4-connected boundary around the whole heightfield
/// cannot legitimately exceed this; hitting it means a span's connections
/// don't form a consistent loop.
const MAX_WALK_STEPS: u32 = 40_000;

/// A single vertex of a [`Contour`]: an integer grid position plus the region
/// tag describing what lies across the edge that starts at this vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContourVertex {
    /// Grid-space position. `y` is measured in heightfield height units.
    pub pos: U16Vec3,
    /// The neighbor-region tag for the edge leaving this vertex.
    pub region: VertexRegion,
}

impl ContourVertex {
    fn new(x: u16, y: u16, z: u16, region: VertexRegion) -> Self {
        Self {
            pos: U16Vec3::new(x, y, z),
            region,
        }
    }
}

/// A simple, non-overlapping contour in field space: the boundary of a single
/// region, in both its raw (one vertex per boundary cell edge) and simplified
/// (polyline-reduced) forms.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    vertices: Vec<ContourVertex>,
    raw_vertices: Vec<ContourVertex>,
    region: RegionId,
    area: AreaType,
}

impl Contour {
    /// The simplified contour vertices, in order.
    pub fn vertices(&self) -> &[ContourVertex] {
        &self.vertices
    }

    /// The raw, unsimplified contour vertices, in order.
    pub fn raw_vertices(&self) -> &[ContourVertex] {
        &self.raw_vertices
    }

    /// The region this contour bounds.
    pub fn region(&self) -> RegionId {
        self.region
    }

    /// The area type of the region this contour bounds.
    pub fn area(&self) -> AreaType {
        self.area
    }
}

bitflags::bitflags! {
    /// Contour build flags used by [`CompactHeightfield::build_contours`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[repr(transparent)]
    pub struct BuildContoursFlags: u8 {
        /// Tessellate edges with no region on the far side (solid walls)
        /// during contour simplification.
        const TESSELLATE_WALL_EDGES = 1;
        /// Tessellate edges between two different area types during contour
        /// simplification.
        const TESSELLATE_AREA_EDGES = 2;

        /// Default flags for building contours.
        const DEFAULT = Self::TESSELLATE_WALL_EDGES.bits();
    }
}

impl Default for BuildContoursFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Errors produced while walking span connectivity to build a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContourError {
    /// A span's edge was flagged as a region boundary, but following it
    /// required stepping across a connection the span doesn't have.
    #[error("span at ({x}, {z}) is missing its connection in direction {dir}")]
    MissingConnection {
        /// Grid x coordinate of the span.
        x: u16,
        /// Grid z coordinate of the span.
        z: u16,
        /// The direction (0..4) the walk tried to step across.
        dir: u8,
    },
    /// A contour walk exceeded [`MAX_WALK_STEPS`] without returning to its
    /// start, meaning the span connectivity it was following doesn't form a
    /// closed loop.
    #[error("contour walk did not close after {0} steps; span connectivity is malformed")]
    MalformedConnectivity(u32),
}

/// A group of contours, one per non-border region, produced by
/// [`CompactHeightfield::build_contours`].
///
/// This type is intentionally read-only: once built, a [`ContourSet`]'s
/// contours don't change. The `try_*` methods exist for callers that want to
/// treat it through a generic mutable-collection interface; they always fail.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSet {
    contours: Vec<Contour>,
    aabb: Aabb3d,
    cell_size: f32,
    cell_height: f32,
    width: u16,
    height: u16,
    border_size: u16,
}

/// Returned by [`ContourSet`]'s `try_*` mutation methods: a [`ContourSet`] is
/// always read-only once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("ContourSet is read-only")]
pub struct ContourSetReadOnlyError;

impl ContourSet {
    /// The contours in this set.
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// The number of contours in this set.
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    /// Whether this set has no contours.
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Iterates over the contours in this set.
    pub fn iter(&self) -> std::slice::Iter<'_, Contour> {
        self.contours.iter()
    }

    /// The AABB in world space, shrunk to exclude the border skirt.
    pub fn aabb(&self) -> Aabb3d {
        self.aabb
    }

    /// The size of each cell on the xz-plane.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// The height of each cell.
    pub fn cell_height(&self) -> f32 {
        self.cell_height
    }

    /// The width of the set, along the x-axis in cell units, excluding the border skirt.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// The height of the set, along the z-axis in cell units, excluding the border skirt.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The border size of the source heightfield this set was built from.
    pub fn border_size(&self) -> u16 {
        self.border_size
    }

    /// Always fails: a [`ContourSet`] cannot be appended to after construction.
    pub fn try_push(&mut self, _contour: Contour) -> Result<(), ContourSetReadOnlyError> {
        Err(ContourSetReadOnlyError)
    }

    /// Always fails: a [`ContourSet`] cannot have contours removed after construction.
    pub fn try_remove(&mut self, _index: usize) -> Result<Contour, ContourSetReadOnlyError> {
        Err(ContourSetReadOnlyError)
    }

    /// Always fails: a [`ContourSet`] cannot be cleared after construction.
    pub fn try_clear(&mut self) -> Result<(), ContourSetReadOnlyError> {
        Err(ContourSetReadOnlyError)
    }
}

impl std::ops::Index<usize> for ContourSet {
    type Output = Contour;

    fn index(&self, index: usize) -> &Self::Output {
        &self.contours[index]
    }
}

impl<'a> IntoIterator for &'a ContourSet {
    type Item = &'a Contour;
    type IntoIter = std::slice::Iter<'a, Contour>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.iter()
    }
}

impl CompactHeightfield {
    /// Traces the boundary of every non-border region into a raw contour,
    /// simplifies each into a polyline within `max_error` of the original,
    /// and merges any region whose boundary winds backwards (a hole) into
    /// the sibling contour of the same region that contains it.
    ///
    /// The raw contours match the region outlines exactly; `max_error` and
    /// `max_edge_len` control how closely the simplified contours track
    /// them. Vertices on a boundary between two different area types are
    /// always kept by simplification, since downstream polygon meshing
    /// needs those portals to line up exactly.
    ///
    /// Setting `max_edge_len` to zero disables edge-length-based tessellation.
    pub fn build_contours(
        &self,
        max_error: f32,
        max_edge_len: u16,
        build_flags: BuildContoursFlags,
    ) -> Result<ContourSet, ContourError> {
        let mut aabb = self.aabb;
        if self.border_size > 0 {
            let pad = self.border_size as f32 * self.cell_size;
            aabb.min.x += pad;
            aabb.min.z += pad;
            aabb.max.x -= pad;
            aabb.max.z -= pad;
        }

        let max_contours = (self.max_region.id() as usize).max(8);
        let mut contours = Vec::with_capacity(max_contours);

        let mut flags = vec![0u8; self.spans.len()];
        for z in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell_at(x, z);
                for i in cell.index_range() {
                    let span = &self.spans[i];
                    if span.region.is_border_or_null() {
                        flags[i] = 0;
                        continue;
                    }
                    let mut mask = 0u8;
                    for dir in 0..4u8 {
                        let mut neighbor_region = RegionId::NONE;
                        if let Some(con) = span.con(dir) {
                            let (_, _, a_i) = self.con_indices(x as i32, z as i32, dir, con);
                            neighbor_region = self.spans[a_i].region;
                        }
                        if neighbor_region == span.region {
                            mask |= 1 << dir;
                        }
                    }
                    flags[i] = (!mask) & 0xf;
                }
            }
        }

        for z in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell_at(x, z);
                for i in cell.index_range() {
                    if flags[i] == 0 || flags[i] == 0xf {
                        flags[i] = 0;
                        continue;
                    }
                    let region = self.spans[i].region;
                    if region.is_border_or_null() {
                        continue;
                    }

                    let raw_vertices = self.walk_contour_build(x, z, i, &mut flags)?;
                    let mut vertices =
                        simplify_contour(&raw_vertices, max_error, max_edge_len, build_flags);
                    remove_degenerate_segments(&mut vertices);

                    if vertices.len() < 3 {
                        tracing::trace!(
                            region = region.id(),
                            x,
                            z,
                            "discarding degenerate contour with fewer than 3 simplified vertices"
                        );
                        continue;
                    }

                    contours.push(Contour {
                        vertices,
                        raw_vertices,
                        region: region.remove_flags(),
                        area: self.areas[i],
                    });
                }
            }
        }

        merge_backwards_contours(&mut contours);
        contours.retain(|c| c.vertices.len() >= 3);

        Ok(ContourSet {
            contours,
            aabb,
            cell_size: self.cell_size,
            cell_height: self.cell_height,
            width: self.width.saturating_sub(self.border_size * 2),
            height: self.height.saturating_sub(self.border_size * 2),
            border_size: self.border_size,
        })
    }

    /// Walks the boundary of the region containing span `i`, starting at
    /// grid position `(x, z)`, clearing each boundary bit in `flags` as it
    /// is consumed so no edge is walked twice.
    fn walk_contour_build(
        &self,
        mut x: u16,
        mut z: u16,
        mut i: usize,
        flags: &mut [u8],
    ) -> Result<Vec<ContourVertex>, ContourError> {
        let mut dir = 0u8;
        while flags[i] & (1 << dir) == 0 {
            dir += 1;
        }

        let start_span = i;
        let start_dir = dir;
        let area = self.areas[i];

        let mut points = Vec::with_capacity(256);

        for _ in 0..MAX_WALK_STEPS {
            if flags[i] & (1 << dir) != 0 {
                let (corner_y, is_border_vertex) = self.get_corner_height(x, z, i, dir);

                let mut px = x;
                let mut pz = z;
                match dir {
                    0 => pz += 1,
                    1 => {
                        px += 1;
                        pz += 1;
                    }
                    2 => px += 1,
                    _ => {}
                }

                let mut r = VertexRegion::NONE;
                let mut is_area_border = false;
                if let Some(con) = self.spans[i].con(dir) {
                    let (_, _, a_i) = self.con_indices(x as i32, z as i32, dir, con);
                    r = VertexRegion::from(self.spans[a_i].region);
                    if area != self.areas[a_i] {
                        is_area_border = true;
                    }
                }
                if is_border_vertex {
                    r.set_border_vertex();
                }
                if is_area_border {
                    r.set_area_border();
                }

                points.push(ContourVertex::new(px, corner_y, pz, r));

                flags[i] &= !(1 << dir);
                dir = dir_rotate_cw(dir);
            } else {
                let con = self.spans[i]
                    .con(dir)
                    .ok_or(ContourError::MissingConnection { x, z, dir })?;
                let (nx, nz, n_i) = self.con_indices(x as i32, z as i32, dir, con);
                x = nx as u16;
                z = nz as u16;
                i = n_i;
                dir = dir_rotate_ccw(dir);
            }

            if i == start_span && dir == start_dir {
                return Ok(points);
            }
        }

        tracing::warn!(
            region = self.spans[start_span].region.id(),
            x,
            z,
            steps = MAX_WALK_STEPS,
            "contour walk did not close; span connectivity is malformed"
        );
        Err(ContourError::MalformedConnectivity(MAX_WALK_STEPS))
    }

    /// Computes the height of the corner at the start of the edge leaving
    /// span `i` in direction `dir`, and whether that corner is a border
    /// vertex slated for later removal (see the module-level notes on
    /// [`ContourVertex`]).
    fn get_corner_height(&self, x: u16, z: u16, i: usize, dir: u8) -> (u16, bool) {
        let span = &self.spans[i];
        let mut height = span.y;
        let dir_p = dir_rotate_cw(dir);

        let mut regs = [VertexRegion::NONE; 4];
        let get_reg = |idx: usize| VertexRegion::pack(self.spans[idx].region, self.areas[idx]);
        regs[0] = get_reg(i);

        if let Some(con) = span.con(dir) {
            let (a_x, a_z, a_i) = self.con_indices(x as i32, z as i32, dir, con);
            height = height.max(self.spans[a_i].y);
            regs[1] = get_reg(a_i);
            if let Some(con) = self.spans[a_i].con(dir_p) {
                let (_, _, b_i) = self.con_indices(a_x, a_z, dir_p, con);
                height = height.max(self.spans[b_i].y);
                regs[2] = get_reg(b_i);
            }
        }
        if let Some(con) = span.con(dir_p) {
            let (a_x, a_z, a_i) = self.con_indices(x as i32, z as i32, dir_p, con);
            height = height.max(self.spans[a_i].y);
            regs[3] = get_reg(a_i);
            // Overwrites regs[2] if the branch above also wrote it; kept
            // rather than unioning the two diagonals.
            if let Some(con) = self.spans[a_i].con(dir) {
                let (_, _, b_i) = self.con_indices(a_x, a_z, dir, con);
                height = height.max(self.spans[b_i].y);
                regs[2] = get_reg(b_i);
            }
        }

        let mut is_border_vertex = false;
        for rot in 0..4u8 {
            let a = rot as usize;
            let b = ((rot + 1) & 0x3) as usize;
            let c = ((rot + 2) & 0x3) as usize;
            let d = ((rot + 3) & 0x3) as usize;

            let two_same_exterior = regs[a] == regs[b] && regs[a].contains(VertexRegion::BORDER);
            let two_interior = !(regs[c] | regs[d]).contains(VertexRegion::BORDER);
            let interiors_same_area = regs[c].is_same_area(regs[d]);
            let no_zeros = regs[a] != VertexRegion::NONE
                && regs[b] != VertexRegion::NONE
                && regs[c] != VertexRegion::NONE
                && regs[d] != VertexRegion::NONE;

            if two_same_exterior && two_interior && interiors_same_area && no_zeros {
                is_border_vertex = true;
                break;
            }
        }

        (height, is_border_vertex)
    }
}

/// Reduces a raw, one-vertex-per-boundary-cell-edge contour to a polyline
/// within `max_error` of the original, tessellating long edges to at most
/// `max_edge_len` and always keeping area-border vertices.
fn simplify_contour(
    points: &[ContourVertex],
    max_error: f32,
    max_edge_len: u16,
    build_flags: BuildContoursFlags,
) -> Vec<ContourVertex> {
    let n = points.len();
    let mut simplified: Vec<(U16Vec3, usize)> = Vec::new();

    let has_connections = points
        .iter()
        .any(|p| p.region.region_id() != RegionId::NONE);

    if has_connections {
        for i in 0..n {
            let next = (i + 1) % n;
            let region = points[i].region.region_id();
            let next_region = points[next].region.region_id();
            let different_regions = region != next_region;
            let area_borders = points[i].region.contains(VertexRegion::AREA_BORDER)
                != points[next].region.contains(VertexRegion::AREA_BORDER);
            if different_regions || area_borders {
                simplified.push((points[i].pos, i));
            }
        }
    }

    if simplified.is_empty() {
        let mut lower_left = (points[0].pos, 0usize);
        let mut upper_right = (points[0].pos, 0usize);
        for (i, p) in points.iter().enumerate() {
            if p.pos.x < lower_left.0.x || (p.pos.x == lower_left.0.x && p.pos.z < lower_left.0.z)
            {
                lower_left = (p.pos, i);
            }
            if p.pos.x > upper_right.0.x
                || (p.pos.x == upper_right.0.x && p.pos.z > upper_right.0.z)
            {
                upper_right = (p.pos, i);
            }
        }
        simplified.push(lower_left);
        simplified.push(upper_right);
    }

    // Insert points along the raw polyline wherever the perpendicular
    // distance from a simplified edge exceeds max_error.
    let mut i = 0;
    while i < simplified.len() {
        let next = (i + 1) % simplified.len();
        let (a0, ai) = simplified[i];
        let (b0, bi) = simplified[next];

        let forward = (b0.x, b0.z) > (a0.x, a0.z);
        let (ci_start, c_inc, c_end, a, b) = if forward {
            ((ai + 1) % n, 1usize, bi, a0, b0)
        } else {
            ((bi + n - 1) % n, n - 1, ai, b0, a0)
        };

        let gate_region = points[ci_start].region.region_id();
        let eligible =
            gate_region == RegionId::NONE || points[ci_start].region.contains(VertexRegion::AREA_BORDER);

        let mut max_dist_sq = 0.0f32;
        let mut max_i = None;
        if eligible {
            let seg_a = Vec2::new(a.x as f32, a.z as f32);
            let seg_b = Vec2::new(b.x as f32, b.z as f32);
            let mut ci = ci_start;
            while ci != c_end {
                let p = points[ci].pos;
                let d =
                    distance_point_to_segment_sq_2d(Vec2::new(p.x as f32, p.z as f32), seg_a, seg_b);
                if d > max_dist_sq {
                    max_dist_sq = d;
                    max_i = Some(ci);
                }
                ci = (ci + c_inc) % n;
            }
        }

        if let Some(max_i) = max_i {
            if max_dist_sq > max_error * max_error {
                simplified.insert(i + 1, (points[max_i].pos, max_i));
                continue;
            }
        }
        i += 1;
    }

    // Split edges longer than max_edge_len, respecting which edge kinds the
    // caller asked to tessellate.
    if max_edge_len > 0
        && (build_flags.contains(BuildContoursFlags::TESSELLATE_WALL_EDGES)
            || build_flags.contains(BuildContoursFlags::TESSELLATE_AREA_EDGES))
    {
        let mut i = 0;
        while i < simplified.len() {
            let next = (i + 1) % simplified.len();
            let (a, ai) = simplified[i];
            let (b, bi) = simplified[next];

            let segment_kind = points[(ai + 1) % n].region;
            let should_tessellate = (build_flags.contains(BuildContoursFlags::TESSELLATE_WALL_EDGES)
                && segment_kind.region_id() == RegionId::NONE)
                || (build_flags.contains(BuildContoursFlags::TESSELLATE_AREA_EDGES)
                    && segment_kind.contains(VertexRegion::AREA_BORDER));

            let mut split = None;
            if should_tessellate {
                let dx = (b.x as i64 - a.x as i64).unsigned_abs();
                let dz = (b.z as i64 - a.z as i64).unsigned_abs();
                if dx * dx + dz * dz > (max_edge_len as u64 * max_edge_len as u64) {
                    let span = if bi >= ai { bi - ai } else { bi + n - ai };
                    if span > 1 {
                        let forward = (b.x, b.z) > (a.x, a.z);
                        split = Some(if forward {
                            (ai + span / 2) % n
                        } else {
                            (ai + (span + 1) / 2) % n
                        });
                    }
                }
            }

            if let Some(split) = split {
                simplified.insert(i + 1, (points[split].pos, split));
            } else {
                i += 1;
            }
        }
    }

    // Re-derive each simplified vertex's region tag from the raw points on
    // either side of its back-reference, carrying the area-border flag
    // forward and the vertex-border flag backward.
    simplified
        .into_iter()
        .map(|(pos, bi)| {
            let ai = (bi + 1) % n;
            let region_bits =
                points[ai].region.bits() & (VertexRegion::REGION_MASK | VertexRegion::AREA_BORDER.bits());
            let vertex_border_bit = points[bi].region.bits() & VertexRegion::VERTEX_BORDER.bits();
            let region = VertexRegion::from_bits_retain(region_bits | vertex_border_bit);
            ContourVertex::new(pos.x, pos.y, pos.z, region)
        })
        .collect()
}

/// Removes consecutive vertices that share an (x, z) position, in a single
/// pass. Keeping both would produce a zero-length edge downstream.
fn remove_degenerate_segments(vertices: &mut Vec<ContourVertex>) {
    let mut i = 0;
    while i < vertices.len() {
        let next = (i + 1) % vertices.len();
        let a = vertices[i].pos;
        let b = vertices[next].pos;
        if a.x == b.x && a.z == b.z {
            vertices.remove(i);
        }
        i += 1;
    }
}

/// A contour whose simplified boundary winds clockwise on the xz-plane
/// (negative signed area) describes a hole rather than an outer boundary.
/// Splices each such contour's vertices into a sibling contour of the same
/// region that winds the other way, then leaves it for the caller to drop
/// via the `< 3` vertex filter.
fn merge_backwards_contours(contours: &mut Vec<Contour>) {
    let areas: Vec<i64> = contours
        .iter()
        .map(|c| signed_area_2d(&c.vertices))
        .collect();

    for i in 0..contours.len() {
        if areas[i] >= 0 {
            continue;
        }
        let region = contours[i].region;
        let host = (0..contours.len()).find(|&j| {
            j != i && !contours[j].vertices.is_empty() && contours[j].region == region && areas[j] > 0
        });
        if let Some(host) = host {
            let backwards_vertices = std::mem::take(&mut contours[i].vertices);
            contours[host].vertices.extend(backwards_vertices);
        }
    }
}

fn signed_area_2d(vertices: &[ContourVertex]) -> i64 {
    let n = vertices.len();
    let mut area = 0i64;
    for i in 0..n {
        let a = vertices[i].pos;
        let b = vertices[(i + 1) % n].pos;
        area += b.x as i64 * a.z as i64 - a.x as i64 * b.z as i64;
    }
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{compact_cell::CompactCell, compact_span::CompactSpan};

    /// Builds a `width` x `height` compact heightfield where every cell has
    /// exactly one span at height 0, tagged with `region_of(x, z)`, fully
    /// connected to its 4-neighbors that share the same grid (no borders are
    /// carved in automatically - callers leave `NOT_CONNECTED` at the edges
    /// of the whole grid).
    fn grid_field(
        width: u16,
        height: u16,
        region_of: impl Fn(u16, u16) -> RegionId,
    ) -> CompactHeightfield {
        let mut cells = vec![CompactCell::default(); width as usize * height as usize];
        let mut spans = Vec::with_capacity(width as usize * height as usize);
        let mut areas = Vec::with_capacity(width as usize * height as usize);

        for z in 0..height {
            for x in 0..width {
                let index = x as usize + z as usize * width as usize;
                cells[index].set_index(index as u32);
                cells[index].set_count(1);

                let mut span = CompactSpan::default();
                span.region = region_of(x, z);
                span.set_height(1);
                for dir in 0..4u8 {
                    let nx = x as i32 + crate::math::dir_offset_x(dir) as i32;
                    let nz = z as i32 + crate::math::dir_offset_z(dir) as i32;
                    if nx >= 0 && nz >= 0 && nx < width as i32 && nz < height as i32 {
                        span.set_con(dir, Some(0));
                    } else {
                        span.set_con(dir, None);
                    }
                }
                spans.push(span);
                areas.push(AreaType(1));
            }
        }

        CompactHeightfield::new(
            width,
            height,
            0,
            RegionId::from(1),
            Aabb3d::default(),
            1.0,
            1.0,
            cells,
            spans,
            areas,
        )
    }

    #[test]
    fn single_square_region_produces_one_quad_contour() {
        let field = grid_field(2, 2, |_, _| RegionId::from(1));
        let set = field
            .build_contours(1.0, 0, BuildContoursFlags::DEFAULT)
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.contours()[0].vertices().len(), 4);
        assert_eq!(set.contours()[0].region(), RegionId::from(1));
    }

    #[test]
    fn two_adjacent_regions_each_produce_a_contour() {
        let field = grid_field(
            4,
            2,
            |x, _| if x < 2 { RegionId::from(1) } else { RegionId::from(2) },
        );
        let set = field
            .build_contours(1.0, 0, BuildContoursFlags::DEFAULT)
            .unwrap();
        assert_eq!(set.len(), 2);
        let mut regions: Vec<u16> = set.contours().iter().map(|c| c.region().id()).collect();
        regions.sort();
        assert_eq!(regions, vec![1, 2]);
    }

    #[test]
    fn straight_boundary_is_tessellated_by_max_edge_len() {
        let field = grid_field(8, 2, |_, _| RegionId::from(1));
        let set = field
            .build_contours(1.0, 2, BuildContoursFlags::TESSELLATE_WALL_EDGES)
            .unwrap();
        assert_eq!(set.len(), 1);
        // A long straight top edge must be split into multiple segments no
        // longer than max_edge_len.
        assert!(set.contours()[0].vertices().len() > 4);
    }

    #[test]
    fn annular_region_merges_hole_into_host_contour() {
        // A ring of region 1 around a single-cell hole: the walk produces
        // two separate closed loops tagged with the same region (the outer
        // boundary and the boundary around the hole), and the hole's
        // negative-area loop must be merged into the positive-area one.
        let field = grid_field(5, 5, |x, z| {
            if x == 2 && z == 2 {
                RegionId::NONE
            } else {
                RegionId::from(1)
            }
        });
        let set = field
            .build_contours(1.0, 0, BuildContoursFlags::DEFAULT)
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.contours()[0].region(), RegionId::from(1));
        // The merged contour carries both the outer boundary and the
        // spliced-in hole boundary, so it has more than the 4 corners a
        // plain square would.
        assert!(set.contours()[0].vertices().len() > 4);
    }

    #[test]
    fn simplified_contour_stays_within_max_error_of_raw_vertices() {
        // An L-shaped region (one quadrant carved out) so the boundary has
        // a concave corner, forcing the error-bound search in step 2 to
        // actually do work rather than just keep two extreme corners.
        let field = grid_field(6, 6, |x, z| {
            if x >= 3 && z >= 3 {
                RegionId::NONE
            } else {
                RegionId::from(1)
            }
        });
        let max_error = 0.25f32;
        let set = field
            .build_contours(max_error, 0, BuildContoursFlags::DEFAULT)
            .unwrap();
        assert_eq!(set.len(), 1);

        let contour = &set.contours()[0];
        let simplified = contour.vertices();
        for raw in contour.raw_vertices() {
            let p = Vec2::new(raw.pos.x as f32, raw.pos.z as f32);
            let mut closest = f32::MAX;
            for i in 0..simplified.len() {
                let a = simplified[i].pos;
                let b = simplified[(i + 1) % simplified.len()].pos;
                let d = distance_point_to_segment_sq_2d(
                    p,
                    Vec2::new(a.x as f32, a.z as f32),
                    Vec2::new(b.x as f32, b.z as f32),
                );
                closest = closest.min(d);
            }
            assert!(
                closest <= max_error * max_error + 1e-3,
                "raw vertex {:?} is {} away from the simplified polyline",
                raw.pos,
                closest.sqrt()
            );
        }
    }

    #[test]
    fn simplifying_a_simplified_contour_adds_no_further_vertices() {
        let field = grid_field(6, 6, |x, z| {
            if x >= 3 && z >= 3 {
                RegionId::NONE
            } else {
                RegionId::from(1)
            }
        });
        let max_error = 0.25f32;
        let set = field
            .build_contours(max_error, 0, BuildContoursFlags::DEFAULT)
            .unwrap();
        let once = set.contours()[0].vertices().to_vec();

        let twice = simplify_contour(&once, max_error, 0, BuildContoursFlags::DEFAULT);
        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn contour_set_rejects_mutation() {
        let field = grid_field(2, 2, |_, _| RegionId::from(1));
        let mut set = field
            .build_contours(1.0, 0, BuildContoursFlags::DEFAULT)
            .unwrap();
        assert!(set.try_clear().is_err());
        assert!(
            set.try_remove(0)
                .err()
                .map(|e| e == ContourSetReadOnlyError)
                .unwrap_or(false)
        );
    }

    #[test]
    fn remove_degenerate_segments_drops_duplicate_position() {
        let mut verts = vec![
            ContourVertex::new(0, 0, 0, VertexRegion::NONE),
            ContourVertex::new(0, 0, 0, VertexRegion::NONE),
            ContourVertex::new(1, 0, 0, VertexRegion::NONE),
            ContourVertex::new(1, 0, 1, VertexRegion::NONE),
        ];
        remove_degenerate_segments(&mut verts);
        assert_eq!(verts.len(), 3);
    }

    #[test]
    fn signed_area_is_negative_for_clockwise_winding() {
        let ccw = vec![
            ContourVertex::new(0, 0, 0, VertexRegion::NONE),
            ContourVertex::new(2, 0, 0, VertexRegion::NONE),
            ContourVertex::new(2, 0, 2, VertexRegion::NONE),
            ContourVertex::new(0, 0, 2, VertexRegion::NONE),
        ];
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert!(signed_area_2d(&cw) * signed_area_2d(&ccw) < 0);
    }
}
