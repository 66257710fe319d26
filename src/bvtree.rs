//! Bounding-volume tree construction over a flat polygon list, for fast
//! spatial queries against a finished navigation mesh.

use glam::{U16Vec3, Vec3};

use crate::math::Aabb3d;

/// Sentinel marking an unused vertex slot in a polygon's index list, matching
/// the convention used by fixed-width `nvp`-stride polygon mesh buffers
/// throughout this pipeline.
pub const NULL_INDEX: u16 = u16::MAX;

/// A single node of a [`BvTree`], stored in preorder depth-first order.
///
/// `index` is either the index of a leaf's polygon (`>= 0`) or, for an
/// internal node, the negated number of array slots to skip to reach this
/// node's next sibling (`< 0`). A branchless traversal that wants to skip a
/// subtree simply adds `-index` to its cursor instead of following children
/// pointers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvNode {
    /// The bounding box of this node (the union of its subtree's polygons).
    pub aabb: Aabb3d,
    /// Polygon index if `>= 0`, negated escape offset if `< 0`.
    pub index: i32,
}

impl BvNode {
    /// Whether this node is a leaf pointing directly at a polygon.
    pub fn is_leaf(&self) -> bool {
        self.index >= 0
    }

    /// The escape offset: how many array slots to advance to skip this
    /// node's entire subtree. `1` for a leaf (just itself).
    pub fn escape_offset(&self) -> i32 {
        if self.index < 0 { -self.index } else { 1 }
    }
}

/// A bounding-volume tree over a flat polygon list, stored as a flat preorder
/// array for branchless traversal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BvTree {
    nodes: Vec<BvNode>,
}

impl BvTree {
    /// The nodes of this tree, in preorder.
    pub fn nodes(&self) -> &[BvNode] {
        &self.nodes
    }

    /// The number of nodes in this tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether this tree has no nodes (built from an empty polygon list).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Builds a tree over `polys`, a list of polygons each given as up to
    /// `nvp` indices into `verts`, terminated early by [`NULL_INDEX`] for
    /// polygons with fewer than `nvp` vertices.
    ///
    /// `verts` are in the mesh's quantized local grid space: x/z in
    /// `cell_size` units, y in `cell_height` units, matching the upstream
    /// polygon mesh this tree is built over. Each polygon's x/z bounds are a
    /// plain component-wise min/max of its vertices; its y bounds are
    /// rescaled by `cell_height / cell_size` and rounded outward
    /// (`floor`/`ceil`) so that a y-extent measured in height units is
    /// comparable to an x/z extent measured in cell-size units when an
    /// internal node later picks its longest axis.
    pub fn build(
        verts: &[U16Vec3],
        polys: &[Vec<u16>],
        nvp: usize,
        cell_size: f32,
        cell_height: f32,
    ) -> Self {
        if polys.is_empty() {
            return Self::default();
        }

        let scale = cell_height / cell_size;
        let mut items: Vec<BvItem> = polys
            .iter()
            .enumerate()
            .map(|(poly_index, poly)| {
                let mut bounds: Option<(U16Vec3, U16Vec3)> = None;
                for &vertex_index in poly.iter().take(nvp) {
                    if vertex_index == NULL_INDEX {
                        break;
                    }
                    let v = verts[vertex_index as usize];
                    bounds = Some(match bounds {
                        Some((min, max)) => (min.min(v), max.max(v)),
                        None => (v, v),
                    });
                }
                let (min, max) = bounds.unwrap_or_default();
                let y_min = (min.y as f32 * scale).floor();
                let y_max = (max.y as f32 * scale).ceil();
                BvItem {
                    aabb: Aabb3d {
                        min: Vec3::new(min.x as f32, y_min, min.z as f32),
                        max: Vec3::new(max.x as f32, y_max, max.z as f32),
                    },
                    poly_index: poly_index as i32,
                }
            })
            .collect();

        let mut nodes = Vec::with_capacity(items.len() * 2);
        subdivide(&mut items, &mut nodes);
        Self { nodes }
    }
}

struct BvItem {
    aabb: Aabb3d,
    poly_index: i32,
}

/// Recursively partitions `items` by the longest axis of their combined
/// bounds, splitting at the median, and appends the resulting subtree to
/// `nodes` in preorder: this node first, then its left subtree, then its
/// right subtree.
fn subdivide(items: &mut [BvItem], nodes: &mut Vec<BvNode>) {
    if items.len() == 1 {
        nodes.push(BvNode {
            aabb: items[0].aabb,
            index: items[0].poly_index,
        });
        return;
    }

    let bounds = items
        .iter()
        .skip(1)
        .fold(items[0].aabb, |acc, item| acc.union(&item.aabb));
    let axis = longest_axis(&bounds);
    items.sort_by(|a, b| {
        axis_min(&a.aabb, axis)
            .partial_cmp(&axis_min(&b.aabb, axis))
            .expect("bounding box bounds are always finite")
    });

    let split = items.len() / 2;
    let node_index = nodes.len();
    nodes.push(BvNode { aabb: bounds, index: 0 });

    let (left, right) = items.split_at_mut(split);
    subdivide(left, nodes);
    let escape = (nodes.len() - node_index) as i32;
    subdivide(right, nodes);

    nodes[node_index].index = -escape;
}

/// The axis (0 = x, 1 = y, 2 = z) along which `aabb` is longest. Ties favor
/// the lower-indexed axis.
fn longest_axis(aabb: &Aabb3d) -> usize {
    let extent = aabb.extent();
    let mut axis = 0;
    let mut max_len = extent.x;
    if extent.y > max_len {
        axis = 1;
        max_len = extent.y;
    }
    if extent.z > max_len {
        axis = 2;
    }
    axis
}

fn axis_min(aabb: &Aabb3d, axis: usize) -> f32 {
    match axis {
        0 => aabb.min.x,
        1 => aabb.min.y,
        _ => aabb.min.z,
    }
}
