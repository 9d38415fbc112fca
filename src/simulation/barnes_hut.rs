//! # Barnes–Hut Octree (3D)
//!
//! Spatial index used to approximate gravity in an `N`-body system. Space
//! is recursively split into 8 octants; each node carries the total mass and
//! center of mass (COM) of everything below it, so a distant cluster can be
//! treated as one pseudo-body by the force evaluator.
//!
//! ## Storage
//!
//! Nodes live in a flat arena (`Vec<OctreeNode>`) and refer to their children
//! by index. The tree is thrown away and rebuilt every step: `clear` empties the
//! arena but keeps its allocation, so a steady-state run does not allocate.
//! Bodies are referenced by their index into the caller's body slice; the tree
//! never owns them.
//!
//! ## Insertion
//!
//! - empty leaf: the body is stored directly
//! - occupied leaf: the leaf splits into 8 children, the held body moves to its
//!   octant and the new body keeps descending
//! - internal node: the body is routed by comparing coordinates against the
//!   node center (`>=` goes to the upper half on each axis)
//!
//! Mass and COM are folded in on every node visited, so there is no separate
//! bottom-up pass.
//!
//! Two bodies at (almost) the same point would split forever. Once a leaf is at
//! `max_depth` it stops splitting and chains further bodies into the same leaf,
//! which then behaves as one aggregate.

use crate::simulation::states::Body;
use crate::simulation::vector::Vec3;

/// Depth at which leaves stop subdividing. 2^-32 of the root edge is far below
/// any separation the softening length lets matter.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Root cube edge = extent of the bodies * this factor
pub const BOUNDS_PADDING: f64 = 1.2;

/// Smallest root cube edge, so a collapsed particle set still gets a usable tree
pub const MIN_ROOT_SIZE: f64 = 100.0;

/// A cubic region of space in the octree.
///
/// A node is exactly one of:
/// - empty leaf (`children == None`, `body == None`, `mass == 0`)
/// - occupied leaf (`children == None`, `body == Some(i)`); more than one body
///   only when the leaf sits at the depth cap
/// - internal node (`children == Some(..)`, `body == None`)
#[derive(Debug, Clone)]
pub struct OctreeNode {
    pub center: Vec3,
    pub size: f64, // cube edge length
    pub mass: f64,
    pub com: Vec3,
    pub children: Option<[usize; 8]>, // indices into Octree::nodes
    pub body: Option<usize>,          // first body held by this leaf
    pub depth: usize,
}

impl OctreeNode {
    fn empty(center: Vec3, size: f64, depth: usize) -> Self {
        Self {
            center,
            size,
            mass: 0.0,
            com: Vec3::zeros(),
            children: None,
            body: None,
            depth,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.mass == 0.0
    }

    /// Whether `p` lies inside this node's cube (faces included)
    pub fn contains(&self, p: &Vec3) -> bool {
        let half = 0.5 * self.size;
        let d = p - self.center;
        d.x.abs() <= half && d.y.abs() <= half && d.z.abs() <= half
    }

    /// Fold one more point mass into the running mass / COM
    fn add_mass(&mut self, x: &Vec3, m: f64) {
        let total = self.mass + m;
        if total > 0.0 {
            self.com = (self.com * self.mass + x * m) / total;
        }
        self.mass = total;
    }
}

/// Arena-backed octree over a slice of bodies.
#[derive(Debug, Clone)]
pub struct Octree {
    nodes: Vec<OctreeNode>,
    next: Vec<Option<usize>>, // next[i]: body chained after body i in a capped leaf
    root: usize,
    max_depth: usize,
    depth: usize, // deepest level created since the last clear
}

impl Default for Octree {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Octree {
    /// An octree with an empty zero-size root. Call [`Octree::clear`] (or
    /// [`Octree::rebuild`]) before inserting.
    pub fn new(max_depth: usize) -> Self {
        Self {
            nodes: vec![OctreeNode::empty(Vec3::zeros(), 0.0, 0)],
            next: Vec::new(),
            root: 0,
            max_depth,
            depth: 0,
        }
    }

    /// Build a tree over all of `bodies`, sized by [`bounding_cube`]
    pub fn build(bodies: &[Body]) -> Self {
        let mut tree = Self::default();
        tree.rebuild(bodies);
        tree
    }

    /// Discard every node and start over with an empty root cube of edge
    /// `size` centered at `center`.
    pub fn clear(&mut self, size: f64, center: Vec3) {
        self.nodes.clear();
        self.next.clear();
        self.nodes.push(OctreeNode::empty(center, size, 0));
        self.root = 0;
        self.depth = 0;
    }

    /// Clear to the padded bounding cube of `bodies` and insert all of them
    pub fn rebuild(&mut self, bodies: &[Body]) {
        let (center, size) = bounding_cube(bodies, BOUNDS_PADDING, MIN_ROOT_SIZE);
        self.clear(size, center);
        self.next.resize(bodies.len(), None);
        for i in 0..bodies.len() {
            self.insert(i, bodies);
        }
    }

    /// Insert body `body_idx` of `bodies`.
    ///
    /// The body must lie inside the root cube; the driver's padded bounding
    /// cube is what guarantees that.
    pub fn insert(&mut self, body_idx: usize, bodies: &[Body]) {
        let pos = bodies[body_idx].x;
        let m = bodies[body_idx].m;

        debug_assert!(
            self.nodes[self.root].contains(&pos),
            "body {body_idx} at {pos:?} is outside the root cube"
        );

        if self.next.len() <= body_idx {
            self.next.resize(body_idx + 1, None);
        }
        self.next[body_idx] = None;

        let mut node_idx = self.root;
        loop {
            self.nodes[node_idx].add_mass(&pos, m);

            // Internal: keep descending
            if let Some(children) = self.nodes[node_idx].children {
                node_idx = children[octant(&self.nodes[node_idx].center, &pos)];
                continue;
            }

            let held = match self.nodes[node_idx].body {
                // Empty leaf: take it
                None => {
                    self.nodes[node_idx].body = Some(body_idx);
                    return;
                }
                Some(held) => held,
            };

            // Occupied leaf at the cap: chain instead of splitting
            if self.nodes[node_idx].depth >= self.max_depth {
                self.next[body_idx] = Some(held);
                self.nodes[node_idx].body = Some(body_idx);
                return;
            }

            // Occupied leaf: split, push the held body one level down, carry on
            let center = self.nodes[node_idx].center;
            let children = self.subdivide(node_idx);
            self.nodes[node_idx].body = None;

            let held_body = &bodies[held];
            let held_child = children[octant(&center, &held_body.x)];
            self.nodes[held_child].add_mass(&held_body.x, held_body.m);
            self.nodes[held_child].body = Some(held);

            node_idx = children[octant(&center, &pos)];
        }
    }

    /// Split a leaf into 8 empty octants and return their indices.
    ///
    /// Child `k` uses bit 0 for x, bit 1 for y, bit 2 for z; a set bit means
    /// the upper half on that axis, matching [`octant`].
    fn subdivide(&mut self, node_idx: usize) -> [usize; 8] {
        let parent = &self.nodes[node_idx];
        let center = parent.center;
        let quarter = 0.25 * parent.size;
        let half_size = 0.5 * parent.size;
        let depth = parent.depth + 1;

        let mut children = [0usize; 8];
        for (k, child) in children.iter_mut().enumerate() {
            let offset = Vec3::new(
                if k & 1 == 0 { -quarter } else { quarter },
                if k & 2 == 0 { -quarter } else { quarter },
                if k & 4 == 0 { -quarter } else { quarter },
            );
            *child = self.nodes.len();
            self.nodes.push(OctreeNode::empty(center + offset, half_size, depth));
        }

        self.nodes[node_idx].children = Some(children);
        self.depth = self.depth.max(depth);
        children
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn root_node(&self) -> &OctreeNode {
        &self.nodes[self.root]
    }

    pub fn node(&self, idx: usize) -> &OctreeNode {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[self.root].is_empty()
    }

    /// Deepest level created since the last clear (root is 0)
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Bodies held directly by node `idx` (empty for internal nodes)
    pub fn leaf_bodies(&self, idx: usize) -> LeafBodies<'_> {
        LeafBodies {
            next: &self.next,
            cur: self.nodes[idx].body,
        }
    }
}

/// Iterator over the body chain of one leaf
pub struct LeafBodies<'a> {
    next: &'a [Option<usize>],
    cur: Option<usize>,
}

impl Iterator for LeafBodies<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let i = self.cur?;
        self.cur = self.next.get(i).copied().flatten();
        Some(i)
    }
}

/// Octant of `p` relative to `center`: bit 0 x, bit 1 y, bit 2 z
fn octant(center: &Vec3, p: &Vec3) -> usize {
    let mut idx = 0;
    if p.x >= center.x {
        idx |= 1;
    }
    if p.y >= center.y {
        idx |= 2;
    }
    if p.z >= center.z {
        idx |= 4;
    }
    idx
}

/// Axis-aligned cube enclosing every body position.
///
/// The largest extent over x/y/z is scaled by `padding` and clamped below by
/// `min_size`. Returns `(center, edge)`. An empty slice gives a `min_size`
/// cube at the origin.
pub fn bounding_cube(bodies: &[Body], padding: f64, min_size: f64) -> (Vec3, f64) {
    if bodies.is_empty() {
        return (Vec3::zeros(), min_size);
    }

    let mut min = Vec3::repeat(f64::INFINITY);
    let mut max = Vec3::repeat(f64::NEG_INFINITY);
    for b in bodies {
        min = min.inf(&b.x);
        max = max.sup(&b.x);
    }

    let center = (min + max) * 0.5;
    let extent = (max - min).max();
    let size = (extent * padding).max(min_size);
    (center, size)
}
