//! Gravitational force evaluation
//!
//! Both models use the same softened pairwise law
//!
//! ```text
//! |F| = G m1 m2 / (d^2 + eps^2)
//! ```
//!
//! directed along the separation. `DirectGravity` sums every pair exactly
//! (O(n^2)) and is the reference; `BarnesHutGravity` walks an [`Octree`] and
//! replaces far clusters with their aggregate mass.

use rayon::prelude::*;

use crate::simulation::barnes_hut::Octree;
use crate::simulation::params::Parameters;
use crate::simulation::states::Body;
use crate::simulation::vector::{Vec3, Vec3Ext};

/// Force on a body of mass `mi` at `xi` due to a mass `mj` at `xj`.
/// Coincident points give zero force.
#[allow(non_snake_case)]
#[inline]
pub fn pairwise_force(xi: &Vec3, mi: f64, xj: &Vec3, mj: f64, G: f64, eps: f64) -> Vec3 {
    let r = xj - xi;
    let d2 = r.dot(&r);
    let mag = G * mi * mj / (d2 + eps * eps);
    if !mag.is_finite() {
        return Vec3::zeros();
    }
    r.normalize_or_zero() * mag
}

/// A way of filling `out[i]` with the net force on `bodies[i]`.
///
/// `tree` must have been built over `bodies` this step; models that do not
/// need it ignore it.
pub trait GravityModel {
    fn accumulate_forces(&self, bodies: &[Body], tree: &Octree, out: &mut [Vec3]);
}

/// Exact pairwise gravity (direct n^2 sum)
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct DirectGravity {
    pub G: f64,
    pub eps: f64,
}

impl From<&Parameters> for DirectGravity {
    fn from(p: &Parameters) -> Self {
        Self { G: p.G, eps: p.eps }
    }
}

impl GravityModel for DirectGravity {
    fn accumulate_forces(&self, bodies: &[Body], _tree: &Octree, out: &mut [Vec3]) {
        let n = bodies.len();

        // Each unordered pair once; equal and opposite
        for i in 0..n {
            let bi = &bodies[i];
            for j in (i + 1)..n {
                let bj = &bodies[j];
                let f = pairwise_force(&bi.x, bi.m, &bj.x, bj.m, self.G, self.eps);
                out[i] += f;
                out[j] -= f;
            }
        }
    }
}

/// Gravity evaluated through a Barnes–Hut octree.
///
/// `theta` is the opening threshold: a node of edge `s` whose COM sits at
/// distance `d` from the target is used as a single mass when `s / d < theta`
/// and the target is outside the node's cube. Smaller is more exact;
/// `theta == 0` always descends to the leaves.
#[allow(non_snake_case)]
#[derive(Debug, Clone, Copy)]
pub struct BarnesHutGravity {
    pub G: f64,
    pub eps: f64,
    pub theta: f64,
    pub parallel: bool,
}

impl From<&Parameters> for BarnesHutGravity {
    fn from(p: &Parameters) -> Self {
        Self {
            G: p.G,
            eps: p.eps,
            theta: p.theta,
            parallel: false,
        }
    }
}

impl BarnesHutGravity {
    /// Net force on `bodies[i]` from everything in `tree`
    pub fn force_on_body(&self, tree: &Octree, i: usize, bodies: &[Body]) -> Vec3 {
        let mut visits = 0;
        self.force_on_body_counted(tree, i, bodies, &mut visits)
    }

    /// Same as [`BarnesHutGravity::force_on_body`], also adding the number of
    /// nodes visited to `visits`
    pub fn force_on_body_counted(
        &self,
        tree: &Octree,
        i: usize,
        bodies: &[Body],
        visits: &mut usize,
    ) -> Vec3 {
        let mut f = Vec3::zeros();
        self.traverse(tree, tree.root(), i, bodies, &mut f, visits);
        f
    }

    /// Recursive walk. Depth is bounded by the tree's depth cap.
    fn traverse(
        &self,
        tree: &Octree,
        node_idx: usize,
        target: usize,
        bodies: &[Body],
        acc: &mut Vec3,
        visits: &mut usize,
    ) {
        let node = tree.node(node_idx);
        *visits += 1;

        if node.is_empty() {
            return;
        }

        let b = &bodies[target];

        let Some(children) = node.children else {
            // Leaf: exact interaction with every held body except the target
            for j in tree.leaf_bodies(node_idx) {
                if j == target {
                    continue;
                }
                let bj = &bodies[j];
                *acc += pairwise_force(&b.x, b.m, &bj.x, bj.m, self.G, self.eps);
            }
            return;
        };

        // Internal node: approximate if far enough and not holding the target
        let d = (node.com - b.x).norm();
        if d > 0.0 && node.size / d < self.theta && !node.contains(&b.x) {
            *acc += pairwise_force(&b.x, b.m, &node.com, node.mass, self.G, self.eps);
            return;
        }

        for child in children {
            if !tree.node(child).is_empty() {
                self.traverse(tree, child, target, bodies, acc, visits);
            }
        }
    }

    /// Total node visits for one full force pass. Used to measure how much
    /// work `theta` saves.
    pub fn count_visits(&self, tree: &Octree, bodies: &[Body]) -> usize {
        let mut visits = 0;
        for i in 0..bodies.len() {
            self.force_on_body_counted(tree, i, bodies, &mut visits);
        }
        visits
    }
}

impl GravityModel for BarnesHutGravity {
    fn accumulate_forces(&self, bodies: &[Body], tree: &Octree, out: &mut [Vec3]) {
        // The tree is read-only here, so each body's force is independent
        if self.parallel {
            out.par_iter_mut().enumerate().for_each(|(i, f)| {
                *f += self.force_on_body(tree, i, bodies);
            });
        } else {
            for (i, f) in out.iter_mut().enumerate() {
                *f += self.force_on_body(tree, i, bodies);
            }
        }
    }
}
