//! Core state types for the N-body simulation.
//!
//! - `Body`       physical state of one particle
//! - `System`     ordered particle set plus the current simulation time `t`
//! - `Appearance` render-only attributes, kept in a table parallel to `System::bodies`

use std::sync::atomic::{AtomicU64, Ordering};

use crate::simulation::vector::Vec3;

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct Body {
    pub id: u64, // process-unique, debug only
    pub m: f64,  // mass
    pub x: Vec3, // position
    pub v: Vec3, // velocity
    pub a: Vec3, // acceleration from the last step
    pub f: Vec3, // accumulated force
}

impl Body {
    pub fn new(m: f64, x: Vec3, v: Vec3) -> Self {
        Self {
            id: NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed),
            m,
            x,
            v,
            a: Vec3::zeros(),
            f: Vec3::zeros(),
        }
    }

    /// Linear momentum `m * v`
    pub fn momentum(&self) -> Vec3 {
        self.v * self.m
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>, // particle set, fixed for a run
    pub t: f64,            // time
}

impl System {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies, t: 0.0 }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Per-particle render attributes. Index `i` belongs to `System::bodies[i]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub color: [f32; 3], // linear rgb 0..1
    pub size: f32,       // point size in screen units
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            size: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Body::new(1.0, Vec3::zeros(), Vec3::zeros());
        let b = Body::new(1.0, Vec3::zeros(), Vec3::zeros());
        assert_ne!(a.id, b.id);
    }
}
