//! Numerical and physical parameters for the simulation
//!
//! `Parameters` is owned by the `Simulation` and may be changed between
//! steps (theta, dt) without rebuilding the particle set.

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub G: f64,             // gravitational constant
    pub theta: f64,         // Barnes–Hut opening threshold
    pub eps: f64,           // softening length
    pub dt: f64,            // fixed step size
    pub trail_falloff: f64, // renderer trail fade per frame, passed through
    pub seed: u64,          // deterministic seed for galaxy generation
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            G: 0.5,
            theta: 0.5,
            eps: 1.0,
            dt: 0.1,
            trail_falloff: 0.1,
            seed: 42,
        }
    }
}
