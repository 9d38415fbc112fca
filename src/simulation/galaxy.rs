//! Procedural spiral galaxies
//!
//! A galaxy is a thin rotating disk. Each particle gets:
//! - radius `r = R u^2` (u uniform), so the disk is dense in the middle
//! - angle on a logarithmic-ish arm: `arm_offset + tightness * r + jitter`
//! - a small height above/below the plane
//! - the circular-orbit speed for the mass enclosed inside `r`, tangential
//!
//! The disk is built around +Z and then tilted onto the requested plane
//! normal. Bulk velocity and center offset are applied last.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::simulation::states::{Appearance, Body};
use crate::simulation::vector::{Vec3, Vec3Ext};

/// Half-width of the random angular scatter around an arm, radians
const ARM_JITTER: f64 = 0.3;

/// Colour ramps, core colour blending to edge colour with distance
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorTheme {
    #[default]
    Azure,
    Ember,
    Violet,
    Jade,
}

impl ColorTheme {
    fn ramp(self) -> ([f32; 3], [f32; 3]) {
        match self {
            ColorTheme::Azure => ([0.95, 0.97, 1.0], [0.2, 0.45, 1.0]),
            ColorTheme::Ember => ([1.0, 0.95, 0.8], [1.0, 0.35, 0.1]),
            ColorTheme::Violet => ([1.0, 0.9, 1.0], [0.55, 0.2, 0.9]),
            ColorTheme::Jade => ([0.9, 1.0, 0.95], [0.1, 0.8, 0.5]),
        }
    }

    /// Colour at normalised radius `t` in 0..=1
    pub fn color_at(self, t: f64) -> [f32; 3] {
        let t = t.clamp(0.0, 1.0) as f32;
        let (core, edge) = self.ramp();
        std::array::from_fn(|k| core[k] * (1.0 - t) + edge[k] * t)
    }
}

/// Shape and motion of one generated galaxy
#[derive(Debug, Clone)]
pub struct Galaxy {
    pub center: Vec3,
    pub velocity: Vec3,        // bulk velocity added to every particle
    pub count: usize,          // disk particles (core body not included)
    pub radius: f64,
    pub plane_normal: Vec3,
    pub velocity_scale: f64,   // 1.0 = circular orbits
    pub particle_mass: f64,
    pub core_mass: f64,        // 0 = no central body
    pub spiral_tightness: f64, // radians of arm winding per unit distance
    pub arm_count: usize,
    pub thickness: f64,        // disk height as a fraction of radius
    pub color_theme: ColorTheme,
}

impl Default for Galaxy {
    fn default() -> Self {
        Self {
            center: Vec3::zeros(),
            velocity: Vec3::zeros(),
            count: 100,
            radius: 40.0,
            plane_normal: Vec3::z(),
            velocity_scale: 1.0,
            particle_mass: 1.0,
            core_mass: 0.0,
            spiral_tightness: 0.1,
            arm_count: 2,
            thickness: 0.05,
            color_theme: ColorTheme::Azure,
        }
    }
}

/// Generate the bodies of `galaxy` and their render attributes.
///
/// `G` is needed for the orbital speeds. If `core_mass > 0` the first body
/// returned is the core.
#[allow(non_snake_case)]
pub fn generate_spiral_galaxy<R: Rng>(galaxy: &Galaxy, G: f64, rng: &mut R) -> (Vec<Body>, Vec<Appearance>) {
    let with_core = galaxy.core_mass > 0.0;
    let total = galaxy.count + usize::from(with_core);
    let mut bodies = Vec::with_capacity(total);
    let mut appearance = Vec::with_capacity(total);

    let (axis, tilt) = plane_rotation(&galaxy.plane_normal);
    let disk_mass = galaxy.particle_mass * galaxy.count as f64;
    let arms = galaxy.arm_count.max(1);

    if with_core {
        bodies.push(Body::new(galaxy.core_mass, galaxy.center, galaxy.velocity));
        appearance.push(Appearance {
            color: galaxy.color_theme.color_at(0.0),
            size: 3.0,
        });
    }

    for i in 0..galaxy.count {
        let u: f64 = rng.random();
        let dist = galaxy.radius * u * u;

        let arm_offset = TAU * (i % arms) as f64 / arms as f64;
        let jitter = rng.random_range(-ARM_JITTER..ARM_JITTER);
        let angle = arm_offset + galaxy.spiral_tightness * dist + jitter;
        let (sin, cos) = angle.sin_cos();

        let height = (rng.random::<f64>() - 0.5) * galaxy.thickness * galaxy.radius;
        let local_x = Vec3::new(dist * cos, dist * sin, height);

        // Enclosed disk mass follows the CDF of r = R u^2, i.e. sqrt(r / R)
        let enclosed = galaxy.core_mass + disk_mass * (dist / galaxy.radius).sqrt();
        let speed = if dist > 0.0 {
            (G * enclosed / dist).sqrt() * galaxy.velocity_scale
        } else {
            0.0
        };
        let local_v = Vec3::new(-sin, cos, 0.0) * speed;

        let x = galaxy.center + local_x.rotated(&axis, tilt);
        let v = galaxy.velocity + local_v.rotated(&axis, tilt);
        bodies.push(Body::new(galaxy.particle_mass, x, v));

        let t = dist / galaxy.radius;
        appearance.push(Appearance {
            color: galaxy.color_theme.color_at(t),
            size: (1.5 - t) as f32,
        });
    }

    (bodies, appearance)
}

/// Generate several galaxies from one seeded stream, concatenated in order
#[allow(non_snake_case)]
pub fn generate_galaxies(galaxies: &[Galaxy], G: f64, seed: u64) -> (Vec<Body>, Vec<Appearance>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bodies = Vec::new();
    let mut appearance = Vec::new();
    for galaxy in galaxies {
        let (b, a) = generate_spiral_galaxy(galaxy, G, &mut rng);
        bodies.extend(b);
        appearance.extend(a);
    }
    (bodies, appearance)
}

/// Axis and angle that carry +Z onto `normal`.
///
/// Parallel normals give a zero axis (no rotation); an antiparallel normal
/// flips the disk about X.
pub fn plane_rotation(normal: &Vec3) -> (Vec3, f64) {
    let n = normal.normalize_or_zero();
    if n == Vec3::zeros() {
        return (Vec3::zeros(), 0.0);
    }
    let z = Vec3::z();
    let axis = z.cross(&n).normalize_or_zero();
    let angle = z.dot(&n).clamp(-1.0, 1.0).acos();
    if axis == Vec3::zeros() && angle > FRAC_PI_2 {
        return (Vec3::x(), PI);
    }
    (axis, angle)
}
