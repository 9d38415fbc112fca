//! 3D vector type used throughout the simulation
//!
//! `Vec3` is nalgebra's `Vector3<f64>`; arithmetic (add, sub, scale, dot,
//! cross, norm) comes from nalgebra. `Vec3Ext` adds the two operations the
//! galaxy generator and force law need that nalgebra does not give us in
//! the shape we want.

use nalgebra::{Rotation3, Unit, Vector3};

pub type Vec3 = Vector3<f64>;

pub trait Vec3Ext {
    /// Unit vector in the same direction, or the zero vector if `self` has no length
    fn normalize_or_zero(&self) -> Vec3;

    /// Rotate about `axis` by `angle` radians. A zero axis leaves the vector as is
    fn rotated(&self, axis: &Vec3, angle: f64) -> Vec3;
}

impl Vec3Ext for Vec3 {
    fn normalize_or_zero(&self) -> Vec3 {
        // try_normalize returns None when norm <= 0
        self.try_normalize(0.0).unwrap_or_else(Vec3::zeros)
    }

    fn rotated(&self, axis: &Vec3, angle: f64) -> Vec3 {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::zeros() || angle == 0.0 {
            return *self;
        }
        let rot = Rotation3::from_axis_angle(&Unit::new_unchecked(axis), angle);
        rot * *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn normalize_zero_is_zero() {
        let n = Vec3::zeros().normalize_or_zero();
        assert_eq!(n, Vec3::zeros());
        assert!(n.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn normalize_has_unit_length() {
        let n = Vec3::new(3.0, -4.0, 12.0).normalize_or_zero();
        assert!((n.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_x_about_z() {
        let r = Vec3::x().rotated(&Vec3::z(), FRAC_PI_2);
        assert!((r - Vec3::y()).norm() < 1e-12);
    }

    #[test]
    fn rotate_about_zero_axis_is_identity() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.rotated(&Vec3::zeros(), 1.3), v);
    }
}
