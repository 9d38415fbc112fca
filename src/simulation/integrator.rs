//! Fixed-step time integration
//!
//! Semi-implicit (symplectic) Euler: velocity first from the accumulated
//! force, then position from the new velocity. One force evaluation per step.

use super::states::System;

/// Advance every body by one step `dt` using the forces already stored in
/// `Body::f`, and advance `sys.t`.
///
/// ```text
/// a_n     = f_n / m
/// v_n+1   = v_n + dt a_n
/// x_n+1   = x_n + dt v_n+1
/// ```
pub fn symplectic_euler(sys: &mut System, dt: f64) {
    for b in sys.bodies.iter_mut() {
        b.a = b.f / b.m;
        b.v += b.a * dt;
        b.x += b.v * dt;
    }
    sys.t += dt;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::states::Body;
    use crate::simulation::vector::Vec3;

    #[test]
    fn kick_then_drift() {
        let mut b = Body::new(2.0, Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));
        b.f = Vec3::new(0.0, 4.0, 0.0);
        let mut sys = System::new(vec![b]);

        symplectic_euler(&mut sys, 0.5);

        let b = &sys.bodies[0];
        assert_eq!(b.a, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(b.v, Vec3::new(1.0, 1.0, 0.0));
        // position uses the updated velocity
        assert_eq!(b.x, Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(sys.t, 0.5);
    }
}
