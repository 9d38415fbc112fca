//! Conservation diagnostics over a particle set
//!
//! None of these feed back into the simulation; they exist for reporting
//! and for checking that the force pass neither leaks nor duplicates force.

use crate::simulation::forces::pairwise_force;
use crate::simulation::states::Body;
use crate::simulation::vector::Vec3;

pub fn total_mass(bodies: &[Body]) -> f64 {
    bodies.iter().map(|b| b.m).sum()
}

/// Vector sum of `m v`
pub fn total_momentum(bodies: &[Body]) -> Vec3 {
    bodies.iter().fold(Vec3::zeros(), |p, b| p + b.momentum())
}

/// Sum of `|m v|`, the scale against which momentum drift is judged
pub fn momentum_scale(bodies: &[Body]) -> f64 {
    bodies.iter().map(|b| b.momentum().norm()).sum()
}

/// Mass-weighted mean position, zero for an empty or massless set
pub fn center_of_mass(bodies: &[Body]) -> Vec3 {
    let m = total_mass(bodies);
    if m <= 0.0 {
        return Vec3::zeros();
    }
    bodies.iter().fold(Vec3::zeros(), |c, b| c + b.x * b.m) / m
}

pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(|b| 0.5 * b.m * b.v.norm_squared()).sum()
}

/// Potential energy of the softened law `|F| = G m1 m2 / (d^2 + eps^2)`.
///
/// Integrating that force gives `-G m1 m2 / eps * (pi/2 - atan(d / eps))`,
/// which reduces to `-G m1 m2 / d` when `eps == 0`. Direct O(n^2) sum.
#[allow(non_snake_case)]
pub fn potential_energy(bodies: &[Body], G: f64, eps: f64) -> f64 {
    let mut u = 0.0;
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let d = (bodies[j].x - bodies[i].x).norm();
            let gm = G * bodies[i].m * bodies[j].m;
            u -= if eps > 0.0 {
                gm / eps * (std::f64::consts::FRAC_PI_2 - (d / eps).atan())
            } else if d > 0.0 {
                gm / d
            } else {
                0.0
            };
        }
    }
    u
}

/// Summed per-body force error of `approx`, relative to the summed force
/// magnitude of `reference`
pub fn relative_force_error(approx: &[Vec3], reference: &[Vec3]) -> f64 {
    let err: f64 = approx.iter().zip(reference).map(|(a, r)| (a - r).norm()).sum();
    let scale: f64 = reference.iter().map(|r| r.norm()).sum();
    if scale > 0.0 { err / scale } else { err }
}

/// Net force a body feels from every other body, exact. Used as a check on
/// the tree walk for a single target.
#[allow(non_snake_case)]
pub fn direct_force_on(bodies: &[Body], i: usize, G: f64, eps: f64) -> Vec3 {
    let bi = &bodies[i];
    bodies
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .fold(Vec3::zeros(), |f, (_, bj)| f + pairwise_force(&bi.x, bi.m, &bj.x, bj.m, G, eps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_and_com() {
        let bodies = vec![
            Body::new(1.0, Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            Body::new(3.0, Vec3::new(4.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
        ];
        assert_eq!(total_momentum(&bodies), Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(center_of_mass(&bodies), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(kinetic_energy(&bodies), 2.0);
        assert_eq!(momentum_scale(&bodies), 4.0);
    }

    #[test]
    fn unsoftened_potential() {
        let bodies = vec![
            Body::new(2.0, Vec3::zeros(), Vec3::zeros()),
            Body::new(3.0, Vec3::new(0.0, 2.0, 0.0), Vec3::zeros()),
        ];
        assert!((potential_energy(&bodies, 1.0, 0.0) + 3.0).abs() < 1e-12);
        // softening makes the well shallower
        assert!(potential_energy(&bodies, 1.0, 0.5) > -3.0);
    }
}
