#![allow(non_snake_case)]

use bhgalaxy::simulation::diagnostics::{
    direct_force_on, momentum_scale, relative_force_error, total_mass, total_momentum,
};
use bhgalaxy::{
    BarnesHutGravity, Body, DirectGravity, Engine, Galaxy, GravityModel, Octree, Parameters,
    Simulation, Vec3, Vec3Ext,
};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::f64::consts::TAU;

/// `n` unit-ish masses scattered uniformly in a cube of half-width `half`
pub fn random_bodies(n: usize, half: f64, seed: u64) -> Vec<Body> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = Vec3::new(
                rng.random_range(-half..half),
                rng.random_range(-half..half),
                rng.random_range(-half..half),
            );
            let m = rng.random_range(0.5..2.0);
            Body::new(m, x, Vec3::zeros())
        })
        .collect()
}

/// Default physics parameters for tests
pub fn test_params() -> Parameters {
    Parameters {
        G: 1.0,
        theta: 0.5,
        eps: 1.0,
        dt: 0.1,
        trail_falloff: 0.0,
        seed: 42,
    }
}

fn all_forces(model: &impl GravityModel, bodies: &[Body], tree: &Octree) -> Vec<Vec3> {
    let mut out = vec![Vec3::zeros(); bodies.len()];
    model.accumulate_forces(bodies, tree, &mut out);
    out
}

// ==================================================================================
// Octree tests
// ==================================================================================

#[test]
fn root_mass_is_sum_of_inserted_masses() {
    let bodies = random_bodies(500, 80.0, 1);

    let mut tree = Octree::default();
    tree.clear(200.0, Vec3::zeros());
    for i in 0..bodies.len() {
        tree.insert(i, &bodies);
    }

    let expected = total_mass(&bodies);
    assert!((tree.root_node().mass - expected).abs() < 1e-9 * expected);

    // Every body ends up in exactly one leaf
    let mut seen = vec![0usize; bodies.len()];
    let mut leaf_mass = 0.0;
    for (idx, node) in tree.nodes().iter().enumerate() {
        if node.is_leaf() {
            for j in tree.leaf_bodies(idx) {
                seen[j] += 1;
                leaf_mass += bodies[j].m;
            }
        }
    }
    assert!(seen.iter().all(|&c| c == 1));
    assert!((leaf_mass - expected).abs() < 1e-9 * expected);

    // Internal nodes carry the aggregate of their children
    for node in tree.nodes() {
        if let Some(children) = node.children {
            let child_mass: f64 = children.iter().map(|&c| tree.node(c).mass).sum();
            assert!((node.mass - child_mass).abs() < 1e-9 * node.mass.max(1.0));
        }
    }
}

#[test]
fn coincident_bodies_do_not_blow_up() {
    let bodies: Vec<Body> = (0..10).map(|_| Body::new(1.0, Vec3::new(5.0, 5.0, 5.0), Vec3::zeros())).collect();
    let mut sim = Simulation::new(Engine::default(), test_params());
    sim.initialize(bodies, Vec::new());
    sim.run(3);

    assert!(sim.tree().depth() <= sim.tree().max_depth());
    assert!((sim.tree().root_node().mass - 10.0).abs() < 1e-12);
    for b in sim.bodies() {
        assert!(b.x.iter().chain(b.v.iter()).all(|c| c.is_finite()));
    }
}

// ==================================================================================
// Barnes-Hut force tests
// ==================================================================================

#[test]
fn small_theta_matches_analytic_pair_force() {
    let (ma, mb) = (3.0, 7.0);
    let bodies = vec![
        Body::new(ma, Vec3::new(-10.0, 2.0, 1.0), Vec3::zeros()),
        Body::new(mb, Vec3::new(15.0, -4.0, 6.0), Vec3::zeros()),
    ];
    let G: f64 = 0.5;
    let tree = Octree::build(&bodies);
    let bh = BarnesHutGravity { G, eps: 0.0, theta: 1e-6, parallel: false };

    let f = bh.force_on_body(&tree, 0, &bodies);

    let r = bodies[1].x - bodies[0].x;
    let expected = r.normalize_or_zero() * (G * ma * mb / r.norm_squared());
    assert!((f - expected).norm() < 1e-12 * expected.norm());
}

#[test]
fn small_theta_matches_direct_sum() {
    let bodies = random_bodies(200, 50.0, 2);
    let tree = Octree::build(&bodies);
    let bh = BarnesHutGravity { G: 1.0, eps: 0.5, theta: 1e-6, parallel: false };

    for i in (0..bodies.len()).step_by(17) {
        let f = bh.force_on_body(&tree, i, &bodies);
        let exact = direct_force_on(&bodies, i, 1.0, 0.5);
        assert!((f - exact).norm() <= 1e-9 * exact.norm().max(1e-12));
    }
}

#[test]
fn larger_theta_means_less_work_and_bounded_error() {
    let bodies = random_bodies(800, 100.0, 3);
    let tree = Octree::build(&bodies);
    let params = test_params();
    let exact = all_forces(&DirectGravity::from(&params), &bodies, &tree);

    let thetas = [0.01, 0.1, 0.3, 0.5, 0.7, 1.0];
    let mut visits = Vec::new();
    for theta in thetas {
        let bh = BarnesHutGravity { theta, ..BarnesHutGravity::from(&params) };
        visits.push(bh.count_visits(&tree, &bodies));

        let approx = all_forces(&bh, &bodies, &tree);
        let err = relative_force_error(&approx, &exact);
        assert!(err.is_finite());
        assert!(err < 0.2, "theta = {theta}: relative error {err}");
    }

    for w in visits.windows(2) {
        assert!(w[1] <= w[0], "visits went up: {visits:?}");
    }
    assert!(visits[visits.len() - 1] < visits[0] / 2, "theta saved too little: {visits:?}");
}

// ==================================================================================
// Integrator / driver tests
// ==================================================================================

#[test]
fn free_body_moves_in_a_straight_line() {
    let x0 = Vec3::new(1.0, -2.0, 3.0);
    let v0 = Vec3::new(0.5, 0.25, -1.0);
    let params = test_params();
    let n = 250;

    let mut sim = Simulation::new(Engine::default(), params.clone());
    sim.initialize(vec![Body::new(2.0, x0, v0)], Vec::new());
    assert_eq!(sim.run(n), n);

    let b = &sim.bodies()[0];
    assert_eq!(b.v, v0);
    assert_eq!(b.f, Vec3::zeros());
    let expected = x0 + v0 * (n as f64 * params.dt);
    assert!((b.x - expected).norm() < 1e-9);
}

#[test]
fn normalize_zero_vector_is_zero() {
    let n = Vec3::zeros().normalize_or_zero();
    assert_eq!(n, Vec3::zeros());
    assert!(!n.x.is_nan() && !n.y.is_nan() && !n.z.is_nan());
}

#[test]
fn two_galaxy_collision_conserves_momentum() {
    let params = Parameters {
        G: 0.5,
        theta: 1e-3,
        eps: 1.0,
        dt: 0.1,
        ..test_params()
    };
    let galaxies = [
        Galaxy { center: Vec3::new(-50.0, 0.0, 0.0), count: 100, ..Default::default() },
        Galaxy { center: Vec3::new(50.0, 0.0, 0.0), count: 100, ..Default::default() },
    ];

    let mut sim = Simulation::new(Engine::default(), params);
    sim.initialize_collision(&galaxies);
    assert_eq!(sim.bodies().len(), 200);

    let p0 = total_momentum(sim.bodies());
    let scale0 = momentum_scale(sim.bodies());

    assert_eq!(sim.run(1000), 1000);

    let p1 = total_momentum(sim.bodies());
    let scale = scale0.max(momentum_scale(sim.bodies()));
    assert!((p1 - p0).norm() < 1e-8 * scale, "momentum drifted from {p0:?} to {p1:?}");
}

#[test]
fn two_galaxy_collision_momentum_drift_is_bounded_at_default_theta() {
    let params = Parameters { G: 0.5, theta: 0.5, eps: 1.0, dt: 0.1, ..test_params() };
    let galaxies = [
        Galaxy { center: Vec3::new(-50.0, 0.0, 0.0), count: 100, ..Default::default() },
        Galaxy { center: Vec3::new(50.0, 0.0, 0.0), count: 100, ..Default::default() },
    ];

    let mut sim = Simulation::new(Engine::default(), params);
    sim.initialize_collision(&galaxies);

    let p0 = total_momentum(sim.bodies());
    let scale0 = momentum_scale(sim.bodies());

    assert_eq!(sim.run(1000), 1000);

    // The approximated walk is not pairwise symmetric, so some drift is expected
    let p1 = total_momentum(sim.bodies());
    let scale = scale0.max(momentum_scale(sim.bodies()));
    let drift = (p1 - p0).norm() / scale;
    assert!(drift.is_finite());
    assert!(drift < 1e-2, "momentum drifted by {drift:.3e} of the total");
}

#[test]
fn circular_orbit_closes_after_one_period() {
    let G: f64 = 1.0;
    let big = 1000.0;
    let r = 100.0;
    let v = (G * big / r).sqrt();
    let period = TAU * r / v;

    let params = Parameters { G, eps: 0.0, dt: 0.01, ..test_params() };
    let x0 = Vec3::new(r, 0.0, 0.0);
    let bodies = vec![
        Body::new(big, Vec3::zeros(), Vec3::zeros()),
        Body::new(1e-3, x0, Vec3::new(0.0, v, 0.0)),
    ];

    let mut sim = Simulation::new(Engine::default(), params.clone());
    sim.initialize(bodies, Vec::new());
    let steps = (period / params.dt).round() as usize;
    sim.run(steps);

    let light = &sim.bodies()[1];
    assert!((light.x - x0).norm() < 1.0, "orbit ended at {:?}", light.x);
    // and is still on the circle
    assert!((light.x.norm() - r).abs() < 1.0);
}
