use std::time::Instant;

use crate::simulation::barnes_hut::Octree;
use crate::simulation::diagnostics::relative_force_error;
use crate::simulation::engine::{Engine, Simulation};
use crate::simulation::forces::{BarnesHutGravity, DirectGravity, GravityModel};
use crate::simulation::params::Parameters;
use crate::simulation::states::Body;
use crate::simulation::vector::Vec3;

/// Helper to build a manual body set of size `n`, deterministic positions, no rand needed
fn make_bodies(n: usize) -> Vec<Body> {
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let x = Vec3::new(
                (i_f * 0.37).sin() * 50.0,
                (i_f * 0.13).cos() * 50.0,
                (i_f * 0.07).sin() * 50.0,
            );
            Body::new(1.0, x, Vec3::zeros())
        })
        .collect()
}

fn make_params() -> Parameters {
    Parameters {
        G: 0.5,
        theta: 0.7,
        eps: 0.1,
        dt: 0.01,
        ..Default::default()
    }
}

/// Time one force evaluation, direct vs Barnes–Hut (tree build included)
pub fn bench_gravity() {
    let ns = [200, 400, 800, 1600, 3200, 6400];
    let params = make_params();

    for n in ns {
        let bodies = make_bodies(n);
        let mut out = vec![Vec3::zeros(); n];

        let direct = DirectGravity::from(&params);
        let bh = BarnesHutGravity::from(&params);

        // Warm up
        let tree = Octree::build(&bodies);
        direct.accumulate_forces(&bodies, &tree, &mut out);
        bh.accumulate_forces(&bodies, &tree, &mut out);

        let t0 = Instant::now();
        direct.accumulate_forces(&bodies, &tree, &mut out);
        let dt_direct = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        let tree = Octree::build(&bodies);
        bh.accumulate_forces(&bodies, &tree, &mut out);
        let dt_bh = t1.elapsed().as_secs_f64();

        println!("N = {n:5}, direct = {dt_direct:8.6} s, BH = {dt_bh:8.6} s");
    }
}

/// Time a full simulation step for direct, serial BH and parallel BH
pub fn bench_step() {
    let ns = [200, 400, 800, 1600, 3200, 6400, 12800];
    let steps = 2;

    for n in ns {
        let bodies = make_bodies(n);

        let engines = [
            ("direct", Engine { barnes_hut: false, ..Default::default() }),
            ("BH", Engine::default()),
            ("BH par", Engine { parallel: true, ..Default::default() }),
        ];

        let mut line = format!("N = {n:5}");
        for (label, engine) in engines {
            let mut sim = Simulation::new(engine, make_params());
            sim.initialize(bodies.clone(), Vec::new());

            // Warm-up
            sim.step();

            let t0 = Instant::now();
            sim.run(steps);
            let per_step = t0.elapsed().as_secs_f64() / steps as f64;
            line.push_str(&format!(", {label} step = {per_step:8.6} s"));
        }
        println!("{line}");
    }
}

/// CSV of work and accuracy against theta for a fixed body set.
/// Paste output directly into a spreadsheet to graph
pub fn bench_theta_curve() {
    let n = 4000;
    let bodies = make_bodies(n);
    let params = make_params();
    let tree = Octree::build(&bodies);

    let mut exact = vec![Vec3::zeros(); n];
    DirectGravity::from(&params).accumulate_forces(&bodies, &tree, &mut exact);

    println!("theta,visits,ms,rel_error");
    for k in 1..=20 {
        let theta = k as f64 * 0.05;
        let bh = BarnesHutGravity { theta, ..BarnesHutGravity::from(&params) };

        let visits = bh.count_visits(&tree, &bodies);

        let mut out = vec![Vec3::zeros(); n];
        let t0 = Instant::now();
        bh.accumulate_forces(&bodies, &tree, &mut out);
        let ms = t0.elapsed().as_secs_f64() * 1000.0;

        println!("{theta:.2},{visits},{ms:.6},{:.6e}", relative_force_error(&out, &exact));
    }
}
