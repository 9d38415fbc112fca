use bhgalaxy::simulation::diagnostics::{kinetic_energy, momentum_scale, potential_energy, total_momentum};
use bhgalaxy::{bench_gravity, bench_step, bench_theta_curve};
use bhgalaxy::{Scenario, ScenarioConfig, Simulation};

use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file, looked up as given and then under `scenarios/`
    #[arg(short, default_value = "collision.yaml")]
    file_name: String,

    /// Override the scenario's step count
    #[arg(long)]
    steps: Option<usize>,

    /// Override the scenario's theta
    #[arg(long)]
    theta: Option<f64>,

    /// Run the benchmark tables instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    ScenarioConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))
}

fn report(sim: &Simulation, e0: f64) {
    let bodies = sim.bodies();
    let p = sim.params();
    let e = kinetic_energy(bodies) + potential_energy(bodies, p.G, p.eps);
    let drift = if e0 != 0.0 { (e - e0) / e0.abs() } else { e - e0 };
    let momentum = total_momentum(bodies).norm() / momentum_scale(bodies).max(f64::MIN_POSITIVE);
    println!(
        "step {:6}  t = {:9.3}  |P|/sum|p| = {:.3e}  dE/E0 = {:+.3e}  nodes = {:7}  depth = {:2}",
        sim.steps(),
        sim.time(),
        momentum,
        drift,
        sim.tree().len(),
        sim.tree().depth(),
    );
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_step();
        bench_theta_curve();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let Scenario { mut simulation, steps, report_every } =
        Scenario::build(scenario_cfg).context("invalid scenario")?;

    if let Some(theta) = args.theta {
        anyhow::ensure!(theta > 0.0, "theta must be > 0, got {theta}");
        simulation.set_theta(theta);
    }
    let steps = args.steps.unwrap_or(steps);

    println!("bhgalaxy: {} bodies, {} steps", simulation.bodies().len(), steps);

    let p = simulation.params();
    let e0 = kinetic_energy(simulation.bodies()) + potential_energy(simulation.bodies(), p.G, p.eps);

    let t0 = Instant::now();
    let mut done = 0;
    while done < steps {
        let chunk = report_every.min(steps - done);
        let taken = simulation.run(chunk);
        done += taken;
        report(&simulation, e0);
        if taken < chunk {
            break;
        }
    }

    println!("done: {done} steps in {:.3} s", t0.elapsed().as_secs_f64());
    Ok(())
}
