//! Build fully-initialized simulations from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle:
//! - a `Simulation` with engine settings, parameters and the particle set
//!   (generated galaxies first, then explicit bodies), at t = 0
//! - run control for the binary (`steps`, `report_every`)

use crate::configuration::config::{vec3, BodyConfig, ConfigError, GalaxyConfig, ScenarioConfig};
use crate::simulation::barnes_hut::DEFAULT_MAX_DEPTH;
use crate::simulation::engine::{Engine, Simulation};
use crate::simulation::galaxy::{generate_galaxies, Galaxy};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Appearance, Body};
use crate::simulation::vector::Vec3;

pub struct Scenario {
    pub simulation: Simulation,
    pub steps: usize,
    pub report_every: usize,
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let p_cfg = &cfg.parameters;
        let parameters = Parameters {
            G: p_cfg.G,
            theta: p_cfg.theta,
            eps: p_cfg.eps,
            dt: p_cfg.dt,
            trail_falloff: p_cfg.trail_falloff,
            seed: p_cfg.seed.unwrap_or(Parameters::default().seed),
        };

        let engine = Engine {
            barnes_hut: cfg.engine.barnes_hut,
            parallel: cfg.engine.parallel,
            max_depth: cfg.engine.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        };

        let galaxies = cfg
            .galaxies
            .iter()
            .enumerate()
            .map(|(i, g)| galaxy_from_config(i, g))
            .collect::<Result<Vec<_>, _>>()?;

        let (mut bodies, mut appearance) = generate_galaxies(&galaxies, parameters.G, parameters.seed);
        for (i, bc) in cfg.bodies.iter().enumerate() {
            bodies.push(body_from_config(i, bc)?);
            appearance.push(Appearance::default());
        }

        let mut simulation = Simulation::new(engine, parameters);
        simulation.initialize(bodies, appearance);

        Ok(Self {
            simulation,
            steps: p_cfg.steps,
            report_every: p_cfg.report_every.unwrap_or(100).max(1),
        })
    }
}

fn galaxy_from_config(i: usize, g: &GalaxyConfig) -> Result<Galaxy, ConfigError> {
    let defaults = Galaxy::default();
    let opt_vec3 = |name: &str, v: &Option<Vec<f64>>, fallback: Vec3| match v {
        Some(v) => vec3(&format!("galaxies[{i}].{name}"), v),
        None => Ok(fallback),
    };

    Ok(Galaxy {
        center: vec3(&format!("galaxies[{i}].center"), &g.center)?,
        velocity: opt_vec3("velocity", &g.velocity, defaults.velocity)?,
        count: g.count,
        radius: g.radius,
        plane_normal: opt_vec3("plane_normal", &g.plane_normal, defaults.plane_normal)?,
        velocity_scale: g.velocity_scale.unwrap_or(defaults.velocity_scale),
        particle_mass: g.particle_mass.unwrap_or(defaults.particle_mass),
        core_mass: g.core_mass.unwrap_or(defaults.core_mass),
        spiral_tightness: g.spiral_tightness.unwrap_or(defaults.spiral_tightness),
        arm_count: g.arm_count.unwrap_or(defaults.arm_count),
        thickness: g.thickness.unwrap_or(defaults.thickness),
        color_theme: g.color_theme.unwrap_or(defaults.color_theme),
    })
}

fn body_from_config(i: usize, bc: &BodyConfig) -> Result<Body, ConfigError> {
    let x = vec3(&format!("bodies[{i}].x"), &bc.x)?;
    let v = vec3(&format!("bodies[{i}].v"), &bc.v)?;
    Ok(Body::new(bc.m, x, v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn galaxies_then_bodies() {
        let yaml = r#"
engine:
  barnes_hut: true
  max_depth: 20
parameters:
  G: 1.0
  theta: 0.7
  eps: 0.5
  dt: 0.05
  steps: 5
galaxies:
  - center: [ 0.0, 0.0, 0.0 ]
    count: 30
    radius: 20.0
    core_mass: 100.0
bodies:
  - x: [ 200.0, 0.0, 0.0 ]
    v: [ 0.0, 1.0, 0.0 ]
    m: 2.0
"#;
        let cfg = ScenarioConfig::from_yaml_str(yaml).expect("valid");
        let scenario = Scenario::build(cfg).expect("builds");
        let sim = &scenario.simulation;

        assert_eq!(sim.bodies().len(), 32);
        assert_eq!(sim.appearance().len(), 32);
        assert_eq!(sim.bodies()[0].m, 100.0);
        assert_eq!(sim.bodies()[31].x, Vec3::new(200.0, 0.0, 0.0));
        assert_eq!(sim.engine().max_depth, 20);
        assert_eq!(scenario.steps, 5);
        assert_eq!(scenario.report_every, 100);
        assert!(sim.is_running());
    }
}
