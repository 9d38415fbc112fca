pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::vector::{Vec3, Vec3Ext};
pub use simulation::states::{Appearance, Body, System};
pub use simulation::params::Parameters;
pub use simulation::barnes_hut::{bounding_cube, Octree, OctreeNode};
pub use simulation::forces::{pairwise_force, BarnesHutGravity, DirectGravity, GravityModel};
pub use simulation::integrator::symplectic_euler;
pub use simulation::galaxy::{generate_galaxies, generate_spiral_galaxy, ColorTheme, Galaxy};
pub use simulation::engine::{Engine, RunState, Simulation};
pub use simulation::scenario::Scenario;

pub use configuration::config::{BodyConfig, ConfigError, EngineConfig, GalaxyConfig, ParametersConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_gravity, bench_step, bench_theta_curve};
