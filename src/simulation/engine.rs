//! Simulation driver
//!
//! `Engine` selects how forces are evaluated; `Simulation` owns the particle
//! set, the octree and the parameters, and advances them one fixed step at a
//! time:
//!
//! 1. padded bounding cube over all bodies
//! 2. clear the octree to that cube
//! 3. insert every body
//! 4. reset each body's force and evaluate it against the tree
//! 5. symplectic Euler with `dt`
//!
//! The tree is rebuilt from scratch each step and is read-only during the
//! force pass, which is what makes that pass safe to run in parallel.

use crate::simulation::barnes_hut::{Octree, DEFAULT_MAX_DEPTH};
use crate::simulation::forces::{BarnesHutGravity, DirectGravity, GravityModel};
use crate::simulation::galaxy::{generate_galaxies, Galaxy};
use crate::simulation::integrator::symplectic_euler;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Appearance, Body, System};
use crate::simulation::vector::Vec3;

#[derive(Debug, Clone)]
pub struct Engine {
    pub barnes_hut: bool, // false = direct n^2, true = octree
    pub parallel: bool,   // run the force pass on the rayon pool
    pub max_depth: usize, // octree subdivision cap
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            barnes_hut: true,
            parallel: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,    // nothing to simulate, or stopped
    Running,
}

pub struct Simulation {
    engine: Engine,
    params: Parameters,
    system: System,
    appearance: Vec<Appearance>,
    tree: Octree,
    scratch: Vec<Vec3>, // per-step force buffer
    state: RunState,
    steps: u64,
}

impl Simulation {
    /// An idle simulation with no particles
    pub fn new(engine: Engine, params: Parameters) -> Self {
        let tree = Octree::new(engine.max_depth);
        Self {
            engine,
            params,
            system: System::default(),
            appearance: Vec::new(),
            tree,
            scratch: Vec::new(),
            state: RunState::Idle,
            steps: 0,
        }
    }

    /// Replace the whole particle set. Time and step count restart at zero.
    ///
    /// `appearance` is padded with defaults (or truncated) to match `bodies`.
    pub fn initialize(&mut self, bodies: Vec<Body>, mut appearance: Vec<Appearance>) {
        appearance.resize(bodies.len(), Appearance::default());
        self.scratch = vec![Vec3::zeros(); bodies.len()];
        self.system = System::new(bodies);
        self.appearance = appearance;
        self.tree = Octree::new(self.engine.max_depth);
        self.steps = 0;
        self.state = if self.system.is_empty() { RunState::Idle } else { RunState::Running };
    }

    /// Replace the particle set with the given galaxies, generated from the
    /// configured seed
    pub fn initialize_collision(&mut self, galaxies: &[Galaxy]) {
        let (bodies, appearance) = generate_galaxies(galaxies, self.params.G, self.params.seed);
        self.initialize(bodies, appearance);
    }

    /// Advance one step. Returns `false` (and does nothing) while idle.
    pub fn step(&mut self) -> bool {
        if self.state == RunState::Idle {
            return false;
        }

        let bodies = &mut self.system.bodies;

        for f in self.scratch.iter_mut() {
            *f = Vec3::zeros();
        }

        if self.engine.barnes_hut {
            self.tree.rebuild(bodies);
            let gravity = BarnesHutGravity {
                parallel: self.engine.parallel,
                ..BarnesHutGravity::from(&self.params)
            };
            gravity.accumulate_forces(bodies, &self.tree, &mut self.scratch);
        } else {
            DirectGravity::from(&self.params).accumulate_forces(bodies, &self.tree, &mut self.scratch);
        }

        for (b, f) in bodies.iter_mut().zip(self.scratch.iter()) {
            b.f = *f;
        }

        symplectic_euler(&mut self.system, self.params.dt);
        self.steps += 1;
        true
    }

    /// Run up to `n` steps, returning how many were taken
    pub fn run(&mut self, n: usize) -> usize {
        let mut taken = 0;
        while taken < n && self.step() {
            taken += 1;
        }
        taken
    }

    pub fn stop(&mut self) {
        self.state = RunState::Idle;
    }

    /// Back to running, if there is anything to run
    pub fn resume(&mut self) {
        if !self.system.is_empty() {
            self.state = RunState::Running;
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn set_theta(&mut self, theta: f64) {
        self.params.theta = theta;
    }

    pub fn set_dt(&mut self, dt: f64) {
        self.params.dt = dt;
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Live parameter changes; picked up on the next step
    pub fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn bodies(&self) -> &[Body] {
        &self.system.bodies
    }

    pub fn appearance(&self) -> &[Appearance] {
        &self.appearance
    }

    /// Tree from the last Barnes–Hut step, for debug overlays
    pub fn tree(&self) -> &Octree {
        &self.tree
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn time(&self) -> f64 {
        self.system.t
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}
