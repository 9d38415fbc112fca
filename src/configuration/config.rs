//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario and the checks it must pass before the numeric core sees it.
//! The core assumes validated input; anything out of range is rejected here.
//!
//! - [`EngineConfig`]     – force method, parallelism, octree depth cap
//! - [`ParametersConfig`] – physical constants and run length
//! - [`GalaxyConfig`]     – one procedurally generated spiral galaxy
//! - [`BodyConfig`]       – one explicitly placed body
//! - [`ScenarioConfig`]   – top-level wrapper
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   barnes_hut: true
//!   parallel: true
//!   max_depth: 32           # optional
//!
//! parameters:
//!   G: 0.5
//!   theta: 0.5
//!   eps: 1.0                # softening length
//!   dt: 0.1
//!   trail_falloff: 0.1      # optional, renderer only
//!   seed: 42                # optional
//!   steps: 1000
//!   report_every: 100       # optional
//!
//! galaxies:
//!   - center: [ -50.0, 0.0, 0.0 ]
//!     velocity: [ 0.0, 0.5, 0.0 ]       # optional
//!     count: 500
//!     radius: 40.0
//!     plane_normal: [ 0.0, 0.3, 1.0 ]   # optional, default +Z
//!     color_theme: ember                # optional
//!
//! bodies:
//!   - x: [ 0.0, 0.0, 0.0 ]
//!     v: [ 0.0, 0.0, 0.0 ]
//!     m: 1000.0
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::simulation::galaxy::ColorTheme;
use crate::simulation::vector::Vec3;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("`{field}` must have 3 components, got {len}")]
    BadVector { field: String, len: usize },

    #[error("`{field}` must be finite")]
    NonFinite { field: String },
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub barnes_hut: bool, // `true` - octree approximation, `false` - direct n^2 summation
    #[serde(default)]
    pub parallel: bool, // force pass on all cores
    pub max_depth: Option<usize>, // octree subdivision cap
}

/// Physical constants and run control
#[allow(non_snake_case)]
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub G: f64,     // gravitational constant
    pub theta: f64, // Barnes–Hut opening threshold, > 0
    pub eps: f64,   // softening length, >= 0
    pub dt: f64,    // fixed step, > 0
    #[serde(default)]
    pub trail_falloff: f64, // renderer trail fade, passed through
    pub seed: Option<u64>,  // galaxy generation seed
    pub steps: usize,       // steps the binary runs
    pub report_every: Option<usize>,
}

/// One generated spiral galaxy
#[derive(Deserialize, Debug, Clone)]
pub struct GalaxyConfig {
    pub center: Vec<f64>,
    pub velocity: Option<Vec<f64>>,
    pub count: usize,
    pub radius: f64,
    pub plane_normal: Option<Vec<f64>>,
    pub velocity_scale: Option<f64>,
    pub particle_mass: Option<f64>,
    pub core_mass: Option<f64>,
    pub spiral_tightness: Option<f64>,
    pub arm_count: Option<usize>,
    pub thickness: Option<f64>,
    pub color_theme: Option<ColorTheme>,
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>, // initial position
    pub v: Vec<f64>, // initial velocity
    pub m: f64,      // mass, > 0
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub galaxies: Vec<GalaxyConfig>,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    /// Read, parse and validate a scenario file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let cfg: ScenarioConfig = serde_yaml::from_reader(BufReader::new(file))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse and validate a scenario held in memory
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: ScenarioConfig = serde_yaml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.parameters;
        require(p.G.is_finite(), "G must be finite")?;
        require(p.theta > 0.0 && p.theta.is_finite(), "theta must be > 0")?;
        require(p.eps >= 0.0 && p.eps.is_finite(), "eps must be >= 0")?;
        require(p.dt > 0.0 && p.dt.is_finite(), "dt must be > 0")?;
        if let Some(depth) = self.engine.max_depth {
            require(depth > 0, "max_depth must be > 0")?;
        }

        for (i, g) in self.galaxies.iter().enumerate() {
            vec3(&format!("galaxies[{i}].center"), &g.center)?;
            if let Some(v) = &g.velocity {
                vec3(&format!("galaxies[{i}].velocity"), v)?;
            }
            if let Some(n) = &g.plane_normal {
                vec3(&format!("galaxies[{i}].plane_normal"), n)?;
            }
            finite(&format!("galaxies[{i}].radius"), g.radius)?;
            require(g.radius > 0.0, &format!("galaxies[{i}].radius must be > 0"))?;
            if let Some(m) = g.particle_mass {
                finite(&format!("galaxies[{i}].particle_mass"), m)?;
                require(m > 0.0, &format!("galaxies[{i}].particle_mass must be > 0"))?;
            }
            if let Some(m) = g.core_mass {
                finite(&format!("galaxies[{i}].core_mass"), m)?;
                require(m >= 0.0, &format!("galaxies[{i}].core_mass must be >= 0"))?;
            }
            if let Some(s) = g.velocity_scale {
                finite(&format!("galaxies[{i}].velocity_scale"), s)?;
            }
            if let Some(k) = g.spiral_tightness {
                finite(&format!("galaxies[{i}].spiral_tightness"), k)?;
            }
            if let Some(h) = g.thickness {
                finite(&format!("galaxies[{i}].thickness"), h)?;
                require(h >= 0.0, &format!("galaxies[{i}].thickness must be >= 0"))?;
            }
        }

        for (i, b) in self.bodies.iter().enumerate() {
            vec3(&format!("bodies[{i}].x"), &b.x)?;
            vec3(&format!("bodies[{i}].v"), &b.v)?;
            finite(&format!("bodies[{i}].m"), b.m)?;
            require(b.m > 0.0, &format!("bodies[{i}].m must be > 0"))?;
        }

        Ok(())
    }
}

fn require(ok: bool, msg: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter(msg.to_string()))
    }
}

fn finite(field: &str, x: f64) -> Result<(), ConfigError> {
    if x.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            field: field.to_string(),
        })
    }
}

/// Convert a YAML list into a `Vec3`, insisting on exactly 3 finite components
pub fn vec3(field: &str, v: &[f64]) -> Result<Vec3, ConfigError> {
    match v {
        [x, y, z] => {
            for c in [x, y, z] {
                finite(field, *c)?;
            }
            Ok(Vec3::new(*x, *y, *z))
        }
        _ => Err(ConfigError::BadVector {
            field: field.to_string(),
            len: v.len(),
        }),
    }
}
