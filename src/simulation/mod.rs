pub mod vector;
pub mod states;
pub mod params;
pub mod barnes_hut;
pub mod forces;
pub mod integrator;
pub mod galaxy;
pub mod diagnostics;
pub mod engine;
pub mod scenario;
