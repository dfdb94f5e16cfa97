pub mod agent;
pub mod config;
pub mod rules;
pub mod sim_params;
pub mod simulation;
pub mod snapshot;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use agent::{Agent, Category};
pub use config::SimulationConfig;
pub use sim_params::{SimParams, SpeedLimits};
pub use simulation::FlockSimulation;
pub use snapshot::Snapshot;
pub use vecmath::Vec2;
