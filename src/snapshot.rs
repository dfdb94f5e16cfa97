use serde::{Serialize, Deserialize};

/// A snapshot of the simulation state and metrics at a specific step.
#[derive(Debug, Clone, Serialize, Deserialize)] // Derive traits for easy saving/loading
pub struct Snapshot {
    /// The simulation step at which the snapshot was taken.
    pub step: u32,
    /// The total number of agents in the simulation (fixed for a run).
    pub agent_count: u32,
    /// Mean speed over all agents at snapshot time.
    pub average_speed: f32,
    /// Number of agents per category, indexed by `Category::index()`.
    pub category_counts: [u32; 3],
    /// Optional: raw [x, y] positions of all agents at the snapshot step.
    /// Included only if `config.output.save_positions_in_snapshot` is true.
    #[serde(skip_serializing_if = "Option::is_none")] // Don't write "positions": null
    pub positions: Option<Vec<(f32, f32)>>,
    // Future metrics could be added here:
    // pub average_neighbor_count: f32,
    // pub polarization: f32, // Alignment order parameter over the flock
}
