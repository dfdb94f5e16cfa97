use serde::{Deserialize, Serialize};

use crate::agent::Category;

/// Per-category speed band. `0 < min_speed < max_speed`, enforced at config load.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedLimits {
    pub min_speed: f32,
    pub max_speed: f32,
}

/// Simulation parameters derived from the configuration, used frequently during
/// simulation steps. Immutable for the lifetime of a run, so every rule sees the
/// same tunables and independent simulations never share state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    // World
    pub world_width: f32,
    pub world_height: f32,

    // Neighbor interaction radii
    /// Radius within which alignment/cohesion consider same-category neighbors.
    pub visual_range: f32,
    /// Radius within which separation and edge avoidance activate.
    pub avoid_range: f32,

    // Steering weights
    pub avoid_factor: f32,
    pub cohesion_factor: f32,
    pub alignment_factor: f32,
    pub edge_avoid_strength: f32,

    /// Field-of-view angle in radians. Reserved: no rule currently applies it.
    pub vision_cone: f32,

    /// Speed band lookup table indexed by `Category::index()`.
    pub speed_limits: [SpeedLimits; 3],
}

impl SimParams {
    #[inline(always)]
    pub fn limits(&self, category: Category) -> SpeedLimits {
        self.speed_limits[category.index()]
    }
}
