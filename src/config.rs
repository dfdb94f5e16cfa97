use serde::{Deserialize, Serialize};
use anyhow::Result;
use std::path::Path;

use crate::agent::Category;
use crate::sim_params::{SimParams, SpeedLimits};

// Configuration for world properties
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct UniverseConfig {
    pub width: f32,
    pub height: f32,
}

// Configuration for the run length and recording cadence
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub total_steps: u32,
    pub record_interval_steps: u32,
}

// Initial population, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PopulationConfig {
    pub num_agents: u32,
    pub seed: u64,
}

// Steering tunables shared by every force rule
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BehaviorConfig {
    pub visual_range: f32,
    pub avoid_range: f32,
    pub avoid_factor: f32,
    pub cohesion_factor: f32,
    pub alignment_factor: f32,
    #[serde(default = "default_edge_avoid_strength")]
    pub edge_avoid_strength: f32,
    /// Field-of-view angle in degrees. Reserved for a future field-of-view
    /// restriction; no current rule reads it.
    #[serde(default = "default_vision_cone_deg")]
    pub vision_cone_deg: f32,
}

fn default_edge_avoid_strength() -> f32 {
    1.7
}

fn default_vision_cone_deg() -> f32 {
    180.0
}

// Speed band for one category
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CategoryLimitsConfig {
    pub min_speed: f32,
    pub max_speed: f32,
}

// Per-category speed bands, one table entry per category
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CategoriesConfig {
    pub blue: CategoryLimitsConfig,
    pub red: CategoryLimitsConfig,
    pub gray: CategoryLimitsConfig,
}

impl CategoriesConfig {
    fn get(&self, category: Category) -> &CategoryLimitsConfig {
        match category {
            Category::Blue => &self.blue,
            Category::Red => &self.red,
            Category::Gray => &self.gray,
        }
    }
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        CategoriesConfig {
            blue: CategoryLimitsConfig { min_speed: 7.0, max_speed: 10.0 },
            red: CategoryLimitsConfig { min_speed: 5.0, max_speed: 8.0 },
            gray: CategoryLimitsConfig { min_speed: 9.0, max_speed: 12.0 },
        }
    }
}

// Configuration for output settings, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_positions: bool,
    pub save_stats: bool,
    #[serde(default)]
    pub save_positions_in_snapshot: bool,
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub universe: UniverseConfig,
    pub timing: TimingConfig,
    pub population: PopulationConfig,
    pub behavior: BehaviorConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    /// Invalid tunables fail here, never mid-step.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config: SimulationConfig = toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML from '{}': {}", path_ref.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.universe.width <= 0.0 || self.universe.height <= 0.0 {
            anyhow::bail!("universe dimensions must be positive.");
        }
        if self.behavior.visual_range < 0.0 || self.behavior.avoid_range < 0.0 {
            anyhow::bail!("visual_range and avoid_range must be non-negative.");
        }
        if self.behavior.avoid_factor < 0.0
            || self.behavior.cohesion_factor < 0.0
            || self.behavior.alignment_factor < 0.0
            || self.behavior.edge_avoid_strength < 0.0
        {
            anyhow::bail!("steering factors must be non-negative.");
        }
        for category in Category::ALL {
            let limits = self.categories.get(category);
            if limits.min_speed <= 0.0 {
                anyhow::bail!("min_speed for category '{}' must be positive.", category.name());
            }
            if limits.min_speed >= limits.max_speed {
                anyhow::bail!(
                    "min_speed must be less than max_speed for category '{}'.",
                    category.name()
                );
            }
        }
        // num_agents == 0 is a valid degenerate state: every step is a no-op.
        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let mut speed_limits = [SpeedLimits { min_speed: 0.0, max_speed: 0.0 }; 3];
        for category in Category::ALL {
            let limits = self.categories.get(category);
            speed_limits[category.index()] = SpeedLimits {
                min_speed: limits.min_speed,
                max_speed: limits.max_speed,
            };
        }

        SimParams {
            world_width: self.universe.width,
            world_height: self.universe.height,
            visual_range: self.behavior.visual_range,
            avoid_range: self.behavior.avoid_range,
            avoid_factor: self.behavior.avoid_factor,
            cohesion_factor: self.behavior.cohesion_factor,
            alignment_factor: self.behavior.alignment_factor,
            edge_avoid_strength: self.behavior.edge_avoid_strength,
            vision_cone: self.behavior.vision_cone_deg.to_radians(),
            speed_limits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> SimulationConfig {
        SimulationConfig {
            universe: UniverseConfig { width: 1280.0, height: 720.0 },
            timing: TimingConfig { total_steps: 10, record_interval_steps: 5 },
            population: PopulationConfig { num_agents: 100, seed: 42 },
            behavior: BehaviorConfig {
                visual_range: 100.0,
                avoid_range: 100.0,
                avoid_factor: 0.5,
                cohesion_factor: 1.0,
                alignment_factor: 1.0,
                edge_avoid_strength: 1.7,
                vision_cone_deg: 180.0,
            },
            categories: CategoriesConfig::default(),
            output: OutputConfig {
                base_filename: "flock_sim".to_string(),
                save_positions: false,
                save_stats: false,
                save_positions_in_snapshot: false,
            },
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_speed_band() {
        let mut config = base_config();
        config.categories.red.min_speed = 9.0; // red max is 8.0
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_min_speed() {
        let mut config = base_config();
        config.categories.blue.min_speed = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_factor() {
        let mut config = base_config();
        config.behavior.cohesion_factor = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn params_expose_category_lookup_table() {
        let params = base_config().get_sim_params();
        assert_eq!(params.limits(Category::Gray).max_speed, 12.0);
        assert_eq!(params.limits(Category::Red).min_speed, 5.0);
    }

    #[test]
    fn vision_cone_is_carried_but_unused() {
        let params = base_config().get_sim_params();
        assert!((params.vision_cone - std::f32::consts::PI).abs() < 1e-5);
    }
}
