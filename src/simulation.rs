use anyhow::Result;
use log::debug;
use rand::prelude::*;
use rand::distr::Uniform;

use crate::agent::{Agent, Category};
use crate::config::SimulationConfig;
use crate::rules;
use crate::sim_params::SimParams;
use crate::snapshot::Snapshot;
use crate::vecmath::Vec2;

/// Initial velocity components are drawn uniformly from this symmetric range.
const INITIAL_VELOCITY_RANGE: f32 = 10.0;

/// Manages the state and execution of the flocking simulation.
///
/// The agent population is created once with randomized position, velocity,
/// category and mass; population size and world bounds are fixed for the
/// lifetime of the run. `step()` mutates the population in place and may be
/// issued indefinitely; there is no terminal state.
pub struct FlockSimulation {
    /// The simulation configuration, including population and output settings.
    pub config: SimulationConfig,
    /// Immutable runtime parameters derived from the configuration.
    params: SimParams,
    /// The agent population, exclusively owned by the driver during a step.
    agents: Vec<Agent>,
    /// Host-side RNG used for initial placement.
    pub rng: StdRng,
    /// The current simulation step number.
    pub current_step: u32,
    /// Stores collected simulation snapshots at record intervals.
    recorded_snapshots: Vec<Snapshot>,
}

impl FlockSimulation {
    /// Creates a new `FlockSimulation`, validating the config and placing the
    /// initial population.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let params = config.get_sim_params();

        // The seed drives all randomized initial state for reproducible runs.
        let mut rng = StdRng::seed_from_u64(config.population.seed);
        let agents = place_initial_agents(config.population.num_agents, &params, &mut rng)?;

        Ok(Self {
            config,
            params,
            agents,
            rng,
            current_step: 0,
            recorded_snapshots: Vec::new(),
        })
    }

    /// Advances the simulation by one discrete step:
    /// wrap every agent, accumulate all four force rules over the full
    /// population, then integrate every agent. Integration never starts until
    /// every rule has written its contribution for the whole population.
    pub fn step(&mut self) -> Result<()> {
        // --- 1. Boundary correction from the previous step's overshoot ---
        for agent in &mut self.agents {
            agent.wrap(self.params.world_width, self.params.world_height);
        }

        // --- 2. Edge avoidance (single-agent rule) ---
        for agent in &mut self.agents {
            rules::edge_avoidance(agent, &self.params);
        }

        // --- 3. Social rules over the frozen step-start snapshot ---
        let snapshot = rules::capture(&self.agents);
        rules::alignment(&mut self.agents, &snapshot, &self.params);
        rules::cohesion(&mut self.agents, &snapshot, &self.params);
        rules::separation(&mut self.agents, &snapshot, &self.params);

        // --- 4. Integrate (consumes and resets acceleration) ---
        for agent in &mut self.agents {
            agent.integrate();
        }

        self.current_step += 1;
        Ok(())
    }

    /// Read access to the population, consumed by an external renderer or
    /// metrics collector after `step()` returns.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Retrieves the current positions of all agents as (x, y) tuples.
    pub fn get_positions(&self) -> Vec<(f32, f32)> {
        self.agents
            .iter()
            .map(|agent| (agent.position.x, agent.position.y))
            .collect()
    }

    /// Returns the number of agents in the simulation.
    pub fn agent_count(&self) -> u32 {
        self.agents.len() as u32
    }

    /// Provides access to the runtime simulation parameters.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Collects the configured metrics and stores them as a `Snapshot`.
    /// Should be called at record intervals.
    pub fn record_snapshot(&mut self) {
        debug!("Recording snapshot at step {}...", self.current_step);

        let agent_count = self.agents.len() as u32;
        let average_speed = if agent_count > 0 {
            self.agents.iter().map(|a| a.velocity.length()).sum::<f32>() / agent_count as f32
        } else {
            0.0
        };

        let mut category_counts = [0u32; 3];
        for agent in &self.agents {
            category_counts[agent.category.index()] += 1;
        }

        let positions = if self.config.output.save_positions_in_snapshot {
            Some(self.get_positions())
        } else {
            None
        };

        self.recorded_snapshots.push(Snapshot {
            step: self.current_step,
            agent_count,
            average_speed,
            category_counts,
            positions,
        });
    }

    /// Provides access to the recorded snapshots.
    pub fn get_recorded_snapshots(&self) -> &Vec<Snapshot> {
        &self.recorded_snapshots
    }
}

/// Helper for initial population placement: uniform positions inside the world
/// bounds, symmetric uniform velocities, uniformly chosen category with speed
/// limits resolved from the category table, and mass in [1.0, 2.0).
fn place_initial_agents(
    count: u32,
    params: &SimParams,
    rng: &mut StdRng,
) -> Result<Vec<Agent>> {
    let pos_x_dist = Uniform::new(0.0f32, params.world_width)?;
    let pos_y_dist = Uniform::new(0.0f32, params.world_height)?;
    let vel_dist = Uniform::new(-INITIAL_VELOCITY_RANGE, INITIAL_VELOCITY_RANGE)?;
    let mass_dist = Uniform::new(1.0f32, 2.0f32)?;

    let mut agents = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let position = Vec2::new(rng.sample(pos_x_dist), rng.sample(pos_y_dist));
        let velocity = Vec2::new(rng.sample(vel_dist), rng.sample(vel_dist));
        let category = Category::ALL[rng.random_range(0..Category::ALL.len())];
        let mass = rng.sample(mass_dist);
        let limits = params.limits(category);
        agents.push(Agent::new(
            position,
            velocity,
            category,
            mass,
            limits.min_speed,
            limits.max_speed,
        ));
    }
    Ok(agents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BehaviorConfig, CategoriesConfig, OutputConfig, PopulationConfig, TimingConfig,
        UniverseConfig,
    };

    fn test_config(num_agents: u32) -> SimulationConfig {
        SimulationConfig {
            universe: UniverseConfig { width: 1280.0, height: 720.0 },
            timing: TimingConfig { total_steps: 10, record_interval_steps: 5 },
            population: PopulationConfig { num_agents, seed: 7 },
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
                base_filename: "flock_test".to_string(),
                save_positions: false,
                save_stats: false,
                save_positions_in_snapshot: false,
            },
        }
    }

    #[test]
    fn population_is_created_within_bounds_with_valid_state() {
        let sim = FlockSimulation::new(test_config(50)).unwrap();
        assert_eq!(sim.agent_count(), 50);
        for agent in sim.agents() {
            assert!(agent.position.x >= 0.0 && agent.position.x < 1280.0);
            assert!(agent.position.y >= 0.0 && agent.position.y < 720.0);
            assert!(agent.mass >= 1.0 && agent.mass < 2.0);
            let limits = sim.params().limits(agent.category);
            assert_eq!(agent.min_speed, limits.min_speed);
            assert_eq!(agent.max_speed, limits.max_speed);
            assert_eq!(agent.acceleration, Vec2::zero());
        }
    }

    #[test]
    fn same_seed_reproduces_same_run() {
        let mut a = FlockSimulation::new(test_config(30)).unwrap();
        let mut b = FlockSimulation::new(test_config(30)).unwrap();
        for _ in 0..5 {
            a.step().unwrap();
            b.step().unwrap();
        }
        assert_eq!(a.get_positions(), b.get_positions());
    }

    #[test]
    fn empty_population_step_is_a_noop() {
        let mut sim = FlockSimulation::new(test_config(0)).unwrap();
        sim.step().unwrap();
        assert_eq!(sim.agent_count(), 0);
        assert_eq!(sim.current_step, 1);
    }

    #[test]
    fn step_wraps_before_forces_and_integrates_after() {
        let mut config = test_config(1);
        // Disable every steering input so only integration moves the agent.
        config.behavior.avoid_range = 0.0;
        config.behavior.visual_range = 0.0;
        let mut sim = FlockSimulation::new(config).unwrap();

        // Park the agent near the right edge, moving right inside its speed band.
        sim.agents[0].position = Vec2::new(1278.0, 360.0);
        sim.agents[0].velocity = Vec2::new(8.0, 0.0);
        sim.agents[0].min_speed = 1.0;
        sim.agents[0].max_speed = 10.0;

        sim.step().unwrap();
        // Overshoot past the edge is allowed at step end...
        assert!((sim.agents[0].position.x - 1286.0).abs() < 1e-3);

        sim.step().unwrap();
        // ...and the next step wraps it before any rule runs: 1286 mod 1280 = 6,
        // then integration advances by the unchanged velocity.
        assert!((sim.agents[0].position.x - 14.0).abs() < 1e-3);
        assert_eq!(sim.agents[0].position.y, 360.0);
    }

    #[test]
    fn acceleration_is_zero_between_steps() {
        let mut sim = FlockSimulation::new(test_config(20)).unwrap();
        for _ in 0..3 {
            sim.step().unwrap();
            for agent in sim.agents() {
                assert_eq!(agent.acceleration, Vec2::zero());
            }
        }
    }

    #[test]
    fn snapshot_records_population_metrics() {
        let mut sim = FlockSimulation::new(test_config(40)).unwrap();
        sim.config.output.save_positions_in_snapshot = true;
        sim.step().unwrap();
        sim.record_snapshot();

        let snapshots = sim.get_recorded_snapshots();
        assert_eq!(snapshots.len(), 1);
        let snapshot = &snapshots[0];
        assert_eq!(snapshot.step, 1);
        assert_eq!(snapshot.agent_count, 40);
        assert_eq!(snapshot.category_counts.iter().sum::<u32>(), 40);
        assert!(snapshot.average_speed > 0.0);
        assert_eq!(snapshot.positions.as_ref().map(|p| p.len()), Some(40));
    }
}
