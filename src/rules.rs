//! The four force rules. Each population-wide rule reads a frozen step-start
//! view of every agent and writes only into the acceleration of the agent it
//! is evaluating, so the passes may run in parallel across agents but must all
//! complete before any agent integrates.

use rayon::prelude::*;

use crate::agent::{Agent, Category};
use crate::sim_params::SimParams;
use crate::vecmath::Vec2;

/// Squared-distance floor below which two agents are treated as coincident and
/// the pair contributes no separation force.
const COINCIDENT_EPS: f32 = 1e-12;

/// Frozen position/velocity/category of one agent at the start of the force
/// phase. Rules never read another agent's in-progress acceleration.
#[derive(Copy, Clone, Debug)]
pub struct AgentView {
    pub position: Vec2,
    pub velocity: Vec2,
    pub category: Category,
}

/// Captures the step-start snapshot the population-wide rules read from.
pub fn capture(agents: &[Agent]) -> Vec<AgentView> {
    agents
        .iter()
        .map(|agent| AgentView {
            position: agent.position,
            velocity: agent.velocity,
            category: agent.category,
        })
        .collect()
}

/// Steer toward the average velocity of same-category neighbors within
/// `visual_range`. No same-category neighbor in range means no contribution,
/// as does an average velocity exactly equal to the agent's own.
pub fn alignment(agents: &mut [Agent], others: &[AgentView], params: &SimParams) {
    let range_sq = params.visual_range * params.visual_range;

    agents.par_iter_mut().enumerate().for_each(|(i, agent)| {
        let mut sum = Vec2::zero();
        let mut count = 0u32;

        for (j, other) in others.iter().enumerate() {
            if j == i || other.category != agent.category {
                continue;
            }
            if agent.position.distance_squared(other.position) < range_sq {
                sum = sum.add(other.velocity);
                count += 1;
            }
        }

        if count > 0 {
            let avg_velocity = sum.div(count as f32);
            let steering = avg_velocity
                .sub(agent.velocity)
                .normalize_or_zero()
                .scale(params.alignment_factor);
            agent.acceleration = agent.acceleration.add(steering);
        }
    });
}

/// Steer toward the average position of same-category neighbors within
/// `visual_range`. Same degenerate guard as alignment when the average
/// position coincides with the agent's own.
pub fn cohesion(agents: &mut [Agent], others: &[AgentView], params: &SimParams) {
    let range_sq = params.visual_range * params.visual_range;

    agents.par_iter_mut().enumerate().for_each(|(i, agent)| {
        let mut sum = Vec2::zero();
        let mut count = 0u32;

        for (j, other) in others.iter().enumerate() {
            if j == i || other.category != agent.category {
                continue;
            }
            if agent.position.distance_squared(other.position) < range_sq {
                sum = sum.add(other.position);
                count += 1;
            }
        }

        if count > 0 {
            let avg_position = sum.div(count as f32);
            let steering = avg_position
                .sub(agent.position)
                .normalize_or_zero()
                .scale(params.cohesion_factor);
            agent.acceleration = agent.acceleration.add(steering);
        }
    });
}

/// Push away from every agent (any category) within `avoid_range`, each
/// contribution weighted by inverse squared distance before normalization.
/// Coincident pairs are skipped rather than producing a degenerate direction.
pub fn separation(agents: &mut [Agent], others: &[AgentView], params: &SimParams) {
    let range_sq = params.avoid_range * params.avoid_range;

    agents.par_iter_mut().enumerate().for_each(|(i, agent)| {
        for (j, other) in others.iter().enumerate() {
            if j == i {
                continue;
            }
            let dist_sq = agent.position.distance_squared(other.position);
            if dist_sq < range_sq && dist_sq > COINCIDENT_EPS {
                let direction = agent.position.sub(other.position);
                let force = direction
                    .div(dist_sq)
                    .normalize_or_zero()
                    .scale(params.avoid_factor);
                agent.acceleration = agent.acceleration.add(force);
            }
        }
    });
}

/// Constant-magnitude push away from the nearest world edge whenever the agent
/// is strictly within `avoid_range` of it. Ties are broken in a fixed order
/// (left, right, top, bottom). The `0.5 / distance` scalar never changes the
/// axis-aligned unit direction, so the force magnitude is independent of the
/// actual distance once inside the band. Deliberate: the push is a constant
/// nudge, not a distance-proportional repulsion.
pub fn edge_avoidance(agent: &mut Agent, params: &SimParams) {
    let left_distance = agent.position.x;
    let right_distance = params.world_width - agent.position.x;
    let top_distance = agent.position.y;
    let bottom_distance = params.world_height - agent.position.y;

    let min_edge_distance = left_distance
        .min(right_distance)
        .min(top_distance)
        .min(bottom_distance);

    if min_edge_distance <= 0.0 || min_edge_distance >= params.avoid_range {
        return;
    }

    let direction = if left_distance == min_edge_distance {
        Vec2::new(1.0, 0.0)
    } else if right_distance == min_edge_distance {
        Vec2::new(-1.0, 0.0)
    } else if top_distance == min_edge_distance {
        Vec2::new(0.0, 1.0)
    } else {
        Vec2::new(0.0, -1.0)
    };

    let force = direction
        .scale(0.5 / min_edge_distance)
        .normalize_or_zero()
        .scale(params.edge_avoid_strength);
    agent.acceleration = agent.acceleration.add(force);
}
