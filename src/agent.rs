use serde::{Serialize, Deserialize};

use crate::vecmath::Vec2;

/// Multiplier applied to velocity when speed exceeds the category maximum.
/// Soft damping rather than a hard clamp: speed converges over several steps.
pub const SPEED_DAMPING: f32 = 0.95;
/// Multiplier applied to velocity when speed falls below the category minimum.
pub const SPEED_BOOST: f32 = 1.05;

/// Fixed classification assigned at creation. Alignment and cohesion only
/// consider neighbors of the same category; separation ignores it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Blue,
    Red,
    Gray,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Blue, Category::Red, Category::Gray];

    /// Stable index into per-category lookup tables.
    #[inline(always)]
    pub fn index(self) -> usize {
        match self {
            Category::Blue => 0,
            Category::Red => 1,
            Category::Gray => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Blue => "blue",
            Category::Red => "red",
            Category::Gray => "gray",
        }
    }
}

/// One flocking agent. Mutated in place each step: the force rules write only
/// `acceleration`, the integrator consumes it and advances `velocity`/`position`.
#[derive(Clone, Debug)]
pub struct Agent {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Per-step force accumulator. Zero except during the force phase of a step.
    pub acceleration: Vec2,
    pub category: Category,
    /// Scales force-to-acceleration conversion, fixed at creation, in [1.0, 2.0).
    pub mass: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl Agent {
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        category: Category,
        mass: f32,
        min_speed: f32,
        max_speed: f32,
    ) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec2::zero(),
            category,
            mass,
            min_speed,
            max_speed,
        }
    }

    /// Wraps the position into `[0, width) x [0, height)` (toroidal boundary).
    /// Idempotent for in-bounds positions; an exact boundary value snaps to the
    /// opposite side and any overshoot re-enters modulo the world size.
    pub fn wrap(&mut self, world_width: f32, world_height: f32) {
        self.position.x = self.position.x.rem_euclid(world_width);
        self.position.y = self.position.y.rem_euclid(world_height);
    }

    /// Consumes the accumulated acceleration: applies it scaled by inverse mass,
    /// softly clamps speed into the category band, advances the position and
    /// resets the accumulator. Runs only after every force rule has been
    /// evaluated for the whole population.
    pub fn integrate(&mut self) {
        self.velocity = self.velocity.add(self.acceleration.div(self.mass));

        let speed = self.velocity.length();
        if speed > self.max_speed {
            self.velocity = self.velocity.scale(SPEED_DAMPING);
        } else if speed < self.min_speed {
            self.velocity = self.velocity.scale(SPEED_BOOST);
        }

        self.position = self.position.add(self.velocity);
        self.acceleration = Vec2::zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stationary_agent(x: f32, y: f32) -> Agent {
        Agent::new(Vec2::new(x, y), Vec2::zero(), Category::Blue, 1.0, 0.1, 10.0)
    }

    #[test]
    fn wrap_in_bounds_is_noop() {
        let mut agent = stationary_agent(640.0, 360.0);
        agent.wrap(1280.0, 720.0);
        assert_eq!(agent.position, Vec2::new(640.0, 360.0));
    }

    #[test]
    fn wrap_snaps_exact_boundary_to_opposite_side() {
        let mut agent = stationary_agent(1280.0, 720.0);
        agent.wrap(1280.0, 720.0);
        assert_eq!(agent.position, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn wrap_reenters_overshoot_modulo_world() {
        let mut agent = stationary_agent(1280.0 + 12.5, -30.0);
        agent.wrap(1280.0, 720.0);
        assert!((agent.position.x - 12.5).abs() < 1e-4);
        assert!((agent.position.y - 690.0).abs() < 1e-4);
    }

    #[test]
    fn damping_converges_below_max_speed() {
        let mut agent = stationary_agent(0.0, 0.0);
        agent.max_speed = 10.0;
        agent.min_speed = 1.0;
        agent.velocity = Vec2::new(30.0, 0.0);

        let mut previous = agent.velocity.length();
        let mut steps = 0;
        while agent.velocity.length() > agent.max_speed {
            agent.integrate();
            let speed = agent.velocity.length();
            assert!(speed < previous, "speed must strictly decrease while above max");
            previous = speed;
            steps += 1;
            assert!(steps < 100, "damping failed to converge");
        }
    }

    #[test]
    fn boost_raises_speed_toward_min() {
        let mut agent = stationary_agent(0.0, 0.0);
        agent.min_speed = 5.0;
        agent.max_speed = 10.0;
        agent.velocity = Vec2::new(1.0, 0.0);
        agent.integrate();
        assert!((agent.velocity.x - SPEED_BOOST).abs() < 1e-6);
    }

    #[test]
    fn mass_scales_velocity_delta() {
        let force = Vec2::new(2.0, -1.0);

        let mut light = stationary_agent(0.0, 0.0);
        light.mass = 1.0;
        light.velocity = Vec2::new(5.0, 0.0);
        light.acceleration = force;

        let mut heavy = light.clone();
        heavy.mass = 2.0;

        let light_before = light.velocity;
        let heavy_before = heavy.velocity;
        light.integrate();
        heavy.integrate();

        let light_delta = light.velocity.sub(light_before);
        let heavy_delta = heavy.velocity.sub(heavy_before);
        assert!((light_delta.x - 2.0 * heavy_delta.x).abs() < 1e-5);
        assert!((light_delta.y - 2.0 * heavy_delta.y).abs() < 1e-5);
    }

    #[test]
    fn integrate_resets_acceleration() {
        let mut agent = stationary_agent(0.0, 0.0);
        agent.acceleration = Vec2::new(3.0, 4.0);
        agent.integrate();
        assert_eq!(agent.acceleration, Vec2::zero());
    }
}
