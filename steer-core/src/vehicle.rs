use rand::Rng;

use crate::config::VehicleConfig;
use crate::math;
use crate::vector::Vector2;
use crate::world::PathCursor;

pub const GREEN: u32 = 0x00ff00;
pub const RED: u32 = 0xff0000;
pub const BLUE: u32 = 0x0000ff;

/// Read-only kinematic view of a vehicle, used when one agent reacts to another.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    pub position: Vector2,
    pub velocity: Vector2,
}

/// Wander state that has to survive from one frame to the next, plus the
/// geometry of the last wander step for debug drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WanderState {
    pub angle: f64,
    /// World-space centre of the wander circle at the last step.
    pub circle_center: Option<Vector2>,
    /// World-space point on the circle steered toward at the last step.
    pub target: Option<Vector2>,
}

/// A single autonomous agent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    pub position: Vector2,
    pub velocity: Vector2,
    /// Sum of the forces applied since the last [`integrate`](Self::integrate).
    pub steering: Vector2,
    pub max_speed: f64,
    pub max_force: f64,
    pub mass: f64,
    pub radius: f64,
    pub color: u32,
    pub wander: WanderState,
    pub path_cursor: PathCursor,
    /// Index of the most threatening obstacle seen by the last avoidance pass.
    pub threat: Option<usize>,
}

impl Vehicle {
    pub fn new(position: Vector2, velocity: Vector2) -> Self {
        Self::with_config(position, velocity, &VehicleConfig::default())
    }

    pub fn with_config(position: Vector2, velocity: Vector2, config: &VehicleConfig) -> Self {
        Self {
            position,
            velocity,
            steering: Vector2::zero(),
            max_speed: config.max_speed,
            max_force: config.max_force,
            mass: config.mass,
            radius: config.radius,
            color: GREEN,
            wander: WanderState::default(),
            path_cursor: PathCursor::default(),
            threat: None,
        }
    }

    /// Creates a vehicle at `position` moving in a random direction at
    /// `config.initial_speed`.
    pub fn with_random_heading<R: Rng + ?Sized>(
        position: Vector2,
        config: &VehicleConfig,
        rng: &mut R,
    ) -> Self {
        let mut velocity = Vector2::new(rng.gen::<f64>() * 2.0 - 1.0, rng.gen::<f64>() * 2.0 - 1.0);
        velocity.normalize().scale_in_place(config.initial_speed);
        Self::with_config(position, velocity, config)
    }

    pub fn body(&self) -> Body {
        Body {
            position: self.position,
            velocity: self.velocity,
        }
    }

    /// Heading in radians for drawing; zero when stationary.
    pub fn heading(&self) -> f64 {
        self.velocity.angle()
    }

    pub fn apply_force(&mut self, force: Vector2) {
        self.steering += force;
    }

    pub fn reset_steering(&mut self) {
        self.steering = Vector2::zero();
    }

    /// Consumes the accumulated steering: clamps it to `max_force`, divides
    /// by mass, adds it to velocity (clamped to `max_speed`), moves, and
    /// clears the accumulator.
    pub fn integrate(&mut self) {
        let mut acceleration = self.steering.truncated(self.max_force);
        if self.mass > 0.0 {
            acceleration.scale_in_place(1.0 / self.mass);
        }

        self.velocity += acceleration;
        self.velocity.truncate(self.max_speed);
        self.position += self.velocity;
        self.reset_steering();
    }

    pub fn wrap_edges(&mut self, width: f64, height: f64) {
        if self.position.x < 0.0 {
            self.position.x = width;
        } else if self.position.x > width {
            self.position.x = 0.0;
        }

        if self.position.y < 0.0 {
            self.position.y = height;
        } else if self.position.y > height {
            self.position.y = 0.0;
        }
    }

    pub fn contain_within_bounds(&mut self, width: f64, height: f64) {
        let margin = self.radius;

        // Bounce off edges by reversing velocity component
        if self.position.x < margin {
            self.position.x = margin;
            self.velocity.x = math::abs(self.velocity.x);
        } else if self.position.x > width - margin {
            self.position.x = width - margin;
            self.velocity.x = -math::abs(self.velocity.x);
        }

        if self.position.y < margin {
            self.position.y = margin;
            self.velocity.y = math::abs(self.velocity.y);
        } else if self.position.y > height - margin {
            self.position.y = height - margin;
            self.velocity.y = -math::abs(self.velocity.y);
        }
    }
}
