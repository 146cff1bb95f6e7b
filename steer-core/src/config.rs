/// Physical limits and appearance given to newly created vehicles.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct VehicleConfig {
    pub max_speed: f64,
    pub max_force: f64,
    /// Divides the steering force before it reaches velocity.
    pub mass: f64,
    pub radius: f64,
    /// Speed of the random heading a scene-spawned vehicle starts with.
    pub initial_speed: f64,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_speed: 4.0,
            max_force: 0.5,
            mass: 1.0,
            radius: 10.0,
            initial_speed: 2.0,
        }
    }
}

/// Tunables shared by every steering behaviour.
///
/// Lookahead and force values marked "multiplier" are scaled by the
/// requesting vehicle's own `max_speed` or `max_force`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SteeringConfig {
    pub wander_circle_distance: f64,
    pub wander_circle_radius: f64,
    /// Width of the uniform interval the wander angle is perturbed by each frame.
    pub wander_angle_change: f64,

    /// Far lookahead, multiplier of `max_speed`.
    pub avoid_ahead_far: f64,
    /// Near lookahead, multiplier of `max_speed`.
    pub avoid_ahead_near: f64,
    /// Avoidance magnitude, multiplier of `max_force`.
    pub avoid_force: f64,

    pub separation_radius: f64,
    /// Separation magnitude, multiplier of `max_force`.
    pub separation_force: f64,

    pub leader_behind_distance: f64,
    pub leader_arrive_radius: f64,
    pub leader_ahead_distance: f64,
    pub leader_sight_radius: f64,
    pub leader_evade_weight: f64,

    pub queue_ahead: f64,
    pub queue_radius: f64,
    /// Fraction of the frame's accumulated steering cancelled when braking.
    pub queue_brake: f64,

    pub arrive_slowing_radius: f64,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            wander_circle_distance: 60.0,
            wander_circle_radius: 10.0,
            wander_angle_change: 0.5,
            avoid_ahead_far: 20.0,
            avoid_ahead_near: 10.0,
            avoid_force: 10.0,
            separation_radius: 25.0,
            separation_force: 2.0,
            leader_behind_distance: 50.0,
            leader_arrive_radius: 50.0,
            leader_ahead_distance: 50.0,
            leader_sight_radius: 20.0,
            leader_evade_weight: 2.0,
            queue_ahead: 40.0,
            queue_radius: 15.0,
            queue_brake: 0.8,
            arrive_slowing_radius: 100.0,
        }
    }
}
