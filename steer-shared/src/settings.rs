use std::fmt;
use std::path::Path;

use steer_core::{SceneConfig, SteeringConfig, VehicleConfig};

/// Errors raised while loading scene settings.
#[derive(Debug)]
pub enum SettingsError {
    /// Failed to read the settings file.
    Io(std::io::Error),
    /// The settings are not valid JSON for a [`SceneConfig`].
    Json(serde_json::Error),
    /// A value parsed but is out of range.
    Invalid { field: &'static str, reason: &'static str },
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "Failed to read settings: {}", e),
            SettingsError::Json(e) => write!(f, "Failed to parse settings: {}", e),
            SettingsError::Invalid { field, reason } => write!(f, "Invalid setting `{}`: {}", field, reason),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Json(e) => Some(e),
            SettingsError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

/// Parses and validates a JSON settings document. Missing fields keep their defaults.
pub fn load_settings(json: &str) -> Result<SceneConfig, SettingsError> {
    let config: SceneConfig = serde_json::from_str(json)?;
    validate(&config)?;
    Ok(config)
}

pub fn load_settings_file(path: impl AsRef<Path>) -> Result<SceneConfig, SettingsError> {
    let path = path.as_ref();
    log::debug!("Loading settings from {}", path.display());
    let json = std::fs::read_to_string(path)?;
    load_settings(&json)
}

fn invalid(field: &'static str, reason: &'static str) -> SettingsError {
    SettingsError::Invalid { field, reason }
}

fn positive(field: &'static str, value: f64) -> Result<(), SettingsError> {
    if !value.is_finite() {
        return Err(invalid(field, "must be finite"));
    }
    if value <= 0.0 {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), SettingsError> {
    if !value.is_finite() {
        return Err(invalid(field, "must be finite"));
    }
    if value < 0.0 {
        return Err(invalid(field, "must not be negative"));
    }
    Ok(())
}

fn validate_vehicle(vehicle: &VehicleConfig) -> Result<(), SettingsError> {
    non_negative("vehicle.maxSpeed", vehicle.max_speed)?;
    non_negative("vehicle.maxForce", vehicle.max_force)?;
    positive("vehicle.mass", vehicle.mass)?;
    non_negative("vehicle.radius", vehicle.radius)?;
    non_negative("vehicle.initialSpeed", vehicle.initial_speed)
}

fn validate_steering(steering: &SteeringConfig) -> Result<(), SettingsError> {
    let fields = [
        ("steering.wanderCircleDistance", steering.wander_circle_distance),
        ("steering.wanderCircleRadius", steering.wander_circle_radius),
        ("steering.wanderAngleChange", steering.wander_angle_change),
        ("steering.avoidAheadFar", steering.avoid_ahead_far),
        ("steering.avoidAheadNear", steering.avoid_ahead_near),
        ("steering.avoidForce", steering.avoid_force),
        ("steering.separationRadius", steering.separation_radius),
        ("steering.separationForce", steering.separation_force),
        ("steering.leaderBehindDistance", steering.leader_behind_distance),
        ("steering.leaderArriveRadius", steering.leader_arrive_radius),
        ("steering.leaderAheadDistance", steering.leader_ahead_distance),
        ("steering.leaderSightRadius", steering.leader_sight_radius),
        ("steering.leaderEvadeWeight", steering.leader_evade_weight),
        ("steering.queueAhead", steering.queue_ahead),
        ("steering.queueRadius", steering.queue_radius),
        ("steering.queueBrake", steering.queue_brake),
        ("steering.arriveSlowingRadius", steering.arrive_slowing_radius),
    ];
    for (field, value) in fields {
        non_negative(field, value)?;
    }
    Ok(())
}

/// Rejects settings that would put NaN or infinities into the simulation.
pub fn validate(config: &SceneConfig) -> Result<(), SettingsError> {
    positive("width", config.width)?;
    positive("height", config.height)?;
    non_negative("followerMaxSpeed", config.follower_max_speed)?;
    non_negative("pathMargin", config.path_margin)?;
    non_negative("pathRadius", config.path_radius)?;
    validate_vehicle(&config.vehicle)?;
    validate_steering(&config.steering)
}
