//! Serde-facing types shared by steering front ends: JSON scene settings
//! and per-frame reports for renderers and logs.

mod report;
mod settings;

pub use report::{FrameReport, VehicleReport, WanderReport};
pub use settings::{load_settings, load_settings_file, validate, SettingsError};
pub use steer_core::{BehaviorMode, SceneConfig, Vector2};
