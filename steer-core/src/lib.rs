#![cfg_attr(not(feature = "std"), no_std)]

//! Steering behaviours for autonomous 2D vehicles.
//!
//! Each frame, behaviours in [`behavior`] compute forces that are added to a
//! vehicle's accumulator with [`Vehicle::apply_force`]; [`Vehicle::integrate`]
//! then clamps the sum, moves the vehicle, and clears the accumulator. With
//! the `std` feature, [`Scene`] drives a whole population through that cycle.

pub mod behavior;
pub mod config;
mod math;
pub mod mode;
#[cfg(feature = "std")]
pub mod scene;
pub mod vector;
pub mod vehicle;
pub mod world;

pub use behavior::Neighbors;
pub use config::{SteeringConfig, VehicleConfig};
pub use mode::{BehaviorMode, ParseModeError, Policy};
#[cfg(feature = "std")]
pub use scene::{Agent, EdgePolicy, Scene, SceneConfig};
pub use vector::Vector2;
pub use vehicle::{Body, Vehicle, WanderState};
pub use world::{Obstacle, Path, PathCursor, PathDirection, MAX_PATH_NODES};
