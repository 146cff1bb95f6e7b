use core::fmt;
use core::str::FromStr;

use crate::config::SteeringConfig;

/// The demo scenario a scene is set up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum BehaviorMode {
    #[default]
    Seek,
    Flee,
    Arrive,
    Wander,
    Pursuit,
    Evade,
    CollisionAvoidance,
    PathFollowing,
    LeaderFollowing,
    Queue,
}

impl BehaviorMode {
    pub const ALL: [BehaviorMode; 10] = [
        BehaviorMode::Seek,
        BehaviorMode::Flee,
        BehaviorMode::Arrive,
        BehaviorMode::Wander,
        BehaviorMode::Pursuit,
        BehaviorMode::Evade,
        BehaviorMode::CollisionAvoidance,
        BehaviorMode::PathFollowing,
        BehaviorMode::LeaderFollowing,
        BehaviorMode::Queue,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BehaviorMode::Seek => "seek",
            BehaviorMode::Flee => "flee",
            BehaviorMode::Arrive => "arrive",
            BehaviorMode::Wander => "wander",
            BehaviorMode::Pursuit => "pursuit",
            BehaviorMode::Evade => "evade",
            BehaviorMode::CollisionAvoidance => "collisionAvoidance",
            BehaviorMode::PathFollowing => "pathFollowing",
            BehaviorMode::LeaderFollowing => "leaderFollowing",
            BehaviorMode::Queue => "queue",
        }
    }

    /// Policy given to plain vehicles in this mode, including ones spawned
    /// after the scene was set up.
    pub fn default_policy(&self, steering: &SteeringConfig) -> Policy {
        match self {
            BehaviorMode::Seek => Policy::Seek,
            BehaviorMode::Flee => Policy::Flee,
            BehaviorMode::Arrive => Policy::Arrive {
                slowing_radius: steering.arrive_slowing_radius,
            },
            BehaviorMode::Wander => Policy::Wander,
            BehaviorMode::Pursuit => Policy::Pursue { quarry: 0 },
            BehaviorMode::Evade => Policy::Evade { quarry: 0 },
            BehaviorMode::CollisionAvoidance => Policy::AvoidObstacles,
            BehaviorMode::PathFollowing => Policy::FollowPath,
            BehaviorMode::LeaderFollowing => Policy::FollowLeader { leader: 0 },
            BehaviorMode::Queue => Policy::Queue,
        }
    }
}

impl fmt::Display for BehaviorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseModeError;

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown behavior mode, expected one of: ")?;
        for (i, mode) in BehaviorMode::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(mode.name())?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseModeError {}

impl FromStr for BehaviorMode {
    type Err = ParseModeError;

    /// Accepts the camelCase names plus kebab-case and the short forms
    /// `collision`, `path` and `leader`, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let matches = |candidates: &[&str]| candidates.iter().any(|c| c.eq_ignore_ascii_case(s));

        BehaviorMode::ALL
            .iter()
            .copied()
            .find(|mode| match mode {
                BehaviorMode::CollisionAvoidance => {
                    matches(&["collisionAvoidance", "collision-avoidance", "collision"])
                }
                BehaviorMode::PathFollowing => matches(&["pathFollowing", "path-following", "path"]),
                BehaviorMode::LeaderFollowing => {
                    matches(&["leaderFollowing", "leader-following", "leader"])
                }
                other => matches(&[other.name()]),
            })
            .ok_or(ParseModeError)
    }
}

/// What a single agent does each frame.
///
/// Indices refer to positions in the scene's agent list.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Policy {
    /// Seek the scene target.
    Seek,
    /// Flee the scene target.
    Flee,
    /// Arrive at the scene target.
    Arrive { slowing_radius: f64 },
    Wander,
    Pursue { quarry: usize },
    Evade { quarry: usize },
    /// Seek the scene target while steering around obstacles.
    AvoidObstacles,
    FollowPath,
    FollowLeader { leader: usize },
    /// Seek the target and avoid obstacles, braking behind other agents.
    Queue,
}
