use serde::{Deserialize, Serialize};
use steer_core::{BehaviorMode, Scene, Vector2, Vehicle};

/// Wander circle of the last wander step, in world coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WanderReport {
    pub circle_center: Vector2,
    pub target: Vector2,
}

/// Everything a renderer needs to draw one vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleReport {
    pub index: usize,
    pub position: Vector2,
    pub velocity: Vector2,
    /// Radians, from the velocity.
    pub heading: f64,
    pub color: u32,
    pub radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wander: Option<WanderReport>,
    /// Index into the scene's obstacle list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat: Option<usize>,
}

impl VehicleReport {
    pub fn new(index: usize, vehicle: &Vehicle, include_debug: bool) -> Self {
        let wander = match (vehicle.wander.circle_center, vehicle.wander.target) {
            (Some(circle_center), Some(target)) if include_debug => Some(WanderReport { circle_center, target }),
            _ => None,
        };

        Self {
            index,
            position: vehicle.position,
            velocity: vehicle.velocity,
            heading: vehicle.heading(),
            color: vehicle.color,
            radius: vehicle.radius,
            wander,
            threat: vehicle.threat.filter(|_| include_debug),
        }
    }
}

/// Read-only snapshot of a scene after a frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub frame: u64,
    pub mode: BehaviorMode,
    pub target: Vector2,
    pub vehicles: Vec<VehicleReport>,
}

impl FrameReport {
    /// Captures the scene. Debug geometry is only included when `include_debug` is set.
    pub fn capture(scene: &Scene, include_debug: bool) -> Self {
        Self {
            frame: scene.frame(),
            mode: scene.mode(),
            target: scene.target(),
            vehicles: scene
                .vehicles()
                .enumerate()
                .map(|(index, vehicle)| VehicleReport::new(index, vehicle, include_debug))
                .collect(),
        }
    }

    /// Single-line JSON encoding.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steer_core::SceneConfig;

    fn wander_scene() -> Scene {
        Scene::new(SceneConfig {
            mode: BehaviorMode::Wander,
            ..Default::default()
        })
    }

    #[test]
    fn test_capture_lists_every_vehicle() {
        let mut scene = wander_scene();
        scene.update();
        let report = FrameReport::capture(&scene, false);
        assert_eq!(report.frame, 1);
        assert_eq!(report.mode, BehaviorMode::Wander);
        assert_eq!(report.vehicles.len(), 5);
        assert!(report.vehicles.iter().all(|v| v.wander.is_none()));
    }

    #[test]
    fn test_debug_geometry_included_on_request() {
        let mut scene = wander_scene();
        scene.update();
        let report = FrameReport::capture(&scene, true);
        assert!(report.vehicles.iter().all(|v| v.wander.is_some()));
    }

    #[test]
    fn test_json_line_is_single_line_and_parses() {
        let mut scene = wander_scene();
        scene.update();
        let report = FrameReport::capture(&scene, true);
        let line = report.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["mode"], "wander");
        assert!(value["vehicles"][0]["wander"]["circleCenter"]["x"].is_number());

        let parsed: FrameReport = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_threat_reported_for_blocked_vehicle() {
        let mut scene = Scene::new(SceneConfig {
            mode: BehaviorMode::CollisionAvoidance,
            obstacle_count: 0,
            ..Default::default()
        });
        let agent = scene.agent_mut(0).unwrap();
        agent.vehicle.position = Vector2::new(100.0, 300.0);
        agent.vehicle.velocity = Vector2::new(1.0, 0.0);
        scene.add_obstacle(steer_core::Obstacle::new(Vector2::new(140.0, 300.0), 10.0));
        scene.update();

        let report = FrameReport::capture(&scene, true);
        assert_eq!(report.vehicles[0].threat, Some(0));
        assert_eq!(FrameReport::capture(&scene, false).vehicles[0].threat, None);
    }
}
