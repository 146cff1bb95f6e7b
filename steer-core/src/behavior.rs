//! Steering behaviours.
//!
//! Every function returns a raw force for the caller to add with
//! [`Vehicle::apply_force`]. Nothing here clamps to `max_force`; the sum is
//! clamped once in [`Vehicle::integrate`]. Only [`wander`],
//! [`path_following`] and [`collision_avoidance`] touch the vehicle, and
//! only its own wander, path cursor and debug state.

use rand::Rng;

use crate::config::SteeringConfig;
use crate::vector::Vector2;
use crate::vehicle::{Body, Vehicle};
use crate::world::{Obstacle, Path};

/// The other agents visible to one vehicle: a frame snapshot with the
/// vehicle's own entry left out.
#[derive(Debug, Clone, Copy)]
pub struct Neighbors<'a> {
    bodies: &'a [Body],
    exclude: Option<usize>,
}

impl<'a> Neighbors<'a> {
    pub fn new(bodies: &'a [Body]) -> Self {
        Self {
            bodies,
            exclude: None,
        }
    }

    pub fn excluding(bodies: &'a [Body], index: usize) -> Self {
        Self {
            bodies,
            exclude: Some(index),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Body> + 'a {
        let exclude = self.exclude;
        let bodies = self.bodies;
        bodies
            .iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != exclude)
            .map(|(_, body)| body)
    }
}

/// Desired velocity toward `target`, ramped down linearly inside
/// `slowing_radius`. A non-positive radius disables the ramp.
fn desired_velocity(vehicle: &Vehicle, target: Vector2, slowing_radius: f64) -> Vector2 {
    let mut desired = target - vehicle.position;
    let distance = desired.length();
    desired.normalize();

    if slowing_radius > 0.0 && distance <= slowing_radius {
        desired.scale_in_place(vehicle.max_speed * (distance / slowing_radius));
    } else {
        desired.scale_in_place(vehicle.max_speed);
    }
    desired
}

pub fn seek(vehicle: &Vehicle, target: Vector2) -> Vector2 {
    desired_velocity(vehicle, target, 0.0) - vehicle.velocity
}

pub fn flee(vehicle: &Vehicle, target: Vector2) -> Vector2 {
    let desired = (vehicle.position - target).normalized() * vehicle.max_speed;
    desired - vehicle.velocity
}

pub fn arrive(vehicle: &Vehicle, target: Vector2, slowing_radius: f64) -> Vector2 {
    desired_velocity(vehicle, target, slowing_radius) - vehicle.velocity
}

/// Steers toward a point on a circle projected ahead of the vehicle, then
/// nudges the wander angle by a uniform step in
/// `[-angle_change / 2, angle_change / 2)`.
pub fn wander<R: Rng + ?Sized>(vehicle: &mut Vehicle, config: &SteeringConfig, rng: &mut R) -> Vector2 {
    let circle_center = vehicle.velocity.normalized() * config.wander_circle_distance;
    let displacement = Vector2::from_angle(vehicle.wander.angle) * config.wander_circle_radius;

    let change = config.wander_angle_change;
    vehicle.wander.angle += rng.gen::<f64>() * change - change * 0.5;

    vehicle.wander.circle_center = Some(vehicle.position + circle_center);
    vehicle.wander.target = Some(vehicle.position + circle_center + displacement);

    circle_center + displacement
}

/// Where `quarry` will be after the number of updates this vehicle would
/// need to cover the distance between them at full speed.
pub fn predict_position(vehicle: &Vehicle, quarry: &Body) -> Vector2 {
    let distance = quarry.position.distance_to(&vehicle.position);
    let updates_ahead = if vehicle.max_speed > 0.0 {
        distance / vehicle.max_speed
    } else {
        0.0
    };
    quarry.position + quarry.velocity * updates_ahead
}

pub fn pursuit(vehicle: &Vehicle, quarry: &Body) -> Vector2 {
    seek(vehicle, predict_position(vehicle, quarry))
}

pub fn evade(vehicle: &Vehicle, quarry: &Body) -> Vector2 {
    flee(vehicle, predict_position(vehicle, quarry))
}

/// Index of the nearest obstacle containing either lookahead point. On a
/// distance tie the earlier obstacle wins.
pub fn most_threatening(vehicle: &Vehicle, obstacles: &[Obstacle], config: &SteeringConfig) -> Option<usize> {
    let heading = vehicle.velocity.normalized();
    let ahead = vehicle.position + heading * (vehicle.max_speed * config.avoid_ahead_far);
    let ahead2 = vehicle.position + heading * (vehicle.max_speed * config.avoid_ahead_near);

    let mut threat: Option<(usize, f64)> = None;
    for (i, obstacle) in obstacles.iter().enumerate() {
        if !(obstacle.contains(&ahead) || obstacle.contains(&ahead2)) {
            continue;
        }
        let distance = vehicle.position.distance_to(&obstacle.center);
        if threat.map_or(true, |(_, nearest)| distance < nearest) {
            threat = Some((i, distance));
        }
    }
    threat.map(|(i, _)| i)
}

/// Pushes away from the most threatening obstacle, from its centre toward
/// the far lookahead point. Records the obstacle in `vehicle.threat`.
pub fn collision_avoidance(vehicle: &mut Vehicle, obstacles: &[Obstacle], config: &SteeringConfig) -> Vector2 {
    vehicle.threat = most_threatening(vehicle, obstacles, config);

    let Some(obstacle) = vehicle.threat.and_then(|i| obstacles.get(i)) else {
        return Vector2::zero();
    };
    let ahead = vehicle.position + vehicle.velocity.normalized() * (vehicle.max_speed * config.avoid_ahead_far);
    (ahead - obstacle.center).normalized() * (vehicle.max_force * config.avoid_force)
}

/// Seeks the cursor's waypoint, advancing the cursor once the vehicle is
/// inside the path radius of it.
pub fn path_following(vehicle: &mut Vehicle, path: &Path) -> Vector2 {
    let len = path.len();
    let Some(target) = path.node(vehicle.path_cursor.current(len)) else {
        return Vector2::zero();
    };

    if vehicle.position.distance_to(&target) <= path.radius {
        vehicle.path_cursor.advance(len);
    }

    seek(vehicle, target)
}

pub fn separation(vehicle: &Vehicle, neighbors: Neighbors<'_>, config: &SteeringConfig) -> Vector2 {
    let mut force = Vector2::zero();
    let mut count = 0;

    for other in neighbors.iter() {
        if other.position.distance_to(&vehicle.position) <= config.separation_radius {
            force += other.position - vehicle.position;
            count += 1;
        }
    }

    if count == 0 {
        return Vector2::zero();
    }

    force = -(force / count as f64);
    force.normalized() * (vehicle.max_force * config.separation_force)
}

/// Arrives at a point behind the leader while keeping apart from the other
/// followers. A follower standing in front of the leader also evades it.
pub fn leader_following(
    vehicle: &Vehicle,
    leader: &Body,
    followers: Neighbors<'_>,
    config: &SteeringConfig,
) -> Vector2 {
    let heading = leader.velocity.normalized();
    let behind = leader.position - heading * config.leader_behind_distance;

    let mut force = arrive(vehicle, behind, config.leader_arrive_radius);
    force += separation(vehicle, followers, config);

    let leader_ahead = leader.position + heading * config.leader_ahead_distance;
    if leader_ahead.distance_to(&vehicle.position) <= config.leader_sight_radius {
        force += evade(vehicle, leader) * config.leader_evade_weight;
    }

    force
}

/// Brakes when another agent sits just ahead: cancels most of the steering
/// accumulated so far this frame and pushes against the current velocity.
/// Call it after the frame's other behaviours.
pub fn queue(vehicle: &Vehicle, neighbors: Neighbors<'_>, config: &SteeringConfig) -> Vector2 {
    let ahead = vehicle.position + vehicle.velocity.normalized() * config.queue_ahead;
    let blocked = neighbors
        .iter()
        .any(|other| ahead.distance_to(&other.position) <= config.queue_radius);

    if !blocked {
        return Vector2::zero();
    }

    let mut brake = vehicle.steering * -config.queue_brake;
    brake -= vehicle.velocity;
    brake += separation(vehicle, neighbors, config);
    brake
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VehicleConfig;
    use rand::rngs::mock::StepRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const EPS: f64 = 1e-9;

    fn vehicle_at(x: f64, y: f64, max_speed: f64, max_force: f64) -> Vehicle {
        let config = VehicleConfig {
            max_speed,
            max_force,
            ..Default::default()
        };
        Vehicle::with_config(Vector2::new(x, y), Vector2::zero(), &config)
    }

    fn body(x: f64, y: f64, vx: f64, vy: f64) -> Body {
        Body {
            position: Vector2::new(x, y),
            velocity: Vector2::new(vx, vy),
        }
    }

    fn assert_close(actual: Vector2, expected: Vector2) {
        assert!(
            (actual - expected).length() < 1e-6,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_seek_then_integrate() {
        let mut vehicle = vehicle_at(0.0, 0.0, 6.0, 0.4);
        let force = seek(&vehicle, Vector2::new(100.0, 0.0));
        assert_close(force, Vector2::new(6.0, 0.0));

        vehicle.apply_force(force);
        vehicle.integrate();
        assert_close(vehicle.velocity, Vector2::new(0.4, 0.0));
        assert_close(vehicle.position, Vector2::new(0.4, 0.0));
    }

    #[test]
    fn test_seek_at_target_is_finite() {
        let mut vehicle = vehicle_at(5.0, 5.0, 4.0, 0.5);
        vehicle.velocity = Vector2::new(1.0, 0.0);
        let force = seek(&vehicle, Vector2::new(5.0, 5.0));
        assert!(force.x.is_finite() && force.y.is_finite());
        assert_close(force, Vector2::new(-1.0, 0.0));
    }

    #[test]
    fn test_flee_points_away() {
        let vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        assert_close(flee(&vehicle, Vector2::new(10.0, 0.0)), Vector2::new(-4.0, 0.0));
        assert_eq!(flee(&vehicle, Vector2::zero()), Vector2::ZERO);
    }

    #[test]
    fn test_arrive_ramps_speed() {
        let vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        assert_close(arrive(&vehicle, Vector2::new(100.0, 0.0), 100.0), Vector2::new(4.0, 0.0));
        assert_close(arrive(&vehicle, Vector2::new(50.0, 0.0), 100.0), Vector2::new(2.0, 0.0));
        assert_close(arrive(&vehicle, Vector2::new(200.0, 0.0), 100.0), Vector2::new(4.0, 0.0));
        assert_eq!(arrive(&vehicle, Vector2::zero(), 100.0), Vector2::ZERO);
    }

    #[test]
    fn test_arrive_zero_radius_is_seek() {
        let vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        assert_close(arrive(&vehicle, Vector2::new(3.0, 0.0), 0.0), Vector2::new(4.0, 0.0));
        assert_eq!(arrive(&vehicle, Vector2::zero(), 0.0), Vector2::ZERO);
    }

    #[test]
    fn test_wander_force_and_debug_geometry() {
        let mut vehicle = vehicle_at(10.0, 10.0, 4.0, 0.5);
        vehicle.velocity = Vector2::new(2.0, 0.0);
        let config = SteeringConfig::default();
        let mut rng = StepRng::new(0, 0);

        let force = wander(&mut vehicle, &config, &mut rng);
        assert_close(force, Vector2::new(70.0, 0.0));
        assert_eq!(vehicle.wander.circle_center, Some(Vector2::new(70.0, 10.0)));
        assert_eq!(vehicle.wander.target, Some(Vector2::new(80.0, 10.0)));
        assert!((vehicle.wander.angle + 0.25).abs() < EPS);
    }

    #[test]
    fn test_wander_angle_steps_are_bounded() {
        let mut vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        vehicle.velocity = Vector2::new(1.0, 1.0);
        let config = SteeringConfig::default();
        let half = config.wander_angle_change / 2.0;
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..1000 {
            let before = vehicle.wander.angle;
            let force = wander(&mut vehicle, &config, &mut rng);
            let delta = vehicle.wander.angle - before;
            assert!(delta.abs() <= half + EPS, "step {delta} exceeds {half}");
            assert!(force.x.is_finite() && force.y.is_finite());
        }
    }

    #[test]
    fn test_wander_stationary_vehicle() {
        let mut vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        let mut rng = StepRng::new(0, 0);
        let force = wander(&mut vehicle, &SteeringConfig::default(), &mut rng);
        assert_close(force, Vector2::new(10.0, 0.0));
    }

    #[test]
    fn test_pursuit_leads_moving_target() {
        let vehicle = vehicle_at(0.0, 0.0, 2.0, 0.5);
        let quarry = body(10.0, 0.0, 0.0, 1.0);
        assert_close(predict_position(&vehicle, &quarry), Vector2::new(10.0, 5.0));

        let force = pursuit(&vehicle, &quarry);
        assert_close(force, Vector2::new(10.0, 5.0).normalized() * 2.0);
    }

    #[test]
    fn test_evade_flees_predicted_point() {
        let vehicle = vehicle_at(0.0, 0.0, 2.0, 0.5);
        let quarry = body(10.0, 0.0, 0.0, 1.0);
        let force = evade(&vehicle, &quarry);
        assert_close(force, Vector2::new(-10.0, -5.0).normalized() * 2.0);
    }

    #[test]
    fn test_predict_with_zero_max_speed() {
        let vehicle = vehicle_at(0.0, 0.0, 0.0, 0.5);
        let quarry = body(10.0, 0.0, 3.0, 3.0);
        assert_eq!(predict_position(&vehicle, &quarry), Vector2::new(10.0, 0.0));
    }

    #[test]
    fn test_avoidance_no_overlap_is_zero() {
        let mut vehicle = vehicle_at(0.0, 0.0, 1.0, 0.5);
        vehicle.velocity = Vector2::new(1.0, 0.0);
        let obstacles = [Obstacle::new(Vector2::new(50.0, 0.0), 10.0)];
        let force = collision_avoidance(&mut vehicle, &obstacles, &SteeringConfig::default());
        assert_eq!(force, Vector2::ZERO);
        assert_eq!(vehicle.threat, None);
    }

    #[test]
    fn test_avoidance_pushes_off_obstacle() {
        let mut vehicle = vehicle_at(0.0, 0.0, 1.0, 0.5);
        vehicle.velocity = Vector2::new(1.0, 0.0);
        let obstacles = [Obstacle::new(Vector2::new(20.0, -5.0), 10.0)];
        let force = collision_avoidance(&mut vehicle, &obstacles, &SteeringConfig::default());
        assert_eq!(vehicle.threat, Some(0));
        assert_close(force, Vector2::new(0.0, 5.0));
    }

    #[test]
    fn test_avoidance_picks_nearest_and_first_on_tie() {
        let mut vehicle = vehicle_at(0.0, 0.0, 1.0, 0.5);
        vehicle.velocity = Vector2::new(1.0, 0.0);
        let config = SteeringConfig::default();

        let obstacles = [
            Obstacle::new(Vector2::new(22.0, 0.0), 5.0),
            Obstacle::new(Vector2::new(12.0, 0.0), 5.0),
        ];
        assert_eq!(most_threatening(&vehicle, &obstacles, &config), Some(1));

        let tied = [
            Obstacle::new(Vector2::new(10.0, 3.0), 5.0),
            Obstacle::new(Vector2::new(10.0, -3.0), 5.0),
        ];
        assert_eq!(most_threatening(&vehicle, &tied, &config), Some(0));
        let _ = collision_avoidance(&mut vehicle, &tied, &config);
        assert_eq!(vehicle.threat, Some(0));
    }

    #[test]
    fn test_path_following_advances_cursor() {
        let mut path = Path::new(20.0);
        path.add_node(Vector2::new(0.0, 0.0)).unwrap();
        path.add_node(Vector2::new(100.0, 0.0)).unwrap();

        let mut vehicle = vehicle_at(5.0, 0.0, 4.0, 0.5);
        let force = path_following(&mut vehicle, &path);
        assert_eq!(vehicle.path_cursor.node, 1);
        assert_close(force, Vector2::new(-4.0, 0.0));

        let force = path_following(&mut vehicle, &path);
        assert_eq!(vehicle.path_cursor.node, 1);
        assert_close(force, Vector2::new(4.0, 0.0));
    }

    #[test]
    fn test_path_following_cursor_per_vehicle() {
        let mut path = Path::new(20.0);
        path.add_node(Vector2::new(0.0, 0.0)).unwrap();
        path.add_node(Vector2::new(100.0, 0.0)).unwrap();

        let mut near = vehicle_at(0.0, 0.0, 4.0, 0.5);
        let mut far = vehicle_at(500.0, 500.0, 4.0, 0.5);
        path_following(&mut near, &path);
        path_following(&mut far, &path);
        assert_eq!(near.path_cursor.node, 1);
        assert_eq!(far.path_cursor.node, 0);
    }

    #[test]
    fn test_path_following_empty_path() {
        let mut vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        assert_eq!(path_following(&mut vehicle, &Path::default()), Vector2::ZERO);
    }

    #[test]
    fn test_separation_without_neighbors_is_zero() {
        let vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        let config = SteeringConfig::default();
        assert_eq!(separation(&vehicle, Neighbors::new(&[]), &config), Vector2::ZERO);

        let far = [body(100.0, 0.0, 0.0, 0.0)];
        assert_eq!(separation(&vehicle, Neighbors::new(&far), &config), Vector2::ZERO);
    }

    #[test]
    fn test_separation_pushes_away() {
        let vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        let bodies = [body(0.0, 0.0, 0.0, 0.0), body(10.0, 0.0, 0.0, 0.0), body(0.0, 10.0, 0.0, 0.0)];
        let force = separation(&vehicle, Neighbors::excluding(&bodies, 0), &SteeringConfig::default());
        assert_close(force, Vector2::new(-1.0, -1.0).normalized() * 1.0);
    }

    #[test]
    fn test_neighbors_excludes_self() {
        let bodies = [body(0.0, 0.0, 0.0, 0.0), body(1.0, 0.0, 0.0, 0.0), body(2.0, 0.0, 0.0, 0.0)];
        let xs: Vec<f64> = Neighbors::excluding(&bodies, 1).iter().map(|b| b.position.x).collect();
        assert_eq!(xs, vec![0.0, 2.0]);
        assert_eq!(Neighbors::new(&bodies).iter().count(), 3);
    }

    #[test]
    fn test_leader_following_seeks_behind_leader() {
        let vehicle = vehicle_at(0.0, 0.0, 3.0, 0.5);
        let leader = body(200.0, 0.0, 2.0, 0.0);
        let force = leader_following(&vehicle, &leader, Neighbors::new(&[]), &SteeringConfig::default());
        assert_close(force, Vector2::new(3.0, 0.0));
    }

    #[test]
    fn test_leader_following_evades_when_in_front() {
        let vehicle = vehicle_at(250.0, 0.0, 3.0, 0.5);
        let leader = body(200.0, 0.0, 2.0, 0.0);
        let config = SteeringConfig::default();

        let without_evade = arrive(&vehicle, Vector2::new(150.0, 0.0), config.leader_arrive_radius);
        let force = leader_following(&vehicle, &leader, Neighbors::new(&[]), &config);
        let evasion = force - without_evade;
        assert!(evasion.length() > 0.0);
        assert!(evasion.x > 0.0, "evasion should push ahead of the leader's path, got {evasion:?}");
    }

    #[test]
    fn test_queue_brakes_behind_neighbor() {
        let mut vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        vehicle.velocity = Vector2::new(2.0, 0.0);
        vehicle.apply_force(Vector2::new(1.0, 0.0));
        let config = SteeringConfig::default();

        let bodies = [body(40.0, 0.0, 0.0, 0.0)];
        let brake = queue(&vehicle, Neighbors::new(&bodies), &config);
        assert_close(brake, Vector2::new(-0.8 - 2.0, 0.0));
    }

    #[test]
    fn test_queue_clear_road_is_zero() {
        let mut vehicle = vehicle_at(0.0, 0.0, 4.0, 0.5);
        vehicle.velocity = Vector2::new(2.0, 0.0);
        let bodies = [body(0.0, 40.0, 0.0, 0.0)];
        assert_eq!(queue(&vehicle, Neighbors::new(&bodies), &SteeringConfig::default()), Vector2::ZERO);
    }
}
