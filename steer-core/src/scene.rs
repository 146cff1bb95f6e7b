//! Scene orchestration: owns the agents, target, obstacles and path, sets
//! up each demo mode, and runs the per-frame steer → integrate → edge pass.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::behavior::{self, Neighbors};
use crate::config::{SteeringConfig, VehicleConfig};
use crate::mode::{BehaviorMode, Policy};
use crate::vector::Vector2;
use crate::vehicle::{Body, Vehicle, BLUE, RED};
use crate::world::{Obstacle, Path};

/// What happens to a vehicle that leaves the world rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum EdgePolicy {
    /// Reappear on the opposite edge.
    #[default]
    Wrap,
    /// Clamp inside the edge and reflect the outgoing velocity component.
    Bounce,
}

/// Configuration for building a [`Scene`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SceneConfig {
    pub width: f64,
    pub height: f64,
    /// RNG seed. Same seed and same calls give the same run.
    pub seed: u64,
    pub mode: BehaviorMode,
    pub edges: EdgePolicy,
    pub vehicle: VehicleConfig,
    pub steering: SteeringConfig,
    pub wanderer_count: usize,
    pub obstacle_count: usize,
    pub follower_count: usize,
    pub follower_max_speed: f64,
    pub queue_count: usize,
    /// Inset of the patrol rectangle from the world edges.
    pub path_margin: f64,
    pub path_radius: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            seed: 42,
            mode: BehaviorMode::default(),
            edges: EdgePolicy::default(),
            vehicle: VehicleConfig::default(),
            steering: SteeringConfig::default(),
            wanderer_count: 5,
            obstacle_count: 10,
            follower_count: 10,
            follower_max_speed: 3.0,
            queue_count: 20,
            path_margin: 100.0,
            path_radius: 20.0,
        }
    }
}

/// A vehicle paired with the policy that drives it.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub vehicle: Vehicle,
    pub policy: Policy,
}

/// Read-only inputs shared by every agent during one frame.
struct Frame<'a> {
    bodies: &'a [Body],
    target: Vector2,
    obstacles: &'a [Obstacle],
    path: &'a Path,
    steering: &'a SteeringConfig,
}

impl Frame<'_> {
    /// Another agent's start-of-frame body. An agent is never its own peer.
    fn peer(&self, index: usize, other: usize) -> Option<&Body> {
        if index == other {
            return None;
        }
        self.bodies.get(other)
    }

    fn steer<R: Rng + ?Sized>(&self, index: usize, agent: &mut Agent, rng: &mut R) {
        let vehicle = &mut agent.vehicle;
        let steering = self.steering;

        match agent.policy {
            Policy::Seek => vehicle.apply_force(behavior::seek(vehicle, self.target)),
            Policy::Flee => vehicle.apply_force(behavior::flee(vehicle, self.target)),
            Policy::Arrive { slowing_radius } => {
                vehicle.apply_force(behavior::arrive(vehicle, self.target, slowing_radius))
            }
            Policy::Wander => {
                let force = behavior::wander(vehicle, steering, rng);
                vehicle.apply_force(force);
            }
            Policy::Pursue { quarry } => {
                if let Some(quarry) = self.peer(index, quarry) {
                    vehicle.apply_force(behavior::pursuit(vehicle, quarry));
                }
            }
            Policy::Evade { quarry } => {
                if let Some(quarry) = self.peer(index, quarry) {
                    vehicle.apply_force(behavior::evade(vehicle, quarry));
                }
            }
            Policy::AvoidObstacles => {
                vehicle.apply_force(behavior::seek(vehicle, self.target));
                let force = behavior::collision_avoidance(vehicle, self.obstacles, steering);
                vehicle.apply_force(force);
            }
            Policy::FollowPath => {
                let force = behavior::path_following(vehicle, self.path);
                vehicle.apply_force(force);
            }
            Policy::FollowLeader { leader } => {
                if let Some(leader) = self.peer(index, leader) {
                    let followers = Neighbors::excluding(self.bodies, index);
                    vehicle.apply_force(behavior::leader_following(vehicle, leader, followers, steering));
                }
            }
            Policy::Queue => {
                vehicle.apply_force(behavior::seek(vehicle, self.target));
                let force = behavior::collision_avoidance(vehicle, self.obstacles, steering);
                vehicle.apply_force(force);
                let neighbors = Neighbors::excluding(self.bodies, index);
                vehicle.apply_force(behavior::queue(vehicle, neighbors, steering));
            }
        }
    }
}

/// The live simulation: every agent, the shared target, obstacles and path.
///
/// Agents are only ever appended. [`update`](Self::update) computes all
/// steering against a snapshot taken at the start of the frame, then
/// integrates every agent, then applies the edge policy.
pub struct Scene {
    config: SceneConfig,
    mode: BehaviorMode,
    width: f64,
    height: f64,
    target: Vector2,
    agents: Vec<Agent>,
    obstacles: Vec<Obstacle>,
    path: Path,
    rng: ChaCha8Rng,
    frame: u64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let mut scene = Self {
            mode: config.mode,
            width: config.width,
            height: config.height,
            target: Vector2::new(config.width / 2.0, config.height / 2.0),
            agents: Vec::new(),
            obstacles: Vec::new(),
            path: Path::new(config.path_radius),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            frame: 0,
            config,
        };
        scene.reset();
        scene
    }

    /// Clears everything and repopulates the scene for the current mode.
    pub fn reset(&mut self) {
        self.agents.clear();
        self.obstacles.clear();
        self.path = Path::new(self.config.path_radius);
        self.target = self.center();
        self.frame = 0;

        let (w, h) = (self.width, self.height);
        let policy = self.mode.default_policy(&self.config.steering);

        match self.mode {
            BehaviorMode::Seek | BehaviorMode::Flee | BehaviorMode::Arrive => {
                self.spawn_with(Vector2::new(100.0, 100.0), policy);
            }
            BehaviorMode::Wander => {
                for _ in 0..self.config.wanderer_count {
                    let position = Vector2::new(self.rng.gen::<f64>() * w, self.rng.gen::<f64>() * h);
                    self.spawn_with(position, policy);
                }
            }
            BehaviorMode::Pursuit | BehaviorMode::Evade => {
                let quarry = self.spawn_with(self.center(), Policy::Wander);
                self.agents[quarry].vehicle.color = RED;
                self.spawn_with(Vector2::new(100.0, 100.0), policy);
            }
            BehaviorMode::CollisionAvoidance => {
                self.spawn_with(Vector2::new(100.0, h / 2.0), policy);
                for _ in 0..self.config.obstacle_count {
                    let center = Vector2::new(
                        self.rng.gen::<f64>() * w * 0.8 + 100.0,
                        self.rng.gen::<f64>() * h,
                    );
                    let radius = 20.0 + self.rng.gen::<f64>() * 20.0;
                    self.obstacles.push(Obstacle::new(center, radius));
                }
            }
            BehaviorMode::PathFollowing => {
                let m = self.config.path_margin;
                for node in [
                    Vector2::new(m, m),
                    Vector2::new(w - m, m),
                    Vector2::new(w - m, h - m),
                    Vector2::new(m, h - m),
                ] {
                    if self.path.add_node(node).is_err() {
                        log::warn!("path is full, dropping node {:?}", node);
                    }
                }
                self.spawn_with(Vector2::new(100.0, 100.0), policy);
            }
            BehaviorMode::LeaderFollowing => {
                let leader = self.spawn_with(self.center(), Policy::Seek);
                self.agents[leader].vehicle.color = RED;
                for _ in 0..self.config.follower_count {
                    let position =
                        Vector2::new(self.rng.gen::<f64>() * 100.0, self.rng.gen::<f64>() * 100.0);
                    let follower = self.spawn_with(position, policy);
                    let vehicle = &mut self.agents[follower].vehicle;
                    vehicle.color = BLUE;
                    vehicle.max_speed = self.config.follower_max_speed;
                }
            }
            BehaviorMode::Queue => {
                let (cx, cy) = (w / 2.0, h / 2.0);
                self.obstacles.push(Obstacle::new(Vector2::new(cx - 60.0, cy), 40.0));
                self.obstacles.push(Obstacle::new(Vector2::new(cx + 60.0, cy), 40.0));
                self.target = Vector2::new(cx, h - 50.0);
                for _ in 0..self.config.queue_count {
                    let position =
                        Vector2::new(self.rng.gen::<f64>() * w, 50.0 + self.rng.gen::<f64>() * 100.0);
                    self.spawn_with(position, policy);
                }
            }
        }

        log::debug!(
            "scene reset for {} mode: {} agents, {} obstacles, {} path nodes",
            self.mode,
            self.agents.len(),
            self.obstacles.len(),
            self.path.len()
        );
    }

    /// Switches mode and repopulates the scene.
    pub fn set_mode(&mut self, mode: BehaviorMode) {
        log::debug!("switching mode {} -> {}", self.mode, mode);
        self.mode = mode;
        self.reset();
    }

    /// Adds a vehicle with the current mode's default policy. Returns its index.
    pub fn spawn(&mut self, position: Vector2) -> usize {
        let policy = self.mode.default_policy(&self.config.steering);
        self.spawn_with(position, policy)
    }

    /// Adds a vehicle with a random heading and the given policy. Returns its index.
    pub fn spawn_with(&mut self, position: Vector2, policy: Policy) -> usize {
        let vehicle = Vehicle::with_random_heading(position, &self.config.vehicle, &mut self.rng);
        self.push(vehicle, policy)
    }

    /// Adds a prepared vehicle. Returns its index.
    pub fn push(&mut self, vehicle: Vehicle, policy: Policy) -> usize {
        log::debug!("agent {} added at {:?} with {:?}", self.agents.len(), vehicle.position, policy);
        self.agents.push(Agent { vehicle, policy });
        self.agents.len() - 1
    }

    /// Replaces the policy of agent `index`. Returns false if there is no such agent.
    pub fn set_policy(&mut self, index: usize, policy: Policy) -> bool {
        match self.agents.get_mut(index) {
            Some(agent) => {
                agent.policy = policy;
                true
            }
            None => false,
        }
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Replaces the shared path. Every follower starts over from the first node.
    pub fn set_path(&mut self, path: Path) {
        self.path = path;
        for agent in self.agents.iter_mut() {
            agent.vehicle.path_cursor.reset();
        }
    }

    pub fn set_target(&mut self, target: Vector2) {
        self.target = target;
    }

    /// Changes the world bounds without repopulating.
    pub fn resize(&mut self, width: f64, height: f64) {
        log::debug!("resize {}x{} -> {}x{}", self.width, self.height, width, height);
        self.width = width;
        self.height = height;
    }

    /// Advances the simulation by one frame.
    pub fn update(&mut self) {
        let bodies: Vec<Body> = self.agents.iter().map(|agent| agent.vehicle.body()).collect();
        let frame = Frame {
            bodies: &bodies,
            target: self.target,
            obstacles: &self.obstacles,
            path: &self.path,
            steering: &self.config.steering,
        };

        for (index, agent) in self.agents.iter_mut().enumerate() {
            frame.steer(index, agent, &mut self.rng);
        }

        for agent in self.agents.iter_mut() {
            agent.vehicle.integrate();
        }
        self.apply_edges();

        self.frame += 1;
        log::trace!("frame {} done, {} agents", self.frame, self.agents.len());
    }

    /// Applies the edge policy to every agent.
    pub fn apply_edges(&mut self) {
        for agent in self.agents.iter_mut() {
            match self.config.edges {
                EdgePolicy::Wrap => agent.vehicle.wrap_edges(self.width, self.height),
                EdgePolicy::Bounce => agent.vehicle.contain_within_bounds(self.width, self.height),
            }
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent_mut(&mut self, index: usize) -> Option<&mut Agent> {
        self.agents.get_mut(index)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.agents.iter().map(|agent| &agent.vehicle)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn target(&self) -> Vector2 {
        self.target
    }

    pub fn mode(&self) -> BehaviorMode {
        self.mode
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    fn center(&self) -> Vector2 {
        Vector2::new(self.width / 2.0, self.height / 2.0)
    }
}
