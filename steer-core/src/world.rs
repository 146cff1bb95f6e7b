use crate::vector::Vector2;

/// Upper bound on waypoints per path; keeps `Path` allocation-free.
pub const MAX_PATH_NODES: usize = 32;

/// A static circular obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    pub center: Vector2,
    pub radius: f64,
}

impl Obstacle {
    pub fn new(center: Vector2, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Point-in-circle test, boundary inclusive.
    pub fn contains(&self, point: &Vector2) -> bool {
        point.distance_to(&self.center) <= self.radius
    }
}

/// An ordered list of waypoints with a following radius.
///
/// Traversal state lives in each follower's [`PathCursor`], so one path can
/// be shared by any number of vehicles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    nodes: heapless::Vec<Vector2, MAX_PATH_NODES>,
    pub radius: f64,
}

impl Path {
    pub fn new(radius: f64) -> Self {
        Self {
            nodes: heapless::Vec::new(),
            radius,
        }
    }

    /// Appends a waypoint, handing it back if the path is full.
    pub fn add_node(&mut self, node: Vector2) -> Result<(), Vector2> {
        self.nodes.push(node)
    }

    pub fn nodes(&self) -> &[Vector2] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<Vector2> {
        self.nodes.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::new(20.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathDirection {
    #[default]
    Forward,
    Backward,
}

impl PathDirection {
    pub fn reversed(self) -> Self {
        match self {
            PathDirection::Forward => PathDirection::Backward,
            PathDirection::Backward => PathDirection::Forward,
        }
    }
}

/// Per-follower position along a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathCursor {
    pub node: usize,
    pub direction: PathDirection,
}

impl PathCursor {
    /// Waypoint index the follower is heading for, clamped to a path of `len` nodes.
    pub fn current(&self, len: usize) -> usize {
        self.node.min(len.saturating_sub(1))
    }

    /// Steps one node in the current direction. A step that would leave the
    /// path flips the direction and keeps the cursor on the end node.
    pub fn advance(&mut self, len: usize) {
        if len == 0 {
            self.node = 0;
            return;
        }
        let current = self.current(len);
        self.node = match self.direction {
            PathDirection::Forward if current + 1 < len => current + 1,
            PathDirection::Backward if current > 0 => current - 1,
            direction => {
                self.direction = direction.reversed();
                current
            }
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
