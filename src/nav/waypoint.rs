use glam::Vec3;

/// Holds at most one waypoint. A new placement discards the old one.
#[derive(Clone, Debug, Default)]
pub struct WaypointStore {
    current: Option<Vec3>,
}

impl WaypointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any stored waypoint with `point`. Returns the one it replaced.
    pub fn place(&mut self, point: Vec3) -> Option<Vec3> {
        self.current.replace(point)
    }

    pub fn clear(&mut self) -> Option<Vec3> {
        self.current.take()
    }

    pub fn current(&self) -> Option<Vec3> {
        self.current
    }

    pub fn is_set(&self) -> bool {
        self.current.is_some()
    }
}
