//! Waypoint placement and autopilot for the stellar navigation scene.

mod autopilot;
mod flight;
mod telemetry;
mod waypoint;

pub use autopilot::{AutopilotController, AutopilotState, AutopilotStep};
pub use flight::FlightInput;
pub use telemetry::{au, mode_color, mode_label, HudReadout, Telemetry, UNITS_PER_AU};
pub use waypoint::WaypointStore;

use glam::{Vec2, Vec3};
use log::{debug, info, trace};

use crate::config::NavConfig;
use crate::math::{Lens, Pose};

/// Owns the waypoint store and the autopilot, keeping them consistent:
/// clearing the waypoint always disengages, and arriving clears it.
#[derive(Clone, Debug)]
pub struct Navigator {
    waypoints: WaypointStore,
    autopilot: AutopilotController,
    placement_distance: f32,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(&NavConfig::default())
    }
}

impl Navigator {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            waypoints: WaypointStore::new(),
            autopilot: AutopilotController::new(config),
            placement_distance: config.placement_distance,
        }
    }

    pub fn state(&self) -> AutopilotState {
        self.autopilot.state()
    }

    pub fn waypoint(&self) -> Option<Vec3> {
        self.waypoints.current()
    }

    /// Target of the current autopilot run.
    pub fn target(&self) -> Option<Vec3> {
        self.autopilot.target()
    }

    /// Store `point` as the waypoint. Does not engage the autopilot, and
    /// does not retarget a run already under way.
    pub fn place_waypoint(&mut self, point: Vec3) {
        self.waypoints.place(point);
        debug!("waypoint placed at {point}");
    }

    /// Place a waypoint along the ray through `ndc`. Ignored while the
    /// autopilot is engaged. Returns the placed point.
    pub fn place_from_pointer(&mut self, ndc: Vec2, pose: &Pose, lens: &Lens) -> Option<Vec3> {
        if self.autopilot.is_engaged() {
            return None;
        }
        let point = pose.position + lens.ray_direction(pose, ndc) * self.placement_distance;
        self.place_waypoint(point);
        Some(point)
    }

    pub fn clear_waypoint(&mut self) {
        self.waypoints.clear();
        if self.autopilot.is_engaged() {
            info!("autopilot disengaged: waypoint cleared");
        }
        self.autopilot.disengage();
    }

    pub fn toggle_autopilot(&mut self) -> AutopilotState {
        let before = self.autopilot.state();
        let after = self.autopilot.toggle(self.waypoints.current());
        match (before, after) {
            (AutopilotState::Disengaged, AutopilotState::Engaged) => info!("autopilot engaged"),
            (AutopilotState::Engaged, AutopilotState::Disengaged) => info!("autopilot disengaged"),
            _ => info!("no waypoint set for autopilot"),
        }
        after
    }

    /// Run the autopilot for one frame, writing the result into `pose`.
    ///
    /// Arrival clears the stored waypoint only if it is still the one the run
    /// was heading for; a waypoint placed mid-run survives for the next run.
    pub fn update(&mut self, dt: f32, pose: &mut Pose) -> AutopilotStep {
        let run_target = self.autopilot.target();
        let step = self.autopilot.update(dt, pose.position);
        match step {
            AutopilotStep::Idle => {}
            AutopilotStep::Moved {
                position,
                orientation,
            } => {
                pose.position = position;
                if let Some(target) = run_target {
                    trace!("autopilot {:.1} from target", position.distance(target));
                }
                if let Some(q) = orientation {
                    pose.orientation = q;
                }
            }
            AutopilotStep::Arrived => {
                if self.waypoints.current() == run_target {
                    self.waypoints.clear();
                }
                info!("autopilot disengaged: target reached");
            }
        }
        step
    }

    pub fn distance_to_waypoint(&self, position: Vec3) -> Option<f32> {
        self.waypoints.current().map(|w| w.distance(position))
    }
}
