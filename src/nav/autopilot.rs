use glam::{Quat, Vec3};

use crate::config::NavConfig;
use crate::math::facing;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AutopilotState {
    #[default]
    Disengaged,
    Engaged,
}

/// Outcome of one [`AutopilotController::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AutopilotStep {
    /// Not engaged; nothing happened.
    Idle,
    /// Moved toward the target. `orientation` faces the target, or is `None`
    /// when the new position coincides with it.
    Moved {
        position: Vec3,
        orientation: Option<Quat>,
    },
    /// Came within the arrival threshold and disengaged.
    Arrived,
}

/// Closes on a fixed target with an exponential approach.
///
/// The target is snapshotted at engagement, so later waypoint changes do not
/// retarget a run already under way. The approach never reaches the target
/// on its own; arrival comes from the threshold check, which must exceed the
/// smallest per-frame step.
#[derive(Clone, Debug)]
pub struct AutopilotController {
    state: AutopilotState,
    target: Option<Vec3>,
    arrival_threshold: f32,
    rate: f32,
}

impl Default for AutopilotController {
    fn default() -> Self {
        Self::new(&NavConfig::default())
    }
}

impl AutopilotController {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            state: AutopilotState::Disengaged,
            target: None,
            arrival_threshold: config.arrival_threshold,
            rate: config.rate,
        }
    }

    pub fn state(&self) -> AutopilotState {
        self.state
    }

    pub fn is_engaged(&self) -> bool {
        self.state == AutopilotState::Engaged
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn arrival_threshold(&self) -> f32 {
        self.arrival_threshold
    }

    /// Engage toward `waypoint`, or disengage if already engaged. Without a
    /// waypoint a disengaged controller stays put.
    pub fn toggle(&mut self, waypoint: Option<Vec3>) -> AutopilotState {
        match (self.state, waypoint) {
            (AutopilotState::Engaged, _) => self.disengage(),
            (AutopilotState::Disengaged, Some(point)) => {
                self.state = AutopilotState::Engaged;
                self.target = Some(point);
            }
            (AutopilotState::Disengaged, None) => {}
        }
        self.state
    }

    pub fn disengage(&mut self) {
        self.state = AutopilotState::Disengaged;
        self.target = None;
    }

    /// Advance one frame from `position`.
    pub fn update(&mut self, dt: f32, position: Vec3) -> AutopilotStep {
        let target = match (self.state, self.target) {
            (AutopilotState::Engaged, Some(target)) => target,
            _ => return AutopilotStep::Idle,
        };

        if position.distance(target) < self.arrival_threshold {
            self.disengage();
            return AutopilotStep::Arrived;
        }

        let factor = dt * self.rate;
        let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };
        let next = position.lerp(target, factor);
        AutopilotStep::Moved {
            position: next,
            orientation: facing(next, target),
        }
    }
}
