use glam::Vec3;

use super::AutopilotState;

/// World units per displayed AU.
pub const UNITS_PER_AU: f32 = 1000.0;

/// Tracks observer speed between frames.
#[derive(Clone, Debug)]
pub struct Telemetry {
    last_position: Vec3,
    speed: f32,
}

impl Telemetry {
    pub fn new(start: Vec3) -> Self {
        Self {
            last_position: start,
            speed: 0.0,
        }
    }

    /// Record the position reached after `dt` seconds and return the speed
    /// in AU/s.
    pub fn sample(&mut self, position: Vec3, dt: f32) -> f32 {
        let moved = position.distance(self.last_position);
        self.speed = if dt.is_finite() && dt > 0.0 {
            moved / dt / UNITS_PER_AU
        } else {
            0.0
        };
        self.last_position = position;
        self.speed
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }
}

/// Text for the HUD fields.
#[derive(Clone, Debug, PartialEq)]
pub struct HudReadout {
    pub x: String,
    pub y: String,
    pub z: String,
    pub speed: String,
    pub mode: &'static str,
    pub waypoint: Option<String>,
}

impl HudReadout {
    pub fn new(position: Vec3, speed: f32, state: AutopilotState, waypoint_distance: Option<f32>) -> Self {
        Self {
            x: au(position.x),
            y: au(position.y),
            z: au(position.z),
            speed: format!("{speed:.1} AU/s"),
            mode: mode_label(state),
            waypoint: waypoint_distance.map(au),
        }
    }
}

pub fn au(units: f32) -> String {
    format!("{:.1} AU", units / UNITS_PER_AU)
}

pub fn mode_label(state: AutopilotState) -> &'static str {
    match state {
        AutopilotState::Engaged => "AUTOPILOT",
        AutopilotState::Disengaged => "MANUAL",
    }
}

/// Colour of the mode indicator.
pub fn mode_color(state: AutopilotState) -> &'static str {
    match state {
        AutopilotState::Engaged => "#ffff00",
        AutopilotState::Disengaged => "#00ffff",
    }
}
