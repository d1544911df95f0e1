use glam::{Quat, Vec2, Vec3};

use crate::config::FlightConfig;
use crate::math::Pose;

/// Held-key and drag-to-look state for free flight.
///
/// Keys follow the usual fly-camera layout: W/S forward and back, A/D
/// strafe, R/F rise and sink, Q/E roll, arrows pitch and yaw.
#[derive(Clone, Debug, Default)]
pub struct FlightInput {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    roll_left: bool,
    roll_right: bool,
    pitch_up: bool,
    pitch_down: bool,
    yaw_left: bool,
    yaw_right: bool,
    dragging: bool,
    look: Vec2,
}

impl FlightInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, code: &str) -> Option<&mut bool> {
        Some(match code {
            "KeyW" => &mut self.forward,
            "KeyS" => &mut self.back,
            "KeyA" => &mut self.left,
            "KeyD" => &mut self.right,
            "KeyR" => &mut self.up,
            "KeyF" => &mut self.down,
            "KeyQ" => &mut self.roll_left,
            "KeyE" => &mut self.roll_right,
            "ArrowUp" => &mut self.pitch_up,
            "ArrowDown" => &mut self.pitch_down,
            "ArrowLeft" => &mut self.yaw_left,
            "ArrowRight" => &mut self.yaw_right,
            _ => return None,
        })
    }

    /// Returns whether the key is a flight key.
    pub fn key_down(&mut self, code: &str) -> bool {
        self.slot(code).map(|k| *k = true).is_some()
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        self.slot(code).map(|k| *k = false).is_some()
    }

    pub fn pointer_down(&mut self) {
        self.dragging = true;
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Accumulate a pointer movement in pixels. Ignored unless dragging.
    pub fn pointer_moved(&mut self, delta: Vec2) {
        if self.dragging {
            self.look += delta;
        }
    }

    /// Drop held keys and pending look, e.g. when focus is lost.
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        !(self.forward
            || self.back
            || self.left
            || self.right
            || self.up
            || self.down
            || self.roll_left
            || self.roll_right
            || self.pitch_up
            || self.pitch_down
            || self.yaw_left
            || self.yaw_right)
            && self.look == Vec2::ZERO
    }

    /// Move and turn `pose` for a frame of `dt` seconds.
    pub fn apply(&mut self, dt: f32, pose: &mut Pose, config: &FlightConfig) {
        let look = std::mem::take(&mut self.look);
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;

        let local = Vec3::new(
            axis(self.right, self.left),
            axis(self.up, self.down),
            axis(self.back, self.forward),
        );
        if local != Vec3::ZERO {
            pose.position += pose.orientation * local * config.movement_speed * dt;
        }

        let turn = config.roll_speed * dt;
        let pitch = axis(self.pitch_up, self.pitch_down) * turn - look.y * config.look_sensitivity;
        let yaw = axis(self.yaw_left, self.yaw_right) * turn - look.x * config.look_sensitivity;
        let roll = axis(self.roll_left, self.roll_right) * turn;
        if pitch != 0.0 || yaw != 0.0 || roll != 0.0 {
            let delta = Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch) * Quat::from_rotation_z(roll);
            pose.orientation = (pose.orientation * delta).normalize();
        }
    }
}
