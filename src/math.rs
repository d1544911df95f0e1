//! Poses, projection and the handful of periodic helpers the scenes share.

use glam::{Mat3, Mat4, Quat, Vec2, Vec3};

/// Below this a direction is treated as zero.
const EPSILON: f32 = 1e-6;

/// Frame rate the per-frame animation constants were tuned at.
pub const REFERENCE_FPS: f32 = 60.0;

/// `dt` expressed in reference frames, for constants given per frame.
pub fn frames(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt * REFERENCE_FPS
    } else {
        0.0
    }
}

/// Lerp factor equivalent to applying `rate` once per reference frame for
/// `dt` seconds.
pub fn frame_lerp(rate: f32, dt: f32) -> f32 {
    let n = frames(dt);
    if n == 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - rate.clamp(0.0, 1.0)).powf(n)
}

/// Distance along a unit-length ray to its first hit on a sphere, if any.
pub fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = center - origin;
    let tca = oc.dot(dir);
    let d2 = oc.length_squared() - tca * tca;
    let r2 = radius * radius;
    if d2 > r2 {
        return None;
    }
    let thc = (r2 - d2).sqrt();
    let t = if tca - thc >= 0.0 { tca - thc } else { tca + thc };
    (t >= 0.0).then_some(t)
}

/// Euler rotation (X, then Y, then Z) as a quaternion.
pub fn euler_xyz(rotation: Vec3) -> Quat {
    Quat::from_euler(glam::EulerRot::XYZ, rotation.x, rotation.y, rotation.z)
}

/// Observer position and orientation. Local -Z is forward, +Y is up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Turn to face `target`. Leaves the orientation alone when the target
    /// coincides with the position.
    pub fn look_at(&mut self, target: Vec3) {
        if let Some(q) = facing(self.position, target) {
            self.orientation = q;
        }
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }
}

/// Orientation whose forward axis points from `from` to `to`.
pub fn facing(from: Vec3, to: Vec3) -> Option<Quat> {
    let forward = (to - from).try_normalize()?;
    let mut right = forward.cross(Vec3::Y);
    if right.length_squared() < EPSILON {
        // Looking straight up or down.
        right = forward.cross(Vec3::Z);
    }
    let right = right.normalize();
    let up = right.cross(forward);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize())
}

/// Perspective lens. `fov_y` is in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lens {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Lens {
    pub fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    /// World-space direction of the ray through `ndc` from a camera at `pose`.
    pub fn ray_direction(&self, pose: &Pose, ndc: Vec2) -> Vec3 {
        let half = (self.fov_y * 0.5).tan();
        let local = Vec3::new(ndc.x * half * self.aspect, ndc.y * half, -1.0).normalize();
        pose.orientation * local
    }
}

/// Client pixel coordinates to normalized device coordinates (y up).
pub fn pointer_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(x / width * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
}

/// `amplitude * sin(t * frequency)`
pub fn pulse(t: f32, frequency: f32, amplitude: f32) -> f32 {
    (t * frequency).sin() * amplitude
}

/// Move `current` a fraction of the way toward `target`.
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// HSL in [0, 1] to linear RGB, matching the usual hue-sextant conversion.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return [l, l, l];
    }
    let p = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let q = 2.0 * l - p;
    [
        hue_to_rgb(q, p, h + 1.0 / 3.0),
        hue_to_rgb(q, p, h),
        hue_to_rgb(q, p, h - 1.0 / 3.0),
    ]
}

fn hue_to_rgb(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_points_forward_axis_at_target() {
        let q = facing(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert!((q * Vec3::NEG_Z).abs_diff_eq(Vec3::X, 1e-5));

        let up = facing(Vec3::ZERO, Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert!((up * Vec3::NEG_Z).abs_diff_eq(Vec3::Y, 1e-5));

        assert!(facing(Vec3::ONE, Vec3::ONE).is_none());
    }

    #[test]
    fn centre_ray_is_forward() {
        let lens = Lens::new(75.0, 16.0 / 9.0, 0.1, 100_000.0);
        let mut pose = Pose::at(Vec3::new(0.0, 0.0, 1000.0));
        pose.look_at(Vec3::new(0.0, 0.0, 2000.0));
        let dir = lens.ray_direction(&pose, Vec2::ZERO);
        assert!(dir.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-6 && red[1].abs() < 1e-6 && red[2].abs() < 1e-6);
        let grey = hsl_to_rgb(0.3, 0.0, 0.25);
        assert_eq!(grey, [0.25, 0.25, 0.25]);
    }

    #[test]
    fn ndc_corners() {
        assert_eq!(pointer_to_ndc(0.0, 0.0, 200.0, 100.0), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_to_ndc(200.0, 100.0, 200.0, 100.0), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_to_ndc(5.0, 5.0, 0.0, 100.0), Vec2::ZERO);
    }

    #[test]
    fn frame_lerp_matches_one_frame() {
        assert!((frame_lerp(0.1, 1.0 / REFERENCE_FPS) - 0.1).abs() < 1e-5);
        assert_eq!(frame_lerp(0.1, 0.0), 0.0);
        assert!((frame_lerp(0.1, 2.0 / REFERENCE_FPS) - 0.19).abs() < 1e-5);
    }

    #[test]
    fn ray_hits_sphere_front() {
        let hit = ray_sphere(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -10.0), 2.0);
        assert!((hit.unwrap() - 8.0).abs() < 1e-5);
        assert!(ray_sphere(Vec3::ZERO, Vec3::Z, Vec3::new(0.0, 0.0, -10.0), 2.0).is_none());
        assert!(ray_sphere(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(5.0, 0.0, -10.0), 2.0).is_none());
    }
}
