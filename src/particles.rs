//! Point clouds that own their vertex buffers.
//!
//! Buffers are flat `x, y, z` triples so the renderer can upload them as-is.
//! Per-point sizes are multipliers of the cloud's `point_size`.

use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};
use rand::Rng;

use crate::math::{euler_xyz, frames, hsl_to_rgb};

pub const CYAN: [f32; 3] = [0.0, 1.0, 1.0];
pub const PURPLE: [f32; 3] = [0.54, 0.17, 0.89];
pub const GREEN: [f32; 3] = [0.22, 1.0, 0.08];

/// How a cloud's points move on each [`ParticleSystem::advance`].
#[derive(Clone, Debug, PartialEq)]
pub enum Motion {
    Static,
    /// Each point bobs vertically by `sin(t + k) * amplitude` per reference
    /// frame, `k` being the point's offset in the position buffer.
    Shimmer { amplitude: f32 },
    /// Points travel along their velocity (per reference frame); once a
    /// point is farther than `bound` from the origin its velocity is scaled
    /// by `bounce`.
    Drift { bound: f32, bounce: f32 },
}

#[derive(Clone, Debug)]
pub struct ParticleSystem {
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
    velocities: Vec<f32>,
    motion: Motion,
    /// Euler rotation of the whole cloud.
    pub rotation: Vec3,
    /// Added to `rotation` every reference frame.
    pub spin: Vec3,
    pub point_size: f32,
    pub visible: bool,
    elapsed: f32,
}

impl ParticleSystem {
    fn with_capacity(count: usize, point_size: f32, motion: Motion) -> Self {
        Self {
            positions: Vec::with_capacity(count * 3),
            colors: Vec::with_capacity(count * 3),
            sizes: Vec::with_capacity(count),
            velocities: Vec::new(),
            motion,
            rotation: Vec3::ZERO,
            spin: Vec3::ZERO,
            point_size,
            visible: true,
            elapsed: 0.0,
        }
    }

    fn push(&mut self, p: Vec3, color: [f32; 3], size: f32) {
        self.positions.extend_from_slice(&[p.x, p.y, p.z]);
        self.colors.extend_from_slice(&color);
        self.sizes.push(size);
    }

    /// Points scattered uniformly in a cube of side `spread`, coloured by
    /// picking one of `palette` uniformly.
    pub fn cube<R: Rng>(
        rng: &mut R,
        count: usize,
        spread: f32,
        palette: &[[f32; 3]],
        point_size: f32,
        motion: Motion,
    ) -> Self {
        let mut ps = Self::with_capacity(count, point_size, motion);
        for _ in 0..count {
            let p = Vec3::new(
                (rng.gen::<f32>() - 0.5) * spread,
                (rng.gen::<f32>() - 0.5) * spread,
                (rng.gen::<f32>() - 0.5) * spread,
            );
            let color = if palette.is_empty() {
                CYAN
            } else {
                palette[rng.gen_range(0..palette.len())]
            };
            ps.push(p, color, 1.0);
        }
        ps
    }

    /// Cube cloud with hues drawn from `hue_min..hue_min + hue_span`.
    pub fn tinted_cube<R: Rng>(
        rng: &mut R,
        count: usize,
        spread: f32,
        hue_min: f32,
        hue_span: f32,
        point_size: f32,
    ) -> Self {
        let mut ps = Self::with_capacity(count, point_size, Motion::Static);
        for _ in 0..count {
            let p = Vec3::new(
                (rng.gen::<f32>() - 0.5) * spread,
                (rng.gen::<f32>() - 0.5) * spread,
                (rng.gen::<f32>() - 0.5) * spread,
            );
            let color = hsl_to_rgb(hue_min + rng.gen::<f32>() * hue_span, 0.8, 0.8);
            ps.push(p, color, 1.0);
        }
        ps
    }

    /// Star field: a uniform-direction shell between `inner` and `outer`
    /// radius with faintly blue-white colours and sizes in 1..4.
    pub fn star_shell<R: Rng>(rng: &mut R, count: usize, inner: f32, outer: f32) -> Self {
        let mut ps = Self::with_capacity(count, 1.0, Motion::Static);
        let span = (outer - inner).max(0.0);
        for _ in 0..count {
            let radius = rng.gen::<f32>() * span + inner;
            let theta = rng.gen::<f32>() * TAU;
            let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
            let p = Vec3::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            );
            let color = hsl_to_rgb(
                0.6 + rng.gen::<f32>() * 0.1,
                rng.gen::<f32>() * 0.3,
                0.8 + rng.gen::<f32>() * 0.2,
            );
            let size = rng.gen::<f32>() * 3.0 + 1.0;
            ps.push(p, color, size);
        }
        ps
    }

    /// Drifting points in a shell of radius 15..25 around the origin.
    pub fn quantum<R: Rng>(rng: &mut R, count: usize, bound: f32) -> Self {
        let mut ps = Self::with_capacity(count, 0.5, Motion::Drift { bound, bounce: -0.5 });
        ps.velocities.reserve(count * 3);
        for _ in 0..count {
            let radius = 15.0 + rng.gen::<f32>() * 10.0;
            let theta = rng.gen::<f32>() * TAU;
            let phi = rng.gen::<f32>() * 2.0 * PI;
            let p = Vec3::new(
                radius * theta.cos() * phi.sin(),
                radius * theta.sin() * phi.sin(),
                radius * phi.cos(),
            );
            ps.push(p, CYAN, 1.0);
            for _ in 0..3 {
                ps.velocities.push((rng.gen::<f32>() - 0.5) * 0.02);
            }
        }
        ps
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions
            .get(index * 3..index * 3 + 3)
            .map(Vec3::from_slice)
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_quat(euler_xyz(self.rotation))
    }

    /// Step the cloud by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let steps = frames(dt);
        if steps == 0.0 {
            return;
        }
        self.elapsed += dt;
        self.rotation += self.spin * steps;

        match self.motion {
            Motion::Static => {}
            Motion::Shimmer { amplitude } => {
                let t = self.elapsed;
                for k in (0..self.positions.len()).step_by(3) {
                    self.positions[k + 1] += (t + k as f32).sin() * amplitude * steps;
                }
            }
            Motion::Drift { bound, bounce } => {
                let bound_sq = bound * bound;
                for (p, v) in self
                    .positions
                    .chunks_exact_mut(3)
                    .zip(self.velocities.chunks_exact_mut(3))
                {
                    p[0] += v[0] * steps;
                    p[1] += v[1] * steps;
                    p[2] += v[2] * steps;
                    if p[0] * p[0] + p[1] * p[1] + p[2] * p[2] > bound_sq {
                        v[0] *= bounce;
                        v[1] *= bounce;
                        v[2] *= bounce;
                    }
                }
            }
        }
    }
}
