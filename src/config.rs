//! Tuning constants for every scene.
//!
//! Every section deserializes with `#[serde(default)]`, so a page can embed a
//! partial JSON block and only override what it cares about.

use serde::Deserialize;

use crate::error::{Result, VizError};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct VizConfig {
    /// Seed for scene construction. `None` lets the host pick one.
    pub seed: Option<u64>,
    pub nav: NavConfig,
    pub flight: FlightConfig,
    pub landing: LandingConfig,
    pub holo: HoloConfig,
    pub portal: PortalConfig,
    pub stellar: StellarConfig,
}

impl VizConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.nav.validate()?;
        Ok(config)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavConfig {
    /// Autopilot disengages once closer than this.
    pub arrival_threshold: f32,
    /// Closing rate; the per-frame lerp factor is `dt * rate` clamped to `[0, 1]`.
    pub rate: f32,
    /// How far along the pointer ray a waypoint is placed.
    pub placement_distance: f32,
}

impl NavConfig {
    /// Rejects values that would stop a run from ever arriving.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(VizError::InvalidValue(format!("nav.{name} must be positive, got {value}")))
            }
        };
        positive("arrival_threshold", self.arrival_threshold)?;
        positive("rate", self.rate)?;
        positive("placement_distance", self.placement_distance)
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            arrival_threshold: 200.0,
            rate: 0.5,
            placement_distance: 5000.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlightConfig {
    /// World units per second.
    pub movement_speed: f32,
    /// Radians per second.
    pub roll_speed: f32,
    /// Radians of yaw/pitch per pixel of drag.
    pub look_sensitivity: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            movement_speed: 1000.0,
            roll_speed: std::f32::consts::PI / 12.0,
            look_sensitivity: 0.002,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LandingConfig {
    pub particle_count: usize,
    pub particle_spread: f32,
    pub particle_size: f32,
    pub shape_count: usize,
    pub load_delay: f32,
    pub fade_duration: f32,
    /// Viewports narrower than this get the reduced scene.
    pub mobile_width: f32,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            particle_count: 1000,
            particle_spread: 200.0,
            particle_size: 0.5,
            shape_count: 8,
            load_delay: 2.0,
            fade_duration: 0.5,
            mobile_width: 768.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct HoloConfig {
    pub particle_count: usize,
    pub load_delay: f32,
    pub metrics_interval: f32,
    /// Probability that a single metric changes on a jitter tick.
    pub metric_update_chance: f64,
    pub proximity_radius: f32,
    pub low_fps: f32,
}

impl Default for HoloConfig {
    fn default() -> Self {
        Self {
            particle_count: 50,
            load_delay: 4.0,
            metrics_interval: 5.0,
            metric_update_chance: 0.3,
            proximity_radius: 100.0,
            low_fps: 30.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PortalConfig {
    pub star_count: usize,
    pub quantum_count: usize,
    pub quantum_bound: f32,
    pub orbit_radius: f32,
    pub resume_delay: f32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            star_count: 500,
            quantum_count: 200,
            quantum_bound: 30.0,
            orbit_radius: 30.0,
            resume_delay: 2.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct StellarConfig {
    pub star_count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub start_position: [f32; 3],
    pub fov_y_degrees: f32,
}

impl Default for StellarConfig {
    fn default() -> Self {
        Self {
            star_count: 20_000,
            inner_radius: 5_000.0,
            outer_radius: 45_000.0,
            start_position: [0.0, 0.0, 1000.0],
            fov_y_degrees: 75.0,
        }
    }
}
