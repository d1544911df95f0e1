//! The scene context: everything a demo page needs between `init` and
//! `teardown`, updated from a single per-frame entry point.

use std::str::FromStr;

use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::VizConfig;
use crate::error::{Result, VizError};
use crate::input::InputEvent;
use crate::particles::ParticleSystem;
use crate::scenes::{HoloScene, LandingScene, PortalScene, StellarScene};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneKind {
    Landing,
    Holo,
    Portal,
    Stellar,
}

impl FromStr for SceneKind {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "landing" => Ok(SceneKind::Landing),
            "holo" | "holographic" => Ok(SceneKind::Holo),
            "portal" | "quantum" => Ok(SceneKind::Portal),
            "stellar" | "navigation" => Ok(SceneKind::Stellar),
            other => Err(VizError::Unsupported(format!("scene `{other}`"))),
        }
    }
}

/// A DOM change requested by a scene. The host applies these after each
/// frame; scenes never touch the document themselves.
#[derive(Clone, Debug, PartialEq)]
pub enum DomOp {
    SetText { id: String, text: String },
    SetStyle { id: String, property: &'static str, value: String },
    SetClass { id: String, class: &'static str, on: bool },
    /// Remove `class` from every element matching `selector`, then add it to
    /// the element with `id`.
    Exclusive { selector: &'static str, class: &'static str, id: String },
    /// Append a transient element to the body.
    Spawn { id: String, class: String, text: String },
    Remove { id: String },
}

impl DomOp {
    pub fn text(id: &str, text: impl Into<String>) -> Self {
        DomOp::SetText {
            id: id.to_owned(),
            text: text.into(),
        }
    }

    pub fn style(id: &str, property: &'static str, value: impl Into<String>) -> Self {
        DomOp::SetStyle {
            id: id.to_owned(),
            property,
            value: value.into(),
        }
    }

    pub fn class(id: &str, class: &'static str, on: bool) -> Self {
        DomOp::SetClass {
            id: id.to_owned(),
            class,
            on,
        }
    }
}

/// A single point drawn on top of the particle clouds: a stand-in for a
/// mesh, a waypoint beacon and so on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub position: Vec3,
    pub color: [f32; 3],
    pub size: f32,
    pub opacity: f32,
}

/// What the renderer needs for one frame.
pub struct RenderView<'a> {
    pub view: Mat4,
    pub projection: Mat4,
    pub clear_color: [f32; 4],
    pub clouds: Vec<&'a ParticleSystem>,
    pub markers: Vec<Marker>,
}

pub trait Scene {
    fn kind(&self) -> SceneKind;

    /// React to one input event. Called before `update` for the frame.
    fn handle(&mut self, event: &InputEvent);

    /// Advance the scene by `dt` seconds.
    fn update(&mut self, dt: f32);

    fn render_view(&self) -> RenderView<'_>;

    /// View and projection for a secondary inset canvas, when one is shown.
    fn inset_view(&self) -> Option<(Mat4, Mat4)> {
        None
    }

    /// DOM changes accumulated since the last call.
    fn drain_dom(&mut self) -> Vec<DomOp>;

    /// Whether the frame loop should keep rendering.
    fn is_running(&self) -> bool {
        true
    }

    /// Release per-scene resources. The scene is not updated afterwards.
    fn teardown(&mut self) {}
}

/// Build the scene for `kind`. `viewport` is the canvas size in pixels.
pub fn init(kind: SceneKind, config: &VizConfig, seed: u64, viewport: (f32, f32)) -> Box<dyn Scene> {
    let seed = config.seed.unwrap_or(seed);
    let rng = SmallRng::seed_from_u64(seed);
    log::info!("initializing {kind:?} scene (seed {seed})");
    match kind {
        SceneKind::Landing => Box::new(LandingScene::new(&config.landing, rng, viewport)),
        SceneKind::Holo => Box::new(HoloScene::new(&config.holo, rng, viewport)),
        SceneKind::Portal => Box::new(PortalScene::new(&config.portal, rng, viewport)),
        SceneKind::Stellar => Box::new(StellarScene::new(config, rng, viewport)),
    }
}
