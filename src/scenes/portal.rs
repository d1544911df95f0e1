//! Quantum portal: a spinning ring group with orbiting solids, a starfield
//! and bounded drifting particles, behind a staged loading sequence.

use glam::{Quat, Vec2, Vec3};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::config::PortalConfig;
use crate::input::InputEvent;
use crate::math::{approach, euler_xyz, frame_lerp, frames, pointer_to_ndc, pulse, Lens, Pose};
use crate::particles::ParticleSystem;
use crate::scene::{DomOp, Marker, RenderView, Scene, SceneKind};
use crate::timeline::{Interval, Timeline};

pub const LOADING_MESSAGES: [&str; 5] = [
    "Initializing quantum field...",
    "Stabilizing dimensional gateway...",
    "Calibrating particle systems...",
    "Activating portal matrix...",
    "System ready.",
];

pub const STABILITY_LABELS: [&str; 4] = ["Optimal", "Good", "Stable", "Fluctuating"];

const STABLE_SPEED: f32 = 0.01;
const ACTIVE_SPEED: f32 = 0.02;
const STABLE_EMISSIVE: f32 = 0.3;
const ACTIVE_EMISSIVE: f32 = 0.8;
const FLASH_DURATION: f32 = 0.15;
const ZOOM_DEPTH: f32 = 5.0;
const ZOOM_DURATION: f32 = 0.2;
const MANUAL_REACH: f32 = 20.0;
const MANUAL_FOLLOW: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortalState {
    Initializing,
    Stable,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    Ready,
    ResumeOrbit(u32),
    ZoomEnd,
}

/// A solid riding on the portal group.
#[derive(Clone, Debug)]
pub struct Orbiter {
    pub offset: Vec3,
    pub rotation: Vec3,
    spin: Vec3,
    pub color: [f32; 3],
}

/// Energy readout: `90 + sin(2t) * 5` percent.
pub fn energy_level(t: f32) -> f32 {
    90.0 + pulse(t, 2.0, 5.0)
}

pub fn stability_label(t: f32) -> &'static str {
    let i = ((t * 0.5).sin().abs() * STABILITY_LABELS.len() as f32) as usize;
    STABILITY_LABELS[i.min(STABILITY_LABELS.len() - 1)]
}

pub struct PortalScene {
    config: PortalConfig,
    rng: SmallRng,
    lens: Lens,
    viewport: Vec2,
    state: PortalState,
    timeline: Timeline<Event>,
    dom: Vec<DomOp>,

    progress: f32,
    progress_tick: Interval,
    message_tick: Interval,
    messages_shown: usize,

    elapsed: f32,
    paused: bool,
    torn_down: bool,

    rotation: Vec3,
    rotation_speed: f32,
    emissive: f32,
    flash: f32,
    orbiters: Vec<Orbiter>,
    starfield: ParticleSystem,
    quantum: ParticleSystem,

    camera: Vec3,
    zoomed: bool,
    pointer: Vec2,
    auto_rotate: bool,
    /// Bumped on every press so a stale resume is ignored.
    drag_generation: u32,
    info_open: bool,
}

impl PortalScene {
    pub fn new(config: &PortalConfig, mut rng: SmallRng, viewport: (f32, f32)) -> Self {
        let mut starfield = ParticleSystem::tinted_cube(&mut rng, config.star_count, 200.0, 0.6, 0.4, 0.3);
        starfield.spin = Vec3::new(0.0001, 0.0002, 0.0);
        let quantum = ParticleSystem::quantum(&mut rng, config.quantum_count, config.quantum_bound);

        let orbiters = vec![
            Orbiter {
                offset: Vec3::new(15.0, 5.0, 0.0),
                rotation: Vec3::ZERO,
                spin: Vec3::new(0.02, 0.015, 0.0),
                color: [1.0, 0.0, 1.0],
            },
            Orbiter {
                offset: Vec3::new(-12.0, -8.0, 3.0),
                rotation: Vec3::ZERO,
                spin: Vec3::new(0.01, 0.0, 0.02),
                color: [0.0, 1.0, 0.0],
            },
            Orbiter {
                offset: Vec3::new(8.0, -12.0, -5.0),
                rotation: Vec3::ZERO,
                spin: Vec3::new(0.0, 0.025, 0.01),
                color: [1.0, 1.0, 0.0],
            },
        ];

        let mut lens = Lens::new(75.0, 1.0, 0.1, 1000.0);
        lens.set_viewport(viewport.0, viewport.1);

        let mut dom = vec![
            DomOp::style("loading-screen", "display", "flex"),
            DomOp::class("app", "hidden", true),
        ];
        dom.push(DomOp::text("loading-text", LOADING_MESSAGES[0]));

        Self {
            config: config.clone(),
            rng,
            lens,
            viewport: Vec2::new(viewport.0, viewport.1),
            state: PortalState::Initializing,
            timeline: Timeline::new(),
            dom,
            progress: 0.0,
            progress_tick: Interval::new(0.18),
            message_tick: Interval::new(0.6),
            messages_shown: 1,
            elapsed: 0.0,
            paused: false,
            torn_down: false,
            rotation: Vec3::ZERO,
            rotation_speed: STABLE_SPEED,
            emissive: STABLE_EMISSIVE,
            flash: 0.0,
            orbiters,
            starfield,
            quantum,
            camera: Vec3::new(0.0, 0.0, config.orbit_radius),
            zoomed: false,
            pointer: Vec2::ZERO,
            auto_rotate: true,
            drag_generation: 0,
            info_open: false,
        }
    }

    pub fn state(&self) -> PortalState {
        self.state
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn emissive(&self) -> f32 {
        if self.flash > 0.0 {
            1.0
        } else {
            self.emissive
        }
    }

    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate
    }

    pub fn particles_visible(&self) -> bool {
        self.starfield.visible && self.quantum.visible
    }

    pub fn quantum(&self) -> &ParticleSystem {
        &self.quantum
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_pose().position
    }

    fn set_status(&mut self, state: PortalState) {
        let (success, text) = match state {
            PortalState::Active => (true, "Active"),
            _ => (false, "Stable"),
        };
        self.dom.push(DomOp::class("portal-status", "status--success", success));
        self.dom.push(DomOp::class("portal-status", "status--info", !success));
        self.dom.push(DomOp::text("portal-status", text));
        let label = if state == PortalState::Active {
            "Deactivate Portal"
        } else {
            "Activate Portal"
        };
        self.dom.push(DomOp::text("activate-btn-text", label));
    }

    fn enter(&mut self, state: PortalState) {
        self.state = state;
        let active = state == PortalState::Active;
        self.rotation_speed = if active { ACTIVE_SPEED } else { STABLE_SPEED };
        self.emissive = if active { ACTIVE_EMISSIVE } else { STABLE_EMISSIVE };
        self.set_status(state);
    }

    /// Stable ⇄ Active. Ignored while still initializing.
    pub fn toggle(&mut self) -> PortalState {
        match self.state {
            PortalState::Stable => self.enter(PortalState::Active),
            PortalState::Active => self.enter(PortalState::Stable),
            PortalState::Initializing => {}
        }
        info!("portal {:?}", self.state);
        self.state
    }

    /// Back to Stable with the camera home and auto-orbit on.
    pub fn reset(&mut self) {
        if self.state == PortalState::Initializing {
            return;
        }
        self.enter(PortalState::Stable);
        self.camera = Vec3::new(0.0, 0.0, self.config.orbit_radius);
        self.auto_rotate = true;
        self.drag_generation += 1;
    }

    fn press(&mut self) {
        self.auto_rotate = false;
        self.drag_generation += 1;
    }

    fn release(&mut self) {
        self.timeline
            .schedule(self.config.resume_delay, Event::ResumeOrbit(self.drag_generation));
    }

    fn click(&mut self) {
        if self.state == PortalState::Initializing {
            return;
        }
        self.zoomed = true;
        self.timeline.schedule(ZOOM_DURATION, Event::ZoomEnd);
        self.flash = FLASH_DURATION;
    }

    fn camera_pose(&self) -> Pose {
        let mut position = self.camera;
        if self.zoomed {
            position -= position.normalize_or_zero() * ZOOM_DEPTH;
        }
        let mut pose = Pose::at(position);
        pose.look_at(Vec3::ZERO);
        pose
    }

    fn step_loading(&mut self, dt: f32) {
        for _ in 0..self.message_tick.tick(dt) {
            if self.messages_shown < LOADING_MESSAGES.len() {
                self.dom.push(DomOp::text("loading-text", LOADING_MESSAGES[self.messages_shown]));
                self.messages_shown += 1;
            }
        }
        for _ in 0..self.progress_tick.tick(dt) {
            if self.progress >= 100.0 {
                break;
            }
            self.progress = (self.progress + self.rng.gen::<f32>() * 12.0 + 8.0).min(100.0);
            self.dom.push(DomOp::style("progress-fill", "width", format!("{}%", self.progress)));
            if self.progress >= 100.0 {
                debug!("portal loading complete");
                self.timeline.schedule(0.8, Event::Ready);
            }
        }
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::Ready => {
                self.dom.push(DomOp::style("loading-screen", "display", "none"));
                self.dom.push(DomOp::class("app", "hidden", false));
                self.enter(PortalState::Stable);
                info!("portal ready");
            }
            Event::ResumeOrbit(generation) => {
                if generation == self.drag_generation {
                    self.auto_rotate = true;
                }
            }
            Event::ZoomEnd => self.zoomed = false,
        }
    }
}

impl Scene for PortalScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Portal
    }

    fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerMove(p) | InputEvent::TouchMove(p) => {
                self.pointer = pointer_to_ndc(p.x, p.y, self.viewport.x, self.viewport.y);
            }
            InputEvent::PointerDown(_) => self.press(),
            InputEvent::TouchStart(p) => {
                self.pointer = pointer_to_ndc(p.x, p.y, self.viewport.x, self.viewport.y);
                self.press();
            }
            InputEvent::PointerUp | InputEvent::TouchEnd => self.release(),
            InputEvent::Click(_) => self.click(),
            InputEvent::Button(id) => match id.as_str() {
                "activate-btn" => {
                    self.toggle();
                }
                "reset-btn" => self.reset(),
                "particles-btn" => {
                    self.starfield.visible = !self.starfield.visible;
                    self.quantum.visible = !self.quantum.visible;
                }
                "info-btn" => {
                    self.info_open = !self.info_open;
                    self.dom.push(DomOp::class("info-panel", "hidden", !self.info_open));
                }
                _ => {}
            },
            InputEvent::Resize { width, height } => {
                self.viewport = Vec2::new(*width, *height);
                self.lens.set_viewport(*width, *height);
            }
            InputEvent::Visibility { hidden } => {
                self.paused = *hidden;
                debug!("portal loop {}", if *hidden { "paused" } else { "resumed" });
            }
            _ => {}
        }
    }

    fn update(&mut self, dt: f32) {
        let steps = frames(dt);
        if steps == 0.0 || !self.is_running() {
            return;
        }
        for event in self.timeline.advance(dt) {
            self.apply(event);
        }
        if self.state == PortalState::Initializing {
            self.step_loading(dt);
            return;
        }
        self.elapsed += dt;
        let t = self.elapsed;

        let s = self.rotation_speed * steps;
        self.rotation += Vec3::new(s * 0.5, s, s * 0.3);
        for o in &mut self.orbiters {
            o.rotation += o.spin * steps;
        }
        self.quantum.advance(dt);
        self.starfield.advance(dt);
        self.flash = (self.flash - dt).max(0.0);

        if self.auto_rotate {
            let angle = t * 0.1;
            let r = self.config.orbit_radius;
            self.camera.x = angle.cos() * r;
            self.camera.z = angle.sin() * r;
        } else {
            let follow = frame_lerp(MANUAL_FOLLOW, dt);
            let target = self.pointer * MANUAL_REACH;
            self.camera.x = approach(self.camera.x, target.x, follow);
            self.camera.y = approach(self.camera.y, target.y, follow);
        }

        self.dom.push(DomOp::text("energy-level", format!("{:.1}%", energy_level(t))));
        self.dom.push(DomOp::text("stability-level", stability_label(t)));
    }

    fn render_view(&self) -> RenderView<'_> {
        let group: Quat = euler_xyz(self.rotation);
        let mut markers = vec![Marker {
            position: Vec3::ZERO,
            color: [0.0, 1.0, 1.0],
            size: 26.0,
            opacity: 0.4 + self.emissive() * 0.5,
        }];
        markers.extend(self.orbiters.iter().map(|o| Marker {
            position: group * o.offset,
            color: o.color,
            size: 3.5,
            opacity: 0.7,
        }));

        let mut clouds = Vec::new();
        if self.starfield.visible {
            clouds.push(&self.starfield);
        }
        if self.quantum.visible {
            clouds.push(&self.quantum);
        }
        RenderView {
            view: self.camera_pose().view_matrix(),
            projection: self.lens.projection(),
            clear_color: [0.04, 0.04, 0.14, 1.0],
            clouds,
            markers,
        }
    }

    fn drain_dom(&mut self) -> Vec<DomOp> {
        std::mem::take(&mut self.dom)
    }

    fn is_running(&self) -> bool {
        !self.paused && !self.torn_down
    }

    fn teardown(&mut self) {
        self.torn_down = true;
        self.timeline.clear();
        info!("portal torn down");
    }
}
