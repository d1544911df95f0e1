//! Landing page: torus knot, orbiting shapes, shimmering particle cloud and
//! a portal ring, plus the "enter the dimension" sequence and the contact
//! form round trip.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::config::LandingConfig;
use crate::input::InputEvent;
use crate::math::{approach, euler_xyz, frame_lerp, frames, pointer_to_ndc, pulse, ray_sphere, Lens, Pose};
use crate::particles::{Motion, ParticleSystem, CYAN, GREEN, PURPLE};
use crate::scene::{DomOp, Marker, RenderView, Scene, SceneKind};
use crate::timeline::Timeline;

const SHAPE_PALETTE: [[f32; 3]; 4] = [
    [0.54, 0.17, 0.89],
    [0.22, 1.0, 0.08],
    [0.0, 0.5, 1.0],
    [1.0, 0.08, 0.58],
];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

const CAMERA_DISTANCE: f32 = 30.0;
const PORTAL_CENTER: Vec3 = Vec3::new(0.0, 0.0, -20.0);
const REST_EMISSIVE: f32 = 0.3;
const HOVER_EMISSIVE: f32 = 0.6;
/// Click pulse growth and the distance (on the scale vector) at which a
/// pulse leg counts as finished.
const PULSE_GROWTH: f32 = 1.5;
const PULSE_RATE: f32 = 0.1;
const PULSE_TOLERANCE: f32 = 0.01;
const CLICK_FLASH: f32 = 0.2;
const NOTIFICATION_TTL: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Icosahedron,
    Sphere,
    Octahedron,
    Tetrahedron,
}

impl ShapeKind {
    const CYCLE: [ShapeKind; 4] = [
        ShapeKind::Icosahedron,
        ShapeKind::Sphere,
        ShapeKind::Octahedron,
        ShapeKind::Tetrahedron,
    ];

    /// Bounding radius used for picking.
    pub fn radius(self) -> f32 {
        match self {
            ShapeKind::Sphere => 1.5,
            _ => 2.0,
        }
    }
}

/// Click pulse of a shape: grow to 1.5x, then settle back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pulse {
    Idle,
    Growing { rest: f32 },
    Shrinking { rest: f32 },
}

#[derive(Clone, Debug)]
pub struct Shape {
    pub kind: ShapeKind,
    pub color: [f32; 3],
    origin: Vec3,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub emissive: f32,
    pub hovered: bool,
    flash: f32,
    pulse: Pulse,
    /// Scale to restore when the dimension pulse ends.
    boosted_from: Option<f32>,
}

impl Shape {
    pub fn pulse(&self) -> Pulse {
        self.pulse
    }

    pub fn is_flashing(&self) -> bool {
        self.flash > 0.0
    }

    pub fn display_color(&self) -> [f32; 3] {
        if self.is_flashing() {
            WHITE
        } else {
            self.color
        }
    }

    fn start_pulse(&mut self) {
        if self.pulse == Pulse::Idle {
            self.pulse = Pulse::Growing { rest: self.scale };
        }
    }

    fn step_pulse(&mut self, factor: f32) {
        let gap = |a: f32, b: f32| (a - b).abs() * 3f32.sqrt();
        match self.pulse {
            Pulse::Idle => {}
            Pulse::Growing { rest } => {
                let target = rest * PULSE_GROWTH;
                self.scale = approach(self.scale, target, factor);
                if gap(self.scale, target) <= PULSE_TOLERANCE {
                    self.pulse = Pulse::Shrinking { rest };
                }
            }
            Pulse::Shrinking { rest } => {
                self.scale = approach(self.scale, rest, factor);
                if gap(self.scale, rest) <= PULSE_TOLERANCE {
                    self.scale = rest;
                    self.pulse = Pulse::Idle;
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Fading,
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactState {
    Idle,
    Sending,
    Sent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    LoadDone,
    FadeDone,
    FlashEnd,
    Ring(u8),
    RingEnd(u8),
    ShapePulse(usize),
    ShapeRestore(usize),
    ParticlesRestore,
    ContentFade,
    SequenceDone,
    HintsSettle,
    NotificationExpire(u32),
    NotificationRemove(u32),
    ContactSent,
    ContactReset,
}

/// Extra knot spin after entering the dimension: per reference frame the
/// boost grows by 0.1 and adds `0.01 * (1 + boost * 2)` until it reaches 3.
#[derive(Clone, Debug, Default)]
struct SpinBoost {
    accel: f32,
    carry: f32,
}

impl SpinBoost {
    /// Extra rotation for `steps` frames, and whether the boost is spent.
    fn step(&mut self, steps: f32) -> (f32, bool) {
        self.carry += steps;
        let mut extra = 0.0;
        while self.carry >= 1.0 {
            self.carry -= 1.0;
            self.accel += 0.1;
            if self.accel >= 3.0 {
                return (extra, true);
            }
            extra += 0.01 * (1.0 + self.accel * 2.0);
        }
        (extra, false)
    }
}

pub struct LandingScene {
    lens: Lens,
    viewport: Vec2,
    elapsed: f32,
    phase: LoadPhase,
    timeline: Timeline<Event>,
    dom: Vec<DomOp>,

    knot_rotation: Vec3,
    knot_scale: f32,
    knot_spin: f32,
    knot_boost: Option<SpinBoost>,
    shapes: Vec<Shape>,
    particles: ParticleSystem,
    portal_rotation: f32,
    portal_opacity: f32,

    pointer: Vec2,
    camera_rotation: Vec2,
    camera_target: Vec2,

    active_section: String,
    sequence_active: bool,
    contact: ContactState,
    next_notification: u32,
}

impl LandingScene {
    pub fn new(config: &LandingConfig, mut rng: SmallRng, viewport: (f32, f32)) -> Self {
        let mut particles = ParticleSystem::cube(
            &mut rng,
            config.particle_count,
            config.particle_spread,
            &[CYAN, PURPLE, GREEN],
            config.particle_size,
            Motion::Shimmer { amplitude: 0.01 },
        );

        let count = config.shape_count;
        let mut shapes: Vec<Shape> = (0..count)
            .map(|i| {
                let kind = ShapeKind::CYCLE[i % ShapeKind::CYCLE.len()];
                let radius = 20.0 + rng.gen::<f32>() * 15.0;
                let angle = i as f32 / count as f32 * TAU;
                let origin = Vec3::new(
                    angle.cos() * radius,
                    (rng.gen::<f32>() - 0.5) * 20.0,
                    angle.sin() * radius,
                );
                Shape {
                    kind,
                    color: SHAPE_PALETTE[i % SHAPE_PALETTE.len()],
                    origin,
                    position: origin,
                    rotation: Vec3::new(rng.gen::<f32>() * PI, rng.gen::<f32>() * PI, rng.gen::<f32>() * PI),
                    scale: 1.0,
                    emissive: REST_EMISSIVE,
                    hovered: false,
                    flash: 0.0,
                    pulse: Pulse::Idle,
                    boosted_from: None,
                }
            })
            .collect();

        if viewport.0 < config.mobile_width {
            debug!("narrow viewport, reducing landing scene");
            particles.point_size = 0.3;
            shapes.truncate(4);
        }

        let mut timeline = Timeline::new();
        timeline.schedule(config.load_delay, Event::LoadDone);
        timeline.schedule(config.load_delay + config.fade_duration, Event::FadeDone);

        let mut lens = Lens::new(75.0, 1.0, 0.1, 1000.0);
        lens.set_viewport(viewport.0, viewport.1);

        Self {
            lens,
            viewport: Vec2::new(viewport.0, viewport.1),
            elapsed: 0.0,
            phase: LoadPhase::Loading,
            timeline,
            dom: Vec::new(),
            knot_rotation: Vec3::ZERO,
            knot_scale: 1.0,
            knot_spin: 0.0,
            knot_boost: None,
            shapes,
            particles,
            portal_rotation: 0.0,
            portal_opacity: 0.3,
            pointer: Vec2::ZERO,
            camera_rotation: Vec2::ZERO,
            camera_target: Vec2::ZERO,
            active_section: "home".to_owned(),
            sequence_active: false,
            contact: ContactState::Idle,
            next_notification: 0,
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn knot_rotation(&self) -> Vec3 {
        self.knot_rotation
    }

    pub fn knot_scale(&self) -> f32 {
        self.knot_scale
    }

    pub fn portal_rotation(&self) -> f32 {
        self.portal_rotation
    }

    pub fn portal_opacity(&self) -> f32 {
        self.portal_opacity
    }

    pub fn camera_rotation(&self) -> Vec2 {
        self.camera_rotation
    }

    pub fn active_section(&self) -> &str {
        &self.active_section
    }

    pub fn sequence_active(&self) -> bool {
        self.sequence_active
    }

    pub fn contact_state(&self) -> ContactState {
        self.contact
    }

    fn camera_pose(&self) -> Pose {
        Pose {
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            orientation: euler_xyz(Vec3::new(self.camera_rotation.x, self.camera_rotation.y, 0.0)),
        }
    }

    /// Index of the nearest shape under the pointer at `ndc`.
    pub fn pick(&self, ndc: Vec2) -> Option<usize> {
        let pose = self.camera_pose();
        let dir = self.lens.ray_direction(&pose, ndc);
        self.shapes
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                ray_sphere(pose.position, dir, s.position, s.kind.radius() * s.scale).map(|t| (i, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn hover(&mut self, ndc: Vec2) {
        let hit = self.pick(ndc);
        for (i, shape) in self.shapes.iter_mut().enumerate() {
            let hovered = Some(i) == hit;
            if shape.hovered != hovered {
                shape.hovered = hovered;
                shape.emissive = if hovered { HOVER_EMISSIVE } else { REST_EMISSIVE };
            }
        }
    }

    fn click(&mut self, ndc: Vec2) {
        if let Some(i) = self.pick(ndc) {
            let shape = &mut self.shapes[i];
            shape.start_pulse();
            shape.flash = CLICK_FLASH;
        }
    }

    fn navigate(&mut self, section: &str) {
        self.active_section = section.to_owned();
        self.dom.push(DomOp::Exclusive {
            selector: ".nav-item",
            class: "active",
            id: format!("nav-{section}"),
        });
        self.dom.push(DomOp::Exclusive {
            selector: ".content-section",
            class: "active",
            id: section.to_owned(),
        });
    }

    fn notify(&mut self, message: &str) {
        let n = self.next_notification;
        self.next_notification += 1;
        self.dom.push(DomOp::Spawn {
            id: format!("notification-{n}"),
            class: "notification notification--success".to_owned(),
            text: message.to_owned(),
        });
        self.timeline.schedule(NOTIFICATION_TTL, Event::NotificationExpire(n));
        self.timeline.schedule(NOTIFICATION_TTL + 0.3, Event::NotificationRemove(n));
    }

    /// Start the "enter the dimension" sequence. No-op while one is running.
    pub fn enter_dimension(&mut self) {
        if self.sequence_active {
            return;
        }
        info!("entering the dimension");
        self.sequence_active = true;

        self.dom.push(DomOp::text("enter-dimension", "ACTIVATING..."));
        self.dom.push(DomOp::style("enter-dimension", "transform", "scale(1.1)"));
        self.dom.push(DomOp::style(
            "enter-dimension",
            "box-shadow",
            "0 0 30px #00ffff, 0 0 60px #00ffff, 0 0 90px #00ffff",
        ));
        self.dom.push(DomOp::Spawn {
            id: "dimension-flash".to_owned(),
            class: "dimension-flash".to_owned(),
            text: String::new(),
        });
        self.timeline.schedule(2.0, Event::FlashEnd);

        self.knot_boost = Some(SpinBoost::default());
        for i in 0..self.shapes.len() {
            let start = i as f32 * 0.1;
            self.timeline.schedule(start, Event::ShapePulse(i));
            self.timeline.schedule(start + 0.5, Event::ShapeRestore(i));
        }
        self.particles.point_size *= 2.0;
        self.timeline.schedule(3.0, Event::ParticlesRestore);

        for i in 0..3u8 {
            let start = f32::from(i) * 0.3;
            self.timeline.schedule(start, Event::Ring(i));
            self.timeline.schedule(start + 2.0, Event::RingEnd(i));
        }

        self.timeline.schedule(2.0, Event::ContentFade);
        self.timeline.schedule(3.0, Event::SequenceDone);
    }

    fn submit_contact(&mut self) {
        if self.contact != ContactState::Idle {
            return;
        }
        self.contact = ContactState::Sending;
        self.dom.push(DomOp::text("contact-submit", "Sending..."));
        self.dom.push(DomOp::class("contact-submit", "disabled", true));
        self.timeline.schedule(1.5, Event::ContactSent);
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::LoadDone => {
                self.phase = LoadPhase::Fading;
                self.dom.push(DomOp::style("loading-screen", "opacity", "0"));
            }
            Event::FadeDone => {
                self.phase = LoadPhase::Ready;
                self.dom.push(DomOp::style("loading-screen", "display", "none"));
                info!("landing scene ready");
            }
            Event::FlashEnd => self.dom.push(DomOp::Remove {
                id: "dimension-flash".to_owned(),
            }),
            Event::Ring(i) => self.dom.push(DomOp::Spawn {
                id: format!("energy-ring-{i}"),
                class: "energy-ring".to_owned(),
                text: String::new(),
            }),
            Event::RingEnd(i) => self.dom.push(DomOp::Remove {
                id: format!("energy-ring-{i}"),
            }),
            Event::ShapePulse(i) => {
                if let Some(shape) = self.shapes.get_mut(i) {
                    shape.boosted_from.get_or_insert(shape.scale);
                    shape.scale *= PULSE_GROWTH;
                    shape.emissive = 1.0;
                }
            }
            Event::ShapeRestore(i) => {
                if let Some(shape) = self.shapes.get_mut(i) {
                    if let Some(rest) = shape.boosted_from.take() {
                        shape.scale = rest;
                    }
                    shape.emissive = REST_EMISSIVE;
                }
            }
            Event::ParticlesRestore => self.particles.point_size /= 2.0,
            Event::ContentFade => {
                self.dom.push(DomOp::style("home-panel", "opacity", "0"));
                self.dom.push(DomOp::style("home-panel", "transform", "scale(0.8) translateY(-50px)"));
            }
            Event::SequenceDone => {
                self.sequence_active = false;
                self.dom.push(DomOp::class("home", "active", false));
                self.dom.push(DomOp::style("interaction-hints", "display", "block"));
                self.dom.push(DomOp::style("interaction-hints", "transform", "scale(1.2)"));
                self.timeline.schedule(3.0, Event::HintsSettle);
                self.notify("Dimension portal activated! Explore the interactive space.");
                self.dom.push(DomOp::text("enter-dimension", "Enter the Dimension"));
                self.dom.push(DomOp::style("enter-dimension", "transform", "scale(1)"));
                self.dom.push(DomOp::style("enter-dimension", "box-shadow", ""));
                self.dom.push(DomOp::style("home-panel", "opacity", "1"));
                self.dom.push(DomOp::style("home-panel", "transform", "scale(1) translateY(0)"));
            }
            Event::HintsSettle => {
                self.dom.push(DomOp::style("interaction-hints", "transform", "scale(1)"));
            }
            Event::NotificationExpire(n) => {
                self.dom.push(DomOp::class(&format!("notification-{n}"), "leaving", true));
            }
            Event::NotificationRemove(n) => self.dom.push(DomOp::Remove {
                id: format!("notification-{n}"),
            }),
            Event::ContactSent => {
                self.contact = ContactState::Sent;
                self.dom.push(DomOp::text("contact-submit", "Message Sent!"));
                self.dom.push(DomOp::class("contact-submit", "sent", true));
                self.notify("Message sent successfully! We'll get back to you soon.");
                self.timeline.schedule(2.0, Event::ContactReset);
            }
            Event::ContactReset => {
                self.contact = ContactState::Idle;
                self.dom.push(DomOp::text("contact-submit", "Send Message"));
                self.dom.push(DomOp::class("contact-submit", "disabled", false));
                self.dom.push(DomOp::class("contact-submit", "sent", false));
            }
        }
    }
}

impl Scene for LandingScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Landing
    }

    fn handle(&mut self, event: &InputEvent) {
        let ready = self.phase == LoadPhase::Ready;
        match event {
            InputEvent::PointerMove(p) => {
                self.pointer = pointer_to_ndc(p.x, p.y, self.viewport.x, self.viewport.y);
                self.camera_target = Vec2::new(self.pointer.y * 0.1, self.pointer.x * 0.1);
                if ready {
                    self.hover(self.pointer);
                }
            }
            InputEvent::Click(p) if ready => {
                let ndc = pointer_to_ndc(p.x, p.y, self.viewport.x, self.viewport.y);
                self.click(ndc);
            }
            InputEvent::Navigate(section) => self.navigate(section),
            InputEvent::Button(id) => match id.as_str() {
                "enter-dimension" => self.enter_dimension(),
                "contact-submit" => self.submit_contact(),
                _ => {}
            },
            InputEvent::Resize { width, height } => {
                self.viewport = Vec2::new(*width, *height);
                self.lens.set_viewport(*width, *height);
            }
            _ => {}
        }
    }

    fn update(&mut self, dt: f32) {
        let steps = frames(dt);
        if steps == 0.0 {
            return;
        }
        self.elapsed += dt;
        for event in self.timeline.advance(dt) {
            self.apply(event);
        }
        if self.phase != LoadPhase::Ready {
            return;
        }
        let t = self.elapsed;

        if let Some(boost) = self.knot_boost.as_mut() {
            let (extra, spent) = boost.step(steps);
            self.knot_spin += extra;
            if spent {
                self.knot_boost = None;
            }
        }
        self.knot_rotation = Vec3::new(t * 0.3 + self.knot_spin, t * 0.2 + self.knot_spin, 0.0);
        self.knot_scale = 1.0 + pulse(t, 2.0, 0.1);

        let n = self.shapes.len() as f32;
        let pulse_factor = frame_lerp(PULSE_RATE, dt);
        for (i, shape) in self.shapes.iter_mut().enumerate() {
            let sign = |on: bool| if on { 1.0 } else { -1.0 };
            shape.rotation.x += 0.01 * sign(i % 2 == 0) * steps;
            shape.rotation.y += 0.01 * sign(i % 3 == 0) * steps;
            shape.rotation.z += 0.005 * sign(i % 4 == 0) * steps;

            let phase = t + i as f32;
            let angle = t * 0.2 + i as f32 / n * TAU;
            let radius = 20.0 + phase.sin() * 3.0;
            shape.position = Vec3::new(
                angle.cos() * radius,
                shape.origin.y + phase.sin() * 2.0,
                angle.sin() * radius,
            );

            shape.step_pulse(pulse_factor);
            shape.flash = (shape.flash - dt).max(0.0);
        }

        self.particles.rotation.y = t * 0.1;
        self.particles.advance(dt);

        self.portal_rotation = t * 0.5;
        self.portal_opacity = 0.3 + pulse(t, 2.0, 0.2);

        let follow = frame_lerp(0.02, dt);
        self.camera_rotation.x = approach(self.camera_rotation.x, self.camera_target.x, follow);
        self.camera_rotation.y = approach(self.camera_rotation.y, self.camera_target.y, follow);
    }

    fn render_view(&self) -> RenderView<'_> {
        let mut markers = vec![
            Marker {
                position: Vec3::ZERO,
                color: CYAN,
                size: 13.0 * self.knot_scale,
                opacity: 1.0,
            },
            Marker {
                position: PORTAL_CENTER,
                color: CYAN,
                size: 24.0,
                opacity: self.portal_opacity,
            },
        ];
        markers.extend(self.shapes.iter().map(|s| Marker {
            position: s.position,
            color: s.display_color(),
            size: s.kind.radius() * 2.0 * s.scale,
            opacity: 0.5 + s.emissive * 0.5,
        }));
        RenderView {
            view: self.camera_pose().view_matrix(),
            projection: self.lens.projection(),
            clear_color: [0.04, 0.04, 0.04, 1.0],
            clouds: vec![&self.particles],
            markers,
        }
    }

    fn drain_dom(&mut self) -> Vec<DomOp> {
        std::mem::take(&mut self.dom)
    }

    fn teardown(&mut self) {
        self.timeline.clear();
        self.dom.clear();
        debug!("landing scene torn down");
    }
}
