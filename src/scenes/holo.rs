//! Holographic dashboard: four switchable panels with staggered entrances,
//! pointer-reactive ambient particles, jittering metrics and a UTC clock.

use glam::Vec2;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::Rng;

use crate::config::HoloConfig;
use crate::input::{InputEvent, Point};
use crate::math::Pose;
use crate::scene::{DomOp, RenderView, Scene, SceneKind};
use crate::timeline::{Interval, Timeline};

/// Delay before a panel's items start revealing.
const REVEAL_DELAY: f32 = 0.1;
const GLITCH_DURATION: f32 = 0.3;
const GLOW_DURATION: f32 = 0.5;
const IDLE_OPACITY: f32 = 0.6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    Status,
    Analysis,
    Controls,
    Settings,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Status, Panel::Analysis, Panel::Controls, Panel::Settings];

    pub fn id(self) -> &'static str {
        match self {
            Panel::Status => "status",
            Panel::Analysis => "analysis",
            Panel::Controls => "controls",
            Panel::Settings => "settings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Status => "SYSTEM STATUS",
            Panel::Analysis => "DATA ANALYSIS",
            Panel::Controls => "CONTROLS",
            Panel::Settings => "SETTINGS",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    /// Digit keys 1 to 4 select panels in order.
    pub fn from_key(code: &str) -> Option<Self> {
        let digit = code.strip_prefix("Digit").or_else(|| code.strip_prefix("Numpad"))?;
        let n: usize = digit.parse().ok()?;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    /// Items revealed on entrance, and the stagger between them.
    fn entrance(self) -> (usize, f32) {
        match self {
            Panel::Status => (4, 0.2),
            Panel::Analysis => (3, 0.3),
            Panel::Controls => (4, 0.15),
            Panel::Settings => (4, 0.2),
        }
    }
}

/// Sweep angle in degrees of a circular progress dial showing `value` percent.
pub fn progress_angle(value: f32) -> f32 {
    value / 100.0 * 360.0
}

/// `HH:MM:SS UTC` for a millisecond Unix timestamp.
pub fn utc_timestamp(epoch_ms: f64) -> String {
    let secs = (epoch_ms / 1000.0).floor().rem_euclid(86_400.0) as u32;
    format!("{:02}:{:02}:{:02} UTC", secs / 3600, secs / 60 % 60, secs % 60)
}

/// Opacity and scale of an ambient particle `distance` pixels from the
/// pointer.
pub fn proximity_glow(distance: f32, radius: f32) -> (f32, f32) {
    if distance < radius {
        let intensity = (radius - distance) / radius;
        (intensity, 1.0 + intensity * 0.5)
    } else {
        (IDLE_OPACITY, 1.0)
    }
}

#[derive(Clone, Debug)]
pub struct Metric {
    pub id: String,
    pub value: i32,
}

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Loaded,
    PanelEnter(Panel),
    Reveal(Panel, usize),
    Unglow(usize),
    GlitchEnd(String),
}

pub struct HoloScene {
    config: HoloConfig,
    rng: SmallRng,
    viewport: Vec2,
    loaded: bool,
    timeline: Timeline<Event>,
    dom: Vec<DomOp>,

    panel: Panel,
    /// Fractional (0..1) viewport positions of the ambient particles.
    particles: Vec<Vec2>,
    glow: Vec<(f32, f32)>,
    metrics: Vec<Metric>,
    metrics_tick: Interval,
    clock_tick: Interval,
    clock_ms: Option<f64>,
    low_performance: bool,
}

impl HoloScene {
    pub fn new(config: &HoloConfig, rng: SmallRng, viewport: (f32, f32)) -> Self {
        let groups: [(&str, &[i32]); 3] = [
            ("metric", &[67, 43, 88, 72]),
            ("status", &[89, 76, 94, 83]),
            ("indicator", &[89, 94, 83]),
        ];
        let metrics = groups
            .iter()
            .flat_map(|(prefix, values)| {
                values.iter().enumerate().map(move |(i, v)| Metric {
                    id: format!("{prefix}-{i}"),
                    value: *v,
                })
            })
            .collect();

        let mut timeline = Timeline::new();
        timeline.schedule(config.load_delay, Event::Loaded);

        let mut scene = Self {
            config: config.clone(),
            rng,
            viewport: Vec2::new(viewport.0, viewport.1),
            loaded: false,
            timeline,
            dom: Vec::new(),
            panel: Panel::Status,
            particles: Vec::new(),
            glow: Vec::new(),
            metrics,
            metrics_tick: Interval::new(config.metrics_interval),
            clock_tick: Interval::new(1.0),
            clock_ms: None,
            low_performance: false,
        };
        scene.spawn_particles();
        scene
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particle_glow(&self, index: usize) -> Option<(f32, f32)> {
        self.glow.get(index).copied()
    }

    pub fn is_low_performance(&self) -> bool {
        self.low_performance
    }

    fn spawn_particles(&mut self) {
        for i in 0..self.particles.len() {
            self.dom.push(DomOp::Remove {
                id: format!("particle-{i}"),
            });
        }
        let count = self.config.particle_count;
        self.particles = (0..count)
            .map(|_| Vec2::new(self.rng.gen::<f32>(), self.rng.gen::<f32>()))
            .collect();
        self.glow = vec![(IDLE_OPACITY, 1.0); count];
        for (i, p) in self.particles.iter().enumerate() {
            let id = format!("particle-{i}");
            self.dom.push(DomOp::Spawn {
                id: id.clone(),
                class: "particle".to_owned(),
                text: String::new(),
            });
            self.dom.push(DomOp::style(&id, "left", format!("{}%", p.x * 100.0)));
            self.dom.push(DomOp::style(&id, "top", format!("{}%", p.y * 100.0)));
            let delay = self.rng.gen::<f32>() * 6.0;
            let duration = self.rng.gen::<f32>() * 4.0 + 4.0;
            self.dom.push(DomOp::style(&id, "animation-delay", format!("{delay}s")));
            self.dom.push(DomOp::style(&id, "animation-duration", format!("{duration}s")));
        }
    }

    fn pointer_moved(&mut self, at: Point) {
        if !self.loaded {
            return;
        }
        let pointer = Vec2::new(at.x, at.y);
        for (i, p) in self.particles.iter().enumerate() {
            let d = (*p * self.viewport).distance(pointer);
            let glow = proximity_glow(d, self.config.proximity_radius);
            if self.glow[i] == glow {
                continue;
            }
            self.glow[i] = glow;
            let id = format!("particle-{i}");
            self.dom.push(DomOp::style(&id, "opacity", glow.0.to_string()));
            self.dom.push(DomOp::style(&id, "transform", format!("scale({})", glow.1)));
        }
    }

    /// Show `panel`. Returns false if it was already showing.
    pub fn switch_panel(&mut self, panel: Panel) -> bool {
        if panel == self.panel {
            return false;
        }
        debug!("switching to {} panel", panel.id());
        self.panel = panel;
        self.dom.push(DomOp::Exclusive {
            selector: ".center-panel",
            class: "active",
            id: format!("{}Panel", panel.id()),
        });
        self.dom.push(DomOp::Exclusive {
            selector: ".nav-item",
            class: "active",
            id: format!("nav-{}", panel.id()),
        });
        self.dom.push(DomOp::text(&format!("{}-title", panel.id()), panel.title()));
        self.animate_panel(panel);
        true
    }

    fn animate_panel(&mut self, panel: Panel) {
        let id = format!("{}Panel", panel.id());
        self.dom.push(DomOp::style(&id, "transform", "translateX(100%)"));
        self.dom.push(DomOp::style(&id, "opacity", "0"));
        self.timeline.schedule(0.0, Event::PanelEnter(panel));

        let (items, stagger) = panel.entrance();
        for i in 0..items {
            self.dom.push(DomOp::class(&format!("{}-item-{i}", panel.id()), "revealed", false));
            self.timeline
                .schedule(REVEAL_DELAY + i as f32 * stagger, Event::Reveal(panel, i));
        }
    }

    fn jitter_metrics(&mut self) {
        for i in 0..self.metrics.len() {
            if !self.rng.gen_bool(self.config.metric_update_chance.clamp(0.0, 1.0)) {
                continue;
            }
            let delta = self.rng.gen_range(-3..=2);
            let metric = &mut self.metrics[i];
            metric.value = (metric.value + delta).clamp(0, 100);
            let text = format!("{}%", metric.value);
            let id = metric.id.clone();
            self.dom.push(DomOp::text(&id, text));
            self.dom.push(DomOp::style(&id, "text-shadow", "0 0 20px currentColor"));
            self.timeline.schedule(GLOW_DURATION, Event::Unglow(i));
        }
    }

    fn apply(&mut self, event: Event) {
        match event {
            Event::Loaded => {
                info!("holographic interface online");
                self.loaded = true;
                self.dom.push(DomOp::class("loadingScreen", "hidden", true));
                self.dom.push(DomOp::class("hologramContainer", "active", true));
                self.animate_panel(self.panel);
            }
            Event::PanelEnter(panel) => {
                let id = format!("{}Panel", panel.id());
                self.dom.push(DomOp::style(&id, "transform", "translateX(0)"));
                self.dom.push(DomOp::style(&id, "opacity", "1"));
            }
            Event::Reveal(panel, i) => {
                // A later switch supersedes reveals still queued for this one.
                if panel == self.panel {
                    self.dom.push(DomOp::class(&format!("{}-item-{i}", panel.id()), "revealed", true));
                }
            }
            Event::Unglow(i) => {
                if let Some(m) = self.metrics.get(i) {
                    let id = m.id.clone();
                    self.dom.push(DomOp::style(&id, "text-shadow", "0 0 10px currentColor"));
                }
            }
            Event::GlitchEnd(id) => self.dom.push(DomOp::class(&id, "glitch", false)),
        }
    }

    fn sample_fps(&mut self, dt: f32) {
        let fps = (1.0 / dt).round();
        let low = fps < self.config.low_fps;
        if low != self.low_performance {
            self.low_performance = low;
            self.dom.push(DomOp::class("body", "low-performance", low));
        }
    }
}

impl Scene for HoloScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Holo
    }

    fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerMove(p) | InputEvent::TouchStart(p) | InputEvent::TouchMove(p) => {
                self.pointer_moved(*p)
            }
            InputEvent::Navigate(id) => {
                if let Some(panel) = Panel::from_id(id) {
                    self.switch_panel(panel);
                }
            }
            InputEvent::KeyDown(code) => {
                if let Some(panel) = Panel::from_key(code) {
                    self.switch_panel(panel);
                }
            }
            InputEvent::Button(id) => {
                self.dom.push(DomOp::class(id, "glitch", true));
                self.timeline.schedule(GLITCH_DURATION, Event::GlitchEnd(id.clone()));
            }
            InputEvent::Resize { width, height } => {
                self.viewport = Vec2::new(*width, *height);
                self.spawn_particles();
            }
            InputEvent::WallClock { epoch_ms } => {
                self.clock_ms = Some(*epoch_ms);
                self.clock_tick.reset();
                self.dom.push(DomOp::text("timestamp", utc_timestamp(*epoch_ms)));
            }
            _ => {}
        }
    }

    fn update(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.sample_fps(dt);
        for event in self.timeline.advance(dt) {
            self.apply(event);
        }

        if let Some(ms) = self.clock_ms.as_mut() {
            *ms += f64::from(dt) * 1000.0;
            if self.clock_tick.tick(dt) > 0 {
                let text = utc_timestamp(*ms);
                self.dom.push(DomOp::text("timestamp", text));
            }
        }

        if self.loaded {
            for _ in 0..self.metrics_tick.tick(dt) {
                self.jitter_metrics();
            }
        }
    }

    fn render_view(&self) -> RenderView<'_> {
        RenderView {
            view: Pose::default().view_matrix(),
            projection: glam::Mat4::IDENTITY,
            clear_color: [0.0, 0.02, 0.05, 1.0],
            clouds: Vec::new(),
            markers: Vec::new(),
        }
    }

    fn drain_dom(&mut self) -> Vec<DomOp> {
        std::mem::take(&mut self.dom)
    }

    fn teardown(&mut self) {
        self.timeline.clear();
        self.dom.clear();
    }
}
