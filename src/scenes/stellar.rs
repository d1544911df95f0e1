//! Stellar navigation: free flight through a star shell, click-to-place
//! waypoints and an autopilot that flies to them.

use glam::{Mat4, Vec2, Vec3};
use log::{debug, warn};
use rand::rngs::SmallRng;

use crate::config::{FlightConfig, VizConfig};
use crate::input::{InputEvent, Point};
use crate::math::{pointer_to_ndc, Lens, Pose};
use crate::nav::{
    au, mode_color, mode_label, AutopilotState, AutopilotStep, FlightInput, HudReadout, Navigator, Telemetry,
};
use crate::particles::ParticleSystem;
use crate::scene::{DomOp, Marker, RenderView, Scene, SceneKind};
use crate::timeline::Timeline;

const WAYPOINT_COLOR: [f32; 3] = [0.0, 1.0, 1.0];
const MINIMAP_ALTITUDE: f32 = 10_000.0;
const MINIMAP_HALF_EXTENT: f32 = 5_000.0;
const CONTEXT_LOST_MESSAGE: &str = "Graphics context lost. Please refresh the page.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    LoadingHidden,
}

pub struct StellarScene {
    flight_config: FlightConfig,
    lens: Lens,
    viewport: Vec2,
    timeline: Timeline<Event>,
    dom: Vec<DomOp>,

    pose: Pose,
    navigator: Navigator,
    flight: FlightInput,
    telemetry: Telemetry,
    stars: ParticleSystem,

    last_pointer: Option<Point>,
    minimap_visible: bool,
    context_lost: bool,
    shown_mode: Option<AutopilotState>,
}

impl StellarScene {
    pub fn new(config: &VizConfig, mut rng: SmallRng, viewport: (f32, f32)) -> Self {
        let stellar = &config.stellar;
        let start = Vec3::from_array(stellar.start_position);
        let stars = ParticleSystem::star_shell(&mut rng, stellar.star_count, stellar.inner_radius, stellar.outer_radius);
        debug!("created {} stars", stars.len());

        let mut lens = Lens::new(stellar.fov_y_degrees, 1.0, 0.1, 100_000.0);
        lens.set_viewport(viewport.0, viewport.1);

        let mut timeline = Timeline::new();
        timeline.schedule(0.5, Event::LoadingHidden);

        Self {
            flight_config: config.flight.clone(),
            lens,
            viewport: Vec2::new(viewport.0, viewport.1),
            timeline,
            dom: vec![
                DomOp::style("loading-screen", "opacity", "0"),
                DomOp::class("hud", "hidden", false),
            ],
            pose: Pose::at(start),
            navigator: Navigator::new(&config.nav),
            flight: FlightInput::new(),
            telemetry: Telemetry::new(start),
            stars,
            last_pointer: None,
            minimap_visible: false,
            context_lost: false,
            shown_mode: None,
        }
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn stars(&self) -> &ParticleSystem {
        &self.stars
    }

    pub fn minimap_visible(&self) -> bool {
        self.minimap_visible
    }

    pub fn hud(&self) -> HudReadout {
        HudReadout::new(
            self.pose.position,
            self.telemetry.speed(),
            self.navigator.state(),
            self.navigator.distance_to_waypoint(self.pose.position),
        )
    }

    /// Place a waypoint under the pointer at pixel `at`.
    pub fn place_waypoint_at(&mut self, at: Point) -> Option<Vec3> {
        let ndc = pointer_to_ndc(at.x, at.y, self.viewport.x, self.viewport.y);
        self.navigator.place_from_pointer(ndc, &self.pose, &self.lens)
    }

    /// Top-down camera for the minimap, following the observer on x/z.
    pub fn minimap_pose(&self) -> Pose {
        let mut pose = Pose::at(Vec3::new(self.pose.position.x, MINIMAP_ALTITUDE, self.pose.position.z));
        pose.look_at(Vec3::new(self.pose.position.x, 0.0, self.pose.position.z));
        pose
    }

    fn on_key(&mut self, code: &str) {
        match code {
            "Space" => {
                self.navigator.toggle_autopilot();
            }
            "Escape" => self.navigator.clear_waypoint(),
            "KeyM" => {
                self.minimap_visible = !self.minimap_visible;
                self.dom.push(DomOp::class("minimap", "hidden", !self.minimap_visible));
            }
            other => {
                self.flight.key_down(other);
            }
        }
    }

    fn show_error(&mut self, message: &str) {
        self.dom.push(DomOp::text("error-text", message));
        self.dom.push(DomOp::class("error-message", "hidden", false));
    }

    fn hide_error(&mut self) {
        self.dom.push(DomOp::class("error-message", "hidden", true));
    }

    fn push_hud(&mut self) {
        let hud = self.hud();
        self.dom.push(DomOp::text("pos-x", hud.x));
        self.dom.push(DomOp::text("pos-y", hud.y));
        self.dom.push(DomOp::text("pos-z", hud.z));
        self.dom.push(DomOp::text("speed", hud.speed));

        let state = self.navigator.state();
        if self.shown_mode != Some(state) {
            self.shown_mode = Some(state);
            self.dom.push(DomOp::text("mode", mode_label(state)));
            self.dom.push(DomOp::style("mode", "color", mode_color(state)));
        }

        let info = match hud.waypoint {
            Some(distance) => format!("WAYPOINT ACTIVE\nDistance: {distance}\nPress SPACEBAR for autopilot"),
            None => "Click to place waypoint\nPress SPACEBAR for autopilot\nPress ESC to clear waypoints".to_owned(),
        };
        self.dom.push(DomOp::text("waypoint-info", info));
    }
}

impl Scene for StellarScene {
    fn kind(&self) -> SceneKind {
        SceneKind::Stellar
    }

    fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(code) => self.on_key(code),
            InputEvent::KeyUp(code) => {
                self.flight.key_up(code);
            }
            InputEvent::Click(p) => {
                if let Some(point) = self.place_waypoint_at(*p) {
                    debug!("waypoint {} away", au(point.distance(self.pose.position)));
                }
            }
            InputEvent::PointerDown(p) => {
                self.last_pointer = Some(*p);
                self.flight.pointer_down();
            }
            InputEvent::PointerUp => self.flight.pointer_up(),
            InputEvent::PointerMove(p) => {
                if let Some(last) = self.last_pointer.replace(*p) {
                    self.flight.pointer_moved(Vec2::new(p.x - last.x, p.y - last.y));
                }
            }
            InputEvent::Button(id) if id == "retry-btn" => {
                // Drawing resumes on ContextRestored.
                self.hide_error();
            }
            InputEvent::Resize { width, height } => {
                self.viewport = Vec2::new(*width, *height);
                self.lens.set_viewport(*width, *height);
            }
            InputEvent::Visibility { hidden: true } => self.flight.release_all(),
            InputEvent::ContextLost => {
                warn!("WebGL context lost");
                self.context_lost = true;
                self.show_error(CONTEXT_LOST_MESSAGE);
            }
            InputEvent::ContextRestored => {
                self.context_lost = false;
                self.hide_error();
            }
            _ => {}
        }
    }

    fn update(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 || self.context_lost {
            return;
        }
        for event in self.timeline.advance(dt) {
            match event {
                Event::LoadingHidden => self.dom.push(DomOp::style("loading-screen", "display", "none")),
            }
        }

        if self.navigator.state() == AutopilotState::Disengaged {
            self.flight.apply(dt, &mut self.pose, &self.flight_config);
        }
        if let AutopilotStep::Arrived = self.navigator.update(dt, &mut self.pose) {
            debug!("arrived at {}", self.pose.position);
        }
        self.telemetry.sample(self.pose.position, dt);
        self.push_hud();
    }

    fn render_view(&self) -> RenderView<'_> {
        let markers = self
            .navigator
            .waypoint()
            .map(|w| {
                vec![
                    Marker {
                        position: w,
                        color: WAYPOINT_COLOR,
                        size: 100.0,
                        opacity: 0.8,
                    },
                    Marker {
                        position: w,
                        color: WAYPOINT_COLOR,
                        size: 200.0,
                        opacity: 0.3,
                    },
                ]
            })
            .unwrap_or_default();
        RenderView {
            view: self.pose.view_matrix(),
            projection: self.lens.projection(),
            clear_color: [0.0, 0.0, 0.067, 1.0],
            clouds: vec![&self.stars],
            markers,
        }
    }

    fn inset_view(&self) -> Option<(Mat4, Mat4)> {
        if !self.minimap_visible {
            return None;
        }
        let e = MINIMAP_HALF_EXTENT;
        Some((
            self.minimap_pose().view_matrix(),
            Mat4::orthographic_rh_gl(-e, e, -e, e, 1.0, 50_000.0),
        ))
    }

    fn drain_dom(&mut self) -> Vec<DomOp> {
        std::mem::take(&mut self.dom)
    }

    fn is_running(&self) -> bool {
        !self.context_lost
    }

    fn teardown(&mut self) {
        self.flight.release_all();
        self.timeline.clear();
    }
}
