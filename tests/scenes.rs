use rand::rngs::SmallRng;
use rand::SeedableRng;

use stellar_viz::config::{HoloConfig, LandingConfig, PortalConfig, VizConfig};
use stellar_viz::input::{InputEvent, Point};
use stellar_viz::nav::AutopilotState;
use stellar_viz::scene::{init, DomOp, Scene, SceneKind};
use stellar_viz::scenes::holo::{proximity_glow, Panel};
use stellar_viz::scenes::landing::{ContactState, LoadPhase};
use stellar_viz::scenes::portal::{energy_level, stability_label, PortalState, STABILITY_LABELS};
use stellar_viz::scenes::{HoloScene, LandingScene, PortalScene, StellarScene};

const FRAME: f32 = 1.0 / 60.0;
const VIEWPORT: (f32, f32) = (1280.0, 720.0);

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(7)
}

/// Step `scene` for `seconds` at 60 fps, collecting the DOM changes.
fn run(scene: &mut dyn Scene, seconds: f32) -> Vec<DomOp> {
    let mut ops = Vec::new();
    for _ in 0..(seconds / FRAME).round() as usize {
        scene.update(FRAME);
        ops.extend(scene.drain_dom());
    }
    ops
}

fn has_text(ops: &[DomOp], id: &str, text: &str) -> bool {
    ops.iter()
        .any(|op| matches!(op, DomOp::SetText { id: i, text: t } if i == id && t == text))
}

fn has_class(ops: &[DomOp], id: &str, class: &str, on: bool) -> bool {
    ops.iter().any(|op| {
        matches!(op, DomOp::SetClass { id: i, class: c, on: o } if i == id && *c == class && *o == on)
    })
}

fn centre() -> Point {
    Point::new(VIEWPORT.0 / 2.0, VIEWPORT.1 / 2.0)
}

#[test]
fn scene_names_parse() {
    assert_eq!("".parse::<SceneKind>().ok(), Some(SceneKind::Landing));
    assert_eq!("Holographic".parse::<SceneKind>().ok(), Some(SceneKind::Holo));
    assert_eq!("quantum".parse::<SceneKind>().ok(), Some(SceneKind::Portal));
    assert_eq!(" stellar ".parse::<SceneKind>().ok(), Some(SceneKind::Stellar));
    assert!("garden".parse::<SceneKind>().is_err());
}

#[test]
fn init_builds_requested_scene() {
    let config = VizConfig::default();
    for kind in [SceneKind::Landing, SceneKind::Holo, SceneKind::Portal, SceneKind::Stellar] {
        let scene = init(kind, &config, 1, VIEWPORT);
        assert_eq!(scene.kind(), kind);
        assert!(scene.is_running());
    }
}

// Landing

#[test]
fn landing_loads_then_fades() {
    let mut scene = LandingScene::new(&LandingConfig::default(), rng(), VIEWPORT);
    assert_eq!(scene.phase(), LoadPhase::Loading);

    let ops = run(&mut scene, 2.2);
    assert_eq!(scene.phase(), LoadPhase::Fading);
    assert!(ops.contains(&DomOp::style("loading-screen", "opacity", "0")));

    let ops = run(&mut scene, 0.5);
    assert_eq!(scene.phase(), LoadPhase::Ready);
    assert!(ops.contains(&DomOp::style("loading-screen", "display", "none")));
}

#[test]
fn landing_reduces_on_narrow_viewport() {
    let config = LandingConfig::default();
    let wide = LandingScene::new(&config, rng(), VIEWPORT);
    let narrow = LandingScene::new(&config, rng(), (480.0, 800.0));
    assert_eq!(wide.shapes().len(), 8);
    assert_eq!(narrow.shapes().len(), 4);
    assert_eq!(narrow.particles().point_size, 0.3);
    assert_eq!(narrow.particles().len(), config.particle_count);
}

#[test]
fn landing_animates_once_ready() {
    let mut scene = LandingScene::new(&LandingConfig::default(), rng(), VIEWPORT);
    run(&mut scene, 3.0);
    let before = scene.shapes()[0].position;
    run(&mut scene, 0.5);
    assert_ne!(scene.shapes()[0].position, before);
    assert!(scene.knot_rotation().x > 0.0);
    assert!((0.1..=0.5).contains(&scene.portal_opacity()));
}

#[test]
fn landing_navigation_highlights_section() {
    let mut scene = LandingScene::new(&LandingConfig::default(), rng(), VIEWPORT);
    assert_eq!(scene.active_section(), "home");

    scene.handle(&InputEvent::Navigate("about".into()));

    assert_eq!(scene.active_section(), "about");
    let ops = scene.drain_dom();
    assert!(ops.contains(&DomOp::Exclusive {
        selector: ".content-section",
        class: "active",
        id: "about".into(),
    }));
    assert!(ops.contains(&DomOp::Exclusive {
        selector: ".nav-item",
        class: "active",
        id: "nav-about".into(),
    }));
}

#[test]
fn dimension_sequence_runs_once() {
    let mut scene = LandingScene::new(&LandingConfig::default(), rng(), VIEWPORT);
    run(&mut scene, 3.0);
    let size = scene.particles().point_size;

    scene.handle(&InputEvent::Button("enter-dimension".into()));
    scene.handle(&InputEvent::Button("enter-dimension".into()));
    assert!(scene.sequence_active());
    assert_eq!(scene.particles().point_size, size * 2.0);

    let mut ops = scene.drain_dom();
    let activating = ops
        .iter()
        .filter(|op| matches!(op, DomOp::SetText { text, .. } if text == "ACTIVATING..."))
        .count();
    assert_eq!(activating, 1);

    ops.extend(run(&mut scene, 3.2));
    assert!(!scene.sequence_active());
    assert_eq!(scene.particles().point_size, size);
    assert!(ops.iter().any(|op| matches!(op, DomOp::Spawn { id, .. } if id == "dimension-flash")));
    assert!(ops.contains(&DomOp::Remove {
        id: "dimension-flash".into()
    }));
    assert!(ops.iter().any(|op| matches!(op, DomOp::Spawn { id, .. } if id == "energy-ring-2")));
    assert!(has_class(&ops, "home", "active", false));
    assert!(ops.iter().any(|op| matches!(op, DomOp::Spawn { class, .. } if class.contains("notification"))));
    assert!(has_text(&ops, "enter-dimension", "Enter the Dimension"));
    for shape in scene.shapes() {
        assert_eq!(shape.scale, 1.0);
    }
}

#[test]
fn contact_form_round_trip() {
    let mut scene = LandingScene::new(&LandingConfig::default(), rng(), VIEWPORT);
    scene.handle(&InputEvent::Button("contact-submit".into()));
    assert_eq!(scene.contact_state(), ContactState::Sending);
    assert!(has_text(&scene.drain_dom(), "contact-submit", "Sending..."));

    // A second submit while sending is ignored.
    scene.handle(&InputEvent::Button("contact-submit".into()));
    assert!(scene.drain_dom().is_empty());

    let ops = run(&mut scene, 1.6);
    assert_eq!(scene.contact_state(), ContactState::Sent);
    assert!(has_text(&ops, "contact-submit", "Message Sent!"));

    let ops = run(&mut scene, 2.1);
    assert_eq!(scene.contact_state(), ContactState::Idle);
    assert!(has_text(&ops, "contact-submit", "Send Message"));
}

// Holo

#[test]
fn holo_comes_online_after_delay() {
    let mut scene = HoloScene::new(&HoloConfig::default(), rng(), VIEWPORT);
    assert_eq!(scene.particle_count(), 50);

    run(&mut scene, 3.5);
    assert!(!scene.is_loaded());

    let ops = run(&mut scene, 1.5);
    assert!(scene.is_loaded());
    assert!(has_class(&ops, "loadingScreen", "hidden", true));
    assert!(has_class(&ops, "hologramContainer", "active", true));
    assert!(has_class(&ops, "status-item-3", "revealed", true));
}

#[test]
fn holo_switches_panels() {
    let mut scene = HoloScene::new(&HoloConfig::default(), rng(), VIEWPORT);
    assert_eq!(scene.panel(), Panel::Status);
    assert!(!scene.switch_panel(Panel::Status));

    scene.handle(&InputEvent::KeyDown("Digit2".into()));
    assert_eq!(scene.panel(), Panel::Analysis);
    scene.handle(&InputEvent::Navigate("settings".into()));
    assert_eq!(scene.panel(), Panel::Settings);

    let ops = run(&mut scene, 1.5);
    assert!(has_class(&ops, "settings-item-3", "revealed", true));
    // Reveals queued for the panel that was switched away from are dropped.
    assert!(!has_class(&ops, "analysis-item-0", "revealed", true));
}

#[test]
fn holo_clock_ticks_each_second() {
    let mut scene = HoloScene::new(&HoloConfig::default(), rng(), VIEWPORT);
    scene.handle(&InputEvent::WallClock { epoch_ms: 500.0 });
    assert!(has_text(&scene.drain_dom(), "timestamp", "00:00:00 UTC"));

    let ops = run(&mut scene, 1.1);
    assert!(has_text(&ops, "timestamp", "00:00:01 UTC"));
}

#[test]
fn holo_metrics_stay_in_range() {
    let config = HoloConfig {
        load_delay: 0.0,
        metrics_interval: 0.05,
        metric_update_chance: 1.0,
        ..HoloConfig::default()
    };
    let mut scene = HoloScene::new(&config, rng(), VIEWPORT);
    let before: Vec<i32> = scene.metrics().iter().map(|m| m.value).collect();

    run(&mut scene, 5.0);

    let after: Vec<i32> = scene.metrics().iter().map(|m| m.value).collect();
    assert_ne!(before, after);
    assert!(after.iter().all(|v| (0..=100).contains(v)));
}

#[test]
fn holo_particles_glow_near_pointer() {
    assert_eq!(proximity_glow(0.0, 100.0), (1.0, 1.5));
    assert_eq!(proximity_glow(150.0, 100.0), (0.6, 1.0));

    let config = HoloConfig {
        load_delay: 0.0,
        ..HoloConfig::default()
    };
    let mut scene = HoloScene::new(&config, rng(), VIEWPORT);
    run(&mut scene, 0.1);
    scene.handle(&InputEvent::PointerMove(Point::new(-10_000.0, -10_000.0)));
    assert_eq!(scene.particle_glow(0), Some((0.6, 1.0)));
}

#[test]
fn holo_flags_low_frame_rate() {
    let mut scene = HoloScene::new(&HoloConfig::default(), rng(), VIEWPORT);
    scene.update(0.1);
    assert!(scene.is_low_performance());
    assert!(has_class(&scene.drain_dom(), "body", "low-performance", true));

    scene.update(FRAME);
    assert!(!scene.is_low_performance());
}

// Portal

fn ready_portal() -> PortalScene {
    let mut scene = PortalScene::new(&PortalConfig::default(), rng(), VIEWPORT);
    run(&mut scene, 4.0);
    assert_eq!(scene.state(), PortalState::Stable);
    scene
}

#[test]
fn portal_loading_sequence() {
    let mut scene = PortalScene::new(&PortalConfig::default(), rng(), VIEWPORT);
    assert_eq!(scene.state(), PortalState::Initializing);
    assert_eq!(scene.toggle(), PortalState::Initializing);

    let ops = run(&mut scene, 4.0);
    assert_eq!(scene.progress(), 100.0);
    assert_eq!(scene.state(), PortalState::Stable);
    assert!(has_text(&ops, "loading-text", "Stabilizing dimensional gateway..."));
    assert!(has_class(&ops, "app", "hidden", false));
    assert!(has_text(&ops, "portal-status", "Stable"));
}

#[test]
fn portal_toggle_and_reset() {
    let mut scene = ready_portal();
    assert_eq!(scene.rotation_speed(), 0.01);

    assert_eq!(scene.toggle(), PortalState::Active);
    assert_eq!(scene.rotation_speed(), 0.02);
    assert!(has_text(&scene.drain_dom(), "activate-btn-text", "Deactivate Portal"));

    scene.handle(&InputEvent::Button("reset-btn".into()));
    assert_eq!(scene.state(), PortalState::Stable);
    assert!(scene.is_auto_rotating());
    assert_eq!(scene.emissive(), 0.3);
}

#[test]
fn portal_resumes_orbit_after_release() {
    let mut scene = ready_portal();
    scene.handle(&InputEvent::PointerDown(centre()));
    assert!(!scene.is_auto_rotating());
    scene.handle(&InputEvent::PointerUp);

    run(&mut scene, 1.0);
    scene.handle(&InputEvent::PointerDown(centre()));
    run(&mut scene, 1.5);
    // The first release's resume is stale.
    assert!(!scene.is_auto_rotating());

    scene.handle(&InputEvent::PointerUp);
    run(&mut scene, 2.1);
    assert!(scene.is_auto_rotating());
}

#[test]
fn portal_click_flashes_briefly() {
    let mut scene = ready_portal();
    scene.handle(&InputEvent::Click(centre()));
    assert_eq!(scene.emissive(), 1.0);
    run(&mut scene, 0.3);
    assert_eq!(scene.emissive(), 0.3);
}

#[test]
fn portal_pauses_while_hidden() {
    let mut scene = ready_portal();
    scene.handle(&InputEvent::Visibility { hidden: true });
    assert!(!scene.is_running());
    let camera = scene.camera_position();
    assert!(run(&mut scene, 1.0).is_empty());
    assert_eq!(scene.camera_position(), camera);

    scene.handle(&InputEvent::Visibility { hidden: false });
    assert!(scene.is_running());
    scene.teardown();
    assert!(!scene.is_running());
}

#[test]
fn portal_particles_toggle() {
    let mut scene = ready_portal();
    assert!(scene.particles_visible());
    scene.handle(&InputEvent::Button("particles-btn".into()));
    assert!(!scene.particles_visible());
    assert!(scene.render_view().clouds.is_empty());
}

#[test]
fn portal_readouts_stay_in_band() {
    for i in 0..200 {
        let t = i as f32 * 0.1;
        assert!((85.0..=95.0).contains(&energy_level(t)));
        assert!(STABILITY_LABELS.contains(&stability_label(t)));
    }
}

// Stellar

fn stellar() -> StellarScene {
    let mut scene = StellarScene::new(&VizConfig::default(), rng(), VIEWPORT);
    scene.drain_dom();
    scene
}

#[test]
fn stellar_flies_to_clicked_waypoint() {
    let mut scene = stellar();
    scene.handle(&InputEvent::KeyDown("Space".into()));
    assert_eq!(scene.navigator().state(), AutopilotState::Disengaged);

    scene.handle(&InputEvent::Click(centre()));
    let waypoint = scene.navigator().waypoint().expect("waypoint placed");
    assert!((waypoint.z + 4000.0).abs() < 1.0);

    scene.handle(&InputEvent::KeyDown("Space".into()));
    assert_eq!(scene.navigator().state(), AutopilotState::Engaged);
    let ops = run(&mut scene, FRAME);
    assert!(has_text(&ops, "mode", "AUTOPILOT"));
    assert!(ops.contains(&DomOp::style("mode", "color", "#ffff00")));

    run(&mut scene, 20.0);
    assert_eq!(scene.navigator().state(), AutopilotState::Disengaged);
    assert_eq!(scene.navigator().waypoint(), None);
    assert!(scene.pose().position.distance(waypoint) < 200.0);
    assert_eq!(scene.hud().mode, "MANUAL");
}

#[test]
fn stellar_escape_clears_and_disengages() {
    let mut scene = stellar();
    scene.handle(&InputEvent::Click(centre()));
    scene.handle(&InputEvent::KeyDown("Space".into()));
    run(&mut scene, 0.5);

    scene.handle(&InputEvent::KeyDown("Escape".into()));
    assert_eq!(scene.navigator().state(), AutopilotState::Disengaged);
    assert_eq!(scene.navigator().waypoint(), None);
}

#[test]
fn stellar_manual_flight() {
    let mut scene = stellar();
    let start = scene.pose().position;
    scene.handle(&InputEvent::KeyDown("KeyW".into()));
    run(&mut scene, 0.5);
    scene.handle(&InputEvent::KeyUp("KeyW".into()));

    let moved = scene.pose().position - start;
    assert!(moved.z < -400.0);
    assert!(scene.hud().speed != "0.0 AU/s");
}

#[test]
fn stellar_minimap_toggles() {
    let mut scene = stellar();
    assert!(scene.inset_view().is_none());
    scene.handle(&InputEvent::KeyDown("KeyM".into()));
    assert!(scene.minimap_visible());
    assert!(scene.inset_view().is_some());
    assert!(has_class(&scene.drain_dom(), "minimap", "hidden", false));
}

#[test]
fn stellar_stops_on_context_loss() {
    let mut scene = stellar();
    scene.handle(&InputEvent::ContextLost);
    assert!(!scene.is_running());
    let ops = scene.drain_dom();
    assert!(has_class(&ops, "error-message", "hidden", false));

    scene.handle(&InputEvent::ContextRestored);
    assert!(scene.is_running());
    assert!(has_class(&scene.drain_dom(), "error-message", "hidden", true));
}

#[test]
fn stellar_retry_waits_for_restored_context() {
    let mut scene = stellar();
    scene.handle(&InputEvent::ContextLost);
    scene.drain_dom();

    scene.handle(&InputEvent::Button("retry-btn".into()));
    assert!(has_class(&scene.drain_dom(), "error-message", "hidden", true));
    assert!(!scene.is_running());

    scene.handle(&InputEvent::ContextRestored);
    assert!(scene.is_running());
}

#[test]
fn stellar_renders_waypoint_beacon() {
    let mut scene = stellar();
    assert_eq!(scene.stars().len(), 20_000);
    assert!(scene.render_view().markers.is_empty());
    scene.handle(&InputEvent::Click(centre()));
    assert_eq!(scene.render_view().markers.len(), 2);
}
