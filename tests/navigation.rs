use approx::assert_relative_eq;
use glam::{Vec2, Vec3};

use stellar_viz::config::NavConfig;
use stellar_viz::math::{Lens, Pose};
use stellar_viz::nav::{AutopilotState, AutopilotStep, HudReadout, Navigator, Telemetry, WaypointStore};

const FRAME: f32 = 1.0 / 60.0;

fn engaged_toward(target: Vec3) -> Navigator {
    let mut nav = Navigator::default();
    nav.place_waypoint(target);
    assert_eq!(nav.toggle_autopilot(), AutopilotState::Engaged);
    nav
}

#[test]
fn store_holds_one_waypoint() {
    let mut store = WaypointStore::new();
    assert!(!store.is_set());
    assert_eq!(store.place(Vec3::X), None);
    assert_eq!(store.place(Vec3::Y), Some(Vec3::X));
    assert_eq!(store.current(), Some(Vec3::Y));
    assert_eq!(store.clear(), Some(Vec3::Y));
    assert!(!store.is_set());
}

#[test]
fn toggle_without_waypoint_stays_manual() {
    let mut nav = Navigator::default();
    assert_eq!(nav.toggle_autopilot(), AutopilotState::Disengaged);
    assert_eq!(nav.target(), None);
}

#[test]
fn toggle_targets_placed_waypoint() {
    let point = Vec3::new(120.0, -40.0, 3000.0);
    let nav = engaged_toward(point);
    assert_eq!(nav.state(), AutopilotState::Engaged);
    assert_eq!(nav.target(), Some(point));
}

#[test]
fn one_second_step_covers_half_the_distance() {
    let mut nav = engaged_toward(Vec3::new(0.0, 0.0, 1000.0));
    let mut pose = Pose::at(Vec3::ZERO);

    let step = nav.update(1.0, &mut pose);

    assert!(matches!(step, AutopilotStep::Moved { .. }));
    assert_relative_eq!(pose.position.x, 0.0, epsilon = 1e-3);
    assert_relative_eq!(pose.position.y, 0.0, epsilon = 1e-3);
    assert_relative_eq!(pose.position.z, 500.0, epsilon = 1e-3);
    assert_eq!(nav.state(), AutopilotState::Engaged);
}

#[test]
fn observer_turns_toward_target() {
    let mut nav = engaged_toward(Vec3::new(0.0, 0.0, 1000.0));
    let mut pose = Pose::at(Vec3::ZERO);
    nav.update(FRAME, &mut pose);

    let forward = pose.forward();
    assert_relative_eq!(forward.x, 0.0, epsilon = 1e-4);
    assert_relative_eq!(forward.y, 0.0, epsilon = 1e-4);
    assert_relative_eq!(forward.z, 1.0, epsilon = 1e-4);
}

#[test]
fn approach_is_monotonic_until_arrival() {
    let target = Vec3::new(300.0, -200.0, 5000.0);
    let mut nav = engaged_toward(target);
    let mut pose = Pose::at(Vec3::ZERO);
    let mut last = pose.position.distance(target);

    let mut arrived = false;
    for _ in 0..5_000 {
        match nav.update(FRAME, &mut pose) {
            AutopilotStep::Moved { .. } => {
                let d = pose.position.distance(target);
                assert!(d < last, "distance grew from {last} to {d}");
                last = d;
            }
            AutopilotStep::Arrived => {
                arrived = true;
                break;
            }
            AutopilotStep::Idle => panic!("autopilot went idle before arriving"),
        }
    }

    assert!(arrived);
    assert!(last < 200.0);
    assert_eq!(nav.state(), AutopilotState::Disengaged);
    assert_eq!(nav.target(), None);
    assert_eq!(nav.waypoint(), None);
    assert_eq!(nav.update(FRAME, &mut pose), AutopilotStep::Idle);
}

#[test]
fn clearing_waypoint_disengages() {
    let mut nav = engaged_toward(Vec3::new(0.0, 0.0, 1000.0));
    let mut pose = Pose::at(Vec3::ZERO);
    nav.update(FRAME, &mut pose);

    nav.clear_waypoint();

    assert_eq!(nav.state(), AutopilotState::Disengaged);
    assert_eq!(nav.target(), None);
    assert_eq!(nav.waypoint(), None);
    let before = pose.position;
    assert_eq!(nav.update(FRAME, &mut pose), AutopilotStep::Idle);
    assert_eq!(pose.position, before);
}

#[test]
fn new_waypoint_waits_for_current_run() {
    let first = Vec3::new(0.0, 0.0, 1000.0);
    let second = Vec3::new(0.0, 2000.0, 0.0);
    let mut nav = engaged_toward(first);
    let mut pose = Pose::at(Vec3::ZERO);

    nav.place_waypoint(second);
    assert_eq!(nav.target(), Some(first));

    while nav.update(FRAME, &mut pose) != AutopilotStep::Arrived {}

    assert!(pose.position.distance(first) < 200.0);
    assert_eq!(nav.state(), AutopilotState::Disengaged);
    assert_eq!(nav.waypoint(), Some(second));

    assert_eq!(nav.toggle_autopilot(), AutopilotState::Engaged);
    assert_eq!(nav.target(), Some(second));
}

#[test]
fn pointer_places_along_view_ray() {
    let config = NavConfig {
        placement_distance: 2500.0,
        ..NavConfig::default()
    };
    let mut nav = Navigator::new(&config);
    let pose = Pose::at(Vec3::new(0.0, 0.0, 1000.0));
    let lens = Lens::new(75.0, 16.0 / 9.0, 0.1, 100_000.0);

    let point = nav.place_from_pointer(Vec2::ZERO, &pose, &lens).expect("placed");

    assert_relative_eq!(point.z, -1500.0, epsilon = 1e-2);
    assert_eq!(nav.waypoint(), Some(point));
    assert_eq!(nav.distance_to_waypoint(pose.position).map(f32::round), Some(2500.0));
}

#[test]
fn pointer_placement_ignored_while_engaged() {
    let target = Vec3::new(0.0, 0.0, 1000.0);
    let mut nav = engaged_toward(target);
    let pose = Pose::at(Vec3::ZERO);
    let lens = Lens::new(75.0, 1.0, 0.1, 100_000.0);

    assert_eq!(nav.place_from_pointer(Vec2::ZERO, &pose, &lens), None);
    assert_eq!(nav.waypoint(), Some(target));
}

#[test]
fn telemetry_reports_au_per_second() {
    let mut telemetry = Telemetry::new(Vec3::new(0.0, 0.0, 1000.0));
    let speed = telemetry.sample(Vec3::new(0.0, 0.0, 1500.0), 0.5);
    assert_relative_eq!(speed, 1.0);
    assert_eq!(telemetry.sample(Vec3::new(0.0, 0.0, 1500.0), 0.0), 0.0);
}

#[test]
fn hud_readout_formats_fields() {
    let hud = HudReadout::new(
        Vec3::new(1500.0, 0.0, 12_345.0),
        2.0,
        AutopilotState::Engaged,
        Some(3000.0),
    );
    assert_eq!(hud.x, "1.5 AU");
    assert_eq!(hud.y, "0.0 AU");
    assert_eq!(hud.z, "12.3 AU");
    assert_eq!(hud.speed, "2.0 AU/s");
    assert_eq!(hud.mode, "AUTOPILOT");
    assert_eq!(hud.waypoint.as_deref(), Some("3.0 AU"));
}

#[test]
fn negative_rate_holds_position() {
    let config = NavConfig {
        rate: -0.5,
        ..NavConfig::default()
    };
    let target = Vec3::new(0.0, 0.0, 1000.0);
    let mut nav = Navigator::new(&config);
    nav.place_waypoint(target);
    nav.toggle_autopilot();
    let mut pose = Pose::at(Vec3::ZERO);

    for _ in 0..600 {
        nav.update(FRAME, &mut pose);
    }

    assert!(pose.position.distance(target) <= 1000.0);
}

#[test]
fn oversized_step_lands_on_target() {
    let target = Vec3::new(0.0, 0.0, 1000.0);
    let mut nav = engaged_toward(target);
    let mut pose = Pose::at(Vec3::ZERO);

    nav.update(10.0, &mut pose);

    assert_relative_eq!(pose.position.z, 1000.0, epsilon = 1e-3);
    assert_eq!(nav.update(FRAME, &mut pose), AutopilotStep::Arrived);
}
