use stellar_viz::config::{NavConfig, VizConfig};
use stellar_viz::VizError;

#[test]
fn empty_object_yields_defaults() {
    let config = VizConfig::from_json("{}").expect("valid");
    assert_eq!(config, VizConfig::default());
    assert_eq!(config.nav.arrival_threshold, 200.0);
    assert_eq!(config.nav.rate, 0.5);
    assert_eq!(config.stellar.star_count, 20_000);
    assert_eq!(config.seed, None);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = VizConfig::from_json(
        r#"{
            "seed": 7,
            "nav": { "arrival_threshold": 150 },
            "stellar": { "start_position": [10, 20, 30] },
            "holo": { "metric_update_chance": 0.5 }
        }"#,
    )
    .expect("valid");

    assert_eq!(config.seed, Some(7));
    assert_eq!(
        config.nav,
        NavConfig {
            arrival_threshold: 150.0,
            ..NavConfig::default()
        }
    );
    assert_eq!(config.stellar.start_position, [10.0, 20.0, 30.0]);
    assert_eq!(config.stellar.inner_radius, 5_000.0);
    assert_eq!(config.holo.metric_update_chance, 0.5);
    assert_eq!(config.holo.particle_count, 50);
}

#[test]
fn malformed_json_is_a_config_error() {
    let err = VizConfig::from_json("{ \"nav\": ").unwrap_err();
    assert!(matches!(err, VizError::Config(_)));
    assert!(err.to_string().starts_with("invalid scene config"));

    let err = VizConfig::from_json(r#"{ "nav": { "rate": "fast" } }"#).unwrap_err();
    assert!(matches!(err, VizError::Config(_)));
}

#[test]
fn nav_values_that_never_arrive_are_rejected() {
    for json in [
        r#"{ "nav": { "rate": -0.5 } }"#,
        r#"{ "nav": { "rate": 0 } }"#,
        r#"{ "nav": { "arrival_threshold": 0 } }"#,
        r#"{ "nav": { "arrival_threshold": -10 } }"#,
        r#"{ "nav": { "placement_distance": 0 } }"#,
    ] {
        let err = VizConfig::from_json(json).unwrap_err();
        assert!(matches!(err, VizError::InvalidValue(_)), "{json}: {err}");
        assert!(err.to_string().starts_with("invalid scene config"));
    }
}

#[test]
fn non_finite_rate_is_rejected() {
    let config = NavConfig {
        rate: f32::INFINITY,
        ..NavConfig::default()
    };
    assert!(matches!(config.validate(), Err(VizError::InvalidValue(_))));
    assert!(NavConfig::default().validate().is_ok());
}
