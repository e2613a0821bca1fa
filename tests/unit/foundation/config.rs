use super::*;

#[test]
fn defaults_match_documented_styles() {
    let cfg = SessionConfig::default();
    assert_eq!(cfg.tick_interval_ms, 16);
    assert_eq!(cfg.watcher_depth_limit, 5);
    assert_eq!(cfg.defaults.note.font, "Ubuntu 16");
    assert_eq!(cfg.defaults.paper_note.background, Color::rgba(1.0, 1.0, 0.8, 1.0));
    assert_eq!(cfg.defaults.shape.stroke_width, 2.0);
    assert!(!cfg.defaults.shape.filled);
    assert_eq!(cfg.defaults.connection_color, Color::WHITE);
}

#[test]
fn partial_json_fills_in_defaults() {
    let cfg = SessionConfig::from_json(r#"{ "tick_interval_ms": 40 }"#).unwrap();
    assert_eq!(cfg.tick_interval_ms, 40);
    assert_eq!(cfg.watcher_depth_limit, 5);
    assert_eq!(cfg.defaults, ElementDefaults::default());
}

#[test]
fn invalid_values_are_rejected() {
    let err = SessionConfig::from_json(r#"{ "tick_interval_ms": 0 }"#).unwrap_err();
    assert!(err.to_string().contains("tick_interval_ms"));

    let err = SessionConfig::from_json("{ not json").unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
}
