use super::*;

fn mover() -> Track {
    Track::new(
        ElementId(1),
        0.0,
        1000.0,
        Curve::Linear,
        TrackValues::Position {
            from: Point::new(0.0, 0.0),
            to: Point::new(100.0, 100.0),
        },
    )
}

#[test]
fn window_is_half_open() {
    let t = mover();
    assert!(t.contains(0.0));
    assert!(t.contains(999.9));
    assert!(!t.contains(1000.0));
}

#[test]
fn midpoint_sample_is_halfway() {
    let t = mover();
    let v = t.values.sample(t.progress(500.0));
    assert_eq!(v.position, Some(Point::new(50.0, 50.0)));
    assert!(v.size.is_none());
}

#[test]
fn color_and_alpha_blend() {
    let c = TrackValues::Color {
        from: Color::rgba(0.0, 0.0, 0.0, 1.0),
        to: Color::rgba(1.0, 0.5, 0.0, 1.0),
    };
    assert_eq!(c.sample(0.5).color, Some(Color::rgba(0.5, 0.25, 0.0, 1.0)));
    assert_eq!(c.property(), Property::Color);

    let fade = TrackValues::Alpha { from: 1.0, to: 0.0 };
    assert_eq!(fade.sample(0.25).alpha, Some(0.75));
}

#[test]
fn zero_duration_is_complete_immediately() {
    let t = Track::new(
        ElementId(1),
        2.0,
        0.0,
        Curve::Linear,
        TrackValues::Rotation { from: 0.0, to: 90.0 },
    );
    assert_eq!(t.progress(2.0), 1.0);
    assert!(!t.contains(2.0));
}

#[test]
fn immediate_track_shows_its_end_value_from_the_first_sample() {
    let t = Track::new(
        ElementId(1),
        1.0,
        2.0,
        Curve::Immediate,
        TrackValues::Position {
            from: Point::new(0.0, 0.0),
            to: Point::new(40.0, 40.0),
        },
    );
    assert!(t.contains(1.0));
    assert_eq!(t.values.sample(t.progress(1.0)).position, Some(Point::new(40.0, 40.0)));
}
