use super::*;

#[test]
fn hex_colors_parse_with_and_without_alpha() {
    let c = Color::parse_hex("#FF8000").unwrap();
    assert_eq!(c.r, 1.0);
    assert!((c.g - 128.0 / 255.0).abs() < 1e-9);
    assert_eq!(c.b, 0.0);
    assert_eq!(c.a, 1.0);

    let c = Color::parse_hex("00000080").unwrap();
    assert!((c.a - 128.0 / 255.0).abs() < 1e-9);
}

#[test]
fn hex_colors_reject_bad_lengths_and_digits() {
    assert!(Color::parse_hex("#FFF").is_err());
    assert!(Color::parse_hex("#GG0000").is_err());
    assert!(Color::parse_hex("#éé0000").is_err());
}

#[test]
fn clamped_limits_components() {
    let c = Color::rgba(1.5, -0.2, 0.5, 2.0).clamped();
    assert_eq!(c, Color::rgba(1.0, 0.0, 0.5, 1.0));
}

#[test]
fn element_id_displays_with_hash() {
    assert_eq!(ElementId(42).to_string(), "#42");
}
