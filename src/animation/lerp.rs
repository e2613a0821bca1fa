use crate::foundation::core::{Color, Point, Size};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

impl Lerp for Size {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Size::new(
            a.width + (b.width - a.width) * t,
            a.height + (b.height - a.height) * t,
        )
    }
}

impl Lerp for Color {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Color::rgba(
            <f64 as Lerp>::lerp(&a.r, &b.r, t),
            <f64 as Lerp>::lerp(&a.g, &b.g, t),
            <f64 as Lerp>::lerp(&a.b, &b.b, t),
            <f64 as Lerp>::lerp(&a.a, &b.a, t),
        )
        .clamped()
    }
}
