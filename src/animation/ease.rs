use std::f64::consts::PI;

/// Interpolation curve of an animation track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    /// Jump straight to the end value.
    Immediate,
    #[default]
    Linear,
    /// Smoothstep.
    Bezier,
    EaseIn,
    EaseOut,
    Bounce,
    Elastic,
    Back,
}

impl Curve {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Some(Self::Immediate),
            "linear" => Some(Self::Linear),
            "bezier" | "curve" => Some(Self::Bezier),
            "ease-in" | "easein" | "ease_in" => Some(Self::EaseIn),
            "ease-out" | "easeout" | "ease_out" => Some(Self::EaseOut),
            "bounce" => Some(Self::Bounce),
            "elastic" => Some(Self::Elastic),
            "back" => Some(Self::Back),
            _ => None,
        }
    }

    pub fn apply(self, t: f64) -> f64 {
        if self == Self::Immediate {
            return if t >= 0.0 { 1.0 } else { 0.0 };
        }
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Immediate => 1.0,
            Self::Linear => t,
            Self::Bezier => t * t * (3.0 - 2.0 * t),
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::Bounce => bounce_out(t),
            Self::Elastic => {
                let c4 = (2.0 * PI) / 3.0;
                2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
            Self::Back => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
