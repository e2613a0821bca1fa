use crate::animation::ease::Curve;
use crate::animation::lerp::Lerp;
use crate::document::element::VisualState;
use crate::foundation::core::{Color, ElementId, Point, Size};

/// Which element property a track drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Position,
    Size,
    Rotation,
    Color,
    /// Appear/disappear, driven through alpha.
    Existence,
}

/// Endpoint values of a track.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TrackValues {
    Position { from: Point, to: Point },
    Size { from: Size, to: Size },
    Rotation { from: f64, to: f64 },
    Color { from: Color, to: Color },
    Alpha { from: f64, to: f64 },
}

impl TrackValues {
    pub fn property(&self) -> Property {
        match self {
            Self::Position { .. } => Property::Position,
            Self::Size { .. } => Property::Size,
            Self::Rotation { .. } => Property::Rotation,
            Self::Color { .. } => Property::Color,
            Self::Alpha { .. } => Property::Existence,
        }
    }

    /// Visual patch holding the exact `from` value.
    pub fn start_state(&self) -> VisualState {
        self.endpoint(true)
    }

    /// Visual patch holding the exact `to` value.
    pub fn end_state(&self) -> VisualState {
        self.endpoint(false)
    }

    fn endpoint(&self, start: bool) -> VisualState {
        fn pick<T: Copy>(start: bool, from: &T, to: &T) -> T {
            if start { *from } else { *to }
        }
        let mut v = VisualState::default();
        match self {
            Self::Position { from, to } => v.position = Some(pick(start, from, to)),
            Self::Size { from, to } => v.size = Some(pick(start, from, to)),
            Self::Rotation { from, to } => v.rotation = Some(pick(start, from, to)),
            Self::Color { from, to } => v.color = Some(pick(start, from, to)),
            Self::Alpha { from, to } => v.alpha = Some(pick(start, from, to)),
        }
        v
    }

    /// Visual patch at eased progress `p` (0 = from, 1 = to).
    pub fn sample(&self, p: f64) -> VisualState {
        let mut v = VisualState::default();
        match self {
            Self::Position { from, to } => v.position = Some(Lerp::lerp(from, to, p)),
            Self::Size { from, to } => v.size = Some(Lerp::lerp(from, to, p)),
            Self::Rotation { from, to } => v.rotation = Some(Lerp::lerp(from, to, p)),
            Self::Color { from, to } => v.color = Some(Lerp::lerp(from, to, p)),
            Self::Alpha { from, to } => v.alpha = Some(Lerp::lerp(from, to, p)),
        }
        v
    }
}

/// One animated property change over `[start, start + duration)` seconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Track {
    pub element: ElementId,
    pub start: f64,
    pub duration: f64,
    pub curve: Curve,
    pub values: TrackValues,
    #[serde(skip)]
    pub(crate) settled: bool,
}

impl Track {
    pub fn new(element: ElementId, start: f64, duration: f64, curve: Curve, values: TrackValues) -> Self {
        Self {
            element,
            start: start.max(0.0),
            duration: duration.max(0.0),
            curve,
            values,
            settled: false,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Whether `cursor` lies inside the track's half-open window.
    pub fn contains(&self, cursor: f64) -> bool {
        cursor >= self.start && cursor < self.end()
    }

    /// Eased progress at `cursor`.
    pub fn progress(&self, cursor: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        self.curve.apply((cursor - self.start) / self.duration)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/track.rs"]
mod tests;
