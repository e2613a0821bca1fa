use crate::foundation::core::Color;
use crate::foundation::error::{ScriptError, ScriptResult};

/// Visual defaults applied to a created element before its modifiers.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementStyle {
    pub background: Color,
    pub text_color: Color,
    pub font: String,
    pub stroke_width: f64,
    pub filled: bool,
}

impl ElementStyle {
    fn new(background: Color, text_color: Color, font: &str) -> Self {
        Self {
            background,
            text_color,
            font: font.to_owned(),
            stroke_width: 0.0,
            filled: false,
        }
    }
}

/// Per-kind defaults for script-created elements.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ElementDefaults {
    pub note: ElementStyle,
    pub paper_note: ElementStyle,
    pub text: ElementStyle,
    pub media: ElementStyle,
    pub space: ElementStyle,
    pub shape: ElementStyle,
    pub connection_color: Color,
}

impl Default for ElementDefaults {
    fn default() -> Self {
        let ink = Color::rgba(0.2, 0.2, 0.2, 1.0);
        let dark_ink = Color::rgba(0.1, 0.1, 0.1, 1.0);
        Self {
            note: ElementStyle::new(Color::WHITE, ink, "Ubuntu 16"),
            paper_note: ElementStyle::new(Color::rgba(1.0, 1.0, 0.8, 1.0), ink, "Ubuntu Mono 16"),
            text: ElementStyle::new(Color::TRANSPARENT, ink, "Ubuntu 16"),
            media: ElementStyle::new(Color::WHITE, dark_ink, "Ubuntu Mono 16"),
            space: ElementStyle::new(Color::rgba(0.9, 0.9, 0.9, 1.0), dark_ink, "Ubuntu 16"),
            shape: ElementStyle {
                stroke_width: 2.0,
                ..ElementStyle::new(Color::rgba(0.95, 0.95, 0.98, 1.0), dark_ink, "Ubuntu Bold 14")
            },
            connection_color: Color::WHITE,
        }
    }
}

/// Host-tunable knobs of a scripting session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Interval requested from the host scheduler for animation ticks.
    pub tick_interval_ms: u64,
    /// Maximum nesting of variable-change handler notifications.
    pub watcher_depth_limit: usize,
    /// Tolerance for numeric change detection and auto-advance matching.
    pub tolerance: f64,
    pub defaults: ElementDefaults,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            watcher_depth_limit: 5,
            tolerance: 1e-6,
            defaults: ElementDefaults::default(),
        }
    }
}

impl SessionConfig {
    pub fn from_json(s: &str) -> ScriptResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| ScriptError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> ScriptResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(ScriptError::validation("tick_interval_ms must be > 0"));
        }
        if self.watcher_depth_limit == 0 {
            return Err(ScriptError::validation("watcher_depth_limit must be > 0"));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ScriptError::validation(
                "tolerance must be a finite, non-negative number",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
