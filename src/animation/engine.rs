use std::collections::HashSet;

use crate::animation::track::{Property, Track};
use crate::document::model::DocumentModel;
use crate::foundation::core::ElementId;

/// Whether the timeline plays once or loops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    #[default]
    Single,
    Cycled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Idle,
    Running,
    Completed,
    Stopped,
}

/// Result of one [`AnimationEngine::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The engine was not running; nothing happened.
    Inactive,
    Running,
    /// Single mode: every track settled and the engine stopped.
    Completed,
    /// Cycled mode: every track settled and the timeline wrapped to zero.
    Wrapped,
}

/// Timeline of animation tracks advanced by an external periodic tick.
///
/// Values are written to the document's transient visual state only.
#[derive(Debug)]
pub struct AnimationEngine {
    tracks: Vec<Track>,
    mode: PlaybackMode,
    cursor: f64,
    state: EngineState,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            mode: PlaybackMode::Single,
            cursor: 0.0,
            state: EngineState::Idle,
        }
    }

    /// Replace the track set. The engine becomes idle.
    pub fn load(&mut self, tracks: Vec<Track>, mode: PlaybackMode) {
        tracing::debug!(tracks = tracks.len(), ?mode, "animation engine loaded");
        self.tracks = tracks;
        self.mode = mode;
        self.cursor = 0.0;
        self.state = EngineState::Idle;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    /// Current timeline position in seconds.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Rewind to zero, show every element in its initial animated state and start running.
    pub fn start<D: DocumentModel + ?Sized>(&mut self, doc: &mut D) {
        if self.tracks.is_empty() {
            return;
        }
        self.rewind(doc);
        self.state = EngineState::Running;
    }

    /// Stop playback. Track definitions are kept.
    pub fn stop(&mut self) {
        if self.state == EngineState::Running {
            tracing::debug!(cursor = self.cursor, "animation engine stopped");
            self.state = EngineState::Stopped;
        }
    }

    pub fn tick<D: DocumentModel + ?Sized>(&mut self, delta: f64, doc: &mut D) -> TickOutcome {
        if self.state != EngineState::Running {
            return TickOutcome::Inactive;
        }
        self.cursor += delta.max(0.0);
        self.advance(doc);

        if !self.tracks.iter().all(Track::is_settled) {
            return TickOutcome::Running;
        }
        match self.mode {
            PlaybackMode::Single => {
                self.state = EngineState::Completed;
                tracing::debug!("animation completed");
                TickOutcome::Completed
            }
            PlaybackMode::Cycled => {
                self.rewind(doc);
                TickOutcome::Wrapped
            }
        }
    }

    fn advance<D: DocumentModel + ?Sized>(&mut self, doc: &mut D) {
        let cursor = self.cursor;
        for track in self.tracks.iter_mut().filter(|t| !t.settled) {
            if cursor >= track.end() {
                doc.apply_visual(track.element, &track.values.end_state());
                track.settled = true;
            } else if track.contains(cursor) {
                doc.apply_visual(track.element, &track.values.sample(track.progress(cursor)));
            }
        }
    }

    /// Cursor to zero, all tracks live again, each animated property at its first `from`.
    fn rewind<D: DocumentModel + ?Sized>(&mut self, doc: &mut D) {
        self.cursor = 0.0;
        for t in &mut self.tracks {
            t.settled = false;
        }

        let mut order: Vec<usize> = (0..self.tracks.len()).collect();
        order.sort_by(|a, b| self.tracks[*a].start.total_cmp(&self.tracks[*b].start));
        let mut seen: HashSet<(ElementId, Property)> = HashSet::new();
        for i in order {
            let t = &self.tracks[i];
            if seen.insert((t.element, t.values.property())) {
                doc.apply_visual(t.element, &t.values.start_state());
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/engine.rs"]
mod tests;
