use crate::document::element::{
    ConnectionSnapshot, ConnectionSpec, ElementSnapshot, ElementSpec, SpaceSettings, UndoEntry,
    VisualState,
};
use crate::foundation::core::ElementId;

/// Mutation and query interface of the canvas document the scripts drive.
///
/// The scripting engine never owns elements. It inserts them, reads their geometry back and
/// writes transient animation state through this trait; persistence, rendering and undo
/// storage are the implementor's concern.
pub trait DocumentModel {
    /// Insert an element. It stays invisible until [`DocumentModel::materialize`].
    ///
    /// Failures (for example an unreadable media file) abort only this element.
    fn create_element(&mut self, spec: &ElementSpec) -> anyhow::Result<ElementId>;

    /// Build visuals for a batch of freshly inserted elements.
    fn materialize(&mut self, ids: &[ElementId]);

    /// Insert a connection element between two existing elements.
    fn connect(&mut self, spec: &ConnectionSpec) -> anyhow::Result<ElementId>;

    /// Remove an element (and connections attached to it). Returns `false` when unknown.
    fn delete_element(&mut self, id: ElementId) -> bool;

    fn element(&self, id: ElementId) -> Option<ElementSnapshot>;

    /// All non-connection elements of the current space, in insertion order.
    fn elements(&self) -> Vec<ElementSnapshot>;

    fn connections(&self) -> Vec<ConnectionSnapshot>;

    /// Persisted text update. Returns `false` when the element is unknown.
    fn set_text(&mut self, id: ElementId, text: &str) -> bool;

    /// Overlay transient visual state; never persisted.
    fn apply_visual(&mut self, id: ElementId, patch: &VisualState);

    /// Drop all transient visual state.
    fn clear_visuals(&mut self);

    fn space_settings(&self) -> SpaceSettings;

    fn set_space_settings(&mut self, settings: SpaceSettings);

    /// Remove every element of the current space, keeping its settings.
    fn clear_space(&mut self);

    fn push_undo(&mut self, entry: UndoEntry);

    fn request_redraw(&mut self);

    /// Surface a short, user-visible message.
    fn notify(&mut self, message: &str);
}
