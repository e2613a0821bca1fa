use std::collections::BTreeMap;

use anyhow::Context as _;

use crate::document::element::{
    ConnectionSnapshot, ConnectionSpec, ElementSnapshot, ElementSpec, SpaceSettings, UndoEntry,
    VisualState,
};
use crate::document::model::DocumentModel;
use crate::foundation::core::ElementId;

/// In-memory [`DocumentModel`] used by the CLI and tests.
///
/// Media elements require their path to exist on disk, mirroring a host that loads the file
/// at creation time.
#[derive(Clone, Debug, Default)]
pub struct MemoryDocument {
    next_id: u64,
    next_z: i64,
    elements: BTreeMap<ElementId, ElementSnapshot>,
    connections: BTreeMap<ElementId, ConnectionSnapshot>,
    settings: SpaceSettings,
    materialized: Vec<ElementId>,
    undo: Vec<UndoEntry>,
    visual_writes: Vec<(ElementId, VisualState)>,
    notices: Vec<String>,
    redraws: usize,
}

/// Serializable view of a [`MemoryDocument`].
#[derive(Clone, Debug, serde::Serialize)]
pub struct DocumentDump {
    pub settings: SpaceSettings,
    pub elements: Vec<ElementSnapshot>,
    pub connections: Vec<ConnectionSnapshot>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dump(&self) -> DocumentDump {
        DocumentDump {
            settings: self.settings,
            elements: self.elements.values().cloned().collect(),
            connections: self.connections.values().cloned().collect(),
        }
    }

    pub fn undo_entries(&self) -> &[UndoEntry] {
        &self.undo
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Every transient write made through [`DocumentModel::apply_visual`], in order.
    pub fn visual_writes(&self) -> &[(ElementId, VisualState)] {
        &self.visual_writes
    }

    pub fn is_materialized(&self, id: ElementId) -> bool {
        self.materialized.contains(&id)
    }

    pub fn redraw_count(&self) -> usize {
        self.redraws
    }

    /// First element whose text equals `text`.
    pub fn find_by_text(&self, text: &str) -> Option<&ElementSnapshot> {
        self.elements.values().find(|e| e.spec.text == text)
    }

    fn allocate_id(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId(self.next_id)
    }
}

impl DocumentModel for MemoryDocument {
    fn create_element(&mut self, spec: &ElementSpec) -> anyhow::Result<ElementId> {
        if let Some(path) = spec.media_path.as_ref().filter(|_| spec.kind.is_media()) {
            std::fs::metadata(path)
                .with_context(|| format!("failed to load media '{}'", path.display()))?;
        }
        let id = self.allocate_id();
        let z = self.next_z;
        self.next_z += 1;
        self.elements.insert(
            id,
            ElementSnapshot {
                id,
                z,
                spec: spec.clone(),
                visual: VisualState::default(),
            },
        );
        Ok(id)
    }

    fn materialize(&mut self, ids: &[ElementId]) {
        self.materialized.extend(ids.iter().copied());
    }

    fn connect(&mut self, spec: &ConnectionSpec) -> anyhow::Result<ElementId> {
        for end in [spec.from, spec.to] {
            if !self.elements.contains_key(&end) {
                anyhow::bail!("connection endpoint {end} does not exist");
            }
        }
        let id = self.allocate_id();
        self.connections.insert(
            id,
            ConnectionSnapshot {
                id,
                spec: spec.clone(),
            },
        );
        Ok(id)
    }

    fn delete_element(&mut self, id: ElementId) -> bool {
        if self.connections.remove(&id).is_some() {
            return true;
        }
        if self.elements.remove(&id).is_none() {
            return false;
        }
        self.connections
            .retain(|_, c| c.spec.from != id && c.spec.to != id);
        self.materialized.retain(|m| *m != id);
        true
    }

    fn element(&self, id: ElementId) -> Option<ElementSnapshot> {
        self.elements.get(&id).cloned()
    }

    fn elements(&self) -> Vec<ElementSnapshot> {
        self.elements.values().cloned().collect()
    }

    fn connections(&self) -> Vec<ConnectionSnapshot> {
        self.connections.values().cloned().collect()
    }

    fn set_text(&mut self, id: ElementId, text: &str) -> bool {
        match self.elements.get_mut(&id) {
            Some(e) => {
                e.spec.text = text.to_owned();
                true
            }
            None => false,
        }
    }

    fn apply_visual(&mut self, id: ElementId, patch: &VisualState) {
        if let Some(e) = self.elements.get_mut(&id) {
            e.visual.merge(patch);
            self.visual_writes.push((id, *patch));
        }
    }

    fn clear_visuals(&mut self) {
        for e in self.elements.values_mut() {
            e.visual = VisualState::default();
        }
    }

    fn space_settings(&self) -> SpaceSettings {
        self.settings
    }

    fn set_space_settings(&mut self, settings: SpaceSettings) {
        self.settings = settings;
    }

    fn clear_space(&mut self) {
        self.elements.clear();
        self.connections.clear();
        self.materialized.clear();
    }

    fn push_undo(&mut self, entry: UndoEntry) {
        self.undo.push(entry);
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn notify(&mut self, message: &str) {
        tracing::info!("{message}");
        self.notices.push(message.to_owned());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/memory.rs"]
mod tests;
