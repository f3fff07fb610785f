//! Scene model: the one owner of mutable scene state.
//!
//! Content edits (add, update, remove, duplicate, clear) build the next
//! element collection and record it in the `History`; the live collection
//! *is* the history entry at the cursor, so the two can never disagree.
//! Grid, view, grid visibility and selection are plain setters outside
//! history.
//!
//! Gesture output from the drag resolver arrives as `SceneMutation`s and is
//! applied through `apply_mutation`.

use crate::history::History;
use iso_core::document::SceneDocument;
use iso_core::emitter::emit_document;
use iso_core::id::ElementId;
use iso_core::model::*;
use iso_core::{EditorConfig, SceneError, SchemaError};

/// A discrete scene change produced by a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneMutation {
    /// Place a new element (palette drop).
    AddElement { kind: ElementKind, position: GridPos },
    /// Move an existing element (element drag).
    MoveElement { id: ElementId, position: GridPos },
    /// Pan the view. Never touches history.
    SetViewOffset { offset: ScreenPoint },
}

/// Elements, grid, view, selection and history of the open scene.
#[derive(Debug, Clone)]
pub struct SceneModel {
    grid: GridConfig,
    view: ViewState,
    grid_visible: bool,
    selected: Option<ElementId>,
    metadata: SceneMetadata,
    history: History,
    duplicate_offset: (i32, i32),
}

impl Default for SceneModel {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl SceneModel {
    /// Empty scene on `config.default_grid`.
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            grid: config.default_grid,
            view: ViewState::default(),
            grid_visible: true,
            selected: None,
            metadata: SceneMetadata::default(),
            history: History::new(config.history_depth),
            duplicate_offset: config.duplicate_offset,
        }
    }

    // ─── Getters ─────────────────────────────────────────────────────────

    /// Live element collection, in insertion order.
    pub fn elements(&self) -> &[Element] {
        self.history.current()
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements().iter().find(|el| el.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.and_then(|id| self.element(id))
    }

    pub fn metadata(&self) -> &SceneMetadata {
        &self.metadata
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── Content edits (recorded) ────────────────────────────────────────

    fn commit(&mut self, next: Vec<Element>) {
        self.history.record(next);
        self.metadata.modified = true;
    }

    fn index_of(&self, id: ElementId) -> Result<usize, SceneError> {
        self.elements()
            .iter()
            .position(|el| el.id == id)
            .ok_or(SceneError::NotFound(id))
    }

    /// Place a new element with default rotation and scale.
    pub fn add_element(&mut self, kind: ElementKind, position: GridPos) -> Element {
        let element = Element::new(ElementId::fresh(), kind, position);
        let mut next = self.elements().to_vec();
        next.push(element.clone());
        self.commit(next);
        log::debug!("added {} at {position}", element.id);
        element
    }

    /// Place a new element with explicit rotation and scale.
    pub fn add_element_with(
        &mut self,
        kind: ElementKind,
        position: GridPos,
        rotation: Rotation,
        scale: f64,
    ) -> Result<Element, SceneError> {
        validate_scale(scale)?;
        let mut element = Element::new(ElementId::fresh(), kind, position);
        element.rotation = rotation;
        element.scale = scale;
        let mut next = self.elements().to_vec();
        next.push(element.clone());
        self.commit(next);
        log::debug!("added {} at {position}", element.id);
        Ok(element)
    }

    /// Merge `patch` into element `id`. Nothing is recorded on error.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> Result<(), SceneError> {
        let idx = self.index_of(id)?;
        let mut next = self.elements().to_vec();
        next[idx].apply(patch)?;
        self.commit(next);
        log::debug!("updated {id}");
        Ok(())
    }

    /// Remove element `id`, clearing the selection if it pointed there.
    pub fn remove_element(&mut self, id: ElementId) -> Result<(), SceneError> {
        let idx = self.index_of(id)?;
        let mut next = self.elements().to_vec();
        next.remove(idx);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.commit(next);
        log::debug!("removed {id}");
        Ok(())
    }

    /// Clone element `id` under a fresh id, shifted by the duplicate offset,
    /// and select the copy. The copy is not clamped to the grid.
    pub fn duplicate_element(&mut self, id: ElementId) -> Result<Element, SceneError> {
        let idx = self.index_of(id)?;
        let (dx, dy) = self.duplicate_offset;
        let mut copy = self.elements()[idx].clone();
        copy.id = ElementId::fresh();
        copy.position = copy.position.offset(dx, dy);

        let mut next = self.elements().to_vec();
        next.push(copy.clone());
        self.commit(next);
        self.selected = Some(copy.id);
        log::debug!("duplicated {id} as {} at {}", copy.id, copy.position);
        Ok(copy)
    }

    /// Empty the collection. Recorded even when already empty.
    pub fn clear_scene(&mut self) {
        self.selected = None;
        self.commit(Vec::new());
        log::debug!("scene cleared");
    }

    // ─── History ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        self.after_history_move();
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        self.after_history_move();
        true
    }

    fn after_history_move(&mut self) {
        self.metadata.modified = true;
        if let Some(id) = self.selected
            && !self.contains(id)
        {
            self.selected = None;
        }
    }

    // ─── Setters (not recorded) ──────────────────────────────────────────

    /// Patch the grid. Marks the scene modified; existing elements are not
    /// moved, even if they end up outside the new bounds.
    pub fn update_grid_config(&mut self, patch: &GridPatch) -> Result<(), SceneError> {
        self.grid = self.grid.patched(patch)?;
        self.metadata.modified = true;
        log::debug!(
            "grid now {}x{} @ {}x{}",
            self.grid.grid_width,
            self.grid.grid_height,
            self.grid.tile_width,
            self.grid.tile_height
        );
        Ok(())
    }

    /// Patch the view. Zoom is clamped into `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn update_view_state(&mut self, patch: &ViewPatch) {
        self.view = self.view.patched(patch);
    }

    /// Returns the new visibility.
    pub fn toggle_grid_visibility(&mut self) -> bool {
        self.grid_visible = !self.grid_visible;
        self.grid_visible
    }

    /// Select `id`, or clear the selection with `None`.
    pub fn select_element(&mut self, id: Option<ElementId>) -> Result<(), SceneError> {
        if let Some(id) = id
            && !self.contains(id)
        {
            return Err(SceneError::NotFound(id));
        }
        self.selected = id;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.metadata.name = name.into();
    }

    /// Mark the current state as persisted.
    pub fn mark_saved(&mut self) {
        self.metadata.modified = false;
    }

    // ─── Gesture output ──────────────────────────────────────────────────

    /// Apply a resolver mutation.
    pub fn apply_mutation(&mut self, mutation: SceneMutation) -> Result<(), SceneError> {
        match mutation {
            SceneMutation::AddElement { kind, position } => {
                self.add_element(kind, position);
                Ok(())
            }
            SceneMutation::MoveElement { id, position } => {
                self.update_element(id, &ElementPatch::position(position))
            }
            SceneMutation::SetViewOffset { offset } => {
                self.update_view_state(&ViewPatch {
                    offset: Some(offset),
                    ..ViewPatch::default()
                });
                Ok(())
            }
        }
    }

    // ─── Documents ───────────────────────────────────────────────────────

    /// Snapshot grid and elements as a persistable document.
    pub fn to_document(&self) -> SceneDocument {
        emit_document(&self.grid, self.elements())
    }

    /// Replace grid and elements with `doc`'s. History restarts with the
    /// loaded collection as its only entry; the view is kept.
    pub fn load_document(&mut self, doc: &SceneDocument) -> Result<(), SchemaError> {
        self.grid = doc.metadata.grid_config()?;
        self.history.reset(doc.elements.clone());
        self.selected = None;
        self.metadata.modified = false;
        self.metadata.version = doc.version.clone();
        log::debug!("loaded scene: {} elements", doc.elements.len());
        Ok(())
    }
}
