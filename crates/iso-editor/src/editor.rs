//! Editor facade.
//!
//! One `Editor` owns everything an editing session needs: the scene model,
//! the drag resolver, named-slot storage and the export guard. Hosts feed
//! it `InputEvent`s and call its operations; they never mutate the scene
//! behind its back.

use crate::drag::{DragResolver, DropTarget, Gesture};
use crate::input::InputEvent;
use crate::scene::SceneModel;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use iso_core::emitter::emit_json;
use iso_core::id::ElementId;
use iso_core::model::{Element, ElementKind, ElementPatch, ElementType, ScreenPoint, ViewPatch, ViewState};
use iso_core::parser::parse_document;
use iso_core::{EditorConfig, SceneError};
use iso_render::export::{ExportError, ExportGuard, ExportTicket, RasterFormat, RasterImage, Rasterizer, RenderSurface};
use iso_render::hit::hit_test;
use iso_store::{KeyValueStore, MemoryStore, PersistError, SlotEntry, SlotStore, StorageError};

pub struct Editor {
    scene: SceneModel,
    drag: DragResolver,
    config: EditorConfig,
    slots: SlotStore<Box<dyn KeyValueStore>>,
    export: ExportGuard,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Editor with an in-memory slot store.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_store(config, Box::new(MemoryStore::new()))
    }

    pub fn with_store(config: EditorConfig, store: Box<dyn KeyValueStore>) -> Self {
        Self {
            scene: SceneModel::new(&config),
            drag: DragResolver::new(),
            config,
            slots: SlotStore::new(store),
            export: ExportGuard::new(),
        }
    }

    pub fn scene(&self) -> &SceneModel {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneModel {
        &mut self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn drag(&self) -> &DragResolver {
        &self.drag
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Start dragging a new element of `element_type` from the palette.
    pub fn begin_palette_drag(&mut self, element_type: ElementType) {
        self.begin_palette_drag_kind(element_type.default_kind());
    }

    /// Start dragging a new element with explicit type-specific fields.
    pub fn begin_palette_drag_kind(&mut self, kind: ElementKind) {
        self.gesture(Gesture::GrabPalette(kind));
    }

    /// Route one input event. Returns true if scene, view or selection changed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                let point = ScreenPoint::new(*x, *y);
                if modifiers.pans() {
                    let offset = self.scene.view().offset;
                    self.gesture(Gesture::GrabCanvas { pointer: point, offset });
                    return false;
                }
                let previous = self.scene.selected();
                let hit = hit_test(self.scene.elements(), point, self.scene.view(), self.scene.grid());
                match hit {
                    Some(id) => {
                        // The hit came from the live collection, so selection cannot fail.
                        let _ = self.scene.select_element(Some(id));
                        self.gesture(Gesture::GrabElement(id));
                    }
                    None => {
                        let _ = self.scene.select_element(None);
                        self.gesture(Gesture::Cancel);
                    }
                }
                self.scene.selected() != previous
            }
            InputEvent::PointerMove { x, y } => self.gesture(Gesture::Move(ScreenPoint::new(*x, *y))),
            InputEvent::PointerUp { x, y, over_canvas } => {
                let target = if *over_canvas { DropTarget::Surface } else { DropTarget::Outside };
                self.gesture(Gesture::Release(ScreenPoint::new(*x, *y), target))
            }
            InputEvent::PointerCancel => self.gesture(Gesture::Cancel),
            InputEvent::Scroll { zoom } => {
                let next = self.scene.view().zoom * zoom;
                self.set_zoom(next);
                true
            }
            InputEvent::Key { key, modifiers } => {
                match ShortcutMap::resolve(key, modifiers.ctrl, modifiers.shift, modifiers.alt, modifiers.meta) {
                    Some(action) => self.run_shortcut(action),
                    None => false,
                }
            }
        }
    }

    fn gesture(&mut self, gesture: Gesture) -> bool {
        let Some(mutation) = self.drag.handle(gesture, self.scene.view(), self.scene.grid()) else {
            return false;
        };
        match self.scene.apply_mutation(mutation) {
            Ok(()) => true,
            Err(err) => {
                // e.g. the dragged element was undone mid-gesture
                log::debug!("drag release ignored: {err}");
                false
            }
        }
    }

    /// Run a shortcut. Returns true if anything changed.
    pub fn run_shortcut(&mut self, action: ShortcutAction) -> bool {
        log::debug!("shortcut {action:?}");
        let step = self.config.pan_step;
        match action {
            ShortcutAction::Undo => self.scene.undo(),
            ShortcutAction::Redo => self.scene.redo(),
            ShortcutAction::Delete => self.delete_selected().unwrap_or(false),
            ShortcutAction::Duplicate => matches!(self.duplicate_selected(), Ok(Some(_))),
            ShortcutAction::Rotate => self.rotate_selected().unwrap_or(false),
            ShortcutAction::ScaleUp => self.scale_selected(self.config.scale_step).unwrap_or(false),
            ShortcutAction::ScaleDown => self.scale_selected(-self.config.scale_step).unwrap_or(false),
            ShortcutAction::ZoomIn => {
                self.zoom_in();
                true
            }
            ShortcutAction::ZoomOut => {
                self.zoom_out();
                true
            }
            ShortcutAction::ZoomReset => {
                self.zoom_reset();
                true
            }
            // Panning left reveals what lies left, so content shifts right.
            ShortcutAction::PanLeft => self.pan_by(step, 0.0),
            ShortcutAction::PanRight => self.pan_by(-step, 0.0),
            ShortcutAction::PanUp => self.pan_by(0.0, step),
            ShortcutAction::PanDown => self.pan_by(0.0, -step),
            ShortcutAction::ToggleGrid => {
                self.scene.toggle_grid_visibility();
                true
            }
            ShortcutAction::Deselect => {
                self.gesture(Gesture::Cancel);
                let had_selection = self.scene.selected().is_some();
                let _ = self.scene.select_element(None);
                had_selection
            }
        }
    }

    // ─── Selection operations ────────────────────────────────────────────

    pub fn delete_selected(&mut self) -> Result<bool, SceneError> {
        let Some(id) = self.scene.selected() else {
            return Ok(false);
        };
        self.scene.remove_element(id)?;
        Ok(true)
    }

    /// Duplicate the selection; the copy becomes the selection.
    pub fn duplicate_selected(&mut self) -> Result<Option<Element>, SceneError> {
        match self.scene.selected() {
            Some(id) => self.scene.duplicate_element(id).map(Some),
            None => Ok(None),
        }
    }

    /// Rotate the selection a quarter turn clockwise.
    pub fn rotate_selected(&mut self) -> Result<bool, SceneError> {
        let Some(el) = self.scene.selected_element() else {
            return Ok(false);
        };
        let (id, rotation) = (el.id, el.rotation.rotated_cw());
        self.scene.update_element(id, &ElementPatch::rotation(rotation))?;
        Ok(true)
    }

    /// Change the selection's scale by `delta`, clamped to the configured range.
    /// Returns false if nothing is selected or the scale is already at the limit.
    pub fn scale_selected(&mut self, delta: f64) -> Result<bool, SceneError> {
        let Some(el) = self.scene.selected_element() else {
            return Ok(false);
        };
        let id = el.id;
        let scale = (el.scale + delta).clamp(self.config.min_scale, self.config.max_scale);
        if scale == el.scale {
            return Ok(false);
        }
        self.scene.update_element(id, &ElementPatch::scale(scale))?;
        Ok(true)
    }

    pub fn select(&mut self, id: Option<ElementId>) -> Result<(), SceneError> {
        self.scene.select_element(id)
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn zoom_in(&mut self) {
        let next = self.scene.view().zoom + self.config.zoom_step;
        self.set_zoom(next);
    }

    pub fn zoom_out(&mut self) {
        let next = self.scene.view().zoom - self.config.zoom_step;
        self.set_zoom(next);
    }

    pub fn zoom_reset(&mut self) {
        self.set_zoom(ViewState::default().zoom);
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.scene.update_view_state(&ViewPatch {
            zoom: Some(zoom),
            ..ViewPatch::default()
        });
    }

    /// Shift the view offset by `(dx, dy)` screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        let offset = self.scene.view().offset + ScreenPoint::new(dx, dy);
        self.scene.update_view_state(&ViewPatch {
            offset: Some(offset),
            ..ViewPatch::default()
        });
        true
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Save the scene under `name` and clear the modified flag.
    pub fn save_slot(&mut self, name: &str) -> Result<SlotEntry, PersistError> {
        let entry = self.slots.save(name, &self.scene.to_document())?;
        self.scene.set_name(name);
        self.scene.mark_saved();
        Ok(entry)
    }

    /// Replace the scene with slot `name`. The scene is untouched on error.
    pub fn load_slot(&mut self, name: &str) -> Result<(), PersistError> {
        let doc = self.slots.load(name)?;
        self.drag.handle(Gesture::Cancel, self.scene.view(), self.scene.grid());
        self.scene.load_document(&doc)?;
        self.scene.set_name(name);
        Ok(())
    }

    pub fn delete_slot(&mut self, name: &str) -> Result<(), StorageError> {
        self.slots.delete(name)
    }

    pub fn list_slots(&self) -> Result<Vec<SlotEntry>, StorageError> {
        self.slots.list()
    }

    /// Replace the scene with a JSON document. The scene is untouched on error.
    pub fn import_json(&mut self, text: &str) -> Result<(), PersistError> {
        let doc = parse_document(text)?;
        self.drag.handle(Gesture::Cancel, self.scene.view(), self.scene.grid());
        self.scene.load_document(&doc)?;
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, PersistError> {
        Ok(emit_json(&self.scene.to_document())?)
    }

    // ─── Raster export ───────────────────────────────────────────────────

    /// Rasterize synchronously.
    pub fn export_raster(
        &mut self,
        rasterizer: &mut dyn Rasterizer,
        format: RasterFormat,
    ) -> Result<RasterImage, ExportError> {
        let surface = self.render_surface();
        self.export.run(rasterizer, &surface, format)
    }

    /// Start an asynchronous export. Hand the surface to the rasterizer and
    /// pass its outcome to `finish_raster_export`.
    pub fn begin_raster_export(&mut self, format: RasterFormat) -> Result<(ExportTicket, RenderSurface), ExportError> {
        let ticket = self.export.begin(format)?;
        Ok((ticket, self.render_surface()))
    }

    pub fn finish_raster_export(
        &mut self,
        ticket: ExportTicket,
        outcome: Result<Vec<u8>, String>,
    ) -> Result<RasterImage, ExportError> {
        self.export.finish(ticket, outcome)
    }

    pub fn export_in_flight(&self) -> bool {
        self.export.is_busy()
    }

    fn render_surface(&self) -> RenderSurface {
        RenderSurface::capture(self.scene.elements(), self.scene.grid(), self.scene.grid_visible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use iso_core::model::{GridPos, MAX_ZOOM, MIN_ZOOM, Rotation};
    use iso_core::transform::grid_to_screen;

    fn cell_point(editor: &Editor, x: i32, y: i32) -> (f64, f64) {
        let grid = editor.scene().grid();
        let view = editor.scene().view();
        let anchor = grid_to_screen(x, y, grid.tile_width, grid.tile_height);
        (
            anchor.x * view.zoom + view.offset.x,
            (anchor.y + 4.0) * view.zoom + view.offset.y,
        )
    }

    fn press(editor: &mut Editor, x: f64, y: f64, modifiers: Modifiers) -> bool {
        editor.handle_input(&InputEvent::PointerDown { x, y, modifiers })
    }

    fn release(editor: &mut Editor, x: f64, y: f64) -> bool {
        editor.handle_input(&InputEvent::PointerUp {
            x,
            y,
            over_canvas: true,
        })
    }

    #[test]
    fn palette_drag_places_element() {
        let mut editor = Editor::default();
        editor.begin_palette_drag(ElementType::Building);
        let (x, y) = cell_point(&editor, 3, 4);
        editor.handle_input(&InputEvent::PointerMove { x, y });
        assert!(release(&mut editor, x, y));

        let el = &editor.scene().elements()[0];
        assert_eq!(el.position, GridPos::new(3, 4));
        assert_eq!(el.element_type(), ElementType::Building);
    }

    #[test]
    fn press_on_element_selects_and_drags_it() {
        let mut editor = Editor::default();
        let el = editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(2, 2));

        let (x, y) = cell_point(&editor, 2, 2);
        press(&mut editor, x, y, Modifiers::NONE);
        assert_eq!(editor.scene().selected(), Some(el.id));

        let (x, y) = cell_point(&editor, 5, 1);
        release(&mut editor, x, y);
        assert_eq!(editor.scene().element(el.id).unwrap().position, GridPos::new(5, 1));
    }

    #[test]
    fn press_on_empty_canvas_deselects() {
        let mut editor = Editor::default();
        let el = editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(2, 2));
        editor.select(Some(el.id)).unwrap();

        let (x, y) = cell_point(&editor, 8, 8);
        assert!(press(&mut editor, x, y, Modifiers::NONE));
        assert_eq!(editor.scene().selected(), None);
        assert!(editor.drag().is_idle());

        assert!(!press(&mut editor, x, y, Modifiers::NONE), "nothing left to deselect");
    }

    #[test]
    fn press_reports_selection_change_only() {
        let mut editor = Editor::default();
        let el = editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(2, 2));

        let (x, y) = cell_point(&editor, 2, 2);
        assert!(press(&mut editor, x, y, Modifiers::NONE));
        release(&mut editor, x, y);
        assert_eq!(editor.scene().selected(), Some(el.id));

        assert!(!press(&mut editor, x, y, Modifiers::NONE), "already selected");
    }

    #[test]
    fn alt_press_pans_without_history() {
        let mut editor = Editor::default();
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        press(&mut editor, 100.0, 100.0, alt);
        editor.handle_input(&InputEvent::PointerMove { x: 130.0, y: 90.0 });
        release(&mut editor, 130.0, 90.0);

        assert_eq!(editor.scene().view().offset, ScreenPoint::new(30.0, -10.0));
        assert_eq!(editor.scene().history().entry_count(), 1);
        assert!(editor.drag().is_idle());
    }

    #[test]
    fn rotate_and_scale_selection() {
        let mut editor = Editor::default();
        let el = editor.scene_mut().add_element(ElementKind::Road {}, GridPos::new(0, 0));
        assert!(!editor.rotate_selected().unwrap());

        editor.select(Some(el.id)).unwrap();
        for _ in 0..4 {
            assert!(editor.rotate_selected().unwrap());
        }
        assert_eq!(editor.scene().element(el.id).unwrap().rotation, Rotation::Deg0);

        for _ in 0..100 {
            editor.scale_selected(-editor.config().scale_step).unwrap();
        }
        assert_eq!(editor.scene().element(el.id).unwrap().scale, editor.config().min_scale);
        assert!(!editor.scale_selected(-0.1).unwrap());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut editor = Editor::default();
        for _ in 0..50 {
            editor.zoom_in();
        }
        assert_eq!(editor.scene().view().zoom, MAX_ZOOM);
        editor.handle_input(&InputEvent::Scroll { zoom: 0.01 });
        assert_eq!(editor.scene().view().zoom, MIN_ZOOM);
        editor.zoom_reset();
        assert_eq!(editor.scene().view().zoom, 1.0);
    }

    #[test]
    fn key_events_run_shortcuts() {
        let mut editor = Editor::default();
        let el = editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(1, 1));
        editor.select(Some(el.id)).unwrap();

        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(editor.handle_input(&InputEvent::Key {
            key: "d".into(),
            modifiers: cmd,
        }));
        assert_eq!(editor.scene().elements().len(), 2);

        assert!(editor.handle_input(&InputEvent::Key {
            key: "Delete".into(),
            modifiers: Modifiers::NONE,
        }));
        assert_eq!(editor.scene().elements().len(), 1);

        assert!(editor.handle_input(&InputEvent::Key {
            key: "ArrowLeft".into(),
            modifiers: Modifiers::NONE,
        }));
        assert_eq!(editor.scene().view().offset, ScreenPoint::new(editor.config().pan_step, 0.0));

        assert!(!editor.handle_input(&InputEvent::Key {
            key: "q".into(),
            modifiers: Modifiers::NONE,
        }));
    }

    #[test]
    fn undo_mid_drag_makes_release_harmless() {
        let mut editor = Editor::default();
        let el = editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(2, 2));
        let (x, y) = cell_point(&editor, 2, 2);
        press(&mut editor, x, y, Modifiers::NONE);
        assert!(editor.run_shortcut(ShortcutAction::Undo));

        let (x, y) = cell_point(&editor, 4, 4);
        assert!(!release(&mut editor, x, y));
        assert!(editor.scene().element(el.id).is_none());
        assert!(editor.drag().is_idle());
    }
}
