//! Integration tests: full editing sessions through the `Editor` facade.

use iso_core::EditorConfig;
use iso_core::id::ElementId;
use iso_core::model::*;
use iso_core::transform::grid_to_screen;
use iso_editor::{Editor, InputEvent, Modifiers};
use iso_render::export::{ExportError, RasterFormat, Rasterizer, RenderSurface};
use iso_store::{KeyValueStore, MemoryStore, PersistError, StorageError};
use pretty_assertions::assert_eq;

/// Screen point a few pixels inside `cell`, honoring the current view.
fn over_cell(editor: &Editor, x: i32, y: i32) -> (f64, f64) {
    let grid = editor.scene().grid();
    let view = editor.scene().view();
    let anchor = grid_to_screen(x, y, grid.tile_width, grid.tile_height);
    (
        anchor.x * view.zoom + view.offset.x,
        (anchor.y + 4.0) * view.zoom + view.offset.y,
    )
}

fn drop_at(editor: &mut Editor, x: f64, y: f64) {
    editor.handle_input(&InputEvent::PointerMove { x, y });
    editor.handle_input(&InputEvent::PointerUp {
        x,
        y,
        over_canvas: true,
    });
}

// ─── Placement ──────────────────────────────────────────────────────────

#[test]
fn drop_on_grid_cell_places_element_there() {
    let mut editor = Editor::default();
    editor.begin_palette_drag(ElementType::Tree);
    let (x, y) = over_cell(&editor, 3, 2);
    drop_at(&mut editor, x, y);

    let el = &editor.scene().elements()[0];
    assert_eq!(el.position, GridPos::new(3, 2));
    assert_eq!(el.rotation, Rotation::Deg0);
    assert_eq!(el.scale, 1.0);
}

#[test]
fn drop_while_zoomed_and_panned_lands_on_same_cell() {
    let mut editor = Editor::default();
    editor.zoom_in();
    editor.zoom_in();
    editor.pan_by(-75.0, 20.0);

    editor.begin_palette_drag(ElementType::Rock);
    let (x, y) = over_cell(&editor, 6, 9);
    drop_at(&mut editor, x, y);
    assert_eq!(editor.scene().elements()[0].position, GridPos::new(6, 9));
}

#[test]
fn drop_beyond_grid_is_clamped_into_bounds() {
    let mut editor = Editor::default();
    editor.begin_palette_drag(ElementType::Water);
    let (x, y) = over_cell(&editor, 42, -7);
    drop_at(&mut editor, x, y);

    let grid = *editor.scene().grid();
    let pos = editor.scene().elements()[0].position;
    assert_eq!(pos, GridPos::new(grid.grid_width as i32 - 1, 0));
    assert!(grid.contains(pos));
}

#[test]
fn drop_outside_canvas_changes_nothing() {
    let mut editor = Editor::default();
    editor.begin_palette_drag(ElementType::Label);
    editor.handle_input(&InputEvent::PointerUp {
        x: 10.0,
        y: 10.0,
        over_canvas: false,
    });
    assert!(editor.scene().elements().is_empty());
    assert_eq!(editor.scene().history().entry_count(), 1);
}

// ─── Duplication ────────────────────────────────────────────────────────

#[test]
fn duplicate_tree_lands_diagonally_and_is_selected() {
    let mut editor = Editor::default();
    let tree = editor.scene_mut().add_element(
        ElementKind::Tree {
            species: "oak".to_string(),
        },
        GridPos::new(5, 5),
    );
    editor.select(Some(tree.id)).unwrap();

    let copy = editor.duplicate_selected().unwrap().unwrap();
    assert_eq!(copy.position, GridPos::new(6, 6));
    assert_ne!(copy.id, tree.id);
    assert_eq!(editor.scene().selected(), Some(copy.id));
    assert_eq!(editor.scene().elements().len(), 2);
}

#[test]
fn duplicate_offset_comes_from_config() {
    let config = EditorConfig {
        duplicate_offset: (2, 0),
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(config);
    let rock = editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(1, 1));
    editor.select(Some(rock.id)).unwrap();
    let copy = editor.duplicate_selected().unwrap().unwrap();
    assert_eq!(copy.position, GridPos::new(3, 1));
}

// ─── Slots ──────────────────────────────────────────────────────────────

#[test]
fn save_then_load_restores_identical_scene() {
    let mut editor = Editor::default();
    editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(1, 2));
    let house = editor.scene_mut().add_element(
        ElementKind::Building {
            floors: 3,
            color: Some("#334455".to_string()),
        },
        GridPos::new(4, 4),
    );
    editor.select(Some(house.id)).unwrap();
    editor.rotate_selected().unwrap();
    let saved_elements = editor.scene().elements().to_vec();
    let saved_grid = *editor.scene().grid();

    editor.save_slot("A").unwrap();
    assert!(!editor.scene().metadata().modified);
    assert_eq!(editor.scene().metadata().name, "A");

    editor.scene_mut().clear_scene();
    editor
        .scene_mut()
        .update_grid_config(&GridPatch {
            grid_width: Some(3),
            ..GridPatch::default()
        })
        .unwrap();

    editor.load_slot("A").unwrap();
    assert_eq!(editor.scene().elements(), saved_elements.as_slice());
    assert_eq!(editor.scene().grid(), &saved_grid);
    assert_eq!(editor.scene().selected(), None);
    assert!(!editor.scene().can_undo());
}

#[test]
fn loading_missing_slot_leaves_scene_untouched() {
    let mut editor = Editor::default();
    let el = editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(0, 0));
    let err = editor.load_slot("nope").unwrap_err();
    assert!(matches!(err, PersistError::Storage(StorageError::SlotNotFound(_))));
    assert!(editor.scene().element(el.id).is_some());
    assert!(editor.scene().can_undo());
}

#[test]
fn delete_slot_removes_index_entry() {
    let mut editor = Editor::default();
    editor.save_slot("one").unwrap();
    editor.save_slot("two").unwrap();
    editor.delete_slot("one").unwrap();

    let names: Vec<String> = editor.list_slots().unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["two".to_string()]);
}

/// A store that refuses every write.
struct ReadOnlyStore(MemoryStore);

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.get(key)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only".to_string()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only".to_string()))
    }
}

#[test]
fn failed_save_keeps_scene_dirty() {
    let mut editor = Editor::with_store(EditorConfig::default(), Box::new(ReadOnlyStore(MemoryStore::new())));
    editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(0, 0));
    assert!(editor.save_slot("x").is_err());
    assert!(editor.scene().metadata().modified);
    assert_eq!(editor.scene().metadata().name, "Untitled");
}

// ─── JSON import/export ─────────────────────────────────────────────────

#[test]
fn import_fixture_replaces_scene() {
    let mut editor = Editor::default();
    editor.import_json(include_str!("fixtures/garden.json")).unwrap();

    assert_eq!(editor.scene().grid().grid_width, 8);
    assert_eq!(editor.scene().elements().len(), 3);
    let gnome = editor.scene().element(ElementId::intern("garden_gnome")).unwrap();
    assert_eq!(gnome.rotation, Rotation::Deg90);
    assert_eq!(gnome.scale, 0.5);
}

#[test]
fn invalid_import_leaves_scene_untouched() {
    let mut editor = Editor::default();
    let el = editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(0, 0));
    assert!(editor.import_json(r#"{"version": "1.0.0"}"#).is_err());
    assert!(editor.import_json("not json").is_err());
    assert_eq!(editor.scene().elements().len(), 1);
    assert!(editor.scene().element(el.id).is_some());
}

#[test]
fn exported_json_has_persistence_schema() {
    let mut editor = Editor::default();
    editor.import_json(include_str!("fixtures/garden.json")).unwrap();
    let json = editor.export_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["version"], "1.0.0");
    assert_eq!(value["metadata"]["gridSize"]["width"], 8);
    assert_eq!(value["metadata"]["tileSize"]["height"], 32.0);
    assert_eq!(value["elements"][0]["type"], "tree");
    assert_eq!(value["elements"][0]["position"]["x"], 5);
    assert!(value["timestamp"].is_string());

    let mut other = Editor::default();
    other.import_json(&json).unwrap();
    assert_eq!(other.scene().elements(), editor.scene().elements());
}

// ─── Raster export ──────────────────────────────────────────────────────

struct ItemCounter;

impl Rasterizer for ItemCounter {
    fn rasterize(&mut self, surface: &RenderSurface, format: RasterFormat) -> Result<Vec<u8>, String> {
        let summary = format!(
            "{}x{} {} items as {}",
            surface.extent.width,
            surface.extent.height,
            surface.items.len(),
            format.extension()
        );
        Ok(summary.into_bytes())
    }
}

#[test]
fn raster_export_captures_full_grid() {
    let mut editor = Editor::default();
    editor.import_json(include_str!("fixtures/garden.json")).unwrap();
    let image = editor.export_raster(&mut ItemCounter, RasterFormat::Png).unwrap();
    assert_eq!(String::from_utf8(image.bytes).unwrap(), "512x256 3 items as png");
}

#[test]
fn overlapping_raster_exports_are_rejected() {
    let mut editor = Editor::default();
    let (ticket, surface) = editor.begin_raster_export(RasterFormat::Jpeg).unwrap();
    assert!(editor.export_in_flight());
    assert!(matches!(
        editor.export_raster(&mut ItemCounter, RasterFormat::Png),
        Err(ExportError::InFlight)
    ));

    let bytes = ItemCounter.rasterize(&surface, ticket.format()).unwrap();
    let image = editor.finish_raster_export(ticket, Ok(bytes)).unwrap();
    assert_eq!(image.format, RasterFormat::Jpeg);
    assert!(!editor.export_in_flight());
}

// ─── Panning ────────────────────────────────────────────────────────────

#[test]
fn space_drag_pans_and_leaves_elements_alone() {
    let mut editor = Editor::default();
    let el = editor.scene_mut().add_element(ElementKind::Rock {}, GridPos::new(0, 0));
    let (x, y) = over_cell(&editor, 0, 0);
    let space = Modifiers {
        space: true,
        ..Modifiers::NONE
    };
    editor.handle_input(&InputEvent::PointerDown { x, y, modifiers: space });
    drop_at(&mut editor, x + 64.0, y + 32.0);

    assert_eq!(editor.scene().view().offset, ScreenPoint::new(64.0, 32.0));
    assert_eq!(editor.scene().element(el.id).unwrap().position, GridPos::new(0, 0));
    assert_eq!(editor.scene().history().entry_count(), 2);
}
