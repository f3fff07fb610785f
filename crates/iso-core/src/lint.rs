//! Lint diagnostics for scene documents.
//!
//! Reports questionable placements without modifying the document.
//! Results feed the `isogrid check` command.

use crate::document::SceneDocument;
use crate::id::ElementId;
use crate::model::{ElementKind, GridConfig, GridPos};
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Should be fixed; likely a mistake.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    /// The elements this diagnostic refers to.
    pub elements: SmallVec<[ElementId; 2]>,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "out-of-bounds", "stacked-cell").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

/// Run all lint rules over a document and return diagnostics.
///
/// A document whose grid metadata is unusable yields no bounds findings;
/// `parser::parse_document` already rejects such documents.
#[must_use]
pub fn lint_document(doc: &SceneDocument) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    if let Ok(grid) = doc.metadata.grid_config() {
        lint_out_of_bounds(doc, &grid, &mut diags);
    }
    lint_stacked_cells(doc, &mut diags);
    lint_empty_labels(doc, &mut diags);
    diags
}

// ─── Rules ───────────────────────────────────────────────────────────────

/// Duplication does not clamp, so copies near the edge can leave the grid.
fn lint_out_of_bounds(doc: &SceneDocument, grid: &GridConfig, diags: &mut Vec<LintDiagnostic>) {
    for el in &doc.elements {
        if !grid.contains(el.position) {
            diags.push(LintDiagnostic {
                elements: SmallVec::from_slice(&[el.id]),
                message: format!(
                    "`{}` sits at {} outside the {}x{} grid and cannot be reached by dragging.",
                    el.id, el.position, grid.grid_width, grid.grid_height
                ),
                severity: LintSeverity::Warning,
                rule: "out-of-bounds",
            });
        }
    }
}

/// Several elements on one cell; only the last one drawn is clickable.
fn lint_stacked_cells(doc: &SceneDocument, diags: &mut Vec<LintDiagnostic>) {
    let mut cells: HashMap<GridPos, SmallVec<[ElementId; 2]>> = HashMap::new();
    let mut order: Vec<GridPos> = Vec::new();
    for el in &doc.elements {
        let entry = cells.entry(el.position).or_default();
        if entry.is_empty() {
            order.push(el.position);
        }
        entry.push(el.id);
    }

    for pos in order {
        let ids = &cells[&pos];
        if ids.len() < 2 {
            continue;
        }
        let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        diags.push(LintDiagnostic {
            elements: ids.clone(),
            message: format!("{} elements share cell {pos}: {}", ids.len(), names.join(", ")),
            severity: LintSeverity::Info,
            rule: "stacked-cell",
        });
    }
}

fn lint_empty_labels(doc: &SceneDocument, diags: &mut Vec<LintDiagnostic>) {
    for el in &doc.elements {
        if let ElementKind::Label { text } = &el.kind
            && text.trim().is_empty()
        {
            diags.push(LintDiagnostic {
                elements: SmallVec::from_slice(&[el.id]),
                message: format!("Label `{}` has no text.", el.id),
                severity: LintSeverity::Info,
                rule: "empty-label",
            });
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────
