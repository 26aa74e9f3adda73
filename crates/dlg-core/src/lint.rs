//! Lint diagnostics for dialogs.
//!
//! Reports invariant violations without modifying the dialog. Documents
//! loaded from disk are linted once; everything built through the
//! dispatcher is clean by construction.

use crate::choicelist::decode_state;
use crate::color::{is_color_key, is_valid_color};
use crate::container::{ContainerState, SelectionMode};
use crate::dialog::Dialog;
use crate::id::ElementId;
use crate::model::ElementKind;
use crate::naming::is_valid_nameid;
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Breaks a dialog invariant.
    Warning,
}

#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    pub element: ElementId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "duplicate-nameid").
    pub rule: &'static str,
}

// ─── Public API ──────────────────────────────────────────────────────────

#[must_use]
pub fn lint_dialog(dialog: &Dialog) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_nameids(dialog, &mut diags);
    lint_bounds(dialog, &mut diags);
    lint_radio_groups(dialog, &mut diags);
    lint_values(dialog, &mut diags);
    diags
}

fn warn(diags: &mut Vec<LintDiagnostic>, element: ElementId, rule: &'static str, message: String) {
    diags.push(LintDiagnostic {
        element,
        message,
        severity: LintSeverity::Warning,
        rule,
    });
}

// ─── Rules ───────────────────────────────────────────────────────────────

fn lint_nameids(dialog: &Dialog, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for element in dialog.registry().iter() {
        let name = element.nameid();
        if !is_valid_nameid(name) {
            warn(diags, element.id, "invalid-nameid", format!("`{name}` is not a valid nameid"));
        } else if !seen.insert(name) {
            warn(diags, element.id, "duplicate-nameid", format!("nameid `{name}` is used more than once"));
        }
    }
}

fn lint_bounds(dialog: &Dialog, diags: &mut Vec<LintDiagnostic>) {
    let canvas = dialog.properties().canvas();
    for element in dialog.registry().iter() {
        let Some(b) = dialog.registry().absolute_bounds(element.id) else {
            continue;
        };
        if b.left < 0.0 || b.top < 0.0 || b.right() > canvas.right() || b.bottom() > canvas.bottom() {
            warn(
                diags,
                element.id,
                "out-of-bounds",
                format!("`{}` extends past the {}x{} canvas", element.nameid(), canvas.width, canvas.height),
            );
        }
    }
}

fn lint_radio_groups(dialog: &Dialog, diags: &mut Vec<LintDiagnostic>) {
    let mut selected: HashMap<&str, Vec<ElementId>> = HashMap::new();
    for element in dialog.registry().iter() {
        if element.kind == ElementKind::Radio && element.flag("isSelected") {
            selected
                .entry(element.attr("group").unwrap_or_default())
                .or_default()
                .push(element.id);
        }
    }
    for (group, members) in selected {
        if members.len() > 1 {
            for id in members {
                warn(
                    diags,
                    id,
                    "radio-exclusivity",
                    format!("more than one radio in group `{group}` is selected"),
                );
            }
        }
    }
}

fn lint_values(dialog: &Dialog, diags: &mut Vec<LintDiagnostic>) {
    for element in dialog.registry().iter() {
        for (key, value) in element.attrs() {
            if is_color_key(key) && !is_valid_color(value) {
                warn(diags, element.id, "invalid-color", format!("`{key}` is not a color: `{value}`"));
            }
        }
        match element.kind {
            ElementKind::Counter => {
                let n = |k: &str| element.number(k).unwrap_or(0.0);
                if !(n("minval") <= n("startval") && n("startval") <= n("maxval")) {
                    warn(diags, element.id, "counter-range", "counter needs minval <= startval <= maxval".into());
                }
            }
            ElementKind::Container => {
                let active = element.list("active");
                let state = ContainerState::from_attrs(element.attrs());
                if state.mode == SelectionMode::Single && active.len() > 1 {
                    warn(
                        diags,
                        element.id,
                        "container-cardinality",
                        format!("single-selection container has {} active items", active.len()),
                    );
                }
                if state.active_labels().len() < active.len() && state.mode == SelectionMode::Multiple {
                    warn(
                        diags,
                        element.id,
                        "container-filter",
                        "active items include ones excluded by the item type filter".into(),
                    );
                }
            }
            ElementKind::ChoiceList => {
                if let Err(err) = decode_state(element.attr("state").unwrap_or_default()) {
                    warn(diags, element.id, "choicelist-state", err.to_string());
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ElementSpec;
    use crate::model::DialogProperties;

    #[test]
    fn built_dialogs_are_clean() {
        let mut d = Dialog::new(DialogProperties::default());
        d.create(ElementSpec::new("Radio").attr("isSelected", "true")).unwrap();
        d.create(ElementSpec::new("Radio").attr("isSelected", "true")).unwrap();
        d.create(ElementSpec::new("Counter").attr("startval", "4")).unwrap();
        assert!(lint_dialog(&d).is_empty());
    }
}
