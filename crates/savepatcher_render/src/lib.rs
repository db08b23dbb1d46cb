use std::fmt::Write as _;

use savepatcher_core::{SaveFile, SaveState, SaveSummary};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

const LABEL_WIDTH: usize = 13;

/// Old and new value of one field changed by a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditRecord {
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

impl EditRecord {
    pub fn new(field: &'static str, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            field,
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Edits applied to a save plus the sections they left different from
/// the loaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditReport {
    pub state: SaveState,
    pub edits: Vec<EditRecord>,
    pub changed_sections: Vec<&'static str>,
}

impl EditReport {
    pub fn from_save(save: &SaveFile, edits: Vec<EditRecord>) -> Self {
        Self {
            state: save.state(),
            edits,
            changed_sections: save
                .changed_sections()
                .iter()
                .map(|section| section.name)
                .collect(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub name: bool,
    pub level: bool,
    pub time_played: bool,
    pub active_slot: bool,
    pub steam_id: bool,
    pub checksum: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.name
            || self.level
            || self.time_played
            || self.active_slot
            || self.steam_id
            || self.checksum
    }
}

/// Selected fields as `(key, value)` pairs, always in the same order.
pub fn render_selected_pairs(
    summary: &SaveSummary,
    fields: &FieldSelection,
) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();

    if fields.name {
        out.push(("name", summary.name.clone()));
    }
    if fields.level {
        out.push(("level", summary.level.to_string()));
    }
    if fields.time_played {
        out.push(("time_played", summary.time_played.clone()));
    }
    if fields.active_slot {
        out.push(("active_slot", summary.active_slot.to_string()));
    }
    if fields.steam_id {
        out.push(("steam_id", summary.steam_id.to_string()));
    }
    if fields.checksum {
        out.push(("checksum", summary.checksum.clone()));
    }

    out
}

pub fn render_json_selected(summary: &SaveSummary, fields: &FieldSelection) -> JsonValue {
    let mut out = JsonMap::new();

    if fields.name {
        out.insert("name".to_string(), JsonValue::String(summary.name.clone()));
    }
    if fields.level {
        out.insert("level".to_string(), JsonValue::from(summary.level));
    }
    if fields.time_played {
        out.insert(
            "time_played".to_string(),
            JsonValue::String(summary.time_played.clone()),
        );
    }
    if fields.active_slot {
        out.insert(
            "active_slot".to_string(),
            JsonValue::from(summary.active_slot),
        );
    }
    if fields.steam_id {
        out.insert("steam_id".to_string(), JsonValue::from(summary.steam_id));
    }
    if fields.checksum {
        out.insert(
            "checksum".to_string(),
            JsonValue::String(summary.checksum.clone()),
        );
    }

    JsonValue::Object(out)
}

pub fn render_json_full(summary: &SaveSummary, report: &EditReport) -> JsonValue {
    let mut out = JsonMap::new();

    out.insert("name".to_string(), JsonValue::String(summary.name.clone()));
    out.insert("level".to_string(), JsonValue::from(summary.level));
    out.insert(
        "time_played".to_string(),
        JsonValue::String(summary.time_played.clone()),
    );
    out.insert(
        "seconds_played".to_string(),
        JsonValue::from(summary.seconds_played),
    );
    out.insert(
        "active_slot".to_string(),
        JsonValue::from(summary.active_slot),
    );
    out.insert("steam_id".to_string(), JsonValue::from(summary.steam_id));
    out.insert(
        "checksum".to_string(),
        JsonValue::String(summary.checksum.clone()),
    );
    out.insert(
        "checksum_valid".to_string(),
        JsonValue::Bool(summary.checksum_valid),
    );
    if let Ok(JsonValue::Object(report)) = serde_json::to_value(report) {
        out.extend(report);
    }

    JsonValue::Object(out)
}

pub fn render_text(summary: &SaveSummary) -> String {
    let mut out = String::new();
    let checksum_state = if summary.checksum_valid {
        "valid"
    } else {
        "invalid"
    };

    push_row(&mut out, "Name", &summary.name);
    push_row(&mut out, "Level", &summary.level.to_string());
    push_row(&mut out, "Time Played", &summary.time_played);
    push_row(&mut out, "Active Slot", &summary.active_slot.to_string());
    push_row(&mut out, "Steam ID", &summary.steam_id.to_string());
    push_row(
        &mut out,
        "Checksum",
        &format!("{} ({checksum_state})", summary.checksum),
    );

    out
}

pub fn render_edits_text(report: &EditReport) -> String {
    let mut out = String::new();
    if report.edits.is_empty() {
        return out;
    }

    let _ = writeln!(out, " ::: Edits :::");
    for edit in &report.edits {
        let _ = writeln!(out, "  {}: {} -> {}", edit.field, edit.old, edit.new);
    }
    if !report.changed_sections.is_empty() {
        let _ = writeln!(
            out,
            "  changed sections: {}",
            report.changed_sections.join(", ")
        );
    }
    out
}

fn push_row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{label:>LABEL_WIDTH$}: {value}");
}
