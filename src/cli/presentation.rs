//! CLI presentation: text and json formatters for presented sheets and config.

use crate::config::PropsheetConfig;
use crate::error::SheetError;
use crate::generation::PropertiesCreated;
use crate::sheet::ControlSet;
use chrono::{DateTime, Utc};
use comfy_table::Table;
use serde_json::json;
use std::sync::Arc;

/// A presented sheet as captured from the "properties created" notification.
#[derive(Debug, Clone)]
pub struct SheetReport {
    pub orchestrator: u64,
    pub epoch: u64,
    pub controls: Arc<ControlSet>,
    pub presented_at: DateTime<Utc>,
}

impl From<&PropertiesCreated> for SheetReport {
    fn from(event: &PropertiesCreated) -> Self {
        Self {
            orchestrator: event.orchestrator.as_u64(),
            epoch: event.epoch.as_u64(),
            controls: Arc::clone(&event.controls),
            presented_at: event.presented_at,
        }
    }
}

pub fn format_sheets_text(sheets: &[SheetReport]) -> String {
    if sheets.is_empty() {
        return "No property sheet was presented.".to_string();
    }

    let mut out = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let mut s = format!(
            "Property sheet (epoch {}): {} field(s), presented at {}",
            sheet.epoch,
            sheet.controls.len(),
            sheet.presented_at.format("%H:%M:%S%.3f")
        );
        if !sheet.controls.is_empty() {
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Field", "Widget", "Value", "Bound To"]);
            for control in sheet.controls.iter() {
                let bound: Vec<&str> = control.bindings.iter().map(|id| id.as_str()).collect();
                table.add_row(vec![
                    control.field.to_string(),
                    control.widget.clone(),
                    control.value.to_string(),
                    bound.join(", "),
                ]);
            }
            s.push('\n');
            s.push_str(&table.to_string());
        }
        out.push(s);
    }
    out.join("\n\n")
}

pub fn format_sheets_json(sheets: &[SheetReport]) -> Result<String, SheetError> {
    let arr: Vec<serde_json::Value> = sheets
        .iter()
        .map(|sheet| {
            json!({
                "orchestrator": sheet.orchestrator,
                "epoch": sheet.epoch,
                "presented_at": sheet.presented_at.to_rfc3339(),
                "controls": &*sheet.controls,
            })
        })
        .collect();
    serde_json::to_string_pretty(&arr).map_err(|e| SheetError::OutputError(e.to_string()))
}

/// Sheets render as `text` or `json`.
pub fn check_sheets_format(format: &str) -> Result<(), SheetError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(SheetError::OutputError(format!(
            "Unknown format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

pub fn format_sheets(sheets: &[SheetReport], format: &str) -> Result<String, SheetError> {
    check_sheets_format(format)?;
    match format {
        "json" => format_sheets_json(sheets),
        _ => Ok(format_sheets_text(sheets)),
    }
}

pub fn format_config(config: &PropsheetConfig, format: &str) -> Result<String, SheetError> {
    match format {
        "json" => serde_json::to_string_pretty(config)
            .map_err(|e| SheetError::OutputError(e.to_string())),
        "toml" => toml::to_string_pretty(config).map_err(|e| SheetError::OutputError(e.to_string())),
        other => Err(SheetError::OutputError(format!(
            "Unknown format: {} (must be 'toml' or 'json')",
            other
        ))),
    }
}
