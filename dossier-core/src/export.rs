//! JSON backup format: every collection keyed by its camelCase name plus the
//! current investigator.

use anyhow::{Context, Result};

use crate::models::AppData;

/// Serializes the whole store as pretty-printed JSON
pub fn export_json(data: &AppData) -> serde_json::Result<String> {
    serde_json::to_string_pretty(data)
}

/// Parses a backup produced by `export_json` (or by older versions of the
/// application). Missing collections default to empty and the log ordering is
/// restored.
pub fn parse_backup(json: &str) -> Result<AppData> {
    let value: serde_json::Value = serde_json::from_str(json).context("Backup is not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("Backup must be a JSON object");
    }

    let mut data: AppData =
        serde_json::from_value(value).context("Backup does not match the expected shape")?;
    data.normalize();
    Ok(data)
}

/// Default file name for a backup taken now, e.g. `dossier-backup-2024-05-01.json`
pub fn backup_file_name() -> String {
    format!("dossier-backup-{}.json", chrono::Local::now().format("%Y-%m-%d"))
}
