//! Migration utilities for converting between storage backends
//!
//! Moves a whole store between YAML and SQLite, and reads or writes the
//! JSON backup format.

use anyhow::{Context, Result};
use std::path::Path;

use super::traits::DatabaseBackend;
use super::{SqliteBackend, YamlBackend};
use crate::export;
use crate::models::AppData;

/// Copies a YAML store into a SQLite database.
///
/// Returns the number of records migrated, investigators included.
pub fn migrate_yaml_to_sqlite<P1: AsRef<Path>, P2: AsRef<Path>>(
    yaml_path: P1,
    sqlite_path: P2,
) -> Result<usize> {
    let yaml_backend = YamlBackend::new(yaml_path);
    let sqlite_backend = SqliteBackend::new(sqlite_path)?;
    copy_store(&yaml_backend, &sqlite_backend)
}

/// Copies a SQLite database into a YAML store.
pub fn migrate_sqlite_to_yaml<P1: AsRef<Path>, P2: AsRef<Path>>(
    sqlite_path: P1,
    yaml_path: P2,
) -> Result<usize> {
    let sqlite_backend = SqliteBackend::new(sqlite_path)?;
    let yaml_backend = YamlBackend::new(yaml_path);
    copy_store(&sqlite_backend, &yaml_backend)
}

/// Copies everything from `source` into `target`, replacing its contents
pub fn copy_store(source: &dyn DatabaseBackend, target: &dyn DatabaseBackend) -> Result<usize> {
    let data = source
        .load()
        .with_context(|| format!("Failed to load {} store", source.backend_type()))?;

    target
        .save(&data)
        .with_context(|| format!("Failed to save {} store", target.backend_type()))?;

    let count = target.stats()?.total();
    log::info!(
        "Migrated {} records from {:?} to {:?}",
        count,
        source.path(),
        target.path()
    );
    Ok(count)
}

/// Writes the store to a JSON backup file
pub fn export_to_json<P: AsRef<Path>>(data: &AppData, json_path: P) -> Result<()> {
    let json = export::export_json(data)?;
    std::fs::write(json_path, json).context("Failed to write JSON file")?;
    Ok(())
}

/// Reads a JSON backup file
pub fn import_from_json<P: AsRef<Path>>(json_path: P) -> Result<AppData> {
    let json = std::fs::read_to_string(json_path).context("Failed to read JSON file")?;
    export::parse_backup(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gang, Hierarchy, Person};
    use chrono::Utc;
    use tempfile::{NamedTempFile, TempDir};

    fn sample() -> AppData {
        let mut data = AppData::new();
        data.gangs.push(Gang {
            id: "G-01".into(),
            name: "Ballas".into(),
            description: String::new(),
            color: Some("purple".into()),
            allied_gang_ids: Vec::new(),
            created_at: Utc::now(),
        });
        data.people.push(Person {
            id: "P-01".into(),
            full_name: "Franklin Clinton".into(),
            gang: "Ballas".into(),
            hierarchy: Hierarchy::Leader,
            phone: String::new(),
            attachments: Vec::new(),
            vehicle_ids: Vec::new(),
            deep: None,
            created_at: Utc::now(),
        });
        data.current_investigator = Some("INV-02".into());
        data
    }

    #[test]
    fn test_yaml_to_sqlite_migration() {
        let yaml_file = NamedTempFile::with_suffix(".yaml").unwrap();
        let sqlite_file = NamedTempFile::with_suffix(".db").unwrap();

        YamlBackend::new(yaml_file.path()).save(&sample()).unwrap();

        let count = migrate_yaml_to_sqlite(yaml_file.path(), sqlite_file.path()).unwrap();
        assert_eq!(count, 12);

        let data = SqliteBackend::new(sqlite_file.path()).unwrap().load().unwrap();
        assert_eq!(data.people[0].full_name, "Franklin Clinton");
        assert_eq!(data.gangs[0].color.as_deref(), Some("purple"));
        assert_eq!(data.current_investigator.as_deref(), Some("INV-02"));
    }

    #[test]
    fn test_sqlite_to_yaml_migration() {
        let dir = TempDir::new().unwrap();
        let sqlite_path = dir.path().join("dossier.db");
        let yaml_path = dir.path().join("dossier.yaml");

        SqliteBackend::new(&sqlite_path).unwrap().save(&sample()).unwrap();

        migrate_sqlite_to_yaml(&sqlite_path, &yaml_path).unwrap();

        let data = YamlBackend::new(&yaml_path).load().unwrap();
        assert_eq!(data.people.len(), 1);
        assert_eq!(data.people[0].hierarchy, Hierarchy::Leader);
    }

    #[test]
    fn test_json_backup_file() {
        let dir = TempDir::new().unwrap();
        let json_path = dir.path().join("backup.json");

        export_to_json(&sample(), &json_path).unwrap();
        let restored = import_from_json(&json_path).unwrap();

        assert_eq!(restored.gangs[0].name, "Ballas");
        assert_eq!(restored.investigators.len(), 10);
    }
}
