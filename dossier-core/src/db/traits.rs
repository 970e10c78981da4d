//! Database abstraction traits
//!
//! This module defines the contract every storage backend implements: whole
//! store load/save plus per-collection record operations keyed by collection
//! name and record id.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;

use crate::models::{AppData, Collection};

/// Types of database backends available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// YAML file storage (single file)
    Yaml,
    /// SQLite database storage
    Sqlite,
    /// Process memory only, nothing persisted
    Memory,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendType::Yaml => write!(f, "YAML"),
            BackendType::Sqlite => write!(f, "SQLite"),
            BackendType::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for BackendType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(BackendType::Yaml),
            "sqlite" | "db" => Ok(BackendType::Sqlite),
            "memory" | "mem" => Ok(BackendType::Memory),
            _ => anyhow::bail!("Unknown backend: {} (expected yaml, sqlite or memory)", s),
        }
    }
}

/// Reads the `id` field of a JSON record
pub fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

/// Core trait for database backends
///
/// `load()` and `save()` work with the full `AppData`. The record operations
/// default to load-modify-save; backends with real per-record storage
/// override them.
pub trait DatabaseBackend: Send + Sync {
    fn backend_type(&self) -> BackendType;

    /// Returns the path to the database file
    fn path(&self) -> &Path;

    // =========================================================================
    // Full Store Operations
    // =========================================================================

    fn load(&self) -> Result<AppData>;

    fn save(&self, data: &AppData) -> Result<()>;

    /// Applies `f` to the records of one collection and saves the result.
    /// Nothing is saved when `f` fails.
    fn modify_collection(
        &self,
        collection: Collection,
        f: &mut dyn FnMut(&mut Vec<Value>) -> Result<()>,
    ) -> Result<()> {
        let data = self.load()?;
        let mut doc = serde_json::to_value(&data).context("Failed to serialize store")?;
        let slot = doc
            .get_mut(collection.as_str())
            .context("Collection missing from store document")?;
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(records) = slot {
            f(records)?;
        }
        let updated: AppData = serde_json::from_value(doc)
            .with_context(|| format!("Invalid record written to {}", collection))?;
        self.save(&updated)
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    fn list_records(&self, collection: Collection) -> Result<Vec<Value>> {
        let doc = serde_json::to_value(self.load()?)?;
        Ok(doc
            .get(collection.as_str())
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    fn get_record(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        Ok(self
            .list_records(collection)?
            .into_iter()
            .find(|r| record_id(r) == Some(id)))
    }

    /// Adds a new record; fails if the id is already taken
    fn insert_record(&self, collection: Collection, record: &Value) -> Result<()> {
        let id = record_id(record).context("Record has no id")?.to_string();
        self.modify_collection(collection, &mut |records| {
            if records.iter().any(|r| record_id(r) == Some(id.as_str())) {
                anyhow::bail!("Record {} already exists in {}", id, collection);
            }
            records.push(record.clone());
            Ok(())
        })
    }

    /// Replaces an existing record; fails if the id is unknown
    fn update_record(&self, collection: Collection, id: &str, record: &Value) -> Result<()> {
        self.modify_collection(collection, &mut |records| {
            match records.iter_mut().find(|r| record_id(r) == Some(id)) {
                Some(slot) => {
                    *slot = record.clone();
                    Ok(())
                }
                None => anyhow::bail!("Record not found: {} in {}", id, collection),
            }
        })
    }

    /// Removes a record; fails if the id is unknown
    fn delete_record(&self, collection: Collection, id: &str) -> Result<()> {
        self.modify_collection(collection, &mut |records| {
            let original_len = records.len();
            records.retain(|r| record_id(r) != Some(id));
            if records.len() == original_len {
                anyhow::bail!("Record not found: {} in {}", id, collection);
            }
            Ok(())
        })
    }

    /// Replaces every record of a collection
    fn replace_collection(&self, collection: Collection, new_records: &[Value]) -> Result<()> {
        self.modify_collection(collection, &mut |records| {
            *records = new_records.to_vec();
            Ok(())
        })
    }

    // =========================================================================
    // Session
    // =========================================================================

    fn set_current_investigator(&self, id: Option<&str>) -> Result<()> {
        let mut data = self.load()?;
        data.current_investigator = id.map(str::to_string);
        self.save(&data)
    }

    // =========================================================================
    // Utility Operations
    // =========================================================================

    /// Returns true if the database file exists
    fn exists(&self) -> bool {
        self.path().exists()
    }

    fn create_if_not_exists(&self) -> Result<()> {
        if !self.exists() {
            self.save(&AppData::new())?;
        }
        Ok(())
    }

    fn stats(&self) -> Result<DatabaseStats> {
        let data = self.load()?;
        Ok(DatabaseStats {
            counts: Collection::ALL
                .iter()
                .map(|c| (*c, data.count(*c)))
                .collect(),
            backend_type: self.backend_type(),
        })
    }
}

/// Record counts of a database
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub counts: Vec<(Collection, usize)>,
    pub backend_type: BackendType,
}

impl DatabaseStats {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}
