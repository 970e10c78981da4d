//! YAML file storage backend
//!
//! Stores all collections in a single YAML file through `Storage`, so every
//! record write reloads the latest file under an exclusive lock.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::traits::{BackendType, DatabaseBackend};
use crate::models::{AppData, Collection};
use crate::storage::Storage;

pub struct YamlBackend {
    storage: Storage,
    path: PathBuf,
}

impl YamlBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            storage: Storage::new(&path),
            path,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}

impl DatabaseBackend for YamlBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Yaml
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<AppData> {
        self.storage.load()
    }

    fn save(&self, data: &AppData) -> Result<()> {
        self.storage.save(data)
    }

    /// Runs the whole read-modify-write under one exclusive lock, so two
    /// processes appending records cannot lose each other's writes.
    fn modify_collection(
        &self,
        collection: Collection,
        f: &mut dyn FnMut(&mut Vec<Value>) -> Result<()>,
    ) -> Result<()> {
        self.storage.update_atomically(|data| {
            let mut doc = serde_json::to_value(&*data).context("Failed to serialize store")?;
            if let Some(Value::Array(records)) = doc.get_mut(collection.as_str()) {
                f(records)?;
            }
            *data = serde_json::from_value(doc)
                .with_context(|| format!("Invalid record written to {}", collection))?;
            Ok(())
        })?;
        Ok(())
    }

    fn set_current_investigator(&self, id: Option<&str>) -> Result<()> {
        self.storage.update_atomically(|data| {
            data.current_investigator = id.map(str::to_string);
            Ok(())
        })?;
        Ok(())
    }
}
