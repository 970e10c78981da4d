//! In-memory backend, used for tests and throwaway sessions

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::traits::{BackendType, DatabaseBackend};
use crate::models::AppData;

pub struct MemoryBackend {
    path: PathBuf,
    data: Mutex<AppData>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_data(AppData::new())
    }

    pub fn with_data(data: AppData) -> Self {
        Self {
            path: PathBuf::from(":memory:"),
            data: Mutex::new(data),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseBackend for MemoryBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Memory
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<AppData> {
        let data = self
            .data
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        let mut data = data.clone();
        data.normalize();
        Ok(data)
    }

    fn save(&self, data: &AppData) -> Result<()> {
        let mut slot = self
            .data
            .lock()
            .map_err(|_| anyhow!("Memory store lock poisoned"))?;
        *slot = data.clone();
        Ok(())
    }

    fn exists(&self) -> bool {
        true
    }
}
