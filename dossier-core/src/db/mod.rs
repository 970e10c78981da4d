//! Storage backends for the dossier store
//!
//! Every backend implements `DatabaseBackend`, so the store can sit on a YAML
//! file, a SQLite database or plain memory without knowing which.

mod memory_backend;
mod migration;
mod sqlite_backend;
mod traits;
mod yaml_backend;

pub use memory_backend::MemoryBackend;
pub use migration::{
    copy_store, export_to_json, import_from_json, migrate_sqlite_to_yaml, migrate_yaml_to_sqlite,
};
pub use sqlite_backend::SqliteBackend;
pub use traits::{record_id, BackendType, DatabaseBackend, DatabaseStats};
pub use yaml_backend::YamlBackend;

use anyhow::Result;
use std::path::Path;

/// Picks the backend type from a file extension, defaulting to YAML
pub fn infer_backend_type(path: &Path) -> BackendType {
    match path.extension().and_then(|e| e.to_str()) {
        Some("db") | Some("sqlite") | Some("sqlite3") => BackendType::Sqlite,
        _ => BackendType::Yaml,
    }
}

/// Creates a database backend based on the file extension or explicit type
pub fn create_backend(
    path: &Path,
    backend_type: Option<BackendType>,
) -> Result<Box<dyn DatabaseBackend>> {
    let bt = backend_type.unwrap_or_else(|| infer_backend_type(path));
    log::debug!("Opening {} backend at {:?}", bt, path);

    match bt {
        BackendType::Yaml => Ok(Box::new(YamlBackend::new(path))),
        BackendType::Sqlite => Ok(Box::new(SqliteBackend::new(path)?)),
        BackendType::Memory => Ok(Box::new(MemoryBackend::new())),
    }
}
