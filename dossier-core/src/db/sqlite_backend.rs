//! SQLite database storage backend
//!
//! Every record is a JSON document in the `records` table keyed by
//! `(collection, id)`, so record operations touch a single row instead of
//! rewriting the whole store.

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::traits::{record_id, BackendType, DatabaseBackend};
use crate::models::{AppData, Collection};

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

const CURRENT_INVESTIGATOR_KEY: &str = "current_investigator";

pub struct SqliteBackend {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open SQLite database {:?}", path))?;

        // WAL lets several readers work while one investigator writes
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let backend = Self {
            path,
            conn: Mutex::new(conn),
        };

        backend.init_schema()?;
        Ok(backend)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("SQLite connection lock poisoned"))
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        let current_version: i32 = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        if current_version == 0 {
            log::info!("Initializing SQLite schema at {:?}", self.path);
            conn.execute_batch(include_str!("schema.sql"))?;
        } else if current_version < SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is outdated, expected {}",
                current_version,
                SCHEMA_VERSION
            );
        }

        Ok(())
    }

    fn to_json(value: &Value) -> Result<String> {
        serde_json::to_string(value).context("Failed to serialize to JSON")
    }

    fn from_json(json: &str) -> Result<Value> {
        serde_json::from_str(json).context("Failed to deserialize from JSON")
    }

    fn read_collection(conn: &Connection, collection: Collection) -> Result<Vec<Value>> {
        let mut stmt =
            conn.prepare("SELECT body FROM records WHERE collection = ?1 ORDER BY seq")?;
        let rows = stmt.query_map(params![collection.as_str()], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for body in rows {
            records.push(Self::from_json(&body?)?);
        }
        Ok(records)
    }

    fn write_collection(conn: &Connection, collection: Collection, records: &[Value]) -> Result<()> {
        conn.execute(
            "DELETE FROM records WHERE collection = ?1",
            params![collection.as_str()],
        )?;
        let mut stmt =
            conn.prepare("INSERT INTO records (collection, id, body) VALUES (?1, ?2, ?3)")?;
        for record in records {
            let id = record_id(record).context("Record has no id")?;
            stmt.execute(params![collection.as_str(), id, Self::to_json(record)?])?;
        }
        Ok(())
    }
}

impl DatabaseBackend for SqliteBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Sqlite
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<AppData> {
        let conn = self.conn()?;

        let mut doc = Map::new();
        for collection in Collection::ALL {
            let records = Self::read_collection(&conn, collection)?;
            doc.insert(collection.as_str().to_string(), Value::Array(records));
        }

        let current: Option<String> = conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                params![CURRENT_INVESTIGATOR_KEY],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = current {
            doc.insert("currentInvestigator".to_string(), Value::String(id));
        }

        let mut data: AppData = serde_json::from_value(Value::Object(doc))
            .context("Stored records do not match the expected shape")?;
        data.normalize();
        Ok(data)
    }

    fn save(&self, data: &AppData) -> Result<()> {
        let doc = serde_json::to_value(data)?;
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for collection in Collection::ALL {
            let records = doc
                .get(collection.as_str())
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            Self::write_collection(&tx, collection, records)?;
        }

        match &data.current_investigator {
            Some(id) => tx.execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
                params![CURRENT_INVESTIGATOR_KEY, id],
            )?,
            None => tx.execute(
                "DELETE FROM metadata WHERE key = ?1",
                params![CURRENT_INVESTIGATOR_KEY],
            )?,
        };

        tx.commit()?;
        Ok(())
    }

    fn list_records(&self, collection: Collection) -> Result<Vec<Value>> {
        let conn = self.conn()?;
        Self::read_collection(&conn, collection)
    }

    fn get_record(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let conn = self.conn()?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM records WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id],
                |row| row.get(0),
            )
            .optional()?;
        body.map(|b| Self::from_json(&b)).transpose()
    }

    fn insert_record(&self, collection: Collection, record: &Value) -> Result<()> {
        let id = record_id(record).context("Record has no id")?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO records (collection, id, body) VALUES (?1, ?2, ?3)",
            params![collection.as_str(), id, Self::to_json(record)?],
        )
        .with_context(|| format!("Failed to insert {} into {}", id, collection))?;
        Ok(())
    }

    fn update_record(&self, collection: Collection, id: &str, record: &Value) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE records SET body = ?3 WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id, Self::to_json(record)?],
        )?;
        if changed == 0 {
            anyhow::bail!("Record not found: {} in {}", id, collection);
        }
        Ok(())
    }

    fn delete_record(&self, collection: Collection, id: &str) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id],
        )?;
        if changed == 0 {
            anyhow::bail!("Record not found: {} in {}", id, collection);
        }
        Ok(())
    }

    fn replace_collection(&self, collection: Collection, records: &[Value]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        Self::write_collection(&tx, collection, records)?;
        tx.commit()?;
        Ok(())
    }

    fn set_current_investigator(&self, id: Option<&str>) -> Result<()> {
        let conn = self.conn()?;
        match id {
            Some(id) => conn.execute(
                "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
                params![CURRENT_INVESTIGATOR_KEY, id],
            )?,
            None => conn.execute(
                "DELETE FROM metadata WHERE key = ?1",
                params![CURRENT_INVESTIGATOR_KEY],
            )?,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn backend(dir: &TempDir) -> SqliteBackend {
        SqliteBackend::new(dir.path().join("dossier.db")).unwrap()
    }

    #[test]
    fn test_fresh_database_has_default_roster() {
        let dir = TempDir::new().unwrap();
        let data = backend(&dir).load().unwrap();
        assert_eq!(data.investigators.len(), 10);
        assert!(data.current_investigator.is_none());
    }

    #[test]
    fn test_record_crud() {
        let dir = TempDir::new().unwrap();
        let db = backend(&dir);
        let case = json!({
            "id": "C-01",
            "title": "Bank job",
            "description": "Fleeca",
            "status": "open",
            "createdAt": "2024-05-01T12:00:00Z"
        });

        db.insert_record(Collection::Cases, &case).unwrap();
        assert!(db.insert_record(Collection::Cases, &case).is_err());

        let mut closed = case.clone();
        closed["status"] = json!("closed");
        db.update_record(Collection::Cases, "C-01", &closed).unwrap();
        assert!(db.update_record(Collection::Cases, "C-99", &closed).is_err());

        let stored = db.get_record(Collection::Cases, "C-01").unwrap().unwrap();
        assert_eq!(stored["status"], "closed");

        db.delete_record(Collection::Cases, "C-01").unwrap();
        assert!(db.get_record(Collection::Cases, "C-01").unwrap().is_none());
        assert!(db.delete_record(Collection::Cases, "C-01").is_err());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let db = backend(&dir);
            let mut data = AppData::new();
            data.current_investigator = Some("INV-05".into());
            db.save(&data).unwrap();
        }

        let reopened = backend(&dir);
        let data = reopened.load().unwrap();
        assert_eq!(data.current_investigator.as_deref(), Some("INV-05"));
        assert_eq!(data.investigators[4].name, "Hiro");

        reopened.set_current_investigator(None).unwrap();
        assert!(reopened.load().unwrap().current_investigator.is_none());
    }

    #[test]
    fn test_list_keeps_insertion_order() {
        let dir = TempDir::new().unwrap();
        let db = backend(&dir);
        for id in ["G-02", "G-01", "G-03"] {
            db.insert_record(
                Collection::Gangs,
                &json!({"id": id, "name": id, "createdAt": "2024-05-01T12:00:00Z"}),
            )
            .unwrap();
        }

        let ids: Vec<String> = db
            .list_records(Collection::Gangs)
            .unwrap()
            .iter()
            .filter_map(|r| record_id(r).map(str::to_string))
            .collect();
        assert_eq!(ids, vec!["G-02", "G-01", "G-03"]);
    }
}
