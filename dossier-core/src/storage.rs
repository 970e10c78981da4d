use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::models::AppData;

/// How long to wait for another process to release the store file
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Reads and writes the whole `AppData` as a single YAML file, guarded by an
/// advisory lock file so several investigators can share one store.
pub struct Storage {
    file_path: PathBuf,
    lock_file_path: PathBuf,
}

impl Storage {
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let lock_file_path = file_path.with_extension("yaml.lock");
        Self {
            file_path,
            lock_file_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Polls `try_lock` until it succeeds or `LOCK_TIMEOUT` elapses
    fn wait_for_lock<F>(&self, lock_file: &File, try_lock: F) -> Result<()>
    where
        F: Fn(&File) -> std::io::Result<()>,
    {
        let start = Instant::now();
        loop {
            match try_lock(lock_file) {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if start.elapsed() > LOCK_TIMEOUT {
                        anyhow::bail!(
                            "Timeout waiting for file lock - another investigator may be writing: {:?}",
                            self.file_path
                        );
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to acquire lock on {:?}", self.lock_file_path)
                    })
                }
            }
        }
    }

    /// Exclusive lock for writing; held until the returned handle is dropped
    fn acquire_write_lock(&self) -> Result<File> {
        if let Some(parent) = self.lock_file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.lock_file_path)
            .with_context(|| format!("Failed to create lock file: {:?}", self.lock_file_path))?;

        self.wait_for_lock(&lock_file, |f| FileExt::try_lock_exclusive(f))?;

        let _ = writeln!(
            lock_file,
            "Locked by PID {} at {}",
            std::process::id(),
            chrono::Utc::now().to_rfc3339()
        );
        Ok(lock_file)
    }

    /// Shared lock for reading; `None` when nobody ever wrote a lock file
    fn acquire_read_lock(&self) -> Result<Option<File>> {
        if !self.lock_file_path.exists() {
            return Ok(None);
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .open(&self.lock_file_path)
            .with_context(|| format!("Failed to open lock file: {:?}", self.lock_file_path))?;

        self.wait_for_lock(&lock_file, |f| FileExt::try_lock_shared(f))?;
        Ok(Some(lock_file))
    }

    fn read_unlocked(&self) -> Result<AppData> {
        let file = File::open(&self.file_path)
            .with_context(|| format!("Failed to open file: {:?}", self.file_path))?;
        let reader = BufReader::new(file);
        let mut data: AppData = serde_yaml::from_reader(reader)
            .with_context(|| format!("Failed to parse YAML from {:?}", self.file_path))?;
        data.normalize();
        Ok(data)
    }

    fn write_unlocked(&self, data: &AppData) -> Result<()> {
        let yaml = serde_yaml::to_string(data)?;
        fs::write(&self.file_path, yaml)
            .with_context(|| format!("Failed to write {:?}", self.file_path))?;
        Ok(())
    }

    /// Loads the store, creating an empty one on first use
    pub fn load(&self) -> Result<AppData> {
        if !self.file_path.exists() {
            log::info!("Creating new store at {:?}", self.file_path);
            let data = AppData::new();
            self.save(&data)?;
            return Ok(data);
        }

        let _lock = self.acquire_read_lock()?;
        self.read_unlocked()
    }

    pub fn save(&self, data: &AppData) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let _lock = self.acquire_write_lock()?;
        self.write_unlocked(data)
    }

    /// Reloads the latest file under an exclusive lock, applies `update_fn`
    /// and writes the result back. The file is not written when `update_fn`
    /// fails.
    pub fn update_atomically<F>(&self, update_fn: F) -> Result<AppData>
    where
        F: FnOnce(&mut AppData) -> Result<()>,
    {
        if !self.file_path.exists() {
            self.save(&AppData::new())?;
        }

        let _lock = self.acquire_write_lock()?;
        let mut data = self.read_unlocked()?;
        update_fn(&mut data)?;
        self.write_unlocked(&data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dossier.yaml");
        let storage = Storage::new(&path);

        let data = storage.load().unwrap();

        assert!(path.exists());
        assert_eq!(data.investigators.len(), 10);
        assert!(data.people.is_empty());
    }

    #[test]
    fn test_update_atomically_persists() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("dossier.yaml"));

        storage
            .update_atomically(|data| {
                data.current_investigator = Some("INV-03".into());
                Ok(())
            })
            .unwrap();

        let reloaded = storage.load().unwrap();
        assert_eq!(reloaded.current_investigator.as_deref(), Some("INV-03"));
    }

    #[test]
    fn test_failed_update_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("dossier.yaml"));
        storage.load().unwrap();

        let result = storage.update_atomically(|data| {
            data.current_investigator = Some("INV-09".into());
            anyhow::bail!("rejected")
        });

        assert!(result.is_err());
        assert!(storage.load().unwrap().current_investigator.is_none());
    }
}
