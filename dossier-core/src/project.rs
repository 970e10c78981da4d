use anyhow::Result;
use std::env;
use std::path::{Path, PathBuf};

use crate::config::{default_data_path, get_config_path, Config};

/// Store file picked up from the working directory
pub const LOCAL_DATA_FILE: &str = "dossier.yaml";

/// Determines the store file to open.
///
/// Order: the `--file` option, `DOSSIER_FILE`, `dossier.yaml` in the current
/// directory, `data_path` from the config file, then the per-user data
/// directory.
pub fn determine_data_path(file_option: Option<&Path>) -> Result<PathBuf> {
    let env_file = env::var("DOSSIER_FILE").ok();
    let config = Config::load(get_config_path()?)?;

    resolve_data_path(
        file_option,
        env_file.as_deref(),
        Path::new(LOCAL_DATA_FILE),
        &config,
        default_data_path,
    )
}

fn resolve_data_path(
    file_option: Option<&Path>,
    env_file: Option<&str>,
    local_file: &Path,
    config: &Config,
    fallback: impl FnOnce() -> Result<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = file_option {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env_file.filter(|p| !p.trim().is_empty()) {
        return Ok(PathBuf::from(path));
    }

    if local_file.exists() {
        return Ok(local_file.to_path_buf());
    }

    if let Some(path) = &config.data_path {
        return Ok(PathBuf::from(path));
    }

    fallback()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fallback() -> Result<PathBuf> {
        Ok(PathBuf::from("/fallback/dossier.yaml"))
    }

    #[test]
    fn test_option_wins() {
        let config = Config {
            data_path: Some("/cfg.yaml".into()),
            ..Default::default()
        };
        let path = resolve_data_path(
            Some(Path::new("cli.db")),
            Some("env.yaml"),
            Path::new("missing.yaml"),
            &config,
            fallback,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("cli.db"));
    }

    #[test]
    fn test_env_then_local_then_config() {
        let dir = TempDir::new().unwrap();
        let local = dir.path().join("dossier.yaml");
        let config = Config {
            data_path: Some("/cfg.yaml".into()),
            ..Default::default()
        };

        let from_env =
            resolve_data_path(None, Some("env.yaml"), &local, &config, fallback).unwrap();
        assert_eq!(from_env, PathBuf::from("env.yaml"));

        let from_config = resolve_data_path(None, None, &local, &config, fallback).unwrap();
        assert_eq!(from_config, PathBuf::from("/cfg.yaml"));

        std::fs::write(&local, "").unwrap();
        let from_local = resolve_data_path(None, None, &local, &config, fallback).unwrap();
        assert_eq!(from_local, local);
    }

    #[test]
    fn test_fallback() {
        let path = resolve_data_path(
            None,
            Some("  "),
            Path::new("/definitely/missing.yaml"),
            &Config::default(),
            fallback,
        )
        .unwrap();
        assert_eq!(path, PathBuf::from("/fallback/dossier.yaml"));
    }
}
