use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::exchange::DEFAULT_MAX_IMPORT_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("neither XDG_CONFIG_HOME nor HOME is set")]
    MissingHomeDirectory,
}

const APP_DIR: &str = "design-tokens";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_SITE_URL: &str = "http://localhost";

/// Application-level settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the option store and documents live; platform default when unset.
    pub data_dir: Option<PathBuf>,
    /// Written into exports as `site`.
    pub site_url: String,
    /// Whether the host offers its kit API or only document metadata.
    pub host_api: bool,
    pub max_import_bytes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            site_url: DEFAULT_SITE_URL.to_string(),
            host_api: true,
            max_import_bytes: DEFAULT_MAX_IMPORT_BYTES,
        }
    }
}

pub fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::with_temp_root;

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "design-tokens",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/config-root/design-tokens/config.json")
        );
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path("design-tokens", "config.json", None, Some(Path::new("/tmp/home")))
            .expect("path should resolve");

        assert_eq!(path, PathBuf::from("/tmp/home/.config/design-tokens/config.json"));
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("design-tokens", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn missing_config_file_gives_defaults() {
        with_temp_root("config-missing", |root| {
            let config = load_app_config_with(Some(root), None);
            assert_eq!(config, AppConfig::default());
            assert_eq!(config.max_import_bytes, 2 * 1024 * 1024);
        });
    }

    #[test]
    fn partial_config_keeps_defaults_for_absent_keys() {
        with_temp_root("config-partial", |root| {
            let dir = root.join(APP_DIR);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(
                dir.join(APP_CONFIG_FILE),
                r#"{"site_url": "https://brand.test", "host_api": false}"#,
            )
            .unwrap();

            let config = load_app_config_with(Some(root), None);
            assert_eq!(config.site_url, "https://brand.test");
            assert!(!config.host_api);
            assert_eq!(config.data_dir, None);
            assert_eq!(config.max_import_bytes, DEFAULT_MAX_IMPORT_BYTES);
        });
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        with_temp_root("config-invalid", |root| {
            let dir = root.join(APP_DIR);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join(APP_CONFIG_FILE), "{not json").unwrap();

            assert_eq!(load_app_config_with(Some(root), None), AppConfig::default());
        });
    }
}
