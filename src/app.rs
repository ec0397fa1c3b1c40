use crate::utils::normalize_url;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";
pub const API_URL_ENV: &str = "MEDIDESK_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    /// Display name for messages written by the operator.
    pub user_name: String,
    /// Overrides the platform data dir location of the message database.
    pub database_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_name: "You".to_string(),
            database_path: None,
        }
    }
}

impl AppConfig {
    // TOML is the primary format; an older JSON file is picked up and rewritten as TOML when found
    fn toml_path() -> Option<PathBuf> {
        let base = BaseDirs::new()?;
        Some(base.config_dir().join("medidesk.toml"))
    }

    fn legacy_json_path() -> Option<PathBuf> {
        let proj = directories::ProjectDirs::from("com", "example", "MediDesk")?;
        Some(proj.config_dir().join("config.json"))
    }

    /// Config from the user's config dir, then `MEDIDESK_API_URL` on top.
    pub fn load() -> Self {
        let mut config = Self::load_files(Self::toml_path().as_deref(), Self::legacy_json_path().as_deref());
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    pub fn load_files(toml_path: Option<&Path>, legacy_json: Option<&Path>) -> Self {
        if let Some(path) = toml_path {
            if let Ok(text) = fs::read_to_string(path) {
                match toml::from_str::<AppConfig>(&text) {
                    Ok(config) => return config.normalized(),
                    Err(e) => log::warn!("ignoring malformed {}: {}", path.display(), e),
                }
            }
        }

        if let Some(legacy) = legacy_json {
            if let Ok(bytes) = fs::read(legacy) {
                if let Ok(config) = serde_json::from_slice::<AppConfig>(&bytes) {
                    let config = config.normalized();
                    // never clobber an existing toml, even a malformed one
                    if let Some(path) = toml_path.filter(|p| !p.exists()) {
                        if let Err(e) = config.save_to(path) {
                            log::warn!("could not migrate legacy config: {}", e);
                        }
                    }
                    return config;
                }
            }
        }

        Self::default()
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = normalize_url(&url);
        }
    }

    fn normalized(mut self) -> Self {
        self.api_url = normalize_url(&self.api_url);
        self
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_files(Some(&dir.path().join("none.toml")), None);
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn toml_file_is_read_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medidesk.toml");
        fs::write(&path, "api_url = \"clinic.example.org/api/\"\nuser_name = \"Front Desk\"\n").unwrap();
        let config = AppConfig::load_files(Some(&path), None);
        assert_eq!(config.api_url, "https://clinic.example.org/api");
        assert_eq!(config.user_name, "Front Desk");
        assert_eq!(config.database_path, None);
    }

    #[test]
    fn legacy_json_is_migrated_to_toml() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("cfg").join("medidesk.toml");
        let json_path = dir.path().join("config.json");
        fs::write(&json_path, r#"{"api_url":"http://10.0.0.5:3001/api","user_name":"Night Shift"}"#).unwrap();

        let config = AppConfig::load_files(Some(&toml_path), Some(&json_path));
        assert_eq!(config.user_name, "Night Shift");
        assert!(toml_path.exists());
        assert_eq!(AppConfig::load_files(Some(&toml_path), None), config);
    }

    #[test]
    fn malformed_toml_is_left_alone_by_migration() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("medidesk.toml");
        let json_path = dir.path().join("config.json");
        let broken = "api_url = \"http://half-edited\n";
        fs::write(&toml_path, broken).unwrap();
        fs::write(&json_path, r#"{"user_name":"Night Shift"}"#).unwrap();

        let config = AppConfig::load_files(Some(&toml_path), Some(&json_path));
        assert_eq!(config.user_name, "Night Shift");
        assert_eq!(fs::read_to_string(&toml_path).unwrap(), broken);
    }

    #[test]
    fn env_overrides_api_url() {
        let mut config = AppConfig::default();
        config.apply_env(|key| (key == API_URL_ENV).then(|| "https://api.medidesk.test/".to_string()));
        assert_eq!(config.api_url, "https://api.medidesk.test");

        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.api_url, "https://api.medidesk.test");
    }
}
