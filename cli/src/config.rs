//! CLI Configuration

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api_url: Option<String>,
    /// Default form definition location for `form` commands
    pub form_config: Option<String>,
    pub default_format: Option<String>,
}

impl Config {
    pub fn load(profile: Option<&str>) -> Result<Self, String> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn save(&self, profile: Option<&str>) -> Result<(), String> {
        self.save_to(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
            toml::from_str(&content).map_err(|e| e.to_string())
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, content).map_err(|e| e.to_string())
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf, String> {
        let home = dirs::home_dir().ok_or("Cannot find home directory")?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".formkit").join(filename))
    }

    /// Configured default format; unknown names fall back to table
    pub fn output_format(&self) -> OutputFormat {
        self.default_format
            .as_deref()
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .unwrap_or(OutputFormat::Table)
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), String> {
        match key {
            "api_url" => self.api_url = Some(value),
            "form_config" => self.form_config = Some(value),
            "default_format" => {
                OutputFormat::from_str(&value, true)
                    .map_err(|_| format!("Unknown format: {} (expected table, json or yaml)", value))?;
                self.default_format = Some(value);
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<&str>, String> {
        match key {
            "api_url" => Ok(self.api_url.as_deref()),
            "form_config" => Ok(self.form_config.as_deref()),
            "default_format" => Ok(self.default_format.as_deref()),
            _ => Err(format!("Unknown config key: {}", key)),
        }
    }

    pub const KEYS: [&'static str; 3] = ["api_url", "form_config", "default_format"];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.set("api_url", "http://localhost:3001/api".into()).unwrap();
        config.set("default_format", "json".into()).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(matches!(loaded.output_format(), OutputFormat::Json));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
        assert!(matches!(loaded.output_format(), OutputFormat::Table));
    }

    #[test]
    fn test_unknown_keys_and_formats() {
        let mut config = Config::default();
        assert!(config.set("api_key", "x".into()).is_err());
        assert!(config.set("default_format", "xml".into()).is_err());
        assert!(config.get("tenant_id").is_err());
        assert_eq!(config.get("form_config").unwrap(), None);
    }
}
