//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Names a JSON config file
pub const CONFIG_PATH_ENV: &str = "FORMKIT_CONFIG";
pub const BIND_ADDR_ENV: &str = "FORMKIT_BIND_ADDR";
pub const DATABASE_PATH_ENV: &str = "FORMKIT_DATABASE_PATH";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Allow any origin, method and header
    pub cors_permissive: bool,
    /// Largest accepted request body
    pub request_body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3001".into(),
            database_path: PathBuf::from("./form_data.db"),
            cors_permissive: true,
            request_body_limit_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load from file
    pub fn load(path: &str) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// File named by `FORMKIT_CONFIG` if any, then environment overrides.
    /// An unreadable file falls back to defaults.
    pub fn from_env() -> Self {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(&path).unwrap_or_else(|e| {
                warn!(path = %path, error = %e, "config file unusable, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        base.with_overrides(
            std::env::var(BIND_ADDR_ENV).ok(),
            std::env::var(DATABASE_PATH_ENV).ok(),
        )
    }

    pub fn with_overrides(mut self, bind_addr: Option<String>, database_path: Option<String>) -> Self {
        if let Some(addr) = bind_addr.filter(|s| !s.is_empty()) {
            self.bind_addr = addr;
        }
        if let Some(path) = database_path.filter(|s| !s.is_empty()) {
            self.database_path = PathBuf::from(path);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bind_addr": "127.0.0.1:9000"}}"#).unwrap();
        let config = ServerConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.database_path, PathBuf::from("./form_data.db"));
        assert!(config.cors_permissive);
    }

    #[test]
    fn test_overrides_win() {
        let config = ServerConfig::default().with_overrides(Some("127.0.0.1:1".into()), Some("/tmp/x.db".into()));
        assert_eq!(config.bind_addr, "127.0.0.1:1");
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));

        let config = ServerConfig::default().with_overrides(Some(String::new()), None);
        assert_eq!(config.bind_addr, "0.0.0.0:3001");
    }
}
