//! Configuration loading for the web front end

use anyhow::Result;
use boardmerge_core::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_static_dir() -> String {
    "./static".to_string()
}

/// Form defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Depth used when the form leaves it empty or unparsable
    #[serde(default = "default_depth")]
    pub default_depth: usize,
    /// Whether the recursive checkbox starts ticked
    #[serde(default)]
    pub default_recursive: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            default_depth: default_depth(),
            default_recursive: false,
        }
    }
}

fn default_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Config {
    /// Replace the port of the bind address, keeping its host
    pub fn set_port(&mut self, port: u16) {
        let host = self
            .server
            .bind
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        self.server.bind = format!("{}:{}", host, port);
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join("boardmerge-web.toml")).unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.scan.default_depth, DEFAULT_MAX_DEPTH);
        assert!(!config.scan.default_recursive);
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boardmerge-web.toml");
        std::fs::write(
            &path,
            r#"
[server]
bind = "127.0.0.1:9000"

[scan]
default_recursive = true
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:9000");
        assert_eq!(config.server.static_dir, "./static");
        assert!(config.scan.default_recursive);
        assert_eq!(config.scan.default_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boardmerge-web.toml");
        std::fs::write(&path, "[scan]\ndefault_depth = \"deep\"\n").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_set_port() {
        let mut config = Config::default();
        config.set_port(3000);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
    }
}
