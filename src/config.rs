//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::adapters::fs_font::DEFAULT_FONT_PATH;

/// Environment variable that enables the local folder sink when `"true"`.
pub const IS_LOCAL_ENV: &str = "IS_LOCAL";
/// Environment variable holding the storage connection string.
pub const STORAGE_CONNECTION_ENV: &str = "AzureWebJobsStorage";
/// Environment variable with the port the Functions host expects us on.
pub const CUSTOM_HANDLER_PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Rendering settings.
    #[serde(default)]
    pub render: RenderConfig,

    /// Local folder sink settings.
    #[serde(default)]
    pub local: LocalConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Blob storage settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage connection string.
    pub connection_string: Option<String>,
    /// Container the checks are uploaded to.
    pub container: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { connection_string: None, container: "checks-blob-container".to_string() }
    }
}

/// Rendering settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Path of the display font.
    pub font_path: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { font_path: PathBuf::from(DEFAULT_FONT_PATH) }
    }
}

/// Local folder sink settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Also write each check to `folder`.
    pub enabled: bool,
    /// Output folder; relative paths resolve against the working directory.
    pub folder: PathBuf,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self { enabled: false, folder: PathBuf::from("blobs") }
    }
}

/// HTTP server settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening port on 127.0.0.1.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

/// Log output settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable text.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "checkgen=info".to_string(), json: false }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Apply overrides from the process environment.
    ///
    /// Read once at startup; the handler never consults the environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(flag) = var(IS_LOCAL_ENV) {
            self.local.enabled = flag == "true";
        }
        if let Some(conn) = var(STORAGE_CONNECTION_ENV).filter(|c| !c.trim().is_empty()) {
            self.storage.connection_string = Some(conn);
        }
        if let Some(port) = var(CUSTOM_HANDLER_PORT_ENV).and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
    }

    /// Local output folder as an absolute path.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn local_folder(&self) -> std::io::Result<PathBuf> {
        if self.local.folder.is_absolute() {
            Ok(self.local.folder.clone())
        } else {
            Ok(std::env::current_dir()?.join(&self.local.folder))
        }
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `CHECKGEN_CONFIG` environment variable
/// 3. `checkgen.toml` in the working directory
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("CHECKGEN_CONFIG") {
        return PathBuf::from(p);
    }

    PathBuf::from("checkgen.toml")
}
