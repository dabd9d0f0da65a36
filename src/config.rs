//! Configuration management for tagallery using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::repository::DbContext;
use crate::storage::ImageLibrary;

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "tagallery.db";

/// Default folder, under the image root, holding categorized images.
pub const DEFAULT_PROCESSED_FOLDER: &str = "processed";

/// Default folder, under the image root, holding new images.
pub const DEFAULT_UNPROCESSED_FOLDER: &str = "unprocessed";

/// Default images subdirectory name.
const IMAGES_SUBDIR: &str = "images";

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3333;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 10;

/// Application settings.
///
/// Built once at startup and never mutated while serving.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Root of the image library.
    pub images_dir: PathBuf,
    /// Folder name under `images_dir` for categorized images.
    pub processed_folder: String,
    /// Folder name under `images_dir` for new images.
    pub unprocessed_folder: String,
    /// Host to bind the server to.
    pub host: String,
    /// Port to bind the server to.
    pub port: u16,
    /// Verbose logging and HTTP request tracing.
    pub debug: bool,
    /// Upper bound for a single database operation.
    pub db_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_data_dir(PathBuf::from("."))
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            images_dir: data_dir.join(IMAGES_SUBDIR),
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            processed_folder: DEFAULT_PROCESSED_FOLDER.to_string(),
            unprocessed_folder: DEFAULT_UNPROCESSED_FOLDER.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            db_timeout: Duration::from_secs(DEFAULT_DB_TIMEOUT_SECS),
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            format!("sqlite:{}", self.database_path().display())
        }
    }

    /// Get the full path to the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Image root and working folders.
    pub fn image_library(&self) -> ImageLibrary {
        ImageLibrary::new(
            &self.images_dir,
            &self.processed_folder,
            &self.unprocessed_folder,
        )
    }

    /// Ensure the data directory and image folders exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        self.image_library().ensure_directories()
    }

    /// Create a database context using the configured database URL or path.
    pub fn create_db_context(&self) -> DbContext {
        DbContext::from_url(&self.database_url())
    }

    /// Apply `DATABASE`, `IMAGES`, `PORT` and friends from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|s| !s.is_empty());

        if let Some(database) = var("DATABASE") {
            tracing::debug!("Using DATABASE from environment: {}", database);
            self.database_filename = database;
        }
        if let Some(url) = var("DATABASE_URL") {
            tracing::debug!("Using DATABASE_URL from environment: {}", url);
            self.database_url = Some(url);
        }
        if let Some(images) = var("IMAGES") {
            tracing::debug!("Using IMAGES from environment: {}", images);
            self.images_dir = PathBuf::from(shellexpand::tilde(&images).as_ref());
        }
        if let Some(folder) = var("PROCESSED_IMAGES_FOLDER") {
            self.processed_folder = folder;
        }
        if let Some(folder) = var("UNPROCESSED_IMAGES_FOLDER") {
            self.unprocessed_folder = folder;
        }
        if let Some(host) = var("HOST") {
            self.host = host;
        }
        if let Some(port) = var("PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
        if let Some(debug) = var("DEBUG") {
            self.debug = parse_flag(&debug);
        }
        if let Some(secs) = var("DB_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.db_timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!("Ignoring invalid DB_TIMEOUT_SECS value: {}", secs),
            }
        }
    }
}

/// Truthiness of a boolean environment variable such as `DEBUG`.
pub fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Database URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    /// Image root directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_images_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unprocessed_images_folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// Per-operation database timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_timeout_secs: Option<u64>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers tagallery config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("tagallery").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// `base_dir` is used to resolve relative paths (typically config file dir or CWD).
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
            settings.images_dir = settings.data_dir.join(IMAGES_SUBDIR);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref url) = self.database_url {
            settings.database_url = Some(url.clone());
        }
        if let Some(ref images) = self.images {
            settings.images_dir = self.resolve_path(images, base_dir);
        }
        if let Some(ref folder) = self.processed_images_folder {
            settings.processed_folder = folder.clone();
        }
        if let Some(ref folder) = self.unprocessed_images_folder {
            settings.unprocessed_folder = folder.clone();
        }
        if let Some(ref host) = self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(debug) = self.debug {
            settings.debug = debug;
        }
        if let Some(secs) = self.db_timeout_secs {
            settings.db_timeout = Duration::from_secs(secs);
        }
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory or database file (--data flag).
    pub data: Option<PathBuf>,
}

/// Look for a config file in the data directory.
fn find_config_in_data_dir(data_dir: &Path) -> Option<PathBuf> {
    let extensions = ["json", "toml", "yaml", "yml"];
    let basenames = ["tagallery", "config"];

    for basename in basenames {
        for ext in extensions {
            let path = data_dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn is_db_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "db" || ext == "sqlite" || ext == "sqlite3")
        || path.is_file()
}

/// Resolve the --data path to (directory, optional database filename).
fn resolve_data_path(path: &Path) -> (PathBuf, Option<String>) {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        current_dir().join(path)
    };

    if is_db_file(&path) {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string);
        let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        (dir, filename)
    } else {
        (path, None)
    }
}

/// Load config from file sources.
async fn load_file_config(options: &LoadOptions, data_dir: Option<&Path>) -> Config {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                Config::default()
            });
    }

    // Priority 2: Config in data dir
    if let Some(data_dir) = data_dir {
        if let Some(config_path) = find_config_in_data_dir(data_dir) {
            tracing::debug!("Found config in data dir: {}", config_path.display());
            return Config::load_from_path(&config_path)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Config::default()
                });
        }
    }

    // Priority 3: Auto-discover via prefer
    Config::load().await
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let data_override = options.data.as_deref().map(resolve_data_path);

    let config = load_file_config(&options, data_override.as_ref().map(|(d, _)| d.as_path())).await;

    let mut settings = Settings::default();

    let base_dir = if options.use_cwd {
        current_dir()
    } else {
        config.base_dir().unwrap_or_else(current_dir)
    };

    config.apply_to_settings(&mut settings, &base_dir);

    // --data override takes precedence for data_dir
    if let Some((data_dir, database_filename)) = data_override {
        if config.images.is_none() {
            settings.images_dir = data_dir.join(IMAGES_SUBDIR);
        }
        settings.data_dir = data_dir;
        if let Some(filename) = database_filename {
            settings.database_filename = filename;
        }
    }

    // Environment takes highest precedence
    settings.apply_env_overrides();

    (settings, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::with_data_dir(PathBuf::from("/srv/gallery"));
        assert_eq!(settings.images_dir, PathBuf::from("/srv/gallery/images"));
        assert_eq!(settings.processed_folder, "processed");
        assert_eq!(settings.unprocessed_folder, "unprocessed");
        assert_eq!(settings.port, 3333);
        assert_eq!(settings.db_timeout, Duration::from_secs(10));
        assert_eq!(
            settings.database_url(),
            "sqlite:/srv/gallery/tagallery.db"
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DATABASE", "photos.db"),
            ("IMAGES", "/mnt/photos"),
            ("UNPROCESSED_IMAGES_FOLDER", "inbox"),
            ("PORT", "8080"),
            ("DEBUG", "true"),
            ("DB_TIMEOUT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::with_data_dir(PathBuf::from("/data"));
        settings.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.database_path(), PathBuf::from("/data/photos.db"));
        assert_eq!(settings.images_dir, PathBuf::from("/mnt/photos"));
        assert_eq!(settings.unprocessed_folder, "inbox");
        assert_eq!(settings.processed_folder, "processed");
        assert_eq!(settings.port, 8080);
        assert!(settings.debug);
        assert_eq!(settings.db_timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_load_toml_relative_to_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tagallery.toml");
        std::fs::write(
            &path,
            "data_dir = \"data\"\nimages = \"pictures\"\nport = 4000\ndb_timeout_secs = 3\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, &config.base_dir().unwrap());

        assert_eq!(settings.data_dir, dir.path().join("data"));
        assert_eq!(settings.images_dir, dir.path().join("pictures"));
        assert_eq!(settings.port, 4000);
        assert_eq!(settings.db_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_load_yaml_and_json() {
        let dir = tempdir().unwrap();

        let yaml = dir.path().join("config.yaml");
        std::fs::write(&yaml, "host: 0.0.0.0\ndebug: true\n").unwrap();
        let config = Config::load_from_path(&yaml).await.unwrap();
        assert_eq!(config.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(config.debug, Some(true));

        let json = dir.path().join("config.json");
        std::fs::write(&json, r#"{"processed_images_folder": "done"}"#).unwrap();
        let config = Config::load_from_path(&json).await.unwrap();
        assert_eq!(config.processed_images_folder.as_deref(), Some("done"));

        std::fs::write(&json, "not json").unwrap();
        assert!(Config::load_from_path(&json).await.is_err());
    }

    #[test]
    fn test_parse_flag() {
        for value in ["1", "true", "TRUE", "yes", "Yes"] {
            assert!(parse_flag(value), "{value}");
        }
        for value in ["0", "false", "no", "", "on"] {
            assert!(!parse_flag(value), "{value}");
        }
    }

    #[test]
    fn test_resolve_data_path() {
        let (dir, file) = resolve_data_path(Path::new("/srv/gallery/photos.sqlite"));
        assert_eq!(dir, PathBuf::from("/srv/gallery"));
        assert_eq!(file.as_deref(), Some("photos.sqlite"));

        let (dir, file) = resolve_data_path(Path::new("/srv/gallery"));
        assert_eq!(dir, PathBuf::from("/srv/gallery"));
        assert!(file.is_none());
    }

    #[test]
    fn test_find_config_in_data_dir() {
        let dir = tempdir().unwrap();
        assert!(find_config_in_data_dir(dir.path()).is_none());

        std::fs::write(dir.path().join("config.yml"), "port: 1").unwrap();
        assert_eq!(
            find_config_in_data_dir(dir.path()),
            Some(dir.path().join("config.yml"))
        );
    }
}
