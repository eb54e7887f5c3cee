//! Configuration types for file-backed preference stores

use std::path::PathBuf;
use std::sync::Arc;

use crate::storage::{JsonStorage, StorageBackend};

/// Source of environment variables for preference overrides
///
/// The default implementation reads the process environment; tests supply
/// a map instead of mutating global state.
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads overrides from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEnvSource;

impl EnvSource for DefaultEnvSource {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for std::collections::HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Configuration for opening a [`FilePreferenceStore`](crate::FilePreferenceStore)
pub struct PreferencesConfig<S: StorageBackend = JsonStorage> {
    /// Directory where the preference file is stored
    pub config_dir: PathBuf,

    /// Filename of the preference file (e.g., "preferences.json")
    pub file_name: String,

    /// Application name (used to derive the default config directory)
    pub app_name: String,

    /// Storage backend implementation
    pub storage: S,

    /// Environment variable prefix for overrides (e.g., "MYIDE" -> MYIDE_EDITOR_TAB_WIDTH)
    /// If None, env var overrides are disabled
    pub env_prefix: Option<String>,

    /// Where environment overrides are looked up
    pub env_source: Arc<dyn EnvSource>,
}

impl<S: StorageBackend> PreferencesConfig<S> {
    /// Get the full path to the preference file
    pub fn preferences_path(&self) -> PathBuf {
        self.config_dir.join(&self.file_name)
    }
}

impl PreferencesConfig<JsonStorage> {
    /// Create a new builder for `PreferencesConfig`
    ///
    /// # Example
    /// ```rust
    /// use prefstage::PreferencesConfig;
    ///
    /// let config = PreferencesConfig::builder("my-ide")
    ///     .config_dir("/tmp/my-ide")
    ///     .build();
    /// assert!(config.preferences_path().ends_with("preferences.json"));
    /// ```
    pub fn builder(app_name: impl Into<String>) -> PreferencesConfigBuilder<JsonStorage> {
        PreferencesConfigBuilder::new(app_name)
    }
}

/// Builder for creating `PreferencesConfig` with a fluent API
pub struct PreferencesConfigBuilder<S: StorageBackend = JsonStorage> {
    config_dir: Option<PathBuf>,
    file_name: Option<String>,
    app_name: String,
    storage: S,
    env_prefix: Option<String>,
    env_source: Arc<dyn EnvSource>,
}

impl std::fmt::Debug for PreferencesConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferencesConfigBuilder")
            .field("config_dir", &self.config_dir)
            .field("file_name", &self.file_name)
            .field("app_name", &self.app_name)
            .field("env_prefix", &self.env_prefix)
            .finish_non_exhaustive()
    }
}

impl PreferencesConfigBuilder<JsonStorage> {
    /// Create a new builder with the required app name
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            config_dir: None,
            file_name: None,
            app_name: app_name.into(),
            storage: JsonStorage::new(),
            env_prefix: None,
            env_source: Arc::new(DefaultEnvSource),
        }
    }

    /// Use compact JSON (no pretty printing)
    pub fn compact_json(mut self) -> Self {
        self.storage = JsonStorage::compact();
        self
    }
}

impl<S: StorageBackend> PreferencesConfigBuilder<S> {
    /// Set the configuration directory
    ///
    /// Supports `~` expansion for home directory.
    pub fn config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        let expanded = match (path.strip_prefix("~"), dirs::home_dir()) {
            (Ok(rest), Some(home)) => home.join(rest),
            _ => path,
        };
        self.config_dir = Some(expanded);
        self
    }

    /// Set the preference filename (default: "preferences.<extension>")
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Swap the storage backend
    pub fn with_storage<T: StorageBackend>(self, storage: T) -> PreferencesConfigBuilder<T> {
        PreferencesConfigBuilder {
            config_dir: self.config_dir,
            file_name: self.file_name,
            app_name: self.app_name,
            storage,
            env_prefix: self.env_prefix,
            env_source: self.env_source,
        }
    }

    /// Enable environment variable overrides
    ///
    /// The variable name is `{PREFIX}_{KEY}`, uppercased, with `.` and `-`
    /// turned into `_`.
    ///
    /// # Example
    /// ```rust
    /// use prefstage::PreferencesConfig;
    ///
    /// let config = PreferencesConfig::builder("my-ide")
    ///     .with_env_prefix("MYIDE")
    ///     .build();
    ///
    /// // Now MYIDE_EDITOR_TAB_WIDTH=2 overrides "editor.tab_width"
    /// assert_eq!(config.env_prefix.as_deref(), Some("MYIDE"));
    /// ```
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Replace the environment lookup (defaults to the process environment)
    pub fn with_env_source(mut self, source: impl EnvSource + 'static) -> Self {
        self.env_source = Arc::new(source);
        self
    }

    /// Build the `PreferencesConfig`
    ///
    /// If `config_dir` is not set, uses the system config directory for the app.
    pub fn build(self) -> PreferencesConfig<S> {
        let config_dir = self.config_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .map(|d| d.join(&self.app_name))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        let file_name = self
            .file_name
            .unwrap_or_else(|| format!("preferences.{}", self.storage.extension()));

        PreferencesConfig {
            config_dir,
            file_name,
            app_name: self.app_name,
            storage: self.storage,
            env_prefix: self.env_prefix,
            env_source: self.env_source,
        }
    }
}
