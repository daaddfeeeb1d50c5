//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/quire/config.toml)
//! 3. Environment variables (QUIRE_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "QUIRE";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (reading states, documents)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Minimum viewport width (columns) for side-by-side pages
    #[serde(default = "default_dual_page_min_width")]
    pub dual_page_min_width: u16,

    /// Characters of context on each side of a search match
    #[serde(default = "default_snippet_context")]
    pub snippet_context: usize,

    /// Command that reads text from stdin aloud (e.g. `espeak`)
    #[serde(default)]
    pub speech_command: Option<String>,

    /// Log file (defaults to {data_dir}/debug.log)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            dual_page_min_width: default_dual_page_min_width(),
            snippet_context: default_snippet_context(),
            speech_command: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (QUIRE_DATA_DIR, QUIRE_DUAL_PAGE_MIN_WIDTH,
    ///    QUIRE_SNIPPET_CONTEXT, QUIRE_SPEECH_COMMAND)
    /// 2. Config file (~/.config/quire/config.toml or QUIRE_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Numeric values that fail to parse are ignored.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_DUAL_PAGE_MIN_WIDTH", ENV_PREFIX)) {
            if let Ok(width) = val.trim().parse() {
                self.dual_page_min_width = width;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_SNIPPET_CONTEXT", ENV_PREFIX)) {
            if let Ok(context) = val.trim().parse() {
                self.snippet_context = context;
            }
        }

        // Empty string clears the speech command
        if let Ok(val) = std::env::var(format!("{}_SPEECH_COMMAND", ENV_PREFIX)) {
            self.speech_command = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with QUIRE_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quire")
            .join("config.toml")
    }

    /// Get the path to the reading state file
    pub fn reading_state_path(&self) -> PathBuf {
        self.data_dir.join("reading_state.json")
    }

    /// Get the directory holding drafts and published documents
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }

    /// Get the log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("quire")
}

fn default_dual_page_min_width() -> u16 {
    120
}

fn default_snippet_context() -> usize {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "QUIRE_DATA_DIR",
        "QUIRE_DUAL_PAGE_MIN_WIDTH",
        "QUIRE_SNIPPET_CONTEXT",
        "QUIRE_SPEECH_COMMAND",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dual_page_min_width, 120);
        assert_eq!(config.snippet_context, 30);
        assert!(config.speech_command.is_none());
        assert!(config.data_dir.ends_with("quire"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.reading_state_path().ends_with("reading_state.json"));
        assert!(config.documents_dir().ends_with("documents"));
        assert!(config.log_path().ends_with("debug.log"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("QUIRE_DATA_DIR", "/tmp/quire-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/quire-test"));
    }

    #[test]
    fn test_env_override_numbers() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("QUIRE_DUAL_PAGE_MIN_WIDTH", "200");
        env::set_var("QUIRE_SNIPPET_CONTEXT", "10");
        config.apply_env_overrides();
        assert_eq!(config.dual_page_min_width, 200);
        assert_eq!(config.snippet_context, 10);

        env::set_var("QUIRE_DUAL_PAGE_MIN_WIDTH", "wide");
        config.apply_env_overrides();
        assert_eq!(config.dual_page_min_width, 200);
    }

    #[test]
    fn test_env_override_speech_command() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("QUIRE_SPEECH_COMMAND", "espeak");
        config.apply_env_overrides();
        assert_eq!(config.speech_command, Some("espeak".to_string()));

        // Empty string clears it
        env::set_var("QUIRE_SPEECH_COMMAND", "");
        config.apply_env_overrides();
        assert!(config.speech_command.is_none());
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/quire"),
            dual_page_min_width: 100,
            snippet_context: 20,
            speech_command: Some("say".to_string()),
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("speech_command"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.dual_page_min_width, 100);
        assert_eq!(parsed.snippet_context, 20);
        assert_eq!(parsed.speech_command, config.speech_command);
    }

    #[test]
    fn test_load_from_str_fills_defaults() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str(r#"data_dir = "/custom/data""#).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.dual_page_min_width, 120);
        assert_eq!(config.snippet_context, 30);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("QUIRE_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.speech_command.is_none());
        assert!(config.data_dir.exists());
    }
}
