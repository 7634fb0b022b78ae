use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for MuzicMaze
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MuzicMazeConfig {
    /// Recommendation service settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Maze growth and layout settings
    #[serde(default)]
    pub maze: MazeConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recommendation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Base URL serving `/recommendations/{a}-{b}` and `/track/{id}`
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds; an elapsed call counts as "no answer"
    #[serde(default = "default_oracle_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_base_url(),
            timeout_secs: default_oracle_timeout_secs(),
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Maze growth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeConfig {
    /// Maximum hex distance from the origin at which growth stops
    #[serde(default = "default_maze_depth")]
    pub depth: u32,

    /// Edge length of one hex in world units
    #[serde(default = "default_hex_world_size")]
    pub hex_world_size: f64,

    /// Mazes with fewer committed cells are not handed to the renderer
    #[serde(default = "default_min_renderable_cells")]
    pub min_renderable_cells: usize,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            depth: default_maze_depth(),
            hex_world_size: default_hex_world_size(),
            min_renderable_cells: default_min_renderable_cells(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_oracle_base_url() -> String {
    "https://classy-mangrove-vertebra.glitch.me".to_string()
}
fn default_oracle_timeout_secs() -> u64 {
    10
}
fn default_maze_depth() -> u32 {
    7
}
fn default_hex_world_size() -> f64 {
    1.5
}
fn default_min_renderable_cells() -> usize {
    7
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: MuzicMazeConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.muzicmaze.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading MuzicMaze configuration");

        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config, |name| std::env::var(name).ok());
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!("Config file: {}", path.display()),
            None => info!("Config file: NONE (using defaults)"),
        }
        info!(
            base_url = %config.oracle.base_url,
            depth = config.maze.depth,
            "Configuration loaded"
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load an explicit config file as-is, without environment overrides
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::read_toml_file(path)?;
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Parse an in-memory TOML document without consulting the environment
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: MuzicMazeConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".muzicmaze.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .muzicmaze.env: {}", e);
                } else {
                    info!("Loaded .muzicmaze.env from home directory");
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.muzicmaze.toml (current directory)
    /// 2. ~/.muzicmaze/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(MuzicMazeConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".muzicmaze.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".muzicmaze").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((MuzicMazeConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<MuzicMazeConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment variable overrides; `lookup` resolves a variable name
    pub fn apply_env_overrides<F>(mut config: MuzicMazeConfig, lookup: F) -> MuzicMazeConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("MUZICMAZE_ORACLE_URL") {
            config.oracle.base_url = url;
        }
        if let Some(timeout) = lookup("MUZICMAZE_ORACLE_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.oracle.timeout_secs = secs,
                Err(_) => warn!("Ignoring unparsable MUZICMAZE_ORACLE_TIMEOUT_SECS={}", timeout),
            }
        }
        if let Some(depth) = lookup("MUZICMAZE_MAZE_DEPTH") {
            match depth.parse() {
                Ok(d) => config.maze.depth = d,
                Err(_) => warn!("Ignoring unparsable MUZICMAZE_MAZE_DEPTH={}", depth),
            }
        }
        if let Some(size) = lookup("MUZICMAZE_HEX_WORLD_SIZE") {
            if let Ok(s) = size.parse() {
                config.maze.hex_world_size = s;
            }
        }

        // Logging
        if let Some(level) = lookup("RUST_LOG") {
            config.logging.level = level;
        }
        if let Some(format) = lookup("MUZICMAZE_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    /// Validate configuration
    pub fn validate_config(config: &MuzicMazeConfig) -> Result<(), ConfigError> {
        if config.oracle.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Oracle base URL must not be empty".to_string(),
            ));
        }

        if config.oracle.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Oracle timeout must be at least one second".to_string(),
            ));
        }

        let size = config.maze.hex_world_size;
        if size.is_nan() || size <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Hex world size must be positive, got {}",
                size
            )));
        }

        // Full filter directives (e.g. from RUST_LOG) are passed to the subscriber untouched
        let level = config.logging.level.as_str();
        let is_directive = level.contains('=') || level.contains(',');
        match level {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ if is_directive => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "json" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, json, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &MuzicMazeConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Render the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(&self.config).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
