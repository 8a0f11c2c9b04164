//! Parkvote configuration file handling.
//!
//! Operator settings only (paths, policy, logging) in TOML, stored under
//! the platform data directory. The ledger contents themselves live in the
//! SQLite database next to the config.

use parkvote::ledger::VotePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

/// Parkvote operator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkvoteConfig {
    /// Ledger storage and policy
    pub ledger: LedgerConfig,

    /// External data sources for the chat router
    #[serde(default)]
    pub services: ServicesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ledger-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path to the SQLite ledger database
    pub db_path: PathBuf,

    /// Voting integrity policy: "delegated" (caller names the voter, no
    /// duplicate check) or "self_checked" (caller is the voter, repeat
    /// votes rejected)
    #[serde(default)]
    pub policy: VotePolicy,
}

/// Chat service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServicesConfig {
    /// GeoJSON FeatureCollection of green spaces for offline area queries.
    /// Features need `properties.name` and `properties.area_m2`.
    pub features_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

impl ParkvoteConfig {
    /// Create a new configuration with the given database path
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            ledger: LedgerConfig {
                db_path,
                policy: VotePolicy::default(),
            },
            services: ServicesConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: ParkvoteConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        Ok(())
    }

    /// Generate default configuration content as a string with comments
    pub fn generate_default_toml(db_path: &Path) -> String {
        format!(
            r#"# Parkvote Configuration (Operator Settings)
#
# Ledger CONTENTS (proposals, votes) live in the SQLite database below and
# are only changed through parkvote commands, never by editing files.

[ledger]
# Path to the SQLite ledger database
db_path = "{db_path}"

# Voting integrity policy:
#   "delegated"    - any caller may vote on behalf of any named identity;
#                    no duplicate check. The layer in front of the ledger
#                    (e.g. the chat router) is trusted to authenticate.
#   "self_checked" - the voter is the calling identity and a repeat vote
#                    on the same proposal is rejected.
policy = "delegated"

[services]
# GeoJSON FeatureCollection of green spaces for offline `ask` queries.
# Features need properties.name and properties.area_m2.
# features_path = "/var/lib/parkvote/greens.geojson"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (optional, logs to stderr if not specified)
# file = "/var/log/parkvote/parkvote.log"
"#,
            db_path = db_path.display()
        )
    }

    /// Create and save a default configuration file
    pub fn create_default(
        config_path: &Path,
        db_path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let contents = Self::generate_default_toml(db_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        fs::write(config_path, contents).map_err(|e| {
            format!(
                "Failed to write config file '{}': {}",
                config_path.display(),
                e
            )
        })?;

        Ok(())
    }
}

/// Default config file path: ~/.local/share/parkvote/config.toml
pub fn default_config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Default ledger database path: ~/.local/share/parkvote/ledger.db
pub fn default_db_path() -> PathBuf {
    data_dir().join("ledger.db")
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parkvote")
}
