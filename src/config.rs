use crate::core::db::{ConnectionOptions, IdentifierPolicy};
use crate::core::{LitegateError, Result};
use crate::error_log::ErrorLog;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct FacadeConfig {
    pub database: DatabaseConfig,
    pub log: Option<LogConfig>,
    pub sqlite: Option<SqliteConfig>,
}

/// Location of the store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Store file path, or `:memory:`
    pub path: String,
}

/// Error log configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Append failures to this file instead of the tracing channel
    pub file: Option<PathBuf>,
}

/// SQLite connection settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SqliteConfig {
    pub foreign_keys: Option<bool>,
    pub journal_mode: Option<String>,
    pub busy_timeout_ms: Option<u64>,
    pub strict_identifiers: Option<bool>,
}

impl FacadeConfig {
    /// A configuration with only the store path set.
    pub fn new(path: &str) -> Self {
        FacadeConfig {
            database: DatabaseConfig {
                path: path.to_string(),
            },
            log: None,
            sqlite: None,
        }
    }

    pub fn with_log_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.log = Some(LogConfig {
            file: Some(file.into()),
        });
        self
    }

    pub fn with_sqlite(mut self, sqlite: SqliteConfig) -> Self {
        self.sqlite = Some(sqlite);
        self
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        let sqlite = self.sqlite.clone().unwrap_or_default();
        let defaults = ConnectionOptions::default();
        ConnectionOptions {
            foreign_keys: sqlite.foreign_keys.unwrap_or(defaults.foreign_keys),
            journal_mode: sqlite.journal_mode,
            busy_timeout: sqlite
                .busy_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.busy_timeout),
        }
    }

    pub fn identifier_policy(&self) -> IdentifierPolicy {
        match self.sqlite.as_ref().and_then(|s| s.strict_identifiers) {
            Some(true) => IdentifierPolicy::Strict,
            _ => IdentifierPolicy::Trusted,
        }
    }

    pub fn error_log(&self) -> ErrorLog {
        ErrorLog::from_path(self.log.as_ref().and_then(|l| l.file.clone()))
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Arguments
///
/// * `path` - The file path to the TOML configuration file.
///
/// # Example
///
/// ```no_run
/// let config = litegate::config::load_config("litegate.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FacadeConfig> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| LitegateError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_CONFIG: &str = r#"
[database]
path = "app.db"

[log]
file = "/var/log/app/db-errors.log"

[sqlite]
foreign_keys = false
journal_mode = "WAL"
busy_timeout_ms = 250
strict_identifiers = true
"#;

    #[test]
    fn test_load_config_from_str() {
        let config: FacadeConfig = toml::from_str(SAMPLE_CONFIG).expect("Failed to parse sample config");
        assert_eq!(config.database.path, "app.db");
        assert_eq!(
            config.error_log(),
            ErrorLog::File(PathBuf::from("/var/log/app/db-errors.log"))
        );
        assert_eq!(config.identifier_policy(), IdentifierPolicy::Strict);

        let options = config.connection_options();
        assert!(!options.foreign_keys);
        assert_eq!(options.journal_mode.as_deref(), Some("WAL"));
        assert_eq!(options.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config: FacadeConfig = toml::from_str("[database]\npath = \":memory:\"\n").unwrap();
        assert_eq!(config.error_log(), ErrorLog::Stderr);
        assert_eq!(config.identifier_policy(), IdentifierPolicy::Trusted);
        assert_eq!(config.connection_options(), ConnectionOptions::default());
    }

    #[test]
    fn test_load_config_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CONFIG.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.database.path, "app.db");
    }

    #[test]
    fn test_load_config_errors() {
        assert!(matches!(
            load_config("/nonexistent/litegate.toml"),
            Err(LitegateError::Io(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[database]\n").unwrap();
        assert!(matches!(load_config(file.path()), Err(LitegateError::Config(_))));
    }
}
