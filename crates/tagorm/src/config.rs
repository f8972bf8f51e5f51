use crate::error::{OrmError, OrmResult};
use crate::ident::validate_ident;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Environment variable holding the database path (`:memory:` for in-memory).
pub const ENV_DATABASE: &str = "TAGORM_DATABASE";
/// Environment variable holding the busy timeout in milliseconds.
pub const ENV_BUSY_TIMEOUT_MS: &str = "TAGORM_BUSY_TIMEOUT_MS";
/// Environment variable toggling SQL logging (`1`/`true`/`on`, `0`/`false`/`off`).
pub const ENV_LOG_SQL: &str = "TAGORM_LOG_SQL";

/// Pragmas run on every new connection unless overridden.
pub const DEFAULT_INITIAL_SQL: &str = "PRAGMA foreign_keys = ON;";

/// SQL logging settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether statements are logged at all.
    pub enabled: bool,
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Statements slower than this are logged at WARN.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }
}

/// Configuration for [`Connection`](crate::Connection).
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database file. `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    /// How long SQLite waits on a locked database.
    pub busy_timeout: Option<Duration>,
    /// SQL batch run right after opening.
    pub initial_sql: Option<String>,
    /// Table recording the connection id. `None` disables the marker.
    pub marker_table: Option<String>,
    /// SQL logging.
    pub log: LogConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout: Some(Duration::from_secs(5)),
            initial_sql: Some(DEFAULT_INITIAL_SQL.to_string()),
            marker_table: None,
            log: LogConfig::default(),
        }
    }
}

impl ConnectionConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a database file.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Use an in-memory database.
    pub fn in_memory(mut self) -> Self {
        self.path = None;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    pub fn initial_sql(mut self, sql: impl Into<String>) -> Self {
        self.initial_sql = Some(sql.into());
        self
    }

    pub fn no_initial_sql(mut self) -> Self {
        self.initial_sql = None;
        self
    }

    /// Record the connection id in `table` on open.
    pub fn marker_table(mut self, table: impl Into<String>) -> Self {
        self.marker_table = Some(table.into());
        self
    }

    /// Override the tracing event level.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.log.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.log.max_sql_length = None;
        self
    }

    /// Set slow query threshold.
    pub fn slow_threshold(mut self, duration: Duration) -> Self {
        self.log.slow_query_threshold = Some(duration);
        self
    }

    /// Disable SQL logging.
    pub fn no_logging(mut self) -> Self {
        self.log.enabled = false;
        self
    }

    /// Build a configuration from `TAGORM_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> OrmResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> OrmResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(db) = lookup(ENV_DATABASE) {
            let db = db.trim();
            config.path = match db {
                "" | ":memory:" => None,
                path => Some(PathBuf::from(path)),
            };
        }
        if let Some(ms) = lookup(ENV_BUSY_TIMEOUT_MS) {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                OrmError::config(format!("{ENV_BUSY_TIMEOUT_MS} must be an integer, got '{ms}'"))
            })?;
            config.busy_timeout = Some(Duration::from_millis(ms));
        }
        if let Some(flag) = lookup(ENV_LOG_SQL) {
            config.log.enabled = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => true,
                "0" | "false" | "off" | "no" => false,
                other => {
                    return Err(OrmError::config(format!(
                        "{ENV_LOG_SQL} must be a boolean, got '{other}'"
                    )));
                }
            };
        }
        Ok(config)
    }

    /// Check settings that would otherwise fail on open.
    pub fn validate(&self) -> OrmResult<()> {
        if let Some(table) = &self.marker_table {
            validate_ident(table)
                .map_err(|_| OrmError::config(format!("invalid marker table name '{table}'")))?;
        }
        Ok(())
    }
}
