//! Application configuration management.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Posting pipeline configuration.
    #[serde(default)]
    pub posting: PostingConfig,
    /// Failure-counting abuse guard configuration.
    #[serde(default)]
    pub abuse_guard: AbuseGuardConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Payment posting configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Operations slower than this are reported as a performance warning.
    #[serde(default = "default_slow_operation_ms")]
    pub slow_operation_ms: u64,
    /// Upper bound for the abuse-guard admission check.
    #[serde(default = "default_guard_timeout_ms")]
    pub guard_timeout_ms: u64,
}

fn default_slow_operation_ms() -> u64 {
    5_000
}

fn default_guard_timeout_ms() -> u64 {
    3_000
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            slow_operation_ms: default_slow_operation_ms(),
            guard_timeout_ms: default_guard_timeout_ms(),
        }
    }
}

impl PostingConfig {
    /// Threshold above which a payment is logged as slow.
    #[must_use]
    pub const fn slow_operation(&self) -> Duration {
        Duration::from_millis(self.slow_operation_ms)
    }

    /// Timeout applied to the abuse-guard check.
    #[must_use]
    pub const fn guard_timeout(&self) -> Duration {
        Duration::from_millis(self.guard_timeout_ms)
    }
}

/// Abuse guard configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AbuseGuardConfig {
    /// Failures tolerated inside one window before the caller is blocked.
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
    /// Length of the failure-counting window in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// How long a blocked caller stays blocked, in seconds.
    #[serde(default = "default_block_secs")]
    pub block_secs: u64,
}

fn default_max_failures() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    300 // 5 minutes
}

fn default_block_secs() -> u64 {
    900 // 15 minutes
}

impl Default for AbuseGuardConfig {
    fn default() -> Self {
        Self {
            max_failures: default_max_failures(),
            window_secs: default_window_secs(),
            block_secs: default_block_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "coopbook=info,sea_orm=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("COOPBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
