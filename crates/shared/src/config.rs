//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Balance engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Calculation cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Balance engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Fail aggregation on the first malformed expense instead of skipping it.
    ///
    /// Only financial-audit paths should turn this on.
    #[serde(default)]
    pub strict_mode: bool,
    /// Expense count at which aggregation switches to a parallel fold.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

// Kept equal to `splitbook_core::balance::DEFAULT_PARALLEL_THRESHOLD`.
fn default_parallel_threshold() -> usize {
    4096
}

/// Calculation cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached reports.
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
    /// Time-to-live for each cached report, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> u64 {
    1000
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `SPLITBOOK__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("SPLITBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
