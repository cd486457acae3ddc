//! Configuration for the resilient call wrapper.
//!
//! Settings are layered with the `config` crate:
//! - Bundled defaults (include_str! from spark.toml)
//! - User overrides (~/.config/spark/spark.toml, then ./spark.toml)
//! - `SPARK_*` environment variables (e.g. `SPARK_MAX_RETRIES=5`)
//!
//! Configuration is loaded once at start-up and passed explicitly to the
//! wrapper. There is no process-wide instance.

use crate::backoff::QUOTA_WAIT_CAP_SECONDS;
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use spark_error::{ConfigError, ConfigErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../spark.toml");

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "SPARK";

/// Retry, backoff and quota settings for one process.
///
/// # Example
///
/// ```
/// use spark_resilience::CallConfig;
///
/// let config = CallConfig::builder()
///     .max_retries(5)
///     .base_delay_seconds(2.0)
///     .max_delay_seconds(60.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(*config.max_retries(), 5);
/// assert_eq!(*config.consecutive_failure_threshold(), 3);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[serde(default)]
#[builder(
    default,
    pattern = "owned",
    build_fn(validate = "Self::validate_fields")
)]
pub struct CallConfig {
    /// Retries after the first attempt (0 means exactly one attempt)
    max_retries: u32,

    /// Standard backoff step in seconds
    base_delay_seconds: f64,

    /// Upper bound on standard backoff in seconds
    max_delay_seconds: f64,

    /// Quota cooldown step in seconds, multiplied by consecutive quota failures
    quota_wait_seconds: f64,

    /// Upper bound on quota cooldown in seconds
    quota_wait_cap_seconds: f64,

    /// Consecutive quota failures after which the call site gives up
    consecutive_failure_threshold: u32,

    /// Upper bound on a single attempt in seconds (0 disables)
    attempt_timeout_seconds: f64,

    /// Randomise standard backoff below its capped value
    jitter: bool,

    /// Fabricate placeholder responses instead of calling the endpoint
    mock_mode: bool,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_seconds: 30.0,
            max_delay_seconds: 300.0,
            quota_wait_seconds: 300.0,
            quota_wait_cap_seconds: QUOTA_WAIT_CAP_SECONDS,
            consecutive_failure_threshold: 3,
            attempt_timeout_seconds: 300.0,
            jitter: false,
            mock_mode: false,
        }
    }
}

impl CallConfig {
    /// Creates a new call config builder.
    pub fn builder() -> CallConfigBuilder {
        CallConfigBuilder::default()
    }

    /// Maximum number of invocations of the call function.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Builder seeded with every value of this configuration.
    pub fn to_builder(&self) -> CallConfigBuilder {
        CallConfigBuilder::default()
            .max_retries(self.max_retries)
            .base_delay_seconds(self.base_delay_seconds)
            .max_delay_seconds(self.max_delay_seconds)
            .quota_wait_seconds(self.quota_wait_seconds)
            .quota_wait_cap_seconds(self.quota_wait_cap_seconds)
            .consecutive_failure_threshold(self.consecutive_failure_threshold)
            .attempt_timeout_seconds(self.attempt_timeout_seconds)
            .jitter(self.jitter)
            .mock_mode(self.mock_mode)
    }

    /// Returns a copy with mock mode switched on or off.
    pub fn with_mock_mode(mut self, enabled: bool) -> Self {
        self.mock_mode = enabled;
        self
    }

    /// Checks every range constraint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::InvalidField`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_delay_seconds.is_finite() || self.base_delay_seconds <= 0.0 {
            return Err(ConfigError::invalid(
                "base_delay_seconds",
                format!("must be a finite value > 0, got {}", self.base_delay_seconds),
            ));
        }
        if !self.max_delay_seconds.is_finite() || self.max_delay_seconds < self.base_delay_seconds
        {
            return Err(ConfigError::invalid(
                "max_delay_seconds",
                format!(
                    "must be finite and >= base_delay_seconds ({}), got {}",
                    self.base_delay_seconds, self.max_delay_seconds
                ),
            ));
        }
        non_negative("quota_wait_seconds", self.quota_wait_seconds)?;
        non_negative("quota_wait_cap_seconds", self.quota_wait_cap_seconds)?;
        non_negative("attempt_timeout_seconds", self.attempt_timeout_seconds)?;
        if self.consecutive_failure_threshold < 1 {
            return Err(ConfigError::invalid(
                "consecutive_failure_threshold",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Load from the standard sources (bundled, user files, environment).
    #[instrument]
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&ConfigSources::standard())
    }

    /// Load bundled defaults overridden by one specific file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_from(&ConfigSources::bundled().with_file(path.as_ref()))
    }

    /// Load from an explicit set of sources and validate the result.
    pub fn load_from(sources: &ConfigSources) -> Result<Self, ConfigError> {
        let config: Self = sources.build()?.try_deserialize().map_err(|e| {
            ConfigError::new(ConfigErrorKind::Parse(e.to_string()))
        })?;
        config.validate()?;
        debug!(?config, "Loaded call configuration");
        Ok(config)
    }
}

impl CallConfigBuilder {
    fn validate_fields(&self) -> Result<(), String> {
        let defaults = CallConfig::default();
        let probe = CallConfig {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            base_delay_seconds: self.base_delay_seconds.unwrap_or(defaults.base_delay_seconds),
            max_delay_seconds: self.max_delay_seconds.unwrap_or(defaults.max_delay_seconds),
            quota_wait_seconds: self.quota_wait_seconds.unwrap_or(defaults.quota_wait_seconds),
            quota_wait_cap_seconds: self
                .quota_wait_cap_seconds
                .unwrap_or(defaults.quota_wait_cap_seconds),
            consecutive_failure_threshold: self
                .consecutive_failure_threshold
                .unwrap_or(defaults.consecutive_failure_threshold),
            attempt_timeout_seconds: self
                .attempt_timeout_seconds
                .unwrap_or(defaults.attempt_timeout_seconds),
            jitter: self.jitter.unwrap_or(defaults.jitter),
            mock_mode: self.mock_mode.unwrap_or(defaults.mock_mode),
        };
        probe.validate().map_err(|e| e.kind().to_string())
    }
}

/// Settings for sequential shot batches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(default)]
pub struct BatchConfig {
    /// Pause after each successful shot in seconds
    success_wait_seconds: f64,

    /// How long the quota gate stays closed once tripped, in seconds
    quota_reset_interval_seconds: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            success_wait_seconds: 5.0,
            quota_reset_interval_seconds: 3600.0,
        }
    }
}

impl BatchConfig {
    /// Create a batch config with explicit values.
    pub fn new(success_wait_seconds: f64, quota_reset_interval_seconds: f64) -> Self {
        Self {
            success_wait_seconds,
            quota_reset_interval_seconds,
        }
    }

    /// Checks both fields are finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("success_wait_seconds", self.success_wait_seconds)?;
        non_negative(
            "quota_reset_interval_seconds",
            self.quota_reset_interval_seconds,
        )
    }

    /// Load from the standard sources.
    #[instrument]
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&ConfigSources::standard())
    }

    /// Load from an explicit set of sources and validate the result.
    pub fn load_from(sources: &ConfigSources) -> Result<Self, ConfigError> {
        let config: Self = sources.build()?.try_deserialize().map_err(|e| {
            ConfigError::new(ConfigErrorKind::Parse(e.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be a finite value >= 0, got {}", value),
        ))
    }
}

/// Which layers feed a configuration load.
///
/// Later layers override earlier ones: bundled defaults, user files, an
/// explicit file, then environment variables.
///
/// # Example
///
/// ```
/// use spark_resilience::{CallConfig, ConfigSources};
/// use std::collections::HashMap;
///
/// let env = HashMap::from([("SPARK_MAX_RETRIES".to_string(), "7".to_string())]);
/// let config = CallConfig::load_from(&ConfigSources::bundled().with_env(env)).unwrap();
/// assert_eq!(*config.max_retries(), 7);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    user_files: bool,
    file: Option<PathBuf>,
    env: EnvSource,
}

#[derive(Debug, Clone, Default)]
enum EnvSource {
    #[default]
    Disabled,
    Process,
    Fixed(Map<String, String>),
}

impl ConfigSources {
    /// Bundled defaults only.
    pub fn bundled() -> Self {
        Self::default()
    }

    /// Bundled defaults, user files, and the process environment.
    pub fn standard() -> Self {
        Self {
            user_files: true,
            file: None,
            env: EnvSource::Process,
        }
    }

    /// Add an explicit file layered after the user files.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Read `SPARK_*` variables from the given map instead of the process environment.
    pub fn with_env(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env = EnvSource::Fixed(vars.into_iter().collect());
        self
    }

    /// Read `SPARK_*` variables from the process environment.
    pub fn with_process_env(mut self) -> Self {
        self.env = EnvSource::Process;
        self
    }

    fn build(&self) -> Result<Config, ConfigError> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if self.user_files {
            if let Some(home) = dirs::home_dir() {
                let home_config = home.join(".config/spark/spark.toml");
                builder = builder.add_source(File::from(home_config).required(false));
            }
            builder = builder.add_source(File::with_name("spark").required(false));
        }

        if let Some(path) = &self.file {
            debug!(path = %path.display(), "Adding explicit configuration file");
            builder = builder.add_source(File::from(path.as_path()));
        }

        let env = Environment::with_prefix(ENV_PREFIX).try_parsing(true);
        builder = match &self.env {
            EnvSource::Disabled => builder,
            EnvSource::Process => builder.add_source(env),
            EnvSource::Fixed(vars) => builder.add_source(env.source(Some(vars.clone()))),
        };

        builder
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))
    }
}
