//! Layered loading of [`InterceptorConfig`].
//!
//! Sources are merged in order, later ones winning:
//! 1. built-in defaults
//! 2. `authgate.toml` in the working directory (optional), or the file
//!    given with [`ConfigLoader::with_file`] (required)
//! 3. `AUTHGATE_*` environment variables, e.g. `AUTHGATE_REFRESH_ENDPOINT`

use std::collections::HashMap;
use std::path::PathBuf;

use authgate_domain::{DomainError, InterceptorConfig};
use config::{Config, Environment, File};
use thiserror::Error;
use tracing::debug;

/// Base name of the optional config file in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "authgate";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "AUTHGATE";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or a value had the wrong type.
    #[error("cannot load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The merged configuration is not usable.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Builds an [`InterceptorConfig`] from defaults, a file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Loader reading `authgate.toml` if present and the process environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads this file instead of `authgate.toml`. The file must exist.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Reads overrides from this map instead of the process environment.
    ///
    /// Keys are full variable names such as `AUTHGATE_HEADER_NAME`.
    #[must_use]
    pub fn with_env_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    /// Merges all sources and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed, a value has the
    /// wrong type, or the merged configuration fails validation.
    pub fn load(&self) -> Result<InterceptorConfig, ConfigError> {
        let file = match &self.file {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let env = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(self.env.clone());

        let config: InterceptorConfig = Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        config.validate()?;

        debug!(
            source = %config.token_source,
            refresh = config.refresh_enabled(),
            dedupe = config.dedupe_refresh,
            "configuration loaded"
        );
        Ok(config)
    }
}
