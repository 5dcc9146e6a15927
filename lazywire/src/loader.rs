//! Loading [Configuration] from layered sources with the `config` crate. Later sources override
//! earlier ones, key by key.
//!
//! By default, the configuration is read from an optional `lazywire.json` file, then overwritten by
//! environment variables prefixed with `LAZYWIRE_`. Nested keys in variable names are separated by
//! `__`, e.g. `LAZYWIRE_DEPENDENCIES__ALIASES__MAILER=app::SmtpMailer`.
//!
//! Loaded configuration is plain data - pre-built service instances can only be added in code.

use crate::value::Configuration;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File};
pub use config::FileFormat;
use std::path::Path;
use tracing::debug;

/// Name of the default config file.
pub const CONFIG_FILE: &str = "lazywire.json";

/// Prefix of environment variables read by default.
pub const CONFIG_ENV_PREFIX: &str = "LAZYWIRE";

const ENV_SEPARATOR: &str = "__";

impl Configuration {
    /// Loads configuration from the default file and environment.
    pub fn from_environment() -> Result<Self, ConfigError> {
        ConfigurationLoader::new()
            .with_optional_file(CONFIG_FILE)
            .with_environment(CONFIG_ENV_PREFIX)
            .load()
    }
}

/// Builder assembling configuration sources.
#[derive(Debug, Default)]
pub struct ConfigurationLoader {
    builder: ConfigBuilder<DefaultState>,
}

impl ConfigurationLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required file. The format is deduced from the extension.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()));
        self
    }

    /// Adds a file which is skipped if not present. The name can omit the extension.
    pub fn with_optional_file(mut self, name: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::with_name(name).required(false));
        self
    }

    /// Adds inline contents in the given format.
    pub fn with_str(mut self, contents: &str, format: FileFormat) -> Self {
        self.builder = self.builder.add_source(File::from_str(contents, format));
        self
    }

    /// Adds environment variables with the given prefix.
    pub fn with_environment(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR),
        );
        self
    }

    /// Merges all sources into a [Configuration].
    pub fn load(self) -> Result<Configuration, ConfigError> {
        let configuration = self
            .builder
            .build()
            .and_then(|config| config.try_deserialize::<Configuration>())?;

        debug!(keys = configuration.len(), "Loaded configuration");

        Ok(configuration)
    }
}
