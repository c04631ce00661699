//! Layered app host configuration.
//!
//! Values come from an optional JSON settings file overlaid with process
//! environment variables, merged by the `config` crate. Nested keys are read
//! back with `:` separators (`{"Parameters": {"pgPassword": "x"}}` becomes
//! `Parameters:pgPassword`) and environment variable names map `__` to a
//! nested key. Keys compare without regard to ASCII case.

use ::config::{Config, Environment, File, FileFormat, Source, Value, ValueKind};
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Key prefix under which parameter values are looked up.
pub const PARAMETERS_SECTION: &str = "Parameters";

/// Separator that marks nesting in environment variable names.
pub const ENVIRONMENT_SEPARATOR: &str = "__";

/// Errors raised while loading or reading configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Read {
        /// Settings file path.
        path: String,
        /// Underlying I/O failure.
        source: Arc<std::io::Error>,
    },

    /// The settings could not be parsed or merged.
    #[error("failed to parse settings: {0}")]
    Parse(Arc<::config::ConfigError>),

    /// A value could not be converted to the requested type.
    #[error("configuration key '{key}' has invalid value '{value}': expected {expected}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Raw value.
        value: String,
        /// Expected type.
        expected: &'static str,
    },
}

impl From<::config::ConfigError> for ConfigError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Parse(Arc::new(err))
    }
}

/// Flattened, case-insensitive view of the merged configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppHostConfig {
    values: BTreeMap<String, String>,
}

impl AppHostConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the optional settings file and overlays the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the settings file cannot be read or
    /// parsed.
    pub fn load(settings_path: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let settings = settings_path.map(read_settings).transpose()?;
        let environment = std::env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        });
        Self::from_sources(settings.as_deref(), environment)
    }

    /// Merges a JSON settings document with `NAME=value` environment pairs.
    /// Environment values take precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the settings document is not
    /// valid JSON.
    pub fn from_sources(
        settings: Option<&str>,
        environment: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(json) = settings {
            builder = builder.add_source(File::from_str(json, FileFormat::Json));
        }
        let merged = builder
            .add_source(
                Environment::default()
                    .separator(ENVIRONMENT_SEPARATOR)
                    .source(Some(environment.into_iter().collect())),
            )
            .build()?;

        let mut config = Self::new();
        config.flatten_table("", merged.collect()?)?;
        Ok(config)
    }

    /// Sets one value, replacing any earlier value for the key.
    #[must_use]
    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Returns the raw value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize(key)).map(String::as_str)
    }

    /// Returns the value for `key` parsed as a boolean.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] unless the value is `true` or
    /// `false` in any case.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.get(key)
            .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(invalid(key, raw, "a boolean")),
            })
            .transpose()
    }

    /// Returns the value for `key` parsed as a port number.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the value is not a valid
    /// `u16`.
    pub fn get_port(&self, key: &str) -> Result<Option<u16>, ConfigError> {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|_| invalid(key, raw, "a port number"))
            })
            .transpose()
    }

    /// Returns the configured value of a parameter resource.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.get(&format!("{PARAMETERS_SECTION}:{name}"))
    }

    fn insert(&mut self, key: &str, value: String) {
        self.values.insert(normalize(key), value);
    }

    fn flatten_table(
        &mut self,
        prefix: &str,
        table: ::config::Map<String, Value>,
    ) -> Result<(), ConfigError> {
        // Environment keys arrive lowercased; visit them after mixed-case
        // settings keys so they win when both normalize to the same key.
        let mut entries: Vec<_> = table.into_iter().collect();
        entries.sort_by(|(left, _), (right, _)| {
            (is_lowercase(left), left).cmp(&(is_lowercase(right), right))
        });
        for (key, nested) in entries {
            self.flatten_into(&join_key(prefix, &key), nested)?;
        }
        Ok(())
    }

    fn flatten_into(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        match value.kind {
            ValueKind::Table(table) => self.flatten_table(key, table)?,
            ValueKind::Array(items) => {
                for (index, nested) in items.into_iter().enumerate() {
                    self.flatten_into(&join_key(key, &index.to_string()), nested)?;
                }
            }
            ValueKind::Nil => {}
            scalar => self.insert(key, Value::new(None, scalar).into_string()?),
        }
        Ok(())
    }
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}:{key}")
    }
}

fn is_lowercase(key: &str) -> bool {
    !key.chars().any(|ch| ch.is_ascii_uppercase())
}

fn normalize(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

fn invalid(key: &str, raw: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_owned(),
        value: raw.to_owned(),
        expected,
    }
}

fn read_settings(path: &Utf8Path) -> Result<String, ConfigError> {
    let read_error = |err: std::io::Error| ConfigError::Read {
        path: path.to_string(),
        source: Arc::new(err),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| read_error(std::io::Error::other("path must include a file name")))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(file_name).map_err(read_error)
}
