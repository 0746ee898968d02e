#![forbid(unsafe_code)]
//! TOML configuration for the shape model tools and the tracing setup that goes with it.
//!
//! ```toml
//! [logging]
//! level = "info"
//! json = false
//!
//! [loader]
//! strict_signatures = false
//! max_depth = 64
//! ```

use std::path::Path;
use std::sync::Once;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, TestWriter};

pub use nova_types_bridge::LoaderConfig;

static TRACING_INIT: Once = Once::new();

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NovaShapesConfig {
    pub logging: LoggingConfig,
    pub loader: LoaderConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    pub level: String,

    /// Emit logs in JSON format.
    pub json: bool,

    /// Write logs to stderr (debug builds go through the test harness capture, still on
    /// stderr). When disabled, `init_tracing` installs nothing.
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    pub(crate) fn normalize_level_directives(input: &str) -> String {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::default_level();
        }

        match trimmed.to_ascii_lowercase().as_str() {
            // Bare levels are accepted in any case, plus the `warning` synonym.
            "trace" => "trace".to_owned(),
            "debug" => "debug".to_owned(),
            "info" => "info".to_owned(),
            "warn" | "warning" => "warn".to_owned(),
            "error" => "error".to_owned(),
            // Anything else is an `EnvFilter` directive string such as `nova.types=trace,warn`.
            _ => trimmed.to_owned(),
        }
    }

    /// The configured directives alone; an unparsable `level` falls back to `info`.
    fn config_env_filter(&self) -> tracing_subscriber::EnvFilter {
        let directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(directives).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::default()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
        })
    }

    /// The effective filter for the `nova.types`, `nova.types.bridge`, `nova.nexus` and
    /// `nova.config` targets.
    ///
    /// `RUST_LOG`, when set, is appended to the configured directives so that it can raise or
    /// lower individual targets. If the merged string does not parse, `RUST_LOG` alone is tried
    /// before falling back to the configuration.
    pub fn env_filter(&self) -> tracing_subscriber::EnvFilter {
        let env_directives = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let Some(env_directives) = env_directives else {
            return self.config_env_filter();
        };
        let config_directives = Self::normalize_level_directives(&self.level);
        tracing_subscriber::EnvFilter::try_new(format!("{config_directives},{env_directives}"))
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(&env_directives))
            .unwrap_or_else(|_| self.config_env_filter())
    }

    /// Where log lines go, or `None` when `stderr` is disabled.
    fn make_writer(&self) -> Option<BoxMakeWriter> {
        if !self.stderr {
            return None;
        }
        // `cargo test` only captures output written through `print!`/`eprint!`. `TestWriter`
        // uses `eprint!` here, so debug builds still log to stderr.
        Some(if cfg!(debug_assertions) {
            BoxMakeWriter::new(TestWriter::with_stderr)
        } else {
            BoxMakeWriter::new(std::io::stderr)
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` quotes the offending source line; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl NovaShapesConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Installs the global tracing subscriber described by `config`.
///
/// Only the first call in a process has an effect; later calls (and calls after another
/// subscriber was installed) are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let Some(writer) = config.make_writer() else {
        return;
    };
    TRACING_INIT.call_once(|| {
        let builder = tracing_subscriber::fmt().with_env_filter(config.env_filter());
        let installed = if config.json {
            builder.json().with_writer(writer).try_init()
        } else {
            builder.with_writer(writer).try_init()
        };
        if let Err(err) = installed {
            tracing::debug!(target: "nova.config", error = %err, "tracing subscriber already installed");
        }
    });
}
