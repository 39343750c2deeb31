//! Configuration types for logging.

use dllist_core::error::DllistError;
use std::env;
use std::str::FromStr;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON format for structured logging.
    Json,
    /// Human-readable pretty format.
    Pretty,
    /// Compact single-line format.
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = DllistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(DllistError::ConfigValue {
                field: "DLLIST_LOG_FORMAT".to_string(),
                cause: format!("unknown log format '{}'", other),
            }),
        }
    }
}

fn flag(value: Option<String>) -> bool {
    value.is_some_and(|s| s == "true" || s == "1")
}

fn verbosity_filter(level: u8) -> &'static str {
    match level {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Configuration for tracing output.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log output format.
    log_format: LogFormat,
    /// Log filter (e.g., "info", "warn,dllist_executor=debug").
    log_filter: String,
    /// Whether to include source location in logs.
    include_location: bool,
    /// Whether to include target in logs.
    include_target: bool,
    /// Whether to include thread IDs in logs.
    include_thread_ids: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::default(),
            log_filter: "info".to_string(),
            include_location: false,
            include_target: true,
            include_thread_ids: false,
        }
    }
}

impl TracingConfig {
    /// Create a new builder.
    pub fn builder() -> TracingConfigBuilder {
        TracingConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DLLIST_LOG_FORMAT`: "json", "pretty", or "compact"
    /// - `DLLIST_LOG_LEVEL` or `RUST_LOG`: Log filter string
    /// - `DLLIST_LOG_LOCATION`: "true" to include file and line
    /// - `DLLIST_LOG_THREAD_IDS`: "true" to include thread ids
    ///
    /// Without `DLLIST_LOG_FORMAT`, a terminal gets pretty output and
    /// anything else gets JSON.
    pub fn from_env() -> Self {
        Self::from_vars(
            |name| env::var(name).ok(),
            std::io::IsTerminal::is_terminal(&std::io::stderr()),
        )
    }

    /// Build from a variable lookup; `terminal` says whether stderr is a TTY.
    pub(crate) fn from_vars(var: impl Fn(&str) -> Option<String>, terminal: bool) -> Self {
        let log_format = var("DLLIST_LOG_FORMAT")
            .and_then(|s| s.parse::<LogFormat>().ok())
            .unwrap_or(if terminal {
                LogFormat::Pretty
            } else {
                LogFormat::Json
            });

        let log_filter = var("DLLIST_LOG_LEVEL")
            .or_else(|| var("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        Self {
            log_format,
            log_filter,
            include_location: flag(var("DLLIST_LOG_LOCATION")),
            include_target: true,
            include_thread_ids: flag(var("DLLIST_LOG_THREAD_IDS")),
        }
    }

    /// Override the filter from a `-v` count. A count of zero keeps the
    /// configured filter.
    pub fn with_verbosity(mut self, level: u8) -> Self {
        if level > 0 {
            self.log_filter = verbosity_filter(level).to_string();
        }
        self
    }

    /// Get the log format.
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Get the log filter.
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Check if source location should be included.
    pub fn include_location(&self) -> bool {
        self.include_location
    }

    /// Check if target should be included.
    pub fn include_target(&self) -> bool {
        self.include_target
    }

    /// Check if thread IDs should be included.
    pub fn include_thread_ids(&self) -> bool {
        self.include_thread_ids
    }
}

/// Builder for TracingConfig.
#[derive(Debug, Clone, Default)]
pub struct TracingConfigBuilder {
    log_format: Option<LogFormat>,
    log_filter: Option<String>,
    include_location: Option<bool>,
    include_target: Option<bool>,
    include_thread_ids: Option<bool>,
}

impl TracingConfigBuilder {
    /// Set the log format.
    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.log_format = Some(format);
        self
    }

    /// Set the log filter.
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Set the log filter from a `-v` count.
    pub fn verbosity(self, level: u8) -> Self {
        self.log_filter(verbosity_filter(level))
    }

    /// Include source location in logs.
    pub fn include_location(mut self, include: bool) -> Self {
        self.include_location = Some(include);
        self
    }

    /// Include target in logs.
    pub fn include_target(mut self, include: bool) -> Self {
        self.include_target = Some(include);
        self
    }

    /// Include thread IDs in logs.
    pub fn include_thread_ids(mut self, include: bool) -> Self {
        self.include_thread_ids = Some(include);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TracingConfig {
        let defaults = TracingConfig::default();
        TracingConfig {
            log_format: self.log_format.unwrap_or(defaults.log_format),
            log_filter: self.log_filter.unwrap_or(defaults.log_filter),
            include_location: self.include_location.unwrap_or(defaults.include_location),
            include_target: self.include_target.unwrap_or(defaults.include_target),
            include_thread_ids: self
                .include_thread_ids
                .unwrap_or(defaults.include_thread_ids),
        }
    }
}
