//! Logging setup for dllist processes.
//!
//! Log format is controlled via `DLLIST_LOG_FORMAT`:
//! - `json` - Structured JSON output, one object per line
//! - `pretty` - Human-readable multi-line output
//! - `compact` - Compact single-line format
//!
//! Without it, a terminal gets `pretty` and anything else gets `json`.
//!
//! The filter comes from `DLLIST_LOG_LEVEL`, then `RUST_LOG`, then `info`;
//! a `-v` count given to the CLI overrides it. `DLLIST_LOG_LOCATION` and
//! `DLLIST_LOG_THREAD_IDS` set to `true` or `1` add file/line and thread ids.
//!
//! # Example
//!
//! ```ignore
//! use dllist_executor::observability::{LogFormat, TracingConfig, init_tracing};
//!
//! let _guard = init_tracing(TracingConfig::from_env())?;
//!
//! let config = TracingConfig::builder()
//!     .log_format(LogFormat::Json)
//!     .log_filter("debug,dllist_core=trace")
//!     .build();
//! let _guard = init_tracing(config)?;
//! ```

mod config;
mod tracing_setup;

pub use config::{LogFormat, TracingConfig, TracingConfigBuilder};
pub use tracing_setup::{TracingGuard, init_tracing};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.log_filter(), "info");
        assert!(config.include_target());
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::builder()
            .log_format(LogFormat::Json)
            .log_filter("debug")
            .include_location(true)
            .build();

        assert_eq!(config.log_format(), LogFormat::Json);
        assert_eq!(config.log_filter(), "debug");
        assert!(config.include_location());
        assert!(config.include_target());
    }

    #[test]
    fn test_verbosity_filters() {
        assert_eq!(TracingConfig::builder().verbosity(0).build().log_filter(), "warn");
        assert_eq!(TracingConfig::builder().verbosity(1).build().log_filter(), "info");
        assert_eq!(TracingConfig::builder().verbosity(2).build().log_filter(), "debug");
        assert_eq!(TracingConfig::builder().verbosity(9).build().log_filter(), "trace");
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_defaults_follow_terminal() {
        let config = TracingConfig::from_vars(vars(&[]), true);
        assert_eq!(config.log_format(), LogFormat::Pretty);
        assert_eq!(config.log_filter(), "info");
        assert!(!config.include_location());
        assert!(!config.include_thread_ids());

        let config = TracingConfig::from_vars(vars(&[]), false);
        assert_eq!(config.log_format(), LogFormat::Json);
    }

    #[test]
    fn test_env_variables_applied() {
        let config = TracingConfig::from_vars(
            vars(&[
                ("DLLIST_LOG_FORMAT", "compact"),
                ("DLLIST_LOG_LEVEL", "debug,dllist_core=trace"),
                ("RUST_LOG", "error"),
                ("DLLIST_LOG_LOCATION", "true"),
                ("DLLIST_LOG_THREAD_IDS", "1"),
            ]),
            true,
        );
        assert_eq!(config.log_format(), LogFormat::Compact);
        assert_eq!(config.log_filter(), "debug,dllist_core=trace");
        assert!(config.include_location());
        assert!(config.include_thread_ids());

        let config = TracingConfig::from_vars(vars(&[("RUST_LOG", "error")]), false);
        assert_eq!(config.log_filter(), "error");
    }

    #[test]
    fn test_verbosity_overrides_only_when_given() {
        let base = || TracingConfig::from_vars(vars(&[("DLLIST_LOG_LEVEL", "error")]), false);
        assert_eq!(base().with_verbosity(0).log_filter(), "error");
        assert_eq!(base().with_verbosity(2).log_filter(), "debug");
        assert_eq!(base().with_verbosity(2).log_format(), LogFormat::Json);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
