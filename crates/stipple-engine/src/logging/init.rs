use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` uses `env_logger` filter syntax (e.g. `"stipple_engine=trace,wgpu=warn"`).
/// Precedence: `env_filter`, then `RUST_LOG`, then `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Route output through the test harness capture instead of stderr.
    pub is_test: bool,
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            is_test: false,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
///
/// Call early in `main`. If another logger is already installed, a warning is
/// printed through it and this configuration is dropped.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.env_filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => match std::env::var("RUST_LOG") {
                Ok(filter) => {
                    builder.parse_filters(&filter);
                }
                Err(_) => {
                    builder.filter_level(config.default_level);
                    // wgpu is chatty at info.
                    builder.filter_module("wgpu_core", LevelFilter::Warn);
                    builder.filter_module("wgpu_hal", LevelFilter::Warn);
                }
            },
        }

        builder.write_style(config.write_style).is_test(config.is_test);

        match builder.try_init() {
            Ok(()) => log::debug!("logging initialized"),
            Err(e) => log::warn!("logger already installed: {e}"),
        }
    });
}
