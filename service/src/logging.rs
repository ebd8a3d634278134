use crate::config::{Config, RustEnv};
use log::{LevelFilter, SetLoggerError};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Dependency modules whose logs are dropped unless running at Trace level.
/// The HTTP stack logs every request and frame, which buries connection events.
const NOISY_MODULES: &[&str] = &["tower", "tracing", "hyper", "axum"];

pub struct Logger {}

impl Logger {
    /// Initializes the global terminal logger from `config`.
    ///
    /// Panics if a global logger has already been installed.
    pub fn init_logger(config: &Config) {
        Self::try_init_logger(config).expect("Failed to start simplelog");
    }

    pub fn try_init_logger(config: &Config) -> Result<(), SetLoggerError> {
        TermLogger::init(
            config.log_level_filter,
            Self::build_log_config(config.log_level_filter),
            TerminalMode::Mixed,
            Self::color_choice(&config.runtime_env),
        )
    }

    /// RFC3339 timestamps, with noisy dependencies silenced below Trace.
    fn build_log_config(level: LevelFilter) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();

        for module in Self::ignored_modules(level) {
            builder.add_filter_ignore_str(module);
        }

        builder.build()
    }

    fn ignored_modules(level: LevelFilter) -> &'static [&'static str] {
        if level == LevelFilter::Trace {
            &[]
        } else {
            NOISY_MODULES
        }
    }

    // Production logs are shipped to a collector; escape codes only get in the way.
    fn color_choice(env: &RustEnv) -> ColorChoice {
        match env {
            RustEnv::Production => ColorChoice::Never,
            RustEnv::Development | RustEnv::Staging => ColorChoice::Auto,
        }
    }
}
