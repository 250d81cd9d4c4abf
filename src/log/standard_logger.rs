use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use crate::log::{LogConfiguration, ModuleLogConfiguration};

// Wall-clock time, colored level and the emitting module, e.g.
// `2025-01-01T09:00:00Z INFO  ixa_city::city - seeded 5 infections`.
const CITY_LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l:<5})} {t} - {m}{n}";

// Log lines go to stderr so the counts the binary prints on stdout stay machine readable.
const CITY_APPENDER: &str = "stderr";

impl From<&ModuleLogConfiguration> for Logger {
    fn from(module_config: &ModuleLogConfiguration) -> Self {
        Logger::builder().build(module_config.module.clone(), module_config.level)
    }
}

fn build_config(configuration: &LogConfiguration) -> Config {
    let appender = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(CITY_LOG_PATTERN)))
        .build();
    let loggers = configuration
        .module_configurations
        .values()
        .map(Logger::from);
    let root = Root::builder()
        .appender(CITY_APPENDER)
        .build(configuration.global_log_level);

    Config::builder()
        .appender(Appender::builder().build(CITY_APPENDER, Box::new(appender)))
        .loggers(loggers)
        .build(root)
        .unwrap_or_else(|e| panic!("invalid log configuration: {e}"))
}

impl LogConfiguration {
    /// Installs this configuration, or swaps it in if a logger is already installed.
    pub(in crate::log) fn set_config(&mut self) {
        let config = build_config(self);
        if let Some(handle) = &self.root_handle {
            handle.set_config(config);
            return;
        }
        match log4rs::init_config(config) {
            Ok(handle) => self.root_handle = Some(handle),
            // Another logger owns the `log` facade; leave it in place.
            Err(e) => eprintln!("city logging not installed: {e}"),
        }
    }
}
