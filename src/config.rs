use std::path::Path;

use crate::error::ConfigError;
use crate::store::ConfigStore;

/// Name of the properties resource bundled with the program.
pub const RESOURCE_NAME: &str = "config.properties";

/// `resources/config.properties`, compiled into the binary.
pub const BUNDLED_CONFIG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/resources/config.properties"
));

/// Key naming the log verbosity for tools built on the store.
pub const LOG_LEVEL_KEY: &str = "LOG_LEVEL";

// Unlike the global accessor, path-based loading hands every failure back to
// the caller so a tool can decide whether it is fatal.
pub fn load_config(path: &str) -> Result<ConfigStore, ConfigError> {
    ConfigStore::load_file(Path::new(path))
}

/// Maps `LOG_LEVEL` to a tracing level, defaulting to INFO.
pub fn log_level(config: &ConfigStore) -> tracing::Level {
    match config
        .get(LOG_LEVEL_KEY)
        .map(|v| v.to_uppercase())
        .as_deref()
    {
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("WARN") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
