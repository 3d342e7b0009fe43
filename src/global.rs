//! Process-wide configuration, loaded once from the `config.properties`
//! compiled into the binary.
//!
//! A failed load never reaches callers of [`get`]: it is reported once and
//! the store stays empty. Use [`status`] when the difference matters.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use tracing::{error, info};

use crate::config::{BUNDLED_CONFIG, RESOURCE_NAME};
use crate::error::ConfigError;
use crate::resource::Resources;
use crate::store::ConfigStore;

/// Where the global configuration came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadSource {
    Embedded(&'static str),
    File(PathBuf),
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadSource::Embedded(name) => write!(f, "embedded {}", name),
            LoadSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Outcome of the one-time global load.
#[derive(Debug)]
pub enum LoadStatus {
    Loaded {
        source: LoadSource,
        entries: usize,
        loaded_at: DateTime<Utc>,
    },
    Failed(ConfigError),
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }
}

struct Global {
    store: ConfigStore,
    status: LoadStatus,
}

static GLOBAL: OnceCell<Global> = OnceCell::new();

fn settle(loaded: Result<(LoadSource, ConfigStore), ConfigError>) -> Global {
    match loaded {
        Ok((source, store)) => {
            info!("loaded {} entries from {}", store.len(), source);
            let status = LoadStatus::Loaded {
                source,
                entries: store.len(),
                loaded_at: Utc::now(),
            };
            Global { store, status }
        }
        Err(e) => {
            report_failure(&e);
            Global {
                store: ConfigStore::empty(),
                status: LoadStatus::Failed(e),
            }
        }
    }
}

fn load_embedded() -> Global {
    settle(
        ConfigStore::parse(BUNDLED_CONFIG).map(|store| (LoadSource::Embedded(RESOURCE_NAME), store)),
    )
}

fn load(resources: &Resources) -> Global {
    settle(
        ConfigStore::load_with_path(resources, RESOURCE_NAME)
            .map(|(path, store)| (LoadSource::File(path), store)),
    )
}

fn report_failure(e: &ConfigError) {
    if tracing::dispatcher::has_been_set() {
        error!("configuration unavailable: {}", e);
    } else {
        // Nobody is listening to tracing yet; stderr is the only channel left.
        eprintln!("configuration unavailable: {}", e);
    }
}

fn global() -> &'static Global {
    GLOBAL.get_or_init(load_embedded)
}

/// Eagerly loads the embedded configuration. Later calls return the status of
/// the first load.
pub fn init() -> &'static LoadStatus {
    &global().status
}

/// Eagerly loads configuration from explicit search roots. Has no effect if the
/// global store is already initialized.
pub fn init_with(resources: &Resources) -> &'static LoadStatus {
    &GLOBAL.get_or_init(|| load(resources)).status
}

/// Looks up `key`, loading the embedded configuration on first use.
pub fn get(key: &str) -> Option<&'static str> {
    global().store.get(key)
}

pub fn store() -> &'static ConfigStore {
    &global().store
}

pub fn status() -> &'static LoadStatus {
    &global().status
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_records_success() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join(RESOURCE_NAME), "a=1\nb=2\n").expect("write");

        let global = load(&Resources::from_dirs([dir.path()]));
        assert_eq!(global.store.get("b"), Some("2"));
        match global.status {
            LoadStatus::Loaded { source, entries, .. } => {
                assert_eq!(source, LoadSource::File(dir.path().join(RESOURCE_NAME)));
                assert_eq!(entries, 2);
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn load_failure_leaves_store_empty() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join(RESOURCE_NAME), "a=1\nb=\\u00").expect("write");

        let global = load(&Resources::from_dirs([dir.path()]));
        assert!(global.store.is_empty());
        assert!(!global.status.is_loaded());
        assert!(matches!(global.status, LoadStatus::Failed(ConfigError::Parse { line: 2, .. })));
    }

    #[test]
    fn embedded_load_uses_compiled_resource() {
        let global = load_embedded();
        assert_eq!(global.store.get("host"), Some("localhost"));
        assert_eq!(global.store.get("timeout"), Some("30"));
        match global.status {
            LoadStatus::Loaded { source, entries, .. } => {
                assert_eq!(source, LoadSource::Embedded(RESOURCE_NAME));
                assert_eq!(source.to_string(), "embedded config.properties");
                assert_eq!(entries, global.store.len());
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }
}
