use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ConfigError;
use crate::properties;
use crate::resource::{self, Resources};

/// Immutable key/value configuration loaded from a properties resource.
///
/// Construct it once with [`ConfigStore::load`] and hand it to whatever needs
/// configuration; lookups never fail, a missing key is simply `None`.
#[derive(Clone, Debug, Default)]
pub struct ConfigStore {
    entries: HashMap<String, String>,
}

impl ConfigStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolves `name` against `resources` and loads it.
    pub fn load(resources: &Resources, name: &str) -> Result<Self, ConfigError> {
        Self::load_with_path(resources, name).map(|(_, store)| store)
    }

    /// Like [`ConfigStore::load`], also returning the path that was read.
    pub fn load_with_path(resources: &Resources, name: &str) -> Result<(PathBuf, Self), ConfigError> {
        let (path, file) = resources.open(name)?;
        let store = Self::read_named(name, file)?;
        info!("loaded {} entries from {}", store.len(), path.display());
        Ok((path, store))
    }

    /// Loads a properties file from an explicit filesystem path.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let name = path.display().to_string();
        let file = resource::open_file(&name, path)?;
        Self::read_named(&name, file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Self::read_named("<stream>", reader)
    }

    /// Parses properties text, e.g. a resource embedded with `include_str!`.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut entries = HashMap::new();
        for (key, value) in properties::parse(text)? {
            entries.insert(key, value);
        }
        Ok(Self { entries })
    }

    pub(crate) fn read_named<R: Read>(name: &str, mut reader: R) -> Result<Self, ConfigError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| ConfigError::Read {
                name: name.to_string(),
                source,
            })?;
        Self::parse(&properties::decode(&bytes))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
