use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ConfigError;

/// Directories searched, in order, for resources bundled with the program.
#[derive(Clone, Debug, Default)]
pub struct Resources {
    roots: Vec<PathBuf>,
}

impl Resources {
    /// Resources shipped next to the running executable: its own directory,
    /// then a `resources/` directory beside it.
    pub fn bundled() -> Self {
        let roots = match std::env::current_exe() {
            Ok(exe) => match exe.parent() {
                Some(dir) => vec![dir.to_path_buf(), dir.join("resources")],
                None => Vec::new(),
            },
            Err(e) => {
                debug!("cannot locate running executable: {}", e);
                Vec::new()
            }
        };
        Self { roots }
    }

    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// First existing `root/name` across the search roots. A candidate whose
    /// existence cannot be checked is a read failure, not a miss.
    pub fn locate(&self, name: &str) -> Result<Option<PathBuf>, ConfigError> {
        for root in &self.roots {
            let candidate = root.join(name);
            match candidate.try_exists() {
                Ok(true) => return Ok(Some(candidate)),
                Ok(false) => {}
                Err(source) => {
                    return Err(ConfigError::Read {
                        name: name.to_string(),
                        source,
                    })
                }
            }
        }
        Ok(None)
    }

    /// Opens the named resource, returning the resolved path with the handle.
    pub fn open(&self, name: &str) -> Result<(PathBuf, File), ConfigError> {
        let path = self.locate(name)?.ok_or_else(|| ConfigError::ResourceNotFound {
            name: name.to_string(),
            searched: self.roots.clone(),
        })?;
        debug!("resolved resource {} to {}", name, path.display());
        let file = open_file(name, &path)?;
        Ok((path, file))
    }
}

pub(crate) fn open_file(name: &str, path: &Path) -> Result<File, ConfigError> {
    File::open(path).map_err(|source| ConfigError::Read {
        name: name.to_string(),
        source,
    })
}
