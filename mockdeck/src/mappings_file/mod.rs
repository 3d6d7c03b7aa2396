pub mod error;

use crate::{data::PersistableMappingInfo, mappings_provider::MappingsProvider};
use error::Error;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use tracing::debug;

pub const DEFAULT_FILE_NAME: &str = "mappings.json";

/// `mappings.json` next to the running executable, or in the working
/// directory when the executable location is unknown.
pub fn default_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(DEFAULT_FILE_NAME)
}

/// A missing file holds no mappings.
pub fn load_mappings<P: AsRef<Path>>(path: P) -> Result<Vec<PersistableMappingInfo>, Error> {
    let path = path.as_ref();

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no mappings file yet");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(Error::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&contents).map_err(|source| Error::InvalidFormat {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_mappings<P: AsRef<Path>>(
    path: P,
    mappings: &[PersistableMappingInfo],
) -> Result<(), Error> {
    let path = path.as_ref();
    let contents = serde_json::to_string_pretty(mappings).map_err(Error::Serialize)?;

    let write_error = |source| Error::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, contents).map_err(write_error)?;

    debug!(path = %path.display(), count = mappings.len(), "mappings saved");
    Ok(())
}

#[derive(Debug, Clone)]
pub struct JsonFileMappingsProvider {
    path: PathBuf,
}

impl JsonFileMappingsProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for JsonFileMappingsProvider {
    fn default() -> Self {
        Self::new(default_path())
    }
}

impl MappingsProvider for JsonFileMappingsProvider {
    fn load_mappings(&self) -> Result<Vec<PersistableMappingInfo>, crate::Error> {
        Ok(load_mappings(&self.path)?)
    }

    fn save_mappings(&self, mappings: &[PersistableMappingInfo]) -> Result<(), crate::Error> {
        Ok(save_mappings(&self.path, mappings)?)
    }
}
