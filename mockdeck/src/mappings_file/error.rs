use std::{io, path::PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Couldn't read mappings file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Couldn't write mappings file {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Mappings file {} is invalid: {source}", path.display())]
    InvalidFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Couldn't serialize mappings: {0}")]
    Serialize(serde_json::Error),
}

impl Error {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Error::Read { path, .. }
            | Error::Write { path, .. }
            | Error::InvalidFormat { path, .. } => Some(path),
            Error::Serialize(_) => None,
        }
    }
}
