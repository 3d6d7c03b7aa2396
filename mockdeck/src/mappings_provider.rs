use crate::{data::PersistableMappingInfo, error::Error};
use std::{fmt::Debug, sync::Mutex};

/// Where the mapping list is loaded from and saved to.
pub trait MappingsProvider: Debug {
    fn load_mappings(&self) -> Result<Vec<PersistableMappingInfo>, Error>;
    fn save_mappings(&self, mappings: &[PersistableMappingInfo]) -> Result<(), Error>;
}

/// Keeps mappings in memory only.
#[derive(Debug, Default)]
pub struct InMemoryMappingsProvider {
    mappings: Mutex<Vec<PersistableMappingInfo>>,
}

impl InMemoryMappingsProvider {
    pub fn new(mappings: Vec<PersistableMappingInfo>) -> Self {
        Self {
            mappings: Mutex::new(mappings),
        }
    }
}

impl MappingsProvider for InMemoryMappingsProvider {
    fn load_mappings(&self) -> Result<Vec<PersistableMappingInfo>, Error> {
        Ok(self.mappings.lock()?.clone())
    }

    fn save_mappings(&self, mappings: &[PersistableMappingInfo]) -> Result<(), Error> {
        *self.mappings.lock()? = mappings.to_vec();
        Ok(())
    }
}
