// ABOUTME: Discovers systems from the store's schema list
// ABOUTME: Owns one SystemMetadata per discovered system, in discovery order

use super::statements::system_name_from_schema;
use super::system::SystemMetadata;
use super::MetadataError;
use crate::db::QueryRunner;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataCatalog {
    systems: Vec<SystemMetadata>,
}

impl MetadataCatalog {
    pub fn from_systems(systems: Vec<SystemMetadata>) -> Self {
        Self { systems }
    }

    /// Discover every system and load it.
    ///
    /// Always queries the store; nothing is cached between calls. A failed
    /// discovery query is an error, while failures loading an individual
    /// system only leave that system's fields empty.
    pub async fn load<R: QueryRunner>(runner: &R) -> Result<Self, MetadataError> {
        let names = Self::discover_system_names(runner).await?;
        log::info!("Discovered {} systems: {:?}", names.len(), names);

        let mut systems = Vec::with_capacity(names.len());
        for name in names {
            systems.push(SystemMetadata::load(runner, name).await);
        }
        Ok(Self { systems })
    }

    /// System names in the order the store lists their schemas
    pub async fn discover_system_names<R: QueryRunner>(
        runner: &R,
    ) -> Result<Vec<String>, MetadataError> {
        let names = runner
            .list_schemas()
            .await?
            .into_iter()
            .filter_map(|schema| system_name_from_schema(&schema).map(str::to_string))
            .collect();
        Ok(names)
    }

    pub fn systems(&self) -> &[SystemMetadata] {
        &self.systems
    }

    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.system_name()).collect()
    }

    pub fn system(&self, name: &str) -> Result<&SystemMetadata, MetadataError> {
        self.systems
            .iter()
            .find(|s| s.system_name() == name)
            .ok_or_else(|| MetadataError::SystemNotFound(name.to_string()))
    }

    pub fn system_mut(&mut self, name: &str) -> Result<&mut SystemMetadata, MetadataError> {
        self.systems
            .iter_mut()
            .find(|s| s.system_name() == name)
            .ok_or_else(|| MetadataError::SystemNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
