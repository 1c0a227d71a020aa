// ABOUTME: Editing session holding the query runner and the loaded catalog
// ABOUTME: Built once by the caller and passed by reference to every command

use crate::config::ConnectionProfile;
use crate::db::{self, AnyRunner, QueryRunner};
use crate::metadata::{MetadataCatalog, MetadataError, SystemMetadata};

pub struct Session<R: QueryRunner> {
    runner: R,
    catalog: MetadataCatalog,
}

impl Session<AnyRunner> {
    /// Connect with a profile and load the catalog
    pub async fn connect(profile: &ConnectionProfile) -> Result<Self, MetadataError> {
        let runner = db::connect(profile)?;
        Self::open(runner).await
    }
}

impl<R: QueryRunner> Session<R> {
    /// Discover and load every system once
    pub async fn open(runner: R) -> Result<Self, MetadataError> {
        let catalog = MetadataCatalog::load(&runner).await?;
        Ok(Self { runner, catalog })
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn catalog(&self) -> &MetadataCatalog {
        &self.catalog
    }

    /// Runner together with a mutable system, for write-through edits
    pub fn system_mut(&mut self, name: &str) -> Result<(&R, &mut SystemMetadata), MetadataError> {
        let system = self.catalog.system_mut(name)?;
        Ok((&self.runner, system))
    }

    /// Re-read one system from storage
    pub async fn reload_system(&mut self, name: &str) -> Result<&SystemMetadata, MetadataError> {
        let (runner, system) = self.system_mut(name)?;
        system.reload(runner).await;
        Ok(&*system)
    }
}
