// ABOUTME: Database module exports for Schema Scribe
// ABOUTME: Query runner boundary plus SQL Server and SQLite backends

pub mod runner;
pub mod sqlite;
pub mod sqlserver;

#[cfg(test)]
pub mod testing;

pub use runner::{Dialect, QueryError, QueryRunner, Row, Statement, Value};
pub use sqlite::SqliteRunner;
pub use sqlserver::SqlServerRunner;

use crate::config::{ConnectionProfile, DatabaseType};

/// Runner chosen from a connection profile's database type
pub enum AnyRunner {
    SqlServer(SqlServerRunner),
    Sqlite(SqliteRunner),
}

/// Build the runner for a profile. SQL Server connections are opened lazily per query.
pub fn connect(profile: &ConnectionProfile) -> Result<AnyRunner, QueryError> {
    log::info!("Using {:?} profile '{}'", profile.db_type, profile.name);
    match profile.db_type {
        DatabaseType::SqlServer => Ok(AnyRunner::SqlServer(SqlServerRunner::new(profile.clone()))),
        DatabaseType::Sqlite => Ok(AnyRunner::Sqlite(SqliteRunner::open(profile)?)),
    }
}

impl QueryRunner for AnyRunner {
    fn dialect(&self) -> Dialect {
        match self {
            AnyRunner::SqlServer(r) => r.dialect(),
            AnyRunner::Sqlite(r) => r.dialect(),
        }
    }

    async fn run(&self, statement: &Statement) -> Result<Vec<Row>, QueryError> {
        match self {
            AnyRunner::SqlServer(r) => r.run(statement).await,
            AnyRunner::Sqlite(r) => r.run(statement).await,
        }
    }

    async fn list_schemas(&self) -> Result<Vec<String>, QueryError> {
        match self {
            AnyRunner::SqlServer(r) => r.list_schemas().await,
            AnyRunner::Sqlite(r) => r.list_schemas().await,
        }
    }
}
