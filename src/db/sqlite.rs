// ABOUTME: SQLite query runner for local metadata stores
// ABOUTME: Each system schema is a <NAME>_SCHEMA.db file attached under its schema name

use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::runner::{Dialect, QueryError, QueryRunner, Row, Statement, Value};
use crate::config::ConnectionProfile;
use crate::metadata::statements::SCHEMA_SUFFIX;

impl From<rusqlite::Error> for QueryError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                QueryError::Connection(e.to_string())
            }
            rusqlite::Error::InvalidPath(_) => QueryError::Connection(e.to_string()),
            other => QueryError::Execution(other.to_string()),
        }
    }
}

enum Store {
    /// One connection for every statement; schemas are attached by the caller
    Shared(Mutex<Connection>),
    /// Directory of `<NAME>_SCHEMA.db` files, attached per statement
    Directory(PathBuf),
}

pub struct SqliteRunner {
    store: Store,
}

impl SqliteRunner {
    /// Open an empty in-memory store; schemas are added with `attach`
    pub fn open_in_memory() -> Result<Self, QueryError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            store: Store::Shared(Mutex::new(conn)),
        })
    }

    /// Open the store described by a profile.
    ///
    /// `profile.database` names a directory; every `<NAME>_SCHEMA.db` file in
    /// it is schema `<NAME>_SCHEMA`. Each statement gets a fresh connection
    /// with only the schemas it names attached, so the number of systems is
    /// not bounded by SQLite's attach limit.
    pub fn open(profile: &ConnectionProfile) -> Result<Self, QueryError> {
        let dir = Path::new(&profile.database);
        if !dir.is_dir() {
            return Err(QueryError::Connection(format!(
                "SQLite store directory not found: {}",
                dir.display()
            )));
        }

        log::info!("Using SQLite store directory {}", dir.display());
        Ok(Self {
            store: Store::Directory(dir.to_path_buf()),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, QueryError> {
        match &self.store {
            Store::Shared(conn) => conn.lock().map_err(|_| {
                QueryError::Connection("SQLite connection lock poisoned".to_string())
            }),
            Store::Directory(dir) => Err(QueryError::Connection(format!(
                "SQLite store {} has no shared connection",
                dir.display()
            ))),
        }
    }

    /// Attach a database file as `schema`
    pub fn attach(&self, schema: &str, path: &Path) -> Result<(), QueryError> {
        let conn = self.lock()?;
        attach_file(&conn, schema, path)?;
        log::info!("Attached schema {}", schema);
        Ok(())
    }

    /// Attach a fresh in-memory database as `schema`
    pub fn attach_in_memory(&self, schema: &str) -> Result<(), QueryError> {
        let conn = self.lock()?;
        attach_source(&conn, schema, ":memory:")?;
        log::info!("Attached schema {}", schema);
        Ok(())
    }

    /// Run a batch of unparameterized SQL, used for schema setup
    pub fn execute_batch(&self, sql: &str) -> Result<(), QueryError> {
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        Ok(())
    }
}

impl QueryRunner for SqliteRunner {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn run(&self, statement: &Statement) -> Result<Vec<Row>, QueryError> {
        match &self.store {
            Store::Shared(_) => query(&*self.lock()?, statement),
            Store::Directory(dir) => {
                let conn = Connection::open_in_memory()?;
                for (schema, path) in schema_files(dir)? {
                    if names_schema(&statement.sql, &schema) {
                        attach_file(&conn, &schema, &path)?;
                    }
                }
                query(&conn, statement)
            }
        }
    }

    async fn list_schemas(&self) -> Result<Vec<String>, QueryError> {
        match &self.store {
            Store::Shared(_) => {
                let listing = Statement::new(Dialect::Sqlite.list_schemas());
                Ok(query(&*self.lock()?, &listing)?
                    .into_iter()
                    .filter_map(|row| row.into_iter().next())
                    .map(Value::into_text)
                    .collect())
            }
            Store::Directory(dir) => Ok(schema_files(dir)?
                .into_iter()
                .map(|(schema, _)| schema)
                .collect()),
        }
    }
}

fn query(conn: &Connection, statement: &Statement) -> Result<Vec<Row>, QueryError> {
    let mut stmt = conn.prepare(&statement.sql)?;
    let column_count = stmt.column_count();

    if column_count == 0 {
        stmt.execute(params_from_iter(statement.params.iter()))?;
        return Ok(Vec::new());
    }

    let rows = stmt
        .query_map(params_from_iter(statement.params.iter()), |row| {
            (0..column_count)
                .map(|i| row.get_ref(i).map(cell_value))
                .collect::<Result<Row, _>>()
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn attach_file(conn: &Connection, schema: &str, path: &Path) -> Result<(), QueryError> {
    let path = path
        .to_str()
        .ok_or_else(|| QueryError::Connection(format!("Invalid path: {}", path.display())))?;
    attach_source(conn, schema, path)
}

fn attach_source(conn: &Connection, schema: &str, source: &str) -> Result<(), QueryError> {
    conn.execute("ATTACH DATABASE ?1 AS ?2", params![source, schema])
        .map_err(|e| QueryError::Connection(format!("Failed to attach schema {}: {}", schema, e)))?;
    Ok(())
}

/// `<NAME>_SCHEMA.db` files in `dir` as (schema, path), sorted by file name
fn schema_files(dir: &Path) -> Result<Vec<(String, PathBuf)>, QueryError> {
    let mut paths = std::fs::read_dir(dir)
        .map_err(|e| QueryError::Connection(format!("{}: {}", dir.display(), e)))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "db"))
        .collect::<Vec<_>>();
    paths.sort();

    Ok(paths
        .into_iter()
        .filter_map(|path| {
            let schema = path.file_stem()?.to_str()?.to_string();
            if !schema.ends_with(SCHEMA_SUFFIX) {
                log::debug!("Skipping {} (not a system schema)", path.display());
                return None;
            }
            Some((schema, path))
        })
        .collect())
}

/// Whether `sql` mentions `schema` as a whole identifier, quoted or bare
fn names_schema(sql: &str, schema: &str) -> bool {
    let ident_char = |c: char| c.is_alphanumeric() || c == '_';
    sql.match_indices(schema).any(|(start, _)| {
        let before = sql[..start].chars().next_back();
        let after = sql[start + schema.len()..].chars().next();
        !before.is_some_and(ident_char) && !after.is_some_and(ident_char)
    })
}

fn cell_value(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) | ValueRef::Blob(t) => {
            Value::Text(String::from_utf8_lossy(t).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseType;
    use crate::metadata::MetadataCatalog;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_binds_parameters() {
        let runner = SqliteRunner::open_in_memory().unwrap();
        runner
            .execute_batch("CREATE TABLE notes (name TEXT, body TEXT);")
            .unwrap();

        let insert = Statement::new("INSERT INTO notes (name, body) VALUES (?1, ?2)")
            .bind("quote")
            .bind("it's \"fine\"; DROP TABLE notes; --");
        assert!(runner.run(&insert).await.unwrap().is_empty());

        let rows = runner
            .run(&Statement::new("SELECT body FROM notes WHERE name = ?1").bind("quote"))
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![vec![Value::Text("it's \"fine\"; DROP TABLE notes; --".to_string())]]
        );
    }

    #[tokio::test]
    async fn test_run_reports_missing_table() {
        let runner = SqliteRunner::open_in_memory().unwrap();
        let err = runner
            .run(&Statement::new("SELECT * FROM missing"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "execution");
        assert!(runner.run_or_empty(&Statement::new("SELECT * FROM missing")).await.is_empty());
    }

    #[tokio::test]
    async fn test_attached_schema_is_listed() {
        let runner = SqliteRunner::open_in_memory().unwrap();
        runner.attach_in_memory("ACME_SCHEMA").unwrap();

        let names = runner.list_schemas().await.unwrap();
        assert_eq!(names[0], "main");
        assert!(names.contains(&"ACME_SCHEMA".to_string()));
    }

    #[test]
    fn test_attach_limit_is_connection_error() {
        let runner = SqliteRunner::open_in_memory().unwrap();
        let results: Vec<_> = (0..12)
            .map(|i| runner.attach_in_memory(&format!("S{:02}_SCHEMA", i)))
            .collect();

        assert!(results[0].is_ok());
        assert!(results.iter().any(|r| matches!(
            r,
            Err(QueryError::Connection(msg)) if msg.starts_with("Failed to attach schema")
        )));
    }

    fn directory_profile(dir: &TempDir) -> ConnectionProfile {
        ConnectionProfile {
            db_type: DatabaseType::Sqlite,
            database: dir.path().to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_directory_store_reads_schema_files() {
        let dir = TempDir::new().unwrap();
        for file in ["ACME_SCHEMA.db", "scratch.db"] {
            Connection::open(dir.path().join(file))
                .unwrap()
                .execute_batch("CREATE TABLE t (x TEXT);")
                .unwrap();
        }
        let runner = SqliteRunner::open(&directory_profile(&dir)).unwrap();

        assert_eq!(runner.list_schemas().await.unwrap(), vec!["ACME_SCHEMA"]);

        runner
            .run(&Statement::new("INSERT INTO \"ACME_SCHEMA\".\"t\" (x) VALUES (?1)").bind("kept"))
            .await
            .unwrap();
        let rows = runner
            .run(&Statement::new("SELECT x FROM ACME_SCHEMA.t"))
            .await
            .unwrap();
        assert_eq!(rows, vec![vec![Value::from("kept")]]);

        let err = runner
            .run(&Statement::new("SELECT x FROM scratch.t"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "execution");
    }

    #[tokio::test]
    async fn test_directory_store_beyond_attach_limit() {
        let dir = TempDir::new().unwrap();
        for i in 0..12 {
            let system = format!("S{:02}", i);
            Connection::open(dir.path().join(format!("{}_SCHEMA.db", system)))
                .unwrap()
                .execute_batch(&format!(
                    "CREATE TABLE {s}_PROMPT_TABLE (NAME TEXT, TEXT TEXT);
                     INSERT INTO {s}_PROMPT_TABLE VALUES ('SQL_GENERATION_PROMPT', 'Prompt {s}');",
                    s = system
                ))
                .unwrap();
        }

        let runner = SqliteRunner::open(&directory_profile(&dir)).unwrap();
        let catalog = MetadataCatalog::load(&runner).await.unwrap();

        assert_eq!(catalog.len(), 12);
        assert_eq!(catalog.system_names()[11], "S11");
        assert_eq!(
            catalog.system("S11").unwrap().sql_generation_prompt(),
            "Prompt S11"
        );
    }

    #[test]
    fn test_names_schema_matches_whole_identifier() {
        assert!(names_schema("SELECT 1 FROM \"A_SCHEMA\".\"T\"", "A_SCHEMA"));
        assert!(names_schema("SELECT 1 FROM A_SCHEMA.T", "A_SCHEMA"));
        assert!(!names_schema("SELECT 1 FROM BA_SCHEMA.T", "A_SCHEMA"));
        assert!(!names_schema("SELECT 1 FROM A_SCHEMA_OLD.T", "A_SCHEMA"));
    }

    #[test]
    fn test_directory_store_has_no_shared_connection() {
        let dir = TempDir::new().unwrap();
        let runner = SqliteRunner::open(&directory_profile(&dir)).unwrap();
        assert!(matches!(
            runner.execute_batch("SELECT 1;"),
            Err(QueryError::Connection(_))
        ));
    }

    #[test]
    fn test_open_missing_directory() {
        let profile = ConnectionProfile {
            db_type: DatabaseType::Sqlite,
            database: "/nonexistent/schema-scribe".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            SqliteRunner::open(&profile),
            Err(QueryError::Connection(_))
        ));
    }
}
