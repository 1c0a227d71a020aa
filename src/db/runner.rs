// ABOUTME: Query execution boundary shared by every storage backend
// ABOUTME: Defines statements, row values, dialect rules and the QueryRunner trait

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Query failed: {0}")]
    Execution(String),
    #[error("Invalid statement: {0}")]
    InvalidStatement(String),
}

impl QueryError {
    /// Short label used when logging which kind of failure occurred
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Connection(_) => "connection",
            QueryError::Execution(_) => "execution",
            QueryError::InvalidStatement(_) => "invalid_statement",
        }
    }
}

/// A single cell returned by a backend
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Text content of the cell, with NULL read as an empty string
    pub fn into_text(self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

pub type Row = Vec<Value>;

/// SQL text plus positional parameters bound at execution time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<String>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    pub fn bind(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }
}

/// SQL flavour spoken by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    SqlServer,
    Sqlite,
}

impl Dialect {
    /// Placeholder for the 1-based parameter `index`
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::SqlServer => format!("@P{}", index),
            Dialect::Sqlite => format!("?{}", index),
        }
    }

    /// Quote an identifier, doubling any embedded closing quote
    pub fn quote_ident(self, ident: &str) -> Result<String, QueryError> {
        if ident.is_empty() {
            return Err(QueryError::InvalidStatement(
                "Identifier must not be empty".to_string(),
            ));
        }
        Ok(match self {
            Dialect::SqlServer => format!("[{}]", ident.replace(']', "]]")),
            Dialect::Sqlite => format!("\"{}\"", ident.replace('"', "\"\"")),
        })
    }

    /// `schema.table` with both parts quoted
    pub fn qualified(self, schema: &str, table: &str) -> Result<String, QueryError> {
        Ok(format!(
            "{}.{}",
            self.quote_ident(schema)?,
            self.quote_ident(table)?
        ))
    }

    /// Select at most `limit` distinct values of `column` from `table`
    pub fn select_distinct(self, column: &str, table: &str, limit: usize) -> String {
        match self {
            Dialect::SqlServer => format!("SELECT DISTINCT TOP {} {} FROM {}", limit, column, table),
            Dialect::Sqlite => format!("SELECT DISTINCT {} FROM {} LIMIT {}", column, table, limit),
        }
    }

    /// Query returning one schema name per row
    pub fn list_schemas(self) -> &'static str {
        match self {
            Dialect::SqlServer => {
                "SELECT SCHEMA_NAME FROM INFORMATION_SCHEMA.SCHEMATA \
                 WHERE SCHEMA_NAME NOT IN ('INFORMATION_SCHEMA', 'PUBLIC')"
            }
            Dialect::Sqlite => "SELECT name FROM pragma_database_list ORDER BY seq",
        }
    }
}

/// Executes one statement against the configured store.
///
/// Callers await each call before issuing the next one; implementations need
/// not support concurrent use from multiple tasks.
#[allow(async_fn_in_trait)]
pub trait QueryRunner {
    fn dialect(&self) -> Dialect;

    async fn run(&self, statement: &Statement) -> Result<Vec<Row>, QueryError>;

    /// Schema names in the order the store lists them
    async fn list_schemas(&self) -> Result<Vec<String>, QueryError> {
        let rows = self
            .run(&Statement::new(self.dialect().list_schemas()))
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .map(Value::into_text)
            .collect())
    }

    /// Run and collapse any failure into an empty result, logging the error kind
    async fn run_or_empty(&self, statement: &Statement) -> Vec<Row> {
        match self.run(statement).await {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!("Query failed ({}): {}", e.kind(), e);
                Vec::new()
            }
        }
    }
}
