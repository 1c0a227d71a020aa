// ABOUTME: Table naming convention and statement builders for system schemas
// ABOUTME: Identifiers are quoted per dialect; every value is a bound parameter

use crate::db::{Dialect, QueryError, Statement};

pub const SCHEMA_SUFFIX: &str = "_SCHEMA";
pub const MAIN_TABLE_SUFFIX: &str = "_MAIN_TABLE";
pub const DESCRIPTION_TABLE_SUFFIX: &str = "_MAIN_TABLE_DESCRIPTION";
pub const PROMPT_TABLE_SUFFIX: &str = "_PROMPT_TABLE";

/// Schemas never treated as systems, even when the backend lists them
pub const EXCLUDED_SCHEMAS: [&str; 2] = ["INFORMATION_SCHEMA", "PUBLIC"];

/// Maximum number of distinct values sampled per column
pub const UNIQUE_VALUES_LIMIT: usize = 200;

/// Separator written after every sampled value
pub const UNIQUE_VALUES_SEPARATOR: &str = ",\n";

/// System name for a schema, or `None` if the schema is not a system
pub fn system_name_from_schema(schema: &str) -> Option<&str> {
    if EXCLUDED_SCHEMAS
        .iter()
        .any(|excluded| excluded.eq_ignore_ascii_case(schema))
    {
        return None;
    }
    schema
        .strip_suffix(SCHEMA_SUFFIX)
        .filter(|name| !name.is_empty())
}

/// Fully qualified table names for one system under a dialect
pub struct SystemTables {
    dialect: Dialect,
    system: String,
}

impl SystemTables {
    pub fn new(dialect: Dialect, system: &str) -> Self {
        Self {
            dialect,
            system: system.to_string(),
        }
    }

    pub fn schema(&self) -> String {
        format!("{}{}", self.system, SCHEMA_SUFFIX)
    }

    fn table(&self, suffix: &str) -> Result<String, QueryError> {
        self.dialect
            .qualified(&self.schema(), &format!("{}{}", self.system, suffix))
    }

    pub fn main_table(&self) -> Result<String, QueryError> {
        self.table(MAIN_TABLE_SUFFIX)
    }

    pub fn description_table(&self) -> Result<String, QueryError> {
        self.table(DESCRIPTION_TABLE_SUFFIX)
    }

    pub fn prompt_table(&self) -> Result<String, QueryError> {
        self.table(PROMPT_TABLE_SUFFIX)
    }

    pub fn sample_distinct(&self, column: &str) -> Result<Statement, QueryError> {
        let column = self.dialect.quote_ident(column)?;
        Ok(Statement::new(self.dialect.select_distinct(
            &column,
            &self.main_table()?,
            UNIQUE_VALUES_LIMIT,
        )))
    }

    /// `UPDATE <description table> SET <field> = ? WHERE COLUMN_NAME = ?`
    fn update_description_field(
        &self,
        field: &str,
        column: &str,
        value: &str,
    ) -> Result<Statement, QueryError> {
        let sql = format!(
            "UPDATE {} SET {} = {} WHERE COLUMN_NAME = {}",
            self.description_table()?,
            field,
            self.dialect.placeholder(1),
            self.dialect.placeholder(2)
        );
        Ok(Statement::new(sql).bind(value).bind(column))
    }

    pub fn update_unique_values(&self, column: &str, value: &str) -> Result<Statement, QueryError> {
        self.update_description_field("UNIQUE_VALUES", column, value)
    }

    pub fn update_description(&self, column: &str, value: &str) -> Result<Statement, QueryError> {
        self.update_description_field("DESCRIPTION", column, value)
    }

    pub fn select_column_descriptions(&self) -> Result<Statement, QueryError> {
        Ok(Statement::new(format!(
            "SELECT COLUMN_NAME, DATA_TYPE, UNIQUE_VALUES, DESCRIPTION FROM {}",
            self.description_table()?
        )))
    }

    pub fn select_prompt(&self, prompt_name: &str) -> Result<Statement, QueryError> {
        let sql = format!(
            "SELECT TEXT FROM {} WHERE NAME = {}",
            self.prompt_table()?,
            self.dialect.placeholder(1)
        );
        Ok(Statement::new(sql).bind(prompt_name))
    }

    pub fn update_prompt(&self, prompt_name: &str, text: &str) -> Result<Statement, QueryError> {
        let sql = format!(
            "UPDATE {} SET TEXT = {} WHERE NAME = {}",
            self.prompt_table()?,
            self.dialect.placeholder(1),
            self.dialect.placeholder(2)
        );
        Ok(Statement::new(sql).bind(text).bind(prompt_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_name_from_schema() {
        assert_eq!(system_name_from_schema("ACME_SCHEMA"), Some("ACME"));
        assert_eq!(system_name_from_schema("INFORMATION_SCHEMA"), None);
        assert_eq!(system_name_from_schema("information_schema"), None);
        assert_eq!(system_name_from_schema("PUBLIC"), None);
        assert_eq!(system_name_from_schema("dbo"), None);
        assert_eq!(system_name_from_schema("_SCHEMA"), None);
        // Only the trailing suffix is stripped
        assert_eq!(system_name_from_schema("A_SCHEMA_B_SCHEMA"), Some("A_SCHEMA_B"));
    }

    #[test]
    fn test_table_names() {
        let tables = SystemTables::new(Dialect::SqlServer, "ACME");
        assert_eq!(tables.schema(), "ACME_SCHEMA");
        assert_eq!(tables.main_table().unwrap(), "[ACME_SCHEMA].[ACME_MAIN_TABLE]");
        assert_eq!(
            tables.description_table().unwrap(),
            "[ACME_SCHEMA].[ACME_MAIN_TABLE_DESCRIPTION]"
        );
        assert_eq!(tables.prompt_table().unwrap(), "[ACME_SCHEMA].[ACME_PROMPT_TABLE]");
    }

    #[test]
    fn test_update_prompt_binds_values() {
        let tables = SystemTables::new(Dialect::SqlServer, "ACME");
        let stmt = tables
            .update_prompt("SQL_GENERATION_PROMPT", "it's quoted")
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE [ACME_SCHEMA].[ACME_PROMPT_TABLE] SET TEXT = @P1 WHERE NAME = @P2"
        );
        assert_eq!(stmt.params, vec!["it's quoted", "SQL_GENERATION_PROMPT"]);
    }

    #[test]
    fn test_sample_distinct_quotes_column() {
        let tables = SystemTables::new(Dialect::Sqlite, "ACME");
        let stmt = tables.sample_distinct("REGION\"; DROP TABLE x; --").unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT DISTINCT \"REGION\"\"; DROP TABLE x; --\" FROM \"ACME_SCHEMA\".\"ACME_MAIN_TABLE\" LIMIT 200"
        );
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_update_description_statement() {
        let tables = SystemTables::new(Dialect::Sqlite, "ACME");
        let stmt = tables.update_description("REGION", "Sales region").unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE \"ACME_SCHEMA\".\"ACME_MAIN_TABLE_DESCRIPTION\" SET DESCRIPTION = ?1 WHERE COLUMN_NAME = ?2"
        );
        assert_eq!(stmt.params, vec!["Sales region", "REGION"]);
    }
}
