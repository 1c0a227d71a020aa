// ABOUTME: Descriptive record for one column of a system's main table
// ABOUTME: Handles opt-in sampling of distinct values and description edits

use super::statements::{SystemTables, UNIQUE_VALUES_SEPARATOR};
use super::{MetadataError, WriteOutcome};
use crate::db::{QueryRunner, Row};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMetadata {
    system_name: String,
    column_name: String,
    datatype: String,
    unique_values: String,
    description: String,
}

impl ColumnMetadata {
    pub fn new(
        system_name: impl Into<String>,
        column_name: impl Into<String>,
        datatype: impl Into<String>,
        unique_values: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            system_name: system_name.into(),
            column_name: column_name.into(),
            datatype: datatype.into(),
            unique_values: unique_values.into(),
            description: description.into(),
        }
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn datatype(&self) -> &str {
        &self.datatype
    }

    pub fn unique_values(&self) -> &str {
        &self.unique_values
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether sampled values are currently held for this column
    pub fn unique_values_enabled(&self) -> bool {
        !self.unique_values.is_empty()
    }

    /// Sample up to 200 distinct values from the main table and persist them.
    ///
    /// Leaves the field empty and writes nothing when the sample is empty.
    /// If the sample succeeds but the write fails, the sampled values are
    /// kept in memory and the write error is returned.
    pub async fn load_unique_values<R: QueryRunner>(
        &mut self,
        runner: &R,
    ) -> Result<WriteOutcome, MetadataError> {
        let tables = SystemTables::new(runner.dialect(), &self.system_name);
        let rows = runner.run(&tables.sample_distinct(&self.column_name)?).await?;

        if rows.is_empty() {
            log::info!(
                "No values to sample for {}.{}",
                self.system_name,
                self.column_name
            );
            return Ok(WriteOutcome::Unchanged);
        }

        let sampled = rows.len();
        self.unique_values = format_unique_values(&rows);
        runner
            .run(&tables.update_unique_values(&self.column_name, &self.unique_values)?)
            .await?;

        log::info!(
            "Loaded {} unique values for {}.{}",
            sampled,
            self.system_name,
            self.column_name
        );
        Ok(WriteOutcome::Persisted)
    }

    /// Clear the stored sample. The in-memory field is cleared even if the write fails.
    pub async fn remove_unique_values<R: QueryRunner>(
        &mut self,
        runner: &R,
    ) -> Result<WriteOutcome, MetadataError> {
        let tables = SystemTables::new(runner.dialect(), &self.system_name);
        let statement = tables.update_unique_values(&self.column_name, "")?;
        let result = runner.run(&statement).await;
        self.unique_values.clear();
        result?;

        log::info!(
            "Removed unique values for {}.{}",
            self.system_name,
            self.column_name
        );
        Ok(WriteOutcome::Persisted)
    }

    /// Turn sampling on or off.
    ///
    /// Only enabling an empty column or disabling a populated one touches
    /// storage; every other combination is a no-op.
    pub async fn set_unique_values_enabled<R: QueryRunner>(
        &mut self,
        runner: &R,
        enabled: bool,
    ) -> Result<WriteOutcome, MetadataError> {
        match (enabled, self.unique_values_enabled()) {
            (true, false) => self.load_unique_values(runner).await,
            (false, true) => self.remove_unique_values(runner).await,
            _ => Ok(WriteOutcome::Unchanged),
        }
    }

    /// Replace the description. The in-memory value changes even if the write fails.
    pub async fn update_description<R: QueryRunner>(
        &mut self,
        runner: &R,
        new_value: &str,
    ) -> Result<WriteOutcome, MetadataError> {
        if new_value == self.description {
            return Ok(WriteOutcome::Unchanged);
        }

        let tables = SystemTables::new(runner.dialect(), &self.system_name);
        let statement = tables.update_description(&self.column_name, new_value)?;
        let result = runner.run(&statement).await;
        self.description = new_value.to_string();
        result?;

        log::info!(
            "Updated description for {}.{}",
            self.system_name,
            self.column_name
        );
        Ok(WriteOutcome::Persisted)
    }
}

fn format_unique_values(rows: &[Row]) -> String {
    rows.iter()
        .filter_map(|row| row.first())
        .map(|value| format!("{}{}", value, UNIQUE_VALUES_SEPARATOR))
        .collect()
}
