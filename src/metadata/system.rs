// ABOUTME: One configured system: its generation prompts and column descriptions
// ABOUTME: Loads best-effort from the system schema and writes prompt edits back

use super::column::ColumnMetadata;
use super::statements::SystemTables;
use super::{MetadataError, WriteOutcome};
use crate::db::{QueryRunner, Value};

/// Named rows of a system's prompt table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SqlGeneration,
    GraphGeneration,
}

impl PromptKind {
    pub const ALL: [PromptKind; 2] = [PromptKind::SqlGeneration, PromptKind::GraphGeneration];

    /// Value of the `NAME` column for this prompt
    pub fn row_name(self) -> &'static str {
        match self {
            PromptKind::SqlGeneration => "SQL_GENERATION_PROMPT",
            PromptKind::GraphGeneration => "GRAPH_GENERATION_PROMPT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemMetadata {
    system_name: String,
    sql_generation_prompt: String,
    graph_generation_prompt: String,
    column_descriptions: Vec<ColumnMetadata>,
}

impl SystemMetadata {
    /// Empty system with no prompts and no columns
    pub fn new(system_name: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            sql_generation_prompt: String::new(),
            graph_generation_prompt: String::new(),
            column_descriptions: Vec::new(),
        }
    }

    /// Load prompts and column descriptions.
    ///
    /// Failures are logged and leave the affected fields empty.
    pub async fn load<R: QueryRunner>(runner: &R, system_name: impl Into<String>) -> Self {
        let mut system = Self::new(system_name);
        log::info!("Loading system {}", system.system_name);
        system.reload(runner).await;
        system
    }

    /// Re-read everything from storage, discarding in-memory edits
    pub async fn reload<R: QueryRunner>(&mut self, runner: &R) {
        if let Err(e) = self.load_generation_prompts(runner).await {
            log::warn!("Failed to load prompts for {}: {}", self.system_name, e);
        }
        if let Err(e) = self.load_column_descriptions(runner).await {
            log::warn!(
                "Failed to load column descriptions for {}: {}",
                self.system_name,
                e
            );
        }
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    pub fn sql_generation_prompt(&self) -> &str {
        &self.sql_generation_prompt
    }

    pub fn graph_generation_prompt(&self) -> &str {
        &self.graph_generation_prompt
    }

    pub fn prompt(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::SqlGeneration => &self.sql_generation_prompt,
            PromptKind::GraphGeneration => &self.graph_generation_prompt,
        }
    }

    fn prompt_mut(&mut self, kind: PromptKind) -> &mut String {
        match kind {
            PromptKind::SqlGeneration => &mut self.sql_generation_prompt,
            PromptKind::GraphGeneration => &mut self.graph_generation_prompt,
        }
    }

    pub fn column_descriptions(&self) -> &[ColumnMetadata] {
        &self.column_descriptions
    }

    pub fn column(&self, column_name: &str) -> Option<&ColumnMetadata> {
        self.column_descriptions
            .iter()
            .find(|c| c.column_name() == column_name)
    }

    pub fn column_mut(&mut self, column_name: &str) -> Option<&mut ColumnMetadata> {
        self.column_descriptions
            .iter_mut()
            .find(|c| c.column_name() == column_name)
    }

    pub async fn update_sql_generation_prompt<R: QueryRunner>(
        &mut self,
        runner: &R,
        new_value: &str,
    ) -> Result<WriteOutcome, MetadataError> {
        self.update_prompt(runner, PromptKind::SqlGeneration, new_value)
            .await
    }

    pub async fn update_graph_generation_prompt<R: QueryRunner>(
        &mut self,
        runner: &R,
        new_value: &str,
    ) -> Result<WriteOutcome, MetadataError> {
        self.update_prompt(runner, PromptKind::GraphGeneration, new_value)
            .await
    }

    /// Set a prompt in memory, then write it.
    ///
    /// A failed write leaves memory ahead of storage until the next reload.
    pub async fn update_prompt<R: QueryRunner>(
        &mut self,
        runner: &R,
        kind: PromptKind,
        new_value: &str,
    ) -> Result<WriteOutcome, MetadataError> {
        if self.prompt(kind) == new_value {
            return Ok(WriteOutcome::Unchanged);
        }

        *self.prompt_mut(kind) = new_value.to_string();

        let tables = SystemTables::new(runner.dialect(), &self.system_name);
        runner
            .run(&tables.update_prompt(kind.row_name(), new_value)?)
            .await?;

        log::info!("Updated {} for {}", kind.row_name(), self.system_name);
        Ok(WriteOutcome::Persisted)
    }

    /// Replace the column list with the rows of the description table, in query order.
    ///
    /// On failure the list is left empty.
    pub async fn load_column_descriptions<R: QueryRunner>(
        &mut self,
        runner: &R,
    ) -> Result<usize, MetadataError> {
        self.column_descriptions.clear();

        let tables = SystemTables::new(runner.dialect(), &self.system_name);
        let rows = runner.run(&tables.select_column_descriptions()?).await?;

        for row in rows {
            let mut cells = row.into_iter().map(Value::into_text);
            let (Some(column_name), Some(datatype), Some(unique_values), Some(description)) =
                (cells.next(), cells.next(), cells.next(), cells.next())
            else {
                log::warn!("Skipping malformed description row in {}", self.system_name);
                continue;
            };
            self.column_descriptions.push(ColumnMetadata::new(
                self.system_name.clone(),
                column_name,
                datatype,
                unique_values,
                description,
            ));
        }

        log::info!(
            "Loaded {} column descriptions for {}",
            self.column_descriptions.len(),
            self.system_name
        );
        Ok(self.column_descriptions.len())
    }

    /// Look up both prompts independently; a missing row reads as an empty prompt.
    ///
    /// A failed lookup is logged with its error kind and also reads as empty, so
    /// both lookups always run. Only a statement that cannot be built is an error.
    pub async fn load_generation_prompts<R: QueryRunner>(
        &mut self,
        runner: &R,
    ) -> Result<(), MetadataError> {
        let tables = SystemTables::new(runner.dialect(), &self.system_name);

        for kind in PromptKind::ALL {
            let rows = runner
                .run_or_empty(&tables.select_prompt(kind.row_name())?)
                .await;
            *self.prompt_mut(kind) = rows
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .map(Value::into_text)
                .unwrap_or_default();
        }

        Ok(())
    }
}
