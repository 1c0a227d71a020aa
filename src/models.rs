// ABOUTME: Serializable views of the metadata model for the presentation layer
// ABOUTME: Field names use camelCase to match the frontend's expectations

use serde::{Deserialize, Serialize};

use crate::metadata::{ColumnMetadata, SystemMetadata};

/// Entry in the system picker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemSummary {
    #[serde(rename = "systemName")]
    pub system_name: String,
    #[serde(rename = "columnCount")]
    pub column_count: usize,
}

/// A system with its prompts and every documented column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemDetails {
    #[serde(rename = "systemName")]
    pub system_name: String,
    #[serde(rename = "sqlGenerationPrompt")]
    pub sql_generation_prompt: String,
    #[serde(rename = "graphGenerationPrompt")]
    pub graph_generation_prompt: String,
    pub columns: Vec<ColumnDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDetails {
    #[serde(rename = "columnName")]
    pub column_name: String,
    pub datatype: String,
    #[serde(rename = "uniqueValues")]
    pub unique_values: String,
    #[serde(rename = "uniqueValuesEnabled")]
    pub unique_values_enabled: bool,
    pub description: String,
}

impl From<&SystemMetadata> for SystemSummary {
    fn from(system: &SystemMetadata) -> Self {
        Self {
            system_name: system.system_name().to_string(),
            column_count: system.column_descriptions().len(),
        }
    }
}

impl From<&SystemMetadata> for SystemDetails {
    fn from(system: &SystemMetadata) -> Self {
        Self {
            system_name: system.system_name().to_string(),
            sql_generation_prompt: system.sql_generation_prompt().to_string(),
            graph_generation_prompt: system.graph_generation_prompt().to_string(),
            columns: system
                .column_descriptions()
                .iter()
                .map(ColumnDetails::from)
                .collect(),
        }
    }
}

impl From<&ColumnMetadata> for ColumnDetails {
    fn from(column: &ColumnMetadata) -> Self {
        Self {
            column_name: column.column_name().to_string(),
            datatype: column.datatype().to_string(),
            unique_values: column.unique_values().to_string(),
            unique_values_enabled: column.unique_values_enabled(),
            description: column.description().to_string(),
        }
    }
}
