// ABOUTME: Column-level commands for the presentation layer
// ABOUTME: Toggles value sampling and edits column descriptions

use crate::db::QueryRunner;
use crate::metadata::{ColumnMetadata, MetadataError, SystemMetadata};
use crate::models::ColumnDetails;
use crate::session::Session;
use crate::ApiResponse;

fn find_column<'a>(
    system: &'a mut SystemMetadata,
    column_name: &str,
) -> Result<&'a mut ColumnMetadata, MetadataError> {
    let system_name = system.system_name().to_string();
    system
        .column_mut(column_name)
        .ok_or_else(|| MetadataError::ColumnNotFound {
            system: system_name,
            column: column_name.to_string(),
        })
}

/// Get the documented columns of a system, in storage order
pub async fn get_columns<R: QueryRunner>(
    session: &Session<R>,
    system_name: &str,
) -> ApiResponse<Vec<ColumnDetails>> {
    match session.catalog().system(system_name) {
        Ok(system) => ApiResponse::success(
            system
                .column_descriptions()
                .iter()
                .map(ColumnDetails::from)
                .collect(),
        ),
        Err(e) => ApiResponse::error(format!("Failed to get columns: {}", e)),
    }
}

/// Include or drop the sampled unique values of a column
pub async fn set_unique_values_enabled<R: QueryRunner>(
    session: &mut Session<R>,
    system_name: &str,
    column_name: &str,
    enabled: bool,
) -> ApiResponse<ColumnDetails> {
    let (runner, system) = match session.system_mut(system_name) {
        Ok(parts) => parts,
        Err(e) => return ApiResponse::error(format!("Failed to get system: {}", e)),
    };
    let column = match find_column(system, column_name) {
        Ok(c) => c,
        Err(e) => return ApiResponse::error(format!("Failed to get column: {}", e)),
    };

    match column.set_unique_values_enabled(runner, enabled).await {
        Ok(_) => ApiResponse::success(ColumnDetails::from(&*column)),
        Err(e) => ApiResponse::error(format!("Failed to update unique values: {}", e)),
    }
}

/// Update the free-text description of a column
pub async fn update_column_description<R: QueryRunner>(
    session: &mut Session<R>,
    system_name: &str,
    column_name: &str,
    value: String,
) -> ApiResponse<ColumnDetails> {
    let (runner, system) = match session.system_mut(system_name) {
        Ok(parts) => parts,
        Err(e) => return ApiResponse::error(format!("Failed to get system: {}", e)),
    };
    let column = match find_column(system, column_name) {
        Ok(c) => c,
        Err(e) => return ApiResponse::error(format!("Failed to get column: {}", e)),
    };

    match column.update_description(runner, &value).await {
        Ok(_) => ApiResponse::success(ColumnDetails::from(&*column)),
        Err(e) => ApiResponse::error(format!("Failed to update description: {}", e)),
    }
}
