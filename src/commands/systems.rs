// ABOUTME: System-level commands for the presentation layer
// ABOUTME: Lists systems, shows one system and edits its generation prompts

use crate::db::QueryRunner;
use crate::metadata::PromptKind;
use crate::models::{SystemDetails, SystemSummary};
use crate::session::Session;
use crate::ApiResponse;

/// Get every discovered system
pub async fn list_systems<R: QueryRunner>(session: &Session<R>) -> ApiResponse<Vec<SystemSummary>> {
    let summaries = session
        .catalog()
        .systems()
        .iter()
        .map(SystemSummary::from)
        .collect();
    ApiResponse::success(summaries)
}

/// Get one system with its prompts and columns
pub async fn get_system<R: QueryRunner>(
    session: &Session<R>,
    system_name: &str,
) -> ApiResponse<SystemDetails> {
    match session.catalog().system(system_name) {
        Ok(system) => ApiResponse::success(SystemDetails::from(system)),
        Err(e) => ApiResponse::error(format!("Failed to get system: {}", e)),
    }
}

/// Update the SQL generation prompt of a system
pub async fn update_sql_generation_prompt<R: QueryRunner>(
    session: &mut Session<R>,
    system_name: &str,
    value: String,
) -> ApiResponse<SystemDetails> {
    update_prompt(session, system_name, PromptKind::SqlGeneration, value).await
}

/// Update the graph generation prompt of a system
pub async fn update_graph_generation_prompt<R: QueryRunner>(
    session: &mut Session<R>,
    system_name: &str,
    value: String,
) -> ApiResponse<SystemDetails> {
    update_prompt(session, system_name, PromptKind::GraphGeneration, value).await
}

async fn update_prompt<R: QueryRunner>(
    session: &mut Session<R>,
    system_name: &str,
    kind: PromptKind,
    value: String,
) -> ApiResponse<SystemDetails> {
    let (runner, system) = match session.system_mut(system_name) {
        Ok(parts) => parts,
        Err(e) => return ApiResponse::error(format!("Failed to get system: {}", e)),
    };

    match system.update_prompt(runner, kind, &value).await {
        Ok(_) => ApiResponse::success(SystemDetails::from(&*system)),
        Err(e) => ApiResponse::error(format!("Failed to update {}: {}", kind.row_name(), e)),
    }
}

/// Re-read a system from storage, discarding unsaved in-memory state
pub async fn reload_system<R: QueryRunner>(
    session: &mut Session<R>,
    system_name: &str,
) -> ApiResponse<SystemDetails> {
    match session.reload_system(system_name).await {
        Ok(system) => ApiResponse::success(SystemDetails::from(system)),
        Err(e) => ApiResponse::error(format!("Failed to reload system: {}", e)),
    }
}
