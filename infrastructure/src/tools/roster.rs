//! Colleague roster tool

use agentry_application::ports::directory::DirectoryPort;
use agentry_application::ports::tool_handler::ToolHandler;
use agentry_domain::{ExecutionContext, ToolDefinition, ToolError, empty_object_schema};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// `list_colleagues` — the other agents of the caller's organization, with
/// their team membership. The caller itself is not listed.
pub struct ListColleaguesTool {
    directory: Arc<dyn DirectoryPort>,
}

impl ListColleaguesTool {
    pub fn new(directory: Arc<dyn DirectoryPort>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl ToolHandler for ListColleaguesTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "list_colleagues",
            "List the other agents in your organization and the team each belongs to.",
        )
        .with_schema(empty_object_schema())
    }

    async fn call(
        &self,
        ctx: &ExecutionContext,
        _arguments: &HashMap<String, Value>,
    ) -> Result<Value, ToolError> {
        let agents = self
            .directory
            .list_agents(&ctx.organization_id)
            .await
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;

        let mut lines = Vec::new();
        let mut roster = Vec::new();
        for agent in agents {
            if agent.id == ctx.agent_id {
                continue;
            }
            let team = match &agent.team_id {
                Some(team_id) => {
                    let team = self
                        .directory
                        .get_team(team_id)
                        .await
                        .map_err(|e| ToolError::execution_failed(e.to_string()))?;
                    Some(team.name)
                }
                None => None,
            };
            lines.push(match &team {
                Some(team_name) => format!("{} ({}) — team {}", agent.name, agent.id, team_name),
                None => format!("{} ({}) — no team", agent.name, agent.id),
            });
            roster.push(json!({
                "agent_id": agent.id,
                "name": agent.name,
                "team": team,
            }));
        }

        let content = if lines.is_empty() {
            "You have no colleagues in your organization.".to_string()
        } else {
            lines.join("\n")
        };
        Ok(json!({ "content": content, "colleagues": roster }))
    }
}
