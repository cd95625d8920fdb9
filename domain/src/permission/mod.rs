//! Permission resolution — the three-level access-control intersection
//!
//! Pure domain logic computing which tools an agent may invoke:
//!
//! ```text
//! effective = org.tools − team.tool_blacklist − agent.tool_blacklist
//! ```
//!
//! Resolution order is always: existence in the organization catalog, then
//! the team blacklist, then the agent blacklist. These are intersection
//! semantics — an agent-level entry can never re-enable a team-blocked
//! tool. Denial errors distinguish the blocking level because the model
//! receiving them needs actionable context to pick an alternative strategy.

use crate::directory::entities::{Agent, Organization, Team};
use crate::tool::entities::ToolDefinition;
use thiserror::Error;

/// A denied tool access, naming the level that blocked it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("tool '{tool}' is not part of your organization's toolset")]
    NotInCatalog { tool: String },

    #[error("tool '{tool}' is restricted for your team")]
    TeamRestricted { tool: String },

    #[error("tool '{tool}' is restricted for your role")]
    RoleRestricted { tool: String },

    #[error("tool '{tool}' is restricted for your role and team")]
    RoleAndTeamRestricted { tool: String },
}

impl PermissionError {
    /// The tool name the denial refers to.
    pub fn tool(&self) -> &str {
        match self {
            PermissionError::NotInCatalog { tool }
            | PermissionError::TeamRestricted { tool }
            | PermissionError::RoleRestricted { tool }
            | PermissionError::RoleAndTeamRestricted { tool } => tool,
        }
    }
}

/// Compute the agent's effective tool set.
///
/// Starts from the organization catalog (empty if the organization defines
/// none) and removes every tool named by the union of the team and agent
/// blacklists. Blacklist entries naming tools absent from the catalog are
/// silently ignored — they have no effect.
pub fn available_tools<'a>(
    org: &'a Organization,
    agent: &Agent,
    team: Option<&Team>,
) -> Vec<&'a ToolDefinition> {
    org.tools
        .iter()
        .filter(|tool| {
            let team_blocked = team.is_some_and(|t| t.tool_blacklist.contains(&tool.name));
            !team_blocked && !agent.tool_blacklist.contains(&tool.name)
        })
        .collect()
}

/// Membership test against [`available_tools`].
pub fn has_access(tool_name: &str, org: &Organization, agent: &Agent, team: Option<&Team>) -> bool {
    available_tools(org, agent, team)
        .iter()
        .any(|tool| tool.name == tool_name)
}

/// Assert that the agent may invoke `tool_name`, or explain which level
/// blocked it.
pub fn assert_access(
    tool_name: &str,
    org: &Organization,
    agent: &Agent,
    team: Option<&Team>,
) -> Result<(), PermissionError> {
    if org.catalog_tool(tool_name).is_none() {
        return Err(PermissionError::NotInCatalog {
            tool: tool_name.to_string(),
        });
    }

    let team_blocked = team.is_some_and(|t| t.tool_blacklist.contains(tool_name));
    let agent_blocked = agent.tool_blacklist.contains(tool_name);

    match (team_blocked, agent_blocked) {
        (true, true) => Err(PermissionError::RoleAndTeamRestricted {
            tool: tool_name.to_string(),
        }),
        (true, false) => Err(PermissionError::TeamRestricted {
            tool: tool_name.to_string(),
        }),
        (false, true) => Err(PermissionError::RoleRestricted {
            tool: tool_name.to_string(),
        }),
        (false, false) => Ok(()),
    }
}
