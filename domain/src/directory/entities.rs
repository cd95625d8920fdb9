//! Organization, team, and agent entities

use crate::tool::entities::ToolDefinition;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An organization owning the base tool catalog.
///
/// The catalog is the whitelist ceiling: a tool not listed here is invisible
/// to every team and agent of the organization, regardless of blacklists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    /// Base tool catalog available to the organization's agents
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
}

impl Organization {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolDefinition>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Look up a catalog entry by name.
    pub fn catalog_tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name == name)
    }
}

/// A team within an organization.
///
/// The blacklist subtracts tools from the organization catalog for every
/// team member. Entries naming tools absent from the catalog are harmless.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    #[serde(default)]
    pub tool_blacklist: HashSet<String>,
}

impl Team {
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            name: name.into(),
            tool_blacklist: HashSet::new(),
        }
    }

    pub fn with_blacklisted(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_blacklist.insert(tool_name.into());
        self
    }
}

/// An autonomous agent belonging to an organization, optionally to a team.
///
/// The agent-level blacklist subtracts further tools on top of the team
/// result; it can never re-enable a team-blocked tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub organization_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub tool_blacklist: HashSet<String>,
}

impl Agent {
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            team_id: None,
            name: name.into(),
            tool_blacklist: HashSet::new(),
        }
    }

    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }

    pub fn with_blacklisted(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_blacklist.insert(tool_name.into());
        self
    }

    /// Whether the agent belongs to the given team.
    pub fn is_member_of(&self, team_id: &str) -> bool {
        self.team_id.as_deref() == Some(team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organization_catalog_lookup() {
        let org = Organization::new("org-1", "Acme")
            .with_tool(ToolDefinition::new("read_file", "Read a file"))
            .with_tool(ToolDefinition::new("write_file", "Write a file"));

        assert!(org.catalog_tool("read_file").is_some());
        assert!(org.catalog_tool("delete_file").is_none());
    }

    #[test]
    fn test_team_blacklist_builder() {
        let team = Team::new("team-1", "org-1", "Research").with_blacklisted("delete_file");
        assert!(team.tool_blacklist.contains("delete_file"));
    }

    #[test]
    fn test_agent_membership() {
        let agent = Agent::new("agent-1", "org-1", "Ada").with_team("team-1");
        assert!(agent.is_member_of("team-1"));
        assert!(!agent.is_member_of("team-2"));

        let loner = Agent::new("agent-2", "org-1", "Blaise");
        assert!(!loner.is_member_of("team-1"));
    }
}
