//! In-memory directory adapter
//!
//! Organization, team, and agent records are held in id-indexed arenas and
//! loaded once from a TOML directory file at startup. The directory port
//! hands out clones, so records behave as point-in-time snapshots for the
//! duration of a task.

use agentry_application::ports::directory::{DirectoryError, DirectoryPort};
use agentry_domain::{Agent, Organization, Team};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Raw structure of a TOML directory file.
///
/// ```toml
/// [[organizations]]
/// id = "org-1"
/// name = "Acme"
///
/// [[organizations.tools]]
/// name = "read_file"
/// description = "Read a file from a workspace folder"
///
/// [[teams]]
/// id = "team-1"
/// organization_id = "org-1"
/// name = "Research"
/// tool_blacklist = ["delete_file"]
///
/// [[agents]]
/// id = "agent-1"
/// organization_id = "org-1"
/// team_id = "team-1"
/// name = "Ada"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DirectoryFile {
    pub organizations: Vec<Organization>,
    pub teams: Vec<Team>,
    pub agents: Vec<Agent>,
}

#[derive(Error, Debug)]
pub enum DirectoryLoadError {
    #[error("cannot read directory file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot parse directory file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("agent '{agent_id}' references unknown team '{team_id}'")]
    DanglingTeam { agent_id: String, team_id: String },

    #[error("{kind} '{id}' references unknown organization '{organization_id}'")]
    DanglingOrganization {
        kind: &'static str,
        id: String,
        organization_id: String,
    },
}

/// Arena-backed directory of organizations, teams, and agents.
#[derive(Default)]
pub struct InMemoryDirectory {
    organizations: HashMap<String, Organization>,
    teams: HashMap<String, Team>,
    agents: HashMap<String, Agent>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_organization(mut self, org: Organization) -> Self {
        self.organizations.insert(org.id.clone(), org);
        self
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.insert(team.id.clone(), team);
        self
    }

    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.insert(agent.id.clone(), agent);
        self
    }

    /// Build a directory from a parsed file, validating cross-references.
    pub fn from_file(file: DirectoryFile) -> Result<Self, DirectoryLoadError> {
        let mut directory = Self::new();
        for org in file.organizations {
            directory.organizations.insert(org.id.clone(), org);
        }
        for team in file.teams {
            if !directory.organizations.contains_key(&team.organization_id) {
                return Err(DirectoryLoadError::DanglingOrganization {
                    kind: "team",
                    id: team.id,
                    organization_id: team.organization_id,
                });
            }
            directory.teams.insert(team.id.clone(), team);
        }
        for agent in file.agents {
            if !directory.organizations.contains_key(&agent.organization_id) {
                return Err(DirectoryLoadError::DanglingOrganization {
                    kind: "agent",
                    id: agent.id,
                    organization_id: agent.organization_id,
                });
            }
            if let Some(team_id) = &agent.team_id {
                if !directory.teams.contains_key(team_id) {
                    return Err(DirectoryLoadError::DanglingTeam {
                        agent_id: agent.id,
                        team_id: team_id.clone(),
                    });
                }
            }
            directory.agents.insert(agent.id.clone(), agent);
        }
        Ok(directory)
    }

    /// Load and validate a TOML directory file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryLoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DirectoryLoadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file: DirectoryFile =
            toml::from_str(&raw).map_err(|source| DirectoryLoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        let directory = Self::from_file(file)?;
        info!(
            path = %path.display(),
            organizations = directory.organizations.len(),
            teams = directory.teams.len(),
            agents = directory.agents.len(),
            "directory loaded"
        );
        Ok(directory)
    }
}

#[async_trait]
impl DirectoryPort for InMemoryDirectory {
    async fn get_organization(&self, id: &str) -> Result<Organization, DirectoryError> {
        self.organizations
            .get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::OrganizationNotFound(id.to_string()))
    }

    async fn get_agent(&self, id: &str) -> Result<Agent, DirectoryError> {
        self.agents
            .get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::AgentNotFound(id.to_string()))
    }

    async fn get_team(&self, id: &str) -> Result<Team, DirectoryError> {
        self.teams
            .get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::TeamNotFound(id.to_string()))
    }

    async fn list_agents(&self, organization_id: &str) -> Result<Vec<Agent>, DirectoryError> {
        let mut agents: Vec<Agent> = self
            .agents
            .values()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect();
        agents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(agents)
    }

    async fn list_teams(&self, organization_id: &str) -> Result<Vec<Team>, DirectoryError> {
        let mut teams: Vec<Team> = self
            .teams
            .values()
            .filter(|t| t.organization_id == organization_id)
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(teams)
    }
}
