//! Directory port
//!
//! Repository seam for organization/team/agent records. Records are loaded
//! by id at the start of a task and treated as read-only snapshots for the
//! task's duration.

use agentry_domain::{Agent, Organization, Team};
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by directory lookups.
#[derive(Error, Debug, Clone)]
pub enum DirectoryError {
    #[error("organization '{0}' not found")]
    OrganizationNotFound(String),

    #[error("agent '{0}' not found")]
    AgentNotFound(String),

    #[error("team '{0}' not found")]
    TeamNotFound(String),

    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Port for loading organization, team, and agent records.
#[async_trait]
pub trait DirectoryPort: Send + Sync {
    async fn get_organization(&self, id: &str) -> Result<Organization, DirectoryError>;

    async fn get_agent(&self, id: &str) -> Result<Agent, DirectoryError>;

    async fn get_team(&self, id: &str) -> Result<Team, DirectoryError>;

    /// All agents belonging to an organization.
    async fn list_agents(&self, organization_id: &str) -> Result<Vec<Agent>, DirectoryError>;

    /// All teams belonging to an organization.
    async fn list_teams(&self, organization_id: &str) -> Result<Vec<Team>, DirectoryError>;
}
