//! Folder scopes and the scope permission matrix

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five named visibility classes an agent can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderScope {
    /// The requesting agent's own private workspace
    MyPrivate,
    /// The requesting agent's own shared workspace
    MyShared,
    /// The agent's team private workspace (requires membership)
    TeamPrivate,
    /// The agent's team shared workspace (requires membership)
    TeamShared,
    /// Discovery aggregation: every other team's and teammate's shared
    /// workspace, excluding the requester's own shared workspace
    OrgShared,
}

impl FolderScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderScope::MyPrivate => "my_private",
            FolderScope::MyShared => "my_shared",
            FolderScope::TeamPrivate => "team_private",
            FolderScope::TeamShared => "team_shared",
            FolderScope::OrgShared => "org_shared",
        }
    }

    pub fn all() -> [FolderScope; 5] {
        [
            FolderScope::MyPrivate,
            FolderScope::MyShared,
            FolderScope::TeamPrivate,
            FolderScope::TeamShared,
            FolderScope::OrgShared,
        ]
    }
}

impl fmt::Display for FolderScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FolderScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "my_private" => Ok(FolderScope::MyPrivate),
            "my_shared" => Ok(FolderScope::MyShared),
            "team_private" => Ok(FolderScope::TeamPrivate),
            "team_shared" => Ok(FolderScope::TeamShared),
            "org_shared" => Ok(FolderScope::OrgShared),
            other => Err(format!(
                "unknown folder scope '{}' (expected one of: my_private, my_shared, team_private, team_shared, org_shared)",
                other
            )),
        }
    }
}

/// Folder visibility within its owner's workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    Shared,
}

/// Who owns a resolved workspace folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FolderOwner {
    Agent { agent_id: String },
    Team { team_id: String },
}

/// Grant metadata recorded when a folder handle is issued.
///
/// Operations against the handle are evaluated against this grant, never
/// against the scope token the folder was discovered through — `org_shared`
/// discovery inherits the underlying shared-folder rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderGrant {
    pub owner: FolderOwner,
    pub visibility: Visibility,
    pub organization_id: String,
}

/// File operations distinguished by the permission matrix.
///
/// `stat` is treated as a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOperation {
    Read,
    Write,
    Delete,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileOperation::Read => "read",
            FileOperation::Write => "write",
            FileOperation::Delete => "delete",
        };
        write!(f, "{}", s)
    }
}

/// The precomputed membership view a workspace operation is evaluated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceActor {
    pub agent_id: String,
    pub organization_id: String,
    pub team_id: Option<String>,
}

impl WorkspaceActor {
    pub fn new(agent_id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            organization_id: organization_id.into(),
            team_id: None,
        }
    }

    pub fn with_team(mut self, team_id: impl Into<String>) -> Self {
        self.team_id = Some(team_id.into());
        self
    }
}

/// The scope permission matrix.
///
/// | Folder | Owner / members | Other org members |
/// |--------|-----------------|-------------------|
/// | agent private | all operations | none |
/// | agent shared | all operations | read-only |
/// | team private | all operations | none |
/// | team shared | all operations | read-only |
///
/// Cross-organization access is always denied.
pub fn operation_allowed(grant: &FolderGrant, actor: &WorkspaceActor, op: FileOperation) -> bool {
    if grant.organization_id != actor.organization_id {
        return false;
    }

    let is_insider = match &grant.owner {
        FolderOwner::Agent { agent_id } => *agent_id == actor.agent_id,
        FolderOwner::Team { team_id } => actor.team_id.as_deref() == Some(team_id.as_str()),
    };

    match grant.visibility {
        Visibility::Private => is_insider,
        Visibility::Shared => is_insider || op == FileOperation::Read,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent_grant(agent_id: &str, visibility: Visibility) -> FolderGrant {
        FolderGrant {
            owner: FolderOwner::Agent {
                agent_id: agent_id.to_string(),
            },
            visibility,
            organization_id: "org-1".to_string(),
        }
    }

    fn team_grant(team_id: &str, visibility: Visibility) -> FolderGrant {
        FolderGrant {
            owner: FolderOwner::Team {
                team_id: team_id.to_string(),
            },
            visibility,
            organization_id: "org-1".to_string(),
        }
    }

    #[test]
    fn test_scope_round_trips_through_str() {
        for scope in FolderScope::all() {
            assert_eq!(scope.as_str().parse::<FolderScope>().unwrap(), scope);
        }
        assert!("attic".parse::<FolderScope>().is_err());
    }

    #[test]
    fn test_private_folder_is_owner_only() {
        let grant = agent_grant("agent-b", Visibility::Private);
        let owner = WorkspaceActor::new("agent-b", "org-1");
        let stranger = WorkspaceActor::new("agent-a", "org-1");

        for op in [FileOperation::Read, FileOperation::Write, FileOperation::Delete] {
            assert!(operation_allowed(&grant, &owner, op));
            assert!(!operation_allowed(&grant, &stranger, op));
        }
    }

    #[test]
    fn test_shared_agent_folder_is_read_only_for_others() {
        let grant = agent_grant("agent-b", Visibility::Shared);
        let other = WorkspaceActor::new("agent-a", "org-1");

        assert!(operation_allowed(&grant, &other, FileOperation::Read));
        assert!(!operation_allowed(&grant, &other, FileOperation::Write));
        assert!(!operation_allowed(&grant, &other, FileOperation::Delete));

        let owner = WorkspaceActor::new("agent-b", "org-1");
        assert!(operation_allowed(&grant, &owner, FileOperation::Write));
    }

    #[test]
    fn test_team_private_excludes_non_members_entirely() {
        let grant = team_grant("team-1", Visibility::Private);
        let member = WorkspaceActor::new("agent-a", "org-1").with_team("team-1");
        let outsider = WorkspaceActor::new("agent-b", "org-1").with_team("team-2");
        let teamless = WorkspaceActor::new("agent-c", "org-1");

        assert!(operation_allowed(&grant, &member, FileOperation::Read));
        assert!(operation_allowed(&grant, &member, FileOperation::Delete));
        assert!(!operation_allowed(&grant, &outsider, FileOperation::Read));
        assert!(!operation_allowed(&grant, &teamless, FileOperation::Read));
    }

    #[test]
    fn test_team_shared_allows_member_writes_and_org_reads() {
        let grant = team_grant("team-1", Visibility::Shared);
        let member_one = WorkspaceActor::new("agent-a", "org-1").with_team("team-1");
        let member_two = WorkspaceActor::new("agent-b", "org-1").with_team("team-1");
        let outsider = WorkspaceActor::new("agent-c", "org-1").with_team("team-2");

        assert!(operation_allowed(&grant, &member_one, FileOperation::Write));
        assert!(operation_allowed(&grant, &member_two, FileOperation::Write));
        assert!(operation_allowed(&grant, &outsider, FileOperation::Read));
        assert!(!operation_allowed(&grant, &outsider, FileOperation::Write));
    }

    #[test]
    fn test_cross_organization_access_is_denied() {
        let grant = agent_grant("agent-b", Visibility::Shared);
        let foreign = WorkspaceActor::new("agent-x", "org-2");

        assert!(!operation_allowed(&grant, &foreign, FileOperation::Read));
    }
}
