//! In-memory test doubles for the application layer's ports.
//!
//! The infrastructure crate depends on this one, so its adapters cannot be
//! used in tests here; these doubles mirror the port contracts instead.

use crate::ports::chat_backend::{
    BackendError, BackendResponse, ChatBackendPort, ChatRequest,
};
use crate::ports::directory::{DirectoryError, DirectoryPort};
use crate::ports::storage::{StorageEntry, StorageError, StoragePort};
use agentry_domain::{Agent, ConversationMessage, Organization, Team};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// A chat backend that replays a fixed script of responses and records
/// every request it receives for later assertions.
#[derive(Debug)]
pub(crate) struct ScriptedBackend {
    responses: Mutex<VecDeque<BackendResponse>>,
    pending_failure: Mutex<Option<BackendError>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

#[derive(Debug)]
struct RecordedRequest {
    messages: Vec<ConversationMessage>,
    tool_names: Vec<String>,
}

impl ScriptedBackend {
    pub(crate) fn new(responses: Vec<BackendResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            pending_failure: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Make the next call fail once before the script resumes.
    pub(crate) fn failing_first(self, error: BackendError) -> Self {
        *self.pending_failure.lock().unwrap() = Some(error);
        self
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Conversation history of the nth request (0-based).
    pub(crate) fn request_messages(&self, index: usize) -> Vec<ConversationMessage> {
        self.requests.lock().unwrap()[index].messages.clone()
    }

    /// Tool names offered on the nth request (0-based).
    pub(crate) fn request_tool_names(&self, index: usize) -> Vec<String> {
        self.requests.lock().unwrap()[index].tool_names.clone()
    }
}

#[async_trait]
impl ChatBackendPort for ScriptedBackend {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<BackendResponse, BackendError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: request.messages.to_vec(),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
        });
        if let Some(error) = self.pending_failure.lock().unwrap().take() {
            return Err(error);
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BackendError::Protocol("scripted responses exhausted".to_string()))
    }
}

/// A directory backed by plain maps, populated through builder calls.
#[derive(Default)]
pub(crate) struct StubDirectory {
    organizations: HashMap<String, Organization>,
    teams: HashMap<String, Team>,
    agents: HashMap<String, Agent>,
}

impl StubDirectory {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_organization(mut self, org: Organization) -> Self {
        self.organizations.insert(org.id.clone(), org);
        self
    }

    pub(crate) fn with_team(mut self, team: Team) -> Self {
        self.teams.insert(team.id.clone(), team);
        self
    }

    pub(crate) fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.insert(agent.id.clone(), agent);
        self
    }
}

#[async_trait]
impl DirectoryPort for StubDirectory {
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

/// Storage double over a flat path→bytes map.
#[derive(Default)]
pub(crate) struct MemoryStorage {
    files: Mutex<HashMap<String, (Vec<u8>, DateTime<Utc>)>>,
}

impl MemoryStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoragePort for MemoryStorage {
    async fn list_entries(&self, path: &str) -> Result<Vec<StorageEntry>, StorageError> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let files = self.files.lock().unwrap();
        Ok(files
            .iter()
            .filter_map(|(stored, (bytes, modified_at))| {
                stored.strip_prefix(&prefix).map(|name| StorageEntry {
                    name: name.to_string(),
                    size: bytes.len() as u64,
                    modified_at: *modified_at,
                })
            })
            .collect())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), (bytes.to_vec(), Utc::now()));
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.files.lock().unwrap().remove(path).is_some())
    }

    async fn mkdir_recursive(&self, _path: &str) -> Result<(), StorageError> {
        // Directories are implicit in the flat map.
        Ok(())
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.files.lock().unwrap().contains_key(path))
    }
}
