//! Execution context — the trusted identity bundle for a task
//!
//! Constructed once per task and threaded through every tool call. The
//! context is the authority on *who* is acting; any `agent_id` the model
//! writes into tool arguments is untrusted input checked against it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identity spoofing detected in a tool call.
///
/// This is a security violation, not a permission failure: the model
/// claimed to act as a different agent than the one the task runs for.
/// It fails closed and is logged distinctly from ordinary denials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "tool call claimed agent identity '{claimed}' but the task executes as '{actual}' (correlation {correlation_id})"
)]
pub struct SecurityViolation {
    pub claimed: String,
    pub actual: String,
    pub correlation_id: String,
}

/// Trusted identity and correlation bundle for one task execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// The agent the task executes as
    pub agent_id: String,
    /// The agent's organization
    pub organization_id: String,
    /// Correlates every log line and tool call of this task
    pub correlation_id: String,
}

impl ExecutionContext {
    /// Create a context with a fresh correlation id.
    pub fn new(agent_id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            organization_id: organization_id.into(),
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create a context with an explicit correlation id (e.g. from an
    /// upstream request).
    pub fn with_correlation(
        agent_id: impl Into<String>,
        organization_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            organization_id: organization_id.into(),
            correlation_id: correlation_id.into(),
        }
    }

    /// Verify an agent identity claimed inside tool arguments.
    ///
    /// Absent claims are fine (the context supplies the identity); a
    /// present claim must match exactly or the call fails closed.
    pub fn verify_claimed_agent(&self, claimed: Option<&str>) -> Result<(), SecurityViolation> {
        match claimed {
            None => Ok(()),
            Some(id) if id == self.agent_id => Ok(()),
            Some(id) => Err(SecurityViolation {
                claimed: id.to_string(),
                actual: self.agent_id.clone(),
                correlation_id: self.correlation_id.clone(),
            }),
        }
    }
}
