//! Task processing loop
//!
//! Drives one task to completion through alternating backend calls and tool
//! executions. The loop is fail-open toward the model: permission denials,
//! unknown tools, executor failures, and backend hiccups are folded into
//! conversation history so the model can adjust course. The single
//! exception is identity spoofing, which fails the call closed and is
//! logged as a security event.

use crate::ports::chat_backend::{BackendError, ChatBackendPort, ChatOptions, ChatRequest};
use crate::ports::directory::{DirectoryError, DirectoryPort};
use crate::registry::CapabilityRegistry;
use agentry_domain::{
    Agent, Conversation, ExecutionContext, Organization, Team, ToolCall, assert_access,
    available_tools, render_primary_content,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Iteration ceiling for one task. After this many tool-calling rounds the
/// loop demands a final answer with one more call, so the worst case is
/// `DEFAULT_MAX_ITERATIONS + 1` backend calls.
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(120);

/// Tuning knobs for the loop.
#[derive(Debug, Clone)]
pub struct TaskLoopConfig {
    pub max_iterations: usize,
    /// Per-call deadline for backend completions
    pub backend_timeout: Duration,
    pub options: ChatOptions,
}

impl Default for TaskLoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            backend_timeout: DEFAULT_BACKEND_TIMEOUT,
            options: ChatOptions::default(),
        }
    }
}

/// How the task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// The model produced a final answer within the iteration budget.
    Completed,
    /// The budget ran out; the answer is the model's forced wrap-up.
    LimitReached,
}

/// Result of one processed task.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub answer: String,
    pub status: TaskStatus,
    /// Tool-calling rounds actually consumed (excludes the forced final call)
    pub iterations: usize,
    pub correlation_id: String,
}

/// Input for [`ProcessTaskUseCase::execute`].
#[derive(Debug, Clone)]
pub struct ProcessTaskInput {
    pub task: String,
    pub agent_id: String,
}

/// Failures that abort the task before or outside the loop. Everything
/// that happens *inside* an iteration is folded into the conversation
/// instead.
#[derive(Error, Debug)]
pub enum ProcessTaskError {
    #[error("directory lookup failed: {0}")]
    Directory(#[from] DirectoryError),

    #[error("task description must not be empty")]
    EmptyTask,
}

/// Orchestrates one agent task over a chat backend, the capability
/// registry, and the directory snapshot.
pub struct ProcessTaskUseCase {
    backend: Arc<dyn ChatBackendPort>,
    registry: Arc<CapabilityRegistry>,
    directory: Arc<dyn DirectoryPort>,
    config: TaskLoopConfig,
}

impl ProcessTaskUseCase {
    pub fn new(
        backend: Arc<dyn ChatBackendPort>,
        registry: Arc<CapabilityRegistry>,
        directory: Arc<dyn DirectoryPort>,
        config: TaskLoopConfig,
    ) -> Self {
        Self {
            backend,
            registry,
            directory,
            config,
        }
    }

    /// Run the tool-calling loop for one task and return its outcome.
    pub async fn execute(&self, input: ProcessTaskInput) -> Result<TaskOutcome, ProcessTaskError> {
        if input.task.trim().is_empty() {
            return Err(ProcessTaskError::EmptyTask);
        }

        let agent = self.directory.get_agent(&input.agent_id).await?;
        let org = self.directory.get_organization(&agent.organization_id).await?;
        let team = match &agent.team_id {
            Some(team_id) => Some(self.directory.get_team(team_id).await?),
            None => None,
        };
        let ctx = ExecutionContext::new(agent.id.clone(), org.id.clone());

        // The tool set offered to the model is the permission-resolved view:
        // org catalog minus team and agent blacklists, restricted to tools
        // with a registered executor.
        let tools: Vec<_> = available_tools(&org, &agent, team.as_ref())
            .into_iter()
            .filter(|def| self.registry.lookup(&def.name).is_some())
            .cloned()
            .collect();

        info!(
            agent_id = %ctx.agent_id,
            organization_id = %ctx.organization_id,
            correlation_id = %ctx.correlation_id,
            provider = self.backend.provider_name(),
            tools = tools.len(),
            "starting task"
        );

        let mut conversation = Conversation::seeded_with(&input.task);

        for iteration in 0..self.config.max_iterations {
            let response = match self.complete(&conversation, &tools).await {
                Ok(response) => response,
                Err(err) => {
                    // Backend failures are per-call, not fatal: tell the
                    // model what happened and let it retry or conclude.
                    warn!(
                        correlation_id = %ctx.correlation_id,
                        iteration,
                        error = %err,
                        "backend call failed; folding into conversation"
                    );
                    conversation.push_user(format!(
                        "Note: the previous model call failed ({}). Please continue the task.",
                        err
                    ));
                    continue;
                }
            };

            if response.tool_calls.is_empty() {
                info!(
                    correlation_id = %ctx.correlation_id,
                    iterations = iteration,
                    "task completed"
                );
                return Ok(TaskOutcome {
                    answer: response.content,
                    status: TaskStatus::Completed,
                    iterations: iteration,
                    correlation_id: ctx.correlation_id,
                });
            }

            let calls = response.tool_calls.clone();
            conversation.push_assistant(response.content, calls.clone());

            for call in &calls {
                let result = self.run_tool(call, &ctx, &org, &agent, team.as_ref()).await;
                // Ids come straight from the assistant turn above, so the
                // append cannot be unmatched.
                conversation
                    .push_tool_result(&call.id, &call.tool_name, result)
                    .unwrap_or_else(|err| {
                        error!(correlation_id = %ctx.correlation_id, %err, "conversation bookkeeping broken");
                    });
            }
        }

        // Budget exhausted: one final call with an explicit instruction to
        // wrap up, tools withheld so the model cannot keep going.
        warn!(
            correlation_id = %ctx.correlation_id,
            max_iterations = self.config.max_iterations,
            "iteration budget exhausted; forcing a final answer"
        );
        conversation.push_user(
            "You have reached the maximum number of tool-calling rounds for this task. \
             Provide your best final answer now, based on the information gathered so far. \
             Do not request any more tools.",
        );
        let answer = match self.complete(&conversation, &[]).await {
            Ok(response) => response.content,
            Err(err) => {
                warn!(correlation_id = %ctx.correlation_id, error = %err, "forced final call failed");
                conversation
                    .last_assistant_text()
                    .unwrap_or("The task could not be completed within the allotted iterations.")
                    .to_string()
            }
        };
        Ok(TaskOutcome {
            answer,
            status: TaskStatus::LimitReached,
            iterations: self.config.max_iterations,
            correlation_id: ctx.correlation_id,
        })
    }

    async fn complete(
        &self,
        conversation: &Conversation,
        tools: &[agentry_domain::ToolDefinition],
    ) -> Result<crate::ports::chat_backend::BackendResponse, BackendError> {
        let request = ChatRequest {
            messages: conversation.messages(),
            tools,
            options: &self.config.options,
        };
        match tokio::time::timeout(self.config.backend_timeout, self.backend.complete(request))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout),
        }
    }

    /// Execute a single tool call and render its result as conversation
    /// content. Never returns Err: every failure mode becomes a message the
    /// model can read.
    async fn run_tool(
        &self,
        call: &ToolCall,
        ctx: &ExecutionContext,
        org: &Organization,
        agent: &Agent,
        team: Option<&Team>,
    ) -> String {
        // Spoofing check first: an identity claim in the arguments that
        // contradicts the execution context fails closed no matter what
        // the call would otherwise be allowed to do.
        if let Err(violation) = ctx.verify_claimed_agent(call.claimed_agent_id()) {
            error!(
                correlation_id = %ctx.correlation_id,
                tool = %call.tool_name,
                claimed = %violation.claimed,
                actual = %violation.actual,
                "identity spoofing attempt in tool call"
            );
            return format!(
                "Security violation: {}. The call was not executed.",
                violation
            );
        }

        if let Err(denial) = assert_access(&call.tool_name, org, agent, team) {
            debug!(
                correlation_id = %ctx.correlation_id,
                tool = %call.tool_name,
                "tool call denied"
            );
            return format!("Permission denied: {}", denial);
        }

        let Some(handler) = self.registry.lookup(&call.tool_name) else {
            return format!(
                "Error: tool '{}' has no registered executor. Choose another tool.",
                call.tool_name
            );
        };

        debug!(
            correlation_id = %ctx.correlation_id,
            tool = %call.tool_name,
            call_id = %call.id,
            "executing tool"
        );
        match handler.call(ctx, &call.arguments).await {
            Ok(value) => render_primary_content(&value),
            Err(err) => {
                warn!(
                    correlation_id = %ctx.correlation_id,
                    tool = %call.tool_name,
                    code = %err.code,
                    "tool execution failed"
                );
                format!("Error: {}", err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_backend::BackendResponse;
    use crate::ports::tool_handler::ToolHandler;
    use crate::test_support::{ScriptedBackend, StubDirectory};
    use agentry_domain::{ToolDefinition, ToolError, empty_object_schema};
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::HashMap;

    struct EchoTool {
        name: &'static str,
    }

    #[async_trait]
    impl ToolHandler for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new(self.name, "echoes its input")
                .with_schema(empty_object_schema())
        }

        async fn call(
            &self,
            _ctx: &ExecutionContext,
            arguments: &HashMap<String, Value>,
        ) -> Result<Value, ToolError> {
            let text = arguments
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or("(nothing)");
            Ok(json!({ "content": format!("echo: {text}") }))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl ToolHandler for FailingTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("flaky", "always fails")
        }

        async fn call(
            &self,
            _ctx: &ExecutionContext,
            _arguments: &HashMap<String, Value>,
        ) -> Result<Value, ToolError> {
            Err(ToolError::execution_failed("disk on fire"))
        }
    }

    fn directory() -> Arc<StubDirectory> {
        let org = Organization::new("org-1", "Acme")
            .with_tool(ToolDefinition::new("echo", "echoes"))
            .with_tool(ToolDefinition::new("flaky", "fails"))
            .with_tool(ToolDefinition::new("forbidden", "blacklisted"));
        Arc::new(
            StubDirectory::new()
                .with_organization(org)
                .with_team(Team::new("team-1", "org-1", "Research").with_blacklisted("forbidden"))
                .with_agent(Agent::new("agent-1", "org-1", "Ada").with_team("team-1")),
        )
    }

    fn use_case(backend: &Arc<ScriptedBackend>, registry: CapabilityRegistry) -> ProcessTaskUseCase {
        ProcessTaskUseCase::new(
            Arc::clone(backend) as Arc<dyn ChatBackendPort>,
            Arc::new(registry),
            directory(),
            TaskLoopConfig::default(),
        )
    }

    fn input(task: &str) -> ProcessTaskInput {
        ProcessTaskInput {
            task: task.to_string(),
            agent_id: "agent-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_text_only_response_completes_immediately() {
        let backend = Arc::new(ScriptedBackend::new(vec![BackendResponse::from_text(
            "All done.",
        )]));
        let outcome = use_case(&backend, CapabilityRegistry::new())
            .execute(input("say hi"))
            .await
            .unwrap();

        assert_eq!(outcome.answer, "All done.");
        assert_eq!(outcome.status, TaskStatus::Completed);
        assert_eq!(outcome.iterations, 0);
    }

    #[tokio::test]
    async fn test_tool_round_trip_feeds_result_back() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            BackendResponse::from_text("Echoing.")
                .with_tool_call(ToolCall::new("call_1", "echo").with_arg("text", "hello")),
            BackendResponse::from_text("The echo said: echo: hello"),
        ]));
        let registry = CapabilityRegistry::new();
        registry.register(Arc::new(EchoTool { name: "echo" })).unwrap();

        let outcome = use_case(&backend, registry)
            .execute(input("echo hello"))
            .await
            .unwrap();

        assert_eq!(outcome.status, TaskStatus::Completed);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.answer.contains("echo: hello"));
    }

    #[tokio::test]
    async fn test_denied_tool_is_reported_not_fatal() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            BackendResponse::from_text("Trying the forbidden tool.")
                .with_tool_call(ToolCall::new("call_1", "forbidden")),
            BackendResponse::from_text("Understood, using something else."),
        ]));
        let registry = CapabilityRegistry::new();
        registry
            .register(Arc::new(EchoTool { name: "forbidden" }))
            .unwrap();

        let outcome = use_case(&backend, registry).execute(input("try it")).await.unwrap();

        // The denial went back as a tool message and the task still finished.
        assert_eq!(outcome.status, TaskStatus::Completed);
        assert!(outcome.answer.contains("something else"));
        let second_request = backend.request_messages(1);
        let has_denial = second_request.iter().any(|m| {
            matches!(m, agentry_domain::ConversationMessage::Tool { content, .. }
                if content.contains("Permission denied"))
        });
        assert!(has_denial);
    }

    #[tokio::test]
    async fn test_spoofed_identity_fails_closed() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            BackendResponse::from_text("Acting as someone else.").with_tool_call(
                ToolCall::new("call_1", "echo")
                    .with_arg("text", "hi")
                    .with_arg("agent_id", "agent-999"),
            ),
            BackendResponse::from_text("done"),
        ]));
        let registry = CapabilityRegistry::new();
        registry.register(Arc::new(EchoTool { name: "echo" })).unwrap();

        let outcome = use_case(&backend, registry).execute(input("spoof")).await.unwrap();

        assert_eq!(outcome.status, TaskStatus::Completed);
        // The second request's history must carry the security notice, and
        // the tool must not have produced an echo.
        let second_request = backend.request_messages(1);
        let tool_msgs: Vec<&str> = second_request
            .iter()
            .filter_map(|m| match m {
                agentry_domain::ConversationMessage::Tool { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(tool_msgs.len(), 1);
        assert!(tool_msgs[0].contains("Security violation"));
        assert!(!tool_msgs[0].contains("echo: hi"));
    }

    #[tokio::test]
    async fn test_executor_failure_is_folded_into_history() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            BackendResponse::from_text("Using the flaky tool.")
                .with_tool_call(ToolCall::new("call_1", "flaky")),
            BackendResponse::from_text("That tool is broken, answering without it."),
        ]));
        let registry = CapabilityRegistry::new();
        registry.register(Arc::new(FailingTool)).unwrap();

        let outcome = use_case(&backend, registry).execute(input("go")).await.unwrap();
        assert_eq!(outcome.status, TaskStatus::Completed);
        assert!(outcome.answer.contains("answering without it"));
    }

    #[tokio::test]
    async fn test_unregistered_tool_yields_guidance() {
        // "echo" is in the catalog but nothing is registered for it.
        let backend = Arc::new(ScriptedBackend::new(vec![
            BackendResponse::from_text("Calling echo.")
                .with_tool_call(ToolCall::new("call_1", "echo")),
            BackendResponse::from_text("final"),
        ]));

        let outcome = use_case(&backend, CapabilityRegistry::new())
            .execute(input("go"))
            .await
            .unwrap();
        assert_eq!(outcome.status, TaskStatus::Completed);

        let second_request = backend.request_messages(1);
        let has_guidance = second_request.iter().any(|m| {
            matches!(m, agentry_domain::ConversationMessage::Tool { content, .. }
                if content.contains("no registered executor"))
        });
        assert!(has_guidance);
    }

    #[tokio::test]
    async fn test_iteration_budget_forces_final_answer() {
        // Every scripted turn requests a tool; the loop must stop at the
        // ceiling and make exactly one more call without tools.
        let mut responses = Vec::new();
        for i in 0..DEFAULT_MAX_ITERATIONS {
            responses.push(
                BackendResponse::from_text("more")
                    .with_tool_call(ToolCall::new(format!("call_{i}"), "echo").with_arg("text", "x")),
            );
        }
        responses.push(BackendResponse::from_text("Best effort summary."));

        let backend = Arc::new(ScriptedBackend::new(responses));
        let registry = CapabilityRegistry::new();
        registry.register(Arc::new(EchoTool { name: "echo" })).unwrap();

        let outcome = use_case(&backend, registry)
            .execute(input("loop forever"))
            .await
            .unwrap();

        assert_eq!(outcome.status, TaskStatus::LimitReached);
        assert_eq!(outcome.iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(outcome.answer, "Best effort summary.");
        assert_eq!(backend.call_count(), DEFAULT_MAX_ITERATIONS + 1);
        // The forced final call offers no tools.
        assert!(backend.request_tool_names(DEFAULT_MAX_ITERATIONS).is_empty());
    }

    #[tokio::test]
    async fn test_backend_failure_is_retried_through_the_conversation() {
        let backend = Arc::new(
            ScriptedBackend::new(vec![BackendResponse::from_text("recovered")])
                .failing_first(BackendError::Transport("connection reset".into())),
        );

        let outcome = use_case(&backend, CapabilityRegistry::new())
            .execute(input("go"))
            .await
            .unwrap();
        assert_eq!(outcome.status, TaskStatus::Completed);
        assert_eq!(outcome.answer, "recovered");
        // The failure consumed an iteration.
        assert_eq!(outcome.iterations, 1);
    }

    #[tokio::test]
    async fn test_empty_task_is_rejected() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let err = use_case(&backend, CapabilityRegistry::new())
            .execute(input("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessTaskError::EmptyTask));
    }

    #[tokio::test]
    async fn test_unknown_agent_is_fatal() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let err = use_case(&backend, CapabilityRegistry::new())
            .execute(ProcessTaskInput {
                task: "go".to_string(),
                agent_id: "agent-ghost".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessTaskError::Directory(DirectoryError::AgentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_blacklisted_tools_are_not_offered() {
        let backend = Arc::new(ScriptedBackend::new(vec![BackendResponse::from_text("ok")]));
        let registry = CapabilityRegistry::new();
        registry.register(Arc::new(EchoTool { name: "echo" })).unwrap();
        registry
            .register(Arc::new(EchoTool { name: "forbidden" }))
            .unwrap();

        use_case(&backend, registry).execute(input("go")).await.unwrap();

        let offered = backend.request_tool_names(0);
        assert_eq!(offered, vec!["echo"]);
    }
}
