//! CLI entrypoint for agentry
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use agentry_application::ports::directory::DirectoryPort;
use agentry_application::{
    CapabilityRegistry, ProcessTaskInput, ProcessTaskUseCase, TaskStatus, WorkspaceService,
};
use agentry_domain::available_tools;
use agentry_infrastructure::{
    ConfigLoader, InMemoryDirectory, LocalStorage, build_backend, register_builtin_tools,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "agentry", version, about = "Run tasks with capability-restricted AI agents")]
struct Cli {
    /// The task to execute
    task: Option<String>,

    /// Agent to execute the task as
    #[arg(short, long)]
    agent: Option<String>,

    /// Explicit config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ignore all config files and use defaults
    #[arg(long)]
    no_config: bool,

    /// List the agent's resolved tool set and exit
    #[arg(long)]
    tools: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress everything except the final answer
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };
    for issue in config.validate() {
        warn!("config: {}", issue);
    }

    let Some(agent_id) = cli.agent else {
        bail!("An agent is required. Pass one with --agent <id>.");
    };

    // === Dependency Injection ===
    let directory = Arc::new(
        InMemoryDirectory::load(&config.directory.path)
            .with_context(|| format!("loading directory from {}", config.directory.path))?,
    );

    if cli.tools {
        return print_tool_set(directory.as_ref(), &agent_id).await;
    }

    let Some(task) = cli.task else {
        bail!("A task is required. Pass it as the positional argument, or use --tools.");
    };

    let storage = Arc::new(LocalStorage::new(&config.workspace.root));
    let workspace = Arc::new(WorkspaceService::new(
        storage,
        directory.clone(),
        config.workspace_config(),
    ));
    let _sweeper = workspace.spawn_sweeper();

    let registry = Arc::new(CapabilityRegistry::new());
    register_builtin_tools(&registry, workspace, directory.clone())?;

    let backend = build_backend(&config)?;
    info!(provider = backend.provider_name(), agent_id = %agent_id, "starting");

    let use_case = ProcessTaskUseCase::new(
        backend,
        registry,
        directory,
        config.task_loop_config(),
    );
    let outcome = use_case
        .execute(ProcessTaskInput {
            task,
            agent_id,
        })
        .await?;

    if !cli.quiet && outcome.status == TaskStatus::LimitReached {
        eprintln!(
            "(iteration budget reached after {} rounds; answer is best-effort)",
            outcome.iterations
        );
    }
    println!("{}", outcome.answer);

    Ok(())
}

/// Print the permission-resolved tool set for one agent.
async fn print_tool_set(directory: &InMemoryDirectory, agent_id: &str) -> Result<()> {
    let agent = directory.get_agent(agent_id).await?;
    let org = directory.get_organization(&agent.organization_id).await?;
    let team = match &agent.team_id {
        Some(team_id) => Some(directory.get_team(team_id).await?),
        None => None,
    };

    let tools = available_tools(&org, &agent, team.as_ref());
    if tools.is_empty() {
        println!("{} has no tools available.", agent.name);
        return Ok(());
    }
    println!("Tools available to {}:", agent.name);
    for tool in tools {
        println!("  {} - {}", tool.name, tool.description);
    }
    Ok(())
}
