use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use council::agents::{Agent, list_agents};
use council::backend::build_backend;
use council::backend::ollama::OllamaBackend;
use council::banner::{BannerInfo, print_banner, render_result, usage_line};
use council::config::selection::AgentSelection;
use council::config::{Provider, Settings, parse_temperature};
use council::consts::{DEFAULT_HOST, DEFAULT_PORT, default_db_path};
use council::engine::orchestrator::{Orchestrator, OrchestratorConfig};
use council::engine::{Engine, EvaluationRequest};
use council::events::EventBus;
use council::spinner;
use council::web::{AppState, run_server};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Openai,
    Ollama,
}

#[derive(Parser)]
#[command(name = "council", version, about = "A panel of minds for your product ideas.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// LLM provider (overrides USE_OLLAMA)
    #[arg(short, long, value_enum, global = true)]
    provider: Option<ProviderArg>,

    /// Model name for the chosen provider (overrides OPENAI_MODEL / OLLAMA_MODEL)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Sampling temperature between 0 and 2 (overrides OPENAI_TEMPERATURE)
    #[arg(short, long, global = true)]
    temperature: Option<String>,

    /// SQLite database holding the agent selection
    #[arg(short, long, global = true)]
    db: Option<PathBuf>,

    /// Skip the synthesis call after the agents answer
    #[arg(long, global = true, default_value_t = false)]
    no_summary: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the web UI (default)
    Serve {
        /// Address to bind
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to bind
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Evaluate a single idea and print the panel's answers
    Evaluate {
        /// The product idea
        idea: String,

        /// Optional context (market, users, constraints)
        #[arg(short, long)]
        context: Option<String>,

        /// Only ask these agents (repeatable)
        #[arg(short = 'a', long = "agent")]
        agents: Vec<String>,

        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show or change which agents sit on the panel
    Agents {
        #[command(subcommand)]
        action: Option<AgentsAction>,
    },
}

#[derive(Subcommand)]
enum AgentsAction {
    /// List every agent with its status (default)
    List,
    /// Put an agent on the panel
    Enable { id: String },
    /// Take an agent off the panel
    Disable { id: String },
    /// Set an agent's priority (lower is asked first)
    Priority {
        id: String,
        #[arg(allow_negative_numbers = true)]
        priority: i64,
    },
    /// Forget stored settings for an agent
    Reset { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real env vars still apply.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => default_db_path()?,
    };
    let db_label = db_path.display().to_string();
    let selection = open_selection(&db_path)?;

    let default_command = Command::Serve {
        host: DEFAULT_HOST.to_string(),
        port: DEFAULT_PORT,
    };
    let command = cli.command.as_ref().unwrap_or(&default_command);

    if let Command::Agents { action } = command {
        return match action {
            Some(action) => handle_agents(&selection, action),
            None => handle_agents(&selection, &AgentsAction::List),
        };
    }

    let settings = load_settings(&cli)?;
    if settings.provider == Provider::Ollama {
        ensure_ollama(&settings).await?;
    }
    let backend = build_backend(&settings).context("cannot start the completion backend")?;

    let roster = selection.roster(&list_agents())?;
    if roster.is_empty() {
        bail!("every agent is disabled. Run `council agents enable <id>` first.");
    }

    let config = OrchestratorConfig {
        summarize: !cli.no_summary,
    };
    let backend_label = format!("{} ({})", backend.name(), backend.model());

    let banner = |address: Option<&str>| {
        print_banner(&BannerInfo {
            provider: backend.name(),
            model: backend.model(),
            temperature: settings.temperature,
            agents: &roster,
            summary: config.summarize,
            selection_db: &db_label,
            address,
        })
    };

    match command {
        Command::Serve { host, port } => {
            let addr: SocketAddr = format!("{host}:{port}")
                .parse()
                .with_context(|| format!("invalid host/port: {host}:{port}"))?;
            banner(Some(&addr.to_string()));

            let orchestrator = Orchestrator::new(backend.clone(), roster.clone(), config.clone());
            let state = AppState {
                engine: Arc::new(orchestrator),
                agents: Arc::new(roster.clone()),
                backend_label,
            };
            run_server(state, addr).await
        }
        Command::Evaluate {
            idea,
            context,
            agents,
            json,
        } => {
            if !json {
                banner(None);
            }
            let mut request = EvaluationRequest::new(idea.clone()).with_agents(agents.clone());
            request.context = context.clone();
            run_once(
                Orchestrator::new(backend.clone(), roster.clone(), config.clone()),
                &request,
                *json,
            )
            .await
        }
        Command::Agents { .. } => Ok(()),
    }
}

fn open_selection(path: &Path) -> anyhow::Result<AgentSelection> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let path = path
        .to_str()
        .context("database path is not valid UTF-8")?;
    AgentSelection::open(path)
}

/// Env settings with CLI overrides applied.
fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::from_env()?;
    if let Some(provider) = cli.provider {
        settings.provider = match provider {
            ProviderArg::Openai => Provider::OpenAi,
            ProviderArg::Ollama => Provider::Ollama,
        };
    }
    if let Some(model) = &cli.model {
        settings.set_model(model.clone());
    }
    if let Some(raw) = &cli.temperature {
        settings.temperature = parse_temperature("--temperature", raw)?;
    }
    Ok(settings)
}

async fn ensure_ollama(settings: &Settings) -> anyhow::Result<()> {
    let ollama = OllamaBackend::new(
        &settings.ollama_url,
        settings.ollama_model.clone(),
        settings.temperature,
    );
    if !ollama.is_available().await {
        bail!(
            "Ollama is not running or not accessible at {}. Start it with `ollama serve`.",
            ollama.base_url()
        );
    }
    match ollama.models().await {
        Ok(models) if !models.iter().any(|m| m.starts_with(&settings.ollama_model)) => {
            tracing::warn!(
                model = %settings.ollama_model,
                installed = %models.join(", "),
                "model not installed, run `ollama pull {}`",
                settings.ollama_model
            );
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "could not list ollama models"),
    }
    Ok(())
}

async fn run_once(
    orchestrator: Orchestrator,
    request: &EvaluationRequest,
    json: bool,
) -> anyhow::Result<()> {
    let bus = Arc::new(EventBus::default());
    let progress = (!json).then(|| tokio::spawn(spinner::follow(bus.subscribe())));
    let orchestrator = orchestrator.with_events(Arc::clone(&bus));

    let outcome = orchestrator.evaluate(request).await;
    // Dropping the bus closes the channel so the spinner exits even on validation errors.
    drop(orchestrator);
    drop(bus);
    if let Some(progress) = progress {
        let _ = progress.await;
    }

    let result = outcome?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_result(&result));
        if let Some(line) = usage_line(result.usage) {
            println!("\n{line}");
        }
    }
    Ok(())
}

fn handle_agents(selection: &AgentSelection, action: &AgentsAction) -> anyhow::Result<()> {
    let agents = list_agents();
    match action {
        AgentsAction::List => print_agents(selection, &agents)?,
        AgentsAction::Enable { id } => {
            selection.set_enabled(&agents, id, true)?;
            println!("✓ {id} is on the panel.");
        }
        AgentsAction::Disable { id } => {
            selection.set_enabled(&agents, id, false)?;
            println!("✓ {id} is off the panel.");
        }
        AgentsAction::Priority { id, priority } => {
            selection.set_priority(&agents, id, *priority)?;
            println!("✓ {id} now has priority {priority}.");
        }
        AgentsAction::Reset { id } => {
            if !agents.iter().any(|a| &a.id == id) {
                bail!("unknown agent: {id}");
            }
            selection.reset(id)?;
            println!("✓ {id} reset to defaults.");
        }
    }
    Ok(())
}

fn print_agents(selection: &AgentSelection, agents: &[Agent]) -> anyhow::Result<()> {
    let entries = selection.entries(agents)?;
    println!(
        "  {:<18} {:<18} {:<8} {:>8}  description",
        "id", "name", "enabled", "priority"
    );
    for (agent, entry) in agents.iter().zip(entries) {
        println!(
            "  {:<18} {:<18} {:<8} {:>8}  {}",
            agent.id,
            agent.display_name,
            if entry.enabled { "✓" } else { "✗" },
            entry.priority,
            agent.description
        );
    }
    Ok(())
}
