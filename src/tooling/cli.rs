//! CLI Tooling
//!
//! Command-line interface over the agent registry and the handoff
//! orchestrator. Agents, handoff routes and the provider come from
//! configuration; each `run` opens a fresh session.

use crate::agent::{AgentCommandService, AgentListResult, AgentRegistry, AgentShowResult};
use crate::config::{ConfigLoader, ParleyConfig};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::orchestrator::{HandoffOrchestrator, RunSummary};
use crate::provider::CompletionProvider;
use crate::session::{ConversationEntry, ConversationSession, TerminationReason};
use crate::transcript::{TranscriptLine, TranscriptLog};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Parley CLI - turn-based conversations between configured agents
#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "Turn-based multi-agent conversations driven through a completion provider")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config file)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Apply logging flags on top of the configured logging section
    pub fn apply_log_overrides(&self, logging: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect configured agents
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Run a conversation between two or more agents
    Run {
        /// Participating agent, in speaking order (repeat for each participant)
        #[arg(long = "agent", required = true)]
        agents: Vec<String>,
        /// Maximum number of agent turns (defaults to orchestrator.max_turns)
        #[arg(long)]
        max_turns: Option<usize>,
        /// Write the transcript export to this file
        #[arg(long)]
        export: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Disable colored speaker names
        #[arg(long)]
        no_color: bool,
        /// Opening user message
        message: String,
    },
}

#[derive(Subcommand)]
pub enum AgentCommands {
    /// List configured agents
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one agent's instructions and handoff actions
    Show {
        /// Agent name
        name: String,
    },
}

/// CLI context: configuration, registry and a lazily built provider
pub struct CliContext {
    config: ParleyConfig,
    registry: AgentRegistry,
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl CliContext {
    /// Create a new CLI context from layered configuration
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Self::from_config(config)
    }

    /// Create a CLI context from an already loaded configuration
    pub fn from_config(config: ParleyConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let mut registry = AgentRegistry::new();
        registry.load_from_config(&config)?;
        Ok(Self {
            config,
            registry,
            provider: None,
        })
    }

    /// Use this provider instead of the configured one
    pub fn with_provider(mut self, provider: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(&self) -> &ParleyConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ParleyConfig {
        &mut self.config
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    fn provider(&self) -> Result<Arc<dyn CompletionProvider>, ApiError> {
        match &self.provider {
            Some(provider) => Ok(Arc::clone(provider)),
            None => Ok(Arc::new(self.config.provider.to_client()?)),
        }
    }

    /// Execute a CLI command, streaming conversation turns to stdout
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let mut stdout = std::io::stdout();
        self.execute_with_output(command, &mut stdout).await
    }

    /// Execute a CLI command.
    ///
    /// In text mode `run` writes each transcript line to `out` as the turn
    /// completes and returns only the closing summary.
    pub async fn execute_with_output<W: Write>(
        &self,
        command: &Commands,
        out: &mut W,
    ) -> Result<String, ApiError> {
        match command {
            Commands::Agents {
                command: AgentCommands::List { format },
            } => {
                let result = AgentCommandService::list(&self.registry);
                match format.as_str() {
                    "json" => format_agent_list_result_json(&result),
                    "text" => Ok(format_agent_list_result_text(&result)),
                    other => Err(invalid_format(other)),
                }
            }
            Commands::Agents {
                command: AgentCommands::Show { name },
            } => {
                let result = AgentCommandService::show(&self.registry, name)?;
                Ok(format_agent_show_result_text(&result))
            }
            Commands::Run {
                agents,
                max_turns,
                export,
                format,
                no_color,
                message,
            } => {
                if format != "text" && format != "json" {
                    return Err(invalid_format(format));
                }
                let participants = self.registry.select(agents)?;
                let max_turns = max_turns.unwrap_or(self.config.orchestrator.max_turns);

                let mut session = ConversationSession::new();
                session.start(participants, max_turns, message.clone())?;

                let orchestrator = HandoffOrchestrator::from_config(self.provider()?, &self.config);
                let stream = format == "text";
                let color = !no_color;
                if stream {
                    if let Some(first) = session.transcript().first() {
                        writeln!(out, "{}", format_entry(first, color))?;
                        out.flush()?;
                    }
                }

                let mut write_error: Option<std::io::Error> = None;
                let summary = orchestrator
                    .run_with_observer(&mut session, |entry: &ConversationEntry| {
                        if !stream || write_error.is_some() {
                            return;
                        }
                        let written = writeln!(out, "{}", format_entry(entry, color))
                            .and_then(|_| out.flush());
                        if let Err(e) = written {
                            write_error = Some(e);
                        }
                    })
                    .await?;

                if let Some(path) = export {
                    std::fs::write(path, TranscriptLog::serialize(&session) + "\n")?;
                    info!(path = %path.display(), "Transcript exported");
                }
                if let Some(e) = write_error {
                    return Err(e.into());
                }

                if !stream {
                    let mut report = TranscriptLog::to_json(&session);
                    report["summary"] = json!(summary);
                    return serde_json::to_string_pretty(&report)
                        .map_err(|e| ApiError::StorageError(e.to_string()));
                }

                Ok(format!("\n{}", format_run_summary(&summary)))
            }
        }
    }
}

fn invalid_format(format: &str) -> ApiError {
    ApiError::ConfigError(format!(
        "Invalid format: {} (must be 'text' or 'json')",
        format
    ))
}

fn format_entry(entry: &ConversationEntry, color: bool) -> String {
    let line = TranscriptLine {
        speaker: entry.speaker.to_string(),
        content: entry.content.clone(),
        timestamp: entry.timestamp,
    };
    if !color {
        return line.export_line();
    }
    let speaker = if entry.speaker.is_user() {
        line.speaker.green().bold().to_string()
    } else {
        line.speaker.cyan().bold().to_string()
    };
    format!("{}: {}", speaker, line.content)
}

fn format_run_summary(summary: &RunSummary) -> String {
    match &summary.reason {
        TerminationReason::ProviderError { message } => format!(
            "Stopped after {} turn(s): provider error: {}",
            summary.turns, message
        ),
        reason => format!("Finished after {} turn(s): {}", summary.turns, reason),
    }
}

/// Format agent list result as text
fn format_agent_list_result_text(result: &AgentListResult) -> String {
    if result.agents.is_empty() {
        return "No agents configured.\n\nAdd [[agents]] entries to your config file.".to_string();
    }
    use comfy_table::Table;
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Name", "Handoff actions"]);
    for item in &result.agents {
        let actions = if item.handoff_actions.is_empty() {
            "-".to_string()
        } else {
            item.handoff_actions.join(", ")
        };
        table.add_row(vec![item.name.clone(), actions]);
    }
    format!("{}\n\nTotal: {} agent(s)", table, result.agents.len())
}

/// Format agent list result as JSON
fn format_agent_list_result_json(result: &AgentListResult) -> Result<String, ApiError> {
    let out = json!({ "agents": result.agents, "total": result.agents.len() });
    serde_json::to_string_pretty(&out).map_err(|e| ApiError::StorageError(e.to_string()))
}

/// Format agent show result as text
fn format_agent_show_result_text(result: &AgentShowResult) -> String {
    let mut output = format!("Agent: {}\n", result.name);
    if !result.handoff_actions.is_empty() {
        output.push_str(&format!(
            "Handoff actions: {}\n",
            result.handoff_actions.join(", ")
        ));
    }
    output.push_str("\nInstructions:\n");
    output.push_str(&result.instructions);
    output
}
