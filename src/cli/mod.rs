//! CLI module for the devtel-server binary
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use crate::agents::definitions::AGENTS;
use crate::types::ProviderStatus;
use clap::{Parser, Subcommand};
use output::Output;
use std::path::PathBuf;

/// DevTel Agents - chat orchestrator and AI workflow service
#[derive(Parser, Debug)]
#[command(
    name = "devtel-server",
    version,
    about = "DevTel AI agents and workflows",
    long_about = "Serves the DevTel chat orchestrator (intent-routed agent personas with backend tools)\n\
                  and the AI workflow service (prioritize, sprint planning, breakdown, assignee, PRD).\n\n\
                  Run without arguments to start the chat orchestrator.",
    after_help = "EXAMPLES:\n    \
                  devtel-server                       # Start the chat orchestrator on CHAT_PORT\n    \
                  devtel-server workflows --port 9001 # Start the workflow service\n    \
                  devtel-server providers             # Show which LLM provider would be used\n    \
                  devtel-server --config devtel.toml  # Use a custom config file"
)]
pub struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the chat orchestrator (default)
    Chat {
        /// Port to listen on (defaults to CHAT_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Serve the AI workflow service
    Workflows {
        /// Port to listen on (defaults to WORKFLOW_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the provider cascade status
    Providers,

    /// List the agent personas
    Agents,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subcommand to run, with `chat` when none was given
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Chat { port: None })
    }

    pub fn output(&self) -> Output {
        if self.no_color {
            Output::no_color()
        } else {
            Output::new()
        }
    }
}

/// Print the cascade in order, marking the provider that would be used
pub fn print_providers(output: &Output, statuses: &[ProviderStatus], active: Option<&str>) {
    output.header("LLM Providers");
    output.table_header(&["Provider", "Model", "Status"]);
    for status in statuses {
        let state = match (active == Some(status.id.as_str()), status.configured) {
            (true, _) => "active",
            (false, true) => "available",
            (false, false) => "not configured",
        };
        output.table_row(&[&status.name, &status.model, state]);
    }

    match active {
        Some(id) => output.success(&format!("Requests will be served by {}", id)),
        None => {
            output.warning("No provider is available");
            output.hint("Start Ollama or set one of the *_API_KEY variables");
        }
    }
}

pub fn print_agents(output: &Output) {
    output.header("Agents");
    for agent in AGENTS.iter() {
        output.subheader(agent.name);
        output.kv("id", agent.id);
        output.kv("role", agent.role);
        output.kv("temperature", &agent.temperature.to_string());
        output.kv("tools", &agent.tools.len().to_string());
        for tool in agent.tools {
            output.list_item(tool);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_chat() {
        let cli = Cli::try_parse_from(["devtel-server"]).unwrap();
        assert_eq!(cli.command(), Commands::Chat { port: None });
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_workflows_port_and_global_flags() {
        let cli = Cli::try_parse_from([
            "devtel-server",
            "workflows",
            "--port",
            "9001",
            "--no-color",
            "--config",
            "devtel.toml",
        ])
        .unwrap();
        assert_eq!(cli.command(), Commands::Workflows { port: Some(9001) });
        assert!(cli.no_color);
        assert_eq!(cli.config, Some(PathBuf::from("devtel.toml")));
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["devtel-server", "deploy"]).is_err());
    }

    #[test]
    fn test_print_helpers_do_not_panic() {
        let output = Output::no_color();
        print_agents(&output);
        let statuses = vec![ProviderStatus {
            id: "ollama".to_string(),
            name: "Ollama".to_string(),
            model: "llama3.2:3b".to_string(),
            configured: false,
            local: true,
        }];
        print_providers(&output, &statuses, None);
        print_providers(&output, &statuses, Some("ollama"));
    }
}
