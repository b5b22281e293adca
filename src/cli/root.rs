use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::{app::App, config::Config, tui::{self, ThemeMode}};
use super::{
    catalog::{ListCommand, SearchCommand, ShowCommand},
    chat::ChatCommand,
    completions::CompletionsCommand,
    export::ExportCommand,
    run::RunCommand,
};

/// PM Genius - project management prompt library with a Gemini playground
#[derive(Parser)]
#[command(
    name = "pm-genius",
    version,
    about = "Project management prompt library with a Gemini playground",
    long_about = r#"PM Genius is a browsable catalog of project-management prompt templates
(Waterfall, Agile, SAFe, team roles, Jira) with a playground that sends a prompt
to Google Gemini and a streaming chat mode.

Set GEMINI_API_KEY to get real responses; without it replies are simulated.

Examples:
  pm-genius                          # Browse the catalog interactively
  pm-genius search sprint            # Find prompts mentioning "sprint"
  pm-genius run --item wf-1          # Run a catalog prompt once
  pm-genius run "draft a charter"    # Run a custom prompt
  pm-genius chat --extended          # Chat with the reasoning model"#
)]
pub struct Cli {
    /// Current working directory
    #[arg(short = 'c', long = "cwd", global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Read configuration from this file instead of the default locations
    #[arg(long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Theme for the interactive UI
    #[arg(long = "theme", global = true, value_enum)]
    pub theme: Option<ThemeMode>,

    /// Use the reasoning model with an extended thinking budget
    #[arg(short = 'e', long = "extended", global = true)]
    pub extended: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single prompt non-interactively
    Run(RunCommand),
    /// Chat with the model in the terminal
    Chat(ChatCommand),
    /// List catalog sections and prompts
    List(ListCommand),
    /// Search the catalog
    Search(SearchCommand),
    /// Show one prompt
    Show(ShowCommand),
    /// Export the catalog as JSON
    Export(ExportCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Whether this invocation starts the full-screen UI
    pub fn is_interactive(&self) -> bool {
        self.command.is_none()
    }

    /// Change directory if requested and load the layered configuration,
    /// with command-line flags applied last
    pub async fn load_config(&self) -> Result<Config> {
        if let Some(cwd) = &self.cwd {
            std::env::set_current_dir(cwd)
                .map_err(|e| anyhow::anyhow!("Failed to change directory to {}: {}", cwd.display(), e))?;
        }

        let mut config = Config::init(self.config.as_deref()).await?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(theme) = self.theme {
            config.theme = theme.name().to_string();
        }
        if self.extended {
            config.extended_reasoning = true;
        }
    }

    pub async fn execute(self, config: Config) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }
        if let Some(cwd) = &self.cwd {
            info!("Working directory: {}", cwd.display());
        }

        config.validate()?;
        debug!("Configuration initialized");

        match self.command {
            Some(Commands::Run(cmd)) => cmd.execute(&config).await,
            Some(Commands::Chat(cmd)) => cmd.execute(&config).await,
            Some(Commands::List(cmd)) => cmd.execute(),
            Some(Commands::Search(cmd)) => cmd.execute(),
            Some(Commands::Show(cmd)) => cmd.execute(),
            Some(Commands::Export(cmd)) => cmd.execute(&config),
            Some(Commands::Completions(cmd)) => cmd.execute(),
            None => Self::start_interactive_mode(config).await,
        }
    }

    async fn start_interactive_mode(config: Config) -> Result<()> {
        info!("Starting interactive mode");

        let mut app = App::new(config)?;
        app.start_event_loop().await?;

        let result = tui::run(&app).await;

        app.shutdown().await?;
        info!("Application finished");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["pm-genius", "run", "--item", "wf-1", "--extended", "--theme", "high-contrast"]).unwrap();
        assert!(cli.extended);
        assert_eq!(cli.theme, Some(ThemeMode::HighContrast));
        assert!(!cli.is_interactive());
    }

    #[test]
    fn test_overrides_applied_last() {
        let cli = Cli::try_parse_from(["pm-genius", "--theme", "neon", "-e"]).unwrap();
        assert!(cli.is_interactive());

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.theme, "neon");
        assert!(config.extended_reasoning);
    }
}
