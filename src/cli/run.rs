use anyhow::{anyhow, Result};
use clap::Args;
use std::io::{self, Read};
use tracing::{debug, info};

use crate::app::App;
use crate::config::Config;

/// Run a single prompt non-interactively
#[derive(Args)]
pub struct RunCommand {
    /// The prompt to run. If not provided, will read from stdin
    pub prompt: Vec<String>,

    /// Run the body of this catalog prompt instead
    #[arg(short = 'i', long = "item", value_name = "ID", conflicts_with = "prompt")]
    pub item: Option<String>,

    /// Print only the response
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl RunCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        debug!("Executing run command");

        let app = App::new(config.clone())?;
        let prompt = self.get_prompt(&app)?;

        if prompt.trim().is_empty() {
            return Err(anyhow!("No prompt provided. Use arguments, --item or pipe input via stdin."));
        }

        info!("Running prompt: {}", prompt.chars().take(50).collect::<String>());

        if !self.quiet {
            eprintln!(
                "Generating with {}{}...",
                app.llm_provider().name(),
                if config.extended_reasoning { " (extended reasoning)" } else { "" }
            );
        }

        let result = app.run_non_interactive(&prompt, config.extended_reasoning).await;
        println!("{}", result);

        Ok(())
    }

    fn get_prompt(&self, app: &App) -> Result<String> {
        if let Some(id) = &self.item {
            return app
                .catalog()
                .find_item(id)
                .map(|(_, item)| item.text.clone())
                .ok_or_else(|| anyhow!("No prompt with id '{}'", id));
        }

        if !self.prompt.is_empty() {
            // Join all arguments into a single prompt
            Ok(self.prompt.join(" "))
        } else {
            debug!("Reading prompt from stdin");
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)
                .map_err(|e| anyhow!("Failed to read from stdin: {}", e))?;
            Ok(buffer)
        }
    }
}
