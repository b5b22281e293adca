use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

use crate::{app::App, config::Config};

/// Export the full catalog as JSON
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// JSON file, or a directory for the dated file name (defaults to the configured export directory)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl ExportCommand {
    pub fn execute(&self, config: &Config) -> Result<()> {
        debug!("Executing export command");
        let app = App::new(config.clone())?;
        let path = app.export(self.output.as_deref())?;
        println!("{}", path.display());
        Ok(())
    }
}
