//! Core application logic and orchestration
//!
//! This module provides the main application structure that wires the
//! configuration, the catalog and the two LLM clients together.

mod agent;
mod events;

pub use agent::*;
pub use events::*;

use anyhow::Result;
use std::{path::{Path, PathBuf}, sync::Arc};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, error};

use crate::{
    catalog::{export_catalog, export_to_dir, Catalog},
    config::Config,
    llm::{LlmProvider, ProviderFactory},
    session::SessionController,
};

/// Main application structure
pub struct App {
    config: Config,
    catalog: Arc<Catalog>,
    llm_provider: Arc<dyn LlmProvider>,
    generation: GenerationClient,
    chat: ChatClient,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    event_rx: RwLock<Option<mpsc::UnboundedReceiver<AppEvent>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let llm_provider = ProviderFactory::create_provider(config.provider_config())?;
        llm_provider.validate_config()?;
        Ok(Self::with_provider(config, llm_provider))
    }

    /// Create an application around an existing provider
    pub fn with_provider(config: Config, llm_provider: Arc<dyn LlmProvider>) -> Self {
        debug!("Creating App with provider {}", llm_provider.name());

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let settings = config.model_settings();

        let generation = GenerationClient::new(llm_provider.clone(), settings.clone())
            .with_events(event_tx.clone());
        let chat = ChatClient::new(llm_provider.clone(), settings)
            .with_events(event_tx.clone());

        App {
            config,
            catalog: Arc::new(Catalog::builtin()),
            llm_provider,
            generation,
            chat,
            event_tx,
            event_rx: RwLock::new(Some(event_rx)),
            shutdown_tx: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Get the LLM provider
    pub fn llm_provider(&self) -> &Arc<dyn LlmProvider> {
        &self.llm_provider
    }

    pub fn generation_client(&self) -> &GenerationClient {
        &self.generation
    }

    pub fn chat_client(&self) -> &ChatClient {
        &self.chat
    }

    /// A fresh session over the built-in catalog
    pub fn new_session(&self) -> SessionController {
        SessionController::new(self.catalog.clone())
            .with_extended_reasoning(self.config.extended_reasoning)
    }

    /// Start the application event loop
    pub async fn start_event_loop(&mut self) -> Result<()> {
        let mut event_rx = self.event_rx.write().await.take()
            .ok_or_else(|| anyhow::anyhow!("Event loop already started"))?;

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = event_rx.recv() => {
                        Self::handle_event(event);
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Shutting down event loop");
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    /// Handle application events
    fn handle_event(event: AppEvent) {
        match event {
            AppEvent::GenerationStarted { request_id, model } => {
                info!("Generation {} started on {}", request_id, model);
            }
            AppEvent::GenerationCompleted { request_id, characters } => {
                info!("Generation {} completed ({} chars)", request_id, characters);
            }
            AppEvent::GenerationFailed { request_id, error } => {
                error!("Generation {} failed: {}", request_id, error);
            }
            AppEvent::StreamStarted { request_id, model } => {
                debug!("Stream {} started on {}", request_id, model);
            }
            AppEvent::StreamChunk { request_id, chunk } => {
                debug!("Stream {} chunk: {} bytes", request_id, chunk.len());
            }
            AppEvent::StreamEnded { request_id, fragments } => {
                info!("Stream {} ended after {} fragments", request_id, fragments);
            }
            AppEvent::StreamFailed { request_id, error } => {
                error!("Stream {} failed: {}", request_id, error);
            }
            AppEvent::CatalogExported { path } => {
                info!("Catalog exported to {}", path);
            }
            AppEvent::Error { error } => {
                error!("Application error: {}", error);
            }
            AppEvent::Shutdown => {
                info!("Application shutdown requested");
            }
        }
    }

    /// Run a single prompt non-interactively
    pub async fn run_non_interactive(&self, prompt: &str, extended_reasoning: bool) -> String {
        info!("Running non-interactive prompt");
        debug!("Prompt: {}", prompt);
        self.generation
            .generate(prompt, GenerationOptions::extended(extended_reasoning))
            .await
    }

    /// Export the catalog to `output`, or the configured export directory
    pub fn export(&self, output: Option<&Path>) -> Result<PathBuf> {
        let result = match output {
            Some(path) => export_catalog(&self.catalog, path),
            None => export_to_dir(&self.catalog, &self.config.export_dir),
        };
        match result {
            Ok(path) => {
                let _ = self.event_tx.send(AppEvent::CatalogExported {
                    path: path.display().to_string(),
                });
                Ok(path)
            }
            Err(e) => {
                let _ = self.event_tx.send(AppEvent::Error { error: e.to_string() });
                Err(e.into())
            }
        }
    }

    /// Shutdown the application gracefully
    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down application");
        let _ = self.event_tx.send(AppEvent::Shutdown);

        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(()).await;
        }

        Ok(())
    }
}
