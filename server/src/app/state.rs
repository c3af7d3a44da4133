//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::deploy::dispatcher::Dispatcher;
use crate::deploy::executor::Orchestrator;
use crate::errors::EngineError;
use crate::gateway::state::GatewayState;
use crate::generator::client::AiPipeGenerator;
use crate::github::client::GitHubClient;
use crate::notifier::Notifier;
use crate::settings::Settings;
use crate::store::task_store::TaskStore;

/// Main application state
pub struct AppState {
    /// Loaded settings
    pub settings: Settings,

    /// Completed-task store
    pub store: Arc<TaskStore>,

    /// Background run dispatcher
    pub dispatcher: Arc<Dispatcher>,

    /// Deployment orchestrator
    pub orchestrator: Arc<Orchestrator>,

    /// Completion notifier
    pub notifier: Arc<Notifier>,
}

impl AppState {
    /// Initialize application state from settings
    pub async fn init(settings: Settings) -> Result<Self, EngineError> {
        info!("Initializing application state...");

        let store = Arc::new(TaskStore::open(&settings.store_path).await);
        let notifier = Arc::new(Notifier::new()?);
        let host = Arc::new(GitHubClient::new(&settings.github)?);
        let generator = Arc::new(AiPipeGenerator::new(&settings.generator)?);

        let orchestrator = Arc::new(Orchestrator::new(
            host,
            generator,
            notifier.clone(),
            store.clone(),
            settings.github.owner.clone(),
        ));
        let dispatcher = Arc::new(Dispatcher::new());

        Ok(Self {
            settings,
            store,
            dispatcher,
            orchestrator,
            notifier,
        })
    }

    /// Build the state shared with gateway handlers
    pub fn gateway_state(&self) -> GatewayState {
        GatewayState::new(
            self.settings.shared_secret.clone(),
            self.settings.github.owner.clone(),
            self.store.clone(),
            self.dispatcher.clone(),
            self.orchestrator.clone(),
            self.notifier.clone(),
        )
    }
}
