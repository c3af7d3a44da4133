//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::{AppOptions, LifecycleOptions};
use crate::app::state::AppState;
use crate::deploy::dispatcher::Dispatcher;
use crate::errors::EngineError;
use crate::gateway::serve::serve;
use crate::settings::Settings;

/// Run the skydock service
pub async fn run(
    version: String,
    settings: Settings,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), EngineError> {
    info!("Initializing skydock v{}...", version);

    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(options.lifecycle.clone());

    // Initialize the app state and serve the gateway
    if let Err(e) = init(&options, settings, &shutdown_tx, &mut shutdown_manager).await {
        error!("Failed to start service: {}", e);
        let _ = shutdown_tx.send(());
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    let _ = shutdown_tx.send(());
    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

async fn init(
    options: &AppOptions,
    settings: Settings,
    shutdown_tx: &broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), EngineError> {
    let app_state = AppState::init(settings).await?;
    let dispatcher = app_state.dispatcher.clone();
    let gateway_state = Arc::new(app_state.gateway_state());

    let mut shutdown_rx = shutdown_tx.subscribe();
    let server_handle = serve(&options.server, gateway_state, async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_server_handle(server_handle)?;
    shutdown_manager.with_dispatcher(dispatcher)?;
    Ok(())
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    lifecycle_options: LifecycleOptions,
    server_handle: Option<JoinHandle<Result<(), EngineError>>>,
    dispatcher: Option<Arc<Dispatcher>>,
}

impl ShutdownManager {
    pub fn new(lifecycle_options: LifecycleOptions) -> Self {
        Self {
            lifecycle_options,
            server_handle: None,
            dispatcher: None,
        }
    }

    pub fn with_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), EngineError>>,
    ) -> Result<(), EngineError> {
        if self.server_handle.is_some() {
            return Err(EngineError::ShutdownError("server_handle already set".to_string()));
        }
        self.server_handle = Some(handle);
        Ok(())
    }

    pub fn with_dispatcher(&mut self, dispatcher: Arc<Dispatcher>) -> Result<(), EngineError> {
        if self.dispatcher.is_some() {
            return Err(EngineError::ShutdownError("dispatcher already set".to_string()));
        }
        self.dispatcher = Some(dispatcher);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), EngineError> {
        match tokio::time::timeout(
            self.lifecycle_options.max_shutdown_delay,
            self.shutdown_impl(),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.lifecycle_options.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), EngineError> {
        info!("Shutting down skydock...");

        // 1. In-flight orchestration runs: every dispatched run reaches its
        //    store write before the process exits.
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.drain().await;
        }

        // 2. HTTP server
        if let Some(handle) = self.server_handle.take() {
            handle
                .await
                .map_err(|e| EngineError::ShutdownError(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
