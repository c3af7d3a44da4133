//! Background run dispatcher
//!
//! Fire-and-forget from the caller's perspective, but every spawned run is
//! tracked so graceful shutdown can drain in-flight orchestrations instead
//! of dropping them mid-write.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::deploy::executor::Orchestrator;
use crate::models::request::DeployRequest;

/// Tracks spawned orchestration runs
pub struct Dispatcher {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Spawn an orchestration run for an accepted request.
    ///
    /// Returns as soon as the task is spawned; finished handles are pruned
    /// opportunistically so the tracking list does not grow unbounded.
    pub async fn dispatch(&self, orchestrator: Arc<Orchestrator>, request: DeployRequest) {
        let handle = tokio::spawn(async move {
            orchestrator.run(request).await;
        });

        let mut handles = self.handles.lock().await;
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
    }

    /// Number of tracked runs that have not finished
    pub async fn in_flight(&self) -> usize {
        let handles = self.handles.lock().await;
        handles.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait for every tracked run to finish
    pub async fn drain(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut guard = self.handles.lock().await;
            guard.drain(..).collect()
        };

        if handles.is_empty() {
            return;
        }

        info!("Draining {} in-flight orchestration run(s)...", handles.len());
        for result in join_all(handles).await {
            if let Err(e) = result {
                error!("Orchestration task panicked: {}", e);
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
