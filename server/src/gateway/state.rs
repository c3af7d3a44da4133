//! Gateway state

use std::sync::Arc;

use secrecy::SecretString;

use crate::deploy::dispatcher::Dispatcher;
use crate::deploy::executor::Orchestrator;
use crate::notifier::NotifierExt;
use crate::store::task_store::TaskStore;

/// State shared across gateway handlers
pub struct GatewayState {
    /// Shared secret checked against the request `secret` field
    pub shared_secret: SecretString,

    /// Repository owner, used to derive the predicted public URLs
    pub owner: String,

    pub store: Arc<TaskStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub orchestrator: Arc<Orchestrator>,
    pub notifier: Arc<dyn NotifierExt>,
}

impl GatewayState {
    pub fn new(
        shared_secret: SecretString,
        owner: String,
        store: Arc<TaskStore>,
        dispatcher: Arc<Dispatcher>,
        orchestrator: Arc<Orchestrator>,
        notifier: Arc<dyn NotifierExt>,
    ) -> Self {
        Self {
            shared_secret,
            owner,
            store,
            dispatcher,
            orchestrator,
            notifier,
        }
    }
}
