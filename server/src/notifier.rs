//! Completion notification delivery
//!
//! Posts the notification payload to the caller-supplied evaluation
//! endpoint with bounded retries and exponential backoff. Delivery is
//! best-effort: callers observe only a boolean, never an error.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{error, info, warn};

use crate::errors::EngineError;
use crate::models::notification::NotificationPayload;
use crate::utils::{calc_exp_backoff, CooldownOptions};

/// Maximum delivery attempts per notification
pub const MAX_ATTEMPTS: u32 = 5;

/// Timeout for one delivery attempt
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Notifier trait for testability
#[async_trait]
pub trait NotifierExt: Send + Sync {
    /// Deliver the payload to the endpoint, true on success
    async fn notify(&self, endpoint: &str, payload: &NotificationPayload) -> bool;
}

/// HTTP notifier
pub struct Notifier {
    client: Client,
    cooldown: CooldownOptions,
}

impl Notifier {
    /// Create a new notifier
    pub fn new() -> Result<Self, EngineError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            cooldown: CooldownOptions::default(),
        })
    }
}

#[async_trait]
impl NotifierExt for Notifier {
    async fn notify(&self, endpoint: &str, payload: &NotificationPayload) -> bool {
        deliver(&self.client, endpoint, payload, &self.cooldown, |wait| {
            tokio::time::sleep(wait)
        })
        .await
    }
}

/// Deliver a payload with retries.
///
/// An empty endpoint succeeds trivially with no network action. Otherwise
/// up to [`MAX_ATTEMPTS`] POSTs are made; HTTP 200 ends the loop. Every
/// failed attempt sleeps the backoff delay (1, 2, 4, 8, 16s), including
/// the last one. The sleep is injected so tests can record the delays.
pub async fn deliver<S, F>(
    client: &Client,
    endpoint: &str,
    payload: &NotificationPayload,
    cooldown: &CooldownOptions,
    sleep_fn: S,
) -> bool
where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    if endpoint.is_empty() {
        warn!("No evaluation endpoint provided, skipping notification");
        return true;
    }

    for attempt in 0..MAX_ATTEMPTS {
        match client.post(endpoint).json(payload).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!("Evaluation endpoint notified successfully");
                return true;
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                warn!(
                    "Attempt {}: endpoint responded with {} - {}",
                    attempt + 1,
                    status,
                    body
                );
            }
            Err(e) => {
                error!("Attempt {} failed: {}", attempt + 1, e);
            }
        }

        sleep_fn(calc_exp_backoff(cooldown, attempt)).await;
    }

    error!("Failed to notify evaluation endpoint after {} attempts", MAX_ATTEMPTS);
    false
}
