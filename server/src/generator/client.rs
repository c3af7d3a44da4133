//! AIPipe generation client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::errors::EngineError;
use crate::generator::prompt::{build_prompt, split_reply, SYSTEM_MESSAGE};
use crate::generator::{ContentGenerator, GenerationContext};
use crate::models::artifact::GeneratedArtifact;
use crate::settings::GeneratorSettings;

/// Timeout for one generation call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Reply of the responses endpoint, reduced to the pieces we read.
/// Missing pieces degrade to empty content, not deserialization errors.
#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<ReplyOutput>,
}

#[derive(Debug, Deserialize)]
struct ReplyOutput {
    #[serde(default)]
    content: Vec<ReplyContent>,
}

#[derive(Debug, Deserialize)]
struct ReplyContent {
    #[serde(default)]
    text: String,
}

impl ResponsesReply {
    fn into_text(self) -> String {
        self.output
            .into_iter()
            .next()
            .and_then(|output| output.content.into_iter().next())
            .map(|content| content.text)
            .unwrap_or_default()
    }
}

/// Content generator backed by the AIPipe responses endpoint
pub struct AiPipeGenerator {
    client: Client,
    base_url: String,
    token: SecretString,
    model: String,
}

impl AiPipeGenerator {
    /// Create a new generator client
    pub fn new(settings: &GeneratorSettings) -> Result<Self, EngineError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            token: settings.token.clone(),
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl ContentGenerator for AiPipeGenerator {
    async fn generate(
        &self,
        context: &GenerationContext,
    ) -> Result<GeneratedArtifact, EngineError> {
        let url = format!("{}/responses", self.base_url);
        debug!("POST {} (generation, round {})", url, context.round);

        let body = serde_json::json!({
            "model": self.model,
            "input": [
                {"role": "system", "content": SYSTEM_MESSAGE},
                {"role": "user", "content": build_prompt(context)},
            ],
        });

        let response = self
            .client
            .post(&url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Generation API failed: {} - {}", status, body);
            return Err(EngineError::GenerationError(format!(
                "{}: {}",
                status, body
            )));
        }

        let reply: ResponsesReply = response.json().await?;
        info!("AI application generated successfully");

        Ok(split_reply(&reply.into_text(), context))
    }
}
