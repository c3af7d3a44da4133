//! Deployment run executor
//!
//! Drives one deployment task end to end: attachment staging, content
//! generation, repository sync, hosting, notification, and the terminal
//! task-store write. Once a run is dispatched nothing aborts it; every
//! failure degrades into a partial or fallback result so the store write
//! is always reached.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::attachments::{is_text_like, process_attachments, summarize_attachments};
use crate::deploy::phase::DeployPhase;
use crate::errors::EngineError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;
use crate::generator::{fallback, ContentGenerator, GenerationContext};
use crate::github::license::generate_license;
use crate::github::RepositoryHost;
use crate::models::artifact::{ProcessedAttachment, DOCUMENTATION_FILE};
use crate::models::notification::NotificationPayload;
use crate::models::request::DeployRequest;
use crate::notifier::NotifierExt;
use crate::store::task_store::TaskStore;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

/// Orchestrator for deployment runs
pub struct Orchestrator {
    host: Arc<dyn RepositoryHost>,
    generator: Arc<dyn ContentGenerator>,
    notifier: Arc<dyn NotifierExt>,
    store: Arc<TaskStore>,
    owner: String,
}

impl Orchestrator {
    pub fn new(
        host: Arc<dyn RepositoryHost>,
        generator: Arc<dyn ContentGenerator>,
        notifier: Arc<dyn NotifierExt>,
        store: Arc<TaskStore>,
        owner: String,
    ) -> Self {
        Self {
            host,
            generator,
            notifier,
            store,
            owner,
        }
    }

    /// Execute one deployment run to completion.
    ///
    /// Returns the payload that was persisted, mostly for tests; the run
    /// itself reports through the notifier and the task store.
    pub async fn run(&self, request: DeployRequest) -> NotificationPayload {
        let phase = DeployPhase::from_round(request.round);
        info!(
            "Initiating deployment for project {} (iteration {})",
            request.task, request.round
        );

        // 1. Stage attachments
        let staging = match Dir::create_temp_dir("skydock-attachments").await {
            Ok(dir) => Some(dir),
            Err(e) => {
                warn!("Failed to create attachment staging dir: {}", e);
                None
            }
        };
        let processed = match &staging {
            Some(dir) => process_attachments(&request.attachments, dir).await,
            None => Vec::new(),
        };
        let attachment_summary = summarize_attachments(&processed).await;

        // 2. Prior documentation, Enhance only, best-effort
        let prior_docs = if phase == DeployPhase::Enhance {
            match self.host.fetch_text(&request.task, DOCUMENTATION_FILE).await {
                Ok(docs) => {
                    info!("Retrieved existing documentation for enhancement");
                    Some(docs)
                }
                Err(e) if e.is_not_found() => None,
                Err(e) => {
                    warn!("Failed to fetch prior documentation: {}", e);
                    None
                }
            }
        } else {
            None
        };

        // 3. Generate, falling back to local synthesis
        let context = GenerationContext {
            task: request.task.clone(),
            brief: request.brief.clone(),
            checks: request.checks.clone(),
            attachment_summary,
            round: request.round,
            prior_docs,
        };
        let artifact = match self.generator.generate(&context).await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!("Generator unavailable, using fallback: {}", e);
                fallback::synthesize(&context)
            }
        };

        // 4. Ensure the repository exists
        let description = format!("Auto-deployed solution: {}", request.brief);
        let repo_url = match self.host.ensure_repo(&request.task, &description).await {
            Ok(repo) => repo.html_url,
            Err(e) => {
                // Keep going so the run still reaches its store write;
                // the per-file commits below will log their own failures.
                error!("Failed to ensure repository {}: {}", request.task, e);
                self.host.repo_url(&request.task)
            }
        };

        // 5. Create only: publish each attachment independently
        if phase == DeployPhase::Create {
            info!("Initial deployment: setting up fresh repository");
            for item in &processed {
                if let Err(e) = self.publish_attachment(&request.task, item).await {
                    warn!("Asset deployment failed for {}: {}", item.name, e);
                }
            }
        } else {
            info!("Enhancement deployment: updating existing repository");
            for (path, content) in &artifact.files {
                let message = format!("Enhance {} - iteration {}", path, request.round);
                if let Err(e) = self
                    .host
                    .commit_text(&request.task, path, content, &message)
                    .await
                {
                    warn!("Failed to commit {}: {}", path, e);
                }
            }
        }

        // 6. Both phases: generated files, then the license
        for (path, content) in &artifact.files {
            let message = format!("Deploy {}", path);
            if let Err(e) = self
                .host
                .commit_text(&request.task, path, content, &message)
                .await
            {
                warn!("Failed to commit {}: {}", path, e);
            }
        }

        let license = generate_license(&self.owner);
        if let Err(e) = self
            .host
            .commit_text(&request.task, "LICENSE", &license, "Add MIT license")
            .await
        {
            warn!("Failed to commit LICENSE: {}", e);
        }

        // 7. Hosting: activate on Create, derive on Enhance
        let pages_url = match phase {
            DeployPhase::Create => match self.host.activate_pages(&request.task).await {
                Ok(()) => Some(self.host.pages_url(&request.task)),
                Err(e) => {
                    warn!("Pages activation failed for {}: {}", request.task, e);
                    None
                }
            },
            DeployPhase::Enhance => Some(self.host.pages_url(&request.task)),
        };

        // 8. Latest commit SHA, best-effort
        let commit_sha = match self.host.latest_commit_sha(&request.task).await {
            Ok(sha) => Some(sha),
            Err(e) => {
                warn!("Could not resolve latest commit for {}: {}", request.task, e);
                None
            }
        };

        // 9. Notify, then persist regardless of the outcome
        let payload = NotificationPayload {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            repo_url,
            commit_sha,
            pages_url,
        };

        if let Some(endpoint) = &request.evaluation_url {
            if !self.notifier.notify(endpoint, &payload).await {
                error!("Evaluation notification failed for {}", request.task);
            }
        }

        if let Err(e) = self.store.upsert(&request.identity_key(), payload.clone()).await {
            error!("Failed to persist task record for {}: {}", request.task, e);
        }

        if let Some(dir) = staging {
            if let Err(e) = dir.delete().await {
                warn!("Failed to clean staging dir: {}", e);
            }
        }

        info!(
            "Deployment completed for iteration {} of {}",
            request.round, request.task
        );
        payload
    }

    /// Publish one staged attachment.
    ///
    /// Text-like attachments commit as lossy UTF-8. Everything else commits
    /// as binary plus a base64 sidecar under `assets/`, redundancy against
    /// hosts that mishandle binary commits.
    async fn publish_attachment(
        &self,
        repo: &str,
        item: &ProcessedAttachment,
    ) -> Result<(), EngineError> {
        let bytes = File::new(&item.storage_path).read_bytes().await?;

        if is_text_like(&item.mime, &item.name) {
            let text = String::from_utf8_lossy(&bytes);
            let message = format!("Deploy asset {}", item.name);
            self.host.commit_text(repo, &item.name, &text, &message).await
        } else {
            let message = format!("Deploy binary {}", item.name);
            self.host
                .commit_bytes(repo, &item.name, &bytes, &message)
                .await?;

            let sidecar_path = format!("assets/{}.encoded", item.name);
            let encoded = BASE64_STANDARD.encode(&bytes);
            let message = format!("Backup {}", item.name);
            self.host
                .commit_text(repo, &sidecar_path, &encoded, &message)
                .await
        }
    }
}
