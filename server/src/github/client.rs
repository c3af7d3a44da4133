//! GitHub REST client

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{header, Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::EngineError;
use crate::github::{derive_pages_url, derive_repo_url, RepoInfo, RepositoryHost};
use crate::settings::GitHubSettings;

/// Timeout for one API call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("skydock/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct RepoReply {
    full_name: String,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ContentsReply {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct CommitReply {
    sha: String,
}

/// Repository host backed by the GitHub REST API
pub struct GitHubClient {
    client: Client,
    api_base: String,
    owner: String,
}

impl GitHubClient {
    /// Create a new client from settings
    pub fn new(settings: &GitHubSettings) -> Result<Self, EngineError> {
        let mut headers = header::HeaderMap::new();

        let mut auth = header::HeaderValue::from_str(&format!(
            "token {}",
            settings.token.expose_secret()
        ))
        .map_err(|e| EngineError::ConfigError(format!("Invalid GITHUB_TOKEN: {}", e)))?;
        auth.set_sensitive(true);

        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: settings.api_base.clone(),
            owner: settings.owner.clone(),
        })
    }

    fn repo_path(&self, repo: &str) -> String {
        format!("{}/repos/{}/{}", self.api_base, self.owner, repo)
    }

    /// Current blob SHA of a committed path, `None` when absent
    async fn file_sha(&self, repo: &str, path: &str) -> Result<Option<String>, EngineError> {
        match self.get_contents(repo, path).await {
            Ok(contents) => Ok(Some(contents.sha)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_contents(&self, repo: &str, path: &str) -> Result<ContentsReply, EngineError> {
        let url = format!("{}/contents/{}", self.repo_path(repo), path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(EngineError::NotFound(format!("{}/{}", repo, path)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::HostError(format!("{}: {}", status, body)));
        }

        Ok(response.json().await?)
    }

    /// Create-or-update commit through the contents API.
    ///
    /// A present path supplies its blob SHA and becomes an update; a 404
    /// becomes a create. The same policy serves text, binary, sidecar, and
    /// license commits.
    async fn commit_contents(
        &self,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), EngineError> {
        let sha = self.file_sha(repo, path).await?;

        let mut body = serde_json::json!({
            "message": message,
            "content": BASE64_STANDARD.encode(content),
        });
        if let Some(sha) = &sha {
            body["sha"] = serde_json::Value::String(sha.clone());
        }

        let url = format!("{}/contents/{}", self.repo_path(repo), path);
        debug!("PUT {}", url);

        let response = self.client.put(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::HostError(format!("{}: {}", status, body)));
        }

        match sha {
            Some(_) => info!("Updated {} in {}/{}", path, self.owner, repo),
            None => info!("Created {} in {}/{}", path, self.owner, repo),
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn ensure_repo(
        &self,
        name: &str,
        description: &str,
    ) -> Result<RepoInfo, EngineError> {
        let url = self.repo_path(name);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.is_success() {
            let repo: RepoReply = response.json().await?;
            info!("Repository already exists: {}", repo.full_name);
            return Ok(RepoInfo {
                full_name: repo.full_name,
                html_url: repo.html_url,
            });
        }
        if status != StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::HostError(format!("{}: {}", status, body)));
        }

        let create_url = format!("{}/user/repos", self.api_base);
        debug!("POST {}", create_url);

        let body = serde_json::json!({
            "name": name,
            "description": description,
            "private": false,
            "auto_init": false,
        });

        let response = self.client.post(&create_url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::HostError(format!("{}: {}", status, body)));
        }

        let repo: RepoReply = response.json().await?;
        info!("Repository created: {}", repo.full_name);
        Ok(RepoInfo {
            full_name: repo.full_name,
            html_url: repo.html_url,
        })
    }

    async fn commit_text(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), EngineError> {
        self.commit_contents(repo, path, content.as_bytes(), message).await
    }

    async fn commit_bytes(
        &self,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), EngineError> {
        self.commit_contents(repo, path, content, message).await
    }

    async fn fetch_text(&self, repo: &str, path: &str) -> Result<String, EngineError> {
        let contents = self.get_contents(repo, path).await?;

        // The contents API wraps base64 at 60 columns
        let packed: String = contents
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = BASE64_STANDARD
            .decode(packed)
            .map_err(|e| EngineError::HostError(format!("invalid contents payload: {}", e)))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn activate_pages(&self, repo: &str) -> Result<(), EngineError> {
        let url = format!("{}/pages", self.repo_path(repo));
        debug!("POST {}", url);

        let body = serde_json::json!({
            "source": {"branch": "main", "path": "/"},
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if status == StatusCode::CREATED || status == StatusCode::NO_CONTENT {
            info!("Pages hosting activated for {}", repo);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(EngineError::HostError(format!(
            "Pages activation failed: {}: {}",
            status, body
        )))
    }

    async fn latest_commit_sha(&self, repo: &str) -> Result<String, EngineError> {
        let url = format!("{}/commits?per_page=1", self.repo_path(repo));
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::HostError(format!("{}: {}", status, body)));
        }

        let commits: Vec<CommitReply> = response.json().await?;
        commits
            .into_iter()
            .next()
            .map(|commit| commit.sha)
            .ok_or_else(|| EngineError::NotFound(format!("{} has no commits", repo)))
    }

    fn pages_url(&self, repo: &str) -> String {
        derive_pages_url(&self.owner, repo)
    }

    fn repo_url(&self, repo: &str) -> String {
        derive_repo_url(&self.owner, repo)
    }
}
