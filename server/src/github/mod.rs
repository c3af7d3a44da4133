//! Repository host adapter
//!
//! Ensures a remote repository reflects a set of named file contents and
//! exposes them through Pages hosting. Expected 404s surface as
//! [`EngineError::NotFound`] values so callers drive the create-or-update
//! and ensure-repository paths explicitly.

pub mod client;
pub mod license;

use async_trait::async_trait;

use crate::errors::EngineError;

/// A repository as reported by the host
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// `owner/name`
    pub full_name: String,

    /// Canonical web URL
    pub html_url: String,
}

/// Repository host trait for testability
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Look up the repository by name, creating it when absent
    async fn ensure_repo(&self, name: &str, description: &str)
        -> Result<RepoInfo, EngineError>;

    /// Create or update a text file
    async fn commit_text(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<(), EngineError>;

    /// Create or update a binary file
    async fn commit_bytes(
        &self,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> Result<(), EngineError>;

    /// Fetch a committed text file; `NotFound` when the path is absent
    async fn fetch_text(&self, repo: &str, path: &str) -> Result<String, EngineError>;

    /// Enable Pages hosting for the repository
    async fn activate_pages(&self, repo: &str) -> Result<(), EngineError>;

    /// SHA of the repository's latest commit
    async fn latest_commit_sha(&self, repo: &str) -> Result<String, EngineError>;

    /// Deterministic public hosting URL for the repository
    fn pages_url(&self, repo: &str) -> String;

    /// Deterministic web URL for the repository
    fn repo_url(&self, repo: &str) -> String;
}

/// Predicted public hosting URL for a task repository
pub fn derive_pages_url(owner: &str, repo: &str) -> String {
    format!("https://{}.github.io/{}/", owner, repo)
}

/// Predicted web URL for a task repository
pub fn derive_repo_url(owner: &str, repo: &str) -> String {
    format!("https://github.com/{}/{}", owner, repo)
}
