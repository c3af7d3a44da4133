//! Completion notification models

use serde::{Deserialize, Serialize};

/// Completion payload delivered to the evaluation callback
///
/// Persisted verbatim as the canonical task record, so replays of the same
/// identity can reproduce it without recomputing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub email: String,

    pub task: String,

    pub round: u32,

    pub nonce: String,

    /// Canonical repository URL from the host
    pub repo_url: String,

    /// Latest commit SHA, `null` when it could not be resolved
    pub commit_sha: Option<String>,

    /// Public hosting URL, `null` when activation failed
    pub pages_url: Option<String>,
}
