//! Deployment request models

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Nonce used when the caller does not supply one
pub const DEFAULT_NONCE: &str = "default-nonce";

/// An attachment reference carried inline in the request
///
/// `url` is a self-contained `data:<mime>;base64,<payload>` URL, never a
/// network location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRef {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub url: String,
}

/// Raw wire payload of the deploy endpoint
///
/// Every field is optional at this layer so malformed callers get a
/// field-specific rejection instead of a deserialization failure.
/// [`RawDeployRequest::validate`] promotes the payload into a typed
/// [`DeployRequest`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDeployRequest {
    pub email: Option<String>,

    pub task: Option<String>,

    pub round: Option<u32>,

    pub brief: Option<String>,

    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,

    #[serde(default)]
    pub checks: Vec<String>,

    pub nonce: Option<String>,

    pub evaluation_url: Option<String>,

    pub secret: Option<String>,
}

impl RawDeployRequest {
    /// Promote the raw payload into a typed request.
    ///
    /// Required fields are checked in a fixed order (`email`, `task`,
    /// `round`) so the first missing one names the rejection. Optional
    /// fields fall back to their documented defaults.
    pub fn validate(self) -> Result<DeployRequest, EngineError> {
        let email = self.email.ok_or_else(|| missing_field("email"))?;
        let task = self.task.ok_or_else(|| missing_field("task"))?;
        let round = self.round.ok_or_else(|| missing_field("round"))?;

        Ok(DeployRequest {
            email,
            task,
            round,
            brief: self.brief.unwrap_or_default(),
            attachments: self.attachments,
            checks: self.checks,
            nonce: self.nonce.unwrap_or_else(|| DEFAULT_NONCE.to_string()),
            evaluation_url: self.evaluation_url,
        })
    }
}

fn missing_field(field: &str) -> EngineError {
    EngineError::ValidationError(format!("Missing required field: {}", field))
}

/// A validated deployment request
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// Requesting caller
    pub email: String,

    /// Task identifier, doubles as the repository name
    pub task: String,

    /// Iteration counter, 1-based
    pub round: u32,

    /// Project brief driving generation
    pub brief: String,

    /// Inline attachments
    pub attachments: Vec<AttachmentRef>,

    /// Validation criteria passed through to generation
    pub checks: Vec<String>,

    /// Dedup nonce
    pub nonce: String,

    /// Completion callback endpoint, when the caller wants one
    pub evaluation_url: Option<String>,
}

impl DeployRequest {
    /// Composite dedup identity: `email::task::round<R>::nonce<N>`
    pub fn identity_key(&self) -> String {
        format!(
            "{}::{}::round{}::nonce{}",
            self.email, self.task, self.round, self.nonce
        )
    }
}
