//! Content generator adapter
//!
//! Turns a project brief plus context into generated project files. The
//! HTTP client lives in [`client`], prompt assembly and reply parsing in
//! [`prompt`], and the locally synthesized fallback in [`fallback`].

pub mod client;
pub mod fallback;
pub mod prompt;

use async_trait::async_trait;

use crate::errors::EngineError;
use crate::models::artifact::GeneratedArtifact;

/// Everything the generator needs to produce one artifact set
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Task identifier, used to title fallback pages
    pub task: String,

    /// Project brief
    pub brief: String,

    /// Validation criteria
    pub checks: Vec<String>,

    /// One summary line per staged attachment
    pub attachment_summary: String,

    /// Iteration counter, 1-based
    pub round: u32,

    /// Prior documentation fetched from the repository, Enhance rounds only
    pub prior_docs: Option<String>,
}

/// Content generator trait for testability
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate the project files for one deployment round
    async fn generate(&self, context: &GenerationContext)
        -> Result<GeneratedArtifact, EngineError>;
}
