//! Generated artifact and processed attachment models

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Relative path of the generated entry point file
pub const ENTRY_POINT_FILE: &str = "index.html";

/// Relative path of the generated documentation file
pub const DOCUMENTATION_FILE: &str = "README.md";

/// A decoded attachment staged on local disk
///
/// Produced once per accepted request and discarded with the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedAttachment {
    /// Original attachment name, doubles as the repository path
    pub name: String,

    /// Staged location on local disk
    pub storage_path: PathBuf,

    /// Declared mime type from the data URL header
    pub mime: String,

    /// Decoded size in bytes
    pub size: u64,
}

/// Generated project files keyed by relative path
///
/// Always contains at least the entry point and the documentation file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub files: BTreeMap<String, String>,
}

impl GeneratedArtifact {
    /// Build an artifact from the two mandatory parts
    pub fn new(application_code: String, documentation: String) -> Self {
        let mut files = BTreeMap::new();
        files.insert(ENTRY_POINT_FILE.to_string(), application_code);
        files.insert(DOCUMENTATION_FILE.to_string(), documentation);
        Self { files }
    }

    /// Entry point content, empty when absent
    pub fn entry_point(&self) -> &str {
        self.files
            .get(ENTRY_POINT_FILE)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Documentation content, empty when absent
    pub fn documentation(&self) -> &str {
        self.files
            .get(DOCUMENTATION_FILE)
            .map(String::as_str)
            .unwrap_or_default()
    }
}
