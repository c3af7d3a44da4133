//! Deployment phase

/// What a round does to the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    /// Round 1: create the repository, publish attachments, activate Pages
    Create,

    /// Round 2+: enhance the existing repository, Pages already active
    Enhance,
}

impl DeployPhase {
    /// Map an iteration counter onto its phase
    pub fn from_round(round: u32) -> Self {
        if round <= 1 {
            DeployPhase::Create
        } else {
            DeployPhase::Enhance
        }
    }
}
