//! Deployment orchestration

pub mod dispatcher;
pub mod executor;
pub mod phase;
