//! Skydock Library
//!
//! Deployment orchestration service for AI-generated web projects: accepts
//! deploy requests, generates project files through a content-generation
//! collaborator, publishes them to GitHub with Pages hosting, and notifies
//! the caller when done.

pub mod app;
pub mod attachments;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod gateway;
pub mod generator;
pub mod github;
pub mod logs;
pub mod models;
pub mod notifier;
pub mod settings;
pub mod store;
pub mod utils;
