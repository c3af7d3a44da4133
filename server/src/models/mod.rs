//! Data models

pub mod artifact;
pub mod notification;
pub mod request;
