//! Completed-task persistence

pub mod task_store;
