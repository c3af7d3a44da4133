//! Completed-task store
//!
//! One JSON file mapping `email::task::round<R>::nonce<N>` identity keys to
//! the notification payload persisted when the task finished. The map is
//! loaded once at startup and held in memory behind a single async lock, so
//! concurrent upserts serialize instead of racing on the file.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::EngineError;
use crate::filesys::file::File;
use crate::models::notification::NotificationPayload;

/// Dedup store for completed deployment tasks
pub struct TaskStore {
    file: File,
    records: Mutex<HashMap<String, NotificationPayload>>,
}

impl TaskStore {
    /// Open the store backed by the given file.
    ///
    /// A missing or unreadable file is an empty store, never an error.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let file = File::new(path);

        let records = if file.exists().await {
            match file.read_json::<HashMap<String, NotificationPayload>>().await {
                Ok(map) => {
                    info!("Loaded {} completed task(s) from {:?}", map.len(), file.path());
                    map
                }
                Err(e) => {
                    warn!("Task store {:?} unreadable, starting empty: {}", file.path(), e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Self {
            file,
            records: Mutex::new(records),
        }
    }

    /// Look up the canonical record for an identity key
    pub async fn lookup(&self, key: &str) -> Option<NotificationPayload> {
        let records = self.records.lock().await;
        records.get(key).cloned()
    }

    /// Insert or replace the record for an identity key and persist.
    ///
    /// The file is rewritten atomically while the lock is held, so a
    /// concurrent lookup never observes a partial write.
    pub async fn upsert(
        &self,
        key: &str,
        record: NotificationPayload,
    ) -> Result<(), EngineError> {
        let mut records = self.records.lock().await;
        records.insert(key.to_string(), record);

        let contents = serde_json::to_vec_pretty(&*records)?;
        self.file.write_atomic(&contents).await?;

        Ok(())
    }

    /// Number of completed tasks on record
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
