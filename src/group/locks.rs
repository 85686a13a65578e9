// ABOUTME: Per-project async mutexes serializing Create and Remove.
// ABOUTME: Requests for different projects never wait on each other.

use crate::types::ProjectName;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

#[derive(Debug, Default)]
pub struct ProjectLocks {
    locks: Mutex<HashMap<ProjectName, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProjectLocks {
    /// Wait for exclusive access to `project`.
    pub async fn lock(&self, project: &ProjectName) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            // Drop entries nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(project.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
