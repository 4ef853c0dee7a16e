//! Per-file upload gates.
//!
//! Chunk uploads hold a file's gate shared; a merge holds it exclusively.
//! While a merge runs the file is sealed: new chunks wait until it is done,
//! and a second merge of the same file waits and then finds the artifact.
//! Gates only coordinate work inside this process; they carry no state.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::{Mutex, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

#[derive(Debug, Default)]
pub(crate) struct FileGates {
    gates: Mutex<HashMap<String, Weak<RwLock<()>>>>,
}

impl FileGates {
    async fn gate(&self, file_id: &str) -> Arc<RwLock<()>> {
        let mut gates = self.gates.lock().await;
        if let Some(gate) = gates.get(file_id).and_then(Weak::upgrade) {
            return gate;
        }
        // Drop gates nobody holds any more.
        gates.retain(|_, gate| gate.strong_count() > 0);
        let gate = Arc::new(RwLock::new(()));
        gates.insert(file_id.to_string(), Arc::downgrade(&gate));
        gate
    }

    /// Shared access for storing a chunk.
    pub async fn open(&self, file_id: &str) -> OwnedRwLockReadGuard<()> {
        self.gate(file_id).await.read_owned().await
    }

    /// Exclusive access for merging.
    pub async fn seal(&self, file_id: &str) -> OwnedRwLockWriteGuard<()> {
        self.gate(file_id).await.write_owned().await
    }

    #[cfg(test)]
    async fn live(&self) -> usize {
        let gates = self.gates.lock().await;
        gates.values().filter(|g| g.strong_count() > 0).count()
    }
}
