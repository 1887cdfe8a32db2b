//! Background snapshot writer
//!
//! At most one write is in flight. Snapshots submitted while a write is
//! running replace each other, so only the newest one is written next and
//! the queue never grows past a single pending snapshot.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::KeyValueStore;

#[derive(Clone)]
struct Snapshot {
    generation: u64,
    json: Arc<str>,
}

pub struct Persister {
    snapshots: watch::Sender<Option<Snapshot>>,
    settled: watch::Receiver<u64>,
    generation: u64,
    task: JoinHandle<()>,
}

impl Persister {
    /// Spawn the writer task on the current tokio runtime
    pub fn spawn(backend: Arc<dyn KeyValueStore>, key: String) -> Self {
        let (snapshots, mut pending) = watch::channel(None::<Snapshot>);
        let (settled_tx, settled) = watch::channel(0u64);

        let task = tokio::spawn(async move {
            // Keeps draining after the sender is dropped until the last
            // snapshot has been seen
            while pending.changed().await.is_ok() {
                let Some(snapshot) = pending.borrow_and_update().clone() else {
                    continue;
                };

                match backend.set_item(&key, &snapshot.json).await {
                    Ok(()) => debug!(key = %key, generation = snapshot.generation, "State saved"),
                    Err(e) => error!(key = %key, error = %e, "Failed to save state to storage"),
                }

                settled_tx.send_replace(snapshot.generation);
            }
        });

        Self {
            snapshots,
            settled,
            generation: 0,
            task,
        }
    }

    /// Queue a serialized snapshot, superseding any snapshot not yet started
    pub fn submit(&mut self, json: String) -> u64 {
        self.generation += 1;
        self.snapshots.send_replace(Some(Snapshot {
            generation: self.generation,
            json: json.into(),
        }));
        self.generation
    }

    /// Wait until the latest submitted snapshot has been written or has failed
    pub async fn flush(&self) {
        let target = self.generation;
        if target == 0 {
            return;
        }

        let mut settled = self.settled.clone();
        // An error means the writer is gone, nothing left to wait for
        let _ = settled.wait_for(|generation| *generation >= target).await;
    }

    /// Write whatever is pending, then stop the writer task
    pub async fn close(self) {
        let Self { snapshots, task, .. } = self;
        drop(snapshots);

        if let Err(e) = task.await {
            error!(error = %e, "State writer task failed");
        }
    }
}
