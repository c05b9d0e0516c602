//! The coordinator's worker membership registry.
//!
//! The registration task talks to the registry through the
//! [`WorkerRegistry`] trait; the coordinator supplies the canonical
//! implementation. [`InMemoryRegistry`] is the default: a concurrent map
//! keyed by worker id, safe to call from any number of registration tasks at
//! once. Inserts behave atomically, so concurrent registrations complete in
//! some order with no lost updates.
//!
//! Registry state is not persisted; a coordinator restart starts from an
//! empty membership table and workers re-register.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::descriptor::WorkerDescriptor;
use crate::error::{Error, Result};

/// Membership registry consulted by registration tasks.
///
/// `register_worker` must be safe to call concurrently; implementations own
/// their internal synchronization. A rejection surfaces as a domain error
/// whose reason the registration task does not inspect.
#[async_trait]
pub trait WorkerRegistry: Send + Sync {
    /// Insert a worker into the membership table.
    async fn register_worker(&self, descriptor: WorkerDescriptor) -> Result<()>;
}

/// In-memory registry backed by a concurrent map.
///
/// Re-registration under an already-known id replaces the previous
/// descriptor, so a worker that restarts on a new port takes over its own
/// slot. An optional capacity bound rejects registrations of new ids once
/// the cluster is full.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    workers: DashMap<i64, WorkerDescriptor>,
    capacity: Option<usize>,
}

impl InMemoryRegistry {
    /// Create an unbounded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that admits at most `capacity` distinct worker ids.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            workers: DashMap::new(),
            capacity: Some(capacity),
        }
    }

    /// Number of registered workers.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Look up a worker by id.
    pub fn get(&self, worker_id: i64) -> Option<WorkerDescriptor> {
        self.workers.get(&worker_id).map(|w| w.value().clone())
    }

    /// Ids of all registered workers, in no particular order.
    pub fn worker_ids(&self) -> Vec<i64> {
        self.workers.iter().map(|w| *w.key()).collect()
    }
}

#[async_trait]
impl WorkerRegistry for InMemoryRegistry {
    async fn register_worker(&self, descriptor: WorkerDescriptor) -> Result<()> {
        let worker_id = descriptor.worker_id();

        if let Some(capacity) = self.capacity {
            // Advisory under concurrent inserts at the boundary; a momentary
            // overshoot is acceptable for a membership table.
            if !self.workers.contains_key(&worker_id) && self.workers.len() >= capacity {
                return Err(Error::RegistryRejected(format!(
                    "registry full: {} workers",
                    capacity
                )));
            }
        }

        let replaced = self
            .workers
            .insert(worker_id, descriptor.clone())
            .is_some();

        tracing::info!(
            worker_id,
            host = descriptor.host(),
            port = descriptor.port(),
            replaced,
            "Worker registered"
        );

        Ok(())
    }
}
