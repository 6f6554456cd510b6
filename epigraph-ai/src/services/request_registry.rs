//! Request registry
//!
//! Tracks live request identifiers and their cancellation tokens. The
//! registry is the only state shared between concurrent pipelines; it is
//! injected through application state.
//!
//! Registration returns a [`RequestTicket`]. Dropping the ticket releases
//! the entry, so every pipeline exit path (completion, error, panic,
//! client disconnect) frees its identifier exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Opaque request identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from a caller
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }

}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RequestId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Request id already registered: {0}")]
    Duplicate(RequestId),
}

/// One live request
#[derive(Debug)]
struct RequestRecord {
    token: CancellationToken,
    created_at: DateTime<Utc>,
    /// Registration that owns the entry; an id can be registered again
    /// after release
    generation: u64,
}

/// Registry of live requests
///
/// Uses a blocking lock: critical sections never await, and the ticket
/// releases its entry from `Drop`.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    requests: RwLock<HashMap<RequestId, RequestRecord>>,
    next_generation: AtomicU64,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request under a fresh identifier
    pub fn register(self: &Arc<Self>) -> RequestTicket {
        loop {
            // UUID v4 collisions are not expected; retry keeps the invariant
            if let Ok(ticket) = self.register_with_id(RequestId::new()) {
                return ticket;
            }
        }
    }

    /// Register a request under a caller-proposed identifier
    pub fn register_with_id(self: &Arc<Self>, id: RequestId) -> Result<RequestTicket, RegistryError> {
        let token = CancellationToken::new();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        {
            let mut requests = self.requests.write().unwrap_or_else(PoisonError::into_inner);
            if requests.contains_key(&id) {
                return Err(RegistryError::Duplicate(id));
            }
            requests.insert(
                id,
                RequestRecord {
                    token: token.clone(),
                    created_at: Utc::now(),
                    generation,
                },
            );
        }

        tracing::debug!(request_id = %id, "Request registered");

        Ok(RequestTicket {
            id,
            generation,
            token,
            registry: Arc::clone(self),
        })
    }

    /// True while the request is registered and not cancelled
    pub fn is_active(&self, id: &RequestId) -> bool {
        let requests = self.requests.read().unwrap_or_else(PoisonError::into_inner);
        requests
            .get(id)
            .map(|record| !record.token.is_cancelled())
            .unwrap_or(false)
    }

    /// Mark a request cancelled
    ///
    /// Returns false for unknown identifiers; repeated cancels of a live
    /// request return true.
    pub fn cancel(&self, id: &RequestId) -> bool {
        let requests = self.requests.read().unwrap_or_else(PoisonError::into_inner);
        match requests.get(id) {
            Some(record) => {
                record.token.cancel();
                tracing::info!(
                    request_id = %id,
                    age_ms = (Utc::now() - record.created_at).num_milliseconds(),
                    "Request cancelled"
                );
                true
            }
            None => false,
        }
    }

    /// Remove a request (idempotent)
    pub fn release(&self, id: &RequestId) {
        let removed = self
            .requests
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id);

        if removed.is_some() {
            tracing::debug!(request_id = %id, "Request released");
        }
    }

    /// Remove the entry only while it still belongs to `generation`
    fn release_ticket(&self, id: &RequestId, generation: u64) {
        let mut requests = self.requests.write().unwrap_or_else(PoisonError::into_inner);
        let owned = requests
            .get(id)
            .map(|record| record.generation == generation)
            .unwrap_or(false);

        if owned {
            requests.remove(id);
            tracing::debug!(request_id = %id, "Request released");
        }
    }

    /// Number of registered requests
    pub fn active_count(&self) -> usize {
        self.requests.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Registration handle for one live request
///
/// Releases the registry entry when dropped.
#[derive(Debug)]
pub struct RequestTicket {
    id: RequestId,
    generation: u64,
    token: CancellationToken,
    registry: Arc<RequestRegistry>,
}

impl RequestTicket {
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// Cancellation checkpoint
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel from inside the pipeline (client disconnect)
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token shared with the registry entry
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for RequestTicket {
    fn drop(&mut self) {
        self.registry.release_ticket(&self.id, self.generation);
    }
}
