//! Per-kind token collections synchronized against the server.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::{ConsoleError, Result};
use crate::token::{TokenId, TokenKind, TokenRecord};
use crate::transport::TokenTransport;

/// Ordered set of token records for one kind.
///
/// The in-memory set only ever changes through [`fetch_all`](Self::fetch_all)
/// or [`replace`](Self::replace) (wholesale replacement) and
/// [`remove`](Self::remove) (after the server confirms). It never runs ahead
/// of the server.
pub struct TokenRegistry {
    kind: TokenKind,
    transport: Arc<dyn TokenTransport>,
    records: RwLock<Vec<TokenRecord>>,
    pending_removals: Mutex<HashSet<TokenId>>,
}

impl TokenRegistry {
    pub fn new(kind: TokenKind, transport: Arc<dyn TokenTransport>) -> Self {
        Self {
            kind,
            transport,
            records: RwLock::new(Vec::new()),
            pending_removals: Mutex::new(HashSet::new()),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Replace the in-memory set with the server's current set.
    ///
    /// On failure the previous set is kept as is.
    pub async fn fetch_all(&self) -> Result<()> {
        let records = self.fetch_staged().await?;
        self.replace(records);
        Ok(())
    }

    /// Fetch and validate the server's set without installing it.
    ///
    /// Pair with [`replace`](Self::replace) when several registries must
    /// move together or not at all.
    pub async fn fetch_staged(&self) -> Result<Vec<TokenRecord>> {
        let wire = self.transport.list(self.kind).await.map_err(|e| {
            warn!(kind = %self.kind, error = %e, "token fetch failed");
            e
        })?;
        TokenRecord::ingest(self.kind, wire).map_err(|e| {
            warn!(kind = %self.kind, error = %e, "rejected malformed token list");
            e
        })
    }

    /// Install a previously staged set wholesale.
    pub fn replace(&self, records: Vec<TokenRecord>) {
        let count = records.len();
        *self.records.write().unwrap_or_else(PoisonError::into_inner) = records;
        debug!(kind = %self.kind, count, "token registry synchronized");
    }

    /// Delete a token on the server, then drop it locally.
    ///
    /// Fails with [`ConsoleError::RevokePending`] while another removal of
    /// the same id is outstanding, and with [`ConsoleError::UnknownToken`]
    /// for ids not held locally. Neither case reaches the transport.
    pub async fn remove(&self, id: &TokenId) -> Result<()> {
        if !self.contains(id) {
            return Err(ConsoleError::UnknownToken {
                kind: self.kind,
                id: id.clone(),
            });
        }
        let _pending = PendingRemoval::acquire(&self.pending_removals, id).ok_or_else(|| {
            ConsoleError::RevokePending {
                kind: self.kind,
                id: id.clone(),
            }
        })?;

        debug!(kind = %self.kind, token_id = %id, "requesting token deletion");
        self.transport.delete(self.kind, id).await.map_err(|e| {
            warn!(kind = %self.kind, token_id = %id, error = %e, "token deletion failed");
            e
        })?;

        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|record| record.id() != id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, id: &TokenId) -> bool {
        self.read().iter().any(|record| record.id() == id)
    }

    pub fn get(&self, id: &TokenId) -> Option<TokenRecord> {
        self.read().iter().find(|record| record.id() == id).cloned()
    }

    /// Snapshot of the current records in insertion order.
    pub fn records(&self) -> Vec<TokenRecord> {
        self.read().clone()
    }

    pub fn is_remove_pending(&self, id: &TokenId) -> bool {
        lock(&self.pending_removals).contains(id)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<TokenRecord>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TokenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRegistry")
            .field("kind", &self.kind)
            .field("len", &self.len())
            .finish()
    }
}

/// Marks an id as having a delete in flight until dropped.
struct PendingRemoval<'a> {
    pending: &'a Mutex<HashSet<TokenId>>,
    id: TokenId,
}

impl<'a> PendingRemoval<'a> {
    fn acquire(pending: &'a Mutex<HashSet<TokenId>>, id: &TokenId) -> Option<Self> {
        lock(pending).insert(id.clone()).then(|| Self {
            pending,
            id: id.clone(),
        })
    }
}

impl Drop for PendingRemoval<'_> {
    fn drop(&mut self) {
        lock(self.pending).remove(&self.id);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
