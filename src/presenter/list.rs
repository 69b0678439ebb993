//! Presenter for the combined access/refresh token view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use super::{PresenterContext, RefreshStrategy, RevokeOutcome, RowEvents, TokenRowPresenter};
use crate::error::Result;
use crate::registry::TokenRegistry;
use crate::token::{TokenId, TokenKind, TokenRecord};
use crate::transport::TokenTransport;
use crate::view::{RowId, SectionVisibility};

/// Owns both registries and drives refresh, render and placeholders.
pub struct TokenListPresenter {
    access: Arc<TokenRegistry>,
    refresh: Arc<TokenRegistry>,
    context: PresenterContext,
    strategy: RefreshStrategy,
    rows: Mutex<Vec<Arc<TokenRowPresenter>>>,
    next_row: AtomicU64,
    this: Weak<TokenListPresenter>,
}

impl TokenListPresenter {
    pub fn new(
        access: Arc<TokenRegistry>,
        refresh: Arc<TokenRegistry>,
        context: PresenterContext,
        strategy: RefreshStrategy,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            access,
            refresh,
            context,
            strategy,
            rows: Mutex::new(Vec::new()),
            next_row: AtomicU64::new(1),
            this: this.clone(),
        })
    }

    /// Both registries over one transport.
    pub fn with_transport(
        transport: Arc<dyn TokenTransport>,
        context: PresenterContext,
        strategy: RefreshStrategy,
    ) -> Arc<Self> {
        Self::new(
            Arc::new(TokenRegistry::new(TokenKind::Access, Arc::clone(&transport))),
            Arc::new(TokenRegistry::new(TokenKind::Refresh, transport)),
            context,
            strategy,
        )
    }

    pub fn registry(&self, kind: TokenKind) -> &Arc<TokenRegistry> {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Fetch both registries, then re-render.
    ///
    /// Neither registry changes until both fetches succeed. A failed fetch
    /// abandons the refresh: both registries and the rows on screen stay
    /// as they were. The error is returned for inspection only; it has
    /// already been logged.
    pub async fn refresh_table(&self) -> Result<()> {
        let fetched = match self.strategy {
            RefreshStrategy::Sequential => self.fetch_sequential().await,
            RefreshStrategy::Parallel => {
                futures::future::try_join(self.access.fetch_staged(), self.refresh.fetch_staged())
                    .await
            }
        };
        let (access, refresh) = match fetched {
            Ok(staged) => staged,
            Err(err) => {
                warn!(error = %err, strategy = %self.strategy, "token refresh abandoned");
                return Err(err);
            }
        };
        self.access.replace(access);
        self.refresh.replace(refresh);
        self.render();
        Ok(())
    }

    async fn fetch_sequential(&self) -> Result<(Vec<TokenRecord>, Vec<TokenRecord>)> {
        let access = self.access.fetch_staged().await?;
        let refresh = self.refresh.fetch_staged().await?;
        Ok((access, refresh))
    }

    /// Rebuild the table from the current registry contents.
    pub fn render(&self) {
        let previous = std::mem::take(&mut *self.rows_guard());
        for row in previous {
            row.dispose();
        }
        self.context
            .surface
            .mount_shell(self.context.renderer.table_shell());

        let events: Weak<dyn RowEvents> = self.this.clone();
        let mut rows = Vec::new();
        for registry in [&self.access, &self.refresh] {
            for record in registry.records() {
                let client = self.context.clients.client_by_client_id(record.client_id());
                if client.is_none() {
                    debug!(client_id = record.client_id(), "client not in directory");
                }
                let row = Arc::new(TokenRowPresenter::new(
                    self.next_row_id(),
                    record,
                    client,
                    Arc::clone(registry),
                    self.context.clone(),
                    events.clone(),
                ));
                row.render();
                rows.push(row);
            }
        }
        debug!(
            access = self.access.len(),
            refresh = self.refresh.len(),
            "token tables rendered"
        );
        *self.rows_guard() = rows;
        self.toggle_placeholders();
    }

    /// Show each kind's table when its registry is non-empty, its
    /// placeholder otherwise.
    pub fn toggle_placeholders(&self) {
        for registry in [&self.access, &self.refresh] {
            self.context.surface.set_section_visibility(
                registry.kind(),
                SectionVisibility::for_len(registry.len()),
            );
        }
    }

    pub fn rows(&self, kind: TokenKind) -> Vec<Arc<TokenRowPresenter>> {
        self.rows_guard()
            .iter()
            .filter(|row| row.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn row(&self, kind: TokenKind, id: &TokenId) -> Option<Arc<TokenRowPresenter>> {
        self.rows_guard()
            .iter()
            .find(|row| row.kind() == kind && row.token_id() == id)
            .cloned()
    }

    /// Dispatch a revoke click to the row showing `id`.
    pub async fn revoke(&self, kind: TokenKind, id: &TokenId) -> RevokeOutcome {
        match self.row(kind, id) {
            Some(row) => row.revoke().await,
            None => RevokeOutcome::Ignored,
        }
    }

    /// Dispatch a reveal click to the row showing `id`.
    pub fn reveal(&self, kind: TokenKind, id: &TokenId) -> bool {
        self.row(kind, id).is_some_and(|row| row.reveal_value())
    }

    fn next_row_id(&self) -> RowId {
        RowId(self.next_row.fetch_add(1, Ordering::Relaxed))
    }

    fn rows_guard(&self) -> MutexGuard<'_, Vec<Arc<TokenRowPresenter>>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RowEvents for TokenListPresenter {
    fn token_revoked(&self, kind: TokenKind, id: &TokenId, row: RowId) {
        let stale: Vec<Arc<TokenRowPresenter>> = {
            let mut rows = self.rows_guard();
            let (gone, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *rows)
                .into_iter()
                .partition(|r| r.kind() == kind && r.token_id() == id);
            *rows = kept;
            gone
        };
        // A re-render while the delete was outstanding may have drawn a
        // second row for the same token.
        for other in stale.iter().filter(|r| r.row_id() != row) {
            other.detach();
        }
        self.toggle_placeholders();
    }
}

impl std::fmt::Debug for TokenListPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenListPresenter")
            .field("access", &self.access)
            .field("refresh", &self.refresh)
            .field("strategy", &self.strategy)
            .field("rows", &self.rows_guard().len())
            .finish()
    }
}
