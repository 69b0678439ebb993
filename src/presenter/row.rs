//! Presenter for a single token row.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use super::{PresenterContext, RevokeOutcome, RowEvents};
use crate::error::ConsoleError;
use crate::registry::TokenRegistry;
use crate::token::{format_expiration, TokenId, TokenKind, TokenRecord};
use crate::view::{ClientSummary, RowId, RowPayload, TokenAttributes, Transition};

pub const REVOKE_PROMPT: &str = "Are you sure you would like to revoke this token?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Constructed, not yet on the surface.
    Unmounted,
    Live,
    /// Removal transition playing.
    Removing,
    Removed,
    Disposed,
}

#[derive(Debug)]
struct RowState {
    phase: Phase,
    revoking: bool,
    revealed: bool,
}

/// Renders one record and mediates its reveal and revoke actions.
///
/// Once removed or disposed, every handler is a no-op and the presenter
/// never touches the surface again.
pub struct TokenRowPresenter {
    row: RowId,
    record: TokenRecord,
    client: Option<ClientSummary>,
    registry: Arc<TokenRegistry>,
    context: PresenterContext,
    events: Weak<dyn RowEvents>,
    state: Mutex<RowState>,
}

impl TokenRowPresenter {
    pub fn new(
        row: RowId,
        record: TokenRecord,
        client: Option<ClientSummary>,
        registry: Arc<TokenRegistry>,
        context: PresenterContext,
        events: Weak<dyn RowEvents>,
    ) -> Self {
        Self {
            row,
            record,
            client,
            registry,
            context,
            events,
            state: Mutex::new(RowState {
                phase: Phase::Unmounted,
                revoking: false,
                revealed: false,
            }),
        }
    }

    pub fn row_id(&self) -> RowId {
        self.row
    }

    pub fn kind(&self) -> TokenKind {
        self.record.kind()
    }

    pub fn token_id(&self) -> &TokenId {
        self.record.id()
    }

    pub fn record(&self) -> &TokenRecord {
        &self.record
    }

    pub fn client(&self) -> Option<&ClientSummary> {
        self.client.as_ref()
    }

    /// Whether the row is on the surface and accepting interaction.
    pub fn is_live(&self) -> bool {
        self.state().phase == Phase::Live
    }

    pub fn is_revealed(&self) -> bool {
        self.state().revealed
    }

    /// Template data for the current record state.
    pub fn payload(&self) -> RowPayload {
        let now = self.context.clock.now();
        RowPayload {
            kind: self.kind(),
            token: TokenAttributes::from(&self.record),
            client: self.client.clone(),
            formatted_expiration: format_expiration(self.record.expiration(), now),
            masked_value: self.record.masked_value(),
            scopes: self.context.scopes.partition(self.record.scopes()),
        }
    }

    /// Draw (or redraw) the row. Always leaves the value masked.
    pub fn render(&self) {
        let payload = self.payload();
        let scope_list = self.context.renderer.scope_list(&payload.scopes);
        let markup = self.context.renderer.row(&payload, &scope_list);

        let first_mount = {
            let mut state = self.state();
            let first_mount = match state.phase {
                Phase::Unmounted => true,
                Phase::Live => false,
                Phase::Removing | Phase::Removed | Phase::Disposed => return,
            };
            state.phase = Phase::Live;
            state.revealed = false;
            first_mount
        };

        let surface = &self.context.surface;
        if first_mount {
            surface.attach_row(self.kind(), self.row, markup);
        } else {
            surface.replace_row(self.row, markup);
        }
        surface.show_full_value(self.row, false);
    }

    /// Swap the masked substring for the full value. Local only.
    pub fn reveal_value(&self) -> bool {
        let mut state = self.state();
        if state.phase != Phase::Live {
            return false;
        }
        state.revealed = true;
        drop(state);
        self.context.surface.show_full_value(self.row, true);
        true
    }

    /// Confirm with the user, then delete the token on the server.
    ///
    /// The row leaves the surface only after the server confirms. Failures
    /// keep the row and raise an alert carrying the server's message.
    /// The alert is raised even when the row was disposed while the
    /// request was outstanding, so a failed revoke is never silent.
    pub async fn revoke(&self) -> RevokeOutcome {
        {
            let state = self.state();
            if state.phase != Phase::Live {
                return RevokeOutcome::Ignored;
            }
            if state.revoking {
                return RevokeOutcome::Pending;
            }
        }

        if !self.context.dialogs.confirm(REVOKE_PROMPT) {
            debug!(kind = %self.kind(), token_id = %self.token_id(), "revoke declined");
            return RevokeOutcome::Declined;
        }

        {
            let mut state = self.state();
            if state.phase != Phase::Live {
                return RevokeOutcome::Ignored;
            }
            if state.revoking {
                return RevokeOutcome::Pending;
            }
            state.revoking = true;
        }

        let result = self.registry.remove(self.token_id()).await;

        let still_live = {
            let mut state = self.state();
            state.revoking = false;
            match (&result, state.phase) {
                (Ok(()), Phase::Live) => {
                    state.phase = Phase::Removing;
                    true
                }
                (_, phase) => phase == Phase::Live,
            }
        };

        match result {
            Ok(()) => {
                if still_live {
                    self.play_removal().await;
                } else {
                    debug!(
                        kind = %self.kind(),
                        token_id = %self.token_id(),
                        "revoke confirmed after row was discarded"
                    );
                }
                if let Some(events) = self.events.upgrade() {
                    events.token_revoked(self.kind(), self.token_id(), self.row);
                }
                RevokeOutcome::Revoked
            }
            Err(ConsoleError::RevokePending { .. }) => RevokeOutcome::Pending,
            Err(err) => {
                let message = err.user_message();
                warn!(
                    kind = %self.kind(),
                    token_id = %self.token_id(),
                    error = %err,
                    row_live = still_live,
                    "revoke failed"
                );
                self.context.dialogs.alert(&message);
                RevokeOutcome::Failed(message)
            }
        }
    }

    /// Fade, collapse, then detach. Stops quietly if the row is disposed
    /// between steps.
    async fn play_removal(&self) {
        for transition in [Transition::Fade, Transition::Collapse] {
            self.context.surface.transition(self.row, transition).await;
            if self.state().phase != Phase::Removing {
                return;
            }
        }
        self.context.surface.detach_row(self.row);
        self.state().phase = Phase::Removed;
    }

    /// Detach immediately, without a transition.
    pub(crate) fn detach(&self) {
        let mut state = self.state();
        if matches!(state.phase, Phase::Live | Phase::Removing) {
            state.phase = Phase::Removed;
            drop(state);
            self.context.surface.detach_row(self.row);
        }
    }

    /// Release the row's bindings ahead of its element being discarded.
    pub fn dispose(&self) {
        let mut state = self.state();
        if state.phase != Phase::Removed {
            state.phase = Phase::Disposed;
        }
    }

    fn state(&self) -> MutexGuard<'_, RowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TokenRowPresenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRowPresenter")
            .field("row", &self.row)
            .field("record", &self.record)
            .field("state", &*self.state())
            .finish()
    }
}
