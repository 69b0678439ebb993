//! Row and list presenters driving the token tables.

pub mod list;
pub mod row;

pub use list::TokenListPresenter;
pub use row::{TokenRowPresenter, REVOKE_PROMPT};

use std::sync::Arc;

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::token::{TokenId, TokenKind};
use crate::view::{
    Clock, ClientDirectory, Dialogs, RowId, ScopeCatalog, SystemClock, TokenRenderer, ViewSurface,
};

/// How a full refresh fetches the two registries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RefreshStrategy {
    /// Access first, refresh only after access succeeded.
    #[default]
    Sequential,
    /// Both at once; render only when both succeeded.
    Parallel,
}

/// Result of a revoke interaction on one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// Server confirmed; the row is gone.
    Revoked,
    /// The user declined the confirmation prompt.
    Declined,
    /// A revoke for this token is already outstanding.
    Pending,
    /// The request failed; the alert showed this message.
    Failed(String),
    /// The row is detached or disposed.
    Ignored,
}

/// Narrow callback from a row back to the list that owns it.
pub trait RowEvents: Send + Sync {
    /// The server confirmed deletion of the token shown by `row`.
    fn token_revoked(&self, kind: TokenKind, id: &TokenId, row: RowId);
}

/// Collaborators shared by every presenter.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use token_console::presenter::PresenterContext;
/// use token_console::view::{PlainTextRenderer, StaticClientDirectory};
/// # use token_console::view::{Dialogs, ViewSurface};
/// # fn surface() -> Arc<dyn ViewSurface> { unimplemented!() }
/// # fn dialogs() -> Arc<dyn Dialogs> { unimplemented!() }
///
/// let context = PresenterContext::builder()
///     .surface(surface())
///     .dialogs(dialogs())
///     .renderer(Arc::new(PlainTextRenderer))
///     .clients(Arc::new(StaticClientDirectory::default()))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct PresenterContext {
    pub(crate) surface: Arc<dyn ViewSurface>,
    pub(crate) dialogs: Arc<dyn Dialogs>,
    pub(crate) renderer: Arc<dyn TokenRenderer>,
    pub(crate) clients: Arc<dyn ClientDirectory>,
    #[builder(default)]
    pub(crate) scopes: Arc<ScopeCatalog>,
    #[builder(default = system_clock())]
    pub(crate) clock: Arc<dyn Clock>,
}

fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}
