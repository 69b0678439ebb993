//! Convenience re-exports for common use.

pub use crate::config::ConsoleConfig;
pub use crate::error::{ConsoleError, Result};
pub use crate::presenter::{
    PresenterContext, RefreshStrategy, RevokeOutcome, TokenListPresenter, TokenRowPresenter,
};
pub use crate::registry::TokenRegistry;
pub use crate::token::{TokenId, TokenKind, TokenRecord};
pub use crate::transport::{HttpTransport, TokenTransport};
pub use crate::view::{
    ClientDirectory, ClientSummary, PlainTextRenderer, ScopeCatalog, StaticClientDirectory,
};
