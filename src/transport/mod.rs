//! Transport seam between registries and the token endpoints.

pub mod http;

pub use http::HttpTransport;

use async_trait::async_trait;

use crate::error::Result;
use crate::token::{TokenId, TokenKind, WireToken};

/// List and delete operations on the token resource endpoints.
///
/// Implementations report a refused delete as
/// [`ConsoleError::Rejected`](crate::error::ConsoleError::Rejected) carrying
/// the server's human-readable message.
#[async_trait]
pub trait TokenTransport: Send + Sync {
    /// Fetch every token of `kind` the server currently holds for the session.
    async fn list(&self, kind: TokenKind) -> Result<Vec<WireToken>>;

    /// Ask the server to delete one token.
    async fn delete(&self, kind: TokenKind, id: &TokenId) -> Result<()>;
}
