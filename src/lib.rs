//! Token console: presentation core for OAuth token administration.
//!
//! Keeps an in-memory view of the access and refresh tokens an
//! authorization server holds, renders them through injected view
//! collaborators, and revokes them with confirmation and error recovery.
//! The server stays the source of truth: records leave the local view only
//! after the server confirms their deletion.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use token_console::prelude::*;
//! # use token_console::view::{Dialogs, ViewSurface};
//! # fn surface() -> Arc<dyn ViewSurface> { unimplemented!() }
//! # fn dialogs() -> Arc<dyn Dialogs> { unimplemented!() }
//!
//! # async fn example() -> token_console::error::Result<()> {
//! let config = ConsoleConfig::from_env()?;
//! let transport = Arc::new(HttpTransport::new(&config)?);
//! let context = PresenterContext::builder()
//!     .surface(surface())
//!     .dialogs(dialogs())
//!     .renderer(Arc::new(PlainTextRenderer))
//!     .clients(Arc::new(StaticClientDirectory::default()))
//!     .build();
//!
//! let list = TokenListPresenter::with_transport(transport, context, config.refresh_strategy);
//! list.refresh_table().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod presenter;
pub mod registry;
pub mod token;
pub mod transport;
pub mod view;

#[cfg(feature = "cli")]
pub mod cli;
