//! CLI command handlers for listing and revoking tokens.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::terminal::{StdinDialogs, TerminalSurface};
use crate::config::ConsoleConfig;
use crate::presenter::{PresenterContext, RevokeOutcome, TokenListPresenter};
use crate::token::{TokenId, TokenKind};
use crate::transport::HttpTransport;
use crate::view::{PlainTextRenderer, ScopeCatalog, StaticClientDirectory};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

struct Session {
    surface: Arc<TerminalSurface>,
    list: Arc<TokenListPresenter>,
}

impl Session {
    async fn open(
        config_path: Option<&Path>,
        assume_yes: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = ConsoleConfig::load(config_path)?;
        let transport = Arc::new(HttpTransport::new(&config)?);

        // Clients and scopes only label rows; a failed preload still lets
        // the tables render.
        let clients = transport.list_clients().await.unwrap_or_else(|e| {
            warn!(error = %e, "client directory unavailable");
            Vec::new()
        });
        let scopes = transport.list_system_scopes().await.unwrap_or_else(|e| {
            warn!(error = %e, "system scope catalog unavailable");
            Vec::new()
        });

        let clients = StaticClientDirectory::new(clients);
        let scopes = ScopeCatalog::new(scopes);
        if clients.is_empty() || scopes.is_empty() {
            warn!("rows will show raw client ids or unlabelled scopes");
        }
        debug!(clients = clients.len(), scopes = scopes.len(), "lookup tables preloaded");

        let surface = Arc::new(TerminalSurface::new());
        let context = PresenterContext::builder()
            .surface(surface.clone())
            .dialogs(Arc::new(StdinDialogs::new(assume_yes)))
            .renderer(Arc::new(PlainTextRenderer))
            .clients(Arc::new(clients))
            .scopes(Arc::new(scopes))
            .build();
        let list = TokenListPresenter::with_transport(transport, context, config.refresh_strategy);
        list.refresh_table().await?;
        Ok(Self { surface, list })
    }

    fn print(&self) -> std::io::Result<()> {
        self.surface.write_to(&mut std::io::stdout().lock())
    }
}

/// Handle `token-console list`.
pub async fn handle_list(config_path: Option<&Path>) -> CommandResult {
    let session = Session::open(config_path, false).await?;
    session.print()?;
    Ok(())
}

/// Handle `token-console revoke <kind> <id>`.
pub async fn handle_revoke(
    config_path: Option<&Path>,
    kind: TokenKind,
    id: &str,
    assume_yes: bool,
) -> CommandResult {
    let session = Session::open(config_path, assume_yes).await?;
    let id = TokenId::from(id);
    match session.list.revoke(kind, &id).await {
        RevokeOutcome::Revoked => {
            println!("Revoked {kind} token #{id}");
            session.print()?;
            Ok(())
        }
        RevokeOutcome::Declined => {
            println!("Aborted.");
            Ok(())
        }
        RevokeOutcome::Pending => {
            Err(format!("a revoke of {kind} token #{id} is already in progress").into())
        }
        // The alert already printed the server's message.
        RevokeOutcome::Failed(_) => Err(format!("revoke of {kind} token #{id} failed").into()),
        RevokeOutcome::Ignored => Err(format!("no {kind} token with id {id}").into()),
    }
}
