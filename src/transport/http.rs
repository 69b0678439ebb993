//! reqwest-backed transport for the token, client and scope endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::TokenTransport;
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::token::{TokenId, TokenKind, WireToken};
use crate::view::{ClientSummary, SystemScope};

/// HTTP transport against the authorization server's admin API.
///
/// # Example
/// ```no_run
/// use token_console::config::ConsoleConfig;
/// use token_console::transport::HttpTransport;
///
/// let config = ConsoleConfig::new("https://auth.example.com/");
/// let transport = HttpTransport::new(&config)?;
/// # Ok::<(), token_console::error::ConsoleError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
    access_path: String,
    refresh_path: String,
    clients_path: String,
    scopes_path: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &ConsoleConfig) -> Result<Self> {
        let base_url = config.parsed_base_url()?;
        let timeout = config.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers(config.api_token.as_deref())?)
            .build()?;
        Ok(Self {
            client,
            base_url,
            access_path: config.access_path.clone(),
            refresh_path: config.refresh_path.clone(),
            clients_path: config.clients_path.clone(),
            scopes_path: config.scopes_path.clone(),
            timeout,
        })
    }

    fn collection_url(&self, kind: TokenKind) -> Result<Url> {
        let path = match kind {
            TokenKind::Access => &self.access_path,
            TokenKind::Refresh => &self.refresh_path,
        };
        self.join(path)
    }

    fn item_url(&self, kind: TokenKind, id: &TokenId) -> Result<Url> {
        let mut url = self.collection_url(kind)?;
        let shown = url.to_string();
        url.path_segments_mut()
            .map_err(|_| ConsoleError::Configuration(format!("{shown} cannot carry a path")))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    fn join(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ConsoleError::Configuration(format!("invalid endpoint path {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let resp = check_status(resp).await?;
        let body = resp.text().await.map_err(|e| self.send_error(e))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Preload the client directory from the clients endpoint.
    pub async fn list_clients(&self) -> Result<Vec<ClientSummary>> {
        self.get_json(self.join(&self.clients_path)?).await
    }

    /// Preload the system scope catalog from the scopes endpoint.
    pub async fn list_system_scopes(&self) -> Result<Vec<SystemScope>> {
        self.get_json(self.join(&self.scopes_path)?).await
    }

    fn send_error(&self, error: reqwest::Error) -> ConsoleError {
        if error.is_timeout() {
            ConsoleError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ConsoleError::Network(error)
        }
    }
}

#[async_trait]
impl TokenTransport for HttpTransport {
    async fn list(&self, kind: TokenKind) -> Result<Vec<WireToken>> {
        let tokens: Vec<WireToken> = self.get_json(self.collection_url(kind)?).await?;
        debug!(%kind, count = tokens.len(), "fetched token list");
        Ok(tokens)
    }

    async fn delete(&self, kind: TokenKind, id: &TokenId) -> Result<()> {
        let resp = self
            .client
            .delete(self.item_url(kind, id)?)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        check_status(resp).await?;
        debug!(%kind, token_id = %id, "server confirmed token deletion");
        Ok(())
    }
}

fn default_headers(api_token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Some(token) = api_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ConsoleError::Configuration("API token is not a valid header value".into()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

async fn check_status(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(status_to_error(status.as_u16(), &body))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_message: Option<String>,
}

/// Map a failed response to a rejection carrying the server's message.
///
/// Prefers the `errorMessage` field of a JSON body, then the raw body, then
/// the canonical reason phrase.
pub(crate) fn status_to_error(status: u16, body: &str) -> ConsoleError {
    let from_json = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error_message)
        .filter(|m| !m.trim().is_empty());
    let message = from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("request failed")
                .to_string()
        } else {
            trimmed.to_string()
        }
    });
    ConsoleError::rejected(status, message)
}
