//! Row payloads and the templating seam.

use std::fmt;

use serde::Serialize;

use super::clients::ClientSummary;
use super::scope::ScopeListing;
use crate::token::{Expiration, TokenDetails, TokenId, TokenKind, TokenRecord};

/// Rendered output handed to a [`ViewSurface`](super::ViewSurface).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(pub String);

impl Markup {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Markup {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Token attributes as exposed to templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAttributes {
    pub id: TokenId,
    pub value: String,
    pub scopes: Vec<String>,
    pub client_id: String,
    pub user_id: Option<String>,
    pub expiration: Option<Expiration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token_id: Option<TokenId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token_id: Option<TokenId>,
}

impl From<&TokenRecord> for TokenAttributes {
    fn from(record: &TokenRecord) -> Self {
        let (id_token_id, refresh_token_id) = match record.details() {
            TokenDetails::Access {
                id_token_id,
                refresh_token_id,
            } => (id_token_id.clone(), refresh_token_id.clone()),
            TokenDetails::Refresh => (None, None),
        };
        Self {
            id: record.id().clone(),
            value: record.value().to_string(),
            scopes: record.scopes().iter().cloned().collect(),
            client_id: record.client_id().to_string(),
            user_id: record.user_id().map(str::to_string),
            expiration: record.expiration().cloned(),
            id_token_id,
            refresh_token_id,
        }
    }
}

/// Everything a row template needs.
///
/// Serializes as `{kind, token, client, formattedExpiration, maskedValue,
/// scopes}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowPayload {
    pub kind: TokenKind,
    pub token: TokenAttributes,
    pub client: Option<ClientSummary>,
    pub formatted_expiration: String,
    pub masked_value: String,
    pub scopes: ScopeListing,
}

/// Templating engine seam.
pub trait TokenRenderer: Send + Sync {
    /// Table structure for both token kinds, rows excluded.
    fn table_shell(&self) -> Markup;

    fn scope_list(&self, listing: &ScopeListing) -> Markup;

    /// One row. The value must appear masked until the surface reveals it.
    fn row(&self, payload: &RowPayload, scope_list: &Markup) -> Markup;
}

/// Single-line text rows, used by the terminal front end.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl TokenRenderer for PlainTextRenderer {
    fn table_shell(&self) -> Markup {
        Markup("Tokens".to_string())
    }

    fn scope_list(&self, listing: &ScopeListing) -> Markup {
        if listing.is_empty() {
            return Markup("(none)".to_string());
        }
        let system = listing.system.iter().map(|scope| match &scope.description {
            Some(description) => format!("{} ({description})", scope.value),
            None => scope.value.clone(),
        });
        let other = listing.other.iter().map(|scope| format!("{scope}*"));
        Markup(system.chain(other).collect::<Vec<_>>().join(", "))
    }

    fn row(&self, payload: &RowPayload, scope_list: &Markup) -> Markup {
        let client = payload
            .client
            .as_ref()
            .map(|c| c.display_name().to_string())
            .unwrap_or_else(|| payload.token.client_id.clone());
        let mut line = format!(
            "#{id}  {value}  client: {client}  user: {user}  expires: {expires}  scopes: {scope_list}",
            id = payload.token.id,
            value = payload.masked_value,
            user = payload.token.user_id.as_deref().unwrap_or("-"),
            expires = payload.formatted_expiration,
        );
        if let Some(id_token) = &payload.token.id_token_id {
            line.push_str(&format!("  id token: #{id_token}"));
        }
        if let Some(refresh) = &payload.token.refresh_token_id {
            line.push_str(&format!("  refresh token: #{refresh}"));
        }
        Markup(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::WireToken;
    use crate::view::scope::SystemScope;
    use serde_json::json;

    fn payload() -> RowPayload {
        let wire: WireToken = serde_json::from_value(json!({
            "id": 5,
            "value": "0123456789abcdefghijklmnopqrstuvwxyz",
            "scopes": ["openid", "x-custom"],
            "clientId": "portal",
            "userId": "alice",
            "refreshTokenId": 9
        }))
        .unwrap();
        let record = TokenRecord::from_wire(TokenKind::Access, wire).unwrap();
        RowPayload {
            kind: TokenKind::Access,
            token: TokenAttributes::from(&record),
            client: Some(ClientSummary::new("portal").with_name("Portal")),
            formatted_expiration: "Never".to_string(),
            masked_value: record.masked_value(),
            scopes: ScopeListing {
                system: vec![SystemScope::new("openid")],
                other: vec!["x-custom".to_string()],
            },
        }
    }

    #[test]
    fn payload_serializes_in_template_shape() {
        let value = serde_json::to_value(payload()).unwrap();
        assert_eq!(value["formattedExpiration"], "Never");
        assert_eq!(value["token"]["clientId"], "portal");
        assert_eq!(value["token"]["refreshTokenId"], "9");
        assert!(value["token"].get("idTokenId").is_none());
        assert_eq!(value["client"]["clientName"], "Portal");
    }

    #[test]
    fn plain_text_row_is_masked() {
        let renderer = PlainTextRenderer;
        let payload = payload();
        let scopes = renderer.scope_list(&payload.scopes);
        let row = renderer.row(&payload, &scopes);

        assert_eq!(scopes.as_str(), "openid, x-custom*");
        assert!(row.as_str().contains("0123456789abcdefghijklmnopq..."));
        assert!(!row.as_str().contains(&payload.token.value));
        assert!(row.as_str().contains("client: Portal"));
        assert!(row.as_str().ends_with("refresh token: #9"));
    }
}
