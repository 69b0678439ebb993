use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::expiration::Expiration;
use super::{TokenId, TokenKind};
use crate::error::{ConsoleError, Result};

/// Number of leading characters shown while a token value is masked.
pub const MASKED_VALUE_LEN: usize = 27;

/// A token as the server sends it, before validation.
///
/// Every field is optional here; [`TokenRecord::from_wire`] decides what is
/// required for each kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireToken {
    #[serde(default)]
    pub id: Option<TokenId>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub scopes: Option<Vec<String>>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub expiration: Option<Expiration>,
    #[serde(default)]
    pub id_token_id: Option<TokenId>,
    #[serde(default)]
    pub refresh_token_id: Option<TokenId>,
}

/// Kind-specific attributes of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDetails {
    Access {
        id_token_id: Option<TokenId>,
        refresh_token_id: Option<TokenId>,
    },
    Refresh,
}

/// Validated in-memory representation of one server-side token.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRecord {
    id: TokenId,
    value: String,
    scopes: BTreeSet<String>,
    client_id: String,
    user_id: Option<String>,
    expiration: Option<Expiration>,
    details: TokenDetails,
}

impl TokenRecord {
    /// Validate a wire token for the given kind.
    pub fn from_wire(kind: TokenKind, wire: WireToken) -> Result<Self> {
        let id = wire
            .id
            .filter(|id| !id.as_str().trim().is_empty())
            .ok_or_else(|| ConsoleError::invalid_record(kind, "missing id"))?;
        let value = wire
            .value
            .ok_or_else(|| ConsoleError::invalid_record(kind, format!("token {id} has no value")))?;
        let client_id = wire
            .client_id
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                ConsoleError::invalid_record(kind, format!("token {id} has no clientId"))
            })?;

        let details = match kind {
            TokenKind::Access => TokenDetails::Access {
                id_token_id: wire.id_token_id,
                refresh_token_id: wire.refresh_token_id,
            },
            TokenKind::Refresh => {
                if wire.id_token_id.is_some() || wire.refresh_token_id.is_some() {
                    return Err(ConsoleError::invalid_record(
                        kind,
                        format!("token {id} carries access-token references"),
                    ));
                }
                TokenDetails::Refresh
            }
        };

        Ok(Self {
            id,
            value,
            scopes: wire.scopes.unwrap_or_default().into_iter().collect(),
            client_id,
            user_id: wire.user_id,
            expiration: wire.expiration,
            details,
        })
    }

    /// Validate a whole fetch response. Any malformed record or repeated id
    /// fails the batch.
    pub fn ingest(kind: TokenKind, wire: Vec<WireToken>) -> Result<Vec<Self>> {
        let mut seen = HashSet::with_capacity(wire.len());
        let mut records = Vec::with_capacity(wire.len());
        for token in wire {
            let record = Self::from_wire(kind, token)?;
            if !seen.insert(record.id.clone()) {
                return Err(ConsoleError::DuplicateToken {
                    kind,
                    id: record.id,
                });
            }
            records.push(record);
        }
        Ok(records)
    }

    pub fn kind(&self) -> TokenKind {
        match self.details {
            TokenDetails::Access { .. } => TokenKind::Access,
            TokenDetails::Refresh => TokenKind::Refresh,
        }
    }

    pub fn id(&self) -> &TokenId {
        &self.id
    }

    /// Full token value. Never log this.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Truncated form shown until the user reveals the value.
    pub fn masked_value(&self) -> String {
        let cut = self
            .value
            .char_indices()
            .nth(MASKED_VALUE_LEN)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len());
        format!("{}...", &self.value[..cut])
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn expiration(&self) -> Option<&Expiration> {
        self.expiration.as_ref()
    }

    pub fn details(&self) -> &TokenDetails {
        &self.details
    }
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("id", &self.id)
            .field("value", &"..")
            .field("scopes", &self.scopes)
            .field("client_id", &self.client_id)
            .field("user_id", &self.user_id)
            .field("expiration", &self.expiration)
            .field("details", &self.details)
            .finish()
    }
}
