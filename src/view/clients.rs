use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Display representation of an OAuth client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub client_id: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_description: Option<String>,
    #[serde(default)]
    pub logo_uri: Option<String>,
}

impl ClientSummary {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_name: None,
            client_description: None,
            logo_uri: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Client name, or the client id when unnamed.
    pub fn display_name(&self) -> &str {
        self.client_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.client_id)
    }
}

/// Synchronous lookup from client id to its display form.
pub trait ClientDirectory: Send + Sync {
    fn client_by_client_id(&self, client_id: &str) -> Option<ClientSummary>;
}

/// Directory preloaded from a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticClientDirectory {
    clients: HashMap<String, ClientSummary>,
}

impl StaticClientDirectory {
    pub fn new(clients: impl IntoIterator<Item = ClientSummary>) -> Self {
        Self {
            clients: clients
                .into_iter()
                .map(|client| (client.client_id.clone(), client))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl ClientDirectory for StaticClientDirectory {
    fn client_by_client_id(&self, client_id: &str) -> Option<ClientSummary> {
        self.clients.get(client_id).cloned()
    }
}
