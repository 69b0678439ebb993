use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// One entry of the server's system scope catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemScope {
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub default_scope: bool,
    #[serde(default)]
    pub restricted: bool,
}

impl SystemScope {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            description: None,
            icon: None,
            default_scope: false,
            restricted: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A token's scopes split by catalog membership, for labelling only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeListing {
    /// Scopes found in the catalog, with their descriptors.
    pub system: Vec<SystemScope>,
    /// Scopes the catalog does not know.
    pub other: Vec<String>,
}

impl ScopeListing {
    pub fn is_empty(&self) -> bool {
        self.system.is_empty() && self.other.is_empty()
    }
}

/// Reference set of known scope descriptors.
#[derive(Debug, Clone, Default)]
pub struct ScopeCatalog {
    scopes: HashMap<String, SystemScope>,
}

impl ScopeCatalog {
    pub fn new(scopes: impl IntoIterator<Item = SystemScope>) -> Self {
        Self {
            scopes: scopes
                .into_iter()
                .map(|scope| (scope.value.clone(), scope))
                .collect(),
        }
    }

    pub fn get(&self, value: &str) -> Option<&SystemScope> {
        self.scopes.get(value)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Split `scopes` into catalog entries and unknown names, each in
    /// ascending order.
    pub fn partition(&self, scopes: &BTreeSet<String>) -> ScopeListing {
        let mut listing = ScopeListing::default();
        for scope in scopes {
            match self.get(scope) {
                Some(known) => listing.system.push(known.clone()),
                None => listing.other.push(scope.clone()),
            }
        }
        listing
    }
}
