//! Shared test doubles for the view collaborators and the transport.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::json;
use tokio::sync::Notify;

use token_console::error::{ConsoleError, Result};
use token_console::presenter::{PresenterContext, RefreshStrategy, TokenListPresenter};
use token_console::token::{TokenId, TokenKind, WireToken};
use token_console::transport::TokenTransport;
use token_console::view::{
    ClientSummary, Dialogs, FixedClock, Markup, PlainTextRenderer, RowId, ScopeCatalog,
    SectionVisibility, StaticClientDirectory, SystemScope, Transition, ViewSurface,
};

pub const NOW: &str = "2026-10-19T12:00:00Z";

pub fn access_token(id: i64, expiration: Option<&str>) -> WireToken {
    serde_json::from_value(json!({
        "id": id,
        "value": format!("eyJhbGciOiJSUzI1NiJ9.access-{id}.signature-padding"),
        "scopes": ["openid", "profile"],
        "clientId": "portal",
        "userId": "alice",
        "expiration": expiration,
        "idTokenId": null,
        "refreshTokenId": null
    }))
    .expect("valid access token json")
}

pub fn refresh_token(id: i64) -> WireToken {
    serde_json::from_value(json!({
        "id": id,
        "value": format!("refresh-{id}-0123456789abcdefghijklmnopqrstuvwxyz"),
        "scopes": ["offline_access"],
        "clientId": "portal",
        "userId": "alice",
        "expiration": null
    }))
    .expect("valid refresh token json")
}

/// In-memory stand-in for the token endpoints.
#[derive(Default)]
pub struct FakeTransport {
    server: Mutex<HashMap<TokenKind, Vec<WireToken>>>,
    failing_lists: Mutex<HashSet<TokenKind>>,
    rejections: Mutex<HashMap<TokenId, String>>,
    calls: Mutex<Vec<String>>,
    delete_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, kind: TokenKind, tokens: Vec<WireToken>) {
        self.server.lock().unwrap().insert(kind, tokens);
    }

    pub fn fail_list(&self, kind: TokenKind) {
        self.failing_lists.lock().unwrap().insert(kind);
    }

    pub fn heal_list(&self, kind: TokenKind) {
        self.failing_lists.lock().unwrap().remove(&kind);
    }

    /// Refuse deletes of `id` with the given server message.
    pub fn reject_delete(&self, id: &str, message: &str) {
        self.rejections
            .lock()
            .unwrap()
            .insert(TokenId::from(id), message.to_string());
    }

    pub fn accept_deletes(&self) {
        self.rejections.lock().unwrap().clear();
    }

    /// Hold every delete until the returned handle is notified.
    pub fn gate_deletes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.delete_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("delete"))
            .count()
    }

    pub fn server_len(&self, kind: TokenKind) -> usize {
        self.server
            .lock()
            .unwrap()
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl TokenTransport for FakeTransport {
    async fn list(&self, kind: TokenKind) -> Result<Vec<WireToken>> {
        self.calls.lock().unwrap().push(format!("list {kind}"));
        if self.failing_lists.lock().unwrap().contains(&kind) {
            return Err(ConsoleError::Timeout(50));
        }
        Ok(self
            .server
            .lock()
            .unwrap()
            .get(&kind)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete(&self, kind: TokenKind, id: &TokenId) -> Result<()> {
        self.calls.lock().unwrap().push(format!("delete {kind} {id}"));
        let gate = self.delete_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(message) = self.rejections.lock().unwrap().get(id) {
            return Err(ConsoleError::rejected(400, message.clone()));
        }
        if let Some(tokens) = self.server.lock().unwrap().get_mut(&kind) {
            tokens.retain(|t| t.id.as_ref() != Some(id));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    shells: usize,
    rows: Vec<(TokenKind, RowId, Markup)>,
    revealed: HashSet<RowId>,
    sections: HashMap<TokenKind, SectionVisibility>,
    transitions: Vec<(RowId, Transition)>,
    detached: Vec<RowId>,
    section_updates: usize,
}

/// Records everything the presenters do to the UI tree.
#[derive(Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceState>,
    transition_gate: Mutex<Option<Arc<Notify>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every transition until the returned handle is notified.
    pub fn gate_transitions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.transition_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn rows(&self, kind: TokenKind) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .rows
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, _, m)| m.to_string())
            .collect()
    }

    pub fn row_markup(&self, row: RowId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|(_, id, _)| *id == row)
            .map(|(_, _, m)| m.to_string())
    }

    pub fn is_revealed(&self, row: RowId) -> bool {
        self.state.lock().unwrap().revealed.contains(&row)
    }

    pub fn section(&self, kind: TokenKind) -> Option<SectionVisibility> {
        self.state.lock().unwrap().sections.get(&kind).copied()
    }

    pub fn section_updates(&self) -> usize {
        self.state.lock().unwrap().section_updates
    }

    pub fn transitions(&self) -> Vec<(RowId, Transition)> {
        self.state.lock().unwrap().transitions.clone()
    }

    pub fn detached(&self) -> Vec<RowId> {
        self.state.lock().unwrap().detached.clone()
    }

    pub fn shells(&self) -> usize {
        self.state.lock().unwrap().shells
    }
}

#[async_trait]
impl ViewSurface for RecordingSurface {
    fn mount_shell(&self, _shell: Markup) {
        let mut state = self.state.lock().unwrap();
        state.shells += 1;
        state.rows.clear();
        state.revealed.clear();
    }

    fn attach_row(&self, kind: TokenKind, row: RowId, markup: Markup) {
        self.state.lock().unwrap().rows.push((kind, row, markup));
    }

    fn replace_row(&self, row: RowId, markup: Markup) {
        let mut state = self.state.lock().unwrap();
        if let Some(entry) = state.rows.iter_mut().find(|(_, id, _)| *id == row) {
            entry.2 = markup;
        }
    }

    fn show_full_value(&self, row: RowId, revealed: bool) {
        let mut state = self.state.lock().unwrap();
        if !state.rows.iter().any(|(_, id, _)| *id == row) {
            return;
        }
        if revealed {
            state.revealed.insert(row);
        } else {
            state.revealed.remove(&row);
        }
    }

    async fn transition(&self, row: RowId, transition: Transition) {
        self.state.lock().unwrap().transitions.push((row, transition));
        let gate = self.transition_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn detach_row(&self, row: RowId) {
        let mut state = self.state.lock().unwrap();
        state.rows.retain(|(_, id, _)| *id != row);
        state.revealed.remove(&row);
        state.detached.push(row);
    }

    fn set_section_visibility(&self, kind: TokenKind, visibility: SectionVisibility) {
        let mut state = self.state.lock().unwrap();
        state.sections.insert(kind, visibility);
        state.section_updates += 1;
    }
}

/// Confirm prompts answered from a script; alerts recorded.
pub struct ScriptedDialogs {
    answer: bool,
    prompts: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedDialogs {
    pub fn confirming() -> Self {
        Self::answering(true)
    }

    pub fn declining() -> Self {
        Self::answering(false)
    }

    fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Dialogs for ScriptedDialogs {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

/// A wired-up list presenter plus handles on every double.
pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub surface: Arc<RecordingSurface>,
    pub dialogs: Arc<ScriptedDialogs>,
    pub list: Arc<TokenListPresenter>,
}

impl Harness {
    pub fn new(dialogs: ScriptedDialogs) -> Self {
        Self::with_strategy(dialogs, RefreshStrategy::Sequential)
    }

    pub fn with_strategy(dialogs: ScriptedDialogs, strategy: RefreshStrategy) -> Self {
        let transport = Arc::new(FakeTransport::new());
        let surface = Arc::new(RecordingSurface::new());
        let dialogs = Arc::new(dialogs);
        let context = PresenterContext::builder()
            .surface(surface.clone())
            .dialogs(dialogs.clone())
            .renderer(Arc::new(PlainTextRenderer))
            .clients(Arc::new(StaticClientDirectory::new([
                ClientSummary::new("portal").with_name("Customer Portal"),
            ])))
            .scopes(Arc::new(ScopeCatalog::new([
                SystemScope::new("openid").with_description("log in using your identity"),
                SystemScope::new("offline_access"),
            ])))
            .clock(Arc::new(FixedClock(
                DateTime::parse_from_rfc3339(NOW).expect("valid timestamp"),
            )))
            .build();
        let list = TokenListPresenter::with_transport(transport.clone(), context, strategy);
        Self {
            transport,
            surface,
            dialogs,
            list,
        }
    }
}

/// Let spawned tasks run until `done` holds.
pub async fn settle(mut done: impl FnMut() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
