mod support;

use std::sync::Arc;

use serde_json::json;
use token_console::error::ConsoleError;
use token_console::registry::TokenRegistry;
use token_console::token::{TokenId, TokenKind, WireToken};

use support::{access_token, settle, FakeTransport};

fn registry(transport: &Arc<FakeTransport>) -> TokenRegistry {
    TokenRegistry::new(TokenKind::Access, transport.clone())
}

#[tokio::test]
async fn fetch_all_replaces_the_whole_set_in_server_order() {
    let transport = Arc::new(FakeTransport::new());
    transport.seed(
        TokenKind::Access,
        vec![access_token(3, None), access_token(1, None)],
    );
    let registry = registry(&transport);
    assert!(registry.is_empty());

    registry.fetch_all().await.expect("fetch");

    let ids: Vec<String> = registry
        .records()
        .iter()
        .map(|r| r.id().to_string())
        .collect();
    assert_eq!(ids, vec!["3", "1"]);

    transport.seed(TokenKind::Access, vec![access_token(5, None)]);
    registry.fetch_all().await.expect("second fetch");
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(&TokenId::from("5")));
    assert!(!registry.contains(&TokenId::from("3")));
}

#[tokio::test]
async fn failed_fetch_keeps_previous_set() {
    let transport = Arc::new(FakeTransport::new());
    transport.seed(TokenKind::Access, vec![access_token(1, None)]);
    let registry = registry(&transport);
    registry.fetch_all().await.expect("fetch");

    transport.seed(TokenKind::Access, vec![]);
    transport.fail_list(TokenKind::Access);
    let err = registry.fetch_all().await.unwrap_err();

    assert!(matches!(err, ConsoleError::Timeout(_)));
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn malformed_record_rejects_the_whole_batch() {
    let transport = Arc::new(FakeTransport::new());
    transport.seed(TokenKind::Access, vec![access_token(1, None)]);
    let registry = registry(&transport);
    registry.fetch_all().await.expect("fetch");

    let missing_value: WireToken =
        serde_json::from_value(json!({"id": 9, "clientId": "portal"})).unwrap();
    transport.seed(
        TokenKind::Access,
        vec![access_token(2, None), missing_value],
    );
    let err = registry.fetch_all().await.unwrap_err();

    assert!(matches!(err, ConsoleError::InvalidRecord { .. }));
    assert_eq!(registry.records()[0].id().as_str(), "1");
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn remove_drops_record_only_after_server_confirms() {
    let transport = Arc::new(FakeTransport::new());
    transport.seed(
        TokenKind::Access,
        vec![access_token(1, None), access_token(2, None)],
    );
    let registry = registry(&transport);
    registry.fetch_all().await.expect("fetch");

    registry.remove(&TokenId::from("1")).await.expect("remove");

    assert_eq!(registry.len(), 1);
    assert!(!registry.contains(&TokenId::from("1")));
    assert_eq!(transport.server_len(TokenKind::Access), 1);
    assert!(!registry.is_remove_pending(&TokenId::from("1")));
}

#[tokio::test]
async fn rejected_remove_leaves_set_unchanged_and_carries_message() {
    let transport = Arc::new(FakeTransport::new());
    transport.seed(TokenKind::Access, vec![access_token(1, None)]);
    transport.reject_delete("1", "Token belongs to a protected client");
    let registry = registry(&transport);
    registry.fetch_all().await.expect("fetch");

    let err = registry.remove(&TokenId::from("1")).await.unwrap_err();

    assert_eq!(err.user_message(), "Token belongs to a protected client");
    assert_eq!(registry.len(), 1);
    assert!(!registry.is_remove_pending(&TokenId::from("1")));

    transport.accept_deletes();
    registry
        .remove(&TokenId::from("1"))
        .await
        .expect("retry succeeds");
    assert!(registry.is_empty());
}

#[tokio::test]
async fn unknown_id_never_reaches_the_transport() {
    let transport = Arc::new(FakeTransport::new());
    let registry = registry(&transport);

    let err = registry.remove(&TokenId::from("404")).await.unwrap_err();

    assert!(matches!(err, ConsoleError::UnknownToken { .. }));
    assert_eq!(transport.delete_calls(), 0);
}

#[tokio::test]
async fn concurrent_removes_of_one_id_issue_a_single_delete() {
    let transport = Arc::new(FakeTransport::new());
    transport.seed(TokenKind::Access, vec![access_token(1, None)]);
    let registry = Arc::new(registry(&transport));
    registry.fetch_all().await.expect("fetch");
    let gate = transport.gate_deletes();

    let first = tokio::spawn({
        let registry = registry.clone();
        async move { registry.remove(&TokenId::from("1")).await }
    });
    settle(|| transport.delete_calls() == 1).await;
    assert!(registry.is_remove_pending(&TokenId::from("1")));

    let second = registry.remove(&TokenId::from("1")).await;
    assert!(matches!(second, Err(ConsoleError::RevokePending { .. })));

    gate.notify_one();
    first.await.expect("join").expect("first remove succeeds");
    assert_eq!(transport.delete_calls(), 1);
    assert!(registry.is_empty());
    assert!(!registry.is_remove_pending(&TokenId::from("1")));
}

#[tokio::test]
async fn staged_fetch_installs_nothing_until_replaced() {
    let transport = Arc::new(FakeTransport::new());
    transport.seed(TokenKind::Access, vec![access_token(1, None)]);
    let registry = registry(&transport);
    registry.fetch_all().await.expect("fetch");

    transport.seed(TokenKind::Access, vec![access_token(2, None)]);
    let staged = registry.fetch_staged().await.expect("staged fetch");

    assert!(registry.get(&TokenId::from("1")).is_some());
    assert!(registry.get(&TokenId::from("2")).is_none());

    registry.replace(staged);
    let installed = registry.get(&TokenId::from("2")).expect("installed");
    assert_eq!(installed.client_id(), "portal");
    assert_eq!(registry.len(), 1);
}
