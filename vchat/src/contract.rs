//! Behavioral checks every `ConversationHistory` implementation must pass.
//!
//! Each check panics with a descriptive message on violation, so
//! implementation crates can call them from their own `#[tokio::test]`s.

use std::sync::Arc;

use vcommon::ConversationId;
use vprovider::Role;

use crate::{ChatErrorKind, ConversationHistory};

pub async fn read_unknown_conversation_is_empty(history: &dyn ConversationHistory) {
    let messages = history
        .read(&ConversationId::from("contract-unknown"))
        .await
        .expect("read should succeed");
    assert!(messages.is_empty(), "unknown conversation should be empty");
}

pub async fn append_preserves_insertion_order(history: &dyn ConversationHistory) {
    let id = ConversationId::from("contract-order");
    history
        .append(&id, Role::User, "pregunta".to_string())
        .await
        .expect("user append");
    history
        .append(&id, Role::Assistant, "respuesta".to_string())
        .await
        .expect("assistant append");

    let messages = history.read(&id).await.expect("read");
    let pairs = messages
        .iter()
        .map(|message| (message.role, message.content.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        pairs,
        vec![(Role::User, "pregunta"), (Role::Assistant, "respuesta")]
    );
    assert!(messages[0].timestamp <= messages[1].timestamp);
}

/// Appends `max_messages + 5` entries and expects only the newest `max_messages`.
pub async fn append_trims_to_most_recent(history: &dyn ConversationHistory, max_messages: usize) {
    let id = ConversationId::from("contract-trim");
    let total = max_messages + 5;
    for index in 0..total {
        history
            .append(&id, Role::User, format!("m{index}"))
            .await
            .expect("append");
    }

    let contents = history
        .read(&id)
        .await
        .expect("read")
        .into_iter()
        .map(|message| message.content)
        .collect::<Vec<_>>();
    let expected = (total - max_messages..total)
        .map(|index| format!("m{index}"))
        .collect::<Vec<_>>();
    assert_eq!(contents, expected);
}

pub async fn append_rejects_empty_conversation_id(history: &dyn ConversationHistory) {
    let error = history
        .append(&ConversationId::from(""), Role::User, "hola".to_string())
        .await
        .expect_err("empty id should be rejected");
    assert_eq!(error.kind, ChatErrorKind::InvalidConversationId);
}

pub async fn whitespace_conversation_ids_are_distinct_keys(history: &dyn ConversationHistory) {
    let one = ConversationId::from(" ");
    let three = ConversationId::from("   ");
    history
        .append(&one, Role::User, "uno".to_string())
        .await
        .expect("whitespace id should be accepted");

    let messages = history.read(&one).await.expect("read");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "uno");
    assert!(history.read(&three).await.expect("read").is_empty());
}

pub async fn clear_is_idempotent_and_scoped(history: &dyn ConversationHistory) {
    let cleared = ConversationId::from("contract-clear");
    let kept = ConversationId::from("contract-keep");
    history
        .append(&cleared, Role::User, "a".to_string())
        .await
        .expect("append");
    history
        .append(&kept, Role::User, "b".to_string())
        .await
        .expect("append");

    history.clear(&cleared).await.expect("first clear");
    history.clear(&cleared).await.expect("second clear");
    history
        .clear(&ConversationId::from("contract-never-seen"))
        .await
        .expect("clearing unknown id");

    assert!(history.read(&cleared).await.expect("read").is_empty());
    assert_eq!(history.read(&kept).await.expect("read").len(), 1);
}

pub async fn summarize_reports_count_and_messages(history: &dyn ConversationHistory) {
    let id = ConversationId::from("contract-summary");
    history
        .append(&id, Role::User, "hola".to_string())
        .await
        .expect("append");

    let summary = history.summarize(&id).await.expect("summarize");
    assert_eq!(summary.conversation_id, id);
    assert_eq!(summary.message_count, 1);
    assert_eq!(summary.messages[0].content, "hola");

    let empty = history
        .summarize(&ConversationId::from("contract-summary-empty"))
        .await
        .expect("summarize unknown");
    assert_eq!(empty.message_count, 0);
}

/// Concurrent appends to distinct ids must not leak into each other.
pub async fn concurrent_appends_stay_isolated(history: Arc<dyn ConversationHistory>) {
    let mut handles = Vec::new();
    for worker in 0..4 {
        let history = Arc::clone(&history);
        handles.push(tokio::spawn(async move {
            let id = ConversationId::from(format!("contract-concurrent-{worker}"));
            for index in 0..3 {
                history
                    .append(&id, Role::User, format!("w{worker}-{index}"))
                    .await
                    .expect("append");
            }
        }));
    }

    for handle in handles {
        handle.await.expect("worker should finish");
    }

    for worker in 0..4 {
        let messages = history
            .read(&ConversationId::from(format!("contract-concurrent-{worker}")))
            .await
            .expect("read");
        assert_eq!(messages.len(), 3);
        assert!(
            messages
                .iter()
                .all(|message| message.content.starts_with(&format!("w{worker}-")))
        );
    }
}

/// Runs every check against a fresh store built by `make`.
pub async fn run_all<F>(make: F, max_messages: usize)
where
    F: Fn() -> Arc<dyn ConversationHistory>,
{
    read_unknown_conversation_is_empty(make().as_ref()).await;
    append_preserves_insertion_order(make().as_ref()).await;
    append_trims_to_most_recent(make().as_ref(), max_messages).await;
    append_rejects_empty_conversation_id(make().as_ref()).await;
    whitespace_conversation_ids_are_distinct_keys(make().as_ref()).await;
    clear_is_idempotent_and_scoped(make().as_ref()).await;
    summarize_reports_count_and_messages(make().as_ref()).await;
    concurrent_appends_stay_isolated(make()).await;
}
